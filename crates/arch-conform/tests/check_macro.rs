//! Integration test for the `arch_conform::check!()` macro.
//!
//! The fixture config has an unsealed controller, but only at warning
//! severity, so the generated test passes under `fail_on = "error"`.

arch_conform::check!(config = "crates/arch-conform/tests/fixtures/arch-conform.toml");
