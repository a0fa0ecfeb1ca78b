//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const CONFIG_FILE: &str = "arch-conform.toml";

const DEFAULT_CONFIG: &str = r#"# arch-conform configuration
# Run `arch-conform list-predicates` for every predicate name.

# Lowest severity that fails a run: "error", "warning" or "info"
fail_on = "error"

[options]
# Compare names and namespaces case-sensitively
case_sensitive = false
# Treat string constants of const fields as dependencies
search_field_constants = false

[metadata]
# JSON metadata dumps, relative to this file
paths = ["build/metadata/*.json"]

# Per-rule overrides
# [overrides.domain-is-isolated]
# enabled = true
# severity = "warning"

[[rules]]
name = "domain-is-isolated"
message = "The domain layer must not depend on infrastructure."
# doc = "docs/architecture.md"
that = [{ predicate = "reside-in-namespace", value = "MyApp.Domain" }]
should-not = [
    { predicate = "have-dependency-on-any", values = ["MyApp.Infrastructure", "MyApp.Web"] },
]

[[rules]]
name = "controllers-are-named"
message = "Types in the web layer deriving from a controller base end with `Controller`."
severity = "warning"
that = [
    { predicate = "reside-in-namespace", value = "MyApp.Web" },
    { predicate = "inherit", value = "Microsoft.AspNetCore.Mvc.ControllerBase" },
]
should = [{ predicate = "have-name-ending-with", value = "Controller" }]

# [[slices]]
# name = "features-are-independent"
# prefix = "MyApp.Features"
"#;

/// Runs the init command in `dir`.
pub fn run(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILE);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)?;

    println!("Created {CONFIG_FILE}");
    println!("\nNext steps:");
    println!("  1. Point [metadata] paths at your metadata dumps");
    println!("  2. Edit the [[rules]] to match your namespaces");
    println!("  3. Run: arch-conform check");

    Ok(())
}
