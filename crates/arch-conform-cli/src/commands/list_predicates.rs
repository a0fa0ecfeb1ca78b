//! List predicates command implementation.

use anyhow::Result;
use arch_conform_rules::catalogue::{Argument, PredicateInfo, PREDICATES};
use serde::Serialize;

#[derive(Serialize)]
struct Row {
    name: &'static str,
    category: &'static str,
    argument: &'static str,
    description: &'static str,
}

impl From<&PredicateInfo> for Row {
    fn from(info: &PredicateInfo) -> Self {
        Self {
            name: info.name,
            category: info.category,
            argument: argument_hint(info.argument),
            description: info.description,
        }
    }
}

fn argument_hint(argument: Argument) -> &'static str {
    match argument {
        Argument::None => "",
        Argument::Value => "value",
        Argument::Number => "value (number)",
        Argument::Values => "values",
    }
}

/// Runs the list-predicates command.
pub fn run(json: bool) -> Result<()> {
    let rows: Vec<Row> = PREDICATES.iter().map(Row::from).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("Available predicates:\n");
    println!("{:<34} {:<16} Description", "Name", "Argument");
    println!("{}", "-".repeat(90));

    let mut category = "";
    for row in &rows {
        if row.category != category {
            category = row.category;
            println!("\n[{category}]");
        }
        println!("{:<34} {:<16} {}", row.name, row.argument, row.description);
    }

    println!("\nPrefix any predicate with `not-` to negate it, e.g. `not-are-classes`.");
    println!("Use `{{ predicate = \"or\" }}` inside a clause list to start a new group.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_predicate_has_a_row() {
        let rows: Vec<Row> = PREDICATES.iter().map(Row::from).collect();
        assert_eq!(rows.len(), PREDICATES.len());
        let json = serde_json::to_string(&rows).unwrap();
        assert!(json.contains("\"name\":\"have-dependency-on-any\""));
        assert!(json.contains("\"argument\":\"values\""));
    }
}
