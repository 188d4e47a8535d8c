//! List rules command implementation.

use archrule_rules::{all_rules, Preset};

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!("{:<8} {:<34} {:<10} Description", "Code", "Name", "Kind");
    println!("{}", "-".repeat(100));

    for rule in all_rules() {
        println!(
            "{:<8} {:<34} {:<10} {}",
            rule.code(),
            rule.name(),
            if rule.is_per_type() { "per type" } else { "codebase" },
            rule.description()
        );
    }

    println!("\nPresets:");
    for (name, preset) in [
        ("recommended", Preset::Recommended),
        ("strict", Preset::Strict),
        ("minimal", Preset::Minimal),
    ] {
        println!("  {name:<12} - {}", preset.rule_names().join(", "));
    }

    println!("\nUse --rules to filter specific rules, e.g.:");
    println!("  archrule check --rules interfaces-in-interfaces-folder,mapper-write-count");
    println!("  archrule check --rules AR001,AR101");
}
