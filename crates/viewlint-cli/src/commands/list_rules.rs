//! List rules command implementation.

use viewlint_rules::all_rules;

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!(
        "{:<8} {:<24} {:<13} {:<9} Description",
        "Code", "Name", "Category", "Severity"
    );
    println!("{}", "-".repeat(100));

    for rule in all_rules() {
        println!(
            "{:<8} {:<24} {:<13} {:<9} {}",
            rule.code(),
            rule.id(),
            rule.category().to_string(),
            rule.default_severity().to_string(),
            rule.description()
        );
        for param in rule.parameters() {
            println!(
                "         {:<24} parameter (default {}): {}",
                param.name, param.default, param.description
            );
        }
    }

    println!("\nPresets:");
    println!("  recommended  - VL001 through VL006 (default)");
    println!("  strict       - All rules, including stylistic ones");
    println!("  minimal      - VL002 and VL004 (for gradual adoption)");

    println!("\nUse --rules to filter specific rules, e.g.:");
    println!("  viewlint check --rules state-ownership,capture-discipline");
    println!("  viewlint check --rules VL001,VL005");
}
