//! Explain command
//!
//! Usage: tfbreak explain <RULE>

use clap::Args;
use tfbreak_core::rules::{Rule, RuleDoc};
use tfbreak_core::{default_registry, RenameDetection, Result};

#[derive(Debug, Args)]
pub struct ExplainArgs {
    /// Rule ID (`BC001`) or name (`required-input-added`)
    pub rule: String,
}

/// Execute explain command
pub fn execute(args: ExplainArgs) -> Result<()> {
    let registry = default_registry(&RenameDetection::default())?;
    let id = registry.resolve(&args.rule)?;
    if let Some(rule) = registry.get(id) {
        print!("{}", explanation(rule));
    }
    Ok(())
}

fn indent(text: &str) -> String {
    text.lines().map(|l| format!("    {}\n", l)).collect()
}

fn explanation(rule: &dyn Rule) -> String {
    let mut out = format!(
        "{} {} ({})\n\n{}\n",
        rule.id(),
        rule.name(),
        rule.default_severity(),
        rule.description()
    );
    if let Some(RuleDoc {
        summary,
        example_old,
        example_new,
        remediation,
    }) = rule.documentation()
    {
        out.push_str(&format!("\n{}\n", summary));
        out.push_str(&format!("\nBefore:\n{}", indent(example_old)));
        out.push_str(&format!("\nAfter:\n{}", indent(example_new)));
        out.push_str(&format!("\nRemediation:\n{}", indent(remediation)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explanation_includes_documentation() {
        let registry = default_registry(&RenameDetection::default()).unwrap();
        let text = explanation(registry.get("BC100").unwrap());
        assert!(text.starts_with("BC100 resource-removed-no-moved (BREAKING)\n"));
        assert!(text.contains("Remediation:\n    Add `moved"));
    }

    #[test]
    fn test_explanation_without_documentation() {
        let registry = default_registry(&RenameDetection::default()).unwrap();
        let text = explanation(registry.get("BC102").unwrap());
        assert!(!text.contains("Remediation"));
    }
}
