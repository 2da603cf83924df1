use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::domain::rule::{Rule, RuleSet, RuleSetError};

/// Errors that can occur while loading a rules file.
#[derive(Error, Debug)]
pub enum RulesFileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Validation error: {0}")]
    Invalid(#[from] RuleSetError),
}

/// On-disk shape of a seed rules file.
#[derive(Debug, Deserialize)]
struct RulesFile {
    #[serde(default)]
    rules: Vec<Rule>,
}

/// Load seed rules from a YAML file.
///
/// The file carries a single `rules` list in the same shape the management
/// API accepts. Rule set invariants are checked here, before anything is
/// published.
pub fn load_rules(path: impl AsRef<Path>) -> Result<Vec<Rule>, RulesFileError> {
    let content = fs::read_to_string(path)?;
    let file: RulesFile = serde_yaml::from_str(&content)?;

    let rule_set = RuleSet::try_new(file.rules)?;
    Ok(rule_set.rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_rules() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
rules:
  - type: threshold
    rule_id: rule-threshold
    priority: 1
    max_amount: "100.00"
  - type: location
    rule_id: rule-location
    priority: 2
    allowed_regions: ["US", "CA"]
  - type: frequency
    rule_id: rule-frequency
    priority: 3
    time_window_secs: 3600
"#
        )
        .unwrap();

        let rules = load_rules(file.path()).unwrap();

        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0].rule_id().as_str(), "rule-threshold");
        match &rules[0] {
            Rule::Threshold { max_amount, .. } => {
                assert_eq!(*max_amount, Decimal::new(10000, 2));
            }
            other => panic!("expected threshold rule, got {other:?}"),
        }
    }

    #[test]
    fn test_load_rules_rejects_duplicate_ids() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
rules:
  - type: threshold
    rule_id: rule-1
    priority: 1
    max_amount: "100.00"
  - type: frequency
    rule_id: rule-1
    priority: 2
    time_window_secs: 60
"#
        )
        .unwrap();

        let result = load_rules(file.path());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("duplicate"));
    }

    #[test]
    fn test_load_rules_missing_file() {
        let result = load_rules("/nonexistent/rules.yaml");
        assert!(matches!(result, Err(RulesFileError::Io(_))));
    }

    #[test]
    fn test_load_rules_malformed_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "rules: [{{not yaml").unwrap();

        let result = load_rules(file.path());
        assert!(matches!(result, Err(RulesFileError::Yaml(_))));
    }

    #[test]
    fn test_load_rules_empty_list() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "rules: []").unwrap();

        assert!(load_rules(file.path()).unwrap().is_empty());
    }
}
