use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use blobsweep_core::{AppError, AppResult};
use blobsweep_domain::{RetentionRule, RuleSet};

/// One rule entry in the rule file.
#[derive(Debug, Deserialize)]
struct RuleEntry {
    path: String,
    days: DaysValue,
}

/// Rule-file `days` value, tolerated as a number or a numeric string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DaysValue {
    Number(i64),
    Text(String),
}

impl DaysValue {
    fn normalize(&self) -> AppResult<i64> {
        match self {
            Self::Number(days) => Ok(*days),
            Self::Text(text) => text.trim().parse::<i64>().map_err(|error| {
                AppError::Config(format!(
                    "rule days value '{text}' is not an integer: {error}"
                ))
            }),
        }
    }
}

/// Loads and validates a repository-keyed retention rule file.
///
/// The `days` threshold is normalized to an integer here so ambiguous types
/// never reach the evaluator; a non-numeric value or an invalid pattern is a
/// config error that aborts before any record is touched.
pub fn load_rule_set(path: &Path) -> AppResult<RuleSet> {
    let raw = std::fs::read_to_string(path).map_err(|error| {
        AppError::Config(format!(
            "failed to read rule file '{}': {error}",
            path.display()
        ))
    })?;

    parse_rule_set(raw.as_str())
}

fn parse_rule_set(raw: &str) -> AppResult<RuleSet> {
    let entries: HashMap<String, Vec<RuleEntry>> = serde_json::from_str(raw)
        .map_err(|error| AppError::Config(format!("invalid rule file: {error}")))?;

    let mut rules = HashMap::with_capacity(entries.len());
    for (repository_name, repository_entries) in entries {
        let mut repository_rules = Vec::with_capacity(repository_entries.len());
        for entry in repository_entries {
            repository_rules.push(RetentionRule::new(
                entry.path.as_str(),
                entry.days.normalize()?,
            )?);
        }
        rules.insert(repository_name, repository_rules);
    }

    Ok(RuleSet::new(rules))
}
