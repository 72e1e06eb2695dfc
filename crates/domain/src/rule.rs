use std::collections::HashMap;

use blobsweep_core::{AppError, AppResult};
use regex::Regex;

/// One retention policy entry scoped to a repository.
#[derive(Debug, Clone)]
pub struct RetentionRule {
    path_pattern: Regex,
    max_age_days: i64,
}

impl RetentionRule {
    /// Compiles a validated retention rule.
    ///
    /// The pattern keeps full regex semantics and is matched unanchored
    /// against blob paths; it is never downgraded to a literal substring.
    pub fn new(path_pattern: &str, max_age_days: i64) -> AppResult<Self> {
        let path_pattern = Regex::new(path_pattern).map_err(|error| {
            AppError::Config(format!("invalid path pattern '{path_pattern}': {error}"))
        })?;

        if max_age_days < 0 {
            return Err(AppError::Config(format!(
                "rule days threshold must not be negative, got {max_age_days}"
            )));
        }

        Ok(Self {
            path_pattern,
            max_age_days,
        })
    }

    /// Returns whether the pattern matches anywhere in the blob path.
    #[must_use]
    pub fn matches(&self, blob_path: &str) -> bool {
        self.path_pattern.is_match(blob_path)
    }

    /// Returns the pattern source text.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.path_pattern.as_str()
    }

    /// Returns the inclusive keep threshold in days.
    #[must_use]
    pub fn max_age_days(&self) -> i64 {
        self.max_age_days
    }
}

/// Ordered retention rules grouped by exact repository name.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: HashMap<String, Vec<RetentionRule>>,
}

impl RuleSet {
    /// Creates a rule set from repository-keyed rule lists.
    #[must_use]
    pub fn new(rules: HashMap<String, Vec<RetentionRule>>) -> Self {
        Self { rules }
    }

    /// Returns every rule whose pattern matches the blob path, source order
    /// preserved.
    ///
    /// A repository without a rule list yields no matches: the record is kept
    /// regardless of age.
    #[must_use]
    pub fn matching_rules(&self, repository_name: &str, blob_path: &str) -> Vec<&RetentionRule> {
        self.rules
            .get(repository_name)
            .map(|repository_rules| {
                repository_rules
                    .iter()
                    .filter(|rule| rule.matches(blob_path))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the total rule count across repositories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    /// Returns whether the rule set holds no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
