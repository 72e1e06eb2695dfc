//! Retention domain logic: record parsing, rule matching, evaluation.

#![forbid(unsafe_code)]

mod evaluation;
mod record;
mod rule;

pub use evaluation::{RetentionDecision, TriggeredRule, evaluate_retention};
pub use record::{BlobRecord, TimestampPolicy};
pub use rule::{RetentionRule, RuleSet};
