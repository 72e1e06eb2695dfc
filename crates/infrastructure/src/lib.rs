//! Filesystem and rule-file adapters for application ports.

#![forbid(unsafe_code)]

mod fs_metadata_store;
mod json_rule_loader;

pub use fs_metadata_store::FsMetadataStore;
pub use json_rule_loader::load_rule_set;
