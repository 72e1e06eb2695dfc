//! Sweep orchestration service and storage ports.

#![forbid(unsafe_code)]

mod sweep_ports;
mod sweep_service;

pub use sweep_ports::MetadataStore;
pub use sweep_service::{
    DryRunMatch, SweepFailure, SweepInput, SweepMode, SweepReport, SweepService,
};
