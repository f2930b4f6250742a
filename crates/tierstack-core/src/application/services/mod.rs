//! Application services - orchestrate use cases.
//!
//! `TopologyAssembler` turns a validated configuration into a checked
//! assembly; `SynthService` drives the full load → assemble → render →
//! write workflow through the ports.

pub mod assembler;
pub mod synth_service;

pub use assembler::{Deployment, TopologyAssembler};
pub use synth_service::{SynthReport, SynthRequest, SynthService};
