//! Tierstack Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for tierstack,
//! a composer of multi-tier cloud topologies, following hexagonal (ports
//! and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          tierstack-cli (CLI)            │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (SynthService, TopologyAssembler)      │
//! │         Orchestrates Use Cases          │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │  (Driven: Source, Renderer, Sink)       │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │   tierstack-adapters (Infrastructure)   │
//! │ (FileConfigSource, JsonRenderer, etc)   │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │  (ValidatedConfig, Topology, Handles)   │
//! │         No I/O, No Logging              │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tierstack_core::{
//!     application::TopologyAssembler,
//!     domain::{ConfigValidator, RawConfig},
//! };
//!
//! let raw = RawConfig {
//!     name_prefix: Some("Acme".into()),
//!     dns_domain: Some("example.com".into()),
//!     db_engine: Some("postgresql".into()),
//!     ..Default::default()
//! };
//! let config = ConfigValidator::validate(&raw).unwrap();
//! let deployment = TopologyAssembler::assemble(&config).unwrap();
//! println!("{} topologies", deployment.assembly.topologies().len());
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        Deployment, SynthReport, SynthService, TopologyAssembler,
        ports::{ArtifactSink, AssemblyRenderer, ConfigSource},
    };
    pub use crate::domain::{
        CloudAssembly, ConfigValidator, DbEngine, OutputRecord, RawConfig, Topology,
        TopologyContext, ValidatedConfig,
    };
    pub use crate::error::{TierstackError, TierstackResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
