//! Engine and compute-size registries.
//!
//! Each database engine is described exactly once by its [`EngineDef`]:
//! connection port, auxiliary ports, version identifiers and log export
//! policy are data, not branches scattered across the topology code.
//!
//! # Adding a New Engine
//!
//! 1. Add a variant to `DbEngine` in `value_objects.rs`
//! 2. Add one [`EngineDef`] entry to [`ENGINE_REGISTRY`]
//! 3. That's it

use crate::domain::error::{ConfigError, DomainError};
use crate::domain::value_objects::{DbEngine, PortRange};

// ── Engine definitions ───────────────────────────────────────────────────────

/// An extra port opened for every ingress source alongside the main one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuxiliaryPort {
    pub port: u16,
    pub label: &'static str,
}

impl AuxiliaryPort {
    pub const fn range(&self) -> PortRange {
        PortRange::tcp(self.port)
    }
}

/// Everything the topology layer needs to know about one engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineDef {
    pub engine: DbEngine,

    /// Default connection port.
    pub port: u16,

    /// Description attached to each ingress rule on `port`.
    pub connection_label: &'static str,

    /// Additional per-source ingress ports (compatibility channels).
    pub auxiliary_ports: &'static [AuxiliaryPort],

    /// Provider engine type, e.g. `aurora-mysql`.
    pub engine_type: &'static str,

    /// Engine family as reported by the provider, e.g. `MYSQL`.
    pub engine_family: &'static str,

    pub full_version: &'static str,
    pub major_version: &'static str,
    pub parameter_group_family: &'static str,

    /// Log streams exported to the log service.
    pub log_exports: &'static [&'static str],

    /// Parameter that switches on the foreign-protocol compatibility layer,
    /// if the engine has one.
    pub babelfish_parameter: Option<(&'static str, &'static str)>,
}

impl EngineDef {
    pub const fn connection_port(&self) -> PortRange {
        PortRange::tcp(self.port)
    }

    pub const fn supports_babelfish(&self) -> bool {
        self.babelfish_parameter.is_some()
    }
}

/// Single source of truth for engine capabilities.
pub static ENGINE_REGISTRY: &[EngineDef] = &[
    EngineDef {
        engine: DbEngine::MySql,
        port: 3306,
        connection_label: "tcp3306 MySQL",
        auxiliary_ports: &[],
        engine_type: "aurora-mysql",
        engine_family: "MYSQL",
        full_version: "8.0.mysql_aurora.3.02.2",
        major_version: "8.0",
        parameter_group_family: "aurora-mysql8.0",
        log_exports: &["slowquery"],
        babelfish_parameter: None,
    },
    EngineDef {
        engine: DbEngine::PostgreSql,
        port: 5432,
        connection_label: "tcp5432 PostgresSQL",
        auxiliary_ports: &[AuxiliaryPort {
            port: 1433,
            label: "tcp1433",
        }],
        engine_type: "aurora-postgresql",
        engine_family: "POSTGRESQL",
        full_version: "13.4",
        major_version: "13",
        parameter_group_family: "aurora-postgresql13",
        log_exports: &["postgresql"],
        babelfish_parameter: Some(("rds.babelfish_status", "on")),
    },
];

/// Look up the definition for an engine.
///
/// Fails with `UnsupportedEngine` when the registry has no entry, which can
/// only happen if a variant was added without registering it.
pub fn engine_def(engine: DbEngine) -> Result<&'static EngineDef, DomainError> {
    ENGINE_REGISTRY
        .iter()
        .find(|def| def.engine == engine)
        .ok_or_else(|| DomainError::UnsupportedEngine {
            engine: engine.to_string(),
        })
}

// ── Fargate task sizes ───────────────────────────────────────────────────────

/// Memory choices (MiB) valid for one task CPU setting.
#[derive(Debug, Clone, Copy)]
pub struct TaskSizeDef {
    pub cpu: u32,
    pub min_memory: u32,
    pub max_memory: u32,
}

impl TaskSizeDef {
    /// Memory is accepted in whole GiB inside the range; `min_memory` itself
    /// is always accepted (512 MiB for the smallest CPU size).
    pub fn accepts(&self, memory: u32) -> bool {
        memory >= self.min_memory
            && memory <= self.max_memory
            && (memory == self.min_memory || memory % 1024 == 0)
    }
}

pub static TASK_SIZE_REGISTRY: &[TaskSizeDef] = &[
    TaskSizeDef {
        cpu: 256,
        min_memory: 512,
        max_memory: 2048,
    },
    TaskSizeDef {
        cpu: 512,
        min_memory: 1024,
        max_memory: 4096,
    },
    TaskSizeDef {
        cpu: 1024,
        min_memory: 2048,
        max_memory: 8192,
    },
    TaskSizeDef {
        cpu: 2048,
        min_memory: 4096,
        max_memory: 16384,
    },
    TaskSizeDef {
        cpu: 4096,
        min_memory: 8192,
        max_memory: 30720,
    },
];

/// Check a CPU/memory pair against the task size table.
pub fn validate_task_size(cpu: u32, memory: u32) -> Result<(), ConfigError> {
    let def = TASK_SIZE_REGISTRY
        .iter()
        .find(|d| d.cpu == cpu)
        .ok_or_else(|| ConfigError::InvalidValue {
            field: "fargateCpu",
            reason: format!(
                "{cpu} is not a task CPU size (expected one of {})",
                TASK_SIZE_REGISTRY
                    .iter()
                    .map(|d| d.cpu.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        })?;

    if def.accepts(memory) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field: "fargateMemoryLimit",
            reason: format!(
                "{memory} MiB is not valid with {cpu} CPU units (allowed {}..={} MiB)",
                def.min_memory, def.max_memory
            ),
        })
    }
}
