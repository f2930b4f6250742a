use crate::domain::{
    config::{ConfigValidator, RawConfig, ValidatedConfig},
    entities::{CloudAssembly, Topology},
    error::DomainError,
};

/// Centralized domain validation.
///
/// Entry points for the checks the application layer runs before and after
/// composition. Each delegates to the type that owns the rule.
pub struct DomainValidator;

impl DomainValidator {
    pub fn validate_config(raw: &RawConfig) -> Result<ValidatedConfig, DomainError> {
        ConfigValidator::validate(raw)
    }

    pub fn validate_topology(topology: &Topology) -> Result<(), DomainError> {
        topology.validate()
    }

    pub fn validate_assembly(assembly: &CloudAssembly) -> Result<(), DomainError> {
        assembly.validate()
    }
}
