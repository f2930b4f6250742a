//! Stack configuration: the raw document and its validated, immutable form.
//!
//! [`RawConfig`] mirrors the flat configuration file (camelCase keys, every
//! key optional at the type level). [`ConfigValidator::validate`] turns it
//! into a [`ValidatedConfig`] made of per-component slices, so each topology
//! only sees the settings it needs.
//!
//! Two kinds of correction happen here and nowhere else:
//!
//! - **Clamping**: `dbBackupRetentionDays` is raised to 14 and
//!   `dbReplicaInstances` to 1. These never fail.
//! - **Rejection**: anything malformed (unknown engine, bad DNS label,
//!   unsupported task size, …) fails before a single resource is declared.

use serde::{Deserialize, Serialize};

use crate::domain::engines::validate_task_size;
use crate::domain::error::{ConfigError, DomainError};
use crate::domain::value_objects::{DbEngine, Peer, Region};

pub const MIN_BACKUP_RETENTION_DAYS: u32 = 14;
pub const MIN_REPLICA_INSTANCES: u32 = 1;
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_MAX_AZS: u8 = 3;
pub const DEFAULT_DB_USERNAME: &str = "dbadmin";
pub const DEFAULT_DB_INSTANCE_TYPE: &str = "t4g.medium";
pub const DEFAULT_IMAGE_TAG: &str = "latest";
pub const DEFAULT_FARGATE_CPU: u32 = 256;
pub const DEFAULT_FARGATE_MEMORY: u32 = 512;
pub const DEFAULT_FARGATE_INSTANCES: u32 = 1;

// ── Raw document ─────────────────────────────────────────────────────────────

/// The configuration document exactly as read from disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConfig {
    pub name_prefix: Option<String>,
    pub region: Option<String>,
    pub max_azs: Option<u8>,

    pub dns_domain: Option<String>,
    pub dns_domain_host: Option<String>,
    pub dns_domain_enable_root: Option<bool>,

    pub db_engine: Option<String>,
    pub db_name: Option<String>,
    pub db_username: Option<String>,
    pub db_instance_type: Option<String>,
    pub db_replica_instances: Option<i64>,
    pub db_backup_window: Option<String>,
    pub db_backup_retention_days: Option<i64>,
    pub db_preferred_maintenance_window: Option<String>,
    pub db_ingress_sources: Option<Vec<String>>,
    pub db_enable_babelfish: Option<bool>,

    pub ses_email_enabled: Option<bool>,

    pub fargate_cpu: Option<u32>,
    pub fargate_memory_limit: Option<u32>,
    pub fargate_instances: Option<u32>,
    pub ecr_repository_tag: Option<String>,
    pub cf_origin_shield_region: Option<String>,
}

// ── Validated slices ─────────────────────────────────────────────────────────

/// Naming and placement shared by every topology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    pub name_prefix: String,
    pub region: Region,
}

impl Scope {
    /// `Acme` + `Data` → `AcmeData`.
    pub fn topology_name(&self, suffix: &str) -> String {
        format!("{}{}", self.name_prefix, suffix)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSettings {
    pub max_azs: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsSettings {
    pub domain: String,
    pub host: Option<String>,
    pub enable_root: bool,
}

impl DnsSettings {
    /// True when at least one public name should be served.
    pub fn wants_certificate(&self) -> bool {
        self.host.is_some() || self.enable_root
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseSettings {
    pub engine: DbEngine,
    pub name: String,
    pub username: String,
    pub instance_type: String,
    pub replica_instances: u32,
    pub backup_window: Option<String>,
    pub backup_retention_days: u32,
    pub maintenance_window: Option<String>,
    pub ingress_sources: Vec<Peer>,
    pub enable_babelfish: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSettings {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebSettings {
    pub cpu: u32,
    pub memory_limit: u32,
    pub instances: u32,
    pub image_tag: String,
    pub origin_shield_region: Option<Region>,
}

/// Immutable, fully defaulted configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedConfig {
    pub scope: Scope,
    pub network: NetworkSettings,
    pub dns: DnsSettings,
    pub database: DatabaseSettings,
    pub email: EmailSettings,
    pub web: WebSettings,
}

// ── Validator ────────────────────────────────────────────────────────────────

pub struct ConfigValidator;

impl ConfigValidator {
    /// Normalise and validate a raw document.
    ///
    /// Pure: the same input always yields the same output, nothing is logged.
    pub fn validate(raw: &RawConfig) -> Result<ValidatedConfig, DomainError> {
        // An unknown engine is reported ahead of every other problem.
        let engine: DbEngine = required("dbEngine", &raw.db_engine)?.parse()?;

        let name_prefix = required("namePrefix", &raw.name_prefix)?;
        check_name_prefix(name_prefix)?;

        let region = match &raw.region {
            Some(r) => Region::parse("region", r)?,
            None => Region::parse("region", DEFAULT_REGION)?,
        };

        let max_azs = raw.max_azs.unwrap_or(DEFAULT_MAX_AZS);
        if !(1..=3).contains(&max_azs) {
            return Err(invalid("maxAzs", format!("{max_azs} is outside 1..=3")).into());
        }

        let dns = validate_dns(raw)?;
        let database = validate_database(raw, engine, name_prefix)?;
        let web = validate_web(raw)?;

        Ok(ValidatedConfig {
            scope: Scope {
                name_prefix: name_prefix.to_string(),
                region,
            },
            network: NetworkSettings { max_azs },
            dns,
            database,
            email: EmailSettings {
                enabled: raw.ses_email_enabled.unwrap_or(false),
            },
            web,
        })
    }
}

fn validate_dns(raw: &RawConfig) -> Result<DnsSettings, ConfigError> {
    let domain = required("dnsDomain", &raw.dns_domain)?;
    check_dns_name("dnsDomain", domain, 2)?;

    let host = match raw.dns_domain_host.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(h) => {
            check_dns_name("dnsDomainHost", h, 1)?;
            Some(h.to_string())
        }
    };

    Ok(DnsSettings {
        domain: domain.to_string(),
        host,
        enable_root: raw.dns_domain_enable_root.unwrap_or(false),
    })
}

fn validate_database(
    raw: &RawConfig,
    engine: DbEngine,
    name_prefix: &str,
) -> Result<DatabaseSettings, DomainError> {
    let name = match &raw.db_name {
        Some(n) => n.clone(),
        None => name_prefix.to_ascii_lowercase(),
    };
    check_identifier("dbName", &name, '-')?;

    let username = raw
        .db_username
        .clone()
        .unwrap_or_else(|| DEFAULT_DB_USERNAME.to_string());
    check_identifier("dbUsername", &username, '_')?;

    let instance_type = raw
        .db_instance_type
        .clone()
        .unwrap_or_else(|| DEFAULT_DB_INSTANCE_TYPE.to_string());
    if instance_type.trim().is_empty() {
        return Err(invalid("dbInstanceType", "must not be empty".into()).into());
    }

    let ingress_sources = raw
        .db_ingress_sources
        .iter()
        .flatten()
        .map(|s| Peer::parse(s))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DatabaseSettings {
        engine,
        name,
        username,
        instance_type,
        replica_instances: clamp_at_least(raw.db_replica_instances, MIN_REPLICA_INSTANCES),
        backup_window: non_empty(&raw.db_backup_window),
        backup_retention_days: clamp_at_least(
            raw.db_backup_retention_days,
            MIN_BACKUP_RETENTION_DAYS,
        ),
        maintenance_window: non_empty(&raw.db_preferred_maintenance_window),
        ingress_sources,
        enable_babelfish: raw.db_enable_babelfish.unwrap_or(false),
    })
}

fn validate_web(raw: &RawConfig) -> Result<WebSettings, ConfigError> {
    let cpu = raw.fargate_cpu.unwrap_or(DEFAULT_FARGATE_CPU);
    let memory_limit = raw.fargate_memory_limit.unwrap_or(DEFAULT_FARGATE_MEMORY);
    validate_task_size(cpu, memory_limit)?;

    let instances = raw.fargate_instances.unwrap_or(DEFAULT_FARGATE_INSTANCES);
    if instances == 0 {
        return Err(invalid("fargateInstances", "at least one task must run".into()));
    }

    let image_tag = raw
        .ecr_repository_tag
        .clone()
        .unwrap_or_else(|| DEFAULT_IMAGE_TAG.to_string());
    if image_tag.is_empty() || image_tag.len() > 128 || image_tag.contains(char::is_whitespace) {
        return Err(invalid(
            "ecrRepositoryTag",
            format!("'{image_tag}' is not a valid image tag"),
        ));
    }

    let origin_shield_region = raw
        .cf_origin_shield_region
        .as_deref()
        .map(|r| Region::parse("cfOriginShieldRegion", r))
        .transpose()?;

    Ok(WebSettings {
        cpu,
        memory_limit,
        instances,
        image_tag,
        origin_shield_region,
    })
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn required<'a>(field: &'static str, value: &'a Option<String>) -> Result<&'a str, ConfigError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::MissingRequiredField { field }),
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::InvalidValue { field, reason }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Absent or too small → `floor`.
fn clamp_at_least(value: Option<i64>, floor: u32) -> u32 {
    match value {
        Some(v) if v > i64::from(floor) => u32::try_from(v).unwrap_or(u32::MAX),
        _ => floor,
    }
}

fn check_name_prefix(prefix: &str) -> Result<(), ConfigError> {
    let mut chars = prefix.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    if starts_with_letter && chars.all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(invalid(
            "namePrefix",
            format!("'{prefix}' must start with a letter and contain only letters and digits"),
        ))
    }
}

/// Letter first, then alphanumerics or `extra`.
fn check_identifier(field: &'static str, value: &str, extra: char) -> Result<(), ConfigError> {
    let mut chars = value.chars();
    let ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == extra)
        && value.len() <= 63;
    if ok {
        Ok(())
    } else {
        Err(invalid(
            field,
            format!("'{value}' must start with a letter and contain only letters, digits or '{extra}'"),
        ))
    }
}

fn check_dns_name(field: &'static str, name: &str, min_labels: usize) -> Result<(), ConfigError> {
    let labels: Vec<&str> = name.split('.').collect();
    let label_ok = |l: &&str| {
        !l.is_empty()
            && l.len() <= 63
            && !l.starts_with('-')
            && !l.ends_with('-')
            && l.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    };

    if labels.len() >= min_labels && name.len() <= 253 && labels.iter().all(label_ok) {
        Ok(())
    } else {
        Err(invalid(field, format!("'{name}' is not a valid DNS name")))
    }
}
