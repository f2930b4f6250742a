//! End-to-end composition scenarios through the public API.

use tierstack_core::application::{Deployment, TopologyAssembler};
use tierstack_core::domain::entities::resources::SecurityGroupSpec;
use tierstack_core::domain::topologies::web;
use tierstack_core::domain::{
    ConfigValidator, DomainError, RawConfig, ResourceSpec, Topology, Value,
};
use tierstack_core::error::TierstackError;

fn acme() -> RawConfig {
    RawConfig {
        name_prefix: Some("Acme".into()),
        dns_domain: Some("example.com".into()),
        db_engine: Some("postgresql".into()),
        db_ingress_sources: Some(vec!["10.1.0.0/16".into()]),
        ..Default::default()
    }
}

fn assemble(raw: RawConfig) -> Result<Deployment, TierstackError> {
    let config = ConfigValidator::validate(&raw)?;
    TopologyAssembler::assemble(&config)
}

fn db_security_group(topology: &Topology) -> &SecurityGroupSpec {
    match &topology.resource("SecurityGroupDB").unwrap().spec {
        ResourceSpec::SecurityGroup(spec) => spec,
        other => panic!("unexpected {other:?}"),
    }
}

fn ingress_ports(deployment: &Deployment) -> Vec<u16> {
    let data = deployment.assembly.topology("AcmeData").unwrap();
    db_security_group(data)
        .ingress
        .iter()
        .map(|r| r.ports.from)
        .collect()
}

// ============================================================================
// Configuration failures
// ============================================================================

#[test]
fn unknown_engine_fails_before_any_topology() {
    let err = assemble(RawConfig {
        db_engine: Some("oracle".into()),
        ..acme()
    })
    .unwrap_err();

    assert!(matches!(
        err,
        TierstackError::Domain(DomainError::UnsupportedEngine { ref engine }) if engine == "oracle"
    ));
}

#[test]
fn missing_required_keys_are_reported() {
    let strips: [fn(&mut RawConfig); 3] = [
        |r| r.name_prefix = None,
        |r| r.dns_domain = None,
        |r| r.db_engine = None,
    ];
    for strip in strips {
        let mut raw = acme();
        strip(&mut raw);
        let err = assemble(raw).unwrap_err();
        assert!(err.is_config_error(), "{err}");
    }
}

// ============================================================================
// Corrective defaults
// ============================================================================

#[test]
fn retention_and_replicas_are_clamped() {
    let deployment = assemble(RawConfig {
        db_backup_retention_days: Some(3),
        db_replica_instances: Some(0),
        ..acme()
    })
    .unwrap();

    let config = deployment.context.config();
    assert_eq!(config.database.backup_retention_days, 14);
    assert_eq!(config.database.replica_instances, 1);

    let data = deployment.assembly.topology("AcmeData").unwrap();
    assert!(data.resource("AuroraClusterInstance1").is_some());
    assert!(data.resource("AuroraClusterInstance2").is_none());
}

// ============================================================================
// Engine-derived wiring
// ============================================================================

#[test]
fn mysql_uses_3306_without_auxiliary_port() {
    let deployment = assemble(RawConfig {
        db_engine: Some("mysql".into()),
        ..acme()
    })
    .unwrap();

    assert_eq!(deployment.context.database().unwrap().port(), 3306);
    assert_eq!(ingress_ports(&deployment), vec![3306]);
}

#[test]
fn postgresql_adds_auxiliary_port_per_source() {
    let deployment = assemble(RawConfig {
        db_ingress_sources: Some(vec!["10.1.0.0/16".into(), "sg-0123456789abcdef0".into()]),
        ..acme()
    })
    .unwrap();

    assert_eq!(deployment.context.database().unwrap().port(), 5432);
    assert_eq!(ingress_ports(&deployment), vec![5432, 1433, 5432, 1433]);
}

// ============================================================================
// Optional topologies
// ============================================================================

#[test]
fn email_disabled_injects_no_ses_variable() {
    let deployment = assemble(acme()).unwrap();

    assert!(deployment.context.email().is_none());
    let runtime = deployment.context.runtime().unwrap();
    assert!(!runtime.environment().contains_key(web::env::SES_CREDS_SECRET_ID));
    assert!(runtime.environment().contains_key(web::env::DB_CREDS_SECRET_ID));
}

#[test]
fn host_and_root_serve_https() {
    let deployment = assemble(RawConfig {
        dns_domain_host: Some("app".into()),
        dns_domain_enable_root: Some(true),
        ..acme()
    })
    .unwrap();

    let cert = deployment.context.certificate().unwrap();
    assert_eq!(cert.domains.to_vec(), vec!["app.example.com", "example.com"]);
    assert_eq!(deployment.context.database().unwrap().port(), 5432);
    assert_eq!(deployment.context.config().database.backup_retention_days, 14);
    assert_eq!(deployment.context.config().database.replica_instances, 1);
    assert_eq!(
        deployment.public_url().and_then(Value::as_literal),
        Some("https://app.example.com")
    );
}

#[test]
fn host_only_yields_single_domain() {
    let deployment = assemble(RawConfig {
        dns_domain_host: Some("app".into()),
        ..acme()
    })
    .unwrap();

    let cert = deployment.context.certificate().unwrap();
    assert_eq!(cert.domains.len(), 1);
}

#[test]
fn no_domain_option_falls_back_to_load_balancer() {
    let deployment = assemble(acme()).unwrap();

    assert!(deployment.context.certificate().is_none());
    assert!(deployment.assembly.topology("AcmeCert").is_none());

    let web = deployment.assembly.topology("AcmeWeb").unwrap();
    assert!(web.resource("CloudfrontDistribution").is_none());
    assert!(web.resource("Route53RecordRoot").is_none());
    assert!(web.resource("Route53RecordHost").is_none());

    let url = deployment.public_url().unwrap();
    assert!(url.as_literal().is_none());
    assert!(url.to_string().starts_with("http://"));
}

// ============================================================================
// Assembly invariants
// ============================================================================

#[test]
fn every_foreign_reference_points_backwards() {
    let deployment = assemble(RawConfig {
        dns_domain_host: Some("app".into()),
        ses_email_enabled: Some(true),
        ..acme()
    })
    .unwrap();

    let names = deployment.assembly.names();
    for (position, topology) in deployment.assembly.topologies().iter().enumerate() {
        for reference in topology.foreign_references() {
            let producer = names
                .iter()
                .position(|n| *n == reference.topology)
                .unwrap();
            assert!(producer < position, "{} -> {}", topology.name(), reference);
        }
    }
}
