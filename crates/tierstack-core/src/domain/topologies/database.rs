//! Managed relational cluster, its credentials and the shared filesystem.
//!
//! Engine differences (ports, versions, log exports, Babelfish) come from
//! the engine registry; nothing here branches on the engine name.

use std::collections::BTreeMap;

use crate::domain::config::{DatabaseSettings, Scope};
use crate::domain::engines::{EngineDef, engine_def};
use crate::domain::entities::resources::{
    DatabaseClusterSpec, DatabaseInstanceSpec, EgressRule, FileSystemSpec, IngressRule,
    IngressSource, KmsKeySpec, MountTarget, ParameterGroupSpec, PasswordPolicy,
    RotationScheduleSpec, SecretSpec, SecurityGroupIngressSpec, SecurityGroupSpec, attr,
};
use crate::domain::entities::{
    CredentialHandle, DatabaseHandle, FilesystemHandle, NetworkHandle, OutputRecord, Resource,
    ResourceId, Topology, Value,
};
use crate::domain::error::DomainError;
use crate::domain::topologies::{Built, dashboard, names};
use crate::domain::value_objects::{Peer, PortRange};

/// Characters never used in generated database passwords.
pub const PASSWORD_EXCLUDE_CHARACTERS: &str = "\"@/\\ '";
pub const PASSWORD_LENGTH: u16 = 30;
pub const ROTATION_DAYS: u16 = 30;
pub const LOG_RETENTION_DAYS: u16 = 30;

pub fn create(
    scope: &Scope,
    settings: &DatabaseSettings,
    network: &NetworkHandle,
) -> Result<Built<DatabaseHandle>, DomainError> {
    let engine = engine_def(settings.engine)?;
    let name = scope.topology_name(names::DATA);
    let mut topology = Topology::new(name.clone(), scope.region.clone());

    let vpc = topology.import(&network.vpc);
    let subnets: Vec<(ResourceId, Value)> = network
        .private_subnets()
        .into_iter()
        .map(|s| (s.local_id.clone(), topology.import(&s.subnet)))
        .collect();
    let subnet_ids: Vec<Value> = subnets.iter().map(|(_, v)| v.clone()).collect();

    // ── Security boundary ────────────────────────────────────────────────

    let group = topology.add(Resource::new(
        ResourceId::new("SecurityGroupDB")?,
        SecurityGroupSpec {
            group_name: Some(format!("{name}Database")),
            group_description: format!("{name}Database"),
            vpc_id: vpc.clone(),
            ingress: ingress_rules(engine, &settings.ingress_sources),
            egress: vec![allow_all_out()],
        },
    ))?;
    let group_id = group.attr(attr::GROUP_ID);

    topology.add(Resource::new(
        ResourceId::new("SecurityGroupDBSelfIngress")?,
        SecurityGroupIngressSpec {
            group_id: group_id.clone().into(),
            rule: IngressRule {
                source: IngressSource::SecurityGroup(group_id.clone().into()),
                ports: PortRange::all_traffic(),
                description: "all from self".into(),
            },
        },
    ))?;

    // ── Engine parameters & credentials ──────────────────────────────────

    let mut parameters = BTreeMap::new();
    if let (true, Some((key, value))) = (settings.enable_babelfish, engine.babelfish_parameter) {
        parameters.insert(key.to_string(), value.to_string());
    }
    let parameter_group = topology.add(Resource::new(
        ResourceId::new("AuroraParameterGroup")?,
        ParameterGroupSpec {
            family: engine.parameter_group_family.into(),
            description: format!("{name} Parameter Group"),
            parameters,
        },
    ))?;

    let secret_name = format!("{}-AuroraClusterCredentials", settings.name);
    let secret = topology.add(Resource::new(
        ResourceId::new("SecretAuroraCredentials")?,
        SecretSpec {
            name: secret_name.clone(),
            description: format!("Credentials for the {} Aurora database cluster", settings.name),
            generate_secret_string: Some(PasswordPolicy {
                secret_string_template: format!(r#"{{"username": "{}"}}"#, settings.username),
                generate_string_key: "password".into(),
                exclude_characters: PASSWORD_EXCLUDE_CHARACTERS.into(),
                password_length: PASSWORD_LENGTH,
            }),
            secret_string: None,
        },
    ))?;

    let key = topology.add(Resource::new(
        ResourceId::new("KmsKey")?,
        KmsKeySpec {
            alias: settings.name.clone(),
            description: format!("Storage encryption key for {}", settings.name),
            enable_key_rotation: true,
        },
    ))?;

    // ── Cluster ──────────────────────────────────────────────────────────

    let cluster = topology.add(
        Resource::new(
            ResourceId::new("AuroraCluster")?,
            DatabaseClusterSpec {
                engine: engine.engine_type.into(),
                engine_version: engine.full_version.into(),
                port: engine.port,
                master_user_secret: secret.clone().into(),
                master_username: settings.username.clone(),
                db_cluster_parameter_group_name: parameter_group.into(),
                subnet_ids: subnet_ids.clone(),
                vpc_security_group_ids: vec![group_id.clone().into()],
                backup_retention_period: settings.backup_retention_days,
                preferred_backup_window: settings.backup_window.clone(),
                preferred_maintenance_window: settings.maintenance_window.clone(),
                enable_iam_database_authentication: true,
                storage_encrypted: true,
                kms_key_id: key.attr(attr::ARN).into(),
                deletion_protection: false,
                snapshot_on_delete: true,
                copy_tags_to_snapshot: true,
                enable_cloudwatch_logs_exports: engine
                    .log_exports
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                log_retention_days: LOG_RETENTION_DAYS,
                tags: BTreeMap::from([("Name".to_string(), settings.name.clone())]),
            },
        )
        .retained(),
    )?;

    let mut identifiers = Vec::new();
    let mut instance_endpoints = Vec::new();
    for n in 1..=settings.replica_instances {
        let identifier = format!("{}{n}", settings.name);
        let instance = topology.add(Resource::new(
            ResourceId::new(format!("AuroraClusterInstance{n}"))?,
            DatabaseInstanceSpec {
                db_cluster_identifier: cluster.clone().into(),
                db_instance_identifier: identifier.clone(),
                db_instance_class: instance_class(&settings.instance_type),
                engine: engine.engine_type.into(),
                publicly_accessible: false,
            },
        ))?;
        identifiers.push(identifier);
        instance_endpoints.push(instance.attr(attr::ENDPOINT_ADDRESS));
    }

    topology.add(Resource::new(
        ResourceId::new("AuroraClusterRotationSingleUser")?,
        RotationScheduleSpec {
            secret_id: secret.clone().into(),
            rotation_target: cluster.clone().into(),
            automatically_after_days: ROTATION_DAYS,
            strategy: "single-user".into(),
            exclude_characters: PASSWORD_EXCLUDE_CHARACTERS.into(),
            subnet_ids: subnet_ids.clone(),
        },
    ))?;

    // ── Shared filesystem ────────────────────────────────────────────────

    let fs_group = topology.add(Resource::new(
        ResourceId::new("EfsSecurityGroup")?,
        SecurityGroupSpec {
            group_name: None,
            group_description: format!("{name} shared filesystem"),
            vpc_id: vpc,
            ingress: Vec::new(),
            egress: vec![allow_all_out()],
        },
    ))?;
    let fs_group_id = fs_group.attr(attr::GROUP_ID);

    let mount_targets = subnets
        .into_iter()
        .map(|(local_id, subnet_id)| {
            (
                local_id,
                MountTarget {
                    subnet_id,
                    security_group: fs_group_id.clone().into(),
                },
            )
        })
        .collect();
    let file_system = topology.add(Resource::new(
        ResourceId::new("Efs")?,
        FileSystemSpec {
            encrypted: true,
            mount_targets,
        },
    ))?;

    topology.add(Resource::new(
        ResourceId::new("CloudwatchDashboard")?,
        dashboard::cluster_dashboard(&settings.name, cluster.clone().into()),
    ))?;

    // ── Outputs ──────────────────────────────────────────────────────────

    let cluster_endpoint = cluster.attr(attr::ENDPOINT_ADDRESS);
    let socket_address = Value::join(
        ":",
        vec![
            cluster_endpoint.clone().into(),
            cluster.attr(attr::ENDPOINT_PORT).into(),
        ],
    );

    let export = |suffix: &str| format!("{name}:{suffix}");
    let outputs = [
        ("OutputSecretName", export("SecretName"), Value::literal(&secret_name)),
        ("OutputSecretArn", export("SecretArn"), secret.clone().into()),
        (
            "OutputGetSecretValue",
            export("GetSecretValue"),
            Value::concat(vec![
                "aws secretsmanager get-secret-value --secret-id ".into(),
                secret.clone().into(),
            ]),
        ),
        (
            "OutputInstanceIdentifiers",
            export("InstanceIdentifiers"),
            Value::literal(identifiers.join(",")),
        ),
        (
            "OutputEndpoints",
            export("Endpoints"),
            Value::join(",", instance_endpoints.iter().cloned().map(Value::from).collect()),
        ),
        ("OutputClusterEndpoint", export("Endpoint"), socket_address),
        ("OutputEngineFamily", export("EngineFamily"), engine.engine_family.into()),
        ("OutputEngineType", export("EngineType"), engine.engine_type.into()),
        (
            "OutputEngineFullVersion",
            export("EngineFullVersion"),
            engine.full_version.into(),
        ),
        (
            "OutputEngineMajorVersion",
            export("EngineMajorVersion"),
            engine.major_version.into(),
        ),
        (
            "OutputParameterGroupFamily",
            export("ParameterGroupFamily"),
            engine.parameter_group_family.into(),
        ),
    ];
    for (id, export_name, value) in outputs {
        topology.add_output(OutputRecord::exported_as(id, export_name, value))?;
    }

    let handle = DatabaseHandle {
        cluster,
        cluster_endpoint,
        instance_endpoints,
        security_group: group_id,
        credentials: CredentialHandle {
            name: secret_name,
            secret,
        },
        filesystem: FilesystemHandle {
            file_system,
            security_group: fs_group_id,
            port: FilesystemHandle::NFS_PORT,
        },
        engine: *engine,
    };

    Ok(Built::new(topology, handle))
}

/// One rule per source on the connection port, plus the engine's auxiliary
/// ports for each source.
fn ingress_rules(engine: &EngineDef, sources: &[Peer]) -> Vec<IngressRule> {
    sources
        .iter()
        .flat_map(|peer| {
            let main = IngressRule {
                source: IngressSource::Peer(peer.clone()),
                ports: engine.connection_port(),
                description: engine.connection_label.into(),
            };
            let auxiliary = engine.auxiliary_ports.iter().map(|aux| IngressRule {
                source: IngressSource::Peer(peer.clone()),
                ports: aux.range(),
                description: aux.label.into(),
            });
            std::iter::once(main).chain(auxiliary)
        })
        .collect()
}

fn allow_all_out() -> EgressRule {
    EgressRule {
        destination: Peer::any_ipv4(),
        ports: PortRange::all_traffic(),
        description: "all out".into(),
    }
}

/// `t4g.medium` → `db.t4g.medium`.
fn instance_class(instance_type: &str) -> String {
    if instance_type.starts_with("db.") {
        instance_type.to_string()
    } else {
        format!("db.{instance_type}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::{DnsSettings, NetworkSettings};
    use crate::domain::entities::ResourceSpec;
    use crate::domain::topologies::network;
    use crate::domain::value_objects::{DbEngine, Region};

    fn scope() -> Scope {
        Scope {
            name_prefix: "Acme".into(),
            region: Region::parse("region", "eu-west-2").unwrap(),
        }
    }

    fn settings(engine: DbEngine, sources: &[&str]) -> DatabaseSettings {
        DatabaseSettings {
            engine,
            name: "acme".into(),
            username: "dbadmin".into(),
            instance_type: "t4g.medium".into(),
            replica_instances: 2,
            backup_window: None,
            backup_retention_days: 14,
            maintenance_window: None,
            ingress_sources: sources.iter().map(|s| Peer::parse(s).unwrap()).collect(),
            enable_babelfish: true,
        }
    }

    fn build(engine: DbEngine, sources: &[&str]) -> Built<DatabaseHandle> {
        let net = network::create(
            &scope(),
            &NetworkSettings { max_azs: 3 },
            &DnsSettings {
                domain: "example.com".into(),
                host: None,
                enable_root: false,
            },
        )
        .unwrap();
        create(&scope(), &settings(engine, sources), &net.handle).unwrap()
    }

    fn security_group(built: &Built<DatabaseHandle>) -> SecurityGroupSpec {
        match &built.topology.resource("SecurityGroupDB").unwrap().spec {
            ResourceSpec::SecurityGroup(sg) => sg.clone(),
            other => panic!("unexpected spec {other:?}"),
        }
    }

    // ── Ports ───────────────────────────────────────────────────────────────

    #[test]
    fn mysql_opens_3306_only() {
        let built = build(DbEngine::MySql, &["10.0.0.0/16", "sg-0abc"]);
        let sg = security_group(&built);

        assert_eq!(built.handle.port(), 3306);
        assert_eq!(sg.ingress.len(), 2);
        assert_eq!(sg.ingress_on(3306).count(), 2);
        assert_eq!(sg.ingress_on(1433).count(), 0);
        assert!(sg.ingress.iter().all(|r| r.description == "tcp3306 MySQL"));
    }

    #[test]
    fn postgresql_adds_1433_per_source() {
        let built = build(DbEngine::PostgreSql, &["10.0.0.0/16", "pl-1234"]);
        let sg = security_group(&built);

        assert_eq!(built.handle.port(), 5432);
        assert_eq!(sg.ingress_on(5432).count(), 2);
        assert_eq!(sg.ingress_on(1433).count(), 2);
        assert_eq!(sg.ingress[1].description, "tcp1433");
    }

    #[test]
    fn no_sources_means_no_ingress_rules() {
        let built = build(DbEngine::PostgreSql, &[]);
        assert!(security_group(&built).ingress.is_empty());
        // The self rule is declared separately.
        assert!(built.topology.resource("SecurityGroupDBSelfIngress").is_some());
    }

    // ── Engine data ─────────────────────────────────────────────────────────

    #[test]
    fn babelfish_only_applies_to_postgresql() {
        let params = |built: &Built<DatabaseHandle>| match &built
            .topology
            .resource("AuroraParameterGroup")
            .unwrap()
            .spec
        {
            ResourceSpec::ParameterGroup(pg) => pg.parameters.clone(),
            other => panic!("unexpected spec {other:?}"),
        };

        let pg = build(DbEngine::PostgreSql, &[]);
        assert_eq!(
            params(&pg).get("rds.babelfish_status").map(String::as_str),
            Some("on")
        );
        assert!(params(&build(DbEngine::MySql, &[])).is_empty());
    }

    #[test]
    fn cluster_is_retained_and_encrypted() {
        let built = build(DbEngine::MySql, &[]);
        let cluster = built.topology.resource("AuroraCluster").unwrap();
        assert!(cluster.retain_on_teardown);

        match &cluster.spec {
            ResourceSpec::DatabaseCluster(c) => {
                assert_eq!(c.engine, "aurora-mysql");
                assert_eq!(c.enable_cloudwatch_logs_exports, vec!["slowquery"]);
                assert!(c.storage_encrypted);
                assert!(c.snapshot_on_delete);
                assert!(!c.deletion_protection);
                assert_eq!(c.backup_retention_period, 14);
                assert_eq!(c.subnet_ids.len(), 3);
            }
            other => panic!("unexpected spec {other:?}"),
        }
    }

    #[test]
    fn secret_uses_password_policy() {
        let built = build(DbEngine::PostgreSql, &[]);
        match &built.topology.resource("SecretAuroraCredentials").unwrap().spec {
            ResourceSpec::Secret(s) => {
                assert_eq!(s.name, "acme-AuroraClusterCredentials");
                let policy = s.generate_secret_string.as_ref().unwrap();
                assert_eq!(policy.exclude_characters, "\"@/\\ '");
                assert_eq!(policy.password_length, 30);
                assert_eq!(policy.secret_string_template, r#"{"username": "dbadmin"}"#);
            }
            other => panic!("unexpected spec {other:?}"),
        }
        assert_eq!(built.handle.credentials.name, "acme-AuroraClusterCredentials");
    }

    #[test]
    fn one_instance_per_replica() {
        let built = build(DbEngine::PostgreSql, &[]);
        assert_eq!(built.handle.instance_endpoints.len(), 2);
        assert!(built.topology.resource("AuroraClusterInstance2").is_some());
        assert_eq!(
            built
                .topology
                .output("OutputInstanceIdentifiers")
                .unwrap()
                .value
                .as_literal(),
            Some("acme1,acme2")
        );
    }

    #[test]
    fn mount_targets_use_sanitized_subnet_ids() {
        let built = build(DbEngine::PostgreSql, &[]);
        match &built.topology.resource("Efs").unwrap().spec {
            ResourceSpec::FileSystem(fs) => {
                let keys: Vec<&str> = fs.mount_targets.keys().map(|k| k.as_str()).collect();
                assert_eq!(
                    keys,
                    vec!["PrivateSubnet1", "PrivateSubnet2", "PrivateSubnet3"]
                );
            }
            other => panic!("unexpected spec {other:?}"),
        }
    }

    #[test]
    fn outputs_are_exported_under_topology_name() {
        let built = build(DbEngine::PostgreSql, &[]);
        let name = built.topology.output("OutputSecretName").unwrap();
        assert_eq!(name.export_name.as_deref(), Some("AcmeData:SecretName"));
        assert_eq!(name.value.as_literal(), Some("acme-AuroraClusterCredentials"));

        let family = built.topology.output("OutputEngineFamily").unwrap();
        assert_eq!(family.value.as_literal(), Some("POSTGRESQL"));
        assert_eq!(
            built
                .topology
                .output("OutputInstanceIdentifiers")
                .unwrap()
                .export_name
                .as_deref(),
            Some("AcmeData:InstanceIdentifiers")
        );
        assert_eq!(built.topology.outputs().len(), 11);
    }

    #[test]
    fn topology_depends_on_network_only() {
        let built = build(DbEngine::MySql, &[]);
        assert_eq!(built.topology.dependencies(), &["AcmeBase".to_string()]);
        assert!(built.topology.validate().is_ok());
    }
}
