//! Public web tier: container service, CDN front and DNS records.

use std::collections::BTreeMap;

use crate::domain::config::{DnsSettings, Scope, WebSettings};
use crate::domain::entities::resources::{
    AliasRecordSpec, CacheBehavior, ComputeClusterSpec, Connection, CustomOrigin,
    DistributionSpec, IamPolicySpec, IngressRule, IngressSource, LoadBalancedServiceSpec,
    PolicyAttachment, SecurityGroupIngressSpec, ViewerCertificate, VolumeMount, attr,
};
use crate::domain::entities::{
    CertificateHandle, CredentialHandle, DatabaseHandle, NetworkHandle, OutputRecord, Reference,
    Resource, ResourceId, RuntimeHandle, Topology, Value, ZoneHandle,
};
use crate::domain::error::DomainError;
use crate::domain::topologies::{Built, names};
use crate::domain::value_objects::PortRange;

/// Environment contract of the application container.
pub mod env {
    pub const DB_CREDS_SECRET_ID: &str = "DB_CREDS_SECRET_ID";
    pub const SES_CREDS_SECRET_ID: &str = "SES_CREDS_SECRET_ID";
    pub const BASE_URL: &str = "DRUSH_OPTIONS_URI";
    pub const TRUSTED_HOSTS: &str = "DRUPAL_TRUSTED_HOSTS";
}

pub const OUTPUT_WEB_URL: &str = "OutputWebUrl";

pub const HEALTH_CHECK_GRACE_SECONDS: u32 = 180;
pub const HEALTHY_HTTP_CODES: &str = "200-399";
pub const SHARED_VOLUME: &str = "appfiles";
pub const SHARED_VOLUME_PATH: &str = "/mnt/efs";
pub const REGISTRY_PULL_POLICY: &str = "AmazonEC2ContainerRegistryPowerUser";
pub const CACHE_TTL_SECONDS: u32 = 30 * 24 * 60 * 60;
pub const ORIGIN_CONNECT_TIMEOUT_SECONDS: u32 = 3;
pub const ORIGIN_KEEPALIVE_SECONDS: u32 = 30;

/// Upstream handles the web tier consumes.
#[derive(Debug, Clone, Copy)]
pub struct WebInputs<'a> {
    pub scope: &'a Scope,
    pub dns: &'a DnsSettings,
    pub settings: &'a WebSettings,
    pub network: &'a NetworkHandle,
    pub database: &'a DatabaseHandle,
    pub email: Option<&'a CredentialHandle>,
    pub certificate: Option<&'a CertificateHandle>,
}

pub fn create(inputs: WebInputs<'_>) -> Result<Built<RuntimeHandle>, DomainError> {
    let WebInputs {
        scope,
        dns,
        settings,
        network,
        database,
        email,
        certificate,
    } = inputs;

    let name = scope.topology_name(names::WEB);
    let mut topology =
        Topology::new(name.clone(), scope.region.clone()).with_cross_region_references();

    let vpc = topology.import(&network.vpc);
    let cluster = topology.add(Resource::new(
        ResourceId::new("EcsCluster")?,
        ComputeClusterSpec { vpc_id: vpc },
    ))?;

    let image = Value::concat(vec![
        topology.import(&network.repository_uri),
        Value::literal(format!(":{}", settings.image_tag)),
    ]);
    let subnet_ids = network
        .private_subnets()
        .into_iter()
        .map(|s| topology.import(&s.subnet))
        .collect();

    let spec = LoadBalancedServiceSpec {
        cluster: cluster.clone().into(),
        image,
        cpu: settings.cpu,
        memory_limit_mib: settings.memory_limit,
        desired_count: settings.instances,
        public_load_balancer: true,
        health_check_grace_period_seconds: HEALTH_CHECK_GRACE_SECONDS,
        healthy_http_codes: HEALTHY_HTTP_CODES.into(),
        subnet_ids,
        execution_role_managed_policies: Vec::new(),
        volumes: Vec::new(),
        connections: Vec::new(),
        environment: BTreeMap::new(),
        log_group_name: format!("/ecs/{name}"),
    };
    let mut runtime = RuntimeHandle::new(
        &topology,
        ResourceId::new("EcsFargateAlb")?,
        spec,
        cluster.clone(),
    );

    runtime.add_execution_policy(REGISTRY_PULL_POLICY);

    let file_system = topology.import(&database.filesystem.file_system);
    runtime.mount(VolumeMount {
        volume_name: SHARED_VOLUME.into(),
        file_system_id: file_system,
        container_path: SHARED_VOLUME_PATH.into(),
        read_only: false,
    });

    allow_to(
        &mut topology,
        &mut runtime,
        "RdsIngressFromService",
        &database.security_group,
        database.port(),
        "RDS Instance",
    )?;
    allow_to(
        &mut topology,
        &mut runtime,
        "EfsIngressFromService",
        &database.filesystem.security_group,
        database.filesystem.port,
        "EFS Filesystem",
    )?;

    grant_secret(
        &mut topology,
        &mut runtime,
        "PolicyGetAuroraCredentials",
        &database.credentials,
        env::DB_CREDS_SECRET_ID,
    )?;
    if let Some(email) = email {
        grant_secret(
            &mut topology,
            &mut runtime,
            "PolicyGetSesCredentials",
            email,
            env::SES_CREDS_SECRET_ID,
        )?;
    }

    let lb_dns: Value = runtime.load_balancer_dns.clone().into();
    let public_url = match certificate {
        Some(cert) => {
            front_with_cdn(&mut topology, scope, dns, settings, &network.zone, cert, &runtime)?;
            Value::literal(format!("https://{}", cert.domains.primary))
        }
        None => Value::concat(vec!["http://".into(), lb_dns.clone()]),
    };

    runtime.set_env(env::BASE_URL, public_url.clone());
    runtime.set_env(
        env::TRUSTED_HOSTS,
        Value::concat(vec!["^".into(), lb_dns, "$".into()]),
    );
    runtime.finalize(&mut topology)?;

    topology.add_output(OutputRecord::exported(OUTPUT_WEB_URL, public_url))?;
    topology.add_output(OutputRecord::exported(
        "OutputEcsClusterArn",
        cluster.attr(attr::ARN),
    ))?;
    topology.add_output(OutputRecord::exported(
        "OutputEcsServiceArn",
        runtime.service.clone(),
    ))?;
    topology.add_output(OutputRecord::exported(
        "OutputEcsTaskLogGroup",
        runtime.log_group(),
    ))?;

    Ok(Built::new(topology, runtime))
}

/// Open `port` on a foreign security group to the service.
fn allow_to(
    topology: &mut Topology,
    runtime: &mut RuntimeHandle,
    rule_id: &str,
    group: &Reference,
    port: u16,
    description: &str,
) -> Result<(), DomainError> {
    let target = topology.import(group);
    runtime.connect(Connection {
        target_group: target.clone(),
        port,
        description: description.into(),
    });
    topology.add(Resource::new(
        ResourceId::new(rule_id)?,
        SecurityGroupIngressSpec {
            group_id: target,
            rule: IngressRule {
                source: IngressSource::SecurityGroup(runtime.service_security_group.clone().into()),
                ports: PortRange::tcp(port),
                description: description.into(),
            },
        },
    ))?;
    Ok(())
}

/// Let the task read a secret and tell it the secret's name.
fn grant_secret(
    topology: &mut Topology,
    runtime: &mut RuntimeHandle,
    policy_id: &str,
    credentials: &CredentialHandle,
    env_key: &str,
) -> Result<(), DomainError> {
    let statement = credentials.retrieval_statement(topology);
    topology.add(Resource::new(
        ResourceId::new(policy_id)?,
        IamPolicySpec {
            policy_name: format!("{}{policy_id}", topology.name()),
            attach_to: PolicyAttachment::Role(runtime.task_role.clone().into()),
            statements: vec![statement],
        },
    ))?;
    runtime.set_env(env_key, credentials.name.as_str());
    Ok(())
}

fn front_with_cdn(
    topology: &mut Topology,
    scope: &Scope,
    dns: &DnsSettings,
    settings: &WebSettings,
    zone: &ZoneHandle,
    certificate: &CertificateHandle,
    runtime: &RuntimeHandle,
) -> Result<(), DomainError> {
    let certificate_arn = topology.import(&certificate.certificate);
    let origin_shield_region = settings
        .origin_shield_region
        .as_ref()
        .unwrap_or(&scope.region)
        .to_string();

    let distribution = topology.add(Resource::new(
        ResourceId::new("CloudfrontDistribution")?,
        DistributionSpec {
            enabled: true,
            ipv6_enabled: true,
            http_version: "http2and3".into(),
            origin: CustomOrigin {
                domain_name: runtime.load_balancer_dns.clone().into(),
                origin_protocol_policy: "http-only".into(),
                origin_ssl_protocols: vec!["SSLv3".into()],
                origin_keepalive_timeout_seconds: ORIGIN_KEEPALIVE_SECONDS,
                connection_timeout_seconds: ORIGIN_CONNECT_TIMEOUT_SECONDS,
                origin_shield_region,
            },
            default_cache_behavior: CacheBehavior {
                allowed_methods: ["GET", "HEAD", "OPTIONS", "PUT", "PATCH", "POST", "DELETE"]
                    .map(String::from)
                    .to_vec(),
                cached_methods: ["GET", "HEAD", "OPTIONS"].map(String::from).to_vec(),
                compress: true,
                default_ttl_seconds: CACHE_TTL_SECONDS,
                forward_query_string: true,
                forward_cookies: "all".into(),
                viewer_protocol_policy: "redirect-to-https".into(),
            },
            viewer_certificate: ViewerCertificate {
                certificate_arn,
                aliases: certificate.domains.to_vec(),
                ssl_support_method: "sni-only".into(),
            },
        },
    ))?;
    let target: Value = distribution.attr(attr::DOMAIN_NAME).into();

    let mut records = Vec::new();
    if dns.enable_root {
        records.push(("Route53RecordRoot", dns.domain.clone()));
    }
    if let Some(host) = &dns.host {
        records.push(("Route53RecordHost", format!("{host}.{}", dns.domain)));
    }

    let zone_id = topology.import(&zone.zone);
    for (id, record_name) in records {
        topology.add(Resource::new(
            ResourceId::new(id)?,
            AliasRecordSpec {
                hosted_zone_id: zone_id.clone(),
                name: record_name,
                record_type: "A".into(),
                alias_target: target.clone(),
            },
        ))?;
    }
    Ok(())
}
