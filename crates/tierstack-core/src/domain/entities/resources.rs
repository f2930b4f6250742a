//! Typed resource declarations.
//!
//! Every resource a topology can declare is one variant of [`ResourceSpec`].
//! Properties that may point at another resource are [`Value`]s; everything
//! else is plain data. The serde form (`Type` + `Properties`) is what the
//! renderer turns into a template.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::entities::common::{ResourceId, Value};
use crate::domain::value_objects::{Peer, PortRange, SubnetType};

/// Attribute names used in references.
pub mod attr {
    /// The resource's primary identifier.
    pub const REF: &str = "Ref";
    pub const ARN: &str = "Arn";
    pub const GROUP_ID: &str = "GroupId";
    pub const REPOSITORY_URI: &str = "RepositoryUri";
    pub const NAME_SERVERS: &str = "NameServers";
    pub const ENDPOINT_ADDRESS: &str = "Endpoint.Address";
    pub const ENDPOINT_PORT: &str = "Endpoint.Port";
    pub const LOAD_BALANCER_DNS: &str = "LoadBalancerDnsName";
    pub const SECURITY_GROUP_ID: &str = "SecurityGroupId";
    pub const DOMAIN_NAME: &str = "DomainName";
}

// ── Envelope ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: ResourceId,
    pub spec: ResourceSpec,
    /// Keep the physical resource when its topology is torn down.
    pub retain_on_teardown: bool,
}

impl Resource {
    pub fn new(id: ResourceId, spec: impl Into<ResourceSpec>) -> Self {
        Self {
            id,
            spec: spec.into(),
            retain_on_teardown: false,
        }
    }

    pub fn retained(mut self) -> Self {
        self.retain_on_teardown = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "Type", content = "Properties")]
pub enum ResourceSpec {
    #[serde(rename = "AWS::EC2::VPC")]
    Vpc(VpcSpec),
    #[serde(rename = "AWS::EC2::Subnet")]
    Subnet(SubnetSpec),
    #[serde(rename = "AWS::ECR::Repository")]
    Repository(RepositorySpec),
    #[serde(rename = "AWS::Route53::HostedZone")]
    HostedZone(HostedZoneSpec),
    #[serde(rename = "AWS::EC2::SecurityGroup")]
    SecurityGroup(SecurityGroupSpec),
    #[serde(rename = "AWS::EC2::SecurityGroupIngress")]
    SecurityGroupIngress(SecurityGroupIngressSpec),
    #[serde(rename = "AWS::RDS::DBClusterParameterGroup")]
    ParameterGroup(ParameterGroupSpec),
    #[serde(rename = "AWS::SecretsManager::Secret")]
    Secret(SecretSpec),
    #[serde(rename = "AWS::KMS::Key")]
    KmsKey(KmsKeySpec),
    #[serde(rename = "AWS::RDS::DBCluster")]
    DatabaseCluster(DatabaseClusterSpec),
    #[serde(rename = "AWS::RDS::DBInstance")]
    DatabaseInstance(DatabaseInstanceSpec),
    #[serde(rename = "AWS::SecretsManager::RotationSchedule")]
    RotationSchedule(RotationScheduleSpec),
    #[serde(rename = "AWS::EFS::FileSystem")]
    FileSystem(FileSystemSpec),
    #[serde(rename = "AWS::CloudWatch::Dashboard")]
    Dashboard(DashboardSpec),
    #[serde(rename = "AWS::IAM::User")]
    IamUser(IamUserSpec),
    #[serde(rename = "AWS::IAM::Policy")]
    IamPolicy(IamPolicySpec),
    #[serde(rename = "Custom::SesSmtpCredentials")]
    SmtpCredentials(SmtpCredentialsSpec),
    #[serde(rename = "AWS::CertificateManager::Certificate")]
    Certificate(CertificateSpec),
    #[serde(rename = "AWS::ECS::Cluster")]
    ComputeCluster(ComputeClusterSpec),
    #[serde(rename = "Custom::ApplicationLoadBalancedFargateService")]
    LoadBalancedService(LoadBalancedServiceSpec),
    #[serde(rename = "AWS::CloudFront::Distribution")]
    Distribution(DistributionSpec),
    #[serde(rename = "AWS::Route53::RecordSet")]
    AliasRecord(AliasRecordSpec),
}

impl ResourceSpec {
    /// Provider type name, as written in templates.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Vpc(_) => "AWS::EC2::VPC",
            Self::Subnet(_) => "AWS::EC2::Subnet",
            Self::Repository(_) => "AWS::ECR::Repository",
            Self::HostedZone(_) => "AWS::Route53::HostedZone",
            Self::SecurityGroup(_) => "AWS::EC2::SecurityGroup",
            Self::SecurityGroupIngress(_) => "AWS::EC2::SecurityGroupIngress",
            Self::ParameterGroup(_) => "AWS::RDS::DBClusterParameterGroup",
            Self::Secret(_) => "AWS::SecretsManager::Secret",
            Self::KmsKey(_) => "AWS::KMS::Key",
            Self::DatabaseCluster(_) => "AWS::RDS::DBCluster",
            Self::DatabaseInstance(_) => "AWS::RDS::DBInstance",
            Self::RotationSchedule(_) => "AWS::SecretsManager::RotationSchedule",
            Self::FileSystem(_) => "AWS::EFS::FileSystem",
            Self::Dashboard(_) => "AWS::CloudWatch::Dashboard",
            Self::IamUser(_) => "AWS::IAM::User",
            Self::IamPolicy(_) => "AWS::IAM::Policy",
            Self::SmtpCredentials(_) => "Custom::SesSmtpCredentials",
            Self::Certificate(_) => "AWS::CertificateManager::Certificate",
            Self::ComputeCluster(_) => "AWS::ECS::Cluster",
            Self::LoadBalancedService(_) => "Custom::ApplicationLoadBalancedFargateService",
            Self::Distribution(_) => "AWS::CloudFront::Distribution",
            Self::AliasRecord(_) => "AWS::Route53::RecordSet",
        }
    }
}

macro_rules! impl_into_spec {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ResourceSpec {
                fn from(spec: $ty) -> Self {
                    Self::$variant(spec)
                }
            }
        )*
    };
}

impl_into_spec! {
    Vpc => VpcSpec,
    Subnet => SubnetSpec,
    Repository => RepositorySpec,
    HostedZone => HostedZoneSpec,
    SecurityGroup => SecurityGroupSpec,
    SecurityGroupIngress => SecurityGroupIngressSpec,
    ParameterGroup => ParameterGroupSpec,
    Secret => SecretSpec,
    KmsKey => KmsKeySpec,
    DatabaseCluster => DatabaseClusterSpec,
    DatabaseInstance => DatabaseInstanceSpec,
    RotationSchedule => RotationScheduleSpec,
    FileSystem => FileSystemSpec,
    Dashboard => DashboardSpec,
    IamUser => IamUserSpec,
    IamPolicy => IamPolicySpec,
    SmtpCredentials => SmtpCredentialsSpec,
    Certificate => CertificateSpec,
    ComputeCluster => ComputeClusterSpec,
    LoadBalancedService => LoadBalancedServiceSpec,
    Distribution => DistributionSpec,
    AliasRecord => AliasRecordSpec,
}

// ── Network ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VpcSpec {
    pub cidr_block: String,
    pub max_azs: u8,
    pub nat_gateways: u8,
    pub enable_dns_hostnames: bool,
    pub enable_dns_support: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubnetSpec {
    pub vpc_id: Value,
    pub subnet_type: SubnetType,
    pub availability_zone_index: u8,
    pub cidr_block: String,
    pub map_public_ip_on_launch: bool,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RepositorySpec {
    pub image_scan_on_push: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostedZoneSpec {
    pub name: String,
}

/// Where an ingress rule accepts traffic from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum IngressSource {
    Peer(Peer),
    SecurityGroup(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct IngressRule {
    pub source: IngressSource,
    pub ports: PortRange,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EgressRule {
    pub destination: Peer,
    pub ports: PortRange,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecurityGroupSpec {
    pub group_name: Option<String>,
    pub group_description: String,
    pub vpc_id: Value,
    pub ingress: Vec<IngressRule>,
    pub egress: Vec<EgressRule>,
}

impl SecurityGroupSpec {
    pub fn ingress_on(&self, port: u16) -> impl Iterator<Item = &IngressRule> {
        self.ingress
            .iter()
            .filter(move |r| r.ports.from <= port && port <= r.ports.to)
    }
}

/// An ingress rule declared apart from its group, e.g. self-referencing rules
/// or rules added by a consumer in another topology.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecurityGroupIngressSpec {
    pub group_id: Value,
    pub rule: IngressRule,
}

// ── Data ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParameterGroupSpec {
    pub family: String,
    pub description: String,
    pub parameters: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PasswordPolicy {
    pub secret_string_template: String,
    pub generate_string_key: String,
    pub exclude_characters: String,
    pub password_length: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecretSpec {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generate_secret_string: Option<PasswordPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_string: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct KmsKeySpec {
    pub alias: String,
    pub description: String,
    pub enable_key_rotation: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DatabaseClusterSpec {
    pub engine: String,
    pub engine_version: String,
    pub port: u16,
    pub master_user_secret: Value,
    pub master_username: String,
    pub db_cluster_parameter_group_name: Value,
    pub subnet_ids: Vec<Value>,
    pub vpc_security_group_ids: Vec<Value>,
    pub backup_retention_period: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_backup_window: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_maintenance_window: Option<String>,
    pub enable_iam_database_authentication: bool,
    pub storage_encrypted: bool,
    pub kms_key_id: Value,
    pub deletion_protection: bool,
    /// Take a final snapshot when the cluster is deleted.
    pub snapshot_on_delete: bool,
    pub copy_tags_to_snapshot: bool,
    pub enable_cloudwatch_logs_exports: Vec<String>,
    pub log_retention_days: u16,
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DatabaseInstanceSpec {
    pub db_cluster_identifier: Value,
    pub db_instance_identifier: String,
    pub db_instance_class: String,
    pub engine: String,
    pub publicly_accessible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RotationScheduleSpec {
    pub secret_id: Value,
    pub rotation_target: Value,
    pub automatically_after_days: u16,
    /// Hosted rotation strategy, e.g. `single-user`.
    pub strategy: String,
    pub exclude_characters: String,
    pub subnet_ids: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MountTarget {
    pub subnet_id: Value,
    pub security_group: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FileSystemSpec {
    pub encrypted: bool,
    pub mount_targets: BTreeMap<ResourceId, MountTarget>,
}

/// One metric line on a graph widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Metric {
    pub namespace: String,
    pub metric_name: String,
    pub dimensions: BTreeMap<String, Value>,
    pub statistic: String,
    pub period_seconds: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GraphWidget {
    pub title: String,
    pub left: Vec<Metric>,
    pub width: u8,
    pub height: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DashboardSpec {
    pub dashboard_name: String,
    pub rows: Vec<Vec<GraphWidget>>,
}

impl DashboardSpec {
    pub fn widgets(&self) -> impl Iterator<Item = &GraphWidget> {
        self.rows.iter().flatten()
    }
}

// ── Identity ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct IamUserSpec {
    pub user_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    pub effect: String,
    pub actions: Vec<String>,
    pub resources: Vec<Value>,
}

impl PolicyStatement {
    pub fn allow(actions: &[&str], resources: Vec<Value>) -> Self {
        Self {
            effect: "Allow".into(),
            actions: actions.iter().map(|a| a.to_string()).collect(),
            resources,
        }
    }
}

/// Principal a policy is attached to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum PolicyAttachment {
    User(Value),
    Role(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct IamPolicySpec {
    pub policy_name: String,
    pub attach_to: PolicyAttachment,
    pub statements: Vec<PolicyStatement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SmtpCredentialsSpec {
    pub user: Value,
    pub region: String,
}

// ── Edge ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CertificateSpec {
    pub domain_name: String,
    pub subject_alternative_names: Vec<String>,
    pub certificate_name: String,
    pub validation_method: String,
    pub validation_zone: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ComputeClusterSpec {
    pub vpc_id: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VolumeMount {
    pub volume_name: String,
    pub file_system_id: Value,
    pub container_path: String,
    pub read_only: bool,
}

/// Outbound path from the service to another security group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Connection {
    pub target_group: Value,
    pub port: u16,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoadBalancedServiceSpec {
    pub cluster: Value,
    pub image: Value,
    pub cpu: u32,
    pub memory_limit_mib: u32,
    pub desired_count: u32,
    pub public_load_balancer: bool,
    pub health_check_grace_period_seconds: u32,
    pub healthy_http_codes: String,
    pub subnet_ids: Vec<Value>,
    pub execution_role_managed_policies: Vec<String>,
    pub volumes: Vec<VolumeMount>,
    pub connections: Vec<Connection>,
    pub environment: BTreeMap<String, Value>,
    pub log_group_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CacheBehavior {
    pub allowed_methods: Vec<String>,
    pub cached_methods: Vec<String>,
    pub compress: bool,
    pub default_ttl_seconds: u32,
    pub forward_query_string: bool,
    pub forward_cookies: String,
    pub viewer_protocol_policy: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomOrigin {
    pub domain_name: Value,
    pub origin_protocol_policy: String,
    pub origin_ssl_protocols: Vec<String>,
    pub origin_keepalive_timeout_seconds: u32,
    pub connection_timeout_seconds: u32,
    pub origin_shield_region: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ViewerCertificate {
    pub certificate_arn: Value,
    pub aliases: Vec<String>,
    pub ssl_support_method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DistributionSpec {
    pub enabled: bool,
    pub ipv6_enabled: bool,
    pub http_version: String,
    pub origin: CustomOrigin,
    pub default_cache_behavior: CacheBehavior,
    pub viewer_certificate: ViewerCertificate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AliasRecordSpec {
    pub hosted_zone_id: Value,
    /// Fully qualified record name.
    pub name: String,
    pub record_type: String,
    pub alias_target: Value,
}
