//! Sample stack configuration written by `tierstack init`.

use tierstack_core::domain::{ConfigError, RawConfig};

use crate::source::ConfigFormat;

/// Default file name of the stack configuration.
pub const DEFAULT_CONFIG_FILE: &str = "stack.config.json";

pub const SAMPLE_CONFIG: &str = r#"{
  "namePrefix": "Acme",
  "region": "us-east-1",
  "maxAzs": 3,
  "dnsDomain": "example.com",
  "dnsDomainHost": "www",
  "dnsDomainEnableRoot": true,
  "dbEngine": "postgresql",
  "dbName": "acme",
  "dbUsername": "dbadmin",
  "dbInstanceType": "t4g.medium",
  "dbReplicaInstances": 1,
  "dbBackupWindow": "03:00-04:00",
  "dbBackupRetentionDays": 14,
  "dbPreferredMaintenanceWindow": "sun:05:00-sun:06:00",
  "dbIngressSources": [],
  "dbEnableBabelfish": false,
  "sesEmailEnabled": false,
  "fargateCpu": 256,
  "fargateMemoryLimit": 512,
  "fargateInstances": 1,
  "ecrRepositoryTag": "latest"
}
"#;

/// The sample document with `namePrefix` replaced.
pub fn sample_config(name_prefix: &str) -> String {
    SAMPLE_CONFIG.replacen(
        r#""namePrefix": "Acme""#,
        &format!(r#""namePrefix": "{name_prefix}""#),
        1,
    )
}

pub fn parse_sample(text: &str) -> Result<RawConfig, ConfigError> {
    ConfigFormat::Json.parse(text)
}
