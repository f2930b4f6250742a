//! Outbound mail credentials, declared only when enabled.

use crate::domain::config::{EmailSettings, Scope};
use crate::domain::entities::resources::{
    IamPolicySpec, IamUserSpec, PolicyAttachment, PolicyStatement, SecretSpec,
    SmtpCredentialsSpec,
};
use crate::domain::entities::{CredentialHandle, OutputRecord, Resource, ResourceId, Topology};
use crate::domain::error::DomainError;
use crate::domain::topologies::{Built, names};

pub const SEND_ACTIONS: &[&str] = &["ses:SendRawEmail"];

/// `None` when email is disabled; nothing is declared in that case.
pub fn create(
    scope: &Scope,
    settings: &EmailSettings,
) -> Result<Option<Built<CredentialHandle>>, DomainError> {
    if !settings.enabled {
        return Ok(None);
    }

    let mut topology = Topology::new(scope.topology_name(names::EMAIL), scope.region.clone());
    let user_name = format!("{}SesEmailSender", scope.name_prefix);

    let user = topology.add(Resource::new(
        ResourceId::new("User")?,
        IamUserSpec {
            user_name: user_name.clone(),
        },
    ))?;

    topology.add(Resource::new(
        ResourceId::new("UserSendPolicy")?,
        IamPolicySpec {
            policy_name: format!("{user_name}Send"),
            attach_to: PolicyAttachment::User(user.clone().into()),
            statements: vec![PolicyStatement::allow(SEND_ACTIONS, vec!["*".into()])],
        },
    ))?;

    let credentials = topology.add(Resource::new(
        ResourceId::new("SmtpCredentials")?,
        SmtpCredentialsSpec {
            user: user.into(),
            region: scope.region.to_string(),
        },
    ))?;

    let secret_name = format!("{}-SesSmtpCredentials", scope.name_prefix);
    let secret = topology.add(Resource::new(
        ResourceId::new("SmtpCredentialsSecret")?,
        SecretSpec {
            name: secret_name.clone(),
            description: format!("SES SMTP credentials for {user_name}"),
            generate_secret_string: None,
            secret_string: Some(credentials.attr("Credentials").into()),
        },
    ))?;

    topology.add_output(OutputRecord::exported("OutputEmailSecretArn", secret.clone()))?;

    Ok(Some(Built::new(
        topology,
        CredentialHandle {
            name: secret_name,
            secret,
        },
    )))
}
