//! TLS certificate for the CDN, always issued in the CDN's home region.

use crate::domain::config::{DnsSettings, Scope};
use crate::domain::entities::resources::CertificateSpec;
use crate::domain::entities::{
    CertificateHandle, DomainList, Resource, ResourceId, Topology, ZoneHandle,
};
use crate::domain::error::DomainError;
use crate::domain::topologies::{Built, names};
use crate::domain::value_objects::Region;

/// Fails with `NoDomainConfigured` when neither a host nor the root domain
/// is requested. Callers that treat the certificate as optional check
/// `DnsSettings::wants_certificate` first.
pub fn create(
    scope: &Scope,
    dns: &DnsSettings,
    zone: &ZoneHandle,
) -> Result<Built<CertificateHandle>, DomainError> {
    let domains = DomainList::from_dns(dns)?;

    let mut topology = Topology::new(scope.topology_name(names::CERT), Region::cdn_home())
        .with_cross_region_references();
    let validation_zone = topology.import(&zone.zone);

    let certificate = topology.add(Resource::new(
        ResourceId::new("AcmCertificate")?,
        CertificateSpec {
            domain_name: domains.primary.clone(),
            subject_alternative_names: domains.alternate.iter().cloned().collect(),
            certificate_name: format!("SSL certificate for {}", domains.to_vec().join(", ")),
            validation_method: "DNS".into(),
            validation_zone,
        },
    ))?;

    Ok(Built::new(
        topology,
        CertificateHandle {
            certificate,
            domains,
        },
    ))
}
