//! Shared network, image registry and DNS zone.

use crate::domain::config::{DnsSettings, NetworkSettings, Scope};
use crate::domain::entities::resources::{
    HostedZoneSpec, RepositorySpec, SubnetSpec, VpcSpec, attr,
};
use crate::domain::entities::{
    NetworkHandle, OutputRecord, Resource, ResourceId, SubnetRef, Topology, Value, ZoneHandle,
};
use crate::domain::error::DomainError;
use crate::domain::topologies::{Built, names};
use crate::domain::value_objects::SubnetType;

pub const VPC_CIDR: &str = "10.0.0.0/16";

pub fn create(
    scope: &Scope,
    network: &NetworkSettings,
    dns: &DnsSettings,
) -> Result<Built<NetworkHandle>, DomainError> {
    let mut topology = Topology::new(scope.topology_name(names::BASE), scope.region.clone())
        .with_cross_region_references();

    let vpc = topology.add(Resource::new(
        ResourceId::new("Vpc")?,
        VpcSpec {
            cidr_block: VPC_CIDR.into(),
            max_azs: network.max_azs,
            nat_gateways: network.max_azs,
            enable_dns_hostnames: true,
            enable_dns_support: true,
        },
    ))?;

    let mut subnets = Vec::new();
    let layout = [SubnetType::Public, SubnetType::Private]
        .into_iter()
        .flat_map(|t| (1..=network.max_azs).map(move |az| (t, az)));
    for (index, (subnet_type, az)) in layout.enumerate() {
        let cidr = subnet_cidr(index);
        let name = format!("{}-Subnet-{az}", subnet_type.as_str());
        // Subnet names carry separators; ids derived from them must not.
        let local_id = ResourceId::sanitized(&name)?;

        let subnet = topology.add(Resource::new(
            local_id.clone(),
            SubnetSpec {
                vpc_id: vpc.clone().into(),
                subnet_type,
                availability_zone_index: az - 1,
                cidr_block: cidr,
                map_public_ip_on_launch: subnet_type == SubnetType::Public,
                name,
            },
        ))?;

        subnets.push(SubnetRef {
            local_id,
            subnet_type,
            subnet,
        });
    }

    let repository = topology.add(Resource::new(
        ResourceId::new("EcrRepository")?,
        RepositorySpec {
            image_scan_on_push: true,
        },
    ))?;
    let repository_uri = repository.attr(attr::REPOSITORY_URI);

    let zone = topology.add(Resource::new(
        ResourceId::new("Route53Zone")?,
        HostedZoneSpec {
            name: dns.domain.clone(),
        },
    ))?;

    topology.add_output(OutputRecord::exported(
        "OutputEcrImageUrl",
        repository_uri.clone(),
    ))?;
    topology.add_output(OutputRecord::exported(
        "OutputZoneNameServers",
        Value::join_list("\n", zone.attr(attr::NAME_SERVERS)),
    ))?;

    Ok(Built::new(
        topology,
        NetworkHandle {
            vpc,
            subnets,
            repository_uri,
            zone: ZoneHandle {
                zone,
                name: dns.domain.clone(),
            },
        },
    ))
}

/// Consecutive /19 blocks of the VPC range, public subnets first.
fn subnet_cidr(index: usize) -> String {
    format!("10.0.{}.0/19", index * 32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Region;

    fn scope() -> Scope {
        Scope {
            name_prefix: "Acme".into(),
            region: Region::parse("region", "eu-west-2").unwrap(),
        }
    }

    fn dns() -> DnsSettings {
        DnsSettings {
            domain: "example.com".into(),
            host: None,
            enable_root: false,
        }
    }

    #[test]
    fn declares_one_subnet_pair_per_zone() {
        let built = create(&scope(), &NetworkSettings { max_azs: 2 }, &dns()).unwrap();

        assert_eq!(built.topology.name(), "AcmeBase");
        assert_eq!(built.handle.subnets.len(), 4);
        assert_eq!(built.handle.private_subnets().len(), 2);
        assert!(built.topology.resource("PrivateSubnet2").is_some());
        assert!(built.topology.resource("PublicSubnet1").is_some());
        assert!(built.topology.validate().is_ok());
    }

    #[test]
    fn subnet_ids_are_separator_free() {
        let built = create(&scope(), &NetworkSettings { max_azs: 3 }, &dns()).unwrap();
        for subnet in &built.handle.subnets {
            assert!(subnet.local_id.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn subnet_blocks_do_not_overlap() {
        let cidrs: Vec<String> = (0..6).map(subnet_cidr).collect();
        assert_eq!(cidrs[0], "10.0.0.0/19");
        assert_eq!(cidrs[5], "10.0.160.0/19");
    }

    #[test]
    fn emits_registry_and_name_server_outputs() {
        let built = create(&scope(), &NetworkSettings { max_azs: 3 }, &dns()).unwrap();

        let ns = built.topology.output("OutputZoneNameServers").unwrap();
        assert_eq!(ns.export_name.as_deref(), Some("OutputZoneNameServers"));
        assert_eq!(
            ns.value,
            Value::join_list("\n", built.handle.zone.zone.attr(attr::NAME_SERVERS))
        );
        assert!(built.topology.output("OutputEcrImageUrl").is_some());
        assert_eq!(built.handle.zone.name, "example.com");
    }
}
