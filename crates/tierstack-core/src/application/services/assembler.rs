//! Topology assembler - composes the five builders in dependency order.
//!
//! Base → Data → Email? → Cert? → Web. Each builder receives only the
//! configuration slices and handles it needs; the context accumulates
//! handles between steps and is returned alongside the assembly.

use tracing::{debug, info, instrument, warn};

use crate::{
    domain::{
        Built, CloudAssembly, DbEngine, OutputRecord, TopologyContext, ValidatedConfig, Value,
        topologies::{certificate, database, email, names, network, web},
    },
    error::TierstackResult,
};

/// A composed deployment: the checked assembly plus every handle produced.
#[derive(Debug, Clone)]
pub struct Deployment {
    pub assembly: CloudAssembly,
    pub context: TopologyContext,
}

impl Deployment {
    /// Base URL the site is reachable at.
    pub fn public_url(&self) -> Option<&Value> {
        let web = self
            .context
            .config()
            .scope
            .topology_name(names::WEB);
        self.assembly
            .topology(&web)
            .and_then(|t| t.output(web::OUTPUT_WEB_URL))
            .map(|o| &o.value)
    }

    /// `(topology, output)` pairs in declaration order.
    pub fn outputs(&self) -> impl Iterator<Item = (&str, &OutputRecord)> {
        self.assembly.outputs().map(|(t, o)| (t.name(), o))
    }
}

pub struct TopologyAssembler;

impl TopologyAssembler {
    #[instrument(
        skip_all,
        fields(
            prefix = %config.scope.name_prefix,
            region = %config.scope.region,
            engine = %config.database.engine
        )
    )]
    pub fn assemble(config: &ValidatedConfig) -> TierstackResult<Deployment> {
        info!("Assembling topologies");

        if config.database.enable_babelfish && config.database.engine == DbEngine::MySql {
            warn!("dbEnableBabelfish is only honoured for postgresql; ignoring");
        }

        let mut assembly = CloudAssembly::new();
        let ctx = TopologyContext::new(config.clone());

        let base = network::create(&config.scope, &config.network, &config.dns)?;
        let ctx = ctx.with_network(declare(&mut assembly, base));

        let data = database::create(&config.scope, &config.database, ctx.network()?)?;
        debug!(port = data.handle.port(), "Database port derived from engine");
        let ctx = ctx.with_database(declare(&mut assembly, data));

        let mail = email::create(&config.scope, &config.email)?;
        let ctx = ctx.with_email(match mail {
            Some(built) => Some(declare(&mut assembly, built)),
            None => {
                debug!("SES email disabled; skipping email topology");
                None
            }
        });

        let cert = if config.dns.wants_certificate() {
            let built = certificate::create(&config.scope, &config.dns, &ctx.network()?.zone)?;
            Some(declare(&mut assembly, built))
        } else {
            debug!("No host or root domain; site is served over plain HTTP");
            None
        };
        let ctx = ctx.with_certificate(cert);

        let site = web::create(web::WebInputs {
            scope: &config.scope,
            dns: &config.dns,
            settings: &config.web,
            network: ctx.network()?,
            database: ctx.database()?,
            email: ctx.email(),
            certificate: ctx.certificate(),
        })?;
        let ctx = ctx.with_runtime(declare(&mut assembly, site));

        assembly.validate()?;

        info!(
            topologies = assembly.topologies().len(),
            resources = assembly.resource_count(),
            "Assembly complete"
        );

        Ok(Deployment {
            assembly,
            context: ctx,
        })
    }
}

fn declare<H>(assembly: &mut CloudAssembly, built: Built<H>) -> H {
    let Built { topology, handle } = built;
    info!(
        topology = topology.name(),
        region = %topology.region(),
        resources = topology.resources().len(),
        "Declared topology"
    );
    assembly.push(topology);
    handle
}
