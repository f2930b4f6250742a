//! `tierstack validate` - check the stack configuration and show the
//! effective settings after defaults and clamping.

use tracing::instrument;

use tierstack_core::{
    application::Deployment,
    domain::{DomainList, ValidatedConfig},
};

use crate::{
    cli::{GlobalArgs, OutputFormat, ValidateArgs, ValidateFormat},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[instrument(skip_all)]
pub fn execute(
    args: ValidateArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let service = super::synth_service(&global, &config);
    // Assembling as well catches wiring failures, not just bad keys.
    let deployment = service.plan()?;
    let effective = deployment.context.config();

    if args.format == ValidateFormat::Json || output.format() == OutputFormat::Json {
        return output.json("configuration", effective);
    }

    output.success(&format!(
        "{} is valid",
        super::stack_config_path(&global, &config).display()
    ))?;
    for line in summary(effective, &deployment) {
        output.data(&line)?;
    }
    Ok(())
}

/// Effective settings, one `key: value` line each.
fn summary(config: &ValidatedConfig, deployment: &Deployment) -> Vec<String> {
    let db = &config.database;
    let web = &config.web;
    let domains = DomainList::from_dns(&config.dns)
        .map(|list| list.to_vec().join(", "))
        .unwrap_or_else(|_| "none (served over http)".into());

    let mut lines = vec![
        format!("prefix:      {}", config.scope.name_prefix),
        format!("region:      {}", config.scope.region),
        format!("zones:       {}", config.network.max_azs),
        format!("domain:      {}", config.dns.domain),
        format!("hostnames:   {domains}"),
        format!(
            "database:    {} ({} + {} replicas, {})",
            db.engine, db.instance_type, db.replica_instances, db.name
        ),
        format!("backups:     {} days", db.backup_retention_days),
        format!("email:       {}", if config.email.enabled { "enabled" } else { "disabled" }),
        format!(
            "service:     {} x {} cpu / {} MiB, image tag {}",
            web.instances, web.cpu, web.memory_limit, web.image_tag
        ),
        format!("topologies:  {}", deployment.assembly.names().join(" -> ")),
    ];
    if let Some(url) = deployment.public_url() {
        lines.push(format!("url:         {url}"));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use tierstack_adapters::sample::{SAMPLE_CONFIG, parse_sample};
    use tierstack_core::{application::TopologyAssembler, domain::DomainValidator};

    fn sample_deployment() -> Deployment {
        let raw = parse_sample(SAMPLE_CONFIG).unwrap();
        let config = DomainValidator::validate_config(&raw).unwrap();
        TopologyAssembler::assemble(&config).unwrap()
    }

    #[test]
    fn summary_lists_effective_values() {
        let deployment = sample_deployment();
        let lines = summary(deployment.context.config(), &deployment);

        assert!(lines.iter().any(|l| l == "prefix:      Acme"));
        assert!(lines.iter().any(|l| l.contains("www.example.com, example.com")));
        assert!(lines.iter().any(|l| l.contains("AcmeBase -> AcmeData")));
        assert!(lines.iter().any(|l| l.starts_with("url:") && l.contains("https://")));
    }
}
