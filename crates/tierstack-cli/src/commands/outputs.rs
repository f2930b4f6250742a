//! Implementation of the `tierstack outputs` command.

use serde::Serialize;

use tierstack_core::domain::{OutputRecord, Value};

use crate::{
    cli::{GlobalArgs, OutputFormat, OutputsArgs, OutputsFormat},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OutputRow<'a> {
    topology: &'a str,
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    export_name: Option<&'a str>,
    value: &'a Value,
}

impl<'a> OutputRow<'a> {
    fn new(topology: &'a str, record: &'a OutputRecord) -> Self {
        Self {
            topology,
            id: &record.id,
            export_name: record.export_name.as_deref(),
            value: &record.value,
        }
    }
}

pub fn execute(
    args: OutputsArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let service = super::synth_service(&global, &config);
    let deployment = service.plan()?;

    let rows: Vec<OutputRow<'_>> = deployment
        .outputs()
        .filter(|(_, record)| !args.exported || record.export_name.is_some())
        .map(|(topology, record)| OutputRow::new(topology, record))
        .collect();

    let format = if output.format() == OutputFormat::Json {
        OutputsFormat::Json
    } else {
        args.format
    };

    match format {
        OutputsFormat::Json => output.json("outputs", &rows)?,
        OutputsFormat::Csv => {
            output.data("topology,id,export,value")?;
            for row in &rows {
                output.data(&csv_line(row))?;
            }
        }
        OutputsFormat::Table => {
            let mut current = None;
            for row in &rows {
                if current != Some(row.topology) {
                    output.header(row.topology)?;
                    current = Some(row.topology);
                }
                output.data(&table_line(row))?;
            }
            if rows.is_empty() {
                output.info("No outputs declared")?;
            }
        }
    }

    Ok(())
}

fn table_line(row: &OutputRow<'_>) -> String {
    match row.export_name {
        Some(export) if export != row.id => {
            format!("  {} = {} (exported as {export})", row.id, row.value)
        }
        _ => format!("  {} = {}", row.id, row.value),
    }
}

fn csv_line(row: &OutputRow<'_>) -> String {
    [
        row.topology.to_string(),
        row.id.to_string(),
        row.export_name.unwrap_or_default().to_string(),
        row.value.to_string(),
    ]
    .iter()
    .map(|field| csv_field(field))
    .collect::<Vec<_>>()
    .join(",")
}

/// Quote a field when it contains a delimiter, quote or line break.
fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_fields_are_quoted_when_needed() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("ns1\nns2"), "\"ns1\nns2\"");
    }

    #[test]
    fn csv_line_leaves_missing_export_empty() {
        let record = OutputRecord {
            id: "OutputWebUrl".into(),
            value: Value::literal("https://www.example.com"),
            export_name: None,
        };
        let row = OutputRow::new("AcmeWeb", &record);
        assert_eq!(
            csv_line(&row),
            "AcmeWeb,OutputWebUrl,,https://www.example.com"
        );
    }

    #[test]
    fn table_line_mentions_renamed_exports() {
        let record = OutputRecord::exported_as("ClusterEndpoint", "AcmeData:Endpoint", Value::literal("db"));
        let row = OutputRow::new("AcmeData", &record);
        assert_eq!(
            table_line(&row),
            "  ClusterEndpoint = db (exported as AcmeData:Endpoint)"
        );

        let record = OutputRecord::exported("OutputEcrImageUrl", Value::literal("repo"));
        let row = OutputRow::new("AcmeBase", &record);
        assert_eq!(table_line(&row), "  OutputEcrImageUrl = repo");
    }
}
