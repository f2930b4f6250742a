//! Operational dashboard for the database cluster.

use std::collections::BTreeMap;

use crate::domain::entities::resources::{DashboardSpec, GraphWidget, Metric};
use crate::domain::entities::Value;

const NAMESPACE: &str = "AWS/RDS";
const DEFAULT_STATISTIC: &str = "Average";
const DEFAULT_PERIOD_SECONDS: u32 = 300;
const READ_LATENCY_PERIOD_SECONDS: u32 = 60;
const GRID_WIDTH: u8 = 24;
const WIDGET_HEIGHT: u8 = 6;

/// Four rows of cluster metrics:
///
/// | row | widgets |
/// |-----|---------|
/// | 1 | connections, CPU |
/// | 2 | backup billed, free local storage |
/// | 3 | freeable memory, storage, IOPS |
/// | 4 | network throughput, read latency, deadlocks |
pub fn cluster_dashboard(name: &str, cluster_identifier: Value) -> DashboardSpec {
    let metric =
        |metric_name: &str| cluster_metric(metric_name, &cluster_identifier, DEFAULT_PERIOD_SECONDS);

    let rows = vec![
        vec![
            ("DB Connections", vec![metric("DatabaseConnections")]),
            ("CPU Utilization", vec![metric("CPUUtilization")]),
        ],
        vec![
            ("Backup Storage Billed", vec![metric("TotalBackupStorageBilled")]),
            ("Free Local Storage", vec![metric("FreeLocalStorage")]),
        ],
        vec![
            ("Freeable Memory", vec![metric("FreeableMemory")]),
            (
                "Storage",
                vec![metric("VolumeBytesUsed"), metric("SnapshotStorageUsed")],
            ),
            (
                "Volume IOPs",
                vec![metric("VolumeReadIOPs"), metric("VolumeWriteIOPs")],
            ),
        ],
        vec![
            (
                "Network Throughput",
                vec![
                    metric("NetworkReceiveThroughput"),
                    metric("NetworkThroughput"),
                    metric("NetworkTransmitThroughput"),
                ],
            ),
            (
                "Read Latency",
                vec![cluster_metric(
                    "ReadLatency",
                    &cluster_identifier,
                    READ_LATENCY_PERIOD_SECONDS,
                )],
            ),
            ("Deadlocks", vec![metric("Deadlocks")]),
        ],
    ];

    DashboardSpec {
        dashboard_name: name.to_string(),
        rows: rows.into_iter().map(layout_row).collect(),
    }
}

fn layout_row(widgets: Vec<(&str, Vec<Metric>)>) -> Vec<GraphWidget> {
    let width = GRID_WIDTH / widgets.len().max(1) as u8;
    widgets
        .into_iter()
        .map(|(title, left)| GraphWidget {
            title: title.to_string(),
            left,
            width,
            height: WIDGET_HEIGHT,
        })
        .collect()
}

fn cluster_metric(metric_name: &str, cluster_identifier: &Value, period_seconds: u32) -> Metric {
    Metric {
        namespace: NAMESPACE.into(),
        metric_name: metric_name.into(),
        dimensions: BTreeMap::from([(
            "DBClusterIdentifier".to_string(),
            cluster_identifier.clone(),
        )]),
        statistic: DEFAULT_STATISTIC.into(),
        period_seconds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_match_layout() {
        let dashboard = cluster_dashboard("acme", Value::literal("acme-cluster"));
        let shape: Vec<usize> = dashboard.rows.iter().map(Vec::len).collect();
        assert_eq!(shape, vec![2, 2, 3, 3]);
        assert_eq!(dashboard.widgets().count(), 10);
        assert!(dashboard.rows.iter().all(|row| {
            row.iter().map(|w| u32::from(w.width)).sum::<u32>() == u32::from(GRID_WIDTH)
        }));
    }

    #[test]
    fn combined_widgets_carry_all_metrics() {
        let dashboard = cluster_dashboard("acme", Value::literal("c"));
        let network = dashboard
            .widgets()
            .find(|w| w.title == "Network Throughput")
            .unwrap();
        assert_eq!(network.left.len(), 3);

        let storage = dashboard.widgets().find(|w| w.title == "Storage").unwrap();
        let names: Vec<&str> = storage.left.iter().map(|m| m.metric_name.as_str()).collect();
        assert_eq!(names, vec!["VolumeBytesUsed", "SnapshotStorageUsed"]);
    }

    #[test]
    fn read_latency_samples_every_minute() {
        let dashboard = cluster_dashboard("acme", Value::literal("c"));
        let latency = dashboard
            .widgets()
            .find(|w| w.title == "Read Latency")
            .unwrap();
        assert_eq!(latency.left[0].period_seconds, 60);
        assert_eq!(latency.left[0].statistic, "Average");

        let cpu = dashboard
            .widgets()
            .find(|w| w.title == "CPU Utilization")
            .unwrap();
        assert_eq!(cpu.left[0].period_seconds, 300);
    }
}
