use serde::Serialize;

use super::chart::{ChartCard, DataPoint};
use super::metric::{MetricCard, MetricColor, MetricIcon, MetricValue};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub total_deployments: u64,
    pub deployments_change: f64,
    pub active_users: u64,
    pub users_change: f64,
    pub security_score: f64,
    pub security_change: f64,
    pub uptime: f64,
    pub uptime_change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Charts {
    pub deployment_frequency: Vec<DataPoint>,
    pub pipeline_success: Vec<DataPoint>,
    pub resource_utilization: Vec<DataPoint>,
    pub error_distribution: Vec<DataPoint>,
}

/// Static sample data behind the dashboard widgets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardData {
    pub metrics: Metrics,
    pub charts: Charts,
}

fn series(points: &[(&str, f64)]) -> Vec<DataPoint> {
    points.iter().map(|(n, v)| DataPoint::new(*n, *v)).collect()
}

impl Default for DashboardData {
    fn default() -> Self { Self::sample() }
}

impl DashboardData {
    pub fn sample() -> Self {
        Self {
            metrics: Metrics {
                total_deployments: 1247,
                deployments_change: 12.5,
                active_users: 89,
                users_change: 8.2,
                security_score: 94.0,
                security_change: 2.1,
                uptime: 99.8,
                uptime_change: 0.1,
            },
            charts: Charts {
                deployment_frequency: series(&[
                    ("Week 1", 45.0), ("Week 2", 52.0), ("Week 3", 48.0), ("Week 4", 61.0),
                    ("Week 5", 55.0), ("Week 6", 67.0), ("Week 7", 73.0), ("Week 8", 69.0),
                ]),
                pipeline_success: series(&[
                    ("Build", 98.0), ("Test", 95.0), ("Deploy", 92.0), ("Monitor", 97.0), ("Rollback", 88.0),
                ]),
                resource_utilization: series(&[
                    ("00:00", 45.0), ("04:00", 38.0), ("08:00", 67.0), ("12:00", 89.0),
                    ("16:00", 92.0), ("20:00", 78.0), ("24:00", 52.0),
                ]),
                error_distribution: series(&[
                    ("Build Failures", 15.0), ("Test Failures", 25.0), ("Deployment Errors", 20.0),
                    ("Infrastructure Issues", 18.0), ("Network Problems", 12.0), ("Other", 10.0),
                ]),
            },
        }
    }

    pub fn metric_cards(&self) -> Vec<MetricCard> {
        let m = &self.metrics;
        vec![
            MetricCard {
                title: "Total Deployments".into(),
                value: MetricValue::Number(m.total_deployments as f64),
                change: m.deployments_change,
                icon: MetricIcon::Zap,
                color: MetricColor::Primary,
            },
            MetricCard {
                title: "Active Users".into(),
                value: MetricValue::Number(m.active_users as f64),
                change: m.users_change,
                icon: MetricIcon::Users,
                color: MetricColor::Secondary,
            },
            MetricCard {
                title: "Security Score".into(),
                value: MetricValue::percent(m.security_score),
                change: m.security_change,
                icon: MetricIcon::Shield,
                color: MetricColor::Success,
            },
            MetricCard {
                title: "Uptime".into(),
                value: MetricValue::percent(m.uptime),
                change: m.uptime_change,
                icon: MetricIcon::Clock,
                color: MetricColor::Warning,
            },
        ]
    }

    pub fn chart_cards(&self) -> Vec<ChartCard> {
        let c = &self.charts;
        let card = |title: &str, description: &str, kind: &str, data: &[DataPoint]| ChartCard {
            title: title.into(),
            description: description.into(),
            kind: kind.into(),
            data: data.to_vec(),
        };
        vec![
            card("Deployment Frequency", "Number of deployments per week", "line", &c.deployment_frequency),
            card("Pipeline Success Rate", "Success rate of CI/CD pipelines", "bar", &c.pipeline_success),
            card("Resource Utilization", "CPU and memory usage over time", "area", &c.resource_utilization),
            card("Error Distribution", "Types of errors in the system", "pie", &c.error_distribution),
        ]
    }
}
