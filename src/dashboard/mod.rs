//! Dashboard widgets: the static data table and the metric/chart presentation helpers.

pub mod chart;
pub mod data;
pub mod metric;

pub use chart::{render as render_chart, ChartCard, ChartKind, ChartRow, DataPoint, RenderedChart, UNSUPPORTED_CHART_MSG};
pub use data::DashboardData;
pub use metric::{format_change, format_number, MetricCard, MetricColor, MetricIcon, MetricValue};
