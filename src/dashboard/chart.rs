use std::str::FromStr;

use serde::Serialize;

pub const UNSUPPORTED_CHART_MSG: &str = "Unsupported chart type";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Area,
    Pie,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Line => "line",
            ChartKind::Bar => "bar",
            ChartKind::Area => "area",
            ChartKind::Pie => "pie",
        }
    }

    /// Cartesian kinds draw axes and a grid; pie does not.
    pub fn has_axes(&self) -> bool { !matches!(self, ChartKind::Pie) }
}

impl FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "line" => Ok(ChartKind::Line),
            "bar" => Ok(ChartKind::Bar),
            "area" => Ok(ChartKind::Area),
            "pie" => Ok(ChartKind::Pie),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataPoint {
    pub name: String,
    pub value: f64,
}

impl DataPoint {
    pub fn new(name: impl Into<String>, value: f64) -> Self { Self { name: name.into(), value } }
}

/// A chart as declared by the data table. `kind` stays a string so that an unknown
/// kind reaches the renderer and produces the visible fallback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartCard {
    pub title: String,
    pub description: String,
    pub kind: String,
    pub data: Vec<DataPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartRow {
    pub label: String,
    pub value: String,
    /// Share of the series total, pie charts only.
    pub share: Option<String>,
    /// Bar length relative to the series maximum, 0..=100.
    pub width_pct: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderedChart {
    Series { kind: ChartKind, rows: Vec<ChartRow> },
    Unsupported { requested: String },
}

fn fmt_value(v: f64) -> String {
    if v.is_finite() { format!("{}", v) } else { "0".to_string() }
}

/// Turn a chart declaration into something the page template can draw.
pub fn render(chart: &ChartCard) -> RenderedChart {
    let kind = match chart.kind.parse::<ChartKind>() {
        Ok(k) => k,
        Err(requested) => return RenderedChart::Unsupported { requested },
    };
    let finite = |v: f64| if v.is_finite() { v } else { 0.0 };
    let total: f64 = chart.data.iter().map(|p| finite(p.value).max(0.0)).sum();
    let max = chart.data.iter().map(|p| finite(p.value)).fold(0.0_f64, f64::max);
    let rows = chart
        .data
        .iter()
        .map(|p| {
            let v = finite(p.value);
            let width_pct = if max > 0.0 { ((v.max(0.0) / max) * 100.0).round() as u32 } else { 0 };
            let share = match kind {
                ChartKind::Pie if total > 0.0 => Some(format!("{:.1}%", v.max(0.0) / total * 100.0)),
                ChartKind::Pie => Some("0.0%".to_string()),
                _ => None,
            };
            ChartRow { label: p.name.clone(), value: fmt_value(p.value), share, width_pct }
        })
        .collect();
    RenderedChart::Series { kind, rows }
}
