//! Server-rendered pages. Templates live in `templates/`; askama escapes every
//! interpolated value.

use askama::Template;

use crate::dashboard::{render_chart, ChartCard, ChartRow, DashboardData, MetricCard, RenderedChart, UNSUPPORTED_CHART_MSG};
use crate::error::{AppError, AppResult};
use crate::flags::Variant;
use crate::identity::Identity;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub admin: bool,
    /// Inline message; empty when there is nothing to report.
    pub error: String,
    /// Echoed back into the username field after a failed submit.
    pub username: String,
}

/// One chart, flattened for the template.
pub struct ChartPanel {
    pub title: String,
    pub description: String,
    pub supported: bool,
    pub kind: String,
    pub has_axes: bool,
    pub rows: Vec<ChartRow>,
    pub requested: String,
}

impl ChartPanel {
    pub fn from_card(card: &ChartCard) -> Self {
        let mut panel = ChartPanel {
            title: card.title.clone(),
            description: card.description.clone(),
            supported: false,
            kind: String::new(),
            has_axes: false,
            rows: Vec::new(),
            requested: String::new(),
        };
        match render_chart(card) {
            RenderedChart::Series { kind, rows } => {
                panel.supported = true;
                panel.kind = kind.as_str().to_string();
                panel.has_axes = kind.has_axes();
                panel.rows = rows;
            }
            RenderedChart::Unsupported { requested } => panel.requested = requested,
        }
        panel
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPage {
    pub username: String,
    pub role: String,
    pub admin: bool,
    pub metrics: Vec<MetricCard>,
    pub charts: Vec<ChartPanel>,
    pub unsupported_msg: String,
}

impl DashboardPage {
    pub fn new(identity: &Identity, variant: Variant, data: &DashboardData) -> Self {
        Self::with_charts(identity, variant, data.metric_cards(), &data.chart_cards())
    }

    pub fn with_charts(identity: &Identity, variant: Variant, metrics: Vec<MetricCard>, charts: &[ChartCard]) -> Self {
        Self {
            username: identity.username.clone(),
            role: identity.role.clone(),
            admin: variant == Variant::Admin,
            metrics,
            charts: charts.iter().map(ChartPanel::from_card).collect(),
            unsupported_msg: UNSUPPORTED_CHART_MSG.to_string(),
        }
    }
}

pub fn render_login(variant: Variant, error: &str, username: &str) -> AppResult<String> {
    let page = LoginPage { admin: variant == Variant::Admin, error: error.to_string(), username: username.to_string() };
    page.render().map_err(|e| AppError::internal("template_error".to_string(), e.to_string()))
}

pub fn render_dashboard(page: &DashboardPage) -> AppResult<String> {
    page.render().map_err(|e| AppError::internal("template_error".to_string(), e.to_string()))
}
