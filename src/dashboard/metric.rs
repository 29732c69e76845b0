use serde::Serialize;

/// Card color scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricColor {
    Primary,
    Secondary,
    Success,
    Warning,
}

impl MetricColor {
    pub fn css_class(&self) -> &'static str {
        match self {
            MetricColor::Primary => "metric-card",
            MetricColor::Secondary => "metric-card-secondary",
            MetricColor::Success => "metric-card-success",
            MetricColor::Warning => "metric-card-warning",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricIcon {
    Zap,
    Users,
    Shield,
    Clock,
    TrendingUp,
}

impl MetricIcon {
    pub fn name(&self) -> &'static str {
        match self {
            MetricIcon::Zap => "zap",
            MetricIcon::Users => "users",
            MetricIcon::Shield => "shield",
            MetricIcon::Clock => "clock",
            MetricIcon::TrendingUp => "trending-up",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl MetricValue {
    pub fn percent(v: f64) -> Self { MetricValue::Text(format!("{}%", v)) }

    pub fn display(&self) -> String {
        match self {
            MetricValue::Number(n) => format_number(*n),
            MetricValue::Text(s) => s.clone(),
        }
    }
}

/// Thousands-separated rendering of a number: `1247` -> `1,247`, `99.8` -> `99.8`.
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return "0".to_string();
    }
    let raw = format!("{}", n.abs());
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (raw, None),
    };
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let mut out = String::new();
    if n < 0.0 {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(f) = frac_part {
        out.push('.');
        out.push_str(&f);
    }
    out
}

/// `+x%` for non-negative changes, `-x%` otherwise. Non-finite input renders as `0%`.
pub fn format_change(change: f64) -> String {
    if !change.is_finite() {
        return "0%".to_string();
    }
    // normalise -0.0
    let change = if change == 0.0 { 0.0 } else { change };
    let sign = if change >= 0.0 { "+" } else { "" };
    format!("{}{}%", sign, change)
}

pub fn is_positive_change(change: f64) -> bool { change.is_finite() && change >= 0.0 }

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard {
    pub title: String,
    pub value: MetricValue,
    pub change: f64,
    pub icon: MetricIcon,
    pub color: MetricColor,
}

impl MetricCard {
    pub fn value_text(&self) -> String { self.value.display() }

    pub fn change_text(&self) -> String { format_change(self.change) }

    pub fn trending_up(&self) -> bool { is_positive_change(self.change) }

    pub fn css_class(&self) -> &'static str { self.color.css_class() }

    pub fn icon_name(&self) -> &'static str { self.icon.name() }
}
