use crate::models::record::{parse_date, parse_timestamp};
use crate::models::Amount;
use std::collections::HashMap;
use tera::{Context, Tera, Value};

/// Pages compiled into the binary
const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("macros.html", include_str!("../../templates/macros.html")),
    ("index.html", include_str!("../../templates/index.html")),
    ("inventory.html", include_str!("../../templates/inventory.html")),
    ("vehicle_detail.html", include_str!("../../templates/vehicle_detail.html")),
    ("vehicle_form.html", include_str!("../../templates/vehicle_form.html")),
    ("reports.html", include_str!("../../templates/reports.html")),
    ("404.html", include_str!("../../templates/404.html")),
    ("500.html", include_str!("../../templates/500.html")),
];

/// Format a currency value, e.g. `$1,234.56`
///
/// Unparsable values are rendered unchanged.
pub fn format_currency(value: &Value) -> String {
    let parsed: Option<Amount> = match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.to_string().parse().ok(),
        Value::Null => Some(Amount::ZERO),
        _ => None,
    };

    match parsed {
        Some(amount) => amount.currency(),
        None => match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    }
}

/// Format `YYYY-MM-DD` as `MM/DD/YYYY`
///
/// Timestamps keep only their date part; anything else passes through.
pub fn format_date(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }

    let date = parse_date(value)
        .or_else(|| parse_timestamp(&value.replace('T', " ")).map(|ts| ts.date()));

    match date {
        Some(d) => d.format("%m/%d/%Y").to_string(),
        None => value.to_string(),
    }
}

fn currency_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(format_currency(value)))
}

fn format_date_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = match value {
        Value::String(s) => format_date(s),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    Ok(Value::String(text))
}

/// Compiled page templates with the site's filters registered
pub struct Templates {
    tera: Tera,
}

impl Templates {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied())?;
        tera.register_filter("currency", currency_filter);
        tera.register_filter("format_date", format_date_filter);
        Ok(Self { tera })
    }

    pub fn render(&self, name: &str, context: &Context) -> tera::Result<String> {
        self.tera.render(name, context)
    }
}
