//! Template loading and management

use crate::{Result, WriterError};
use std::collections::HashMap;
use tera::{Tera, Value};

/// Name the configuration template is registered under
pub const TEMPEST_CONF: &str = "tempest.conf";

/// Load all templates
pub fn load_templates() -> Result<Tera> {
    let mut tera = Tera::default();

    tera.register_filter("ini_value", ini_value_filter);

    tera.add_raw_template(TEMPEST_CONF, include_str!("../templates/tempest.conf.tera"))
        .map_err(|e| {
            WriterError::Template(format!("Failed to load {} template: {}", TEMPEST_CONF, e))
        })?;

    Ok(tera)
}

/// Filter rendering option values the way tempest's INI parser reads them
fn ini_value_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let rendered = match value {
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).unwrap_or_else(|| item.to_string()))
            .collect::<Vec<_>>()
            .join(","),
        Value::Null => String::new(),
        other => other.to_string(),
    };

    Ok(Value::String(rendered))
}
