//! Embedded contract templates with `{{field}}` placeholders

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ReviewError;

/// Mutual NDA - loaded from templates/nda.txt
const NDA_TEMPLATE: &str = include_str!("../templates/nda.txt");

pub const SUPPORTED_JURISDICTIONS: &[&str] = &["India", "California", "UK", "Delaware"];

/// Information about an available template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateInfo {
    pub name: String,
    pub description: String,
    pub required_inputs: Vec<String>,
    pub optional_inputs: Vec<String>,
    pub jurisdictions: Vec<String>,
}

pub fn list_templates() -> Vec<TemplateInfo> {
    vec![TemplateInfo {
        name: "nda".to_string(),
        description: "Mutual Non-Disclosure Agreement".to_string(),
        required_inputs: vec![
            "party1".to_string(),
            "party2".to_string(),
            "jurisdiction".to_string(),
        ],
        optional_inputs: vec!["date".to_string()], // Defaults to today
        jurisdictions: SUPPORTED_JURISDICTIONS
            .iter()
            .map(|j| j.to_string())
            .collect(),
    }]
}

pub fn get_template_source(name: &str) -> Option<&'static str> {
    match name {
        "nda" => Some(NDA_TEMPLATE),
        _ => None,
    }
}

/// Replace every `{{key}}` in `source` with its value; keys without a
/// placeholder are ignored and placeholders without a key are left alone
pub fn substitute(source: &str, fields: &BTreeMap<String, String>) -> String {
    fields.iter().fold(source.to_string(), |content, (key, value)| {
        content.replace(&format!("{{{{{}}}}}", key), value)
    })
}

/// `2026-10-16` becomes `October 16, 2026`; anything else passes through
pub fn format_agreement_date(value: &str) -> String {
    match NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
        Ok(date) => date.format("%B %d, %Y").to_string(),
        Err(_) => value.to_string(),
    }
}

/// Fill a named template after checking its required inputs
pub fn fill_template(name: &str, fields: &BTreeMap<String, String>) -> Result<String, ReviewError> {
    let source =
        get_template_source(name).ok_or_else(|| ReviewError::TemplateNotFound(name.to_string()))?;
    let info = list_templates()
        .into_iter()
        .find(|t| t.name == name)
        .ok_or_else(|| ReviewError::TemplateNotFound(name.to_string()))?;

    for field in &info.required_inputs {
        let present = fields.get(field).is_some_and(|v| !v.trim().is_empty());
        if !present {
            return Err(ReviewError::MissingField {
                template: name.to_string(),
                field: field.clone(),
            });
        }
    }

    if let Some(jurisdiction) = fields.get("jurisdiction") {
        if !info.jurisdictions.iter().any(|j| j == jurisdiction) {
            return Err(ReviewError::InvalidInput(format!(
                "Unsupported jurisdiction '{}'. Supported: {}",
                jurisdiction,
                info.jurisdictions.join(", ")
            )));
        }
    }

    let mut values = fields.clone();
    let date = match fields.get("date") {
        Some(date) if !date.trim().is_empty() => format_agreement_date(date),
        _ => chrono::Local::now().date_naive().format("%B %d, %Y").to_string(),
    };
    values.insert("date".to_string(), date);

    Ok(substitute(source, &values))
}
