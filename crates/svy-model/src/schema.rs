//! TOML schema loading for the variable registry.
//!
//! The schema is a single declarative document: survey metadata, standalone
//! variables with their code maps, battery groups with a shared scale, plus
//! the scan plan and overview profile. A default schema for the ATP Wave 152
//! dataset is embedded in the crate.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::battery::{BatteryGroup, BatteryItem};
use crate::error::{ModelError, Result};
use crate::registry::{ScanPlan, SurveyInfo, VariableRegistry};
use crate::variable::{CodedVariable, VariableRole};

/// The embedded default schema (Pew American Trends Panel, Wave 152).
const DEFAULT_SCHEMA: &str = include_str!("../data/atp_w152.toml");

#[derive(Debug, Deserialize)]
struct SchemaDoc {
    survey: SurveySection,
    #[serde(default)]
    variables: Vec<VariableSection>,
    #[serde(default)]
    batteries: Vec<BatterySection>,
    #[serde(default)]
    scan: Option<ScanSection>,
    #[serde(default)]
    profile: Option<ProfileSection>,
}

#[derive(Debug, Deserialize)]
struct SurveySection {
    title: String,
    field_dates: String,
    respondents: u32,
    mode: String,
    languages: String,
    weight_column: String,
    refused_code: i64,
}

#[derive(Debug, Deserialize)]
struct VariableSection {
    name: String,
    label: String,
    role: VariableRole,
    codes: Vec<CodeEntry>,
}

#[derive(Debug, Deserialize)]
struct CodeEntry {
    code: i64,
    label: String,
}

#[derive(Debug, Deserialize)]
struct BatterySection {
    key: String,
    title: String,
    scale: Vec<CodeEntry>,
    items: Vec<ItemEntry>,
}

#[derive(Debug, Deserialize)]
struct ItemEntry {
    column: String,
    label: String,
}

#[derive(Debug, Deserialize)]
struct ScanSection {
    questions: Vec<String>,
    demographics: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ProfileSection {
    demographics: Vec<String>,
}

/// Load the embedded default ATP W152 registry.
pub fn builtin() -> Result<VariableRegistry> {
    parse(DEFAULT_SCHEMA, "builtin atp_w152.toml")
}

/// Load a registry from a schema file on disk.
pub fn load(path: &Path) -> Result<VariableRegistry> {
    let text = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text, &path.display().to_string())
}

/// Parse and validate a schema document.
pub fn parse(text: &str, origin: &str) -> Result<VariableRegistry> {
    let doc: SchemaDoc = toml::from_str(text).map_err(|source| ModelError::Toml {
        origin: origin.to_string(),
        source: Box::new(source),
    })?;
    build_registry(doc)
}

fn build_registry(doc: SchemaDoc) -> Result<VariableRegistry> {
    let survey = SurveyInfo {
        title: doc.survey.title,
        field_dates: doc.survey.field_dates,
        respondents: doc.survey.respondents,
        mode: doc.survey.mode,
        languages: doc.survey.languages,
        weight_column: doc.survey.weight_column,
        refused_code: doc.survey.refused_code,
    };
    if survey.weight_column.trim().is_empty() {
        return Err(ModelError::invalid("survey.weight_column must not be empty"));
    }

    let mut variables: BTreeMap<String, CodedVariable> = BTreeMap::new();
    for section in doc.variables {
        if section.name.trim().is_empty() {
            return Err(ModelError::invalid("variable with empty name"));
        }
        let codes = collect_codes(&section.codes, &section.name)?;
        let variable = CodedVariable::new(
            section.name.clone(),
            section.label,
            section.role,
            survey.refused_code,
            codes,
        );
        if variables.insert(section.name.clone(), variable).is_some() {
            return Err(ModelError::invalid(format!(
                "duplicate variable: {}",
                section.name
            )));
        }
    }

    let mut batteries: BTreeMap<String, BatteryGroup> = BTreeMap::new();
    for section in doc.batteries {
        if section.items.is_empty() {
            return Err(ModelError::invalid(format!(
                "battery {} has no items",
                section.key
            )));
        }
        let scale = collect_codes(&section.scale, &section.key)?;
        let mut items = Vec::with_capacity(section.items.len());
        for item in section.items {
            if variables.contains_key(&item.column) {
                return Err(ModelError::invalid(format!(
                    "battery item {} collides with a standalone variable",
                    item.column
                )));
            }
            items.push(BatteryItem {
                column: item.column,
                label: item.label,
            });
        }
        let battery = BatteryGroup::new(
            section.key.clone(),
            section.title,
            survey.refused_code,
            scale,
            items,
        );
        if batteries.insert(section.key.clone(), battery).is_some() {
            return Err(ModelError::invalid(format!(
                "duplicate battery: {}",
                section.key
            )));
        }
    }

    // Battery item columns must be unique across groups as well.
    let mut item_columns: BTreeMap<&str, &str> = BTreeMap::new();
    for battery in batteries.values() {
        for item in battery.items() {
            if let Some(other) = item_columns.insert(item.column.as_str(), battery.key.as_str()) {
                return Err(ModelError::invalid(format!(
                    "battery item {} appears in both {} and {}",
                    item.column, other, battery.key
                )));
            }
        }
    }

    let scan = match doc.scan {
        Some(section) => ScanPlan {
            questions: section.questions,
            demographics: section.demographics,
        },
        None => ScanPlan::default(),
    };
    let profile = doc
        .profile
        .map(|section| section.demographics)
        .unwrap_or_default();

    // Scan and profile entries must resolve now, not at analysis time.
    let resolves = |name: &str| {
        variables.contains_key(name)
            || batteries
                .values()
                .any(|battery| battery.items().iter().any(|item| item.column == name))
    };
    for name in &scan.questions {
        if !resolves(name) {
            return Err(ModelError::invalid(format!(
                "scan question does not resolve: {name}"
            )));
        }
    }
    for name in scan.demographics.iter().chain(profile.iter()) {
        if !variables.contains_key(name) {
            return Err(ModelError::invalid(format!(
                "demographic does not resolve: {name}"
            )));
        }
    }

    Ok(VariableRegistry::from_parts(
        survey, variables, batteries, scan, profile,
    ))
}

fn collect_codes(entries: &[CodeEntry], owner: &str) -> Result<Vec<(i64, String)>> {
    if entries.is_empty() {
        return Err(ModelError::invalid(format!("{owner} has no codes")));
    }
    let mut seen = BTreeMap::new();
    for entry in entries {
        if seen.insert(entry.code, ()).is_some() {
            return Err(ModelError::invalid(format!(
                "{owner} defines code {} twice",
                entry.code
            )));
        }
    }
    Ok(entries
        .iter()
        .map(|entry| (entry.code, entry.label.clone()))
        .collect())
}
