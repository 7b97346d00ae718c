//! The variable registry: one declarative schema for every coded variable.
//!
//! The registry replaces per-question constant tables with a single lookup
//! structure keyed by column name. Unknown names are a typed failure, never a
//! silent miss.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::battery::BatteryGroup;
use crate::error::{ModelError, Result};
use crate::variable::CodedVariable;

/// Survey-level metadata shared by every analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyInfo {
    pub title: String,
    pub field_dates: String,
    pub respondents: u32,
    pub mode: String,
    pub languages: String,
    /// The canonical weight column for the whole dataset.
    pub weight_column: String,
    /// The reserved "refused / no answer" code (99 in this dataset).
    pub refused_code: i64,
}

/// Default question × demographic pairs for the chi-square scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanPlan {
    pub questions: Vec<String>,
    pub demographics: Vec<String>,
}

/// Registry of every coded variable and battery group in the schema.
#[derive(Debug, Clone)]
pub struct VariableRegistry {
    survey: SurveyInfo,
    variables: BTreeMap<String, CodedVariable>,
    batteries: BTreeMap<String, BatteryGroup>,
    scan: ScanPlan,
    profile: Vec<String>,
}

impl VariableRegistry {
    pub(crate) fn from_parts(
        survey: SurveyInfo,
        variables: BTreeMap<String, CodedVariable>,
        batteries: BTreeMap<String, BatteryGroup>,
        scan: ScanPlan,
        profile: Vec<String>,
    ) -> Self {
        Self {
            survey,
            variables,
            batteries,
            scan,
            profile,
        }
    }

    pub fn survey(&self) -> &SurveyInfo {
        &self.survey
    }

    /// Look up a standalone variable by column name.
    pub fn variable(&self, name: &str) -> Result<&CodedVariable> {
        self.variables
            .get(name)
            .ok_or_else(|| ModelError::UnknownVariable {
                name: name.to_string(),
            })
    }

    /// Look up a battery group by key.
    pub fn battery(&self, key: &str) -> Result<&BatteryGroup> {
        self.batteries
            .get(key)
            .ok_or_else(|| ModelError::UnknownBattery {
                key: key.to_string(),
            })
    }

    /// Resolve a column name to a coded variable, searching standalone
    /// variables first and battery items second.
    ///
    /// Battery items materialize against their group's shared scale, so every
    /// analyzable column resolves through one path.
    pub fn resolve(&self, name: &str) -> Result<CodedVariable> {
        if let Some(variable) = self.variables.get(name) {
            return Ok(variable.clone());
        }
        for battery in self.batteries.values() {
            if battery.items().iter().any(|item| item.column == name) {
                return battery.item_variable(name);
            }
        }
        Err(ModelError::UnknownVariable {
            name: name.to_string(),
        })
    }

    /// Standalone variables in name order.
    pub fn variables(&self) -> impl Iterator<Item = &CodedVariable> {
        self.variables.values()
    }

    /// Battery groups in key order.
    pub fn batteries(&self) -> impl Iterator<Item = &BatteryGroup> {
        self.batteries.values()
    }

    pub fn scan_plan(&self) -> &ScanPlan {
        &self.scan
    }

    /// Demographic columns shown in the dataset overview profile.
    pub fn profile(&self) -> &[String] {
        &self.profile
    }
}
