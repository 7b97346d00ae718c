//! Battery (multi-item) question groups.
//!
//! A battery is a block of columns that share one response scale, e.g. the
//! "AI Future Impact" block asks the same Very positive … Very negative
//! question about ten sectors. The schema stores the scale once; each item
//! materializes into a [`CodedVariable`] on demand.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::variable::{CodedVariable, VariableRole};

/// One column of a battery block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatteryItem {
    /// Dataset column name (e.g. "AIFUTRIMPCT_a_W152").
    pub column: String,
    /// Short item label (e.g. "Economy").
    pub label: String,
}

/// A battery group: shared response scale plus ordered items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatteryGroup {
    /// Stable lookup key (e.g. "ai-future-impact").
    pub key: String,

    /// Display title (e.g. "AI Future Impact (20-yr)").
    pub title: String,

    /// The survey's reserved refused code, copied from the schema.
    pub refused_code: i64,

    scale: BTreeMap<i64, String>,

    items: Vec<BatteryItem>,
}

impl BatteryGroup {
    pub fn new(
        key: impl Into<String>,
        title: impl Into<String>,
        refused_code: i64,
        scale: impl IntoIterator<Item = (i64, String)>,
        items: Vec<BatteryItem>,
    ) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            refused_code,
            scale: scale.into_iter().collect(),
            items,
        }
    }

    /// Items in questionnaire order.
    pub fn items(&self) -> &[BatteryItem] {
        &self.items
    }

    /// The shared scale in ascending code order, refused included.
    pub fn scale(&self) -> impl Iterator<Item = (i64, &str)> {
        self.scale.iter().map(|(code, label)| (*code, label.as_str()))
    }

    /// Materialize one item as a standalone coded variable.
    pub fn item_variable(&self, column: &str) -> Result<CodedVariable> {
        let item = self
            .items
            .iter()
            .find(|item| item.column == column)
            .ok_or_else(|| ModelError::UnknownBatteryItem {
                key: self.key.clone(),
                column: column.to_string(),
            })?;
        Ok(self.materialize(item))
    }

    /// Materialize every item, in questionnaire order.
    pub fn item_variables(&self) -> Vec<CodedVariable> {
        self.items.iter().map(|item| self.materialize(item)).collect()
    }

    fn materialize(&self, item: &BatteryItem) -> CodedVariable {
        CodedVariable::new(
            item.column.clone(),
            item.label.clone(),
            VariableRole::Question,
            self.refused_code,
            self.scale.iter().map(|(code, label)| (*code, label.clone())),
        )
    }
}
