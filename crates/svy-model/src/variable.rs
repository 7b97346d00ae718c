//! Coded survey variables.
//!
//! Every variable that participates in weighted computations is a *coded*
//! variable: an ordered mapping from integer response code to display label,
//! with one reserved code meaning "refused / no answer". The refused code is
//! excluded from every percentage base unless a caller opts in.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How a variable is used in analyses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableRole {
    /// A substantive survey question.
    Question,
    /// A demographic/profile variable used to condition cross-tabulations.
    Demographic,
}

impl VariableRole {
    /// Display name for CLI listings.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Question => "question",
            Self::Demographic => "demographic",
        }
    }
}

/// A coded variable: column name, label, and ordered code → label mapping.
///
/// Code order is the ascending numeric order of the codes themselves
/// (`BTreeMap` iteration), which is the output order of every calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodedVariable {
    /// Dataset column name (e.g. "AI_HEARD_W152").
    pub name: String,

    /// Human-readable question/variable label.
    pub label: String,

    pub role: VariableRole,

    /// The reserved "refused / no answer" code for this survey (99).
    pub refused_code: i64,

    codes: BTreeMap<i64, String>,
}

impl CodedVariable {
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        role: VariableRole,
        refused_code: i64,
        codes: impl IntoIterator<Item = (i64, String)>,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            role,
            refused_code,
            codes: codes.into_iter().collect(),
        }
    }

    /// All categories in ascending code order, refused included.
    pub fn categories(&self) -> impl Iterator<Item = (i64, &str)> {
        self.codes.iter().map(|(code, label)| (*code, label.as_str()))
    }

    /// Substantive categories in ascending code order, refused excluded.
    pub fn answer_categories(&self) -> impl Iterator<Item = (i64, &str)> {
        self.categories()
            .filter(|(code, _)| *code != self.refused_code)
    }

    /// Label for a code, if the code is part of this variable's map.
    pub fn label_for(&self, code: i64) -> Option<&str> {
        self.codes.get(&code).map(String::as_str)
    }

    pub fn is_refused(&self, code: i64) -> bool {
        code == self.refused_code
    }

    /// Number of mapped categories, refused included.
    pub fn category_count(&self) -> usize {
        self.codes.len()
    }
}
