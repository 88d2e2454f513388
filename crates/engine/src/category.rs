//! A `Category` is a node of a company's chart of accounts.
//!
//! Categories form a forest per company: a category without `parent_id` is
//! a root. The [`CategoryType`] of a node is independent of its parent's.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

/// Accounting classification of a category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CategoryType {
    Asset,
    Liability,
    Equity,
    Revenue,
    #[serde(rename = "COGS")]
    Cogs,
    Expense,
}

impl CategoryType {
    pub const ALL: [Self; 6] = [
        Self::Asset,
        Self::Liability,
        Self::Equity,
        Self::Revenue,
        Self::Cogs,
        Self::Expense,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "Asset",
            Self::Liability => "Liability",
            Self::Equity => "Equity",
            Self::Revenue => "Revenue",
            Self::Cogs => "COGS",
            Self::Expense => "Expense",
        }
    }
}

impl fmt::Display for CategoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsing ignores case and surrounding whitespace; the stored spelling is
/// always the canonical one from [`CategoryType::as_str`].
impl TryFrom<&str> for CategoryType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| EngineError::InvalidType(value.to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub company_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    pub parent_id: Option<Uuid>,
}

impl Category {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}
