//! Enums describing where a dataset file sits in the snapshot hierarchy
//!
//! # Serde Casing Conventions
//!
//! All hierarchy enums serialize in `lowercase`, matching the directory
//! names used by the published dataset (`aggregated`, `map`, `top`,
//! `transaction`, `user`). [`Granularity`] uses `kebab-case` so that the
//! sub-national variant reads `sub-national` in run summaries.

use serde::{Deserialize, Serialize};

/// Top-level category branch of the dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Totals broken down by payment category or device brand
    Aggregated,
    /// Per-unit totals keyed by state or district name
    Map,
    /// Ranked entities (states, districts, pincodes)
    Top,
}

impl Category {
    /// All categories in canonical order
    pub const ALL: [Category; 3] = [Category::Aggregated, Category::Map, Category::Top];

    /// Directory marker naming this category
    pub fn marker(self) -> &'static str {
        match self {
            Category::Aggregated => "aggregated",
            Category::Map => "map",
            Category::Top => "top",
        }
    }

    /// Match a path segment against the category markers
    pub fn from_marker(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.marker() == segment)
    }

    /// Short prefix used in destination table names
    pub(crate) fn table_prefix(self) -> &'static str {
        match self {
            Category::Aggregated => "agg",
            Category::Map => "map",
            Category::Top => "top",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.marker())
    }
}

/// Metric scope: payment transactions or registered users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Transaction,
    User,
}

impl Scope {
    /// All scopes in canonical order
    pub const ALL: [Scope; 2] = [Scope::Transaction, Scope::User];

    /// Directory marker naming this scope
    pub fn marker(self) -> &'static str {
        match self {
            Scope::Transaction => "transaction",
            Scope::User => "user",
        }
    }

    /// Match a path segment against the scope markers
    pub fn from_marker(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.marker() == segment)
    }

    pub(crate) fn table_infix(self) -> &'static str {
        match self {
            Scope::Transaction => "trans",
            Scope::User => "user",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.marker())
    }
}

/// Whether a file covers a whole country or a single state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Granularity {
    National,
    SubNational,
}

impl Granularity {
    pub const ALL: [Granularity; 2] = [Granularity::National, Granularity::SubNational];

    pub(crate) fn table_suffix(self) -> &'static str {
        match self {
            Granularity::National => "country",
            Granularity::SubNational => "state",
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Granularity::National => write!(f, "national"),
            Granularity::SubNational => write!(f, "sub-national"),
        }
    }
}
