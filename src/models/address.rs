//! Decoded position of a dataset file in the snapshot hierarchy

use serde::{Deserialize, Serialize};

use super::enums::{Category, Granularity, Scope};
use super::shape::Shape;

/// The decoded (category, scope, country, state?, year, quarter) tuple
///
/// Granularity is not stored: a file is sub-national exactly when it
/// carries a state, so the two can never disagree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HierarchyAddress {
    pub category: Category,
    pub scope: Scope,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub year: i32,
    pub quarter: i16,
}

impl HierarchyAddress {
    pub fn granularity(&self) -> Granularity {
        if self.state.is_some() {
            Granularity::SubNational
        } else {
            Granularity::National
        }
    }

    /// Record shape every record extracted from this file will have
    pub fn shape(&self) -> Shape {
        Shape::new(self.category, self.scope, self.granularity())
    }
}

impl std::fmt::Display for HierarchyAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} {}", self.category, self.scope, self.country)?;
        if let Some(state) = &self.state {
            write!(f, "/{}", state)?;
        }
        write!(f, " {} Q{}", self.year, self.quarter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let address = HierarchyAddress {
            category: Category::Map,
            scope: Scope::User,
            country: "india".to_string(),
            state: Some("goa".to_string()),
            year: 2020,
            quarter: 3,
        };
        assert_eq!(address.to_string(), "map/user india/goa 2020 Q3");
        assert_eq!(address.granularity(), Granularity::SubNational);
    }
}
