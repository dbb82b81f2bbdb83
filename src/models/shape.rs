//! The twelve record shapes and their destination tables

use serde::{Deserialize, Serialize};

use super::enums::{Category, Granularity, Scope};

/// One of the twelve (category × scope × granularity) record layouts
///
/// Every shape maps onto exactly one destination table; see
/// [`Shape::table_name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Shape {
    pub category: Category,
    pub scope: Scope,
    pub granularity: Granularity,
}

macro_rules! shape {
    ($category:ident, $scope:ident, $granularity:ident) => {
        Shape {
            category: Category::$category,
            scope: Scope::$scope,
            granularity: Granularity::$granularity,
        }
    };
}

impl Shape {
    /// Number of distinct shapes
    pub const COUNT: usize = 12;

    /// All shapes in load order
    pub const ALL: [Shape; Shape::COUNT] = [
        shape!(Aggregated, Transaction, National),
        shape!(Aggregated, Transaction, SubNational),
        shape!(Aggregated, User, National),
        shape!(Aggregated, User, SubNational),
        shape!(Map, Transaction, National),
        shape!(Map, Transaction, SubNational),
        shape!(Map, User, National),
        shape!(Map, User, SubNational),
        shape!(Top, Transaction, National),
        shape!(Top, Transaction, SubNational),
        shape!(Top, User, National),
        shape!(Top, User, SubNational),
    ];

    /// Table probed by the load guard
    pub const REFERENCE: Shape = shape!(Aggregated, Transaction, National);

    pub const fn new(category: Category, scope: Scope, granularity: Granularity) -> Self {
        Self {
            category,
            scope,
            granularity,
        }
    }

    /// Position of this shape within [`Shape::ALL`]
    pub fn index(&self) -> usize {
        let category = match self.category {
            Category::Aggregated => 0,
            Category::Map => 1,
            Category::Top => 2,
        };
        let scope = match self.scope {
            Scope::Transaction => 0,
            Scope::User => 1,
        };
        let granularity = match self.granularity {
            Granularity::National => 0,
            Granularity::SubNational => 1,
        };
        category * 4 + scope * 2 + granularity
    }

    /// Destination table name, e.g. `agg_trans_country` or `top_user_state`
    pub fn table_name(&self) -> String {
        format!(
            "{}_{}_{}",
            self.category.table_prefix(),
            self.scope.table_infix(),
            self.granularity.table_suffix()
        )
    }

    /// Look a shape up by its destination table name
    pub fn from_table_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.table_name() == name)
    }

    pub fn is_sub_national(&self) -> bool {
        self.granularity == Granularity::SubNational
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.category, self.scope, self.granularity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_index_matches_position() {
        for (i, shape) in Shape::ALL.iter().enumerate() {
            assert_eq!(shape.index(), i, "{} out of place", shape);
        }
    }

    #[test]
    fn test_table_names_are_unique() {
        let names: HashSet<String> = Shape::ALL.iter().map(|s| s.table_name()).collect();
        assert_eq!(names.len(), Shape::COUNT);
        assert!(names.contains("agg_trans_country"));
        assert!(names.contains("map_user_state"));
        assert!(names.contains("top_trans_state"));
    }

    #[test]
    fn test_from_table_name() {
        assert_eq!(
            Shape::from_table_name("agg_trans_country"),
            Some(Shape::REFERENCE)
        );
        assert_eq!(Shape::from_table_name("agg_trans_district"), None);
    }
}
