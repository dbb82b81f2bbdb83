//! Flat records produced by the payload extractor

use serde::{Deserialize, Serialize};

use super::address::HierarchyAddress;
use super::enums::{Category, Granularity, Scope};
use super::shape::Shape;

/// Join key copied from the hierarchy address onto every record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub year: i32,
    pub quarter: i16,
}

impl From<&HierarchyAddress> for RecordKey {
    fn from(address: &HierarchyAddress) -> Self {
        Self {
            country: address.country.clone(),
            state: address.state.clone(),
            year: address.year,
            quarter: address.quarter,
        }
    }
}

/// Payload-specific measure fields, one variant per category × scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Measures {
    /// Payment category totals
    AggregatedTransaction {
        transaction_type: String,
        count: i64,
        amount: f64,
    },
    /// Registered users per device brand
    AggregatedUser {
        brand: String,
        count: i64,
        percentage: f64,
    },
    /// Totals for one state (national files) or district (state files)
    ///
    /// Only the first metric listed for a unit is kept; any further metric
    /// entries in the payload are ignored.
    MapTransaction { unit: String, count: i64, amount: f64 },
    /// Registered users and app opens for one state or district
    MapUser {
        unit: String,
        registered_users: i64,
        app_opens: i64,
    },
    /// A ranked entity; `entity_kind` is the payload group it came from
    /// (`states`, `districts` or `pincodes`)
    TopTransaction {
        entity_kind: String,
        entity_name: String,
        count: i64,
        amount: f64,
    },
    TopUser {
        entity_kind: String,
        entity_name: String,
        registered_users: i64,
    },
}

impl Measures {
    pub fn category(&self) -> Category {
        match self {
            Measures::AggregatedTransaction { .. } | Measures::AggregatedUser { .. } => {
                Category::Aggregated
            }
            Measures::MapTransaction { .. } | Measures::MapUser { .. } => Category::Map,
            Measures::TopTransaction { .. } | Measures::TopUser { .. } => Category::Top,
        }
    }

    pub fn scope(&self) -> Scope {
        match self {
            Measures::AggregatedTransaction { .. }
            | Measures::MapTransaction { .. }
            | Measures::TopTransaction { .. } => Scope::Transaction,
            Measures::AggregatedUser { .. } | Measures::MapUser { .. } | Measures::TopUser { .. } => {
                Scope::User
            }
        }
    }

    fn push_values(&self, values: &mut Vec<SqlValue>) {
        match self {
            Measures::AggregatedTransaction {
                transaction_type,
                count,
                amount,
            } => {
                values.push(SqlValue::Text(transaction_type.clone()));
                values.push(SqlValue::BigInt(*count));
                values.push(SqlValue::Double(*amount));
            }
            Measures::AggregatedUser {
                brand,
                count,
                percentage,
            } => {
                values.push(SqlValue::Text(brand.clone()));
                values.push(SqlValue::BigInt(*count));
                values.push(SqlValue::Double(*percentage));
            }
            Measures::MapTransaction {
                unit,
                count,
                amount,
            } => {
                values.push(SqlValue::Text(unit.clone()));
                values.push(SqlValue::BigInt(*count));
                values.push(SqlValue::Double(*amount));
            }
            Measures::MapUser {
                unit,
                registered_users,
                app_opens,
            } => {
                values.push(SqlValue::Text(unit.clone()));
                values.push(SqlValue::BigInt(*registered_users));
                values.push(SqlValue::BigInt(*app_opens));
            }
            Measures::TopTransaction {
                entity_kind,
                entity_name,
                count,
                amount,
            } => {
                values.push(SqlValue::Text(entity_kind.clone()));
                values.push(SqlValue::Text(entity_name.clone()));
                values.push(SqlValue::BigInt(*count));
                values.push(SqlValue::Double(*amount));
            }
            Measures::TopUser {
                entity_kind,
                entity_name,
                registered_users,
            } => {
                values.push(SqlValue::Text(entity_kind.clone()));
                values.push(SqlValue::Text(entity_name.clone()));
                values.push(SqlValue::BigInt(*registered_users));
            }
        }
    }
}

/// A single flattened row destined for one of the twelve tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatRecord {
    pub key: RecordKey,
    pub measures: Measures,
}

impl FlatRecord {
    pub fn new(key: RecordKey, measures: Measures) -> Self {
        Self { key, measures }
    }

    pub fn shape(&self) -> Shape {
        let granularity = if self.key.state.is_some() {
            Granularity::SubNational
        } else {
            Granularity::National
        };
        Shape::new(self.measures.category(), self.measures.scope(), granularity)
    }

    /// Column values in destination-table order:
    /// `country, [state], year, quarter, measures...`
    pub fn values(&self) -> Vec<SqlValue> {
        let mut values = Vec::with_capacity(8);
        values.push(SqlValue::Text(self.key.country.clone()));
        if let Some(state) = &self.key.state {
            values.push(SqlValue::Text(state.clone()));
        }
        values.push(SqlValue::Int(self.key.year));
        values.push(SqlValue::SmallInt(self.key.quarter));
        self.measures.push_values(&mut values);
        values
    }
}

/// A typed value bound to an insert statement parameter
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Int(i32),
    SmallInt(i16),
    BigInt(i64),
    Double(f64),
}
