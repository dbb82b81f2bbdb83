//! Payload extractor
//!
//! Flattens one classified JSON payload into [`FlatRecord`]s. Which
//! collection is read depends only on the address's category and scope:
//!
//! | category / scope        | collection                        | one record per  |
//! |-------------------------|-----------------------------------|-----------------|
//! | aggregated/transaction  | `data.transactionData[]`          | payment type    |
//! | aggregated/user         | `data.usersByDevice[]` (nullable) | device brand    |
//! | map/transaction         | `data.hoverDataList[]`            | state/district  |
//! | map/user                | `data.hoverData{}`                | state/district  |
//! | top/transaction         | `data.<group>[]`                  | ranked entity   |
//! | top/user                | `data.<group>[]`                  | ranked entity   |
//!
//! The returned iterator is lazy: entries are decoded as it is advanced, and
//! an entry that fails to decode surfaces as an `Err` item. Callers that need
//! per-file atomicity collect into `Result<Vec<_>, _>`.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::models::{Category, FlatRecord, HierarchyAddress, Measures, RecordKey, Scope};

use super::error::IngestError;

/// Lazily extracted records of a single file
pub type Records<'a> = Box<dyn Iterator<Item = Result<FlatRecord, IngestError>> + 'a>;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionEntry {
    name: String,
    payment_instruments: Vec<Metric>,
}

#[derive(Deserialize)]
struct Metric {
    count: i64,
    amount: f64,
}

#[derive(Deserialize)]
struct DeviceEntry {
    brand: String,
    count: i64,
    percentage: f64,
}

#[derive(Deserialize)]
struct HoverEntry {
    name: String,
    metric: Vec<Metric>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HoverUsers {
    registered_users: i64,
    app_opens: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RankedTransaction {
    entity_name: String,
    metric: Metric,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RankedUsers {
    name: String,
    registered_users: i64,
}

/// Extract the flat records of one file
///
/// Fails eagerly when a top-level collection is missing; per-entry problems
/// are reported through the iterator.
pub fn extract<'a>(
    address: &'a HierarchyAddress,
    payload: &'a Value,
) -> Result<Records<'a>, IngestError> {
    let data = payload
        .get("data")
        .and_then(Value::as_object)
        .ok_or_else(|| mismatch(address, "data"))?;
    let key = RecordKey::from(address);

    let records: Records<'a> = match (address.category, address.scope) {
        (Category::Aggregated, Scope::Transaction) => {
            let entries = array(address, data, "transactionData")?;
            Box::new(entries.iter().enumerate().map(move |(i, entry)| {
                let field = format!("data.transactionData[{}]", i);
                let entry: TransactionEntry = decode(address, &field, entry)?;
                let first = entry
                    .payment_instruments
                    .into_iter()
                    .next()
                    .ok_or_else(|| mismatch(address, format!("{}.paymentInstruments[0]", field)))?;
                Ok(FlatRecord::new(
                    key.clone(),
                    Measures::AggregatedTransaction {
                        transaction_type: entry.name,
                        count: first.count,
                        amount: first.amount,
                    },
                ))
            }))
        }
        (Category::Aggregated, Scope::User) => {
            // Device breakdowns are null for some quarters
            let entries: &'a [Value] = match data.get("usersByDevice") {
                None | Some(Value::Null) => &[],
                Some(Value::Array(entries)) => entries,
                Some(_) => return Err(mismatch(address, "data.usersByDevice")),
            };
            Box::new(entries.iter().enumerate().map(move |(i, entry)| {
                let field = format!("data.usersByDevice[{}]", i);
                let entry: DeviceEntry = decode(address, &field, entry)?;
                Ok(FlatRecord::new(
                    key.clone(),
                    Measures::AggregatedUser {
                        brand: entry.brand,
                        count: entry.count,
                        percentage: entry.percentage,
                    },
                ))
            }))
        }
        (Category::Map, Scope::Transaction) => {
            let entries = array(address, data, "hoverDataList")?;
            Box::new(entries.iter().enumerate().map(move |(i, entry)| {
                let field = format!("data.hoverDataList[{}]", i);
                let entry: HoverEntry = decode(address, &field, entry)?;
                // First metric wins
                let first = entry
                    .metric
                    .into_iter()
                    .next()
                    .ok_or_else(|| mismatch(address, format!("{}.metric[0]", field)))?;
                Ok(FlatRecord::new(
                    key.clone(),
                    Measures::MapTransaction {
                        unit: entry.name,
                        count: first.count,
                        amount: first.amount,
                    },
                ))
            }))
        }
        (Category::Map, Scope::User) => {
            let units = data
                .get("hoverData")
                .and_then(Value::as_object)
                .ok_or_else(|| mismatch(address, "data.hoverData"))?;
            Box::new(units.iter().map(move |(unit, value)| {
                let field = format!("data.hoverData.{}", unit);
                let users: HoverUsers = decode(address, &field, value)?;
                Ok(FlatRecord::new(
                    key.clone(),
                    Measures::MapUser {
                        unit: unit.clone(),
                        registered_users: users.registered_users,
                        app_opens: users.app_opens,
                    },
                ))
            }))
        }
        (Category::Top, Scope::Transaction) => {
            Box::new(ranked(address, data).map(move |item| {
                let (kind, field, value) = item?;
                let entity: RankedTransaction = decode(address, &field, value)?;
                Ok(FlatRecord::new(
                    key.clone(),
                    Measures::TopTransaction {
                        entity_kind: kind.to_string(),
                        entity_name: entity.entity_name,
                        count: entity.metric.count,
                        amount: entity.metric.amount,
                    },
                ))
            }))
        }
        (Category::Top, Scope::User) => Box::new(ranked(address, data).map(move |item| {
            let (kind, field, value) = item?;
            let entity: RankedUsers = decode(address, &field, value)?;
            Ok(FlatRecord::new(
                key.clone(),
                Measures::TopUser {
                    entity_kind: kind.to_string(),
                    entity_name: entity.name,
                    registered_users: entity.registered_users,
                },
            ))
        })),
    };

    Ok(records)
}

/// Walk every named group of a `top` payload (`states`, `districts`,
/// `pincodes`), yielding `(group, field path, entity)` triples. Null or
/// empty groups yield nothing.
fn ranked<'a>(
    address: &'a HierarchyAddress,
    data: &'a Map<String, Value>,
) -> impl Iterator<Item = Result<(&'a str, String, &'a Value), IngestError>> + 'a {
    data.iter().flat_map(
        move |(kind, entities)| -> Box<dyn Iterator<Item = Result<_, IngestError>> + 'a> {
            match entities {
                Value::Null => Box::new(std::iter::empty()),
                Value::Array(items) => Box::new(items.iter().enumerate().map(move |(i, item)| {
                    Ok((kind.as_str(), format!("data.{}[{}]", kind, i), item))
                })),
                _ => Box::new(std::iter::once(Err(mismatch(
                    address,
                    format!("data.{}", kind),
                )))),
            }
        },
    )
}

fn array<'a>(
    address: &HierarchyAddress,
    data: &'a Map<String, Value>,
    name: &str,
) -> Result<&'a Vec<Value>, IngestError> {
    data.get(name)
        .and_then(Value::as_array)
        .ok_or_else(|| mismatch(address, format!("data.{}", name)))
}

fn decode<T: DeserializeOwned>(
    address: &HierarchyAddress,
    field: &str,
    value: &Value,
) -> Result<T, IngestError> {
    T::deserialize(value).map_err(|e| mismatch(address, format!("{} ({})", field, e)))
}

fn mismatch(address: &HierarchyAddress, field: impl Into<String>) -> IngestError {
    IngestError::SchemaMismatch {
        address: address.to_string(),
        field: field.into(),
    }
}
