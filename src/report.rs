//! Canned reports over the loaded tables
//!
//! The set of reports is closed: each [`ReportKind`] maps to one
//! parameterised query. User-supplied filters (state, district) are always
//! bound as parameters, never spliced into the SQL text.

use serde::{Deserialize, Serialize};

use crate::database::schema::{DestinationSchema, Placeholder};
use crate::database::{DatabaseBackend, DatabaseResult, QueryResult};
use crate::models::{Category, Granularity, Scope, Shape};

/// A predefined analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ReportKind {
    /// National transaction totals per payment type and year
    TransactionsByType,
    /// Per-state transaction totals per payment type and year
    StateTransactionsByType,
    /// National registered users per device brand and year
    UsersByBrand,
    /// Per-state registered users per device brand and year
    StateUsersByBrand,
    /// Top ranked entities by transaction amount, per year
    TopTransactionEntities,
    /// States present in the district-level map data
    States,
    /// Districts of one state
    Districts { state: String },
    /// Quarterly transactions of one district
    DistrictTransactions { state: String, district: String },
}

impl ReportKind {
    /// Names accepted by [`ReportKind::from_name`]
    pub const NAMES: [&'static str; 8] = [
        "transactions-by-type",
        "state-transactions-by-type",
        "users-by-brand",
        "state-users-by-brand",
        "top-transaction-entities",
        "states",
        "districts",
        "district-transactions",
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ReportKind::TransactionsByType => Self::NAMES[0],
            ReportKind::StateTransactionsByType => Self::NAMES[1],
            ReportKind::UsersByBrand => Self::NAMES[2],
            ReportKind::StateUsersByBrand => Self::NAMES[3],
            ReportKind::TopTransactionEntities => Self::NAMES[4],
            ReportKind::States => Self::NAMES[5],
            ReportKind::Districts { .. } => Self::NAMES[6],
            ReportKind::DistrictTransactions { .. } => Self::NAMES[7],
        }
    }

    /// Build a report from its name and optional filters
    pub fn from_name(
        name: &str,
        state: Option<&str>,
        district: Option<&str>,
    ) -> Result<Self, String> {
        let require = |value: Option<&str>, flag: &str| {
            value
                .map(str::to_string)
                .ok_or_else(|| format!("Report '{}' requires --{}", name, flag))
        };

        match name {
            "transactions-by-type" => Ok(ReportKind::TransactionsByType),
            "state-transactions-by-type" => Ok(ReportKind::StateTransactionsByType),
            "users-by-brand" => Ok(ReportKind::UsersByBrand),
            "state-users-by-brand" => Ok(ReportKind::StateUsersByBrand),
            "top-transaction-entities" => Ok(ReportKind::TopTransactionEntities),
            "states" => Ok(ReportKind::States),
            "districts" => Ok(ReportKind::Districts {
                state: require(state, "state")?,
            }),
            "district-transactions" => Ok(ReportKind::DistrictTransactions {
                state: require(state, "state")?,
                district: require(district, "district")?,
            }),
            _ => Err(format!(
                "Unknown report: {}. Available: {}",
                name,
                Self::NAMES.join(", ")
            )),
        }
    }

    /// Table the report reads from
    pub fn shape(&self) -> Shape {
        use Granularity::*;

        match self {
            ReportKind::TransactionsByType => {
                Shape::new(Category::Aggregated, Scope::Transaction, National)
            }
            ReportKind::StateTransactionsByType => {
                Shape::new(Category::Aggregated, Scope::Transaction, SubNational)
            }
            ReportKind::UsersByBrand => Shape::new(Category::Aggregated, Scope::User, National),
            ReportKind::StateUsersByBrand => {
                Shape::new(Category::Aggregated, Scope::User, SubNational)
            }
            ReportKind::TopTransactionEntities => {
                Shape::new(Category::Top, Scope::Transaction, National)
            }
            ReportKind::States
            | ReportKind::Districts { .. }
            | ReportKind::DistrictTransactions { .. } => {
                Shape::new(Category::Map, Scope::Transaction, SubNational)
            }
        }
    }

    pub fn sql(&self, namespace: &str, placeholder: Placeholder) -> String {
        let table = DestinationSchema::qualified(namespace, self.shape());

        match self {
            ReportKind::TransactionsByType => format!(
                "SELECT year, transaction_type, \
                 CAST(SUM(transaction_count) AS BIGINT) AS total_count, \
                 SUM(transaction_amount) AS total_amount \
                 FROM {} GROUP BY year, transaction_type ORDER BY year, transaction_type",
                table
            ),
            ReportKind::StateTransactionsByType => format!(
                "SELECT state, year, transaction_type, \
                 CAST(SUM(transaction_count) AS BIGINT) AS total_count, \
                 SUM(transaction_amount) AS total_amount \
                 FROM {} GROUP BY state, year, transaction_type \
                 ORDER BY state, year, transaction_type",
                table
            ),
            ReportKind::UsersByBrand => format!(
                "SELECT year, brand_name, \
                 CAST(SUM(user_count) AS BIGINT) AS total_users, \
                 AVG(percentage) AS avg_percentage \
                 FROM {} GROUP BY year, brand_name ORDER BY year, total_users DESC",
                table
            ),
            ReportKind::StateUsersByBrand => format!(
                "SELECT state, year, brand_name, \
                 CAST(SUM(user_count) AS BIGINT) AS total_users, \
                 AVG(percentage) AS avg_percentage \
                 FROM {} GROUP BY state, year, brand_name \
                 ORDER BY state, year, total_users DESC",
                table
            ),
            ReportKind::TopTransactionEntities => format!(
                "SELECT year, entity_kind, entity_name, \
                 CAST(SUM(transaction_count) AS BIGINT) AS total_count, \
                 SUM(transaction_amount) AS total_amount \
                 FROM {} GROUP BY year, entity_kind, entity_name \
                 ORDER BY year, entity_kind, total_amount DESC",
                table
            ),
            ReportKind::States => {
                format!("SELECT DISTINCT state FROM {} ORDER BY state", table)
            }
            ReportKind::Districts { .. } => format!(
                "SELECT DISTINCT district FROM {} WHERE state = {} ORDER BY district",
                table,
                placeholder.nth(1)
            ),
            ReportKind::DistrictTransactions { .. } => format!(
                "SELECT state, district, year, quarter, transaction_count, transaction_amount \
                 FROM {} WHERE state = {} AND district = {} ORDER BY year, quarter",
                table,
                placeholder.nth(1),
                placeholder.nth(2)
            ),
        }
    }

    /// Bound parameters, in placeholder order
    pub fn params(&self) -> Vec<serde_json::Value> {
        match self {
            ReportKind::Districts { state } => vec![state.as_str().into()],
            ReportKind::DistrictTransactions { state, district } => {
                vec![state.as_str().into(), district.as_str().into()]
            }
            _ => Vec::new(),
        }
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportKind::Districts { state } => write!(f, "{} ({})", self.name(), state),
            ReportKind::DistrictTransactions { state, district } => {
                write!(f, "{} ({}/{})", self.name(), state, district)
            }
            _ => f.write_str(self.name()),
        }
    }
}

/// Run a report against the backend's namespace
pub async fn run_report<B: DatabaseBackend + ?Sized>(
    backend: &B,
    kind: &ReportKind,
) -> DatabaseResult<QueryResult> {
    let sql = kind.sql(backend.namespace(), backend.placeholder());
    tracing::debug!("Running report {}: {}", kind, sql);
    backend.execute_query_params(&sql, &kind.params()).await
}

/// Row count of every destination table
pub async fn table_status<B: DatabaseBackend + ?Sized>(backend: &B) -> DatabaseResult<QueryResult> {
    let mut rows = Vec::with_capacity(Shape::COUNT);
    for shape in Shape::ALL {
        let count = backend.count_rows(shape).await?;
        rows.push(serde_json::json!({
            "table_name": shape.table_name(),
            "row_count": count,
        }));
    }
    Ok(QueryResult::new(
        vec!["table_name".to_string(), "row_count".to_string()],
        rows,
    ))
}
