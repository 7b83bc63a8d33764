use calculator_sdk::{HistoryEntry, wire};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Outcome of a single evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResultDto {
    /// Numeric result; non-finite values are the strings "Infinity", "-Infinity" or "NaN".
    #[serde(with = "wire::number")]
    #[schema(value_type = f64)]
    pub result: f64,
}

impl From<f64> for ResultDto {
    fn from(result: f64) -> Self {
        Self { result }
    }
}

/// REST DTO for one history record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntryDto {
    /// Operation name, e.g. `add` or `sin`.
    pub operation: String,
    #[serde(with = "wire::numbers")]
    #[schema(value_type = Vec<f64>)]
    pub operands: Vec<f64>,
    #[serde(with = "wire::number")]
    #[schema(value_type = f64)]
    pub result: f64,
    /// `deg` or `rad`, trigonometric operations only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl From<HistoryEntry> for HistoryEntryDto {
    fn from(entry: HistoryEntry) -> Self {
        Self {
            operation: entry.operation.name().to_owned(),
            operands: entry.operands,
            result: entry.result,
            unit: entry.unit.map(|u| u.as_str().to_owned()),
            recorded_at: entry.recorded_at,
        }
    }
}

/// Query parameters of the binary endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct BinaryQuery {
    pub a: Option<String>,
    pub b: Option<String>,
}

/// Query parameters of the unary endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct UnaryQuery {
    pub unit: Option<String>,
}
