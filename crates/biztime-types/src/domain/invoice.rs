use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::company::Company;
use super::timestamp;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invoice {
    pub id: i64,
    pub comp_code: String,
    #[serde(serialize_with = "amount::serialize")]
    pub amt: f64,
    pub paid: bool,
    #[serde(with = "timestamp")]
    pub add_date: DateTime<Utc>,
    #[serde(with = "timestamp::option", default)]
    pub paid_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvoiceSummary {
    pub id: i64,
    pub comp_code: String,
}

/// An invoice joined with the company that owns it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvoiceDetail {
    pub id: i64,
    #[serde(serialize_with = "amount::serialize")]
    pub amt: f64,
    pub paid: bool,
    #[serde(with = "timestamp")]
    pub add_date: DateTime<Utc>,
    #[serde(with = "timestamp::option", default)]
    pub paid_date: Option<DateTime<Utc>>,
    pub company: Company,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewInvoice {
    pub comp_code: Option<String>,
    pub amt: Option<f64>,
}

/// `paid: None` leaves both `paid` and `paid_date` as stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceChanges {
    pub amt: Option<f64>,
    pub paid: Option<bool>,
}

mod amount {
    use serde::Serializer;

    // 2^53: beyond this an f64 no longer holds every integer exactly.
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

    /// Whole amounts go out as integers (`100`, not `100.0`).
    pub fn serialize<S>(amt: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if amt.fract() == 0.0 && amt.abs() <= MAX_EXACT {
            serializer.serialize_i64(*amt as i64)
        } else {
            serializer.serialize_f64(*amt)
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("invalid amount: {0}")]
pub struct InvalidAmount(pub String);

/// Accepts a JSON number or a numeric string such as `"400"`.
pub fn parse_amount(value: &Value) -> Result<f64, InvalidAmount> {
    let amt = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match amt {
        Some(a) if a.is_finite() => Ok(a),
        _ => Err(InvalidAmount(value.to_string())),
    }
}
