//! Canonical payment record and the single deserialization boundary for the
//! payment API, whose payloads mix camelCase and snake_case keys.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

pub const CURRENCY_SYMBOL: &str = "₹";

/// Backend-assigned identifier. Numeric ids are kept as their decimal text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Paid,
    Processed,
    Rectify,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Approved => "Approved",
            PaymentStatus::Rejected => "Rejected",
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Processed => "Processed",
            PaymentStatus::Rectify => "Rectify",
        }
    }

    /// Case-insensitive match on the status name.
    pub fn parse_lenient(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(PaymentStatus::Pending),
            "approved" => Some(PaymentStatus::Approved),
            "rejected" => Some(PaymentStatus::Rejected),
            "paid" => Some(PaymentStatus::Paid),
            "processed" => Some(PaymentStatus::Processed),
            "rectify" => Some(PaymentStatus::Rectify),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentType {
    #[default]
    Cash,
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
    #[serde(rename = "UPI")]
    Upi,
    Other,
}

impl PaymentType {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentType::Cash => "Cash",
            PaymentType::BankTransfer => "Bank Transfer",
            PaymentType::Upi => "UPI",
            PaymentType::Other => "Other",
        }
    }

    /// Accepts `Bank Transfer`, `bank_transfer`, `BANK-TRANSFER` and so on.
    /// Unrecognised non-empty names map to `Other`.
    pub fn parse_lenient(value: &str) -> Option<Self> {
        let key: String = value
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match key.as_str() {
            "" => None,
            "cash" => Some(PaymentType::Cash),
            "banktransfer" => Some(PaymentType::BankTransfer),
            "upi" => Some(PaymentType::Upi),
            _ => Some(PaymentType::Other),
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reviewer outcome at the approval stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    pub fn status(self) -> PaymentStatus {
        match self {
            Decision::Approved => PaymentStatus::Approved,
            Decision::Rejected => PaymentStatus::Rejected,
        }
    }
}

/// A payment record in canonical form.
///
/// Deserializing always goes through [`transform_payment_fms`], so a
/// `PaymentRecord` parsed from any API payload is already normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawPaymentRecord")]
pub struct PaymentRecord {
    pub id: RecordId,
    pub unique_no: String,
    pub fms_name: String,
    pub pay_to: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage_remarks: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_type: Option<PaymentType>,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl PaymentRecord {
    pub fn formatted_amount(&self) -> String {
        format!("{}{:.2}", CURRENCY_SYMBOL, self.amount)
    }
}

/// A record exactly as the API sent it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawPaymentRecord(pub Value);

impl From<Value> for RawPaymentRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<&PaymentRecord> for RawPaymentRecord {
    fn from(record: &PaymentRecord) -> Self {
        Self(serde_json::to_value(record).unwrap_or(Value::Null))
    }
}

impl From<RawPaymentRecord> for PaymentRecord {
    fn from(raw: RawPaymentRecord) -> Self {
        transform_payment_fms(&raw)
    }
}

/// List payloads arrive either bare or wrapped in `{ "data": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RecordList {
    Bare(Vec<PaymentRecord>),
    Wrapped { data: Vec<PaymentRecord> },
}

impl RecordList {
    pub fn into_records(self) -> Vec<PaymentRecord> {
        match self {
            RecordList::Bare(records) | RecordList::Wrapped { data: records } => records,
        }
    }
}

/// Normalize a raw API record, stamping missing timestamps with "now".
pub fn transform_payment_fms(raw: &RawPaymentRecord) -> PaymentRecord {
    transform_payment_fms_at(raw, Utc::now())
}

/// Normalize a raw API record.
///
/// Each field is read from its camelCase key, then its snake_case key, then
/// defaulted. Null and blank values count as absent. The function never
/// fails: non-object input yields an all-default record.
pub fn transform_payment_fms_at(raw: &RawPaymentRecord, now: DateTime<Utc>) -> PaymentRecord {
    let fields = Fields(raw.0.as_object());

    PaymentRecord {
        id: RecordId(fields.text(&["id", "_id"]).unwrap_or_default()),
        unique_no: fields.text(&["uniqueNo", "unique_no"]).unwrap_or_default(),
        fms_name: fields.text(&["fmsName", "fms_name"]).unwrap_or_default(),
        pay_to: fields.text(&["payTo", "pay_to"]).unwrap_or_default(),
        amount: fields.amount(&["amount"]),
        remarks: fields.text(&["remarks"]),
        stage_remarks: fields.text(&["stageRemarks", "stage_remarks"]),
        attachment: fields.text(&["attachment"]),
        payment_type: fields
            .text(&["paymentType", "payment_type"])
            .and_then(|value| PaymentType::parse_lenient(&value)),
        status: fields
            .text(&["status"])
            .and_then(|value| PaymentStatus::parse_lenient(&value))
            .unwrap_or_default(),
        created_at: fields
            .timestamp(&["createdAt", "created_at"])
            .unwrap_or(now),
    }
}

struct Fields<'a>(Option<&'a Map<String, Value>>);

impl<'a> Fields<'a> {
    fn values(&self, keys: &'a [&'a str]) -> impl Iterator<Item = &'a Value> + 'a {
        let object = self.0;
        keys.iter()
            .filter_map(move |key| object.and_then(|map| map.get(*key)))
            .filter(|value| !value.is_null())
    }

    fn text(&self, keys: &'a [&'a str]) -> Option<String> {
        self.values(keys).find_map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    fn amount(&self, keys: &'a [&'a str]) -> f64 {
        let parsed = self.values(keys).find_map(|value| match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s
                .trim()
                .trim_start_matches(CURRENCY_SYMBOL)
                .replace(',', "")
                .trim()
                .parse::<f64>()
                .ok(),
            _ => None,
        });

        match parsed {
            Some(amount) if amount.is_finite() && amount > 0.0 => amount,
            _ => 0.0,
        }
    }

    fn timestamp(&self, keys: &'a [&'a str]) -> Option<DateTime<Utc>> {
        self.values(keys).find_map(|value| match value {
            Value::String(s) => parse_timestamp(s.trim()),
            Value::Number(n) => n
                .as_i64()
                .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
            _ => None,
        })
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}
