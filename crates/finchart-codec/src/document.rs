//! Persistence shape of transactions
//!
//! Stored documents keep the amount as integer cents and the date as a
//! seconds/nanoseconds timestamp. The in-memory [`Transaction`] carries a
//! decimal amount and a UTC datetime.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CodecError, CodecResult};
use crate::money;

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Income => write!(f, "income"),
            TransactionKind::Expense => write!(f, "expense"),
        }
    }
}

/// Point in time as stored in documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanoseconds: u32,
}

impl Timestamp {
    pub fn from_datetime(date: &DateTime<Utc>) -> Self {
        Self {
            seconds: date.timestamp(),
            nanoseconds: date.timestamp_subsec_nanos(),
        }
    }

    pub fn to_datetime(&self) -> CodecResult<DateTime<Utc>> {
        DateTime::from_timestamp(self.seconds, self.nanoseconds).ok_or(
            CodecError::InvalidTimestamp {
                seconds: self.seconds,
                nanoseconds: self.nanoseconds,
            },
        )
    }
}

/// Transaction as used by the application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub date: DateTime<Utc>,
    pub category: String,
    pub wallet: String,
    pub description: Option<String>,
}

/// Transaction as written to storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDocument {
    /// Amount in minor units
    pub amount: i64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub date: Timestamp,
    pub category: String,
    pub wallet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TransactionDocument {
    /// Build the stored form; the amount is truncated to whole cents
    pub fn from_transaction(transaction: &Transaction) -> Self {
        Self {
            amount: money::encode(transaction.amount),
            kind: transaction.kind,
            date: Timestamp::from_datetime(&transaction.date),
            category: transaction.category.clone(),
            wallet: transaction.wallet.clone(),
            description: transaction.description.clone(),
        }
    }

    /// Rebuild the application form under the document's storage id
    pub fn into_transaction(self, id: impl Into<String>) -> CodecResult<Transaction> {
        Ok(Transaction {
            id: id.into(),
            amount: money::decode(self.amount),
            kind: self.kind,
            date: self.date.to_datetime()?,
            category: self.category,
            wallet: self.wallet,
            description: self.description,
        })
    }

    pub fn from_json(json: &str) -> CodecResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> CodecResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    fn groceries() -> Transaction {
        Transaction {
            id: "tx-1".to_string(),
            amount: Decimal::from_str("42.999").unwrap(),
            kind: TransactionKind::Expense,
            date: Utc.with_ymd_and_hms(2024, 4, 12, 18, 30, 0).unwrap(),
            category: "groceries".to_string(),
            wallet: "main".to_string(),
            description: None,
        }
    }

    #[test]
    fn test_write_truncates_amount() {
        let doc = TransactionDocument::from_transaction(&groceries());
        assert_eq!(doc.amount, 4299);
        assert_eq!(doc.kind, TransactionKind::Expense);
        assert_eq!(doc.date.seconds, 1712946600);
        assert_eq!(doc.date.nanoseconds, 0);
    }

    #[test]
    fn test_description_only_written_when_present() {
        let doc = TransactionDocument::from_transaction(&groceries());
        let json = doc.to_json().unwrap();
        assert!(!json.contains("description"));
        assert!(json.contains("\"type\":\"expense\""));
        assert!(json.contains("\"amount\":4299"));

        let mut tx = groceries();
        tx.description = Some("weekly shop".to_string());
        let json = TransactionDocument::from_transaction(&tx).to_json().unwrap();
        assert!(json.contains("weekly shop"));
    }

    #[test]
    fn test_read_decodes_amount_and_date() {
        let json = r#"{"amount":-1250,"type":"income","date":{"seconds":1712946600,"nanoseconds":500},"category":"refund","wallet":"cash"}"#;
        let tx = TransactionDocument::from_json(json)
            .unwrap()
            .into_transaction("doc-9")
            .unwrap();

        assert_eq!(tx.id, "doc-9");
        assert_eq!(tx.amount.to_string(), "-12.50");
        assert_eq!(tx.kind, TransactionKind::Income);
        assert_eq!(tx.date.timestamp(), 1712946600);
        assert_eq!(tx.date.timestamp_subsec_nanos(), 500);
        assert!(tx.description.is_none());
    }

    #[test]
    fn test_invalid_timestamp() {
        let doc = TransactionDocument {
            amount: 1,
            kind: TransactionKind::Income,
            date: Timestamp {
                seconds: i64::MAX,
                nanoseconds: 0,
            },
            category: "c".to_string(),
            wallet: "w".to_string(),
            description: None,
        };
        assert!(matches!(
            doc.into_transaction("x"),
            Err(CodecError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            TransactionDocument::from_json("{\"amount\":\"ten\"}"),
            Err(CodecError::Json(_))
        ));
    }
}
