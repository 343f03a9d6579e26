//! Raw wallet statistics documents
//!
//! One document per year (or per wallet and year). Every amount is integer
//! cents. Fields are optional here so that a missing total can be reported
//! against its exact path by the statistics model instead of failing the
//! whole deserialization.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::CodecResult;

/// Totals shared by every level of the hierarchy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expenses: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_transactions: Option<bool>,
}

/// Day bucket, keyed by its position within the week
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayStatisticsDocument {
    #[serde(flatten)]
    pub totals: TotalsDocument,
}

/// Week bucket, keyed by its position within the month
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekStatisticsDocument {
    #[serde(flatten)]
    pub totals: TotalsDocument,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub days: BTreeMap<String, DayStatisticsDocument>,
}

/// Month bucket, keyed by its zero-based month number
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthStatisticsDocument {
    #[serde(flatten)]
    pub totals: TotalsDocument,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub weeks: BTreeMap<String, WeekStatisticsDocument>,
}

/// A year's worth of nested totals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearStatisticsDocument {
    #[serde(flatten)]
    pub totals: TotalsDocument,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub months: BTreeMap<String, MonthStatisticsDocument>,
}

impl YearStatisticsDocument {
    pub fn from_json(json: &str) -> CodecResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> CodecResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
