//! Money codec and persistence document shapes
//!
//! Amounts are stored as integer minor units and presented as decimals
//! with two fraction digits; see [`money`].

pub mod document;
pub mod error;
pub mod money;
pub mod statistics;

pub use error::{CodecError, CodecResult};
pub use money::{decode, encode, format_amount, try_encode, AmountFormat, MAX_MINOR_UNITS};
pub use document::{Timestamp, Transaction, TransactionDocument, TransactionKind};
pub use statistics::{
    DayStatisticsDocument, MonthStatisticsDocument, TotalsDocument, WeekStatisticsDocument,
    YearStatisticsDocument,
};
