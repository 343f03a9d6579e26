#![allow(dead_code)]

use finchart_core::{
    CategoryAxis, ChartEngine, ChartLocale, ConverterRegistry, CoreError, ErrorContext,
    ErrorLogger, Granularity, Metric, PeriodNode, WeekStart,
};
use std::sync::{Arc, Mutex};

/// Twelve 100-wide bands for a year
pub const AXIS_END: f64 = 1200.0;

/// A year where April carries income, March only offsetting transactions,
/// and January nothing at all
pub const YEAR_2024: &str = r#"{
    "income": 500000, "expenses": 320000,
    "months": {
        "0": { "income": 0, "expenses": 0, "hasTransactions": false },
        "2": { "income": 0, "expenses": 0, "hasTransactions": true,
               "weeks": { "0": { "income": 2500, "expenses": 2500, "hasTransactions": true } } },
        "3": { "income": 500000, "expenses": 320000, "hasTransactions": true,
               "weeks": {
                   "0": { "income": 500000, "expenses": 120000, "hasTransactions": true,
                          "days": {
                              "0": { "income": 500000, "expenses": 0, "hasTransactions": true },
                              "4": { "income": 0, "expenses": 120000, "hasTransactions": true }
                          } },
                   "2": { "income": 0, "expenses": 200000, "hasTransactions": true }
               } }
    }
}"#;

pub fn locale() -> ChartLocale {
    ChartLocale::resolve("en-GB", Some(WeekStart::Monday))
}

pub fn year() -> Arc<PeriodNode> {
    PeriodNode::from_year_json(2024, YEAR_2024, &locale().calendar()).unwrap()
}

pub fn engine_at(granularity: Granularity) -> ChartEngine {
    let registry = ConverterRegistry::standard();
    let converters = registry.data_converters(&[Metric::Income, Metric::Expenses]);
    ChartEngine::new(
        registry,
        locale(),
        granularity,
        converters,
        CategoryAxis::new(0.0, AXIS_END),
    )
    .unwrap()
}

/// Center of bucket `index` out of `count`
pub fn x_of(index: usize, count: usize) -> f64 {
    CategoryAxis::new(0.0, AXIS_END).center_of(index, count).unwrap()
}

/// Error logger that keeps what it was given
#[derive(Default)]
pub struct RecordingLogger {
    pub errors: Mutex<Vec<String>>,
}

impl ErrorLogger for RecordingLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        self.errors
            .lock()
            .unwrap()
            .push(format!("{}: {}", context.operation, error.code()));
    }
}
