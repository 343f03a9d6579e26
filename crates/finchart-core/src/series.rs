//! Series data converters
//!
//! A data converter pulls one metric out of every child slot of a period.
//! Missing children are gaps and chart as zero.

use finchart_codec::money;
use finchart_config::Metric;
use rust_decimal::Decimal;

use crate::statistics::PeriodNode;

/// Produces one value per calendar child of a period
pub trait DataConverter: Send + Sync {
    /// Metric plotted by this series
    fn metric(&self) -> Metric;

    /// Values in calendar order, one per child slot
    fn series_for(&self, node: &PeriodNode) -> Vec<Decimal>;
}

/// Reads a metric from the children's totals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatisticsDataConverter {
    metric: Metric,
}

impl StatisticsDataConverter {
    pub fn new(metric: Metric) -> Self {
        Self { metric }
    }
}

impl DataConverter for StatisticsDataConverter {
    fn metric(&self) -> Metric {
        self.metric
    }

    fn series_for(&self, node: &PeriodNode) -> Vec<Decimal> {
        (0..node.slot_count())
            .map(|ordinal| {
                let cents = node
                    .child(ordinal)
                    .map(|child| child.totals().get(self.metric))
                    .unwrap_or(0);
                money::decode(cents)
            })
            .collect()
    }
}
