//! Period statistics and drillable chart engine
//!
//! Year statistics documents are decoded into immutable [`PeriodNode`] trees.
//! The [`ChartEngine`] turns the displayed node into labelled series and maps
//! clicks back to the child period to drill into.

pub mod calendar;
pub mod chart;
pub mod error;
pub mod feed;
pub mod labels;
pub mod locale;
pub mod registry;
pub mod series;
pub mod source;
pub mod statistics;

pub use calendar::{Calendar, DateSpan};
pub use chart::{
    Bucket, CategoryAxis, ChartConfig, ChartEngine, DrillDownEvent, DrillDownSink, Series,
};
pub use error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger, ErrorSeverity};
pub use feed::{FeedState, StatisticsFeed};
pub use labels::{
    AxisLabel, LabelConverter, MonthLabelConverter, WeekLabelConverter, WeekdayLabelConverter,
};
pub use locale::ChartLocale;
pub use registry::{ConverterRegistry, DataConverterRef, LabelConverterRef};
pub use series::{DataConverter, StatisticsDataConverter};
pub use source::{FileStatisticsSource, InMemoryStatisticsSource, StatisticsQuery, StatisticsSource};
pub use statistics::{PeriodIdentity, PeriodNode, Totals};

pub use finchart_config::{Granularity, Metric, WeekStart};
