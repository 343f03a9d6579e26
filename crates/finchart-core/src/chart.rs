//! Drillable chart engine
//!
//! The engine combines one label converter, chosen by the displayed
//! granularity, with one data converter per plotted metric. It re-renders
//! when the displayed node or the granularity changes, and resolves clicks
//! against the buckets captured at the last render.
//!
//! A render is published only when every series lines up with the labels.
//! Errors clear the current render so a stale chart is never left on screen.

use finchart_config::{Granularity, Metric};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

use crate::error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger};
use crate::locale::ChartLocale;
use crate::registry::{ConverterRegistry, DataConverterRef, LabelConverterRef};
use crate::statistics::{PeriodIdentity, PeriodNode};

// ==================== Render Output ====================

/// One chart position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub label: String,
    pub period: PeriodIdentity,
    /// Captured at render time; decides whether a click may drill down
    pub has_transactions: bool,
}

impl Bucket {
    /// Whether a click on this bucket emits a drill-down
    pub fn is_drillable(&self) -> bool {
        self.has_transactions && !self.period.granularity.is_terminal()
    }
}

/// Values of one metric, parallel to the buckets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    pub metric: Metric,
    pub values: Vec<Decimal>,
}

/// Renderable chart: ordered buckets and one series per metric
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Granularity of the displayed node
    pub granularity: Granularity,
    pub buckets: Vec<Bucket>,
    pub series: Vec<Series>,
}

impl ChartConfig {
    pub fn labels(&self) -> Vec<&str> {
        self.buckets.iter().map(|b| b.label.as_str()).collect()
    }

    pub fn series(&self, metric: Metric) -> Option<&[Decimal]> {
        self.series
            .iter()
            .find(|s| s.metric == metric)
            .map(|s| s.values.as_slice())
    }
}

// ==================== Axis ====================

/// Horizontal extent of the plotted buckets, split into equal category bands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryAxis {
    pub start: f64,
    pub end: f64,
}

impl Default for CategoryAxis {
    fn default() -> Self {
        Self {
            start: 0.0,
            end: 1200.0,
        }
    }
}

impl CategoryAxis {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Band containing `x`, `None` outside `[start, end)`
    pub fn index_at(&self, x: f64, count: usize) -> Option<usize> {
        if count == 0 || self.end.partial_cmp(&self.start) != Some(Ordering::Greater) {
            return None;
        }
        if x.is_nan() || x < self.start || x >= self.end {
            return None;
        }
        let band = (self.end - self.start) / count as f64;
        let index = ((x - self.start) / band).floor() as usize;
        Some(index.min(count - 1))
    }

    /// Middle of the band at `index`
    pub fn center_of(&self, index: usize, count: usize) -> Option<f64> {
        if index >= count {
            return None;
        }
        let band = (self.end - self.start) / count as f64;
        Some(self.start + band * (index as f64 + 0.5))
    }
}

// ==================== Drill-down ====================

/// Request to open the child period behind a clicked bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrillDownEvent {
    pub granularity: Granularity,
    pub ordinal: usize,
    pub label: String,
}

/// Receiver of drill-down requests
pub trait DrillDownSink: Send + Sync {
    fn on_drill_down(&self, event: &DrillDownEvent);
}

impl<F> DrillDownSink for F
where
    F: Fn(&DrillDownEvent) + Send + Sync,
{
    fn on_drill_down(&self, event: &DrillDownEvent) {
        self(event)
    }
}

impl DrillDownSink for UnboundedSender<DrillDownEvent> {
    fn on_drill_down(&self, event: &DrillDownEvent) {
        if self.send(event.clone()).is_err() {
            log::debug!(target: "finchart::chart", "Drill-down receiver dropped");
        }
    }
}

// ==================== Engine ====================

pub struct ChartEngine {
    registry: ConverterRegistry,
    locale: ChartLocale,
    granularity: Granularity,
    label_converter: LabelConverterRef,
    data_converters: Vec<DataConverterRef>,
    axis: CategoryAxis,
    node: Option<Arc<PeriodNode>>,
    rendered: Option<ChartConfig>,
    sinks: Vec<Box<dyn DrillDownSink>>,
    error_logger: Arc<dyn ErrorLogger>,
}

impl std::fmt::Debug for ChartEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartEngine")
            .field("granularity", &self.granularity)
            .field("locale", &self.locale)
            .field("axis", &self.axis)
            .field("series", &self.data_converters.len())
            .field("rendered", &self.rendered.is_some())
            .finish()
    }
}

impl ChartEngine {
    /// Create an engine displaying `granularity`.
    ///
    /// Fails with `NoSeries` without data converters and with
    /// `UnsupportedPeriod` when the registry cannot split `granularity`.
    pub fn new(
        registry: ConverterRegistry,
        locale: ChartLocale,
        granularity: Granularity,
        data_converters: Vec<DataConverterRef>,
        axis: CategoryAxis,
    ) -> CoreResult<Self> {
        if data_converters.is_empty() {
            return Err(CoreError::NoSeries);
        }
        let label_converter = registry.label_converter(granularity)?;

        Ok(Self {
            registry,
            locale,
            granularity,
            label_converter,
            data_converters,
            axis,
            node: None,
            rendered: None,
            sinks: Vec::new(),
            error_logger: Arc::new(DefaultErrorLogger),
        })
    }

    pub fn with_error_logger(mut self, logger: Arc<dyn ErrorLogger>) -> Self {
        self.error_logger = logger;
        self
    }

    /// Register a receiver for drill-down requests
    pub fn add_sink(&mut self, sink: impl DrillDownSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn locale(&self) -> &ChartLocale {
        &self.locale
    }

    pub fn node(&self) -> Option<&Arc<PeriodNode>> {
        self.node.as_ref()
    }

    /// Last published render
    pub fn current(&self) -> Option<&ChartConfig> {
        self.rendered.as_ref()
    }

    pub fn axis(&self) -> CategoryAxis {
        self.axis
    }

    pub fn set_axis(&mut self, axis: CategoryAxis) {
        self.axis = axis;
    }

    /// Display another period node
    pub fn show(&mut self, node: Arc<PeriodNode>) -> CoreResult<Option<&ChartConfig>> {
        self.node = Some(node);
        self.render()
    }

    /// Switch the displayed granularity, swapping the label converter
    pub fn set_granularity(&mut self, granularity: Granularity) -> CoreResult<Option<&ChartConfig>> {
        if let Err(e) = self.swap_converter(granularity) {
            return Err(self.fail(e));
        }
        self.render()
    }

    /// Switch granularity and node together with a single render
    pub fn show_at(
        &mut self,
        granularity: Granularity,
        node: Arc<PeriodNode>,
    ) -> CoreResult<Option<&ChartConfig>> {
        if let Err(e) = self.swap_converter(granularity) {
            return Err(self.fail(e));
        }
        self.node = Some(node);
        self.render()
    }

    /// Drop the displayed node after its statistics failed to load
    pub fn clear(&mut self, error: &CoreError) {
        self.node = None;
        self.rendered = None;
        self.log_failure(error, "load");
    }

    /// Bucket under `x`, from the last render
    pub fn bucket_at(&self, x: f64) -> Option<&Bucket> {
        let rendered = self.rendered.as_ref()?;
        let index = self.axis.index_at(x, rendered.buckets.len())?;
        rendered.buckets.get(index)
    }

    /// Resolve a click at `x` and emit a drill-down if the bucket allows it
    pub fn click(&self, x: f64) -> Option<DrillDownEvent> {
        let bucket = self.bucket_at(x)?;
        if !bucket.is_drillable() {
            log::debug!(
                target: "finchart::chart",
                "Ignoring click on '{}': not drillable",
                bucket.label
            );
            return None;
        }

        let event = DrillDownEvent {
            granularity: bucket.period.granularity,
            ordinal: bucket.period.ordinal,
            label: bucket.label.clone(),
        };
        log::info!(
            target: "finchart::chart",
            "Drill down into {} {} ({})",
            event.granularity,
            event.ordinal,
            event.label
        );
        for sink in &self.sinks {
            sink.on_drill_down(&event);
        }
        Some(event)
    }

    fn swap_converter(&mut self, granularity: Granularity) -> CoreResult<()> {
        let converter = self.registry.label_converter(granularity)?;
        self.granularity = granularity;
        self.label_converter = converter;
        Ok(())
    }

    fn render(&mut self) -> CoreResult<Option<&ChartConfig>> {
        self.rendered = None;
        let Some(node) = self.node.clone() else {
            return Ok(None);
        };
        if node.granularity() != self.granularity {
            log::debug!(
                target: "finchart::chart",
                "Holding render: node is a {}, displaying {}",
                node.granularity(),
                self.granularity
            );
            return Ok(None);
        }

        match self.build(&node) {
            Ok(config) => {
                log::debug!(
                    target: "finchart::chart",
                    "Rendered {} buckets for {}",
                    config.buckets.len(),
                    config.granularity
                );
                self.rendered = Some(config);
                Ok(self.rendered.as_ref())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn build(&self, node: &PeriodNode) -> CoreResult<ChartConfig> {
        let labels = self.label_converter.labels_for(node, &self.locale)?;

        let mut series = Vec::with_capacity(self.data_converters.len());
        for converter in &self.data_converters {
            let values = converter.series_for(node);
            if values.len() != labels.len() {
                return Err(CoreError::SeriesLabelMismatch {
                    metric: converter.metric(),
                    labels: labels.len(),
                    values: values.len(),
                });
            }
            series.push(Series {
                metric: converter.metric(),
                values,
            });
        }

        let buckets = labels
            .into_iter()
            .map(|label| Bucket {
                has_transactions: node
                    .child(label.period.ordinal)
                    .map(|child| child.has_transactions())
                    .unwrap_or(false),
                label: label.label,
                period: label.period,
            })
            .collect();

        Ok(ChartConfig {
            granularity: self.granularity,
            buckets,
            series,
        })
    }

    fn fail(&mut self, error: CoreError) -> CoreError {
        self.rendered = None;
        self.log_failure(&error, "render");
        error
    }

    fn log_failure(&self, error: &CoreError, operation: &str) {
        let context = ErrorContext::new(operation)
            .with_data("granularity", serde_json::json!(self.granularity));
        self.error_logger.log_error(error, &context);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Calendar;
    use std::sync::Mutex;

    const YEAR: &str = r#"{
        "income": 500000, "expenses": 320000,
        "months": {
            "0": { "income": 0, "expenses": 0, "hasTransactions": false },
            "3": { "income": 500000, "expenses": 320000, "hasTransactions": true,
                   "weeks": { "0": { "income": 500000, "expenses": 320000, "hasTransactions": true } } }
        }
    }"#;

    fn engine() -> ChartEngine {
        let registry = ConverterRegistry::standard();
        let converters = registry.data_converters(&[Metric::Expenses, Metric::Income]);
        ChartEngine::new(
            registry,
            ChartLocale::resolve("en-GB", None),
            Granularity::Year,
            converters,
            CategoryAxis::new(0.0, 1200.0),
        )
        .unwrap()
    }

    fn year() -> Arc<PeriodNode> {
        PeriodNode::from_year_json(2024, YEAR, &Calendar::default()).unwrap()
    }

    #[test]
    fn test_axis_bands() {
        let axis = CategoryAxis::new(0.0, 1200.0);
        assert_eq!(axis.index_at(0.0, 12), Some(0));
        assert_eq!(axis.index_at(99.9, 12), Some(0));
        assert_eq!(axis.index_at(100.0, 12), Some(1));
        assert_eq!(axis.index_at(1199.9, 12), Some(11));
        assert_eq!(axis.index_at(1200.0, 12), None);
        assert_eq!(axis.index_at(-1.0, 12), None);
        assert_eq!(axis.index_at(f64::NAN, 12), None);
        assert_eq!(axis.index_at(10.0, 0), None);
        assert_eq!(axis.center_of(3, 12), Some(350.0));
        assert_eq!(axis.center_of(12, 12), None);
    }

    #[test]
    fn test_new_requires_series() {
        let err = ChartEngine::new(
            ConverterRegistry::standard(),
            ChartLocale::default(),
            Granularity::Year,
            vec![],
            CategoryAxis::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::NoSeries));
    }

    #[test]
    fn test_new_rejects_day() {
        let registry = ConverterRegistry::standard();
        let converters = registry.data_converters(&[Metric::Income]);
        let err = ChartEngine::new(
            registry,
            ChartLocale::default(),
            Granularity::Day,
            converters,
            CategoryAxis::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedPeriod { .. }));
    }

    #[test]
    fn test_nothing_rendered_without_node() {
        let engine = engine();
        assert!(engine.current().is_none());
        assert!(engine.click(350.0).is_none());
    }

    #[test]
    fn test_show_renders_year() {
        let mut engine = engine();
        let config = engine.show(year()).unwrap().unwrap().clone();
        assert_eq!(config.granularity, Granularity::Year);
        assert_eq!(config.buckets.len(), 12);
        assert_eq!(config.labels()[3], "Apr");
        assert_eq!(config.series(Metric::Income).unwrap()[3].to_string(), "5000.00");
        assert_eq!(config.series(Metric::Expenses).unwrap()[3].to_string(), "3200.00");
        assert_eq!(config.series[0].metric, Metric::Expenses);
        assert!(config.buckets[3].has_transactions);
        assert!(!config.buckets[0].has_transactions);
        assert!(!config.buckets[5].has_transactions);
    }

    #[test]
    fn test_click_emits_to_sinks() {
        let mut engine = engine();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let captured = seen.clone();
        engine.add_sink(move |event: &DrillDownEvent| {
            captured.lock().unwrap().push(event.clone());
        });
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<DrillDownEvent>();
        engine.add_sink(tx);

        engine.show(year()).unwrap();
        let event = engine.click(350.0).unwrap();
        assert_eq!(event.granularity, Granularity::Month);
        assert_eq!(event.ordinal, 3);
        assert_eq!(event.label, "Apr");

        assert_eq!(seen.lock().unwrap().as_slice(), &[event.clone()]);
        assert_eq!(rx.try_recv().unwrap(), event);
    }

    #[test]
    fn test_click_on_empty_bucket_is_ignored() {
        let mut engine = engine();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<DrillDownEvent>();
        engine.add_sink(tx);
        engine.show(year()).unwrap();

        assert!(engine.click(50.0).is_none());
        assert!(engine.click(1250.0).is_none());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_mismatched_node_holds_render() {
        let mut engine = engine();
        let node = year();
        engine.show(node.clone()).unwrap();
        assert!(engine.current().is_some());

        // Month converter selected while the year node is still displayed
        assert!(engine.set_granularity(Granularity::Month).unwrap().is_none());
        assert!(engine.current().is_none());

        let april = node.child(3).unwrap().clone();
        let config = engine.show(april).unwrap().unwrap();
        assert_eq!(config.granularity, Granularity::Month);
        assert_eq!(config.buckets.len(), 5);
    }

    #[test]
    fn test_unsupported_granularity_clears_render() {
        let mut engine = engine();
        engine.show(year()).unwrap();
        let err = engine.set_granularity(Granularity::Day).unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedPeriod { .. }));
        assert!(engine.current().is_none());
        assert_eq!(engine.granularity(), Granularity::Year);
    }

    #[test]
    fn test_failed_load_clears_render() {
        let mut engine = engine();
        engine.show(year()).unwrap();
        assert!(engine.current().is_some());

        engine.clear(&CoreError::malformed("months.3.expenses", "missing total"));
        assert!(engine.current().is_none());
        assert!(engine.node().is_none());
        assert!(engine.click(350.0).is_none());

        // Switching granularity has nothing to redraw
        assert!(engine.set_granularity(Granularity::Month).unwrap().is_none());
    }

    #[test]
    fn test_degenerate_axis_has_no_bands() {
        let axis = CategoryAxis::new(100.0, 100.0);
        assert_eq!(axis.index_at(100.0, 12), None);
        let axis = CategoryAxis::new(f64::NAN, 1200.0);
        assert_eq!(axis.index_at(10.0, 12), None);
    }

    #[test]
    fn test_click_uses_latest_render() {
        let mut engine = engine();
        engine.show(year()).unwrap();
        let empty = r#"{"income":0,"expenses":0}"#;
        let replacement = PeriodNode::from_year_json(2024, empty, &Calendar::default()).unwrap();
        engine.show(replacement).unwrap();
        assert!(engine.click(350.0).is_none());
    }

    #[test]
    fn test_render_serializes() {
        let mut engine = engine();
        let config = engine.show(year()).unwrap().unwrap();
        let json = serde_json::to_value(config).unwrap();
        assert_eq!(json["granularity"], "year");
        assert_eq!(json["buckets"][3]["period"]["granularity"], "month");
        assert_eq!(json["series"][1]["metric"], "income");
    }
}
