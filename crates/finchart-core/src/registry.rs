//! Converter registry
//!
//! Maps each displayed granularity to the label converter that splits it.
//! The registry is built explicitly and handed to the engine; tests swap in
//! their own converters through [`ConverterRegistry::register`].

use finchart_config::{Granularity, Metric};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::labels::{LabelConverter, MonthLabelConverter, WeekLabelConverter, WeekdayLabelConverter};
use crate::series::{DataConverter, StatisticsDataConverter};

pub type LabelConverterRef = Arc<dyn LabelConverter>;
pub type DataConverterRef = Arc<dyn DataConverter>;

/// Built-in label converter for a granularity; days have none
pub fn standard_label_converter(granularity: Granularity) -> Option<LabelConverterRef> {
    match granularity {
        Granularity::Year => Some(Arc::new(MonthLabelConverter)),
        Granularity::Month => Some(Arc::new(WeekLabelConverter)),
        Granularity::Week => Some(Arc::new(WeekdayLabelConverter)),
        Granularity::Day => None,
    }
}

#[derive(Clone, Default)]
pub struct ConverterRegistry {
    label_converters: HashMap<Granularity, LabelConverterRef>,
}

impl std::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self.label_converters.keys().collect();
        keys.sort();
        f.debug_struct("ConverterRegistry")
            .field("granularities", &keys)
            .finish()
    }
}

impl ConverterRegistry {
    /// Registry with no converters
    pub fn empty() -> Self {
        Self::default()
    }

    /// Year to months, month to weeks, week to weekdays
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        for granularity in [
            Granularity::Year,
            Granularity::Month,
            Granularity::Week,
            Granularity::Day,
        ] {
            if let Some(converter) = standard_label_converter(granularity) {
                registry.register(granularity, converter);
            }
        }
        registry
    }

    /// Install or replace the converter for a granularity
    pub fn register(&mut self, granularity: Granularity, converter: LabelConverterRef) -> &mut Self {
        self.label_converters.insert(granularity, converter);
        self
    }

    pub fn supports(&self, granularity: Granularity) -> bool {
        self.label_converters.contains_key(&granularity)
    }

    pub fn label_converter(&self, granularity: Granularity) -> CoreResult<LabelConverterRef> {
        self.label_converters
            .get(&granularity)
            .cloned()
            .ok_or(CoreError::UnsupportedPeriod { granularity })
    }

    /// One statistics converter per metric, in the given order
    pub fn data_converters(&self, metrics: &[Metric]) -> Vec<DataConverterRef> {
        metrics
            .iter()
            .map(|metric| Arc::new(StatisticsDataConverter::new(*metric)) as DataConverterRef)
            .collect()
    }
}
