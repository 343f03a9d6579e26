//! Axis label converters
//!
//! A label converter turns a period into the ordered labels of its children:
//! a year into months, a month into the weeks overlapping it, a week into
//! weekdays. Labels follow the calendar, not the data, so gaps in the backing
//! statistics still get a label.
//!
//! Week splits and weekday order come from the calendar the node was built
//! with. The locale only supplies the names.

use chrono::{Datelike, NaiveDate};
use finchart_config::Granularity;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::locale::ChartLocale;
use crate::statistics::{node_year, PeriodIdentity, PeriodNode, MONTHS_IN_YEAR};

/// One axis position and the child period it stands for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisLabel {
    pub label: String,
    pub period: PeriodIdentity,
}

impl AxisLabel {
    pub fn new(label: impl Into<String>, granularity: Granularity, ordinal: usize) -> Self {
        Self {
            label: label.into(),
            period: PeriodIdentity::new(granularity, ordinal),
        }
    }
}

/// Produces the ordered child labels of a period
pub trait LabelConverter: Send + Sync {
    /// Granularity of the nodes this converter accepts
    fn source_granularity(&self) -> Granularity;

    /// Labels of the node's children in calendar order
    fn labels_for(&self, node: &PeriodNode, locale: &ChartLocale) -> CoreResult<Vec<AxisLabel>>;
}

fn expect_granularity(node: &PeriodNode, expected: Granularity) -> CoreResult<()> {
    if node.granularity() != expected {
        return Err(CoreError::GranularityMismatch {
            expected,
            actual: node.granularity(),
        });
    }
    Ok(())
}

/// Year into twelve abbreviated month names
#[derive(Debug, Clone, Copy, Default)]
pub struct MonthLabelConverter;

impl LabelConverter for MonthLabelConverter {
    fn source_granularity(&self) -> Granularity {
        Granularity::Year
    }

    fn labels_for(&self, node: &PeriodNode, locale: &ChartLocale) -> CoreResult<Vec<AxisLabel>> {
        expect_granularity(node, Granularity::Year)?;
        let year = node_year(node);

        (0..MONTHS_IN_YEAR)
            .map(|month0| {
                let first = NaiveDate::from_ymd_opt(year, month0 as u32 + 1, 1).ok_or_else(|| {
                    CoreError::malformed(format!("months.{}", month0), "month out of range")
                })?;
                Ok(AxisLabel::new(
                    locale.month_abbrev(first),
                    Granularity::Month,
                    month0,
                ))
            })
            .collect()
    }
}

/// Month into the weeks overlapping it, labelled by their clipped day range
#[derive(Debug, Clone, Copy, Default)]
pub struct WeekLabelConverter;

impl LabelConverter for WeekLabelConverter {
    fn source_granularity(&self) -> Granularity {
        Granularity::Month
    }

    fn labels_for(&self, node: &PeriodNode, locale: &ChartLocale) -> CoreResult<Vec<AxisLabel>> {
        expect_granularity(node, Granularity::Month)?;
        let month = node.span();
        let month_name = locale.month_abbrev(month.start);
        let weeks = node
            .calendar()
            .weeks_of_month(node_year(node), month.start.month0());

        Ok(weeks
            .iter()
            .enumerate()
            .map(|(ordinal, week)| {
                let label = if week.start == week.end {
                    format!("{} {}", week.start.day(), month_name)
                } else {
                    format!(
                        "{}\u{2013}{} {}",
                        week.start.day(),
                        week.end.day(),
                        month_name
                    )
                };
                AxisLabel::new(label, Granularity::Week, ordinal)
            })
            .collect())
    }
}

/// Week into seven weekday names in week-start order
#[derive(Debug, Clone, Copy, Default)]
pub struct WeekdayLabelConverter;

impl LabelConverter for WeekdayLabelConverter {
    fn source_granularity(&self) -> Granularity {
        Granularity::Week
    }

    fn labels_for(&self, node: &PeriodNode, locale: &ChartLocale) -> CoreResult<Vec<AxisLabel>> {
        expect_granularity(node, Granularity::Week)?;

        Ok(node
            .calendar()
            .weekday_order()
            .iter()
            .enumerate()
            .map(|(ordinal, weekday)| {
                AxisLabel::new(locale.weekday_abbrev(*weekday), Granularity::Day, ordinal)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Calendar;
    use finchart_config::WeekStart;
    use std::sync::Arc;

    const YEAR: &str = r#"{
        "income": 500000, "expenses": 320000,
        "months": {
            "3": { "income": 500000, "expenses": 320000, "hasTransactions": true,
                   "weeks": { "0": { "income": 1, "expenses": 0, "hasTransactions": true } } }
        }
    }"#;

    fn year(week_start: WeekStart) -> Arc<PeriodNode> {
        PeriodNode::from_year_json(2024, YEAR, &Calendar::new(week_start)).unwrap()
    }

    fn en_gb() -> ChartLocale {
        ChartLocale::resolve("en-GB", None)
    }

    #[test]
    fn test_month_labels() {
        let labels = MonthLabelConverter.labels_for(&year(WeekStart::Monday), &en_gb()).unwrap();
        assert_eq!(labels.len(), 12);
        assert_eq!(labels[0].label, "Jan");
        assert_eq!(labels[3].label, "Apr");
        assert_eq!(labels[11].label, "Dec");
        assert!(labels
            .iter()
            .enumerate()
            .all(|(i, l)| l.period == PeriodIdentity::new(Granularity::Month, i)));
    }

    #[test]
    fn test_week_labels() {
        let node = year(WeekStart::Monday);
        let april = node.child(3).unwrap();
        let labels = WeekLabelConverter.labels_for(april, &en_gb()).unwrap();
        let texts: Vec<&str> = labels.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(
            texts,
            vec!["1\u{2013}7 Apr", "8\u{2013}14 Apr", "15\u{2013}21 Apr", "22\u{2013}28 Apr", "29\u{2013}30 Apr"]
        );
        assert_eq!(labels[4].period, PeriodIdentity::new(Granularity::Week, 4));
    }

    #[test]
    fn test_single_day_week_label() {
        // March 2025 ends on a Monday
        let json = r#"{"income":0,"expenses":0,"months":{"2":{"income":0,"expenses":0,"hasTransactions":false}}}"#;
        let node = PeriodNode::from_year_json(2025, json, &Calendar::new(WeekStart::Monday)).unwrap();
        let labels = WeekLabelConverter.labels_for(node.child(2).unwrap(), &en_gb()).unwrap();
        assert_eq!(labels.len(), 6);
        assert_eq!(labels[0].label, "1\u{2013}2 Mar");
        assert_eq!(labels[5].label, "31 Mar");
    }

    #[test]
    fn test_weekday_labels_follow_node_week_start() {
        let sunday = year(WeekStart::Sunday);
        let week = sunday.child(3).unwrap().child(0).unwrap();
        let us = ChartLocale::resolve("en-US", None);
        let labels = WeekdayLabelConverter.labels_for(week, &us).unwrap();
        assert_eq!(labels.len(), 7);
        assert_eq!(labels[0].label, "Sun");
        assert_eq!(labels[6].label, "Sat");

        // A Monday locale does not reorder a Sunday-built week
        let labels = WeekdayLabelConverter.labels_for(week, &en_gb()).unwrap();
        assert_eq!(labels[0].label, "Sun");
        assert_eq!(labels[6].period, PeriodIdentity::new(Granularity::Day, 6));

        let monday = year(WeekStart::Monday);
        let week = monday.child(3).unwrap().child(0).unwrap();
        let labels = WeekdayLabelConverter.labels_for(week, &us).unwrap();
        assert_eq!(labels[0].label, "Mon");
        assert_eq!(labels[6].label, "Sun");
    }

    #[test]
    fn test_week_labels_follow_node_week_start() {
        // September 2024 starts on a Sunday: six Monday weeks, five Sunday weeks
        let json = r#"{"income":0,"expenses":0,"months":{"8":{"income":0,"expenses":0,"hasTransactions":true}}}"#;
        let us = ChartLocale::resolve("en-US", None);

        let node = PeriodNode::from_year_json(2024, json, &Calendar::new(WeekStart::Monday)).unwrap();
        let labels = WeekLabelConverter.labels_for(node.child(8).unwrap(), &us).unwrap();
        assert_eq!(labels.len(), 6);
        assert_eq!(labels[0].label, "1 Sep");
        assert_eq!(labels[1].label, "2\u{2013}8 Sep");

        let node = PeriodNode::from_year_json(2024, json, &Calendar::new(WeekStart::Sunday)).unwrap();
        let labels = WeekLabelConverter.labels_for(node.child(8).unwrap(), &en_gb()).unwrap();
        assert_eq!(labels.len(), 5);
        assert_eq!(labels[0].label, "1\u{2013}7 Sep");
    }

    #[test]
    fn test_wrong_granularity_is_rejected() {
        let node = year(WeekStart::Monday);
        let err = WeekLabelConverter.labels_for(&node, &en_gb()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::GranularityMismatch {
                expected: Granularity::Month,
                actual: Granularity::Year
            }
        ));
    }
}
