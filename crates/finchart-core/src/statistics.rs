//! Hierarchical period statistics
//!
//! A [`PeriodNode`] is an immutable snapshot of income and expense totals for
//! one period, with the children present in the backing data keyed by their
//! calendar ordinal. Nodes are built once per query result and shared as
//! `Arc<PeriodNode>`; nothing mutates them afterwards.

use chrono::Datelike;
use finchart_codec::{
    DayStatisticsDocument, MonthStatisticsDocument, TotalsDocument, WeekStatisticsDocument,
    YearStatisticsDocument,
};
use finchart_config::{Granularity, Metric};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::calendar::{Calendar, DateSpan};
use crate::error::{CoreError, CoreResult};

/// Number of months in a year
pub const MONTHS_IN_YEAR: usize = 12;

/// Number of days in a week
pub const DAYS_IN_WEEK: usize = 7;

/// Income and expense totals in minor units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub income: i64,
    pub expenses: i64,
}

impl Totals {
    pub fn new(income: i64, expenses: i64) -> Self {
        Self { income, expenses }
    }

    /// Total for one metric
    pub fn get(&self, metric: Metric) -> i64 {
        match metric {
            Metric::Income => self.income,
            Metric::Expenses => self.expenses,
        }
    }
}

/// A child position: its granularity and index among its siblings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeriodIdentity {
    pub granularity: Granularity,
    pub ordinal: usize,
}

impl PeriodIdentity {
    pub fn new(granularity: Granularity, ordinal: usize) -> Self {
        Self {
            granularity,
            ordinal,
        }
    }
}

/// Statistics for one period and the children present beneath it
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodNode {
    granularity: Granularity,
    span: DateSpan,
    totals: Totals,
    has_transactions: bool,
    slots: usize,
    /// Week layout the week and day ordinals were assigned with
    calendar: Calendar,
    children: BTreeMap<usize, Arc<PeriodNode>>,
}

impl PeriodNode {
    pub fn totals(&self) -> Totals {
        self.totals
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Calendar range of the period; weeks are clipped to their month
    pub fn span(&self) -> DateSpan {
        self.span
    }

    /// Whether any transaction was booked in the period, even if totals cancel out
    pub fn has_transactions(&self) -> bool {
        self.has_transactions
    }

    /// Number of calendar children: 12 months, the month's weeks, or 7 days
    pub fn slot_count(&self) -> usize {
        self.slots
    }

    pub fn calendar(&self) -> Calendar {
        self.calendar
    }

    pub fn child(&self, ordinal: usize) -> Option<&Arc<PeriodNode>> {
        self.children.get(&ordinal)
    }

    /// Children present in the backing data, in calendar order
    pub fn children(&self) -> Vec<(usize, &Arc<PeriodNode>)> {
        self.children.iter().map(|(k, v)| (*k, v)).collect()
    }

    pub fn is_terminal(&self) -> bool {
        self.granularity.is_terminal()
    }

    /// Build a year tree from its statistics document.
    ///
    /// Totals are taken as given and never checked against the children.
    pub fn from_year_document(
        year: i32,
        doc: &YearStatisticsDocument,
        calendar: &Calendar,
    ) -> CoreResult<Arc<PeriodNode>> {
        let span = calendar
            .year_span(year)
            .ok_or_else(|| CoreError::malformed("year", format!("year {} out of range", year)))?;
        let totals = required_totals(&doc.totals, "")?;

        let mut children = BTreeMap::new();
        for (key, month) in &doc.months {
            let path = format!("months.{}", key);
            let ordinal = parse_ordinal(key, MONTHS_IN_YEAR, &path)?;
            let node = month_node(year, ordinal as u32, month, calendar, &path)?;
            children.insert(ordinal, node);
        }

        let has_transactions = doc
            .totals
            .has_transactions
            .unwrap_or_else(|| children.values().any(|c| c.has_transactions));

        Ok(Arc::new(PeriodNode {
            granularity: Granularity::Year,
            span,
            totals,
            has_transactions,
            slots: MONTHS_IN_YEAR,
            calendar: *calendar,
            children,
        }))
    }

    /// Parse a JSON statistics document and build the year tree
    pub fn from_year_json(year: i32, json: &str, calendar: &Calendar) -> CoreResult<Arc<PeriodNode>> {
        let doc = YearStatisticsDocument::from_json(json)?;
        Self::from_year_document(year, &doc, calendar)
    }
}

fn month_node(
    year: i32,
    month0: u32,
    doc: &MonthStatisticsDocument,
    calendar: &Calendar,
    path: &str,
) -> CoreResult<Arc<PeriodNode>> {
    let span = calendar
        .month_span(year, month0)
        .ok_or_else(|| CoreError::malformed(path, "month out of range"))?;
    let weeks = calendar.weeks_of_month(year, month0);

    let mut children = BTreeMap::new();
    for (key, week) in &doc.weeks {
        let week_path = format!("{}.weeks.{}", path, key);
        let ordinal = parse_ordinal(key, weeks.len(), &week_path)?;
        children.insert(ordinal, week_node(weeks[ordinal], week, calendar, &week_path)?);
    }

    Ok(Arc::new(PeriodNode {
        granularity: Granularity::Month,
        span,
        totals: required_totals(&doc.totals, path)?,
        has_transactions: required_flag(&doc.totals, path)?,
        slots: weeks.len(),
        calendar: *calendar,
        children,
    }))
}

fn week_node(
    span: DateSpan,
    doc: &WeekStatisticsDocument,
    calendar: &Calendar,
    path: &str,
) -> CoreResult<Arc<PeriodNode>> {
    let mut children = BTreeMap::new();
    for (key, day) in &doc.days {
        let day_path = format!("{}.days.{}", path, key);
        let ordinal = parse_ordinal(key, DAYS_IN_WEEK, &day_path)?;
        let date = calendar.day_in_week(&span, ordinal);
        children.insert(ordinal, day_node(date, day, calendar, &day_path)?);
    }

    Ok(Arc::new(PeriodNode {
        granularity: Granularity::Week,
        span,
        totals: required_totals(&doc.totals, path)?,
        has_transactions: required_flag(&doc.totals, path)?,
        slots: DAYS_IN_WEEK,
        calendar: *calendar,
        children,
    }))
}

fn day_node(
    date: chrono::NaiveDate,
    doc: &DayStatisticsDocument,
    calendar: &Calendar,
    path: &str,
) -> CoreResult<Arc<PeriodNode>> {
    Ok(Arc::new(PeriodNode {
        granularity: Granularity::Day,
        span: DateSpan::single(date),
        totals: required_totals(&doc.totals, path)?,
        has_transactions: doc.totals.has_transactions.unwrap_or(false),
        slots: 0,
        calendar: *calendar,
        children: BTreeMap::new(),
    }))
}

fn field_path(path: &str, field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", path, field)
    }
}

fn required_totals(doc: &TotalsDocument, path: &str) -> CoreResult<Totals> {
    let income = doc
        .income
        .ok_or_else(|| CoreError::malformed(field_path(path, "income"), "missing total"))?;
    let expenses = doc
        .expenses
        .ok_or_else(|| CoreError::malformed(field_path(path, "expenses"), "missing total"))?;
    Ok(Totals::new(income, expenses))
}

fn required_flag(doc: &TotalsDocument, path: &str) -> CoreResult<bool> {
    doc.has_transactions.ok_or_else(|| {
        CoreError::malformed(field_path(path, "hasTransactions"), "missing flag")
    })
}

fn parse_ordinal(key: &str, slots: usize, path: &str) -> CoreResult<usize> {
    let ordinal: usize = key
        .parse()
        .map_err(|_| CoreError::malformed(path, "key is not an ordinal"))?;
    if ordinal >= slots {
        return Err(CoreError::malformed(
            path,
            format!("ordinal {} outside 0..{}", ordinal, slots),
        ));
    }
    Ok(ordinal)
}

/// Year of the period a node belongs to
pub(crate) fn node_year(node: &PeriodNode) -> i32 {
    node.span().start.year()
}
