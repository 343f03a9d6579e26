//! Locale used for axis labels
//!
//! Month and weekday names come from chrono's locale tables. The locale also
//! fixes the first day of the week, either as configured or inferred from the
//! region of the identifier.

use chrono::{Datelike, Locale, NaiveDate, Weekday};
use finchart_config::{LocaleConfig, WeekStart};

use crate::calendar::Calendar;

/// Regions whose weeks start on Sunday
const SUNDAY_REGIONS: &[&str] = &["US", "CA", "MX", "BR", "JP", "KR", "TW", "IL", "PH", "SA"];

const FALLBACK_ID: &str = "en_US";

/// Resolved locale with its week layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartLocale {
    locale: Locale,
    week_start: WeekStart,
}

impl Default for ChartLocale {
    fn default() -> Self {
        Self {
            locale: Locale::en_US,
            week_start: WeekStart::Sunday,
        }
    }
}

impl ChartLocale {
    /// Resolve a locale identifier such as "en-US", "pl_PL" or "de".
    ///
    /// Unknown identifiers fall back to `en_US` with a warning. The week
    /// start is inferred from the region unless given.
    pub fn resolve(id: &str, week_start: Option<WeekStart>) -> Self {
        let normalized = id.trim().replace('-', "_");
        let locale = lookup(&normalized).unwrap_or_else(|| {
            log::warn!(
                target: "finchart::locale",
                "Unknown locale '{}', falling back to {}",
                id,
                FALLBACK_ID
            );
            Locale::en_US
        });

        let week_start = week_start.unwrap_or_else(|| {
            let region = region_of(&normalized).unwrap_or_else(|| region_of_locale(locale));
            infer_week_start(&region)
        });

        Self { locale, week_start }
    }

    pub fn from_config(config: &LocaleConfig) -> Self {
        Self::resolve(&config.id, config.week_start)
    }

    /// Same locale with an explicit week start
    pub fn with_week_start(mut self, week_start: WeekStart) -> Self {
        self.week_start = week_start;
        self
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Identifier of the resolved locale, e.g. "pl_PL"
    pub fn id(&self) -> String {
        format!("{:?}", self.locale)
    }

    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    pub fn calendar(&self) -> Calendar {
        Calendar::new(self.week_start)
    }

    /// Abbreviated month name of `date`
    pub fn month_abbrev(&self, date: NaiveDate) -> String {
        self.format(date, "%b")
    }

    /// Abbreviated weekday name
    pub fn weekday_abbrev(&self, weekday: Weekday) -> String {
        // 2024-01-01 is a Monday
        let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
        let date = monday + chrono::Duration::days(weekday.num_days_from_monday() as i64);
        debug_assert_eq!(date.weekday(), weekday);
        self.format(date, "%a")
    }

    fn format(&self, date: NaiveDate, pattern: &str) -> String {
        date.and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().format_localized(pattern, self.locale).to_string())
            .unwrap_or_default()
    }
}

fn lookup(normalized: &str) -> Option<Locale> {
    if let Ok(locale) = Locale::try_from(normalized) {
        return Some(locale);
    }

    // Bare language: try its default region
    let language = normalized.split('_').next()?.to_lowercase();
    let candidate = match language.as_str() {
        "en" => "en_US".to_string(),
        other => format!("{}_{}", other, other.to_uppercase()),
    };
    Locale::try_from(candidate.as_str()).ok()
}

fn region_of(normalized: &str) -> Option<String> {
    let region = normalized.split('_').nth(1)?;
    let region: String = region.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    if region.is_empty() {
        None
    } else {
        Some(region.to_uppercase())
    }
}

fn region_of_locale(locale: Locale) -> String {
    region_of(&format!("{:?}", locale)).unwrap_or_default()
}

fn infer_week_start(region: &str) -> WeekStart {
    if SUNDAY_REGIONS.contains(&region) {
        WeekStart::Sunday
    } else {
        WeekStart::Monday
    }
}
