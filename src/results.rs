use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// One review container as found on a page, before any coercion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// Raw `datetime` attribute of the review's time element
    pub date: Option<String>,

    /// Review body, trimmed; inner line breaks kept
    pub text: Option<String>,
}

impl ReviewRecord {
    pub fn new(date: Option<String>, text: Option<String>) -> Self {
        Self { date, text }
    }
}

/// A table row after date coercion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRow {
    pub date: Option<DateTime<Utc>>,
    pub text: Option<String>,
}

impl ReviewRow {
    /// Date as used in per-review filenames
    pub fn date_slug(&self) -> String {
        match &self.date {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => "unknown_date".to_string(),
        }
    }

    /// Date as shown on the first line of a per-review file
    pub fn date_display(&self) -> String {
        match &self.date {
            Some(date) => date.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => "unknown".to_string(),
        }
    }
}

/// Ordered collection of review rows, page order then in-page order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewTable {
    rows: Vec<ReviewRow>,
}

impl ReviewTable {
    /// Build the table from extracted records.
    ///
    /// Dates that fail to parse become `None`; rows left with neither a
    /// date nor a text are dropped.
    pub fn from_records(records: Vec<ReviewRecord>) -> Self {
        let total = records.len();
        let rows: Vec<ReviewRow> = records
            .into_iter()
            .map(|record| ReviewRow {
                date: record.date.as_deref().and_then(parse_review_date),
                text: record.text,
            })
            .filter(|row| row.date.is_some() || row.text.is_some())
            .collect();

        if rows.len() < total {
            ::log::debug!("Dropped {} empty rows", total - rows.len());
        }

        Self { rows }
    }

    pub fn rows(&self) -> &[ReviewRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First `n` rows, for printing a sample
    pub fn head(&self, n: usize) -> &[ReviewRow] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// True when every present date has no time-of-day component
    pub fn dates_are_day_only(&self) -> bool {
        self.rows.iter().filter_map(|row| row.date).all(|date| {
            date.hour() == 0 && date.minute() == 0 && date.second() == 0 && date.nanosecond() == 0
        })
    }
}

/// Coerce a raw `datetime` attribute into a UTC timestamp.
///
/// Accepts RFC 3339, naive `T`/space separated date-times (taken as UTC)
/// and bare dates. Anything else yields `None`.
pub fn parse_review_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Counters collected over one scrape run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeReport {
    pub pages_attempted: u32,
    pub pages_ok: u32,
    pub pages_bad_status: u32,
    pub pages_transport_error: u32,
    pub pages_without_containers: u32,
    pub records: usize,
    pub missing_dates: usize,
    pub missing_texts: usize,
}
