// Filter selections coming from the UI: one manufacturer or all of them, a
// date range and a subset of months. Records are monthly, so a date range
// keeps every (year, month) period that overlaps it.
use crate::error::ConfigError;
use crate::month::Month;
use crate::types::{ManufacturerKey, Record};
use chrono::NaiveDate;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ManufacturerFilter {
    #[default]
    All,
    Only(String),
}

impl ManufacturerFilter {
    pub fn is_all(&self) -> bool {
        matches!(self, ManufacturerFilter::All)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ConfigError> {
        if start > end {
            return Err(ConfigError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether any day of the given month falls inside the range.
    pub fn overlaps_month(&self, year: i32, month: Month) -> bool {
        let Some(first) = NaiveDate::from_ymd_opt(year, month.number(), 1) else {
            return false;
        };
        let (ny, nm) = if month == Month::Dez {
            (year + 1, 1)
        } else {
            (year, month.number() + 1)
        };
        let last = match NaiveDate::from_ymd_opt(ny, nm, 1).and_then(|d| d.pred_opt()) {
            Some(d) => d,
            None => return false,
        };
        first <= self.end && last >= self.start
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    pub manufacturer: ManufacturerFilter,
    pub date_range: Option<DateRange>,
    /// `None` keeps every month.
    pub months: Option<BTreeSet<Month>>,
}

impl Filters {
    pub fn matches(&self, record: &Record, key: ManufacturerKey) -> bool {
        if let ManufacturerFilter::Only(m) = &self.manufacturer {
            if record.manufacturer(key) != m.as_str() {
                return false;
            }
        }
        if let Some(range) = &self.date_range {
            if !range.overlaps_month(record.year, record.month) {
                return false;
            }
        }
        match &self.months {
            Some(months) => months.contains(&record.month),
            None => true,
        }
    }

    /// The same date and month selection over every manufacturer.
    pub fn period(&self) -> Filters {
        Filters {
            manufacturer: ManufacturerFilter::All,
            ..self.clone()
        }
    }

    pub fn apply(&self, records: &[Record], key: ManufacturerKey) -> Vec<Record> {
        records
            .iter()
            .filter(|r| self.matches(r, key))
            .cloned()
            .collect()
    }
}

/// Distinct manufacturers in ascending order, for the selection list.
pub fn manufacturer_options(records: &[Record], key: ManufacturerKey) -> Vec<String> {
    records
        .iter()
        .map(|r| r.manufacturer(key).to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
