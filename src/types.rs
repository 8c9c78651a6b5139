use crate::month::Month;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use tabled::Tabled;

/// One cell of the raw query result, before canonicalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Int(i64),
    Decimal(f64),
    Text(String),
}

impl RawValue {
    /// Text rendering used in error messages.
    pub fn describe(&self) -> String {
        match self {
            RawValue::Null => "NULL".to_string(),
            RawValue::Int(i) => i.to_string(),
            RawValue::Decimal(d) => d.to_string(),
            RawValue::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<i64> for RawValue {
    fn from(i: i64) -> Self {
        RawValue::Int(i)
    }
}

impl From<f64> for RawValue {
    fn from(d: f64) -> Self {
        RawValue::Decimal(d)
    }
}

/// Raw tabular result as delivered by the data source: a header plus rows
/// aligned to it. Column names are whatever the source uses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawValue>>,
}

impl RawTable {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<RawValue>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }
}

/// Canonical column names the normalizer maps source columns onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Column {
    ManufacturerCode,
    ManufacturerName,
    Year,
    Month,
    AmountBought,
    AmountSold,
    Difference,
}

impl Column {
    pub fn is_required(self) -> bool {
        self != Column::Difference
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Metric {
    AmountBought,
    AmountSold,
    Difference,
}

impl Metric {
    pub fn value(self, record: &Record) -> f64 {
        match self {
            Metric::AmountBought => record.amount_bought,
            Metric::AmountSold => record.amount_sold,
            Metric::Difference => record.difference,
        }
    }

    pub fn of_entry(self, entry: &RankingEntry) -> f64 {
        match self {
            Metric::AmountBought => entry.total_bought,
            Metric::AmountSold => entry.total_sold,
            Metric::Difference => entry.total_difference,
        }
    }

    pub fn tab_label(self) -> &'static str {
        match self {
            Metric::AmountBought => "Compras",
            Metric::AmountSold => "Vendas",
            Metric::Difference => "Balanço",
        }
    }

    pub fn heatmap_title(self) -> &'static str {
        match self {
            Metric::AmountBought => "Heatmap de Compras",
            Metric::AmountSold => "Heatmap de Vendas",
            Metric::Difference => "Balanço Compra vs Venda",
        }
    }

    /// Colour scale the heatmap renderer should use for this metric.
    pub fn color_scale(self) -> &'static str {
        match self {
            Metric::AmountBought => "Blues",
            Metric::AmountSold => "Reds",
            Metric::Difference => "RdBu_r",
        }
    }
}

/// Which record field identifies a manufacturer when grouping. Grouping by
/// name merges distinct codes that share a display name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManufacturerKey {
    #[default]
    Name,
    Code,
}

/// A manufacturer/month observation after canonicalization, with duplicate
/// (code, year, month) rows already summed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub manufacturer_code: String,
    pub manufacturer_name: String,
    pub year: i32,
    pub month: Month,
    pub amount_bought: f64,
    pub amount_sold: f64,
    pub difference: f64,
}

impl Record {
    pub fn manufacturer(&self, key: ManufacturerKey) -> &str {
        match key {
            ManufacturerKey::Name => &self.manufacturer_name,
            ManufacturerKey::Code => &self.manufacturer_code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    pub manufacturer: String,
    pub total_bought: f64,
    pub total_sold: f64,
    pub total_difference: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub bought: f64,
    pub sold: f64,
    pub difference: f64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RankingRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Manufacturer")]
    #[tabled(rename = "Manufacturer")]
    pub manufacturer: String,
    #[serde(rename = "TotalBought")]
    #[tabled(rename = "TotalBought")]
    pub total_bought: String,
    #[serde(rename = "TotalSold")]
    #[tabled(rename = "TotalSold")]
    pub total_sold: String,
    #[serde(rename = "Balance")]
    #[tabled(rename = "Balance")]
    pub balance: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MetricCard {
    #[serde(rename = "Metric")]
    #[tabled(rename = "Metric")]
    pub label: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
    #[serde(rename = "Delta")]
    #[tabled(rename = "Delta", display_with = "display_delta")]
    pub delta: Option<String>,
}

fn display_delta(delta: &Option<String>) -> String {
    delta.clone().unwrap_or_default()
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub total_records: usize,
    pub total_manufacturers: usize,
    pub total_bought: f64,
    pub total_sold: f64,
    pub total_difference: f64,
}
