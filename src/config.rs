// Dashboard settings, loaded from a JSON file when one exists.
use crate::error::ConfigError;
use crate::filter::DateRange;
use crate::normalizer::{ColumnMapping, DifferenceConvention};
use crate::types::{ManufacturerKey, Metric};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_ENV: &str = "DASHBOARD_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "dashboard.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// CSV export of the warehouse's purchase/sale result.
    pub data_path: String,
    pub output_dir: String,
    pub columns: ColumnMapping,
    pub difference: DifferenceConvention,
    pub grouping: ManufacturerKey,
    pub ranking_metric: Metric,
    pub top_n: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub theme: Theme,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            data_path: "heatmap_compras_vendas.csv".to_string(),
            output_dir: ".".to_string(),
            columns: ColumnMapping::default(),
            difference: DifferenceConvention::default(),
            grouping: ManufacturerKey::default(),
            ranking_metric: Metric::AmountBought,
            top_n: 10,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default(),
            theme: Theme::default(),
        }
    }
}

impl DashboardConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let s = std::fs::read_to_string(path)?;
        let config: DashboardConfig = serde_json::from_str(&s)?;
        config.date_range()?;
        Ok(config)
    }

    /// Reads `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            tracing::info!("loading config from {}", path.display());
            Self::load(path)
        } else {
            tracing::debug!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn date_range(&self) -> Result<DateRange, ConfigError> {
        DateRange::new(self.start_date, self.end_date)
    }
}

/// Light/dark presentation state. Owned by the front end and passed to the
/// rendering side explicitly; the pipeline never reads it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Label of the control that switches away from this theme.
    pub fn button_label(self) -> &'static str {
        match self {
            Theme::Light => "Modo Escuro",
            Theme::Dark => "Modo Claro",
        }
    }

    pub fn plot_template(self) -> &'static str {
        match self {
            Theme::Light => "plotly_white",
            Theme::Dark => "plotly_dark",
        }
    }

    pub fn font_color(self) -> &'static str {
        match self {
            Theme::Light => "#2c3e50",
            Theme::Dark => "#f5f6fa",
        }
    }
}
