// One render cycle of the dashboard: filter the normalized records, then
// build the summary cards, one heatmap per metric and the top-N table.
use crate::config::DashboardConfig;
use crate::currency::format_brl;
use crate::error::{FormatError, PipelineWarning};
use crate::filter::{manufacturer_options, Filters};
use crate::pivot::{self, ManufacturerOrder, Orientation, PivotGrid, PivotOptions};
use crate::ranking;
use crate::types::{ManufacturerKey, Metric, MetricCard, RankingEntry, RankingRow, Record, SummaryStats, Totals};
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct Heatmap {
    pub metric: Metric,
    pub tab: &'static str,
    pub title: &'static str,
    pub color_scale: &'static str,
    pub grid: PivotGrid,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    /// Choices for the manufacturer selector: manufacturers with records in
    /// the selected period, before the manufacturer filter is applied.
    pub manufacturer_options: Vec<String>,
    pub totals: Totals,
    pub cards: Vec<MetricCard>,
    pub heatmaps: Vec<Heatmap>,
    /// Only present when every manufacturer is selected.
    pub top: Option<Vec<RankingEntry>>,
    pub warnings: Vec<PipelineWarning>,
}

impl Dashboard {
    pub fn is_empty(&self) -> bool {
        self.warnings.contains(&PipelineWarning::EmptyResult)
    }
}

pub fn build_dashboard(
    records: &[Record],
    filters: &Filters,
    config: &DashboardConfig,
) -> Result<Dashboard, FormatError> {
    let key = config.grouping;
    let in_period = filters.period().apply(records, key);
    let manufacturer_options = manufacturer_options(&in_period, key);
    let selected = filters.apply(records, key);

    let mut warnings = Vec::new();
    if selected.is_empty() {
        tracing::warn!("no records left after filtering");
        warnings.push(PipelineWarning::EmptyResult);
    }

    let totals = ranking::totals(&selected);
    let cards = metric_cards(&totals)?;

    let options = PivotOptions {
        orientation: Orientation::ManufacturerByMonth,
        key,
        order: ManufacturerOrder::TotalDesc,
    };
    let heatmaps = [Metric::AmountBought, Metric::AmountSold, Metric::Difference]
        .into_iter()
        .map(|metric| Heatmap {
            metric,
            tab: metric.tab_label(),
            title: metric.heatmap_title(),
            color_scale: metric.color_scale(),
            grid: pivot::build(&selected, metric, &options),
        })
        .collect();

    let top = filters
        .manufacturer
        .is_all()
        .then(|| ranking::rank(&selected, config.ranking_metric, config.top_n, key));

    Ok(Dashboard {
        manufacturer_options,
        totals,
        cards,
        heatmaps,
        top,
        warnings,
    })
}

/// Total bought, total sold and balance as currency strings. The balance
/// card repeats its value as the delta.
pub fn metric_cards(totals: &Totals) -> Result<Vec<MetricCard>, FormatError> {
    let balance = format_brl(totals.difference)?;
    Ok(vec![
        MetricCard {
            label: "Total Comprado".to_string(),
            value: format_brl(totals.bought)?,
            delta: None,
        },
        MetricCard {
            label: "Total Vendido".to_string(),
            value: format_brl(totals.sold)?,
            delta: None,
        },
        MetricCard {
            label: "Balanço".to_string(),
            value: balance.clone(),
            delta: Some(balance),
        },
    ])
}

pub fn ranking_rows(entries: &[RankingEntry]) -> Result<Vec<RankingRow>, FormatError> {
    entries
        .iter()
        .enumerate()
        .map(|(idx, e)| {
            Ok(RankingRow {
                rank: idx + 1,
                manufacturer: e.manufacturer.clone(),
                total_bought: format_brl(e.total_bought)?,
                total_sold: format_brl(e.total_sold)?,
                balance: format_brl(e.total_difference)?,
            })
        })
        .collect()
}

pub fn summary_stats(records: &[Record], key: ManufacturerKey) -> SummaryStats {
    let manufacturers: HashSet<&str> = records.iter().map(|r| r.manufacturer(key)).collect();
    let totals = ranking::totals(records);
    SummaryStats {
        total_records: records.len(),
        total_manufacturers: manufacturers.len(),
        total_bought: totals.bought,
        total_sold: totals.sold,
        total_difference: totals.difference,
    }
}
