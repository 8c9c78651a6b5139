//! Manufacturer x month pivot grids.
//!
//! A grid is stored as one 12-slot row per manufacturer and exposed in either
//! orientation. Cells with no records hold 0.0, so every manufacturer row has
//! the full set of months.

use crate::month::{Month, MONTH_COUNT};
use crate::types::{ManufacturerKey, Metric, Record};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Orientation {
    /// Manufacturers down, months across (the heatmap layout).
    #[default]
    ManufacturerByMonth,
    MonthByManufacturer,
}

/// Ordering of the manufacturer axis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ManufacturerOrder {
    /// Descending by the row total of the selected metric, ties by name.
    #[default]
    TotalDesc,
    Alphabetical,
    /// Listed manufacturers first in the given order; any others present in
    /// the data follow alphabetically.
    Explicit(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AxisKey {
    Manufacturer(String),
    Month(Month),
}

impl fmt::Display for AxisKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisKey::Manufacturer(m) => f.write_str(m),
            AxisKey::Month(m) => f.write_str(m.label()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PivotOptions {
    pub orientation: Orientation,
    pub key: ManufacturerKey,
    pub order: ManufacturerOrder,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PivotGrid {
    metric: Metric,
    orientation: Orientation,
    manufacturers: Vec<String>,
    cells: Vec<[f64; MONTH_COUNT]>,
}

/// Sum `metric` over `records` into a manufacturer x month grid.
pub fn build(records: &[Record], metric: Metric, options: &PivotOptions) -> PivotGrid {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut manufacturers: Vec<String> = Vec::new();
    let mut cells: Vec<[f64; MONTH_COUNT]> = Vec::new();
    for r in records {
        let name = r.manufacturer(options.key);
        let row = *index.entry(name).or_insert_with(|| {
            manufacturers.push(name.to_string());
            cells.push([0.0; MONTH_COUNT]);
            manufacturers.len() - 1
        });
        cells[row][r.month.index()] += metric.value(r);
    }

    let mut rows: Vec<(String, [f64; MONTH_COUNT])> = manufacturers.into_iter().zip(cells).collect();
    match &options.order {
        ManufacturerOrder::TotalDesc => rows.sort_by(|a, b| {
            let (ta, tb): (f64, f64) = (a.1.iter().sum(), b.1.iter().sum());
            tb.total_cmp(&ta).then_with(|| a.0.cmp(&b.0))
        }),
        ManufacturerOrder::Alphabetical => rows.sort_by(|a, b| a.0.cmp(&b.0)),
        ManufacturerOrder::Explicit(listed) => {
            let rank: HashMap<&str, usize> = listed
                .iter()
                .enumerate()
                .rev()
                .map(|(i, m)| (m.as_str(), i))
                .collect();
            rows.sort_by(|a, b| {
                let ra = rank.get(a.0.as_str()).copied().unwrap_or(usize::MAX);
                let rb = rank.get(b.0.as_str()).copied().unwrap_or(usize::MAX);
                ra.cmp(&rb).then_with(|| a.0.cmp(&b.0))
            });
        }
    }

    let (manufacturers, cells): (Vec<String>, Vec<[f64; MONTH_COUNT]>) = rows.into_iter().unzip();
    PivotGrid {
        metric,
        orientation: options.orientation,
        manufacturers,
        cells,
    }
}

impl PivotGrid {
    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// True when there were no records; callers skip rendering.
    pub fn is_empty(&self) -> bool {
        self.manufacturers.is_empty()
    }

    pub fn manufacturers(&self) -> &[String] {
        &self.manufacturers
    }

    fn months(&self) -> Vec<AxisKey> {
        if self.is_empty() {
            return Vec::new();
        }
        Month::all().map(AxisKey::Month).collect()
    }

    fn manufacturer_keys(&self) -> Vec<AxisKey> {
        self.manufacturers
            .iter()
            .cloned()
            .map(AxisKey::Manufacturer)
            .collect()
    }

    pub fn row_keys(&self) -> Vec<AxisKey> {
        match self.orientation {
            Orientation::ManufacturerByMonth => self.manufacturer_keys(),
            Orientation::MonthByManufacturer => self.months(),
        }
    }

    pub fn col_keys(&self) -> Vec<AxisKey> {
        match self.orientation {
            Orientation::ManufacturerByMonth => self.months(),
            Orientation::MonthByManufacturer => self.manufacturer_keys(),
        }
    }

    /// Summed value for a manufacturer/month pair, 0.0 for any month the
    /// manufacturer had no records in. `None` only for an unknown manufacturer.
    pub fn value(&self, manufacturer: &str, month: Month) -> Option<f64> {
        let row = self.manufacturers.iter().position(|m| m == manufacturer)?;
        Some(self.cells[row][month.index()])
    }

    /// Cell lookup by axis keys in the grid's own orientation.
    pub fn get(&self, row: &AxisKey, col: &AxisKey) -> Option<f64> {
        match (row, col) {
            (AxisKey::Manufacturer(m), AxisKey::Month(mo)) | (AxisKey::Month(mo), AxisKey::Manufacturer(m)) => {
                self.value(m, *mo)
            }
            _ => None,
        }
    }

    /// Rows in display order, each with one value per column key.
    pub fn rows(&self) -> Vec<(AxisKey, Vec<f64>)> {
        match self.orientation {
            Orientation::ManufacturerByMonth => self
                .manufacturers
                .iter()
                .zip(&self.cells)
                .map(|(m, row)| (AxisKey::Manufacturer(m.clone()), row.to_vec()))
                .collect(),
            Orientation::MonthByManufacturer => {
                if self.is_empty() {
                    return Vec::new();
                }
                Month::all()
                    .map(|mo| {
                        let values = self.cells.iter().map(|row| row[mo.index()]).collect();
                        (AxisKey::Month(mo), values)
                    })
                    .collect()
            }
        }
    }

    pub fn manufacturer_total(&self, manufacturer: &str) -> Option<f64> {
        let row = self.manufacturers.iter().position(|m| m == manufacturer)?;
        Some(self.cells[row].iter().sum())
    }

    pub fn month_total(&self, month: Month) -> f64 {
        self.cells.iter().map(|row| row[month.index()]).sum()
    }

    pub fn grand_total(&self) -> f64 {
        self.cells.iter().flat_map(|row| row.iter()).sum()
    }

    /// Months that carry at least one non-zero cell.
    pub fn active_months(&self) -> BTreeSet<Month> {
        Month::all()
            .filter(|mo| self.cells.iter().any(|row| row[mo.index()] != 0.0))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn record(code: &str, name: &str, month: Month, bought: f64, sold: f64) -> Record {
        Record {
            manufacturer_code: code.to_string(),
            manufacturer_name: name.to_string(),
            year: 2024,
            month,
            amount_bought: bought,
            amount_sold: sold,
            difference: sold - bought,
        }
    }

    fn sample() -> Vec<Record> {
        vec![
            record("B2", "Beta", Month::Dez, 10.0, 5.0),
            record("A1", "Acme", Month::Mar, 100.0, 40.0),
            record("A1", "Acme", Month::Jan, 20.0, 0.0),
            record("C3", "Coda", Month::Jun, 10.0, 90.0),
        ]
    }

    #[test]
    fn test_zero_fill_for_absent_months() {
        let records = vec![record("X", "X", Month::Mar, 42.0, 0.0)];
        let grid = build(&records, Metric::AmountBought, &PivotOptions::default());
        let rows = grid.rows();
        let (key, values) = &rows[0];
        assert_eq!(key, &AxisKey::Manufacturer("X".to_string()));
        assert_eq!(values.len(), 12);
        for mo in Month::all() {
            let want = if mo == Month::Mar { 42.0 } else { 0.0 };
            assert_eq!(grid.value("X", mo), Some(want));
        }
    }

    #[test]
    fn test_month_columns_in_calendar_order() {
        let grid = build(&sample(), Metric::AmountSold, &PivotOptions::default());
        let cols: Vec<String> = grid.col_keys().iter().map(ToString::to_string).collect();
        assert_eq!(
            cols,
            ["Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez"]
        );
    }

    #[rstest]
    #[case(Metric::AmountBought, ManufacturerOrder::TotalDesc, &["Acme", "Beta", "Coda"])]
    #[case(Metric::AmountSold, ManufacturerOrder::TotalDesc, &["Coda", "Acme", "Beta"])]
    #[case(Metric::AmountBought, ManufacturerOrder::Alphabetical, &["Acme", "Beta", "Coda"])]
    #[case(Metric::AmountBought, ManufacturerOrder::Explicit(vec!["Coda".into(), "Nope".into()]), &["Coda", "Acme", "Beta"])]
    fn test_manufacturer_order(
        #[case] metric: Metric,
        #[case] order: ManufacturerOrder,
        #[case] want: &[&str],
    ) {
        let options = PivotOptions {
            order,
            ..PivotOptions::default()
        };
        let grid = build(&sample(), metric, &options);
        assert_eq!(grid.manufacturers(), want);
    }

    #[test]
    fn test_month_by_manufacturer_orientation() {
        let options = PivotOptions {
            orientation: Orientation::MonthByManufacturer,
            order: ManufacturerOrder::Alphabetical,
            ..PivotOptions::default()
        };
        let grid = build(&sample(), Metric::AmountBought, &options);
        let rows = grid.rows();
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[0], (AxisKey::Month(Month::Jan), vec![20.0, 0.0, 0.0]));
        assert_eq!(rows[11], (AxisKey::Month(Month::Dez), vec![0.0, 10.0, 0.0]));
        assert_eq!(
            grid.get(&AxisKey::Month(Month::Mar), &AxisKey::Manufacturer("Acme".into())),
            Some(100.0)
        );
    }

    #[test]
    fn test_group_by_code_keeps_codes_apart() {
        let records = vec![
            record("A1", "Acme", Month::Jan, 1.0, 0.0),
            record("A2", "Acme", Month::Jan, 2.0, 0.0),
        ];
        let by_name = build(&records, Metric::AmountBought, &PivotOptions::default());
        assert_eq!(by_name.value("Acme", Month::Jan), Some(3.0));
        let options = PivotOptions {
            key: ManufacturerKey::Code,
            ..PivotOptions::default()
        };
        let by_code = build(&records, Metric::AmountBought, &options);
        assert_eq!(by_code.manufacturers(), ["A2", "A1"]);
    }

    #[test]
    fn test_totals() {
        let grid = build(&sample(), Metric::Difference, &PivotOptions::default());
        assert_eq!(grid.grand_total(), -5.0 - 60.0 - 20.0 + 80.0);
        assert_eq!(grid.manufacturer_total("Acme"), Some(-80.0));
        assert_eq!(grid.month_total(Month::Jun), 80.0);
        assert_eq!(
            grid.active_months(),
            [Month::Jan, Month::Mar, Month::Jun, Month::Dez].into_iter().collect()
        );
    }

    #[rstest]
    #[case(Orientation::ManufacturerByMonth)]
    #[case(Orientation::MonthByManufacturer)]
    fn test_empty_input_gives_empty_grid(#[case] orientation: Orientation) {
        let options = PivotOptions {
            orientation,
            ..PivotOptions::default()
        };
        let grid = build(&[], Metric::AmountSold, &options);
        assert!(grid.is_empty());
        assert!(grid.rows().is_empty());
        assert!(grid.row_keys().is_empty());
        assert!(grid.col_keys().is_empty());
        assert_eq!(grid.grand_total(), 0.0);
    }
}
