use crate::error::{PipelineWarning, SchemaError};
use crate::month::Month;
use crate::types::{Column, RawTable, RawValue, Record};
use crate::util::{parse_f64_safe, parse_i64_safe};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use strum::IntoEnumIterator;

/// Source column name -> canonical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMapping {
    entries: BTreeMap<String, Column>,
}

impl Default for ColumnMapping {
    /// Column names returned by the warehouse's heat map procedure.
    fn default() -> Self {
        ColumnMapping::empty()
            .map("COD_FABR", Column::ManufacturerCode)
            .map("NOME_FABR", Column::ManufacturerName)
            .map("ANO", Column::Year)
            .map("MES", Column::Month)
            .map("VALOR_COMPRADO", Column::AmountBought)
            .map("VALOR_VENDIDO", Column::AmountSold)
            .map("DIFERENCA_VALORES", Column::Difference)
    }
}

impl ColumnMapping {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn map(mut self, source: &str, column: Column) -> Self {
        self.entries.insert(source.to_string(), column);
        self
    }

    /// Header index for every canonical column the table provides.
    fn resolve(&self, table: &RawTable) -> Result<HashMap<Column, usize>, SchemaError> {
        let mut found = HashMap::new();
        for (source, column) in &self.entries {
            if let Some(idx) = table.column_index(source) {
                found.entry(*column).or_insert(idx);
            }
        }
        for column in Column::iter().filter(|c| c.is_required()) {
            if !found.contains_key(&column) {
                return Err(SchemaError::MissingColumn { column });
            }
        }
        Ok(found)
    }
}

/// Sign convention for the derived difference column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifferenceConvention {
    #[default]
    SoldMinusBought,
    BoughtMinusSold,
}

impl DifferenceConvention {
    pub fn apply(self, bought: f64, sold: f64) -> f64 {
        match self {
            DifferenceConvention::SoldMinusBought => sold - bought,
            DifferenceConvention::BoughtMinusSold => bought - sold,
        }
    }
}

/// Difference under the default convention (sold - bought).
pub fn difference(bought: f64, sold: f64) -> f64 {
    DifferenceConvention::default().apply(bought, sold)
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeReport {
    pub total_rows: usize,
    pub collapsed_rows: usize,
    pub warnings: Vec<PipelineWarning>,
}

/// Canonicalize a raw result into records, summing rows that share
/// (manufacturer code, year, month). Records keep first-seen key order.
pub fn normalize(
    table: &RawTable,
    mapping: &ColumnMapping,
    convention: DifferenceConvention,
) -> Result<(Vec<Record>, NormalizeReport), SchemaError> {
    if table.is_empty() {
        tracing::warn!("result set is empty");
        let report = NormalizeReport {
            total_rows: 0,
            collapsed_rows: 0,
            warnings: vec![PipelineWarning::EmptyResult],
        };
        return Ok((Vec::new(), report));
    }

    let cols = mapping.resolve(table)?;
    let width = table.headers.len();
    let mut records: Vec<Record> = Vec::new();
    let mut by_key: HashMap<(String, i32, Month), usize> = HashMap::new();

    for (i, cells) in table.rows.iter().enumerate() {
        let row = i + 1;
        if cells.len() != width {
            return Err(SchemaError::RaggedRow {
                row,
                got: cells.len(),
                want: width,
            });
        }
        let cell = |column: Column| (&table.headers[cols[&column]], &cells[cols[&column]]);

        let (name, value) = cell(Column::ManufacturerCode);
        let code = text(name, row, value)?;
        let (name, value) = cell(Column::ManufacturerName);
        let manufacturer_name = text(name, row, value)?;
        let (name, value) = cell(Column::Year);
        let year = year(name, row, value)?;
        let (name, value) = cell(Column::Month);
        let month = month(name, row, value)?;
        let (name, value) = cell(Column::AmountBought);
        let bought = amount(name, row, value)?;
        let (name, value) = cell(Column::AmountSold);
        let sold = amount(name, row, value)?;
        let diff = match cols.get(&Column::Difference) {
            Some(&idx) => amount(&table.headers[idx], row, &cells[idx])?,
            None => convention.apply(bought, sold),
        };

        let key = (code.clone(), year, month);
        match by_key.get(&key) {
            Some(&idx) => {
                let r = &mut records[idx];
                if r.manufacturer_name != manufacturer_name {
                    tracing::warn!(
                        code = %r.manufacturer_code,
                        kept = %r.manufacturer_name,
                        dropped = %manufacturer_name,
                        row,
                        "rows for one manufacturer code carry different names, keeping the first"
                    );
                }
                r.amount_bought += bought;
                r.amount_sold += sold;
                r.difference += diff;
            }
            None => {
                by_key.insert(key, records.len());
                records.push(Record {
                    manufacturer_code: code,
                    manufacturer_name,
                    year,
                    month,
                    amount_bought: bought,
                    amount_sold: sold,
                    difference: diff,
                });
            }
        }
    }

    let report = NormalizeReport {
        total_rows: table.len(),
        collapsed_rows: table.len() - records.len(),
        warnings: Vec::new(),
    };
    tracing::debug!(
        rows = report.total_rows,
        records = records.len(),
        collapsed = report.collapsed_rows,
        "normalized result set"
    );
    Ok((records, report))
}

fn invalid(column: &str, row: usize, value: &RawValue) -> SchemaError {
    SchemaError::InvalidValue {
        column: column.to_string(),
        row,
        value: value.describe(),
    }
}

fn text(column: &str, row: usize, value: &RawValue) -> Result<String, SchemaError> {
    let s = match value {
        RawValue::Text(s) => s.trim().to_string(),
        RawValue::Int(i) => i.to_string(),
        RawValue::Null | RawValue::Decimal(_) => return Err(invalid(column, row, value)),
    };
    if s.is_empty() {
        return Err(invalid(column, row, value));
    }
    Ok(s)
}

fn year(column: &str, row: usize, value: &RawValue) -> Result<i32, SchemaError> {
    let y = match value {
        RawValue::Int(i) => Some(*i),
        RawValue::Text(s) => parse_i64_safe(Some(s.as_str())),
        RawValue::Decimal(d) if d.fract() == 0.0 => Some(*d as i64),
        _ => None,
    };
    y.and_then(|y| i32::try_from(y).ok())
        .ok_or_else(|| invalid(column, row, value))
}

fn month(column: &str, row: usize, value: &RawValue) -> Result<Month, SchemaError> {
    let out_of_range = || SchemaError::MonthOutOfRange {
        column: column.to_string(),
        row,
        value: value.describe(),
    };
    let number = match value {
        RawValue::Int(i) => *i,
        RawValue::Decimal(d) if d.is_finite() && d.fract() == 0.0 => *d as i64,
        RawValue::Text(s) => match parse_i64_safe(Some(s.as_str())) {
            Some(n) => n,
            None => return s.trim().parse::<Month>().map_err(|_| out_of_range()),
        },
        _ => return Err(out_of_range()),
    };
    u32::try_from(number)
        .ok()
        .and_then(Month::from_number)
        .ok_or_else(out_of_range)
}

/// Missing amounts count as zero, the way the source's sums skip nulls.
fn amount(column: &str, row: usize, value: &RawValue) -> Result<f64, SchemaError> {
    let v = match value {
        RawValue::Null => return Ok(0.0),
        RawValue::Int(i) => *i as f64,
        RawValue::Decimal(d) => *d,
        RawValue::Text(s) if s.trim().is_empty() => return Ok(0.0),
        RawValue::Text(s) => parse_f64_safe(Some(s.as_str())).ok_or_else(|| invalid(column, row, value))?,
    };
    if !v.is_finite() {
        return Err(invalid(column, row, value));
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn table(headers: &[&str], rows: Vec<Vec<RawValue>>) -> RawTable {
        let mut t = RawTable::new(headers.iter().copied());
        for r in rows {
            t.push_row(r);
        }
        t
    }

    const HEADERS: [&str; 6] = ["COD_FABR", "NOME_FABR", "ANO", "MES", "VALOR_COMPRADO", "VALOR_VENDIDO"];

    fn row(code: &str, name: &str, month: RawValue, bought: f64, sold: f64) -> Vec<RawValue> {
        vec![
            code.into(),
            name.into(),
            2024i64.into(),
            month,
            bought.into(),
            sold.into(),
        ]
    }

    #[test]
    fn test_empty_table_is_not_an_error() {
        let (records, report) =
            normalize(&RawTable::new(HEADERS), &ColumnMapping::default(), DifferenceConvention::default())
                .unwrap();
        assert!(records.is_empty());
        assert_eq!(report.warnings, vec![PipelineWarning::EmptyResult]);
    }

    #[test]
    fn test_numeric_month_and_computed_difference() {
        let t = table(&HEADERS, vec![row("A1", "Acme", 3i64.into(), 100.0, 250.0)]);
        let (records, _) =
            normalize(&t, &ColumnMapping::default(), DifferenceConvention::default()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].month, Month::Mar);
        assert_eq!(records[0].difference, 150.0);
    }

    #[test]
    fn test_bought_minus_sold_convention() {
        let t = table(&HEADERS, vec![row("A1", "Acme", 3i64.into(), 100.0, 250.0)]);
        let (records, _) =
            normalize(&t, &ColumnMapping::default(), DifferenceConvention::BoughtMinusSold)
                .unwrap();
        assert_eq!(records[0].difference, -150.0);
    }

    #[test]
    fn test_supplied_difference_is_kept() {
        let mut headers = HEADERS.to_vec();
        headers.push("DIFERENCA_VALORES");
        let mut r = row("A1", "Acme", 1i64.into(), 100.0, 250.0);
        r.push(7.0.into());
        let t = table(&headers, vec![r]);
        let (records, _) =
            normalize(&t, &ColumnMapping::default(), DifferenceConvention::default()).unwrap();
        assert_eq!(records[0].difference, 7.0);
    }

    #[rstest]
    #[case(RawValue::Int(12), Month::Dez)]
    #[case(RawValue::Text("5".into()), Month::Mai)]
    #[case(RawValue::Text("ago".into()), Month::Ago)]
    #[case(RawValue::Decimal(2.0), Month::Fev)]
    fn test_month_forms(#[case] value: RawValue, #[case] want: Month) {
        assert_eq!(month("MES", 1, &value).unwrap(), want);
    }

    #[rstest]
    #[case(RawValue::Int(0))]
    #[case(RawValue::Int(13))]
    #[case(RawValue::Int(-1))]
    #[case(RawValue::Text("Foo".into()))]
    #[case(RawValue::Decimal(2.5))]
    #[case(RawValue::Null)]
    fn test_month_out_of_range(#[case] value: RawValue) {
        let t = table(&HEADERS, vec![row("A1", "Acme", value.clone(), 1.0, 1.0)]);
        let err = normalize(&t, &ColumnMapping::default(), DifferenceConvention::default())
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::MonthOutOfRange {
                column: "MES".to_string(),
                row: 1,
                value: value.describe(),
            }
        );
    }

    #[test]
    fn test_missing_required_column() {
        let t = table(
            &HEADERS[..5],
            vec![vec!["A1".into(), "Acme".into(), 2024i64.into(), 1i64.into(), 1.0.into()]],
        );
        let err = normalize(&t, &ColumnMapping::default(), DifferenceConvention::default())
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingColumn {
                column: Column::AmountSold
            }
        );
        assert_eq!(err.to_string(), "required column `amount_sold` is missing from the result set");
    }

    #[test]
    fn test_custom_mapping() {
        let mapping = ColumnMapping::empty()
            .map("code", Column::ManufacturerCode)
            .map("name", Column::ManufacturerName)
            .map("year", Column::Year)
            .map("month", Column::Month)
            .map("purchases", Column::AmountBought)
            .map("sales", Column::AmountSold);
        let t = table(
            &["code", "name", "year", "month", "purchases", "sales"],
            vec![row("B2", "Beta", 7i64.into(), 10.0, 4.0)],
        );
        let (records, _) = normalize(&t, &mapping, DifferenceConvention::default()).unwrap();
        assert_eq!(records[0].manufacturer_name, "Beta");
        assert_eq!(records[0].month, Month::Jul);
        assert_eq!(records[0].difference, -6.0);
    }

    #[test]
    fn test_duplicate_keys_collapse() {
        let t = table(
            &HEADERS,
            vec![
                row("A1", "Acme", 3i64.into(), 100.0, 0.0),
                row("B2", "Beta", 3i64.into(), 1.0, 0.0),
                row("A1", "Acme", "Mar".into(), 50.0, 20.0),
            ],
        );
        let (records, report) =
            normalize(&t, &ColumnMapping::default(), DifferenceConvention::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].manufacturer_code, "A1");
        assert_eq!(records[0].amount_bought, 150.0);
        assert_eq!(records[0].amount_sold, 20.0);
        assert_eq!(records[0].difference, -130.0);
        assert_eq!(report.collapsed_rows, 1);
    }

    #[test]
    fn test_null_amount_is_zero_and_garbage_is_an_error() {
        let t = table(&HEADERS, vec![vec![
            "A1".into(),
            "Acme".into(),
            "2024".into(),
            "1".into(),
            RawValue::Null,
            "12.5".into(),
        ]]);
        let (records, _) =
            normalize(&t, &ColumnMapping::default(), DifferenceConvention::default()).unwrap();
        assert_eq!(records[0].amount_bought, 0.0);
        assert_eq!(records[0].amount_sold, 12.5);

        let mut t = table(&HEADERS, vec![row("A1", "Acme", 1i64.into(), 0.0, 0.0)]);
        t.rows[0][5] = "n/a".into();
        let err = normalize(&t, &ColumnMapping::default(), DifferenceConvention::default())
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidValue { ref column, row: 1, .. } if column == "VALOR_VENDIDO"));
    }

    #[rstest]
    #[case("VALOR_COMPRADO", "1,5")]
    #[case("VALOR_VENDIDO", "1.234,56")]
    fn test_decimal_comma_amount_is_rejected(#[case] column: &str, #[case] raw: &str) {
        let mut t = table(&HEADERS, vec![row("A1", "Acme", 1i64.into(), 0.0, 0.0)]);
        let idx = t.column_index(column).unwrap();
        t.rows[0][idx] = raw.into();
        let err = normalize(&t, &ColumnMapping::default(), DifferenceConvention::default())
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::InvalidValue {
                column: column.to_string(),
                row: 1,
                value: raw.to_string(),
            }
        );
    }

    #[test]
    fn test_conflicting_names_keep_the_first() {
        let t = table(
            &HEADERS,
            vec![
                row("A1", "Acme", 3i64.into(), 100.0, 0.0),
                row("A1", "Acme Ltda", 3i64.into(), 50.0, 0.0),
            ],
        );
        let (records, _) =
            normalize(&t, &ColumnMapping::default(), DifferenceConvention::default()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].manufacturer_name, "Acme");
        assert_eq!(records[0].amount_bought, 150.0);
    }

    #[test]
    fn test_ragged_row() {
        let mut t = RawTable::new(HEADERS);
        t.push_row(vec!["A1".into()]);
        let err = normalize(&t, &ColumnMapping::default(), DifferenceConvention::default())
            .unwrap_err();
        assert_eq!(err, SchemaError::RaggedRow { row: 1, got: 1, want: 6 });
    }

    #[rstest]
    #[case(100.0, 250.0, 150.0)]
    #[case(250.0, 100.0, -150.0)]
    #[case(0.0, 0.0, 0.0)]
    fn test_difference(#[case] bought: f64, #[case] sold: f64, #[case] want: f64) {
        assert_eq!(difference(bought, sold), want);
    }
}
