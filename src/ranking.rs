use crate::types::{ManufacturerKey, Metric, RankingEntry, Record, Totals};
use std::collections::BTreeMap;

/// Per-manufacturer sums of all three metrics, in ascending key order.
pub fn group_totals(records: &[Record], key: ManufacturerKey) -> Vec<RankingEntry> {
    let mut map: BTreeMap<&str, Totals> = BTreeMap::new();
    for r in records {
        let e = map.entry(r.manufacturer(key)).or_default();
        e.bought += r.amount_bought;
        e.sold += r.amount_sold;
        e.difference += r.difference;
    }
    map.into_iter()
        .map(|(m, t)| RankingEntry {
            manufacturer: m.to_string(),
            total_bought: t.bought,
            total_sold: t.sold,
            total_difference: t.difference,
        })
        .collect()
}

/// Top `n` manufacturers by the summed `metric`, descending, ties broken by
/// manufacturer ascending. Returns fewer than `n` when fewer exist.
pub fn rank(records: &[Record], metric: Metric, n: usize, key: ManufacturerKey) -> Vec<RankingEntry> {
    let mut entries = group_totals(records, key);
    entries.sort_by(|a, b| {
        metric
            .of_entry(b)
            .total_cmp(&metric.of_entry(a))
            .then_with(|| a.manufacturer.cmp(&b.manufacturer))
    });
    entries.truncate(n);
    entries
}

/// Grand totals over every record, for the summary metrics.
pub fn totals(records: &[Record]) -> Totals {
    records.iter().fold(Totals::default(), |mut t, r| {
        t.bought += r.amount_bought;
        t.sold += r.amount_sold;
        t.difference += r.difference;
        t
    })
}
