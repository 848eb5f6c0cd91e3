use crate::ledger::LedgerEntry;
use serde::Serialize;
use std::collections::BTreeMap;

/// Sum of all ledger entries for one (company, employee) key, across every
/// period and every run. Duplicate rows from rerun periods are summed like
/// any other row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollupRow {
    pub company: String,
    pub employee: String,
    pub km: f64,
    pub value: f64,
}

/// Groups the full ledger by (company, employee) and sums km and value.
///
/// Recomputed fresh from the complete ledger on every run, never
/// incrementally. Entries with an unset value contribute their km only.
/// Output is ordered by (company, employee); an empty ledger produces no
/// rows.
pub fn aggregate(entries: &[LedgerEntry]) -> Vec<RollupRow> {
    let mut totals: BTreeMap<(String, String), (f64, f64)> = BTreeMap::new();

    for entry in entries {
        let key = (entry.company.clone(), entry.employee.clone());
        let sums = totals.entry(key).or_insert((0.0, 0.0));
        sums.0 += entry.km.unwrap_or(0.0);
        sums.1 += entry.value.unwrap_or(0.0);
    }

    totals
        .into_iter()
        .map(|((company, employee), (km, value))| RollupRow {
            company,
            employee,
            km,
            value,
        })
        .collect()
}
