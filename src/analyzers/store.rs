//! In-memory accumulation of observations into monthly per-pincode totals.

use std::collections::BTreeMap;

use crate::analyzers::types::{AggregateRecord, MonthKey};
use crate::parser::{Delta, Observation};

/// Totals keyed by month, then by pincode.
///
/// Records are created on first sight and never removed. Identical rows
/// merged twice are counted twice.
#[derive(Debug, Default)]
pub struct AggregationStore {
    months: BTreeMap<MonthKey, BTreeMap<String, AggregateRecord>>,
}

impl AggregationStore {
    pub fn new() -> Self {
        AggregationStore {
            months: BTreeMap::new(),
        }
    }

    /// Returns the record for `(month, pincode)`, inserting a zeroed one if absent.
    pub fn get_or_create(&mut self, month: MonthKey, pincode: String) -> &mut AggregateRecord {
        self.months
            .entry(month)
            .or_insert_with(BTreeMap::new)
            .entry(pincode)
            .or_insert_with(AggregateRecord::new)
    }

    /// Folds one observation into its record.
    ///
    /// `state` and `district` keep the first non-empty value they receive.
    /// Counts are added to the observation's own category only.
    pub fn merge(&mut self, observation: Observation) {
        let Observation {
            month,
            pincode,
            state,
            district,
            delta,
        } = observation;

        let record = self.get_or_create(month, pincode);

        fill_if_empty(&mut record.state, state);
        fill_if_empty(&mut record.district, district);

        match delta {
            Delta::Enrolment(counts) => record.enrolment.add(&counts),
            Delta::Biometric(counts) => record.biometric.add(&counts),
            Delta::Demographic(counts) => record.demographic.add(&counts),
        }
    }

    pub fn get(&self, month: &MonthKey, pincode: &str) -> Option<&AggregateRecord> {
        self.months.get(month)?.get(pincode)
    }

    /// Every observed month with its `(pincode, record)` entries, in ascending order.
    pub fn records_by_month(
        &self,
    ) -> impl Iterator<Item = (&MonthKey, &BTreeMap<String, AggregateRecord>)> {
        self.months.iter()
    }

    pub fn month_count(&self) -> usize {
        self.months.len()
    }

    pub fn record_count(&self) -> usize {
        self.months.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }
}

fn fill_if_empty(slot: &mut String, value: String) {
    if slot.is_empty() && !value.is_empty() {
        *slot = value;
    }
}
