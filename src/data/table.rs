//! Dataset types and transforms

use std::collections::BTreeMap;

/// One labeled observation
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub label: String,
    pub value: f64,
}

impl Record {
    /// Create a record
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// An ordered collection of records
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    name: String,
    records: Vec<Record>,
}

impl Dataset {
    /// Create a dataset
    pub fn new(name: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }

    /// Get the dataset name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The records, in order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The label at an index, if any
    pub fn label(&self, index: usize) -> Option<&str> {
        self.records.get(index).map(|r| r.label.as_str())
    }

    /// The values, in record order
    pub fn values(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.value).collect()
    }

    /// Smallest value, if any
    pub fn min_value(&self) -> Option<f64> {
        self.records
            .iter()
            .map(|r| r.value)
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Largest value, if any
    pub fn max_value(&self) -> Option<f64> {
        self.records
            .iter()
            .map(|r| r.value)
            .max_by(|a, b| a.total_cmp(b))
    }

    /// Collapse records sharing a label into one summed record
    ///
    /// The result is ordered by label (so e.g. "01".."12" month keys
    /// come out chronological).
    pub fn group_sum(&self) -> Dataset {
        let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
        for record in &self.records {
            *totals.entry(record.label.as_str()).or_insert(0.0) += record.value;
        }

        Dataset::new(
            self.name.clone(),
            totals
                .into_iter()
                .map(|(label, value)| Record::new(label, value))
                .collect(),
        )
    }

    /// Sort records by value
    pub fn sort_by_value(&mut self, descending: bool) {
        self.records.sort_by(|a, b| {
            if descending {
                b.value.total_cmp(&a.value)
            } else {
                a.value.total_cmp(&b.value)
            }
        });
    }

    /// Keep only the first `limit` records
    pub fn truncate(&mut self, limit: usize) {
        self.records.truncate(limit);
    }
}
