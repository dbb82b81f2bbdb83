//! Per-shape record batches accumulated during a run

use std::collections::BTreeMap;

use crate::models::{FlatRecord, Shape};

/// Twelve accumulating batches, one per [`Shape`]
#[derive(Debug, Clone, Default)]
pub struct RecordBatches {
    batches: [Vec<FlatRecord>; Shape::COUNT],
}

impl RecordBatches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to the batch matching its shape
    pub fn push(&mut self, record: FlatRecord) {
        self.batches[record.shape().index()].push(record);
    }

    pub fn extend<I: IntoIterator<Item = FlatRecord>>(&mut self, records: I) {
        for record in records {
            self.push(record);
        }
    }

    pub fn get(&self, shape: Shape) -> &[FlatRecord] {
        &self.batches[shape.index()]
    }

    /// Number of records held for one shape
    pub fn len(&self, shape: Shape) -> usize {
        self.batches[shape.index()].len()
    }

    pub fn total(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Batches in load order
    pub fn iter(&self) -> impl Iterator<Item = (Shape, &[FlatRecord])> {
        Shape::ALL
            .into_iter()
            .map(move |shape| (shape, self.get(shape)))
    }

    /// Record count per destination table, including empty ones
    pub fn counts(&self) -> BTreeMap<String, usize> {
        self.iter()
            .map(|(shape, records)| (shape.table_name(), records.len()))
            .collect()
    }
}
