use log::warn;

use crate::record::{Batch, Record};

/// Column-major storage of every accepted record. Column 0 is the time axis.
///
/// All columns always have the same length.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColumnBuffers {
    columns: Vec<Vec<f64>>,
}

impl ColumnBuffers {
    pub fn new(width: usize) -> Self {
        Self {
            columns: vec![Vec::new(); width],
        }
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of samples, i.e. the common length of all columns.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column(&self, index: usize) -> Option<&[f64]> {
        self.columns.get(index).map(Vec::as_slice)
    }

    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    /// Appends the batch row by row, in order, and returns how many rows were taken.
    pub fn apply(&mut self, batch: &Batch) -> usize {
        let mut applied = 0;
        for record in batch {
            if self.push(record) {
                applied += 1;
            }
        }
        applied
    }

    fn push(&mut self, record: &Record) -> bool {
        if record.len() != self.columns.len() {
            warn!(
                "Skipping record with {} fields, expected {}",
                record.len(),
                self.columns.len()
            );
            return false;
        }
        for (column, value) in self.columns.iter_mut().zip(record) {
            column.push(*value);
        }
        true
    }

    /// Row-major view of the buffers, one row per sample.
    pub fn rows(&self) -> impl Iterator<Item = Record> + '_ {
        (0..self.len()).map(move |row| self.columns.iter().map(|c| c[row]).collect())
    }

    pub fn clear(&mut self) {
        for column in &mut self.columns {
            column.clear();
        }
    }
}
