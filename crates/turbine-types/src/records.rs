//! Ordered record batches passed between pipeline stages.

use std::ops::Index;

use serde_json::Value;

use crate::error::BatchRef;
use crate::record::Record;

/// Ordered, owned sequence of [`Record`]s.
///
/// Insertion order is arrival order and is never changed by the runtime.
/// `stream` labels the batch (`"resource/collection"`) for diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordsArray {
    stream: Option<String>,
    records: Vec<Record>,
}

impl RecordsArray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stream(stream: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            stream: Some(stream.into()),
            records,
        }
    }

    pub fn stream(&self) -> Option<&str> {
        self.stream.as_deref()
    }

    pub fn set_stream(&mut self, stream: impl Into<String>) {
        self.stream = Some(stream.into());
    }

    pub fn batch_ref(&self) -> BatchRef {
        BatchRef {
            stream: self.stream.clone(),
            records: self.records.len(),
        }
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Record> {
        self.records.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Record> {
        self.records.iter_mut()
    }

    pub fn as_slice(&self) -> &[Record] {
        &self.records
    }

    /// Apply `f` to every record in order, mutating in place.
    pub fn for_each<F: FnMut(&mut Record)>(&mut self, f: F) {
        self.records.iter_mut().for_each(f);
    }

    /// Like [`for_each`](Self::for_each) but stops at the first error.
    ///
    /// Records before the failing one keep their mutations.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `f`.
    pub fn try_for_each<E, F>(&mut self, f: F) -> Result<(), E>
    where
        F: FnMut(&mut Record) -> Result<(), E>,
    {
        self.records.iter_mut().try_for_each(f)
    }

    /// Replace every record by `f(record)`, preserving order and stream label.
    #[must_use]
    pub fn map<F: FnMut(Record) -> Record>(self, f: F) -> Self {
        Self {
            stream: self.stream,
            records: self.records.into_iter().map(f).collect(),
        }
    }

    /// Keep only the records matching `keep`. Relative order is preserved.
    pub fn retain<F: FnMut(&Record) -> bool>(&mut self, keep: F) {
        self.records.retain(keep);
    }

    /// Unwrap every CDC record to its current image. Idempotent.
    pub fn unwrap(&mut self) {
        self.records.iter_mut().for_each(Record::unwrap);
    }

    /// Serialized bodies in order.
    pub fn values(&self) -> Vec<Value> {
        self.records.iter().map(Record::to_value).collect()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl From<Vec<Record>> for RecordsArray {
    fn from(records: Vec<Record>) -> Self {
        Self {
            stream: None,
            records,
        }
    }
}

impl FromIterator<Record> for RecordsArray {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl Extend<Record> for RecordsArray {
    fn extend<I: IntoIterator<Item = Record>>(&mut self, iter: I) {
        self.records.extend(iter);
    }
}

impl IntoIterator for RecordsArray {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a RecordsArray {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a mut RecordsArray {
    type Item = &'a mut Record;
    type IntoIter = std::slice::IterMut<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter_mut()
    }
}

impl Index<usize> for RecordsArray {
    type Output = Record;

    fn index(&self, index: usize) -> &Record {
        &self.records[index]
    }
}
