use fxhash::FxHashMap;
use ndarray::Array1;

use super::error::StoreError;

/// Read-only access to a hierarchical array store.
///
/// A store holds named groups at its root, and each group holds named one-dimensional
/// datasets. Both listings are returned in the order the store reports them; that order
/// is the column order of generic tables.
pub trait ArrayStore {
    /// Names of every group at the store root
    fn group_names(&self) -> Result<Vec<String>, StoreError>;

    /// Keys of every dataset in a group
    fn dataset_names(&self, group: &str) -> Result<Vec<String>, StoreError>;

    /// Materialize a dataset as floating point values
    fn read_f64(&self, group: &str, dataset: &str) -> Result<Array1<f64>, StoreError>;

    /// Materialize a dataset as integer values
    fn read_i64(&self, group: &str, dataset: &str) -> Result<Array1<i64>, StoreError>;

    fn has_group(&self, group: &str) -> Result<bool, StoreError> {
        Ok(self.group_names()?.iter().any(|name| name == group))
    }
}

#[derive(Debug, Clone)]
pub enum MemoryArray {
    Int(Array1<i64>),
    Float(Array1<f64>),
}

impl From<Vec<i64>> for MemoryArray {
    fn from(value: Vec<i64>) -> Self {
        Self::Int(Array1::from_vec(value))
    }
}

impl From<Vec<f64>> for MemoryArray {
    fn from(value: Vec<f64>) -> Self {
        Self::Float(Array1::from_vec(value))
    }
}

#[derive(Debug, Clone, Default)]
struct MemoryGroup {
    name: String,
    datasets: Vec<(String, MemoryArray)>,
}

/// An ArrayStore which lives entirely in memory.
///
/// Groups and datasets are reported in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    groups: Vec<MemoryGroup>,
    index: FxHashMap<String, usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty group. Adding an existing group is a no-op.
    pub fn add_group(&mut self, group: &str) {
        if self.index.contains_key(group) {
            return;
        }
        self.index.insert(group.to_string(), self.groups.len());
        self.groups.push(MemoryGroup {
            name: group.to_string(),
            datasets: Vec::new(),
        });
    }

    /// Insert a dataset, creating the group if needed. An existing dataset of the same
    /// key is replaced in place.
    pub fn insert(&mut self, group: &str, dataset: &str, data: impl Into<MemoryArray>) {
        self.add_group(group);
        let group_idx = self.index[group];
        let datasets = &mut self.groups[group_idx].datasets;
        let data = data.into();
        match datasets.iter_mut().find(|(key, _)| key == dataset) {
            Some(entry) => entry.1 = data,
            None => datasets.push((dataset.to_string(), data)),
        }
    }

    fn get_group(&self, group: &str) -> Result<&MemoryGroup, StoreError> {
        self.index
            .get(group)
            .map(|idx| &self.groups[*idx])
            .ok_or_else(|| StoreError::MissingGroup(group.to_string()))
    }

    fn get_array(&self, group: &str, dataset: &str) -> Result<&MemoryArray, StoreError> {
        self.get_group(group)?
            .datasets
            .iter()
            .find(|(key, _)| key == dataset)
            .map(|(_, data)| data)
            .ok_or_else(|| StoreError::MissingDataset {
                group: group.to_string(),
                dataset: dataset.to_string(),
            })
    }
}

impl ArrayStore for MemoryStore {
    fn group_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.groups.iter().map(|group| group.name.clone()).collect())
    }

    fn dataset_names(&self, group: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .get_group(group)?
            .datasets
            .iter()
            .map(|(key, _)| key.clone())
            .collect())
    }

    fn read_f64(&self, group: &str, dataset: &str) -> Result<Array1<f64>, StoreError> {
        match self.get_array(group, dataset)? {
            MemoryArray::Float(data) => Ok(data.clone()),
            MemoryArray::Int(data) => Ok(data.mapv(|value| value as f64)),
        }
    }

    fn read_i64(&self, group: &str, dataset: &str) -> Result<Array1<i64>, StoreError> {
        match self.get_array(group, dataset)? {
            MemoryArray::Int(data) => Ok(data.clone()),
            MemoryArray::Float(_) => Err(StoreError::TypeMismatch {
                group: group.to_string(),
                dataset: dataset.to_string(),
            }),
        }
    }

    fn has_group(&self, group: &str) -> Result<bool, StoreError> {
        Ok(self.index.contains_key(group))
    }
}
