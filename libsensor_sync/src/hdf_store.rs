use hdf5::File;
use ndarray::Array1;
use std::path::Path;

use super::error::StoreError;
use super::store::ArrayStore;

/// A simple struct which wraps around the hdf5-rust library.
///
/// Opens an HDF5 file read-only. Groups live at the file root and each group holds
/// one-dimensional datasets. The file is closed when the Hdf5Store is dropped, so
/// callers should keep one alive only for the duration of a single load.
#[derive(Debug)]
pub struct Hdf5Store {
    file_handle: File,
}

impl Hdf5Store {
    /// Open the store at path for reading
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Err(StoreError::BadFilePath(path.to_path_buf()));
        }
        let file_handle = File::open(path)?;
        if let Ok(meta) = path.metadata() {
            log::debug!(
                "Opened store {} ({})",
                path.to_string_lossy(),
                human_bytes::human_bytes(meta.len() as f64)
            );
        }
        Ok(Self { file_handle })
    }

    fn get_group(&self, group: &str) -> Result<hdf5::Group, StoreError> {
        match self.file_handle.group(group) {
            Ok(g) => Ok(g),
            Err(_) => Err(StoreError::MissingGroup(group.to_string())),
        }
    }

    fn get_dataset(&self, group: &str, dataset: &str) -> Result<hdf5::Dataset, StoreError> {
        let g = self.get_group(group)?;
        match g.dataset(dataset) {
            Ok(d) => Ok(d),
            Err(_) => Err(StoreError::MissingDataset {
                group: group.to_string(),
                dataset: dataset.to_string(),
            }),
        }
    }
}

/// HDF5 object names are absolute paths; keep only the last component
fn short_name(name: &str) -> String {
    match name.rsplit_once('/') {
        Some((_, tail)) => tail.to_string(),
        None => name.to_string(),
    }
}

impl ArrayStore for Hdf5Store {
    fn group_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self
            .file_handle
            .groups()?
            .iter()
            .map(|g| short_name(&g.name()))
            .collect())
    }

    fn dataset_names(&self, group: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .get_group(group)?
            .datasets()?
            .iter()
            .map(|d| short_name(&d.name()))
            .collect())
    }

    fn read_f64(&self, group: &str, dataset: &str) -> Result<Array1<f64>, StoreError> {
        Ok(self.get_dataset(group, dataset)?.read_1d::<f64>()?)
    }

    fn read_i64(&self, group: &str, dataset: &str) -> Result<Array1<i64>, StoreError> {
        let dset = self.get_dataset(group, dataset)?;
        if dset.dtype()?.is::<f64>() || dset.dtype()?.is::<f32>() {
            return Err(StoreError::TypeMismatch {
                group: group.to_string(),
                dataset: dataset.to_string(),
            });
        }
        Ok(dset.read_1d::<i64>()?)
    }

    fn has_group(&self, group: &str) -> Result<bool, StoreError> {
        Ok(self.file_handle.link_exists(group) && self.file_handle.group(group).is_ok())
    }
}
