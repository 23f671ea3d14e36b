use ndarray::Array1;

use super::channel::SensorChannel;
use super::constants::{
    DATA_COLUMN, FIBER_GROUP_PREFIX, FIBER_TIMESTAMP_KEY, GENERIC_TIMESTAMP_KEY,
    VIBRATION_DATA_KEY, VIBRATION_GROUP_PREFIX, VIBRATION_TIMESTAMP_KEY,
};
use super::error::ReaderError;
use super::sensor_table::{Column, SensorTable, Timestamps};
use super::store::ArrayStore;

/// Fail with GroupNotFound (listing what does exist) if the group is absent
fn require_group<S: ArrayStore>(store: &S, group: &str) -> Result<(), ReaderError> {
    if store.has_group(group)? {
        Ok(())
    } else {
        Err(ReaderError::GroupNotFound {
            group: group.to_string(),
            available: store.group_names()?,
        })
    }
}

fn require_dataset(keys: &[String], group: &str, dataset: &str) -> Result<(), ReaderError> {
    if keys.iter().any(|k| k == dataset) {
        Ok(())
    } else {
        Err(ReaderError::DatasetNotFound {
            group: group.to_string(),
            dataset: dataset.to_string(),
        })
    }
}

fn check_length(
    group: &str,
    dataset: &str,
    expected: usize,
    values: &Array1<f64>,
) -> Result<(), ReaderError> {
    if values.len() != expected {
        return Err(ReaderError::LengthMismatch {
            group: group.to_string(),
            dataset: dataset.to_string(),
            expected,
            found: values.len(),
        });
    }
    Ok(())
}

/// Load the timestamps and the requested sensors of fiber `fiber_id`.
///
/// Columns come back as `[timestamp, sensor_<id>, ...]` in request order. A sensor
/// requested more than once is only loaded once.
pub fn load_fiber_group<S: ArrayStore>(
    store: &S,
    fiber_id: u32,
    sensors: &[SensorChannel],
) -> Result<SensorTable, ReaderError> {
    let group = format!("{FIBER_GROUP_PREFIX}{fiber_id}");
    require_group(store, &group)?;
    let keys = store.dataset_names(&group)?;

    require_dataset(&keys, &group, FIBER_TIMESTAMP_KEY)?;
    let timestamps = store.read_i64(&group, FIBER_TIMESTAMP_KEY)?;

    let mut columns: Vec<Column> = Vec::with_capacity(sensors.len());
    for sensor in sensors {
        if columns.iter().any(|c| c.name == sensor.column_name()) {
            continue;
        }
        let key = sensor.dataset_key();
        require_dataset(&keys, &group, key)?;
        let values = store.read_f64(&group, key)?;
        check_length(&group, key, timestamps.len(), &values)?;
        columns.push(Column::new(sensor.column_name(), values));
    }

    log::debug!(
        "Loaded {} rows of {} sensor(s) from {}",
        timestamps.len(),
        columns.len(),
        group
    );
    Ok(SensorTable::new(
        Some(Timestamps::Nanoseconds(timestamps)),
        columns,
    ))
}

/// Load one vibration channel as `[timestamp, data]`.
///
/// The timestamp column is sparse: rows without a hardware instant hold NaN.
pub fn load_vibration_group<S: ArrayStore>(
    store: &S,
    vibration_id: u32,
) -> Result<SensorTable, ReaderError> {
    let group = format!("{VIBRATION_GROUP_PREFIX}{vibration_id}");
    require_group(store, &group)?;
    let keys = store.dataset_names(&group)?;

    require_dataset(&keys, &group, VIBRATION_TIMESTAMP_KEY)?;
    require_dataset(&keys, &group, VIBRATION_DATA_KEY)?;
    let timestamps = store.read_f64(&group, VIBRATION_TIMESTAMP_KEY)?;
    let values = store.read_f64(&group, VIBRATION_DATA_KEY)?;
    check_length(&group, VIBRATION_DATA_KEY, timestamps.len(), &values)?;

    log::debug!("Loaded {} rows from {}", timestamps.len(), group);
    Ok(SensorTable::new(
        Some(Timestamps::Seconds(timestamps)),
        vec![Column::new(DATA_COLUMN, values)],
    ))
}

/// Load any group. The `__time_UTC__s__` dataset, when present, becomes the timestamp
/// column; every other dataset becomes a value column in stored key order.
pub fn load_generic_group<S: ArrayStore>(
    store: &S,
    group_name: &str,
) -> Result<SensorTable, ReaderError> {
    require_group(store, group_name)?;
    let keys = store.dataset_names(group_name)?;
    if keys.is_empty() {
        return Err(ReaderError::EmptyGroup(group_name.to_string()));
    }

    let timestamps = if keys.iter().any(|k| k == GENERIC_TIMESTAMP_KEY) {
        Some(store.read_f64(group_name, GENERIC_TIMESTAMP_KEY)?)
    } else {
        None
    };

    let data_keys: Vec<&String> = keys
        .iter()
        .filter(|k| k.as_str() != GENERIC_TIMESTAMP_KEY)
        .collect();
    if data_keys.is_empty() {
        return Err(ReaderError::NoDataColumns(group_name.to_string()));
    }

    let mut expected: Option<usize> = timestamps.as_ref().map(|ts| ts.len());
    let mut columns: Vec<Column> = Vec::with_capacity(data_keys.len());
    for key in data_keys {
        let values = store.read_f64(group_name, key)?;
        match expected {
            Some(len) => check_length(group_name, key, len, &values)?,
            None => expected = Some(values.len()),
        }
        columns.push(Column::new(key.clone(), values));
    }

    log::debug!(
        "Loaded {} column(s) from {} (timestamp: {})",
        columns.len(),
        group_name,
        timestamps.is_some()
    );
    Ok(SensorTable::new(timestamps.map(Timestamps::Seconds), columns))
}
