use ndarray::Array1;
use std::borrow::Cow;
use time::OffsetDateTime;

use super::constants::{NANOS_PER_SECOND, NANOS_PER_SECOND_INT, TIMESTAMP_COLUMN};

/// A named value column. Missing values are NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: Cow<'static, str>,
    pub values: Array1<f64>,
}

impl Column {
    pub fn new(name: impl Into<Cow<'static, str>>, values: Array1<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Raw timestamp axis exactly as stored
#[derive(Debug, Clone, PartialEq)]
pub enum Timestamps {
    /// Integer nanoseconds since the epoch
    Nanoseconds(Array1<i64>),
    /// Floating seconds since the epoch; NaN marks a row without a recorded instant
    Seconds(Array1<f64>),
}

impl Timestamps {
    pub fn len(&self) -> usize {
        match self {
            Self::Nanoseconds(ts) => ts.len(),
            Self::Seconds(ts) => ts.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every row as nanoseconds since the epoch, None where no instant was recorded
    pub fn to_nanos(&self) -> Vec<Option<i128>> {
        match self {
            Self::Nanoseconds(ts) => ts.iter().map(|t| Some(*t as i128)).collect(),
            Self::Seconds(ts) => ts.iter().map(|t| seconds_to_nanos(*t)).collect(),
        }
    }
}

/// Convert floating seconds to integer nanoseconds, rounding to the nearest nanosecond.
///
/// Whole and fractional seconds are scaled separately. Epoch instants are around 1e18 ns,
/// where an f64 can only resolve 256 ns, so scaling the full value first would quantize it.
pub fn seconds_to_nanos(seconds: f64) -> Option<i128> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.trunc();
    let frac = seconds - whole;
    Some(
        whole as i128 * NANOS_PER_SECOND_INT as i128
            + (frac * NANOS_PER_SECOND).round() as i128,
    )
}

/// The uniform shape produced by the reader: an optional timestamp axis plus one or more
/// value columns, all of equal length, in storage order.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorTable {
    pub timestamps: Option<Timestamps>,
    pub columns: Vec<Column>,
}

impl SensorTable {
    pub fn new(timestamps: Option<Timestamps>, columns: Vec<Column>) -> Self {
        Self {
            timestamps,
            columns,
        }
    }

    pub fn has_timestamp(&self) -> bool {
        self.timestamps.is_some()
    }

    pub fn n_rows(&self) -> usize {
        match &self.timestamps {
            Some(ts) => ts.len(),
            None => self.columns.first().map(|c| c.len()).unwrap_or(0),
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Output column names, including the leading timestamp when there is one
    pub fn column_names(&self) -> Vec<&str> {
        let mut names = Vec::with_capacity(self.columns.len() + 1);
        if self.has_timestamp() {
            names.push(TIMESTAMP_COLUMN);
        }
        names.extend(self.columns.iter().map(|c| c.name.as_ref()));
        names
    }
}

/// Two or more SensorTables fused onto one common time axis
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedTable {
    pub timestamps: Vec<OffsetDateTime>,
    pub columns: Vec<Column>,
}

impl AlignedTable {
    pub fn n_rows(&self) -> usize {
        self.timestamps.len()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        let mut names = vec![TIMESTAMP_COLUMN];
        names.extend(self.columns.iter().map(|c| c.name.as_ref()));
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_column_names() {
        let table = SensorTable::new(
            Some(Timestamps::Nanoseconds(array![1, 2])),
            vec![Column::new("sensor_1", array![0.1, 0.2])],
        );
        assert_eq!(table.column_names(), vec!["timestamp", "sensor_1"]);
        assert_eq!(table.n_rows(), 2);

        let untimed = SensorTable::new(None, vec![Column::new(String::from("rpm"), array![1.0])]);
        assert!(!untimed.has_timestamp());
        assert_eq!(untimed.column_names(), vec!["rpm"]);
        assert_eq!(untimed.n_rows(), 1);
    }

    #[test]
    fn test_seconds_to_nanos() {
        assert_eq!(seconds_to_nanos(1.5), Some(1_500_000_000));
        assert_eq!(seconds_to_nanos(f64::NAN), None);
        let ts = Timestamps::Seconds(array![0.25, f64::NAN]);
        assert_eq!(ts.to_nanos(), vec![Some(250_000_000), None]);
        assert_eq!(seconds_to_nanos(-1.25), Some(-1_250_000_000));
    }

    #[test]
    fn test_seconds_to_nanos_at_epoch_scale() {
        // 2^-22 s is the spacing of f64 values near 1.7e9 s
        let step = 2f64.powi(-22);
        assert_eq!(
            seconds_to_nanos(1_700_000_000.0 + step),
            Some(1_700_000_000_000_000_238)
        );
        assert_eq!(
            seconds_to_nanos(1_700_000_000.5),
            Some(1_700_000_000_500_000_000)
        );
        assert_eq!(
            seconds_to_nanos(1_700_000_000.0 + 3.0 * step),
            Some(1_700_000_000_000_000_715)
        );
    }
}
