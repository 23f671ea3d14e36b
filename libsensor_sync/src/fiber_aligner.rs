use bitvec::prelude::*;
use ndarray::Array1;
use std::borrow::Cow;
use time::OffsetDateTime;

use super::channel::{FiberSide, SensorChannel};
use super::constants::DEFAULT_TOLERANCE_NS;
use super::error::AlignError;
use super::sensor_table::{AlignedTable, Column, SensorTable};

/// Fiber 2 sensor 5 is unreliable and never makes it into a fused table
const DROPPED_SENSOR: SensorChannel = SensorChannel::S5;

fn side_label(side: FiberSide) -> &'static str {
    match side {
        FiberSide::First => "first fiber",
        FiberSide::Second => "second fiber",
    }
}

/// Pull the timestamp axis of a fiber table as nanoseconds, checking that every row has an
/// instant, that the axis never goes backwards and that every column spans the axis.
fn sorted_nanos(table: &SensorTable, side: FiberSide) -> Result<Vec<i128>, AlignError> {
    let timestamps = match &table.timestamps {
        Some(ts) => ts.to_nanos(),
        None => {
            return Err(AlignError::PrecondViolation(format!(
                "{} table has no timestamp column",
                side_label(side)
            )))
        }
    };

    let mut nanos: Vec<i128> = Vec::with_capacity(timestamps.len());
    for (row, ts) in timestamps.into_iter().enumerate() {
        let ts = ts.ok_or_else(|| {
            AlignError::PrecondViolation(format!(
                "{} timestamp is missing at row {row}",
                side_label(side)
            ))
        })?;
        if let Some(prev) = nanos.last() {
            if ts < *prev {
                return Err(AlignError::PrecondViolation(format!(
                    "{} timestamps are not sorted ascending at row {row}",
                    side_label(side)
                )));
            }
        }
        nanos.push(ts);
    }

    if let Some(short) = table.columns.iter().find(|c| c.len() != nanos.len()) {
        return Err(AlignError::PrecondViolation(format!(
            "{} column {} has {} rows but {} timestamps",
            side_label(side),
            short.name,
            short.len(),
            nanos.len()
        )));
    }
    Ok(nanos)
}

/// Nearest-timestamp asof match of every left instant against the right axis.
///
/// Both axes must be sorted ascending. For each left row returns the index of the right
/// row closest in time, or None if the closest is further away than `tolerance` (the bound
/// is inclusive). When an earlier and a later right row are equally close the earlier one
/// wins, and among identical right instants the last one is used. Runs as a single sweep
/// over both axes.
pub fn asof_nearest(left: &[i128], right: &[i128], tolerance: i128) -> Vec<Option<usize>> {
    let mut matches: Vec<Option<usize>> = Vec::with_capacity(left.len());
    // first right row strictly after the current left instant
    let mut next = 0;
    for &ts in left {
        while next < right.len() && right[next] <= ts {
            next += 1;
        }
        let backward = next.checked_sub(1).map(|idx| (idx, ts - right[idx]));
        let forward = right.get(next).map(|r| (next, *r - ts));
        let nearest = match (backward, forward) {
            (Some(b), Some(f)) => Some(if b.1 <= f.1 { b } else { f }),
            (Some(b), None) => Some(b),
            (None, Some(f)) => Some(f),
            (None, None) => None,
        };
        matches.push(match nearest {
            Some((idx, delta)) if delta <= tolerance => Some(idx),
            _ => None,
        });
    }
    matches
}

/// Fused name of a fiber column; columns which are not sensors keep their name
fn fused_name(name: &Cow<'static, str>, side: FiberSide) -> Cow<'static, str> {
    match SensorChannel::from_column_name(name) {
        Some(sensor) => Cow::Borrowed(sensor.fiber_column(side)),
        None => name.clone(),
    }
}

/// Fuse two fiber tables with the default 1 ms tolerance. See [`process_fibers_with_tolerance`].
pub fn process_fibers(
    fiber_a: &SensorTable,
    fiber_b: &SensorTable,
) -> Result<AlignedTable, AlignError> {
    process_fibers_with_tolerance(fiber_a, fiber_b, DEFAULT_TOLERANCE_NS)
}

/// Fuse two independently sampled fiber tables onto the time axis of `fiber_a`.
///
/// Sensor columns are renamed to `f_sensor_1_k` / `f_sensor_2_k`, every row of
/// `fiber_a` is matched to the nearest row of `fiber_b` within `tolerance_ns`, the second
/// fiber's fifth sensor is dropped, and any row left with a missing value is removed.
/// Both tables must be sorted ascending by timestamp.
pub fn process_fibers_with_tolerance(
    fiber_a: &SensorTable,
    fiber_b: &SensorTable,
    tolerance_ns: i64,
) -> Result<AlignedTable, AlignError> {
    if tolerance_ns < 0 {
        return Err(AlignError::InvalidTolerance(tolerance_ns));
    }
    let left = sorted_nanos(fiber_a, FiberSide::First)?;
    let right = sorted_nanos(fiber_b, FiberSide::Second)?;
    let matches = asof_nearest(&left, &right, tolerance_ns as i128);

    let dropped = DROPPED_SENSOR.fiber_column(FiberSide::Second);
    let left_columns: Vec<(Cow<'static, str>, &Array1<f64>)> = fiber_a
        .columns
        .iter()
        .map(|c| (fused_name(&c.name, FiberSide::First), &c.values))
        .collect();
    let right_columns: Vec<(Cow<'static, str>, &Array1<f64>)> = fiber_b
        .columns
        .iter()
        .map(|c| (fused_name(&c.name, FiberSide::Second), &c.values))
        .filter(|(name, _)| name != dropped)
        .collect();

    // A row survives only if it found a partner and carries no missing value
    let mut keep: BitVec = BitVec::repeat(false, left.len());
    for (row, matched) in matches.iter().enumerate() {
        if let Some(partner) = matched {
            let complete = left_columns.iter().all(|(_, v)| !v[row].is_nan())
                && right_columns.iter().all(|(_, v)| !v[*partner].is_nan());
            keep.set(row, complete);
        }
    }

    let n_kept = keep.count_ones();
    let mut timestamps: Vec<OffsetDateTime> = Vec::with_capacity(n_kept);
    for row in keep.iter_ones() {
        timestamps.push(OffsetDateTime::from_unix_timestamp_nanos(left[row])?);
    }

    let mut columns: Vec<Column> = Vec::with_capacity(left_columns.len() + right_columns.len());
    for (name, values) in left_columns {
        let kept: Array1<f64> = keep.iter_ones().map(|row| values[row]).collect();
        columns.push(Column::new(name, kept));
    }
    for (name, values) in right_columns {
        let kept: Array1<f64> = keep
            .iter_ones()
            .filter_map(|row| matches[row].map(|partner| values[partner]))
            .collect();
        columns.push(Column::new(name, kept));
    }

    log::debug!(
        "Fused fibers: {} of {} reference rows matched within {} ns",
        n_kept,
        left.len(),
        tolerance_ns
    );
    Ok(AlignedTable {
        timestamps,
        columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor_table::Timestamps;
    use ndarray::array;

    const MS: i64 = 1_000_000;

    fn fiber_table(ts_ms: &[i64], offset: f64) -> SensorTable {
        let ts: Array1<i64> = ts_ms.iter().map(|t| t * MS).collect();
        let columns = SensorChannel::ALL
            .iter()
            .map(|s| {
                let values: Array1<f64> = (0..ts_ms.len())
                    .map(|row| offset + row as f64 * 10.0 + s.id() as f64)
                    .collect();
                Column::new(s.column_name(), values)
            })
            .collect();
        SensorTable::new(Some(Timestamps::Nanoseconds(ts)), columns)
    }

    #[test]
    fn test_asof_nearest_boundary() {
        let left = [0, 5, 10].map(|t: i128| t * MS as i128);
        let right = [1, 4, 9].map(|t: i128| t * MS as i128);
        let matches = asof_nearest(&left, &right, MS as i128);
        // every delta is exactly 1 ms, inside the inclusive bound
        assert_eq!(matches, vec![Some(0), Some(1), Some(2)]);

        let strict = asof_nearest(&left, &right, MS as i128 - 1);
        assert_eq!(strict, vec![None, None, None]);
    }

    #[test]
    fn test_asof_nearest_ties() {
        // 5 is equally far from 4 and 6; the earlier row wins
        assert_eq!(asof_nearest(&[5], &[4, 6], 10), vec![Some(0)]);
        // duplicates on the right resolve to the last of them
        assert_eq!(asof_nearest(&[5], &[5, 5, 7], 0), vec![Some(1)]);
        assert_eq!(asof_nearest(&[1, 2], &[], 10), vec![None, None]);
        // right rows may be reused
        assert_eq!(asof_nearest(&[10, 11, 12], &[11], 1), vec![Some(0); 3]);
    }

    #[test]
    fn test_process_fibers_scenario() {
        let fiber_a = fiber_table(&[0, 5, 10], 0.0);
        let fiber_b = fiber_table(&[1, 4, 9], 100.0);
        let fused = process_fibers(&fiber_a, &fiber_b).unwrap();

        assert_eq!(
            fused.column_names(),
            vec![
                "timestamp",
                "f_sensor_1_1",
                "f_sensor_1_2",
                "f_sensor_1_3",
                "f_sensor_1_4",
                "f_sensor_1_5",
                "f_sensor_2_1",
                "f_sensor_2_2",
                "f_sensor_2_3",
                "f_sensor_2_4",
            ]
        );
        assert_eq!(fused.n_rows(), 3);
        assert_eq!(
            fused.timestamps[1],
            OffsetDateTime::UNIX_EPOCH + time::Duration::milliseconds(5)
        );
        // row at 5 ms takes fiber b's row at 4 ms (its second row)
        assert_eq!(
            fused.column("f_sensor_2_1").unwrap().values.to_vec(),
            vec![101.0, 111.0, 121.0]
        );
    }

    #[test]
    fn test_unmatched_rows_dropped() {
        let fiber_a = fiber_table(&[0, 5, 10, 20], 0.0);
        let fiber_b = fiber_table(&[0, 10], 100.0);
        let fused = process_fibers(&fiber_a, &fiber_b).unwrap();
        assert_eq!(fused.n_rows(), 2);
        assert_eq!(
            fused.column("f_sensor_1_1").unwrap().values.to_vec(),
            vec![1.0, 21.0]
        );
        assert_eq!(
            fused.column("f_sensor_2_1").unwrap().values.to_vec(),
            vec![101.0, 111.0]
        );
    }

    #[test]
    fn test_missing_values_dropped() {
        let mut fiber_a = fiber_table(&[0, 1, 2], 0.0);
        let mut fiber_b = fiber_table(&[0, 1, 2], 100.0);
        fiber_a.columns[2].values[0] = f64::NAN;
        fiber_b.columns[1].values[2] = f64::NAN;
        // NaN in the dropped sensor must not remove a row
        fiber_b.columns[4].values[1] = f64::NAN;

        let fused = process_fibers(&fiber_a, &fiber_b).unwrap();
        assert_eq!(fused.n_rows(), 1);
        assert!(fused.column("f_sensor_2_5").is_none());
        for column in fused.columns.iter() {
            assert!(column.values.iter().all(|v| !v.is_nan()));
            assert_eq!(column.len(), 1);
        }
    }

    #[test]
    fn test_matched_rows_within_tolerance() {
        let left_ms: Vec<i64> = (0..50).map(|i| i * 3).collect();
        let right_ms: Vec<i64> = (0..40).map(|i| i * 4 + 1).collect();
        let fiber_a = fiber_table(&left_ms, 0.0);
        let fiber_b = fiber_table(&right_ms, 0.0);
        let fused = process_fibers(&fiber_a, &fiber_b).unwrap();

        assert!(fused.n_rows() <= left_ms.len());
        // sensor 1 of fiber b encodes its row as 10 * row + 1
        let partner_rows = fused.column("f_sensor_2_1").unwrap();
        for (ts, value) in fused.timestamps.iter().zip(partner_rows.values.iter()) {
            let row = ((value - 1.0) / 10.0).round() as usize;
            let right_ns = right_ms[row] as i128 * MS as i128;
            let delta = (ts.unix_timestamp_nanos() - right_ns).abs();
            assert!(delta <= MS as i128);
        }
        assert!(fused.timestamps.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_process_fibers_is_pure() {
        let fiber_a = fiber_table(&[0, 2, 4, 6], 0.0);
        let fiber_b = fiber_table(&[1, 3, 8], 50.0);
        let first = process_fibers(&fiber_a, &fiber_b).unwrap();
        let second = process_fibers(&fiber_a, &fiber_b).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_precondition_violations() {
        let sorted = fiber_table(&[0, 1, 2], 0.0);
        let unsorted = fiber_table(&[0, 2, 1], 0.0);
        assert!(matches!(
            process_fibers(&sorted, &unsorted),
            Err(AlignError::PrecondViolation(msg)) if msg.contains("second fiber")
        ));

        let untimed = SensorTable::new(None, vec![Column::new("sensor_1", array![1.0])]);
        assert!(matches!(
            process_fibers(&untimed, &sorted),
            Err(AlignError::PrecondViolation(_))
        ));
        assert!(matches!(
            process_fibers_with_tolerance(&sorted, &sorted, -1),
            Err(AlignError::InvalidTolerance(-1))
        ));
    }

    #[test]
    fn test_column_shorter_than_timestamps() {
        let sorted = fiber_table(&[0, 1, 2], 0.0);
        let short = SensorTable::new(
            Some(Timestamps::Nanoseconds(array![0, MS, 2 * MS])),
            vec![Column::new("sensor_1", array![1.0])],
        );
        assert!(matches!(
            process_fibers(&sorted, &short),
            Err(AlignError::PrecondViolation(msg))
                if msg.contains("second fiber") && msg.contains("sensor_1")
        ));
        assert!(matches!(
            process_fibers(&short, &sorted),
            Err(AlignError::PrecondViolation(msg)) if msg.contains("first fiber")
        ));
    }
}
