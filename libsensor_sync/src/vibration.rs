use bitvec::prelude::*;
use std::ops::Range;
use time::OffsetDateTime;

use super::channel::VibrationChannel;
use super::constants::NANOS_PER_SECOND;
use super::error::AlignError;
use super::sensor_table::{AlignedTable, Column, SensorTable};

/// Split rows into blocks, one per anchor. Each block runs from its anchor up to (not
/// including) the next anchor. Rows before the first anchor belong to no block.
pub fn segment_blocks(anchors: &BitSlice) -> Vec<Range<usize>> {
    let starts: Vec<usize> = anchors.iter_ones().collect();
    starts
        .iter()
        .enumerate()
        .map(|(idx, start)| {
            let end = starts.get(idx + 1).copied().unwrap_or(anchors.len());
            *start..end
        })
        .collect()
}

/// Offset of the sample at `sample_index` within its block, in nanoseconds
fn sample_offset_nanos(sample_index: usize, sample_rate: f64) -> i128 {
    let seconds = sample_index as f64 / sample_rate;
    (seconds * NANOS_PER_SECOND).round() as i128
}

/// Regenerate a dense clock from sparse anchors.
///
/// `raw` holds the recorded instant (nanoseconds) of anchor rows and None elsewhere. Every
/// row gets `block_start + sample_index / sample_rate`, where `block_start` is the instant
/// of the row's anchor and `sample_index` its 0-based position inside the block.
pub fn reconstruct_timestamps(
    raw: &[Option<i128>],
    sample_rate: f64,
) -> Result<Vec<i128>, AlignError> {
    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        return Err(AlignError::InvalidSampleRate(sample_rate));
    }
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    if raw[0].is_none() {
        return Err(AlignError::PrecondViolation(String::from(
            "first vibration sample has no recorded timestamp",
        )));
    }

    let anchors: BitVec = raw.iter().map(|ts| ts.is_some()).collect();
    let mut dense: Vec<i128> = Vec::with_capacity(raw.len());
    for block in segment_blocks(&anchors) {
        let Some(block_start) = raw[block.start] else {
            continue;
        };
        for sample_index in 0..block.len() {
            dense.push(block_start + sample_offset_nanos(sample_index, sample_rate));
        }
    }
    Ok(dense)
}

fn data_column(table: &SensorTable, channel: VibrationChannel) -> Result<&Column, AlignError> {
    table.columns.first().ok_or_else(|| {
        AlignError::PrecondViolation(format!(
            "vibration channel {} has no data column",
            channel.id()
        ))
    })
}

/// Merge the three vibration channels into one table with a reconstructed timestamp per
/// sample.
///
/// The channels are joined by row position, so they must have identical row counts. The
/// timestamps of `ch_101` drive the clock: its first row must carry a recorded instant.
/// Output columns are `[timestamp, vib_101, vib_102, vib_103]`.
pub fn process_vibration(
    ch_101: &SensorTable,
    ch_102: &SensorTable,
    ch_103: &SensorTable,
    sample_rate: f64,
) -> Result<AlignedTable, AlignError> {
    let channels = [ch_101, ch_102, ch_103];
    let n_rows = ch_101.n_rows();
    let mut columns: Vec<Column> = Vec::with_capacity(channels.len());
    for (table, channel) in channels.iter().zip(VibrationChannel::ALL) {
        let data = data_column(table, channel)?;
        if data.len() != n_rows {
            return Err(AlignError::PrecondViolation(format!(
                "vibration channel {} has {} rows but channel 101 has {}",
                channel.id(),
                data.len(),
                n_rows
            )));
        }
        columns.push(Column::new(channel.column_name(), data.values.clone()));
    }

    let raw = match &ch_101.timestamps {
        Some(ts) => ts.to_nanos(),
        None => {
            return Err(AlignError::PrecondViolation(String::from(
                "vibration channel 101 has no timestamp column",
            )))
        }
    };
    let n_anchors = raw.iter().filter(|ts| ts.is_some()).count();
    let timestamps = reconstruct_timestamps(&raw, sample_rate)?
        .into_iter()
        .map(OffsetDateTime::from_unix_timestamp_nanos)
        .collect::<Result<Vec<_>, _>>()?;

    log::debug!(
        "Reconstructed {} vibration timestamps from {} anchors at {} Hz",
        timestamps.len(),
        n_anchors,
        sample_rate
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
    use ndarray::Array1;
    use time::Duration;

    fn channel(timestamps: &[f64], values: &[f64]) -> SensorTable {
        SensorTable::new(
            Some(Timestamps::Seconds(Array1::from_vec(timestamps.to_vec()))),
            vec![Column::new("data", Array1::from_vec(values.to_vec()))],
        )
    }

    #[test]
    fn test_segment_blocks() {
        let anchors = bitvec![1, 0, 0, 1, 0, 1];
        assert_eq!(segment_blocks(&anchors), vec![0..3, 3..5, 5..6]);
        let leading = bitvec![0, 1, 0];
        assert_eq!(segment_blocks(&leading), vec![1..3]);
        assert!(segment_blocks(&bitvec![0, 0]).is_empty());
    }

    #[test]
    fn test_reconstruction_scenario() {
        let nan = f64::NAN;
        let base = channel(&[0.0, nan, nan, nan, 1.0, nan], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let other = channel(&[nan; 6], &[0.0; 6]);
        let table = process_vibration(&base, &other, &other, 4.0).unwrap();

        assert_eq!(
            table.column_names(),
            vec!["timestamp", "vib_101", "vib_102", "vib_103"]
        );
        let expected_ms = [0, 250, 500, 750, 1000, 1250];
        for (ts, ms) in table.timestamps.iter().zip(expected_ms) {
            assert_eq!(*ts, OffsetDateTime::UNIX_EPOCH + Duration::milliseconds(ms));
        }
        assert_eq!(
            table.column("vib_101").unwrap().values.to_vec(),
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]
        );
    }

    #[test]
    fn test_reconstruction_at_nominal_rate() {
        let anchor_a: i128 = 1_700_000_000_000_000_000;
        let anchor_b: i128 = anchor_a + 1_000_000;
        let mut raw: Vec<Option<i128>> = vec![None; 60];
        raw[0] = Some(anchor_a);
        raw[25] = Some(anchor_b);
        let dense = reconstruct_timestamps(&raw, 25_000.0).unwrap();

        assert_eq!(dense.len(), 60);
        for (row, ts) in dense.iter().enumerate() {
            let (anchor, index) = if row < 25 {
                (anchor_a, row)
            } else {
                (anchor_b, row - 25)
            };
            // 40 us per sample at 25 kHz
            assert_eq!(*ts, anchor + index as i128 * 40_000);
        }
    }

    #[test]
    fn test_reconstruction_keeps_epoch_precision() {
        let nan = f64::NAN;
        let first = 1_700_000_000.0 + 2f64.powi(-22);
        let base = channel(&[first, nan, 1_700_000_001.5, nan], &[1.0, 2.0, 3.0, 4.0]);
        let other = channel(&[nan; 4], &[0.0; 4]);
        let table = process_vibration(&base, &other, &other, 4.0).unwrap();

        let nanos: Vec<i128> = table
            .timestamps
            .iter()
            .map(|ts| ts.unix_timestamp_nanos())
            .collect();
        assert_eq!(
            nanos,
            vec![
                1_700_000_000_000_000_238,
                1_700_000_000_250_000_238,
                1_700_000_001_500_000_000,
                1_700_000_001_750_000_000,
            ]
        );
    }

    #[test]
    fn test_anchor_drift_restarts_block() {
        // second anchor arrives late; the block restarts from the recorded instant
        let raw = [Some(0), None, Some(5_000), None];
        let dense = reconstruct_timestamps(&raw, 1000.0).unwrap();
        assert_eq!(dense, vec![0, 1_000_000, 5_000, 1_005_000]);
    }

    #[test]
    fn test_reconstruction_preconditions() {
        assert!(matches!(
            reconstruct_timestamps(&[None, Some(0)], 4.0),
            Err(AlignError::PrecondViolation(_))
        ));
        assert!(matches!(
            reconstruct_timestamps(&[Some(0)], 0.0),
            Err(AlignError::InvalidSampleRate(_))
        ));
        assert!(matches!(
            reconstruct_timestamps(&[Some(0)], f64::NAN),
            Err(AlignError::InvalidSampleRate(_))
        ));
        assert!(reconstruct_timestamps(&[], 4.0).unwrap().is_empty());
    }

    #[test]
    fn test_mismatched_channel_lengths() {
        let base = channel(&[0.0, f64::NAN], &[1.0, 2.0]);
        let short = channel(&[0.0], &[1.0]);
        assert!(matches!(
            process_vibration(&base, &base, &short, 4.0),
            Err(AlignError::PrecondViolation(msg)) if msg.contains("103")
        ));
    }
}
