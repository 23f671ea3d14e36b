// Store naming conventions. These must match the acquisition layout exactly.
pub const FIBER_GROUP_PREFIX: &str = "fibers_";
pub const FIBER_TIMESTAMP_KEY: &str = "0";
pub const VIBRATION_GROUP_PREFIX: &str = "vibration_";
pub const VIBRATION_TIMESTAMP_KEY: &str = "Timestamp";
pub const VIBRATION_DATA_KEY: &str = "Data";
pub const GENERIC_TIMESTAMP_KEY: &str = "__time_UTC__s__";

// Output column names
pub const TIMESTAMP_COLUMN: &str = "timestamp";
pub const DATA_COLUMN: &str = "data";

/// Nominal vibration sample rate in samples per second
pub const DEFAULT_SAMPLE_RATE: f64 = 25_000.0;
/// Fiber asof-join window (inclusive), 1 ms
pub const DEFAULT_TOLERANCE_NS: i64 = 1_000_000;

pub const NANOS_PER_SECOND: f64 = 1.0e9;
pub const NANOS_PER_SECOND_INT: i64 = 1_000_000_000;
