// Column names for every logical channel are fixed lookups into the tables below.
// Fibers carry five strain sensors each; when two fibers are fused the sensor columns
// get a fiber prefix so the two sets stay distinguishable:
// fiber 1, sensor k -> f_sensor_1_k
// fiber 2, sensor k -> f_sensor_2_k
// Vibration channels are identified by their acquisition number (101, 102, 103).
use super::error::ChannelError;

const SENSOR_DATASET_KEYS: [&str; 5] = ["1", "2", "3", "4", "5"];
const SENSOR_COLUMNS: [&str; 5] = ["sensor_1", "sensor_2", "sensor_3", "sensor_4", "sensor_5"];
const FIBER_1_COLUMNS: [&str; 5] = [
    "f_sensor_1_1",
    "f_sensor_1_2",
    "f_sensor_1_3",
    "f_sensor_1_4",
    "f_sensor_1_5",
];
const FIBER_2_COLUMNS: [&str; 5] = [
    "f_sensor_2_1",
    "f_sensor_2_2",
    "f_sensor_2_3",
    "f_sensor_2_4",
    "f_sensor_2_5",
];
const VIBRATION_COLUMNS: [&str; 3] = ["vib_101", "vib_102", "vib_103"];

/// One of the five strain sensors on a fiber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorChannel {
    S1,
    S2,
    S3,
    S4,
    S5,
}

impl SensorChannel {
    pub const ALL: [SensorChannel; 5] = [Self::S1, Self::S2, Self::S3, Self::S4, Self::S5];

    fn index(&self) -> usize {
        match self {
            Self::S1 => 0,
            Self::S2 => 1,
            Self::S3 => 2,
            Self::S4 => 3,
            Self::S5 => 4,
        }
    }

    pub fn id(&self) -> u8 {
        self.index() as u8 + 1
    }

    /// Dataset key of this sensor inside a fiber group
    pub fn dataset_key(&self) -> &'static str {
        SENSOR_DATASET_KEYS[self.index()]
    }

    /// Column name in a single-fiber table
    pub fn column_name(&self) -> &'static str {
        SENSOR_COLUMNS[self.index()]
    }

    /// Column name once the fiber has been fused with another
    pub fn fiber_column(&self, side: FiberSide) -> &'static str {
        match side {
            FiberSide::First => FIBER_1_COLUMNS[self.index()],
            FiberSide::Second => FIBER_2_COLUMNS[self.index()],
        }
    }

    /// Reverse lookup of [`SensorChannel::column_name`]
    pub fn from_column_name(name: &str) -> Option<Self> {
        SENSOR_COLUMNS
            .iter()
            .position(|col| *col == name)
            .map(|idx| Self::ALL[idx])
    }
}

impl TryFrom<u8> for SensorChannel {
    type Error = ChannelError;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::S1),
            2 => Ok(Self::S2),
            3 => Ok(Self::S3),
            4 => Ok(Self::S4),
            5 => Ok(Self::S5),
            _ => Err(ChannelError::InvalidSensor(value)),
        }
    }
}

/// Which side of a fiber fusion a table is on. The first fiber is the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FiberSide {
    First,
    Second,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VibrationChannel {
    Ch101,
    Ch102,
    Ch103,
}

impl VibrationChannel {
    pub const ALL: [VibrationChannel; 3] = [Self::Ch101, Self::Ch102, Self::Ch103];

    fn index(&self) -> usize {
        match self {
            Self::Ch101 => 0,
            Self::Ch102 => 1,
            Self::Ch103 => 2,
        }
    }

    /// Acquisition number, also the suffix of the store group name
    pub fn id(&self) -> u32 {
        101 + self.index() as u32
    }

    pub fn column_name(&self) -> &'static str {
        VIBRATION_COLUMNS[self.index()]
    }
}

impl TryFrom<u32> for VibrationChannel {
    type Error = ChannelError;
    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            101 => Ok(Self::Ch101),
            102 => Ok(Self::Ch102),
            103 => Ok(Self::Ch103),
            _ => Err(ChannelError::InvalidVibration(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensor_names() {
        let sensor = SensorChannel::try_from(3).unwrap();
        assert_eq!(sensor.dataset_key(), "3");
        assert_eq!(sensor.column_name(), "sensor_3");
        assert_eq!(sensor.fiber_column(FiberSide::First), "f_sensor_1_3");
        assert_eq!(sensor.fiber_column(FiberSide::Second), "f_sensor_2_3");
        assert_eq!(SensorChannel::from_column_name("sensor_3"), Some(sensor));
        assert_eq!(SensorChannel::from_column_name("timestamp"), None);
    }

    #[test]
    fn test_invalid_channels() {
        assert!(matches!(
            SensorChannel::try_from(0),
            Err(ChannelError::InvalidSensor(0))
        ));
        assert!(matches!(
            SensorChannel::try_from(6),
            Err(ChannelError::InvalidSensor(6))
        ));
        assert!(VibrationChannel::try_from(104).is_err());
    }

    #[test]
    fn test_vibration_names() {
        for (channel, id) in VibrationChannel::ALL.iter().zip([101, 102, 103]) {
            assert_eq!(channel.id(), id);
            assert_eq!(channel.column_name(), format!("vib_{id}"));
            assert_eq!(VibrationChannel::try_from(id).unwrap(), *channel);
        }
    }
}
