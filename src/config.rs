use core::fmt;
use core::str::FromStr;

/// Supported sensor variants.
///
/// The DHT11 transmits integer-only values. The DHT22 and AM2302 transmit
/// fixed-point tenths with a sign bit in the temperature high byte.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SensorKind {
    /// DHT11, integer encoding.
    Dht11,
    /// DHT22, fixed-point tenths encoding.
    Dht22,
    /// AM2302, wire-compatible with the DHT22.
    Am2302,
}

/// Error returned when parsing an unrecognized sensor type name.
#[derive(Debug, PartialEq, Eq)]
pub struct UnknownSensorKind;

impl fmt::Display for UnknownSensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown sensor kind, expected one of: DHT11, DHT22, AM2302")
    }
}

impl FromStr for SensorKind {
    type Err = UnknownSensorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DHT11" => Ok(SensorKind::Dht11),
            "DHT22" => Ok(SensorKind::Dht22),
            "AM2302" => Ok(SensorKind::Am2302),
            _ => Err(UnknownSensorKind),
        }
    }
}

/// Error returned when a reader is constructed from an invalid configuration.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The clock scale must be finite and strictly positive.
    InvalidClockScale,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidClockScale => {
                f.write_str("clock scale must be finite and strictly positive")
            }
        }
    }
}

/// Configuration for a [`Dht`](crate::Dht) reader.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Which sensor variant is wired to the pin.
    pub kind: SensorKind,
    /// Log every captured timing after a read, for calibrating the clock scale.
    pub debug: bool,
    /// Multiplier applied to all nominal cycle-count thresholds.
    pub clock_scale: f32,
}

impl Config {
    /// Configuration for the given sensor variant with debug logging off and
    /// a clock scale of 1.0.
    pub fn new(kind: SensorKind) -> Self {
        Config {
            kind,
            debug: false,
            clock_scale: 1.0,
        }
    }

    /// Enables or disables the per-timing debug report.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Sets the clock-scale calibration multiplier.
    pub fn with_clock_scale(mut self, clock_scale: f32) -> Self {
        self.clock_scale = clock_scale;
        self
    }
}

/// Base timeout, in cycles, for a single level wait during capture.
const BASE_TIMEOUT_CYCLES: u32 = 100_000;
/// Nominal cycle count of the sync pulse between bits.
const BASE_BIT_SYNC: u32 = 200;
/// Nominal cycle count of the sync pulse between bytes.
const BASE_BYTE_SYNC: u32 = 250;
/// Data pulses longer than this count decode as a 1 bit.
const BASE_LOW_HIGH_CUTOFF: u32 = 180;

/// Cycle-count thresholds scaled to the host's execution speed.
///
/// The sensor holds the wire high or low for so little time that the host
/// cannot afford a syscall between edges without losing synchronization.
/// Elapsed time is therefore counted in busy-wait poll iterations, and the
/// nominal counts must be scaled to how fast the host actually polls the pin.
/// The base values hold on a stock-clocked Raspberry Pi model B; a faster
/// host needs a proportionally larger scale. The debug timing report exists
/// to work out the right scale for a new host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct CycleThresholds {
    /// Cycles before a level wait gives up.
    pub(crate) timeout_cycles: u32,
    /// Expected sync-pulse duration between bits.
    pub(crate) bit_sync: u32,
    /// Expected sync-pulse duration between bytes.
    pub(crate) byte_sync: u32,
    /// Decision boundary between 0 and 1 data pulses.
    pub(crate) low_high_cutoff: u32,
}

impl CycleThresholds {
    pub(crate) fn from_scale(clock_scale: f32) -> Result<Self, ConfigError> {
        if !clock_scale.is_finite() || clock_scale <= 0.0 {
            return Err(ConfigError::InvalidClockScale);
        }
        let scaled = |base: u32| (base as f32 * clock_scale) as u32;
        Ok(CycleThresholds {
            timeout_cycles: scaled(BASE_TIMEOUT_CYCLES),
            bit_sync: scaled(BASE_BIT_SYNC),
            byte_sync: scaled(BASE_BYTE_SYNC),
            low_high_cutoff: scaled(BASE_LOW_HIGH_CUTOFF),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_kinds() {
        assert_eq!("DHT11".parse(), Ok(SensorKind::Dht11));
        assert_eq!("DHT22".parse(), Ok(SensorKind::Dht22));
        assert_eq!("AM2302".parse(), Ok(SensorKind::Am2302));
    }

    #[test]
    fn parse_rejects_unknown_kinds() {
        assert_eq!("DHT21".parse::<SensorKind>(), Err(UnknownSensorKind));
        assert_eq!("dht22".parse::<SensorKind>(), Err(UnknownSensorKind));
        assert_eq!("".parse::<SensorKind>(), Err(UnknownSensorKind));
    }

    #[test]
    fn config_defaults() {
        let config = Config::new(SensorKind::Dht22);
        assert_eq!(config.kind, SensorKind::Dht22);
        assert!(!config.debug);
        assert_eq!(config.clock_scale, 1.0);
    }

    #[test]
    fn thresholds_at_unit_scale() {
        let thresholds = CycleThresholds::from_scale(1.0).unwrap();
        assert_eq!(
            thresholds,
            CycleThresholds {
                timeout_cycles: 100_000,
                bit_sync: 200,
                byte_sync: 250,
                low_high_cutoff: 180,
            }
        );
    }

    #[test]
    fn thresholds_scale_linearly() {
        let thresholds = CycleThresholds::from_scale(2.0).unwrap();
        assert_eq!(
            thresholds,
            CycleThresholds {
                timeout_cycles: 200_000,
                bit_sync: 400,
                byte_sync: 500,
                low_high_cutoff: 360,
            }
        );

        let reduced = CycleThresholds::from_scale(0.1).unwrap();
        assert_eq!(reduced.timeout_cycles, 10_000);
        assert_eq!(reduced.low_high_cutoff, 18);
    }

    #[test]
    fn invalid_scales_are_rejected() {
        for scale in [0.0, -1.0, f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            assert_eq!(
                CycleThresholds::from_scale(scale),
                Err(ConfigError::InvalidClockScale)
            );
        }
    }
}
