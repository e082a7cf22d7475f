use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
};

use crate::config::{Config, ConfigError, CycleThresholds, SensorKind};
use crate::error::DhtError;
use crate::frame::{Frame, NUM_TIMINGS, Reading};

/// How long the line is driven high before a read so the sensor settles,
/// in milliseconds.
const SETTLE_HIGH_MS: u32 = 500;
/// How long the line is pulled low to request a transmission, in milliseconds.
const TRIGGER_LOW_MS: u32 = 20;
/// Poll budget for the acknowledgement wait. Polls are spaced 1 us apart, so
/// the sensor has roughly two seconds to respond. Bounded by real delays
/// rather than busy-wait speed, so the clock scale does not apply.
const ACK_POLL_BUDGET: u32 = 200_000;

/// Success/failure counters accumulated by one reader across its lifetime.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Statistics {
    /// Total number of attempted reads.
    pub reads: u32,
    /// Number of attempted reads that failed.
    pub failures: u32,
}

impl Statistics {
    /// Percentage of reads that failed, or `None` before the first read.
    pub fn failure_rate(&self) -> Option<f32> {
        if self.reads == 0 {
            return None;
        }
        Some(self.failures as f32 / self.reads as f32 * 100.0)
    }
}

/// Driver for DHT-family temperature and humidity sensors.
///
/// One instance owns one data pin; sensors on different pins get their own
/// instances with independent buffers and counters.
pub struct Dht<PIN, DELAY> {
    pin: PIN,
    delay: DELAY,
    kind: SensorKind,
    debug: bool,
    thresholds: CycleThresholds,
    timings: [u32; NUM_TIMINGS],
    last: Option<Reading>,
    stats: Statistics,
}

impl<PIN, DELAY, E> Dht<PIN, DELAY>
where
    PIN: InputPin<Error = E> + OutputPin<Error = E>,
    DELAY: DelayNs,
{
    /// Creates a new reader on the given data pin.
    ///
    /// # Arguments
    ///
    /// * `pin` - The GPIO pin connected to the sensor's data line. Must
    ///   support both input and output.
    /// * `delay` - A delay provider implementing the `DelayNs` trait, used
    ///   only for the coarse handshake holds.
    /// * `config` - Sensor variant, debug flag and clock-scale calibration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configured clock scale is not finite and
    /// strictly positive.
    pub fn new(pin: PIN, delay: DELAY, config: Config) -> Result<Self, ConfigError> {
        let thresholds = CycleThresholds::from_scale(config.clock_scale)?;
        Ok(Dht {
            pin,
            delay,
            kind: config.kind,
            debug: config.debug,
            thresholds,
            timings: [0; NUM_TIMINGS],
            last: None,
            stats: Statistics::default(),
        })
    }

    /// Performs one complete read: trigger, acknowledgement, timing capture,
    /// bit decode, checksum validation and value interpretation.
    ///
    /// On success the reading is retained and stays available through
    /// [`Dht::reading`] until the next success; a failed read leaves the
    /// retained reading untouched. The read counter increments on every
    /// call, the failure counter only on errors.
    ///
    /// Blocks for the duration of the handshake plus the capture window, up
    /// to roughly two seconds when the sensor never responds.
    pub fn read(&mut self) -> Result<Reading, DhtError<E>> {
        self.stats.reads += 1;
        match self.read_frame() {
            Ok(reading) => {
                self.last = Some(reading);
                Ok(reading)
            }
            Err(err) => {
                self.stats.failures += 1;
                Err(err)
            }
        }
    }

    /// The most recent successful reading, if any read has succeeded yet.
    pub fn reading(&self) -> Option<Reading> {
        self.last
    }

    /// Temperature of the most recent successful reading, in degrees Celsius.
    pub fn celsius(&self) -> Option<f32> {
        self.last.map(|r| r.temperature)
    }

    /// Temperature of the most recent successful reading, in degrees
    /// Fahrenheit.
    pub fn fahrenheit(&self) -> Option<f32> {
        self.last.map(|r| r.fahrenheit())
    }

    /// Relative humidity of the most recent successful reading, in percent.
    pub fn humidity(&self) -> Option<f32> {
        self.last.map(|r| r.humidity)
    }

    /// Counters accumulated since construction.
    pub fn statistics(&self) -> Statistics {
        self.stats
    }

    /// Percentage of reads that failed, or `None` before the first read.
    pub fn failure_rate(&self) -> Option<f32> {
        self.stats.failure_rate()
    }

    fn read_frame(&mut self) -> Result<Reading, DhtError<E>> {
        self.timings = [0; NUM_TIMINGS];

        self.trigger()?;
        self.await_ack()?;
        self.capture_timings()?;
        if self.debug {
            self.report_timings();
        }

        let frame = Frame::from_timings(&self.timings, self.thresholds.low_high_cutoff);
        if self.debug {
            let [b0, b1, b2, b3, check_byte] = frame.0;
            log::debug!(
                "data: {b0:#04x} {b1:#04x} {b2:#04x} {b3:#04x}: check byte {check_byte:#04x} | checksum {:#04x}",
                b0.wrapping_add(b1).wrapping_add(b2).wrapping_add(b3)
            );
        }

        frame.verify_checksum()?;
        frame.interpret(self.kind)
    }

    /// Triggers a transmission: hold the line high to let the sensor settle,
    /// pull it low to request data, then release it so the sensor can drive
    /// the line.
    fn trigger(&mut self) -> Result<(), DhtError<E>> {
        self.pin.set_high()?;
        self.delay.delay_ms(SETTLE_HIGH_MS);
        self.pin.set_low()?;
        self.delay.delay_ms(TRIGGER_LOW_MS);
        self.pin.set_high()?;
        Ok(())
    }

    /// Waits for the sensor's acknowledgement.
    ///
    /// After release the sensor holds the line high until it is ready, then
    /// pulls it low. One high pulse follows before the first bit; both of
    /// its halves are protocol framing and are discarded.
    fn await_ack(&mut self) -> Result<(), DhtError<E>> {
        let mut polls: u32 = 0;
        while self.pin.is_high()? {
            polls += 1;
            if polls >= ACK_POLL_BUDGET {
                return Err(DhtError::AckTimeout);
            }
            self.delay.delay_us(1);
        }

        let _ = self.wait_for_level(true, DhtError::AckTimeout)?;
        let _ = self.wait_for_level(false, DhtError::AckTimeout)?;
        Ok(())
    }

    /// Records the 80 state durations making up one frame. Even waits time
    /// the low sync half of each bit, odd waits the high data half.
    ///
    /// No delays are issued here: a syscall between edges would lose the
    /// frame, so elapsed time is the busy-wait cycle count itself.
    fn capture_timings(&mut self) -> Result<(), DhtError<E>> {
        for i in 0..NUM_TIMINGS {
            self.timings[i] = self.wait_for_level(i % 2 == 0, DhtError::BitTimeout)?;
        }
        Ok(())
    }

    /// Busy-waits until the line reaches the wanted level, returning the
    /// number of polls that elapsed first. Gives up with `on_timeout` once
    /// the scaled cycle bound is reached.
    fn wait_for_level(
        &mut self,
        high: bool,
        on_timeout: DhtError<E>,
    ) -> Result<u32, DhtError<E>> {
        let mut cycles: u32 = 0;
        while self.pin.is_high()? != high {
            cycles += 1;
            if cycles >= self.thresholds.timeout_cycles {
                return Err(on_timeout);
            }
        }
        Ok(cycles)
    }

    /// Dumps every captured timing together with its deviation from the
    /// nominal sync delay, for recalibrating the clock scale on a new host.
    fn report_timings(&self) {
        for (i, &cycles) in self.timings.iter().enumerate() {
            let byte_boundary = i != 0 && i % 16 == 0;
            if byte_boundary {
                log::debug!("===");
            }
            if i % 2 == 0 {
                let expected = if byte_boundary {
                    self.thresholds.byte_sync
                } else {
                    self.thresholds.bit_sync
                };
                log::debug!("sync: {}: {}", cycles, i64::from(cycles) - i64::from(expected));
            } else {
                log::debug!(
                    "bit : {} ----> {}",
                    cycles,
                    cycles > self.thresholds.low_high_cutoff
                );
            }
        }
    }
}
