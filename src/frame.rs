use crate::config::SensorKind;
use crate::error::DhtError;

/// Number of state durations in one frame: 5 bytes x 8 bits x 2 transitions
/// per bit. Even indices time the low sync half of a bit, odd indices the
/// high data half.
pub(crate) const NUM_TIMINGS: usize = 80;

/// Frame length in bytes: humidity high/low, temperature high/low, checksum.
pub(crate) const FRAME_LEN: usize = 5;

/// Reading returned by the sensor.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    /// Temperature in degrees Celsius.
    pub temperature: f32,
    /// Relative humidity in percent.
    pub humidity: f32,
}

impl Reading {
    /// Temperature converted to degrees Fahrenheit.
    pub fn fahrenheit(&self) -> f32 {
        self.temperature * 9.0 / 5.0 + 32.0
    }
}

/// One 5-byte frame as transmitted by the sensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Frame(pub(crate) [u8; FRAME_LEN]);

impl Frame {
    /// Reconstructs the frame bytes from captured timings.
    ///
    /// A bit is 1 when its data half outlasted the cutoff. Bits arrive most
    /// significant first, so each one shifts into the bottom of its byte.
    pub(crate) fn from_timings(timings: &[u32; NUM_TIMINGS], low_high_cutoff: u32) -> Self {
        let mut bytes = [0u8; FRAME_LEN];
        for (bit_off, pair) in timings.chunks_exact(2).enumerate() {
            let bit = pair[1] > low_high_cutoff;
            let byte_off = bit_off / 8;
            bytes[byte_off] = bytes[byte_off] << 1 | u8::from(bit);
        }
        Frame(bytes)
    }

    /// The final byte must equal the low 8 bits of the sum of the first four.
    pub(crate) fn verify_checksum<E>(&self) -> Result<(), DhtError<E>> {
        let [b0, b1, b2, b3, check_byte] = self.0;
        let checksum = b0.wrapping_add(b1).wrapping_add(b2).wrapping_add(b3);
        if checksum == check_byte {
            Ok(())
        } else {
            Err(DhtError::ChecksumMismatch)
        }
    }

    /// Maps the validated bytes to a reading according to the sensor variant.
    ///
    /// The DHT22/AM2302 encoding is tenths of a unit with the temperature
    /// sign in bit 7 of the high byte; both values must land in [0, 100].
    /// The DHT11 encoding is plain integers with no range constraint beyond
    /// what a byte can hold.
    pub(crate) fn interpret<E>(&self, kind: SensorKind) -> Result<Reading, DhtError<E>> {
        let [hum_hi, hum_lo, temp_hi, temp_lo, _] = self.0;

        if kind == SensorKind::Dht11 {
            return Ok(Reading {
                temperature: f32::from(temp_hi),
                humidity: f32::from(hum_hi),
            });
        }

        let humidity = f32::from(u16::from_be_bytes([hum_hi, hum_lo])) / 10.0;
        let is_temp_negative = (temp_hi >> 7) != 0;
        let magnitude = f32::from(u16::from_be_bytes([temp_hi & 0x7F, temp_lo])) / 10.0;
        let temperature = if is_temp_negative {
            -magnitude
        } else {
            magnitude
        };

        if !(0.0..=100.0).contains(&temperature) || !(0.0..=100.0).contains(&humidity) {
            return Err(DhtError::OutOfRange);
        }

        Ok(Reading {
            temperature,
            humidity,
        })
    }
}
