//! DHT Sensor Reader for Embedded Rust
//!
//! This crate provides a platform-agnostic driver for the DHT11, DHT22 and
//! AM2302 temperature/humidity sensors, built on top of the [`embedded-hal`]
//! traits. The single-wire frame is reconstructed purely from measured
//! timings: the duration of every electrical state is counted in busy-wait
//! poll cycles, so no OS timer is touched inside the timing-critical window.
//! A clock-scale multiplier calibrates the cycle thresholds to the host's
//! execution speed.
//!
//! # Features
//! - Blocking synchronous API using `embedded-hal` traits
//! - Designed for `no_std` environments
//! - Per-reader success/failure statistics
//! - Timing diagnostics through the [`log`] facade for clock-scale
//!   calibration
//! - Optional logging support via `defmt`
//!
//! # Dependencies
//! This driver depends on the following `embedded-hal` traits:
//! - [`InputPin`] and [`OutputPin`] for GPIO access
//! - [`DelayNs`] for the coarse handshake holds
//!
//! # Optional Features
//! - `defmt`: Implements `defmt::Format` for logging support
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal
//! [`log`]: https://docs.rs/log
//! [`InputPin`]: embedded_hal::digital::InputPin
//! [`OutputPin`]: embedded_hal::digital::OutputPin
//! [`DelayNs`]: embedded_hal::delay::DelayNs

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod dht;
pub mod error;
mod frame;

pub use config::{Config, ConfigError, SensorKind, UnknownSensorKind};
pub use dht::{Dht, Statistics};
pub use error::DhtError;
pub use frame::Reading;
