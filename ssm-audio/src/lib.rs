//! # ssm-audio
//!
//! A `no_std`, allocation-free control-plane library for the Analog Devices
//! SSM4567 and SSM4329 class-D audio amplifiers. It keeps a write-through
//! register cache in front of an `embedded-hal` bus, solves fractional-N PLL
//! coefficients, sequences the chips through their power levels and
//! negotiates serial audio formats.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Transport | [`bus`] | `RegisterBus` over I2C or ADI-framed SPI |
//! | Registers | [`regmap`] | Static register maps and the write-through cache |
//! | Clocking | [`pll`] | Integer/fractional PLL coefficient solver |
//! | Power | [`power`] | Off → Standby → Prepare → On sequencing |
//! | Format | [`format`] | DAI format, TDM slot and stream parameter checks |
//! | Trait | [`control`] | `CodecControl` callbacks for an audio framework |
//! | Sharing | [`shared`] | Per-instance blocking lock |
//! | Chips | [`codec`] | SSM4567 and SSM4329 drivers (feature-gated) |
//!
//! ## Quick start
//!
//! ```ignore
//! use ssm_audio::codec::Ssm4567;
//! use ssm_audio::control::CodecControl;
//! use ssm_audio::format::{HwParams, Protocol, RawFormatRequest, SampleFormat, StreamDirection};
//! use ssm_audio::power::PowerState;
//!
//! let mut amp = Ssm4567::new_i2c(i2c, 0x34);
//! amp.probe()?;
//! amp.set_fmt(RawFormatRequest::slave(Protocol::Tdm))?;
//! amp.set_tdm_slot(0b0010, 0, 8, 32)?;
//! amp.hw_params(&HwParams { rate: 48_000, format: SampleFormat::S16Le, channels: 2 })?;
//! amp.set_bias_level(PowerState::On)?;
//! amp.mute(StreamDirection::Playback, false)?;
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `ssm4567` | yes | SSM4567 driver |
//! | `ssm4329` | yes | SSM4329 driver |
//! | `defmt` | no | Log through `defmt`, derive `defmt::Format` |
//! | `log` | no | Log through the `log` facade |
//!
//! ## Hardware limits
//!
//! - **PLL input:** 8 kHz to 27 MHz ([`constants::PLL_FREQ_IN_MIN`],
//!   [`constants::PLL_FREQ_IN_MAX`])
//! - **PLL dividers:** pre-divider 1..=7, R ≤ 0x3FFF, N and M ≤ 0xFFFF
//! - **Cache:** [`constants::CACHE_CAPACITY`] registers per instance

#![no_std]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

#[cfg(test)]
extern crate std;

// Must come first so the logging macros are visible to every module.
#[macro_use]
mod fmt;

#[cfg(test)]
mod mock;

pub mod constants;
pub mod error;
pub mod bus;
pub mod regmap;
pub mod pll;
pub mod power;
pub mod format;
pub mod control;
pub mod shared;

#[cfg(any(feature = "ssm4567", feature = "ssm4329"))]
pub mod codec;

pub use error::{Error, Result};
