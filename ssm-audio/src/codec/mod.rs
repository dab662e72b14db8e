//! Concrete amplifier drivers.
//!
//! Each chip is a register map, a set of format capabilities and a driver
//! type wiring them to a [`RegisterCache`](crate::regmap::RegisterCache),
//! the [`PowerStateMachine`](crate::power::PowerStateMachine) and the
//! [`FormatNegotiator`](crate::format::FormatNegotiator).
//!
//! # Feature gates
//!
//! | Feature   | Chip    | Control port |
//! |-----------|---------|--------------|
//! | `ssm4567` | SSM4567 | I2C, 8-bit register addresses |
//! | `ssm4329` | SSM4329 | I2C or SPI, 16-bit register addresses |

#[cfg(feature = "ssm4567")]
pub mod ssm4567;

#[cfg(feature = "ssm4329")]
pub mod ssm4329;

#[cfg(feature = "ssm4567")]
pub use ssm4567::Ssm4567;

#[cfg(feature = "ssm4329")]
pub use ssm4329::{SerialPort, Ssm4329, Ssm4329Dai};

#[cfg(all(test, feature = "ssm4567"))]
mod integration_tests;
