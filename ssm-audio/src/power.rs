//! Bias level sequencing.
//!
//! ```text
//! Off <-> Standby <-> Prepare <-> On
//! ```
//!
//! Only adjacent levels are connected. A request that spans several levels is
//! walked one step at a time, each step fully applied before the next. If a
//! step fails the machine stays at the last level it reached; hardware that
//! was already changed is not rolled back.

use crate::bus::RegisterBus;
use crate::error::{Error, Result};
use crate::regmap::RegisterCache;

// ── States ──────────────────────────────────────────────────────────────────

/// Coarse power level of a chip, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PowerState {
    /// Everything powered down. Register defaults are only valid here.
    Off = 0,
    /// Regulators and clocks up, no stream.
    Standby = 1,
    /// About to stream.
    Prepare = 2,
    /// Streaming.
    On = 3,
}

impl PowerState {
    /// Human-readable name for logs.
    pub const fn name(self) -> &'static str {
        match self {
            PowerState::Off => "off",
            PowerState::Standby => "standby",
            PowerState::Prepare => "prepare",
            PowerState::On => "on",
        }
    }

    /// The adjacent level one step toward `target`, or `None` when already there.
    pub fn step_toward(self, target: PowerState) -> Option<PowerState> {
        let here = self as u8;
        let next = match here.cmp(&(target as u8)) {
            core::cmp::Ordering::Less => here + 1,
            core::cmp::Ordering::Greater => here - 1,
            core::cmp::Ordering::Equal => return None,
        };
        PowerState::try_from(next).ok()
    }

    /// The `(from, to)` adjacent steps leading from `self` to `target`.
    pub fn path_to(self, target: PowerState) -> PowerPath {
        PowerPath {
            current: self,
            target,
        }
    }
}

impl TryFrom<u8> for PowerState {
    type Error = Error;

    fn try_from(level: u8) -> Result<Self> {
        match level {
            0 => Ok(PowerState::Off),
            1 => Ok(PowerState::Standby),
            2 => Ok(PowerState::Prepare),
            3 => Ok(PowerState::On),
            _ => Err(Error::InvalidState),
        }
    }
}

/// Iterator over the adjacent steps between two levels.
#[derive(Debug, Clone)]
pub struct PowerPath {
    current: PowerState,
    target: PowerState,
}

impl Iterator for PowerPath {
    type Item = (PowerState, PowerState);

    fn next(&mut self) -> Option<Self::Item> {
        let from = self.current;
        let to = from.step_toward(self.target)?;
        self.current = to;
        Some((from, to))
    }
}

// ── Errors ──────────────────────────────────────────────────────────────────

/// A transition that stopped part-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("power transition stopped at {reached:?}: {error}")]
pub struct TransitionError<E> {
    /// Last level fully applied.
    pub reached: PowerState,
    /// What stopped the walk.
    pub error: Error<E>,
}

// ── Machine ─────────────────────────────────────────────────────────────────

/// Tracks the active level of one chip and walks requested transitions.
#[derive(Debug, Clone)]
pub struct PowerStateMachine {
    state: PowerState,
}

impl Default for PowerStateMachine {
    fn default() -> Self {
        Self::new(PowerState::Off)
    }
}

impl PowerStateMachine {
    pub const fn new(initial: PowerState) -> Self {
        Self { state: initial }
    }

    /// Currently active level.
    pub fn state(&self) -> PowerState {
        self.state
    }

    /// Walk to `target`, calling `step(from, to)` for every adjacent step.
    ///
    /// A failing step stops the walk and reports the level reached so far.
    pub fn transition<E, F>(
        &mut self,
        target: PowerState,
        mut step: F,
    ) -> core::result::Result<PowerState, TransitionError<E>>
    where
        F: FnMut(PowerState, PowerState) -> Result<(), E>,
    {
        for (from, to) in self.state.path_to(target) {
            debug!("bias: {} -> {}", from.name(), to.name());
            step(from, to).map_err(|error| {
                warn!("bias: stopped at {}", from.name());
                TransitionError {
                    reached: self.state,
                    error,
                }
            })?;
            self.state = to;
        }
        Ok(self.state)
    }

    /// [`transition`](Self::transition) for a raw host level. An unknown level
    /// fails with [`Error::InvalidState`] before anything is applied.
    pub fn transition_raw<E, F>(
        &mut self,
        level: u8,
        step: F,
    ) -> core::result::Result<PowerState, TransitionError<E>>
    where
        F: FnMut(PowerState, PowerState) -> Result<(), E>,
    {
        let target = PowerState::try_from(level).map_err(|e| TransitionError {
            reached: self.state,
            error: e.widen(),
        })?;
        self.transition(target, step)
    }

    /// Fail with [`Error::InvalidState`] unless the chip is at `min` or above.
    pub fn require_at_least(&self, min: PowerState) -> Result<()> {
        if self.state >= min {
            Ok(())
        } else {
            Err(Error::InvalidState)
        }
    }

    /// Fail with [`Error::InvalidState`] unless the chip is at `max` or below.
    pub fn require_at_most(&self, max: PowerState) -> Result<()> {
        if self.state <= max {
            Ok(())
        } else {
            Err(Error::InvalidState)
        }
    }

    /// Overwrite the tracked level after the hardware changed it on its own
    /// (soft reset).
    pub fn force(&mut self, state: PowerState) {
        self.state = state;
    }
}

// ── Register hooks ──────────────────────────────────────────────────────────

/// Chip-level power-down bit: cleared on `Off -> Standby`, set on any step
/// into `Off`. Other steps touch no registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerDownBit {
    pub address: u16,
    pub mask: u8,
}

impl PowerDownBit {
    pub const fn new(address: u16, mask: u8) -> Self {
        Self { address, mask }
    }

    /// Apply the register side effect of one adjacent step.
    pub fn apply<B: RegisterBus>(
        &self,
        cache: &mut RegisterCache<B>,
        from: PowerState,
        to: PowerState,
    ) -> Result<(), B::Error> {
        match (from, to) {
            (PowerState::Off, PowerState::Standby) => {
                cache.update_bits(self.address, self.mask, 0)?;
            }
            (_, PowerState::Off) => {
                cache.update_bits(self.address, self.mask, self.mask)?;
            }
            _ => {}
        }
        Ok(())
    }
}
