//! Static register descriptions and the runtime register cache.
//!
//! A chip variant is described once by a sorted table of
//! [`RegisterDescriptor`]s. [`RegisterCache`] serves reads of readable,
//! non-volatile registers from memory and suppresses writes that would not
//! change them.

mod cache;

pub use cache::RegisterCache;

use crate::error::{Error, Result};

/// One addressable 8-bit register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterDescriptor {
    /// Register address.
    pub address: u16,
    /// Value after power-on or soft reset.
    pub default_value: u8,
    /// Whether the register can be read back over the bus.
    pub readable: bool,
    /// Whether hardware may change the value behind the driver's back.
    pub volatile: bool,
}

impl RegisterDescriptor {
    /// Ordinary read/write configuration register.
    pub const fn new(address: u16, default_value: u8) -> Self {
        Self {
            address,
            default_value,
            readable: true,
            volatile: false,
        }
    }

    /// Status register: always read live.
    pub const fn volatile(address: u16) -> Self {
        Self {
            address,
            default_value: 0,
            readable: true,
            volatile: true,
        }
    }

    /// Self-clearing trigger (soft reset and friends): write-only, never cached.
    pub const fn trigger(address: u16) -> Self {
        Self {
            address,
            default_value: 0,
            readable: false,
            volatile: true,
        }
    }

    /// Whether values of this register may live in the cache.
    pub const fn cacheable(&self) -> bool {
        self.readable && !self.volatile
    }
}

/// A chip's register space.
///
/// `registers` must be sorted by strictly ascending address; [`validate`]
/// checks this and every chip map is validated by its own tests.
///
/// [`validate`]: RegisterMap::validate
#[derive(Debug, Clone, Copy)]
pub struct RegisterMap {
    name: &'static str,
    registers: &'static [RegisterDescriptor],
}

impl RegisterMap {
    /// Describe a chip.
    pub const fn new(name: &'static str, registers: &'static [RegisterDescriptor]) -> Self {
        Self { name, registers }
    }

    /// Chip name, for log messages.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// All descriptors, in address order.
    pub fn registers(&self) -> &'static [RegisterDescriptor] {
        self.registers
    }

    /// Number of registers in the map.
    pub fn len(&self) -> usize {
        self.registers.len()
    }

    /// True for an empty map.
    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    /// Look up one register.
    pub fn descriptor(&self, address: u16) -> Option<&'static RegisterDescriptor> {
        self.registers
            .binary_search_by_key(&address, |r| r.address)
            .ok()
            .and_then(|i| self.registers.get(i))
    }

    /// Look up one register or fail with [`Error::InvalidAddress`].
    pub fn lookup(&self, address: u16) -> Result<&'static RegisterDescriptor> {
        self.descriptor(address)
            .ok_or(Error::InvalidAddress(address))
    }

    /// Whether `address` exists and can be read back.
    pub fn is_readable(&self, address: u16) -> bool {
        self.descriptor(address).is_some_and(|r| r.readable)
    }

    /// Whether `address` exists and must always be accessed live.
    pub fn is_volatile(&self, address: u16) -> bool {
        self.descriptor(address).is_some_and(|r| r.volatile)
    }

    /// `(address, default)` of every cacheable register.
    pub fn defaults(&self) -> impl Iterator<Item = (u16, u8)> + '_ {
        self.registers
            .iter()
            .filter(|r| r.cacheable())
            .map(|r| (r.address, r.default_value))
    }

    /// Check addresses are unique and ascending. Reports the first offender.
    pub fn validate(&self) -> Result<()> {
        for pair in self.registers.windows(2) {
            if let [a, b] = pair {
                if b.address <= a.address {
                    return Err(Error::InvalidAddress(b.address));
                }
            }
        }
        Ok(())
    }
}
