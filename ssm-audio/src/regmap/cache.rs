use heapless::LinearMap;

use crate::bus::RegisterBus;
use crate::constants::CACHE_CAPACITY;
use crate::error::{Error, Result};

use super::{RegisterDescriptor, RegisterMap};

/// Write-through cache in front of a [`RegisterBus`].
///
/// Only readable, non-volatile registers are ever stored. The cache is
/// populated from the map's default table on construction, so a freshly
/// reset chip can be configured without reading it back first.
///
/// All mutating operations take `&mut self`; a read-modify-write through
/// [`update_bits`](Self::update_bits) cannot interleave with another access
/// on the same instance.
pub struct RegisterCache<B> {
    bus: B,
    map: RegisterMap,
    entries: LinearMap<u16, u8, CACHE_CAPACITY>,
    suppress_unchanged: bool,
}

impl<B: RegisterBus> RegisterCache<B> {
    /// Wrap `bus` and pre-populate the cache from `map`'s defaults.
    ///
    /// `map` must be sorted by unique ascending address; debug builds check it.
    pub fn new(bus: B, map: RegisterMap) -> Self {
        debug_assert!(map.validate().is_ok(), "register map is not sorted");
        let mut cache = Self {
            bus,
            map,
            entries: LinearMap::new(),
            suppress_unchanged: true,
        };
        cache.reset_to_defaults();
        cache
    }

    /// The register map this cache serves.
    pub fn map(&self) -> &RegisterMap {
        &self.map
    }

    /// Give the bus back.
    pub fn release(self) -> B {
        self.bus
    }

    #[cfg(test)]
    pub(crate) fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Read a register, from the cache when possible.
    ///
    /// Volatile registers are always read from the bus and never stored.
    /// Reading a write-only register fails with [`Error::InvalidAddress`].
    pub fn read(&mut self, address: u16) -> Result<u8, B::Error> {
        let reg = self.readable(address)?;
        if !reg.volatile {
            if let Some(&value) = self.entries.get(&address) {
                return Ok(value);
            }
        }
        let value = self.bus.bus_read(address).map_err(Error::Transport)?;
        if reg.cacheable() {
            self.store(address, value);
        }
        Ok(value)
    }

    /// Write a register, skipping the bus when the cache already holds
    /// `value` and write suppression is enabled.
    pub fn write(&mut self, address: u16, value: u8) -> Result<(), B::Error> {
        let reg = self.map.lookup(address).map_err(Error::widen)?;
        if self.suppress_unchanged
            && reg.cacheable()
            && self.entries.get(&address) == Some(&value)
        {
            trace!("{}: {:#x} already {:#x}", self.map.name(), address, value);
            return Ok(());
        }
        self.write_through(reg, value)
    }

    /// Write a register unconditionally. The cache is still updated.
    pub fn force_write(&mut self, address: u16, value: u8) -> Result<(), B::Error> {
        let reg = self.map.lookup(address).map_err(Error::widen)?;
        self.write_through(reg, value)
    }

    /// Read-modify-write: the new value is `(old & !mask) | (value & mask)`.
    ///
    /// Returns whether a bus write was issued. With suppression enabled an
    /// unchanged result writes nothing.
    pub fn update_bits(&mut self, address: u16, mask: u8, value: u8) -> Result<bool, B::Error> {
        let reg = self.readable(address)?;
        let old = self.read(address)?;
        let new = (old & !mask) | (value & mask);
        if self.suppress_unchanged && new == old {
            return Ok(false);
        }
        self.write_through(reg, new)?;
        Ok(true)
    }

    /// Replace every cached value with the register defaults. No bus I/O.
    ///
    /// Call this after the hardware has confirmed a soft reset.
    pub fn reset_to_defaults(&mut self) {
        self.entries.clear();
        let map = self.map;
        for (address, value) in map.defaults() {
            self.store(address, value);
        }
    }

    /// Drop every cached value; the next read of each register goes to the bus.
    pub fn invalidate(&mut self) {
        self.entries.clear();
    }

    /// Write back every cached value that differs from its default.
    ///
    /// Used to restore configuration after the chip lost power. Returns the
    /// number of bus writes issued.
    pub fn sync(&mut self) -> Result<usize, B::Error> {
        let mut written = 0;
        for (&address, &value) in self.entries.iter() {
            let default = self.map.descriptor(address).map(|r| r.default_value);
            if default != Some(value) {
                self.bus
                    .bus_write(address, value)
                    .map_err(Error::Transport)?;
                written += 1;
            }
        }
        debug!("{}: synced {} registers", self.map.name(), written);
        Ok(written)
    }

    /// Peek at the cached value without bus I/O.
    pub fn cached(&self, address: u16) -> Option<u8> {
        self.entries.get(&address).copied()
    }

    /// Enable or disable write-if-changed suppression.
    pub fn set_write_suppression(&mut self, enabled: bool) {
        self.suppress_unchanged = enabled;
    }

    /// Whether write-if-changed suppression is enabled.
    pub fn write_suppression(&self) -> bool {
        self.suppress_unchanged
    }

    fn readable(&self, address: u16) -> Result<&'static RegisterDescriptor, B::Error> {
        match self.map.lookup(address) {
            Ok(reg) if reg.readable => Ok(reg),
            _ => Err(Error::InvalidAddress(address)),
        }
    }

    fn write_through(&mut self, reg: &RegisterDescriptor, value: u8) -> Result<(), B::Error> {
        trace!("{}: write {:#x} = {:#x}", self.map.name(), reg.address, value);
        self.bus
            .bus_write(reg.address, value)
            .map_err(Error::Transport)?;
        if reg.cacheable() {
            self.store(reg.address, value);
        }
        Ok(())
    }

    fn store(&mut self, address: u16, value: u8) {
        if self.entries.insert(address, value).is_err() {
            warn!("{}: cache full, {:#x} not cached", self.map.name(), address);
        }
    }
}
