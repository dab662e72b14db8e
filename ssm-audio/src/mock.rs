//! Recording register bus for unit tests.

use std::collections::BTreeMap;
use std::vec::Vec;

use crate::bus::RegisterBus;

/// Failure injected by [`MockBus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

/// Register file behind a fake bus. Unwritten registers read as zero.
#[derive(Default)]
pub struct MockBus {
    pub regs: BTreeMap<u16, u8>,
    pub reads: Vec<u16>,
    pub writes: Vec<(u16, u8)>,
    /// Number of further reads that succeed before every read fails.
    pub reads_before_failure: Option<usize>,
    /// Number of further writes that succeed before every write fails.
    pub writes_before_failure: Option<usize>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bus whose registers hold the given values.
    pub fn with_regs(regs: &[(u16, u8)]) -> Self {
        let mut bus = Self::new();
        bus.regs.extend(regs.iter().copied());
        bus
    }

    pub fn reg(&self, address: u16) -> u8 {
        self.regs.get(&address).copied().unwrap_or(0)
    }

    /// Writes to one register, in order.
    pub fn writes_to(&self, address: u16) -> Vec<u8> {
        self.writes
            .iter()
            .filter(|(a, _)| *a == address)
            .map(|(_, v)| *v)
            .collect()
    }

    pub fn clear_log(&mut self) {
        self.reads.clear();
        self.writes.clear();
    }
}

impl RegisterBus for MockBus {
    type Error = MockError;

    fn bus_read(&mut self, address: u16) -> Result<u8, MockError> {
        match self.reads_before_failure {
            Some(0) => return Err(MockError),
            Some(ref mut n) => *n -= 1,
            None => {}
        }
        self.reads.push(address);
        Ok(self.reg(address))
    }

    fn bus_write(&mut self, address: u16, value: u8) -> Result<(), MockError> {
        match self.writes_before_failure {
            Some(0) => return Err(MockError),
            Some(ref mut n) => *n -= 1,
            None => {}
        }
        self.writes.push((address, value));
        self.regs.insert(address, value);
        Ok(())
    }
}
