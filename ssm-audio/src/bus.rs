//! Register bus transport.
//!
//! Everything above this module speaks in `(register address, byte)` pairs
//! through [`RegisterBus`]. The two provided transports frame those pairs for
//! an [`embedded_hal::i2c::I2c`] bus or an [`embedded_hal::spi::SpiDevice`].
//! Sharing one physical bus between several chips is left to
//! `embedded-hal-bus` style device wrappers.

use embedded_hal::i2c::I2c;
use embedded_hal::spi::{Operation, SpiDevice};

/// Byte-wide register access over some transport.
pub trait RegisterBus {
    /// Transport-level failure.
    type Error: core::fmt::Debug;

    /// Read one register straight from the chip.
    fn bus_read(&mut self, address: u16) -> Result<u8, Self::Error>;

    /// Write one register straight to the chip.
    fn bus_write(&mut self, address: u16, value: u8) -> Result<(), Self::Error>;
}

impl<B: RegisterBus + ?Sized> RegisterBus for &mut B {
    type Error = B::Error;

    fn bus_read(&mut self, address: u16) -> Result<u8, Self::Error> {
        (**self).bus_read(address)
    }

    fn bus_write(&mut self, address: u16, value: u8) -> Result<(), Self::Error> {
        (**self).bus_write(address, value)
    }
}

/// Width of the register address sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressWidth {
    /// One address byte (SSM4567).
    Eight,
    /// Two address bytes, MSB first (SSM4329).
    Sixteen,
}

impl AddressWidth {
    /// Encode `address` big-endian; returns the buffer and the used length.
    fn encode(self, address: u16) -> ([u8; 2], usize) {
        let [hi, lo] = address.to_be_bytes();
        match self {
            AddressWidth::Eight => ([lo, 0], 1),
            AddressWidth::Sixteen => ([hi, lo], 2),
        }
    }
}

// ── I2C ────────────────────────────────────────────────────────────────────

/// Register access over I2C.
///
/// Reads are a single `write_read` of the address followed by exactly one
/// data byte; the chips do not auto-increment reliably.
pub struct I2cBus<I2C> {
    i2c: I2C,
    device: u8,
    width: AddressWidth,
}

impl<I2C: I2c> I2cBus<I2C> {
    /// Wrap an I2C bus talking to the chip at 7-bit address `device`.
    pub fn new(i2c: I2C, device: u8, width: AddressWidth) -> Self {
        Self { i2c, device, width }
    }

    /// 7-bit device address in use.
    pub fn device(&self) -> u8 {
        self.device
    }

    /// Give the I2C bus back.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c> RegisterBus for I2cBus<I2C> {
    type Error = I2C::Error;

    fn bus_read(&mut self, address: u16) -> Result<u8, Self::Error> {
        let (addr, len) = self.width.encode(address);
        let mut value = [0u8; 1];
        self.i2c.write_read(self.device, &addr[..len], &mut value)?;
        Ok(value[0])
    }

    fn bus_write(&mut self, address: u16, value: u8) -> Result<(), Self::Error> {
        let (addr, len) = self.width.encode(address);
        let mut frame = [0u8; 3];
        frame[..len].copy_from_slice(&addr[..len]);
        frame[len] = value;
        self.i2c.write(self.device, &frame[..=len])
    }
}

// ── SPI ────────────────────────────────────────────────────────────────────

/// Register access over SPI using the ADI control-port frame:
/// `[chip_address << 1 | R/W, address MSB, address LSB, data]`.
pub struct SpiBus<SPI> {
    spi: SPI,
    chip_address: u8,
}

impl<SPI: SpiDevice> SpiBus<SPI> {
    /// R/W flag in the first frame byte.
    const READ: u8 = 0x01;

    /// Wrap an SPI device. `chip_address` is the 7-bit control-port address
    /// (zero unless the part is strapped otherwise).
    pub fn new(spi: SPI, chip_address: u8) -> Self {
        Self {
            spi,
            chip_address: chip_address & 0x7F,
        }
    }

    /// Give the SPI device back.
    pub fn release(self) -> SPI {
        self.spi
    }

    fn header(&self, address: u16, read: bool) -> [u8; 3] {
        let [hi, lo] = address.to_be_bytes();
        let rw = if read { Self::READ } else { 0 };
        [(self.chip_address << 1) | rw, hi, lo]
    }
}

impl<SPI: SpiDevice> RegisterBus for SpiBus<SPI> {
    type Error = SPI::Error;

    fn bus_read(&mut self, address: u16) -> Result<u8, Self::Error> {
        let header = self.header(address, true);
        let mut value = [0u8; 1];
        self.spi.transaction(&mut [
            Operation::Write(&header),
            Operation::Read(&mut value),
        ])?;
        Ok(value[0])
    }

    fn bus_write(&mut self, address: u16, value: u8) -> Result<(), Self::Error> {
        let [b0, hi, lo] = self.header(address, false);
        self.spi.write(&[b0, hi, lo, value])
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};
    use std::vec;

    #[test]
    fn i2c_eight_bit_framing() {
        let expectations = [
            I2cTransaction::write(0x34, vec![0x05, 0x02]),
            I2cTransaction::write_read(0x34, vec![0x10], vec![0xA5]),
        ];
        let mut bus = I2cBus::new(I2cMock::new(&expectations), 0x34, AddressWidth::Eight);
        bus.bus_write(0x05, 0x02).unwrap();
        assert_eq!(bus.bus_read(0x10).unwrap(), 0xA5);
        bus.release().done();
    }

    #[test]
    fn i2c_sixteen_bit_framing() {
        let expectations = [
            I2cTransaction::write(0x29, vec![0x40, 0x09, 0x02]),
            I2cTransaction::write_read(0x29, vec![0x40, 0x00], vec![0x41]),
        ];
        let mut bus = I2cBus::new(I2cMock::new(&expectations), 0x29, AddressWidth::Sixteen);
        bus.bus_write(0x4009, 0x02).unwrap();
        assert_eq!(bus.bus_read(0x4000).unwrap(), 0x41);
        bus.release().done();
    }

    #[test]
    fn i2c_error_is_passed_through() {
        let expectations = [I2cTransaction::write(0x34, vec![0x00, 0x01])
            .with_error(embedded_hal::i2c::ErrorKind::Other)];
        let mut bus = I2cBus::new(I2cMock::new(&expectations), 0x34, AddressWidth::Eight);
        assert_eq!(
            bus.bus_write(0x00, 0x01),
            Err(embedded_hal::i2c::ErrorKind::Other)
        );
        bus.release().done();
    }

    #[test]
    fn spi_control_frame() {
        let expectations = [
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![0x00, 0x40, 0x2D, 0x62]),
            SpiTransaction::transaction_end(),
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![0x01, 0x40, 0x5A]),
            SpiTransaction::read_vec(vec![0x03]),
            SpiTransaction::transaction_end(),
        ];
        let mut bus = SpiBus::new(SpiMock::new(&expectations), 0);
        bus.bus_write(0x402D, 0x62).unwrap();
        assert_eq!(bus.bus_read(0x405A).unwrap(), 0x03);
        bus.release().done();
    }

    #[test]
    fn borrowed_bus_forwards() {
        let expectations = [I2cTransaction::write(0x34, vec![0x03, 0x40])];
        fn poke<B: RegisterBus>(mut bus: B) {
            bus.bus_write(0x03, 0x40).unwrap();
        }
        let mut bus = I2cBus::new(I2cMock::new(&expectations), 0x34, AddressWidth::Eight);
        poke(&mut bus);
        bus.release().done();
    }
}
