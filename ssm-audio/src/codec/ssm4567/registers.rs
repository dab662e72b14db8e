//! SSM4567 register addresses, bitfields and reset defaults.
//!
//! 8-bit register addresses, 8-bit values. The control port is I2C.

use crate::regmap::{RegisterDescriptor, RegisterMap};

// ── I2C addresses ──────────────────────────────────────────────────────────

/// I2C address with ADDR tied low.
pub const I2C_ADDR: u8 = 0x34;

// ── Power ──────────────────────────────────────────────────────────────────

/// Power control.
/// - Bit 7: APWDN_EN (auto power-down on missing clocks)
/// - Bit 6: BSNS_PWDN
/// - Bit 5: VSNS_PWDN
/// - Bit 4: ISNS_PWDN
/// - Bit 3: BOOST_PWDN
/// - Bit 2: AMP_PWDN
/// - Bit 1: VBAT_ONLY
/// - Bit 0: SPWDN (chip power-down)
pub const POWER: u16 = 0x00;
pub const POWER_APWDN_EN: u8 = 1 << 7;
pub const POWER_SPWDN: u8 = 1 << 0;

/// Sense amplifier control.
pub const SENSE_AMP: u16 = 0x01;

// ── DAC ────────────────────────────────────────────────────────────────────

/// DAC control.
/// - Bit 7: DAC_HV
/// - Bit 6: DAC_MUTE
/// - Bit 5: DAC_HPF (high-pass filter enable)
/// - Bit 4: DAC_LPM (low-power mode)
/// - Bits 2:0: DAC_FS (sample rate family)
pub const DAC: u16 = 0x02;
pub const DAC_MUTE: u8 = 1 << 6;
pub const DAC_HPF: u8 = 1 << 5;
pub const DAC_LPM: u8 = 1 << 4;
pub const DAC_FS_MASK: u8 = 0x07;
pub const DAC_FS_8000: u8 = 0x00;
pub const DAC_FS_16000: u8 = 0x01;
pub const DAC_FS_32000: u8 = 0x02;
pub const DAC_FS_64000: u8 = 0x03;
pub const DAC_FS_128000: u8 = 0x04;

/// Master volume: 0x00 = +24 dB, 0xFF = mute, 0.375 dB steps.
pub const VOLUME: u16 = 0x03;

// ── Serial audio interface ─────────────────────────────────────────────────

/// SAI control 1.
/// - Bit 6: BCLK (sample on falling edge)
/// - Bits 5:4: TDM_BCLKS (bit clocks per slot)
/// - Bit 3: FSYNC (inverted frame sync)
/// - Bit 2: LJ (left-justified)
/// - Bit 1: TDM
/// - Bit 0: PDM
pub const SAI_CTRL1: u16 = 0x04;
pub const SAI_CTRL1_BCLK: u8 = 1 << 6;
pub const SAI_CTRL1_TDM_BCLKS_MASK: u8 = 0x3 << 4;
pub const SAI_CTRL1_TDM_BCLKS_32: u8 = 0x0 << 4;
pub const SAI_CTRL1_TDM_BCLKS_48: u8 = 0x1 << 4;
pub const SAI_CTRL1_TDM_BCLKS_64: u8 = 0x2 << 4;
pub const SAI_CTRL1_FSYNC: u8 = 1 << 3;
pub const SAI_CTRL1_LJ: u8 = 1 << 2;
pub const SAI_CTRL1_TDM: u8 = 1 << 1;
pub const SAI_CTRL1_PDM: u8 = 1 << 0;
/// Every SAI_CTRL1 bit owned by the format setting.
pub const SAI_CTRL1_FORMAT_MASK: u8 =
    SAI_CTRL1_BCLK | SAI_CTRL1_FSYNC | SAI_CTRL1_LJ | SAI_CTRL1_TDM | SAI_CTRL1_PDM;

/// SAI control 2.
/// - Bits 2:0: TDM_SLOT
pub const SAI_CTRL2: u16 = 0x05;
pub const SAI_CTRL2_TDM_SLOT_MASK: u8 = 0x07;

/// Channel placement, six registers.
pub const fn placement(n: u16) -> u16 {
    0x06 + n
}

// ── Monitoring and protection ──────────────────────────────────────────────

/// Battery voltage reading.
pub const VBAT: u16 = 0x0C;
pub const LIMITER_CTRL1: u16 = 0x0D;
pub const LIMITER_CTRL2: u16 = 0x0E;
pub const LIMITER_CTRL3: u16 = 0x0F;

/// Status 1 (volatile).
pub const STATUS1: u16 = 0x10;
/// Status 2 (volatile).
pub const STATUS2: u16 = 0x11;
/// Fault status (volatile).
pub const FAULT: u16 = 0x12;

pub const PDM_CTRL: u16 = 0x13;
pub const CLOCK_CTRL: u16 = 0x14;
pub const BOOST_CTRL1: u16 = 0x15;
pub const BOOST_CTRL2: u16 = 0x16;

/// Soft reset trigger; write 0x00.
pub const SOFT_RESET: u16 = 0xFF;

// ── Map ────────────────────────────────────────────────────────────────────

const REGISTERS: [RegisterDescriptor; 24] = [
    RegisterDescriptor::new(POWER, 0x81),
    RegisterDescriptor::new(SENSE_AMP, 0x09),
    RegisterDescriptor::new(DAC, 0x32),
    RegisterDescriptor::new(VOLUME, 0x40),
    RegisterDescriptor::new(SAI_CTRL1, 0x00),
    RegisterDescriptor::new(SAI_CTRL2, 0x08),
    RegisterDescriptor::new(placement(0), 0x01),
    RegisterDescriptor::new(placement(1), 0x20),
    RegisterDescriptor::new(placement(2), 0x32),
    RegisterDescriptor::new(placement(3), 0x07),
    RegisterDescriptor::new(placement(4), 0x07),
    RegisterDescriptor::new(placement(5), 0x07),
    RegisterDescriptor::new(VBAT, 0x00),
    RegisterDescriptor::new(LIMITER_CTRL1, 0xA4),
    RegisterDescriptor::new(LIMITER_CTRL2, 0x73),
    RegisterDescriptor::new(LIMITER_CTRL3, 0x00),
    RegisterDescriptor::volatile(STATUS1),
    RegisterDescriptor::volatile(STATUS2),
    RegisterDescriptor::volatile(FAULT),
    RegisterDescriptor::new(PDM_CTRL, 0x40),
    RegisterDescriptor::new(CLOCK_CTRL, 0x11),
    RegisterDescriptor::new(BOOST_CTRL1, 0x02),
    RegisterDescriptor::new(BOOST_CTRL2, 0x00),
    RegisterDescriptor::trigger(SOFT_RESET),
];

/// SSM4567 register space.
pub const MAP: RegisterMap = RegisterMap::new("ssm4567", &REGISTERS);
