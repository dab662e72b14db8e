//! SSM4329 register addresses, bitfields and reset defaults.
//!
//! 16-bit register addresses starting at 0x4000, 8-bit values. Reachable
//! over I2C or the SPI control port.

use crate::regmap::{RegisterDescriptor, RegisterMap};

// ── Identification (volatile) ──────────────────────────────────────────────

pub const VENDOR_ID: u16 = 0x4000;
pub const DEVICE_ID1: u16 = 0x4001;
pub const DEVICE_ID2: u16 = 0x4002;
pub const REVISION: u16 = 0x4003;

// ── Power ──────────────────────────────────────────────────────────────────

pub const ANA_PWR: u16 = 0x4004;
/// Digital block power-down.
/// - Bit 0: DSP
/// - Bit 1: SP1 in, bit 2: SP1 out
/// - Bit 3: SP2 in, bit 4: SP2 out
/// - Bit 5: interpolator
pub const DIG_PWR1: u16 = 0x4005;
pub const DIG_PWR2: u16 = 0x4006;

/// Master power control.
/// - Bit 0: CHIP_PWDN
pub const CHIP_PWR: u16 = 0x4007;
pub const CHIP_PWR_CHIP_PWDN: u8 = 1 << 0;

// ── Clocking ───────────────────────────────────────────────────────────────

/// Clock control.
/// - Bit 4: PLL fractional mode
/// - Bits 3:1: PLL reference select
/// - Bit 0: PLL bypass
pub const CLK_CTRL1: u16 = 0x4008;
pub const CLK_CTRL1_PLL_FRAC: u8 = 1 << 4;
/// PLL input pre-divider.
pub const CLK_CTRL2: u16 = 0x4009;
/// PLL feedback integer R, LSB then MSB.
pub const CLK_CTRL3: u16 = 0x400A;
pub const CLK_CTRL4: u16 = 0x400B;
/// PLL fractional numerator N, LSB then MSB.
pub const CLK_CTRL5: u16 = 0x400C;
pub const CLK_CTRL6: u16 = 0x400D;
/// PLL fractional denominator M, LSB then MSB.
pub const CLK_CTRL7: u16 = 0x400E;
pub const CLK_CTRL8: u16 = 0x400F;
/// PLL update strobe.
/// - Bit 0: PLL_UPDATE
pub const CLK_CTRL9: u16 = 0x4010;
pub const CLK_CTRL9_PLL_UPDATE: u8 = 1 << 0;

// ── Routing ────────────────────────────────────────────────────────────────

pub const ROUTE_SP1_1: u16 = 0x4011;
pub const ROUTE_SP1_2: u16 = 0x4012;
pub const ROUTE_SP2_1: u16 = 0x4013;
pub const ROUTE_SP2_2: u16 = 0x4014;
pub const ROUTE_DAC_INT: u16 = 0x4015;
pub const ROUTE_SRC_IN: u16 = 0x4016;
pub const ROUTE_SRC_OUT: u16 = 0x4017;

// ── Serial ports ───────────────────────────────────────────────────────────

/// Serial port register block base: SP1 at 0x401A, SP2 at 0x4023.
pub const SPT_BASE: [u16; 2] = [0x401A, 0x4023];

/// Offsets within one serial port block.
///
/// CTRL1:
/// - Bits 6:4: DATA_FORMAT (0 = I2S, 1 = LJ, 2/3/4 = delay 8/12/16)
/// - Bits 3:2: SLOT_WIDTH (0 = 32, 1 = 16, 2 = 24)
/// - Bits 1:0: MODE (0 = stereo, 1 = TDM, 2 = mono)
pub const SPT_CTRL1: u16 = 0;
/// CTRL2:
/// - Bit 4: TRI_STATE
pub const SPT_CTRL2: u16 = 1;
/// CLOCKING:
/// - Bit 7: LRCLK_POL
/// - Bits 6:4: LRCLK_SRC
/// - Bit 3: BCLK_POL
/// - Bits 2:0: BCLK_SRC
pub const SPT_CLOCKING: u16 = 2;
/// INPUTS1: bits 3:0 select the slot feeding channel 0.
pub const SPT_INPUTS1: u16 = 3;
pub const SPT_INPUTS2: u16 = 4;
pub const SPT_OUTPUTS1: u16 = 5;
pub const SPT_OUTPUTS2: u16 = 6;
pub const SPT_OUTPUTS3: u16 = 7;
pub const SPT_OUTPUTS4: u16 = 8;

pub const SPT_CTRL1_DATA_FORMAT_MASK: u8 = 0x7 << 4;
pub const SPT_CTRL1_DATA_FORMAT_I2S: u8 = 0x0 << 4;
pub const SPT_CTRL1_DATA_FORMAT_LJ: u8 = 0x1 << 4;
pub const SPT_CTRL1_DATA_FORMAT_DELAY8: u8 = 0x2 << 4;
pub const SPT_CTRL1_SLOT_WIDTH_MASK: u8 = 0x3 << 2;
pub const SPT_CTRL1_SLOT_WIDTH_32: u8 = 0x0 << 2;
pub const SPT_CTRL1_SLOT_WIDTH_16: u8 = 0x1 << 2;
pub const SPT_CTRL1_SLOT_WIDTH_24: u8 = 0x2 << 2;
pub const SPT_CTRL1_MODE_MASK: u8 = 0x3;
pub const SPT_CTRL1_MODE_STEREO: u8 = 0x0;
pub const SPT_CTRL1_MODE_TDM: u8 = 0x1;
pub const SPT_CTRL1_MODE_MONO: u8 = 0x2;

pub const SPT_CTRL2_TRI_STATE: u8 = 1 << 4;

pub const SPT_CLOCKING_LRCLK_POL: u8 = 1 << 7;
pub const SPT_CLOCKING_BCLK_POL: u8 = 1 << 3;

pub const SPT_INPUTS1_SLOT_MASK: u8 = 0x0F;

/// Address of `offset` within serial port `port` (0 or 1).
pub const fn spt(port: usize, offset: u16) -> u16 {
    SPT_BASE[port] + offset
}

// ── Converters ─────────────────────────────────────────────────────────────

pub const AMP_SNS_CTRL: u16 = 0x402C;
/// DAC control.
/// - Bit 6: DAC_MUTE
/// - Bit 5: DAC_HPF
/// - Bit 4: DAC_LPM
pub const DAC_CTRL: u16 = 0x402D;
pub const DAC_CTRL_MUTE: u8 = 1 << 6;
pub const DAC_CTRL_HPF: u8 = 1 << 5;
pub const DAC_CTRL_LPM: u8 = 1 << 4;
pub const DAC_VOLUME: u16 = 0x402E;
pub const DAC_CLIP: u16 = 0x402F;
/// DAC and interpolator path control.
/// - Bit 0: interpolator mute
pub const DAC_INTERP_CTRL: u16 = 0x4030;
pub const DAC_INTERP_CTRL_INTERP_MUTE: u8 = 1 << 0;
pub const INTERP_VOLUME: u16 = 0x4031;
pub const INTERP_CLIP: u16 = 0x4032;
/// ADC control.
/// - Bit 6: ADC_MUTE
/// - Bit 5: ADC_HPF
/// - Bit 4: ADC_LPM
pub const ADC_CTRL: u16 = 0x4033;
pub const ADC_CTRL_MUTE: u8 = 1 << 6;
pub const ADC_CTRL_HPF: u8 = 1 << 5;
pub const ADC_CTRL_LPM: u8 = 1 << 4;
pub const ADC_VOLUME: u16 = 0x4034;
pub const SRC_CTRL: u16 = 0x4035;

// ── SigmaDSP ───────────────────────────────────────────────────────────────

/// SigmaDSP control, eleven registers.
pub const fn sdsp_ctrl(n: u16) -> u16 {
    0x4036 + n
}

// ── Pins, interrupts, external amplifier ───────────────────────────────────

pub const PIN_FUNC: u16 = 0x4041;
pub const GPIO_OUT_SETTING: u16 = 0x4042;
pub const IRQ1_MASK1: u16 = 0x4043;
pub const IRQ1_MASK2: u16 = 0x4044;
pub const IRQ2_MASK1: u16 = 0x4045;
pub const IRQ2_MASK2: u16 = 0x4046;
pub const IRQ_CLEAR: u16 = 0x4047;
pub const MCLKO_CTRL: u16 = 0x4048;
pub const EAC1: u16 = 0x404A;
pub const EAC2: u16 = 0x404B;
pub const EAC3: u16 = 0x404C;
pub const EAC4: u16 = 0x404D;
pub const EAC_ADDR: u16 = 0x404E;
pub const EAC_WR_DATA: u16 = 0x404F;
pub const EAC_RW_CTRL: u16 = 0x4050;
pub const PAD_CTRL1: u16 = 0x4051;
pub const PAD_CTRL2: u16 = 0x4052;
pub const FAULT_RECOV: u16 = 0x4053;
pub const VBAT_WARN_LEVEL: u16 = 0x4054;
pub const BST_CTRL: u16 = 0x4055;

/// Reset of everything except the control registers.
pub const SOFT_RESET: u16 = 0x4056;
/// Reset of the whole chip.
pub const SOFT_FULL_RESET: u16 = 0x4057;

// ── Status (volatile) ──────────────────────────────────────────────────────

pub const VBAT: u16 = 0x4058;
pub const FAULT_STATUS: u16 = 0x4059;
/// SigmaDSP and PLL lock status.
/// - Bit 0: PLL_LOCK
pub const PLL_SDSP_STATUS: u16 = 0x405A;
pub const PLL_SDSP_STATUS_PLL_LOCK: u8 = 1 << 0;
pub const EAC_STATUS: u16 = 0x405B;
pub const EAC_RD_DATA: u16 = 0x405C;
pub const IRQ1_STATUS1: u16 = 0x405D;
pub const IRQ1_STATUS2: u16 = 0x405E;
pub const IRQ2_STATUS1: u16 = 0x405F;
pub const IRQ2_STATUS2: u16 = 0x4060;
pub const GPIO_IN_READING: u16 = 0x4061;

// ── Map ────────────────────────────────────────────────────────────────────

const fn r(address: u16, default_value: u8) -> RegisterDescriptor {
    RegisterDescriptor::new(address, default_value)
}

const fn v(address: u16) -> RegisterDescriptor {
    RegisterDescriptor::volatile(address)
}

const REGISTERS: [RegisterDescriptor; 95] = [
    v(VENDOR_ID),
    v(DEVICE_ID1),
    v(DEVICE_ID2),
    v(REVISION),
    r(ANA_PWR, 0x04),
    r(DIG_PWR1, 0xF8),
    r(DIG_PWR2, 0x0F),
    r(CHIP_PWR, 0x01),
    r(CLK_CTRL1, 0x01),
    r(CLK_CTRL2, 0x00),
    r(CLK_CTRL3, 0x00),
    r(CLK_CTRL4, 0x08),
    r(CLK_CTRL5, 0x00),
    r(CLK_CTRL6, 0x00),
    r(CLK_CTRL7, 0x00),
    r(CLK_CTRL8, 0x00),
    r(CLK_CTRL9, 0x00),
    r(ROUTE_SP1_1, 0x11),
    r(ROUTE_SP1_2, 0x00),
    r(ROUTE_SP2_1, 0x02),
    r(ROUTE_SP2_2, 0x00),
    r(ROUTE_DAC_INT, 0x00),
    r(ROUTE_SRC_IN, 0x00),
    r(ROUTE_SRC_OUT, 0x00),
    // SP1
    r(spt(0, SPT_CTRL1), 0x00),
    r(spt(0, SPT_CTRL2), 0x00),
    r(spt(0, SPT_CLOCKING), 0x00),
    r(spt(0, SPT_INPUTS1), 0x10),
    r(spt(0, SPT_INPUTS2), 0x32),
    r(spt(0, SPT_OUTPUTS1), 0x00),
    r(spt(0, SPT_OUTPUTS2), 0x01),
    r(spt(0, SPT_OUTPUTS3), 0x02),
    r(spt(0, SPT_OUTPUTS4), 0x03),
    // SP2
    r(spt(1, SPT_CTRL1), 0x00),
    r(spt(1, SPT_CTRL2), 0x00),
    r(spt(1, SPT_CLOCKING), 0x00),
    r(spt(1, SPT_INPUTS1), 0x10),
    r(spt(1, SPT_INPUTS2), 0x32),
    r(spt(1, SPT_OUTPUTS1), 0x00),
    r(spt(1, SPT_OUTPUTS2), 0x01),
    r(spt(1, SPT_OUTPUTS3), 0x02),
    r(spt(1, SPT_OUTPUTS4), 0x03),
    r(AMP_SNS_CTRL, 0x41),
    r(DAC_CTRL, 0x62),
    r(DAC_VOLUME, 0x40),
    r(DAC_CLIP, 0xFF),
    r(DAC_INTERP_CTRL, 0x00),
    r(INTERP_VOLUME, 0x40),
    r(INTERP_CLIP, 0xFF),
    r(ADC_CTRL, 0x04),
    r(ADC_VOLUME, 0x40),
    r(SRC_CTRL, 0x00),
    r(sdsp_ctrl(0), 0x00),
    r(sdsp_ctrl(1), 0x00),
    r(sdsp_ctrl(2), 0x00),
    r(sdsp_ctrl(3), 0x00),
    r(sdsp_ctrl(4), 0x00),
    r(sdsp_ctrl(5), 0x00),
    r(sdsp_ctrl(6), 0x00),
    r(sdsp_ctrl(7), 0x07),
    r(sdsp_ctrl(8), 0xF4),
    r(sdsp_ctrl(9), 0x08),
    r(sdsp_ctrl(10), 0x00),
    r(PIN_FUNC, 0x00),
    r(GPIO_OUT_SETTING, 0x00),
    r(IRQ1_MASK1, 0x7F),
    r(IRQ1_MASK2, 0x08),
    r(IRQ2_MASK1, 0x7F),
    r(IRQ2_MASK2, 0x08),
    r(IRQ_CLEAR, 0x00),
    r(MCLKO_CTRL, 0x00),
    r(EAC1, 0x00),
    r(EAC2, 0x81),
    r(EAC3, 0x09),
    r(EAC4, 0x32),
    r(EAC_ADDR, 0x00),
    r(EAC_WR_DATA, 0x00),
    r(EAC_RW_CTRL, 0x00),
    r(PAD_CTRL1, 0x00),
    r(PAD_CTRL2, 0x00),
    r(FAULT_RECOV, 0x00),
    r(VBAT_WARN_LEVEL, 0x00),
    r(BST_CTRL, 0x50),
    RegisterDescriptor::trigger(SOFT_RESET),
    RegisterDescriptor::trigger(SOFT_FULL_RESET),
    v(VBAT),
    v(FAULT_STATUS),
    v(PLL_SDSP_STATUS),
    v(EAC_STATUS),
    v(EAC_RD_DATA),
    v(IRQ1_STATUS1),
    v(IRQ1_STATUS2),
    v(IRQ2_STATUS1),
    v(IRQ2_STATUS2),
    v(GPIO_IN_READING),
];

/// SSM4329 register space.
pub const MAP: RegisterMap = RegisterMap::new("ssm4329", &REGISTERS);
