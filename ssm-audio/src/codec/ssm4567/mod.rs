//! SSM4567 mono class-D amplifier.
//!
//! Single playback serial port (I2S, left-justified, TDM or PDM), no PLL.
//! The chip is always the clock slave.
//!
//! # Example
//!
//! ```ignore
//! let mut amp = Ssm4567::new_i2c(i2c, registers::I2C_ADDR);
//! amp.probe()?;
//! amp.set_fmt(RawFormatRequest::slave(Protocol::Tdm))?;
//! amp.set_tdm_slot(0b0100, 0, 8, 32)?;
//! amp.hw_params(&HwParams { rate: 48_000, format: SampleFormat::S24Le, channels: 1 })?;
//! amp.set_bias_level(PowerState::On)?;
//! ```

pub mod registers;

use embedded_hal::i2c::I2c;

use self::registers as reg;
use crate::bus::{AddressWidth, I2cBus, RegisterBus};
use crate::control::CodecControl;
use crate::error::{Error, Result};
use crate::format::{
    DaiFormat, FormatCaps, FormatNegotiator, HwParams, Protocol, RateBucket, RawFormatRequest,
    SampleFormat, SlotWidth, StreamDirection, TdmSlot,
};
use crate::power::{PowerDownBit, PowerState, PowerStateMachine, TransitionError};
use crate::regmap::RegisterCache;

static CAPS: FormatCaps = FormatCaps {
    protocols: &[
        Protocol::I2s,
        Protocol::LeftJustified,
        Protocol::Tdm,
        Protocol::Pdm,
    ],
    slot_widths: &[SlotWidth::W32, SlotWidth::W48, SlotWidth::W64],
    default_slot_width: SlotWidth::W32,
    max_slots: 8,
    rates: &[
        RateBucket::new(8_000, 12_000, reg::DAC_FS_8000),
        RateBucket::new(16_000, 24_000, reg::DAC_FS_16000),
        RateBucket::new(32_000, 48_000, reg::DAC_FS_32000),
        RateBucket::new(64_000, 96_000, reg::DAC_FS_64000),
        RateBucket::new(128_000, 192_000, reg::DAC_FS_128000),
    ],
    formats: &[SampleFormat::S16Le, SampleFormat::S24Le, SampleFormat::S32Le],
    channels_min: 1,
    channels_max: 2,
};

const POWER_DOWN: PowerDownBit = PowerDownBit::new(reg::POWER, reg::POWER_SPWDN);

/// Snapshot of the volatile status registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    pub status1: u8,
    pub status2: u8,
    pub fault: u8,
}

/// SSM4567 driver.
pub struct Ssm4567<B> {
    regs: RegisterCache<B>,
    power: PowerStateMachine,
    formats: FormatNegotiator,
    format: Option<DaiFormat>,
    slot: Option<TdmSlot>,
}

impl<I2C: I2c> Ssm4567<I2cBus<I2C>> {
    /// Driver on an I2C bus at 7-bit address `address`.
    pub fn new_i2c(i2c: I2C, address: u8) -> Self {
        Self::new(I2cBus::new(i2c, address, AddressWidth::Eight))
    }
}

impl<B: RegisterBus> Ssm4567<B> {
    /// Wrap a register bus. The cache starts from the reset defaults and the
    /// chip is assumed to be off; call [`probe`](Self::probe) before use.
    pub fn new(bus: B) -> Self {
        Self {
            regs: RegisterCache::new(bus, reg::MAP),
            power: PowerStateMachine::new(PowerState::Off),
            formats: FormatNegotiator::new(&CAPS),
            format: None,
            slot: None,
        }
    }

    /// Reset the chip and disable automatic power-down.
    pub fn probe(&mut self) -> Result<(), B::Error> {
        self.soft_reset()?;
        self.regs.update_bits(reg::POWER, reg::POWER_APWDN_EN, 0)?;
        info!("ssm4567: ready");
        Ok(())
    }

    /// Soft-reset the chip. Only permitted while off.
    pub fn soft_reset(&mut self) -> Result<(), B::Error> {
        self.power
            .require_at_most(PowerState::Off)
            .map_err(Error::widen)?;
        self.regs.force_write(reg::SOFT_RESET, 0x00)?;
        self.regs.reset_to_defaults();
        self.power.force(PowerState::Off);
        self.format = None;
        self.slot = None;
        debug!("ssm4567: soft reset");
        Ok(())
    }

    /// Master volume, 0 = mute, 255 = +24 dB.
    pub fn set_volume(&mut self, level: u8) -> Result<(), B::Error> {
        self.regs.write(reg::VOLUME, !level)
    }

    pub fn volume(&mut self) -> Result<u8, B::Error> {
        Ok(!self.regs.read(reg::VOLUME)?)
    }

    pub fn set_high_pass_filter(&mut self, enabled: bool) -> Result<(), B::Error> {
        self.update_flag(reg::DAC, reg::DAC_HPF, enabled)
    }

    pub fn set_low_power(&mut self, enabled: bool) -> Result<(), B::Error> {
        self.update_flag(reg::DAC, reg::DAC_LPM, enabled)
    }

    /// Read the status and fault registers. The chip must be powered.
    pub fn status(&mut self) -> Result<Status, B::Error> {
        self.power
            .require_at_least(PowerState::Standby)
            .map_err(Error::widen)?;
        Ok(Status {
            status1: self.regs.read(reg::STATUS1)?,
            status2: self.regs.read(reg::STATUS2)?,
            fault: self.regs.read(reg::FAULT)?,
        })
    }

    /// Power the chip down.
    pub fn shutdown(&mut self) -> core::result::Result<(), TransitionError<B::Error>> {
        self.set_bias_level(PowerState::Off).map(|_| ())
    }

    pub fn power_state(&self) -> PowerState {
        self.power.state()
    }

    /// Format applied by the last [`set_fmt`](CodecControl::set_fmt).
    pub fn format(&self) -> Option<DaiFormat> {
        self.format
    }

    pub fn registers(&mut self) -> &mut RegisterCache<B> {
        &mut self.regs
    }

    /// Give the bus back.
    pub fn release(self) -> B {
        self.regs.release()
    }

    fn update_flag(&mut self, address: u16, mask: u8, set: bool) -> Result<(), B::Error> {
        self.regs
            .update_bits(address, mask, if set { mask } else { 0 })
            .map(|_| ())
    }
}

impl<B: RegisterBus> CodecControl for Ssm4567<B> {
    type BusError = B::Error;

    fn set_bias_level(
        &mut self,
        level: PowerState,
    ) -> core::result::Result<PowerState, TransitionError<B::Error>> {
        let regs = &mut self.regs;
        self.power
            .transition(level, |from, to| POWER_DOWN.apply(regs, from, to))
    }

    fn set_fmt(&mut self, request: RawFormatRequest) -> Result<DaiFormat, B::Error> {
        let mut format = self.formats.negotiate(request).map_err(Error::widen)?;

        let mut ctrl1 = 0;
        if format.clock_polarity.bit_clock_inverted() {
            ctrl1 |= reg::SAI_CTRL1_BCLK;
        }
        if format.clock_polarity.frame_sync_inverted() {
            ctrl1 |= reg::SAI_CTRL1_FSYNC;
        }
        ctrl1 |= match format.protocol {
            Protocol::I2s => 0,
            Protocol::LeftJustified => reg::SAI_CTRL1_LJ,
            Protocol::Tdm => reg::SAI_CTRL1_TDM,
            Protocol::Pdm => reg::SAI_CTRL1_PDM,
        };
        // TDM_BCLKS belongs to set_tdm_slot.
        self.regs
            .update_bits(reg::SAI_CTRL1, reg::SAI_CTRL1_FORMAT_MASK, ctrl1)?;

        if let Some(slot) = self.slot {
            format = format.with_slot(slot);
        }
        self.format = Some(format);
        Ok(format)
    }

    fn hw_params(&mut self, params: &HwParams) -> Result<(), B::Error> {
        let fs = self.formats.check_params(params).map_err(Error::widen)?;
        debug!("ssm4567: rate {} -> fs code {}", params.rate, fs);
        self.regs.update_bits(reg::DAC, reg::DAC_FS_MASK, fs)?;
        Ok(())
    }

    fn set_tdm_slot(
        &mut self,
        tx_mask: u32,
        rx_mask: u32,
        slots: u8,
        width: u32,
    ) -> Result<TdmSlot, B::Error> {
        let slot = self
            .formats
            .set_tdm_slot(tx_mask, rx_mask, slots, width)
            .map_err(Error::widen)?;
        let bclks = match slot.width {
            SlotWidth::W32 => reg::SAI_CTRL1_TDM_BCLKS_32,
            SlotWidth::W48 => reg::SAI_CTRL1_TDM_BCLKS_48,
            SlotWidth::W64 => reg::SAI_CTRL1_TDM_BCLKS_64,
            SlotWidth::W16 | SlotWidth::W24 => return Err(Error::UnsupportedFormat),
        };
        self.regs
            .update_bits(reg::SAI_CTRL2, reg::SAI_CTRL2_TDM_SLOT_MASK, slot.index)?;
        self.regs
            .update_bits(reg::SAI_CTRL1, reg::SAI_CTRL1_TDM_BCLKS_MASK, bclks)?;
        self.slot = Some(slot);
        self.format = self.format.map(|f| f.with_slot(slot));
        Ok(slot)
    }

    fn mute(&mut self, direction: StreamDirection, mute: bool) -> Result<(), B::Error> {
        match direction {
            StreamDirection::Playback => self.update_flag(reg::DAC, reg::DAC_MUTE, mute),
            // Amplifier only; nothing to capture.
            StreamDirection::Capture => Err(Error::UnsupportedFormat),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockBus, MockError};
    use std::vec;

    fn probed() -> Ssm4567<MockBus> {
        let mut amp = Ssm4567::new(MockBus::new());
        amp.probe().unwrap();
        amp.registers().bus_mut().clear_log();
        amp
    }

    fn writes(amp: Ssm4567<MockBus>) -> std::vec::Vec<(u16, u8)> {
        amp.release().writes
    }

    #[test]
    fn map_is_well_formed() {
        assert!(reg::MAP.validate().is_ok());
        assert!(reg::MAP.is_volatile(reg::STATUS1));
        assert!(reg::MAP.is_volatile(reg::FAULT));
        assert!(!reg::MAP.is_readable(reg::SOFT_RESET));
        assert!(!reg::MAP.is_volatile(reg::VOLUME));
    }

    #[test]
    fn probe_resets_and_disables_auto_power_down() {
        let mut amp = Ssm4567::new(MockBus::new());
        amp.probe().unwrap();
        assert_eq!(amp.power_state(), PowerState::Off);
        assert_eq!(writes(amp), vec![(reg::SOFT_RESET, 0x00), (reg::POWER, 0x01)]);
    }

    #[test]
    fn bias_toggles_spwdn_only_at_the_ends() {
        let mut amp = probed();
        assert_eq!(amp.set_bias_level(PowerState::On), Ok(PowerState::On));
        assert_eq!(amp.set_bias_level(PowerState::Standby), Ok(PowerState::Standby));
        amp.shutdown().unwrap();
        let bus = amp.release();
        assert_eq!(bus.writes_to(reg::POWER), vec![0x00, 0x01]);
    }

    #[test]
    fn bus_failure_reports_reached_state() {
        let mut amp = probed();
        amp.registers().bus_mut().writes_before_failure = Some(0);
        let err = amp.set_bias_level(PowerState::On).unwrap_err();
        assert_eq!(err.reached, PowerState::Off);
        assert_eq!(err.error, Error::Transport(MockError));
        assert_eq!(amp.power_state(), PowerState::Off);
    }

    #[test]
    fn soft_reset_only_while_off() {
        let mut amp = probed();
        amp.set_bias_level(PowerState::Standby).unwrap();
        assert_eq!(amp.soft_reset(), Err(Error::InvalidState));
    }

    #[test]
    fn status_needs_power() {
        let mut amp = probed();
        assert_eq!(amp.status(), Err(Error::InvalidState));
        amp.set_bias_level(PowerState::Standby).unwrap();
        let status = amp.status().unwrap();
        assert_eq!(status.fault, 0);
        assert_eq!(
            amp.release().reads,
            vec![reg::STATUS1, reg::STATUS2, reg::FAULT]
        );
    }

    #[test]
    fn status_read_failure() {
        let mut amp = probed();
        amp.set_bias_level(PowerState::Standby).unwrap();
        amp.registers().bus_mut().reads_before_failure = Some(0);
        assert_eq!(amp.status(), Err(Error::Transport(MockError)));
        assert!(amp.release().reads.is_empty());
    }

    #[test]
    fn hw_params_selects_rate_family() {
        let mut amp = probed();
        let params = HwParams {
            rate: 96_000,
            format: SampleFormat::S24Le,
            channels: 2,
        };
        amp.hw_params(&params).unwrap();
        // 32..48 kHz is the reset default.
        amp.hw_params(&HwParams { rate: 44_100, ..params }).unwrap();
        amp.hw_params(&HwParams { rate: 44_100, ..params }).unwrap();
        assert_eq!(
            amp.hw_params(&HwParams { rate: 50_000, ..params }),
            Err(Error::UnsupportedFormat)
        );
        assert_eq!(writes(amp), vec![(reg::DAC, 0x33), (reg::DAC, 0x32)]);
    }

    #[test]
    fn left_justified_sets_fsync() {
        let mut amp = probed();
        let fmt = amp
            .set_fmt(RawFormatRequest::slave(Protocol::LeftJustified))
            .unwrap();
        assert!(fmt.clock_polarity.frame_sync_inverted());
        assert_eq!(
            amp.registers().cached(reg::SAI_CTRL1),
            Some(reg::SAI_CTRL1_LJ | reg::SAI_CTRL1_FSYNC)
        );

        amp.set_fmt(RawFormatRequest::slave(Protocol::LeftJustified).inverted(false, true))
            .unwrap();
        assert_eq!(amp.registers().cached(reg::SAI_CTRL1), Some(reg::SAI_CTRL1_LJ));
    }

    #[test]
    fn format_keeps_tdm_bit_clocks() {
        let mut amp = probed();
        amp.set_fmt(RawFormatRequest::slave(Protocol::Tdm)).unwrap();
        let slot = amp.set_tdm_slot(0b0100, 0b0100, 8, 48).unwrap();
        assert_eq!(slot.index, 2);
        amp.set_fmt(RawFormatRequest::slave(Protocol::Tdm).inverted(true, false))
            .unwrap();
        assert_eq!(
            amp.registers().cached(reg::SAI_CTRL1),
            Some(reg::SAI_CTRL1_BCLK | reg::SAI_CTRL1_TDM_BCLKS_48 | reg::SAI_CTRL1_TDM)
        );
        assert_eq!(amp.registers().cached(reg::SAI_CTRL2), Some(0x0A));
        assert_eq!(amp.format().map(|f| f.slot_index), Some(2));
    }

    #[test]
    fn tdm_slot_rejects_two_bits() {
        let mut amp = probed();
        assert_eq!(
            amp.set_tdm_slot(0b0110, 0, 8, 32),
            Err(Error::UnsupportedFormat)
        );
        assert_eq!(amp.set_tdm_slot(1, 0, 8, 16), Err(Error::UnsupportedFormat));
        assert!(writes(amp).is_empty());
    }

    #[test]
    fn playback_mute_only() {
        let mut amp = probed();
        amp.mute(StreamDirection::Playback, true).unwrap();
        assert_eq!(
            amp.mute(StreamDirection::Capture, true),
            Err(Error::UnsupportedFormat)
        );
        amp.mute(StreamDirection::Playback, false).unwrap();
        assert_eq!(writes(amp), vec![(reg::DAC, 0x72), (reg::DAC, 0x32)]);
    }

    #[test]
    fn controls() {
        let mut amp = probed();
        amp.set_volume(0xFF).unwrap();
        assert_eq!(amp.volume(), Ok(0xFF));
        amp.set_high_pass_filter(false).unwrap();
        amp.set_low_power(false).unwrap();
        assert_eq!(
            writes(amp),
            vec![(reg::VOLUME, 0x00), (reg::DAC, 0x12), (reg::DAC, 0x02)]
        );
    }

    #[test]
    fn no_pll() {
        let mut amp = probed();
        assert_eq!(
            amp.set_pll(crate::pll::PllSource::ExternalClock, 12_288_000, 98_304_000),
            Err(Error::UnsupportedFormat)
        );
    }
}
