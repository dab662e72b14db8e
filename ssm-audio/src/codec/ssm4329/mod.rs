//! SSM4329 class-D amplifier with SigmaDSP, ADC and fractional PLL.
//!
//! Two serial ports (SP1, SP2) share one register cache, one PLL and one
//! power state. Chip-wide operations live on [`Ssm4329`]; per-port format
//! callbacks go through the [`Ssm4329Dai`] view returned by
//! [`Ssm4329::dai`].
//!
//! # Example
//!
//! ```ignore
//! let mut amp = Ssm4329::new_spi(spi);
//! let id = amp.probe()?;
//! amp.set_pll(PllSource::BitClock1, 3_072_000, 98_304_000)?;
//! let mut sp1 = amp.dai(SerialPort::Sp1);
//! sp1.set_fmt(RawFormatRequest::slave(Protocol::Tdm))?;
//! sp1.set_tdm_slot(0b1, 0, 8, 32)?;
//! sp1.set_bias_level(PowerState::On)?;
//! ```

pub mod registers;

use embedded_hal::i2c::I2c;
use embedded_hal::spi::SpiDevice;

use self::registers as reg;
use crate::bus::{AddressWidth, I2cBus, RegisterBus, SpiBus};
use crate::control::CodecControl;
use crate::error::{Error, Result};
use crate::format::{
    DaiFormat, FormatCaps, FormatNegotiator, HwParams, Protocol, RateBucket, RawFormatRequest,
    SampleFormat, SlotWidth, StreamDirection, TdmSlot,
};
use crate::pll::{self, PllConfig, PllSource};
use crate::power::{PowerDownBit, PowerState, PowerStateMachine, TransitionError};
use crate::regmap::RegisterCache;

static CAPS: FormatCaps = FormatCaps {
    protocols: &[Protocol::I2s, Protocol::LeftJustified, Protocol::Tdm],
    slot_widths: &[SlotWidth::W16, SlotWidth::W24, SlotWidth::W32],
    default_slot_width: SlotWidth::W32,
    max_slots: 16,
    rates: &[RateBucket::new(48_000, 48_000, 0)],
    formats: &[SampleFormat::S16Le, SampleFormat::S24Le, SampleFormat::S32Le],
    channels_min: 1,
    channels_max: 16,
};

const POWER_DOWN: PowerDownBit = PowerDownBit::new(reg::CHIP_PWR, reg::CHIP_PWR_CHIP_PWDN);

/// One of the two serial audio ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerialPort {
    Sp1,
    Sp2,
}

impl SerialPort {
    const fn index(self) -> usize {
        match self {
            SerialPort::Sp1 => 0,
            SerialPort::Sp2 => 1,
        }
    }

    /// Address of a register in this port's block.
    pub const fn register(self, offset: u16) -> u16 {
        reg::spt(self.index(), offset)
    }

    const fn name(self) -> &'static str {
        match self {
            SerialPort::Sp1 => "sp1",
            SerialPort::Sp2 => "sp2",
        }
    }
}

/// Identification registers read at probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChipId {
    pub vendor: u8,
    pub device1: u8,
    pub device2: u8,
    pub revision: u8,
}

/// Snapshot of the volatile status registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    pub fault: u8,
    pub pll_sdsp: u8,
    pub vbat: u8,
}

impl Status {
    pub fn pll_locked(&self) -> bool {
        self.pll_sdsp & reg::PLL_SDSP_STATUS_PLL_LOCK != 0
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct PortState {
    format: Option<DaiFormat>,
    slot: Option<TdmSlot>,
}

/// SSM4329 driver.
pub struct Ssm4329<B> {
    regs: RegisterCache<B>,
    power: PowerStateMachine,
    formats: FormatNegotiator,
    pll: Option<PllConfig>,
    ports: [PortState; 2],
}

impl<I2C: I2c> Ssm4329<I2cBus<I2C>> {
    /// Driver on an I2C bus at 7-bit address `address`.
    pub fn new_i2c(i2c: I2C, address: u8) -> Self {
        Self::new(I2cBus::new(i2c, address, AddressWidth::Sixteen))
    }
}

impl<SPI: SpiDevice> Ssm4329<SpiBus<SPI>> {
    /// Driver on the SPI control port.
    pub fn new_spi(spi: SPI) -> Self {
        Self::new(SpiBus::new(spi, 0))
    }
}

impl<B: RegisterBus> Ssm4329<B> {
    pub fn new(bus: B) -> Self {
        Self {
            regs: RegisterCache::new(bus, reg::MAP),
            power: PowerStateMachine::new(PowerState::Off),
            formats: FormatNegotiator::new(&CAPS),
            pll: None,
            ports: [PortState::default(); 2],
        }
    }

    /// Read and log the identification registers.
    pub fn probe(&mut self) -> Result<ChipId, B::Error> {
        let id = ChipId {
            vendor: self.regs.read(reg::VENDOR_ID)?,
            device1: self.regs.read(reg::DEVICE_ID1)?,
            device2: self.regs.read(reg::DEVICE_ID2)?,
            revision: self.regs.read(reg::REVISION)?,
        };
        info!(
            "ssm4329 version: {:x}.{:x}{:x}.{:x}",
            id.vendor,
            id.device1,
            id.device2,
            id.revision
        );
        Ok(id)
    }

    /// Reset the entire chip. Only permitted while off.
    pub fn soft_reset(&mut self) -> Result<(), B::Error> {
        self.power
            .require_at_most(PowerState::Off)
            .map_err(Error::widen)?;
        self.regs.force_write(reg::SOFT_FULL_RESET, 0x01)?;
        self.regs.reset_to_defaults();
        self.power.force(PowerState::Off);
        self.pll = None;
        self.ports = [PortState::default(); 2];
        debug!("ssm4329: soft reset");
        Ok(())
    }

    /// Walk the chip to `level`. Shared by both ports.
    pub fn set_bias_level(
        &mut self,
        level: PowerState,
    ) -> core::result::Result<PowerState, TransitionError<B::Error>> {
        let regs = &mut self.regs;
        self.power
            .transition(level, |from, to| POWER_DOWN.apply(regs, from, to))
    }

    /// Program the PLL and strobe PLL_UPDATE.
    ///
    /// `freq_out == 0` puts the PLL in bypass. Refused while streaming.
    pub fn set_pll(
        &mut self,
        source: PllSource,
        freq_in: u32,
        freq_out: u32,
    ) -> Result<PllConfig, B::Error> {
        self.power
            .require_at_most(PowerState::Prepare)
            .map_err(Error::widen)?;
        if source == PllSource::Bypass && freq_out != 0 {
            return Err(Error::UnsupportedFormat);
        }
        let config = pll::solve(freq_in, freq_out)
            .map_err(Error::widen)?
            .with_source(source);

        let mut ctrl1 = config.source.bits();
        if config.is_fractional() {
            ctrl1 |= reg::CLK_CTRL1_PLL_FRAC;
        }
        let [r_lo, r_hi] = config.feedback_integer.to_le_bytes();
        let [n_lo, n_hi] = config.frac_numerator.to_le_bytes();
        let [m_lo, m_hi] = config.frac_denominator.to_le_bytes();

        self.regs.write(reg::CLK_CTRL1, ctrl1)?;
        self.regs.write(reg::CLK_CTRL2, config.pre_divider)?;
        self.regs.write(reg::CLK_CTRL3, r_lo)?;
        self.regs.write(reg::CLK_CTRL4, r_hi)?;
        self.regs.write(reg::CLK_CTRL5, n_lo)?;
        self.regs.write(reg::CLK_CTRL6, n_hi)?;
        self.regs.write(reg::CLK_CTRL7, m_lo)?;
        self.regs.write(reg::CLK_CTRL8, m_hi)?;

        self.regs
            .force_write(reg::CLK_CTRL9, reg::CLK_CTRL9_PLL_UPDATE)?;
        self.regs.force_write(reg::CLK_CTRL9, 0)?;

        info!("ssm4329: pll {} Hz -> {} Hz", freq_in, freq_out);
        self.pll = Some(config);
        Ok(config)
    }

    /// Mute or unmute the DAC (playback) or ADC (capture) path.
    pub fn mute(&mut self, direction: StreamDirection, mute: bool) -> Result<(), B::Error> {
        let (address, mask) = match direction {
            StreamDirection::Playback => (reg::DAC_CTRL, reg::DAC_CTRL_MUTE),
            StreamDirection::Capture => (reg::ADC_CTRL, reg::ADC_CTRL_MUTE),
        };
        self.update_flag(address, mask, mute)
    }

    /// Float or drive one port's outputs.
    pub fn set_tristate(&mut self, port: SerialPort, tristate: bool) -> Result<(), B::Error> {
        self.update_flag(
            port.register(reg::SPT_CTRL2),
            reg::SPT_CTRL2_TRI_STATE,
            tristate,
        )
    }

    // ── Mixer controls ─────────────────────────────────────────────────

    /// DAC volume, 0 = mute, 255 = +24 dB.
    pub fn set_dac_volume(&mut self, level: u8) -> Result<(), B::Error> {
        self.regs.write(reg::DAC_VOLUME, !level)
    }

    /// Interpolator path volume, 0 = mute, 255 = +24 dB.
    pub fn set_interp_volume(&mut self, level: u8) -> Result<(), B::Error> {
        self.regs.write(reg::INTERP_VOLUME, !level)
    }

    /// ADC capture volume, 0 = mute, 255 = +24 dB.
    pub fn set_adc_volume(&mut self, level: u8) -> Result<(), B::Error> {
        self.regs.write(reg::ADC_VOLUME, !level)
    }

    /// DAC high-rate clip point, 0 = -48 dB, 255 = 0 dB.
    pub fn set_dac_clip(&mut self, level: u8) -> Result<(), B::Error> {
        self.regs.write(reg::DAC_CLIP, !level)
    }

    /// Interpolator high-rate clip point, 0 = -48 dB, 255 = 0 dB.
    pub fn set_interp_clip(&mut self, level: u8) -> Result<(), B::Error> {
        self.regs.write(reg::INTERP_CLIP, !level)
    }

    pub fn set_dac_high_pass_filter(&mut self, enabled: bool) -> Result<(), B::Error> {
        self.update_flag(reg::DAC_CTRL, reg::DAC_CTRL_HPF, enabled)
    }

    pub fn set_dac_low_power(&mut self, enabled: bool) -> Result<(), B::Error> {
        self.update_flag(reg::DAC_CTRL, reg::DAC_CTRL_LPM, enabled)
    }

    pub fn set_adc_high_pass_filter(&mut self, enabled: bool) -> Result<(), B::Error> {
        self.update_flag(reg::ADC_CTRL, reg::ADC_CTRL_HPF, enabled)
    }

    pub fn set_adc_low_power(&mut self, enabled: bool) -> Result<(), B::Error> {
        self.update_flag(reg::ADC_CTRL, reg::ADC_CTRL_LPM, enabled)
    }

    /// Interpolator playback switch; the register bit is a mute.
    pub fn set_interp_playback(&mut self, enabled: bool) -> Result<(), B::Error> {
        self.update_flag(
            reg::DAC_INTERP_CTRL,
            reg::DAC_INTERP_CTRL_INTERP_MUTE,
            !enabled,
        )
    }

    // ── Status ─────────────────────────────────────────────────────────

    /// Read fault, PLL/DSP lock and battery registers. The chip must be powered.
    pub fn status(&mut self) -> Result<Status, B::Error> {
        self.power
            .require_at_least(PowerState::Standby)
            .map_err(Error::widen)?;
        Ok(Status {
            fault: self.regs.read(reg::FAULT_STATUS)?,
            pll_sdsp: self.regs.read(reg::PLL_SDSP_STATUS)?,
            vbat: self.regs.read(reg::VBAT)?,
        })
    }

    // ── Accessors ──────────────────────────────────────────────────────

    /// Callback view for one serial port.
    pub fn dai(&mut self, port: SerialPort) -> Ssm4329Dai<'_, B> {
        Ssm4329Dai { chip: self, port }
    }

    pub fn power_state(&self) -> PowerState {
        self.power.state()
    }

    /// PLL configuration last programmed.
    pub fn pll(&self) -> Option<PllConfig> {
        self.pll
    }

    /// Format last applied to `port`.
    pub fn format(&self, port: SerialPort) -> Option<DaiFormat> {
        self.ports[port.index()].format
    }

    pub fn registers(&mut self) -> &mut RegisterCache<B> {
        &mut self.regs
    }

    pub fn release(self) -> B {
        self.regs.release()
    }

    fn update_flag(&mut self, address: u16, mask: u8, set: bool) -> Result<(), B::Error> {
        self.regs
            .update_bits(address, mask, if set { mask } else { 0 })
            .map(|_| ())
    }
}

// ── Per-port view ──────────────────────────────────────────────────────────

/// One serial port of an [`Ssm4329`], as seen by the audio framework.
///
/// Bias, PLL and mute act on the whole chip; format, slot and stream
/// parameters act on this port only.
pub struct Ssm4329Dai<'a, B> {
    chip: &'a mut Ssm4329<B>,
    port: SerialPort,
}

impl<B: RegisterBus> Ssm4329Dai<'_, B> {
    pub fn port(&self) -> SerialPort {
        self.port
    }

    pub fn set_tristate(&mut self, tristate: bool) -> Result<(), B::Error> {
        self.chip.set_tristate(self.port, tristate)
    }

    fn state(&mut self) -> &mut PortState {
        &mut self.chip.ports[self.port.index()]
    }
}

impl<B: RegisterBus> CodecControl for Ssm4329Dai<'_, B> {
    type BusError = B::Error;

    fn set_bias_level(
        &mut self,
        level: PowerState,
    ) -> core::result::Result<PowerState, TransitionError<B::Error>> {
        self.chip.set_bias_level(level)
    }

    fn set_pll(
        &mut self,
        source: PllSource,
        freq_in: u32,
        freq_out: u32,
    ) -> Result<PllConfig, B::Error> {
        self.chip.set_pll(source, freq_in, freq_out)
    }

    fn set_fmt(&mut self, request: RawFormatRequest) -> Result<DaiFormat, B::Error> {
        let mut format = self
            .chip
            .formats
            .negotiate(request)
            .map_err(Error::widen)?;

        let ctrl1 = match format.protocol {
            Protocol::I2s => reg::SPT_CTRL1_DATA_FORMAT_I2S | reg::SPT_CTRL1_MODE_STEREO,
            Protocol::LeftJustified => reg::SPT_CTRL1_DATA_FORMAT_LJ | reg::SPT_CTRL1_MODE_STEREO,
            Protocol::Tdm => reg::SPT_CTRL1_DATA_FORMAT_I2S | reg::SPT_CTRL1_MODE_TDM,
            Protocol::Pdm => return Err(Error::UnsupportedFormat),
        };
        let mut clocking = 0;
        if format.clock_polarity.bit_clock_inverted() {
            clocking |= reg::SPT_CLOCKING_BCLK_POL;
        }
        if format.clock_polarity.frame_sync_inverted() {
            clocking |= reg::SPT_CLOCKING_LRCLK_POL;
        }

        let port = self.port;
        let regs = &mut self.chip.regs;
        regs.update_bits(
            port.register(reg::SPT_CTRL1),
            reg::SPT_CTRL1_DATA_FORMAT_MASK | reg::SPT_CTRL1_MODE_MASK,
            ctrl1,
        )?;
        regs.update_bits(
            port.register(reg::SPT_CLOCKING),
            reg::SPT_CLOCKING_BCLK_POL | reg::SPT_CLOCKING_LRCLK_POL,
            clocking,
        )?;
        debug!("ssm4329: {} ctrl1 {:#x} clocking {:#x}", port.name(), ctrl1, clocking);

        let state = self.state();
        if let Some(slot) = state.slot {
            format = format.with_slot(slot);
        }
        state.format = Some(format);
        Ok(format)
    }

    fn hw_params(&mut self, params: &HwParams) -> Result<(), B::Error> {
        self.chip
            .formats
            .check_params(params)
            .map_err(Error::widen)?;
        debug!(
            "ssm4329: {} {} Hz x{}",
            self.port.name(),
            params.rate,
            params.channels
        );
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
            .chip
            .formats
            .set_tdm_slot(tx_mask, rx_mask, slots, width)
            .map_err(Error::widen)?;
        let width_bits = match slot.width {
            SlotWidth::W32 => reg::SPT_CTRL1_SLOT_WIDTH_32,
            SlotWidth::W16 => reg::SPT_CTRL1_SLOT_WIDTH_16,
            SlotWidth::W24 => reg::SPT_CTRL1_SLOT_WIDTH_24,
            SlotWidth::W48 | SlotWidth::W64 => return Err(Error::UnsupportedFormat),
        };

        let port = self.port;
        let regs = &mut self.chip.regs;
        regs.update_bits(
            port.register(reg::SPT_CTRL1),
            reg::SPT_CTRL1_SLOT_WIDTH_MASK | reg::SPT_CTRL1_MODE_MASK,
            width_bits | reg::SPT_CTRL1_MODE_TDM,
        )?;
        regs.update_bits(
            port.register(reg::SPT_INPUTS1),
            reg::SPT_INPUTS1_SLOT_MASK,
            slot.index,
        )?;

        let state = self.state();
        state.slot = Some(slot);
        state.format = state.format.map(|f| f.with_slot(slot));
        Ok(slot)
    }

    fn mute(&mut self, direction: StreamDirection, mute: bool) -> Result<(), B::Error> {
        self.chip.mute(direction, mute)
    }
}
