//! Serial audio interface format negotiation.
//!
//! [`FormatNegotiator`] checks a host request against a chip's
//! [`FormatCaps`] and produces the typed values the chip drivers turn into
//! SAI/TDM register bits. Nothing here touches a bus.

use crate::error::{Error, Result};

// ── Value types ─────────────────────────────────────────────────────────────

/// Which side drives the bit clock and frame sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockMaster {
    CodecIsMaster,
    CodecIsSlave,
}

/// Effective clock inversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockPolarity {
    Normal,
    InvertBitClock,
    InvertFrameSync,
    InvertBoth,
}

impl ClockPolarity {
    pub const fn from_flags(bit_clock: bool, frame_sync: bool) -> Self {
        match (bit_clock, frame_sync) {
            (false, false) => ClockPolarity::Normal,
            (true, false) => ClockPolarity::InvertBitClock,
            (false, true) => ClockPolarity::InvertFrameSync,
            (true, true) => ClockPolarity::InvertBoth,
        }
    }

    pub const fn bit_clock_inverted(self) -> bool {
        matches!(self, ClockPolarity::InvertBitClock | ClockPolarity::InvertBoth)
    }

    pub const fn frame_sync_inverted(self) -> bool {
        matches!(self, ClockPolarity::InvertFrameSync | ClockPolarity::InvertBoth)
    }
}

/// Frame protocol on the serial port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Protocol {
    I2s,
    LeftJustified,
    /// DSP mode A / TDM.
    Tdm,
    Pdm,
}

/// Bit clocks per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotWidth {
    W16,
    W24,
    W32,
    W48,
    W64,
}

impl SlotWidth {
    pub const fn bits(self) -> u32 {
        match self {
            SlotWidth::W16 => 16,
            SlotWidth::W24 => 24,
            SlotWidth::W32 => 32,
            SlotWidth::W48 => 48,
            SlotWidth::W64 => 64,
        }
    }
}

impl TryFrom<u32> for SlotWidth {
    type Error = Error;

    fn try_from(bits: u32) -> Result<Self> {
        match bits {
            16 => Ok(SlotWidth::W16),
            24 => Ok(SlotWidth::W24),
            32 => Ok(SlotWidth::W32),
            48 => Ok(SlotWidth::W48),
            64 => Ok(SlotWidth::W64),
            _ => Err(Error::UnsupportedFormat),
        }
    }
}

/// PCM sample layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleFormat {
    S8,
    S16Le,
    S24Le,
    S32Le,
}

/// Playback (host to chip) or capture (chip to host).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StreamDirection {
    Playback,
    Capture,
}

/// Host request, before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawFormatRequest {
    pub master: ClockMaster,
    pub protocol: Protocol,
    pub invert_bit_clock: bool,
    pub invert_frame_sync: bool,
}

impl RawFormatRequest {
    /// Codec as clock slave, normal polarity.
    pub const fn slave(protocol: Protocol) -> Self {
        Self {
            master: ClockMaster::CodecIsSlave,
            protocol,
            invert_bit_clock: false,
            invert_frame_sync: false,
        }
    }

    pub const fn inverted(self, bit_clock: bool, frame_sync: bool) -> Self {
        Self {
            invert_bit_clock: bit_clock,
            invert_frame_sync: frame_sync,
            ..self
        }
    }
}

/// Validated interface format.
///
/// `clock_polarity` is the polarity to program, which for left-justified
/// differs from the request in its frame sync component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DaiFormat {
    pub master_mode: ClockMaster,
    pub clock_polarity: ClockPolarity,
    pub protocol: Protocol,
    pub slot_width: SlotWidth,
    pub slot_index: u8,
}

impl DaiFormat {
    /// Same format placed in a TDM slot.
    pub fn with_slot(self, slot: TdmSlot) -> Self {
        Self {
            slot_width: slot.width,
            slot_index: slot.index,
            ..self
        }
    }
}

/// Single-slot TDM assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TdmSlot {
    pub index: u8,
    pub width: SlotWidth,
    /// Slots per frame as requested; zero when unspecified.
    pub slots: u8,
}

/// Stream parameters from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HwParams {
    pub rate: u32,
    pub format: SampleFormat,
    pub channels: u8,
}

/// Inclusive sample-rate range mapped to one register code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RateBucket {
    pub min: u32,
    pub max: u32,
    pub code: u8,
}

impl RateBucket {
    pub const fn new(min: u32, max: u32, code: u8) -> Self {
        Self { min, max, code }
    }

    pub const fn contains(&self, rate: u32) -> bool {
        rate >= self.min && rate <= self.max
    }
}

/// What one chip's serial port can do.
#[derive(Debug, Clone, Copy)]
pub struct FormatCaps {
    pub protocols: &'static [Protocol],
    pub slot_widths: &'static [SlotWidth],
    /// Width assumed until a TDM slot is configured.
    pub default_slot_width: SlotWidth,
    pub max_slots: u8,
    pub rates: &'static [RateBucket],
    pub formats: &'static [SampleFormat],
    pub channels_min: u8,
    pub channels_max: u8,
}

// ── Negotiator ──────────────────────────────────────────────────────────────

/// Validates host requests against one chip's [`FormatCaps`].
#[derive(Debug, Clone, Copy)]
pub struct FormatNegotiator {
    caps: &'static FormatCaps,
}

impl FormatNegotiator {
    pub const fn new(caps: &'static FormatCaps) -> Self {
        Self { caps }
    }

    pub fn caps(&self) -> &'static FormatCaps {
        self.caps
    }

    /// Validate a format request.
    ///
    /// Only codec-as-slave is accepted. Left-justified flips the effective
    /// frame sync polarity relative to the request.
    pub fn negotiate(&self, requested: RawFormatRequest) -> Result<DaiFormat> {
        if requested.master != ClockMaster::CodecIsSlave {
            return Err(Error::UnsupportedFormat);
        }
        if !self.caps.protocols.contains(&requested.protocol) {
            return Err(Error::UnsupportedFormat);
        }
        let frame_sync =
            requested.invert_frame_sync ^ (requested.protocol == Protocol::LeftJustified);
        let format = DaiFormat {
            master_mode: ClockMaster::CodecIsSlave,
            clock_polarity: ClockPolarity::from_flags(requested.invert_bit_clock, frame_sync),
            protocol: requested.protocol,
            slot_width: self.caps.default_slot_width,
            slot_index: 0,
        };
        debug!(
            "fmt: bclk_inv={} fsync_inv={}",
            format.clock_polarity.bit_clock_inverted(),
            format.clock_polarity.frame_sync_inverted()
        );
        Ok(format)
    }

    /// Validate a TDM slot assignment.
    ///
    /// `tx_mask` must have exactly one bit set; a non-zero `rx_mask` must
    /// match it. The slot index is the position of that bit.
    pub fn set_tdm_slot(
        &self,
        tx_mask: u32,
        rx_mask: u32,
        slots: u8,
        width: u32,
    ) -> Result<TdmSlot> {
        if tx_mask.count_ones() != 1 {
            return Err(Error::UnsupportedFormat);
        }
        if rx_mask != 0 && rx_mask != tx_mask {
            return Err(Error::UnsupportedFormat);
        }
        let index = tx_mask.trailing_zeros() as u8;
        let width = SlotWidth::try_from(width)?;
        if !self.caps.slot_widths.contains(&width) {
            return Err(Error::UnsupportedFormat);
        }
        if index >= self.caps.max_slots || (slots != 0 && index >= slots) {
            return Err(Error::UnsupportedFormat);
        }
        debug!("tdm: slot {} width {}", index, width.bits());
        Ok(TdmSlot {
            index,
            width,
            slots,
        })
    }

    /// Bucket containing `rate`.
    pub fn rate_bucket(&self, rate: u32) -> Result<&'static RateBucket> {
        self.caps
            .rates
            .iter()
            .find(|b| b.contains(rate))
            .ok_or(Error::UnsupportedFormat)
    }

    /// Validate stream parameters; returns the rate bucket code.
    pub fn check_params(&self, params: &HwParams) -> Result<u8> {
        if !self.caps.formats.contains(&params.format) {
            return Err(Error::UnsupportedFormat);
        }
        if !(self.caps.channels_min..=self.caps.channels_max).contains(&params.channels) {
            return Err(Error::UnsupportedFormat);
        }
        Ok(self.rate_bucket(params.rate)?.code)
    }
}
