//! Host-facing control surface of a codec.

use crate::error::{Error, Result};
use crate::format::{DaiFormat, HwParams, RawFormatRequest, StreamDirection, TdmSlot};
use crate::pll::{PllConfig, PllSource};
use crate::power::{PowerState, TransitionError};

/// Callbacks an audio framework drives a codec through.
///
/// Every call is synchronous and may block on the bus. Implementors hold
/// their register cache by value, so `&mut self` serializes all access to
/// one chip.
pub trait CodecControl {
    /// Transport error of the underlying register bus.
    type BusError: core::fmt::Debug;

    /// Walk the chip to `level`, one adjacent power level at a time.
    fn set_bias_level(
        &mut self,
        level: PowerState,
    ) -> core::result::Result<PowerState, TransitionError<Self::BusError>>;

    /// Program the PLL to turn `freq_in` from `source` into `freq_out`.
    ///
    /// Chips without a PLL keep the default, which reports
    /// [`Error::UnsupportedFormat`].
    fn set_pll(
        &mut self,
        source: PllSource,
        freq_in: u32,
        freq_out: u32,
    ) -> Result<PllConfig, Self::BusError> {
        let _ = (source, freq_in, freq_out);
        Err(Error::UnsupportedFormat)
    }

    /// Configure the serial interface format.
    fn set_fmt(&mut self, request: RawFormatRequest) -> Result<DaiFormat, Self::BusError>;

    /// Configure for a stream's sample rate, sample format and channel count.
    fn hw_params(&mut self, params: &HwParams) -> Result<(), Self::BusError>;

    /// Place the chip in one TDM slot.
    fn set_tdm_slot(
        &mut self,
        tx_mask: u32,
        rx_mask: u32,
        slots: u8,
        width: u32,
    ) -> Result<TdmSlot, Self::BusError>;

    /// Mute or unmute one stream direction.
    fn mute(&mut self, direction: StreamDirection, mute: bool) -> Result<(), Self::BusError>;
}
