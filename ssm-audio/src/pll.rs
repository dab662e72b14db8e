//! PLL coefficient solver.
//!
//! The PLL multiplies its (pre-divided) reference by `R + N/M`:
//!
//! ```text
//! f_out = (f_in / X) × (R + N / M)
//! ```
//!
//! | Symbol | Field              | Range         |
//! |--------|--------------------|---------------|
//! | X      | `pre_divider`      | 1..=7         |
//! | R      | `feedback_integer` | 0..=0x3FFF    |
//! | N      | `frac_numerator`   | 0..=0xFFFF    |
//! | M      | `frac_denominator` | 0..=0xFFFF    |
//!
//! X is chosen so `f_in / X` stays under the 13.5 MHz comparator limit. The
//! fraction is reduced to lowest terms so the smallest denominator that
//! reproduces the ratio exactly is programmed.

use crate::constants::{
    PLL_COMPARATOR_MAX, PLL_FEEDBACK_INT_MAX, PLL_FRAC_MAX, PLL_FREQ_IN_MAX, PLL_FREQ_IN_MIN,
    PLL_PREDIV_MAX,
};
use crate::error::{Error, Result};

/// PLL reference input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PllSource {
    /// PLL disabled, core clocked straight from the reference.
    Bypass,
    /// MCLK input pin.
    ExternalClock,
    /// Frame sync of serial port 1.
    FrameSync1,
    /// Bit clock of serial port 1.
    BitClock1,
    /// Frame sync of serial port 2.
    FrameSync2,
    /// Bit clock of serial port 2.
    BitClock2,
}

impl PllSource {
    /// Encoding in the clock control register: bit 0 bypasses the PLL,
    /// bits 3:1 select the reference.
    pub const fn bits(self) -> u8 {
        match self {
            PllSource::Bypass => 0x01,
            PllSource::ExternalClock => 0x00,
            PllSource::FrameSync1 => 0x02,
            PllSource::BitClock1 => 0x04,
            PllSource::FrameSync2 => 0x06,
            PllSource::BitClock2 => 0x08,
        }
    }
}

/// Solved PLL coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PllConfig {
    pub source: PllSource,
    /// Reference pre-divider X; zero only in bypass.
    pub pre_divider: u8,
    /// Integer feedback divider R (14 bits).
    pub feedback_integer: u16,
    /// Fractional numerator N.
    pub frac_numerator: u16,
    /// Fractional denominator M; zero in integer mode.
    pub frac_denominator: u16,
}

impl PllConfig {
    /// PLL disabled.
    pub const BYPASS: PllConfig = PllConfig {
        source: PllSource::Bypass,
        pre_divider: 0,
        feedback_integer: 0,
        frac_numerator: 0,
        frac_denominator: 0,
    };

    /// True when the configuration disables the PLL.
    pub fn is_bypass(&self) -> bool {
        self.feedback_integer == 0 && self.frac_numerator == 0
    }

    /// True when the fractional divider is in use.
    pub fn is_fractional(&self) -> bool {
        self.frac_denominator != 0
    }

    /// Same coefficients fed from another reference. Bypass stays bypass.
    pub fn with_source(self, source: PllSource) -> Self {
        if self.is_bypass() {
            return Self::BYPASS;
        }
        Self { source, ..self }
    }

    /// Output frequency these coefficients produce from `freq_in`, if it is a
    /// whole number of Hz. Bypass yields `None`.
    pub fn output_frequency(&self, freq_in: u32) -> Option<u32> {
        if self.is_bypass() || self.pre_divider == 0 {
            return None;
        }
        let eff = u64::from(freq_in / u32::from(self.pre_divider));
        let r = u64::from(self.feedback_integer);
        let out = if self.is_fractional() {
            let m = u64::from(self.frac_denominator);
            let num = eff * (r * m + u64::from(self.frac_numerator));
            if num % m != 0 {
                return None;
            }
            num / m
        } else {
            eff * r
        };
        u32::try_from(out).ok()
    }
}

/// Solve for coefficients that turn `freq_in` into exactly `freq_out`.
///
/// `freq_out == 0` yields [`PllConfig::BYPASS`]. Fails with
/// [`Error::OutOfRange`] when `freq_in` lies outside 8 kHz..=27 MHz or any
/// coefficient overflows its register field.
pub fn solve(freq_in: u32, freq_out: u32) -> Result<PllConfig> {
    if !(PLL_FREQ_IN_MIN..=PLL_FREQ_IN_MAX).contains(&freq_in) {
        return Err(Error::OutOfRange);
    }
    if freq_out == 0 {
        return Ok(PllConfig::BYPASS);
    }

    let pre_divider = freq_in.div_ceil(PLL_COMPARATOR_MAX);
    if pre_divider == 0 || pre_divider > PLL_PREDIV_MAX {
        return Err(Error::OutOfRange);
    }
    // Truncation matches the hardware divider.
    let eff = freq_in / pre_divider;

    let r = freq_out / eff;
    let rem = freq_out % eff;
    let (n, m) = if rem == 0 {
        (0, 0)
    } else {
        let g = gcd(rem, eff);
        (rem / g, eff / g)
    };

    if r > PLL_FEEDBACK_INT_MAX || n > PLL_FRAC_MAX || m > PLL_FRAC_MAX {
        return Err(Error::OutOfRange);
    }

    let config = PllConfig {
        source: PllSource::ExternalClock,
        pre_divider: pre_divider as u8,
        feedback_integer: r as u16,
        frac_numerator: n as u16,
        frac_denominator: m as u16,
    };
    debug!(
        "pll: {} Hz -> {} Hz, X={} R={} N={} M={}",
        freq_in,
        freq_out,
        config.pre_divider,
        config.feedback_integer,
        config.frac_numerator,
        config.frac_denominator
    );
    Ok(config)
}

/// Greatest common divisor (Euclid).
pub(crate) fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_output_is_bypass() {
        let c = solve(12_288_000, 0).unwrap();
        assert_eq!(c, PllConfig::BYPASS);
        assert!(c.is_bypass());
        assert_eq!(c.output_frequency(12_288_000), None);
    }

    #[test]
    fn integer_multiple() {
        // 12.288 MHz MCLK -> 98.304 MHz core clock.
        let c = solve(12_288_000, 98_304_000).unwrap();
        assert_eq!(c.pre_divider, 1);
        assert_eq!(c.feedback_integer, 8);
        assert_eq!((c.frac_numerator, c.frac_denominator), (0, 0));
        assert!(!c.is_fractional());
        assert_eq!(c.output_frequency(12_288_000), Some(98_304_000));
    }

    #[test]
    fn fractional_ratio_is_reduced() {
        // 44.1 kHz family MCLK up to a 48 kHz family core clock.
        let c = solve(11_289_600, 98_304_000).unwrap();
        assert_eq!(c.pre_divider, 1);
        assert_eq!(c.feedback_integer, 8);
        assert_eq!(c.frac_numerator, 104);
        assert_eq!(c.frac_denominator, 147);
        assert_eq!(gcd(104, 147), 1);
        assert_eq!(c.output_frequency(11_289_600), Some(98_304_000));
    }

    #[test]
    fn reference_above_comparator_is_pre_divided() {
        let c = solve(24_576_000, 98_304_000).unwrap();
        assert_eq!(c.pre_divider, 2);
        assert_eq!(c.feedback_integer, 8);
        assert!(!c.is_fractional());
    }

    #[test]
    fn input_window_is_enforced() {
        assert_eq!(solve(7_999, 1_000_000), Err(Error::OutOfRange));
        assert_eq!(solve(27_000_001, 1_000_000), Err(Error::OutOfRange));
        assert_eq!(solve(7_999, 0), Err(Error::OutOfRange));
        assert!(solve(8_000, 1_024_000).is_ok());
        assert!(solve(27_000_000, 27_000_000).is_ok());
    }

    #[test]
    fn oversized_coefficients_fail() {
        // R = 4_000_000_000 / 8000 overflows 14 bits.
        assert_eq!(solve(8_000, 4_000_000_000), Err(Error::OutOfRange));
        // Denominator 65_537 (prime) overflows 16 bits.
        assert_eq!(solve(65_537, 65_538), Err(Error::OutOfRange));
    }

    #[test]
    fn with_source_keeps_coefficients() {
        let c = solve(3_072_000, 98_304_000)
            .unwrap()
            .with_source(PllSource::BitClock1);
        assert_eq!(c.source, PllSource::BitClock1);
        assert_eq!(c.feedback_integer, 32);
        assert_eq!(PllConfig::BYPASS.with_source(PllSource::BitClock1), PllConfig::BYPASS);
    }
}
