/// Lowest PLL reference frequency the chips accept, in Hz.
pub const PLL_FREQ_IN_MIN: u32 = 8_000;

/// Highest PLL reference frequency the chips accept, in Hz.
pub const PLL_FREQ_IN_MAX: u32 = 27_000_000;

/// Ceiling of the PLL phase comparator input; the pre-divider brings the
/// reference under this.
pub const PLL_COMPARATOR_MAX: u32 = 13_500_000;

/// Largest PLL input pre-divider (3-bit field, zero reserved).
pub const PLL_PREDIV_MAX: u32 = 7;

/// Largest PLL feedback integer divider (14 bits).
pub const PLL_FEEDBACK_INT_MAX: u32 = 0x3FFF;

/// Largest PLL fractional numerator / denominator (16 bits each).
pub const PLL_FRAC_MAX: u32 = 0xFFFF;

/// Number of register values one cache instance can hold.
pub const CACHE_CAPACITY: usize = 128;
