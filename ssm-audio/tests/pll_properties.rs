//! Property-based tests for the PLL solver.
//! Every accepted request must reproduce the target frequency exactly.

use ssm_audio::pll::{solve, PllConfig};
use ssm_audio::Error;

const FREQ_IN_MIN: u32 = 8_000;
const FREQ_IN_MAX: u32 = 27_000_000;

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn effective_input(freq_in: u32) -> u32 {
    freq_in / freq_in.div_ceil(13_500_000)
}

proptest::proptest! {
    #![proptest_config(proptest::test_runner::Config {
        max_global_rejects: 100_000,
        ..proptest::test_runner::Config::default()
    })]

    /// An accepted request reconstructs freq_out with no rounding.
    #[test]
    fn solution_reconstructs_exactly(
        freq_in in FREQ_IN_MIN..=FREQ_IN_MAX,
        freq_out in 1u32..=400_000_000u32,
    ) {
        match solve(freq_in, freq_out) {
            Ok(config) => assert_eq!(
                config.output_frequency(freq_in),
                Some(freq_out),
                "{} Hz -> {} Hz gave {:?}", freq_in, freq_out, config
            ),
            Err(e) => assert_eq!(e, Error::OutOfRange),
        }
    }

    /// The fraction is always in lowest terms and proper.
    #[test]
    fn fraction_is_reduced(
        freq_in in FREQ_IN_MIN..=FREQ_IN_MAX,
        freq_out in 1u32..=400_000_000u32,
    ) {
        if let Ok(config) = solve(freq_in, freq_out) {
            let n = u32::from(config.frac_numerator);
            let m = u32::from(config.frac_denominator);
            if m == 0 {
                assert_eq!(n, 0);
            } else {
                assert_eq!(gcd(n, m), 1);
                assert!(n < m);
            }
            assert!((1..=7).contains(&config.pre_divider));
            assert!(config.feedback_integer <= 0x3FFF);
        }
    }

    /// Identical inputs give identical outputs.
    #[test]
    fn solver_is_deterministic(freq_in in 0u32..=u32::MAX, freq_out in 0u32..=u32::MAX) {
        assert_eq!(solve(freq_in, freq_out), solve(freq_in, freq_out));
    }

    /// Exact multiples of the pre-divided input need no fraction.
    #[test]
    fn integer_ratios_are_integer(freq_in in FREQ_IN_MIN..=FREQ_IN_MAX, k in 1u32..=0x3FFF) {
        let eff = effective_input(freq_in);
        proptest::prop_assume!(eff.checked_mul(k).is_some());
        let config = solve(freq_in, eff * k).unwrap();
        assert_eq!(u32::from(config.feedback_integer), k);
        assert!(!config.is_fractional());
    }

    /// Zero output means bypass for any reference in the window.
    #[test]
    fn zero_output_bypasses(freq_in in FREQ_IN_MIN..=FREQ_IN_MAX) {
        assert_eq!(solve(freq_in, 0), Ok(PllConfig::BYPASS));
    }

    /// References below the window are rejected.
    #[test]
    fn slow_reference_rejected(freq_in in 0u32..FREQ_IN_MIN, freq_out in 0u32..=u32::MAX) {
        assert_eq!(solve(freq_in, freq_out), Err(Error::OutOfRange));
    }

    /// References above the window are rejected.
    #[test]
    fn fast_reference_rejected(
        freq_in in (FREQ_IN_MAX + 1)..=u32::MAX,
        freq_out in 0u32..=u32::MAX,
    ) {
        assert_eq!(solve(freq_in, freq_out), Err(Error::OutOfRange));
    }
}

#[test]
fn audio_clock_table() {
    // (reference, target, R, N, M)
    let table = [
        (12_288_000, 98_304_000, 8, 0, 0),
        (11_289_600, 98_304_000, 8, 104, 147),
        (3_072_000, 98_304_000, 32, 0, 0),
        (2_822_400, 90_316_800, 32, 0, 0),
    ];
    for (freq_in, freq_out, r, n, m) in table {
        let config = solve(freq_in, freq_out).unwrap();
        assert_eq!(
            (config.feedback_integer, config.frac_numerator, config.frac_denominator),
            (r, n, m),
            "{} Hz -> {} Hz",
            freq_in,
            freq_out
        );
    }
}
