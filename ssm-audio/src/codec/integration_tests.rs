//! Integration tests driving whole chips through the public control surface.
//!
//! Covers the full power walk, two amplifiers sharing one I2C bus through
//! `embedded-hal-bus`, and one amplifier driven from several threads behind a
//! [`SharedCodec`](crate::shared::SharedCodec).

#[cfg(test)]
mod tests {
    use core::cell::RefCell;
    use std::vec;
    use std::vec::Vec;

    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use embedded_hal_bus::i2c::RefCellDevice;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction};

    use crate::codec::ssm4567::{registers as reg, Ssm4567};
    use crate::control::CodecControl;
    use crate::error::Error;
    use crate::format::{HwParams, Protocol, RawFormatRequest, SampleFormat, StreamDirection};
    use crate::mock::MockBus;
    use crate::power::{PowerState, PowerStateMachine};
    use crate::shared::SharedCodec;

    const LEFT: u8 = reg::I2C_ADDR;
    const RIGHT: u8 = reg::I2C_ADDR + 1;

    // ---------------------------------------------------------------
    // Every pair of levels walks exactly |a - b| adjacent steps
    // ---------------------------------------------------------------
    #[test]
    fn power_walk_covers_every_pair() {
        let levels = [
            PowerState::Off,
            PowerState::Standby,
            PowerState::Prepare,
            PowerState::On,
        ];
        for &from in &levels {
            for &to in &levels {
                let mut machine = PowerStateMachine::new(from);
                let mut steps: Vec<(PowerState, PowerState)> = Vec::new();
                let reached = machine
                    .transition(to, |a, b| {
                        steps.push((a, b));
                        Ok::<(), Error<()>>(())
                    })
                    .unwrap();

                assert_eq!(reached, to);
                assert_eq!(steps.len(), (from as i8 - to as i8).unsigned_abs() as usize);
                for (a, b) in &steps {
                    assert_eq!((*a as i8 - *b as i8).abs(), 1);
                }
                let monotonic = steps.windows(2).all(|w| w[0].1 == w[1].0);
                assert!(monotonic);
            }
        }
    }

    // ---------------------------------------------------------------
    // Stream bring-up and tear-down on one amplifier
    // ---------------------------------------------------------------
    #[test]
    fn stream_lifecycle() {
        let mut amp = Ssm4567::new(MockBus::new());
        amp.probe().unwrap();
        amp.set_fmt(RawFormatRequest::slave(Protocol::Tdm)).unwrap();
        amp.set_tdm_slot(0b0100, 0b0100, 8, 32).unwrap();
        amp.hw_params(&HwParams {
            rate: 48_000,
            format: SampleFormat::S24Le,
            channels: 1,
        })
        .unwrap();
        assert_eq!(amp.set_bias_level(PowerState::On), Ok(PowerState::On));
        amp.mute(StreamDirection::Playback, false).unwrap();

        // Register defaults are only trusted while off.
        assert!(amp.soft_reset().is_err());
        amp.shutdown().unwrap();
        assert_eq!(amp.power_state(), PowerState::Off);

        let bus = amp.release();
        assert_eq!(bus.reg(reg::POWER), 0x01);
        assert_eq!(bus.reg(reg::SAI_CTRL1), reg::SAI_CTRL1_TDM);
        assert_eq!(bus.reg(reg::SAI_CTRL2), 0x0A);
        assert_eq!(bus.writes_to(reg::POWER), vec![0x01, 0x00, 0x01]);
    }

    // ---------------------------------------------------------------
    // Two amplifiers on one I2C bus keep separate caches
    // ---------------------------------------------------------------
    #[test]
    fn two_amplifiers_share_one_bus() {
        let expectations = [
            Transaction::write(LEFT, vec![reg::SOFT_RESET as u8, 0x00]),
            Transaction::write(LEFT, vec![reg::POWER as u8, 0x01]),
            Transaction::write(RIGHT, vec![reg::SOFT_RESET as u8, 0x00]),
            Transaction::write(RIGHT, vec![reg::POWER as u8, 0x01]),
            Transaction::write(LEFT, vec![reg::VOLUME as u8, 0x00]),
            Transaction::write(RIGHT, vec![reg::POWER as u8, 0x00]),
        ];
        let bus = RefCell::new(I2cMock::new(&expectations));

        {
            let mut left = Ssm4567::new_i2c(RefCellDevice::new(&bus), LEFT);
            let mut right = Ssm4567::new_i2c(RefCellDevice::new(&bus), RIGHT);
            left.probe().unwrap();
            right.probe().unwrap();

            left.set_volume(0xFF).unwrap();
            right.set_bias_level(PowerState::Standby).unwrap();

            assert_eq!(left.power_state(), PowerState::Off);
            assert_eq!(right.power_state(), PowerState::Standby);
            assert_eq!(right.registers().cached(reg::VOLUME), Some(0x40));
        }

        bus.into_inner().done();
    }

    // ---------------------------------------------------------------
    // Concurrent read-modify-writes through SharedCodec lose nothing
    // ---------------------------------------------------------------
    #[test]
    fn shared_codec_serializes_threads() {
        let shared: SharedCodec<CriticalSectionRawMutex, Ssm4567<MockBus>> =
            SharedCodec::new(Ssm4567::new(MockBus::new()));

        std::thread::scope(|s| {
            for bit in 0..8u8 {
                let shared = &shared;
                s.spawn(move || {
                    shared.lock(|amp| {
                        let mask = 1 << bit;
                        amp.registers()
                            .update_bits(reg::LIMITER_CTRL3, mask, mask)
                            .unwrap();
                    });
                });
            }
        });

        let mut amp = shared.into_inner();
        assert_eq!(amp.registers().cached(reg::LIMITER_CTRL3), Some(0xFF));
        let bus = amp.release();
        assert_eq!(bus.writes_to(reg::LIMITER_CTRL3).len(), 8);
        assert_eq!(bus.reg(reg::LIMITER_CTRL3), 0xFF);
    }
}
