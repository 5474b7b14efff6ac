//! Property-based invariants for the pure control primitives.

use proptest::prelude::*;

use greenhouse::app::commands::RemoteCommand;
use greenhouse::control::press::{PressAction, PressClassifier, PressLatch};
use greenhouse::control::state::light_percent_from_raw;
use greenhouse::control::vent::{VentOscillator, VENT_MAX_DEG, VENT_MIN_DEG};
use greenhouse::drivers::servo::{duty_for_angle, SERVO_MAX_DUTY, SERVO_MIN_DUTY};

proptest! {
    // The vent position never leaves its travel range, for step sizes
    // that divide the range evenly and ones that do not.
    #[test]
    fn vent_position_always_in_bounds(
        step in 1i16..=200,
        iterations in 1usize..2000,
    ) {
        let mut osc = VentOscillator::new(step);
        for _ in 0..iterations {
            let pos = osc.advance();
            prop_assert!(i16::from(pos) >= VENT_MIN_DEG);
            prop_assert!(i16::from(pos) <= VENT_MAX_DEG);
        }
    }

    // Hitting a bound always reverses the sweep direction.
    #[test]
    fn vent_reverses_at_bounds(step in 1i16..=200, iterations in 1usize..2000) {
        let mut osc = VentOscillator::new(step);
        for _ in 0..iterations {
            let pos = i16::from(osc.advance());
            if pos == VENT_MAX_DEG {
                prop_assert_eq!(osc.direction(), -1);
            } else if pos == VENT_MIN_DEG {
                prop_assert_eq!(osc.direction(), 1);
            }
        }
    }

    // Press classification is mutually exclusive: any duration below the
    // threshold toggles the motor, any at or above it toggles the mode.
    #[test]
    fn press_classification_is_exclusive(
        pressed_at in 1u32..10_000_000,
        held in 0u32..100_000,
    ) {
        let latch = PressLatch::new();
        let cls = PressClassifier::new(3000);
        latch.record(pressed_at);
        let action = cls.classify(&latch, pressed_at.wrapping_add(held), false);
        if held < 3000 {
            prop_assert_eq!(action, Some(PressAction::ToggleMotor));
        } else {
            prop_assert_eq!(action, Some(PressAction::ToggleMode));
        }
        // Classification always re-arms the latch.
        prop_assert!(latch.is_armed());
    }

    // The latch keeps the first timestamp no matter how many edges follow.
    #[test]
    fn latch_is_first_edge_wins(
        first in 1u32..1_000_000,
        later in proptest::collection::vec(0u32..u32::MAX, 0..20),
    ) {
        let latch = PressLatch::new();
        latch.record(first);
        for t in later {
            latch.record(t);
        }
        prop_assert_eq!(latch.pressed_at(), Some(first.max(1)));
    }

    // Light mapping stays inside 0..=100 % and is monotonically
    // decreasing in the raw value.
    #[test]
    fn light_percent_bounded_and_inverted(raw in 0u16..=4095) {
        let pct = light_percent_from_raw(raw);
        prop_assert!((0.0..=100.0).contains(&pct));
        if raw > 0 {
            prop_assert!(pct <= light_percent_from_raw(raw - 1));
        }
    }

    // The servo duty map never leaves the calibrated interval.
    #[test]
    fn servo_duty_within_calibration(angle in 0u8..=255) {
        let duty = duty_for_angle(angle);
        prop_assert!(duty >= SERVO_MIN_DUTY);
        prop_assert!(duty <= SERVO_MAX_DUTY);
    }

    // The command decoder never panics, whatever the broker delivers.
    #[test]
    fn command_decode_never_panics(payload in proptest::collection::vec(any::<u8>(), 0..256)) {
        let _ = RemoteCommand::decode(&payload);
    }
}
