/// Desktop tilt sensor: turns keyboard and gamepad state into
/// acceleration samples for the motion sampler.
///
///   arrow keys / WASD  →  ±key_strength per axis (digital)
///   D-pad              →  same as arrow keys
///   left stick         →  deflection × stick_scale (analog)
///
/// Digital and analog tilt add up, so a stick nudge can refine a held key.

use crossterm::event::KeyCode;

use crate::config::TiltConfig;
use crate::domain::motion::Sample;
use crate::sim::sampler::MotionSource;
use super::gamepad::GamepadState;
use super::input::InputState;

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];

/// Borrowed view of this frame's input devices.
pub struct TiltControls<'a> {
    pub kb: &'a InputState,
    pub gp: &'a GamepadState,
    pub cfg: &'a TiltConfig,
}

impl MotionSource for TiltControls<'_> {
    fn read(&mut self) -> Sample {
        let axis = |neg: &[KeyCode], pos: &[KeyCode]| {
            (self.kb.any_held(pos) as i8) - (self.kb.any_held(neg) as i8)
        };
        let keys = (axis(KEYS_LEFT, KEYS_RIGHT), axis(KEYS_UP, KEYS_DOWN));
        mix(keys, self.gp.dpad(), self.gp.stick(), self.cfg)
    }
}

/// Combine digital directions and analog stick into one sample.
/// Keys and D-pad on the same axis do not stack beyond full strength.
pub fn mix(keys: (i8, i8), dpad: (i8, i8), stick: (f32, f32), cfg: &TiltConfig) -> Sample {
    let digital = |k: i8, d: i8| (k + d).clamp(-1, 1) as f64 * cfg.key_strength;
    Sample::new(
        digital(keys.0, dpad.0) + stick.0 as f64 * cfg.stick_scale,
        digital(keys.1, dpad.1) + stick.1 as f64 * cfg.stick_scale,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use crossterm::event::{KeyEvent, KeyModifiers};

    fn cfg() -> TiltConfig {
        TiltConfig { key_strength: 0.5, stick_scale: 2.0 }
    }

    #[test]
    fn level_device_reads_zero() {
        assert_eq!(mix((0, 0), (0, 0), (0.0, 0.0), &cfg()), Sample::new(0.0, 0.0));
    }

    #[test]
    fn keys_tilt_at_key_strength() {
        assert_eq!(mix((1, -1), (0, 0), (0.0, 0.0), &cfg()), Sample::new(0.5, -0.5));
    }

    #[test]
    fn key_and_dpad_do_not_stack() {
        assert_eq!(mix((1, 0), (1, 0), (0.0, 0.0), &cfg()), Sample::new(0.5, 0.0));
        // opposite directions cancel
        assert_eq!(mix((1, 0), (-1, 0), (0.0, 0.0), &cfg()), Sample::new(0.0, 0.0));
    }

    #[test]
    fn stick_is_scaled_and_added() {
        assert_eq!(mix((0, 1), (0, 0), (0.25, 0.5), &cfg()), Sample::new(0.5, 1.5));
    }

    fn read_with_keys(codes: &[KeyCode]) -> Sample {
        let mut kb = InputState::new();
        let now = Instant::now();
        for &c in codes {
            kb.record(KeyEvent::new(c, KeyModifiers::NONE), now);
        }
        let gp = GamepadState::detached();
        let cfg = cfg();
        TiltControls { kb: &kb, gp: &gp, cfg: &cfg }.read()
    }

    #[test]
    fn up_and_w_tilt_toward_top() {
        assert_eq!(read_with_keys(&[KeyCode::Up]), Sample::new(0.0, -0.5));
        assert_eq!(read_with_keys(&[KeyCode::Char('w')]), Sample::new(0.0, -0.5));
    }

    #[test]
    fn left_and_a_tilt_toward_left() {
        assert_eq!(read_with_keys(&[KeyCode::Left]), Sample::new(-0.5, 0.0));
        assert_eq!(read_with_keys(&[KeyCode::Char('A')]), Sample::new(-0.5, 0.0));
    }

    #[test]
    fn two_keys_tilt_diagonally() {
        assert_eq!(read_with_keys(&[KeyCode::Down, KeyCode::Right]), Sample::new(0.5, 0.5));
        assert_eq!(read_with_keys(&[KeyCode::Left, KeyCode::Right]), Sample::new(0.0, 0.0));
    }

    #[test]
    fn no_input_reads_level() {
        assert_eq!(read_with_keys(&[]), Sample::default());
    }
}
