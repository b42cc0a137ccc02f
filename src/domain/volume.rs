//! Volume rate controller
//!
//! Each sample nudges the volume in proportion to how far `roll` is past
//! the deadzone, instead of mapping orientation straight to a level.

use crate::domain::settings::ControlSettings;

/// Whether `pitch` lies in the closed "held level" band.
pub fn is_level(pitch: f64, control: &ControlSettings) -> bool {
    (control.level_pitch_min..=control.level_pitch_max).contains(&pitch)
}

/// Volume change produced by one sample with the given `roll`.
pub fn volume_delta(roll: f64, control: &ControlSettings) -> f64 {
    let deadzone = control.tilt_deadzone;
    if roll < -deadzone {
        -control.rate_factor * (roll.abs() - deadzone)
    } else if roll > deadzone {
        control.rate_factor * (roll - deadzone)
    } else {
        0.0
    }
}

/// Next volume level, always within `[0.0, 1.0]`.
pub fn next_volume(current: f64, roll: f64, control: &ControlSettings) -> f64 {
    (current + volume_delta(roll, control)).clamp(0.0, 1.0)
}

/// Whole percent for display, truncated.
pub fn to_percent(volume: f64) -> u8 {
    (volume.clamp(0.0, 1.0) * 100.0) as u8
}

const LEGACY_MIN_PITCH: f64 = -1.0;
const LEGACY_MAX_PITCH: f64 = 1.0;

/// Direct pitch-to-level mapping from `[-1, 1]` onto `[0, 1]`.
#[deprecated(note = "not used by the control path; volume follows `next_volume`")]
#[allow(dead_code)]
pub fn map_pitch_to_volume(pitch: f64) -> f64 {
    let pitch = pitch.clamp(LEGACY_MIN_PITCH, LEGACY_MAX_PITCH);
    (pitch - LEGACY_MIN_PITCH) / (LEGACY_MAX_PITCH - LEGACY_MIN_PITCH)
}
