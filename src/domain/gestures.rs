//! Play/pause gesture detection
//!
//! Fires when the device is tilted forward and the pitch moved enough
//! since the previous sample, at most once per cooldown.

use crate::domain::interpreter::SessionState;
use crate::domain::settings::ControlSettings;
use std::time::Instant;

/// Whether `pitch` counts as tilted forward.
pub fn is_tilted_forward(pitch: f64, control: &ControlSettings) -> bool {
    pitch > control.gesture_pitch_min
}

/// Decide whether the sample at `now` triggers the gesture.
///
/// An unset previous pitch counts as a large enough change, and an unset
/// last gesture time satisfies the cooldown.
pub fn should_trigger(
    session: &SessionState,
    pitch: f64,
    now: Instant,
    control: &ControlSettings,
) -> bool {
    if !is_tilted_forward(pitch, control) {
        return false;
    }

    let moved = session
        .previous_pitch
        .map_or(true, |previous| {
            (pitch - previous).abs() > control.pitch_delta_threshold
        });

    let cooled_down = session
        .last_gesture_time
        .map_or(true, |last| {
            now.saturating_duration_since(last) > control.gesture_cooldown()
        });

    moved && cooled_down
}
