//! Sensor Interpreter
//!
//! Turns the orientation stream into actions. Each notification is
//! decoded and run through two independent paths:
//!
//! - **Volume**: while the device is held level, `roll` beyond the
//!   deadzone nudges the system volume up or down.
//! - **Gesture**: while the device is tilted forward, a pitch change
//!   toggles play/pause, limited by a cooldown.
//!
//! The interpreter runs synchronously on the connection task and owns
//! the per-connection [`SessionState`].

use crate::domain::actuators::{KeyActuator, VolumeActuator};
use crate::domain::gestures;
use crate::domain::models::{MessageSeverity, SensorSample};
use crate::domain::sample::decode_payload;
use crate::domain::settings::ControlSettings;
use crate::domain::status::{LogThrottle, StatusSink};
use crate::domain::volume;
use std::time::Instant;
use tracing::{debug, warn};

/// Mutable state of one connection. Recreated on every new link.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub previous_pitch: Option<f64>,
    /// Kept alongside pitch; gesture detection does not read it.
    pub previous_yaw: Option<f64>,
    pub last_gesture_time: Option<Instant>,
    pub volume_disabled_logged: bool,
    /// Set after a failed volume read is reported, until a read succeeds.
    pub volume_read_failure_logged: bool,
}

pub struct SensorInterpreter<V, K, S> {
    pub(crate) volume: V,
    pub(crate) keys: K,
    pub(crate) status: S,
    control: ControlSettings,
    session: SessionState,
    log_throttle: LogThrottle,
}

impl<V, K, S> SensorInterpreter<V, K, S>
where
    V: VolumeActuator,
    K: KeyActuator,
    S: StatusSink,
{
    pub fn new(control: ControlSettings, volume: V, keys: K, status: S) -> Self {
        let log_throttle = LogThrottle::new(control.log_interval());
        Self {
            volume,
            keys,
            status,
            control,
            session: SessionState::default(),
            log_throttle,
        }
    }

    /// Discard the previous session and start a fresh one.
    pub fn begin_session(&mut self) {
        self.session = SessionState::default();
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn update_control(&mut self, control: ControlSettings) {
        self.log_throttle = LogThrottle::new(control.log_interval());
        self.control = control;
    }

    /// Decode and process one raw notification received at `now`.
    ///
    /// A payload that fails to decode is logged once and leaves the
    /// session untouched.
    pub fn handle_notification(&mut self, payload: &[u8], now: Instant) {
        match decode_payload(payload, now) {
            Ok(sample) => self.process(sample),
            Err(e) => {
                self.status
                    .log(&format!("Notification error: {}", e), MessageSeverity::Warning);
            }
        }
    }

    pub fn process(&mut self, sample: SensorSample) {
        self.status
            .update_sensor_values(sample.roll, sample.pitch, sample.yaw);

        if self.control.enable_volume_control {
            self.adjust_volume(&sample);
        }

        if self.control.enable_gesture {
            self.detect_gesture(&sample);
        }

        self.session.previous_pitch = Some(sample.pitch);
        self.session.previous_yaw = Some(sample.yaw);
    }

    fn adjust_volume(&mut self, sample: &SensorSample) {
        if !volume::is_level(sample.pitch, &self.control) {
            if !self.session.volume_disabled_logged {
                self.status.log(
                    "Volume control disabled (device not held level)",
                    MessageSeverity::Info,
                );
                self.session.volume_disabled_logged = true;
            }
            return;
        }
        self.session.volume_disabled_logged = false;

        let current = match self.volume.get_current_volume() {
            Ok(level) => {
                self.session.volume_read_failure_logged = false;
                level
            }
            Err(e) => {
                warn!("Failed to read volume: {}", e);
                if !self.session.volume_read_failure_logged {
                    self.status
                        .log(&format!("Volume read failed: {}", e), MessageSeverity::Warning);
                    self.session.volume_read_failure_logged = true;
                }
                return;
            }
        };

        let new_volume = volume::next_volume(current, sample.roll, &self.control);
        debug!("Volume {:.3} -> {:.3} (roll {:.2})", current, new_volume, sample.roll);

        if let Err(e) = self.volume.set_volume(new_volume) {
            warn!("Failed to set volume: {}", e);
            self.status
                .log(&format!("Volume write failed: {}", e), MessageSeverity::Warning);
            return;
        }

        let percent = volume::to_percent(new_volume);
        self.status.update_volume_percent(percent);
        if self.log_throttle.allow(sample.timestamp) {
            self.status.log(
                &format!(
                    "Volume adjusted: roll={:.2} -> Volume: {}%",
                    sample.roll, percent
                ),
                MessageSeverity::Info,
            );
        }
    }

    fn detect_gesture(&mut self, sample: &SensorSample) {
        if !gestures::should_trigger(&self.session, sample.pitch, sample.timestamp, &self.control)
        {
            return;
        }

        self.session.last_gesture_time = Some(sample.timestamp);
        match self.keys.send_media_play_pause() {
            Ok(()) => self.status.log(
                "Gesture detected: toggling play/pause",
                MessageSeverity::Success,
            ),
            Err(e) => {
                warn!("Failed to send play/pause: {}", e);
                self.status.log(
                    &format!("Gesture detected but play/pause failed: {}", e),
                    MessageSeverity::Warning,
                );
            }
        }
    }
}
