//! Status reporting toward the UI
//!
//! The connection thread never touches UI state directly. Everything the
//! window shows is posted as an [`AppEvent`] and drained by the UI loop.

use crate::domain::models::{AppEvent, LifecycleState, MessageSeverity, StatusMessage};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Receiver side of status reporting. Calls must not block.
pub trait StatusSink {
    fn update_connection_status(&self, address: &str, connected: bool);
    fn update_lifecycle_state(&self, state: LifecycleState);
    fn update_sensor_values(&self, roll: f64, pitch: f64, yaw: f64);
    fn update_volume_percent(&self, percent: u8);
    fn log(&self, message: &str, severity: MessageSeverity);
}

/// Status sink that posts events onto the UI channel.
#[derive(Clone)]
pub struct ChannelStatusSink {
    event_sender: mpsc::UnboundedSender<AppEvent>,
}

impl ChannelStatusSink {
    pub fn new(event_sender: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { event_sender }
    }

    fn post(&self, event: AppEvent) {
        // The UI may already be gone during shutdown.
        let _ = self.event_sender.send(event);
    }
}

impl StatusSink for ChannelStatusSink {
    fn update_connection_status(&self, address: &str, connected: bool) {
        self.post(AppEvent::ConnectionStatus {
            address: address.to_string(),
            connected,
        });
    }

    fn update_lifecycle_state(&self, state: LifecycleState) {
        self.post(AppEvent::Lifecycle(state));
    }

    fn update_sensor_values(&self, roll: f64, pitch: f64, yaw: f64) {
        self.post(AppEvent::SensorValues { roll, pitch, yaw });
    }

    fn update_volume_percent(&self, percent: u8) {
        self.post(AppEvent::VolumePercent(percent));
    }

    fn log(&self, message: &str, severity: MessageSeverity) {
        match severity {
            MessageSeverity::Warning => tracing::warn!("{}", message),
            MessageSeverity::Error => tracing::error!("{}", message),
            _ => tracing::info!("{}", message),
        }
        self.post(AppEvent::LogMessage(StatusMessage::new(message, severity)));
    }
}

/// Drops log lines that arrive sooner than `interval` after the last one
/// let through.
#[derive(Debug, Clone)]
pub struct LogThrottle {
    interval: Duration,
    last_emitted: Option<Instant>,
}

impl LogThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_emitted: None,
        }
    }

    /// Returns true when a message at `now` should be emitted, and records it.
    pub fn allow(&mut self, now: Instant) -> bool {
        let ready = self
            .last_emitted
            .map_or(true, |last| now.saturating_duration_since(last) >= self.interval);
        if ready {
            self.last_emitted = Some(now);
        }
        ready
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throttle_spacing() {
        let start = Instant::now();
        let mut throttle = LogThrottle::new(Duration::from_secs(2));
        assert!(throttle.allow(start));
        assert!(!throttle.allow(start + Duration::from_millis(100)));
        assert!(!throttle.allow(start + Duration::from_millis(1999)));
        assert!(throttle.allow(start + Duration::from_secs(2)));
        assert!(!throttle.allow(start + Duration::from_millis(3000)));
        assert!(throttle.allow(start + Duration::from_millis(4500)));
    }

    #[test]
    fn test_channel_sink_posts_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = ChannelStatusSink::new(tx);
        sink.update_connection_status("AA:BB", true);
        sink.update_volume_percent(42);
        sink.log("hello", MessageSeverity::Info);

        assert_eq!(
            rx.try_recv().unwrap(),
            AppEvent::ConnectionStatus {
                address: "AA:BB".to_string(),
                connected: true
            }
        );
        assert_eq!(rx.try_recv().unwrap(), AppEvent::VolumePercent(42));
        assert_eq!(
            rx.try_recv().unwrap(),
            AppEvent::LogMessage(StatusMessage::new("hello", MessageSeverity::Info))
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_channel_sink_survives_closed_receiver() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let sink = ChannelStatusSink::new(tx);
        sink.update_sensor_values(0.0, 0.0, 0.0);
    }
}
