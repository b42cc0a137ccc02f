use std::fmt;
use std::time::Instant;

/// One decoded orientation reading from the peripheral.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSample {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub timestamp: Instant,
}

/// Events flowing from the connection thread to the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    ConnectionStatus { address: String, connected: bool },
    Lifecycle(LifecycleState),
    SensorValues { roll: f64, pitch: f64, yaw: f64 },
    VolumePercent(u8),
    LogMessage(StatusMessage),
}

/// Commands flowing from the UI thread to the connection thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BluetoothCommand {
    /// Tear down whatever is running and start a fresh lifecycle.
    Refresh,
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    Scanning,
    Connecting,
    Connected,
    Disconnected,
    Failed,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Idle => "Idle",
            Self::Scanning => "Scanning",
            Self::Connecting => "Connecting",
            Self::Connected => "Connected",
            Self::Disconnected => "Disconnected",
            Self::Failed => "Failed",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub message: String,
    pub severity: MessageSeverity,
}

impl StatusMessage {
    pub fn new(message: impl Into<String>, severity: MessageSeverity) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSeverity {
    Info,
    Success,
    Warning,
    Error,
}
