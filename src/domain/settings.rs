use crate::infrastructure::bluetooth::protocol;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_level")]
    pub level: String, // "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_true")]
    pub file_logging_enabled: bool,
    #[serde(default = "default_true")]
    pub console_logging_enabled: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_prefix")]
    pub file_name_prefix: String,
    #[serde(default = "default_true")]
    pub show_file_line: bool,
    #[serde(default = "default_false")]
    pub show_thread_ids: bool,
    #[serde(default = "default_true")]
    pub show_target: bool,
    #[serde(default = "default_true")]
    pub ansi_colors: bool,
    #[serde(default = "default_rotation")]
    pub rotation: String, // "daily", "hourly", "minutely", "never"
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            file_logging_enabled: default_true(),
            console_logging_enabled: default_true(),
            log_dir: default_log_dir(),
            file_name_prefix: default_prefix(),
            show_file_line: default_true(),
            show_thread_ids: default_false(),
            show_target: default_true(),
            ansi_colors: default_true(),
            rotation: default_rotation(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_log_dir() -> String {
    "logs".to_string()
}
fn default_prefix() -> String {
    "gyro_volume_bridge".to_string()
}
fn default_rotation() -> String {
    "daily".to_string()
}

/// BLE identifiers and connection timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BleSettings {
    pub service_uuid: String,
    pub sensor_char_uuid: String,
    pub discovery_window_ms: u64,
    pub subscribe_retry_interval_ms: u64,
    /// `None` retries until the link drops.
    pub subscribe_max_attempts: Option<u32>,
    pub liveness_poll_ms: u64,
    pub auto_reconnect: bool,
    pub reconnect_delay_ms: u64,
}

impl Default for BleSettings {
    fn default() -> Self {
        Self {
            service_uuid: protocol::SERVICE_UUID.to_string(),
            sensor_char_uuid: protocol::SENSOR_CHAR_UUID.to_string(),
            discovery_window_ms: 5000,
            subscribe_retry_interval_ms: 5000,
            subscribe_max_attempts: None,
            liveness_poll_ms: 1000,
            auto_reconnect: false,
            reconnect_delay_ms: 2000,
        }
    }
}

/// Tuning for the volume rate controller and the play/pause gesture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSettings {
    /// Lower bound of the "held level" pitch band (inclusive)
    pub level_pitch_min: f64,
    /// Upper bound of the "held level" pitch band (inclusive)
    pub level_pitch_max: f64,
    pub tilt_deadzone: f64,
    pub rate_factor: f64,
    /// Pitch above which the device counts as tilted forward
    pub gesture_pitch_min: f64,
    pub pitch_delta_threshold: f64,
    pub gesture_cooldown_ms: u64,
    /// Minimum spacing of throttled log lines
    pub log_interval_ms: u64,
    pub enable_volume_control: bool,
    pub enable_gesture: bool,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            level_pitch_min: -1.5,
            level_pitch_max: -0.5,
            tilt_deadzone: 0.2,
            rate_factor: 0.02,
            gesture_pitch_min: -0.7,
            pitch_delta_threshold: 0.1,
            gesture_cooldown_ms: 1000,
            log_interval_ms: 2000,
            enable_volume_control: true,
            enable_gesture: true,
        }
    }
}

impl ControlSettings {
    pub fn gesture_cooldown(&self) -> Duration {
        Duration::from_millis(self.gesture_cooldown_ms)
    }

    pub fn log_interval(&self) -> Duration {
        Duration::from_millis(self.log_interval_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub log_settings: LogSettings,
    #[serde(default)]
    pub ble: BleSettings,
    #[serde(default)]
    pub control: ControlSettings,
    #[serde(default = "default_false")]
    pub is_dark_mode: bool,
}

pub struct SettingsService {
    settings: Settings,
    settings_path: PathBuf,
}

impl SettingsService {
    pub fn new() -> anyhow::Result<Self> {
        let settings_path = Self::get_settings_path()?;
        Ok(Self::from_path(settings_path))
    }

    /// Load settings from `path`, falling back to defaults when the file
    /// is missing or unreadable.
    pub fn from_path(settings_path: PathBuf) -> Self {
        let settings = match Self::load_from_file(&settings_path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::debug!(
                    "Using default settings ({}): {}",
                    settings_path.display(),
                    e
                );
                Settings::default()
            }
        };

        Self {
            settings,
            settings_path,
        }
    }

    fn get_settings_path() -> anyhow::Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        path.push("GyroVolumeBridge");
        fs::create_dir_all(&path)?;
        path.push("settings.json");
        Ok(path)
    }

    fn load_from_file(path: &Path) -> anyhow::Result<Settings> {
        let contents = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&contents)?;
        Ok(settings)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(&self.settings)?;
        fs::write(&self.settings_path, json)?;
        Ok(())
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    pub fn get_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_settings_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "gyro_volume_bridge_{}_{}.json",
            name,
            std::process::id()
        ));
        path
    }

    #[test]
    fn test_defaults_match_control_constants() {
        let control = ControlSettings::default();
        assert_eq!(control.level_pitch_min, -1.5);
        assert_eq!(control.level_pitch_max, -0.5);
        assert_eq!(control.tilt_deadzone, 0.2);
        assert_eq!(control.rate_factor, 0.02);
        assert_eq!(control.gesture_pitch_min, -0.7);
        assert_eq!(control.pitch_delta_threshold, 0.1);
        assert_eq!(control.gesture_cooldown(), Duration::from_secs(1));
        assert_eq!(control.log_interval(), Duration::from_secs(2));

        let ble = BleSettings::default();
        assert_eq!(ble.subscribe_retry_interval_ms, 5000);
        assert_eq!(ble.subscribe_max_attempts, None);
        assert!(!ble.auto_reconnect);
    }

    #[test]
    fn test_ble_defaults_target_gyro_service() {
        let ble = BleSettings::default();
        assert_eq!(ble.service_uuid, protocol::SERVICE_UUID);
        assert_eq!(ble.sensor_char_uuid, protocol::SENSOR_CHAR_UUID);
        assert_eq!(ble.subscribe_retry_interval_ms, 5000);
        assert!(!ble.auto_reconnect);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{ "control": { "rate_factor": 0.05 }, "ble": { "auto_reconnect": true } }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.control.rate_factor, 0.05);
        assert_eq!(settings.control.tilt_deadzone, 0.2);
        assert!(settings.ble.auto_reconnect);
        assert_eq!(settings.ble.service_uuid, BleSettings::default().service_uuid);
        assert_eq!(settings.log_settings, LogSettings::default());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let path = temp_settings_path("missing");
        let _ = fs::remove_file(&path);
        let service = SettingsService::from_path(path);
        assert_eq!(service.get(), &Settings::default());
    }

    #[test]
    fn test_save_and_reload() {
        let path = temp_settings_path("roundtrip");
        let mut service = SettingsService::from_path(path.clone());
        service.get_mut().control.gesture_cooldown_ms = 1500;
        service.get_mut().is_dark_mode = true;
        service.save().unwrap();

        let reloaded = SettingsService::from_path(path.clone());
        assert_eq!(reloaded.get().control.gesture_cooldown_ms, 1500);
        assert!(reloaded.get().is_dark_mode);
        let _ = fs::remove_file(path);
    }
}
