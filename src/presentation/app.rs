use crate::domain::models::{AppEvent, LifecycleState, MessageSeverity, StatusMessage};
use crate::domain::settings::SettingsService;
use crate::infrastructure::logging::LoggingGuard;
use crate::infrastructure::worker::ConnectionWorker;
use eframe::egui;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Lines kept in the window log; the oldest go first.
pub const MAX_LOG_LINES: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Home,
    Settings,
}

/// Everything the window shows, rebuilt from [`AppEvent`]s.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub connected_address: Option<String>,
    pub lifecycle: LifecycleState,
    pub orientation: Option<(f64, f64, f64)>,
    pub volume_percent: u8,
    pub log: VecDeque<StatusMessage>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            connected_address: None,
            lifecycle: LifecycleState::Idle,
            orientation: None,
            volume_percent: 0,
            log: VecDeque::new(),
        }
    }
}

impl DashboardState {
    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::ConnectionStatus { address, connected } => {
                self.connected_address = connected.then_some(address);
            }
            AppEvent::Lifecycle(state) => self.lifecycle = state,
            AppEvent::SensorValues { roll, pitch, yaw } => {
                self.orientation = Some((roll, pitch, yaw));
            }
            AppEvent::VolumePercent(percent) => self.volume_percent = percent.min(100),
            AppEvent::LogMessage(msg) => self.push_log(msg),
        }
    }

    pub fn push_log(&mut self, msg: StatusMessage) {
        if self.log.len() == MAX_LOG_LINES {
            self.log.pop_front();
        }
        self.log.push_back(msg);
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    pub fn connection_text(&self) -> String {
        match &self.connected_address {
            Some(address) => format!("BLE: Connected to {}", address),
            None => "BLE: Not connected".to_string(),
        }
    }
}

pub struct GyroVolumeApp {
    pub(crate) settings: Arc<Mutex<SettingsService>>,
    pub(crate) worker: Option<ConnectionWorker>,
    pub(crate) event_rx: mpsc::UnboundedReceiver<AppEvent>,
    pub(crate) dashboard: DashboardState,
    pub(crate) selected_tab: Tab,
    pub(crate) is_dark_mode: bool,
    pub(crate) _logging_guard: Option<LoggingGuard>,
}

impl GyroVolumeApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings_service = SettingsService::new().unwrap_or_else(|e| {
            eprintln!("Failed to load settings, using defaults: {:#}", e);
            SettingsService::from_path(std::env::temp_dir().join("gyro_volume_bridge.json"))
        });

        let logging_guard =
            crate::infrastructure::logging::init_logger(&settings_service.get().log_settings)
                .map_err(|e| eprintln!("Failed to initialize logging: {:#}", e))
                .ok();

        tracing::info!("Starting BLE Gyro Volume Controller");

        let is_dark_mode = settings_service.get().is_dark_mode;
        crate::presentation::theme::configure_theme(&cc.egui_ctx, is_dark_mode);

        let settings = Arc::new(Mutex::new(settings_service));
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let mut dashboard = DashboardState::default();

        let worker = match ConnectionWorker::spawn(settings.clone(), event_tx) {
            Ok(worker) => Some(worker),
            Err(e) => {
                tracing::error!("Failed to start connection thread: {:#}", e);
                dashboard.push_log(StatusMessage::new(
                    format!("Failed to start connection thread: {:#}", e),
                    MessageSeverity::Error,
                ));
                None
            }
        };

        Self {
            settings,
            worker,
            event_rx,
            dashboard,
            selected_tab: Tab::Home,
            is_dark_mode,
            _logging_guard: logging_guard,
        }
    }

    pub(crate) fn refresh(&mut self) {
        if let Some(worker) = &self.worker {
            worker.refresh();
        }
    }

    pub(crate) fn toggle_theme(&mut self, ctx: &egui::Context) {
        self.is_dark_mode = !self.is_dark_mode;
        crate::presentation::theme::configure_theme(ctx, self.is_dark_mode);
        if let Ok(mut settings) = self.settings.lock() {
            settings.get_mut().is_dark_mode = self.is_dark_mode;
            if let Err(e) = settings.save() {
                tracing::warn!("Failed to save theme preference: {:#}", e);
            }
        }
    }
}

impl eframe::App for GyroVolumeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.dashboard.apply(event);
        }

        // Notifications arrive off the UI thread, keep polling for them.
        ctx.request_repaint_after(std::time::Duration::from_millis(50));

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.selectable_value(&mut self.selected_tab, Tab::Home, "Home");
                ui.selectable_value(&mut self.selected_tab, Tab::Settings, "Settings");

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let switch_icon = if self.is_dark_mode {
                        "☀ Light"
                    } else {
                        "🌙 Dark"
                    };
                    if ui.button(switch_icon).clicked() {
                        self.toggle_theme(ctx);
                    }
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.set_max_width(640.0);
                    ui.add_space(12.0);

                    use crate::presentation::tabs;
                    match self.selected_tab {
                        Tab::Home => tabs::home::render(self, ui),
                        Tab::Settings => tabs::settings::render(self, ui),
                    }

                    ui.add_space(24.0);
                });
            });
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Some(mut worker) = self.worker.take() {
            worker.shutdown();
        }
        tracing::info!("Window closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(text: &str) -> AppEvent {
        AppEvent::LogMessage(StatusMessage::new(text, MessageSeverity::Info))
    }

    #[test]
    fn test_connection_events_drive_banner_text() {
        let mut state = DashboardState::default();
        assert_eq!(state.connection_text(), "BLE: Not connected");

        state.apply(AppEvent::ConnectionStatus {
            address: "AA:BB:CC:DD:EE:FF".to_string(),
            connected: true,
        });
        assert_eq!(state.connection_text(), "BLE: Connected to AA:BB:CC:DD:EE:FF");

        state.apply(AppEvent::ConnectionStatus {
            address: "AA:BB:CC:DD:EE:FF".to_string(),
            connected: false,
        });
        assert_eq!(state.connected_address, None);
    }

    #[test]
    fn test_sensor_volume_and_lifecycle_events() {
        let mut state = DashboardState::default();
        state.apply(AppEvent::Lifecycle(LifecycleState::Scanning));
        state.apply(AppEvent::SensorValues {
            roll: 0.7,
            pitch: -1.0,
            yaw: 0.1,
        });
        state.apply(AppEvent::VolumePercent(52));

        assert_eq!(state.lifecycle, LifecycleState::Scanning);
        assert_eq!(state.orientation, Some((0.7, -1.0, 0.1)));
        assert_eq!(state.volume_percent, 52);
    }

    #[test]
    fn test_log_is_capped() {
        let mut state = DashboardState::default();
        for i in 0..MAX_LOG_LINES + 20 {
            state.apply(log(&format!("line {}", i)));
        }

        assert_eq!(state.log.len(), MAX_LOG_LINES);
        assert_eq!(state.log.front().map(|m| m.message.as_str()), Some("line 20"));

        state.clear_log();
        assert!(state.log.is_empty());
    }
}
