use crate::domain::models::{MessageSeverity, StatusMessage};
use crate::presentation::app::GyroVolumeApp;
use crate::presentation::components::Components;
use eframe::egui;

pub fn render(app: &mut GyroVolumeApp, ui: &mut egui::Ui) {
    Components::heading(ui, "Settings");
    ui.add_space(12.0);

    let mut save_requested = false;
    let mut reset_requested = false;

    if let Ok(mut settings) = app.settings.lock() {
        let settings_mut = settings.get_mut();

        Components::card(ui, "Volume Control", |ui| {
            let control = &mut settings_mut.control;
            ui.checkbox(&mut control.enable_volume_control, "Adjust volume from roll");

            egui::Grid::new("volume_grid")
                .num_columns(2)
                .spacing([20.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Level pitch min:");
                    ui.add(egui::Slider::new(&mut control.level_pitch_min, -3.2..=0.0));
                    ui.end_row();

                    ui.label("Level pitch max:");
                    ui.add(egui::Slider::new(&mut control.level_pitch_max, -3.2..=0.0));
                    ui.end_row();

                    ui.label("Tilt dead zone:");
                    ui.add(egui::Slider::new(&mut control.tilt_deadzone, 0.0..=1.0));
                    ui.end_row();

                    ui.label("Rate factor:");
                    ui.add(
                        egui::Slider::new(&mut control.rate_factor, 0.001..=0.1)
                            .logarithmic(true),
                    );
                    ui.end_row();

                    ui.label("Log interval (ms):");
                    ui.add(egui::Slider::new(&mut control.log_interval_ms, 250..=10_000));
                    ui.end_row();
                });
        });

        ui.add_space(10.0);

        Components::card(ui, "Play/Pause Gesture", |ui| {
            let control = &mut settings_mut.control;
            ui.checkbox(&mut control.enable_gesture, "Tilt forward to play/pause");

            egui::Grid::new("gesture_grid")
                .num_columns(2)
                .spacing([20.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Pitch above:");
                    ui.add(egui::Slider::new(&mut control.gesture_pitch_min, -3.2..=3.2));
                    ui.end_row();

                    ui.label("Pitch change over:");
                    ui.add(egui::Slider::new(&mut control.pitch_delta_threshold, 0.0..=1.0));
                    ui.end_row();

                    ui.label("Cooldown (ms):");
                    ui.add(egui::Slider::new(&mut control.gesture_cooldown_ms, 100..=5_000));
                    ui.end_row();
                });
        });

        ui.add_space(10.0);

        Components::card(ui, "Bluetooth", |ui| {
            let ble = &mut settings_mut.ble;
            ui.checkbox(&mut ble.auto_reconnect, "Reconnect automatically");
            if ble.auto_reconnect {
                ui.indent("reconnect_indent", |ui| {
                    ui.horizontal(|ui| {
                        ui.label("Delay (ms):");
                        ui.add(egui::Slider::new(&mut ble.reconnect_delay_ms, 500..=30_000));
                    });
                });
            }

            ui.horizontal(|ui| {
                ui.label("Scan window (ms):");
                ui.add(egui::Slider::new(&mut ble.discovery_window_ms, 1_000..=30_000));
            });
            ui.horizontal(|ui| {
                ui.label("Subscribe retry (ms):");
                ui.add(egui::Slider::new(
                    &mut ble.subscribe_retry_interval_ms,
                    500..=30_000,
                ));
            });

            ui.collapsing("Override UUIDs", |ui| {
                ui.label(
                    egui::RichText::new("⚠️ The peripheral will not be found with wrong values.")
                        .color(egui::Color32::from_rgb(255, 200, 0)),
                );
                egui::Grid::new("ble_uuids")
                    .spacing([10.0, 10.0])
                    .show(ui, |ui| {
                        ui.label("Service:");
                        ui.text_edit_singleline(&mut ble.service_uuid);
                        ui.end_row();
                        ui.label("Sensor:");
                        ui.text_edit_singleline(&mut ble.sensor_char_uuid);
                        ui.end_row();
                    });
            });
        });

        ui.add_space(10.0);

        Components::card(ui, "Logging", |ui| {
            let log_settings = &mut settings_mut.log_settings;
            ui.horizontal(|ui| {
                ui.label("Verbosity Level:");
                egui::ComboBox::from_id_salt("log_level")
                    .selected_text(&log_settings.level)
                    .show_ui(ui, |ui| {
                        for level in &["trace", "debug", "info", "warn", "error"] {
                            ui.selectable_value(&mut log_settings.level, level.to_string(), *level);
                        }
                    });
            });
            ui.checkbox(&mut log_settings.console_logging_enabled, "Console Logs");
            ui.checkbox(&mut log_settings.file_logging_enabled, "File Logs");
            ui.label(
                egui::RichText::new("Logging changes take effect after restart.")
                    .small()
                    .italics(),
            );
        });

        ui.add_space(10.0);

        ui.horizontal(|ui| {
            if ui.button("Save").clicked() {
                save_requested = true;
            }
            if ui.button("Reset to Defaults").clicked() {
                reset_requested = true;
            }
        });

        if reset_requested {
            let is_dark_mode = settings_mut.is_dark_mode;
            *settings_mut = Default::default();
            settings_mut.is_dark_mode = is_dark_mode;
        }

        if save_requested || reset_requested {
            let msg = match settings.save() {
                Ok(()) => StatusMessage::new(
                    "Settings saved. Press Refresh to apply BLE changes.",
                    MessageSeverity::Success,
                ),
                Err(e) => {
                    StatusMessage::new(format!("Failed to save settings: {:#}", e), MessageSeverity::Error)
                }
            };
            tracing::info!("{}", msg.message);
            app.dashboard.push_log(msg);
        }
    }
}
