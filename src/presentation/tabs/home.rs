use crate::domain::models::{LifecycleState, MessageSeverity};
use crate::presentation::app::GyroVolumeApp;
use crate::presentation::components::Components;
use crate::presentation::theme::Palette;
use eframe::egui;

pub fn render(app: &mut GyroVolumeApp, ui: &mut egui::Ui) {
    Components::heading(ui, "BLE Gyro Volume Controller");
    ui.add_space(12.0);

    ui_connection_panel(app, ui);
    ui.add_space(10.0);

    ui_volume_panel(app, ui);
    ui.add_space(10.0);

    ui_sensor_panel(app, ui);
    ui.add_space(10.0);

    ui_log_panel(app, ui);
}

fn ui_connection_panel(app: &mut GyroVolumeApp, ui: &mut egui::Ui) {
    Components::card(ui, "Connection", |ui| {
        let (bg_color, text_color) = match app.dashboard.lifecycle {
            LifecycleState::Connected => (egui::Color32::from_rgb(0, 200, 0), egui::Color32::BLACK),
            LifecycleState::Scanning | LifecycleState::Connecting => {
                (egui::Color32::from_rgb(255, 200, 0), egui::Color32::BLACK)
            }
            LifecycleState::Failed => (egui::Color32::from_rgb(255, 50, 50), egui::Color32::WHITE),
            LifecycleState::Idle | LifecycleState::Disconnected => {
                (egui::Color32::from_gray(100), egui::Color32::WHITE)
            }
        };
        let icon = if app.dashboard.connected_address.is_some() {
            "✔"
        } else {
            "❌"
        };
        Components::status_banner(
            ui,
            &format!("{} {}", icon, app.dashboard.connection_text()),
            bg_color,
            text_color,
        );

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            ui.label(format!("State: {}", app.dashboard.lifecycle));
            if matches!(
                app.dashboard.lifecycle,
                LifecycleState::Scanning | LifecycleState::Connecting
            ) {
                ui.spinner();
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Refresh").clicked() {
                    app.refresh();
                }
            });
        });
    });
}

fn ui_volume_panel(app: &mut GyroVolumeApp, ui: &mut egui::Ui) {
    Components::card(ui, "Windows Volume", |ui| {
        let percent = app.dashboard.volume_percent;
        ui.add(
            egui::ProgressBar::new(f32::from(percent) / 100.0)
                .text(format!("{}%", percent)),
        );
    });
}

fn ui_sensor_panel(app: &mut GyroVolumeApp, ui: &mut egui::Ui) {
    Components::card(ui, "Orientation", |ui| {
        let (roll, pitch, yaw) = app.dashboard.orientation.unwrap_or((0.0, 0.0, 0.0));
        egui::Grid::new("sensor_grid")
            .num_columns(3)
            .spacing([40.0, 8.0])
            .show(ui, |ui| {
                ui.label(format!("Roll: {:.2}", roll));
                ui.label(format!("Pitch: {:.2}", pitch));
                ui.label(format!("Yaw: {:.2}", yaw));
                ui.end_row();
            });
    });
}

fn ui_log_panel(app: &mut GyroVolumeApp, ui: &mut egui::Ui) {
    let palette = Palette::new(app.is_dark_mode);

    Components::card(ui, "Logs", |ui| {
        egui::ScrollArea::vertical()
            .id_salt("log_lines")
            .max_height(220.0)
            .stick_to_bottom(true)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for msg in &app.dashboard.log {
                    let color = match msg.severity {
                        MessageSeverity::Info => palette.fg,
                        MessageSeverity::Success => palette.ok,
                        MessageSeverity::Warning => palette.warn,
                        MessageSeverity::Error => palette.error,
                    };
                    ui.label(egui::RichText::new(&msg.message).color(color).monospace());
                }
            });

        ui.add_space(4.0);
        if ui.button("Clear").clicked() {
            app.dashboard.clear_log();
        }
    });
}
