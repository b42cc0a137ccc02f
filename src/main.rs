#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod domain;
mod infrastructure;
mod presentation;

use eframe::egui;

fn main() -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([560.0, 720.0])
            .with_title("BLE Gyro Volume Controller"),
        ..Default::default()
    };

    eframe::run_native(
        "BLE Gyro Volume Controller",
        options,
        Box::new(|cc| Ok(Box::new(presentation::app::GyroVolumeApp::new(cc)))),
    )
}
