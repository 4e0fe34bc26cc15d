//! Control panel - small native window with the gesture label and the
//! enable/disable toggle
//!
//! Runs on its own thread, mirroring the classic layout: one status label,
//! one toggle button, one exit hint. The thread is daemonic; it is abandoned
//! at process exit rather than joined.

use crate::status::SharedStatus;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Control panel application state
pub struct ControlPanelApp {
    status: Arc<SharedStatus>,
}

impl ControlPanelApp {
    pub fn new(status: Arc<SharedStatus>) -> Self {
        Self { status }
    }
}

impl eframe::App for ControlPanelApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(10.0);
                ui.label(egui::RichText::new(self.status.display_text()).size(18.0));

                ui.add_space(10.0);
                let button_text = if self.status.control_enabled() {
                    "Disable Control"
                } else {
                    "Enable Control"
                };
                if ui
                    .button(egui::RichText::new(button_text).size(14.0))
                    .clicked()
                {
                    self.status.toggle_control();
                }

                ui.add_space(8.0);
                ui.label(
                    egui::RichText::new("Press ESC in the camera window to exit")
                        .size(10.0)
                        .color(egui::Color32::from_gray(150)),
                );
            });
        });

        // Keep the label fresh while the pipeline overwrites it every frame
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

/// Spawn the control panel on its own thread
///
/// Blocks that thread inside the eframe event loop until the window closes;
/// the process does not wait for it on shutdown.
pub fn spawn(status: Arc<SharedStatus>) -> Result<()> {
    std::thread::Builder::new()
        .name("control-panel".to_string())
        .spawn(move || {
            let native_options = eframe::NativeOptions {
                viewport: egui::ViewportBuilder::default()
                    .with_title("AirMouse GW")
                    .with_inner_size([300.0, 140.0])
                    .with_resizable(false),
                ..Default::default()
            };

            if let Err(e) = eframe::run_native(
                "AirMouse GW",
                native_options,
                Box::new(move |_cc| Ok(Box::new(ControlPanelApp::new(status)))),
            ) {
                warn!("Control panel exited with error: {}", e);
            }
        })
        .context("failed to spawn control panel thread")?;

    Ok(())
}
