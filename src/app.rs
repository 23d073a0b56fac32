use std::path::PathBuf;

use eframe::egui;

use crate::state::{AppState, DEFAULT_DATA_DIR};
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct AirboardApp {
    pub state: AppState,
}

impl AirboardApp {
    /// Attempt the startup load immediately so the dashboard opens
    /// populated; a failure just leaves the status line set.
    pub fn new() -> Self {
        let mut state = AppState::default();
        state.load_from(PathBuf::from(DEFAULT_DATA_DIR));
        Self { state }
    }
}

impl Default for AirboardApp {
    fn default() -> Self {
        Self::new()
    }
}

impl eframe::App for AirboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: dashboard ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::dashboard(ui, &self.state);
        });
    }
}
