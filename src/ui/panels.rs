use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel: date range pickers and the station list.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };
    let Some((mut start, mut end)) = state
        .filters
        .as_ref()
        .map(|f| (f.start_date, f.end_date))
    else {
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Date range ----
            ui.strong("Date range");
            let mut dates_changed = false;
            ui.horizontal(|ui: &mut Ui| {
                ui.label("From");
                dates_changed |= ui
                    .add(DatePickerButton::new(&mut start).id_salt("start_date"))
                    .changed();
            });
            ui.horizontal(|ui: &mut Ui| {
                ui.label("To");
                dates_changed |= ui
                    .add(DatePickerButton::new(&mut end).id_salt("end_date"))
                    .changed();
            });
            if dates_changed {
                if let Some(filters) = state.filters.as_mut() {
                    filters.start_date = start;
                    filters.end_date = end;
                }
                state.refilter();
            }
            ui.separator();

            // ---- Station checkboxes ----
            let n_selected = state.filters.as_ref().map_or(0, |f| f.stations.len());
            let n_total = dataset.stations.len();
            let header_text = format!("Stations  ({n_selected}/{n_total})");

            egui::CollapsingHeader::new(RichText::new(header_text).strong())
                .id_salt("stations")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.select_all_stations();
                        }
                        if ui.small_button("None").clicked() {
                            state.select_no_stations();
                        }
                    });

                    for station in &dataset.stations {
                        let is_selected = state
                            .filters
                            .as_ref()
                            .is_some_and(|f| f.stations.contains(station));

                        let text = RichText::new(station)
                            .color(state.station_colors.color_for(station));

                        let mut checked = is_selected;
                        if ui.checkbox(&mut checked, text).changed() {
                            state.toggle_station(station);
                        }
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open data folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} records loaded, {} in view",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Folder dialog
// ---------------------------------------------------------------------------

pub fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Open data directory")
        .pick_folder();

    if let Some(dir) = folder {
        state.load_from(dir);
    }
}
