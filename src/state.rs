use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use crate::color::StationColors;
use crate::data::aggregate::{summarize, Summary};
use crate::data::filter::{filtered_indices, init_filter_state, FilterState};
use crate::data::loader::DatasetCache;
use crate::data::model::AirDataset;

/// Directory of per-station CSVs tried first at startup.
pub const DEFAULT_DATA_DIR: &str = "data";
/// Precomputed merged export used when directory discovery fails.
pub const FALLBACK_MERGED_FILE: &str = "main_data.csv";

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Process-lifetime memoization of loaded datasets by directory.
    pub cache: DatasetCache,

    /// Loaded dataset (None until a load succeeds).
    pub dataset: Option<Arc<AirDataset>>,

    /// Station / date-range selections (None until a load succeeds).
    pub filters: Option<FilterState>,

    /// Indices of records passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Aggregation products for the current filtered view (cached).
    pub summary: Option<Summary>,

    /// Station colour assignment for swatches and scatter series.
    pub station_colors: StationColors,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            cache: DatasetCache::default(),
            dataset: None,
            filters: None,
            visible_indices: Vec::new(),
            summary: None,
            station_colors: StationColors::default(),
            status_message: None,
        }
    }
}

impl AppState {
    /// Load (or fetch from the cache) the dataset for `dir` and make it the
    /// active one. A failed load leaves the previous dataset in place and
    /// puts the error in the status line.
    pub fn load_from(&mut self, dir: PathBuf) {
        let result = self
            .cache
            .load(&dir, &PathBuf::from(FALLBACK_MERGED_FILE))
            .with_context(|| format!("loading air quality data from '{}'", dir.display()));

        match result {
            Ok(dataset) => {
                log::info!(
                    "Dataset ready: {} rows, {} stations",
                    dataset.len(),
                    dataset.stations.len()
                );
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load dataset: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a newly loaded dataset, initialise filters and colours.
    pub fn set_dataset(&mut self, dataset: Arc<AirDataset>) {
        self.filters = Some(init_filter_state(&dataset));
        self.station_colors = StationColors::new(&dataset.stations);
        self.visible_indices = (0..dataset.len()).collect();
        self.summary = Some(summarize(&dataset, &self.visible_indices));
        self.dataset = Some(dataset);
        self.status_message = None;
    }

    /// Recompute the filtered view and its summary after a filter change.
    ///
    /// Every interaction triggers a full synchronous recomputation; nothing
    /// incremental, no background work.
    pub fn refilter(&mut self) {
        if let (Some(ds), Some(filters)) = (&self.dataset, &self.filters) {
            self.visible_indices = filtered_indices(ds, filters);
            self.summary = Some(summarize(ds, &self.visible_indices));
        }
    }

    /// Toggle a single station in the filter.
    pub fn toggle_station(&mut self, station: &str) {
        if let Some(filters) = &mut self.filters {
            if !filters.stations.remove(station) {
                filters.stations.insert(station.to_string());
            }
            self.refilter();
        }
    }

    /// Select every station.
    pub fn select_all_stations(&mut self) {
        if let (Some(ds), Some(filters)) = (&self.dataset, &mut self.filters) {
            filters.stations = ds.stations.iter().cloned().collect();
            self.refilter();
        }
    }

    /// Deselect every station. The resulting empty view is valid.
    pub fn select_no_stations(&mut self) {
        if let Some(filters) = &mut self.filters {
            filters.stations.clear();
            self.refilter();
        }
    }
}
