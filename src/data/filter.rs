use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::model::AirDataset;

// ---------------------------------------------------------------------------
// Filter predicate: station subset + inclusive date range
// ---------------------------------------------------------------------------

/// User-selected station subset and inclusive date range.
///
/// An empty station set is valid and yields an empty view. `start_date >
/// end_date` is not rejected either; it simply matches nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub stations: BTreeSet<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Initialise a [`FilterState`] covering the whole dataset: all stations
/// selected, date range spanning every record.
pub fn init_filter_state(dataset: &AirDataset) -> FilterState {
    let (start_date, end_date) = dataset
        .date_range
        .unwrap_or_else(|| (NaiveDate::MIN, NaiveDate::MIN));
    FilterState {
        stations: dataset.stations.iter().cloned().collect(),
        start_date,
        end_date,
    }
}

/// Return indices of records passing both predicates: the record's station
/// is selected and its calendar date lies in `[start_date, end_date]`,
/// boundaries included.
///
/// Pure function of its inputs; the dataset is never mutated.
pub fn filtered_indices(dataset: &AirDataset, filters: &FilterState) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| {
            if !filters.stations.contains(&rec.station) {
                return false;
            }
            let date = rec.date();
            date >= filters.start_date && date <= filters.end_date
        })
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Measurement;

    fn row(station: &str, y: i32, m: u32, d: u32) -> Measurement {
        Measurement {
            station: station.to_string(),
            datetime: NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            pm25: 1.0,
            pm10: 1.0,
            so2: 1.0,
            no2: 1.0,
            co: 1.0,
            o3: 1.0,
            temp: 1.0,
            pres: 1.0,
            dewp: 1.0,
            rain: 0.0,
            wspm: 1.0,
        }
    }

    /// 3 stations x 5 days, 2016-06-01 .. 2016-06-05.
    fn fixture() -> AirDataset {
        let mut records = Vec::new();
        for station in ["Dongsi", "Guanyuan", "Shunyi"] {
            for day in 1..=5 {
                records.push(row(station, 2016, 6, day));
            }
        }
        AirDataset::from_records(records)
    }

    fn state(stations: &[&str], start: (i32, u32, u32), end: (i32, u32, u32)) -> FilterState {
        FilterState {
            stations: stations.iter().map(|s| s.to_string()).collect(),
            start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
        }
    }

    #[test]
    fn init_covers_whole_dataset() {
        let ds = fixture();
        let filters = init_filter_state(&ds);
        assert_eq!(filters.stations.len(), 3);
        assert_eq!(filtered_indices(&ds, &filters).len(), ds.len());
    }

    #[test]
    fn boundary_dates_are_inclusive() {
        let ds = fixture();
        let filters = state(&["Dongsi"], (2016, 6, 2), (2016, 6, 4));
        let idx = filtered_indices(&ds, &filters);

        let days: Vec<u32> = idx
            .iter()
            .map(|&i| chrono::Datelike::day(&ds.records[i].date()))
            .collect();
        // 2016-06-02 and 2016-06-04 are in; 06-01 and 06-05 (one day out
        // on either side) are not.
        assert_eq!(days, vec![2, 3, 4]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let ds = fixture();
        let filters = state(&["Guanyuan", "Shunyi"], (2016, 6, 1), (2016, 6, 3));

        let once = filtered_indices(&ds, &filters);
        // Re-filter the already-filtered rows with the same predicates.
        let twice: Vec<usize> = once
            .iter()
            .copied()
            .filter(|&i| {
                let rec = &ds.records[i];
                filters.stations.contains(&rec.station)
                    && rec.date() >= filters.start_date
                    && rec.date() <= filters.end_date
            })
            .collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_station_set_yields_empty_view() {
        let ds = fixture();
        let filters = state(&[], (2016, 6, 1), (2016, 6, 5));
        assert!(filtered_indices(&ds, &filters).is_empty());
    }

    #[test]
    fn inverted_range_yields_empty_view() {
        let ds = fixture();
        let filters = state(&["Dongsi"], (2016, 6, 5), (2016, 6, 1));
        assert!(filtered_indices(&ds, &filters).is_empty());
    }

    #[test]
    fn rows_keep_their_original_values() {
        let ds = fixture();
        let filters = state(&["Dongsi"], (2016, 6, 1), (2016, 6, 5));
        for i in filtered_indices(&ds, &filters) {
            assert_eq!(ds.records[i].station, "Dongsi");
            assert_eq!(ds.records[i].pm25, 1.0);
        }
    }
}
