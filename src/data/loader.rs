use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

use super::error::LoadError;
use super::model::{AirDataset, Measurement, NUMERIC_FIELDS};

/// Timestamp format used by the precomputed merged export.
const MERGED_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---------------------------------------------------------------------------
// Raw row structs (serde)
// ---------------------------------------------------------------------------

/// One row of a per-station export. Extra columns (row number, wind
/// direction, ...) are ignored.
#[derive(Debug, Deserialize)]
struct StationRow {
    station: String,
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    #[serde(rename = "PM2.5", deserialize_with = "na_f64")]
    pm25: f64,
    #[serde(rename = "PM10", deserialize_with = "na_f64")]
    pm10: f64,
    #[serde(rename = "SO2", deserialize_with = "na_f64")]
    so2: f64,
    #[serde(rename = "NO2", deserialize_with = "na_f64")]
    no2: f64,
    #[serde(rename = "CO", deserialize_with = "na_f64")]
    co: f64,
    #[serde(rename = "O3", deserialize_with = "na_f64")]
    o3: f64,
    #[serde(rename = "TEMP", deserialize_with = "na_f64")]
    temp: f64,
    #[serde(rename = "PRES", deserialize_with = "na_f64")]
    pres: f64,
    #[serde(rename = "DEWP", deserialize_with = "na_f64")]
    dewp: f64,
    #[serde(rename = "RAIN", deserialize_with = "na_f64")]
    rain: f64,
    #[serde(rename = "WSPM", deserialize_with = "na_f64")]
    wspm: f64,
}

impl StationRow {
    fn into_measurement(self, datetime: NaiveDateTime) -> Measurement {
        Measurement {
            station: self.station,
            datetime,
            pm25: self.pm25,
            pm10: self.pm10,
            so2: self.so2,
            no2: self.no2,
            co: self.co,
            o3: self.o3,
            temp: self.temp,
            pres: self.pres,
            dewp: self.dewp,
            rain: self.rain,
            wspm: self.wspm,
        }
    }
}

/// One row of the merged export, which already carries a `datetime` column.
#[derive(Debug, Deserialize)]
struct MergedRow {
    station: String,
    datetime: String,
    #[serde(rename = "PM2.5", deserialize_with = "na_f64")]
    pm25: f64,
    #[serde(rename = "PM10", deserialize_with = "na_f64")]
    pm10: f64,
    #[serde(rename = "SO2", deserialize_with = "na_f64")]
    so2: f64,
    #[serde(rename = "NO2", deserialize_with = "na_f64")]
    no2: f64,
    #[serde(rename = "CO", deserialize_with = "na_f64")]
    co: f64,
    #[serde(rename = "O3", deserialize_with = "na_f64")]
    o3: f64,
    #[serde(rename = "TEMP", deserialize_with = "na_f64")]
    temp: f64,
    #[serde(rename = "PRES", deserialize_with = "na_f64")]
    pres: f64,
    #[serde(rename = "DEWP", deserialize_with = "na_f64")]
    dewp: f64,
    #[serde(rename = "RAIN", deserialize_with = "na_f64")]
    rain: f64,
    #[serde(rename = "WSPM", deserialize_with = "na_f64")]
    wspm: f64,
}

impl MergedRow {
    fn into_measurement(self, datetime: NaiveDateTime) -> Measurement {
        Measurement {
            station: self.station,
            datetime,
            pm25: self.pm25,
            pm10: self.pm10,
            so2: self.so2,
            no2: self.no2,
            co: self.co,
            o3: self.o3,
            temp: self.temp,
            pres: self.pres,
            dewp: self.dewp,
            rain: self.rain,
            wspm: self.wspm,
        }
    }
}

/// The raw exports mark a missing sample with `NA` or an empty cell; both
/// deserialize to `NaN`. Anything else must parse as a number.
fn na_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let value = raw.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("na") {
        return Ok(f64::NAN);
    }
    value.parse::<f64>().map_err(serde::de::Error::custom)
}

// ---------------------------------------------------------------------------
// Directory loader
// ---------------------------------------------------------------------------

/// Load and clean the unified dataset from a directory of per-station CSVs.
///
/// Files are enumerated in file-name order; all rows are concatenated (no
/// deduplication across stations), a `datetime` is constructed for every
/// row, and missing values are imputed with [`fill_missing`].
pub fn load_dir(dir: &Path) -> Result<AirDataset, LoadError> {
    let entries = fs::read_dir(dir).map_err(|source| LoadError::DataSourceUnavailable {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(LoadError::NoStationFiles {
            path: dir.to_path_buf(),
        });
    }

    let mut records = Vec::new();
    for path in &files {
        read_station_csv(path, &mut records)?;
    }
    fill_missing(&mut records);

    let dataset = AirDataset::from_records(records);
    log::info!(
        "Loaded {} rows from {} station files in '{}'",
        dataset.len(),
        files.len(),
        dir.display()
    );
    Ok(dataset)
}

/// Parse one station file, appending its rows to `out`.
fn read_station_csv(path: &Path, out: &mut Vec<Measurement>) -> Result<(), LoadError> {
    let file = path.display().to_string();

    let mut reader = csv::Reader::from_path(path).map_err(|source| LoadError::Csv {
        file: file.clone(),
        source,
    })?;

    for (row_no, result) in reader.deserialize::<StationRow>().enumerate() {
        let row = result.map_err(|source| LoadError::Csv {
            file: file.clone(),
            source,
        })?;

        let datetime = NaiveDate::from_ymd_opt(row.year, row.month, row.day)
            .and_then(|date| date.and_hms_opt(row.hour, 0, 0))
            .ok_or_else(|| LoadError::MalformedRecord {
                file: file.clone(),
                row: row_no,
                year: row.year,
                month: row.month,
                day: row.day,
                hour: row.hour,
            })?;

        out.push(row.into_measurement(datetime));
    }
    Ok(())
}

/// Two-pass imputation: for each numeric column, carry the last valid value
/// forward in row order, then fill gaps before the first valid value from
/// the next valid one.
///
/// The passes run over the concatenated table, not per station: a leading
/// gap in one station's block takes the previous station's last value.
fn fill_missing(records: &mut [Measurement]) {
    for field in NUMERIC_FIELDS {
        let mut last = f64::NAN;
        for rec in records.iter_mut() {
            let value = rec.value_mut(field);
            if !value.is_nan() {
                last = *value;
            } else if !last.is_nan() {
                *value = last;
            }
        }

        let mut next = f64::NAN;
        for rec in records.iter_mut().rev() {
            let value = rec.value_mut(field);
            if !value.is_nan() {
                next = *value;
            } else if !next.is_nan() {
                *value = next;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Fallback loader
// ---------------------------------------------------------------------------

/// Load the precomputed merged export. The file is assumed to be already
/// cleaned, so no imputation pass runs.
pub fn load_merged(path: &Path) -> Result<AirDataset, LoadError> {
    let file = path.display().to_string();

    let mut reader = csv::Reader::from_path(path).map_err(|source| LoadError::Csv {
        file: file.clone(),
        source,
    })?;

    let mut records = Vec::new();
    for (row_no, result) in reader.deserialize::<MergedRow>().enumerate() {
        let row = result.map_err(|source| LoadError::Csv {
            file: file.clone(),
            source,
        })?;

        let datetime = NaiveDateTime::parse_from_str(&row.datetime, MERGED_DATETIME_FORMAT)
            .map_err(|_| LoadError::MalformedTimestamp {
                file: file.clone(),
                row: row_no,
                value: row.datetime.clone(),
            })?;

        records.push(row.into_measurement(datetime));
    }

    let dataset = AirDataset::from_records(records);
    log::info!("Loaded {} rows from merged file '{}'", dataset.len(), file);
    Ok(dataset)
}

/// Two-step load: try the station directory first; if discovery fails
/// (unreadable directory or no matching files), fall back to the merged
/// export. Malformed rows do not trigger the fallback.
pub fn load_with_fallback(dir: &Path, merged: &Path) -> Result<AirDataset, LoadError> {
    match load_dir(dir) {
        Ok(dataset) => Ok(dataset),
        Err(err) if err.is_recoverable() => {
            log::warn!("{err}; falling back to '{}'", merged.display());
            load_merged(merged)
        }
        Err(err) => Err(err),
    }
}

// ---------------------------------------------------------------------------
// Process-wide memoization
// ---------------------------------------------------------------------------

/// Memoizes loaded datasets by data directory for the lifetime of the
/// process. There is no invalidation: once loaded, a directory's dataset is
/// treated as immutable input (no re-scan on file change).
#[derive(Default)]
pub struct DatasetCache {
    entries: HashMap<PathBuf, Arc<AirDataset>>,
}

impl DatasetCache {
    /// Return the cached dataset for `dir`, loading (with fallback) on the
    /// first request. Failed loads are not cached.
    pub fn load(&mut self, dir: &Path, merged: &Path) -> Result<Arc<AirDataset>, LoadError> {
        if let Some(dataset) = self.entries.get(dir) {
            return Ok(Arc::clone(dataset));
        }
        let dataset = Arc::new(load_with_fallback(dir, merged)?);
        self.entries.insert(dir.to_path_buf(), Arc::clone(&dataset));
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const STATION_HEADER: &str =
        "No,station,year,month,day,hour,PM2.5,PM10,SO2,NO2,CO,O3,TEMP,PRES,DEWP,RAIN,WSPM";
    const MERGED_HEADER: &str =
        "station,datetime,PM2.5,PM10,SO2,NO2,CO,O3,TEMP,PRES,DEWP,RAIN,WSPM";

    fn station_line(station: &str, y: i32, m: u32, d: u32, h: u32, pm25: &str) -> String {
        format!("1,{station},{y},{m},{d},{h},{pm25},50,3,20,300,60,12.5,1012,-5,0,2")
    }

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = fs::File::create(&path).unwrap();
        writeln!(f, "{}", contents.trim()).unwrap();
        path
    }

    #[test]
    fn load_dir_concatenates_all_station_files() {
        let tmp = tempfile::tempdir().unwrap();
        write_file(
            tmp.path(),
            "changping.csv",
            &format!(
                "{STATION_HEADER}\n{}\n{}",
                station_line("Changping", 2016, 3, 1, 0, "10"),
                station_line("Changping", 2016, 3, 1, 1, "20"),
            ),
        );
        write_file(
            tmp.path(),
            "tiantan.csv",
            &format!(
                "{STATION_HEADER}\n{}",
                station_line("Tiantan", 2016, 3, 1, 0, "30"),
            ),
        );

        let ds = load_dir(tmp.path()).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.stations, vec!["Changping", "Tiantan"]);
        assert_eq!(
            ds.records[0].datetime,
            NaiveDate::from_ymd_opt(2016, 3, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn invalid_calendar_date_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        write_file(
            tmp.path(),
            "bad.csv",
            &format!(
                "{STATION_HEADER}\n{}",
                station_line("Gucheng", 2016, 2, 30, 0, "10"),
            ),
        );

        let err = load_dir(tmp.path()).unwrap_err();
        assert!(matches!(err, LoadError::MalformedRecord { day: 30, .. }));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn fill_interior_gap_takes_earlier_value() {
        let tmp = tempfile::tempdir().unwrap();
        write_file(
            tmp.path(),
            "a.csv",
            &format!(
                "{STATION_HEADER}\n{}\n{}\n{}",
                station_line("A", 2016, 1, 1, 0, "10"),
                station_line("A", 2016, 1, 1, 1, "NA"),
                station_line("A", 2016, 1, 1, 2, "40"),
            ),
        );

        let ds = load_dir(tmp.path()).unwrap();
        assert_eq!(ds.records[1].pm25, 10.0);
    }

    #[test]
    fn fill_leading_gap_takes_next_value() {
        let tmp = tempfile::tempdir().unwrap();
        write_file(
            tmp.path(),
            "a.csv",
            &format!(
                "{STATION_HEADER}\n{}\n{}",
                station_line("A", 2016, 1, 1, 0, "NA"),
                station_line("A", 2016, 1, 1, 1, "25"),
            ),
        );

        let ds = load_dir(tmp.path()).unwrap();
        assert_eq!(ds.records[0].pm25, 25.0);
    }

    #[test]
    fn fill_leaks_across_station_boundary() {
        // The fill runs over the concatenated table: station B's leading
        // gap takes station A's last value, not B's own next value.
        let tmp = tempfile::tempdir().unwrap();
        write_file(
            tmp.path(),
            "a.csv",
            &format!(
                "{STATION_HEADER}\n{}",
                station_line("A", 2016, 1, 1, 0, "99"),
            ),
        );
        write_file(
            tmp.path(),
            "b.csv",
            &format!(
                "{STATION_HEADER}\n{}\n{}",
                station_line("B", 2016, 1, 1, 0, "NA"),
                station_line("B", 2016, 1, 1, 1, "7"),
            ),
        );

        let ds = load_dir(tmp.path()).unwrap();
        assert_eq!(ds.records[1].station, "B");
        assert_eq!(ds.records[1].pm25, 99.0);
    }

    #[test]
    fn missing_directory_falls_back_to_merged_file() {
        let tmp = tempfile::tempdir().unwrap();
        let merged = write_file(
            tmp.path(),
            "main_data.csv",
            &format!(
                "{MERGED_HEADER}\nTiantan,2016-03-01 00:00:00,12,50,3,20,300,60,12.5,1012,-5,0,2"
            ),
        );

        let ds = load_with_fallback(&tmp.path().join("no-such-dir"), &merged).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records[0].station, "Tiantan");
        assert_eq!(ds.records[0].pm25, 12.0);
    }

    #[test]
    fn empty_directory_falls_back_to_merged_file() {
        let tmp = tempfile::tempdir().unwrap();
        let data_dir = tmp.path().join("data");
        fs::create_dir(&data_dir).unwrap();
        let merged = write_file(
            tmp.path(),
            "main_data.csv",
            &format!(
                "{MERGED_HEADER}\nWanliu,2014-07-15 06:00:00,33,70,4,25,400,80,25.0,1008,10,0,1"
            ),
        );

        let ds = load_with_fallback(&data_dir, &merged).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(
            ds.records[0].datetime,
            NaiveDate::from_ymd_opt(2014, 7, 15)
                .unwrap()
                .and_hms_opt(6, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn malformed_record_does_not_fall_back() {
        let tmp = tempfile::tempdir().unwrap();
        let data_dir = tmp.path().join("data");
        fs::create_dir(&data_dir).unwrap();
        write_file(
            &data_dir,
            "bad.csv",
            &format!(
                "{STATION_HEADER}\n{}",
                station_line("A", 2016, 13, 1, 0, "10"),
            ),
        );
        let merged = write_file(
            tmp.path(),
            "main_data.csv",
            &format!(
                "{MERGED_HEADER}\nTiantan,2016-03-01 00:00:00,12,50,3,20,300,60,12.5,1012,-5,0,2"
            ),
        );

        let err = load_with_fallback(&data_dir, &merged).unwrap_err();
        assert!(matches!(err, LoadError::MalformedRecord { month: 13, .. }));
    }

    #[test]
    fn merged_file_rejects_bad_timestamp() {
        let tmp = tempfile::tempdir().unwrap();
        let merged = write_file(
            tmp.path(),
            "main_data.csv",
            &format!("{MERGED_HEADER}\nTiantan,not-a-date,12,50,3,20,300,60,12.5,1012,-5,0,2"),
        );

        let err = load_merged(&merged).unwrap_err();
        assert!(matches!(err, LoadError::MalformedTimestamp { .. }));
    }

    #[test]
    fn cache_returns_same_dataset_for_repeated_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let data_dir = tmp.path().join("data");
        fs::create_dir(&data_dir).unwrap();
        write_file(
            &data_dir,
            "a.csv",
            &format!(
                "{STATION_HEADER}\n{}",
                station_line("A", 2016, 1, 1, 0, "10"),
            ),
        );

        let mut cache = DatasetCache::default();
        let merged = tmp.path().join("main_data.csv");
        let first = cache.load(&data_dir, &merged).unwrap();

        // Mutating the directory afterwards must not change the cached view.
        write_file(
            &data_dir,
            "b.csv",
            &format!(
                "{STATION_HEADER}\n{}",
                station_line("B", 2016, 1, 1, 0, "20"),
            ),
        );
        let second = cache.load(&data_dir, &merged).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 1);
    }
}
