use chrono::{NaiveDate, NaiveDateTime};

// ---------------------------------------------------------------------------
// NumericField – the fixed set of measured columns
// ---------------------------------------------------------------------------

/// One of the numeric measurement columns shared by every station file.
///
/// Acts as a column registry so imputation and aggregation can iterate all
/// numeric columns uniformly instead of spelling out eleven field accesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericField {
    Pm25,
    Pm10,
    So2,
    No2,
    Co,
    O3,
    Temp,
    Pres,
    Dewp,
    Rain,
    Wspm,
}

/// All numeric columns, in file order.
pub const NUMERIC_FIELDS: [NumericField; 11] = [
    NumericField::Pm25,
    NumericField::Pm10,
    NumericField::So2,
    NumericField::No2,
    NumericField::Co,
    NumericField::O3,
    NumericField::Temp,
    NumericField::Pres,
    NumericField::Dewp,
    NumericField::Rain,
    NumericField::Wspm,
];

impl NumericField {
    /// Column header as it appears in the CSV files.
    pub fn header(self) -> &'static str {
        match self {
            NumericField::Pm25 => "PM2.5",
            NumericField::Pm10 => "PM10",
            NumericField::So2 => "SO2",
            NumericField::No2 => "NO2",
            NumericField::Co => "CO",
            NumericField::O3 => "O3",
            NumericField::Temp => "TEMP",
            NumericField::Pres => "PRES",
            NumericField::Dewp => "DEWP",
            NumericField::Rain => "RAIN",
            NumericField::Wspm => "WSPM",
        }
    }
}

// ---------------------------------------------------------------------------
// Measurement – one row of the unified dataset
// ---------------------------------------------------------------------------

/// A single hourly measurement from one station (one row of the table).
///
/// Numeric values use `NaN` for a missing raw sample; after the loader's
/// fill pass no `NaN` remains in any column that has at least one valid
/// value somewhere in the dataset.
#[derive(Debug, Clone)]
pub struct Measurement {
    pub station: String,
    /// Derived from the raw `year`/`month`/`day`/`hour` columns.
    pub datetime: NaiveDateTime,
    pub pm25: f64,
    pub pm10: f64,
    pub so2: f64,
    pub no2: f64,
    pub co: f64,
    pub o3: f64,
    pub temp: f64,
    pub pres: f64,
    pub dewp: f64,
    pub rain: f64,
    pub wspm: f64,
}

impl Measurement {
    pub fn value(&self, field: NumericField) -> f64 {
        match field {
            NumericField::Pm25 => self.pm25,
            NumericField::Pm10 => self.pm10,
            NumericField::So2 => self.so2,
            NumericField::No2 => self.no2,
            NumericField::Co => self.co,
            NumericField::O3 => self.o3,
            NumericField::Temp => self.temp,
            NumericField::Pres => self.pres,
            NumericField::Dewp => self.dewp,
            NumericField::Rain => self.rain,
            NumericField::Wspm => self.wspm,
        }
    }

    pub fn value_mut(&mut self, field: NumericField) -> &mut f64 {
        match field {
            NumericField::Pm25 => &mut self.pm25,
            NumericField::Pm10 => &mut self.pm10,
            NumericField::So2 => &mut self.so2,
            NumericField::No2 => &mut self.no2,
            NumericField::Co => &mut self.co,
            NumericField::O3 => &mut self.o3,
            NumericField::Temp => &mut self.temp,
            NumericField::Pres => &mut self.pres,
            NumericField::Dewp => &mut self.dewp,
            NumericField::Rain => &mut self.rain,
            NumericField::Wspm => &mut self.wspm,
        }
    }

    /// Calendar date of the measurement, used by the date-range filter.
    pub fn date(&self) -> NaiveDate {
        self.datetime.date()
    }
}

// ---------------------------------------------------------------------------
// AirDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The unified dataset: all stations' rows concatenated, plus indexes
/// computed once at construction.
#[derive(Debug, Clone)]
pub struct AirDataset {
    /// All measurements, in load order (files sorted by name, row order
    /// preserved within a file).
    pub records: Vec<Measurement>,
    /// Sorted unique station identifiers.
    pub stations: Vec<String>,
    /// Min and max calendar date present, `None` for an empty dataset.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

impl AirDataset {
    /// Build the derived indexes from the loaded rows.
    pub fn from_records(records: Vec<Measurement>) -> Self {
        let mut stations: Vec<String> = records.iter().map(|r| r.station.clone()).collect();
        stations.sort();
        stations.dedup();

        let date_range = records
            .iter()
            .map(|r| r.date())
            .fold(None, |acc: Option<(NaiveDate, NaiveDate)>, d| match acc {
                None => Some((d, d)),
                Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
            });

        AirDataset {
            records,
            stations,
            date_range,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(station: &str, y: i32, m: u32, d: u32, h: u32) -> Measurement {
        Measurement {
            station: station.to_string(),
            datetime: NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, 0, 0)
                .unwrap(),
            pm25: 0.0,
            pm10: 0.0,
            so2: 0.0,
            no2: 0.0,
            co: 0.0,
            o3: 0.0,
            temp: 0.0,
            pres: 0.0,
            dewp: 0.0,
            rain: 0.0,
            wspm: 0.0,
        }
    }

    #[test]
    fn station_index_is_sorted_and_unique() {
        let ds = AirDataset::from_records(vec![
            row("Tiantan", 2016, 1, 1, 0),
            row("Changping", 2016, 1, 1, 0),
            row("Tiantan", 2016, 1, 1, 1),
        ]);
        assert_eq!(ds.stations, vec!["Changping", "Tiantan"]);
    }

    #[test]
    fn date_range_spans_min_and_max() {
        let ds = AirDataset::from_records(vec![
            row("A", 2015, 6, 3, 12),
            row("A", 2013, 3, 1, 0),
            row("B", 2017, 2, 28, 23),
        ]);
        assert_eq!(
            ds.date_range,
            Some((
                NaiveDate::from_ymd_opt(2013, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2017, 2, 28).unwrap()
            ))
        );
    }

    #[test]
    fn empty_dataset_has_no_date_range() {
        let ds = AirDataset::from_records(Vec::new());
        assert!(ds.is_empty());
        assert_eq!(ds.date_range, None);
    }
}
