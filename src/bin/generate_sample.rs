//! Generates synthetic per-station hourly air quality CSVs under `data/`
//! so the dashboard has something to explore out of the box.

use std::f64::consts::PI;
use std::fs;

use chrono::{Datelike, NaiveDate};

const STATIONS: [&str; 6] = [
    "Aotizhongxin",
    "Changping",
    "Dingling",
    "Dongsi",
    "Guanyuan",
    "Tiantan",
];

const HEADER: [&str; 17] = [
    "No", "station", "year", "month", "day", "hour", "PM2.5", "PM10", "SO2", "NO2", "CO", "O3",
    "TEMP", "PRES", "DEWP", "RAIN", "WSPM",
];

/// Box-Muller transform for normally distributed noise.
fn gauss(rng: &mut fastrand::Rng, mean: f64, std_dev: f64) -> f64 {
    let u1 = rng.f64().max(1e-15);
    let u2 = rng.f64();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    mean + std_dev * z
}

/// `NA` with probability `p` (the raw exports have missing samples),
/// otherwise the value to one decimal.
fn maybe_na(rng: &mut fastrand::Rng, value: f64, p: f64) -> String {
    if rng.f64() < p {
        "NA".to_string()
    } else {
        format!("{value:.1}")
    }
}

fn main() {
    let mut rng = fastrand::Rng::with_seed(42);

    fs::create_dir_all("data").expect("Failed to create data directory");

    let start = NaiveDate::from_ymd_opt(2016, 3, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2017, 2, 28).unwrap();

    let mut total_rows = 0u64;
    for (station_no, station) in STATIONS.iter().enumerate() {
        let path = format!("data/{}.csv", station.to_lowercase());
        let mut writer = csv::Writer::from_path(&path).expect("Failed to create station file");
        writer.write_record(HEADER).expect("Failed to write header");

        // Per-station character: dirtier downtown stations, cooler hills.
        let pollution_factor = 0.85 + 0.08 * station_no as f64;
        let temp_offset = -1.5 + 0.5 * station_no as f64;

        let mut row_no = 0u64;
        let mut date = start;
        while date <= end {
            // Seasonal phase: +1 in mid January, -1 in mid July.
            let season = (2.0 * PI * (date.ordinal() as f64 - 15.0) / 365.25).cos();

            for hour in 0..24u32 {
                row_no += 1;
                // Coolest around 03:00, warmest mid-afternoon.
                let diurnal = -(2.0 * PI * (hour as f64 - 15.0) / 24.0).cos();

                let temp = 14.0 - 13.0 * season + 4.5 * diurnal
                    + temp_offset
                    + gauss(&mut rng, 0.0, 2.0);
                let pm25 =
                    (pollution_factor * (60.0 + 45.0 * season) + gauss(&mut rng, 0.0, 18.0)).max(3.0);
                let pm10 = (pm25 * 1.35 + gauss(&mut rng, 0.0, 12.0)).max(5.0);
                let o3 = (12.0 + 3.1 * temp + gauss(&mut rng, 0.0, 16.0)).max(2.0);
                let so2 = (9.0 + 7.0 * season + gauss(&mut rng, 0.0, 3.0)).max(1.0);
                let no2 = (45.0 + 15.0 * season + gauss(&mut rng, 0.0, 10.0)).max(2.0);
                let co = (1100.0 + 600.0 * season + gauss(&mut rng, 0.0, 250.0)).max(100.0);
                let pres = 1013.0 + 9.0 * season + gauss(&mut rng, 0.0, 2.5);
                let dewp = temp - 9.0 + gauss(&mut rng, 0.0, 2.0);
                let rain = if rng.f64() < 0.04 { rng.f64() * 3.0 } else { 0.0 };
                let wspm = gauss(&mut rng, 2.2, 1.1).abs();

                writer
                    .write_record(&[
                        row_no.to_string(),
                        station.to_string(),
                        date.year().to_string(),
                        date.month().to_string(),
                        date.day().to_string(),
                        hour.to_string(),
                        maybe_na(&mut rng, pm25, 0.012),
                        maybe_na(&mut rng, pm10, 0.012),
                        format!("{so2:.1}"),
                        format!("{no2:.1}"),
                        format!("{co:.1}"),
                        maybe_na(&mut rng, o3, 0.012),
                        maybe_na(&mut rng, temp, 0.008),
                        format!("{pres:.1}"),
                        format!("{dewp:.1}"),
                        format!("{rain:.1}"),
                        format!("{wspm:.1}"),
                    ])
                    .expect("Failed to write row");
            }

            date = date.succ_opt().expect("date out of range");
        }

        writer.flush().expect("Failed to flush station file");
        total_rows += row_no;
        println!("Wrote {row_no} rows to {path}");
    }

    println!(
        "Wrote {total_rows} rows across {} stations",
        STATIONS.len()
    );
}
