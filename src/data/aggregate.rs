use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use super::model::{AirDataset, NumericField};

/// Upper bound on scatter points handed to the correlation chart. Purely a
/// rendering-latency control, not a correctness concern.
pub const MAX_SCATTER_POINTS: usize = 5000;

// ---------------------------------------------------------------------------
// Scalar means
// ---------------------------------------------------------------------------

/// Headline figures for the metric tiles. `None` means the filtered view
/// contributed no values (rendered as "no data", never a numeric fault).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarMeans {
    pub pm25: Option<f64>,
    pub o3: Option<f64>,
    pub temp: Option<f64>,
}

/// Arithmetic mean of `field` over the given rows, ignoring non-finite
/// values.
pub fn mean_of(dataset: &AirDataset, indices: &[usize], field: NumericField) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for &i in indices {
        let v = dataset.records[i].value(field);
        if v.is_finite() {
            sum += v;
            count += 1;
        }
    }
    (count > 0).then(|| sum / count as f64)
}

pub fn scalar_means(dataset: &AirDataset, indices: &[usize]) -> ScalarMeans {
    ScalarMeans {
        pm25: mean_of(dataset, indices, NumericField::Pm25),
        o3: mean_of(dataset, indices, NumericField::O3),
        temp: mean_of(dataset, indices, NumericField::Temp),
    }
}

// ---------------------------------------------------------------------------
// Monthly trend
// ---------------------------------------------------------------------------

/// Mean of one field over one calendar month of the filtered view.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyPoint {
    /// First day of the month.
    pub month: NaiveDate,
    pub mean: f64,
}

/// Group the given rows by calendar month and average `field` per month.
/// Output is chronological, one entry per month present.
pub fn monthly_mean(
    dataset: &AirDataset,
    indices: &[usize],
    field: NumericField,
) -> Vec<MonthlyPoint> {
    let mut buckets: BTreeMap<(i32, u32), (f64, usize)> = BTreeMap::new();
    for &i in indices {
        let rec = &dataset.records[i];
        let v = rec.value(field);
        if !v.is_finite() {
            continue;
        }
        let key = (rec.datetime.year(), rec.datetime.month());
        let bucket = buckets.entry(key).or_insert((0.0, 0));
        bucket.0 += v;
        bucket.1 += 1;
    }

    buckets
        .into_iter()
        .map(|((year, month), (sum, count))| MonthlyPoint {
            month: NaiveDate::from_ymd_opt(year, month, 1).expect("month key from a valid date"),
            mean: sum / count as f64,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Bounded sample + regression
// ---------------------------------------------------------------------------

/// Draw at most [`MAX_SCATTER_POINTS`] row indices uniformly without
/// replacement; the full view when it is smaller. No fixed seed: the sample
/// only shapes a visual approximation.
pub fn bounded_sample(indices: &[usize]) -> Vec<usize> {
    if indices.len() <= MAX_SCATTER_POINTS {
        return indices.to_vec();
    }
    let mut rng = fastrand::Rng::new();
    rng.choose_multiple(indices.iter().copied(), MAX_SCATTER_POINTS)
}

/// Least-squares line through the points, as `(slope, intercept)`.
/// `None` for fewer than two points or zero x-variance.
pub fn linear_fit(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for &(x, y) in points {
        sxx += (x - mean_x) * (x - mean_x);
        sxy += (x - mean_x) * (y - mean_y);
    }
    if sxx == 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    Some((slope, mean_y - slope * mean_x))
}

// ---------------------------------------------------------------------------
// Summary – everything the presentation shell consumes
// ---------------------------------------------------------------------------

/// All aggregation products for the current filtered view, recomputed on
/// every filter interaction and handed to the UI read-only.
#[derive(Debug, Clone)]
pub struct Summary {
    pub means: ScalarMeans,
    /// Monthly PM2.5 trend, chronological.
    pub monthly_pm25: Vec<MonthlyPoint>,
    /// Sampled (TEMP, O3) points for the correlation chart, per station.
    pub scatter: BTreeMap<String, Vec<(f64, f64)>>,
    /// Regression line over the sampled points.
    pub fit: Option<(f64, f64)>,
    /// Number of sampled scatter points.
    pub sample_size: usize,
}

/// Compute the full summary for the given filtered view.
pub fn summarize(dataset: &AirDataset, indices: &[usize]) -> Summary {
    let means = scalar_means(dataset, indices);
    let monthly_pm25 = monthly_mean(dataset, indices, NumericField::Pm25);

    let sampled = bounded_sample(indices);
    let mut scatter: BTreeMap<String, Vec<(f64, f64)>> = BTreeMap::new();
    let mut all_points = Vec::with_capacity(sampled.len());
    for &i in &sampled {
        let rec = &dataset.records[i];
        if !(rec.temp.is_finite() && rec.o3.is_finite()) {
            continue;
        }
        let point = (rec.temp, rec.o3);
        scatter.entry(rec.station.clone()).or_default().push(point);
        all_points.push(point);
    }
    let fit = linear_fit(&all_points);

    Summary {
        means,
        monthly_pm25,
        scatter,
        fit,
        sample_size: all_points.len(),
    }
}
