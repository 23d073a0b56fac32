use chrono::{DateTime, NaiveDate, NaiveTime};
use eframe::egui::{Color32, RichText, ScrollArea, Ui};
use egui_plot::{Legend, Line, MarkerShape, Plot, PlotPoints, Points};

use crate::data::aggregate::{ScalarMeans, Summary};
use crate::state::AppState;

/// Monthly trend line colour.
const TREND_COLOR: Color32 = Color32::from_rgb(0x2e, 0x86, 0xc1);

// ---------------------------------------------------------------------------
// Dashboard (central panel)
// ---------------------------------------------------------------------------

/// Render the dashboard: metric tiles, the two exploratory charts, and the
/// narrative conclusions.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a data folder to explore air quality  (File → Open data folder…)");
        });
        return;
    };
    let Some(summary) = &state.summary else {
        return;
    };

    let n_selected = state.filters.as_ref().map_or(0, |f| f.stations.len());

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Air Quality Analysis Dashboard");
            ui.label(format!(
                "Showing data from {} of {} monitoring stations",
                n_selected,
                dataset.stations.len()
            ));
            ui.add_space(8.0);

            metric_row(ui, &summary.means);
            ui.separator();

            ui.strong("1. Monthly PM2.5 trend");
            monthly_trend_plot(ui, summary);
            ui.add_space(8.0);

            ui.strong("2. Temperature vs ozone");
            correlation_plot(ui, state, summary);
            ui.weak(format!("{} sampled points", summary.sample_size));
            ui.separator();

            conclusions(ui);
        });
}

// ---------------------------------------------------------------------------
// Metric tiles
// ---------------------------------------------------------------------------

fn metric_row(ui: &mut Ui, means: &ScalarMeans) {
    ui.columns(3, |cols| {
        metric(&mut cols[0], "Average PM2.5", means.pm25, "µg/m³");
        metric(&mut cols[1], "Average ozone (O3)", means.o3, "µg/m³");
        metric(&mut cols[2], "Average temperature", means.temp, "°C");
    });
}

/// One headline figure. An undefined mean (empty view) renders as an
/// explicit "no data" tile.
fn metric(ui: &mut Ui, label: &str, value: Option<f64>, unit: &str) {
    ui.label(label);
    match value {
        Some(v) => ui.label(RichText::new(format!("{v:.2} {unit}")).strong().size(22.0)),
        None => ui.label(RichText::new("no data").weak().size(22.0)),
    };
}

// ---------------------------------------------------------------------------
// Monthly trend chart
// ---------------------------------------------------------------------------

fn monthly_trend_plot(ui: &mut Ui, summary: &Summary) {
    let points: Vec<[f64; 2]> = summary
        .monthly_pm25
        .iter()
        .map(|p| [month_timestamp(p.month), p.mean])
        .collect();

    Plot::new("monthly_trend")
        .height(260.0)
        .y_axis_label("PM2.5 concentration")
        .x_axis_formatter(|mark, _range| format_month(mark.value))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .color(TREND_COLOR)
                    .width(2.0),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(points))
                    .color(TREND_COLOR)
                    .shape(MarkerShape::Circle)
                    .radius(4.0),
            );
        });
}

fn month_timestamp(month: NaiveDate) -> f64 {
    month.and_time(NaiveTime::MIN).and_utc().timestamp() as f64
}

fn format_month(timestamp: f64) -> String {
    DateTime::from_timestamp(timestamp as i64, 0)
        .map(|dt| dt.format("%Y-%m").to_string())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Temperature / ozone correlation chart
// ---------------------------------------------------------------------------

fn correlation_plot(ui: &mut Ui, state: &AppState, summary: &Summary) {
    Plot::new("temp_o3")
        .height(260.0)
        .x_axis_label("Temperature (°C)")
        .y_axis_label("Ozone (O3)")
        .legend(Legend::default())
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (station, pts) in &summary.scatter {
                let c = state.station_colors.color_for(station);
                let translucent = Color32::from_rgba_unmultiplied(c.r(), c.g(), c.b(), 96);
                let plot_points: PlotPoints = pts.iter().map(|&(x, y)| [x, y]).collect();
                plot_ui.points(
                    Points::new(plot_points)
                        .name(station)
                        .color(translucent)
                        .radius(1.5),
                );
            }

            if let Some(line) = regression_line(summary) {
                plot_ui.line(line);
            }
        });
}

/// Regression overlay spanning the sampled temperature range.
fn regression_line(summary: &Summary) -> Option<Line> {
    let (slope, intercept) = summary.fit?;
    let (lo, hi) = summary
        .scatter
        .values()
        .flatten()
        .map(|p| p.0)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
            (lo.min(x), hi.max(x))
        });
    if !(lo.is_finite() && hi.is_finite()) {
        return None;
    }

    let endpoints = vec![[lo, slope * lo + intercept], [hi, slope * hi + intercept]];
    Some(Line::new(PlotPoints::from(endpoints)).color(Color32::RED).width(2.0))
}

// ---------------------------------------------------------------------------
// Conclusions
// ---------------------------------------------------------------------------

fn conclusions(ui: &mut Ui) {
    ui.heading("Conclusions");
    ui.add_space(4.0);

    ui.label(RichText::new("1. Monthly PM2.5 trend").strong());
    ui.label(
        "PM2.5 concentrations follow a marked seasonal pattern: pollution peaks in the \
         winter months (December through February) and drops significantly over the summer. \
         Heating emissions and stagnant winter air are the main drivers.",
    );
    ui.add_space(4.0);

    ui.label(RichText::new("2. Temperature and ozone").strong());
    ui.label(
        "Air temperature and ozone concentration are positively correlated: the regression \
         line rises with temperature, consistent with heat catalysing the photochemical \
         reactions that produce ozone.",
    );
}
