use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Legend, Plot};

use tidy_panda::data::chart::ChartData;

use crate::color::series_colors;

/// Total x-width shared by the bars of one row.
const GROUP_WIDTH: f64 = 0.8;

// ---------------------------------------------------------------------------
// Numeric column bar chart
// ---------------------------------------------------------------------------

/// Render the charted columns as grouped bars, one group per row.
pub fn bar_chart(ui: &mut Ui, id_salt: usize, chart: &ChartData) {
    let n_series = chart.series.len().max(1) as f64;
    let bar_width = GROUP_WIDTH / n_series;
    let colors = series_colors(chart.series.len());

    Plot::new(("bar_chart", id_salt))
        .legend(Legend::default())
        .height(240.0)
        .x_axis_label("Row")
        .allow_scroll(false)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (k, (series, color)) in chart.series.iter().zip(colors).enumerate() {
                // Centre the group on the row index.
                let offset = (k as f64 - (n_series - 1.0) / 2.0) * bar_width;
                let bars: Vec<Bar> = series
                    .points
                    .iter()
                    .map(|&(row, value)| Bar::new(row as f64 + offset, value).width(bar_width))
                    .collect();

                plot_ui.bar_chart(BarChart::new(bars).name(&series.column).color(color));
            }
        });
}
