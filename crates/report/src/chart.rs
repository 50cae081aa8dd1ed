use crate::ReportError;
use plotters::prelude::*;
use plotters::style::register_font;
use schema::CountSummary;
use std::path::Path;
use std::sync::Once;

const CHART_SIZE: (u32, u32) = (400, 300);
const CHART_FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

static FONT_INIT: Once = Once::new();

fn ensure_font() {
    // The pure-Rust text backend has no system font discovery; register the
    // embedded face once under the family name the chart styles use.
    FONT_INIT.call_once(|| {
        let _ = register_font("sans-serif", FontStyle::Normal, CHART_FONT);
    });
}

/// Render the per-class bar chart to `path`, one bar per catalog class,
/// bar height = count. Overwrites any prior chart.
pub fn render_chart(counts: &CountSummary, path: &Path) -> Result<(), ReportError> {
    ensure_font();

    let labels: Vec<&str> = counts.iter().map(|(name, _)| name).collect();
    let y_max = counts.max_count().max(1) + 1;

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(to_chart_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Blood Cell Distribution", ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(28)
        .y_label_area_size(40)
        .build_cartesian_2d(
            (0..counts.len().saturating_sub(1)).into_segmented(),
            0u64..y_max,
        )
        .map_err(to_chart_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc("Count")
        .x_label_formatter(&|segment| match segment {
            SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
                labels.get(*i).copied().unwrap_or_default().to_string()
            }
            SegmentValue::Last => String::new(),
        })
        .draw()
        .map_err(to_chart_err)?;

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(BLUE.filled())
                .margin(12)
                .data(counts.iter().enumerate().map(|(i, (_, count))| (i, count))),
        )
        .map_err(to_chart_err)?;

    root.present().map_err(to_chart_err)?;
    Ok(())
}

fn to_chart_err<E: std::fmt::Display>(err: E) -> ReportError {
    ReportError::Chart(err.to_string())
}
