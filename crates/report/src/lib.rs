mod chart;
mod pdf;

pub use chart::render_chart;
pub use pdf::render_pdf;

use schema::CountSummary;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("chart rendering failed: {0}")]
    Chart(String),
    #[error("pdf assembly failed: {0}")]
    Pdf(#[from] printpdf::Error),
    #[error("image embedding failed: {0}")]
    Image(#[from] printpdf::image_crate::ImageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Regenerate the chart and the PDF for the given analysis, overwriting the
/// single-slot output files. Treated as all-or-nothing: a failure in either
/// step fails the whole report. Returns the rendered PDF bytes so callers can
/// serve them without re-reading the shared output file.
pub fn generate_report(
    counts: &CountSummary,
    annotated_jpeg: &[u8],
    chart_path: &Path,
    pdf_path: &Path,
) -> Result<Vec<u8>, ReportError> {
    render_chart(counts, chart_path)?;
    let pdf = render_pdf(counts, annotated_jpeg, chart_path, pdf_path)?;
    tracing::info!(pdf = %pdf_path.display(), "Report generated");
    Ok(pdf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema::ClassCatalog;
    use std::io::Cursor;

    fn sample_counts() -> CountSummary {
        let catalog = ClassCatalog::blood_cells();
        let mut counts = CountSummary::zeroed(&catalog);
        for _ in 0..5 {
            counts.record(&catalog, 1).unwrap();
        }
        counts.record(&catalog, 2).unwrap();
        counts
    }

    fn sample_jpeg() -> Vec<u8> {
        let image = image::RgbImage::from_pixel(64, 48, image::Rgb([180, 40, 40]));
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, image::ImageFormat::Jpeg).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn generate_report_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let chart_path = dir.path().join("chart.png");
        let pdf_path = dir.path().join("blood_report.pdf");

        let returned = generate_report(&sample_counts(), &sample_jpeg(), &chart_path, &pdf_path)
            .unwrap();

        let chart = std::fs::read(&chart_path).unwrap();
        assert_eq!(&chart[..8], b"\x89PNG\r\n\x1a\n");

        let pdf = std::fs::read(&pdf_path).unwrap();
        assert_eq!(&pdf[..5], b"%PDF-");
        assert_eq!(returned, pdf);
    }

    #[test]
    fn regeneration_overwrites_the_previous_report() {
        let dir = tempfile::tempdir().unwrap();
        let chart_path = dir.path().join("chart.png");
        let pdf_path = dir.path().join("blood_report.pdf");
        let counts = sample_counts();
        let jpeg = sample_jpeg();

        generate_report(&counts, &jpeg, &chart_path, &pdf_path).unwrap();
        let first_chart = std::fs::read(&chart_path).unwrap();

        generate_report(&counts, &jpeg, &chart_path, &pdf_path).unwrap();
        let second_chart = std::fs::read(&chart_path).unwrap();

        // Same counts, same cached image: the chart regenerates identically.
        assert_eq!(first_chart, second_chart);
        assert_eq!(&std::fs::read(&pdf_path).unwrap()[..5], b"%PDF-");
    }
}
