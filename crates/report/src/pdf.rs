use crate::ReportError;
use chrono::Local;
use printpdf::image_crate::codecs::{jpeg::JpegDecoder, png::PngDecoder};
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfLayerReference,
};
use schema::CountSummary;
use std::fs::File;
use std::io::Cursor;
use std::path::Path;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;

const IMAGE_DPI: f32 = 300.0;
const MM_PER_PX: f32 = 25.4 / IMAGE_DPI;
const PT_TO_MM: f32 = 0.352_778;

// Display sizes: annotated smear at 400x250 pt, chart at 300x200 pt.
const SMEAR_SIZE_PT: (f32, f32) = (400.0, 250.0);
const CHART_SIZE_PT: (f32, f32) = (300.0, 200.0);

const DISCLAIMER: [&str; 2] = [
    "This report is generated using an AI-based system and is intended",
    "for research and educational purposes only.",
];

/// Assemble the report PDF: title, timestamp, annotated image, count table,
/// chart, disclaimer, in that order. Overwrites `pdf_path` and returns the
/// same bytes, so callers can stream exactly what this call rendered.
pub fn render_pdf(
    counts: &CountSummary,
    annotated_jpeg: &[u8],
    chart_path: &Path,
    pdf_path: &Path,
) -> Result<Vec<u8>, ReportError> {
    let (doc, page, layer) = PdfDocument::new(
        "AI Hematology Analysis Report",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let layer = doc.get_page(page).get_layer(layer);

    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    layer.use_text(
        "AI Hematology Analysis Report",
        18.0,
        Mm(MARGIN_MM),
        Mm(275.0),
        &bold,
    );

    let date_str = Local::now().format("%d %b %Y | %H:%M").to_string();
    layer.use_text(
        format!("Generated on: {date_str}"),
        10.0,
        Mm(MARGIN_MM),
        Mm(267.0),
        &regular,
    );

    layer.use_text(
        "Processed Blood Smear Image",
        13.0,
        Mm(MARGIN_MM),
        Mm(257.0),
        &bold,
    );
    let smear = Image::try_from(JpegDecoder::new(Cursor::new(annotated_jpeg))?)?;
    place_image(&layer, smear, SMEAR_SIZE_PT, Mm(MARGIN_MM), Mm(164.0));

    layer.use_text("Detection Summary", 13.0, Mm(MARGIN_MM), Mm(156.0), &bold);
    draw_count_table(&layer, counts, &regular, &bold, 149.0);

    layer.use_text(
        "Cell Distribution Chart",
        13.0,
        Mm(MARGIN_MM),
        Mm(117.0),
        &bold,
    );
    let chart_file = File::open(chart_path)?;
    let chart = Image::try_from(PngDecoder::new(std::io::BufReader::new(chart_file))?)?;
    place_image(&layer, chart, CHART_SIZE_PT, Mm(MARGIN_MM), Mm(42.0));

    for (i, line) in DISCLAIMER.iter().enumerate() {
        layer.use_text(*line, 9.0, Mm(MARGIN_MM), Mm(24.0 - 4.5 * i as f32), &regular);
    }

    let bytes = doc.save_to_bytes()?;
    std::fs::write(pdf_path, &bytes)?;
    Ok(bytes)
}

/// Two-column table, one row per catalog class in summary order.
fn draw_count_table(
    layer: &PdfLayerReference,
    counts: &CountSummary,
    regular: &IndirectFontRef,
    bold: &IndirectFontRef,
    top_mm: f32,
) {
    const ROW_STEP_MM: f32 = 6.5;
    const COUNT_COLUMN_MM: f32 = 90.0;

    layer.use_text("Cell Type", 11.0, Mm(MARGIN_MM), Mm(top_mm), bold);
    layer.use_text("Count", 11.0, Mm(COUNT_COLUMN_MM), Mm(top_mm), bold);

    for (i, (name, count)) in counts.iter().enumerate() {
        let y = top_mm - ROW_STEP_MM * (i + 1) as f32;
        layer.use_text(name, 11.0, Mm(MARGIN_MM), Mm(y), regular);
        layer.use_text(count.to_string(), 11.0, Mm(COUNT_COLUMN_MM), Mm(y), regular);
    }
}

/// Scale a decoded image to the given display size (points) and place its
/// bottom-left corner at (x, y).
fn place_image(
    layer: &PdfLayerReference,
    image: Image,
    display_pt: (f32, f32),
    x: Mm,
    y: Mm,
) {
    let px_w = image.image.width.0.max(1) as f32;
    let px_h = image.image.height.0.max(1) as f32;

    let target_w_mm = display_pt.0 * PT_TO_MM;
    let target_h_mm = display_pt.1 * PT_TO_MM;

    let scale_x = target_w_mm / (px_w * MM_PER_PX);
    let scale_y = target_h_mm / (px_h * MM_PER_PX);

    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(x),
            translate_y: Some(y),
            scale_x: Some(scale_x),
            scale_y: Some(scale_y),
            dpi: Some(IMAGE_DPI),
            ..Default::default()
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_chart;
    use schema::ClassCatalog;

    /// Decode the hex-string `Tj` show-text operators from the uncompressed
    /// content stream, in drawing order.
    fn extract_text(pdf: &[u8]) -> Vec<String> {
        let mut texts = Vec::new();
        let mut i = 0;
        while i < pdf.len() {
            if pdf[i] == b'<' {
                if let Some(end) = pdf[i + 1..].iter().position(|&b| b == b'>') {
                    let inner = &pdf[i + 1..i + 1 + end];
                    let rest = &pdf[i + 2 + end..];
                    if rest.starts_with(b" Tj")
                        && !inner.is_empty()
                        && inner.len() % 2 == 0
                        && inner.iter().all(|b| b.is_ascii_hexdigit())
                    {
                        let decoded: Vec<u8> = inner
                            .chunks(2)
                            .map(|pair| {
                                let hi = (pair[0] as char).to_digit(16).unwrap() as u8;
                                let lo = (pair[1] as char).to_digit(16).unwrap() as u8;
                                hi * 16 + lo
                            })
                            .collect();
                        texts.push(String::from_utf8_lossy(&decoded).into_owned());
                    }
                    i += end + 2;
                    continue;
                }
            }
            i += 1;
        }
        texts
    }

    fn render_sample(counts: &CountSummary, dir: &std::path::Path) -> Vec<u8> {
        let chart_path = dir.join("chart.png");
        let pdf_path = dir.join("blood_report.pdf");
        render_chart(counts, &chart_path).unwrap();

        let image = image::RgbImage::from_pixel(32, 32, image::Rgb([128, 0, 0]));
        let mut jpeg = Cursor::new(Vec::new());
        image.write_to(&mut jpeg, image::ImageFormat::Jpeg).unwrap();

        render_pdf(counts, &jpeg.into_inner(), &chart_path, &pdf_path).unwrap()
    }

    #[test]
    fn pdf_contains_header_and_is_written_once_per_call() {
        let catalog = ClassCatalog::blood_cells();
        let mut counts = CountSummary::zeroed(&catalog);
        counts.record(&catalog, 0).unwrap();
        counts.record(&catalog, 1).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let bytes = render_sample(&counts, dir.path());

        assert_eq!(&bytes[..5], b"%PDF-");
        assert!(bytes.len() > 1000);
        // The returned bytes are exactly what landed on disk.
        assert_eq!(bytes, std::fs::read(dir.path().join("blood_report.pdf")).unwrap());
    }

    #[test]
    fn report_table_rows_match_the_count_summary() {
        let catalog = ClassCatalog::blood_cells();
        let mut counts = CountSummary::zeroed(&catalog);
        for _ in 0..2 {
            counts.record(&catalog, 0).unwrap();
        }
        for _ in 0..5 {
            counts.record(&catalog, 1).unwrap();
        }
        counts.record(&catalog, 2).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let bytes = render_sample(&counts, dir.path());

        let texts = extract_text(&bytes);
        let header = texts
            .iter()
            .position(|t| t == "Cell Type")
            .expect("table header present");
        assert_eq!(
            &texts[header..header + 8],
            &[
                "Cell Type",
                "Count",
                "Platelets",
                "2",
                "RBC",
                "5",
                "WBC",
                "1"
            ]
        );
    }

    #[test]
    fn pdf_text_includes_title_and_disclaimer() {
        let catalog = ClassCatalog::blood_cells();
        let counts = CountSummary::zeroed(&catalog);

        let dir = tempfile::tempdir().unwrap();
        let texts = extract_text(&render_sample(&counts, dir.path()));

        assert!(texts.iter().any(|t| t == "AI Hematology Analysis Report"));
        assert!(texts.iter().any(|t| t.starts_with("Generated on: ")));
        assert!(texts.iter().any(|t| t == DISCLAIMER[1]));
    }
}
