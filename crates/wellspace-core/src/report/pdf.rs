//! PDF rendering of a laid-out report.

use std::io::BufWriter;
use std::path::{Path, PathBuf};

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rgb,
};

use super::layout::{DrawOp, ReportLayout, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use super::metrics::FontWeight;
use super::{ExportError, ExportResult};

/// Render the layout script to PDF bytes.
pub fn render_pdf(layout: &ReportLayout) -> ExportResult<Vec<u8>> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        &layout.title,
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf(format!("font error: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ExportError::Pdf(format!("font error: {e}")))?;

    for (index, page) in layout.pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_index, layer_index) =
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            doc.get_page(page_index).get_layer(layer_index)
        };

        for op in &page.ops {
            draw(&layer, op, &regular, &bold);
        }
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ExportError::Pdf(format!("save error: {e}")))?;
    let bytes = buf
        .into_inner()
        .map_err(|e| ExportError::Pdf(format!("buffer error: {e}")))?;

    tracing::debug!(pages = layout.page_count(), size = bytes.len(), "PDF rendered");
    Ok(bytes)
}

fn draw(
    layer: &PdfLayerReference,
    op: &DrawOp,
    regular: &IndirectFontRef,
    bold: &IndirectFontRef,
) {
    match op {
        DrawOp::Text(run) => {
            let font = match run.weight {
                FontWeight::Regular => regular,
                FontWeight::Bold => bold,
            };
            layer.use_text(run.text.clone(), run.size_pt, Mm(run.x_mm), Mm(run.y_mm), font);
        }
        DrawOp::Polyline(polyline) => {
            let (r, g, b) = polyline.rgb;
            layer.set_outline_color(Color::Rgb(Rgb::new(
                f32::from(r) / 255.0,
                f32::from(g) / 255.0,
                f32::from(b) / 255.0,
                None,
            )));
            layer.set_outline_thickness(polyline.thickness_pt);
            layer.add_line(Line {
                points: polyline
                    .points
                    .iter()
                    .map(|&(x, y)| (Point::new(Mm(x), Mm(y)), false))
                    .collect(),
                is_closed: false,
            });
        }
    }
}

/// Write exported bytes to `path`, creating parent directories.
pub fn save_pdf(bytes: &[u8], path: &Path) -> ExportResult<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    tracing::info!(path = %path.display(), size = bytes.len(), "Report exported");
    Ok(path.to_path_buf())
}
