//! Tabular PDF reports: rows are laid out as an HTML table and rasterized
//! by a [`PdfRenderer`].

pub mod exports;
pub mod html;
pub mod pdf;

pub use html::{render_html, ReportTable};
pub use pdf::{PdfRenderer, WkhtmltopdfRenderer};

use std::time::Instant;

use chrono::Local;
use tracing::info;

use crate::errors::ServiceError;

/// Render `table` and rasterize it.
pub async fn to_pdf(renderer: &dyn PdfRenderer, institution: &str, table: &ReportTable) -> Result<Vec<u8>, ServiceError> {
    let start = Instant::now();
    let html = render_html(table, institution, Local::now().naive_local());
    let bytes = renderer.render(&html).await?;
    info!(
        report = %table.title,
        rows = table.rows.len(),
        bytes = bytes.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "pdf_generated"
    );
    Ok(bytes)
}

/// `edificios_20240131_1530.pdf`
pub fn file_name(stem: &str) -> String {
    format!("{stem}_{}.pdf", Local::now().format("%Y%m%d_%H%M"))
}
