//! Renderers that turn extracted messages into export documents.
//!
//! - [`html`]: a standalone printable page, the source for "Save as PDF"
//! - [`docx`]: an Office Open XML word-processing package
//! - [`print`]: hands a rendered page to the system browser

pub mod docx;
pub mod html;
pub mod print;

use chrono::{DateTime, Local};

pub use docx::{build_document, docx_filename, pack, render_docx, Document, Paragraph, TextRun};
pub use html::{render_printable_html, render_printable_html_at, HtmlOptions};
pub use print::open_for_print;

/// Human-readable export time, e.g. `10/17/2026, 3:04:05 PM`.
pub fn export_timestamp(at: DateTime<Local>) -> String {
    at.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}
