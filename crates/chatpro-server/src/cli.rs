//! One-shot command-line exports from a saved page.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Local, Utc};
use tracing::info;

use chatpro_browser::{extract_messages, resolve_site, Page};
use chatpro_core::{Error, Result};
use chatpro_export::{
    build_document, docx_filename, export_timestamp, pack, render_printable_html, HtmlOptions,
};
use chatpro_store::PromptStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Printable page opened with the print dialog.
    Pdf,
    Docx,
}

impl ExportFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "pdf" | "html" => Some(ExportFormat::Pdf),
            "docx" | "word" => Some(ExportFormat::Docx),
            _ => None,
        }
    }
}

/// Extract the conversation in `page_file` and write the export into
/// `out_dir`. Returns the written file.
pub fn write_export(
    page_file: &Path,
    hostname: &str,
    format: ExportFormat,
    out_dir: &Path,
    print_delay: Duration,
) -> Result<PathBuf> {
    let html = std::fs::read_to_string(page_file)?;
    let site = resolve_site(hostname);
    let messages = {
        let page = Page::parse(&html);
        extract_messages(&page, site)?.require_messages(site)?
    };

    std::fs::create_dir_all(out_dir)?;
    let date = Utc::now().date_naive();
    let path = match format {
        ExportFormat::Pdf => {
            let name = format!("{}_Export_{}.html", site.name, date.format("%Y-%m-%d"));
            let path = out_dir.join(name);
            let options = HtmlOptions::auto_print(print_delay);
            let page = render_printable_html(&messages, site.name, options);
            std::fs::write(&path, page)?;
            path
        }
        ExportFormat::Docx => {
            let path = out_dir.join(docx_filename(site.name, date));
            let document = build_document(&messages, site.name, &export_timestamp(Local::now()));
            std::fs::write(&path, pack(&document)?)?;
            path
        }
    };

    info!("Exported {} {} messages to {}", messages.len(), site.name, path.display());
    Ok(path)
}

/// One line per saved prompt: id, title and a short preview.
pub fn prompt_listing(prompts: &PromptStore) -> Result<Vec<String>> {
    let lines = prompts
        .list()?
        .into_iter()
        .map(|p| {
            let preview: String = p.content.chars().take(60).collect();
            let preview = preview.replace('\n', " ");
            format!("{}  {}  {}", p.id, p.title, preview)
        })
        .collect();
    Ok(lines)
}

pub fn usage_error(message: &str) -> Error {
    Error::Config(format!("{}. Use 'chatpro help' for usage.", message))
}
