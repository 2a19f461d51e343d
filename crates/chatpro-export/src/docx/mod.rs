//! Word document export.
//!
//! [`build_document`] produces the document as plain data so its layout can be
//! inspected; [`package::pack`] serializes it into a `.docx` package.

pub mod package;

pub use package::pack;

use chrono::{Local, NaiveDate};
use serde::Serialize;

use chatpro_core::{ChatMessage, Result, Role};

use crate::export_timestamp;

const INFO_COLOR: &str = "666666";
const INFO_BORDER_COLOR: &str = "CCCCCC";
const USER_COLOR: &str = "1a73e8";
const ASSISTANT_COLOR: &str = "0d9488";
const CODE_FONT: &str = "Courier New";
const CODE_SHADING: &str = "F3F4F6";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HeadingLevel {
    Heading1,
}

impl HeadingLevel {
    pub fn style_id(&self) -> &'static str {
        match self {
            HeadingLevel::Heading1 => "Heading1",
        }
    }
}

/// Paragraph spacing in twentieths of a point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Spacing {
    pub before: Option<u32>,
    pub after: Option<u32>,
}

impl Spacing {
    pub fn after(after: u32) -> Self {
        Self {
            before: None,
            after: Some(after),
        }
    }

    pub fn around(before: u32, after: u32) -> Self {
        Self {
            before: Some(before),
            after: Some(after),
        }
    }
}

/// A single-line paragraph border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Border {
    pub color: &'static str,
    /// Eighths of a point.
    pub size: u32,
    /// Points between border and text.
    pub space: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextRun {
    /// May contain `\n`; each becomes a line break within the run.
    pub text: String,
    pub bold: bool,
    /// Half-points.
    pub size: Option<u32>,
    pub color: Option<&'static str>,
    pub font: Option<&'static str>,
}

impl TextRun {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn size(mut self, half_points: u32) -> Self {
        self.size = Some(half_points);
        self
    }

    pub fn color(mut self, color: &'static str) -> Self {
        self.color = Some(color);
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn font(mut self, font: &'static str) -> Self {
        self.font = Some(font);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    pub runs: Vec<TextRun>,
    pub heading: Option<HeadingLevel>,
    pub spacing: Spacing,
    pub bottom_border: Option<Border>,
    /// Background fill color.
    pub shading: Option<&'static str>,
}

impl Paragraph {
    pub fn with_run(run: TextRun) -> Self {
        Self {
            runs: vec![run],
            ..Default::default()
        }
    }

    pub fn spacing(mut self, spacing: Spacing) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn is_code(&self) -> bool {
        self.shading.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub title: String,
    pub paragraphs: Vec<Paragraph>,
}

pub fn build_document(messages: &[ChatMessage], site_name: &str, exported_on: &str) -> Document {
    let mut paragraphs = vec![
        Paragraph {
            heading: Some(HeadingLevel::Heading1),
            ..Paragraph::with_run(TextRun::new(format!("{} Conversation", site_name)))
        }
        .spacing(Spacing::after(200)),
        Paragraph {
            bottom_border: Some(Border {
                color: INFO_BORDER_COLOR,
                size: 6,
                space: 10,
            }),
            ..Paragraph::with_run(
                TextRun::new(format!("Exported on {}", exported_on))
                    .color(INFO_COLOR)
                    .size(22),
            )
        }
        .spacing(Spacing::after(400)),
    ];

    for msg in messages {
        let color = match msg.role {
            Role::User => USER_COLOR,
            Role::Assistant => ASSISTANT_COLOR,
        };
        let label = TextRun::new(msg.role.label(site_name))
            .bold()
            .size(24)
            .color(color);
        paragraphs.push(Paragraph::with_run(label).spacing(Spacing::around(300, 100)));
        push_body(&mut paragraphs, &msg.content);
    }

    Document {
        title: format!("{} Conversation", site_name),
        paragraphs,
    }
}

/// Plain lines become paragraphs; fenced lines are gathered into one shaded
/// code paragraph. A fence left open at the end still emits its lines.
fn push_body(paragraphs: &mut Vec<Paragraph>, content: &str) {
    let mut in_code = false;
    let mut code: Vec<&str> = Vec::new();

    for line in content.split('\n') {
        if line.starts_with("```") {
            if in_code {
                paragraphs.push(code_paragraph(&code));
                code.clear();
            }
            in_code = !in_code;
        } else if in_code {
            code.push(line);
        } else if !line.trim().is_empty() {
            let run = TextRun::new(line).size(24);
            paragraphs.push(Paragraph::with_run(run).spacing(Spacing::after(100)));
        }
    }

    if in_code && !code.is_empty() {
        paragraphs.push(code_paragraph(&code));
    }
}

fn code_paragraph(lines: &[&str]) -> Paragraph {
    Paragraph {
        shading: Some(CODE_SHADING),
        ..Paragraph::with_run(TextRun::new(lines.join("\n")).font(CODE_FONT).size(20))
    }
    .spacing(Spacing::around(100, 100))
}

/// Build and pack in one step, stamped with the current local time.
pub fn render_docx(messages: &[ChatMessage], site_name: &str) -> Result<Vec<u8>> {
    let document = build_document(messages, site_name, &export_timestamp(Local::now()));
    package::pack(&document)
}

pub fn docx_filename(site_name: &str, date: NaiveDate) -> String {
    format!("{}_Export_{}.docx", site_name, date.format("%Y-%m-%d"))
}
