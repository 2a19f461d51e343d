//! Prompt insertion into the host page's chat input.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use chatpro_core::{Error, Result};

use crate::page::{text_content, Page};
use crate::site::SiteConfig;

/// The chat input found on the page, with enough state to splice text in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum InputField {
    /// `<textarea>` or `<input>`: value plus selection, in chars.
    #[serde(rename_all = "camelCase")]
    TextControl {
        value: String,
        selection_start: usize,
        selection_end: usize,
    },
    /// A contenteditable editor; without a known caret, text is appended.
    ContentEditable { text: String, caret: Option<usize> },
}

impl InputField {
    pub fn text_control(value: impl Into<String>) -> Self {
        let value = value.into();
        let end = value.chars().count();
        Self::TextControl {
            value,
            selection_start: end,
            selection_end: end,
        }
    }

    pub fn content_editable(text: impl Into<String>) -> Self {
        Self::ContentEditable {
            text: text.into(),
            caret: None,
        }
    }

    /// Replace the selection (or set the caret) before inserting.
    pub fn with_selection(mut self, start: usize, end: usize) -> Self {
        match &mut self {
            Self::TextControl {
                selection_start,
                selection_end,
                ..
            } => {
                *selection_start = start;
                *selection_end = end;
            }
            Self::ContentEditable { caret, .. } => *caret = Some(start),
        }
        self
    }

    pub fn value(&self) -> &str {
        match self {
            Self::TextControl { value, .. } => value,
            Self::ContentEditable { text, .. } => text,
        }
    }

    /// Insert `text` at the cursor, replacing any selected range, and move
    /// the cursor after the inserted text.
    pub fn insert(&mut self, text: &str) {
        let inserted = text.chars().count();
        match self {
            Self::TextControl {
                value,
                selection_start,
                selection_end,
            } => {
                let len = value.chars().count();
                let start = (*selection_start).min(len);
                let end = (*selection_end).clamp(start, len);
                let (head, rest) = value.split_at(byte_offset(value, start));
                let tail = &rest[byte_offset(rest, end - start)..];
                *value = format!("{}{}{}", head, text, tail);
                *selection_start = start + inserted;
                *selection_end = start + inserted;
            }
            Self::ContentEditable { text: current, caret } => match caret {
                Some(at) => {
                    let at_clamped = (*at).min(current.chars().count());
                    current.insert_str(byte_offset(current, at_clamped), text);
                    *at = at_clamped + inserted;
                }
                None => current.push_str(text),
            },
        }
    }
}

fn byte_offset(s: &str, chars: usize) -> usize {
    s.char_indices().nth(chars).map(|(i, _)| i).unwrap_or(s.len())
}

/// Find the site's input, trying the primary selector then the fallback.
pub fn locate_input(page: &Page, site: &SiteConfig) -> Result<Option<InputField>> {
    let target = match page.select_first(site.input_selector)? {
        Some(el) => Some(el),
        None => page.select_first(site.input_fallback_selector)?,
    };
    let Some(el) = target else {
        return Ok(None);
    };

    let element = el.value();
    let field = match element.name() {
        "textarea" => InputField::text_control(text_content(el)),
        "input" => InputField::text_control(element.attr("value").unwrap_or("")),
        _ => InputField::content_editable(text_content(el)),
    };
    Ok(Some(field))
}

pub fn input_not_found_message(site_name: &str) -> String {
    format!(
        "Could not find the chat input field. Please click inside the {} input field first.",
        site_name
    )
}

/// Messages sent from the extension UI to the page script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuntimeMessage {
    InsertPrompt { content: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
}

/// Apply a runtime message to the page, returning the acknowledgement and
/// the input field as it should look afterwards.
pub fn handle_message(
    message: &RuntimeMessage,
    page: &Page,
    site: &SiteConfig,
    selection: Option<(usize, usize)>,
) -> Result<(MessageResponse, InputField)> {
    match message {
        RuntimeMessage::InsertPrompt { content } => {
            let Some(mut field) = locate_input(page, site)? else {
                warn!("{}: could not find prompt input field", site.name);
                return Err(Error::NotFound(input_not_found_message(site.name)));
            };
            if let Some((start, end)) = selection {
                field = field.with_selection(start, end);
            }
            field.insert(content);
            info!("{}: inserted prompt ({} chars)", site.name, content.chars().count());
            Ok((MessageResponse { success: true }, field))
        }
    }
}
