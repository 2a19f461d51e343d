//! Parsed page snapshot and DOM query helpers.

use std::collections::HashMap;

use scraper::{ElementRef, Html, Selector};

use chatpro_core::{Error, Result};

/// Immutable snapshot of the host page.
pub struct Page {
    html: Html,
}

impl Page {
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    /// All matches in document order. An empty selector matches nothing.
    pub fn select(&self, selector: &str) -> Result<Vec<ElementRef<'_>>> {
        if selector.trim().is_empty() {
            return Ok(Vec::new());
        }
        let selector = parse_selector(selector)?;
        Ok(self.html.select(&selector).collect())
    }

    pub fn select_first(&self, selector: &str) -> Result<Option<ElementRef<'_>>> {
        if selector.trim().is_empty() {
            return Ok(None);
        }
        let selector = parse_selector(selector)?;
        Ok(self.html.select(&selector).next())
    }

    /// Sort tagged elements by their position in the document (pre-order).
    pub fn sort_by_document_order<'a, T>(&'a self, items: &mut [(ElementRef<'a>, T)]) {
        let order: HashMap<_, usize> = self
            .html
            .tree
            .root()
            .descendants()
            .enumerate()
            .map(|(i, node)| (node.id(), i))
            .collect();
        items.sort_by_key(|(el, _)| order.get(&el.id()).copied().unwrap_or(usize::MAX));
    }
}

pub fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| Error::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Concatenated text of all descendant text nodes.
pub fn text_content(el: ElementRef<'_>) -> String {
    el.text().collect()
}

/// A selector path that addresses `el` from the nearest ancestor with a
/// usable id, or from `html`.
pub fn css_path(el: ElementRef<'_>) -> String {
    let mut segments = Vec::new();
    let mut current = Some(el);

    while let Some(node) = current {
        let element = node.value();
        if let Some(id) = element.id().filter(|id| is_plain_ident(id)) {
            segments.push(format!("#{}", id));
            break;
        }
        let name = element.name();
        let parent = node.parent().and_then(ElementRef::wrap);
        match parent {
            Some(_) => {
                let position = node
                    .prev_siblings()
                    .filter(|sibling| sibling.value().is_element())
                    .count()
                    + 1;
                segments.push(format!("{}:nth-child({})", name, position));
            }
            None => segments.push(name.to_string()),
        }
        current = parent;
    }

    segments.reverse();
    segments.join(" > ")
}

fn is_plain_ident(id: &str) -> bool {
    let mut chars = id.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
