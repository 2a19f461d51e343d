//! Flatten a message element into plain text with fenced code blocks.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Node, Selector};

use crate::page::text_content;

static CODE: Lazy<Selector> = Lazy::new(|| Selector::parse("code").unwrap());
static LANGUAGE_CLASS: Lazy<Regex> = Lazy::new(|| Regex::new(r"language-([A-Za-z0-9_]+)").unwrap());
static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Text of `el` with every nested `<pre>` rewritten as a fenced block.
///
/// Runs of three or more newlines collapse to two and the result is trimmed.
/// The snapshot itself is never modified.
pub fn extract_content(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(el, &mut out);
    BLANK_RUNS.replace_all(&out, "\n\n").trim().to_string()
}

fn collect_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                if child.value().name() == "pre" {
                    out.push_str(&fence_pre(child));
                } else {
                    collect_text(child, out);
                }
            }
            _ => {}
        }
    }
}

fn fence_pre(pre: ElementRef<'_>) -> String {
    let code = pre.select(&CODE).next();
    let body = code
        .map(text_content)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| text_content(pre));
    let lang = code
        .and_then(|c| c.value().attr("class"))
        .and_then(|class| LANGUAGE_CLASS.captures(class))
        .map(|caps| caps[1].to_string())
        .unwrap_or_default();
    format!("\n```{}\n{}\n```\n", lang, body)
}
