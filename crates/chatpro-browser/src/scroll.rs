//! Scroll-container detection for the scroll-to-top/bottom shortcuts.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use tracing::debug;

use chatpro_core::{Error, Result};

use crate::page::{css_path, text_content, Page};
use crate::site::SiteConfig;

static OVERFLOW_STYLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"overflow(-y)?\s*:\s*(auto|scroll)").unwrap());

const OVERFLOW_CLASSES: &[&str] = &[
    "overflow-y-auto",
    "overflow-y-scroll",
    "overflow-auto",
    "overflow-scroll",
];

pub trait ScrollStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn locate<'a>(&self, page: &'a Page, site: &SiteConfig) -> Result<Option<ElementRef<'a>>>;
}

/// The element that declares vertical overflow and holds the most text.
pub struct LargestOverflowRegion;

fn declares_overflow(el: ElementRef<'_>) -> bool {
    let element = el.value();
    element.classes().any(|c| OVERFLOW_CLASSES.contains(&c))
        || element
            .attr("style")
            .map(|style| OVERFLOW_STYLE.is_match(style))
            .unwrap_or(false)
}

impl ScrollStrategy for LargestOverflowRegion {
    fn name(&self) -> &'static str {
        "largest-overflow-region"
    }

    fn locate<'a>(&self, page: &'a Page, _site: &SiteConfig) -> Result<Option<ElementRef<'a>>> {
        let mut best: Option<(ElementRef<'a>, usize)> = None;
        for el in page.root().descendants().filter_map(ElementRef::wrap) {
            if !declares_overflow(el) {
                continue;
            }
            let weight = text_content(el).trim().chars().count();
            if weight > 0 && best.map_or(true, |(_, w)| weight > w) {
                best = Some((el, weight));
            }
        }
        Ok(best.map(|(el, _)| el))
    }
}

/// The site's configured scroll container.
pub struct SiteScrollSelector;

impl ScrollStrategy for SiteScrollSelector {
    fn name(&self) -> &'static str {
        "site-selector"
    }

    fn locate<'a>(&self, page: &'a Page, site: &SiteConfig) -> Result<Option<ElementRef<'a>>> {
        page.select_first(site.scroll_container_selector)
    }
}

/// The document element, when the page has a body at all.
pub struct DocumentRoot;

impl ScrollStrategy for DocumentRoot {
    fn name(&self) -> &'static str {
        "document-root"
    }

    fn locate<'a>(&self, page: &'a Page, _site: &SiteConfig) -> Result<Option<ElementRef<'a>>> {
        Ok(page.select_first("body")?.map(|_| page.root()))
    }
}

pub fn scroll_strategies() -> Vec<Box<dyn ScrollStrategy>> {
    vec![
        Box::new(LargestOverflowRegion),
        Box::new(SiteScrollSelector),
        Box::new(DocumentRoot),
    ]
}

/// Where to scroll, addressed by a selector path into the live page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrollContainer {
    pub strategy: &'static str,
    pub path: String,
    #[serde(rename = "isRoot")]
    pub is_root: bool,
}

pub fn locate_scroll_container(page: &Page, site: &SiteConfig) -> Result<ScrollContainer> {
    for strategy in scroll_strategies() {
        if let Some(el) = strategy.locate(page, site)? {
            let is_root = el.id() == page.root().id();
            return Ok(ScrollContainer {
                strategy: strategy.name(),
                path: css_path(el),
                is_root,
            });
        }
        debug!("{}: scroll strategy {} found nothing", site.name, strategy.name());
    }
    Err(Error::NotFound("No scroll container found".into()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Top,
    Bottom,
}

/// A script that smooth-scrolls the container in the live page.
pub fn scroll_script(container: &ScrollContainer, direction: ScrollDirection) -> String {
    let target = if container.is_root {
        "document.scrollingElement || document.documentElement".to_string()
    } else {
        // A JSON string literal is a valid JS string literal.
        format!(
            "document.querySelector({})",
            serde_json::Value::String(container.path.clone())
        )
    };
    let top = match direction {
        ScrollDirection::Top => "0",
        ScrollDirection::Bottom => "el.scrollHeight",
    };
    format!(
        "(el => el && el.scrollTo({{ top: {}, behavior: 'smooth' }}))({});",
        top, target
    )
}
