//! Conversation extraction as an ordered list of named strategies.
//!
//! Each strategy either produces a non-empty message list or reports that it
//! found nothing, in which case the next one is tried. Sites whose markup
//! carries no role information at all fall through to an alternating-role
//! guess, which is reported as [`Confidence::Degraded`].

use std::collections::HashSet;

use scraper::ElementRef;
use serde::Serialize;
use tracing::{debug, warn};

use chatpro_core::{ChatMessage, Error, Result, Role};

use crate::content::extract_content;
use crate::page::{parse_selector, text_content, Page};
use crate::site::{SiteConfig, SiteKind};

/// How far the produced roles can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Roles read from explicit markup.
    Reliable,
    /// Roles guessed from position.
    Degraded,
}

pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn confidence(&self) -> Confidence {
        Confidence::Reliable
    }

    /// `None` when the strategy found no usable message.
    fn extract(&self, page: &Page) -> Result<Option<Vec<ChatMessage>>>;
}

/// Messages tagged by `data-message-author-role`.
pub struct AuthorRoleAttribute;

impl ExtractionStrategy for AuthorRoleAttribute {
    fn name(&self) -> &'static str {
        "author-role"
    }

    fn extract(&self, page: &Page) -> Result<Option<Vec<ChatMessage>>> {
        let messages = page
            .select("[data-message-author-role]")?
            .into_iter()
            .filter_map(|el| {
                let role = el
                    .value()
                    .attr("data-message-author-role")
                    .and_then(Role::from_name)?;
                message_from(el, role)
            })
            .collect();
        Ok(non_empty(messages))
    }
}

/// `article[data-testid]` cards with the role in the test id or a nested marker.
pub struct MessageCards;

impl MessageCards {
    fn classify(card: ElementRef<'_>) -> Result<Option<Role>> {
        let test_id = card.value().attr("data-testid").unwrap_or("");
        for role in [Role::User, Role::Assistant] {
            if test_id.contains(role.name()) || has_role_marker(card, role)? {
                return Ok(Some(role));
            }
        }
        Ok(None)
    }
}

fn has_role_marker(card: ElementRef<'_>, role: Role) -> Result<bool> {
    let marker = parse_selector(&format!(r#"[data-message-author-role="{}"]"#, role.name()))?;
    Ok(card.select(&marker).next().is_some())
}

impl ExtractionStrategy for MessageCards {
    fn name(&self) -> &'static str {
        "message-cards"
    }

    fn extract(&self, page: &Page) -> Result<Option<Vec<ChatMessage>>> {
        let mut messages = Vec::new();
        for card in page.select("article[data-testid]")? {
            if let Some(role) = Self::classify(card)? {
                messages.extend(message_from(card, role));
            }
        }
        Ok(non_empty(messages))
    }
}

/// Separate user and assistant selectors, merged back into document order.
pub struct SplitSelectors {
    pub user: &'static str,
    pub assistant: &'static str,
}

impl SplitSelectors {
    pub fn for_site(site: &SiteConfig) -> Self {
        Self {
            user: site.user_message_selector,
            assistant: site.assistant_message_selector,
        }
    }
}

impl ExtractionStrategy for SplitSelectors {
    fn name(&self) -> &'static str {
        "split-selectors"
    }

    fn extract(&self, page: &Page) -> Result<Option<Vec<ChatMessage>>> {
        let mut tagged: Vec<(ElementRef<'_>, Role)> = Vec::new();
        for el in page.select(self.user)? {
            tagged.push((el, Role::User));
        }
        for el in page.select(self.assistant)? {
            if !tagged.iter().any(|(seen, _)| seen.id() == el.id()) {
                tagged.push((el, Role::Assistant));
            }
        }

        // Nested matches belong to the outermost tagged element.
        let ids: HashSet<_> = tagged.iter().map(|(el, _)| el.id()).collect();
        tagged.retain(|(el, _)| !el.ancestors().any(|node| ids.contains(&node.id())));

        // The union of two queries is not chronological.
        page.sort_by_document_order(&mut tagged);

        let messages = tagged
            .into_iter()
            .filter_map(|(el, role)| message_from(el, role))
            .collect();
        Ok(non_empty(messages))
    }
}

/// Last resort: repeated "group" blocks with alternating roles.
///
/// Nothing in the markup says who wrote what; the first block is assumed to
/// be the user's and roles alternate from there.
pub struct AlternatingGroups;

const MIN_GROUP_TEXT: usize = 10;

impl ExtractionStrategy for AlternatingGroups {
    fn name(&self) -> &'static str {
        "alternating-groups"
    }

    fn confidence(&self) -> Confidence {
        Confidence::Degraded
    }

    fn extract(&self, page: &Page) -> Result<Option<Vec<ChatMessage>>> {
        let container = match page.select_first(r#"main [class*="react-scroll-to-bottom"]"#)? {
            Some(el) => Some(el),
            None => page.select_first("main")?,
        };
        let Some(container) = container else {
            return Ok(None);
        };

        let group = parse_selector(r#"[class*="group"]"#)?;
        let mut role = Role::User;
        let mut messages = Vec::new();
        for el in container.select(&group) {
            let text = text_content(el).trim().to_string();
            if text.chars().count() > MIN_GROUP_TEXT {
                messages.push(ChatMessage::new(role, text));
                role = role.flip();
            }
        }
        Ok(non_empty(messages))
    }
}

fn message_from(el: ElementRef<'_>, role: Role) -> Option<ChatMessage> {
    let content = extract_content(el);
    (!content.is_empty()).then(|| ChatMessage::new(role, content))
}

fn non_empty(messages: Vec<ChatMessage>) -> Option<Vec<ChatMessage>> {
    (!messages.is_empty()).then_some(messages)
}

/// Strategy chain for a site, most trustworthy first.
pub fn strategies_for(site: &SiteConfig) -> Vec<Box<dyn ExtractionStrategy>> {
    match site.kind {
        SiteKind::ChatGPT => vec![
            Box::new(AuthorRoleAttribute),
            Box::new(MessageCards),
            Box::new(AlternatingGroups),
        ],
        SiteKind::Claude => vec![Box::new(SplitSelectors::for_site(site))],
        SiteKind::Gemini => vec![
            Box::new(SplitSelectors::for_site(site)),
            Box::new(AuthorRoleAttribute),
        ],
        SiteKind::Unknown => vec![Box::new(AuthorRoleAttribute), Box::new(MessageCards)],
    }
}

/// Messages found on a page, with the strategy that found them.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub site: SiteKind,
    pub strategy: Option<&'static str>,
    pub confidence: Confidence,
    pub messages: Vec<ChatMessage>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn is_degraded(&self) -> bool {
        self.confidence == Confidence::Degraded
    }

    /// The messages, or the user-facing "nothing to export" error.
    pub fn require_messages(self, site: &SiteConfig) -> Result<Vec<ChatMessage>> {
        if self.messages.is_empty() {
            return Err(Error::NotFound(no_conversation_message(site.name)));
        }
        Ok(self.messages)
    }
}

pub fn no_conversation_message(site_name: &str) -> String {
    format!(
        "No conversation found to export. Make sure you have an active {} conversation on the page.",
        site_name
    )
}

/// Run the site's strategy chain. An empty result is not an error.
pub fn extract_messages(page: &Page, site: &SiteConfig) -> Result<Extraction> {
    for strategy in strategies_for(site) {
        match strategy.extract(page)? {
            Some(messages) => {
                if strategy.confidence() == Confidence::Degraded {
                    warn!(
                        "{}: roles guessed by {} for {} messages",
                        site.name,
                        strategy.name(),
                        messages.len()
                    );
                }
                return Ok(Extraction {
                    site: site.kind,
                    strategy: Some(strategy.name()),
                    confidence: strategy.confidence(),
                    messages,
                });
            }
            None => debug!("{}: strategy {} found nothing", site.name, strategy.name()),
        }
    }

    Ok(Extraction {
        site: site.kind,
        strategy: None,
        confidence: Confidence::Reliable,
        messages: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::resolve_site;

    fn extract(hostname: &str, html: &str) -> Extraction {
        let page = Page::parse(html);
        extract_messages(&page, resolve_site(hostname)).unwrap()
    }

    #[test]
    fn test_author_role_in_document_order() {
        let html = r#"<main>
            <div data-message-author-role="user"><p>What is Rust?</p></div>
            <div data-message-author-role="assistant"><p>A systems language.</p></div>
            <div data-message-author-role="system"><p>hidden</p></div>
            <div data-message-author-role="user"><p>Thanks</p></div>
        </main>"#;
        let result = extract("chatgpt.com", html);
        assert_eq!(result.strategy, Some("author-role"));
        assert!(!result.is_degraded());
        assert_eq!(
            result.messages,
            vec![
                ChatMessage::user("What is Rust?"),
                ChatMessage::assistant("A systems language."),
                ChatMessage::user("Thanks"),
            ]
        );
    }

    #[test]
    fn test_empty_messages_dropped() {
        let html = r#"<div data-message-author-role="user">  </div>
            <div data-message-author-role="assistant">Hi</div>"#;
        let result = extract("chatgpt.com", html);
        assert_eq!(result.messages, vec![ChatMessage::assistant("Hi")]);
    }

    #[test]
    fn test_message_cards_fallback() {
        let html = r#"<main>
            <article data-testid="conversation-turn-1"><p>unclassified</p></article>
            <article data-testid="user-turn"><p>Question here</p></article>
            <article data-testid="conversation-turn-3"><p>Answer</p></article>
        </main>"#;
        let result = extract("chatgpt.com", html);
        assert_eq!(result.strategy, Some("message-cards"));
        assert_eq!(result.messages, vec![ChatMessage::user("Question here")]);
    }

    #[test]
    fn test_message_cards_nested_marker() {
        // Cards whose markers sit on non-message nodes: the attribute path is
        // empty because the markers carry no text.
        let html = r#"<main>
            <article data-testid="conversation-turn-1"><span data-message-author-role="user"></span><p>Hello</p></article>
            <article data-testid="conversation-turn-2"><span data-message-author-role="assistant"></span><p>Hi!</p></article>
        </main>"#;
        let result = extract("chatgpt.com", html);
        assert_eq!(result.strategy, Some("message-cards"));
        assert_eq!(
            result.messages,
            vec![ChatMessage::user("Hello"), ChatMessage::assistant("Hi!")]
        );
    }

    #[test]
    fn test_alternating_groups_is_degraded() {
        let html = r#"<main><div class="react-scroll-to-bottom--css">
            <div class="group w-full">How do I sort a vector?</div>
            <div class="group w-full">short</div>
            <div class="group w-full">Call sort() on it, or sort_by.</div>
        </div></main>"#;
        let result = extract("chatgpt.com", html);
        assert_eq!(result.strategy, Some("alternating-groups"));
        assert!(result.is_degraded());
        assert_eq!(
            result.messages,
            vec![
                ChatMessage::user("How do I sort a vector?"),
                ChatMessage::assistant("Call sort() on it, or sort_by."),
            ]
        );
    }

    #[test]
    fn test_alternating_guess_not_used_for_unknown_sites() {
        let html = r#"<main><div class="group">A fairly long paragraph of text</div></main>"#;
        let result = extract("example.org", html);
        assert!(result.is_empty());
        assert_eq!(result.strategy, None);
    }

    #[test]
    fn test_claude_split_selectors_sorted() {
        // All user matches are collected before any assistant match; sorting
        // must restore the interleaving.
        let html = r#"<div>
            <div data-testid="user-message">First question</div>
            <div class="font-claude-response"><p>First answer</p></div>
            <div data-testid="user-message">Second question</div>
            <div class="font-claude-response"><p>Second answer</p><pre><code class="language-js">let x = 1;</code></pre></div>
        </div>"#;
        let result = extract("claude.ai", html);
        assert_eq!(result.strategy, Some("split-selectors"));
        assert_eq!(
            result.messages,
            vec![
                ChatMessage::user("First question"),
                ChatMessage::assistant("First answer"),
                ChatMessage::user("Second question"),
                ChatMessage::assistant("Second answer\n```js\nlet x = 1;\n```"),
            ]
        );
    }

    #[test]
    fn test_split_selectors_dedupe() {
        let html = r#"<div data-testid="user-message" class="font-claude-message">Both</div>"#;
        let result = extract("claude.ai", html);
        assert_eq!(result.messages, vec![ChatMessage::user("Both")]);
    }

    #[test]
    fn test_split_selectors_keep_outermost_match() {
        let html = r#"<div>
            <div data-testid="user-message">Question</div>
            <div class="font-claude-message"><div class="font-claude-response"><p>Answer text</p></div></div>
        </div>"#;
        let result = extract("claude.ai", html);
        assert_eq!(
            result.messages,
            vec![ChatMessage::user("Question"), ChatMessage::assistant("Answer text")]
        );
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let result = extract("claude.ai", "<main><p>Welcome</p></main>");
        assert!(result.is_empty());

        let err = result.require_messages(resolve_site("claude.ai")).unwrap_err();
        assert!(err.is_user_facing());
        assert!(err.to_string().contains("active Claude conversation"));
    }

    #[test]
    fn test_gemini_split_selectors() {
        let html = r#"<main>
            <div data-query-source="user">Hi Gemini</div>
            <div class="model-response-text">Hello!</div>
        </main>"#;
        let result = extract("gemini.google.com", html);
        assert_eq!(
            result.messages,
            vec![ChatMessage::user("Hi Gemini"), ChatMessage::assistant("Hello!")]
        );
    }

    #[test]
    fn test_strategy_chains() {
        let names = |host: &str| -> Vec<&'static str> {
            strategies_for(resolve_site(host))
                .iter()
                .map(|s| s.name())
                .collect()
        };
        assert_eq!(
            names("chatgpt.com"),
            ["author-role", "message-cards", "alternating-groups"]
        );
        assert_eq!(names("claude.ai"), ["split-selectors"]);
        assert_eq!(names("example.org"), ["author-role", "message-cards"]);
    }
}
