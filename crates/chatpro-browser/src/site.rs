//! Site detection and per-site selector records.

use serde::{Deserialize, Serialize};

/// Chat sites with a dedicated selector record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteKind {
    #[serde(rename = "chatgpt")]
    ChatGPT,
    Claude,
    Gemini,
    Unknown,
}

impl SiteKind {
    /// Classify a hostname by substring, so full URLs work as well.
    pub fn detect(hostname: &str) -> Self {
        let host = hostname.to_ascii_lowercase();
        if host.contains("chatgpt.com") || host.contains("chat.openai.com") {
            Self::ChatGPT
        } else if host.contains("claude.ai") {
            Self::Claude
        } else if host.contains("gemini.google.com") {
            Self::Gemini
        } else {
            Self::Unknown
        }
    }

    pub fn config(&self) -> &'static SiteConfig {
        match self {
            Self::ChatGPT => &CHATGPT,
            Self::Claude => &CLAUDE,
            Self::Gemini => &GEMINI,
            Self::Unknown => &UNKNOWN,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ChatGPT => "chatgpt",
            Self::Claude => "claude",
            Self::Gemini => "gemini",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for SiteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// CSS selectors for one site. Empty strings mean "no selector".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    pub kind: SiteKind,
    /// Display name, used in document titles and role labels.
    pub name: &'static str,
    pub input_selector: &'static str,
    pub input_fallback_selector: &'static str,
    pub message_container_selector: &'static str,
    pub user_message_selector: &'static str,
    pub assistant_message_selector: &'static str,
    pub scroll_container_selector: &'static str,
}

static CHATGPT: SiteConfig = SiteConfig {
    kind: SiteKind::ChatGPT,
    name: "ChatGPT",
    input_selector: "#prompt-textarea",
    input_fallback_selector: r#"div[contenteditable="true"]"#,
    message_container_selector: r#"[class*="conversation"], main"#,
    user_message_selector: r#"[data-message-author-role="user"]"#,
    assistant_message_selector: r#"[data-message-author-role="assistant"]"#,
    scroll_container_selector: "main",
};

static CLAUDE: SiteConfig = SiteConfig {
    kind: SiteKind::Claude,
    name: "Claude",
    input_selector: r#"[contenteditable="true"].ProseMirror"#,
    input_fallback_selector: r#"div[contenteditable="true"]"#,
    message_container_selector: r#"[class*="conversation"], main"#,
    user_message_selector: r#"[data-testid="user-message"], .font-user-message"#,
    assistant_message_selector: r#"[data-testid="assistant-message"], .font-claude-message, .font-claude-response"#,
    scroll_container_selector: r#"[class*="overflow-y-auto"]"#,
};

static GEMINI: SiteConfig = SiteConfig {
    kind: SiteKind::Gemini,
    name: "Gemini",
    input_selector: r#".ql-editor[contenteditable="true"]"#,
    input_fallback_selector: r#"div[contenteditable="true"]"#,
    message_container_selector: "main",
    user_message_selector: r#"[data-query-source="user"]"#,
    assistant_message_selector: ".model-response-text",
    scroll_container_selector: "main",
};

static UNKNOWN: SiteConfig = SiteConfig {
    kind: SiteKind::Unknown,
    name: "Unknown",
    input_selector: "textarea",
    input_fallback_selector: r#"div[contenteditable="true"]"#,
    message_container_selector: "main",
    user_message_selector: "",
    assistant_message_selector: "",
    scroll_container_selector: "main",
};

/// Resolve the selector record for a hostname. Never fails.
pub fn resolve_site(hostname: &str) -> &'static SiteConfig {
    SiteKind::detect(hostname).config()
}
