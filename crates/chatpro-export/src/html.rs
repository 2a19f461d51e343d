//! Standalone printable HTML document.

use std::time::Duration;

use chrono::Local;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use chatpro_core::config::PRINT_SETTLE_DELAY;
use chatpro_core::{ChatMessage, Role};

use crate::export_timestamp;

static FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```([A-Za-z0-9_]*)\n([\s\S]*?)```").unwrap());
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").unwrap());

const STYLES: &str = r#"        * {
            box-sizing: border-box;
        }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif;
            max-width: 800px;
            margin: 0 auto;
            padding: 40px 20px;
            line-height: 1.6;
            color: #1a1a1a;
            background: #fff;
        }
        h1 {
            font-size: 24px;
            margin-bottom: 8px;
            color: #111;
        }
        .export-info {
            color: #666;
            font-size: 14px;
            margin-bottom: 32px;
            padding-bottom: 16px;
            border-bottom: 1px solid #e5e5e5;
        }
        .message {
            margin: 20px 0;
            padding: 16px;
            border-radius: 12px;
        }
        .message.user {
            background: #f7f7f8;
        }
        .message.assistant {
            background: #fff;
            border: 1px solid #e5e5e5;
        }
        .role {
            font-weight: 600;
            margin-bottom: 8px;
            font-size: 14px;
            color: #555;
        }
        .content {
            font-size: 15px;
        }
        code {
            background: #f3f4f6;
            padding: 2px 6px;
            border-radius: 4px;
            font-family: 'SF Mono', Monaco, 'Cascadia Code', monospace;
            font-size: 13px;
        }
        pre {
            background: #1e1e1e;
            color: #d4d4d4;
            padding: 16px;
            border-radius: 8px;
            overflow-x: auto;
            margin: 12px 0;
        }
        pre code {
            background: transparent;
            padding: 0;
            color: inherit;
            font-size: 13px;
        }
        @media print {
            body {
                padding: 0;
                max-width: 100%;
            }
            .message {
                break-inside: avoid;
                page-break-inside: avoid;
            }
            pre {
                white-space: pre-wrap;
                word-wrap: break-word;
            }
        }"#;

#[derive(Debug, Clone, Copy)]
pub struct HtmlOptions {
    /// Open the print dialog once the page has loaded and settled.
    pub auto_print: bool,
    /// Pause between load and the print dialog.
    pub print_delay: Duration,
}

impl HtmlOptions {
    pub fn auto_print(print_delay: Duration) -> Self {
        Self {
            auto_print: true,
            print_delay,
        }
    }
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            auto_print: false,
            print_delay: PRINT_SETTLE_DELAY,
        }
    }
}

/// Render `messages` as a printable page stamped with the current local time.
pub fn render_printable_html(
    messages: &[ChatMessage],
    site_name: &str,
    options: HtmlOptions,
) -> String {
    render_printable_html_at(messages, site_name, &export_timestamp(Local::now()), options)
}

pub fn render_printable_html_at(
    messages: &[ChatMessage],
    site_name: &str,
    exported_on: &str,
    options: HtmlOptions,
) -> String {
    let body = messages
        .iter()
        .map(|msg| render_message(msg, site_name))
        .collect::<Vec<_>>()
        .join("\n");

    let print_script = if options.auto_print {
        format!(
            "\n    <script>window.onload = () => setTimeout(() => window.print(), {});</script>",
            options.print_delay.as_millis()
        )
    } else {
        String::new()
    };

    let site = escape_html(site_name);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{site} Export</title>
    <style>
{styles}
    </style>{print_script}
</head>
<body>
    <h1>{site} Conversation</h1>
    <p class="export-info">Exported on {exported_on}</p>
    {body}
</body>
</html>"#,
        site = site,
        styles = STYLES,
        print_script = print_script,
        exported_on = escape_html(exported_on),
        body = body,
    )
}

fn render_message(msg: &ChatMessage, site_name: &str) -> String {
    let class = match msg.role {
        Role::User => "user",
        Role::Assistant => "assistant",
    };
    format!(
        r#"
            <div class="message {}">
                <div class="role">{}</div>
                <div class="content">{}</div>
            </div>
        "#,
        class,
        escape_html(msg.role.label(site_name)),
        content_html(&msg.content)
    )
}

/// Escaped message text with fenced blocks, inline code and line breaks.
pub fn content_html(content: &str) -> String {
    let escaped = escape_html(content);
    let fenced = FENCED_BLOCK.replace_all(&escaped, |caps: &Captures| {
        format!(
            r#"<pre><code class="language-{}">{}</code></pre>"#,
            &caps[1],
            caps[2].trim()
        )
    });
    let inline = INLINE_CODE.replace_all(&fenced, "<code>$1</code>");
    inline.replace('\n', "<br>")
}

/// Escape text the way a DOM text node serializes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
    out
}
