// crates/milady-config-ui/src/markdown.rs
// ============================================================================
// Module: Markdown Preview
// Description: Safe-subset markdown parser producing text-only blocks.
// Purpose: Preview markdown fields without passing raw HTML through.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The preview understands headings, bold, italic, inline code, fenced code,
//! links, and unordered lists. Everything else is plain text. Output is a tree
//! of text nodes; angle brackets and HTML tags stay literal characters. Link
//! targets are kept only for `http`, `https`, and `mailto` schemes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Inline text span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Inline {
    /// Plain text.
    Text {
        /// Literal text.
        text: String,
    },
    /// `**bold**`
    Strong {
        /// Literal text.
        text: String,
    },
    /// `*italic*` or `_italic_`
    Emphasis {
        /// Literal text.
        text: String,
    },
    /// `` `code` ``
    Code {
        /// Literal code.
        text: String,
    },
    /// `[text](href)`; unsafe targets drop the href.
    Link {
        /// Link text.
        text: String,
        /// Allowed target.
        #[serde(skip_serializing_if = "Option::is_none")]
        href: Option<String>,
    },
}

/// Block-level node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    /// `#` to `######` heading.
    Heading {
        /// Heading level, 1 through 6.
        level: u8,
        /// Heading content.
        content: Vec<Inline>,
    },
    /// Paragraph of joined lines.
    Paragraph {
        /// Paragraph content.
        content: Vec<Inline>,
    },
    /// Fenced code block.
    CodeBlock {
        /// Info string after the opening fence.
        #[serde(skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        /// Literal code.
        code: String,
    },
    /// Unordered list.
    List {
        /// One inline run per item.
        items: Vec<Vec<Inline>>,
    },
}

// ============================================================================
// SECTION: Block Parsing
// ============================================================================

/// Parses markdown source into preview blocks.
#[must_use]
pub fn parse_markdown(source: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut list: Vec<Vec<Inline>> = Vec::new();
    let mut lines = source.lines();
    while let Some(line) = lines.next() {
        let trimmed = line.trim_start();
        if let Some(info) = trimmed.strip_prefix("```") {
            flush_paragraph(&mut blocks, &mut paragraph);
            flush_list(&mut blocks, &mut list);
            let mut code = Vec::new();
            for code_line in lines.by_ref() {
                if code_line.trim_start().starts_with("```") {
                    break;
                }
                code.push(code_line);
            }
            let language = Some(info.trim()).filter(|info| !info.is_empty()).map(str::to_string);
            blocks.push(Block::CodeBlock {
                language,
                code: code.join("\n"),
            });
        } else if trimmed.is_empty() {
            flush_paragraph(&mut blocks, &mut paragraph);
            flush_list(&mut blocks, &mut list);
        } else if let Some((level, text)) = heading(trimmed) {
            flush_paragraph(&mut blocks, &mut paragraph);
            flush_list(&mut blocks, &mut list);
            blocks.push(Block::Heading {
                level,
                content: parse_inline(text),
            });
        } else if let Some(item) =
            trimmed.strip_prefix("- ").or_else(|| trimmed.strip_prefix("* "))
        {
            flush_paragraph(&mut blocks, &mut paragraph);
            list.push(parse_inline(item.trim()));
        } else {
            flush_list(&mut blocks, &mut list);
            paragraph.push(trimmed.trim_end());
        }
    }
    flush_paragraph(&mut blocks, &mut paragraph);
    flush_list(&mut blocks, &mut list);
    blocks
}

/// Recognizes `#`-prefixed headings.
fn heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.bytes().take_while(|byte| *byte == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &line[hashes ..];
    let text = rest.strip_prefix(' ')?;
    Some((u8::try_from(hashes).ok()?, text.trim()))
}

/// Emits the pending paragraph.
fn flush_paragraph(blocks: &mut Vec<Block>, paragraph: &mut Vec<&str>) {
    if !paragraph.is_empty() {
        blocks.push(Block::Paragraph {
            content: parse_inline(&paragraph.join(" ")),
        });
        paragraph.clear();
    }
}

/// Emits the pending list.
fn flush_list(blocks: &mut Vec<Block>, list: &mut Vec<Vec<Inline>>) {
    if !list.is_empty() {
        blocks.push(Block::List {
            items: std::mem::take(list),
        });
    }
}

// ============================================================================
// SECTION: Inline Parsing
// ============================================================================

/// Parses inline spans. Unterminated markers are kept as literal text.
#[must_use]
pub fn parse_inline(text: &str) -> Vec<Inline> {
    let mut spans = Vec::new();
    let mut plain = String::new();
    let mut rest = text;
    while let Some(ch) = rest.chars().next() {
        let parsed = match ch {
            '`' => delimited(rest, "`").map(|(inner, after)| {
                (
                    Inline::Code {
                        text: inner.to_string(),
                    },
                    after,
                )
            }),
            '*' if rest.starts_with("**") => delimited(rest, "**").map(|(inner, after)| {
                (
                    Inline::Strong {
                        text: inner.to_string(),
                    },
                    after,
                )
            }),
            '*' | '_' => delimited(rest, &rest[.. 1]).map(|(inner, after)| {
                (
                    Inline::Emphasis {
                        text: inner.to_string(),
                    },
                    after,
                )
            }),
            '[' => link(rest),
            _ => None,
        };
        match parsed {
            Some((span, after)) => {
                if !plain.is_empty() {
                    spans.push(Inline::Text {
                        text: std::mem::take(&mut plain),
                    });
                }
                spans.push(span);
                rest = after;
            }
            None => {
                plain.push(ch);
                rest = &rest[ch.len_utf8() ..];
            }
        }
    }
    if !plain.is_empty() {
        spans.push(Inline::Text {
            text: plain,
        });
    }
    spans
}

/// Splits `marker inner marker rest` into `(inner, rest)`; inner must be non-empty.
fn delimited<'a>(text: &'a str, marker: &str) -> Option<(&'a str, &'a str)> {
    let body = text.strip_prefix(marker)?;
    let end = body.find(marker)?;
    if end == 0 {
        return None;
    }
    Some((&body[.. end], &body[end + marker.len() ..]))
}

/// Parses `[text](href)`.
fn link(text: &str) -> Option<(Inline, &str)> {
    let body = text.strip_prefix('[')?;
    let close = body.find("](")?;
    let label = &body[.. close];
    let after_label = &body[close + 2 ..];
    let end = after_label.find(')')?;
    let href = after_label[.. end].trim();
    Some((
        Inline::Link {
            text: label.to_string(),
            href: is_safe_href(href).then(|| href.to_string()),
        },
        &after_label[end + 1 ..],
    ))
}

/// Accepts only `http`, `https`, and `mailto` targets.
#[must_use]
pub fn is_safe_href(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    ["http://", "https://", "mailto:"].iter().any(|scheme| lower.starts_with(scheme))
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::expect_used,
        clippy::unwrap_used,
        reason = "Test assertions use expect/unwrap for clarity."
    )]

    use super::Block;
    use super::Inline;
    use super::parse_inline;
    use super::parse_markdown;

    fn text(value: &str) -> Inline {
        Inline::Text {
            text: value.to_string(),
        }
    }

    #[test]
    fn headings_lists_and_code_blocks() {
        let blocks = parse_markdown("# Title\n\n- one\n- **two**\n\n```toml\nkey = 1\n```\ntail");
        assert_eq!(blocks.len(), 4);
        assert!(matches!(&blocks[0], Block::Heading { level: 1, .. }));
        assert!(matches!(&blocks[1], Block::List { items } if items.len() == 2));
        assert_eq!(
            blocks[2],
            Block::CodeBlock {
                language: Some("toml".to_string()),
                code: "key = 1".to_string(),
            }
        );
        assert_eq!(
            blocks[3],
            Block::Paragraph {
                content: vec![text("tail")],
            }
        );
    }

    #[test]
    fn html_stays_literal_text() {
        let spans = parse_inline("<script>alert(1)</script>");
        assert_eq!(spans, vec![text("<script>alert(1)</script>")]);
    }

    #[test]
    fn unsafe_link_targets_are_dropped() {
        let spans = parse_inline("[docs](https://example.com) and [x](javascript:alert(1))");
        assert_eq!(
            spans[0],
            Inline::Link {
                text: "docs".to_string(),
                href: Some("https://example.com".to_string()),
            }
        );
        assert!(matches!(&spans[2], Inline::Link { href: None, .. }));
    }

    #[test]
    fn unterminated_markers_are_literal() {
        assert_eq!(parse_inline("2 * 3 = `six"), vec![text("2 * 3 = `six")]);
        assert_eq!(
            parse_inline("use `cargo` *now*"),
            vec![
                text("use "),
                Inline::Code {
                    text: "cargo".to_string(),
                },
                text(" "),
                Inline::Emphasis {
                    text: "now".to_string(),
                },
            ]
        );
    }
}
