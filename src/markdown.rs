//! Rewritable-span extraction over a markdown traversal
//!
//! Walks the message with pulldown-cmark's offset iterator and collects the
//! plain-text runs that are safe to rewrite. Text inside inline links,
//! inline images, reference links/images, autolinks (`<...>`), inline code
//! and code blocks is excluded, so existing markup is never corrupted and
//! already-linked text is never double-linked.

use log::warn;
use pulldown_cmark::{Event, Options, Parser, Tag};

/// A contiguous rewritable slice of the message source.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    /// Byte offset of the span start in the original message.
    pub start: usize,
    /// Byte offset one past the span end.
    pub end: usize,
    /// The span text, equal to `message[start..end]`.
    pub text: String,
}

/// Collect the rewritable spans of `message` in source order.
///
/// The traversal is not restartable; a fresh parse is required per pass.
pub fn rewritable_spans(message: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    // Depth inside excluded subtrees (links, images, code blocks).
    let mut excluded = 0usize;

    for (event, range) in Parser::new_ext(message, Options::empty()).into_offset_iter() {
        match event {
            Event::Start(Tag::Link(..) | Tag::Image(..) | Tag::CodeBlock(..)) => {
                excluded += 1;
            }
            Event::End(Tag::Link(..) | Tag::Image(..) | Tag::CodeBlock(..)) => {
                excluded = excluded.saturating_sub(1);
            }
            Event::Text(text) if excluded == 0 => {
                // Defensive consistency check: the parsed text must match
                // the live message slice at the reported offset. Escaped
                // characters and entities legitimately differ and are left
                // unmodified.
                match message.get(range.start..range.end) {
                    Some(slice) if slice == text.as_ref() => spans.push(Span {
                        start: range.start,
                        end: range.end,
                        text: text.to_string(),
                    }),
                    Some(_) => {
                        warn!(
                            "markdown text {:?} did not match source range {}..{}, skipping",
                            text.as_ref(),
                            range.start,
                            range.end
                        );
                    }
                    None => {
                        warn!(
                            "markdown range {}..{} out of bounds for message, skipping",
                            range.start, range.end
                        );
                    }
                }
            }
            _ => {}
        }
    }

    spans
}
