//! The autolink rule data model
//!
//! A `Rule` is a user-authored rewrite directive: a regex pattern, a
//! replacement template, and optional boundary and scoping controls.
//! Compilation produces a separate `CompiledRule` (see `compiler`); the
//! `Rule` value itself stays pure data.

use log::error;
use serde::{Deserialize, Serialize};

/// A single autolink rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rule {
    /// Display name; unique among rules in administrative contexts
    pub name: String,

    /// Disabled rules are skipped entirely and never compiled
    pub disabled: bool,

    /// Regex pattern, may contain named capture groups
    pub pattern: String,

    /// Replacement template referencing capture groups by name or position
    pub template: String,

    /// `"team"` or `"team/channel"` entries; empty means "applies everywhere"
    pub scope: Vec<String>,

    /// Use zero-width `\b` anchoring instead of capturing boundary groups
    pub word_match: bool,

    /// Suppress the left boundary requirement
    pub disable_non_word_prefix: bool,

    /// Suppress the right boundary requirement
    pub disable_non_word_suffix: bool,

    /// If false, the rule is skipped for messages authored by bot accounts
    pub process_bot_posts: bool,
}

impl Rule {
    /// Display name for the rule: its name, or the pattern when unnamed.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.pattern
        } else {
            &self.name
        }
    }

    /// Check whether this rule applies in the given team/channel.
    ///
    /// An empty scope always matches. Otherwise at least one entry must
    /// match: a one-segment entry compares the team name, a two-segment
    /// entry compares team and channel, both case-insensitively. A message
    /// without a team name never matches a non-empty scope.
    pub fn matches_scope(&self, team: &str, channel: &str) -> bool {
        if self.scope.is_empty() {
            return true;
        }
        if team.is_empty() {
            return false;
        }
        for entry in &self.scope {
            let parts: Vec<&str> = entry.split('/').collect();
            match parts.as_slice() {
                [t] => {
                    if !t.is_empty() && eq_fold(t, team) {
                        return true;
                    }
                }
                [t, c] => {
                    if eq_fold(t, team) && eq_fold(c, channel) {
                        return true;
                    }
                }
                _ => {
                    error!("malformed scope entry {:?} on rule {}", entry, self.display_name());
                }
            }
        }
        false
    }

    /// Render the rule as a markdown list element for the admin `list`
    /// command. `i` is the 1-based position; 0 omits the number.
    pub fn to_markdown(&self, i: usize) -> String {
        let mut text = String::from("- ");
        if i > 0 {
            text.push_str(&format!("{}: ", i));
        }
        if !self.name.is_empty() {
            if self.disabled {
                text.push_str(&format!("~~{}~~", self.name));
            } else {
                text.push_str(&self.name);
            }
        }
        if self.disabled {
            text.push_str(" **Disabled**");
        }
        text.push('\n');

        text.push_str(&format!("  - Pattern: `{}`\n", self.pattern));
        text.push_str(&format!("  - Template: `{}`\n", self.template));

        if self.disable_non_word_prefix {
            text.push_str("  - DisableNonWordPrefix: `true`\n");
        }
        if self.disable_non_word_suffix {
            text.push_str("  - DisableNonWordSuffix: `true`\n");
        }
        if !self.scope.is_empty() {
            text.push_str(&format!("  - Scope: `{:?}`\n", self.scope));
        }
        if self.word_match {
            text.push_str("  - WordMatch: `true`\n");
        }
        if self.process_bot_posts {
            text.push_str("  - ProcessBotPosts: `true`\n");
        }
        text
    }
}

fn eq_fold(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}
