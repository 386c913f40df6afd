//! Rule compilation and substitution
//!
//! Turns a `Rule` into a compiled matcher with boundary augmentation, and
//! applies it to text. `\b` word boundaries are zero-width and compose
//! safely under a global replace-all; the capturing boundary groups consume
//! their boundary character and force a one-match-at-a-time strategy.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rule::Rule;

/// Name of the capturing group inserted for the left boundary.
const PREFIX_GROUP: &str = "AutolinkNonWordPrefix";

/// Name of the capturing group inserted for the right boundary.
const SUFFIX_GROUP: &str = "AutolinkNonWordSuffix";

/// Boundary configuration shared by all rules.
///
/// The right-boundary terminator set is a product decision, not a
/// structural one, so it is configurable rather than hard-coded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryOptions {
    /// Punctuation accepted as a right boundary in addition to whitespace
    /// and end-of-string, when `word_match` is off.
    pub suffix_terminators: String,
}

impl Default for BoundaryOptions {
    fn default() -> Self {
        Self {
            suffix_terminators: ".!?,)".to_string(),
        }
    }
}

/// Rule compilation failure.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("rule {name:?} has an empty pattern or template")]
    EmptyRule { name: String },

    #[error("rule {name:?} has an invalid pattern: {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}

/// A rule together with its compiled matcher.
///
/// Compilation is a pure function `Rule -> CompiledRule`; the source rule
/// is never mutated and the compiled artifact is disposable.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    rule: Rule,
    re: Option<Regex>,
    template: String,
    single_pass: bool,
}

impl CompiledRule {
    /// Compile a rule for normal configuration load.
    ///
    /// A disabled rule, or one with an empty pattern or template, compiles
    /// to an inert matcher: `replace` becomes the identity. A syntactically
    /// invalid pattern is an error.
    pub fn compile(rule: &Rule, boundaries: &BoundaryOptions) -> Result<Self, CompileError> {
        if rule.disabled || rule.pattern.is_empty() || rule.template.is_empty() {
            return Ok(Self::inert(rule));
        }
        Self::build(rule, boundaries)
    }

    /// Compile for an explicit validation or `test` request.
    ///
    /// Unlike `compile`, an empty pattern or template is a hard error so
    /// the rule author gets a synchronous report, and `disabled` is
    /// ignored so a draft rule can be tested before being enabled.
    pub fn compile_strict(rule: &Rule, boundaries: &BoundaryOptions) -> Result<Self, CompileError> {
        if rule.pattern.is_empty() || rule.template.is_empty() {
            return Err(CompileError::EmptyRule {
                name: rule.display_name().to_string(),
            });
        }
        Self::build(rule, boundaries)
    }

    pub(crate) fn inert(rule: &Rule) -> Self {
        Self {
            rule: rule.clone(),
            re: None,
            template: String::new(),
            single_pass: false,
        }
    }

    fn build(rule: &Rule, boundaries: &BoundaryOptions) -> Result<Self, CompileError> {
        let mut pattern = rule.pattern.clone();
        let mut template = rule.template.clone();
        let mut prefix_captures = false;
        let mut suffix_captures = false;

        if !rule.disable_non_word_prefix {
            if rule.word_match {
                pattern = format!(r"\b{}", pattern);
            } else {
                // The capturing form consumes the boundary character, which
                // lets punctuation like `(` terminate the previous text but
                // rules out a single global substitution sweep.
                pattern = format!(r"(?P<{}>^|\s){}", PREFIX_GROUP, pattern);
                template = format!("${{{}}}{}", PREFIX_GROUP, template);
                prefix_captures = true;
            }
        }

        if !rule.disable_non_word_suffix {
            if rule.word_match {
                pattern.push_str(r"\b");
            } else {
                pattern.push_str(&format!(
                    r"(?P<{}>$|[\s{}])",
                    SUFFIX_GROUP,
                    regex::escape(&boundaries.suffix_terminators)
                ));
                template.push_str(&format!("${{{}}}", SUFFIX_GROUP));
                suffix_captures = true;
            }
        }

        let re = Regex::new(&pattern).map_err(|source| CompileError::InvalidPattern {
            name: rule.display_name().to_string(),
            source,
        })?;

        Ok(Self {
            rule: rule.clone(),
            re: Some(re),
            template,
            // Consuming boundary captures prevent detecting two
            // boundary-adjacent matches in one sweep.
            single_pass: !prefix_captures && !suffix_captures,
        })
    }

    /// The source rule.
    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    /// Whether this rule compiled to a usable matcher.
    pub fn is_active(&self) -> bool {
        self.re.is_some()
    }

    /// Whether substitution runs as one global replace-all sweep.
    pub fn single_pass(&self) -> bool {
        self.single_pass
    }

    /// Apply the rule to `text`, returning the rewritten string.
    ///
    /// Inert rules and non-matching text return the input unchanged.
    pub fn replace(&self, text: &str) -> String {
        let Some(re) = &self.re else {
            return text.to_string();
        };

        if self.single_pass {
            return re.replace_all(text, self.template.as_str()).into_owned();
        }

        // One leftmost match at a time, resuming immediately after the
        // consumed match so already-emitted output is never re-scanned.
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(caps) = re.captures(rest) {
            let Some(m) = caps.get(0) else { break };
            out.push_str(&rest[..m.start()]);
            self.expand(&caps, &mut out);
            rest = &rest[m.end()..];
            if m.start() == m.end() {
                // Zero-width match; step over one character to guarantee
                // forward progress on degenerate patterns like `.*`.
                let Some(c) = rest.chars().next() else { break };
                let step = c.len_utf8();
                out.push_str(&rest[..step]);
                rest = &rest[step..];
            }
        }
        out.push_str(rest);
        out
    }

    fn expand(&self, caps: &Captures, dst: &mut String) {
        caps.expand(&self.template, dst);
    }
}
