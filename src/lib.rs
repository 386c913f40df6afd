//! autolink-engine - autolink rule compiler and message rewrite engine
//!
//! This library rewrites matching substrings of chat messages into markdown
//! links (or arbitrary replacement text) according to user-defined rules,
//! without corrupting existing markup.
//!
//! # Features
//!
//! - **Rule compilation**: anchors user patterns with word-boundary or
//!   capturing-boundary semantics
//! - **Safe substitution**: single-pass replace-all where boundary
//!   assertions allow it, an iterative leftmost-match loop where they don't
//! - **Markdown awareness**: never rewrites inside existing links, images,
//!   or code
//! - **Scoping**: rules can be limited to a team or team/channel
//! - **Bot gating**: rules can skip messages authored by bot accounts
//!
//! # Example
//!
//! ```
//! use autolink_engine::{BoundaryOptions, CompiledRule, Rule};
//!
//! let rule = Rule {
//!     name: "Mattermost".to_string(),
//!     pattern: "(Mattermost)".to_string(),
//!     template: "[Mattermost](https://mattermost.com)".to_string(),
//!     ..Default::default()
//! };
//!
//! let compiled = CompiledRule::compile(&rule, &BoundaryOptions::default()).unwrap();
//! assert_eq!(
//!     compiled.replace("Welcome to Mattermost!"),
//!     "Welcome to [Mattermost](https://mattermost.com)!"
//! );
//! ```

pub mod command;
pub mod compiler;
pub mod config;
pub mod engine;
pub mod markdown;
pub mod resolver;
pub mod rewriter;
pub mod rule;
pub mod store;

// Re-exports for convenience
pub use compiler::{BoundaryOptions, CompileError, CompiledRule};
pub use config::Config;
pub use engine::Autolinker;
pub use resolver::{ChannelInfo, ChannelResolver, ResolveError, UserInfo, UserResolver};
pub use rewriter::{process_post, Post};
pub use rule::Rule;
pub use store::{set_rule, Store, StoreError};
