//! The autolink engine: a shared, atomically replaceable rule snapshot
//!
//! Message processing may run concurrently from many host threads while an
//! admin edit replaces the rule list. Readers clone an `Arc` snapshot under
//! a read lock and process against it; `update_rules` compiles a complete
//! replacement list and swaps it in one write, so a message in flight never
//! observes a partially updated list.

use std::sync::{Arc, RwLock};

use log::error;

use crate::compiler::{BoundaryOptions, CompiledRule};
use crate::config::Config;
use crate::resolver::{ChannelResolver, UserResolver};
use crate::rewriter::{self, Post};
use crate::rule::Rule;

pub struct Autolinker {
    boundaries: BoundaryOptions,
    enable_on_update: bool,
    rules: RwLock<Arc<Vec<CompiledRule>>>,
}

impl Autolinker {
    /// Create an engine with no rules.
    pub fn new(boundaries: BoundaryOptions) -> Self {
        Self {
            boundaries,
            enable_on_update: false,
            rules: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Create an engine from a loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        let engine = Self {
            boundaries: config.boundary.clone(),
            enable_on_update: config.general.enable_on_update,
            rules: RwLock::new(Arc::new(Vec::new())),
        };
        engine.update_rules(&config.links);
        engine
    }

    /// Compile `rules` and publish them as the new snapshot.
    ///
    /// A rule that fails to compile is logged once and left inert, exactly
    /// like a disabled rule; the rest of the list still takes effect.
    pub fn update_rules(&self, rules: &[Rule]) {
        let compiled: Vec<CompiledRule> = rules
            .iter()
            .map(|rule| {
                CompiledRule::compile(rule, &self.boundaries).unwrap_or_else(|err| {
                    error!("failed to compile rule {}: {}", rule.display_name(), err);
                    CompiledRule::inert(rule)
                })
            })
            .collect();

        match self.rules.write() {
            Ok(mut guard) => *guard = Arc::new(compiled),
            Err(err) => error!("rule list lock poisoned, update dropped: {}", err),
        }
    }

    /// The current compiled snapshot.
    pub fn rules(&self) -> Arc<Vec<CompiledRule>> {
        match self.rules.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(err) => {
                error!("rule list lock poisoned, using empty snapshot: {}", err);
                Arc::new(Vec::new())
            }
        }
    }

    /// The boundary options rules are compiled with.
    pub fn boundaries(&self) -> &BoundaryOptions {
        &self.boundaries
    }

    /// Rewrite a post against the current snapshot.
    pub fn process_post(
        &self,
        post: &Post,
        channels: &dyn ChannelResolver,
        users: &dyn UserResolver,
    ) -> (Post, bool) {
        let snapshot = self.rules();
        rewriter::process_post(&snapshot, post, channels, users)
    }

    /// Rewrite an edited post. Returns it unchanged unless
    /// `enable_on_update` was set in the configuration.
    pub fn process_update(
        &self,
        post: &Post,
        channels: &dyn ChannelResolver,
        users: &dyn UserResolver,
    ) -> (Post, bool) {
        if !self.enable_on_update {
            return (post.clone(), false);
        }
        self.process_post(post, channels, users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneralConfig;
    use crate::resolver::StaticResolver;

    fn mattermost_rule() -> Rule {
        Rule {
            name: "Mattermost".to_string(),
            pattern: "(Mattermost)".to_string(),
            template: "[Mattermost](https://mattermost.com)".to_string(),
            process_bot_posts: true,
            ..Default::default()
        }
    }

    fn post(message: &str) -> Post {
        Post {
            message: message.to_string(),
            channel_id: "channel1".to_string(),
            user_id: "user1".to_string(),
            hashtags: String::new(),
        }
    }

    #[test]
    fn test_empty_engine_is_a_no_op() {
        let engine = Autolinker::new(BoundaryOptions::default());
        let resolver = StaticResolver::default();
        let (out, changed) = engine.process_post(&post("Mattermost"), &resolver, &resolver);
        assert!(!changed);
        assert_eq!(out.message, "Mattermost");
    }

    #[test]
    fn test_update_swaps_snapshot() {
        let engine = Autolinker::new(BoundaryOptions::default());
        let resolver = StaticResolver::default();

        engine.update_rules(&[mattermost_rule()]);
        let (out, changed) =
            engine.process_post(&post("Welcome to Mattermost!"), &resolver, &resolver);
        assert!(changed);
        assert_eq!(
            out.message,
            "Welcome to [Mattermost](https://mattermost.com)!"
        );

        engine.update_rules(&[]);
        let (_, changed) =
            engine.process_post(&post("Welcome to Mattermost!"), &resolver, &resolver);
        assert!(!changed);
    }

    #[test]
    fn test_uncompilable_rule_is_inert_not_fatal() {
        let engine = Autolinker::new(BoundaryOptions::default());
        engine.update_rules(&[
            Rule {
                name: "broken".to_string(),
                pattern: "(unclosed".to_string(),
                template: "x".to_string(),
                ..Default::default()
            },
            mattermost_rule(),
        ]);
        let resolver = StaticResolver::default();
        let (out, changed) = engine.process_post(&post("Mattermost"), &resolver, &resolver);
        assert!(changed);
        assert_eq!(out.message, "[Mattermost](https://mattermost.com)");
    }

    #[test]
    fn test_update_rewrite_is_off_by_default() {
        let config = Config {
            links: vec![mattermost_rule()],
            ..Config::default()
        };
        let engine = Autolinker::from_config(&config);
        let resolver = StaticResolver::default();

        let original = post("Welcome to Mattermost!");
        let (out, changed) = engine.process_update(&original, &resolver, &resolver);
        assert!(!changed);
        assert_eq!(out.message, original.message);

        // the same post still rewrites as a new message
        let (_, changed) = engine.process_post(&original, &resolver, &resolver);
        assert!(changed);
    }

    #[test]
    fn test_update_rewrite_when_enabled() {
        let config = Config {
            general: GeneralConfig {
                enable_on_update: true,
            },
            links: vec![mattermost_rule()],
            ..Config::default()
        };
        let engine = Autolinker::from_config(&config);
        let resolver = StaticResolver::default();

        let (out, changed) =
            engine.process_update(&post("Welcome to Mattermost!"), &resolver, &resolver);
        assert!(changed);
        assert_eq!(
            out.message,
            "Welcome to [Mattermost](https://mattermost.com)!"
        );
    }

    #[test]
    fn test_snapshot_is_shared_not_copied() {
        let engine = Autolinker::new(BoundaryOptions::default());
        engine.update_rules(&[mattermost_rule()]);
        let a = engine.rules();
        let b = engine.rules();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
