//! Markdown-aware message rewriting
//!
//! Applies every in-scope rule, in list order, to each rewritable span of a
//! message, then splices the results back while tracking the offset drift
//! caused by length changes. Message processing never fails outright:
//! lookup errors degrade to "skip that enhancement" and are logged.

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::compiler::CompiledRule;
use crate::markdown;
use crate::resolver::{ChannelResolver, UserResolver};

/// A chat message and the derived fields the rewriter maintains.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Post {
    pub message: String,
    pub channel_id: String,
    pub user_id: String,
    pub hashtags: String,
}

static HASHTAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)(#[\p{L}][\p{L}\p{N}_-]*)").unwrap());

/// Extract hashtags from a message, space-separated in source order.
pub fn parse_hashtags(message: &str) -> String {
    let tags: Vec<&str> = HASHTAG_RE
        .captures_iter(message)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect();
    tags.join(" ")
}

/// Rewrite `post` against `rules`, returning the (possibly new) post and
/// whether it changed.
///
/// Channel/team resolution happens at most once, and only when some active
/// rule is scoped; the author bot-check happens at most once, and only
/// after a rule has actually produced a candidate rewrite.
pub fn process_post(
    rules: &[CompiledRule],
    post: &Post,
    channels: &dyn ChannelResolver,
    users: &dyn UserResolver,
) -> (Post, bool) {
    let active: Vec<&CompiledRule> = rules.iter().filter(|r| r.is_active()).collect();
    if active.is_empty() {
        return (post.clone(), false);
    }

    let needs_scope = active.iter().any(|r| !r.rule().scope.is_empty());
    let resolved = if needs_scope {
        match channels.resolve(&post.channel_id) {
            Ok(info) => Some(info),
            Err(err) => {
                warn!(
                    "failed to resolve channel {:?}: {}; scoped rules skipped",
                    post.channel_id, err
                );
                None
            }
        }
    } else {
        None
    };

    let mut message = post.message.clone();
    let mut offset: isize = 0;
    let mut bot_cache: Option<bool> = None;

    for span in markdown::rewritable_spans(&post.message) {
        let mut current = span.text.clone();
        for rule in &active {
            if !rule.rule().scope.is_empty() {
                match &resolved {
                    Some(info) if rule.rule().matches_scope(&info.team_name, &info.channel_name) => {}
                    _ => continue,
                }
            }

            let candidate = rule.replace(&current);
            if candidate == current {
                continue;
            }
            if !rule.rule().process_bot_posts
                && author_is_bot(&mut bot_cache, users, &post.user_id)
            {
                // Discard this rule's change; later rules still apply to
                // the text as it was before the attempt.
                continue;
            }
            current = candidate;
        }

        if current != span.text {
            let start = usize::try_from(span.start as isize + offset).unwrap_or(0);
            let end = usize::try_from(span.end as isize + offset).unwrap_or(0);
            message.replace_range(start..end, &current);
            offset += current.len() as isize - span.text.len() as isize;
        }
    }

    if message == post.message {
        return (post.clone(), false);
    }

    let mut updated = post.clone();
    updated.message = message;
    updated.hashtags = parse_hashtags(&updated.message);
    (updated, true)
}

fn author_is_bot(cache: &mut Option<bool>, users: &dyn UserResolver, user_id: &str) -> bool {
    if let Some(is_bot) = *cache {
        return is_bot;
    }
    let is_bot = match users.get_user(user_id) {
        Ok(user) => user.is_bot,
        Err(err) => {
            warn!("failed to check whether {:?} is a bot: {}", user_id, err);
            false
        }
    };
    *cache = Some(is_bot);
    is_bot
}
