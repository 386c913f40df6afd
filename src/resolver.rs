//! Resolver seams for channel, team and user lookups
//!
//! The rewriter only needs two synchronous lookups from its host: channel
//! id to channel/team names (for scoping) and user id to bot-ness (for
//! `process_bot_posts`). Lookup failure is never fatal to a message.

use thiserror::Error;

/// Channel/team/user lookup failure.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("channel {0:?} not found")]
    ChannelNotFound(String),

    #[error("user {0:?} not found")]
    UserNotFound(String),

    #[error("lookup failed: {0}")]
    Other(String),
}

/// Resolved channel identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelInfo {
    pub channel_name: String,
    /// Empty for teamless channels (group/direct messages).
    pub team_name: String,
}

/// Resolved user identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserInfo {
    pub is_bot: bool,
}

/// Resolves a channel id to channel and team names.
pub trait ChannelResolver {
    fn resolve(&self, channel_id: &str) -> Result<ChannelInfo, ResolveError>;
}

/// Resolves a user id to its bot flag.
pub trait UserResolver {
    fn get_user(&self, user_id: &str) -> Result<UserInfo, ResolveError>;
}

/// Fixed-answer resolver for the CLI and for tests.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    pub channel_name: String,
    pub team_name: String,
    pub is_bot: bool,
}

impl ChannelResolver for StaticResolver {
    fn resolve(&self, _channel_id: &str) -> Result<ChannelInfo, ResolveError> {
        Ok(ChannelInfo {
            channel_name: self.channel_name.clone(),
            team_name: self.team_name.clone(),
        })
    }
}

impl UserResolver for StaticResolver {
    fn get_user(&self, _user_id: &str) -> Result<UserInfo, ResolveError> {
        Ok(UserInfo { is_bot: self.is_bot })
    }
}

/// Resolver that always fails, for exercising the fallback paths.
#[derive(Debug, Clone, Default)]
pub struct FailingResolver;

impl ChannelResolver for FailingResolver {
    fn resolve(&self, channel_id: &str) -> Result<ChannelInfo, ResolveError> {
        Err(ResolveError::ChannelNotFound(channel_id.to_string()))
    }
}

impl UserResolver for FailingResolver {
    fn get_user(&self, user_id: &str) -> Result<UserInfo, ResolveError> {
        Err(ResolveError::UserNotFound(user_id.to_string()))
    }
}
