//! Error handling for minircd.
//!
//! Command errors carry enough information to be turned into the numeric
//! reply the offending client sees, and a static label for metrics.

use minirc_proto::Message;
use thiserror::Error;

use crate::replies::Replies;
use crate::state::Uid;

// ============================================================================
// Handler Errors (command processing)
// ============================================================================

/// Errors that can occur during command handling.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("not enough parameters")]
    NeedMoreParams,

    #[error("no nickname given")]
    NoNicknameGiven,

    #[error("nickname in use: {0}")]
    NicknameInUse(String),

    /// Command needs an authenticated session; dropped without a reply.
    #[error("not registered")]
    NotRegistered,

    #[error("already registered")]
    AlreadyRegistered,

    #[error("no such nick: {0}")]
    NoSuchNick(String),

    #[error("MOTD file is missing")]
    NoMotd,

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error("client quit: {0}")]
    Quit(String),

    #[error("session {0} vanished")]
    SessionGone(Uid),
}

impl HandlerError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NeedMoreParams => "need_more_params",
            Self::NoNicknameGiven => "no_nickname_given",
            Self::NicknameInUse(_) => "nickname_in_use",
            Self::NotRegistered => "not_registered",
            Self::AlreadyRegistered => "already_registered",
            Self::NoSuchNick(_) => "no_such_nick",
            Self::NoMotd => "no_motd",
            Self::Channel(e) => e.error_code(),
            Self::Quit(_) => "quit",
            Self::SessionGone(_) => "session_gone",
        }
    }

    /// Convert to a numeric reply for the client that caused it.
    ///
    /// Returns `None` for errors that don't warrant a client-visible reply.
    pub fn to_irc_reply(&self, replies: &Replies<'_>, cmd_name: &str) -> Option<Message> {
        let msg = match self {
            Self::NeedMoreParams => replies.need_more_params(cmd_name),
            Self::NoNicknameGiven => replies.no_nickname_given(),
            Self::NicknameInUse(nick) => replies.nickname_in_use(nick),
            Self::AlreadyRegistered => replies.already_registered(),
            Self::NoSuchNick(target) => replies.no_such_nick(target),
            Self::NoMotd => replies.no_motd(),
            Self::Channel(e) => e.to_irc_reply(replies),

            // These errors don't get client-visible replies
            Self::NotRegistered => return None,
            Self::Quit(_) => return None,
            Self::SessionGone(_) => return None,
        };
        Some(msg)
    }
}

/// Result type for command handlers: replies for the calling session.
pub type HandlerResult = Result<Vec<Message>, HandlerError>;

// ============================================================================
// Channel Errors
// ============================================================================

/// Channel operation errors, carrying the channel's wire name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("no such channel: {0}")]
    NoSuchChannel(String),

    #[error("not on channel {0}")]
    NotOnChannel(String),

    #[error("cannot send to channel {0}")]
    CannotSendToChan(String),
}

impl ChannelError {
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoSuchChannel(_) => "no_such_channel",
            Self::NotOnChannel(_) => "not_on_channel",
            Self::CannotSendToChan(_) => "cannot_send_to_chan",
        }
    }

    pub fn to_irc_reply(&self, replies: &Replies<'_>) -> Message {
        match self {
            Self::NoSuchChannel(name) => replies.no_such_channel(name),
            Self::NotOnChannel(name) => replies.not_on_channel(name),
            Self::CannotSendToChan(name) => replies.cannot_send_to_chan(name),
        }
    }
}
