//! Command handlers.
//!
//! This module contains the Handler trait, the per-dispatch [`Context`], and
//! the [`Registry`] that maps command names to handlers. Handlers are grouped
//! into libraries:
//!
//! - core: PING, PONG
//! - account: NICK, USER, QUIT
//! - messaging: PRIVMSG, NOTICE
//! - info: MOTD, LUSERS, WHOIS
//! - channel: JOIN, PART, TOPIC

mod account;
mod channel;
mod info;
mod keepalive;
mod messaging;
mod registry;

pub use registry::{Library, Registry};

pub use crate::error::{HandlerError, HandlerResult};

use crate::replies::Replies;
use crate::state::{Matrix, Session, Uid};
use async_trait::async_trait;
use minirc_proto::Message;
use std::sync::Arc;

/// Handler context passed to each command handler.
pub struct Context<'a> {
    /// The session this command came from.
    pub uid: Uid,
    /// Shared server state.
    pub matrix: &'a Arc<Matrix>,
}

impl Context<'_> {
    /// Snapshot of the calling session.
    pub fn session(&self) -> Result<Session, HandlerError> {
        self.matrix
            .session(self.uid)
            .ok_or(HandlerError::SessionGone(self.uid))
    }

    /// Snapshot of the calling session, which must be authenticated.
    pub fn registered_session(&self) -> Result<Session, HandlerError> {
        let session = self.session()?;
        if !session.is_authenticated() {
            return Err(HandlerError::NotRegistered);
        }
        Ok(session)
    }

    /// Reply builder bound to this server and `session`.
    pub fn replies<'s>(&'s self, session: &'s Session) -> Replies<'s> {
        Replies::new(&self.matrix.server_info, session)
    }
}

/// A command handler.
///
/// Returned messages go to the calling session only; anything addressed to
/// other sessions is delivered by the handler through the [`Matrix`].
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult;
}

/// The trailing text, falling back to the `n`th argument.
pub(crate) fn trailing_or_arg(msg: &Message, n: usize) -> Option<&str> {
    if msg.trailing.is_empty() {
        msg.arg(n)
    } else {
        Some(msg.trailing.as_str())
    }
}
