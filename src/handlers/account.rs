//! Account library: NICK, USER and QUIT, plus the registration burst.

use super::{Context, Handler, HandlerError, HandlerResult, Library, trailing_or_arg};
use crate::replies::Replies;
use crate::state::{Matrix, NickChange, PLACEHOLDER, Session, UserChange};
use async_trait::async_trait;
use minirc_proto::Message;
use tracing::info;

pub(super) fn library() -> Library {
    Library::new("account")
        .command("nick", NickHandler)
        .command("user", UserHandler)
        .command("quit", QuitHandler)
}

/// The burst a client receives once it becomes authenticated: the welcome
/// numerics (001-004) followed by the MOTD.
pub fn introduce_to_client(matrix: &Matrix, session: &Session) -> Vec<Message> {
    let replies = Replies::new(&matrix.server_info, session);
    let mut out = vec![
        replies.welcome(),
        replies.your_host(),
        replies.created(),
        replies.my_info(),
    ];
    out.extend(motd_replies(matrix, &replies));
    out
}

/// RPL_MOTDSTART, one RPL_MOTD per line and RPL_ENDOFMOTD; or ERR_NOMOTD.
pub(super) fn motd_replies(matrix: &Matrix, replies: &Replies<'_>) -> Vec<Message> {
    let Some(lines) = matrix.motd.lines() else {
        return vec![replies.no_motd()];
    };
    let mut out = Vec::with_capacity(lines.len() + 2);
    out.push(replies.motd_start());
    out.extend(lines.iter().map(|line| replies.motd_line(line)));
    out.push(replies.motd_end());
    out
}

/// Handler for NICK command.
///
/// The nick must be unique among all connected sessions. Before
/// registration this only records the nick; afterwards the change is
/// relayed to the client and everyone sharing a channel with it.
pub struct NickHandler;

#[async_trait]
impl Handler for NickHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let nick = msg
            .arg(0)
            .or_else(|| msg.trailing.split_whitespace().next())
            .filter(|n| *n != PLACEHOLDER)
            .ok_or(HandlerError::NoNicknameGiven)?;

        let change = ctx
            .matrix
            .change_nick(ctx.uid, nick)
            .ok_or(HandlerError::SessionGone(ctx.uid))?;

        match change {
            NickChange::InUse => Err(HandlerError::NicknameInUse(nick.to_string())),
            NickChange::Unchanged => Ok(Vec::new()),
            NickChange::Changed {
                old_identity,
                was_authenticated,
                newly_authenticated,
                peers,
                session,
            } => {
                let mut out = Vec::new();
                if was_authenticated {
                    let relay = Message::new("NICK")
                        .with_prefix(old_identity)
                        .with_arg(nick);
                    ctx.matrix.broadcast(&relay, &peers).await;
                    out.push(relay);
                }
                if newly_authenticated {
                    info!(nick = %session.nick, user = %session.username, "Client registered");
                    out.extend(introduce_to_client(ctx.matrix, &session));
                }
                Ok(out)
            }
        }
    }
}

/// Handler for USER command.
///
/// `USER <username> <mode> <unused> :<realname>`. Only the username and
/// realname are used; a username already held by an authenticated session
/// is silently refused.
pub struct UserHandler;

#[async_trait]
impl Handler for UserHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let username = msg.arg(0).ok_or(HandlerError::NeedMoreParams)?;
        let fullname = realname(msg).ok_or(HandlerError::NeedMoreParams)?;

        let change = ctx
            .matrix
            .set_user(ctx.uid, username, &fullname)
            .ok_or(HandlerError::SessionGone(ctx.uid))?;

        match change {
            UserChange::AlreadyRegistered => Err(HandlerError::AlreadyRegistered),
            UserChange::Taken => Ok(Vec::new()),
            UserChange::NickInUse(nick) => Err(HandlerError::NicknameInUse(nick)),
            UserChange::Set {
                newly_authenticated: true,
                session,
            } => {
                info!(nick = %session.nick, user = %session.username, "Client registered");
                Ok(introduce_to_client(ctx.matrix, &session))
            }
            UserChange::Set { .. } => Ok(Vec::new()),
        }
    }
}

/// Realname of a USER line: the trailing text, else every word from the
/// fourth argument on.
fn realname(msg: &Message) -> Option<String> {
    if !msg.trailing.is_empty() {
        return Some(msg.trailing.clone());
    }
    let words = msg.args.get(3..)?;
    if words.is_empty() {
        return None;
    }
    Some(words.join(" "))
}

/// Handler for QUIT command.
///
/// Ends the connection; the reason defaults to "Client Quit".
pub struct QuitHandler;

#[async_trait]
impl Handler for QuitHandler {
    async fn handle(&self, _ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let reason = trailing_or_arg(msg, 0).unwrap_or("Client Quit");
        Err(HandlerError::Quit(reason.to_string()))
    }
}
