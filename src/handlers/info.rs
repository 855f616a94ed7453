//! Info library: MOTD, LUSERS and WHOIS.

use super::account::motd_replies;
use super::{Context, Handler, HandlerError, HandlerResult, Library};
use crate::state::ClientField;
use async_trait::async_trait;
use minirc_proto::Message;

pub(super) fn library() -> Library {
    Library::new("info")
        .command("motd", MotdHandler)
        .command("lusers", LusersHandler)
        .command("whois", WhoisHandler)
}

/// Handler for MOTD command.
pub struct MotdHandler;

#[async_trait]
impl Handler for MotdHandler {
    async fn handle(&self, ctx: &mut Context<'_>, _msg: &Message) -> HandlerResult {
        let session = ctx.registered_session()?;
        if ctx.matrix.motd.lines().is_none() {
            return Err(HandlerError::NoMotd);
        }
        Ok(motd_replies(ctx.matrix, &ctx.replies(&session)))
    }
}

/// Handler for LUSERS command.
///
/// There are no operators or services, and only ever one server.
pub struct LusersHandler;

#[async_trait]
impl Handler for LusersHandler {
    async fn handle(&self, ctx: &mut Context<'_>, _msg: &Message) -> HandlerResult {
        let session = ctx.registered_session()?;
        let stats = ctx.matrix.stats();
        let replies = ctx.replies(&session);

        Ok(vec![
            replies.luser_client(stats.users),
            replies.luser_op(0),
            replies.luser_unknown(stats.unknown),
            replies.luser_channels(stats.channels),
            replies.luser_me(stats.users + stats.unknown),
        ])
    }
}

/// Handler for WHOIS command.
///
/// `WHOIS [<server>] <nick>`: the nick is the last argument.
pub struct WhoisHandler;

#[async_trait]
impl Handler for WhoisHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let session = ctx.registered_session()?;

        let nick = msg
            .args
            .last()
            .map(String::as_str)
            .ok_or(HandlerError::NoNicknameGiven)?;

        let target = ctx
            .matrix
            .find_client(ClientField::Nick, nick)
            .ok_or_else(|| HandlerError::NoSuchNick(nick.to_string()))?;

        let replies = ctx.replies(&session);
        Ok(vec![
            replies.whois_user(&target),
            replies.whois_server(&target.nick),
            replies.end_of_whois(&target.nick),
        ])
    }
}
