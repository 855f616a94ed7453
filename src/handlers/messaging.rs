//! Messaging library: PRIVMSG and NOTICE.
//!
//! Both share one delivery path. The difference is error reporting:
//! NOTICE never generates a reply.

use super::{Context, Handler, HandlerError, HandlerResult, Library};
use crate::error::ChannelError;
use crate::state::{ClientField, normalize_channel_name};
use async_trait::async_trait;
use minirc_proto::Message;
use tracing::debug;

pub(super) fn library() -> Library {
    Library::new("messaging")
        .command("privmsg", PrivmsgHandler)
        .command("notice", NoticeHandler)
}

/// Handler for PRIVMSG command.
pub struct PrivmsgHandler;

#[async_trait]
impl Handler for PrivmsgHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        route_message(ctx, msg, "PRIVMSG").await
    }
}

/// Handler for NOTICE command.
pub struct NoticeHandler;

#[async_trait]
impl Handler for NoticeHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        match route_message(ctx, msg, "NOTICE").await {
            Err(e @ HandlerError::SessionGone(_)) => Err(e),
            Err(e) => {
                debug!(error = %e, "NOTICE dropped");
                Ok(Vec::new())
            }
            ok => ok,
        }
    }
}

/// Deliver `<target> :<text>` to a channel or a nick.
///
/// Channel messages reach every other member. A message to one's own nick
/// comes back as a direct reply.
async fn route_message(ctx: &mut Context<'_>, msg: &Message, command: &str) -> HandlerResult {
    let session = ctx.registered_session()?;

    let target = msg.arg(0).ok_or(HandlerError::NeedMoreParams)?;
    let text = msg.trailing.as_str();
    if text.trim().is_empty() {
        return Err(HandlerError::NeedMoreParams);
    }

    let out = Message::new(command)
        .with_prefix(session.identity())
        .with_arg(target)
        .with_trailing(text);

    if target.starts_with('#') {
        let name = normalize_channel_name(target)
            .ok_or_else(|| ChannelError::NoSuchChannel(target.to_string()))?;
        let recipients = ctx.matrix.channel_recipients(ctx.uid, &name)?;
        let delivered = ctx.matrix.broadcast(&out, &recipients).await;
        debug!(channel = %target, recipients = recipients.len(), delivered, "Channel message");
        return Ok(Vec::new());
    }

    let recipient = ctx
        .matrix
        .find_client(ClientField::Nick, target)
        .ok_or_else(|| HandlerError::NoSuchNick(target.to_string()))?;

    if recipient.uid == ctx.uid {
        return Ok(vec![out]);
    }
    ctx.matrix.send_to(recipient.uid, out).await;
    Ok(Vec::new())
}
