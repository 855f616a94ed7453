//! Channel library: JOIN, PART and TOPIC.
//!
//! Channel names are matched case-insensitively; the display form is
//! `#` plus the lowercased name.

use super::{Context, Handler, HandlerError, HandlerResult, Library, trailing_or_arg};
use crate::error::ChannelError;
use crate::state::{JoinOutcome, normalize_channel_name};
use async_trait::async_trait;
use minirc_proto::Message;
use tracing::debug;

pub(super) fn library() -> Library {
    Library::new("channel")
        .command("join", JoinHandler)
        .command("part", PartHandler)
        .command("topic", TopicHandler)
}

/// Split a comma-separated channel list, skipping empty entries.
fn channel_list(arg: &str) -> impl Iterator<Item = &str> {
    arg.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Handler for JOIN command.
///
/// `JOIN <#chan>{,<#chan>}`. Joining a channel already joined is a no-op.
pub struct JoinHandler;

#[async_trait]
impl Handler for JoinHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let session = ctx.registered_session()?;
        let list = trailing_or_arg(msg, 0).ok_or(HandlerError::NeedMoreParams)?;

        let replies = ctx.replies(&session);
        let mut out = Vec::new();

        for token in channel_list(list) {
            let Some(name) = normalize_channel_name(token) else {
                out.push(replies.no_such_channel(token));
                continue;
            };
            let wire_name = format!("#{name}");

            let outcome = ctx
                .matrix
                .join_channel(ctx.uid, &name)
                .ok_or(HandlerError::SessionGone(ctx.uid))?;

            let JoinOutcome::Joined {
                created,
                topic,
                names,
                others,
            } = outcome
            else {
                continue;
            };
            debug!(channel = %wire_name, created, members = names.len(), "Joined channel");

            let join = replies.join(&wire_name);
            ctx.matrix.broadcast(&join, &others).await;

            out.push(join);
            if !topic.is_empty() {
                out.push(replies.topic(&wire_name, &topic));
            }
            out.push(replies.names(&wire_name, &names));
            out.push(replies.end_of_names(&wire_name));
        }

        Ok(out)
    }
}

/// Handler for PART command.
///
/// `PART <#chan>{,<#chan>} [:<reason>]`. The PART is relayed to the
/// remaining members and echoed to the client.
pub struct PartHandler;

#[async_trait]
impl Handler for PartHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let session = ctx.registered_session()?;
        let list = msg.arg(0).ok_or(HandlerError::NeedMoreParams)?;

        let replies = ctx.replies(&session);
        let mut out = Vec::new();

        for token in channel_list(list) {
            let Some(name) = normalize_channel_name(token) else {
                out.push(replies.no_such_channel(token));
                continue;
            };
            let wire_name = format!("#{name}");

            match ctx.matrix.part_channel(ctx.uid, &name) {
                Ok(others) => {
                    let part = replies
                        .from_client("PART")
                        .with_arg(wire_name.as_str())
                        .with_trailing(msg.trailing.as_str());
                    ctx.matrix.broadcast(&part, &others).await;
                    out.push(part);
                }
                Err(e) => out.push(e.to_irc_reply(&replies)),
            }
        }

        Ok(out)
    }
}

/// Handler for TOPIC command.
///
/// `TOPIC <#chan>` queries, `TOPIC <#chan> :<text>` sets. Any member may
/// set the topic.
pub struct TopicHandler;

#[async_trait]
impl Handler for TopicHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let session = ctx.registered_session()?;
        let token = msg.arg(0).ok_or(HandlerError::NeedMoreParams)?;
        let name = normalize_channel_name(token)
            .ok_or_else(|| ChannelError::NoSuchChannel(token.to_string()))?;
        let wire_name = format!("#{name}");
        let replies = ctx.replies(&session);

        let text = if msg.trailing.is_empty() {
            msg.args[1..].join(" ")
        } else {
            msg.trailing.clone()
        };

        if text.trim().is_empty() {
            let topic = ctx.matrix.topic(ctx.uid, &name)?;
            return Ok(vec![if topic.is_empty() {
                replies.no_topic(&wire_name)
            } else {
                replies.topic(&wire_name, &topic)
            }]);
        }

        let others = ctx.matrix.set_topic(ctx.uid, &name, &text)?;
        let relay = replies
            .from_client("TOPIC")
            .with_arg(wire_name.as_str())
            .with_trailing(text.as_str());
        ctx.matrix.broadcast(&relay, &others).await;

        Ok(vec![replies.topic(&wire_name, &text)])
    }
}
