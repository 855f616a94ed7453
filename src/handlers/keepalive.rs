//! Core library: PING and PONG.

use super::{Context, Handler, HandlerResult, Library, trailing_or_arg};
use async_trait::async_trait;
use minirc_proto::Message;

pub(super) fn library() -> Library {
    Library::new("core")
        .command("ping", PingHandler)
        .command("pong", PongHandler)
}

/// Handler for PING command.
///
/// Allowed before registration. The token, if any, is echoed back.
pub struct PingHandler;

#[async_trait]
impl Handler for PingHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let session = ctx.session()?;
        let token = trailing_or_arg(msg, 0);
        Ok(vec![ctx.replies(&session).pong(token)])
    }
}

/// Handler for PONG command. Replies to our keepalive PINGs are accepted
/// and otherwise ignored.
pub struct PongHandler;

#[async_trait]
impl Handler for PongHandler {
    async fn handle(&self, _ctx: &mut Context<'_>, _msg: &Message) -> HandlerResult {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::TestBed;

    #[tokio::test]
    async fn ping_with_token() {
        let bed = TestBed::new();
        let s = bed.connect();

        let out = bed.send(&s, "PING :abc123").await.unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].to_wire(), ":irc.test PONG irc.test :abc123\r\n");

        let out = bed.send(&s, "PING xyz").await.unwrap();
        assert_eq!(out[0].trailing, "xyz");
    }

    #[tokio::test]
    async fn ping_without_token_names_the_client_host() {
        let bed = TestBed::new();
        let s = bed.connect();

        let out = bed.send(&s, "PING").await.unwrap();
        assert_eq!(out[0].to_wire(), "PONG irc.test 127.0.0.1 \r\n");
    }

    #[tokio::test]
    async fn pong_is_silent() {
        let bed = TestBed::new();
        let s = bed.connect();
        assert!(bed.send(&s, "PONG irc.test").await.unwrap().is_empty());
    }
}
