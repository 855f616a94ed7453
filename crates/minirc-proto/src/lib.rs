//! # minirc-proto
//!
//! Wire layer for the minircd chat server: a small line-oriented message
//! grammar, the numeric reply codes the server emits, and tokio codecs that
//! frame a byte stream into messages.
//!
//! ## Parsing and serializing
//!
//! ```rust
//! use minirc_proto::Message;
//!
//! let msg = Message::parse(":nick!user@host PRIVMSG bob :hello there");
//! assert_eq!(msg.prefix, "nick!user@host");
//! assert_eq!(msg.command, "privmsg");
//! assert_eq!(msg.args, vec!["bob"]);
//! assert_eq!(msg.trailing, "hello there");
//!
//! let reply = Message::new("PONG").with_arg("irc.example.net");
//! assert_eq!(reply.to_wire(), "PONG irc.example.net \r\n");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
#[cfg(feature = "tokio")]
pub mod irc;
#[cfg(feature = "tokio")]
pub mod line;
pub mod message;
pub mod response;

pub use self::error::{ProtocolError, Result};
#[cfg(feature = "tokio")]
pub use self::irc::IrcCodec;
#[cfg(feature = "tokio")]
pub use self::line::{LineCodec, MAX_LINE_LEN};
pub use self::message::Message;
pub use self::response::Response;
