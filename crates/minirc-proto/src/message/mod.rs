//! Structured protocol messages.
//!
//! A [`Message`] is the parsed form of one wire line: an optional prefix
//! (source), a lowercased command word, space separated arguments and an
//! optional trailing text that may contain spaces and colons.

mod parse;
mod serialize;

/// One protocol line in structured form.
///
/// Empty strings stand for absent parts: a message with an empty `command`
/// is never dispatched and serializes to nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Message {
    /// Source of the message (`nick!user@host` or a server name), without the colon.
    pub prefix: String,
    /// Command word or three digit numeric.
    pub command: String,
    /// Middle arguments. None of them contain whitespace.
    pub args: Vec<String>,
    /// Final argument introduced by `:`.
    pub trailing: String,
}

impl Message {
    /// Start a message with the given command and no other parts.
    pub fn new(command: impl Into<String>) -> Self {
        Message {
            command: command.into(),
            ..Default::default()
        }
    }

    /// Set the prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Append one middle argument.
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several middle arguments.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the trailing text.
    #[must_use]
    pub fn with_trailing(mut self, trailing: impl Into<String>) -> Self {
        self.trailing = trailing.into();
        self
    }

    /// The `n`th middle argument, if present.
    pub fn arg(&self, n: usize) -> Option<&str> {
        self.args.get(n).map(String::as_str)
    }

    /// True when the message has no command and must be dropped.
    pub fn is_empty(&self) -> bool {
        self.command.is_empty()
    }

    /// True when a prefix was supplied.
    pub fn has_prefix(&self) -> bool {
        !self.prefix.is_empty()
    }
}
