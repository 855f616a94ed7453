use std::convert::Infallible;
use std::str::FromStr;

use super::Message;

impl Message {
    /// Parse one line into a message.
    ///
    /// Parsing is total: anything that does not yield a command word produces
    /// a message whose `command` is empty.
    ///
    /// A leading `:` introduces the prefix, which runs to the first space.
    /// The remaining text is split at its first `:`; the part before it is
    /// split on spaces (empty tokens dropped) into the command and arguments,
    /// the part after it is the trimmed trailing text.
    pub fn parse(line: &str) -> Message {
        let line = line.trim_end_matches(&['\r', '\n'][..]);

        let (prefix, rest) = match line.strip_prefix(':') {
            Some(stripped) => stripped.split_once(' ').unwrap_or((stripped, "")),
            None => ("", line),
        };

        let (head, trailing) = match rest.split_once(':') {
            Some((head, trailing)) => (head, trailing.trim()),
            None => (rest, ""),
        };

        let mut tokens = head.split(' ').map(str::trim).filter(|t| !t.is_empty());
        let Some(command) = tokens.next() else {
            return Message {
                prefix: prefix.to_string(),
                trailing: trailing.to_string(),
                ..Default::default()
            };
        };

        Message {
            prefix: prefix.to_string(),
            command: command.to_ascii_lowercase(),
            args: tokens.map(str::to_string).collect(),
            trailing: trailing.to_string(),
        }
    }
}

impl FromStr for Message {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Message::parse(s))
    }
}

impl From<&str> for Message {
    fn from(s: &str) -> Self {
        Message::parse(s)
    }
}
