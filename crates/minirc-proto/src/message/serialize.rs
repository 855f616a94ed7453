use std::fmt::{self, Display, Formatter};

use super::Message;

impl Display for Message {
    /// Writes the wire form, including the terminating `\r\n`.
    ///
    /// A message without a command writes nothing.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.command.is_empty() {
            return Ok(());
        }

        let prefix: String = self.prefix.chars().filter(|c| !c.is_whitespace()).collect();
        if !prefix.is_empty() {
            write!(f, ":{} ", prefix)?;
        }

        write!(f, "{} ", self.command)?;

        let mut wrote_arg = false;
        for arg in self.args.iter().map(|a| a.trim()).filter(|a| !a.is_empty()) {
            if wrote_arg {
                write!(f, " ")?;
            }
            write!(f, "{}", arg)?;
            wrote_arg = true;
        }
        if wrote_arg {
            write!(f, " ")?;
        }

        let trailing = self.trailing.trim();
        if !trailing.is_empty() {
            write!(f, ":{}", trailing)?;
        }

        write!(f, "\r\n")
    }
}

impl Message {
    /// Serialize to a wire line. Empty when the command is empty.
    pub fn to_wire(&self) -> String {
        self.to_string()
    }
}
