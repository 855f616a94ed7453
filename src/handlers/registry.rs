//! Command handler registry and dispatch.
//!
//! The table is built once from an ordered list of [`Library`] values and
//! is read-only afterwards. When two libraries register the same command
//! the one added first wins.

use super::{Context, Handler, HandlerResult, account, channel, info, keepalive, messaging};
use crate::error::HandlerError;
use crate::metrics;
use minirc_proto::Message;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{Instrument, Level, debug, span};

/// A named group of command handlers.
pub struct Library {
    name: &'static str,
    commands: Vec<(&'static str, Box<dyn Handler>)>,
}

impl Library {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            commands: Vec::new(),
        }
    }

    /// Register `handler` for `command` (matched case-insensitively).
    pub fn command(mut self, command: &'static str, handler: impl Handler + 'static) -> Self {
        self.commands.push((command, Box::new(handler)));
        self
    }
}

struct Entry {
    library: &'static str,
    handler: Box<dyn Handler>,
}

/// Builds a [`Registry`] from libraries in registration order.
#[derive(Default)]
pub struct RegistryBuilder {
    libraries: Vec<Library>,
}

impl RegistryBuilder {
    pub fn library(mut self, library: Library) -> Self {
        self.libraries.push(library);
        self
    }

    pub fn build(self) -> Registry {
        let mut handlers: HashMap<String, Entry> = HashMap::new();
        let mut command_counts = HashMap::new();

        for library in self.libraries {
            for (command, handler) in library.commands {
                let key = command.to_ascii_lowercase();
                if let Some(existing) = handlers.get(&key) {
                    debug!(
                        command = %key,
                        kept = existing.library,
                        shadowed = library.name,
                        "Duplicate command registration ignored"
                    );
                    continue;
                }
                command_counts.insert(key.clone(), AtomicU64::new(0));
                handlers.insert(
                    key,
                    Entry {
                        library: library.name,
                        handler,
                    },
                );
            }
        }

        Registry {
            handlers,
            command_counts,
        }
    }
}

/// Registry of command handlers.
pub struct Registry {
    handlers: HashMap<String, Entry>,
    /// Command usage counters
    command_counts: HashMap<String, AtomicU64>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// The standard command set: core, account, messaging, info, channel.
    pub fn new() -> Self {
        Self::builder()
            .library(keepalive::library())
            .library(account::library())
            .library(messaging::library())
            .library(info::library())
            .library(channel::library())
            .build()
    }

    /// Name of the library that handles `command`, if any.
    #[cfg(test)]
    pub fn resolve(&self, command: &str) -> Option<&'static str> {
        self.handlers
            .get(&command.to_ascii_lowercase())
            .map(|e| e.library)
    }

    /// How many times `command` has been dispatched.
    #[cfg(test)]
    pub fn command_count(&self, command: &str) -> u64 {
        self.command_counts
            .get(&command.to_ascii_lowercase())
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }

    /// Dispatch one message for the session in `ctx`.
    ///
    /// Returns the replies for that session: the handler's own output, the
    /// numeric for a failed command, or ERR_UNKNOWNCOMMAND. Messages without a
    /// command yield nothing. `Quit` and `SessionGone` are passed through
    /// for the connection loop to act on.
    pub async fn dispatch(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        if msg.is_empty() {
            return Ok(Vec::new());
        }

        // A client-supplied prefix updates the session's hostname.
        if msg.has_prefix() {
            let host = msg.prefix.clone();
            ctx.matrix.update_session(ctx.uid, |s| s.hostname = host);
        }

        let cmd = msg.command.to_ascii_lowercase();
        let cmd_name = cmd.to_ascii_uppercase();

        let Some(entry) = self.handlers.get(&cmd) else {
            debug!(command = %cmd_name, "Unknown command");
            let session = ctx.session()?;
            return Ok(vec![ctx.replies(&session).unknown_command(&cmd_name)]);
        };

        if let Some(counter) = self.command_counts.get(&cmd) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
        metrics::record_command(&cmd_name);

        let span = span!(
            Level::DEBUG,
            "command",
            command = %cmd_name,
            library = entry.library,
            uid = %ctx.uid
        );

        match entry.handler.handle(ctx, msg).instrument(span).await {
            Ok(replies) => Ok(replies),
            Err(e @ (HandlerError::Quit(_) | HandlerError::SessionGone(_))) => Err(e),
            Err(e) => {
                debug!(command = %cmd_name, error = %e, "Command error");
                metrics::record_command_error(&cmd_name, e.error_code());
                let session = ctx.session()?;
                Ok(e.to_irc_reply(&ctx.replies(&session), &cmd_name)
                    .into_iter()
                    .collect())
            }
        }
    }
}
