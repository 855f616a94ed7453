//! Reply generator.
//!
//! [`Replies`] is bound to this server and one client session. Every
//! builder is pure and returns a fresh [`Message`]: numerics carry the
//! server name as prefix and the client's nick as first argument.

use minirc_proto::{Message, Response};

use crate::state::{ServerInfo, Session};

/// Builds replies addressed to one session.
pub struct Replies<'a> {
    server: &'a ServerInfo,
    client: &'a Session,
}

impl<'a> Replies<'a> {
    pub fn new(server: &'a ServerInfo, client: &'a Session) -> Self {
        Self { server, client }
    }

    /// Numeric reply skeleton: `:<server> <code> <nick> <args..> :<trailing>`.
    fn numeric<I, S>(&self, response: Response, args: I, trailing: impl Into<String>) -> Message
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Message::new(response.to_string())
            .with_prefix(self.server.name.as_str())
            .with_arg(self.client.nick.as_str())
            .with_args(args)
            .with_trailing(trailing)
    }

    /// A message sourced from the client itself (`:<identity> <command> ...`),
    /// used for relays such as JOIN, PART, PRIVMSG and NICK.
    pub fn from_client(&self, command: &str) -> Message {
        Message::new(command).with_prefix(self.client.identity())
    }

    // === Registration burst ===

    /// RPL_WELCOME (001)
    pub fn welcome(&self) -> Message {
        self.numeric(
            Response::RPL_WELCOME,
            None::<String>,
            format!(
                "Welcome to the Internet Relay Network {}",
                self.client.identity()
            ),
        )
    }

    /// RPL_YOURHOST (002)
    pub fn your_host(&self) -> Message {
        self.numeric(
            Response::RPL_YOURHOST,
            None::<String>,
            format!(
                "Your host is {}, running version {}",
                self.server.name, self.server.version
            ),
        )
    }

    /// RPL_CREATED (003)
    pub fn created(&self) -> Message {
        self.numeric(
            Response::RPL_CREATED,
            None::<String>,
            format!(
                "This server was created {}",
                self.server.created.format("%a %b %d %Y at %H:%M:%S UTC")
            ),
        )
    }

    /// RPL_MYINFO (004). No user or channel modes exist, so both mode sets
    /// are empty and drop out of the serialized line.
    pub fn my_info(&self) -> Message {
        self.numeric(
            Response::RPL_MYINFO,
            [self.server.name.as_str(), self.server.version.as_str(), "", ""],
            "",
        )
    }

    // === Keepalive ===

    /// Server-initiated PING.
    pub fn ping(&self) -> Message {
        Message::new("PING")
            .with_prefix(self.server.name.as_str())
            .with_args([self.server.name.as_str(), self.client.hostname.as_str()])
    }

    /// Answer to a client PING, echoing its token when it sent one.
    pub fn pong(&self, token: Option<&str>) -> Message {
        match token {
            Some(token) => Message::new("PONG")
                .with_prefix(self.server.name.as_str())
                .with_arg(self.server.name.as_str())
                .with_trailing(token),
            None => Message::new("PONG")
                .with_args([self.server.name.as_str(), self.client.hostname.as_str()]),
        }
    }

    // === MOTD ===

    /// RPL_MOTDSTART (375)
    pub fn motd_start(&self) -> Message {
        self.numeric(
            Response::RPL_MOTDSTART,
            None::<String>,
            format!("- {} Message of the day - ", self.server.name),
        )
    }

    /// RPL_MOTD (376)
    pub fn motd_line(&self, line: &str) -> Message {
        self.numeric(Response::RPL_MOTD, None::<String>, format!("- {}", line))
    }

    /// RPL_ENDOFMOTD (377)
    pub fn motd_end(&self) -> Message {
        self.numeric(Response::RPL_ENDOFMOTD, None::<String>, "End of MOTD command")
    }

    /// ERR_NOMOTD (422)
    pub fn no_motd(&self) -> Message {
        self.numeric(Response::ERR_NOMOTD, None::<String>, "MOTD File is missing")
    }

    // === LUSERS ===

    /// RPL_LUSERCLIENT (251)
    pub fn luser_client(&self, users: usize) -> Message {
        self.numeric(
            Response::RPL_LUSERCLIENT,
            None::<String>,
            format!("There are {} users and 0 services on 1 servers", users),
        )
    }

    /// RPL_LUSEROP (252)
    pub fn luser_op(&self, operators: usize) -> Message {
        self.numeric(
            Response::RPL_LUSEROP,
            [operators.to_string()],
            "operator(s) online",
        )
    }

    /// RPL_LUSERUNKNOWN (253)
    pub fn luser_unknown(&self, unknown: usize) -> Message {
        self.numeric(
            Response::RPL_LUSERUNKNOWN,
            [unknown.to_string()],
            "unknown connection(s)",
        )
    }

    /// RPL_LUSERCHANNELS (254)
    pub fn luser_channels(&self, channels: usize) -> Message {
        self.numeric(
            Response::RPL_LUSERCHANNELS,
            [channels.to_string()],
            "channels formed",
        )
    }

    /// RPL_LUSERME (255)
    pub fn luser_me(&self, clients: usize) -> Message {
        self.numeric(
            Response::RPL_LUSERME,
            None::<String>,
            format!("I have {} clients and 1 servers", clients),
        )
    }

    // === WHOIS ===

    /// RPL_WHOISUSER (311)
    pub fn whois_user(&self, target: &Session) -> Message {
        self.numeric(
            Response::RPL_WHOISUSER,
            [
                target.nick.as_str(),
                target.username.as_str(),
                target.hostname.as_str(),
                "*",
            ],
            target.fullname.as_str(),
        )
    }

    /// RPL_WHOISSERVER (312)
    pub fn whois_server(&self, target_nick: &str) -> Message {
        self.numeric(
            Response::RPL_WHOISSERVER,
            [target_nick, self.server.name.as_str()],
            self.server.description.as_str(),
        )
    }

    /// RPL_ENDOFWHOIS (318)
    pub fn end_of_whois(&self, target_nick: &str) -> Message {
        self.numeric(Response::RPL_ENDOFWHOIS, [target_nick], "End of WHOIS list")
    }

    // === Channels ===

    /// JOIN confirmation, sourced from the joining client.
    pub fn join(&self, channel: &str) -> Message {
        self.from_client("JOIN").with_arg(channel)
    }

    /// RPL_TOPIC (332)
    pub fn topic(&self, channel: &str, topic: &str) -> Message {
        self.numeric(Response::RPL_TOPIC, [channel], topic)
    }

    /// RPL_NOTOPIC (331)
    pub fn no_topic(&self, channel: &str) -> Message {
        self.numeric(Response::RPL_NOTOPIC, [channel], "No topic is set")
    }

    /// RPL_NAMREPLY (353)
    pub fn names(&self, channel: &str, nicks: &[String]) -> Message {
        self.numeric(Response::RPL_NAMREPLY, ["=", channel], nicks.join(" "))
    }

    /// RPL_ENDOFNAMES (366)
    pub fn end_of_names(&self, channel: &str) -> Message {
        self.numeric(Response::RPL_ENDOFNAMES, [channel], "End of NAMES list")
    }

    // === Errors ===

    /// ERR_NOSUCHNICK (401)
    pub fn no_such_nick(&self, target: &str) -> Message {
        self.numeric(Response::ERR_NOSUCHNICK, [target], "No such nick/channel")
    }

    /// ERR_NOSUCHCHANNEL (403)
    pub fn no_such_channel(&self, channel: &str) -> Message {
        self.numeric(Response::ERR_NOSUCHCHANNEL, [channel], "No such channel")
    }

    /// ERR_CANNOTSENDTOCHAN (404)
    pub fn cannot_send_to_chan(&self, channel: &str) -> Message {
        self.numeric(
            Response::ERR_CANNOTSENDTOCHAN,
            [channel],
            "Cannot send to channel",
        )
    }

    /// ERR_UNKNOWNCOMMAND (421)
    pub fn unknown_command(&self, command: &str) -> Message {
        self.numeric(
            Response::ERR_UNKNOWNCOMMAND,
            [command.to_ascii_uppercase()],
            "Unknown command",
        )
    }

    /// ERR_NONICKNAMEGIVEN (431)
    pub fn no_nickname_given(&self) -> Message {
        self.numeric(Response::ERR_NONICKNAMEGIVEN, None::<String>, "No nickname given")
    }

    /// ERR_NICKNAMEINUSE (433)
    pub fn nickname_in_use(&self, nick: &str) -> Message {
        self.numeric(
            Response::ERR_NICKNAMEINUSE,
            [nick],
            "Nickname is already in use",
        )
    }

    /// ERR_NOTONCHANNEL (442)
    pub fn not_on_channel(&self, channel: &str) -> Message {
        self.numeric(
            Response::ERR_NOTONCHANNEL,
            [channel],
            "You're not on that channel",
        )
    }

    /// ERR_NEEDMOREPARAMS (461)
    pub fn need_more_params(&self, command: &str) -> Message {
        self.numeric(
            Response::ERR_NEEDMOREPARAMS,
            [command.to_ascii_uppercase()],
            "Not enough parameters",
        )
    }

    /// ERR_ALREADYREGISTERED (462)
    pub fn already_registered(&self) -> Message {
        self.numeric(
            Response::ERR_ALREADYREGISTERED,
            None::<String>,
            "Unauthorized command (already registered)",
        )
    }

    /// `ERROR :Closing Link: <host> (<reason>)`, sent before the server drops
    /// the connection.
    pub fn closing_link(&self, reason: &str) -> Message {
        Message::new("ERROR")
            .with_prefix(self.server.name.as_str())
            .with_trailing(format!(
                "Closing Link: {} ({})",
                self.client.hostname, reason
            ))
    }
}
