//! Numeric reply codes emitted by the server.
//!
//! Only the subset the server actually sends is listed. Codes follow
//! RFC 2812 numbering and are written on the wire as three digits.

#![allow(non_camel_case_types)]

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Server numeric reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Response {
    // === Connection Registration (001-099) ===
    /// 001 - Welcome to the network
    RPL_WELCOME = 1,
    /// 002 - Your host is running version
    RPL_YOURHOST = 2,
    /// 003 - Server creation date
    RPL_CREATED = 3,
    /// 004 - Server name, version and mode sets
    RPL_MYINFO = 4,

    // === Command Responses (200-399) ===
    /// 251 - Users, services and servers
    RPL_LUSERCLIENT = 251,
    /// 252 - Operators online
    RPL_LUSEROP = 252,
    /// 253 - Unregistered connections
    RPL_LUSERUNKNOWN = 253,
    /// 254 - Channels formed
    RPL_LUSERCHANNELS = 254,
    /// 255 - Local clients and servers
    RPL_LUSERME = 255,
    /// 311 - WHOIS user line
    RPL_WHOISUSER = 311,
    /// 312 - WHOIS server line
    RPL_WHOISSERVER = 312,
    /// 318 - End of WHOIS
    RPL_ENDOFWHOIS = 318,
    /// 331 - No topic set
    RPL_NOTOPIC = 331,
    /// 332 - Channel topic
    RPL_TOPIC = 332,
    /// 353 - Names list
    RPL_NAMREPLY = 353,
    /// 366 - End of names list
    RPL_ENDOFNAMES = 366,
    /// 375 - Start of MOTD
    RPL_MOTDSTART = 375,
    /// 376 - One MOTD line
    RPL_MOTD = 376,
    /// 377 - End of MOTD
    RPL_ENDOFMOTD = 377,

    // === Error Replies (400-599) ===
    /// 401 - No such nick/channel
    ERR_NOSUCHNICK = 401,
    /// 403 - No such channel
    ERR_NOSUCHCHANNEL = 403,
    /// 404 - Cannot send to channel
    ERR_CANNOTSENDTOCHAN = 404,
    /// 421 - Unknown command
    ERR_UNKNOWNCOMMAND = 421,
    /// 422 - MOTD file missing
    ERR_NOMOTD = 422,
    /// 431 - No nickname given
    ERR_NONICKNAMEGIVEN = 431,
    /// 433 - Nickname in use
    ERR_NICKNAMEINUSE = 433,
    /// 442 - Not on channel
    ERR_NOTONCHANNEL = 442,
    /// 461 - Not enough parameters
    ERR_NEEDMOREPARAMS = 461,
    /// 462 - Already registered
    ERR_ALREADYREGISTERED = 462,
}

const ALL: &[Response] = &[
    Response::RPL_WELCOME,
    Response::RPL_YOURHOST,
    Response::RPL_CREATED,
    Response::RPL_MYINFO,
    Response::RPL_LUSERCLIENT,
    Response::RPL_LUSEROP,
    Response::RPL_LUSERUNKNOWN,
    Response::RPL_LUSERCHANNELS,
    Response::RPL_LUSERME,
    Response::RPL_WHOISUSER,
    Response::RPL_WHOISSERVER,
    Response::RPL_ENDOFWHOIS,
    Response::RPL_NOTOPIC,
    Response::RPL_TOPIC,
    Response::RPL_NAMREPLY,
    Response::RPL_ENDOFNAMES,
    Response::RPL_MOTDSTART,
    Response::RPL_MOTD,
    Response::RPL_ENDOFMOTD,
    Response::ERR_NOSUCHNICK,
    Response::ERR_NOSUCHCHANNEL,
    Response::ERR_CANNOTSENDTOCHAN,
    Response::ERR_UNKNOWNCOMMAND,
    Response::ERR_NOMOTD,
    Response::ERR_NONICKNAMEGIVEN,
    Response::ERR_NICKNAMEINUSE,
    Response::ERR_NOTONCHANNEL,
    Response::ERR_NEEDMOREPARAMS,
    Response::ERR_ALREADYREGISTERED,
];

/// Error returned when a string is not a known three digit numeric.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseResponseError {
    /// Not three ASCII digits.
    #[error("not a numeric reply: {0:?}")]
    NotNumeric(String),
    /// A numeric this server does not know about.
    #[error("unknown numeric reply code {0}")]
    UnknownCode(u16),
}

impl Response {
    /// Returns the numeric code as u16
    #[inline]
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Creates a Response from a numeric code
    pub fn from_code(code: u16) -> Option<Response> {
        ALL.iter().copied().find(|r| r.code() == code)
    }

    /// Check if this is an error response (4xx, 5xx)
    #[inline]
    pub fn is_error(&self) -> bool {
        (400..600).contains(&self.code())
    }

    /// Check if this is a connection registration response (001-099)
    #[inline]
    pub fn is_registration(&self) -> bool {
        self.code() < 100
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.code())
    }
}

impl FromStr for Response {
    type Err = ParseResponseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 3 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseResponseError::NotNumeric(s.to_string()));
        }
        let code: u16 = s
            .parse()
            .map_err(|_| ParseResponseError::NotNumeric(s.to_string()))?;
        Response::from_code(code).ok_or(ParseResponseError::UnknownCode(code))
    }
}
