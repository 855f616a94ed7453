//! Per-connection identity and registration state.

use std::collections::BTreeSet;
use std::net::IpAddr;

use minirc_proto::Message;
use tokio::sync::mpsc;

use super::Uid;

/// Value of nick and username before the client supplies them.
pub const PLACEHOLDER: &str = "*";

/// Registration progress, derived from which identity fields are set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Neither nick nor username set.
    Unregistered,
    /// Exactly one of nick/username set.
    PartiallyIdentified,
    /// Both set. Terminal until disconnect.
    Authenticated,
}

/// Server-side state for one connected client.
///
/// The live record sits in the [`Matrix`](super::Matrix); handlers work on
/// clones taken under its lock.
#[derive(Clone, Debug)]
pub struct Session {
    pub uid: Uid,
    pub nick: String,
    pub username: String,
    pub fullname: String,
    pub hostname: String,
    /// Joined channels, by internal (lowercase, `#`-less) name.
    pub channels: BTreeSet<String>,
    sender: mpsc::Sender<Message>,
}

impl Session {
    pub fn new(uid: Uid, hostname: String, sender: mpsc::Sender<Message>) -> Self {
        Self {
            uid,
            nick: PLACEHOLDER.to_string(),
            username: PLACEHOLDER.to_string(),
            fullname: PLACEHOLDER.to_string(),
            hostname,
            channels: BTreeSet::new(),
            sender,
        }
    }

    pub fn state(&self) -> SessionState {
        match (self.nick != PLACEHOLDER, self.username != PLACEHOLDER) {
            (true, true) => SessionState::Authenticated,
            (false, false) => SessionState::Unregistered,
            _ => SessionState::PartiallyIdentified,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }

    /// `nick!username@hostname` once authenticated, the bare hostname before.
    pub fn identity(&self) -> String {
        if self.is_authenticated() {
            format!("{}!{}@{}", self.nick, self.username, self.hostname)
        } else {
            self.hostname.clone()
        }
    }

    /// Outbound queue feeding this session's connection writer.
    pub fn sender(&self) -> &mpsc::Sender<Message> {
        &self.sender
    }

    /// Set the nick. Returns true if this completed registration.
    pub fn set_nick(&mut self, nick: &str) -> bool {
        let was = self.is_authenticated();
        self.nick = nick.to_string();
        !was && self.is_authenticated()
    }

    /// Set username and fullname. Returns true if this completed
    /// registration. Ignored once authenticated.
    pub fn set_user(&mut self, username: &str, fullname: &str) -> bool {
        if self.is_authenticated() {
            return false;
        }
        self.username = username.to_string();
        self.fullname = fullname.to_string();
        self.is_authenticated()
    }
}

/// Render a peer address as a hostname, unwrapping IPv4-mapped IPv6
/// addresses (`::ffff:10.0.0.1` becomes `10.0.0.1`).
///
/// A leading ':' would end the prefix on the wire, so such hosts get a
/// leading `0` (`::1` becomes `0::1`).
pub fn normalize_host(ip: IpAddr) -> String {
    let host = match ip {
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => v4.to_string(),
            None => v6.to_string(),
        },
        IpAddr::V4(v4) => v4.to_string(),
    };
    if host.starts_with(':') {
        format!("0{host}")
    } else {
        host
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::UidGenerator;
    use std::net::Ipv6Addr;

    fn session() -> Session {
        let (tx, _rx) = mpsc::channel(1);
        Session::new(UidGenerator::new().next(), "127.0.0.1".into(), tx)
    }

    #[test]
    fn state_follows_identity_fields() {
        let mut s = session();
        assert_eq!(s.state(), SessionState::Unregistered);

        assert!(!s.set_nick("alice"));
        assert_eq!(s.state(), SessionState::PartiallyIdentified);

        assert!(s.set_user("al", "Alice"));
        assert_eq!(s.state(), SessionState::Authenticated);
    }

    #[test]
    fn user_first_then_nick_completes_registration() {
        let mut s = session();
        assert!(!s.set_user("al", "Alice"));
        assert_eq!(s.state(), SessionState::PartiallyIdentified);
        assert!(s.set_nick("alice"));
    }

    #[test]
    fn registration_completes_only_once() {
        let mut s = session();
        s.set_nick("alice");
        assert!(s.set_user("al", "Alice"));
        assert!(!s.set_nick("alice2"));
        assert!(!s.set_user("other", "Other"));
        assert_eq!(s.username, "al");
    }

    #[test]
    fn identity_depends_on_authentication() {
        let mut s = session();
        assert_eq!(s.identity(), "127.0.0.1");
        s.set_nick("alice");
        assert_eq!(s.identity(), "127.0.0.1");
        s.set_user("al", "Alice");
        assert_eq!(s.identity(), "alice!al@127.0.0.1");
    }

    #[test]
    fn mapped_ipv4_is_unwrapped() {
        let mapped: Ipv6Addr = "::ffff:10.1.2.3".parse().unwrap();
        assert_eq!(normalize_host(IpAddr::V6(mapped)), "10.1.2.3");
        assert_eq!(normalize_host("192.168.0.1".parse().unwrap()), "192.168.0.1");
    }

    #[test]
    fn ipv6_host_never_starts_with_colon() {
        assert_eq!(normalize_host("::1".parse().unwrap()), "0::1");
        assert_eq!(normalize_host("fe80::1".parse().unwrap()), "fe80::1");
    }
}
