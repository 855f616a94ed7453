//! The Matrix - central shared state for the server.
//!
//! All sessions and channels live in one [`Directory`] behind a single
//! mutex, so membership changes, channel deletion-on-empty and uniqueness
//! checks are atomic with respect to each other. The lock is never held
//! across an `.await`: operations collect the outbound senders they need,
//! release the lock, and only then deliver.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use minirc_proto::Message;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{Channel, PLACEHOLDER, Session, SessionState, Uid, UidGenerator};
use crate::config::ServerConfig;
use crate::error::ChannelError;
use crate::metrics;
use crate::motd::Motd;

/// This server's identity.
#[derive(Clone, Debug)]
pub struct ServerInfo {
    /// Hostname used as the prefix of server replies.
    pub name: String,
    pub description: String,
    pub version: String,
    pub created: DateTime<Utc>,
}

impl ServerInfo {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            name: config.name.clone(),
            description: config.description.clone(),
            version: config.version.clone(),
            created: Utc::now(),
        }
    }
}

/// Session field used by [`Matrix::find_clients`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClientField {
    Nick,
    Username,
}

/// Result of [`Matrix::change_nick`].
#[derive(Debug)]
pub enum NickChange {
    /// Another session holds the nick.
    InUse,
    /// The session already had this nick.
    Unchanged,
    Changed {
        /// Identity before the change, for relaying `NICK`.
        old_identity: String,
        /// Whether the session was already authenticated before the change.
        was_authenticated: bool,
        newly_authenticated: bool,
        /// Channel-mates, excluding the session itself.
        peers: Vec<Uid>,
        session: Session,
    },
}

/// Result of [`Matrix::set_user`].
#[derive(Debug)]
pub enum UserChange {
    AlreadyRegistered,
    /// Another authenticated session owns the username.
    Taken,
    /// Another session registered the pending nick first.
    NickInUse(String),
    Set {
        newly_authenticated: bool,
        session: Session,
    },
}

/// Result of [`Matrix::join_channel`].
#[derive(Debug)]
pub enum JoinOutcome {
    AlreadyMember,
    Joined {
        /// Whether this join created the channel.
        created: bool,
        topic: String,
        /// Member nicks, joiner included.
        names: Vec<String>,
        /// Members to notify, joiner excluded.
        others: Vec<Uid>,
    },
}

/// Counters reported by LUSERS.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LuserStats {
    /// Authenticated sessions.
    pub users: usize,
    /// Sessions that have not finished registering.
    pub unknown: usize,
    pub channels: usize,
}

#[derive(Default)]
struct Directory {
    clients: HashMap<Uid, Session>,
    channels: HashMap<String, Channel>,
}

impl Directory {
    /// Authenticated sessions whose `field` equals `value` exactly.
    fn authenticated<'a>(
        &'a self,
        field: ClientField,
        value: &'a str,
    ) -> impl Iterator<Item = &'a Session> + 'a {
        self.clients
            .values()
            .filter(|s| s.is_authenticated())
            .filter(move |s| match field {
                ClientField::Nick => s.nick == value,
                ClientField::Username => s.username == value,
            })
    }

    /// Whether an authenticated session other than `uid` holds `value`.
    fn held_by_other(&self, uid: Uid, field: ClientField, value: &str) -> bool {
        self.authenticated(field, value).any(|s| s.uid != uid)
    }

    /// Unique channel-mates of `uid`, excluding `uid`.
    fn peers_of(&self, uid: Uid) -> Vec<Uid> {
        let Some(session) = self.clients.get(&uid) else {
            return Vec::new();
        };
        let peers: BTreeSet<Uid> = session
            .channels
            .iter()
            .filter_map(|name| self.channels.get(name))
            .flat_map(|chan| chan.members())
            .filter(|member| *member != uid)
            .collect();
        peers.into_iter().collect()
    }

    fn nicks_in(&self, channel: &Channel) -> Vec<String> {
        channel
            .members()
            .filter_map(|uid| self.clients.get(&uid))
            .map(|s| s.nick.clone())
            .collect()
    }

    fn others_in(channel: &Channel, uid: Uid) -> Vec<Uid> {
        channel.members().filter(|m| *m != uid).collect()
    }

    fn member_channel(&self, uid: Uid, name: &str) -> Result<&Channel, ChannelError> {
        let chan = self
            .channels
            .get(name)
            .ok_or_else(|| ChannelError::NoSuchChannel(format!("#{name}")))?;
        if !chan.is_member(uid) {
            return Err(ChannelError::NotOnChannel(chan.display_name()));
        }
        Ok(chan)
    }
}

/// The Matrix - central shared state container.
pub struct Matrix {
    /// This server's identity.
    pub server_info: ServerInfo,
    /// Message of the day, loaded at startup.
    pub motd: Motd,
    /// UID generator for new connections.
    pub uid_gen: UidGenerator,
    /// How long a delivery may wait on a full outbound queue.
    send_timeout: Duration,
    directory: Mutex<Directory>,
}

impl Matrix {
    pub fn new(server_info: ServerInfo, motd: Motd, send_timeout: Duration) -> Self {
        Self {
            server_info,
            motd,
            uid_gen: UidGenerator::new(),
            send_timeout,
            directory: Mutex::new(Directory::default()),
        }
    }

    // ========================================================================
    // Sessions
    // ========================================================================

    /// Add a freshly accepted connection's session.
    pub fn register_session(&self, session: Session) {
        let mut dir = self.directory.lock();
        dir.clients.insert(session.uid, session);
        metrics::set_connected_users(dir.clients.len());
    }

    /// Snapshot of one session.
    pub fn session(&self, uid: Uid) -> Option<Session> {
        self.directory.lock().clients.get(&uid).cloned()
    }

    /// Mutate one session in place.
    pub fn update_session<R>(&self, uid: Uid, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        self.directory.lock().clients.get_mut(&uid).map(f)
    }

    /// Authenticated sessions whose `field` equals `value` exactly.
    pub fn find_clients(&self, field: ClientField, value: &str) -> Vec<Session> {
        self.directory
            .lock()
            .authenticated(field, value)
            .cloned()
            .collect()
    }

    /// First authenticated session whose `field` equals `value`.
    pub fn find_client(&self, field: ClientField, value: &str) -> Option<Session> {
        self.find_clients(field, value).into_iter().next()
    }

    /// Set a session's nick unless another authenticated session holds it.
    ///
    /// Check and update happen under one lock acquisition.
    pub fn change_nick(&self, uid: Uid, nick: &str) -> Option<NickChange> {
        let mut dir = self.directory.lock();

        if dir.held_by_other(uid, ClientField::Nick, nick) {
            return Some(NickChange::InUse);
        }

        let peers = dir.peers_of(uid);
        let session = dir.clients.get_mut(&uid)?;
        if session.nick == nick {
            return Some(NickChange::Unchanged);
        }

        let old_identity = session.identity();
        let was_authenticated = session.is_authenticated();
        let newly_authenticated = session.set_nick(nick);

        Some(NickChange::Changed {
            old_identity,
            was_authenticated,
            newly_authenticated,
            peers,
            session: session.clone(),
        })
    }

    /// Set a session's username and fullname.
    pub fn set_user(&self, uid: Uid, username: &str, fullname: &str) -> Option<UserChange> {
        let mut dir = self.directory.lock();

        if dir.clients.get(&uid)?.is_authenticated() {
            return Some(UserChange::AlreadyRegistered);
        }

        if dir.held_by_other(uid, ClientField::Username, username) {
            return Some(UserChange::Taken);
        }

        // Completing registration must not produce a second authenticated
        // holder of the same nick.
        let nick = dir.clients.get(&uid)?.nick.clone();
        if nick != PLACEHOLDER && dir.held_by_other(uid, ClientField::Nick, &nick) {
            return Some(UserChange::NickInUse(nick));
        }

        let session = dir.clients.get_mut(&uid)?;
        let newly_authenticated = session.set_user(username, fullname);
        Some(UserChange::Set {
            newly_authenticated,
            session: session.clone(),
        })
    }

    /// Remove a session from every channel and from the registry, relaying
    /// `QUIT` to its former channel-mates.
    ///
    /// Returns the removed session, or `None` if it was already gone.
    pub async fn disconnect(&self, uid: Uid, reason: &str) -> Option<Session> {
        let (session, peers) = {
            let mut guard = self.directory.lock();
            let dir = &mut *guard;

            let peers = dir.peers_of(uid);
            let session = dir.clients.remove(&uid)?;

            for name in &session.channels {
                let emptied = match dir.channels.get_mut(name) {
                    Some(chan) => {
                        chan.remove_member(uid);
                        chan.is_empty()
                    }
                    None => false,
                };
                if emptied {
                    dir.channels.remove(name);
                    debug!(channel = %name, "Channel removed");
                }
            }

            metrics::set_connected_users(dir.clients.len());
            metrics::set_active_channels(dir.channels.len());
            (session, peers)
        };

        if session.is_authenticated() && !peers.is_empty() {
            let quit = Message::new("QUIT")
                .with_prefix(session.identity())
                .with_trailing(reason);
            self.broadcast(&quit, &peers).await;
        }

        Some(session)
    }

    // ========================================================================
    // Channels
    // ========================================================================

    /// Add a session to a channel, creating the channel if needed.
    ///
    /// `name` is the internal (lowercase, `#`-less) name. Returns `None` if
    /// the session is gone.
    pub fn join_channel(&self, uid: Uid, name: &str) -> Option<JoinOutcome> {
        let mut guard = self.directory.lock();
        let dir = &mut *guard;

        let session = dir.clients.get_mut(&uid)?;

        let created = !dir.channels.contains_key(name);
        let chan = dir
            .channels
            .entry(name.to_string())
            .or_insert_with(|| Channel::new(name.to_string()));

        if !chan.add_member(uid) {
            return Some(JoinOutcome::AlreadyMember);
        }
        session.channels.insert(name.to_string());

        let topic = chan.topic.clone();
        let others = Directory::others_in(chan, uid);
        if created {
            metrics::set_active_channels(dir.channels.len());
        }

        let names = dir
            .channels
            .get(name)
            .map(|chan| dir.nicks_in(chan))
            .unwrap_or_default();

        Some(JoinOutcome::Joined {
            created,
            topic,
            names,
            others,
        })
    }

    /// Remove a session from a channel, deleting the channel if it empties.
    ///
    /// Returns the remaining members to notify.
    pub fn part_channel(&self, uid: Uid, name: &str) -> Result<Vec<Uid>, ChannelError> {
        let mut guard = self.directory.lock();
        let dir = &mut *guard;

        let others = Directory::others_in(dir.member_channel(uid, name)?, uid);

        let emptied = match dir.channels.get_mut(name) {
            Some(chan) => {
                chan.remove_member(uid);
                chan.is_empty()
            }
            None => false,
        };
        if emptied {
            dir.channels.remove(name);
            metrics::set_active_channels(dir.channels.len());
            debug!(channel = %name, "Channel removed");
        }

        if let Some(session) = dir.clients.get_mut(&uid) {
            session.channels.remove(name);
        }

        Ok(others)
    }

    /// Members a message from `uid` to the channel should reach.
    pub fn channel_recipients(&self, uid: Uid, name: &str) -> Result<Vec<Uid>, ChannelError> {
        let dir = self.directory.lock();
        match dir.member_channel(uid, name) {
            Ok(chan) => Ok(Directory::others_in(chan, uid)),
            Err(ChannelError::NotOnChannel(display)) => {
                Err(ChannelError::CannotSendToChan(display))
            }
            Err(e) => Err(e),
        }
    }

    /// Current topic; requires membership.
    pub fn topic(&self, uid: Uid, name: &str) -> Result<String, ChannelError> {
        let dir = self.directory.lock();
        Ok(dir.member_channel(uid, name)?.topic.clone())
    }

    /// Replace the topic; requires membership. Returns the other members.
    pub fn set_topic(&self, uid: Uid, name: &str, topic: &str) -> Result<Vec<Uid>, ChannelError> {
        let mut dir = self.directory.lock();
        dir.member_channel(uid, name)?;

        let chan = dir
            .channels
            .get_mut(name)
            .ok_or_else(|| ChannelError::NoSuchChannel(format!("#{name}")))?;
        chan.topic = topic.to_string();
        Ok(Directory::others_in(chan, uid))
    }

    /// Snapshot of one channel.
    #[cfg(test)]
    pub fn channel(&self, name: &str) -> Option<Channel> {
        self.directory.lock().channels.get(name).cloned()
    }

    pub fn stats(&self) -> LuserStats {
        let dir = self.directory.lock();
        let mut stats = LuserStats {
            channels: dir.channels.len(),
            ..LuserStats::default()
        };
        for session in dir.clients.values() {
            match session.state() {
                SessionState::Authenticated => stats.users += 1,
                SessionState::Unregistered | SessionState::PartiallyIdentified => {
                    stats.unknown += 1
                }
            }
        }
        stats
    }

    // ========================================================================
    // Delivery
    // ========================================================================

    /// Queue a message for one session.
    pub async fn send_to(&self, uid: Uid, msg: Message) -> bool {
        let sender = self
            .directory
            .lock()
            .clients
            .get(&uid)
            .map(|s| s.sender().clone());
        match sender {
            Some(tx) => self.deliver(uid, tx, msg).await,
            None => false,
        }
    }

    /// Deliver a message to every listed session concurrently.
    ///
    /// Waits for all deliveries; a closed or stalled session only fails its
    /// own delivery. Returns how many succeeded.
    pub async fn broadcast(&self, msg: &Message, targets: &[Uid]) -> usize {
        let senders: Vec<(Uid, mpsc::Sender<Message>)> = {
            let dir = self.directory.lock();
            targets
                .iter()
                .filter_map(|uid| dir.clients.get(uid).map(|s| (*uid, s.sender().clone())))
                .collect()
        };
        self.deliver_all(msg, senders).await
    }

    /// [`Matrix::broadcast`] to every authenticated session.
    pub async fn broadcast_all(&self, msg: &Message) -> usize {
        let senders: Vec<(Uid, mpsc::Sender<Message>)> = {
            let dir = self.directory.lock();
            dir.clients
                .values()
                .filter(|s| s.is_authenticated())
                .map(|s| (s.uid, s.sender().clone()))
                .collect()
        };
        self.deliver_all(msg, senders).await
    }

    async fn deliver_all(&self, msg: &Message, senders: Vec<(Uid, mpsc::Sender<Message>)>) -> usize {
        let deliveries = senders
            .into_iter()
            .map(|(uid, tx)| self.deliver(uid, tx, msg.clone()));
        join_all(deliveries).await.into_iter().filter(|ok| *ok).count()
    }

    async fn deliver(&self, uid: Uid, tx: mpsc::Sender<Message>, msg: Message) -> bool {
        match tokio::time::timeout(self.send_timeout, tx.send(msg)).await {
            Ok(Ok(())) => {
                metrics::inc_messages_sent();
                true
            }
            Ok(Err(_)) => {
                debug!(%uid, "Delivery failed: session closed");
                metrics::inc_delivery_failures();
                false
            }
            Err(_) => {
                warn!(%uid, "Delivery timed out: send queue full");
                metrics::inc_delivery_failures();
                false
            }
        }
    }
}

impl std::fmt::Debug for Matrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matrix")
            .field("server", &self.server_info.name)
            .field("stats", &self.stats())
            .finish()
    }
}
