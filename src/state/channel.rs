//! Channel state.

use std::collections::BTreeSet;

use super::Uid;

/// A named broadcast group.
///
/// Names are stored lowercase without the leading `#`; [`Channel::display_name`]
/// restores the wire form.
#[derive(Clone, Debug)]
pub struct Channel {
    pub name: String,
    pub topic: String,
    members: BTreeSet<Uid>,
}

impl Channel {
    pub fn new(name: String) -> Self {
        Self {
            name,
            topic: String::new(),
            members: BTreeSet::new(),
        }
    }

    pub fn display_name(&self) -> String {
        format!("#{}", self.name)
    }

    /// Returns false if the session was already a member.
    pub fn add_member(&mut self, uid: Uid) -> bool {
        self.members.insert(uid)
    }

    /// Returns false if the session was not a member.
    pub fn remove_member(&mut self, uid: Uid) -> bool {
        self.members.remove(&uid)
    }

    pub fn is_member(&self, uid: Uid) -> bool {
        self.members.contains(&uid)
    }

    pub fn members(&self) -> impl Iterator<Item = Uid> + '_ {
        self.members.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Map a wire channel token (`#Rust`) to its internal name (`rust`).
///
/// Returns `None` for tokens without the `#` sigil or with nothing after it.
pub fn normalize_channel_name(token: &str) -> Option<String> {
    let name = token.strip_prefix('#')?;
    if name.is_empty() || name.contains([',', ' ', '\x07']) {
        return None;
    }
    Some(name.to_lowercase())
}
