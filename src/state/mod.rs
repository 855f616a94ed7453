//! State management module.
//!
//! Contains the Matrix (shared server registry) and the entities it owns.

mod channel;
mod matrix;
mod session;
mod uid;

pub use channel::{Channel, normalize_channel_name};
pub use matrix::{ClientField, JoinOutcome, Matrix, NickChange, ServerInfo, UserChange};
pub use session::{PLACEHOLDER, Session, SessionState, normalize_host};
pub use uid::{Uid, UidGenerator};
