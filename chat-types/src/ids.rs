//! Identity types for Waffle.
//!
//! Both actors and messages are named by short client-minted identifiers.
//! No server coordination is involved, so the id space has to be large
//! enough that a session's message volume is unlikely to collide.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::{messages::now_millis, WireError};

/// Number of hex characters kept from the digest.
pub const ID_HEX_LEN: usize = 9;

/// Number of distinct identifiers [`gen_id`] can produce (16^9).
pub const ID_SPACE: u64 = 1 << (4 * ID_HEX_LEN as u64);

/// Well-known persistence key for the local actor id.
pub const ACTOR_ID_KEY: &str = "waffle:clientId";

const SALT_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
// Largest multiple of 36 that fits in a byte; bytes above it are rejected
// so every base-36 digit is equally likely.
const BASE36_CUTOFF: u8 = 252;

/// Generate a fresh 9-character lowercase hex identifier.
///
/// The id is the SHA-256 digest of `"{epoch_ms}:{salt}"`, where `salt` is
/// 9 uniformly drawn base-36 characters, truncated to [`ID_HEX_LEN`].
pub fn gen_id() -> Result<String, WireError> {
    let seed = format!("{}:{}", now_millis(), random_base36(SALT_LEN)?);
    let digest = Sha256::digest(seed.as_bytes());
    let mut hex = hex::encode(digest);
    hex.truncate(ID_HEX_LEN);
    Ok(hex)
}

fn random_base36(len: usize) -> Result<String, WireError> {
    let mut out = String::with_capacity(len);
    let mut pool = [0u8; 32];

    while out.len() < len {
        getrandom::getrandom(&mut pool).map_err(|e| WireError::Entropy(e.to_string()))?;
        for byte in pool {
            if byte < BASE36_CUTOFF {
                out.push(BASE36[(byte % 36) as usize] as char);
                if out.len() == len {
                    break;
                }
            }
        }
    }

    Ok(out)
}

/// Probability that at least two of `count` ids drawn from [`ID_SPACE`]
/// collide (birthday bound, computed exactly as a running product).
pub fn collision_probability(count: usize) -> f64 {
    let space = ID_SPACE as f64;
    let distinct = (0..count).fold(1.0_f64, |acc, i| acc * (1.0 - i as f64 / space));
    1.0 - distinct
}

/// Identifier of a chat participant.
///
/// Durable across sessions on one device; persisted under [`ACTOR_ID_KEY`].
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh actor id with [`gen_id`].
    pub fn generate() -> Result<Self, WireError> {
        gen_id().map(Self)
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorId({})", self.0)
    }
}

impl From<&str> for ActorId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ActorId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Identifier of a single message, and the deduplication key.
///
/// Locally authored messages use [`MessageId::generate`]; ids arriving from
/// the network are taken verbatim, whatever their shape.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh message id with [`gen_id`].
    pub fn generate() -> Result<Self, WireError> {
        gen_id().map(Self)
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageId({})", self.0)
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for MessageId {
    fn from(value: String) -> Self {
        Self(value)
    }
}
