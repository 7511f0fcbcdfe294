//! Random identifier and token minting
//!
//! Session ids are short hex strings; reconnection tokens are longer
//! since they authorize mutations and must be unguessable.

use rand::Rng;

/// Length of a session identifier in bytes (before hex encoding).
const ID_BYTES: usize = 8;

/// Length of a reconnection token in bytes (before hex encoding).
const TOKEN_BYTES: usize = 32;

/// Generate a short random identifier for sessions and entities.
pub fn new_id() -> String {
    random_hex(ID_BYTES)
}

/// Generate a reconnection token.
///
/// Returns a 64-character hex string (32 random bytes). The token proves
/// ownership of a role and survives connection drops, so it uses the
/// same strength as an authentication secret.
pub fn new_token() -> String {
    random_hex(TOKEN_BYTES)
}

fn random_hex(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill(&mut buf[..]);
    hex::encode(buf)
}
