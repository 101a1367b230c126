//! mysql_native_password challenge-response transform.
//!
//! The server stores `SHA1(SHA1(password))` (the two-stage hash) and sends a
//! random seed in the handshake; the client answers with
//! `SHA1(password) XOR SHA1(seed + SHA1(SHA1(password)))`. The plaintext never
//! crosses the wire and the response is bound to the connection's seed.

use sha1::{Digest, Sha1};
use subtle::ConstantTimeEq;

/// Fixed output length of the transform. A zero-length response is reserved
/// for "no password supplied".
pub const SCRAMBLE_LENGTH: usize = 20;

fn sha1(parts: &[&[u8]]) -> [u8; SCRAMBLE_LENGTH] {
    let mut hasher = Sha1::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Stored secret material for a plaintext password, `SHA1(SHA1(password))`.
/// Empty input yields the empty hash of a password-less account.
pub fn two_stage_hash(password: &str) -> Vec<u8> {
    if password.is_empty() {
        return Vec::new();
    }
    sha1(&[&sha1(&[password.as_bytes()])]).to_vec()
}

/// The response a well-behaved client computes for `(seed, password)`.
pub fn scramble(seed: &[u8], password: &str) -> [u8; SCRAMBLE_LENGTH] {
    let stage1 = sha1(&[password.as_bytes()]);
    let stage2 = sha1(&[&stage1]);
    let mut result = sha1(&[seed, &stage2]);
    for (byte, stage1_byte) in result.iter_mut().zip(stage1) {
        *byte ^= stage1_byte;
    }
    result
}

/// Checks a client response against the stored two-stage hash. The caller is
/// responsible for rejecting responses whose length is not
/// [`SCRAMBLE_LENGTH`] before calling this.
///
/// Recovers `SHA1(password)` by xoring the response with
/// `SHA1(seed + stored)`, then compares `SHA1` of that against the stored
/// hash in constant time.
pub fn check_scramble(response: &[u8], seed: &[u8], stored_hash: &[u8]) -> bool {
    if response.len() != SCRAMBLE_LENGTH || stored_hash.len() != SCRAMBLE_LENGTH {
        return false;
    }
    let mut stage1 = sha1(&[seed, stored_hash]);
    for (byte, response_byte) in stage1.iter_mut().zip(response) {
        *byte ^= response_byte;
    }
    sha1(&[&stage1]).ct_eq(stored_hash).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: &[u8] = b"petals on a wet black bough";

    #[test]
    fn scramble_round_trip() {
        for password in ["asdf123", "starrocks", "testtest"] {
            let stored = two_stage_hash(password);
            let response = scramble(SEED, password);
            assert!(check_scramble(&response, SEED, &stored));
        }
    }

    #[test]
    fn scramble_never_equals_plaintext() {
        let password = "longenoughpassword42";
        assert_ne!(scramble(SEED, password), password.as_bytes());
    }

    #[test]
    fn altered_byte_is_rejected() {
        let stored = two_stage_hash("secret");
        let response = scramble(SEED, "secret");
        for i in 0..SCRAMBLE_LENGTH {
            let mut altered = response;
            altered[i] ^= 0x01;
            assert!(!check_scramble(&altered, SEED, &stored));
        }
    }

    #[test]
    fn wrong_seed_is_rejected() {
        let stored = two_stage_hash("secret");
        let response = scramble(SEED, "secret");
        assert!(!check_scramble(&response, b"another seed", &stored));
    }

    #[test]
    fn wrong_length_is_rejected() {
        let stored = two_stage_hash("secret");
        assert!(!check_scramble(b"short", SEED, &stored));
        assert!(!check_scramble(&[], SEED, &stored));
    }

    #[test]
    fn empty_password_has_empty_hash() {
        assert!(two_stage_hash("").is_empty());
    }
}
