//! HMAC secure-hash engine.
//!
//! The engine never canonicalizes anything itself: callers hand it the exact
//! signing string produced by [`crate::canonical`] or [`crate::pipe`].

use std::fmt;

use hmac::{Hmac, Mac, digest::KeyInit};
use md5::Md5;
use sha2::{Sha256, Sha512};
use vnpay_types::HashAlgorithm;

/// Lowercase hex HMAC of `message` keyed by `secret`
pub fn sign(secret: &str, message: &str, algorithm: HashAlgorithm) -> String {
    let digest = match algorithm {
        HashAlgorithm::Sha256 => compute::<Hmac<Sha256>>(secret, message),
        HashAlgorithm::Sha512 => compute::<Hmac<Sha512>>(secret, message),
        HashAlgorithm::Md5 => compute::<Hmac<Md5>>(secret, message),
    };
    hex::encode(digest)
}

/// Recompute the HMAC of `message` and compare it to `candidate` in constant time.
///
/// `candidate` is hex in either case; anything that is not hex fails.
pub fn verify(secret: &str, message: &str, algorithm: HashAlgorithm, candidate: &str) -> bool {
    let Ok(candidate) = hex::decode(candidate.trim()) else {
        return false;
    };
    match algorithm {
        HashAlgorithm::Sha256 => check::<Hmac<Sha256>>(secret, message, &candidate),
        HashAlgorithm::Sha512 => check::<Hmac<Sha512>>(secret, message, &candidate),
        HashAlgorithm::Md5 => check::<Hmac<Md5>>(secret, message, &candidate),
    }
}

fn keyed<M: Mac + KeyInit>(secret: &str, message: &str) -> M {
    let mut mac =
        <M as Mac>::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    mac
}

fn compute<M: Mac + KeyInit>(secret: &str, message: &str) -> Vec<u8> {
    keyed::<M>(secret, message).finalize().into_bytes().to_vec()
}

fn check<M: Mac + KeyInit>(secret: &str, message: &str, candidate: &[u8]) -> bool {
    keyed::<M>(secret, message).verify_slice(candidate).is_ok()
}

/// Secret and algorithm bound together for a client's lifetime
#[derive(Clone)]
pub struct SecureHasher {
    secret: String,
    algorithm: HashAlgorithm,
}

impl SecureHasher {
    pub fn new(secret: impl Into<String>, algorithm: HashAlgorithm) -> Self {
        Self {
            secret: secret.into(),
            algorithm,
        }
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn sign(&self, message: &str) -> String {
        sign(&self.secret, message, self.algorithm)
    }

    pub fn verify(&self, message: &str, candidate: &str) -> bool {
        verify(&self.secret, message, self.algorithm, candidate)
    }
}

impl fmt::Debug for SecureHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureHasher")
            .field("secret", &"[REDACTED]")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}
