//! Thin wrappers around the Ed25519 and SHA-256 primitives the rest of the
//! crate treats as opaque. Keys and signatures are raw byte encodings so the
//! domain types never leak a crypto-crate type into their public API.

use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

pub type PublicKey = [u8; 32];
/// Signatures are an opaque byte string in the data model: a real Ed25519
/// signature is always 64 bytes, but a coinbase's "signature" is just random
/// filler of a configurable length, so this can't be a fixed-size array.
pub type Signature = Vec<u8>;

/// Generate a fresh signing key and its public counterpart.
pub fn gen_keys() -> (SigningKey, PublicKey) {
    let signing_key = SigningKey::generate(&mut OsRng);
    let public_key = signing_key.verifying_key().to_bytes();
    (signing_key, public_key)
}

/// Sign `message` with `signing_key`, returning the raw 64-byte signature.
pub fn sign(message: &[u8], signing_key: &SigningKey) -> Signature {
    signing_key.sign(message).to_bytes().to_vec()
}

/// Verify `signature` over `message` under `public_key`. Returns `false` on
/// any malformed input (wrong length, invalid key/signature encoding) rather
/// than propagating an error — callers only ever need a yes/no answer.
pub fn verify(message: &[u8], signature: &[u8], public_key: &PublicKey) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(public_key) else {
        return false;
    };
    let Ok(sig_bytes): Result<[u8; 64], _> = signature.try_into() else {
        return false;
    };
    let sig = DalekSignature::from_bytes(&sig_bytes);
    verifying_key.verify(message, &sig).is_ok()
}

/// 64 random bytes, used as the non-cryptographic "signature" payload of a
/// coinbase transaction so that two coinbases to the same address still
/// differ.
pub fn random_signature(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// SHA-256 over the concatenation of every part, returned as raw bytes.
pub fn sha256(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_verify_roundtrips() {
        let (sk, pk) = gen_keys();
        let msg = b"hello ledger";
        let sig = sign(msg, &sk);
        assert!(verify(msg, &sig, &pk));
    }

    #[test]
    fn verify_rejects_tampered_message() {
        let (sk, pk) = gen_keys();
        let sig = sign(b"original", &sk);
        assert!(!verify(b"tampered", &sig, &pk));
    }

    #[test]
    fn verify_rejects_wrong_key() {
        let (sk, _pk) = gen_keys();
        let (_other_sk, other_pk) = gen_keys();
        let sig = sign(b"msg", &sk);
        assert!(!verify(b"msg", &sig, &other_pk));
    }

    #[test]
    fn random_signature_is_unique() {
        assert_ne!(random_signature(64), random_signature(64));
    }
}
