//! A transaction moves a single coin. One with no `input` mints it instead —
//! the only form of "money" in this model, created by a block's miner.

use crate::crypto::{self, PublicKey, Signature};
use crate::ids::TxId;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Transaction {
    output: PublicKey,
    input: Option<TxId>,
    signature: Signature,
}

impl Transaction {
    pub fn new(output: PublicKey, input: Option<TxId>, signature: Signature) -> Self {
        Transaction {
            output,
            input,
            signature,
        }
    }

    /// A money-creation transaction: no input, `signature_len` random bytes
    /// standing in for a signature (there is nothing to verify against).
    pub fn coinbase(output: PublicKey, signature_len: usize) -> Self {
        Transaction {
            output,
            input: None,
            signature: crypto::random_signature(signature_len),
        }
    }

    pub fn output(&self) -> &PublicKey {
        &self.output
    }

    pub fn input(&self) -> Option<&TxId> {
        self.input.as_ref()
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn is_coinbase(&self) -> bool {
        self.input.is_none()
    }

    /// `SHA256(output || signature || input?)`, recomputed fresh every call.
    pub fn txid(&self) -> TxId {
        let digest = match &self.input {
            Some(input) => crypto::sha256(&[&self.output, &self.signature, input.as_bytes()]),
            None => crypto::sha256(&[&self.output, &self.signature]),
        };
        TxId::from_digest(digest)
    }

    /// The message a transfer's signature must cover: `input || output`.
    /// Defined (but unused for verification) for a coinbase, where it
    /// degrades to just `output`.
    pub fn signing_message(input: Option<&TxId>, output: &PublicKey) -> Vec<u8> {
        let mut message = Vec::with_capacity(32 + 32);
        if let Some(input) = input {
            message.extend_from_slice(input.as_bytes());
        }
        message.extend_from_slice(output);
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::gen_keys;

    #[test]
    fn txid_is_deterministic() {
        let (_sk, pk) = gen_keys();
        let tx = Transaction::coinbase(pk, 64);
        assert_eq!(tx.txid(), tx.txid());
    }

    #[test]
    fn two_coinbases_to_same_address_differ() {
        let (_sk, pk) = gen_keys();
        let a = Transaction::coinbase(pk, 64);
        let b = Transaction::coinbase(pk, 64);
        assert_ne!(a.txid(), b.txid());
    }

    #[test]
    fn coinbase_signature_is_requested_length() {
        let (_sk, pk) = gen_keys();
        let tx = Transaction::coinbase(pk, 64);
        assert_eq!(tx.signature().len(), 64);
    }

    #[test]
    fn transfer_signs_input_concat_output() {
        let (sk, source_pk) = gen_keys();
        let (_other_sk, target_pk) = gen_keys();
        let source_txid = TxId::from_digest([7u8; 32]);
        let message = Transaction::signing_message(Some(&source_txid), &target_pk);
        let sig = crypto::sign(&message, &sk);
        let tx = Transaction::new(target_pk, Some(source_txid), sig);
        assert!(crypto::verify(&message, tx.signature(), &source_pk));
    }
}
