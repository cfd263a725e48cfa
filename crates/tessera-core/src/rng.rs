//! Deterministic, stateless RNG keyed by `(seed, domain, entity_id, tick)`.
//!
//! The original system hashes a packed `(seed, domain, entity_id, tick)`
//! tuple with xxhash64. This workspace already depends on `blake3` for
//! snapshot content-hashing (see `tessera-core::snapshot`), so the same
//! primitive is reused here instead of adding a second hashing crate:
//! `blake3::hash` is a non-cryptographic-speed, avalanche-quality hash over
//! arbitrary bytes and is exactly as platform-independent as xxhash64 for
//! this purpose.

use crate::enums::Domain;

/// Holds no mutable state — every draw is a pure function of its inputs,
/// plus the immutable world seed.
#[derive(Debug, Clone, Copy)]
pub struct DeterministicRng {
    seed: i64,
}

impl DeterministicRng {
    pub fn new(seed: i64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> i64 {
        self.seed
    }

    fn hash(&self, domain: Domain, entity_id: i64, tick: i64) -> u64 {
        let mut bytes = [0u8; 32];
        bytes[0..8].copy_from_slice(&self.seed.to_le_bytes());
        bytes[8..12].copy_from_slice(&(domain as u32).to_le_bytes());
        bytes[12..20].copy_from_slice(&entity_id.to_le_bytes());
        bytes[20..28].copy_from_slice(&tick.to_le_bytes());
        // Remaining 4 bytes stay zero — fixed-width packing keeps the tuple
        // byte-exact across platforms (no struct-padding ambiguity).
        let digest = blake3::hash(&bytes);
        let out = digest.as_bytes();
        u64::from_le_bytes(out[0..8].try_into().unwrap())
    }

    /// `[0, 1)`.
    pub fn next_float(&self, domain: Domain, entity_id: i64, tick: i64) -> f64 {
        (self.hash(domain, entity_id, tick) as f64) / (u64::MAX as f64 + 1.0)
    }

    /// `[lo, hi]` inclusive.
    pub fn next_int(&self, domain: Domain, entity_id: i64, tick: i64, lo: i64, hi: i64) -> i64 {
        let span = (hi - lo + 1).max(1);
        lo + (self.next_float(domain, entity_id, tick) * span as f64) as i64
    }

    pub fn next_bool(&self, domain: Domain, entity_id: i64, tick: i64, probability: f64) -> bool {
        self.next_float(domain, entity_id, tick) < probability
    }
}
