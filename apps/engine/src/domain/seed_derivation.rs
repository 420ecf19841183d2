//! Seed derivation for deterministic dealing.

/// Derive the shuffle seed for a room's deal.
///
/// Hashing the room id together with the caller-supplied base seed gives:
/// - the same room + base seed always deals the same hands (tests pin both);
/// - distinct rooms sharing a base seed still deal differently.
pub fn derive_deal_seed(room_id: &str, base_seed: u64) -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"zhaopengyou/deal/v1");
    hasher.update(room_id.as_bytes());
    hasher.update(&base_seed.to_le_bytes());
    let hash = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}
