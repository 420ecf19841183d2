//! Room id generation.
//!
//! Room ids are 10-character strings over Crockford's Base32 alphabet. The
//! generator draws from the OS RNG by default and from a fixed seed in tests;
//! callers retry on the (vanishing) chance of a registry collision.

use std::sync::Mutex;

use rand::distributions::Uniform;
use rand::prelude::*;
use rand::rngs::StdRng;

const CROCKFORD: &[u8] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ"; // no I, L, O, U
const ID_LEN: usize = 10;

pub struct RoomIdGen {
    rng: Mutex<StdRng>,
}

impl RoomIdGen {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic id sequence for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn generate(&self) -> String {
        let dist = Uniform::from(0..CROCKFORD.len());
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        let mut s = String::with_capacity(ID_LEN);
        for _ in 0..ID_LEN {
            s.push(CROCKFORD[dist.sample(&mut *rng)] as char);
        }
        s
    }
}

impl Default for RoomIdGen {
    fn default() -> Self {
        Self::new()
    }
}
