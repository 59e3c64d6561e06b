use hmac::{Hmac, Mac};
use rand::rngs::StdRng;
use rand::Rng;
use sha2::{Digest, Sha256};

pub type HmacSha256 = Hmac<Sha256>;

/// Source of uniform draws in `[0, 1)`.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

impl RandomSource for StdRng {
    fn next_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

pub fn derive_hash_hex(input: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input);
    hex::encode(hasher.finalize())
}

/// Maps successive big-endian 4-byte chunks to `u32 / 2^32`.
pub fn derive_floats(bytes: &[u8]) -> Vec<f64> {
    bytes
        .chunks_exact(4)
        .map(|c| {
            let v = u32::from_be_bytes([c[0], c[1], c[2], c[3]]);
            f64::from(v) / (f64::from(u32::MAX) + 1.0)
        })
        .collect()
}

/// Provably-fair stream: `HMAC-SHA256(server_seed, "client_seed:nonce:block")`,
/// eight draws per block. Same seeds, same sequence.
pub struct HmacRandom {
    server_seed: String,
    client_seed: String,
    nonce: u64,
    block: u64,
    buffer: Vec<f64>,
    cursor: usize,
}

impl HmacRandom {
    pub fn new(server_seed: impl Into<String>, client_seed: impl Into<String>, nonce: u64) -> Self {
        Self {
            server_seed: server_seed.into(),
            client_seed: client_seed.into(),
            nonce,
            block: 0,
            buffer: Vec::new(),
            cursor: 0,
        }
    }

    /// Commitment that can be published before the seed is revealed.
    pub fn server_seed_hash_hex(&self) -> String {
        derive_hash_hex(self.server_seed.as_bytes())
    }

    pub fn block_bytes(&self, block: u64) -> [u8; 32] {
        // HMAC takes keys of any length.
        let mut mac =
            HmacSha256::new_from_slice(self.server_seed.as_bytes()).expect("HMAC key");
        let msg = format!("{}:{}:{}", self.client_seed, self.nonce, block);
        mac.update(msg.as_bytes());
        let mut out = [0u8; 32];
        out.copy_from_slice(&mac.finalize().into_bytes());
        out
    }

    fn refill(&mut self) {
        self.buffer = derive_floats(&self.block_bytes(self.block));
        self.block += 1;
        self.cursor = 0;
    }
}

impl RandomSource for HmacRandom {
    fn next_unit(&mut self) -> f64 {
        if self.cursor >= self.buffer.len() {
            self.refill();
        }
        let v = self.buffer[self.cursor];
        self.cursor += 1;
        v
    }
}
