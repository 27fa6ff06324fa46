/// A probabilistic witness that a wire-encoded action is a member of a
/// legal-action set, built once per [`crate::generate::generate`] call and
/// cheap to ship alongside it. Never produces a false negative: every action
/// actually in the source set probes positive. May produce false positives.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bloom {
    m: u32,
    k: u32,
    bits: Vec<u64>,
}

const MIN_M: u32 = 1024;

/// Tunables for [`Bloom::build`]. `k` has a fixed default; `m` does not,
/// since its default scales with the action set being witnessed.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct BloomParams {
    pub m: Option<u32>,
    pub k: u32,
}

impl Default for BloomParams {
    fn default() -> Self {
        BloomParams { m: None, k: 3 }
    }
}

impl Bloom {
    /// Builds a filter over `actions`. `m` defaults to `max(1024, 8 * len)`
    /// rounded up to a multiple of 64; `k` defaults to 3.
    pub fn build(actions: &[u32], m: Option<u32>, k: Option<u32>) -> Self {
        let params = BloomParams { m, k: k.unwrap_or(BloomParams::default().k) };
        Self::build_with(actions, params)
    }

    /// Builds a filter using an explicit [`BloomParams`] (or its default).
    pub fn build_with(actions: &[u32], params: BloomParams) -> Self {
        let m = params.m.unwrap_or_else(|| MIN_M.max(8 * actions.len() as u32));
        let m = ((m + 63) / 64) * 64;
        let mut bloom = Bloom { m, k: params.k, bits: vec![0u64; (m / 64) as usize] };
        for &action in actions {
            bloom.insert(action);
        }
        bloom
    }

    fn insert(&mut self, action: u32) {
        for i in 0..self.k {
            let bit = self.index(action, i);
            self.bits[(bit / 64) as usize] |= 1 << (bit % 64);
        }
    }

    /// Tests membership. `false` is a definite answer; `true` means
    /// "probably, or a false positive."
    pub fn probe(&self, action: u32) -> bool {
        (0..self.k).all(|i| {
            let bit = self.index(action, i);
            self.bits[(bit / 64) as usize] & (1 << (bit % 64)) != 0
        })
    }

    fn index(&self, action: u32, i: u32) -> u32 {
        fnv1a(action, seed(i)) % self.m
    }
}

fn seed(i: u32) -> u32 {
    2166136261u32 ^ i.wrapping_mul(16777619)
}

/// FNV-1a over the action's 4 little-endian bytes, seeded per probe index.
fn fnv1a(action: u32, seed: u32) -> u32 {
    let mut hash = seed;
    for byte in action.to_le_bytes() {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(16777619);
    }
    hash
}
