use crate::{rng, AgentId, SplitMix64};

/// Per-frame inputs shared by every agent evaluated during one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickContext {
    pub tick: u64,
    /// Simulation clock in milliseconds; timers and chase windows compare against it.
    pub time_ms: u64,
    pub seed: u64,
}

impl TickContext {
    pub fn new(tick: u64, time_ms: u64, seed: u64) -> Self {
        Self {
            tick,
            time_ms,
            seed,
        }
    }

    /// Deterministic RNG for `agent` on this tick; `stream` separates independent uses.
    pub fn rng_for_agent<A: AgentId>(&self, agent: A, stream: u64) -> SplitMix64 {
        let seed = rng::derive_seed(self.seed ^ self.tick, agent.stable_id(), stream);
        SplitMix64::new(seed)
    }
}
