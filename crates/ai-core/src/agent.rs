use core::fmt::Debug;
use core::hash::Hash;

/// Stable identifier for a bot-controlled client.
///
/// Agent records are kept in ordered maps, so ids must be `Ord`. `stable_id` feeds
/// per-agent RNG streams and log fields.
pub trait AgentId: Copy + Ord + Eq + Hash + Debug + 'static {
    fn stable_id(self) -> u64;
}

impl AgentId for u64 {
    fn stable_id(self) -> u64 {
        self
    }
}

impl AgentId for u32 {
    fn stable_id(self) -> u64 {
        u64::from(self)
    }
}

impl AgentId for usize {
    fn stable_id(self) -> u64 {
        self as u64
    }
}
