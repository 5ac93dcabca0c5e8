//! Deterministic, engine-agnostic primitives shared by the bot crates.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod agent;
pub mod rng;
pub mod tick;
pub mod world;

pub use agent::AgentId;
pub use rng::{DeterministicRng, SplitMix64};
pub use tick::TickContext;
pub use world::WorldView;
