#![allow(dead_code)]

use std::collections::BTreeMap;

use ai_bt::{ActionPhase, BtConfig, BtContext, BtMind, BtStatus, NodeId, Value};
use ai_core::TickContext;

/// Scripted leaf: reports whatever the test configured for its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Leaf {
    Plain(char),
    /// Enters on the first evaluation (Running), then reports the scripted status.
    Phased(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Flag(pub char);

#[derive(Debug)]
pub struct RecordingCtx {
    pub tick: TickContext,
    pub mind: BtMind,
    pub results: BTreeMap<char, BtStatus>,
    pub flags: BTreeMap<char, Value>,
    pub acted: Vec<char>,
    pub queried: Vec<char>,
}

impl RecordingCtx {
    pub fn new() -> Self {
        Self::with_config(&BtConfig::default())
    }

    pub fn with_config(config: &BtConfig) -> Self {
        Self {
            tick: TickContext::new(0, 0, 1),
            mind: BtMind::new(config),
            results: BTreeMap::new(),
            flags: BTreeMap::new(),
            acted: Vec::new(),
            queried: Vec::new(),
        }
    }

    pub fn set(&mut self, label: char, status: BtStatus) -> &mut Self {
        self.results.insert(label, status);
        self
    }

    pub fn at(&mut self, time_ms: u64) -> &mut Self {
        self.tick = TickContext::new(self.tick.tick + 1, time_ms, self.tick.seed);
        self
    }
}

impl BtContext for RecordingCtx {
    type Action = Leaf;
    type Func = Flag;

    fn tick(&self) -> &TickContext {
        &self.tick
    }

    fn mind(&mut self) -> &mut BtMind {
        &mut self.mind
    }

    fn call(&mut self, func: Flag, _params: &[Value]) -> Value {
        self.queried.push(func.0);
        self.flags.get(&func.0).cloned().unwrap_or_default()
    }

    fn act(&mut self, node: NodeId, action: Leaf, _params: &[Value]) -> BtStatus {
        match action {
            Leaf::Plain(label) => {
                self.acted.push(label);
                self.results.get(&label).copied().unwrap_or(BtStatus::Success)
            }
            Leaf::Phased(label) => {
                self.acted.push(label);
                if self.mind.phase(node) != ActionPhase::InProgress {
                    self.mind.set_current(node);
                    return BtStatus::Running;
                }
                self.results.get(&label).copied().unwrap_or(BtStatus::Running)
            }
        }
    }
}
