use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::NodeId;

/// Per-agent evaluation limits.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BtConfig {
    /// Capacity of the running-node list; deeper running paths are not tracked.
    pub max_running_nodes: usize,
}

fn default_max_running_nodes() -> usize {
    20
}

impl Default for BtConfig {
    fn default() -> Self {
        Self {
            max_running_nodes: default_max_running_nodes(),
        }
    }
}

/// Where a multi-tick action leaf stands for this agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionPhase {
    /// Not the current node: the next evaluation is a fresh entry.
    NotStarted,
    /// Entered on an earlier evaluation and still current.
    InProgress,
    /// Was current and its last evaluation finished.
    Done,
}

/// Agent-owned resumption state for one shared behavior tree.
#[derive(Debug, Clone)]
pub struct BtMind {
    running: Vec<NodeId>,
    capacity: usize,
    current: Option<NodeId>,
    finished: Option<NodeId>,
    timers: BTreeMap<NodeId, u64>,
}

impl Default for BtMind {
    fn default() -> Self {
        Self::new(&BtConfig::default())
    }
}

impl BtMind {
    pub fn new(config: &BtConfig) -> Self {
        Self {
            running: Vec::with_capacity(config.max_running_nodes),
            capacity: config.max_running_nodes,
            current: None,
            finished: None,
            timers: BTreeMap::new(),
        }
    }

    pub fn running_nodes(&self) -> &[NodeId] {
        &self.running
    }

    pub fn is_running(&self, node: NodeId) -> bool {
        self.running.contains(&node)
    }

    pub fn clear_running(&mut self) {
        self.running.clear();
    }

    /// Append `node` to the running list. Returns `false` when the list is full.
    pub fn push_running(&mut self, node: NodeId) -> bool {
        if self.running.len() >= self.capacity {
            return false;
        }
        self.running.push(node);
        true
    }

    pub fn current_node(&self) -> Option<NodeId> {
        self.current
    }

    /// Mark `node` as entered. Replacing the current node is how an action hands over.
    pub fn set_current(&mut self, node: NodeId) {
        self.current = Some(node);
        self.finished = None;
    }

    /// The current node finished; the next evaluation of it starts over.
    pub fn finish_current(&mut self) {
        self.finished = self.current.take();
    }

    pub fn phase(&self, node: NodeId) -> ActionPhase {
        if self.current == Some(node) {
            ActionPhase::InProgress
        } else if self.finished == Some(node) {
            ActionPhase::Done
        } else {
            ActionPhase::NotStarted
        }
    }

    pub fn timer_deadline(&self, node: NodeId) -> Option<u64> {
        self.timers.get(&node).copied()
    }

    pub fn arm_timer(&mut self, node: NodeId, deadline_ms: u64) {
        self.timers.insert(node, deadline_ms);
    }

    /// Forget all progress, e.g. when the agent respawns or switches trees.
    pub fn reset(&mut self) {
        self.running.clear();
        self.current = None;
        self.finished = None;
        self.timers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_list_is_bounded() {
        let mut mind = BtMind::new(&BtConfig {
            max_running_nodes: 2,
        });
        assert!(mind.push_running(NodeId::new(0)));
        assert!(mind.push_running(NodeId::new(1)));
        assert!(!mind.push_running(NodeId::new(2)));
        assert_eq!(mind.running_nodes().len(), 2);
    }

    #[test]
    fn phase_follows_current_node() {
        let mut mind = BtMind::default();
        let a = NodeId::new(3);
        assert_eq!(mind.phase(a), ActionPhase::NotStarted);
        mind.set_current(a);
        assert_eq!(mind.phase(a), ActionPhase::InProgress);
        mind.finish_current();
        assert_eq!(mind.phase(a), ActionPhase::Done);
        assert_eq!(mind.current_node(), None);
        mind.set_current(NodeId::new(4));
        assert_eq!(mind.phase(a), ActionPhase::NotStarted);
    }
}
