use core::fmt;

use ai_core::TickContext;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{BtMind, NodeId, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BtStatus {
    Failure,
    Success,
    Running,
}

impl BtStatus {
    /// Numeric status used by tree parameters: 0 = Failure, 1 = Success, 2 = Running.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Failure),
            1 => Some(Self::Success),
            2 => Some(Self::Running),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Failure => 0,
            Self::Success => 1,
            Self::Running => 2,
        }
    }

    pub fn is_done(self) -> bool {
        self != Self::Running
    }
}

/// Everything a tree evaluation needs from its host: the agent's mind, world queries
/// for condition expressions and the action leaves themselves.
pub trait BtContext {
    type Action: Copy + fmt::Debug;
    type Func: Copy + fmt::Debug;

    fn tick(&self) -> &TickContext;

    fn now_ms(&self) -> u64 {
        self.tick().time_ms
    }

    fn mind(&mut self) -> &mut BtMind;

    /// Evaluate a world query used inside a condition expression.
    fn call(&mut self, func: Self::Func, params: &[Value]) -> Value;

    /// Run one action leaf. `node` identifies the leaf for phase tracking.
    fn act(&mut self, node: NodeId, action: Self::Action, params: &[Value]) -> BtStatus;
}
