//! Behavior-tree runtime: an immutable arena tree shared by every agent, evaluated once
//! per tick against per-agent resumption state.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod bt;
pub mod expr;
pub mod mind;
pub mod nodes;
pub mod tree;
pub mod value;

pub use bt::{BtContext, BtStatus};
pub use expr::{BinaryOp, Expr, UnaryOp};
pub use mind::{ActionPhase, BtConfig, BtMind};
pub use nodes::evaluate;
pub use tree::{BehaviorTree, DecoratorKind, ListKind, Node, NodeId, TreeBuilder, TreeError};
pub use value::Value;
