use tracing::{trace, warn};

use crate::{BehaviorTree, BtContext, BtStatus, DecoratorKind, ListKind, Node, NodeId};

/// Evaluate `id` for the agent behind `ctx`, then update its resumption bookkeeping.
///
/// After the node has run:
/// - a finished node that was the agent's current node clears the current pointer;
/// - Success on a node in the running list clears the whole list;
/// - a Running action clears the list, and any Running node is appended to it (when
///   the list is full the node is not tracked, the status is still Running).
pub fn evaluate<C>(tree: &BehaviorTree<C::Action, C::Func>, ctx: &mut C, id: NodeId) -> BtStatus
where
    C: BtContext,
{
    let Some(node) = tree.get(id) else {
        warn!(node = id.index(), "behavior tree node does not exist");
        return BtStatus::Failure;
    };

    let status = run(tree, ctx, id, node);

    let mind = ctx.mind();
    if status.is_done() && mind.current_node() == Some(id) {
        mind.finish_current();
    }
    if status == BtStatus::Success && mind.is_running(id) {
        mind.clear_running();
    }
    if status == BtStatus::Running {
        if node.is_action() {
            mind.clear_running();
        }
        if !mind.is_running(id) && !mind.push_running(id) {
            warn!(node = id.index(), "bot failed to track running node: running list full");
        }
    }

    status
}

fn run<C>(
    tree: &BehaviorTree<C::Action, C::Func>,
    ctx: &mut C,
    id: NodeId,
    node: &Node<C::Action, C::Func>,
) -> BtStatus
where
    C: BtContext,
{
    match node {
        Node::List { kind, children } => match kind {
            ListKind::Selector => {
                for &child in children {
                    let status = evaluate(tree, ctx, child);
                    if status != BtStatus::Failure {
                        return status;
                    }
                }
                BtStatus::Failure
            }
            ListKind::Sequence => {
                let start = resume_index(ctx, children);
                for &child in &children[start..] {
                    let status = evaluate(tree, ctx, child);
                    if status != BtStatus::Success {
                        return status;
                    }
                }
                BtStatus::Success
            }
            ListKind::Fallback => {
                let start = resume_index(ctx, children);
                for &child in &children[start..] {
                    let status = evaluate(tree, ctx, child);
                    if status != BtStatus::Failure {
                        return status;
                    }
                }
                BtStatus::Failure
            }
            ListKind::Concurrent => {
                let mut running = false;
                for &child in children {
                    match evaluate(tree, ctx, child) {
                        BtStatus::Failure => return BtStatus::Failure,
                        BtStatus::Running => running = true,
                        BtStatus::Success => {}
                    }
                }
                if running {
                    BtStatus::Running
                } else {
                    BtStatus::Success
                }
            }
        },

        Node::Decorator {
            kind,
            child,
            params,
        } => match kind {
            DecoratorKind::Invert => match evaluate(tree, ctx, *child) {
                BtStatus::Success => BtStatus::Failure,
                BtStatus::Failure => BtStatus::Success,
                BtStatus::Running => BtStatus::Running,
            },
            DecoratorKind::Timer => {
                let now = ctx.now_ms();
                if ctx.mind().timer_deadline(id).is_some_and(|d| now < d) {
                    return BtStatus::Failure;
                }
                let status = evaluate(tree, ctx, *child);
                if status == BtStatus::Failure {
                    let interval = params.first().map_or(0, |p| p.as_int()).max(0) as u64;
                    trace!(node = id.index(), interval, "timer re-armed");
                    ctx.mind().arm_timer(id, now.saturating_add(interval));
                }
                status
            }
            DecoratorKind::Return => {
                let code = params.first().map_or(0, |p| p.as_int());
                evaluate(tree, ctx, *child);
                BtStatus::from_code(code).unwrap_or_else(|| {
                    warn!(node = id.index(), code, "return decorator with unknown status");
                    BtStatus::Failure
                })
            }
        },

        Node::Condition { expr, child } => {
            if !expr.eval_bool(&mut |func, params| ctx.call(func, params)) {
                return BtStatus::Failure;
            }
            match child {
                Some(child) => evaluate(tree, ctx, *child),
                None => BtStatus::Success,
            }
        }

        Node::Action { action, params } => ctx.act(id, *action, params),

        Node::Tree { root, .. } => evaluate(tree, ctx, *root),
    }
}

/// Index of the last child (never the first) still marked running, else 0.
fn resume_index<C: BtContext>(ctx: &mut C, children: &[NodeId]) -> usize {
    let mind = ctx.mind();
    (1..children.len())
        .rev()
        .find(|&i| mind.is_running(children[i]))
        .unwrap_or(0)
}
