use std::sync::Arc;

use thiserror::Error;

use crate::{BtStatus, Expr, Value};

/// Stable index of a node inside its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    /// First child that does not fail wins.
    Selector,
    /// Children in order until one does not succeed; resumes at the running child.
    Sequence,
    /// Children in order until one does not fail; resumes at the running child.
    Fallback,
    /// Every child each tick until one fails; Running if any child is still running.
    Concurrent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecoratorKind {
    /// Swap Success and Failure.
    Invert,
    /// Rate-limit a failing child; param 0 is the back-off in milliseconds.
    Timer,
    /// Evaluate the child, then report the status code in param 0.
    Return,
}

impl DecoratorKind {
    fn required_params(self) -> usize {
        match self {
            Self::Invert => 0,
            Self::Timer | Self::Return => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node<A, F> {
    List {
        kind: ListKind,
        children: Vec<NodeId>,
    },
    Decorator {
        kind: DecoratorKind,
        child: NodeId,
        params: Vec<Value>,
    },
    Condition {
        expr: Expr<F>,
        child: Option<NodeId>,
    },
    Action {
        action: A,
        params: Vec<Value>,
    },
    /// Root of a (possibly nested) named tree.
    Tree {
        name: Arc<str>,
        root: NodeId,
    },
}

impl<A, F> Node<A, F> {
    pub fn is_action(&self) -> bool {
        matches!(self, Self::Action { .. })
    }

    fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        let (list, single): (&[NodeId], Option<NodeId>) = match self {
            Self::List { children, .. } => (children, None),
            Self::Decorator { child, .. } => (&[], Some(*child)),
            Self::Condition { child, .. } => (&[], *child),
            Self::Tree { root, .. } => (&[], Some(*root)),
            Self::Action { .. } => (&[], None),
        };
        list.iter().copied().chain(single)
    }

    fn remap(&self, offset: usize) -> Self
    where
        A: Clone,
        F: Clone,
    {
        let shift = |id: NodeId| NodeId::new(id.index() + offset);
        match self {
            Self::List { kind, children } => Self::List {
                kind: *kind,
                children: children.iter().copied().map(shift).collect(),
            },
            Self::Decorator {
                kind,
                child,
                params,
            } => Self::Decorator {
                kind: *kind,
                child: shift(*child),
                params: params.clone(),
            },
            Self::Condition { expr, child } => Self::Condition {
                expr: expr.clone(),
                child: child.map(shift),
            },
            Self::Action { action, params } => Self::Action {
                action: action.clone(),
                params: params.clone(),
            },
            Self::Tree { name, root } => Self::Tree {
                name: name.clone(),
                root: shift(*root),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("node {0} does not exist")]
    UnknownNode(usize),

    #[error("node {parent} references node {child}, which was not built before it")]
    ForwardReference { parent: usize, child: usize },

    #[error("node {0} has more than one parent")]
    SharedNode(usize),

    #[error("list node {0} has no children")]
    EmptyList(usize),

    #[error("{kind:?} decorator {node} needs {expected} parameter(s), got {got}")]
    DecoratorParams {
        node: usize,
        kind: DecoratorKind,
        expected: usize,
        got: usize,
    },
}

/// Immutable arena tree shared by every agent running it.
#[derive(Debug, Clone, PartialEq)]
pub struct BehaviorTree<A, F> {
    nodes: Vec<Node<A, F>>,
    root: NodeId,
}

impl<A, F> BehaviorTree<A, F> {
    /// The `Tree` node wrapping the root built with `TreeBuilder::build`.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn name(&self) -> &str {
        match self.get(self.root) {
            Some(Node::Tree { name, .. }) => name.as_ref(),
            _ => "",
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&Node<A, F>> {
        self.nodes.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node<A, F>)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId::new(i), n))
    }
}

/// Builds a tree bottom-up: children first, then the parents that own them.
#[derive(Debug, Clone)]
pub struct TreeBuilder<A, F> {
    nodes: Vec<Node<A, F>>,
}

impl<A, F> Default for TreeBuilder<A, F> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<A, F> TreeBuilder<A, F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: Node<A, F>) -> NodeId {
        self.nodes.push(node);
        NodeId::new(self.nodes.len() - 1)
    }

    pub fn action(&mut self, action: A, params: Vec<Value>) -> NodeId {
        self.push(Node::Action { action, params })
    }

    pub fn condition(&mut self, expr: Expr<F>, child: Option<NodeId>) -> NodeId {
        self.push(Node::Condition { expr, child })
    }

    pub fn decorator(&mut self, kind: DecoratorKind, child: NodeId, params: Vec<Value>) -> NodeId {
        self.push(Node::Decorator {
            kind,
            child,
            params,
        })
    }

    pub fn invert(&mut self, child: NodeId) -> NodeId {
        self.decorator(DecoratorKind::Invert, child, Vec::new())
    }

    pub fn timer(&mut self, child: NodeId, interval_ms: i32) -> NodeId {
        self.decorator(DecoratorKind::Timer, child, vec![Value::Int(interval_ms)])
    }

    pub fn returns(&mut self, child: NodeId, status: BtStatus) -> NodeId {
        self.decorator(DecoratorKind::Return, child, vec![Value::Int(status.code())])
    }

    pub fn list(&mut self, kind: ListKind, children: Vec<NodeId>) -> NodeId {
        self.push(Node::List { kind, children })
    }

    pub fn selector(&mut self, children: Vec<NodeId>) -> NodeId {
        self.list(ListKind::Selector, children)
    }

    pub fn sequence(&mut self, children: Vec<NodeId>) -> NodeId {
        self.list(ListKind::Sequence, children)
    }

    pub fn fallback(&mut self, children: Vec<NodeId>) -> NodeId {
        self.list(ListKind::Fallback, children)
    }

    pub fn concurrent(&mut self, children: Vec<NodeId>) -> NodeId {
        self.list(ListKind::Concurrent, children)
    }

    /// Copy a finished tree into this arena; returns its `Tree` node for use as a child.
    pub fn import(&mut self, tree: &BehaviorTree<A, F>) -> NodeId
    where
        A: Clone,
        F: Clone,
    {
        let offset = self.nodes.len();
        self.nodes
            .extend(tree.nodes.iter().map(|n| n.remap(offset)));
        NodeId::new(tree.root.index() + offset)
    }

    /// Wrap `root` in a named `Tree` node and validate the arena.
    pub fn build(mut self, name: &str, root: NodeId) -> Result<BehaviorTree<A, F>, TreeError> {
        if root.index() >= self.nodes.len() {
            return Err(TreeError::UnknownNode(root.index()));
        }
        let root = self.push(Node::Tree {
            name: Arc::from(name),
            root,
        });
        self.validate()?;
        Ok(BehaviorTree {
            nodes: self.nodes,
            root,
        })
    }

    fn validate(&self) -> Result<(), TreeError> {
        let mut has_parent = vec![false; self.nodes.len()];
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                Node::List { children, .. } if children.is_empty() => {
                    return Err(TreeError::EmptyList(i));
                }
                Node::Decorator { kind, params, .. } if params.len() < kind.required_params() => {
                    return Err(TreeError::DecoratorParams {
                        node: i,
                        kind: *kind,
                        expected: kind.required_params(),
                        got: params.len(),
                    });
                }
                _ => {}
            }

            for child in node.children() {
                let c = child.index();
                if c >= self.nodes.len() {
                    return Err(TreeError::UnknownNode(c));
                }
                if c >= i {
                    return Err(TreeError::ForwardReference {
                        parent: i,
                        child: c,
                    });
                }
                if has_parent[c] {
                    return Err(TreeError::SharedNode(c));
                }
                has_parent[c] = true;
            }
        }
        Ok(())
    }
}
