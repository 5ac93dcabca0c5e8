use crate::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

/// Condition expression over literal values and world queries `F`.
///
/// Comparisons work on `f64` (exact for every int and float operand); `And`/`Or`
/// short-circuit and treat their operands as booleans.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr<F> {
    Value(Value),
    Func { func: F, params: Vec<Value> },
    Unary { op: UnaryOp, expr: Box<Expr<F>> },
    Binary { op: BinaryOp, lhs: Box<Expr<F>>, rhs: Box<Expr<F>> },
}

impl<F: Copy> Expr<F> {
    pub fn value(v: impl Into<Value>) -> Self {
        Self::Value(v.into())
    }

    pub fn func(func: F, params: Vec<Value>) -> Self {
        Self::Func { func, params }
    }

    pub fn not(expr: Self) -> Self {
        Self::Unary {
            op: UnaryOp::Not,
            expr: Box::new(expr),
        }
    }

    pub fn binary(op: BinaryOp, lhs: Self, rhs: Self) -> Self {
        Self::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn and(lhs: Self, rhs: Self) -> Self {
        Self::binary(BinaryOp::And, lhs, rhs)
    }

    pub fn or(lhs: Self, rhs: Self) -> Self {
        Self::binary(BinaryOp::Or, lhs, rhs)
    }

    pub fn eval_bool<C>(&self, call: &mut C) -> bool
    where
        C: FnMut(F, &[Value]) -> Value,
    {
        match self {
            Self::Value(v) => v.is_truthy(),
            Self::Func { func, params } => call(*func, params).is_truthy(),
            Self::Unary {
                op: UnaryOp::Not,
                expr,
            } => !expr.eval_bool(call),
            Self::Binary { op, lhs, rhs } => match op {
                BinaryOp::And => lhs.eval_bool(call) && rhs.eval_bool(call),
                BinaryOp::Or => lhs.eval_bool(call) || rhs.eval_bool(call),
                BinaryOp::Lt => lhs.eval_value(call) < rhs.eval_value(call),
                BinaryOp::Le => lhs.eval_value(call) <= rhs.eval_value(call),
                BinaryOp::Gt => lhs.eval_value(call) > rhs.eval_value(call),
                BinaryOp::Ge => lhs.eval_value(call) >= rhs.eval_value(call),
                BinaryOp::Eq => lhs.eval_value(call) == rhs.eval_value(call),
                BinaryOp::Ne => lhs.eval_value(call) != rhs.eval_value(call),
            },
        }
    }

    /// Numeric value; operator nodes yield 1.0 or 0.0.
    pub fn eval_value<C>(&self, call: &mut C) -> f64
    where
        C: FnMut(F, &[Value]) -> Value,
    {
        match self {
            Self::Value(v) => v.as_f64(),
            Self::Func { func, params } => call(*func, params).as_f64(),
            Self::Unary { .. } | Self::Binary { .. } => f64::from(u8::from(self.eval_bool(call))),
        }
    }
}
