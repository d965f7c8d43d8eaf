//! Expressions for synthesized statements, including checked arithmetic.
//!
//! The foreign instruction set has overflow-checked arithmetic instructions
//! (`add.ovf`, `mul.ovf`, ...) that must detect and signal overflow instead of
//! wrapping. The IR represents these with the same structural shape as their
//! unchecked counterparts - a [`BinaryExpr`] over two operands - plus an
//! explicit `checked` capability flag.
//!
//! # Dispatch contract
//!
//! Generic structural analyses (data-flow, use-def) read a binary expression
//! through [`BinaryExpr::operands`] and [`BinaryExpr::structurally_equal`] and
//! need no special casing for checked nodes. Components that care about
//! overflow semantics (a codegen stage emitting a trap, an exception-edge
//! analysis) dispatch on [`BinaryExpr::is_checked`] explicitly. There is no
//! open-ended visitor hierarchy; [`Expr`] is a closed sum type matched
//! exhaustively.

use std::fmt;

use crate::ir::body::{FieldRef, MethodRef, Value};

/// Binary arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// Addition
    Add,
    /// Subtraction
    Sub,
    /// Multiplication
    Mul,
    /// Division
    Div,
    /// Remainder
    Rem,
}

impl BinaryOp {
    /// Mnemonic used in textual dumps.
    #[must_use]
    pub const fn mnemonic(&self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
            BinaryOp::Rem => "rem",
        }
    }
}

/// A binary arithmetic expression over two operand values.
///
/// `checked` marks the overflow-checked variant of the operation. Checked and
/// unchecked nodes share this one shape on purpose: every structural accessor
/// ignores the flag, so analyses that only walk operands treat both
/// identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BinaryExpr {
    /// The operator
    pub op: BinaryOp,
    /// Left operand
    pub left: Value,
    /// Right operand
    pub right: Value,
    /// Overflow-checked marker
    checked: bool,
}

impl BinaryExpr {
    /// Create an unchecked binary expression.
    #[must_use]
    pub fn new(op: BinaryOp, left: Value, right: Value) -> Self {
        BinaryExpr {
            op,
            left,
            right,
            checked: false,
        }
    }

    /// Create an overflow-checked binary expression.
    ///
    /// Corresponds to the foreign `*.ovf` instruction family: the operation
    /// must signal overflow as a distinguishable outcome instead of wrapping.
    #[must_use]
    pub fn new_checked(op: BinaryOp, left: Value, right: Value) -> Self {
        BinaryExpr {
            op,
            left,
            right,
            checked: true,
        }
    }

    /// Both operands, left first.
    #[must_use]
    pub fn operands(&self) -> (&Value, &Value) {
        (&self.left, &self.right)
    }

    /// Returns `true` if this node carries overflow-checked semantics.
    #[must_use]
    pub const fn is_checked(&self) -> bool {
        self.checked
    }

    /// Structural equality: same operator and operands, ignoring the checked
    /// marker.
    #[must_use]
    pub fn structurally_equal(&self, other: &BinaryExpr) -> bool {
        self.op == other.op && self.left == other.left && self.right == other.right
    }

    /// Returns `true` if evaluating this expression can trap.
    ///
    /// Checked operations trap on overflow; division and remainder trap on a
    /// zero divisor regardless of the marker.
    #[must_use]
    pub const fn may_trap(&self) -> bool {
        self.checked || matches!(self.op, BinaryOp::Div | BinaryOp::Rem)
    }
}

impl fmt::Display for BinaryExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = if self.checked { ".ovf" } else { "" };
        write!(
            f,
            "{0}{suffix} {1}, {2}",
            self.op.mnemonic(),
            self.left,
            self.right
        )
    }
}

/// An expression computed on the right-hand side of an assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A plain value copy
    Use(Value),
    /// Allocation of a new instance of the named class
    New(String),
    /// Read of an instance field: `object.field`
    InstanceField {
        /// The object whose field is read
        object: Value,
        /// The field being read
        field: FieldRef,
    },
    /// Direct (non-virtual) invocation producing a result
    InvokeSpecial {
        /// The receiver instance
        receiver: Value,
        /// The invoked method
        method: MethodRef,
        /// Actual arguments
        args: Vec<Value>,
    },
    /// A binary arithmetic expression, checked or unchecked
    Binary(BinaryExpr),
}

impl Expr {
    /// Returns the values this expression reads.
    #[must_use]
    pub fn uses(&self) -> Vec<Value> {
        match self {
            Expr::Use(value) => vec![value.clone()],
            Expr::New(_) => vec![],
            Expr::InstanceField { object, .. } => vec![object.clone()],
            Expr::InvokeSpecial { receiver, args, .. } => {
                let mut uses = vec![receiver.clone()];
                uses.extend(args.iter().cloned());
                uses
            }
            Expr::Binary(binary) => vec![binary.left.clone(), binary.right.clone()],
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Use(value) => write!(f, "{value}"),
            Expr::New(class) => write!(f, "new {class}"),
            Expr::InstanceField { object, field } => write!(f, "{object}.{field}"),
            Expr::InvokeSpecial {
                receiver,
                method,
                args,
            } => {
                write!(f, "invokespecial {receiver}.{method}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
            Expr::Binary(binary) => write!(f, "{binary}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::body::LocalId;

    fn operand(index: usize) -> Value {
        Value::Local(LocalId::new(index))
    }

    #[test]
    fn test_checked_and_unchecked_share_structure() {
        let unchecked = BinaryExpr::new(BinaryOp::Mul, operand(0), operand(1));
        let checked = BinaryExpr::new_checked(BinaryOp::Mul, operand(0), operand(1));

        // A generic operand-walking analysis sees no difference.
        assert!(unchecked.structurally_equal(&checked));
        assert!(checked.structurally_equal(&unchecked));
        assert_eq!(unchecked.operands(), checked.operands());
        assert_eq!(
            Expr::Binary(unchecked.clone()).uses(),
            Expr::Binary(checked.clone()).uses()
        );

        // Identity-based dispatch still tells them apart.
        assert!(!unchecked.is_checked());
        assert!(checked.is_checked());
        assert_ne!(unchecked, checked);
    }

    #[test]
    fn test_dispatch_routes_checked_to_checked_handling() {
        // A consumer that must emit an overflow trap for checked nodes.
        fn handle(expr: &BinaryExpr) -> &'static str {
            if expr.is_checked() {
                "trap-on-overflow"
            } else {
                "plain"
            }
        }

        let unchecked = BinaryExpr::new(BinaryOp::Mul, operand(0), operand(1));
        let checked = BinaryExpr::new_checked(BinaryOp::Mul, operand(0), operand(1));
        assert_eq!(handle(&unchecked), "plain");
        assert_eq!(handle(&checked), "trap-on-overflow");
    }

    #[test]
    fn test_clone_preserves_checked_marker() {
        let checked = BinaryExpr::new_checked(BinaryOp::Add, operand(0), operand(1));
        let cloned = checked.clone();
        assert!(cloned.is_checked());
        assert_eq!(checked, cloned);
    }

    #[test]
    fn test_may_trap() {
        assert!(BinaryExpr::new_checked(BinaryOp::Mul, operand(0), operand(1)).may_trap());
        assert!(!BinaryExpr::new(BinaryOp::Mul, operand(0), operand(1)).may_trap());
        assert!(BinaryExpr::new(BinaryOp::Div, operand(0), operand(1)).may_trap());
        assert!(BinaryExpr::new(BinaryOp::Rem, operand(0), operand(1)).may_trap());
    }

    #[test]
    fn test_structural_inequality_on_operands() {
        let a = BinaryExpr::new(BinaryOp::Mul, operand(0), operand(1));
        let b = BinaryExpr::new(BinaryOp::Mul, operand(0), operand(2));
        let c = BinaryExpr::new(BinaryOp::Add, operand(0), operand(1));
        assert!(!a.structurally_equal(&b));
        assert!(!a.structurally_equal(&c));
    }

    #[test]
    fn test_display() {
        let unchecked = BinaryExpr::new(BinaryOp::Mul, operand(0), operand(1));
        assert_eq!(unchecked.to_string(), "mul l0, l1");
        let checked = BinaryExpr::new_checked(BinaryOp::Mul, operand(0), operand(1));
        assert_eq!(checked.to_string(), "mul.ovf l0, l1");
    }
}
