//! Synthetic method bodies.
//!
//! The instruction-level translation of descriptor-declared method bodies is
//! an external concern. This module carries only what the synthesis passes of
//! this core need to emit: flat statement lists over locals, field accesses
//! and direct invocations, enough to express struct deep-copy methods, empty
//! constructors and by-reference wrap/unwrap plumbing.

use std::fmt;

use crate::ir::expr::Expr;
use crate::ir::types::IrType;

/// Index of a local variable within its body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalId(usize);

impl LocalId {
    /// Create a local id from a raw index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        LocalId(index)
    }

    /// Raw index of the local.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "l{0}", self.0)
    }
}

/// A local variable declaration inside a synthesized body.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalVar {
    /// Local name; not required to be unique
    pub name: String,
    /// Declared type
    pub ty: IrType,
}

/// A simple value operand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// The receiver of an instance method
    This,
    /// A local variable
    Local(LocalId),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::This => write!(f, "this"),
            Value::Local(id) => write!(f, "{id}"),
        }
    }
}

/// A reference to a field by declaring class and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    /// Fullname of the declaring class
    pub class: String,
    /// Field name
    pub field: String,
}

impl FieldRef {
    /// Create a field reference.
    pub fn new(class: impl Into<String>, field: impl Into<String>) -> Self {
        FieldRef {
            class: class.into(),
            field: field.into(),
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{0}::{1}", self.class, self.field)
    }
}

/// A reference to a method by declaring class and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodRef {
    /// Fullname of the declaring class
    pub class: String,
    /// Method name
    pub method: String,
}

impl MethodRef {
    /// Create a method reference.
    pub fn new(class: impl Into<String>, method: impl Into<String>) -> Self {
        MethodRef {
            class: class.into(),
            method: method.into(),
        }
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{0}::{1}", self.class, self.method)
    }
}

/// An assignable location.
#[derive(Debug, Clone, PartialEq)]
pub enum Place {
    /// A local variable
    Local(LocalId),
    /// An instance field of some object
    Field {
        /// The object whose field is written
        object: Value,
        /// The field being written
        field: FieldRef,
    },
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Place::Local(id) => write!(f, "{id}"),
            Place::Field { object, field } => write!(f, "{object}.{field}"),
        }
    }
}

/// One statement of a synthesized body.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `target = value`
    Assign {
        /// Where the result is stored
        target: Place,
        /// The computed value
        value: Expr,
    },
    /// Direct (non-virtual) invocation with discarded result, e.g. a ctor call
    InvokeSpecial {
        /// The receiver instance
        receiver: Value,
        /// The invoked method
        method: MethodRef,
        /// Actual arguments
        args: Vec<Value>,
    },
    /// `return value`
    Return(Value),
    /// `return` from a void method
    ReturnVoid,
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Assign { target, value } => write!(f, "{target} = {value}"),
            Stmt::InvokeSpecial {
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
            Stmt::Return(value) => write!(f, "ret {value}"),
            Stmt::ReturnVoid => write!(f, "ret"),
        }
    }
}

/// A synthesized method body: locals plus a flat statement list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodBody {
    locals: Vec<LocalVar>,
    stmts: Vec<Stmt>,
}

impl MethodBody {
    /// Create an empty body.
    #[must_use]
    pub fn new() -> Self {
        MethodBody::default()
    }

    /// Allocate a new local and return its id.
    pub fn add_local(&mut self, name: impl Into<String>, ty: IrType) -> LocalId {
        self.locals.push(LocalVar {
            name: name.into(),
            ty,
        });
        LocalId(self.locals.len() - 1)
    }

    /// Append a statement.
    pub fn push(&mut self, stmt: Stmt) {
        self.stmts.push(stmt);
    }

    /// The declared locals, in allocation order.
    #[must_use]
    pub fn locals(&self) -> &[LocalVar] {
        &self.locals
    }

    /// The statements, in emission order.
    #[must_use]
    pub fn stmts(&self) -> &[Stmt] {
        &self.stmts
    }
}
