//! Annotation and marker tags attached to lowered classes.
//!
//! Foreign custom attributes lower to [`AnnotationTag`]s: the attribute type's
//! fully qualified name plus an ordered list of converted argument elements.
//! A small set of well-known attributes additionally produce dedicated tags
//! ([`Tag::Deprecated`] for the foreign obsolete identity,
//! [`Tag::DecimalConstant`] for encoded 128-bit decimal constants).

use std::fmt;

/// A tag attached to a lowered class.
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    /// A generic annotation converted from a foreign custom attribute
    Annotation(AnnotationTag),
    /// Marker: the class is deprecated in the foreign source
    Deprecated,
    /// A 128-bit decimal constant, kept in its textual form
    ///
    /// The IR has no 128-bit decimal type; the value survives as this tag so
    /// consumers that understand the foreign decimal encoding can recover it.
    DecimalConstant(String),
}

/// Fullname of the foreign attribute marking deprecated code.
pub const OBSOLETE_ATTRIBUTE: &str = "System.ObsoleteAttribute";

/// Fullname of the foreign attribute encoding a 128-bit decimal constant.
pub const DECIMAL_CONSTANT_ATTRIBUTE: &str =
    "System.Runtime.CompilerServices.DecimalConstantAttribute";

/// An annotation converted from a foreign custom attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationTag {
    /// Fully qualified name of the attribute type
    pub type_name: String,
    /// Converted argument elements: fixed arguments first, then named ones
    pub elements: Vec<AnnotationElement>,
}

impl AnnotationTag {
    /// Create an annotation tag.
    pub fn new(type_name: impl Into<String>, elements: Vec<AnnotationElement>) -> Self {
        AnnotationTag {
            type_name: type_name.into(),
            elements,
        }
    }
}

/// One converted attribute argument.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationElement {
    /// Argument name; `None` for fixed (constructor) arguments
    pub name: Option<String>,
    /// The converted value
    pub value: ElementValue,
}

/// The converted value of an annotation element.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    /// Null reference
    Null,
    /// Boolean value
    Boolean(bool),
    /// Character value
    Char(char),
    /// 32-bit signed integer
    I4(i32),
    /// 64-bit signed integer
    I8(i64),
    /// 32-bit floating point
    R4(f32),
    /// 64-bit floating point
    R8(f64),
    /// UTF-8 string
    String(String),
    /// Type reference, as a fully qualified name
    Type(String),
    /// Enum value: backing type fullname plus the raw constant
    Enum(String, i64),
    /// 128-bit decimal value, in textual form
    Decimal(String),
    /// Array of element values
    Array(Vec<ElementValue>),
}

impl fmt::Display for ElementValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementValue::Null => write!(f, "null"),
            ElementValue::Boolean(v) => write!(f, "{v}"),
            ElementValue::Char(v) => write!(f, "'{v}'"),
            ElementValue::I4(v) => write!(f, "{v}"),
            ElementValue::I8(v) => write!(f, "{v}"),
            ElementValue::R4(v) => write!(f, "{v}"),
            ElementValue::R8(v) => write!(f, "{v}"),
            ElementValue::String(v) => write!(f, "\"{v}\""),
            ElementValue::Type(v) => write!(f, "typeof({v})"),
            ElementValue::Enum(ty, v) => write!(f, "{ty}({v})"),
            ElementValue::Decimal(v) => write!(f, "{v}m"),
            ElementValue::Array(values) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            }
        }
    }
}
