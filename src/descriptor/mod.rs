//! Foreign type descriptors - the structured input consumed by lowering.
//!
//! The binary metadata format of the foreign assembly is parsed by an external
//! collaborator; this crate receives the result as an immutable [`TypeDescriptor`]
//! object graph. The shapes here mirror the descriptor surface of that
//! collaborator: one descriptor per type, carrying member, attribute and
//! hierarchy information.
//!
//! # Key Types
//!
//! - [`TypeDescriptor`]: One foreign type (class, struct, interface, ...)
//! - [`TypeHandle`]: A named reference to another type plus its kind
//! - [`FieldDescriptor`], [`MethodDescriptor`], [`PropertyDescriptor`], [`EventDescriptor`]
//! - [`AttributeDescriptor`], [`AttributeArgument`]: Custom attribute metadata
//!
//! All descriptors are plain owned data; the caller builds them once and the
//! lowering core only reads them.

/// The kind of a foreign type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TypeKind {
    /// A reference type (class)
    #[default]
    Class,
    /// A value type (struct) - instances are copied on assignment
    Struct,
    /// An interface type
    Interface,
    /// An enum type (a value type with a single backing field)
    Enum,
    /// A delegate type
    Delegate,
}

/// Visibility of a foreign type or member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Visible everywhere
    #[default]
    Public,
    /// Visible only within the declaring type
    Private,
    /// Visible within the declaring type and its subtypes
    Protected,
    /// Visible within the declaring assembly
    Internal,
}

/// A named reference to a type, as it appears inside another descriptor.
///
/// Handles carry the fully qualified name plus the declared kind, which is all
/// the hierarchy linker and the member lowering need to schedule resolution of
/// the referenced type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeHandle {
    /// Fully qualified name (`Namespace.Name`)
    pub fullname: String,
    /// The kind the referencing descriptor declared for this type
    pub kind: TypeKind,
}

impl TypeHandle {
    /// Create a handle from a fully qualified name and kind.
    pub fn new(fullname: impl Into<String>, kind: TypeKind) -> Self {
        TypeHandle {
            fullname: fullname.into(),
            kind,
        }
    }
}

/// A foreign type definition, already deserialized from the assembly metadata.
#[derive(Debug, Clone, Default)]
pub struct TypeDescriptor {
    /// Namespace of the type (may be empty for global types)
    pub namespace: String,
    /// Simple name of the type
    pub name: String,
    /// The kind of this type
    pub kind: TypeKind,
    /// Visibility of the type
    pub visibility: Visibility,
    /// Whether the type is abstract
    pub is_abstract: bool,
    /// Whether the type is sealed (no subtypes allowed)
    pub is_sealed: bool,
    /// Whether the type is static (abstract and sealed in the foreign metadata)
    pub is_static: bool,
    /// Direct base types: at most one of kind [`TypeKind::Class`], any number of interfaces
    pub base_types: Vec<TypeHandle>,
    /// Fully qualified name of the declaring outer type, for nested types
    pub declaring_outer_class: Option<String>,
    /// Field definitions
    pub fields: Vec<FieldDescriptor>,
    /// Method definitions
    pub methods: Vec<MethodDescriptor>,
    /// Property definitions
    pub properties: Vec<PropertyDescriptor>,
    /// Event definitions
    pub events: Vec<EventDescriptor>,
    /// Custom attributes attached to the type
    pub attributes: Vec<AttributeDescriptor>,
}

impl TypeDescriptor {
    /// Returns the full name (`Namespace.Name`) of the type.
    #[must_use]
    pub fn fullname(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{0}.{1}", self.namespace, self.name)
        }
    }
}

/// A foreign field definition.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Field name
    pub name: String,
    /// Declared type of the field
    pub ty: TypeHandle,
    /// Whether the field is static
    pub is_static: bool,
    /// Field visibility
    pub visibility: Visibility,
}

/// A foreign method definition.
#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    /// Method name
    pub name: String,
    /// Parameter definitions, in declaration order
    pub parameters: Vec<ParameterDescriptor>,
    /// Declared return type
    pub return_type: TypeHandle,
    /// Whether the method is static
    pub is_static: bool,
    /// Whether the method is abstract
    pub is_abstract: bool,
    /// Whether the method is virtual (callable polymorphically)
    pub is_virtual: bool,
    /// Whether the method was compiled with unsafe code
    pub is_unsafe: bool,
    /// Method visibility
    pub visibility: Visibility,
}

/// A foreign method parameter definition.
#[derive(Debug, Clone)]
pub struct ParameterDescriptor {
    /// Parameter name
    pub name: String,
    /// Declared type of the parameter
    pub ty: TypeHandle,
    /// `in` modifier - passed by reference, read-only for the callee
    pub is_in: bool,
    /// `out` modifier - passed by reference, must be assigned by the callee
    pub is_out: bool,
    /// `ref` modifier - passed by reference, read-write
    pub is_ref: bool,
}

impl ParameterDescriptor {
    /// Create a plain by-value parameter.
    pub fn by_value(name: impl Into<String>, ty: TypeHandle) -> Self {
        ParameterDescriptor {
            name: name.into(),
            ty,
            is_in: false,
            is_out: false,
            is_ref: false,
        }
    }
}

/// A foreign property definition.
///
/// Properties do not exist in the IR; they lower to accessor methods using the
/// foreign runtime's accessor naming (`get_X` / `set_X`).
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    /// Property name
    pub name: String,
    /// Declared type of the property
    pub ty: TypeHandle,
    /// Whether the property is static
    pub is_static: bool,
    /// Whether the property has a getter
    pub can_get: bool,
    /// Whether the property has a setter
    pub can_set: bool,
}

/// A foreign event definition.
///
/// Events lower to accessor methods (`add_X` / `remove_X` / `raise_X`).
#[derive(Debug, Clone)]
pub struct EventDescriptor {
    /// Event name
    pub name: String,
    /// Declared handler type of the event
    pub handler_type: TypeHandle,
    /// Whether the event exposes an `add` accessor
    pub can_add: bool,
    /// Whether the event exposes a `remove` accessor
    pub can_remove: bool,
    /// Whether the event exposes a `raise` accessor
    pub can_invoke: bool,
}

/// A custom attribute attached to a foreign type.
#[derive(Debug, Clone)]
pub struct AttributeDescriptor {
    /// Fully qualified name of the attribute type
    pub attribute_type: String,
    /// Fixed (constructor) arguments, in signature order
    pub fixed_arguments: Vec<AttributeArgument>,
    /// Named (field/property) arguments
    pub named_arguments: Vec<AttributeArgument>,
}

/// A single custom attribute argument.
#[derive(Debug, Clone)]
pub struct AttributeArgument {
    /// Argument name; `None` for fixed arguments
    pub name: Option<String>,
    /// Fully qualified name of the argument's declared type
    pub type_name: String,
    /// The argument value
    pub value: AttributeValue,
}

/// The value carried by a custom attribute argument.
///
/// The [`AttributeValue::Unparsed`] variant holds raw serialized bytes the
/// external deserializer could not interpret; converting it to an annotation
/// element fails, which exercises the recoverable per-argument error path.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// Null reference
    Null,
    /// Boolean value
    Boolean(bool),
    /// Character value
    Char(char),
    /// 32-bit signed integer (covers the smaller integral encodings as well)
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
    /// 128-bit decimal value, delivered in textual form by the deserializer
    Decimal(String),
    /// Array of argument values
    Array(Vec<AttributeValue>),
    /// Raw bytes the deserializer could not interpret
    Unparsed(Vec<u8>),
}
