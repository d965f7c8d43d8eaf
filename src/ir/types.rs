//! IR type references and the primitive type mapping.
//!
//! The IR keeps types deliberately simple: a lowered type is either one of the
//! closed set of runtime primitives, a named reference type, or void. The
//! well-known foreign fullnames (`System.Int32`, ...) map onto
//! [`PrimitiveKind`] so that member lowering can decide whether a field's
//! lowered type is primitive (struct-copy marking depends on this).

use std::fmt;

use strum::{EnumIter, IntoEnumIterator};

use crate::descriptor::TypeHandle;

/// The closed set of runtime primitive types the IR knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum PrimitiveKind {
    /// `System.Boolean` - true/false value
    Boolean,
    /// `System.Char` - 16-bit character
    Char,
    /// `System.SByte` - signed 8-bit integer
    I1,
    /// `System.Byte` - unsigned 8-bit integer
    U1,
    /// `System.Int16` - signed 16-bit integer
    I2,
    /// `System.UInt16` - unsigned 16-bit integer
    U2,
    /// `System.Int32` - signed 32-bit integer
    I4,
    /// `System.UInt32` - unsigned 32-bit integer
    U4,
    /// `System.Int64` - signed 64-bit integer
    I8,
    /// `System.UInt64` - unsigned 64-bit integer
    U8,
    /// `System.Single` - 32-bit floating point
    R4,
    /// `System.Double` - 64-bit floating point
    R8,
    /// `System.IntPtr` - native sized signed integer
    I,
    /// `System.UIntPtr` - native sized unsigned integer
    U,
}

impl PrimitiveKind {
    /// Returns the foreign fullname of this primitive.
    #[must_use]
    pub const fn fullname(&self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "System.Boolean",
            PrimitiveKind::Char => "System.Char",
            PrimitiveKind::I1 => "System.SByte",
            PrimitiveKind::U1 => "System.Byte",
            PrimitiveKind::I2 => "System.Int16",
            PrimitiveKind::U2 => "System.UInt16",
            PrimitiveKind::I4 => "System.Int32",
            PrimitiveKind::U4 => "System.UInt32",
            PrimitiveKind::I8 => "System.Int64",
            PrimitiveKind::U8 => "System.UInt64",
            PrimitiveKind::R4 => "System.Single",
            PrimitiveKind::R8 => "System.Double",
            PrimitiveKind::I => "System.IntPtr",
            PrimitiveKind::U => "System.UIntPtr",
        }
    }

    /// Maps a foreign fullname onto a primitive kind, if it names one.
    #[must_use]
    pub fn from_fullname(fullname: &str) -> Option<Self> {
        PrimitiveKind::iter().find(|kind| kind.fullname() == fullname)
    }
}

/// A lowered type reference.
///
/// Reference types are kept by name rather than by pointer; the registry owns
/// the name-to-class mapping and lowering consults it only where it has to
/// (hierarchy links, struct copy recursion).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IrType {
    /// Absence of a value (method return position only)
    Void,
    /// One of the closed set of runtime primitives
    Primitive(PrimitiveKind),
    /// A reference to a named class, struct or interface
    Object(String),
}

/// Fullname of the foreign universal object type.
pub const SYSTEM_OBJECT: &str = "System.Object";

impl IrType {
    /// Universal object type, the root of the reference type hierarchy.
    #[must_use]
    pub fn object() -> Self {
        IrType::Object(SYSTEM_OBJECT.to_string())
    }

    /// Lower a descriptor type handle into an IR type.
    ///
    /// Well-known primitive fullnames become [`IrType::Primitive`]; everything
    /// else stays a named object reference.
    #[must_use]
    pub fn from_handle(handle: &TypeHandle) -> Self {
        match PrimitiveKind::from_fullname(&handle.fullname) {
            Some(kind) => IrType::Primitive(kind),
            None => IrType::Object(handle.fullname.clone()),
        }
    }

    /// Returns `true` if this is a primitive type.
    #[must_use]
    pub const fn is_primitive(&self) -> bool {
        matches!(self, IrType::Primitive(_))
    }

    /// Returns the referenced class fullname for object types.
    #[must_use]
    pub fn object_name(&self) -> Option<&str> {
        match self {
            IrType::Object(name) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Returns the foreign fullname of this type.
    #[must_use]
    pub fn fullname(&self) -> &str {
        match self {
            IrType::Void => "System.Void",
            IrType::Primitive(kind) => kind.fullname(),
            IrType::Object(name) => name.as_str(),
        }
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fullname())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeKind;

    #[test]
    fn test_primitive_fullname_roundtrip() {
        for kind in PrimitiveKind::iter() {
            assert_eq!(PrimitiveKind::from_fullname(kind.fullname()), Some(kind));
        }
        assert_eq!(PrimitiveKind::from_fullname("System.String"), None);
    }

    #[test]
    fn test_from_handle() {
        let int_handle = TypeHandle::new("System.Int32", TypeKind::Struct);
        assert_eq!(
            IrType::from_handle(&int_handle),
            IrType::Primitive(PrimitiveKind::I4)
        );
        assert!(IrType::from_handle(&int_handle).is_primitive());

        let obj_handle = TypeHandle::new("My.Namespace.Point", TypeKind::Struct);
        let lowered = IrType::from_handle(&obj_handle);
        assert_eq!(lowered, IrType::Object("My.Namespace.Point".to_string()));
        assert!(!lowered.is_primitive());
        assert_eq!(lowered.object_name(), Some("My.Namespace.Point"));
    }

    #[test]
    fn test_display() {
        assert_eq!(IrType::Void.to_string(), "System.Void");
        assert_eq!(
            IrType::Primitive(PrimitiveKind::R8).to_string(),
            "System.Double"
        );
        assert_eq!(IrType::object().to_string(), "System.Object");
    }
}
