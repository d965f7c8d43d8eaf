//! IR class and member representation.
//!
//! [`IrClass`] is the lowered counterpart of a foreign type descriptor. It owns
//! its field, method and tag lists; hierarchy links (base class, outer class,
//! interfaces) are shared references into the registry, held weakly so the
//! registry stays the single owner.
//!
//! # Member invariant
//!
//! No two members of a class share the same lowered name and signature. The
//! invariant is enforced here, not in the lowering passes: insertion goes
//! through atomic check-then-insert indexes, so the first member registered
//! under a signature wins and all later ones are rejected. Synthesis code
//! relies on the same indexes for idempotence ([`IrClass::get_or_add_method`]).

use std::sync::{Arc, OnceLock, RwLock, Weak};
use std::fmt;

use bitflags::bitflags;
use dashmap::DashMap;

use crate::descriptor::TypeKind;
use crate::ir::body::MethodBody;
use crate::ir::tags::Tag;
use crate::ir::types::IrType;
use crate::registry::ClassId;

/// A reference-counted pointer to an [`IrClass`]
pub type IrClassRc = Arc<IrClass>;
/// A reference-counted pointer to an [`IrField`]
pub type IrFieldRc = Arc<IrField>;
/// A reference-counted pointer to an [`IrMethod`]
pub type IrMethodRc = Arc<IrMethod>;

bitflags! {
    /// Lowered modifier flags for classes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TypeModifiers: u32 {
        /// Visible everywhere
        const PUBLIC = 0x0001;
        /// Visible only within the declaring type
        const PRIVATE = 0x0002;
        /// Visible within the declaring type and subtypes
        const PROTECTED = 0x0004;
        /// Visible within the declaring assembly
        const INTERNAL = 0x0008;
        /// No instances, must be subclassed
        const ABSTRACT = 0x0010;
        /// No subtypes allowed
        const FINAL = 0x0020;
        /// No instance state
        const STATIC = 0x0040;
        /// The type is an interface
        const INTERFACE = 0x0080;
        /// The type is a value type
        const VALUE_TYPE = 0x0100;
    }
}

bitflags! {
    /// Lowered modifier flags for fields and methods.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MemberModifiers: u32 {
        /// Visible everywhere
        const PUBLIC = 0x0001;
        /// Visible only within the declaring type
        const PRIVATE = 0x0002;
        /// Visible within the declaring type and subtypes
        const PROTECTED = 0x0004;
        /// Visible within the declaring assembly
        const INTERNAL = 0x0008;
        /// Not bound to an instance
        const STATIC = 0x0010;
        /// No body, must be overridden
        const ABSTRACT = 0x0020;
        /// Dispatched polymorphically
        const VIRTUAL = 0x0040;
        /// Cannot be overridden
        const FINAL = 0x0080;
    }
}

/// A weak reference to a class, used for hierarchy links.
///
/// The registry holds the strong references; links between classes must not
/// create ownership cycles.
#[derive(Clone)]
pub struct IrClassRef(Weak<IrClass>);

impl IrClassRef {
    /// Create a weak reference from a strong one.
    #[must_use]
    pub fn new(class: &IrClassRc) -> Self {
        IrClassRef(Arc::downgrade(class))
    }

    /// Upgrade to a strong reference, if the class is still registered.
    #[must_use]
    pub fn upgrade(&self) -> Option<IrClassRc> {
        self.0.upgrade()
    }
}

impl From<IrClassRc> for IrClassRef {
    fn from(class: IrClassRc) -> Self {
        IrClassRef(Arc::downgrade(&class))
    }
}

/// A lowered field declaration.
#[derive(Debug)]
pub struct IrField {
    /// Field name
    pub name: String,
    /// Lowered type of the field
    pub ty: IrType,
    /// Modifier flags
    pub flags: MemberModifiers,
}

impl IrField {
    /// Create a new field declaration.
    pub fn new(name: impl Into<String>, ty: IrType, flags: MemberModifiers) -> Self {
        IrField {
            name: name.into(),
            ty,
            flags,
        }
    }

    /// Returns `true` if the field is static.
    #[must_use]
    pub const fn is_static(&self) -> bool {
        self.flags.contains(MemberModifiers::STATIC)
    }

    /// The dedup key for this field: lowered name plus lowered type.
    #[must_use]
    pub fn signature(&self) -> String {
        format!("{0}:{1}", self.name, self.ty)
    }
}

/// A lowered method signature: name, parameter types and return type.
///
/// This is the member dedup key for methods. Foreign numeric aliasing (e.g.
/// `int` vs `uint` in generic instantiations) can produce colliding signatures
/// on purpose; the first registered method wins.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    /// Method name
    pub name: String,
    /// Lowered parameter types, in order
    pub parameters: Vec<IrType>,
    /// Lowered return type
    pub return_type: IrType,
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{0}(", self.name)?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, "): {0}", self.return_type)
    }
}

/// A lowered method declaration, with an optional synthesized body.
///
/// Bodies for descriptor-declared methods are produced by the external
/// instruction translator and are not part of this core; the body slot exists
/// for synthesized members (struct copy methods, empty constructors, the
/// by-reference wrapper constructor).
#[derive(Debug)]
pub struct IrMethod {
    /// Method name
    pub name: String,
    /// Lowered parameter types, in order
    pub parameters: Vec<IrType>,
    /// Lowered return type
    pub return_type: IrType,
    /// Modifier flags
    pub flags: MemberModifiers,
    /// Synthesized body, set at most once
    body: OnceLock<MethodBody>,
}

impl IrMethod {
    /// Create a new method declaration without a body.
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<IrType>,
        return_type: IrType,
        flags: MemberModifiers,
    ) -> Self {
        IrMethod {
            name: name.into(),
            parameters,
            return_type,
            flags,
            body: OnceLock::new(),
        }
    }

    /// Returns the signature of this method.
    #[must_use]
    pub fn signature(&self) -> MethodSignature {
        MethodSignature {
            name: self.name.clone(),
            parameters: self.parameters.clone(),
            return_type: self.return_type.clone(),
        }
    }

    /// Returns `true` if the method is static.
    #[must_use]
    pub const fn is_static(&self) -> bool {
        self.flags.contains(MemberModifiers::STATIC)
    }

    /// Attach a synthesized body. Returns `false` if a body was already set.
    pub fn set_body(&self, body: MethodBody) -> bool {
        self.body.set(body).is_ok()
    }

    /// Access the synthesized body, if one was attached.
    #[must_use]
    pub fn body(&self) -> Option<&MethodBody> {
        self.body.get()
    }
}

/// The lowered representation of one foreign type.
///
/// Construction yields an empty shell (the registry creates these, also as
/// placeholders for not-yet-lowered references); the lowering passes populate
/// kind, modifiers, hierarchy links, members and tags afterwards.
pub struct IrClass {
    /// Registry-assigned identifier
    pub id: ClassId,
    /// Namespace (may be empty)
    pub namespace: String,
    /// Simple name
    pub name: String,
    /// Kind of the type; placeholders start from the referencing handle's kind
    kind: RwLock<TypeKind>,
    /// Lowered modifier flags
    flags: RwLock<TypeModifiers>,
    /// Superclass link, set at most once
    base: OnceLock<IrClassRef>,
    /// Declaring outer class link, set at most once
    outer: OnceLock<IrClassRef>,
    /// Implemented interfaces, deduplicated by fullname
    interfaces: boxcar::Vec<IrClassRef>,
    /// Field list, in registration order
    fields: boxcar::Vec<IrFieldRc>,
    /// Method list, in registration order
    methods: boxcar::Vec<IrMethodRc>,
    /// Annotation and marker tags
    tags: boxcar::Vec<Tag>,
    /// Field dedup index: signature -> position in `fields`
    field_index: DashMap<String, usize>,
    /// Method dedup index: signature -> position in `methods`
    method_index: DashMap<MethodSignature, usize>,
}

impl IrClass {
    /// Create an empty class shell.
    pub fn new(id: ClassId, namespace: impl Into<String>, name: impl Into<String>, kind: TypeKind) -> Self {
        IrClass {
            id,
            namespace: namespace.into(),
            name: name.into(),
            kind: RwLock::new(kind),
            flags: RwLock::new(TypeModifiers::empty()),
            base: OnceLock::new(),
            outer: OnceLock::new(),
            interfaces: boxcar::Vec::new(),
            fields: boxcar::Vec::new(),
            methods: boxcar::Vec::new(),
            tags: boxcar::Vec::new(),
            field_index: DashMap::new(),
            method_index: DashMap::new(),
        }
    }

    /// Returns the full name (`Namespace.Name`) of the class.
    #[must_use]
    pub fn fullname(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{0}.{1}", self.namespace, self.name)
        }
    }

    /// Returns the kind of this class.
    #[must_use]
    pub fn kind(&self) -> TypeKind {
        *self.kind.read().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Overwrite the kind, used when a placeholder is lowered for real.
    pub fn set_kind(&self, kind: TypeKind) {
        *self.kind.write().unwrap_or_else(std::sync::PoisonError::into_inner) = kind;
    }

    /// Returns `true` if this class lowers a value type.
    #[must_use]
    pub fn is_struct(&self) -> bool {
        self.kind() == TypeKind::Struct
    }

    /// Returns the lowered modifier flags.
    #[must_use]
    pub fn modifiers(&self) -> TypeModifiers {
        *self.flags.read().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Set the lowered modifier flags.
    pub fn set_modifiers(&self, flags: TypeModifiers) {
        *self.flags.write().unwrap_or_else(std::sync::PoisonError::into_inner) = flags;
    }

    /// Link the superclass. The first link wins; later calls are ignored.
    pub fn set_base(&self, base: &IrClassRc) {
        self.base.set(IrClassRef::new(base)).ok();
    }

    /// Access the superclass, if linked and still registered.
    #[must_use]
    pub fn base(&self) -> Option<IrClassRc> {
        self.base.get().and_then(IrClassRef::upgrade)
    }

    /// Link the declaring outer class. The first link wins.
    pub fn set_outer(&self, outer: &IrClassRc) {
        self.outer.set(IrClassRef::new(outer)).ok();
    }

    /// Access the declaring outer class, if linked and still registered.
    #[must_use]
    pub fn outer(&self) -> Option<IrClassRc> {
        self.outer.get().and_then(IrClassRef::upgrade)
    }

    /// Add an implemented interface, deduplicated by fullname.
    ///
    /// Foreign generics can report the same interface more than once; later
    /// occurrences are silently skipped. Returns `true` if the interface was
    /// added.
    pub fn add_interface(&self, interface: &IrClassRc) -> bool {
        let fullname = interface.fullname();
        for (_, existing) in self.interfaces.iter() {
            if let Some(existing) = existing.upgrade() {
                if existing.fullname() == fullname {
                    return false;
                }
            }
        }
        self.interfaces.push(IrClassRef::new(interface));
        true
    }

    /// Returns the implemented interfaces that are still registered.
    #[must_use]
    pub fn interfaces(&self) -> Vec<IrClassRc> {
        self.interfaces
            .iter()
            .filter_map(|(_, r)| r.upgrade())
            .collect()
    }

    /// Returns `true` if a field with the given signature is declared.
    #[must_use]
    pub fn declares_field(&self, signature: &str) -> bool {
        self.field_index.contains_key(signature)
    }

    /// Register a field, first-wins.
    ///
    /// Returns the registered field and `true` if this call created it, or the
    /// previously registered field and `false` on a signature collision.
    pub fn add_field(&self, field: IrField) -> (IrFieldRc, bool) {
        let signature = field.signature();
        match self.field_index.entry(signature) {
            dashmap::Entry::Occupied(entry) => (self.fields[*entry.get()].clone(), false),
            dashmap::Entry::Vacant(entry) => {
                let field = Arc::new(field);
                let index = self.fields.push(field.clone());
                entry.insert(index);
                (field, true)
            }
        }
    }

    /// Look up a field by name alone (first declared match).
    #[must_use]
    pub fn field_by_name(&self, name: &str) -> Option<IrFieldRc> {
        self.fields
            .iter()
            .map(|(_, f)| f)
            .find(|f| f.name == name)
            .cloned()
    }

    /// Returns the declared fields, in registration order.
    #[must_use]
    pub fn fields(&self) -> Vec<IrFieldRc> {
        self.fields.iter().map(|(_, f)| f.clone()).collect()
    }

    /// Returns `true` if a method with the given signature is declared.
    #[must_use]
    pub fn declares_method(&self, signature: &MethodSignature) -> bool {
        self.method_index.contains_key(signature)
    }

    /// Register a method, first-wins.
    ///
    /// Returns `None` on a signature collision (the existing method stays).
    pub fn add_method(&self, method: IrMethod) -> Option<IrMethodRc> {
        let (method, created) = self.get_or_add_method(method);
        created.then_some(method)
    }

    /// Register a method, or return the already registered one.
    ///
    /// The check-then-insert is atomic per signature, which makes repeated
    /// synthesis of the same member (copy methods, empty constructors) yield
    /// exactly one declaration even under concurrent invocation. The `bool`
    /// reports whether this call created the method.
    pub fn get_or_add_method(&self, method: IrMethod) -> (IrMethodRc, bool) {
        let signature = method.signature();
        match self.method_index.entry(signature) {
            dashmap::Entry::Occupied(entry) => (self.methods[*entry.get()].clone(), false),
            dashmap::Entry::Vacant(entry) => {
                let method = Arc::new(method);
                let index = self.methods.push(method.clone());
                entry.insert(index);
                (method, true)
            }
        }
    }

    /// Look up a method by its full signature.
    #[must_use]
    pub fn method(&self, signature: &MethodSignature) -> Option<IrMethodRc> {
        self.method_index
            .get(signature)
            .map(|index| self.methods[*index].clone())
    }

    /// Look up a method by name alone (first declared match).
    #[must_use]
    pub fn method_by_name(&self, name: &str) -> Option<IrMethodRc> {
        self.methods
            .iter()
            .map(|(_, m)| m)
            .find(|m| m.name == name)
            .cloned()
    }

    /// Returns the declared methods, in registration order.
    #[must_use]
    pub fn methods(&self) -> Vec<IrMethodRc> {
        self.methods.iter().map(|(_, m)| m.clone()).collect()
    }

    /// Attach an annotation or marker tag.
    pub fn add_tag(&self, tag: Tag) {
        self.tags.push(tag);
    }

    /// Returns the attached tags, in attachment order.
    #[must_use]
    pub fn tags(&self) -> Vec<Tag> {
        self.tags.iter().map(|(_, t)| t.clone()).collect()
    }
}

impl fmt::Debug for IrClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IrClass")
            .field("id", &self.id)
            .field("fullname", &self.fullname())
            .field("kind", &self.kind())
            .field("fields", &self.fields.count())
            .field("methods", &self.methods.count())
            .finish_non_exhaustive()
    }
}
