//! Custom attribute to annotation conversion.
//!
//! Every attribute on a descriptor becomes an [`AnnotationTag`] carrying the
//! attribute type name and the converted argument elements, fixed arguments
//! first. Conversion of an attribute is all-or-nothing: a single argument the
//! deserializer could not interpret drops the whole attribute and records a
//! [`Diagnostic`], and lowering of the class continues. A dropped attribute
//! leaves no trace on the class, well-known tags included.
//!
//! Two well-known attribute identities produce dedicated tags alongside their
//! annotation, so consumers need not string-match annotation type names: the
//! foreign obsolete attribute maps to [`Tag::Deprecated`], and the decimal
//! constant attribute maps to [`Tag::DecimalConstant`].

use crate::descriptor::{AttributeArgument, AttributeDescriptor, AttributeValue, TypeDescriptor};
use crate::ir::{
    AnnotationElement, AnnotationTag, ElementValue, IrClassRc, Tag, DECIMAL_CONSTANT_ATTRIBUTE,
    OBSOLETE_ATTRIBUTE,
};
use crate::lowering::{Dependencies, Diagnostic};

/// Lower all attributes of a descriptor onto the class.
///
/// Attribute type names are recorded as signature dependencies whether or not
/// the conversion succeeds; the reference exists either way.
pub(crate) fn lower_attributes(
    descriptor: &TypeDescriptor,
    class: &IrClassRc,
    dependencies: &mut Dependencies,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for attribute in &descriptor.attributes {
        dependencies
            .signatures
            .insert(attribute.attribute_type.clone());
        match convert_attribute(attribute) {
            Ok(tag) => {
                // Well-known tags only exist for attributes that converted.
                if let Some(marker) = well_known_tag(&tag) {
                    class.add_tag(marker);
                }
                class.add_tag(Tag::Annotation(tag));
            }
            Err(message) => diagnostics.push(Diagnostic {
                class: class.fullname(),
                attribute: attribute.attribute_type.clone(),
                message,
            }),
        }
    }
}

/// The dedicated tag a well-known attribute identity maps to, if any.
fn well_known_tag(tag: &AnnotationTag) -> Option<Tag> {
    match tag.type_name.as_str() {
        OBSOLETE_ATTRIBUTE => Some(Tag::Deprecated),
        DECIMAL_CONSTANT_ATTRIBUTE => tag.elements.iter().find_map(|element| match &element.value {
            ElementValue::Decimal(value) => Some(Tag::DecimalConstant(value.clone())),
            _ => None,
        }),
        _ => None,
    }
}

fn convert_attribute(attribute: &AttributeDescriptor) -> Result<AnnotationTag, String> {
    let mut elements =
        Vec::with_capacity(attribute.fixed_arguments.len() + attribute.named_arguments.len());
    for argument in attribute
        .fixed_arguments
        .iter()
        .chain(&attribute.named_arguments)
    {
        elements.push(convert_argument(argument)?);
    }
    Ok(AnnotationTag::new(&attribute.attribute_type, elements))
}

fn convert_argument(argument: &AttributeArgument) -> Result<AnnotationElement, String> {
    let value = convert_value(&argument.value).map_err(|err| match &argument.name {
        Some(name) => format!("argument '{name}': {err}"),
        None => format!("fixed argument of type {0}: {err}", argument.type_name),
    })?;
    Ok(AnnotationElement {
        name: argument.name.clone(),
        value,
    })
}

fn convert_value(value: &AttributeValue) -> Result<ElementValue, String> {
    Ok(match value {
        AttributeValue::Null => ElementValue::Null,
        AttributeValue::Boolean(v) => ElementValue::Boolean(*v),
        AttributeValue::Char(v) => ElementValue::Char(*v),
        AttributeValue::I4(v) => ElementValue::I4(*v),
        AttributeValue::I8(v) => ElementValue::I8(*v),
        AttributeValue::R4(v) => ElementValue::R4(*v),
        AttributeValue::R8(v) => ElementValue::R8(*v),
        AttributeValue::String(v) => ElementValue::String(v.clone()),
        AttributeValue::Type(v) => ElementValue::Type(v.clone()),
        AttributeValue::Enum(ty, v) => ElementValue::Enum(ty.clone(), *v),
        AttributeValue::Decimal(v) => ElementValue::Decimal(v.clone()),
        AttributeValue::Array(values) => ElementValue::Array(
            values
                .iter()
                .map(convert_value)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        AttributeValue::Unparsed(bytes) => {
            return Err(format!("{0} unparsed bytes", bytes.len()));
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeKind;
    use crate::registry::IrRegistry;

    fn descriptor_with(attributes: Vec<AttributeDescriptor>) -> TypeDescriptor {
        TypeDescriptor {
            namespace: "Test".to_string(),
            name: "Annotated".to_string(),
            attributes,
            ..TypeDescriptor::default()
        }
    }

    fn fixed(type_name: &str, value: AttributeValue) -> AttributeArgument {
        AttributeArgument {
            name: None,
            type_name: type_name.to_string(),
            value,
        }
    }

    fn lower(
        descriptor: &TypeDescriptor,
    ) -> (IrClassRc, Dependencies, Vec<Diagnostic>) {
        let registry = IrRegistry::new();
        let class = registry
            .class_ref(&descriptor.fullname(), TypeKind::Class)
            .unwrap();
        let mut dependencies = Dependencies::default();
        let mut diagnostics = Vec::new();
        lower_attributes(descriptor, &class, &mut dependencies, &mut diagnostics);
        (class, dependencies, diagnostics)
    }

    #[test]
    fn test_annotation_conversion() {
        let descriptor = descriptor_with(vec![AttributeDescriptor {
            attribute_type: "Test.MarkerAttribute".to_string(),
            fixed_arguments: vec![fixed("System.String", AttributeValue::String("x".into()))],
            named_arguments: vec![AttributeArgument {
                name: Some("Level".to_string()),
                type_name: "System.Int32".to_string(),
                value: AttributeValue::I4(3),
            }],
        }]);

        let (class, dependencies, diagnostics) = lower(&descriptor);
        assert!(diagnostics.is_empty());
        assert!(dependencies.signatures.contains("Test.MarkerAttribute"));

        let tags = class.tags();
        assert_eq!(tags.len(), 1);
        let Tag::Annotation(tag) = &tags[0] else {
            panic!("expected annotation tag");
        };
        assert_eq!(tag.type_name, "Test.MarkerAttribute");
        assert_eq!(tag.elements.len(), 2);
        assert_eq!(tag.elements[0].name, None);
        assert_eq!(tag.elements[0].value, ElementValue::String("x".to_string()));
        assert_eq!(tag.elements[1].name.as_deref(), Some("Level"));
        assert_eq!(tag.elements[1].value, ElementValue::I4(3));
    }

    #[test]
    fn test_obsolete_adds_marker_and_annotation() {
        let descriptor = descriptor_with(vec![AttributeDescriptor {
            attribute_type: OBSOLETE_ATTRIBUTE.to_string(),
            fixed_arguments: vec![fixed(
                "System.String",
                AttributeValue::String("use Y".into()),
            )],
            named_arguments: vec![],
        }]);

        let (class, _, diagnostics) = lower(&descriptor);
        assert!(diagnostics.is_empty());
        let tags = class.tags();
        assert_eq!(tags.len(), 2);
        assert!(tags.iter().any(|t| matches!(t, Tag::Deprecated)));
        assert!(tags
            .iter()
            .any(|t| matches!(t, Tag::Annotation(a) if a.type_name == OBSOLETE_ATTRIBUTE)));
    }

    #[test]
    fn test_obsolete_with_broken_argument_leaves_no_marker() {
        // A failed conversion skips the attribute entirely, marker included.
        let descriptor = descriptor_with(vec![AttributeDescriptor {
            attribute_type: OBSOLETE_ATTRIBUTE.to_string(),
            fixed_arguments: vec![fixed(
                "System.Object",
                AttributeValue::Unparsed(vec![0x01]),
            )],
            named_arguments: vec![],
        }]);

        let (class, _, diagnostics) = lower(&descriptor);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, OBSOLETE_ATTRIBUTE);
        assert!(class.tags().is_empty());
    }

    #[test]
    fn test_decimal_constant_attribute_adds_tag() {
        let descriptor = descriptor_with(vec![AttributeDescriptor {
            attribute_type: DECIMAL_CONSTANT_ATTRIBUTE.to_string(),
            fixed_arguments: vec![fixed(
                "System.Decimal",
                AttributeValue::Decimal("79228162514264337593543950335".to_string()),
            )],
            named_arguments: vec![],
        }]);

        let (class, _, diagnostics) = lower(&descriptor);
        assert!(diagnostics.is_empty());
        let tags = class.tags();
        assert_eq!(tags.len(), 2);
        assert!(tags.iter().any(|t| matches!(
            t,
            Tag::DecimalConstant(v) if v == "79228162514264337593543950335"
        )));
        assert!(tags.iter().any(|t| matches!(
            t,
            Tag::Annotation(a)
                if a.elements[0].value
                    == ElementValue::Decimal("79228162514264337593543950335".to_string())
        )));
    }

    #[test]
    fn test_unconvertible_argument_drops_attribute_only() {
        let descriptor = descriptor_with(vec![
            AttributeDescriptor {
                attribute_type: "Test.BrokenAttribute".to_string(),
                fixed_arguments: vec![fixed(
                    "System.Object",
                    AttributeValue::Unparsed(vec![0xde, 0xad]),
                )],
                named_arguments: vec![],
            },
            AttributeDescriptor {
                attribute_type: "Test.FineAttribute".to_string(),
                fixed_arguments: vec![fixed("System.Boolean", AttributeValue::Boolean(true))],
                named_arguments: vec![],
            },
        ]);

        let (class, dependencies, diagnostics) = lower(&descriptor);

        // The broken attribute is dropped; the healthy one still lands.
        let tags = class.tags();
        assert_eq!(tags.len(), 1);
        assert!(matches!(
            &tags[0],
            Tag::Annotation(a) if a.type_name == "Test.FineAttribute"
        ));

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, "Test.BrokenAttribute");
        assert_eq!(diagnostics[0].class, "Test.Annotated");

        // Both attribute types are referenced regardless of conversion.
        assert!(dependencies.signatures.contains("Test.BrokenAttribute"));
        assert!(dependencies.signatures.contains("Test.FineAttribute"));
    }

    #[test]
    fn test_nested_array_failure_propagates() {
        let descriptor = descriptor_with(vec![AttributeDescriptor {
            attribute_type: "Test.ArrayAttribute".to_string(),
            fixed_arguments: vec![fixed(
                "System.Object[]",
                AttributeValue::Array(vec![
                    AttributeValue::I4(1),
                    AttributeValue::Unparsed(vec![0xff]),
                ]),
            )],
            named_arguments: vec![],
        }]);

        let (class, _, diagnostics) = lower(&descriptor);
        assert!(class.tags().is_empty());
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("unparsed"));
    }
}
