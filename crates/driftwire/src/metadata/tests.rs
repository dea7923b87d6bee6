// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::*;
use crate::error::{Error, FieldValueError, MetadataError};
use crate::TypeCoercion;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Default)]
struct Point {
    x: i32,
    y: i32,
}

fn px(point: &Point) -> &i32 {
    &point.x
}

fn py(point: &Point) -> &i32 {
    &point.y
}

fn point_constructor() -> ConstructorInjection {
    ConstructorInjection::new("new", &[1, 2], |values| {
        Ok(Point {
            x: values.take(1)?,
            y: values.take(2)?,
        })
    })
}

fn x_field(catalog: &ThriftCatalog) -> FieldBuilder {
    FieldMetadata::builder(1, "x", catalog.i32_type()).extraction(ExtractionPoint::field("x", px))
}

fn y_field(catalog: &ThriftCatalog) -> FieldBuilder {
    FieldMetadata::builder(2, "y", catalog.i32_type()).extraction(ExtractionPoint::field("y", py))
}

impl ThriftStruct for Point {
    fn struct_metadata(catalog: &ThriftCatalog) -> crate::Result<StructMetadata> {
        Ok(StructMetadata::builder::<Point>("Point")
            .field(y_field(catalog).injection(InjectionPoint::parameter(1)).build())
            .field(x_field(catalog).injection(InjectionPoint::parameter(0)).build())
            .constructor(point_constructor())
            .build()?)
    }
}

#[derive(Default)]
struct PointBuilder {
    x: i32,
    y: i32,
}

fn build_err(result: std::result::Result<StructMetadata, MetadataError>) -> MetadataError {
    match result {
        Ok(metadata) => panic!("expected a metadata error, built {metadata:?}"),
        Err(err) => err,
    }
}

#[test]
fn test_fields_sorted_and_indexed() {
    let catalog = ThriftCatalog::new();
    let metadata = catalog.metadata_of::<Point>().unwrap();
    let ids: Vec<i16> = metadata.fields().iter().map(FieldMetadata::id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(metadata.field_index(2), Some(1));
    assert_eq!(metadata.field(1).map(FieldMetadata::name), Some("x"));
    assert!(metadata.field(3).is_none());
    assert_eq!(metadata.uses(0), 1);
    assert_eq!(metadata.strategy().constructor().params(), &[1, 2]);
    assert!(metadata.target().is::<Point>());
}

#[test]
fn test_field_predicates() {
    let catalog = ThriftCatalog::new();
    let read_only = x_field(&catalog).build();
    assert!(read_only.is_readable());
    assert!(read_only.is_read_only());
    assert!(!read_only.is_writable());
    assert_eq!(read_only.requiredness(), Requiredness::Default);

    let write_only = FieldMetadata::builder(3, "z", catalog.i32_type())
        .injection(InjectionPoint::parameter(0))
        .required()
        .build();
    assert!(write_only.is_write_only());
    assert!(write_only.is_writable());
    assert_eq!(write_only.requiredness(), Requiredness::Required);
    assert_eq!(write_only.location().to_string(), "z (id 3)");
}

#[test]
fn test_negative_and_duplicate_ids() {
    let catalog = ThriftCatalog::new();
    let err = build_err(
        StructMetadata::builder::<Point>("Point")
            .field(FieldMetadata::builder(-1, "x", catalog.i32_type()).extraction(ExtractionPoint::field("x", px)).build())
            .constructor(ConstructorInjection::new("new", &[], |_| Ok(Point::default())))
            .build(),
    );
    assert!(matches!(err, MetadataError::NegativeFieldId { id: -1, .. }));

    let err = build_err(
        StructMetadata::builder::<Point>("Point")
            .field(x_field(&catalog).build())
            .field(FieldMetadata::builder(1, "y", catalog.i32_type()).extraction(ExtractionPoint::field("y", py)).build())
            .constructor(ConstructorInjection::new("new", &[], |_| Ok(Point::default())))
            .build(),
    );
    assert!(matches!(err, MetadataError::DuplicateFieldId { id: 1, .. }));
}

#[test]
fn test_strategy_count() {
    let catalog = ThriftCatalog::new();
    let err = build_err(
        StructMetadata::builder::<Point>("Point")
            .field(x_field(&catalog).build())
            .build(),
    );
    assert!(matches!(err, MetadataError::MissingConstructor { .. }));

    let err = build_err(
        StructMetadata::builder::<Point>("Point")
            .constructor(ConstructorInjection::new("a", &[], |_| Ok(Point::default())))
            .constructor(ConstructorInjection::new("b", &[], |_| Ok(Point::default())))
            .build(),
    );
    assert!(matches!(err, MetadataError::DuplicateConstructor { .. }));
}

#[test]
fn test_constructor_must_build_target() {
    let err = build_err(
        StructMetadata::builder::<Point>("Point")
            .constructor(ConstructorInjection::new("new", &[], |_| Ok(PointBuilder::default())))
            .build(),
    );
    assert!(matches!(err, MetadataError::TargetMismatch { .. }));
}

#[test]
fn test_parameters_cross_checked() {
    let catalog = ThriftCatalog::new();
    // Constructor names field 2, but no field binds position 1.
    let err = build_err(
        StructMetadata::builder::<Point>("Point")
            .field(x_field(&catalog).injection(InjectionPoint::parameter(0)).build())
            .field(y_field(&catalog).build())
            .constructor(point_constructor())
            .build(),
    );
    assert!(matches!(
        err,
        MetadataError::DanglingParameter { index: 1, id: 2, .. }
    ));

    // Field claims a position the constructor does not have.
    let err = build_err(
        StructMetadata::builder::<Point>("Point")
            .field(x_field(&catalog).injection(InjectionPoint::parameter(0)).build())
            .field(y_field(&catalog).injection(InjectionPoint::parameter(2)).build())
            .constructor(point_constructor())
            .build(),
    );
    assert!(matches!(err, MetadataError::UnboundParameter { index: 2, .. }));
}

#[test]
fn test_extraction_types_checked() {
    let catalog = ThriftCatalog::new();
    fn wrong(point: &Point) -> &i32 {
        &point.x
    }
    let err = build_err(
        StructMetadata::builder::<Point>("Point")
            .field(
                FieldMetadata::builder(1, "x", catalog.i64_type())
                    .extraction(ExtractionPoint::field("x", wrong))
                    .build(),
            )
            .constructor(ConstructorInjection::new("new", &[], |_| Ok(Point::default())))
            .build(),
    );
    assert!(matches!(err, MetadataError::ValueTypeMismatch { .. }));

    fn other(builder: &PointBuilder) -> &i32 {
        &builder.x
    }
    let err = build_err(
        StructMetadata::builder::<Point>("Point")
            .field(
                FieldMetadata::builder(1, "x", catalog.i32_type())
                    .extraction(ExtractionPoint::field("x", other))
                    .build(),
            )
            .constructor(ConstructorInjection::new("new", &[], |_| Ok(Point::default())))
            .build(),
    );
    assert!(matches!(err, MetadataError::TargetMismatch { .. }));
}

#[test]
fn test_inaccessible_field() {
    let catalog = ThriftCatalog::new();
    let err = build_err(
        StructMetadata::builder::<Point>("Point")
            .field(FieldMetadata::builder(1, "x", catalog.i32_type()).build())
            .constructor(ConstructorInjection::new("new", &[], |_| Ok(Point::default())))
            .build(),
    );
    assert!(matches!(err, MetadataError::InaccessibleField { .. }));
}

#[test]
fn test_setter_injection_and_uses() {
    let catalog = ThriftCatalog::new();
    let metadata = StructMetadata::builder::<Point>("Point")
        .field(
            x_field(&catalog)
                .injection(InjectionPoint::parameter(0))
                .injection(InjectionPoint::setter("set_y", |point: &mut Point, x: i32| {
                    point.y = x;
                    Ok(())
                }))
                .build(),
        )
        .constructor(ConstructorInjection::new("new", &[1], |values| {
            Ok(Point {
                x: values.take(1)?,
                y: 0,
            })
        }))
        .build()
        .unwrap();
    assert_eq!(metadata.uses(0), 2);
    let kinds: Vec<InjectionKind> = metadata.fields()[0]
        .injections()
        .iter()
        .map(InjectionPoint::kind)
        .collect();
    assert_eq!(kinds, vec![InjectionKind::Parameter, InjectionKind::Setter]);
}

#[test]
fn test_struct_value_used_twice_is_rejected() {
    struct Holder {
        inner: Point,
        copy: Point,
    }
    fn inner(holder: &Holder) -> &Point {
        &holder.inner
    }
    let catalog = ThriftCatalog::new();
    let err = build_err(
        StructMetadata::builder::<Holder>("Holder")
            .field(
                FieldMetadata::builder(1, "inner", catalog.struct_type::<Point>())
                    .extraction(ExtractionPoint::field("inner", inner))
                    .injection(InjectionPoint::parameter(0))
                    .injection(InjectionPoint::field("copy", |holder: &mut Holder, value: Point| {
                        holder.copy = value;
                    }))
                    .build(),
            )
            .constructor(ConstructorInjection::new("new", &[1], |values| {
                let inner: Point = values.take(1)?;
                Ok(Holder {
                    copy: inner.clone(),
                    inner,
                })
            }))
            .build(),
    );
    assert!(matches!(err, MetadataError::UncloneableField { uses: 2, .. }));
}

#[test]
fn test_builder_strategy() {
    let catalog = ThriftCatalog::new();
    let constructor = ConstructorInjection::new("PointBuilder::new", &[], |_| Ok(PointBuilder::default()));
    let metadata = StructMetadata::builder::<Point>("Point")
        .field(
            x_field(&catalog)
                .injection(InjectionPoint::builder_method("x", |mut b: PointBuilder, x: i32| {
                    b.x = x;
                    Ok(b)
                }))
                .build(),
        )
        .builder(BuilderInjection::new(constructor, "build", |b: PointBuilder| {
            Ok(Point { x: b.x, y: b.y })
        }))
        .build()
        .unwrap();
    let strategy = metadata.strategy();
    assert!(strategy.builder().is_some());
    assert!(strategy.instance_type().is::<PointBuilder>());
    assert_eq!(strategy.builder().map(BuilderInjection::build_method), Some("build"));
}

#[test]
fn test_builder_result_and_methods_checked() {
    let catalog = ThriftCatalog::new();
    let err = build_err(
        StructMetadata::builder::<Point>("Point")
            .builder(BuilderInjection::new(
                ConstructorInjection::new("new", &[], |_| Ok(PointBuilder::default())),
                "build",
                |b: PointBuilder| Ok(b.x),
            ))
            .build(),
    );
    assert!(matches!(err, MetadataError::BuilderResultMismatch { .. }));

    let err = build_err(
        StructMetadata::builder::<Point>("Point")
            .field(
                x_field(&catalog)
                    .injection(InjectionPoint::builder_method("x", |b: PointBuilder, _x: i32| Ok(b)))
                    .build(),
            )
            .constructor(ConstructorInjection::new("new", &[], |_| Ok(Point::default())))
            .build(),
    );
    assert!(matches!(err, MetadataError::BuilderMethodWithoutBuilder { .. }));

    let err = build_err(
        StructMetadata::builder::<Point>("Point")
            .field(x_field(&catalog).build())
            .constructor(ConstructorInjection::new("new", &[], |_| Ok(Point::default())))
            .method(MethodInjection::new("place", &[1, 9], |_p: &mut Point, _values| Ok(())))
            .build(),
    );
    assert!(matches!(err, MetadataError::UnknownMethodParameter { id: 9, .. }));
}

#[test]
fn test_field_coercion_must_match_descriptor() {
    let catalog = ThriftCatalog::new();
    let coercion = Arc::new(
        TypeCoercion::infallible::<u32, i64>(catalog.i64_type(), |w| w as u32, |a| i64::from(*a)).unwrap(),
    );
    fn get(point: &Point) -> &i32 {
        &point.x
    }
    let err = build_err(
        StructMetadata::builder::<Point>("Point")
            .field(
                FieldMetadata::builder(1, "x", catalog.i32_type())
                    .coercion(coercion)
                    .extraction(ExtractionPoint::field("x", get))
                    .build(),
            )
            .constructor(ConstructorInjection::new("new", &[], |_| Ok(Point::default())))
            .build(),
    );
    assert!(matches!(err, MetadataError::CoercionMismatch { .. }));
}

#[test]
fn test_field_values() {
    let mut values = FieldValues::new();
    values.insert(1, Box::new(5i32));
    values.insert(2, Box::new(String::from("s")));
    assert_eq!(values.len(), 2);
    assert!(values.contains(1));

    assert!(matches!(
        values.take::<i64>(1),
        Err(FieldValueError::WrongType { id: 1, .. })
    ));
    assert!(!values.contains(1));
    assert!(matches!(values.take::<i32>(1), Err(FieldValueError::Missing(1))));
    assert_eq!(values.take_optional::<i32>(3).unwrap(), None);
    assert_eq!(values.take_or_default::<i32>(4).unwrap(), 0);
    assert_eq!(values.take::<String>(2).unwrap(), "s");
    assert!(values.is_empty());
}

#[test]
fn test_metadata_errors_convert() {
    let err: Error = MetadataError::MissingConstructor {
        struct_name: "Point".into(),
    }
    .into();
    assert_eq!(err.category(), crate::ErrorCategory::Metadata);
}
