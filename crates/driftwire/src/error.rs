// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for metadata building, codec resolution and marshaling.
//!
//! Every failure maps onto one of four categories (see [`ErrorCategory`]):
//! malformed metadata, missing codec strategy, malformed wire data, or a
//! failure inside application code (constructors, setters, coercions).

use crate::types::TType;
use std::fmt;

/// Error returned by application callbacks (constructors, setters, coercions).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Structure or enum metadata is malformed.
    Metadata,
    /// No codec strategy exists for a descriptor.
    Resolution,
    /// Wire data is malformed or truncated.
    Protocol,
    /// Application code or a coercion failed.
    Construction,
}

/// Identifies one field of a structure in error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLocation {
    pub id: i16,
    pub name: String,
}

impl FieldLocation {
    pub fn new(id: i16, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl fmt::Display for FieldLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (id {})", self.name, self.id)
    }
}

/// Top-level error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error("no codec strategy for type {0}")]
    UnsupportedType(String),

    #[error("no coercion registered for {0}")]
    UnknownCoercion(&'static str),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("unknown value {value} for enum {enum_name}")]
    UnknownEnumValue { enum_name: String, value: i32 },

    #[error("required field {struct_name}.{field} has no value")]
    MissingRequiredField {
        struct_name: String,
        field: FieldLocation,
    },

    #[error("value is not a {expected}")]
    TypeMismatch { expected: &'static str },

    #[error("coercion to {type_name} failed: {source}")]
    Coercion {
        type_name: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("failed to construct {struct_name}{}: {source}", describe_field(.field))]
    Construction {
        struct_name: String,
        field: Option<FieldLocation>,
        #[source]
        source: BoxError,
    },

    #[error("codec for {0} is not resolved")]
    UnresolvedCodec(String),
}

fn describe_field(field: &Option<FieldLocation>) -> String {
    match field {
        Some(field) => format!(" at field {field}"),
        None => String::new(),
    }
}

impl Error {
    /// Classify this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Metadata(_) => ErrorCategory::Metadata,
            Self::UnsupportedType(_) | Self::UnknownCoercion(_) | Self::UnresolvedCodec(_) => {
                ErrorCategory::Resolution
            }
            Self::Protocol(_) | Self::UnknownEnumValue { .. } | Self::MissingRequiredField { .. } => {
                ErrorCategory::Protocol
            }
            Self::TypeMismatch { .. } | Self::Coercion { .. } | Self::Construction { .. } => {
                ErrorCategory::Construction
            }
        }
    }

    pub(crate) fn mismatch<T: ?Sized>() -> Self {
        Self::TypeMismatch {
            expected: std::any::type_name::<T>(),
        }
    }

    pub(crate) fn construction(
        struct_name: &str,
        field: Option<FieldLocation>,
        source: BoxError,
    ) -> Self {
        Self::Construction {
            struct_name: struct_name.to_owned(),
            field,
            source,
        }
    }
}

/// Structure or enum metadata failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetadataError {
    #[error("{struct_name}: field id {id} is negative")]
    NegativeFieldId { struct_name: String, id: i16 },

    #[error("{struct_name}: field id {id} is declared more than once")]
    DuplicateFieldId { struct_name: String, id: i16 },

    #[error("{struct_name}: field {field} has neither an extraction nor an injection point")]
    InaccessibleField {
        struct_name: String,
        field: FieldLocation,
    },

    #[error("{struct_name}: no construction strategy")]
    MissingConstructor { struct_name: String },

    #[error("{struct_name}: more than one construction strategy")]
    DuplicateConstructor { struct_name: String },

    #[error("{struct_name}: {strategy} parameter {index} refers to field id {id}, which is not injected there")]
    DanglingParameter {
        struct_name: String,
        strategy: String,
        index: usize,
        id: i16,
    },

    #[error("{struct_name}: field {field} is injected as parameter {index}, which {strategy} does not bind to it")]
    UnboundParameter {
        struct_name: String,
        field: FieldLocation,
        index: usize,
        strategy: String,
    },

    #[error("{struct_name}: builder method {method} returns {found}, expected {expected}")]
    BuilderResultMismatch {
        struct_name: String,
        method: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{struct_name}: field {field} uses a builder method but no builder is declared")]
    BuilderMethodWithoutBuilder {
        struct_name: String,
        field: FieldLocation,
    },

    #[error("{struct_name}: {point} operates on {found}, expected {expected}")]
    TargetMismatch {
        struct_name: String,
        point: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{struct_name}: {point} on field {field} handles {found}, field values are {expected}")]
    ValueTypeMismatch {
        struct_name: String,
        field: FieldLocation,
        point: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{struct_name}: coercion on field {field} converts from {expected}, field is {found}")]
    CoercionMismatch {
        struct_name: String,
        field: FieldLocation,
        expected: String,
        found: String,
    },

    #[error("{struct_name}: field {field} feeds {uses} injections but {type_name} values cannot be cloned")]
    UncloneableField {
        struct_name: String,
        field: FieldLocation,
        uses: usize,
        type_name: String,
    },

    #[error("{struct_name}: method {method} refers to unknown field id {id}")]
    UnknownMethodParameter {
        struct_name: String,
        method: String,
        id: i16,
    },

    #[error("enum {enum_name}: value {value} is declared more than once")]
    DuplicateEnumValue { enum_name: String, value: i32 },

    #[error("{container}: element type {found} does not match {expected}")]
    ElementTypeMismatch {
        container: &'static str,
        expected: &'static str,
        found: String,
    },

    #[error("coercion for {app_type} converts from {expected}, wire type is {found}")]
    CoercionWireMismatch {
        app_type: &'static str,
        expected: &'static str,
        found: String,
    },
}

/// Wire data could not be read or written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("unexpected end of input: need {need} bytes, have {have}")]
    UnexpectedEof { need: usize, have: usize },

    #[error("invalid wire type {0}")]
    InvalidType(u8),

    #[error("expected wire type {expected}, found {found}")]
    UnexpectedType { expected: TType, found: TType },

    #[error("negative size {0}")]
    NegativeSize(i32),

    #[error("size {size} exceeds limit {limit}")]
    SizeLimit { size: usize, limit: usize },

    #[error("nesting depth limit {0} exceeded")]
    DepthLimit(usize),

    #[error("invalid UTF-8 in string")]
    InvalidUtf8,
}

/// Failure to take a staged value out of [`FieldValues`](crate::metadata::FieldValues).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldValueError {
    #[error("no value for field id {0}")]
    Missing(i16),

    #[error("value for field id {id} is not a {expected}")]
    WrongType { id: i16, expected: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        let err = Error::from(ProtocolError::InvalidUtf8);
        assert_eq!(err.category(), ErrorCategory::Protocol);

        let err = Error::from(MetadataError::MissingConstructor {
            struct_name: "Point".into(),
        });
        assert_eq!(err.category(), ErrorCategory::Metadata);

        assert_eq!(
            Error::UnsupportedType("opaque".into()).category(),
            ErrorCategory::Resolution
        );
        assert_eq!(Error::mismatch::<i32>().category(), ErrorCategory::Construction);
    }

    #[test]
    fn test_construction_message_carries_field() {
        let err = Error::construction(
            "Account",
            Some(FieldLocation::new(3, "balance")),
            "negative balance".into(),
        );
        assert_eq!(
            err.to_string(),
            "failed to construct Account at field balance (id 3): negative balance"
        );

        let err = Error::construction("Account", None, "boom".into());
        assert_eq!(err.to_string(), "failed to construct Account: boom");
    }
}
