//! Classification of declared field types.
//!
//! A [`TypeDescriptor`] only says what was written. [`FieldType`] says what it
//! means for persistence once the entity and enum names of the unit are known.

use std::fmt;

use indexmap::IndexSet;

use modelcheck_core::{declaration::TypeDescriptor, error::ErrorCode, identifier::Id};

/// Column types the persistence layer can store directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    Int,
    Float,
    Decimal,
    String,
    Boolean,
    /// `byte[]`, stored as a binary column.
    Bytes,
    Date,
    TimeOfDay,
    Utc,
    Civil,
}

impl Scalar {
    fn from_name(name: &str) -> Option<Self> {
        let scalar = match name {
            "int" => Self::Int,
            "float" => Self::Float,
            "decimal" => Self::Decimal,
            "string" => Self::String,
            "boolean" => Self::Boolean,
            _ => return None,
        };
        Some(scalar)
    }

    fn from_qualified(module: &str, name: &str) -> Option<Self> {
        if module != "time" {
            return None;
        }
        let scalar = match name {
            "Date" => Self::Date,
            "TimeOfDay" => Self::TimeOfDay,
            "Utc" => Self::Utc,
            "Civil" => Self::Civil,
            _ => return None,
        };
        Some(scalar)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Decimal => "decimal",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Bytes => "byte[]",
            Self::Date => "time:Date",
            Self::TimeOfDay => "time:TimeOfDay",
            Self::Utc => "time:Utc",
            Self::Civil => "time:Civil",
        };
        f.write_str(text)
    }
}

/// Why a field type cannot be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsupportedType {
    /// The whole type is unsupported (`json`, unions, unknown names, ...).
    Type(TypeDescriptor),
    /// An array of a scalar or enum element.
    ArrayElement(TypeDescriptor),
    /// An array whose element is not a single named type.
    Array,
}

impl UnsupportedType {
    /// The check reported for this reason.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Type(_) => ErrorCode::UnsupportedType,
            Self::ArrayElement(_) => ErrorCode::UnsupportedArrayElement,
            Self::Array => ErrorCode::UnsupportedArray,
        }
    }

    /// The type named in the diagnostic message, if any.
    pub fn named_type(&self) -> Option<&TypeDescriptor> {
        match self {
            Self::Type(ty) | Self::ArrayElement(ty) => Some(ty),
            Self::Array => None,
        }
    }
}

/// A classified field type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Scalar(Scalar),
    EnumRef(Id),
    /// Only ever an array of [`FieldType::EntityRef`]; other arrays are unsupported.
    ArrayOf(Box<FieldType>),
    /// A nillable scalar, enum or entity reference.
    Optional(Box<FieldType>),
    EntityRef(Id),
    Unsupported(UnsupportedType),
}

/// The association a field declares, if its type refers to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Association {
    /// The referenced entity.
    pub target: Id,
    /// `Entity[]`
    pub many: bool,
    /// `Entity?`
    pub nillable: bool,
}

impl FieldType {
    /// The association this type declares.
    pub fn association(&self) -> Option<Association> {
        match self {
            Self::EntityRef(target) => Some(Association {
                target: *target,
                many: false,
                nillable: false,
            }),
            Self::ArrayOf(element) => match element.as_ref() {
                Self::EntityRef(target) => Some(Association {
                    target: *target,
                    many: true,
                    nillable: false,
                }),
                _ => None,
            },
            Self::Optional(inner) => match inner.as_ref() {
                Self::EntityRef(target) => Some(Association {
                    target: *target,
                    many: false,
                    nillable: true,
                }),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }
}

/// Entity and enum names a field type may refer to.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TypeScope<'a> {
    entities: &'a IndexSet<Id>,
    enums: &'a IndexSet<Id>,
}

impl<'a> TypeScope<'a> {
    pub(crate) fn new(entities: &'a IndexSet<Id>, enums: &'a IndexSet<Id>) -> Self {
        Self { entities, enums }
    }

    fn resolve_name(&self, name: Id) -> Option<FieldType> {
        if self.entities.contains(&name) {
            Some(FieldType::EntityRef(name))
        } else if self.enums.contains(&name) {
            Some(FieldType::EnumRef(name))
        } else {
            Scalar::from_name(&name.to_name()).map(FieldType::Scalar)
        }
    }

    /// Classify `ty` against the names in scope.
    pub(crate) fn classify(&self, ty: &TypeDescriptor) -> FieldType {
        match ty {
            TypeDescriptor::Named(name) => self
                .resolve_name(*name)
                .unwrap_or_else(|| unsupported(ty)),
            TypeDescriptor::Qualified { module, name } => {
                Scalar::from_qualified(&module.to_name(), &name.to_name())
                    .map_or_else(|| unsupported(ty), FieldType::Scalar)
            }
            TypeDescriptor::Array(element) => self.classify_array(ty, element),
            TypeDescriptor::Optional(inner) => match self.classify(inner) {
                inner @ (FieldType::Scalar(_) | FieldType::EnumRef(_) | FieldType::EntityRef(_)) => {
                    FieldType::Optional(Box::new(inner))
                }
                FieldType::Unsupported(reason) => FieldType::Unsupported(reason),
                FieldType::ArrayOf(_) | FieldType::Optional(_) => unsupported(ty),
            },
            TypeDescriptor::Union(_) | TypeDescriptor::AnonymousRecord => unsupported(ty),
        }
    }

    fn classify_array(&self, ty: &TypeDescriptor, element: &TypeDescriptor) -> FieldType {
        match element {
            TypeDescriptor::Named(name) if *name == "byte" => FieldType::Scalar(Scalar::Bytes),
            TypeDescriptor::Named(_) | TypeDescriptor::Qualified { .. } => {
                match self.classify(element) {
                    FieldType::EntityRef(target) => {
                        FieldType::ArrayOf(Box::new(FieldType::EntityRef(target)))
                    }
                    FieldType::Scalar(_) | FieldType::EnumRef(_) => {
                        FieldType::Unsupported(UnsupportedType::ArrayElement(element.clone()))
                    }
                    _ => unsupported(ty),
                }
            }
            _ => FieldType::Unsupported(UnsupportedType::Array),
        }
    }
}

fn unsupported(ty: &TypeDescriptor) -> FieldType {
    FieldType::Unsupported(UnsupportedType::Type(ty.clone()))
}
