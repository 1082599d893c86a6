//! Structural type representation.
//!
//! Types are interned: a [`TypeData`] value is stored once in the
//! [`TypeInterner`](crate::TypeInterner) and referred to everywhere else by a
//! copyable [`TypeId`]. Two types are structurally identical exactly when
//! their ids are equal, and unchanged sub-trees are shared for free.

use flowmap_common::Atom;
use std::hash::{Hash, Hasher};

/// Handle to an interned type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Reserved id returned when the interner runs out of capacity.
    pub const ERROR: TypeId = TypeId(0);

    pub const ANY: TypeId = TypeId(1);
    pub const MIXED: TypeId = TypeId(2);
    pub const EMPTY: TypeId = TypeId(3);
    pub const VOID: TypeId = TypeId(4);
    pub const NULL: TypeId = TypeId(5);
    pub const BOOLEAN: TypeId = TypeId(6);
    pub const NUMBER: TypeId = TypeId(7);
    pub const STRING: TypeId = TypeId(8);
    pub const SYMBOL: TypeId = TypeId(9);

    /// First id handed out for user-constructed types.
    pub const FIRST_USER: u32 = 100;

    #[inline]
    pub fn is_intrinsic(self) -> bool {
        self.0 > 0 && self.0 < Self::FIRST_USER
    }

    #[inline]
    pub fn is_error(self) -> bool {
        self == Self::ERROR
    }

    /// `null` or `void`.
    #[inline]
    pub fn is_nullish(self) -> bool {
        self == Self::NULL || self == Self::VOID
    }
}

/// Built-in types.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IntrinsicKind {
    Any,
    Mixed,
    Empty,
    Void,
    Null,
    Boolean,
    Number,
    String,
    Symbol,
}

impl IntrinsicKind {
    pub const fn to_type_id(self) -> TypeId {
        match self {
            IntrinsicKind::Any => TypeId::ANY,
            IntrinsicKind::Mixed => TypeId::MIXED,
            IntrinsicKind::Empty => TypeId::EMPTY,
            IntrinsicKind::Void => TypeId::VOID,
            IntrinsicKind::Null => TypeId::NULL,
            IntrinsicKind::Boolean => TypeId::BOOLEAN,
            IntrinsicKind::Number => TypeId::NUMBER,
            IntrinsicKind::String => TypeId::STRING,
            IntrinsicKind::Symbol => TypeId::SYMBOL,
        }
    }

    pub const fn from_type_id(id: TypeId) -> Option<IntrinsicKind> {
        Some(match id {
            TypeId::ANY => IntrinsicKind::Any,
            TypeId::MIXED => IntrinsicKind::Mixed,
            TypeId::EMPTY => IntrinsicKind::Empty,
            TypeId::VOID => IntrinsicKind::Void,
            TypeId::NULL => IntrinsicKind::Null,
            TypeId::BOOLEAN => IntrinsicKind::Boolean,
            TypeId::NUMBER => IntrinsicKind::Number,
            TypeId::STRING => IntrinsicKind::String,
            TypeId::SYMBOL => IntrinsicKind::Symbol,
            _ => return None,
        })
    }

    pub const fn name(self) -> &'static str {
        match self {
            IntrinsicKind::Any => "any",
            IntrinsicKind::Mixed => "mixed",
            IntrinsicKind::Empty => "empty",
            IntrinsicKind::Void => "void",
            IntrinsicKind::Null => "null",
            IntrinsicKind::Boolean => "boolean",
            IntrinsicKind::Number => "number",
            IntrinsicKind::String => "string",
            IntrinsicKind::Symbol => "symbol",
        }
    }
}

/// `f64` wrapper with total equality and hashing, so number literals can be
/// interned.
#[derive(Copy, Clone, Debug)]
pub struct OrderedFloat(pub f64);

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for OrderedFloat {}

impl Hash for OrderedFloat {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    String(Atom),
    Number(OrderedFloat),
    Boolean(bool),
}

/// Property variance.
///
/// `Writable` is the unannotated, read-write property; it is invariant under
/// subtyping.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Variance {
    /// `+foo`: read-only.
    Covariant,
    /// `-foo`: write-only.
    Contravariant,
    Writable,
}

impl Variance {
    /// The sigil printed in front of a property or indexer.
    pub const fn sigil(self) -> &'static str {
        match self {
            Variance::Covariant => "+",
            Variance::Contravariant => "-",
            Variance::Writable => "",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PropertyInfo {
    pub name: Atom,
    pub type_id: TypeId,
    pub variance: Variance,
    pub optional: bool,
}

impl PropertyInfo {
    /// A required, read-write property.
    pub fn new(name: Atom, type_id: TypeId) -> Self {
        PropertyInfo {
            name,
            type_id,
            variance: Variance::Writable,
            optional: false,
        }
    }

    pub fn with_variance(mut self, variance: Variance) -> Self {
        self.variance = variance;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Catch-all property slot keyed by a primitive type: `[string]: T`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IndexSignature {
    pub key_type: TypeId,
    pub value_type: TypeId,
    pub variance: Variance,
}

/// Named properties in declaration order plus at most one indexer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct ObjectShape {
    pub properties: Vec<PropertyInfo>,
    pub indexer: Option<IndexSignature>,
}

impl ObjectShape {
    pub fn property(&self, name: Atom) -> Option<&PropertyInfo> {
        self.properties.iter().find(|prop| prop.name == name)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectShapeId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeListId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MappedTypeId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeApplicationId(pub u32);

/// A type parameter reference, `O: {...}` or `K: $Keys<O>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeParamInfo {
    pub name: Atom,
    pub bound: Option<TypeId>,
}

/// `Name<args>`, used both for opaque generics and alias references.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeApplication {
    pub name: Atom,
    pub args: Vec<TypeId>,
}

/// Explicit modifiers written on a mapped type: `{+[K in S]?: T}`.
///
/// Only additions exist. A mapped type can mark every produced property
/// read-only, write-only or optional, but cannot strip those markers from a
/// homomorphic source.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct MappedModifiers {
    pub variance: Option<Variance>,
    pub optional: bool,
}

impl MappedModifiers {
    pub const NONE: MappedModifiers = MappedModifiers {
        variance: None,
        optional: false,
    };

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.variance.is_none() && !self.optional
    }
}

/// `{[type_param in source]: template}`.
///
/// The syntactic form of `source` matters: an inline `KeyOf` or a type
/// parameter bounded by `$Keys<...>` makes the mapped type distributive and,
/// over a concrete object, homomorphic.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MappedType {
    pub type_param: TypeParamInfo,
    pub source: TypeId,
    pub template: TypeId,
    pub modifiers: MappedModifiers,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    Intrinsic(IntrinsicKind),
    Literal(LiteralValue),
    Object(ObjectShapeId),
    Union(TypeListId),
    /// `?T`, i.e. `T | null | void`.
    Maybe(TypeId),
    TypeParameter(TypeParamInfo),
    /// `$Keys<O>` / `keyof O`.
    KeyOf(TypeId),
    /// `O[K]`.
    IndexAccess(TypeId, TypeId),
    Mapped(MappedTypeId),
    /// Opaque nominal generic, never expanded.
    Application(TypeApplicationId),
    /// Reference to a type alias, expanded through a `TypeResolver`.
    Alias(TypeApplicationId),
    Error,
}

/// Primitive types that can key an indexer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveKeyKind {
    String,
    Number,
    Symbol,
}

impl PrimitiveKeyKind {
    pub fn from_type_id(id: TypeId) -> Option<Self> {
        match id {
            TypeId::STRING => Some(PrimitiveKeyKind::String),
            TypeId::NUMBER => Some(PrimitiveKeyKind::Number),
            TypeId::SYMBOL => Some(PrimitiveKeyKind::Symbol),
            _ => None,
        }
    }

    pub const fn type_id(self) -> TypeId {
        match self {
            PrimitiveKeyKind::String => TypeId::STRING,
            PrimitiveKeyKind::Number => TypeId::NUMBER,
            PrimitiveKeyKind::Symbol => TypeId::SYMBOL,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveKeyKind::String => "string",
            PrimitiveKeyKind::Number => "number",
            PrimitiveKeyKind::Symbol => "symbol",
        }
    }
}

#[cfg(test)]
#[path = "../tests/types_tests.rs"]
mod tests;
