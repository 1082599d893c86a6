//! Type interning for structural deduplication.
//!
//! This module implements the type interning engine that converts
//! `TypeData` structures into lightweight `TypeId` handles.
//!
//! Benefits:
//! - O(1) type equality (just compare TypeId values)
//! - Memory efficient (each unique structure stored once)
//! - Immutable sharing: evaluation builds new types, never mutates old ones

use crate::types::*;
use flowmap_common::{Atom, ShardedInterner};
use rustc_hash::{FxHashMap, FxHashSet, FxHasher};
use smallvec::SmallVec;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};

const SHARD_BITS: u32 = 6;
const SHARD_COUNT: usize = 1 << SHARD_BITS; // 64 shards
const SHARD_MASK: u32 = (SHARD_COUNT as u32) - 1;
const TYPE_LIST_INLINE: usize = 8;

type TypeListBuffer = SmallVec<[TypeId; TYPE_LIST_INLINE]>;

/// Read and construction access to interned types.
///
/// The evaluator only depends on this trait, so the surrounding checker can
/// put its own storage behind it.
pub trait TypeDatabase: Sync {
    fn intern(&self, data: TypeData) -> TypeId;
    fn lookup(&self, id: TypeId) -> Option<TypeData>;

    fn intern_string(&self, s: &str) -> Atom;
    fn resolve_atom(&self, atom: Atom) -> Arc<str>;

    fn type_list(&self, id: TypeListId) -> Arc<[TypeId]>;
    fn object_shape(&self, id: ObjectShapeId) -> Arc<ObjectShape>;
    fn mapped_type(&self, id: MappedTypeId) -> Arc<MappedType>;
    fn type_application(&self, id: TypeApplicationId) -> Arc<TypeApplication>;

    fn literal_string_atom(&self, value: Atom) -> TypeId;
    fn union(&self, members: Vec<TypeId>) -> TypeId;
    fn maybe(&self, inner: TypeId) -> TypeId;
    fn object(&self, properties: Vec<PropertyInfo>) -> TypeId;
    fn object_with_indexer(&self, shape: ObjectShape) -> TypeId;
    fn mapped(&self, mapped: MappedType) -> TypeId;
    fn application(&self, name: Atom, args: Vec<TypeId>) -> TypeId;
    fn alias(&self, name: Atom, args: Vec<TypeId>) -> TypeId;
}

struct TypeShard {
    key_to_index: RwLock<FxHashMap<TypeData, u32>>,
    index_to_key: RwLock<Vec<TypeData>>,
}

impl TypeShard {
    fn new() -> Self {
        TypeShard {
            key_to_index: RwLock::new(FxHashMap::default()),
            index_to_key: RwLock::new(Vec::new()),
        }
    }
}

struct SliceInterner<T> {
    items: Vec<Arc<[T]>>,
    map: FxHashMap<Arc<[T]>, u32>,
}

impl<T> SliceInterner<T>
where
    T: Eq + Hash,
{
    fn new() -> Self {
        let empty: Arc<[T]> = Arc::from(Vec::new());
        let mut map = FxHashMap::default();
        map.insert(empty.clone(), 0);
        SliceInterner {
            items: vec![empty],
            map,
        }
    }

    fn intern(&mut self, items: Vec<T>) -> u32 {
        if items.is_empty() {
            return 0;
        }

        if let Some(&id) = self.map.get(items.as_slice()) {
            return id;
        }

        let arc: Arc<[T]> = items.into();
        let id = self.items.len() as u32;
        self.items.push(arc.clone());
        self.map.insert(arc, id);
        id
    }

    fn get(&self, id: u32) -> Option<Arc<[T]>> {
        self.items.get(id as usize).cloned()
    }

    fn empty(&self) -> Arc<[T]> {
        self.items[0].clone()
    }
}

struct ValueInterner<T> {
    items: Vec<Arc<T>>,
    map: FxHashMap<Arc<T>, u32>,
}

impl<T> ValueInterner<T>
where
    T: Eq + Hash,
{
    fn new() -> Self {
        ValueInterner {
            items: Vec::new(),
            map: FxHashMap::default(),
        }
    }

    fn intern(&mut self, value: T) -> u32 {
        if let Some(&id) = self.map.get(&value) {
            return id;
        }

        let arc = Arc::new(value);
        let id = self.items.len() as u32;
        self.items.push(arc.clone());
        self.map.insert(arc, id);
        id
    }

    fn get(&self, id: u32) -> Option<Arc<T>> {
        self.items.get(id as usize).cloned()
    }
}

/// Type interning table.
/// Thread-safe via RwLock for concurrent access.
pub struct TypeInterner {
    /// Sharded storage for user-constructed types
    shards: [TypeShard; SHARD_COUNT],
    /// String interner for property names and string literals
    pub string_interner: ShardedInterner,
    type_lists: RwLock<SliceInterner<TypeId>>,
    object_shapes: RwLock<ValueInterner<ObjectShape>>,
    mapped_types: RwLock<ValueInterner<MappedType>>,
    applications: RwLock<ValueInterner<TypeApplication>>,
}

impl TypeInterner {
    /// Create a new type interner with pre-registered intrinsics
    pub fn new() -> Self {
        TypeInterner {
            shards: std::array::from_fn(|_| TypeShard::new()),
            string_interner: ShardedInterner::new(),
            type_lists: RwLock::new(SliceInterner::new()),
            object_shapes: RwLock::new(ValueInterner::new()),
            mapped_types: RwLock::new(ValueInterner::new()),
            applications: RwLock::new(ValueInterner::new()),
        }
    }

    /// Resolve an Atom back to its string value.
    pub fn resolve_atom_string(&self, atom: Atom) -> String {
        self.string_interner.resolve(atom).to_string()
    }

    fn intern_type_list(&self, members: Vec<TypeId>) -> TypeListId {
        let mut lists = self.type_lists.write().expect("type_lists lock poisoned");
        TypeListId(lists.intern(members))
    }

    fn intern_object_shape(&self, shape: ObjectShape) -> ObjectShapeId {
        let mut shapes = self.object_shapes.write().expect("object_shapes lock poisoned");
        ObjectShapeId(shapes.intern(shape))
    }

    fn intern_mapped_type(&self, mapped: MappedType) -> MappedTypeId {
        let mut types = self.mapped_types.write().expect("mapped_types lock poisoned");
        MappedTypeId(types.intern(mapped))
    }

    fn intern_application(&self, application: TypeApplication) -> TypeApplicationId {
        let mut apps = self.applications.write().expect("applications lock poisoned");
        TypeApplicationId(apps.intern(application))
    }

    /// Get the number of interned types
    pub fn len(&self) -> usize {
        let mut total = TypeId::FIRST_USER as usize;
        for shard in &self.shards {
            total += shard.index_to_key.read().expect("shard index_to_key lock poisoned").len();
        }
        total
    }

    /// Check if the interner is empty (only has intrinsics)
    pub fn is_empty(&self) -> bool {
        self.len() <= TypeId::FIRST_USER as usize
    }

    #[inline]
    fn make_id(&self, local_index: u32, shard_idx: u32) -> TypeId {
        let raw_val = (local_index << SHARD_BITS) | (shard_idx & SHARD_MASK);
        TypeId(TypeId::FIRST_USER + raw_val)
    }

    fn get_intrinsic_id(&self, data: &TypeData) -> Option<TypeId> {
        match data {
            TypeData::Intrinsic(kind) => Some(kind.to_type_id()),
            TypeData::Error => Some(TypeId::ERROR),
            _ => None,
        }
    }

    fn get_intrinsic_data(&self, id: TypeId) -> Option<TypeData> {
        if id.is_error() {
            return Some(TypeData::Error);
        }
        IntrinsicKind::from_type_id(id).map(TypeData::Intrinsic)
    }

    // =========================================================================
    // Convenience constructors
    // =========================================================================

    pub fn literal_string(&self, value: &str) -> TypeId {
        let atom = self.intern_string(value);
        self.literal_string_atom(atom)
    }

    pub fn literal_number(&self, value: f64) -> TypeId {
        self.intern(TypeData::Literal(LiteralValue::Number(OrderedFloat(value))))
    }

    pub fn literal_boolean(&self, value: bool) -> TypeId {
        self.intern(TypeData::Literal(LiteralValue::Boolean(value)))
    }

    /// Fast path for two-member unions.
    pub fn union2(&self, left: TypeId, right: TypeId) -> TypeId {
        self.union_from_iter([left, right])
    }

    pub fn type_param(&self, name: &str, bound: Option<TypeId>) -> TypeId {
        let name = self.intern_string(name);
        self.intern(TypeData::TypeParameter(TypeParamInfo { name, bound }))
    }

    pub fn keyof(&self, object: TypeId) -> TypeId {
        self.intern(TypeData::KeyOf(object))
    }

    pub fn index_access(&self, object: TypeId, index: TypeId) -> TypeId {
        self.intern(TypeData::IndexAccess(object, index))
    }

    /// Object from `(name, type)` pairs, all required and read-write.
    pub fn object_from(&self, properties: &[(&str, TypeId)]) -> TypeId {
        let properties = properties
            .iter()
            .map(|&(name, type_id)| PropertyInfo::new(self.intern_string(name), type_id))
            .collect();
        self.object(properties)
    }

    fn union_from_iter<I>(&self, members: I) -> TypeId
    where
        I: IntoIterator<Item = TypeId>,
    {
        let mut iter = members.into_iter();
        let Some(first) = iter.next() else {
            return TypeId::EMPTY;
        };
        let Some(second) = iter.next() else {
            return first;
        };

        let mut flat: TypeListBuffer = SmallVec::new();
        self.push_union_member(&mut flat, first);
        self.push_union_member(&mut flat, second);
        for member in iter {
            self.push_union_member(&mut flat, member);
        }

        self.normalize_union(flat)
    }

    fn push_union_member(&self, flat: &mut TypeListBuffer, member: TypeId) {
        if let Some(TypeData::Union(inner)) = self.lookup(member) {
            let members = self.type_list(inner);
            flat.extend(members.iter().copied());
        } else {
            flat.push(member);
        }
    }

    /// Deduplicate while keeping first-seen order. Member order is observable:
    /// distributed mapped types recombine in source order, and literal key
    /// sets are iterated in the order they were written.
    fn normalize_union(&self, flat: TypeListBuffer) -> TypeId {
        if flat.contains(&TypeId::ERROR) {
            return TypeId::ERROR;
        }

        let mut seen = FxHashSet::default();
        let mut members: TypeListBuffer = SmallVec::with_capacity(flat.len());
        for member in flat {
            if member != TypeId::EMPTY && seen.insert(member) {
                members.push(member);
            }
        }

        match members.len() {
            0 => TypeId::EMPTY,
            1 => members[0],
            _ => {
                let list = self.intern_type_list(members.into_vec());
                self.intern(TypeData::Union(list))
            }
        }
    }
}

impl TypeDatabase for TypeInterner {
    /// Intern a type and return its TypeId.
    /// If the structure already exists, returns the existing TypeId.
    fn intern(&self, data: TypeData) -> TypeId {
        if let Some(id) = self.get_intrinsic_id(&data) {
            return id;
        }

        let mut hasher = FxHasher::default();
        data.hash(&mut hasher);
        let shard_idx = (hasher.finish() as usize) & (SHARD_COUNT - 1);
        let shard = &self.shards[shard_idx];

        {
            let map = shard.key_to_index.read().expect("shard key_to_index lock poisoned");
            if let Some(&local_index) = map.get(&data) {
                return self.make_id(local_index, shard_idx as u32);
            }
        }

        let mut map = shard.key_to_index.write().expect("shard key_to_index lock poisoned");
        let mut storage = shard.index_to_key.write().expect("shard index_to_key lock poisoned");

        if let Some(&local_index) = map.get(&data) {
            return self.make_id(local_index, shard_idx as u32);
        }

        let local_index = storage.len() as u32;
        if local_index > ((u32::MAX - TypeId::FIRST_USER) >> SHARD_BITS) {
            // Return error type instead of panicking
            return TypeId::ERROR;
        }

        storage.push(data.clone());
        map.insert(data, local_index);

        self.make_id(local_index, shard_idx as u32)
    }

    /// Look up the TypeData for a given TypeId
    fn lookup(&self, id: TypeId) -> Option<TypeData> {
        if id.is_intrinsic() || id.is_error() {
            return self.get_intrinsic_data(id);
        }

        let raw_val = id.0.checked_sub(TypeId::FIRST_USER)?;
        let shard_idx = (raw_val & SHARD_MASK) as usize;
        let local_index = raw_val >> SHARD_BITS;

        let shard = self.shards.get(shard_idx)?;
        let storage = shard.index_to_key.read().expect("shard index_to_key lock poisoned");
        storage.get(local_index as usize).cloned()
    }

    fn intern_string(&self, s: &str) -> Atom {
        self.string_interner.intern(s)
    }

    fn resolve_atom(&self, atom: Atom) -> Arc<str> {
        self.string_interner.resolve(atom)
    }

    fn type_list(&self, id: TypeListId) -> Arc<[TypeId]> {
        let lists = self.type_lists.read().expect("type_lists lock poisoned");
        lists.get(id.0).unwrap_or_else(|| lists.empty())
    }

    fn object_shape(&self, id: ObjectShapeId) -> Arc<ObjectShape> {
        self.object_shapes
            .read()
            .expect("object_shapes lock poisoned")
            .get(id.0)
            .unwrap_or_default()
    }

    fn mapped_type(&self, id: MappedTypeId) -> Arc<MappedType> {
        self.mapped_types
            .read()
            .expect("mapped_types lock poisoned")
            .get(id.0)
            .unwrap_or_else(|| {
                Arc::new(MappedType {
                    type_param: TypeParamInfo {
                        name: self.intern_string("_"),
                        bound: None,
                    },
                    source: TypeId::ERROR,
                    template: TypeId::ERROR,
                    modifiers: MappedModifiers::NONE,
                })
            })
    }

    fn type_application(&self, id: TypeApplicationId) -> Arc<TypeApplication> {
        self.applications
            .read()
            .expect("applications lock poisoned")
            .get(id.0)
            .unwrap_or_else(|| {
                Arc::new(TypeApplication {
                    name: Atom::EMPTY,
                    args: Vec::new(),
                })
            })
    }

    fn literal_string_atom(&self, value: Atom) -> TypeId {
        self.intern(TypeData::Literal(LiteralValue::String(value)))
    }

    fn union(&self, members: Vec<TypeId>) -> TypeId {
        self.union_from_iter(members)
    }

    /// `?T`. Nested maybes collapse.
    fn maybe(&self, inner: TypeId) -> TypeId {
        match self.lookup(inner) {
            Some(TypeData::Maybe(_)) => inner,
            _ => self.intern(TypeData::Maybe(inner)),
        }
    }

    fn object(&self, properties: Vec<PropertyInfo>) -> TypeId {
        self.object_with_indexer(ObjectShape {
            properties,
            indexer: None,
        })
    }

    fn object_with_indexer(&self, shape: ObjectShape) -> TypeId {
        let shape_id = self.intern_object_shape(shape);
        self.intern(TypeData::Object(shape_id))
    }

    fn mapped(&self, mapped: MappedType) -> TypeId {
        let mapped_id = self.intern_mapped_type(mapped);
        self.intern(TypeData::Mapped(mapped_id))
    }

    fn application(&self, name: Atom, args: Vec<TypeId>) -> TypeId {
        let app_id = self.intern_application(TypeApplication { name, args });
        self.intern(TypeData::Application(app_id))
    }

    fn alias(&self, name: Atom, args: Vec<TypeId>) -> TypeId {
        let app_id = self.intern_application(TypeApplication { name, args });
        self.intern(TypeData::Alias(app_id))
    }
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../tests/intern_tests.rs"]
mod tests;
