//! Tests for mapped type evaluation over a single key source.

use crate::evaluate_rules::key_source::classify_keys;
use crate::test_utils::{format, init_test_tracing, literal_union, mapped, prop};
use crate::*;

fn with_modifiers(base: MappedType, variance: Option<Variance>, optional: bool) -> MappedType {
    MappedType {
        modifiers: MappedModifiers { variance, optional },
        ..base
    }
}

/// `{[key in Keys]: template}` with `Keys` bound to `keys`.
fn evaluate_with_keys(
    db: &TypeInterner,
    keys: TypeId,
    template: TypeId,
) -> Result<TypeId, MappedTypeError> {
    let m = mapped(db, "key", db.type_param("Keys", None), template);
    let subst = TypeSubstitution::single(db.intern_string("Keys"), keys);
    TypeEvaluator::new(db).evaluate_mapped_type(&m, &subst)
}

fn constant(value: TypeId) -> impl FnMut(TypeId) -> Result<TypeId, MappedTypeError> {
    move |_| Ok(value)
}

// =============================================================================
// Key sources
// =============================================================================

#[test]
fn test_keyof_with_builder_application() {
    init_test_tracing();
    let interner = TypeInterner::new();
    let o = interner.type_param("O", None);
    let key = interner.type_param("key", None);
    let builder = interner.application(
        interner.intern_string("Builder"),
        vec![interner.index_access(o, key)],
    );
    let m = mapped(&interner, "key", interner.keyof(o), builder);
    let obj = interner.object_from(&[("foo", TypeId::NUMBER), ("bar", TypeId::STRING)]);

    let mut evaluator = TypeEvaluator::new(&interner);
    let result = evaluator
        .evaluate_mapped_type(&m, &TypeSubstitution::single(interner.intern_string("O"), obj))
        .unwrap();
    assert_eq!(
        format(&interner, result),
        "{foo: Builder<number>, bar: Builder<string>}"
    );
}

#[test]
fn test_literal_union_collapses_into_one_object() {
    let interner = TypeInterner::new();
    let keys = literal_union(&interner, &["foo", "bar"]);
    let result = evaluate_with_keys(&interner, keys, TypeId::NUMBER).unwrap();
    assert_eq!(
        result,
        interner.object_from(&[("foo", TypeId::NUMBER), ("bar", TypeId::NUMBER)])
    );
}

#[test]
fn test_literal_union_with_primitive_synthesizes_one_indexer() {
    let interner = TypeInterner::new();
    let keys = interner.union(vec![
        interner.literal_string("foo"),
        interner.literal_string("bar"),
        TypeId::STRING,
    ]);
    let result = evaluate_with_keys(&interner, keys, TypeId::NUMBER).unwrap();
    assert_eq!(
        format(&interner, result),
        "{foo: number, bar: number, [string]: number}"
    );
}

#[test]
fn test_primitive_sources_produce_only_an_indexer() {
    let interner = TypeInterner::new();
    let cases = [
        (TypeId::STRING, "{[string]: boolean}"),
        (TypeId::NUMBER, "{[number]: boolean}"),
        (TypeId::SYMBOL, "{[symbol]: boolean}"),
    ];
    for (keys, expected) in cases {
        let result = evaluate_with_keys(&interner, keys, TypeId::BOOLEAN).unwrap();
        assert_eq!(format(&interner, result), expected);
    }
}

#[test]
fn test_indexer_value_sees_primitive_key() {
    let interner = TypeInterner::new();
    let key = interner.type_param("key", None);
    let keys = interner.union2(interner.literal_string("a"), TypeId::NUMBER);
    let wrapped = interner.application(interner.intern_string("Box"), vec![key]);
    let result = evaluate_with_keys(&interner, keys, wrapped).unwrap();
    assert_eq!(
        format(&interner, result),
        "{a: Box<'a'>, [number]: Box<number>}"
    );
}

#[test]
fn test_number_literal_keys() {
    let interner = TypeInterner::new();
    let keys = interner.union2(interner.literal_number(0.0), interner.literal_number(1.0));
    let result = evaluate_with_keys(&interner, keys, TypeId::STRING).unwrap();
    assert_eq!(format(&interner, result), "{'0': string, '1': string}");
}

#[test]
fn test_empty_source_yields_empty_object() {
    let interner = TypeInterner::new();
    let result = evaluate_with_keys(&interner, TypeId::EMPTY, TypeId::NUMBER).unwrap();
    assert_eq!(result, interner.object(vec![]));
}

#[test]
fn test_invalid_source_is_rejected() {
    let interner = TypeInterner::new();
    let m = mapped(&interner, "key", TypeId::BOOLEAN, TypeId::NUMBER);
    let mut evaluator = TypeEvaluator::new(&interner);
    assert_eq!(
        evaluator.evaluate_mapped_type(&m, &TypeSubstitution::new()),
        Err(MappedTypeError::InvalidMappedSource {
            offending_type: TypeId::BOOLEAN
        })
    );
}

#[test]
fn test_two_primitive_kinds_are_rejected() {
    let interner = TypeInterner::new();
    let keys = interner.union2(TypeId::STRING, TypeId::NUMBER);
    assert_eq!(
        evaluate_with_keys(&interner, keys, TypeId::NUMBER),
        Err(MappedTypeError::AmbiguousIndexerConflict {
            existing: PrimitiveKeyKind::String,
            incoming: PrimitiveKeyKind::Number,
        })
    );
}

// =============================================================================
// Modifiers
// =============================================================================

#[test]
fn test_homomorphic_mapping_copies_modifiers() {
    let interner = TypeInterner::new();
    let source = interner.object(vec![
        prop(&interner, "foo", TypeId::NUMBER).with_variance(Variance::Covariant),
        prop(&interner, "bar", TypeId::STRING).optional(),
    ]);
    let o = interner.type_param("O", None);
    let key = interner.type_param("key", None);
    let m = mapped(
        &interner,
        "key",
        interner.keyof(o),
        interner.index_access(o, key),
    );

    let mut evaluator = TypeEvaluator::new(&interner);
    let result = evaluator
        .evaluate_mapped_type(&m, &TypeSubstitution::single(interner.intern_string("O"), source))
        .unwrap();
    assert_eq!(format(&interner, result), "{+foo: number, bar?: string}");
    assert_eq!(result, source);
}

#[test]
fn test_keyof_concrete_object_is_homomorphic() {
    let interner = TypeInterner::new();
    let source = interner.object(vec![
        prop(&interner, "foo", TypeId::NUMBER).with_variance(Variance::Contravariant),
    ]);
    let m = mapped(&interner, "key", interner.keyof(source), TypeId::STRING);
    let result = TypeEvaluator::new(&interner)
        .evaluate_mapped_type(&m, &TypeSubstitution::new())
        .unwrap();
    assert_eq!(format(&interner, result), "{-foo: string}");
}

#[test]
fn test_literal_union_does_not_inherit_modifiers() {
    let interner = TypeInterner::new();
    // A same-named readonly, optional property elsewhere has no influence.
    let _elsewhere = interner.object(vec![
        prop(&interner, "foo", TypeId::NUMBER)
            .with_variance(Variance::Covariant)
            .optional(),
    ]);
    let m = mapped(
        &interner,
        "key",
        literal_union(&interner, &["foo", "bar"]),
        TypeId::NUMBER,
    );
    let result = TypeEvaluator::new(&interner)
        .evaluate_mapped_type(&m, &TypeSubstitution::new())
        .unwrap();
    assert_eq!(format(&interner, result), "{foo: number, bar: number}");
}

#[test]
fn test_explicit_modifiers_win() {
    let interner = TypeInterner::new();
    let source = interner.object(vec![
        prop(&interner, "foo", TypeId::NUMBER).with_variance(Variance::Contravariant),
        prop(&interner, "bar", TypeId::STRING),
    ]);
    let o = interner.type_param("O", None);
    let key = interner.type_param("key", None);
    let m = with_modifiers(
        mapped(
            &interner,
            "key",
            interner.keyof(o),
            interner.index_access(o, key),
        ),
        Some(Variance::Covariant),
        true,
    );

    let result = TypeEvaluator::new(&interner)
        .evaluate_mapped_type(&m, &TypeSubstitution::single(interner.intern_string("O"), source))
        .unwrap();
    assert_eq!(format(&interner, result), "{+foo?: number, +bar?: string}");
}

#[test]
fn test_explicit_optional_widens_indexer_value() {
    let interner = TypeInterner::new();
    let m = with_modifiers(
        mapped(&interner, "key", TypeId::STRING, TypeId::NUMBER),
        Some(Variance::Covariant),
        true,
    );
    let result = TypeEvaluator::new(&interner)
        .evaluate_mapped_type(&m, &TypeSubstitution::new())
        .unwrap();
    assert_eq!(format(&interner, result), "{+[string]: number | void}");
}

#[test]
fn test_generic_evaluation_is_not_homomorphic() {
    let interner = TypeInterner::new();
    let bound = interner.object(vec![
        prop(&interner, "foo", TypeId::NUMBER)
            .with_variance(Variance::Covariant)
            .optional(),
    ]);
    let o = interner.type_param("O", Some(bound));
    let key = interner.type_param("key", None);
    let m = mapped(
        &interner,
        "key",
        interner.keyof(o),
        interner.index_access(o, key),
    );

    let result = TypeEvaluator::new(&interner)
        .evaluate_mapped_type(&m, &TypeSubstitution::new())
        .unwrap();
    // The value stays deferred until `O` is known.
    assert_eq!(format(&interner, result), "{foo: O['foo']}");
}

// =============================================================================
// Key limit
// =============================================================================

#[test]
fn test_key_limit() {
    let interner = TypeInterner::new();
    let keys = literal_union(&interner, &["a", "b", "c"]);
    let m = mapped(&interner, "key", keys, TypeId::NUMBER);
    let options = EvaluatorOptions {
        max_mapped_keys: 2,
        ..EvaluatorOptions::default()
    };

    let mut evaluator = TypeEvaluator::new(&interner).with_options(options);
    assert_eq!(
        evaluator.evaluate_mapped_type(&m, &TypeSubstitution::new()),
        Err(MappedTypeError::KeyLimitExceeded { count: 3, limit: 2 })
    );

    let mut roomy = TypeEvaluator::new(&interner);
    assert!(roomy.evaluate_mapped_type(&m, &TypeSubstitution::new()).is_ok());
}

// =============================================================================
// evaluate_one with caller-supplied builders
// =============================================================================

#[test]
fn test_evaluate_one_calls_builder_per_key_in_order() {
    let interner = TypeInterner::new();
    let keys = classify_keys(&interner, literal_union(&interner, &["b", "a"])).unwrap();

    let mut seen = Vec::new();
    let mut builder = |key: TypeId| -> Result<TypeId, MappedTypeError> {
        seen.push(key);
        Ok(TypeId::NUMBER)
    };
    let result = evaluate_one(
        &interner,
        &keys,
        &mut builder,
        MappedModifiers::NONE,
        false,
        usize::MAX,
    )
    .unwrap();

    assert_eq!(format(&interner, result), "{b: number, a: number}");
    assert_eq!(
        seen,
        [interner.literal_string("b"), interner.literal_string("a")]
    );
}

#[test]
fn test_evaluate_one_object_keys_never_produce_indexer() {
    let interner = TypeInterner::new();
    let object = interner.object_with_indexer(ObjectShape {
        properties: vec![prop(&interner, "foo", TypeId::NUMBER).optional()],
        indexer: Some(IndexSignature {
            key_type: TypeId::STRING,
            value_type: TypeId::NUMBER,
            variance: Variance::Writable,
        }),
    });
    let keys = KeySource::FromObjectKeys {
        object,
        subset: None,
    };

    let homomorphic = evaluate_one(
        &interner,
        &keys,
        &mut constant(TypeId::STRING),
        MappedModifiers::NONE,
        true,
        usize::MAX,
    )
    .unwrap();
    assert_eq!(format(&interner, homomorphic), "{foo?: string}");

    let plain = evaluate_one(
        &interner,
        &keys,
        &mut constant(TypeId::STRING),
        MappedModifiers::NONE,
        false,
        usize::MAX,
    )
    .unwrap();
    assert_eq!(format(&interner, plain), "{foo: string}");
}

#[test]
fn test_evaluate_one_union_backing_uses_common_keys() {
    let interner = TypeInterner::new();
    let a = interner.object_from(&[("foo", TypeId::NUMBER), ("bar", TypeId::NUMBER)]);
    let b = interner.object_from(&[("bar", TypeId::STRING), ("baz", TypeId::STRING)]);
    let keys = KeySource::FromObjectKeys {
        object: interner.union2(a, b),
        subset: None,
    };
    let result = evaluate_one(
        &interner,
        &keys,
        &mut constant(TypeId::BOOLEAN),
        MappedModifiers::NONE,
        false,
        usize::MAX,
    )
    .unwrap();
    assert_eq!(format(&interner, result), "{bar: boolean}");
}

#[test]
fn test_evaluate_one_picked_subset() {
    let interner = TypeInterner::new();
    let object = interner.object(vec![
        prop(&interner, "foo", TypeId::NUMBER).optional(),
        prop(&interner, "bar", TypeId::STRING).with_variance(Variance::Covariant),
    ]);
    let Ok(KeySource::FromLiteralUnion { keys: subset }) =
        classify_keys(&interner, literal_union(&interner, &["bar", "missing"]))
    else {
        panic!("expected literal union");
    };
    let keys = KeySource::FromObjectKeys {
        object,
        subset: Some(subset),
    };
    assert_eq!(keys.literal_count(), 2);

    // Picked order; a key the object lacks inherits nothing.
    let result = evaluate_one(
        &interner,
        &keys,
        &mut constant(TypeId::BOOLEAN),
        MappedModifiers::NONE,
        true,
        usize::MAX,
    )
    .unwrap();
    assert_eq!(
        format(&interner, result),
        "{+bar: boolean, missing: boolean}"
    );

    assert_eq!(
        evaluate_one(
            &interner,
            &keys,
            &mut constant(TypeId::BOOLEAN),
            MappedModifiers::NONE,
            true,
            1,
        ),
        Err(MappedTypeError::KeyLimitExceeded { count: 2, limit: 1 })
    );
}

#[test]
fn test_evaluate_one_propagates_builder_errors() {
    let interner = TypeInterner::new();
    let keys = KeySource::FromPrimitive(PrimitiveKeyKind::String);
    let mut failing = |_key: TypeId| -> Result<TypeId, MappedTypeError> {
        Err(MappedTypeError::RecursionBudgetExceeded { depth: 3 })
    };
    assert_eq!(
        evaluate_one(
            &interner,
            &keys,
            &mut failing,
            MappedModifiers::NONE,
            false,
            usize::MAX,
        ),
        Err(MappedTypeError::RecursionBudgetExceeded { depth: 3 })
    );
}

#[test]
fn test_evaluate_one_through_trait_object() {
    let interner = TypeInterner::new();
    let keys = KeySource::Mixed {
        literals: vec![LiteralKey {
            name: interner.intern_string("id"),
            key_type: interner.literal_string("id"),
        }],
        primitive: PrimitiveKeyKind::Number,
    };
    let mut inner = constant(TypeId::STRING);
    let builder: &mut dyn ValueBuilder = &mut inner;
    let result = evaluate_one(
        &interner,
        &keys,
        builder,
        MappedModifiers::NONE,
        false,
        usize::MAX,
    )
    .unwrap();
    assert_eq!(format(&interner, result), "{id: string, [number]: string}");
}
