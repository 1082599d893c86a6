use super::*;
use crate::resolver::AliasTable;
use crate::test_utils::{format, init_test_tracing, literal_union, mapped};
use crate::TypeInterner;

#[test]
fn test_normal_forms_are_unchanged() {
    let interner = TypeInterner::new();
    let mut evaluator = TypeEvaluator::new(&interner);

    let obj = interner.object_from(&[("foo", TypeId::NUMBER)]);
    let union = interner.union2(obj, TypeId::NULL);
    assert_eq!(evaluator.evaluate(TypeId::STRING), Ok(TypeId::STRING));
    assert_eq!(evaluator.evaluate(obj), Ok(obj));
    assert_eq!(evaluator.evaluate(union), Ok(union));
    assert_eq!(evaluator.evaluate(interner.maybe(obj)), Ok(interner.maybe(obj)));
}

#[test]
fn test_nested_mapped_types_are_evaluated() {
    let interner = TypeInterner::new();
    let inner = interner.mapped(mapped(
        &interner,
        "K",
        literal_union(&interner, &["a"]),
        TypeId::NUMBER,
    ));
    let outer = interner.object_from(&[("wrapped", inner)]);
    let builder = interner.application(interner.intern_string("Builder"), vec![inner]);

    let mut evaluator = TypeEvaluator::new(&interner);
    let result = evaluator.evaluate(outer).unwrap();
    assert_eq!(format(&interner, result), "{wrapped: {a: number}}");
    let result = evaluator.evaluate(builder).unwrap();
    assert_eq!(format(&interner, result), "Builder<{a: number}>");
    let result = evaluator.evaluate(interner.maybe(inner)).unwrap();
    assert_eq!(format(&interner, result), "?{a: number}");
}

#[test]
fn test_alias_expansion() {
    init_test_tracing();
    let interner = TypeInterner::new();
    let t = interner.type_param("T", None);
    let pair = interner.intern_string("Pair");
    let mut aliases = AliasTable::new();
    aliases.define(
        pair,
        vec![interner.intern_string("T")],
        interner.object_from(&[("first", t), ("second", t)]),
    );

    let mut evaluator = TypeEvaluator::with_resolver(&interner, &aliases);
    let result = evaluator
        .evaluate(interner.alias(pair, vec![TypeId::NUMBER]))
        .unwrap();
    assert_eq!(
        result,
        interner.object_from(&[("first", TypeId::NUMBER), ("second", TypeId::NUMBER)])
    );
}

#[test]
fn test_unresolved_alias_stays_as_written() {
    let interner = TypeInterner::new();
    let missing = interner.alias(interner.intern_string("Missing"), vec![TypeId::NUMBER]);
    let mut evaluator = TypeEvaluator::new(&interner);
    assert_eq!(evaluator.evaluate(missing), Ok(missing));
}

#[test]
fn test_index_access_is_evaluated() {
    let interner = TypeInterner::new();
    let obj = interner.object_from(&[("foo", TypeId::NUMBER)]);
    let access = interner.index_access(obj, interner.literal_string("foo"));
    let mut evaluator = TypeEvaluator::new(&interner);
    assert_eq!(evaluator.evaluate(access), Ok(TypeId::NUMBER));
}

#[test]
fn test_bound_parameter_is_evaluated() {
    let interner = TypeInterner::new();
    let t = interner.type_param("T", None);
    let inner = interner.mapped(mapped(
        &interner,
        "K",
        literal_union(&interner, &["a"]),
        TypeId::STRING,
    ));
    let subst = TypeSubstitution::single(interner.intern_string("T"), inner);

    let mut evaluator = TypeEvaluator::new(&interner);
    let result = evaluator.evaluate_in(t, &subst).unwrap();
    assert_eq!(result, interner.object_from(&[("a", TypeId::STRING)]));

    // Unbound parameters are left in place.
    assert_eq!(evaluator.evaluate(t), Ok(t));
}

#[test]
fn test_evaluation_is_idempotent() {
    let interner = TypeInterner::new();
    let m = interner.mapped(mapped(
        &interner,
        "K",
        literal_union(&interner, &["a", "b"]),
        TypeId::NUMBER,
    ));
    let mut evaluator = TypeEvaluator::new(&interner);
    let first = evaluator.evaluate(m).unwrap();
    assert_eq!(evaluator.evaluate(m), Ok(first));
    assert_eq!(evaluator.evaluate(first), Ok(first));

    // A fresh evaluator agrees with the cached result.
    let mut fresh = TypeEvaluator::new(&interner);
    assert_eq!(fresh.evaluate(m), Ok(first));
}

#[test]
fn test_evaluate_mapped_type_never_returns_mapped() {
    let interner = TypeInterner::new();
    let o = interner.type_param("O", None);
    let k = interner.type_param("K", None);
    let m = mapped(&interner, "K", interner.keyof(o), interner.index_access(o, k));
    let obj = interner.object_from(&[("foo", TypeId::NUMBER)]);
    let subst = TypeSubstitution::single(interner.intern_string("O"), obj);

    let mut evaluator = TypeEvaluator::new(&interner);
    let result = evaluator.evaluate_mapped_type(&m, &subst).unwrap();
    assert!(!matches!(interner.lookup(result), Some(TypeData::Mapped(_))));
    assert_eq!(result, obj);
}

#[test]
fn test_with_options() {
    let interner = TypeInterner::new();
    let options = EvaluatorOptions {
        max_depth: 5,
        ..EvaluatorOptions::default()
    };
    let evaluator = TypeEvaluator::new(&interner).with_options(options);
    assert_eq!(evaluator.options().max_depth, 5);
    assert!(!evaluator.is_depth_exceeded());
}
