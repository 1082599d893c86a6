//! Tests for distribution of mapped types over unions and `?O`.

use crate::test_utils::{format, init_test_tracing, literal_union, mapped, prop};
use crate::*;
use flowmap_common::Atom;

struct Fixture {
    interner: TypeInterner,
    aliases: AliasTable,
}

impl Fixture {
    fn new() -> Self {
        Fixture {
            interner: TypeInterner::new(),
            aliases: AliasTable::new(),
        }
    }

    /// `type name<params> = body`, returning the alias name.
    fn define(&mut self, name: &str, params: &[&str], body: TypeId) -> Atom {
        let name = self.interner.intern_string(name);
        let params = params
            .iter()
            .map(|param| self.interner.intern_string(param))
            .collect();
        self.aliases.define(name, params, body);
        name
    }

    fn apply(&self, name: Atom, args: Vec<TypeId>) -> Result<TypeId, MappedTypeError> {
        let reference = self.interner.alias(name, args);
        TypeEvaluator::with_resolver(&self.interner, &self.aliases).evaluate(reference)
    }

    fn format(&self, type_id: TypeId) -> String {
        format(&self.interner, type_id)
    }
}

/// `type name<O> = {[key in $Keys<O>]: template}`
fn define_keyof_alias(
    fx: &mut Fixture,
    name: &str,
    template: impl FnOnce(&TypeInterner) -> TypeId,
) -> Atom {
    let o = fx.interner.type_param("O", None);
    let template = template(&fx.interner);
    let body = fx
        .interner
        .mapped(mapped(&fx.interner, "key", fx.interner.keyof(o), template));
    fx.define(name, &["O"], body)
}

fn value_of_key(db: &TypeInterner) -> TypeId {
    db.index_access(db.type_param("O", None), db.type_param("key", None))
}

#[test]
fn test_inline_keyof_distributes_over_object_union() {
    init_test_tracing();
    let mut fx = Fixture::new();
    let make_all_numbers = define_keyof_alias(&mut fx, "MakeAllValuesNumber", |_| TypeId::NUMBER);
    let with_foo = fx.interner.object_from(&[("foo", TypeId::STRING)]);
    let with_bar = fx.interner.object_from(&[("bar", TypeId::BOOLEAN)]);

    let result = fx
        .apply(make_all_numbers, vec![fx.interner.union2(with_foo, with_bar)])
        .unwrap();
    assert_eq!(fx.format(result), "{foo: number} | {bar: number}");
}

#[test]
fn test_maybe_object_distributes_to_maybe() {
    let mut fx = Fixture::new();
    let distributive = define_keyof_alias(&mut fx, "Distributive", value_of_key);
    let obj = fx.interner.object_from(&[("foo", TypeId::NUMBER)]);

    let result = fx.apply(distributive, vec![fx.interner.maybe(obj)]).unwrap();
    assert_eq!(result, fx.interner.maybe(obj));
    assert_eq!(fx.format(result), "?{foo: number}");
}

#[test]
fn test_branches_keep_their_own_modifiers() {
    let mut fx = Fixture::new();
    let identity = define_keyof_alias(&mut fx, "Identity", value_of_key);
    let readonly = fx.interner.object(vec![
        prop(&fx.interner, "foo", TypeId::NUMBER).with_variance(Variance::Covariant),
    ]);
    let optional = fx
        .interner
        .object(vec![prop(&fx.interner, "bar", TypeId::STRING).optional()]);
    let source = fx
        .interner
        .union2(fx.interner.maybe(readonly), optional);

    let result = fx.apply(identity, vec![source]).unwrap();
    assert_eq!(fx.format(result), "?({+foo: number} | {bar?: string})");
}

#[test]
fn test_bare_null_member_stays_plain_union() {
    let mut fx = Fixture::new();
    let make_all_numbers = define_keyof_alias(&mut fx, "MakeAllValuesNumber", |_| TypeId::NUMBER);
    let obj = fx.interner.object_from(&[("foo", TypeId::STRING)]);

    let result = fx
        .apply(make_all_numbers, vec![fx.interner.union2(obj, TypeId::NULL)])
        .unwrap();
    assert_eq!(fx.format(result), "{foo: number} | null");
}

#[test]
fn test_two_maybes_stay_plain_union() {
    let mut fx = Fixture::new();
    let make_all_numbers = define_keyof_alias(&mut fx, "MakeAllValuesNumber", |_| TypeId::NUMBER);
    let a = fx.interner.object_from(&[("foo", TypeId::STRING)]);
    let b = fx.interner.object_from(&[("bar", TypeId::STRING)]);
    let source = fx
        .interner
        .union2(fx.interner.maybe(a), fx.interner.maybe(b));

    let result = fx.apply(make_all_numbers, vec![source]).unwrap();
    assert_eq!(
        fx.format(result),
        "{foo: number} | null | void | {bar: number}"
    );
}

/// `type Pick<O, Keys: $Keys<O>> = {[key in Keys]: O[key]}`
fn define_pick(fx: &mut Fixture) -> Atom {
    let db = &fx.interner;
    let o = db.type_param("O", None);
    let keys = db.type_param("Keys", Some(db.keyof(o)));
    let body = db.mapped(mapped(db, "key", keys, value_of_key(db)));
    fx.define("Pick", &["O", "Keys"], body)
}

#[test]
fn test_keys_bound_parameter_distributes() {
    let mut fx = Fixture::new();
    let pick = define_pick(&mut fx);

    let db = &fx.interner;
    let with_foo = db.object_from(&[("foo", TypeId::NUMBER)]);
    let with_bar = db.object_from(&[("bar", TypeId::STRING)]);
    let union = db.union2(with_foo, with_bar);

    let result = fx.apply(pick, vec![union, db.keyof(union)]).unwrap();
    assert_eq!(fx.format(result), "{foo: number} | {bar: string}");
}

#[test]
fn test_pick_literal_subset_distributes_over_union() {
    let mut fx = Fixture::new();
    let pick = define_pick(&mut fx);

    let db = &fx.interner;
    let o1 = db.object_from(&[("foo", TypeId::NUMBER), ("bar", TypeId::NUMBER)]);
    let o2 = db.object_from(&[("bar", TypeId::STRING), ("baz", TypeId::NUMBER)]);
    let result = fx
        .apply(pick, vec![db.union2(o1, o2), literal_union(db, &["bar"])])
        .unwrap();
    assert_eq!(fx.format(result), "{bar: number} | {bar: string}");
}

#[test]
fn test_pick_literal_subset_over_maybe_stays_maybe() {
    let mut fx = Fixture::new();
    let pick = define_pick(&mut fx);

    let db = &fx.interner;
    let obj = db.object_from(&[("foo", TypeId::NUMBER)]);
    let result = fx
        .apply(pick, vec![db.maybe(obj), literal_union(db, &["foo"])])
        .unwrap();
    assert_eq!(result, db.maybe(obj));
    assert_eq!(fx.format(result), "?{foo: number}");
}

#[test]
fn test_pick_literal_subset_inherits_modifiers() {
    let mut fx = Fixture::new();
    let pick = define_pick(&mut fx);

    let db = &fx.interner;
    let source = db.object(vec![
        prop(db, "foo", TypeId::NUMBER).with_variance(Variance::Covariant),
        prop(db, "bar", TypeId::STRING).optional(),
        prop(db, "baz", TypeId::BOOLEAN),
    ]);
    let result = fx
        .apply(pick, vec![source, literal_union(db, &["foo", "bar"])])
        .unwrap();
    assert_eq!(fx.format(result), "{+foo: number, bar?: string}");

    let result = fx
        .apply(pick, vec![source, literal_union(db, &["foo"])])
        .unwrap();
    assert_eq!(fx.format(result), "{+foo: number}");
}

#[test]
fn test_keys_through_plain_parameter_do_not_distribute() {
    let mut fx = Fixture::new();
    let db = &fx.interner;
    let body = db.mapped(mapped(db, "key", db.type_param("Keys", None), TypeId::NUMBER));
    let over = fx.define("Over", &["Keys"], body);

    let db = &fx.interner;
    let a = db.object_from(&[("foo", TypeId::STRING), ("bar", TypeId::STRING)]);
    let b = db.object_from(&[("bar", TypeId::STRING), ("baz", TypeId::STRING)]);
    let result = fx.apply(over, vec![db.keyof(db.union2(a, b))]).unwrap();
    assert_eq!(fx.format(result), "{bar: number}");
}

#[test]
fn test_direct_evaluation_distributes() {
    let interner = TypeInterner::new();
    let o = interner.type_param("O", None);
    let m = mapped(&interner, "key", interner.keyof(o), TypeId::NUMBER);
    let a = interner.object_from(&[("foo", TypeId::STRING)]);
    let b = interner.object_from(&[("bar", TypeId::STRING)]);
    let subst = TypeSubstitution::single(interner.intern_string("O"), interner.union2(a, b));

    let result = TypeEvaluator::new(&interner)
        .evaluate_mapped_type(&m, &subst)
        .unwrap();
    assert_eq!(format(&interner, result), "{foo: number} | {bar: number}");
}
