//! Type formatting in Flow surface syntax.
//!
//! Used for diagnostic messages and test assertions:
//! `{+foo: number, bar?: string, [string]: number}`, `?{foo: number}`,
//! `'a' | 'b'`, `$Keys<O>`, `O[K]`, `{+[K in $Keys<O>]?: O[K]}`.

use crate::evaluate_rules::key_source::number_key_name;
use crate::intern::TypeDatabase;
use crate::types::*;
use flowmap_common::Atom;

pub struct TypeFormatter<'a> {
    interner: &'a dyn TypeDatabase,
}

impl<'a> TypeFormatter<'a> {
    pub fn new(interner: &'a dyn TypeDatabase) -> Self {
        TypeFormatter { interner }
    }

    pub fn format(&mut self, type_id: TypeId) -> String {
        let mut out = String::new();
        self.write_type(&mut out, type_id);
        out
    }

    fn write_type(&mut self, out: &mut String, type_id: TypeId) {
        let Some(data) = self.interner.lookup(type_id) else {
            out.push_str(&format!("<unknown #{}>", type_id.0));
            return;
        };
        match data {
            TypeData::Intrinsic(kind) => out.push_str(kind.name()),
            TypeData::Error => out.push_str("error"),
            TypeData::Literal(LiteralValue::String(atom)) => {
                self.write_quoted(out, atom);
            }
            TypeData::Literal(LiteralValue::Number(OrderedFloat(value))) => {
                out.push_str(&number_key_name(value));
            }
            TypeData::Literal(LiteralValue::Boolean(value)) => {
                out.push_str(if value { "true" } else { "false" });
            }
            TypeData::Object(shape_id) => {
                let shape = self.interner.object_shape(shape_id);
                self.write_object(out, &shape);
            }
            TypeData::Union(list_id) => {
                let members = self.interner.type_list(list_id);
                for (i, &member) in members.iter().enumerate() {
                    if i > 0 {
                        out.push_str(" | ");
                    }
                    self.write_type(out, member);
                }
            }
            TypeData::Maybe(inner) => {
                out.push('?');
                self.write_operand(out, inner);
            }
            TypeData::TypeParameter(param) => {
                out.push_str(&self.interner.resolve_atom(param.name));
            }
            TypeData::KeyOf(object) => {
                out.push_str("$Keys<");
                self.write_type(out, object);
                out.push('>');
            }
            TypeData::IndexAccess(object, index) => {
                self.write_operand(out, object);
                out.push('[');
                self.write_type(out, index);
                out.push(']');
            }
            TypeData::Mapped(mapped_id) => {
                let mapped = self.interner.mapped_type(mapped_id);
                out.push('{');
                if let Some(variance) = mapped.modifiers.variance {
                    out.push_str(variance.sigil());
                }
                out.push('[');
                out.push_str(&self.interner.resolve_atom(mapped.type_param.name));
                out.push_str(" in ");
                self.write_type(out, mapped.source);
                out.push(']');
                if mapped.modifiers.optional {
                    out.push('?');
                }
                out.push_str(": ");
                self.write_type(out, mapped.template);
                out.push('}');
            }
            TypeData::Application(app_id) | TypeData::Alias(app_id) => {
                let app = self.interner.type_application(app_id);
                out.push_str(&self.interner.resolve_atom(app.name));
                if !app.args.is_empty() {
                    out.push('<');
                    for (i, &arg) in app.args.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        self.write_type(out, arg);
                    }
                    out.push('>');
                }
            }
        }
    }

    /// Write a type in prefix or postfix operand position, parenthesizing
    /// unions.
    fn write_operand(&mut self, out: &mut String, type_id: TypeId) {
        if matches!(self.interner.lookup(type_id), Some(TypeData::Union(_))) {
            out.push('(');
            self.write_type(out, type_id);
            out.push(')');
        } else {
            self.write_type(out, type_id);
        }
    }

    fn write_object(&mut self, out: &mut String, shape: &ObjectShape) {
        out.push('{');
        let mut first = true;
        for prop in &shape.properties {
            if !first {
                out.push_str(", ");
            }
            first = false;
            out.push_str(prop.variance.sigil());
            self.write_property_name(out, prop.name);
            if prop.optional {
                out.push('?');
            }
            out.push_str(": ");
            self.write_type(out, prop.type_id);
        }
        if let Some(indexer) = &shape.indexer {
            if !first {
                out.push_str(", ");
            }
            out.push_str(indexer.variance.sigil());
            out.push('[');
            self.write_type(out, indexer.key_type);
            out.push_str("]: ");
            self.write_type(out, indexer.value_type);
        }
        out.push('}');
    }

    fn write_property_name(&mut self, out: &mut String, name: Atom) {
        let text = self.interner.resolve_atom(name);
        if is_identifier(&text) {
            out.push_str(&text);
        } else {
            self.write_quoted(out, name);
        }
    }

    fn write_quoted(&mut self, out: &mut String, atom: Atom) {
        let text = self.interner.resolve_atom(atom);
        out.push('\'');
        for ch in text.chars() {
            if ch == '\'' || ch == '\\' {
                out.push('\\');
            }
            out.push(ch);
        }
        out.push('\'');
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_' || first == '$')
        && chars.all(|ch| ch.is_alphanumeric() || ch == '_' || ch == '$')
}

#[cfg(test)]
#[path = "../tests/format_tests.rs"]
mod tests;
