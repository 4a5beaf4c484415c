//! Object construction.
//!
//! Every dict the parser finishes, bracketed or block, is handed to an
//! [`ObjectFactory`] as an ordered list of `(key, value)` pairs. The factory
//! is picked once per parse from the options.

use crate::options::ParseOptions;
use crate::value::{Key, Object, Value};

/// How pairs become an object value.
pub enum ObjectFactory<'a> {
    /// Canonicalize keys into an [`Object`].
    Default,
    /// Build the default object, then hand it to a hook.
    Hook(&'a dyn Fn(Object) -> Value),
    /// Give the raw pairs to a hook.
    Pairs(&'a dyn Fn(Vec<(Value, Value)>) -> Value),
}

impl<'a> ObjectFactory<'a> {
    /// The pairs hook wins over the object hook.
    pub fn from_options(options: &'a ParseOptions) -> Self {
        if let Some(hook) = &options.object_pairs_hook {
            ObjectFactory::Pairs(hook.as_ref())
        } else if let Some(hook) = &options.object_hook {
            ObjectFactory::Hook(hook.as_ref())
        } else {
            ObjectFactory::Default
        }
    }

    pub fn build(&self, pairs: Vec<(Value, Value)>) -> Value {
        match self {
            ObjectFactory::Default => Value::Object(build_object(pairs)),
            ObjectFactory::Hook(hook) => hook(build_object(pairs)),
            ObjectFactory::Pairs(hook) => hook(pairs),
        }
    }

    /// Turn a block dict entry into a single pair.
    ///
    /// `key : c1 : c2 ... = value` nests right to left, so the pair becomes
    /// `(key, {c1: {c2: ... value}})` with every level built by this factory.
    pub fn fold_entry(&self, key: Value, chain: Vec<Value>, value: Value) -> (Value, Value) {
        let folded = chain
            .into_iter()
            .rev()
            .fold(value, |acc, k| self.build(vec![(k, acc)]));
        (key, folded)
    }
}

/// Default mapping: canonical keys, last duplicate wins.
pub fn build_object(pairs: Vec<(Value, Value)>) -> Object {
    let mut obj = Object::with_capacity(pairs.len());
    for (key, value) in pairs {
        obj.insert(Key::from(key), value);
    }
    obj
}
