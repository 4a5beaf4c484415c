//! Parse configuration.

use std::fmt;

use crate::value::{Object, Value};

/// Post-processes a default-built object.
pub type ObjectHook = Box<dyn Fn(Object) -> Value>;

/// Builds an object value directly from its ordered `(key, value)` pairs.
pub type ObjectPairsHook = Box<dyn Fn(Vec<(Value, Value)>) -> Value>;

/// Options accepted by [`crate::parse_with_options`].
///
/// ```
/// use librson::{parse_with_options, ParseOptions};
///
/// let options = ParseOptions::new()
///     .allow_trailing_commas(false)
///     .use_decimal(true);
/// assert!(parse_with_options("[1, 2,]", &options).is_err());
/// ```
pub struct ParseOptions {
    pub(crate) object_hook: Option<ObjectHook>,
    pub(crate) object_pairs_hook: Option<ObjectPairsHook>,
    pub(crate) allow_trailing_commas: bool,
    pub(crate) use_decimal: bool,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pass every object through `hook` after it has been built.
    /// Ignored when an object pairs hook is also set.
    pub fn with_object_hook(mut self, hook: impl Fn(Object) -> Value + 'static) -> Self {
        self.object_hook = Some(Box::new(hook));
        self
    }

    /// Build every object with `hook` from its ordered pairs, keys still
    /// uncanonicalized and duplicates kept.
    pub fn with_object_pairs_hook(
        mut self,
        hook: impl Fn(Vec<(Value, Value)>) -> Value + 'static,
    ) -> Self {
        self.object_pairs_hook = Some(Box::new(hook));
        self
    }

    /// Accept a `,` right before a closing bracket (default `true`).
    pub fn allow_trailing_commas(mut self, allow: bool) -> Self {
        self.allow_trailing_commas = allow;
        self
    }

    /// Decode floats as exact [`bigdecimal::BigDecimal`] values instead of `f64`.
    pub fn use_decimal(mut self, use_decimal: bool) -> Self {
        self.use_decimal = use_decimal;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            object_hook: None,
            object_pairs_hook: None,
            allow_trailing_commas: true,
            use_decimal: false,
        }
    }
}

impl fmt::Debug for ParseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOptions")
            .field("object_hook", &self.object_hook.is_some())
            .field("object_pairs_hook", &self.object_pairs_hook.is_some())
            .field("allow_trailing_commas", &self.allow_trailing_commas)
            .field("use_decimal", &self.use_decimal)
            .finish()
    }
}
