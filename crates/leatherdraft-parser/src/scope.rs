use std::sync::Arc;

use indexmap::IndexMap;

/// Namespace names reserved for measurements, fit and options.
pub const RESERVED_NAMESPACES: [&str; 3] = ["M", "F", "O"];

#[must_use]
pub fn is_reserved(name: &str) -> bool {
    RESERVED_NAMESPACES.contains(&name)
}

/// A value an expression can refer to by name.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Number(f64),
    /// Flat mapping reachable through dotted access (`M.chest`).
    Namespace(IndexMap<String, f64>),
}

/// One layer of named bindings over an optional parent layer.
///
/// Lookups walk outwards from the innermost layer. A layer is shared through `Arc` once
/// child layers exist, so it can no longer be mutated; extending always means creating a
/// child, which keeps piece-local names out of sibling pieces without copying the parent.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: IndexMap<String, Binding>,
    parent: Option<Arc<Scope>>,
}

impl Scope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Root scope holding the measurement (`M`), fit (`F`) and option (`O`) namespaces.
    #[must_use]
    pub fn with_namespaces(
        measurements: IndexMap<String, f64>,
        fit: IndexMap<String, f64>,
        options: IndexMap<String, f64>,
    ) -> Self {
        let mut scope = Self::new();
        scope.bind_namespace("M", measurements);
        scope.bind_namespace("F", fit);
        scope.bind_namespace("O", options);
        scope
    }

    /// Empty layer on top of `parent`.
    #[must_use]
    pub fn child(parent: &Arc<Scope>) -> Self {
        Self {
            bindings: IndexMap::new(),
            parent: Some(Arc::clone(parent)),
        }
    }

    pub fn bind(&mut self, name: impl Into<String>, value: f64) {
        self.bindings.insert(name.into(), Binding::Number(value));
    }

    pub fn bind_namespace(&mut self, name: impl Into<String>, values: IndexMap<String, f64>) {
        self.bindings.insert(name.into(), Binding::Namespace(values));
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        let mut layer = Some(self);
        while let Some(scope) = layer {
            if let Some(binding) = scope.bindings.get(name) {
                return Some(binding);
            }
            layer = scope.parent.as_deref();
        }
        None
    }

    #[must_use]
    pub fn into_shared(self) -> Arc<Scope> {
        Arc::new(self)
    }
}
