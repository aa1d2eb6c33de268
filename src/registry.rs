//! Namespaces for binding record types under a global name.
//!
//! Building a type never registers it anywhere; binding is a separate step
//! the caller opts into. A type bound in the process-wide namespace lives
//! for the remainder of the program.

use std::{
    collections::HashMap,
    sync::{Arc, LazyLock, RwLock},
};

use crate::{conditions::Condition, records::RecordType, symbols::Symbol};

/// A namespace mapping names to record types.
#[derive(Debug, Default)]
pub struct Registry {
    types: RwLock<HashMap<Symbol, Arc<RecordType>>>,
}

static GLOBAL: LazyLock<Registry> = LazyLock::new(Registry::default);

/// The process-wide namespace.
pub fn global() -> &'static Registry {
    &GLOBAL
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `ty` under `name`. Binding an already-bound name is an error.
    pub fn define(&self, name: impl Into<Symbol>, ty: Arc<RecordType>) -> Result<(), Condition> {
        let name = name.into();
        let mut types = self.types.write().unwrap();
        if types.contains_key(&name) {
            return Err(Condition::NameBoundMultipleTimes(name));
        }
        types.insert(name, ty);
        Ok(())
    }

    /// Binds `ty` under its own type name.
    pub fn register(&self, ty: Arc<RecordType>) -> Result<(), Condition> {
        let name = ty
            .name()
            .ok_or_else(|| Condition::error("cannot register an anonymous record type"))?;
        self.define(name, ty)
    }

    pub fn resolve(&self, name: impl Into<Symbol>) -> Option<Arc<RecordType>> {
        self.types.read().unwrap().get(&name.into()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_resolve_round_trip() {
        let registry = Registry::new();
        let ty = RecordType::define(["a"]).unwrap();
        registry.define("round_trip", ty.clone()).unwrap();
        assert!(Arc::ptr_eq(&registry.resolve("round_trip").unwrap(), &ty));
        assert!(registry.resolve("unbound").is_none());
    }

    #[test]
    fn test_double_bind_fails() {
        let registry = Registry::new();
        let ty = RecordType::define(["a"]).unwrap();
        registry.define("twice", ty.clone()).unwrap();
        assert_eq!(
            registry.define("twice", ty),
            Err(Condition::NameBoundMultipleTimes(Symbol::intern("twice")))
        );
    }

    #[test]
    fn test_register_uses_the_type_name() {
        let registry = Registry::new();
        let named = RecordType::builder().named("named").fields(["a"]).build().unwrap();
        registry.register(named.clone()).unwrap();
        assert!(Arc::ptr_eq(&registry.resolve("named").unwrap(), &named));

        let anonymous = RecordType::define(["a"]).unwrap();
        assert!(registry.register(anonymous).is_err());
    }
}
