//! Name-keyed construction registry.
//!
//! Test types register a zero-argument constructor under a display name;
//! the controller later instantiates them by name without knowing the
//! concrete type. Each entry also records the concrete [`TypeId`] so a
//! setup closure aimed at the wrong type is caught at `add` time instead
//! of silently configuring the wrong object.
//!
//! Registration is explicit: build a [`Registry`], call
//! [`register`](Registry::register) (or construct a [`Registrar`]) for
//! each test type from one initialization routine, then hand the registry
//! to the controller. There is no global table and no reliance on
//! life-before-main side effects.

use crate::entity::TestCase;
use std::any::TypeId;
use std::collections::HashMap;
use std::marker::PhantomData;

type Constructor = Box<dyn Fn() -> Box<dyn TestCase>>;

struct RegistryEntry {
    ctor: Constructor,
    type_id: TypeId,
}

/// Table of name → constructor mappings.
#[derive(Default)]
pub struct Registry {
    entries: HashMap<String, RegistryEntry>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` under `name` using its `Default` constructor.
    ///
    /// Registering the same name twice replaces the prior entry; entities
    /// already constructed under the old entry are unaffected.
    pub fn register<T>(&mut self, name: impl Into<String>)
    where
        T: TestCase + Default + 'static,
    {
        self.register_with(name, T::default);
    }

    /// Register `T` under `name` with an explicit constructor.
    pub fn register_with<T, F>(&mut self, name: impl Into<String>, ctor: F)
    where
        T: TestCase + 'static,
        F: Fn() -> T + 'static,
    {
        self.entries.insert(
            name.into(),
            RegistryEntry {
                ctor: Box::new(move || Box::new(ctor())),
                type_id: TypeId::of::<T>(),
            },
        );
    }

    /// Construct a fresh entity for `name`, or `None` when no such test
    /// is registered.
    pub fn create(&self, name: &str) -> Option<Box<dyn TestCase>> {
        self.entries.get(name).map(|entry| (entry.ctor)())
    }

    /// The concrete type registered under `name`, if any.
    pub fn type_of(&self, name: &str) -> Option<TypeId> {
        self.entries.get(name).map(|entry| entry.type_id)
    }

    /// Whether `name` has a registered constructor.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// All registered names, in registry-internal order.
    pub fn list_names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A value whose construction registers one test type under one name.
///
/// Kept as a convenience for initialization routines that want
/// registration to read declaratively:
///
/// ```
/// use testbed::{ErrCode, Registrar, Registry, RunContext, TestCase};
///
/// #[derive(Default)]
/// struct Smoke;
///
/// impl TestCase for Smoke {
///     fn name(&self) -> &str {
///         "smoke"
///     }
///     fn run(&mut self, _ctx: &mut RunContext<'_>) -> ErrCode {
///         ErrCode::PASSED
///     }
///     fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
///         self
///     }
/// }
///
/// fn register_all(registry: &mut Registry) {
///     Registrar::<Smoke>::new(registry, "smoke");
/// }
/// ```
pub struct Registrar<T> {
    _marker: PhantomData<T>,
}

impl<T> Registrar<T>
where
    T: TestCase + Default + 'static,
{
    /// Register `T` under `name` in `registry`.
    pub fn new(registry: &mut Registry, name: impl Into<String>) -> Self {
        registry.register::<T>(name);
        Self {
            _marker: PhantomData,
        }
    }
}
