//! Component capability contract and type-erased storage

use cadence_core::{ComponentId, EntityId, Fingerprint, Result};
use serde::Serialize;
use std::any::Any;

/// A unit of behavior attached to an entity.
///
/// Implementors supply `update`, which advances the component by exactly
/// `delta_ms` of simulated time. It must not read the wall clock, so that the
/// same delta and starting state always produce the same result.
///
/// The `Serialize` bound is what the component's [`Fingerprint`] is derived
/// from.
pub trait Component: Serialize + Send + Sync + 'static {
    /// Advance this component by one fixed simulation step
    fn update(&mut self, delta_ms: f64);

    /// Called by [`crate::Entity::attach`] after the back-reference is recorded
    fn on_attach(&mut self, _owner: EntityId) {}

    /// Called when the component is removed from its entity
    fn on_detach(&mut self) {}
}

/// Object-safe view over any [`Component`]
trait AnyComponent: Send + Sync {
    fn tick(&mut self, delta_ms: f64);
    fn attached(&mut self, owner: EntityId);
    fn detached(&mut self);
    fn fingerprint(&self) -> Result<Fingerprint>;
    fn type_name(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<C: Component> AnyComponent for C {
    fn tick(&mut self, delta_ms: f64) {
        Component::update(self, delta_ms);
    }

    fn attached(&mut self, owner: EntityId) {
        self.on_attach(owner);
    }

    fn detached(&mut self) {
        self.on_detach();
    }

    fn fingerprint(&self) -> Result<Fingerprint> {
        Fingerprint::of(self)
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<C>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// A component instance together with its identity and owner.
///
/// Returned by entity queries, and by value from `remove` once detached.
pub struct Attached {
    id: ComponentId,
    owner: Option<EntityId>,
    inner: Box<dyn AnyComponent>,
}

impl Attached {
    /// Wrap a component, allocating its stable id. It has no owner yet.
    pub fn new<C: Component>(component: C) -> Self {
        Self {
            id: ComponentId::new(),
            owner: None,
            inner: Box::new(component),
        }
    }

    /// Stable id assigned when this instance was first wrapped
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// The entity this component is attached to, if any
    pub fn owner(&self) -> Option<EntityId> {
        self.owner
    }

    /// Full Rust type name of the component
    pub fn type_name(&self) -> &'static str {
        self.inner.type_name()
    }

    /// Type name without the module path
    pub fn short_type_name(&self) -> &'static str {
        let name = self.type_name();
        name.rsplit("::").next().unwrap_or(name)
    }

    /// Fingerprint of the component's current state, computed on every call
    pub fn fingerprint(&self) -> Result<Fingerprint> {
        self.inner.fingerprint()
    }

    /// Whether the current state hashes to `fingerprint`.
    ///
    /// Components whose state cannot be serialized never match.
    pub fn matches(&self, fingerprint: &Fingerprint) -> bool {
        match self.inner.fingerprint() {
            Ok(fp) => fp == *fingerprint,
            Err(e) => {
                log::debug!("Cannot fingerprint {} ({}): {}", self.type_name(), self.id, e);
                false
            }
        }
    }

    /// Check the concrete type
    pub fn is<T: Component>(&self) -> bool {
        self.inner.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.inner.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.inner.as_any_mut().downcast_mut::<T>()
    }

    /// Unwrap into the concrete component, or `None` on a type mismatch
    pub fn into_inner<T: Component>(self) -> Option<T> {
        self.inner.into_any().downcast::<T>().ok().map(|b| *b)
    }

    pub(crate) fn update(&mut self, delta_ms: f64) {
        self.inner.tick(delta_ms);
    }

    pub(crate) fn attach_to(&mut self, owner: EntityId) {
        self.owner = Some(owner);
        self.inner.attached(owner);
    }

    pub(crate) fn detach(&mut self) {
        self.owner = None;
        self.inner.detached();
    }
}

impl std::fmt::Debug for Attached {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attached")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .field("type", &self.short_type_name())
            .finish()
    }
}
