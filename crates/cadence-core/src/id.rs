//! Stable entity and component identifiers

use crate::error::{CadenceError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for entity IDs
static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);

/// Global counter for component IDs
static NEXT_COMPONENT_ID: AtomicU64 = AtomicU64::new(1);

macro_rules! stable_id {
    ($(#[$meta:meta])* $name:ident, $counter:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Allocate a new unique id
            pub fn new() -> Self {
                Self($counter.fetch_add(1, Ordering::Relaxed))
            }

            /// Create an id from a raw value (for deserialization/testing)
            pub fn from_raw(id: u64) -> Self {
                Self(id)
            }

            /// Get the raw u64 value
            pub fn raw(&self) -> u64 {
                self.0
            }

            /// Move the counter past `value` so later allocations cannot collide with it.
            ///
            /// Fails without touching the counter when `value` is the largest
            /// representable id.
            pub fn ensure_counter_above(value: u64) -> Result<()> {
                let next = value.checked_add(1).ok_or_else(|| {
                    CadenceError::InvalidConfig(format!(
                        "{} {} leaves no room for further ids",
                        stringify!($name),
                        value
                    ))
                })?;
                let mut current = $counter.load(Ordering::Relaxed);
                while current <= value {
                    match $counter.compare_exchange_weak(
                        current,
                        next,
                        Ordering::Relaxed,
                        Ordering::Relaxed,
                    ) {
                        Ok(_) => break,
                        Err(c) => current = c,
                    }
                }
                Ok(())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

stable_id!(
    /// A stable entity identifier.
    ///
    /// Unlike the storage slot an entity occupies inside the world, which may
    /// be recycled after despawn, an `EntityId` is never reused within a process.
    EntityId,
    NEXT_ENTITY_ID
);

stable_id!(
    /// A stable identifier for one attached component instance.
    ///
    /// Assigned when the component is attached and independent of the
    /// component's field values, so it survives mutation.
    ComponentId,
    NEXT_COMPONENT_ID
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_generation() {
        let id1 = EntityId::new();
        let id2 = EntityId::new();
        assert_ne!(id1, id2);
        assert!(id2.0 > id1.0);
    }

    #[test]
    fn test_counters_are_independent() {
        let e = EntityId::new();
        let c1 = ComponentId::new();
        let e2 = EntityId::new();
        let c2 = ComponentId::new();
        assert!(e2.raw() > e.raw());
        assert!(c2.raw() > c1.raw());
    }

    #[test]
    fn test_from_raw() {
        let id = ComponentId::from_raw(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(format!("{:?}", id), "ComponentId(42)");
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_ensure_counter_above() {
        EntityId::ensure_counter_above(100_000).unwrap();
        let id = EntityId::new();
        assert!(id.0 > 100_000);
    }

    #[test]
    fn test_ensure_counter_above_max_is_rejected() {
        let before = ComponentId::new();
        assert!(matches!(
            ComponentId::ensure_counter_above(u64::MAX),
            Err(CadenceError::InvalidConfig(_))
        ));
        assert!(ComponentId::new().raw() > before.raw());
    }
}
