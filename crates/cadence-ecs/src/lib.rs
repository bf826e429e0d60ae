//! Cadence ECS - Entities holding ordered, queryable components
//!
//! This crate wraps hecs with stable entity identifiers. Each entity owns an
//! ordered list of polymorphic components that systems can query by type,
//! by stable `ComponentId`, or by content `Fingerprint`.

mod component;
mod entity;
mod world;

pub use component::{Attached, Component};
pub use entity::{Entity, EntityInfo};
pub use world::World;
