//! The bridge between scene models and a live-object runtime.
//!
//! Two directions:
//!
//! - **Scene to runtime**: [`to_wire`] renders the `{"results":[...]}` JSON
//!   the runtime loads.
//! - **Runtime to scene**: [`WorldBridge::from_world`] walks every entity
//!   through the [`Runtime`] trait and rebuilds component values from raw
//!   bytes using the layouts in a [`TypeRegistry`].
//!
//! [`MemoryWorld`] is an in-process runtime that loads wire documents, used
//! to check that meaning survives a trip through the wire format.

/// Scene/runtime translation.
pub mod bridge;
/// Bridge error type.
pub mod error;
/// In-process reference runtime.
pub mod memory;
/// Type layouts and byte cursors.
pub mod reflect;
/// The runtime capability trait.
pub mod runtime;
/// Wire document model.
pub mod wire;

pub use bridge::{BridgeOptions, MAX_DEPTH_SENTINEL, WorldBridge};
pub use error::{BridgeError, BridgeResult};
pub use memory::MemoryWorld;
pub use reflect::{Cursor, PrimitiveKind, TypeId, TypeLayout, TypeRegistry};
pub use runtime::{ComponentRef, EntityId, Runtime};
pub use wire::{WireDocument, WirePairs, WireRecord, parse_wire, to_wire};
