//! Off-thread particle and minimap overlay renderer
//!
//! The simulation thread posts immutable frame snapshots; a dedicated render
//! thread composites them into a software RGBA surface. Snapshots are copied
//! by value across the channel - no shared mutable state, no locks held
//! while drawing, and no backpressure: if the renderer falls behind, pending
//! frames are overwritten by the newest one.

pub mod draw;
pub mod frame;
pub mod surface;
pub mod worker;

pub use draw::OverlayPainter;
pub use frame::{
    HotspotVariant, MapEntity, MapHotspot, MinimapFrame, OverlayFrame, OverlayMessage,
    OverlayParticle,
};
pub use surface::Surface;
pub use worker::{OverlayHandle, spawn_overlay_renderer};
