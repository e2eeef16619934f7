//! Frame snapshot types crossing the renderer boundary
//!
//! Everything here is passed by value (cloned, never shared by reference)
//! from the simulation thread to the render thread.

use serde::{Deserialize, Serialize};

use crate::Rgba;

/// A visual particle; `life` is the remaining life fraction and drives alpha
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayParticle {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub life: f32,
    pub color: Rgba,
}

/// One entity projected onto the minimap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapEntity {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: Rgba,
}

impl MapEntity {
    pub fn at(x: f32, y: f32, radius: f32, color: Rgba) -> Self {
        Self { x, y, radius, color }
    }
}

/// Hotspot icon variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HotspotVariant {
    Objective,
    Danger,
    Radioactive,
}

/// A map hotspot; `pulse` is an externally supplied animation phase in
/// [0, 1] - the renderer never computes it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapHotspot {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: Rgba,
    pub variant: HotspotVariant,
    pub pulse: f32,
}

/// Minimap portion of a frame snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimapFrame {
    pub world_width: f32,
    pub world_height: f32,
    pub player: MapEntity,
    pub enemies: Vec<MapEntity>,
    pub bosses: Vec<MapEntity>,
    pub drops: Vec<MapEntity>,
    pub hotspots: Vec<MapHotspot>,
    pub portals: Vec<MapEntity>,
    /// Player heading in radians
    pub player_heading: f32,
    /// 0 = hidden, 1 = enemies/bosses only, 2 = full detail
    pub detail_level: u8,
    pub opacity: f32,
}

impl MinimapFrame {
    /// An empty map for a world of the given size
    pub fn empty(world_width: f32, world_height: f32) -> Self {
        Self {
            world_width,
            world_height,
            player: MapEntity {
                x: world_width / 2.0,
                y: world_height / 2.0,
                radius: 10.0,
                color: [255, 255, 255, 255],
            },
            enemies: Vec::new(),
            bosses: Vec::new(),
            drops: Vec::new(),
            hotspots: Vec::new(),
            portals: Vec::new(),
            player_heading: 0.0,
            detail_level: 2,
            opacity: 1.0,
        }
    }
}

/// One full frame snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayFrame {
    pub width: u32,
    pub height: u32,
    pub particles: Vec<OverlayParticle>,
    pub minimap: MinimapFrame,
}

/// Messages on the host -> renderer channel. Unidirectional; no replies.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayMessage {
    Init { width: u32, height: u32 },
    Resize { width: u32, height: u32 },
    Frame(Box<OverlayFrame>),
}
