//! Overlay draw pass
//!
//! Consumes frame snapshots and composites particles plus the circular
//! minimap into a software surface. Draw order per frame: clear, particles
//! (additive), minimap. The minimap clip mask and background gradient are
//! memoized and rebuilt only on init/resize.

use std::f32::consts::{FRAC_PI_4, TAU};

use crate::Rgba;

use super::frame::{HotspotVariant, MinimapFrame, OverlayFrame, OverlayMessage};
use super::surface::{MapMask, Surface};

const MAP_BACKGROUND: Rgba = [8, 12, 20, 255];
const MAP_RING: Rgba = [90, 110, 140, 255];
const MAP_LABEL: Rgba = [150, 170, 200, 255];
const PLAYER_COLOR: Rgba = [255, 255, 255, 255];
/// Minimap radius as a fraction of the shorter surface edge
const MAP_RADIUS_FRACTION: f32 = 0.16;
const MAP_MARGIN: f32 = 12.0;

/// Stateful painter owned by the render thread
pub struct OverlayPainter {
    surface: Surface,
    mask: Option<MapMask>,
    warned_uninitialized: bool,
}

impl Default for OverlayPainter {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayPainter {
    pub fn new() -> Self {
        Self {
            surface: Surface::new(0, 0),
            mask: None,
            warned_uninitialized: false,
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Apply one message from the host channel
    pub fn handle(&mut self, message: OverlayMessage) {
        match message {
            OverlayMessage::Init { width, height } | OverlayMessage::Resize { width, height } => {
                self.surface.resize(width, height);
                self.mask = Some(Self::build_mask(width, height));
            }
            OverlayMessage::Frame(frame) => self.render(&frame),
        }
    }

    fn build_mask(width: u32, height: u32) -> MapMask {
        let radius = (width.min(height) as f32 * MAP_RADIUS_FRACTION).max(8.0);
        let center_x = width as f32 - radius - MAP_MARGIN;
        let center_y = radius + MAP_MARGIN;
        MapMask::build(center_x, center_y, radius)
    }

    /// Full redraw from one snapshot
    pub fn render(&mut self, frame: &OverlayFrame) {
        let Some(mask) = self.mask.take() else {
            // No drawing surface bound; degrade silently
            if !self.warned_uninitialized {
                log::warn!("overlay frame received before init - dropping frames");
                self.warned_uninitialized = true;
            }
            return;
        };

        self.surface.clear([0, 0, 0, 0]);

        for particle in &frame.particles {
            let alpha = particle.life.clamp(0.0, 1.0);
            self.surface.fill_circle(
                particle.x,
                particle.y,
                particle.size / 2.0,
                particle.color,
                alpha,
                true,
            );
        }

        let map = &frame.minimap;
        if map.opacity > 0.0 && map.detail_level > 0 {
            self.render_minimap(map, &mask);
        }
        self.mask = Some(mask);
    }

    fn render_minimap(&mut self, map: &MinimapFrame, mask: &MapMask) {
        let opacity = map.opacity.clamp(0.0, 1.0);
        let r = mask.radius;
        let cx = mask.center_x;
        let cy = mask.center_y;

        // Background through the memoized gradient
        let min_x = (cx - r).floor() as i32;
        let max_x = (cx + r).ceil() as i32;
        let min_y = (cy - r).floor() as i32;
        let max_y = (cy + r).ceil() as i32;
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let g = mask.gradient_at(x, y);
                if g > 0.0 {
                    self.surface
                        .blend_pixel(x, y, MAP_BACKGROUND, g * opacity, false);
                }
            }
        }
        self.surface.stroke_circle(cx, cy, r, MAP_RING, opacity);

        // Per-axis world scale; entities keep relative size via the larger axis
        let scale_x = (r * 2.0) / map.world_width.max(1.0);
        let scale_y = (r * 2.0) / map.world_height.max(1.0);
        let entity_scale = scale_x.max(scale_y);
        let project = |e_x: f32, e_y: f32| {
            (cx - r + e_x * scale_x, cy - r + e_y * scale_y)
        };

        if map.detail_level >= 2 {
            // Grid diagonals, clipped against the mask
            for quarter in 0..4u32 {
                let theta = FRAC_PI_4 + quarter as f32 * (TAU / 4.0);
                self.draw_clipped_ray(mask, cx, cy, theta, r, MAP_RING, opacity * 0.4);
            }
            // Extra concentric rings
            self.surface
                .stroke_circle(cx, cy, r * 0.66, MAP_RING, opacity * 0.5);
            self.surface
                .stroke_circle(cx, cy, r * 0.33, MAP_RING, opacity * 0.5);
        }

        // Detail >= 1: enemies and bosses
        for enemy in &map.enemies {
            let (x, y) = project(enemy.x, enemy.y);
            if mask.contains(x as i32, y as i32) {
                let radius = (enemy.radius * entity_scale).max(1.5);
                self.surface
                    .fill_circle(x, y, radius, enemy.color, opacity, false);
            }
        }
        for boss in &map.bosses {
            let (x, y) = project(boss.x, boss.y);
            if mask.contains(x as i32, y as i32) {
                self.draw_boss_glyph(x, y, (boss.radius * entity_scale).max(3.0), boss.color, opacity);
            }
        }

        if map.detail_level >= 2 {
            for drop in &map.drops {
                let (x, y) = project(drop.x, drop.y);
                if mask.contains(x as i32, y as i32) {
                    self.surface.fill_circle(x, y, 1.5, drop.color, opacity, false);
                }
            }
            for portal in &map.portals {
                let (x, y) = project(portal.x, portal.y);
                if mask.contains(x as i32, y as i32) {
                    let radius = (portal.radius * entity_scale).max(2.5);
                    self.surface.stroke_circle(x, y, radius, portal.color, opacity);
                }
            }
            for hotspot in &map.hotspots {
                let (x, y) = project(hotspot.x, hotspot.y);
                if mask.contains(x as i32, y as i32) {
                    self.draw_hotspot(hotspot.variant, x, y, hotspot.color, hotspot.pulse, opacity);
                }
            }

            self.draw_heading_arrow(mask, map, cx, cy, r, scale_x, scale_y, opacity);
            self.draw_cardinal_labels(mask, cx, cy, r, opacity);
        }

        // Player marker on top
        let (px, py) = project(map.player.x, map.player.y);
        self.surface.fill_circle(px, py, 2.0, PLAYER_COLOR, opacity, false);
    }

    fn draw_clipped_ray(
        &mut self,
        mask: &MapMask,
        cx: f32,
        cy: f32,
        theta: f32,
        length: f32,
        color: Rgba,
        alpha: f32,
    ) {
        let steps = length.ceil() as u32;
        for i in 0..steps {
            let t = i as f32;
            let x = (cx + theta.cos() * t).round() as i32;
            let y = (cy + theta.sin() * t).round() as i32;
            if mask.contains(x, y) {
                self.surface.blend_pixel(x, y, color, alpha, false);
            }
        }
    }

    /// Line segment confined to the circular viewport
    fn draw_clipped_line(
        &mut self,
        mask: &MapMask,
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        color: Rgba,
        alpha: f32,
    ) {
        let dx = x1 - x0;
        let dy = y1 - y0;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as u32;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = (x0 + dx * t).round() as i32;
            let y = (y0 + dy * t).round() as i32;
            if mask.contains(x, y) {
                self.surface.blend_pixel(x, y, color, alpha, false);
            }
        }
    }

    /// Bosses draw as a cross with a diamond halo, regular enemies as dots -
    /// the shapes are not contractual but the distinction is
    fn draw_boss_glyph(&mut self, x: f32, y: f32, size: f32, color: Rgba, alpha: f32) {
        self.surface.draw_line(x - size, y, x + size, y, color, alpha);
        self.surface.draw_line(x, y - size, x, y + size, color, alpha);
        let halo = size * 1.6;
        let points = [
            (x, y - halo),
            (x + halo, y),
            (x, y + halo),
            (x - halo, y),
        ];
        for i in 0..4 {
            let (x0, y0) = points[i];
            let (x1, y1) = points[(i + 1) % 4];
            self.surface.draw_line(x0, y0, x1, y1, color, alpha * 0.7);
        }
    }

    fn draw_hotspot(
        &mut self,
        variant: HotspotVariant,
        x: f32,
        y: f32,
        color: Rgba,
        pulse: f32,
        opacity: f32,
    ) {
        let alpha = (0.4 + 0.6 * pulse.clamp(0.0, 1.0)) * opacity;
        match variant {
            HotspotVariant::Objective => {
                self.surface.stroke_circle(x, y, 3.5, color, alpha);
                self.surface.fill_circle(x, y, 1.0, color, alpha, false);
            }
            HotspotVariant::Danger => {
                self.surface.fill_triangle(
                    (x, y - 4.0),
                    (x + 3.5, y + 3.0),
                    (x - 3.5, y + 3.0),
                    color,
                    alpha,
                );
            }
            HotspotVariant::Radioactive => {
                // Narrow point-down triangle
                self.surface.fill_triangle(
                    (x - 3.0, y - 3.0),
                    (x + 3.0, y - 3.0),
                    (x, y + 4.5),
                    color,
                    alpha,
                );
            }
        }
    }

    /// The player can sit on the rim, so the arrow is clipped like the grid
    fn draw_heading_arrow(
        &mut self,
        mask: &MapMask,
        map: &MinimapFrame,
        cx: f32,
        cy: f32,
        r: f32,
        scale_x: f32,
        scale_y: f32,
        opacity: f32,
    ) {
        let px = cx - r + map.player.x * scale_x;
        let py = cy - r + map.player.y * scale_y;
        let heading = map.player_heading;
        let len = r * 0.35;
        let tip_x = px + heading.cos() * len;
        let tip_y = py + heading.sin() * len;
        self.draw_clipped_line(mask, px, py, tip_x, tip_y, PLAYER_COLOR, opacity * 0.8);
        for side in [-1.0f32, 1.0] {
            let back = heading + std::f32::consts::PI + side * 0.5;
            self.draw_clipped_line(
                mask,
                tip_x,
                tip_y,
                tip_x + back.cos() * 4.0,
                tip_y + back.sin() * 4.0,
                PLAYER_COLOR,
                opacity * 0.8,
            );
        }
    }

    fn draw_cardinal_labels(&mut self, mask: &MapMask, cx: f32, cy: f32, r: f32, opacity: f32) {
        let inset = 6.0;
        self.draw_glyph(mask, 'N', cx, cy - r + inset, opacity);
        self.draw_glyph(mask, 'E', cx + r - inset, cy, opacity);
        self.draw_glyph(mask, 'S', cx, cy + r - inset, opacity);
        self.draw_glyph(mask, 'W', cx - r + inset, cy, opacity);
    }

    /// 3x5 bitmap glyphs for the four cardinal letters
    fn draw_glyph(&mut self, mask: &MapMask, letter: char, cx: f32, cy: f32, alpha: f32) {
        let rows: [u8; 5] = match letter {
            'N' => [0b101, 0b111, 0b111, 0b101, 0b101],
            'E' => [0b111, 0b100, 0b110, 0b100, 0b111],
            'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
            'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
            _ => return,
        };
        let x0 = cx as i32 - 1;
        let y0 = cy as i32 - 2;
        for (dy, row) in rows.iter().enumerate() {
            for dx in 0..3 {
                if row & (0b100 >> dx) != 0 && mask.contains(x0 + dx, y0 + dy as i32) {
                    self.surface
                        .blend_pixel(x0 + dx, y0 + dy as i32, MAP_LABEL, alpha, false);
                }
            }
        }
    }
}
