//! # Brand Mark
//!
//! The logo drawn in the label header and, faded, as the watermark. It is a
//! five-pointed star generated from geometry, so every backend can draw it at
//! any size without an asset file.
//!
//! Coordinates are unit-square: `(0, 0)` is the top-left of the mark's box
//! and `(1, 1)` the bottom-right.

use std::f32::consts::{PI, TAU};

const POINTS: usize = 5;
const OUTER_RADIUS: f32 = 0.5 * 0.95;
/// Golden ratio approximation
const INNER_RATIO: f32 = 0.382;

/// Whether the unit-square point `(u, v)` is inside the mark.
pub fn covers(u: f32, v: f32) -> bool {
    inside_star(u - 0.5, v - 0.5, OUTER_RADIUS, OUTER_RADIUS * INNER_RATIO)
}

/// Outline vertices, clockwise from the top point, in unit-square coordinates.
pub fn outline() -> Vec<(f32, f32)> {
    let inner = OUTER_RADIUS * INNER_RATIO;
    (0..POINTS * 2)
        .map(|i| {
            let radius = if i % 2 == 0 { OUTER_RADIUS } else { inner };
            let angle = -PI / 2.0 + i as f32 * TAU / (POINTS * 2) as f32;
            (0.5 + radius * angle.cos(), 0.5 + radius * angle.sin())
        })
        .collect()
}

/// SVG `points` attribute for the outline scaled into `(x, y, size)`.
pub fn svg_points(x: f32, y: f32, size: f32) -> String {
    outline()
        .iter()
        .map(|(u, v)| format!("{:.3},{:.3}", x + u * size, y + v * size))
        .collect::<Vec<_>>()
        .join(" ")
}

/// The edge radius is interpolated linearly between the outer points and
/// inner valleys of each sector.
fn inside_star(dx: f32, dy: f32, outer_r: f32, inner_r: f32) -> bool {
    let dist = (dx * dx + dy * dy).sqrt();
    if dist > outer_r {
        return false;
    }

    let sector = TAU / POINTS as f32;
    // 0 at the top point, clockwise
    let adjusted = (dy.atan2(dx) + PI / 2.0).rem_euclid(TAU);
    let local = adjusted.rem_euclid(sector);

    let half = sector / 2.0;
    let edge = if local < half {
        let t = local / half;
        outer_r * (1.0 - t) + inner_r * t
    } else {
        let t = (local - half) / half;
        inner_r * (1.0 - t) + outer_r * t
    };

    dist <= edge
}
