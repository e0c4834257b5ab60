//! Procedural sprite textures.
//!
//! All generators are pure functions of their arguments.

use image::{Rgba, RgbaImage};

/// One colour stop of a radial gradient. `offset` runs from the centre (0)
/// to the edge of the inscribed circle (1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: [u8; 3],
    pub alpha: f32,
}

impl GradientStop {
    pub const fn new(offset: f32, color: [u8; 3], alpha: f32) -> Self {
        Self {
            offset,
            color,
            alpha,
        }
    }
}

/// Soft gold glow used by the dust motes.
pub const DUST_GLOW: [GradientStop; 4] = [
    GradientStop::new(0.0, [255, 255, 255], 1.0),
    GradientStop::new(0.2, [255, 240, 200], 0.9),
    GradientStop::new(0.5, [255, 215, 0], 0.3),
    GradientStop::new(1.0, [0, 0, 0], 0.0),
];

/// Brighter, tighter glow used by the spiral beads.
pub const SPIRAL_GLOW: [GradientStop; 4] = [
    GradientStop::new(0.0, [255, 255, 255], 1.0),
    GradientStop::new(0.3, [255, 240, 150], 1.0),
    GradientStop::new(0.6, [255, 215, 0], 0.5),
    GradientStop::new(1.0, [0, 0, 0], 0.0),
];

/// Colour and alpha of a gradient at offset `t`, linearly interpolated
/// between the surrounding stops and clamped at the ends.
pub fn sample_gradient(stops: &[GradientStop], t: f32) -> ([f32; 3], f32) {
    let Some(first) = stops.first() else {
        return ([0.0; 3], 0.0);
    };
    let to_f = |c: [u8; 3]| c.map(f32::from);
    if t <= first.offset {
        return (to_f(first.color), first.alpha);
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = (b.offset - a.offset).max(f32::EPSILON);
            let k = (t - a.offset) / span;
            let (ca, cb) = (to_f(a.color), to_f(b.color));
            let color = [0, 1, 2].map(|i| ca[i] + (cb[i] - ca[i]) * k);
            return (color, a.alpha + (b.alpha - a.alpha) * k);
        }
    }
    let last = stops[stops.len() - 1];
    (to_f(last.color), last.alpha)
}

/// Square radial-gradient sprite of side `size`.
pub fn radial_glow(size: u32, stops: &[GradientStop]) -> RgbaImage {
    let half = size as f32 / 2.0;
    RgbaImage::from_fn(size, size, |x, y| {
        let dx = x as f32 + 0.5 - half;
        let dy = y as f32 + 0.5 - half;
        let t = (dx * dx + dy * dy).sqrt() / half;
        let (color, alpha) = sample_gradient(stops, t);
        Rgba([
            color[0].round() as u8,
            color[1].round() as u8,
            color[2].round() as u8,
            (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
        ])
    })
}

/// Solid white disc of radius `radius` centred in a transparent square.
pub fn disc_sprite(size: u32, radius: f32) -> RgbaImage {
    let half = size as f32 / 2.0;
    RgbaImage::from_fn(size, size, |x, y| {
        let dx = x as f32 + 0.5 - half;
        let dy = y as f32 + 0.5 - half;
        if dx * dx + dy * dy <= radius * radius {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

/// Sprite the needles are drawn with.
pub fn needle_sprite() -> RgbaImage {
    disc_sprite(64, 28.0)
}

pub fn dust_sprite() -> RgbaImage {
    radial_glow(32, &DUST_GLOW)
}

pub fn spiral_sprite() -> RgbaImage {
    radial_glow(32, &SPIRAL_GLOW)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_endpoints() {
        let (c, a) = sample_gradient(&DUST_GLOW, 0.0);
        assert_eq!(c, [255.0, 255.0, 255.0]);
        assert_eq!(a, 1.0);
        let (_, a) = sample_gradient(&DUST_GLOW, 2.0);
        assert_eq!(a, 0.0);
        let (_, a) = sample_gradient(&DUST_GLOW, 0.35);
        assert!((a - 0.6).abs() < 1e-5);
    }

    #[test]
    fn test_glow_bright_centre_clear_corners() {
        let img = spiral_sprite();
        assert_eq!(img.dimensions(), (32, 32));
        assert!(img.get_pixel(16, 16)[3] > 240);
        assert_eq!(img.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_disc_sprite_is_deterministic() {
        let a = needle_sprite();
        let b = needle_sprite();
        assert_eq!(a.as_raw(), b.as_raw());
        assert_eq!(a.get_pixel(32, 32)[3], 255);
        assert_eq!(a.get_pixel(1, 1)[3], 0);
    }
}
