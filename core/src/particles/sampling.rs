//! Deterministic sampling of chaos and target positions.
//!
//! Every sampler draws from a caller-owned seeded RNG so a scene built twice
//! with the same seed lays out identically.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seeded RNG for one subsystem. Mixing in a per-subsystem salt keeps the
/// subsystems from sharing a random stream.
pub fn subsystem_rng(seed: u64, salt: u64) -> StdRng {
    StdRng::seed_from_u64(seed ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Uniform point inside a ball.
pub fn point_in_sphere<R: Rng>(rng: &mut R, radius: f32) -> Vec3 {
    let theta = TAU * rng.gen::<f32>();
    let phi = (2.0 * rng.gen::<f32>() - 1.0).acos();
    let r = rng.gen::<f32>().cbrt() * radius;
    let sin_phi = phi.sin();
    Vec3::new(
        r * sin_phi * theta.cos(),
        r * sin_phi * theta.sin(),
        r * phi.cos(),
    )
}

/// Point in a spherical shell between `inner` and `outer` radius.
///
/// Radius is drawn linearly, not by volume, so the inner surface is denser.
pub fn point_in_shell<R: Rng>(rng: &mut R, inner: f32, outer: f32) -> Vec3 {
    let r = inner + rng.gen::<f32>() * (outer - inner);
    let theta = TAU * rng.gen::<f32>();
    let phi = (2.0 * rng.gen::<f32>() - 1.0).acos();
    Vec3::new(
        r * phi.sin() * theta.cos(),
        r * phi.sin() * theta.sin(),
        r * phi.cos(),
    )
}

/// Point in a tiered pine silhouette: an overall cone with `tiers` flared
/// skirts.
pub fn point_in_pine_tree<R: Rng>(rng: &mut R, height: f32, max_radius: f32, tiers: u32) -> Vec3 {
    let h = rng.gen::<f32>();
    let y = (h - 0.2) * height;
    let taper = 1.0 - h;
    let tier_progress = (h * tiers as f32).fract();
    let flare = 1.0 - tier_progress;
    let radius = max_radius * (taper * 0.7 + flare * 0.3 * taper);
    let r = rng.gen::<f32>().sqrt() * radius;
    let angle = rng.gen::<f32>() * TAU;
    Vec3::new(angle.cos() * r, y, angle.sin() * r)
}

/// Uniform point on a flat disc in the xz plane.
pub fn point_in_disc<R: Rng>(rng: &mut R, radius: f32) -> Vec3 {
    let r = rng.gen::<f32>().sqrt() * radius;
    let theta = rng.gen::<f32>() * TAU;
    Vec3::new(r * theta.cos(), 0.0, r * theta.sin())
}

/// Uniform point in an axis-aligned box centred on the origin.
pub fn point_in_box<R: Rng>(rng: &mut R, size: Vec3) -> Vec3 {
    Vec3::new(
        (rng.gen::<f32>() - 0.5) * size.x,
        (rng.gen::<f32>() - 0.5) * size.y,
        (rng.gen::<f32>() - 0.5) * size.z,
    )
}

/// Random phase in [0, 2π).
pub fn phase<R: Rng>(rng: &mut R) -> f32 {
    rng.gen::<f32>() * 2.0 * PI
}
