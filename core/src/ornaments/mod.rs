//! Tree ornaments.
//!
//! Ornaments are drawn as one instanced mesh per kind (one per texture for
//! photo ornaments). The kind of every slot is fixed when the set is built;
//! each frame only recomputes slot transforms.

pub mod focus;

pub use focus::{FocusConfig, FocusController, FocusView};

use std::f32::consts::TAU;

use glam::{Mat4, Quat, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::gesture::TreeState;
use crate::particles::sampling::{phase, point_in_pine_tree, point_in_sphere, subsystem_rng};
use crate::particles::{lerp, smoothstep, FrameInput, Progress};
use crate::render::InstanceRaw;

const SALT: u64 = 0x6f72_6e61;

fn rgb(hex: u32) -> [f32; 4] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
        1.0,
    ]
}

/// Ornament kind. Only photo ornaments carry a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrnamentKind {
    Sphere,
    Box,
    Gem,
    UserPhoto { texture_index: usize },
    Heptagram,
}

impl OrnamentKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sphere => "sphere",
            Self::Box => "box",
            Self::Gem => "gem",
            Self::UserPhoto { .. } => "photo",
            Self::Heptagram => "heptagram",
        }
    }

    /// Stars hold still: no bob, no breathing, no self-rotation.
    pub fn is_fixed(&self) -> bool {
        matches!(self, Self::Heptagram)
    }

    pub fn is_photo(&self) -> bool {
        matches!(self, Self::UserPhoto { .. })
    }

    fn scale_multiplier(&self) -> f32 {
        match self {
            Self::Sphere => 1.0,
            Self::Box | Self::Gem => 0.8,
            Self::UserPhoto { .. } => 1.5,
            Self::Heptagram => 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrnamentConfig {
    pub count: usize,
    pub tree_height: f32,
    pub tree_radius: f32,
    pub tree_tiers: u32,
    pub chaos_radius: f32,
    pub rate: f32,
    /// Draws above this become photo ornaments when photos exist.
    pub photo_threshold: f32,
    pub heptagram_threshold: f32,
    pub sphere_threshold: f32,
    pub box_threshold: f32,
    pub base_scale_min: f32,
    pub base_scale_range: f32,
    /// Fraction of non-photo ornaments visible regardless of progress.
    pub always_visible_fraction: f32,
    /// Tree-wide scale once fully formed.
    pub formed_scale: f32,
    pub shimmer_threshold: f32,
    pub bob_threshold: f32,
}

impl Default for OrnamentConfig {
    fn default() -> Self {
        Self {
            count: 650,
            tree_height: 19.0,
            tree_radius: 9.0 * 0.95,
            tree_tiers: 9,
            chaos_radius: 18.0 * 0.975,
            rate: 4.0,
            photo_threshold: 0.85,
            heptagram_threshold: 0.15,
            sphere_threshold: 0.5,
            box_threshold: 0.75,
            base_scale_min: 0.45,
            base_scale_range: 0.35,
            always_visible_fraction: 0.4,
            formed_scale: 0.72,
            shimmer_threshold: 0.1,
            bob_threshold: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ornament {
    pub kind: OrnamentKind,
    pub chaos: Vec3,
    pub target: Vec3,
    pub color: [f32; 4],
    pub base_scale: f32,
    /// Slot within the ornament's instanced mesh.
    pub local_index: usize,
    pub phase: f32,
    pub rotation_axis: Vec3,
    /// Radians per second about `rotation_axis`.
    pub rotation_speed: f32,
    pub always_visible: bool,
}

impl Ornament {
    /// Progress-interpolated position, without any per-frame modulation.
    #[inline]
    pub fn base_position(&self, progress: f32) -> Vec3 {
        self.chaos * (1.0 - progress) + self.target * progress
    }
}

/// Number of ornaments of each kind; fixed for the life of a set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KindCounts {
    pub spheres: usize,
    pub boxes: usize,
    pub gems: usize,
    pub heptagrams: usize,
    /// One entry per photo texture.
    pub photos: Vec<usize>,
}

impl KindCounts {
    pub fn total(&self) -> usize {
        self.spheres + self.boxes + self.gems + self.heptagrams + self.photos.iter().sum::<usize>()
    }

    /// Allocate the next slot for `kind` and return its index.
    fn claim(&mut self, kind: OrnamentKind) -> usize {
        let counter = match kind {
            OrnamentKind::Sphere => &mut self.spheres,
            OrnamentKind::Box => &mut self.boxes,
            OrnamentKind::Gem => &mut self.gems,
            OrnamentKind::Heptagram => &mut self.heptagrams,
            OrnamentKind::UserPhoto { texture_index } => &mut self.photos[texture_index],
        };
        *counter += 1;
        *counter - 1
    }
}

/// Per-kind instance buffers, sized by [`KindCounts`].
#[derive(Debug, Clone, Default)]
pub struct InstanceBuffers {
    pub spheres: Vec<InstanceRaw>,
    pub boxes: Vec<InstanceRaw>,
    pub gems: Vec<InstanceRaw>,
    pub heptagrams: Vec<InstanceRaw>,
    pub photos: Vec<Vec<InstanceRaw>>,
}

impl InstanceBuffers {
    fn with_counts(counts: &KindCounts) -> Self {
        Self {
            spheres: vec![InstanceRaw::hidden(); counts.spheres],
            boxes: vec![InstanceRaw::hidden(); counts.boxes],
            gems: vec![InstanceRaw::hidden(); counts.gems],
            heptagrams: vec![InstanceRaw::hidden(); counts.heptagrams],
            photos: counts
                .photos
                .iter()
                .map(|&n| vec![InstanceRaw::hidden(); n])
                .collect(),
        }
    }

    pub fn slot(&self, kind: OrnamentKind, local_index: usize) -> Option<&InstanceRaw> {
        match kind {
            OrnamentKind::Sphere => self.spheres.get(local_index),
            OrnamentKind::Box => self.boxes.get(local_index),
            OrnamentKind::Gem => self.gems.get(local_index),
            OrnamentKind::Heptagram => self.heptagrams.get(local_index),
            OrnamentKind::UserPhoto { texture_index } => {
                self.photos.get(texture_index)?.get(local_index)
            }
        }
    }

    fn slot_mut(&mut self, kind: OrnamentKind, local_index: usize) -> Option<&mut InstanceRaw> {
        match kind {
            OrnamentKind::Sphere => self.spheres.get_mut(local_index),
            OrnamentKind::Box => self.boxes.get_mut(local_index),
            OrnamentKind::Gem => self.gems.get_mut(local_index),
            OrnamentKind::Heptagram => self.heptagrams.get_mut(local_index),
            OrnamentKind::UserPhoto { texture_index } => {
                self.photos.get_mut(texture_index)?.get_mut(local_index)
            }
        }
    }
}

/// Decomposed ornament transform in the tree group's frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Placement {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

pub struct OrnamentSet {
    config: OrnamentConfig,
    ornaments: Vec<Ornament>,
    counts: KindCounts,
    buffers: InstanceBuffers,
    progress: Progress,
}

impl OrnamentSet {
    /// Build `config.count` ornaments. Photo ornaments only appear when
    /// `photo_count > 0`.
    pub fn build(config: OrnamentConfig, photo_count: usize, seed: u64) -> Self {
        let mut rng = subsystem_rng(seed, SALT ^ photo_count as u64);
        let mut counts = KindCounts {
            photos: vec![0; photo_count],
            ..Default::default()
        };
        let box_colors = [rgb(0x8B0000), rgb(0xFFFFFF), rgb(0xD4AF37)];
        let gem_colors = [rgb(0xFFFFFF), rgb(0xE0FFFF)];
        let mut ornaments = Vec::with_capacity(config.count);

        for _ in 0..config.count {
            let target =
                point_in_pine_tree(&mut rng, config.tree_height, config.tree_radius, config.tree_tiers);
            let chaos = point_in_sphere(&mut rng, config.chaos_radius);

            let draw: f32 = rng.gen();
            let kind = if photo_count > 0 && draw > config.photo_threshold {
                OrnamentKind::UserPhoto {
                    texture_index: rng.gen_range(0..photo_count),
                }
            } else if draw < config.heptagram_threshold {
                OrnamentKind::Heptagram
            } else if draw < config.sphere_threshold {
                OrnamentKind::Sphere
            } else if draw < config.box_threshold {
                OrnamentKind::Box
            } else {
                OrnamentKind::Gem
            };
            let local_index = counts.claim(kind);

            let base_scale = (config.base_scale_min + rng.gen::<f32>() * config.base_scale_range)
                * kind.scale_multiplier();
            let color = match kind {
                // Alternate by running count, first sphere red.
                OrnamentKind::Sphere if counts.spheres % 2 == 0 => rgb(0xFFD700),
                OrnamentKind::Sphere => rgb(0xD40000),
                OrnamentKind::Box => box_colors[rng.gen_range(0..box_colors.len())],
                OrnamentKind::Gem => gem_colors[rng.gen_range(0..gem_colors.len())],
                OrnamentKind::Heptagram => rgb(0xCFB53B),
                OrnamentKind::UserPhoto { .. } => [1.0; 4],
            };

            let axis = Vec3::new(rng.gen(), rng.gen(), rng.gen())
                .try_normalize()
                .unwrap_or(Vec3::Y);
            let speed = (rng.gen::<f32>() - 0.5) * 2.0;
            let (rotation_axis, rotation_speed) = if kind.is_fixed() {
                (Vec3::Y, 0.0)
            } else {
                (axis, speed)
            };
            let always_visible =
                rng.gen::<f32>() > 1.0 - config.always_visible_fraction || kind.is_photo();

            ornaments.push(Ornament {
                kind,
                chaos,
                target,
                color,
                base_scale,
                local_index,
                phase: phase(&mut rng),
                rotation_axis,
                rotation_speed,
                always_visible,
            });
        }

        log::debug!(
            "Built {} ornaments: {} spheres, {} boxes, {} gems, {} heptagrams, {:?} photos",
            ornaments.len(),
            counts.spheres,
            counts.boxes,
            counts.gems,
            counts.heptagrams,
            counts.photos
        );

        let buffers = InstanceBuffers::with_counts(&counts);
        Self {
            progress: Progress::new(config.rate),
            config,
            ornaments,
            counts,
            buffers,
        }
    }

    pub fn config(&self) -> &OrnamentConfig {
        &self.config
    }

    pub fn ornaments(&self) -> &[Ornament] {
        &self.ornaments
    }

    pub fn get(&self, index: usize) -> Option<&Ornament> {
        self.ornaments.get(index)
    }

    pub fn len(&self) -> usize {
        self.ornaments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ornaments.is_empty()
    }

    pub fn counts(&self) -> &KindCounts {
        &self.counts
    }

    pub fn buffers(&self) -> &InstanceBuffers {
        &self.buffers
    }

    pub fn progress(&self) -> f32 {
        self.progress.value()
    }

    /// Indices of all photo ornaments.
    pub fn photo_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.ornaments
            .iter()
            .enumerate()
            .filter(|(_, o)| o.kind.is_photo())
            .map(|(i, _)| i)
    }

    /// Continue from an earlier set's progress so a rebuild does not replay
    /// the whole reveal.
    pub fn resume_from(&mut self, progress: f32) {
        self.progress = Progress::starting_at(self.config.rate, progress);
    }

    pub fn advance(&mut self, frame: &FrameInput, tree_state: TreeState) -> f32 {
        self.progress.follow(tree_state, frame.delta)
    }

    /// Tree-wide scale: ornaments shrink slightly as the tree forms.
    pub fn global_scale(&self, progress: f32) -> f32 {
        lerp(1.0, self.config.formed_scale, progress)
    }

    /// Visibility multiplier for one ornament.
    pub fn visibility(&self, ornament: &Ornament, progress: f32) -> f32 {
        if ornament.always_visible {
            1.0
        } else {
            smoothstep(0.1, 0.9, progress)
        }
    }

    /// Regular on-tree transform of ornament `index` at `time`.
    pub fn placement(&self, index: usize, time: f32) -> Option<Placement> {
        let orn = self.ornaments.get(index)?;
        let p = self.progress.value();
        let fixed = orn.kind.is_fixed();
        let mut pos = orn.base_position(p);

        if p > self.config.shimmer_threshold {
            let w = 0.05 * p;
            let ph = orn.target.x * 0.5 + orn.target.y * 0.5;
            pos.x += (time * 1.5 + ph).sin() * w;
            pos.y += (time * 1.2 + ph).cos() * w * 0.5;
            pos.z += (time * 1.8 + ph).sin() * w;
        }
        if p > self.config.bob_threshold && !fixed {
            pos.y += (time + orn.phase).sin() * 0.05;
        }

        let breathe = if fixed {
            1.0
        } else {
            1.0 + (time * 3.0 + orn.phase).sin() * 0.05
        };
        let scale = orn.base_scale * self.global_scale(p) * breathe * self.visibility(orn, p);

        let rotation = match orn.kind {
            // Face away from the trunk, then roll.
            OrnamentKind::Heptagram => {
                Quat::from_rotation_y(pos.x.atan2(pos.z)) * Quat::from_rotation_z(orn.phase)
            }
            OrnamentKind::UserPhoto { .. } => {
                Quat::from_rotation_x((time * 0.5 + orn.phase).sin() * 0.1)
                    * Quat::from_rotation_y(time * 0.2 + orn.phase)
            }
            _ => Quat::from_axis_angle(
                orn.rotation_axis,
                (time * orn.rotation_speed + orn.phase) % TAU,
            ),
        };

        Some(Placement {
            position: pos,
            rotation,
            scale: Vec3::splat(scale),
        })
    }

    /// Rewrite every instance slot. The ornament at `lifted`, if any, is
    /// drawn by the focus layer instead and its slot is hidden.
    pub fn write_instances(&mut self, time: f32, lifted: Option<usize>) {
        for index in 0..self.ornaments.len() {
            let (kind, local_index, color) = {
                let o = &self.ornaments[index];
                (o.kind, o.local_index, o.color)
            };
            let instance = if lifted == Some(index) {
                InstanceRaw::hidden()
            } else {
                match self.placement(index, time) {
                    Some(placement) => InstanceRaw::new(placement.matrix(), color),
                    None => InstanceRaw::hidden(),
                }
            };
            if let Some(slot) = self.buffers.slot_mut(kind, local_index) {
                *slot = instance;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(photos: usize) -> OrnamentSet {
        OrnamentSet::build(OrnamentConfig::default(), photos, 21)
    }

    #[test]
    fn test_counts_cover_every_slot() {
        let set = set(3);
        assert_eq!(set.counts().total(), 650);
        assert_eq!(set.counts().photos.len(), 3);
        assert!(set.counts().photos.iter().sum::<usize>() > 0);
    }

    #[test]
    fn test_no_photos_without_textures() {
        let set = set(0);
        assert!(set.photo_indices().next().is_none());
        assert!(set.counts().photos.is_empty());
    }

    #[test]
    fn test_local_indices_are_dense_per_kind() {
        let set = set(2);
        let mut spheres: Vec<usize> = set
            .ornaments()
            .iter()
            .filter(|o| o.kind == OrnamentKind::Sphere)
            .map(|o| o.local_index)
            .collect();
        spheres.sort_unstable();
        assert_eq!(spheres, (0..set.counts().spheres).collect::<Vec<_>>());
    }

    #[test]
    fn test_spheres_alternate_red_and_gold() {
        let set = set(0);
        let colors: Vec<[f32; 4]> = set
            .ornaments()
            .iter()
            .filter(|o| o.kind == OrnamentKind::Sphere)
            .map(|o| o.color)
            .take(2)
            .collect();
        assert_eq!(colors[0], rgb(0xD40000));
        assert_eq!(colors[1], rgb(0xFFD700));
    }

    #[test]
    fn test_photos_always_visible_and_stars_fixed() {
        let set = set(4);
        for o in set.ornaments() {
            if o.kind.is_photo() {
                assert!(o.always_visible);
            }
            if o.kind.is_fixed() {
                assert_eq!(o.rotation_speed, 0.0);
                assert_eq!(o.rotation_axis, Vec3::Y);
            }
        }
    }

    #[test]
    fn test_hidden_ornaments_in_chaos() {
        let mut set = set(0);
        set.write_instances(0.0, None);
        let hidden = set
            .ornaments()
            .iter()
            .filter(|o| !o.always_visible)
            .filter(|o| {
                set.buffers()
                    .slot(o.kind, o.local_index)
                    .is_some_and(|s| s.is_hidden())
            })
            .count();
        let faded = set.ornaments().iter().filter(|o| !o.always_visible).count();
        assert_eq!(hidden, faded);
    }

    #[test]
    fn test_lifted_slot_is_hidden() {
        let mut set = set(1);
        set.advance(&FrameInput::new(1.0, 1.0), TreeState::Formed);
        let index = set.photo_indices().next().expect("photo ornament");
        set.write_instances(1.0, Some(index));
        let o = &set.ornaments()[index];
        assert!(set.buffers().slot(o.kind, o.local_index).is_some_and(|s| s.is_hidden()));
    }
}
