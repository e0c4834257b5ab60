//! Scene orchestration.
//!
//! [`Scene::update`] is the single per-frame entry point: it takes the
//! frame delta and this frame's [`ControlSignals`] and drives the camera,
//! every particle subsystem, the ornaments and the focus layer in that
//! order. Nothing else writes scene state.

use glam::{Mat4, Vec3};

use crate::camera::CameraRig;
use crate::config::{ConfigError, SceneConfig};
use crate::gesture::ControlSignals;
use crate::ornaments::{FocusController, FocusView, OrnamentSet};
use crate::particles::{
    AmbientField, AmbientLayer, FrameInput, GoldDust, GoldenSpirals, GroundRipples, Needles,
    ParticleSubsystem,
};
use crate::render::{FrameUniforms, InstanceRaw};
use crate::rotation::TreeRotation;

pub struct Scene {
    config: SceneConfig,
    photo_urls: Vec<String>,
    elapsed: f32,
    needles: Needles,
    dust: GoldDust,
    spirals: GoldenSpirals,
    ripples: GroundRipples,
    gold: AmbientField,
    snow: AmbientField,
    ornaments: OrnamentSet,
    focus: FocusController,
    focused_instance: InstanceRaw,
    camera: CameraRig,
    rotation: TreeRotation,
    last_signals: ControlSignals,
}

impl Scene {
    pub fn new(config: SceneConfig, photo_urls: Vec<String>) -> Result<Self, ConfigError> {
        config.validate()?;
        let seed = config.seed;

        let scene = Self {
            needles: Needles::new(config.needles.clone(), seed),
            dust: GoldDust::new(config.dust.clone(), seed),
            spirals: GoldenSpirals::new(config.spirals.clone(), seed),
            ripples: GroundRipples::new(config.ripples.clone(), seed),
            gold: AmbientField::new(AmbientLayer::Gold, config.ambient.clone(), seed),
            snow: AmbientField::new(AmbientLayer::Snow, config.ambient.clone(), seed),
            ornaments: OrnamentSet::build(config.ornaments.clone(), photo_urls.len(), seed),
            focus: FocusController::new(config.focus.clone()),
            focused_instance: InstanceRaw::hidden(),
            camera: CameraRig::new(config.camera.clone()),
            rotation: TreeRotation::new(config.rotation.clone()),
            last_signals: ControlSignals::default(),
            elapsed: 0.0,
            photo_urls,
            config,
        };

        log::info!(
            "Scene built: {} needles, {} dust, {} spiral beads, {} ripples, {} ornaments ({} photos)",
            scene.needles.len(),
            scene.dust.len(),
            scene.spirals.len(),
            scene.ripples.len(),
            scene.ornaments.len(),
            scene.photo_urls.len()
        );
        Ok(scene)
    }

    /// Replace the photo list. Ornaments are rebuilt and any focus is dropped;
    /// every other subsystem carries on untouched.
    pub fn set_photo_urls(&mut self, urls: Vec<String>) {
        if urls == self.photo_urls {
            return;
        }
        let progress = self.ornaments.progress();
        self.ornaments = OrnamentSet::build(self.config.ornaments.clone(), urls.len(), self.config.seed);
        self.ornaments.resume_from(progress);
        self.focus.clear();
        self.focused_instance = InstanceRaw::hidden();
        log::info!("Rebuilt ornaments for {} photos", urls.len());
        self.photo_urls = urls;
    }

    fn focus_view(&self) -> FocusView {
        FocusView {
            camera_position: self.camera.position(),
            camera_orientation: self.camera.orientation(),
            fov: self.camera.fov_radians(),
            group_yaw: self.rotation.yaw(),
            group_scale: self.config.tree_group.scale,
            group_offset: Vec3::from_array(self.config.tree_group.offset),
        }
    }

    fn subsystems_mut(&mut self) -> [&mut dyn ParticleSubsystem; 4] {
        [
            &mut self.needles,
            &mut self.dust,
            &mut self.spirals,
            &mut self.ripples,
        ]
    }

    /// Advance everything by one render frame.
    pub fn update(&mut self, delta: f32, signals: &ControlSignals) -> FrameUniforms {
        self.elapsed += delta;
        let frame = FrameInput::new(delta, self.elapsed);
        let state = signals.tree_state;

        self.camera.update(delta, self.elapsed, signals.zoom_factor);

        // Pick against last frame's progress and group rotation.
        let view = self.focus_view();
        self.focus.observe(signals.photo_focus, &self.ornaments, &view);

        for subsystem in self.subsystems_mut() {
            subsystem.update(&frame, state);
        }
        self.gold.update(self.elapsed);
        self.snow.update(self.elapsed);

        self.ornaments.advance(&frame, state);
        self.focus.advance(signals.photo_focus, delta);
        let lifted = self.focus.active_index().filter(|_| self.focus.is_showing());
        self.ornaments.write_instances(self.elapsed, lifted);
        self.focused_instance = self.focus.focused_instance(&self.ornaments, &view, self.elapsed);

        self.rotation
            .update(signals.rotation_impulse, state, signals.photo_focus);
        self.last_signals = *signals;

        self.uniforms()
    }

    pub fn uniforms(&self) -> FrameUniforms {
        FrameUniforms {
            time: self.elapsed,
            progress: self.needles.progress(),
            zoom: self.last_signals.zoom_factor,
            spiral_opacity: self.spirals.opacity(),
            ripple_opacity: self.ripples.opacity(),
            focus_progress: self.focus.focus_progress(),
            tree_yaw: self.rotation.yaw(),
            _padding: 0.0,
        }
    }

    /// Model matrix of the tree group (needles, dust, spirals and
    /// ornaments): offset, then scale, then yaw.
    pub fn tree_transform(&self) -> Mat4 {
        self.focus_view().group_transform()
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn photo_urls(&self) -> &[String] {
        &self.photo_urls
    }

    pub fn needles(&self) -> &Needles {
        &self.needles
    }

    pub fn dust(&self) -> &GoldDust {
        &self.dust
    }

    pub fn spirals(&self) -> &GoldenSpirals {
        &self.spirals
    }

    pub fn ripples(&self) -> &GroundRipples {
        &self.ripples
    }

    pub fn ambient(&self, layer: AmbientLayer) -> &AmbientField {
        match layer {
            AmbientLayer::Gold => &self.gold,
            AmbientLayer::Snow => &self.snow,
        }
    }

    pub fn ornaments(&self) -> &OrnamentSet {
        &self.ornaments
    }

    pub fn focus(&self) -> &FocusController {
        &self.focus
    }

    /// Lifted photo instance; zero scale when nothing is focused.
    pub fn focused_instance(&self) -> &InstanceRaw {
        &self.focused_instance
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn rotation(&self) -> &TreeRotation {
        &self.rotation
    }

    /// Progress of every tree-state-driven subsystem, by name.
    pub fn progress_report(&self) -> Vec<(&'static str, f32)> {
        vec![
            (self.needles.name(), self.needles.progress()),
            (self.dust.name(), self.dust.progress()),
            (self.spirals.name(), self.spirals.progress()),
            (self.ripples.name(), self.ripples.progress()),
            ("ornaments", self.ornaments.progress()),
        ]
    }
}
