//! Example: Drive a tree scene from a scripted gesture session.
//!
//! Replays a short hand-landmark script (open hand, fist, pinch drag, point)
//! through the gesture controller and prints the scene state as it evolves.
//! Sprites and the effective configuration are written to an output
//! directory.
//!
//! Run with:
//!     cargo run --example scripted_session [output_dir]

use anyhow::{Context, Result};
use glam::Vec2;
use holiday_tree::gesture::landmarks::*;
use holiday_tree::{
    textures, FilePhotoStore, GestureController, PhotoStore, Scene, SceneConfig, ScriptedTracker,
};
use std::path::PathBuf;

const FPS: f32 = 60.0;

/// Vertical hand with the given fingers extended, shifted by `dx`.
fn hand(extended: [bool; 4], pinch: bool, dx: f32) -> RawHand {
    let mut lm = [Vec2::ZERO; LANDMARK_COUNT];
    lm[WRIST] = Vec2::new(0.5 + dx, 0.9);
    let mcps = [INDEX_MCP, MIDDLE_MCP, RING_MCP, PINKY_MCP];
    for (i, &(tip, pip)) in FINGER_JOINTS.iter().enumerate() {
        let x = 0.44 + 0.05 * i as f32 + dx;
        lm[mcps[i]] = Vec2::new(x, 0.7);
        lm[pip] = Vec2::new(x, 0.6);
        lm[tip] = Vec2::new(x, if extended[i] { 0.45 } else { 0.72 });
    }
    lm[THUMB_TIP] = if pinch {
        lm[INDEX_TIP] - Vec2::new(0.01, 0.0)
    } else {
        Vec2::new(0.3 + dx, 0.7)
    };
    lm
}

fn script() -> Vec<RawHand> {
    let mut hands = Vec::new();
    hands.extend(std::iter::repeat(hand([true; 4], false, 0.0)).take(60));
    hands.extend(std::iter::repeat(hand([false; 4], false, 0.0)).take(80));
    // Drag left across the frame.
    hands.extend((0..20).map(|i| hand([true; 4], true, -0.01 * i as f32)));
    hands.extend(std::iter::repeat(hand([true, false, false, false], false, 0.0)).take(60));
    hands
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("Holiday Tree - Scripted Session");
    println!("===============================\n");

    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("holiday-tree-session"));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    // Store a gift and build the scene from it, the way a shared link would.
    let mut store = FilePhotoStore::new(&out_dir);
    let gift_id = format!("session-{}", std::process::id());
    let urls: Vec<String> = (0..4).map(|i| format!("https://photos.example/{i}.jpg")).collect();
    store.save(&gift_id, &urls)?;
    let photo_urls = store.photo_urls(&gift_id)?;
    println!("Gift {gift_id}: {} photos", photo_urls.len());

    let config = SceneConfig::lightweight();
    std::fs::write(
        out_dir.join("scene_config.json"),
        serde_json::to_string_pretty(&config)?,
    )?;

    let gesture_config = config.gesture.clone();
    let mut scene = Scene::new(config, photo_urls)?;
    let tracker = ScriptedTracker::from_hands(script());
    let mut gestures = GestureController::with_tracker(gesture_config, Box::new(tracker));
    println!("Tracker: {}\n", gestures.status().label());

    let delta = 1.0 / FPS;
    let frames = 12 * FPS as usize;
    for frame in 0..frames {
        let now_ms = frame as f64 * 1000.0 / FPS as f64;
        let signals = gestures.frame(now_ms);
        let uniforms = scene.update(delta, &signals);

        if frame % 60 == 0 {
            let pose = gestures.last_pose().map_or("-", |p| p.name());
            println!(
                "t={:>5.2}s pose={:<10} state={:?} progress={:.3} zoom={:.2} yaw={:+.3} focus={:.2}",
                uniforms.time,
                pose,
                signals.tree_state,
                uniforms.progress,
                uniforms.zoom,
                uniforms.tree_yaw,
                uniforms.focus_progress,
            );
        }
    }

    println!();
    for (name, progress) in scene.progress_report() {
        println!("  {name:<10} {progress:.3}");
    }
    if let Some(index) = scene.focus().active_index() {
        println!("  focused ornament #{index}");
    }

    textures::needle_sprite().save(out_dir.join("needle.png"))?;
    textures::dust_sprite().save(out_dir.join("dust.png"))?;
    textures::spiral_sprite().save(out_dir.join("spiral.png"))?;
    println!("\nWrote sprites and config to {}", out_dir.display());

    gestures.shutdown();
    Ok(())
}
