//! Benchmarks for pose classification and gesture integration.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;
use holiday_tree::gesture::landmarks::*;
use holiday_tree::gesture::select_main_hand;
use holiday_tree::{classify, GestureStateMachine, HandFrame, Pose};

/// Vertical hand with the given fingers extended; pinched thumb optional.
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

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("Classify");

    let poses = [
        ("open", hand([true; 4], false, 0.0)),
        ("fist", hand([false; 4], false, 0.0)),
        ("pointing", hand([true, false, false, false], false, 0.0)),
        ("pinch", hand([true; 4], true, 0.0)),
    ];
    for (name, landmarks) in poses {
        let frame = HandFrame::new(landmarks);
        group.bench_with_input(BenchmarkId::new("pose", name), &frame, |b, frame| {
            b.iter(|| black_box(classify(black_box(frame))));
        });
    }

    let hands = vec![hand([true; 4], false, 0.0), hand([false; 4], false, 0.1)];
    group.bench_function("select_main_hand", |b| {
        b.iter(|| black_box(select_main_hand(black_box(&hands))));
    });

    group.finish();
}

fn bench_state_machine(c: &mut Criterion) {
    let mut group = c.benchmark_group("State Machine");

    let frames: Vec<HandFrame> = (0..64)
        .map(|i| HandFrame::new(hand([true; 4], true, (i as f32 * 0.1).sin() * 0.1)))
        .collect();

    group.bench_function("pinch_drag_64_ticks", |b| {
        b.iter(|| {
            let mut sm = GestureStateMachine::default();
            for frame in &frames {
                sm.step(Pose::PinchOpen3, frame);
                black_box(sm.tick());
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_classify, bench_state_machine);
criterion_main!(benches);
