//! End-to-end demo without a window: builds a small three-bone arm rig
//! procedurally, plays and cross-fades two clips, then reaches for a target
//! with both IK solvers. Pass a `.gltf` / `.glb` path to load a real model
//! instead of the procedural rig.

use glam::{Quat, Vec3};
use marionette::{
    BlendMode, ClipSource, IkMode, InterpolationMode, Model, ModelSource, NodeSource, TargetPath,
    TrackSource, TrackValues,
};

fn arm_source() -> ModelSource {
    let joint = |name: &str, along_y: f32, children: Vec<usize>| NodeSource {
        name: name.to_string(),
        translation: Some(Vec3::new(0.0, along_y, 0.0)),
        children,
        ..Default::default()
    };

    let wave = ClipSource {
        name: "Wave".to_string(),
        tracks: vec![TrackSource {
            node: 1,
            target: TargetPath::Rotation,
            interpolation: InterpolationMode::Linear,
            times: vec![0.0, 1.0, 2.0],
            values: TrackValues::Quaternion(vec![
                Quat::IDENTITY,
                Quat::from_rotation_z(0.8),
                Quat::IDENTITY,
            ]),
        }],
    };
    let reach = ClipSource {
        name: "Reach".to_string(),
        tracks: vec![TrackSource {
            node: 2,
            target: TargetPath::Rotation,
            interpolation: InterpolationMode::Linear,
            times: vec![0.0, 2.0, 4.0],
            values: TrackValues::Quaternion(vec![
                Quat::IDENTITY,
                Quat::from_rotation_x(-1.2),
                Quat::IDENTITY,
            ]),
        }],
    };

    ModelSource {
        nodes: vec![
            joint("Shoulder", 0.0, vec![1]),
            joint("Elbow", 1.0, vec![2]),
            joint("Wrist", 1.0, vec![3]),
            joint("Hand", 1.0, vec![]),
        ],
        root: 0,
        skins: vec![],
        clips: vec![wave, reach],
    }
}

fn load_source() -> anyhow::Result<ModelSource> {
    match std::env::args().nth(1) {
        #[cfg(feature = "gltf")]
        Some(path) => Ok(marionette::assets::gltf::load(&path)?),
        #[cfg(not(feature = "gltf"))]
        Some(_) => anyhow::bail!("rebuild with the `gltf` feature to load model files"),
        None => Ok(arm_source()),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut model = Model::from_source(load_source()?)?;
    println!(
        "Loaded model: {} nodes, clips {:?}, {} skins",
        model.node_count(),
        model.clip_names(),
        model.skins().len()
    );

    // Sample the first clip over one cycle.
    println!("\n-- playback ({}) --", model.clip_names()[0]);
    let end = model.clip_end_time();
    for step in 0..=4 {
        let t = end * step as f32 / 4.0;
        model.update(t);
        let tip = model.rig().node(model.node_count() - 1).global_position();
        println!("t = {t:.2}s  tip at {tip:.3}");
    }

    // Cross-fade halfway into the second clip, if there is one.
    if model.clip_count() > 1 {
        println!("\n-- cross-fade {} -> {} --", model.clip_names()[0], model.clip_names()[1]);
        model.set_blend_mode(BlendMode::CrossFade);
        model.set_dest_clip(1);
        model.set_cross_blend_factor(0.5);
        model.update(end * 0.25);
        let tip = model.rig().node(model.node_count() - 1).global_position();
        println!("blended tip at {tip:.3}");
        model.set_blend_mode(BlendMode::FadeInOut);
    }

    // Reach for a target with both solvers, from the rest pose.
    let effector = model.node_count() - 1;
    model.set_ik_chain(effector, 0)?;
    model.set_ik_target(Vec3::new(1.5, 1.5, 0.0));
    model.set_playing(false);
    model.set_time_position(0.0);

    for mode in [IkMode::Ccd, IkMode::Fabrik] {
        model.set_ik_mode(mode);
        model.update(0.0);
        let tip = model.rig().node(effector).global_position();
        let timings = model.last_timings();
        println!(
            "\n{mode:?}: converged = {}, tip at {tip:.3} (pose {:.3}ms, ik {:.3}ms)",
            model.ik_converged(),
            timings.pose_ms,
            timings.ik_ms,
        );
    }

    Ok(())
}
