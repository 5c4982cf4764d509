//! Load (or synthesize) a rig, play its animation, and print sampled poses
//!
//! Usage: cargo run --release --bin sample_pose [scene.json]

use std::sync::Arc;

use glam::{Mat4, Quat, Vec2, Vec3};

use rigpose::animation::{bind_mesh, sample_pose, Animation, AnimationInstance, Skeleton};
use rigpose::core::time::PlaybackClock;
use rigpose::core::types::Result;
use rigpose::scene::{
    AnimationChannel, Keyed, Scene, SceneAnimation, SceneBone, SceneMesh, SceneNode, VertexWeight,
};

const INSTANCE_COUNT: usize = 64;
const WARM_FRAMES: u64 = 240;

fn main() -> Result<()> {
    rigpose::core::logging::init();

    let scene = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("loading scene from {}", path);
            serde_json::from_str(&std::fs::read_to_string(path)?)?
        }
        None => demo_scene(),
    };

    let mesh = scene
        .meshes
        .first()
        .expect("scene contains no meshes");
    let animation = scene
        .animations
        .first()
        .expect("scene contains no animations");

    let skinned = bind_mesh(mesh)?;
    let skeleton = Arc::new(Skeleton::from_scene(&scene.root, &skinned.bone_info)?);
    let animation = Arc::new(Animation::from_scene(animation));

    println!(
        "rig: {} vertices, {} bone slots, clip of {} ticks at {} ticks/s",
        skinned.vertices.len(),
        skeleton.bone_count(),
        animation.duration,
        animation.ticks_per_second
    );

    // Print the pose at a few fixed points through the clip.
    let mut pose = vec![Mat4::IDENTITY; skeleton.bone_count()];
    for step in 0..4 {
        let t = animation.duration * step as f32 / 4.0;
        sample_pose(&animation, &skeleton, t, Mat4::IDENTITY, &mut pose)?;
        println!("t = {t:.2} ticks:");
        for bone in skeleton.bones() {
            let translation = pose[bone.id].to_scale_rotation_translation().2;
            println!("  {:<12} -> {:?}", bone.name, translation);
        }
    }

    // Drive a batch of instances in real time for a moment and report the
    // update cost.
    let mut instances: Vec<AnimationInstance> = (0..INSTANCE_COUNT)
        .map(|i| {
            let mut instance =
                AnimationInstance::new(skeleton.clone(), animation.clone(), Mat4::IDENTITY);
            instance.set_speed(0.5 + i as f32 / INSTANCE_COUNT as f32);
            instance.play();
            instance
        })
        .collect();

    let mut clock = PlaybackClock::new();
    while clock.frame_count() < WARM_FRAMES {
        let dt = clock.tick();
        rigpose::animation::update_all(&mut instances, dt)?;
    }
    println!(
        "updated {} instances for {} frames in {:.1} ms total ({:.3} ms/frame)",
        INSTANCE_COUNT,
        clock.frame_count(),
        clock.elapsed_secs() * 1000.0,
        clock.elapsed_secs() * 1000.0 / clock.frame_count() as f32
    );

    Ok(())
}

/// A two-bone arm waving back and forth, skinned over four vertices.
fn demo_scene() -> Scene {
    let root = SceneNode::with_children(
        "Scene",
        vec![SceneNode::with_children(
            "Shoulder",
            vec![SceneNode::new("Elbow")],
        )],
    );

    let mesh = SceneMesh {
        positions: vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(3.0, 0.0, 0.0),
        ],
        normals: vec![Vec3::Y; 4],
        uvs: vec![Vec2::ZERO; 4],
        indices: vec![0, 1, 2, 1, 3, 2],
        bones: vec![
            SceneBone {
                name: "Shoulder".to_string(),
                offset: Mat4::IDENTITY,
                weights: vec![
                    VertexWeight { vertex: 0, weight: 1.0 },
                    VertexWeight { vertex: 1, weight: 0.6 },
                ],
            },
            SceneBone {
                name: "Elbow".to_string(),
                offset: Mat4::from_translation(Vec3::new(-2.0, 0.0, 0.0)),
                weights: vec![
                    VertexWeight { vertex: 1, weight: 0.4 },
                    VertexWeight { vertex: 2, weight: 1.0 },
                    VertexWeight { vertex: 3, weight: 1.0 },
                ],
            },
        ],
    };

    let wave = |amplitude: f32| {
        vec![
            Keyed::new(0.0, Quat::IDENTITY),
            Keyed::new(12.0, Quat::from_rotation_z(amplitude)),
            Keyed::new(24.0, Quat::IDENTITY),
        ]
    };
    let hold = |value: Vec3| vec![Keyed::new(0.0, value), Keyed::new(24.0, value)];

    let animation = SceneAnimation {
        duration: 24.0,
        ticks_per_second: 24.0,
        channels: vec![
            AnimationChannel {
                node_name: "Shoulder".to_string(),
                position_keys: hold(Vec3::ZERO),
                rotation_keys: wave(0.8),
                scaling_keys: hold(Vec3::ONE),
            },
            AnimationChannel {
                node_name: "Elbow".to_string(),
                position_keys: hold(Vec3::new(2.0, 0.0, 0.0)),
                rotation_keys: wave(0.4),
                scaling_keys: hold(Vec3::ONE),
            },
        ],
    };

    Scene {
        root,
        meshes: vec![mesh],
        animations: vec![animation],
    }
}
