//! Recursive pose evaluation

use glam::Mat4;

use crate::animation::clip::Animation;
use crate::animation::sampler;
use crate::animation::skeleton::Skeleton;
use crate::core::error::Error;
use crate::core::types::Result;

/// Compute the final skinning matrix of every animated bone at `time_ticks`.
///
/// Time wraps into `[0, duration)`, so any tick value samples somewhere in
/// the loop. `output` is indexed by bone id and must hold at least
/// `skeleton.bone_count()` matrices; slots of bones without animation data
/// are left untouched (a bone either gets its full matrix or its whole
/// subtree stays absent from the pose).
pub fn sample_pose(
    animation: &Animation,
    skeleton: &Skeleton,
    time_ticks: f32,
    global_inverse: Mat4,
    output: &mut [Mat4],
) -> Result<()> {
    if animation.duration <= 0.0 {
        return Err(Error::DegenerateAnimation(format!(
            "animation duration must be positive, got {}",
            animation.duration
        )));
    }
    assert!(
        output.len() >= skeleton.bone_count(),
        "Pose buffer holds {} matrices but the skeleton has {} bone slots",
        output.len(),
        skeleton.bone_count()
    );

    let t = time_ticks.rem_euclid(animation.duration);
    evaluate(
        animation,
        skeleton,
        skeleton.root_index(),
        t,
        Mat4::IDENTITY,
        global_inverse,
        output,
    )
}

/// Evaluate one bone and recurse into its children.
///
/// `t` is already wrapped into the animation's duration.
fn evaluate(
    animation: &Animation,
    skeleton: &Skeleton,
    bone_index: usize,
    t: f32,
    parent_transform: Mat4,
    global_inverse: Mat4,
    output: &mut [Mat4],
) -> Result<()> {
    let bone = &skeleton.bones()[bone_index];

    // No animation data -> the bone and its whole subtree contribute
    // nothing to this pose. Expected for partially-animated rigs.
    let Some(track) = animation.track(&bone.name) else {
        log::trace!("no track for bone '{}', skipping subtree", bone.name);
        return Ok(());
    };
    if track.has_empty_channel() {
        log::trace!("empty channel on bone '{}', skipping subtree", bone.name);
        return Ok(());
    }

    let translation = sampler::sample_translation(track, t)?;
    let rotation = sampler::sample_rotation(track, t)?;
    let scale = sampler::sample_scale(track, t)?;

    let local_transform = Mat4::from_scale_rotation_translation(scale, rotation, translation);
    let global_transform = parent_transform * local_transform;

    output[bone.id] = global_inverse * global_transform * bone.offset;

    for &child in &bone.children {
        evaluate(
            animation,
            skeleton,
            child,
            t,
            global_transform,
            global_inverse,
            output,
        )?;
    }

    Ok(())
}
