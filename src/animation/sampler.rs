//! Keyframe lookup and channel interpolation

use glam::{Quat, Vec3};

use crate::animation::clip::BoneTrack;
use crate::core::error::Error;
use crate::core::types::Result;

/// Locate the keyframe pair bracketing `t` in an ascending timestamp list.
///
/// Returns the upper index (the smallest `i >= 1` with `timestamps[i] >= t`,
/// clamped to the last index when `t` runs past the end) and the fraction of
/// the way from `timestamps[i - 1]` to `timestamps[i]`, clamped to `[0, 1]`.
/// A zero-length segment yields fraction 0 rather than dividing by zero.
pub fn resolve(timestamps: &[f32], t: f32) -> Result<(usize, f32)> {
    if timestamps.len() < 2 {
        return Err(Error::DegenerateAnimation(format!(
            "cannot interpolate a channel with {} sample(s)",
            timestamps.len()
        )));
    }

    let mut upper = 1;
    while upper < timestamps.len() - 1 && timestamps[upper] < t {
        upper += 1;
    }

    let start = timestamps[upper - 1];
    let end = timestamps[upper];
    let fraction = if end > start {
        ((t - start) / (end - start)).clamp(0.0, 1.0)
    } else {
        0.0
    };

    Ok((upper, fraction))
}

/// Interpolated translation at time `t`.
pub fn sample_translation(track: &BoneTrack, t: f32) -> Result<Vec3> {
    let (upper, fraction) = resolve(&track.position_timestamps, t)?;
    Ok(track.positions[upper - 1].lerp(track.positions[upper], fraction))
}

/// Interpolated rotation at time `t`. Spherical, shortest-path.
pub fn sample_rotation(track: &BoneTrack, t: f32) -> Result<Quat> {
    let (upper, fraction) = resolve(&track.rotation_timestamps, t)?;
    Ok(track.rotations[upper - 1].slerp(track.rotations[upper], fraction))
}

/// Interpolated scale at time `t`.
pub fn sample_scale(track: &BoneTrack, t: f32) -> Result<Vec3> {
    let (upper, fraction) = resolve(&track.scale_timestamps, t)?;
    Ok(track.scales[upper - 1].lerp(track.scales[upper], fraction))
}
