//! Runtime animation playback

use std::sync::Arc;

use glam::Mat4;
use rayon::prelude::*;

use crate::animation::clip::Animation;
use crate::animation::pose;
use crate::animation::skeleton::Skeleton;
use crate::core::types::Result;

/// One playing instance of an animation over a shared skeleton.
///
/// Skeleton and animation data are immutable and shared between instances;
/// each instance owns its playback state and pose buffer, so arbitrarily
/// many instances can sample the same data concurrently.
#[derive(Clone)]
pub struct AnimationInstance {
    skeleton: Arc<Skeleton>,
    animation: Arc<Animation>,
    global_inverse: Mat4,
    time_ticks: f32,
    speed: f32,
    playing: bool,
    pose: Vec<Mat4>,
}

impl AnimationInstance {
    /// Create a paused instance at time 0.
    ///
    /// `global_inverse` is the inverse of the skeleton root's world
    /// transform, compensating for any transform baked into the root node.
    pub fn new(skeleton: Arc<Skeleton>, animation: Arc<Animation>, global_inverse: Mat4) -> Self {
        let bone_count = skeleton.bone_count();
        Self {
            skeleton,
            animation,
            global_inverse,
            time_ticks: 0.0,
            speed: 1.0,
            playing: false,
            pose: vec![Mat4::IDENTITY; bone_count],
        }
    }

    /// Start or resume playback.
    pub fn play(&mut self) {
        self.playing = true;
    }

    /// Pause playback (keeps current time).
    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Stop playback and rewind to the beginning.
    pub fn stop(&mut self) {
        self.playing = false;
        self.time_ticks = 0.0;
    }

    /// Set the playback speed multiplier.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// Current playback position in ticks.
    pub fn time_ticks(&self) -> f32 {
        self.time_ticks
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Advance playback by `dt` seconds and refresh the pose buffer.
    ///
    /// Paused instances still re-sample at their current time so the buffer
    /// always matches the playback position.
    pub fn update(&mut self, dt_secs: f32) -> Result<()> {
        if self.playing {
            self.time_ticks += dt_secs * self.speed * self.animation.ticks_per_second;
            if self.animation.duration > 0.0 {
                // Keep the stored time wrapped so it never loses float
                // precision on long-running loops.
                self.time_ticks = self.time_ticks.rem_euclid(self.animation.duration);
            }
        }
        pose::sample_pose(
            &self.animation,
            &self.skeleton,
            self.time_ticks,
            self.global_inverse,
            &mut self.pose,
        )
    }

    /// The sampled pose, indexed by bone id.
    pub fn pose(&self) -> &[Mat4] {
        &self.pose
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }
}

/// Advance a batch of instances in parallel.
///
/// Instances only read the shared skeleton/animation data and write their
/// own pose buffers, so they can update concurrently.
pub fn update_all(instances: &mut [AnimationInstance], dt_secs: f32) -> Result<()> {
    instances
        .par_iter_mut()
        .try_for_each(|instance| instance.update(dt_secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::clip::BoneTrack;
    use crate::animation::skeleton::BoneInfo;
    use crate::scene::SceneNode;
    use glam::{Quat, Vec3};

    fn test_rig() -> (Arc<Skeleton>, Arc<Animation>) {
        let scene = SceneNode::with_children("Hip", vec![SceneNode::new("Knee")]);
        let mut info = BoneInfo::new();
        info.insert("Hip".to_string(), (0, Mat4::IDENTITY));
        info.insert("Knee".to_string(), (1, Mat4::IDENTITY));
        let skeleton = Skeleton::from_scene(&scene, &info).unwrap();

        let track = |to: Vec3| BoneTrack {
            position_timestamps: vec![0.0, 10.0],
            positions: vec![Vec3::ZERO, to],
            rotation_timestamps: vec![0.0, 10.0],
            rotations: vec![Quat::IDENTITY, Quat::IDENTITY],
            scale_timestamps: vec![0.0, 10.0],
            scales: vec![Vec3::ONE, Vec3::ONE],
        };
        let mut tracks = std::collections::HashMap::new();
        tracks.insert("Hip".to_string(), track(Vec3::new(10.0, 0.0, 0.0)));
        tracks.insert("Knee".to_string(), track(Vec3::new(0.0, 10.0, 0.0)));

        let animation = Animation {
            duration: 10.0,
            ticks_per_second: 10.0,
            tracks,
        };
        (Arc::new(skeleton), Arc::new(animation))
    }

    fn translation_of(m: Mat4) -> Vec3 {
        m.to_scale_rotation_translation().2
    }

    #[test]
    fn test_instance_starts_paused_at_bind_buffer() {
        let (skeleton, animation) = test_rig();
        let instance = AnimationInstance::new(skeleton, animation, Mat4::IDENTITY);
        assert!(!instance.is_playing());
        assert_eq!(instance.time_ticks(), 0.0);
        assert_eq!(instance.pose().len(), 2);
    }

    #[test]
    fn test_update_advances_in_ticks() {
        let (skeleton, animation) = test_rig();
        let mut instance = AnimationInstance::new(skeleton, animation, Mat4::IDENTITY);
        instance.play();

        // 0.5 s at 10 ticks/s = 5 ticks = half the clip.
        instance.update(0.5).unwrap();
        assert!((instance.time_ticks() - 5.0).abs() < 1e-4);
        let hip = translation_of(instance.pose()[0]);
        assert!((hip - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_paused_instance_does_not_advance() {
        let (skeleton, animation) = test_rig();
        let mut instance = AnimationInstance::new(skeleton, animation, Mat4::IDENTITY);
        instance.play();
        instance.update(0.25).unwrap();
        let t = instance.time_ticks();

        instance.pause();
        instance.update(1.0).unwrap();
        assert_eq!(instance.time_ticks(), t);
    }

    #[test]
    fn test_stop_rewinds() {
        let (skeleton, animation) = test_rig();
        let mut instance = AnimationInstance::new(skeleton, animation, Mat4::IDENTITY);
        instance.play();
        instance.update(0.3).unwrap();
        instance.stop();
        assert!(!instance.is_playing());
        assert_eq!(instance.time_ticks(), 0.0);
    }

    #[test]
    fn test_speed_multiplier() {
        let (skeleton, animation) = test_rig();
        let mut instance = AnimationInstance::new(skeleton, animation, Mat4::IDENTITY);
        instance.play();
        instance.set_speed(2.0);

        instance.update(0.25).unwrap();
        // 0.25 s * 2.0 * 10 ticks/s = 5 ticks.
        assert!((instance.time_ticks() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_time_wraps_across_updates() {
        let (skeleton, animation) = test_rig();
        let mut instance = AnimationInstance::new(skeleton, animation, Mat4::IDENTITY);
        instance.play();

        // 1.2 s = 12 ticks wraps to 2 ticks.
        instance.update(1.2).unwrap();
        assert!((instance.time_ticks() - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_update_all_matches_serial_updates() {
        let (skeleton, animation) = test_rig();

        let mut batch: Vec<AnimationInstance> = (0..8)
            .map(|i| {
                let mut instance = AnimationInstance::new(
                    skeleton.clone(),
                    animation.clone(),
                    Mat4::IDENTITY,
                );
                instance.play();
                instance.set_speed(1.0 + i as f32 * 0.5);
                instance
            })
            .collect();
        let mut serial = batch.clone();

        update_all(&mut batch, 0.2).unwrap();
        for instance in &mut serial {
            instance.update(0.2).unwrap();
        }

        for (a, b) in batch.iter().zip(&serial) {
            assert_eq!(a.time_ticks(), b.time_ticks());
            assert_eq!(a.pose(), b.pose());
        }
    }
}
