//! Animation clips and per-bone keyframe tracks

use std::collections::HashMap;

use glam::{Quat, Vec3};

use crate::scene::{AnimationChannel, SceneAnimation};

/// Marker some exporters insert when decomposing one bone's transform into
/// separate translation/rotation/scaling channels ("Hip_$AssimpFbx$_Rotation").
pub const SPLIT_CHANNEL_MARKER: &str = "_$AssimpFbx$_";

/// Time-sampled translation/rotation/scale channels for a single bone.
///
/// The three channels are independent: each has its own timestamps and may
/// have a different length. Within one channel, timestamps and values are
/// parallel arrays with non-decreasing times. A channel with fewer than two
/// samples cannot be interpolated.
#[derive(Clone, Debug, Default)]
pub struct BoneTrack {
    pub position_timestamps: Vec<f32>,
    pub rotation_timestamps: Vec<f32>,
    pub scale_timestamps: Vec<f32>,

    pub positions: Vec<Vec3>,
    pub rotations: Vec<Quat>,
    pub scales: Vec<Vec3>,
}

impl BoneTrack {
    /// Copy a decoded channel's keys into a track.
    pub fn from_channel(channel: &AnimationChannel) -> Self {
        let mut track = BoneTrack::default();
        for key in &channel.position_keys {
            track.position_timestamps.push(key.time);
            track.positions.push(key.value);
        }
        for key in &channel.rotation_keys {
            track.rotation_timestamps.push(key.time);
            track.rotations.push(key.value);
        }
        for key in &channel.scaling_keys {
            track.scale_timestamps.push(key.time);
            track.scales.push(key.value);
        }
        track
    }

    /// True when any of the three channels has no samples at all.
    /// Such a track cannot drive a bone and its subtree is skipped.
    pub fn has_empty_channel(&self) -> bool {
        self.positions.is_empty() || self.rotations.is_empty() || self.scales.is_empty()
    }

    /// Take over the channels of `other` that carry enough samples to
    /// interpolate. Channels with fewer than two samples are ignored, so a
    /// split group that never animates a kind leaves it empty here.
    fn absorb(&mut self, other: BoneTrack) {
        if other.positions.len() > 1 {
            self.position_timestamps = other.position_timestamps;
            self.positions = other.positions;
        }
        if other.rotations.len() > 1 {
            self.rotation_timestamps = other.rotation_timestamps;
            self.rotations = other.rotations;
        }
        if other.scales.len() > 1 {
            self.scale_timestamps = other.scale_timestamps;
            self.scales = other.scales;
        }
    }
}

/// A complete animation: timing metadata plus one track per bone name.
///
/// Built once at load time and immutable after; share it across playing
/// instances behind an `Arc`.
#[derive(Clone, Debug)]
pub struct Animation {
    /// Length in ticks.
    pub duration: f32,
    /// Tick rate; sources reporting 0 default to 1.
    pub ticks_per_second: f32,
    pub tracks: HashMap<String, BoneTrack>,
}

impl Animation {
    /// Build from a decoded animation, merging split channels.
    pub fn from_scene(anim: &SceneAnimation) -> Self {
        let ticks_per_second = if anim.ticks_per_second != 0.0 {
            anim.ticks_per_second
        } else {
            1.0
        };

        let tracks = build_tracks(&anim.channels);
        log::debug!(
            "loaded animation: {} tracks, duration {} ticks at {} ticks/s",
            tracks.len(),
            anim.duration,
            ticks_per_second
        );

        Animation {
            duration: anim.duration,
            ticks_per_second,
            tracks,
        }
    }

    /// Get the track for a bone, if the animation has one.
    pub fn track(&self, bone_name: &str) -> Option<&BoneTrack> {
        self.tracks.get(bone_name)
    }
}

/// Build the per-bone track map from a decoded channel list, coalescing
/// split channels.
///
/// A run of consecutive channels named `<base>_$AssimpFbx$_<kind>` merges
/// into one track committed under `<base>`; each of the three kinds is taken
/// from whichever sub-channel supplies more than one sample of it. The
/// pending merge commits when the base name changes, when a non-split
/// channel follows, and at end-of-list. Channels without the marker are
/// stored directly under their own name.
pub fn build_tracks(channels: &[AnimationChannel]) -> HashMap<String, BoneTrack> {
    let mut tracks = HashMap::new();
    let mut pending: Option<(String, BoneTrack)> = None;

    for channel in channels {
        let track = BoneTrack::from_channel(channel);

        match split_base_name(&channel.node_name) {
            Some(base) => match pending.take() {
                Some((name, mut merged)) if name == base => {
                    merged.absorb(track);
                    pending = Some((name, merged));
                }
                previous => {
                    if let Some((name, merged)) = previous {
                        tracks.insert(name, merged);
                    }
                    let mut merged = BoneTrack::default();
                    merged.absorb(track);
                    pending = Some((base.to_string(), merged));
                }
            },
            None => {
                if let Some((name, merged)) = pending.take() {
                    tracks.insert(name, merged);
                }
                tracks.insert(channel.node_name.clone(), track);
            }
        }
    }

    // A split group ending the channel list still commits.
    if let Some((name, merged)) = pending.take() {
        tracks.insert(name, merged);
    }

    tracks
}

/// The base bone name of a split channel, or None for a normal channel.
fn split_base_name(name: &str) -> Option<&str> {
    name.find(SPLIT_CHANNEL_MARKER).map(|at| &name[..at])
}
