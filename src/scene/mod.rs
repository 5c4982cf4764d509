//! Decoded-scene interchange records
//!
//! The asset importer hands these over already decoded; this crate never
//! parses container formats itself. All records derive serde so fixtures
//! and importer output can be exchanged as JSON.

use glam::{Mat4, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// A node in the decoded scene graph.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: String,
    #[serde(default)]
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    /// Create a leaf node with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Create a node with children.
    pub fn with_children(name: impl Into<String>, children: Vec<SceneNode>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }
}

/// One bone influence on one vertex.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct VertexWeight {
    pub vertex: u32,
    pub weight: f32,
}

/// A skinning bone as delivered with a mesh: bind offset plus the vertices
/// it influences.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SceneBone {
    pub name: String,
    /// Mesh-space to bone-space bind transform.
    pub offset: Mat4,
    #[serde(default)]
    pub weights: Vec<VertexWeight>,
}

/// A decoded triangle mesh with its skinning bone list.
///
/// `positions`, `normals` and `uvs` are parallel arrays of equal length.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SceneMesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    #[serde(default)]
    pub indices: Vec<u32>,
    #[serde(default)]
    pub bones: Vec<SceneBone>,
}

/// One keyed sample in an animation channel.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Keyed<T> {
    pub time: f32,
    pub value: T,
}

impl<T> Keyed<T> {
    pub fn new(time: f32, value: T) -> Self {
        Self { time, value }
    }
}

/// Keyframe data for one target node, as exported.
///
/// Exporters may decompose a single bone's transform into several channels
/// whose names carry a reserved marker; see `animation::clip` for how those
/// are merged back together.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AnimationChannel {
    pub node_name: String,
    #[serde(default)]
    pub position_keys: Vec<Keyed<Vec3>>,
    #[serde(default)]
    pub rotation_keys: Vec<Keyed<Quat>>,
    #[serde(default)]
    pub scaling_keys: Vec<Keyed<Vec3>>,
}

/// A decoded animation: channel list plus timing metadata.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SceneAnimation {
    /// Length of the animation in ticks.
    pub duration: f32,
    /// Tick rate as reported by the source; 0 means unspecified.
    pub ticks_per_second: f32,
    pub channels: Vec<AnimationChannel>,
}

/// Everything the importer delivers for one asset.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scene {
    pub root: SceneNode,
    #[serde(default)]
    pub meshes: Vec<SceneMesh>,
    #[serde(default)]
    pub animations: Vec<SceneAnimation>,
}
