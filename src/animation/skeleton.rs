//! Bone hierarchy extracted from a decoded scene

use std::collections::HashMap;

use glam::Mat4;

use crate::core::error::Error;
use crate::core::types::Result;
use crate::scene::SceneNode;

/// Bind data for the skinning bones of one mesh: name to
/// (matrix slot, mesh-space-to-bone-space offset).
pub type BoneInfo = HashMap<String, (usize, Mat4)>;

/// A single bone in the skeleton arena.
#[derive(Clone, Debug)]
pub struct Bone {
    /// Slot in the final skinning-matrix array.
    pub id: usize,
    /// Unique name joining the bone to its animation track.
    pub name: String,
    /// Mesh-space to bone-space bind transform.
    pub offset: Mat4,
    /// Arena indices of child bones, in scene order.
    pub children: Vec<usize>,
}

/// Rooted bone hierarchy for one skinned mesh.
///
/// Bones live in an arena and refer to their children by index, so the tree
/// owns its nodes without back-pointers and is read-only after construction.
#[derive(Clone, Debug)]
pub struct Skeleton {
    bones: Vec<Bone>,
    bone_names: HashMap<String, usize>,
    root: usize,
    bone_count: usize,
}

impl Skeleton {
    /// Build the skeleton from a decoded node tree and the mesh's bone table.
    ///
    /// Walks the tree depth-first; the first node whose name appears in
    /// `bone_info` roots the skeleton, and every bone-named descendant is
    /// attached below it. Non-bone nodes between two bones are skipped over:
    /// their bone descendants attach to the nearest bone ancestor. Once the
    /// root bone is found the search does not continue elsewhere in the
    /// scene (one skinned skeleton per mesh).
    pub fn from_scene(scene_root: &SceneNode, bone_info: &BoneInfo) -> Result<Skeleton> {
        let bone_root = find_bone_root(scene_root, bone_info).ok_or_else(|| {
            Error::MalformedHierarchy(format!(
                "no scene node matches any of the {} known bone names",
                bone_info.len()
            ))
        })?;

        let mut bones = Vec::with_capacity(bone_info.len());
        let root = attach_bone(bone_root, bone_info, &mut bones);

        let bone_names = bones
            .iter()
            .enumerate()
            .map(|(index, bone)| (bone.name.clone(), index))
            .collect();

        log::debug!(
            "built skeleton: {} of {} bones reachable from root '{}'",
            bones.len(),
            bone_info.len(),
            bones[root].name
        );

        Ok(Skeleton {
            bones,
            bone_names,
            root,
            bone_count: bone_info.len(),
        })
    }

    /// Get the root bone
    pub fn root(&self) -> &Bone {
        &self.bones[self.root]
    }

    /// Arena index of the root bone
    pub fn root_index(&self) -> usize {
        self.root
    }

    /// Get a bone by arena index
    pub fn bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    /// All bones in the arena
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    /// Find a bone's arena index by name
    pub fn find_bone(&self, name: &str) -> Option<usize> {
        self.bone_names.get(name).copied()
    }

    /// Number of skinning-matrix slots (the mesh's full bone count, which
    /// may exceed the number of bones reachable from the root)
    pub fn bone_count(&self) -> usize {
        self.bone_count
    }
}

/// Depth-first search for the first node that is an actual bone.
fn find_bone_root<'a>(node: &'a SceneNode, bone_info: &BoneInfo) -> Option<&'a SceneNode> {
    if bone_info.contains_key(&node.name) {
        return Some(node);
    }
    node.children
        .iter()
        .find_map(|child| find_bone_root(child, bone_info))
}

/// Append `node` (known to be a bone) to the arena and recursively attach
/// its bone descendants. Returns the new bone's arena index.
fn attach_bone(node: &SceneNode, bone_info: &BoneInfo, bones: &mut Vec<Bone>) -> usize {
    let (id, offset) = bone_info[&node.name];
    let index = bones.len();
    bones.push(Bone {
        id,
        name: node.name.clone(),
        offset,
        children: Vec::new(),
    });

    let mut children = Vec::new();
    for child in &node.children {
        collect_bone_children(child, bone_info, bones, &mut children);
    }
    bones[index].children = children;

    index
}

/// Attach `node` if it is a bone, otherwise look through it for bone
/// descendants (non-bone nodes are not retained structurally).
fn collect_bone_children(
    node: &SceneNode,
    bone_info: &BoneInfo,
    bones: &mut Vec<Bone>,
    out: &mut Vec<usize>,
) {
    if bone_info.contains_key(&node.name) {
        out.push(attach_bone(node, bone_info, bones));
    } else {
        for child in &node.children {
            collect_bone_children(child, bone_info, bones, out);
        }
    }
}
