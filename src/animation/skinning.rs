//! Vertex skin binding and GPU-ready pose data

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::animation::skeleton::BoneInfo;
use crate::core::error::Error;
use crate::core::types::Result;
use crate::scene::SceneMesh;

/// Maximum bone influences per vertex (matches the shader attribute layout).
pub const MAX_INFLUENCES: usize = 4;

/// Vertex layout consumed by the skinning shader stage:
/// position, normal, uv, bone ids, bone weights.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SkinnedVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub bone_ids: [u32; MAX_INFLUENCES],
    pub bone_weights: [f32; MAX_INFLUENCES],
}

/// A mesh bound to its skeleton: upload-ready vertices and indices, plus
/// the bone bind table the hierarchy builder consumes.
#[derive(Clone, Debug)]
pub struct SkinnedMesh {
    pub vertices: Vec<SkinnedVertex>,
    pub indices: Vec<u32>,
    pub bone_info: BoneInfo,
}

impl SkinnedMesh {
    /// Number of skinning-matrix slots this mesh needs.
    pub fn bone_count(&self) -> usize {
        self.bone_info.len()
    }
}

/// Attach bone influences to a decoded mesh's vertices.
///
/// Bone ids are assigned densely in mesh bone-list order. Each vertex takes
/// up to [`MAX_INFLUENCES`] (bone id, weight) pairs in the order weights are
/// encountered; further influences on an already-full vertex are dropped by
/// policy. Weights are then normalized to sum to 1 where the raw total is
/// positive; vertices no bone touches keep all-zero weights and skin as
/// identity.
pub fn bind_mesh(mesh: &SceneMesh) -> Result<SkinnedMesh> {
    let vertex_count = mesh.positions.len();
    if mesh.normals.len() != vertex_count || mesh.uvs.len() != vertex_count {
        return Err(Error::Mesh(format!(
            "attribute arrays disagree: {} positions, {} normals, {} uvs",
            vertex_count,
            mesh.normals.len(),
            mesh.uvs.len()
        )));
    }

    let mut vertices: Vec<SkinnedVertex> = (0..vertex_count)
        .map(|i| SkinnedVertex {
            position: mesh.positions[i].to_array(),
            normal: mesh.normals[i].to_array(),
            uv: mesh.uvs[i].to_array(),
            bone_ids: [0; MAX_INFLUENCES],
            bone_weights: [0.0; MAX_INFLUENCES],
        })
        .collect();

    let mut bone_info = BoneInfo::with_capacity(mesh.bones.len());
    let mut influence_counts = vec![0usize; vertex_count];

    for (id, bone) in mesh.bones.iter().enumerate() {
        bone_info.insert(bone.name.clone(), (id, bone.offset));

        for influence in &bone.weights {
            let vertex = influence.vertex as usize;
            if vertex >= vertex_count {
                return Err(Error::Mesh(format!(
                    "bone '{}' references vertex {} but the mesh has {}",
                    bone.name, influence.vertex, vertex_count
                )));
            }

            let slot = influence_counts[vertex];
            if slot >= MAX_INFLUENCES {
                log::debug!(
                    "vertex {} already has {} influences, dropping weight from '{}'",
                    vertex,
                    MAX_INFLUENCES,
                    bone.name
                );
                continue;
            }
            vertices[vertex].bone_ids[slot] = id as u32;
            vertices[vertex].bone_weights[slot] = influence.weight;
            influence_counts[vertex] += 1;
        }
    }

    // Normalize weights so each skinned vertex sums to 1. Vertices with no
    // influence at all stay zero and render unskinned.
    for vertex in &mut vertices {
        let total: f32 = vertex.bone_weights.iter().sum();
        if total > 0.0 {
            for weight in &mut vertex.bone_weights {
                *weight /= total;
            }
        }
    }

    log::debug!(
        "bound mesh: {} vertices, {} indices, {} bones",
        vertices.len(),
        mesh.indices.len(),
        bone_info.len()
    );

    Ok(SkinnedMesh {
        vertices,
        indices: mesh.indices.clone(),
        bone_info,
    })
}

/// GPU-side bone matrix (column-major mat4), the element type of the pose
/// palette a skinning shader reads.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct BoneMatrix {
    pub matrix: [[f32; 4]; 4],
}

impl BoneMatrix {
    /// Create from a glam Mat4
    pub fn from_mat4(matrix: Mat4) -> Self {
        Self {
            matrix: matrix.to_cols_array_2d(),
        }
    }

    /// Create identity transform
    pub fn identity() -> Self {
        Self::from_mat4(Mat4::IDENTITY)
    }
}

/// Convert a sampled pose into the palette layout; feed the result through
/// `bytemuck::cast_slice` for the raw bytes.
pub fn pose_palette(pose: &[Mat4]) -> Vec<BoneMatrix> {
    pose.iter().map(|m| BoneMatrix::from_mat4(*m)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{SceneBone, VertexWeight};
    use glam::{Vec2, Vec3};

    fn flat_mesh(vertex_count: usize) -> SceneMesh {
        SceneMesh {
            positions: (0..vertex_count)
                .map(|i| Vec3::new(i as f32, 0.0, 0.0))
                .collect(),
            normals: vec![Vec3::Y; vertex_count],
            uvs: vec![Vec2::ZERO; vertex_count],
            indices: Vec::new(),
            bones: Vec::new(),
        }
    }

    fn bone(name: &str, weights: &[(u32, f32)]) -> SceneBone {
        SceneBone {
            name: name.to_string(),
            offset: Mat4::IDENTITY,
            weights: weights
                .iter()
                .map(|&(vertex, weight)| VertexWeight { vertex, weight })
                .collect(),
        }
    }

    #[test]
    fn test_weights_normalized_to_one() {
        let mut mesh = flat_mesh(1);
        mesh.bones = vec![bone("A", &[(0, 2.0)]), bone("B", &[(0, 6.0)])];

        let skinned = bind_mesh(&mesh).unwrap();
        let v = &skinned.vertices[0];
        assert!((v.bone_weights[0] - 0.25).abs() < 1e-6);
        assert!((v.bone_weights[1] - 0.75).abs() < 1e-6);
        let total: f32 = v.bone_weights.iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_weight_vertex_stays_unskinned() {
        let mut mesh = flat_mesh(2);
        mesh.bones = vec![bone("A", &[(0, 1.0)])];

        let skinned = bind_mesh(&mesh).unwrap();
        assert_eq!(skinned.vertices[1].bone_weights, [0.0; 4]);
        assert_eq!(skinned.vertices[1].bone_ids, [0; 4]);
    }

    #[test]
    fn test_fifth_influence_dropped() {
        let mut mesh = flat_mesh(1);
        mesh.bones = (0..5)
            .map(|i| bone(&format!("bone_{}", i), &[(0, 1.0)]))
            .collect();

        let skinned = bind_mesh(&mesh).unwrap();
        let v = &skinned.vertices[0];
        // First four bones kept, each at a quarter after normalization.
        assert_eq!(v.bone_ids, [0, 1, 2, 3]);
        for weight in v.bone_weights {
            assert!((weight - 0.25).abs() < 1e-6);
        }
    }

    #[test]
    fn test_bone_ids_dense_in_list_order() {
        let mut mesh = flat_mesh(1);
        mesh.bones = vec![bone("Hip", &[]), bone("Knee", &[]), bone("Foot", &[])];

        let skinned = bind_mesh(&mesh).unwrap();
        assert_eq!(skinned.bone_count(), 3);
        assert_eq!(skinned.bone_info["Hip"].0, 0);
        assert_eq!(skinned.bone_info["Knee"].0, 1);
        assert_eq!(skinned.bone_info["Foot"].0, 2);
    }

    #[test]
    fn test_out_of_range_vertex_is_an_error() {
        let mut mesh = flat_mesh(1);
        mesh.bones = vec![bone("A", &[(7, 1.0)])];

        assert!(matches!(bind_mesh(&mesh), Err(Error::Mesh(_))));
    }

    #[test]
    fn test_mismatched_attribute_arrays_are_an_error() {
        let mut mesh = flat_mesh(2);
        mesh.normals.pop();

        assert!(matches!(bind_mesh(&mesh), Err(Error::Mesh(_))));
    }

    #[test]
    fn test_pose_palette_round_trips_and_casts() {
        let pose = vec![
            Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)),
            Mat4::IDENTITY,
        ];
        let palette = pose_palette(&pose);

        let reconstructed = Mat4::from_cols_array_2d(&palette[0].matrix);
        assert_eq!(reconstructed, pose[0]);

        let bytes: &[u8] = bytemuck::cast_slice(&palette);
        assert_eq!(bytes.len(), 2 * std::mem::size_of::<BoneMatrix>());
    }
}
