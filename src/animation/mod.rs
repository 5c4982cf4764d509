//! Skeletal animation sampling

pub mod skeleton;
pub mod clip;
pub mod sampler;
pub mod pose;
pub mod animator;
pub mod skinning;

pub use skeleton::{Bone, BoneInfo, Skeleton};
pub use clip::{Animation, BoneTrack, SPLIT_CHANNEL_MARKER};
pub use pose::sample_pose;
pub use animator::{AnimationInstance, update_all};
pub use skinning::{bind_mesh, BoneMatrix, SkinnedMesh, SkinnedVertex, MAX_INFLUENCES};
