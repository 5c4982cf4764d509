//! Rigpose - a skeletal-animation sampling engine
//!
//! Consumes a decoded scene description (node tree, bone bind data, keyframe
//! channels) and produces per-bone skinning matrices for an arbitrary point
//! in animation time. Asset parsing and GPU upload are the caller's job.

pub mod core;
pub mod scene;
pub mod animation;
