/// Avatar Module - Data-Oriented Programming (DOP) style
///
/// - avatar_data.rs: locomotion state and the published pose
/// - avatar_operations.rs: walk/fly integration with ground clamping

pub mod avatar_data;
pub mod avatar_operations;

pub use avatar_data::{AvatarData, AvatarPose};

pub use avatar_operations::{
    avatar_forward, avatar_pose, create_avatar, rotate_by_yaw, update_avatar,
};
