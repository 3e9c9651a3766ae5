// Tileworld Engine - Data-Oriented Programming (DOP) Architecture
//
// Navigation and manipulation core for a map-textured 3D world: avatar
// locomotion over probed terrain, an orbit/free-fly camera rig, an object
// gizmo with debounced persistence, and distance-tiered map textures.
//
// - engine_buffers::EngineBuffers holds all per-frame state
// - frame_operations::run_frame is the single synchronous tick
// - *_data modules hold plain data, *_operations modules transform it

// Constants module
pub mod constants;

// Core engine modules
pub mod config;
pub mod context;
pub mod engine_buffers;
pub mod error;
pub mod frame_operations;
pub mod tasks;

// Components
pub mod avatar;
pub mod camera;
pub mod gizmo;
pub mod input;
pub mod persistence;
pub mod physics;
pub mod registry;
pub mod tiles;

pub use config::{load_config, parse_config, validate_config, validate_tile_layout, EngineConfig};
pub use context::{FrameContext, InputOwner, OwnershipState};
pub use engine_buffers::{create_engine_buffers, EngineBuffers, EngineServices, FrameOutput, FrameStats};
pub use error::{EngineError, EngineResult, ErrorContext, OptionExt};
pub use frame_operations::{flush_pending_writes, run_frame};
pub use tasks::{InlineSpawner, TaskSpawner};

#[cfg(feature = "native")]
pub use tasks::TokioSpawner;

pub use avatar::AvatarPose;
pub use camera::{CameraMode, CameraTransform, CameraUniform};
pub use gizmo::{GizmoAxis, GizmoMode, SelectionChange};
pub use input::{InputEvent, IntentSnapshot, KeyCode};
pub use persistence::{MemoryPrimStore, PersistenceError, PrimId, PrimStore, PrimUpdate};
pub use physics::{Ray, AABB};
pub use registry::{SceneRegistryData, SurfaceGeometry};
pub use tiles::{FetchError, TextureTier, TileCoord, TileFetcher, TileLayout};
