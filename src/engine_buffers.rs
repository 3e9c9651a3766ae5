//! Central EngineBuffers - DOP Architecture Core
//!
//! Every piece of per-frame engine state lives here. `frame_operations`
//! transforms it once per tick; nothing else holds engine state.
//! No methods, just pure data structures.

use crate::avatar::{create_avatar, AvatarData, AvatarPose};
use crate::camera::{create_camera_rig, CameraRigData, CameraTransform, CameraUniform};
use crate::config::{validate_config, validate_tile_layout, EngineConfig};
use crate::context::FrameContext;
use crate::error::EngineResult;
use crate::gizmo::{create_gizmo, GizmoData, GizmoDragOutput, SelectionChange};
use crate::input::{create_input_buffers, InputBuffers};
use crate::persistence::{create_write_queue, PrimStore, WriteQueueData, WriteQueueEvent};
use crate::physics::{create_ground_probe, GroundProbeData};
use crate::registry::{create_registry, SceneRegistryData};
use crate::tasks::TaskSpawner;
use crate::tiles::{create_tile_lod, TileEvent, TileFetcher, TileLayout, TileLodData, TileUpdateReport};
use cgmath::Point3;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Central engine buffers - the single source of truth for engine state
pub struct EngineBuffers {
    pub config: EngineConfig,

    /// Clock, input ownership and camera mode shared by all stages
    pub context: FrameContext,

    pub input: InputBuffers,
    pub avatar: AvatarData,
    pub ground: GroundProbeData,
    pub camera: CameraRigData,
    pub gizmo: GizmoData,
    pub registry: SceneRegistryData,

    pub tiles: TileLodData,
    pub tile_layout: TileLayout,

    /// Debounced prim writes
    pub writes: WriteQueueData,

    /// Statistics of the most recent frame
    pub stats: FrameStats,
}

/// External collaborators the tick talks to
#[derive(Clone)]
pub struct EngineServices {
    pub spawner: Arc<dyn TaskSpawner>,
    pub fetcher: Arc<dyn TileFetcher>,
    pub store: Arc<dyn PrimStore>,
}

/// Per-stage wall time and counters for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    pub frame_number: u64,
    pub input_time: Duration,
    pub avatar_time: Duration,
    pub camera_time: Duration,
    pub gizmo_time: Duration,
    pub persistence_time: Duration,
    pub tiles_time: Duration,
    pub total_time: Duration,
    pub writes_started: usize,
    pub tiles: TileUpdateReport,
}

/// Everything a frame publishes to the renderer and the host
#[derive(Debug, Clone)]
pub struct FrameOutput {
    pub avatar: AvatarPose,
    pub camera: CameraTransform,
    pub camera_uniform: CameraUniform,
    pub drag: Option<GizmoDragOutput>,
    pub selection: Option<SelectionChange>,
    pub write_events: Vec<WriteQueueEvent>,
    pub tile_events: Vec<TileEvent>,
    pub stats: FrameStats,
}

/// Create engine buffers with the avatar standing at the world origin.
/// Fails if the config or the tile layout is unusable.
pub fn create_engine_buffers(
    config: EngineConfig,
    tile_layout: TileLayout,
    now: Instant,
) -> EngineResult<EngineBuffers> {
    validate_config(&config)?;
    validate_tile_layout(&tile_layout, config.tile_lod.view_radius)?;

    let avatar = create_avatar(Point3::new(0.0, config.avatar.half_height, 0.0), 0.0);
    let camera = create_camera_rig(avatar.position, &config);
    let writes = create_write_queue(&config.persistence);

    Ok(EngineBuffers {
        context: FrameContext::new(now),
        input: create_input_buffers(),
        avatar,
        ground: create_ground_probe(),
        camera,
        gizmo: create_gizmo(),
        registry: create_registry(),
        tiles: create_tile_lod(),
        tile_layout,
        writes,
        stats: FrameStats::default(),
        config,
    })
}
