//! Engine configuration
//!
//! Every section deserializes from TOML with per-field defaults, so a config
//! file only needs the values it overrides.

use crate::constants::*;
use crate::error::{EngineError, EngineResult, ErrorContext};
use crate::tiles::TileLayout;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarConfig {
    pub half_height: f32,
    pub walk_speed: f32,
    pub fly_speed: f32,
    pub turn_rate: f32,
    pub vertical_fly_speed: f32,
    pub gravity: f32,
    pub ground_contact_epsilon: f32,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            half_height: AVATAR_HALF_HEIGHT,
            walk_speed: AVATAR_WALK_SPEED,
            fly_speed: AVATAR_FLY_SPEED,
            turn_rate: AVATAR_TURN_RATE,
            vertical_fly_speed: AVATAR_VERTICAL_FLY_SPEED,
            gravity: GRAVITY,
            ground_contact_epsilon: GROUND_CONTACT_EPSILON,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    pub min_distance: f32,
    pub max_distance: f32,
    pub initial_distance: f32,
    pub min_pitch: f32,
    pub max_pitch: f32,
    pub initial_pitch: f32,
    pub head_height: f32,
    pub rotate_sensitivity: f32,
    pub zoom_sensitivity: f32,
    pub pan_sensitivity: f32,
    pub avatar_blend: f32,
    pub follow_speed_flying: f32,
    pub follow_speed_walking: f32,
    pub ground_clearance: f32,
    pub ground_clamp_max_avatar_height: f32,
    pub ground_clamp_min_distance: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            min_distance: ORBIT_MIN_DISTANCE,
            max_distance: ORBIT_MAX_DISTANCE,
            initial_distance: ORBIT_DEFAULT_DISTANCE,
            min_pitch: ORBIT_MIN_PITCH,
            max_pitch: ORBIT_MAX_PITCH,
            initial_pitch: ORBIT_DEFAULT_PITCH,
            head_height: ORBIT_HEAD_HEIGHT,
            rotate_sensitivity: ORBIT_ROTATE_SENSITIVITY,
            zoom_sensitivity: ORBIT_ZOOM_SENSITIVITY,
            pan_sensitivity: ORBIT_PAN_SENSITIVITY,
            avatar_blend: ORBIT_AVATAR_BLEND,
            follow_speed_flying: ORBIT_FOLLOW_SPEED_FLYING,
            follow_speed_walking: ORBIT_FOLLOW_SPEED_WALKING,
            ground_clearance: CAMERA_GROUND_CLEARANCE,
            ground_clamp_max_avatar_height: GROUND_CLAMP_MAX_AVATAR_HEIGHT,
            ground_clamp_min_distance: GROUND_CLAMP_MIN_DISTANCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreeFlyConfig {
    pub pitch_limit: f32,
    pub look_sensitivity: f32,
    pub base_speed: f32,
    pub fast_speed: f32,
    pub slow_speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
    pub focus_fallback_distance: f32,
}

impl Default for FreeFlyConfig {
    fn default() -> Self {
        Self {
            pitch_limit: FREE_FLY_PITCH_LIMIT,
            look_sensitivity: FREE_FLY_LOOK_SENSITIVITY,
            base_speed: FREE_FLY_BASE_SPEED,
            fast_speed: FREE_FLY_FAST_SPEED,
            slow_speed: FREE_FLY_SLOW_SPEED,
            acceleration: FREE_FLY_ACCELERATION,
            deceleration: FREE_FLY_DECELERATION,
            focus_fallback_distance: FREE_FLY_FOCUS_FALLBACK_DISTANCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GizmoConfig {
    pub drag_sensitivity: f32,
    pub rotate_sensitivity: f32,
    pub scale_sensitivity: f32,
    pub min_scale: f32,
    pub release_grace_ms: u64,
    pub click_max_travel_px: f32,
}

impl Default for GizmoConfig {
    fn default() -> Self {
        Self {
            drag_sensitivity: GIZMO_DRAG_SENSITIVITY,
            rotate_sensitivity: GIZMO_ROTATE_SENSITIVITY,
            scale_sensitivity: GIZMO_SCALE_SENSITIVITY,
            min_scale: GIZMO_MIN_SCALE,
            release_grace_ms: INPUT_RELEASE_GRACE_MS,
            click_max_travel_px: CLICK_MAX_TRAVEL_PX,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundProbeConfig {
    pub ray_start_height: f32,
    pub default_ground_height: f32,
    pub refresh_interval_ms: u64,
    pub horizontal_normal_min_y: f32,
}

impl Default for GroundProbeConfig {
    fn default() -> Self {
        Self {
            ray_start_height: PROBE_RAY_START_HEIGHT,
            default_ground_height: DEFAULT_GROUND_HEIGHT,
            refresh_interval_ms: SURFACE_CACHE_REFRESH_MS,
            horizontal_normal_min_y: HORIZONTAL_NORMAL_MIN_Y,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileLodConfig {
    pub high_exit_distance: f32,
    pub high_enter_distance: f32,
    pub low_enter_distance: f32,
    pub low_exit_distance: f32,
    pub evaluation_interval_ms: u64,
    pub tile_world_size: f32,
    pub view_radius: f32,
    /// `None` keeps every fetched texture until an explicit evict or clear
    pub max_cache_entries: Option<usize>,
}

impl Default for TileLodConfig {
    fn default() -> Self {
        Self {
            high_exit_distance: TILE_HIGH_EXIT_DISTANCE,
            high_enter_distance: TILE_HIGH_ENTER_DISTANCE,
            low_enter_distance: TILE_LOW_ENTER_DISTANCE,
            low_exit_distance: TILE_LOW_EXIT_DISTANCE,
            evaluation_interval_ms: TILE_EVALUATION_INTERVAL_MS,
            tile_world_size: TILE_WORLD_SIZE,
            view_radius: TILE_VIEW_RADIUS,
            max_cache_entries: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub debounce_ms: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            debounce_ms: WRITE_DEBOUNCE_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: u32,
    pub height: u32,
    pub fov_degrees: f32,
    pub near_plane: f32,
    pub far_plane: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fov_degrees: VIEWPORT_FOV_DEGREES,
            near_plane: VIEWPORT_NEAR_PLANE,
            far_plane: VIEWPORT_FAR_PLANE,
        }
    }
}

/// Main engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub avatar: AvatarConfig,
    pub orbit: OrbitConfig,
    pub free_fly: FreeFlyConfig,
    pub gizmo: GizmoConfig,
    pub ground_probe: GroundProbeConfig,
    pub tile_lod: TileLodConfig,
    pub persistence: PersistenceConfig,
    pub viewport: ViewportConfig,
}

/// Parse a TOML document and validate it
pub fn parse_config(source: &str) -> EngineResult<EngineConfig> {
    let config: EngineConfig = toml::from_str(source)?;
    validate_config(&config)?;
    Ok(config)
}

/// Load and validate a TOML config file
pub fn load_config(path: impl AsRef<Path>) -> EngineResult<EngineConfig> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|e| EngineError::ConfigRead {
        path: path.display().to_string(),
        error: e.to_string(),
    })?;
    let config = parse_config(&source).with_context(|| format!("config file {}", path.display()))?;
    log::info!("[Config] Loaded engine config from {}", path.display());
    Ok(config)
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> EngineError {
    EngineError::InvalidConfig {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn require_positive(field: &str, value: f32) -> EngineResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be a positive finite number"))
    }
}

/// Reject tile layouts whose view radius cannot be covered by a bounded scan
pub fn validate_tile_layout(layout: &TileLayout, view_radius: f32) -> EngineResult<()> {
    require_positive("tile_layout.tile_world_size", layout.tile_world_size)?;
    require_positive("tile_lod.view_radius", view_radius)?;
    let reach = (view_radius / layout.tile_world_size).ceil() + 1.0;
    if reach > MAX_TILE_REACH as f32 {
        return Err(invalid(
            "tile_layout.tile_world_size",
            layout.tile_world_size,
            &format!("view radius {} spans more than {} tiles", view_radius, MAX_TILE_REACH),
        ));
    }
    Ok(())
}

/// Reject configs whose ranges or bands are inverted
pub fn validate_config(config: &EngineConfig) -> EngineResult<()> {
    let avatar = &config.avatar;
    require_positive("avatar.half_height", avatar.half_height)?;
    require_positive("avatar.walk_speed", avatar.walk_speed)?;
    require_positive("avatar.fly_speed", avatar.fly_speed)?;
    require_positive("avatar.vertical_fly_speed", avatar.vertical_fly_speed)?;

    let orbit = &config.orbit;
    require_positive("orbit.min_distance", orbit.min_distance)?;
    if orbit.max_distance <= orbit.min_distance {
        return Err(invalid(
            "orbit.max_distance",
            orbit.max_distance,
            "must exceed orbit.min_distance",
        ));
    }
    if orbit.max_pitch <= orbit.min_pitch {
        return Err(invalid(
            "orbit.max_pitch",
            orbit.max_pitch,
            "must exceed orbit.min_pitch",
        ));
    }
    if !(0.0..=1.0).contains(&orbit.avatar_blend) {
        return Err(invalid(
            "orbit.avatar_blend",
            orbit.avatar_blend,
            "must lie in [0, 1]",
        ));
    }

    let fly = &config.free_fly;
    require_positive("free_fly.base_speed", fly.base_speed)?;
    require_positive("free_fly.acceleration", fly.acceleration)?;
    require_positive("free_fly.deceleration", fly.deceleration)?;

    require_positive("gizmo.drag_sensitivity", config.gizmo.drag_sensitivity)?;
    require_positive("gizmo.min_scale", config.gizmo.min_scale)?;

    let lod = &config.tile_lod;
    if lod.high_exit_distance <= lod.high_enter_distance {
        return Err(invalid(
            "tile_lod.high_exit_distance",
            lod.high_exit_distance,
            "must exceed tile_lod.high_enter_distance",
        ));
    }
    if lod.low_enter_distance <= lod.low_exit_distance {
        return Err(invalid(
            "tile_lod.low_enter_distance",
            lod.low_enter_distance,
            "must exceed tile_lod.low_exit_distance",
        ));
    }
    if lod.low_exit_distance <= lod.high_exit_distance {
        return Err(invalid(
            "tile_lod.low_exit_distance",
            lod.low_exit_distance,
            "must exceed tile_lod.high_exit_distance",
        ));
    }
    require_positive("tile_lod.tile_world_size", lod.tile_world_size)?;
    require_positive("tile_lod.view_radius", lod.view_radius)?;

    let viewport = &config.viewport;
    if viewport.width == 0 || viewport.height == 0 {
        return Err(invalid(
            "viewport",
            format!("{}x{}", viewport.width, viewport.height),
            "must have a non-zero size",
        ));
    }

    Ok(())
}
