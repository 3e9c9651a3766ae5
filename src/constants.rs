//! Engine tuning constants
//!
//! Defaults for every config section. Distances are meters, angles radians,
//! times seconds unless the name says otherwise.

use std::f32::consts::{FRAC_PI_2, PI};

// ============================================================================
// GROUND PROBE
// ============================================================================

/// Height above the query point the downward ray starts from
pub const PROBE_RAY_START_HEIGHT: f32 = 20.0;

/// Ground height reported when no terrain surface is hit
pub const DEFAULT_GROUND_HEIGHT: f32 = 0.0;

/// Minimum interval between terrain surface cache rebuilds
pub const SURFACE_CACHE_REFRESH_MS: u64 = 500;

/// Triangles flatter than this (normal.y) count as walkable terrain
pub const HORIZONTAL_NORMAL_MIN_Y: f32 = 0.2;

// ============================================================================
// AVATAR
// ============================================================================

pub const AVATAR_HALF_HEIGHT: f32 = 1.0;
pub const AVATAR_WALK_SPEED: f32 = 8.0;
pub const AVATAR_FLY_SPEED: f32 = 40.0;
pub const AVATAR_TURN_RATE: f32 = 2.0;
pub const AVATAR_VERTICAL_FLY_SPEED: f32 = 40.0;
pub const GRAVITY: f32 = -9.8;

/// Within this distance of the minimum height, flying descent is cancelled
pub const GROUND_CONTACT_EPSILON: f32 = 0.1;

// ============================================================================
// ORBIT CAMERA
// ============================================================================

pub const ORBIT_MIN_DISTANCE: f32 = 2.0;
pub const ORBIT_MAX_DISTANCE: f32 = 100.0;
pub const ORBIT_DEFAULT_DISTANCE: f32 = 12.0;
pub const ORBIT_MIN_PITCH: f32 = -PI / 3.0;
pub const ORBIT_MAX_PITCH: f32 = PI / 2.5;
pub const ORBIT_DEFAULT_PITCH: f32 = 0.35;
pub const ORBIT_HEAD_HEIGHT: f32 = 1.5;
pub const ORBIT_ROTATE_SENSITIVITY: f32 = 0.005;
/// Meters of orbit distance per wheel line
pub const ORBIT_ZOOM_SENSITIVITY: f32 = 1.0;
pub const ORBIT_PAN_SENSITIVITY: f32 = 0.02;

/// Per-frame blend toward the true avatar position (not scaled by delta time)
pub const ORBIT_AVATAR_BLEND: f32 = 0.2;

pub const ORBIT_FOLLOW_SPEED_FLYING: f32 = 8.0;
pub const ORBIT_FOLLOW_SPEED_WALKING: f32 = 4.0;

/// Camera stays at least this far above the ground under it
pub const CAMERA_GROUND_CLEARANCE: f32 = 0.5;

/// Ground clamp is skipped for avatars at or above this height
pub const GROUND_CLAMP_MAX_AVATAR_HEIGHT: f32 = 10.0;

/// Ground clamp is skipped at or below this orbit distance
pub const GROUND_CLAMP_MIN_DISTANCE: f32 = 4.0;

// ============================================================================
// FREE-FLY CAMERA
// ============================================================================

pub const FREE_FLY_PITCH_LIMIT: f32 = FRAC_PI_2 - 0.1;
pub const FREE_FLY_LOOK_SENSITIVITY: f32 = 0.003;
pub const FREE_FLY_BASE_SPEED: f32 = 20.0;
pub const FREE_FLY_FAST_SPEED: f32 = 50.0;
pub const FREE_FLY_SLOW_SPEED: f32 = 5.0;
pub const FREE_FLY_ACCELERATION: f32 = 50.0;
pub const FREE_FLY_DECELERATION: f32 = 30.0;

/// Focus point distance along camera forward when the entry raycast misses
pub const FREE_FLY_FOCUS_FALLBACK_DISTANCE: f32 = 10.0;

// ============================================================================
// GIZMO
// ============================================================================

/// World units per pixel per meter of camera distance
pub const GIZMO_DRAG_SENSITIVITY: f32 = 0.0015;
pub const GIZMO_ROTATE_SENSITIVITY: f32 = 2.0;
pub const GIZMO_SCALE_SENSITIVITY: f32 = 0.5;
pub const GIZMO_MIN_SCALE: f32 = 0.1;

/// Exclusive input stays claimed this long after a drag ends
pub const INPUT_RELEASE_GRACE_MS: u64 = 100;

/// Press/release closer than this (pixels) is a click rather than a drag
pub const CLICK_MAX_TRAVEL_PX: f32 = 4.0;

// ============================================================================
// TILE LOD
// ============================================================================

pub const TILE_HIGH_EXIT_DISTANCE: f32 = 140.0;
pub const TILE_HIGH_ENTER_DISTANCE: f32 = 120.0;
pub const TILE_LOW_ENTER_DISTANCE: f32 = 280.0;
pub const TILE_LOW_EXIT_DISTANCE: f32 = 250.0;
pub const TILE_EVALUATION_INTERVAL_MS: u64 = 500;

/// Edge length of one map tile in world meters
pub const TILE_WORLD_SIZE: f32 = 100.0;

/// Tiles whose center lies within this distance of the viewer are visible
pub const TILE_VIEW_RADIUS: f32 = 600.0;

/// Tiles scanned in each direction from the viewer's tile, at most
pub const MAX_TILE_REACH: i32 = 64;

// ============================================================================
// PERSISTENCE
// ============================================================================

/// Idle window after the last delta before a pending write is flushed
pub const WRITE_DEBOUNCE_MS: u64 = 400;

// ============================================================================
// VIEWPORT
// ============================================================================

pub const VIEWPORT_FOV_DEGREES: f32 = 60.0;
pub const VIEWPORT_NEAR_PLANE: f32 = 0.1;
pub const VIEWPORT_FAR_PLANE: f32 = 5000.0;
