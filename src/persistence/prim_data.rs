//! Region and prim records - Pure DOP
//!
//! NO METHODS. Just data.
//! Records mirror what the storage collaborator keeps; `PrimUpdate` is the
//! partial-update payload the write queue sends.

use cgmath::{Point3, Vector3};
use serde::{Deserialize, Serialize};

pub type PrimId = i64;
pub type RegionId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimShape {
    Box,
    Sphere,
    Cylinder,
    Cone,
    Torus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRecord {
    pub id: RegionId,
    pub name: String,
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimRecord {
    pub id: PrimId,
    pub region_id: RegionId,
    pub shape: PrimShape,
    pub position: [f32; 3],
    /// Euler angles (radians)
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
    /// `#rrggbb`
    pub color: String,
}

/// Live transform of a manipulable object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimTransform {
    pub position: Point3<f32>,
    /// Euler angles (radians)
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Default for PrimTransform {
    fn default() -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

/// Partial update. Absent fields are left untouched and omitted on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PrimUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_z: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_z: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_z: Option<f32>,
}
