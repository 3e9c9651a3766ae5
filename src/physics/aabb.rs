/// Axis-aligned boxes for handle and object picking
///
/// Pure functions, no methods.

use super::ray::Ray;
use cgmath::{Point3, Vector3};

/// Axis-Aligned Bounding Box - pure data structure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

pub fn aabb_from_center_half_extents(center: Point3<f32>, half_extents: Vector3<f32>) -> AABB {
    AABB {
        min: center - half_extents,
        max: center + half_extents,
    }
}

/// Slab test. Returns the entry distance along the ray, 0 when the origin
/// is inside the box.
pub fn ray_aabb_intersection(ray: &Ray, aabb: &AABB) -> Option<f32> {
    let origin: [f32; 3] = ray.origin.into();
    let direction: [f32; 3] = ray.direction.into();
    let lo: [f32; 3] = aabb.min.into();
    let hi: [f32; 3] = aabb.max.into();

    let mut near = 0.0f32;
    let mut far = f32::INFINITY;
    for axis in 0..3 {
        if direction[axis].abs() < 1e-6 {
            if origin[axis] < lo[axis] || origin[axis] > hi[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / direction[axis];
        let (a, b) = ((lo[axis] - origin[axis]) * inv, (hi[axis] - origin[axis]) * inv);
        near = near.max(a.min(b));
        far = far.min(a.max(b));
        if near > far {
            return None;
        }
    }
    Some(near)
}
