use cgmath::{InnerSpace, Point3, Vector3};

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Straight down from `origin`
    pub fn downward(origin: Point3<f32>) -> Self {
        Self {
            origin,
            direction: Vector3::new(0.0, -1.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Point3<f32>,
    pub distance: f32,
}

pub fn ray_point_at(ray: &Ray, t: f32) -> Point3<f32> {
    ray.origin + ray.direction * t
}

/// Möller–Trumbore; double sided. Returns the distance along the ray.
pub fn ray_triangle_intersection(ray: &Ray, triangle: &[Point3<f32>; 3]) -> Option<f32> {
    const EPSILON: f32 = 1e-7;

    let edge1 = triangle[1] - triangle[0];
    let edge2 = triangle[2] - triangle[0];
    let p = ray.direction.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = ray.origin - triangle[0];
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = ray.direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    (t >= 0.0).then_some(t)
}

/// Intersect with the horizontal plane y = `height`, limited to an XZ rectangle
pub fn ray_horizontal_rect_intersection(
    ray: &Ray,
    height: f32,
    min_xz: [f32; 2],
    max_xz: [f32; 2],
) -> Option<f32> {
    if ray.direction.y.abs() < 1e-6 {
        return None;
    }
    let t = (height - ray.origin.y) / ray.direction.y;
    if t < 0.0 {
        return None;
    }
    let hit = ray_point_at(ray, t);
    let inside = hit.x >= min_xz[0] && hit.x <= max_xz[0] && hit.z >= min_xz[1] && hit.z <= max_xz[1];
    inside.then_some(t)
}

pub fn triangle_normal(triangle: &[Point3<f32>; 3]) -> Vector3<f32> {
    let n = (triangle[1] - triangle[0]).cross(triangle[2] - triangle[0]);
    if n.magnitude2() > 0.0 {
        n.normalize()
    } else {
        n
    }
}
