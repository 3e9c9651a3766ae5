//! Prim record operations - Pure DOP functions

use super::prim_data::{PrimRecord, PrimTransform, PrimUpdate};
use cgmath::{Point3, Vector3};

/// Changes smaller than this are not worth a write
const FIELD_EPSILON: f32 = 1e-6;

pub fn record_transform(record: &PrimRecord) -> PrimTransform {
    PrimTransform {
        position: Point3::from(record.position),
        rotation: Vector3::from(record.rotation),
        scale: Vector3::from(record.scale),
    }
}

pub fn set_record_transform(record: &mut PrimRecord, transform: &PrimTransform) {
    record.position = transform.position.into();
    record.rotation = transform.rotation.into();
    record.scale = transform.scale.into();
}

fn changed(before: f32, after: f32) -> Option<f32> {
    ((after - before).abs() > FIELD_EPSILON).then_some(after)
}

/// Update holding only the fields that differ between two transforms
pub fn diff_transform(before: &PrimTransform, after: &PrimTransform) -> PrimUpdate {
    PrimUpdate {
        position_x: changed(before.position.x, after.position.x),
        position_y: changed(before.position.y, after.position.y),
        position_z: changed(before.position.z, after.position.z),
        rotation_x: changed(before.rotation.x, after.rotation.x),
        rotation_y: changed(before.rotation.y, after.rotation.y),
        rotation_z: changed(before.rotation.z, after.rotation.z),
        scale_x: changed(before.scale.x, after.scale.x),
        scale_y: changed(before.scale.y, after.scale.y),
        scale_z: changed(before.scale.z, after.scale.z),
    }
}

/// Combine two updates; fields set in `later` win
pub fn merge_updates(earlier: &PrimUpdate, later: &PrimUpdate) -> PrimUpdate {
    PrimUpdate {
        position_x: later.position_x.or(earlier.position_x),
        position_y: later.position_y.or(earlier.position_y),
        position_z: later.position_z.or(earlier.position_z),
        rotation_x: later.rotation_x.or(earlier.rotation_x),
        rotation_y: later.rotation_y.or(earlier.rotation_y),
        rotation_z: later.rotation_z.or(earlier.rotation_z),
        scale_x: later.scale_x.or(earlier.scale_x),
        scale_y: later.scale_y.or(earlier.scale_y),
        scale_z: later.scale_z.or(earlier.scale_z),
    }
}

pub fn is_empty_update(update: &PrimUpdate) -> bool {
    *update == PrimUpdate::default()
}

pub fn apply_update(transform: &PrimTransform, update: &PrimUpdate) -> PrimTransform {
    PrimTransform {
        position: Point3::new(
            update.position_x.unwrap_or(transform.position.x),
            update.position_y.unwrap_or(transform.position.y),
            update.position_z.unwrap_or(transform.position.z),
        ),
        rotation: Vector3::new(
            update.rotation_x.unwrap_or(transform.rotation.x),
            update.rotation_y.unwrap_or(transform.rotation.y),
            update.rotation_z.unwrap_or(transform.rotation.z),
        ),
        scale: Vector3::new(
            update.scale_x.unwrap_or(transform.scale.x),
            update.scale_y.unwrap_or(transform.scale.y),
            update.scale_z.unwrap_or(transform.scale.z),
        ),
    }
}

/// Every set field must be finite
pub fn validate_update(update: &PrimUpdate) -> Result<(), String> {
    let fields = [
        ("position_x", update.position_x),
        ("position_y", update.position_y),
        ("position_z", update.position_z),
        ("rotation_x", update.rotation_x),
        ("rotation_y", update.rotation_y),
        ("rotation_z", update.rotation_z),
        ("scale_x", update.scale_x),
        ("scale_y", update.scale_y),
        ("scale_z", update.scale_z),
    ];
    match fields
        .iter()
        .find(|(_, value)| value.map_or(false, |v| !v.is_finite()))
    {
        Some((name, _)) => Err(format!("{} is not finite", name)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::PrimShape;

    #[test]
    fn test_diff_only_changed_fields() {
        let before = PrimTransform::default();
        let mut after = before;
        after.position.x = 2.5;
        after.scale.z = 0.5;

        let update = diff_transform(&before, &after);
        assert_eq!(update.position_x, Some(2.5));
        assert_eq!(update.scale_z, Some(0.5));
        assert_eq!(update.position_y, None);
        assert_eq!(update.rotation_x, None);
        assert!(is_empty_update(&diff_transform(&before, &before)));
    }

    #[test]
    fn test_merge_later_wins() {
        let earlier = PrimUpdate {
            position_x: Some(1.0),
            position_y: Some(1.0),
            ..PrimUpdate::default()
        };
        let later = PrimUpdate {
            position_x: Some(3.0),
            ..PrimUpdate::default()
        };
        let merged = merge_updates(&earlier, &later);
        assert_eq!(merged.position_x, Some(3.0));
        assert_eq!(merged.position_y, Some(1.0));
    }

    #[test]
    fn test_absent_fields_not_serialized() {
        let update = PrimUpdate {
            rotation_y: Some(0.5),
            ..PrimUpdate::default()
        };
        let json = serde_json::to_string(&update).expect("Failed to serialize update");
        assert_eq!(json, r#"{"rotation_y":0.5}"#);
    }

    #[test]
    fn test_record_json_shape() {
        let json = r##"{"id":7,"region_id":1,"shape":"torus","position":[1.0,2.0,3.0],
            "rotation":[0.0,0.0,0.0],"scale":[1.0,1.0,1.0],"color":"#ff8800"}"##;
        let record: PrimRecord = serde_json::from_str(json).expect("Failed to parse record");
        assert_eq!(record.shape, PrimShape::Torus);
        assert_eq!(record_transform(&record).position, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_apply_update_and_validate() {
        let update = PrimUpdate {
            scale_y: Some(2.0),
            ..PrimUpdate::default()
        };
        let applied = apply_update(&PrimTransform::default(), &update);
        assert_eq!(applied.scale, Vector3::new(1.0, 2.0, 1.0));

        let bad = PrimUpdate {
            position_z: Some(f32::NAN),
            ..PrimUpdate::default()
        };
        assert!(validate_update(&bad).is_err());
        assert!(validate_update(&update).is_ok());
    }
}
