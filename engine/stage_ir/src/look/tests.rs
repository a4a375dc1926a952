use super::*;

#[test]
fn test_default_look_is_neutral() {
    let look = Look::default();
    assert_eq!(look.direction(), 90.0);
    assert_eq!(look.size(), 100.0);
    assert_eq!(look.transparency(), 0.0);
    assert_eq!(look.brightness(), 100.0);
    assert!(look.visible);
}

#[test]
fn test_effects_clamp_to_range() {
    let mut look = Look::default();
    look.set_transparency(140.0);
    assert_eq!(look.transparency(), 100.0);
    look.set_transparency(-3.0);
    assert_eq!(look.transparency(), 0.0);
    look.set_brightness(250.0);
    assert_eq!(look.brightness(), 200.0);
    look.set_size(-20.0);
    assert_eq!(look.size(), 0.0);
}

#[test]
fn test_clear_graphic_effects() {
    let mut look = Look::default();
    look.set_transparency(80.0);
    look.set_brightness(80.0);
    look.clear_graphic_effects();
    assert_eq!(look.transparency(), 0.0);
    assert_eq!(look.brightness(), 100.0);
}

#[test]
fn test_normalize_direction() {
    assert_eq!(normalize_direction(90.0), 90.0);
    assert_eq!(normalize_direction(180.0), 180.0);
    assert_eq!(normalize_direction(-180.0), 180.0);
    assert_eq!(normalize_direction(270.0), -90.0);
    assert_eq!(normalize_direction(-450.0), -90.0);
    assert_eq!(normalize_direction(f64::NAN), 90.0);
}

#[test]
fn test_rotation_is_relative_to_facing_right() {
    let mut look = Look::default();
    assert_eq!(look.rotation(), 0.0);
    look.set_direction(0.0);
    assert_eq!(look.rotation(), 90.0);
}

#[test]
fn test_deserialize_clamps_out_of_range_fields() {
    let json = r#"{"x": 4, "transparency": 500, "brightness": -40, "size": -10, "direction": 270}"#;
    let look: Look = serde_json::from_str(json).unwrap();
    assert_eq!(look.x, 4.0);
    assert_eq!(look.transparency(), 100.0);
    assert_eq!(look.brightness(), 0.0);
    assert_eq!(look.size(), 0.0);
    assert_eq!(look.direction(), -90.0);
    assert!(look.visible);
}

#[test]
fn test_deserialize_missing_fields_use_defaults() {
    let look: Look = serde_json::from_str("{}").unwrap();
    assert_eq!(look, Look::default());
}
