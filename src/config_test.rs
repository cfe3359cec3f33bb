#![allow(clippy::float_cmp)]

use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn empty_lookup_yields_defaults() {
    let config = EditorConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(config, EditorConfig::default());
    assert_eq!(config.grid_size, 20.0);
    assert_eq!(config.min_size, 20.0);
    assert_eq!(config.canvas_image_width, 300.0);
    assert_eq!(config.popout_image_width, 500.0);
    assert_eq!(config.placement_offset, 20.0);
}

#[test]
fn overrides_are_parsed() {
    let config = EditorConfig::from_lookup(lookup_from(&[
        (GRID_SIZE_VAR, "10"),
        (CANVAS_IMAGE_WIDTH_VAR, " 250.5 "),
        (PLACEMENT_OFFSET_VAR, "0"),
    ]))
    .unwrap();
    assert_eq!(config.grid_size, 10.0);
    assert_eq!(config.canvas_image_width, 250.5);
    assert_eq!(config.placement_offset, 0.0);
    assert_eq!(config.min_size, 20.0);
}

#[test]
fn non_numeric_value_is_rejected() {
    let err = EditorConfig::from_lookup(lookup_from(&[(GRID_SIZE_VAR, "twenty")])).unwrap_err();
    assert_eq!(
        err,
        ConfigError::Invalid {
            var: GRID_SIZE_VAR.into(),
            value: "twenty".into()
        }
    );
}

#[test]
fn zero_grid_is_rejected() {
    let lookup = lookup_from(&[(GRID_SIZE_VAR, "0")]);
    assert!(EditorConfig::from_lookup(lookup).is_err());
}

#[test]
fn negative_offset_is_rejected() {
    let lookup = lookup_from(&[(PLACEMENT_OFFSET_VAR, "-5")]);
    assert!(EditorConfig::from_lookup(lookup).is_err());
}

#[test]
fn infinite_min_size_is_rejected() {
    let lookup = lookup_from(&[(MIN_SIZE_VAR, "inf")]);
    assert!(EditorConfig::from_lookup(lookup).is_err());
}
