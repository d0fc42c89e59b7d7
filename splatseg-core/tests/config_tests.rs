#![cfg(feature = "serde")]

use std::io::Write;

use approx::assert_relative_eq;
use splatseg_core::{
    EngineCommand, Error, PhantomConfig, Rgb, SegmentationPalette, SplatScene, DEFAULT_THRESHOLD,
};

#[test]
fn test_palette_from_json() {
    let json = r#"[
        {"label": "Skull", "color": [255, 0, 0], "threshold": 0.25},
        {"label": "Skin", "color": [0, 128, 255]}
    ]"#;
    let palette = SegmentationPalette::from_json_reader(json.as_bytes()).unwrap();

    assert_eq!(palette.labels().collect::<Vec<_>>(), ["Skull", "Skin"]);
    assert_eq!(palette.color_of("Skin").unwrap(), Rgb::new(0, 128, 255));
    assert_relative_eq!(palette.threshold_of("Skull").unwrap(), 0.25);
    assert_relative_eq!(palette.threshold_of("Skin").unwrap(), DEFAULT_THRESHOLD);
}

#[test]
fn test_palette_file_validation() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[{{"label": "Grey", "color": [128, 128, 128]}}, {{"label": "Grey", "color": [1, 2, 3]}}]"#
    )
    .unwrap();

    let err = SegmentationPalette::load_json(file.path()).unwrap_err();
    assert!(matches!(err, Error::DuplicateLabel(ref l) if l == "Grey"));
}

#[test]
fn test_palette_malformed_json() {
    let err = SegmentationPalette::from_json_reader(&b"{\"label\": 1}"[..]).unwrap_err();
    assert!(matches!(err, Error::Json(_)));
}

#[test]
fn test_scene_file_round_trip() {
    let palette = SegmentationPalette::reference();
    let scene = SplatScene::phantom(&palette, &PhantomConfig::new().with_resolution(6));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("phantom.json");
    scene.save_json(&path).unwrap();

    assert_eq!(SplatScene::load_json(&path).unwrap(), scene);
}

#[test]
fn test_command_json_shape() {
    let cmd = EngineCommand::add_color(Rgb::new(255, 0, 0), 0.5);
    let value = serde_json::to_value(cmd).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "command": "selectByColor",
            "op": "ADD",
            "color": [255, 0, 0],
            "threshold": 0.5
        })
    );
}
