mod common;

use common::fixtures::*;
use common::{TestResult, publish, publish_with, small_config};
use gridpress::types::BoxContent;
use gridpress::{EngineConfig, ErrorKind};
use image::{ImageBuffer, Rgb};
use std::path::Path;
use tempfile::tempdir;

fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> TestResult {
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::new(width, height);
    img.save(dir.join(name))?;
    Ok(())
}

fn place_image(attributes: &str) -> String {
    layout(&record(
        "data",
        &format!("<PlaceObject><Image {}/></PlaceObject>", attributes),
    ))
}

#[test]
fn test_image_found_on_search_path_keeps_natural_size() -> TestResult {
    let dir = tempdir()?;
    write_png(dir.path(), "logo.png", 40, 20)?;
    let config = EngineConfig {
        search_paths: vec![dir.path().to_path_buf()],
        ..small_config()
    };
    let output = publish_with(config, &place_image(r#"file="logo.png""#), "<data/>")?;
    let item = &output.pages[0].items[0];
    assert_eq!((item.content.width(), item.content.height()), (40.0, 20.0));
    match &item.content.content {
        BoxContent::Image { source } => {
            assert_eq!(source, &dir.path().canonicalize()?.join("logo.png"))
        }
        other => panic!("expected an image, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_image_width_in_cells_keeps_aspect_ratio() -> TestResult {
    let dir = tempdir()?;
    write_png(dir.path(), "wide.png", 40, 20)?;
    let config = EngineConfig {
        search_paths: vec![dir.path().to_path_buf()],
        ..small_config()
    };
    let output = publish_with(config, &place_image(r#"file="wide.png" width="8""#), "<data/>")?;
    let image = &output.pages[0].items[0].content;
    assert_eq!((image.width(), image.height()), (80.0, 40.0));
    Ok(())
}

#[test]
fn test_image_max_bounds_and_stretch() -> TestResult {
    let bounded = place_image(
        r#"file="virtual.png" naturalwidth="200pt" naturalheight="100pt" maxwidth="5""#,
    );
    let output = publish(&bounded, "<data/>")?;
    let image = &output.pages[0].items[0].content;
    assert_eq!((image.width(), image.height()), (50.0, 25.0));

    let stretched = place_image(
        r#"file="virtual.png" naturalwidth="20pt" naturalheight="10pt" maxwidth="6" maxheight="6" stretch="yes""#,
    );
    let output = publish(&stretched, "<data/>")?;
    let image = &output.pages[0].items[0].content;
    assert_eq!((image.width(), image.height()), (60.0, 30.0));
    Ok(())
}

#[test]
fn test_missing_image_fails() {
    let err = publish(&place_image(r#"file="nowhere.png""#), "<data/>").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Resource(_)));
}
