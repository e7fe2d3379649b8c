mod common;

use common::fixtures::*;
use common::{TestResult, publish_with, small_config};
use gridpress::{EngineConfig, ErrorKind, Publisher};
use std::path::Path;
use tempfile::tempdir;

/// A reference on page 1 to a marker set on page 2.
fn forward_reference() -> String {
    layout(&record(
        "book",
        &format!(
            r#"{}<NewPage/><Mark select="'end'"/>{}"#,
            place_text("concat('See page ', sd:pagenumber('end'))"),
            place_box("1", "1")
        ),
    ))
}

fn aux_config(dir: &Path) -> EngineConfig {
    EngineConfig {
        jobname: "book".to_string(),
        aux_dir: dir.to_path_buf(),
        write_aux: true,
        strict_references: false,
        ..small_config()
    }
}

#[test]
fn test_forward_reference_resolves_on_second_run() -> TestResult {
    let dir = tempdir()?;
    let publisher = Publisher::builder().with_config(aux_config(dir.path())).build()?;

    let first = publisher.run(&forward_reference(), "<book/>")?;
    assert_page_count!(first, 2);
    assert_page_has_text!(first.pages[0], "See page ??");
    assert_eq!(first.markers.len(), 1);
    assert_eq!(first.markers[0].name, "end");
    assert_eq!(first.markers[0].page, 2);
    assert!(dir.path().join("book-aux.xml").exists());

    let second = publisher.run(&forward_reference(), "<book/>")?;
    assert_page_has_text!(second.pages[0], "See page 2");
    Ok(())
}

#[test]
fn test_unresolved_reference_fails_in_strict_mode() -> TestResult {
    let dir = tempdir()?;
    let config = EngineConfig {
        strict_references: true,
        ..aux_config(dir.path())
    };
    let err = publish_with(config, &forward_reference(), "<book/>").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Expression { .. }));
    // a failed run leaves no aux file behind
    assert!(!dir.path().join("book-aux.xml").exists());
    Ok(())
}

#[test]
fn test_backward_reference_resolves_in_one_run() -> TestResult {
    let rules = layout(&record(
        "book",
        &format!(
            r#"<Mark select="'start'"/>{}<NewPage/>{}"#,
            place_box("1", "1"),
            place_text("concat('Back to ', sd:pagenumber('start'))")
        ),
    ));
    let output = publish_with(small_config(), &rules, "<book/>")?;
    assert_page_has_text!(output.pages[1], "Back to 1");
    Ok(())
}

#[test]
fn test_marker_points_at_the_next_placed_object() -> TestResult {
    let rules = layout(&record(
        "book",
        &format!(
            r#"{}<Mark select="'second'" pdftarget="yes"/>{}{}"#,
            place_box("1", "1"),
            place_box("1", "1"),
            place_box("1", "1")
        ),
    ));
    let output = publish_with(small_config(), &rules, "<book/>")?;
    let marker = &output.markers[0];
    assert!(marker.pdftarget);
    let destinations: Vec<Option<u64>> =
        output.pages[0].items.iter().map(|i| i.destination).collect();
    assert_eq!(destinations, vec![None, Some(marker.id), None]);
    Ok(())
}

#[test]
fn test_number_of_pages_comes_from_the_previous_run() -> TestResult {
    let dir = tempdir()?;
    let publisher = Publisher::builder().with_config(aux_config(dir.path())).build()?;
    let rules = layout(&record(
        "book",
        &format!(
            "{}<NewPage/>{}<NewPage/>{}",
            place_box("1", "1"),
            place_box("1", "1"),
            place_text("concat('of ', sd:number-of-pages())")
        ),
    ));

    publisher.run(&rules, "<book/>")?;
    let second = publisher.run(&rules, "<book/>")?;
    assert_page_count!(second, 3);
    assert_page_has_text!(second.pages[2], "of 3");
    Ok(())
}

#[test]
fn test_duplicate_marker_keeps_the_last_position() -> TestResult {
    let rules = layout(&record(
        "book",
        &format!(
            r#"<Mark select="'dup'"/>{}<NewPage/><Mark select="'dup'"/>{}"#,
            place_box("1", "1"),
            place_box("1", "1")
        ),
    ));
    let output = publish_with(small_config(), &rules, "<book/>")?;
    assert_eq!(output.markers.len(), 1);
    assert_eq!(output.markers[0].page, 2);
    Ok(())
}

#[test]
fn test_empty_marker_name_fails() {
    let rules = layout(&record("book", r#"<Mark select="''"/>"#));
    assert!(publish_with(small_config(), &rules, "<book/>").is_err());
}
