mod common;

use common::fixtures::*;
use common::{TestResult, publish, publish_with, small_config};
use gridpress::{ENGINE_VERSION, EngineConfig, ErrorKind, Publisher};

#[test]
fn test_wrong_namespace_is_rejected() {
    let rules = r#"<Layout xmlns="urn:somebody:else"/>"#;
    let err = publish(rules, "<data/>").unwrap_err();
    assert!(
        matches!(err.kind(), ErrorKind::NamespaceMismatch { found, .. } if found == "urn:somebody:else")
    );
}

#[test]
fn test_malformed_documents() {
    let err = publish("<Layout", "<data/>").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::RuleSyntax(_)));

    let err = publish(&layout(""), "<data>").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::DataSyntax(_)));
}

#[test]
fn test_newer_version_is_rejected_unless_ignored() -> TestResult {
    let rules = layout_with_version("99.0", &record("data", &place_box("1", "1")));
    let err = publish(&rules, "<data/>").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Version(_)));

    let config = EngineConfig {
        ignore_version: true,
        ..small_config()
    };
    let output = publish_with(config, &rules, "<data/>")?;
    assert_page_count!(output, 1);

    let current = layout_with_version(ENGINE_VERSION, &record("data", &place_box("1", "1")));
    assert!(publish(&current, "<data/>").is_ok());
    Ok(())
}

#[test]
fn test_missing_root_rule() {
    let rules = layout(&record("other", &place_box("1", "1")));
    let err = publish(&rules, "<data/>").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::MissingRootRule(name) if name == "data"));
}

#[test]
fn test_missing_attribute_names_element_and_line() {
    let rules = layout(&record("data", "\n<PlaceObject><Box width=\"1\"/></PlaceObject>"));
    let err = publish(&rules, "<data/>").unwrap_err();
    match err.kind() {
        ErrorKind::MissingAttribute {
            element,
            attribute,
            line,
        } => {
            assert_eq!(element, "Box");
            assert_eq!(attribute, "height");
            assert_eq!(*line, 2);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_invalid_attribute_values() {
    let cases = [
        r#"<PlaceObject column="two"><Box width="1" height="1"/></PlaceObject>"#,
        r#"<PlaceObject allocate="maybe"><Box width="1" height="1"/></PlaceObject>"#,
        r#"<PlaceObject><Box width="1furlong" height="1"/></PlaceObject>"#,
        r#"<Loop select="'many'"><Value>x</Value></Loop>"#,
        r#"<ForAll select="1"><Value>x</Value></ForAll>"#,
    ];
    for body in cases {
        let rules = layout(&record("data", body));
        assert!(publish(&rules, "<data/>").is_err(), "{} should fail", body);
    }
}

#[test]
fn test_invalid_configuration_fails_to_build() {
    let config = EngineConfig {
        cell_width: 0.0,
        ..small_config()
    };
    let err = Publisher::builder().with_config(config).build().err();
    assert!(matches!(err.as_ref().map(|e| e.kind()), Some(ErrorKind::Config(_))));
}

#[test]
fn test_page_without_room_for_a_cell() {
    let config = EngineConfig {
        cell_width: 500.0,
        ..small_config()
    };
    let rules = layout(&record("data", &place_box("10pt", "10pt")));
    let err = publish_with(config, &rules, "<data/>").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Layout(_)));
}
