mod common;

use common::fixtures::*;
use common::page_assertions::positions;
use common::{TestResult, publish};
use gridpress::ErrorKind;

fn boxes_per_item(width: &str, height: &str) -> String {
    layout(&record(
        "data",
        &format!(r#"<ForAll select="item">{}</ForAll>"#, place_box(width, height)),
    ))
}

#[test]
fn test_flow_fills_rows_left_to_right() -> TestResult {
    let output = publish(&boxes_per_item("3", "1"), &items(4))?;
    assert_page_count!(output, 1);
    assert_eq!(
        positions(&output.pages[0]),
        vec![(10.0, 10.0), (40.0, 10.0), (70.0, 10.0), (10.0, 20.0)]
    );
    Ok(())
}

#[test]
fn test_lengths_are_rounded_up_to_whole_cells() -> TestResult {
    // 25pt needs three 10pt cells, so the second box starts in column 4
    let output = publish(&boxes_per_item("25pt", "5pt"), &items(2))?;
    assert_eq!(positions(&output.pages[0]), vec![(10.0, 10.0), (40.0, 10.0)]);
    Ok(())
}

#[test]
fn test_full_page_continues_on_next_page() -> TestResult {
    let output = publish(&boxes_per_item("10", "5"), &items(3))?;
    assert_page_count!(output, 2);
    assert_eq!(positions(&output.pages[0]), vec![(10.0, 10.0), (10.0, 60.0)]);
    assert_eq!(positions(&output.pages[1]), vec![(10.0, 10.0)]);
    assert_eq!(output.pages[1].number, 2);
    assert_eq!(output.last_page, 2);
    Ok(())
}

#[test]
fn test_oversized_object_stays_on_its_page() -> TestResult {
    let output = publish(&boxes_per_item("10", "15"), &items(1))?;
    assert_page_count!(output, 1);
    assert_eq!(positions(&output.pages[0]), vec![(10.0, 10.0)]);
    Ok(())
}

#[test]
fn test_huge_box_overflows_without_crashing() -> TestResult {
    let output = publish(&layout(&record("data", &place_box("5000000000", "1"))), "<data/>")?;
    assert_page_count!(output, 1);
    assert_eq!(positions(&output.pages[0]), vec![(10.0, 10.0)]);

    let endless = format!("1{}", "0".repeat(400));
    let rules = layout(&record("data", &place_box(&endless, "1")));
    let err = publish(&rules, "<data/>").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::InvalidAttribute { attribute, .. } if attribute == "width"));
    Ok(())
}

#[test]
fn test_moved_cursor_sends_tall_object_to_next_page() -> TestResult {
    let rules = layout(&record(
        "data",
        &format!(
            r#"<PlaceObject x="25pt" y="35pt"><Box width="1" height="1"/></PlaceObject><NextRow rows="8"/>{}"#,
            place_box("1", "5")
        ),
    ));
    let output = publish(&rules, "<data/>")?;
    assert_page_count!(output, 2);
    assert_eq!(positions(&output.pages[0]), vec![(25.0, 35.0)]);
    assert_eq!(positions(&output.pages[1]), vec![(10.0, 10.0)]);
    Ok(())
}

#[test]
fn test_explicit_cell_then_flow() -> TestResult {
    let rules = layout(&record(
        "data",
        &format!(
            r#"<PlaceObject column="4" row="3"><Box width="2" height="2"/></PlaceObject>{}"#,
            place_box("1", "1")
        ),
    ));
    let output = publish(&rules, "<data/>")?;
    assert_eq!(positions(&output.pages[0]), vec![(40.0, 30.0), (60.0, 30.0)]);
    Ok(())
}

#[test]
fn test_absolute_position_allocates_nothing() -> TestResult {
    let rules = layout(&record(
        "data",
        &format!(
            r#"<PlaceObject x="25pt" y="35pt"><Box width="3" height="3"/></PlaceObject>{}"#,
            place_box("1", "1")
        ),
    ));
    let output = publish(&rules, "<data/>")?;
    assert_eq!(positions(&output.pages[0]), vec![(25.0, 35.0), (10.0, 10.0)]);
    Ok(())
}

#[test]
fn test_x_without_y_fails() {
    let rules = layout(&record(
        "data",
        r#"<PlaceObject x="25pt"><Box width="1" height="1"/></PlaceObject>"#,
    ));
    let err = publish(&rules, "<data/>").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Rule { element, .. } if element == "PlaceObject"));
    assert!(err.is_reported());
}

#[test]
fn test_place_object_needs_exactly_one_box() {
    let rules = layout(&record("data", "<PlaceObject><Value>text</Value></PlaceObject>"));
    assert!(publish(&rules, "<data/>").is_err());
}

#[test]
fn test_new_page_and_next_row() -> TestResult {
    let rules = layout(&record(
        "data",
        &format!(
            "{}<NextRow/>{}<NewPage/>{}",
            place_box("3", "1"),
            place_box("3", "1"),
            place_box("3", "1")
        ),
    ));
    let output = publish(&rules, "<data/>")?;
    assert_page_count!(output, 2);
    assert_eq!(positions(&output.pages[0]), vec![(10.0, 10.0), (10.0, 20.0)]);
    assert_eq!(positions(&output.pages[1]), vec![(10.0, 10.0)]);
    Ok(())
}

#[test]
fn test_new_page_without_content_emits_blank_page() -> TestResult {
    let rules = layout(&record("data", "<NewPage/>"));
    let output = publish(&rules, "<data/>")?;
    assert_page_count!(output, 1);
    assert!(output.pages[0].items.is_empty());
    Ok(())
}

#[test]
fn test_area_flows_through_its_frames() -> TestResult {
    let pagetype = r#"<Pagetype name="two columns" test="true()">
        <PositioningArea name="text">
            <PositioningFrame column="1" row="1" width="5" height="2"/>
            <PositioningFrame column="6" row="1" width="5" height="2"/>
        </PositioningArea>
    </Pagetype>"#;
    let rules = layout(&format!(
        "{}{}",
        pagetype,
        record(
            "data",
            r#"<ForAll select="item"><PlaceObject area="text"><Box width="5" height="2"/></PlaceObject></ForAll>"#,
        )
    ));
    let output = publish(&rules, &items(3))?;
    assert_page_count!(output, 2);
    assert_eq!(positions(&output.pages[0]), vec![(10.0, 10.0), (60.0, 10.0)]);
    assert_eq!(positions(&output.pages[1]), vec![(10.0, 10.0)]);
    assert!(output.pages.iter().all(|p| p.pagetype == "two columns"));
    Ok(())
}

#[test]
fn test_unknown_area_fails() {
    let rules = layout(&record(
        "data",
        r#"<PlaceObject area="nowhere"><Box width="1" height="1"/></PlaceObject>"#,
    ));
    let err = publish(&rules, "<data/>").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Layout(_)));
}

#[test]
fn test_set_grid_applies_to_new_pages() -> TestResult {
    let rules = layout(&record(
        "data",
        &format!(r#"<SetGrid nx="5" ny="5"/>{}{}"#, place_box("1", "1"), place_box("1", "1")),
    ));
    let output = publish(&rules, "<data/>")?;
    // five columns across 100pt make 20pt cells
    assert_eq!(positions(&output.pages[0]), vec![(10.0, 10.0), (30.0, 10.0)]);
    Ok(())
}

#[test]
fn test_text_block_takes_the_frame_width() -> TestResult {
    let rules = layout(&record("data", &place_text("'Hello grid'")));
    let output = publish(&rules, "<data/>")?;
    let item = &output.pages[0].items[0];
    assert_eq!(item.content.width(), 100.0);
    assert_eq!(item.content.height(), 10.0);
    assert_page_has_text!(output.pages[0], "Hello grid");
    Ok(())
}
