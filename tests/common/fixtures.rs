use gridpress::LAYOUT_NAMESPACE;

/// Wraps rule elements in a `<Layout>` root.
pub fn layout(body: &str) -> String {
    format!(r#"<Layout xmlns="{}">{}</Layout>"#, LAYOUT_NAMESPACE, body)
}

/// Same as [`layout`] with a `version` requirement.
pub fn layout_with_version(version: &str, body: &str) -> String {
    format!(
        r#"<Layout xmlns="{}" version="{}">{}</Layout>"#,
        LAYOUT_NAMESPACE, version, body
    )
}

/// A `Record` rule for data elements named `element`.
pub fn record(element: &str, body: &str) -> String {
    format!(r#"<Record element="{}">{}</Record>"#, element, body)
}

/// Places a filled box of `width` x `height` (cells or lengths).
pub fn place_box(width: &str, height: &str) -> String {
    format!(
        r#"<PlaceObject><Box width="{}" height="{}"/></PlaceObject>"#,
        width, height
    )
}

/// Places a text block holding `select`'s value.
pub fn place_text(select: &str) -> String {
    format!(
        r#"<PlaceObject><Textblock><Paragraph><Value select="{}"/></Paragraph></Textblock></PlaceObject>"#,
        select
    )
}

/// A data document of `<data>` with `count` `<item n="i"/>` children.
pub fn items(count: usize) -> String {
    let children: String = (1..=count)
        .map(|i| format!(r#"<item n="{}"/>"#, i))
        .collect();
    format!("<data>{}</data>", children)
}
