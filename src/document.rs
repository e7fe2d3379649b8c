//! Per-run state: the current page or group, registries, markers.
use crate::error::{ErrorKind, PublishError};
use crate::output::{PageOutput, PageSink};
use crate::patterns::DataPatternRegistry;
use gridpress_layout::{
    Grid, GridSettings, Group, LayoutError, Page, PageType, PageTypeRegistry, next_id,
};
use gridpress_style::Margins;
use gridpress_types::{ContentBox, Size};
use gridpress_xref::{Marker, ReferenceTracker};
use log::{debug, info};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageState {
    #[default]
    Idle,
    CreatingPage,
}

pub struct Document<'s> {
    pub(crate) pagetypes: PageTypeRegistry,
    pub(crate) patterns: DataPatternRegistry,
    pub(crate) tracker: ReferenceTracker,
    grid_settings: GridSettings,
    page_size: Size,
    margins: Margins,
    strict_references: bool,
    page: Option<Page>,
    /// Groups being filled, innermost last. While non-empty no page is created.
    open_groups: Vec<Group>,
    groups: HashMap<String, Group>,
    page_count: u32,
    state: PageState,
    /// Destination id of the last marker, attached to the next placed object.
    pending_destination: Option<u64>,
    /// Marker set while no page was open; it moves to the page its object lands on.
    unplaced_marker: Option<String>,
    sink: &'s mut dyn PageSink,
}

impl<'s> Document<'s> {
    pub fn new(
        page_size: Size,
        margins: Margins,
        grid_settings: GridSettings,
        tracker: ReferenceTracker,
        sink: &'s mut dyn PageSink,
    ) -> Self {
        Self {
            pagetypes: PageTypeRegistry::new(margins),
            patterns: DataPatternRegistry::new(),
            tracker,
            grid_settings,
            page_size,
            margins,
            strict_references: true,
            page: None,
            open_groups: Vec::new(),
            groups: HashMap::new(),
            page_count: 0,
            state: PageState::Idle,
            pending_destination: None,
            unplaced_marker: None,
            sink,
        }
    }

    pub fn with_strict_references(mut self, strict: bool) -> Self {
        self.strict_references = strict;
        self
    }

    pub fn strict_references(&self) -> bool {
        self.strict_references
    }

    pub fn default_margins(&self) -> Margins {
        self.margins
    }

    pub fn grid_settings(&self) -> &GridSettings {
        &self.grid_settings
    }

    /// Settings for pages created from now on.
    pub fn set_grid_settings(&mut self, settings: GridSettings) {
        self.grid_settings = settings;
    }

    pub fn tracker(&self) -> &ReferenceTracker {
        &self.tracker
    }

    pub fn page(&self) -> Option<&Page> {
        self.page.as_ref()
    }

    /// Pages created so far, including the open one.
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Number of the open page, or of the page that would be created next.
    pub fn current_page_number(&self) -> u32 {
        match &self.page {
            Some(page) => page.number,
            None => self.page_count + 1,
        }
    }

    pub fn state(&self) -> PageState {
        self.state
    }

    pub fn in_group(&self) -> bool {
        !self.open_groups.is_empty()
    }

    /// Whether content can be placed without creating a page first.
    pub fn has_target(&self) -> bool {
        self.in_group() || self.page.is_some()
    }

    /// The grid placements go to: the innermost open group, else the page.
    pub fn target_grid(&self) -> Option<&Grid> {
        match self.open_groups.last() {
            Some(group) => Some(&group.grid),
            None => self.page.as_ref().map(|p| &p.grid),
        }
    }

    pub fn target_grid_mut(&mut self) -> Option<&mut Grid> {
        match self.open_groups.last_mut() {
            Some(group) => Some(&mut group.grid),
            None => self.page.as_mut().map(|p| &mut p.grid),
        }
    }

    // --- Pages ---

    /// Enters page creation. Fails if a page is already being created.
    pub fn begin_page_creation(&mut self) -> Result<(), PublishError> {
        if self.state == PageState::CreatingPage {
            return Err(ErrorKind::ReentrantPageCreation.into());
        }
        self.state = PageState::CreatingPage;
        Ok(())
    }

    pub fn end_page_creation(&mut self) {
        self.state = PageState::Idle;
    }

    /// Opens a new page of the given type, finishing the open one first.
    pub fn install_page(&mut self, pagetype: &PageType) -> Result<(), PublishError> {
        self.finish_page()?;
        let number = self.page_count + 1;
        let page = Page::new(number, pagetype, self.page_size, &self.grid_settings)?;
        info!(
            "Page {} uses page type '{}' ({}x{} cells)",
            number, pagetype.name, page.grid.nx, page.grid.ny
        );
        self.page_count = number;
        self.page = Some(page);
        Ok(())
    }

    /// Hands the open page to the sink. `false` when no page was open.
    pub fn finish_page(&mut self) -> Result<bool, PublishError> {
        match self.page.take() {
            Some(page) => {
                debug!("Finishing page {}", page.number);
                self.sink.ship_page(PageOutput::from(page))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Finishes the last page and returns the markers and the page count.
    pub fn finish(mut self) -> Result<(ReferenceTracker, u32), PublishError> {
        self.finish_page()?;
        Ok((self.tracker, self.page_count))
    }

    // --- Groups ---

    /// Makes a fresh group current. Its grid has the width of the page grid the
    /// document defaults produce.
    pub fn start_group(&mut self, name: &str) -> Result<(), PublishError> {
        let grid = match self.target_grid() {
            Some(grid) => grid.group_grid(),
            None => Grid::for_page(self.page_size, self.margins, &self.grid_settings)?.group_grid(),
        };
        debug!("Group '{}' started ({} columns)", name, grid.nx);
        self.open_groups.push(Group::new(name, grid));
        Ok(())
    }

    /// Closes the innermost group, measures it and registers it under its name.
    /// `None` when no group is open.
    pub fn end_group(&mut self) -> Option<Size> {
        let mut group = self.open_groups.pop()?;
        let size = group.finish();
        debug!(
            "Group '{}' measured {:.2}pt x {:.2}pt",
            group.name, size.width, size.height
        );
        if self.groups.insert(group.name.clone(), group).is_some() {
            debug!("Previous group of the same name replaced");
        }
        Some(size)
    }

    pub fn group(&self, name: &str) -> Result<&Group, LayoutError> {
        self.groups
            .get(name)
            .ok_or_else(|| LayoutError::UnknownGroup(name.to_string()))
    }

    // --- Content ---

    /// Puts a box at `(x, y)` on the current target. Returns `false` when there is
    /// no page or group to put it on.
    pub fn place(&mut self, x: f64, y: f64, content: ContentBox) -> bool {
        let destination = self.pending_destination;
        let placed = match self.open_groups.last_mut() {
            Some(group) => {
                group.place(x, y, content, destination);
                true
            }
            None => match self.page.as_mut() {
                Some(page) => {
                    page.place(x, y, content, destination);
                    if let Some(name) = self.unplaced_marker.take() {
                        debug!("Marker '{}' lands on page {}", name, page.number);
                        self.tracker.move_marker(&name, page.number);
                    }
                    true
                }
                None => false,
            },
        };
        if placed {
            self.pending_destination = None;
        }
        placed
    }

    /// Records `name` at the current page. The next placed object becomes its
    /// destination. Without an open page the marker takes the next page number
    /// until that object is placed.
    pub fn set_marker(&mut self, name: &str, pdftarget: bool, shift: Option<f64>) -> u64 {
        let id = next_id();
        let mut marker = Marker::new(name, self.current_page_number(), id, pdftarget);
        marker.shift = shift;
        debug!("Marker '{}' on page {} (id {})", name, marker.page, id);
        self.pending_destination = Some(id);
        self.unplaced_marker = self.page.is_none().then(|| name.to_string());
        if self.tracker.set_marker(marker).is_some() {
            debug!("Marker '{}' redefined", name);
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::CollectingSink;
    use gridpress_types::BoxContent;

    fn settings() -> GridSettings {
        GridSettings {
            cell_width: 10.0,
            cell_height: 10.0,
            ..Default::default()
        }
    }

    fn filled() -> ContentBox {
        ContentBox::new(Size::new(10.0, 10.0), BoxContent::Filled { color: None })
    }

    fn document(sink: &mut CollectingSink) -> Document<'_> {
        Document::new(
            Size::new(120.0, 120.0),
            Margins::all(10.0),
            settings(),
            ReferenceTracker::new(),
            sink,
        )
    }

    #[test]
    fn test_page_creation_is_not_reentrant() {
        let mut sink = CollectingSink::new();
        let mut doc = document(&mut sink);
        doc.begin_page_creation().unwrap();
        assert_eq!(doc.state(), PageState::CreatingPage);
        let err = doc.begin_page_creation().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ReentrantPageCreation));
        doc.end_page_creation();
        assert!(doc.begin_page_creation().is_ok());
    }

    #[test]
    fn test_pages_are_numbered_and_shipped() {
        let mut sink = CollectingSink::new();
        {
            let mut doc = document(&mut sink);
            assert_eq!(doc.current_page_number(), 1);
            assert!(!doc.place(0.0, 0.0, filled()));

            let pagetype = PageType::new("plain", "true()", Margins::all(10.0));
            doc.install_page(&pagetype).unwrap();
            assert!(doc.place(10.0, 10.0, filled()));
            doc.install_page(&pagetype).unwrap();
            assert_eq!(doc.current_page_number(), 2);
            let (_, pages) = doc.finish().unwrap();
            assert_eq!(pages, 2);
        }
        let pages = sink.pages();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].items.len(), 1);
        assert!(pages[1].items.is_empty());
    }

    #[test]
    fn test_group_takes_placements_while_open() {
        let mut sink = CollectingSink::new();
        let mut doc = document(&mut sink);
        doc.start_group("g").unwrap();
        assert!(doc.in_group());
        assert!(doc.target_grid().unwrap().is_group_scoped());
        assert_eq!(doc.target_grid().unwrap().nx, 10);
        assert!(doc.place(0.0, 0.0, filled()));
        assert!(doc.place(10.0, 5.0, filled()));
        assert_eq!(doc.end_group(), Some(Size::new(20.0, 15.0)));
        assert_eq!(doc.end_group(), None);
        assert!(!doc.in_group());
        assert_eq!(doc.group("g").unwrap().width_in_cells(), Some(2));
        assert!(matches!(doc.group("h"), Err(LayoutError::UnknownGroup(_))));
        assert_eq!(doc.page_count(), 0);
    }

    #[test]
    fn test_marker_destination_goes_to_next_object() {
        let mut sink = CollectingSink::new();
        let id;
        {
            let mut doc = document(&mut sink);
            let pagetype = PageType::new("plain", "true()", Margins::all(10.0));
            doc.install_page(&pagetype).unwrap();
            id = doc.set_marker("fig1", true, None);
            let marker = doc.tracker().resolve("fig1").unwrap();
            assert_eq!((marker.page, marker.id), (1, id));
            doc.place(10.0, 10.0, filled());
            doc.place(20.0, 10.0, filled());
            doc.finish().unwrap();
        }
        let items = &sink.pages()[0].items;
        assert_eq!(items[0].destination, Some(id));
        assert_eq!(items[1].destination, None);
    }

    #[test]
    fn test_marker_without_page_follows_its_object() {
        let mut sink = CollectingSink::new();
        let mut doc = document(&mut sink);
        let pagetype = PageType::new("plain", "true()", Margins::all(10.0));
        doc.set_marker("end", false, None);
        assert_eq!(doc.tracker().resolve("end").unwrap().page, 1);

        doc.install_page(&pagetype).unwrap();
        doc.finish_page().unwrap();
        doc.install_page(&pagetype).unwrap();
        assert!(doc.place(10.0, 10.0, filled()));
        assert_eq!(doc.tracker().resolve("end").unwrap().page, 2);

        doc.set_marker("here", false, None);
        doc.install_page(&pagetype).unwrap();
        doc.place(10.0, 10.0, filled());
        assert_eq!(doc.tracker().resolve("here").unwrap().page, 2);
    }
}
