use crate::XrefError;
use crate::aux::{AuxData, read_aux, write_aux};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A named position: the page it is on and the destination id of the placed object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub name: String,
    pub page: u32,
    pub id: u64,
    pub pdftarget: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift: Option<f64>,
}

impl Marker {
    pub fn new(name: impl Into<String>, page: u32, id: u64, pdftarget: bool) -> Self {
        Self {
            name: name.into(),
            page,
            id,
            pdftarget,
            shift: None,
        }
    }
}

/// Markers of the current run, with the previous run's markers as fallback.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTracker {
    current: BTreeMap<String, Marker>,
    previous: BTreeMap<String, Marker>,
    previous_last_page: Option<u32>,
}

impl ReferenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a run with the data of an earlier one.
    pub fn with_previous(data: AuxData) -> Self {
        Self {
            current: BTreeMap::new(),
            previous: data
                .markers
                .into_iter()
                .map(|m| (m.name.clone(), m))
                .collect(),
            previous_last_page: Some(data.last_page),
        }
    }

    /// Loads the previous run from `path`. A missing file means this is the first run.
    pub fn load(path: &Path) -> Result<Self, XrefError> {
        match read_aux(path)? {
            Some(data) => {
                info!(
                    "Loaded {} marker(s) from previous run ({})",
                    data.markers.len(),
                    path.display()
                );
                Ok(Self::with_previous(data))
            }
            None => {
                debug!("No aux file at {}, starting fresh", path.display());
                Ok(Self::new())
            }
        }
    }

    /// Records a marker; a later marker with the same name replaces it.
    pub fn set_marker(&mut self, marker: Marker) -> Option<Marker> {
        debug!("Marker '{}' on page {}", marker.name, marker.page);
        self.current.insert(marker.name.clone(), marker)
    }

    /// Moves a marker of this run to `page`. `false` when it was never set.
    pub fn move_marker(&mut self, name: &str, page: u32) -> bool {
        match self.current.get_mut(name) {
            Some(marker) => {
                marker.page = page;
                true
            }
            None => false,
        }
    }

    /// Looks `name` up in this run, then in the previous one.
    pub fn resolve(&self, name: &str) -> Option<&Marker> {
        self.current.get(name).or_else(|| self.previous.get(name))
    }

    pub fn resolve_current(&self, name: &str) -> Option<&Marker> {
        self.current.get(name)
    }

    /// Last page number of the previous run, if there was one.
    pub fn previous_last_page(&self) -> Option<u32> {
        self.previous_last_page
    }

    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.current.values()
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Current run's markers for persisting.
    pub fn to_aux(&self, last_page: u32) -> AuxData {
        AuxData {
            last_page,
            markers: self.current.values().cloned().collect(),
        }
    }

    pub fn save(&self, path: &Path, last_page: u32) -> Result<(), XrefError> {
        write_aux(path, &self.to_aux(last_page))
    }
}
