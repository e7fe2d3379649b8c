//! The `<jobname>-aux.xml` side file.
//!
//! ```xml
//! <auxiliary lastpage="3">
//!   <mark name="fig1" page="3" id="7" pdftarget="true"/>
//! </auxiliary>
//! ```
use crate::XrefError;
use crate::tracker::Marker;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Contents of an aux file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AuxData {
    pub last_page: u32,
    pub markers: Vec<Marker>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename = "auxiliary")]
struct AuxDocument {
    #[serde(rename = "@lastpage", default)]
    lastpage: u32,
    #[serde(rename = "mark", default)]
    marks: Vec<AuxMark>,
}

#[derive(Serialize, Deserialize)]
struct AuxMark {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@page")]
    page: u32,
    #[serde(rename = "@id")]
    id: u64,
    #[serde(rename = "@pdftarget", default)]
    pdftarget: bool,
    #[serde(rename = "@shift", default, skip_serializing_if = "Option::is_none")]
    shift: Option<f64>,
}

impl From<AuxMark> for Marker {
    fn from(m: AuxMark) -> Self {
        Marker {
            name: m.name,
            page: m.page,
            id: m.id,
            pdftarget: m.pdftarget,
            shift: m.shift,
        }
    }
}

impl From<&Marker> for AuxMark {
    fn from(m: &Marker) -> Self {
        AuxMark {
            name: m.name.clone(),
            page: m.page,
            id: m.id,
            pdftarget: m.pdftarget,
            shift: m.shift,
        }
    }
}

/// Location of the aux file for a job.
pub fn aux_path(dir: &Path, jobname: &str) -> PathBuf {
    dir.join(format!("{}-aux.xml", jobname))
}

pub fn parse_aux(xml: &str) -> Result<AuxData, XrefError> {
    let doc: AuxDocument = quick_xml::de::from_str(xml)?;
    Ok(AuxData {
        last_page: doc.lastpage,
        markers: doc.marks.into_iter().map(Marker::from).collect(),
    })
}

pub fn to_xml(data: &AuxData) -> Result<String, XrefError> {
    let doc = AuxDocument {
        lastpage: data.last_page,
        marks: data.markers.iter().map(AuxMark::from).collect(),
    };
    let mut xml = String::new();
    let mut serializer = quick_xml::se::Serializer::new(&mut xml);
    serializer.indent(' ', 2);
    doc.serialize(serializer)?;
    xml.push('\n');
    Ok(xml)
}

/// Reads an aux file. `Ok(None)` when the file does not exist.
pub fn read_aux(path: &Path) -> Result<Option<AuxData>, XrefError> {
    match fs::read_to_string(path) {
        Ok(xml) => parse_aux(&xml).map(Some),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(XrefError::Io {
            path: path.display().to_string(),
            source,
        }),
    }
}

pub fn write_aux(path: &Path, data: &AuxData) -> Result<(), XrefError> {
    let xml = to_xml(data)?;
    fs::write(path, xml).map_err(|source| XrefError::Io {
        path: path.display().to_string(),
        source,
    })
}
