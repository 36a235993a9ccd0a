//! Spans of tag ids mounted at the same ceiling height.
//!
//! ```text
//! <Tag_Heights Count="1">
//!  <Tag_Height First_Id="0" Last_Id="99" World_Diagonal="203.2" Z="2438.4"/>
//! </Tag_Heights>
//! ```

use std::path::Path;

use crate::attr::{AttributeReader, XML_DECLARATION};
use crate::{Error, Result, TagId};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TagHeight {
    pub first_id: TagId,
    pub last_id: TagId,
    /// Diagonal of tags in this span, in world units.
    pub world_diagonal: f64,
    /// Height of the ceiling above the floor.
    pub z: f64,
}

impl TagHeight {
    pub fn contains(&self, id: TagId) -> bool {
        self.first_id <= id && id <= self.last_id
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagHeights {
    spans: Vec<TagHeight>,
}

impl TagHeights {
    pub fn new(mut spans: Vec<TagHeight>) -> Self {
        spans.sort_by_key(|span| (span.first_id, span.last_id));
        Self { spans }
    }

    pub fn spans(&self) -> &[TagHeight] {
        &self.spans
    }

    /// First span (lowest `first_id`) that covers `id`.
    pub fn lookup(&self, id: TagId) -> Option<&TagHeight> {
        self.spans.iter().find(|span| span.contains(id))
    }

    pub fn from_xml_str(text: &str) -> Result<Self> {
        let mut reader = AttributeReader::new(text);
        reader.skip_whitespace();
        if text.trim_start().starts_with("<?xml") {
            reader.expect(XML_DECLARATION)?;
        }
        reader.element("Tag_Heights")?;
        let count = reader.unsigned("Count")?;
        reader.element_end()?;

        let mut spans = Vec::new();
        for _ in 0..count {
            reader.element("Tag_Height")?;
            let first_id = reader.unsigned("First_Id")?;
            let last_id = reader.unsigned("Last_Id")?;
            let world_diagonal = reader.number("World_Diagonal")?;
            let z = reader.number("Z")?;
            reader.empty_element_end()?;
            if first_id > last_id {
                return Err(reader.error(format!(
                    "tag height span {first_id}..{last_id} is reversed"
                )));
            }
            spans.push(TagHeight {
                first_id,
                last_id,
                world_diagonal,
                z,
            });
        }
        reader.closing_element("Tag_Heights")?;
        reader.finish()?;
        Ok(Self::new(spans))
    }

    pub fn read_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
        Self::from_xml_str(&text).map_err(|err| err.in_file(path))
    }
}
