//! Map file reading and writing.
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <Map Tags_Count="2" Arcs_Count="1" Root_Id="0">
//!  <Tag Id="0" Twist="0" X="0" Y="0" Diagonal="1" Hop_Count="0" Initialized="1"/>
//!  <Tag Id="1" Twist="0.17" X="10" Y="0" Diagonal="1" Hop_Count="1" Initialized="1"/>
//!  <Arc From_Tag_Id="0" From_Twist="0" Distance="10" To_Tag_Id="1" To_Twist="-2.96" Angle="0" Goodness="0" In_Tree="1"/>
//! </Map>
//! ```
//!
//! Tags are written in ascending id and arcs in ascending `(from, to)` order, with every
//! number in its shortest round-trip form, so `write(load(write(m)))` equals `write(m)`.

use std::path::{Path, PathBuf};

use super::{Map, UpdatePhase};
use crate::arc::Arc;
use crate::attr::{self, AttributeReader, XML_DECLARATION};
use crate::config::MapConfig;
use crate::tag::Tag;
use crate::tag_height::TagHeights;
use crate::{Error, Result};

impl Map {
    pub fn to_xml_string(&self) -> Result<String> {
        let mut out = String::new();
        out.push_str(XML_DECLARATION);
        out.push('\n');
        out.push_str("<Map");
        attr::write_integer(&mut out, "Tags_Count", self.tags.len());
        attr::write_integer(&mut out, "Arcs_Count", self.arcs.len());
        match self.root {
            Some(root) => attr::write_integer(&mut out, "Root_Id", root),
            None => attr::write_integer(&mut out, "Root_Id", -1),
        }
        out.push_str(">\n");
        for tag in self.tags.values() {
            tag.write(&mut out)?;
        }
        for arc in self.arcs.values() {
            arc.write(&mut out)?;
        }
        out.push_str("</Map>\n");
        Ok(out)
    }

    /// Writes the map to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let text = self.to_xml_string()?;
        std::fs::write(path, text).map_err(|err| Error::io(path, err))
    }

    /// Writes the map to the file named by its config and returns that path.
    pub fn save(&mut self) -> Result<PathBuf> {
        let path = self.config.map_path();
        self.save_to(&path)?;
        self.is_changed = false;
        tracing::info!(
            path = %path.display(),
            tags = self.tags.len(),
            arcs = self.arcs.len(),
            "map saved"
        );
        Ok(path)
    }

    /// Reads the map file named by `config`.
    pub fn load(config: MapConfig) -> Result<Self> {
        let path = config.map_path();
        let text = std::fs::read_to_string(&path).map_err(|err| Error::io(&path, err))?;
        let map = Self::from_xml_str(config, &text).map_err(|err| err.in_file(&path))?;
        tracing::info!(
            path = %path.display(),
            tags = map.tags.len(),
            arcs = map.arcs.len(),
            "map loaded"
        );
        Ok(map)
    }

    /// Rebuilds a map from saved text without rerunning tree building.
    pub fn from_xml_str(config: MapConfig, text: &str) -> Result<Self> {
        let tag_heights = match &config.tag_heights_file {
            Some(path) => TagHeights::read_file(path)?,
            None => TagHeights::default(),
        };
        let mut map = Self::with_tag_heights(config, tag_heights);
        map.read_records(text)?;
        Ok(map)
    }

    fn read_records(&mut self, text: &str) -> Result<()> {
        let mut reader = AttributeReader::new(text);
        reader.skip_whitespace();
        reader.expect(XML_DECLARATION)?;
        reader.element("Map")?;
        let tags_count = reader.unsigned("Tags_Count")?;
        let arcs_count = reader.unsigned("Arcs_Count")?;
        let root_id = reader.integer("Root_Id")?;
        reader.element_end()?;

        for _ in 0..tags_count {
            let mut tag = Tag::read(&mut reader, self.visit)?;
            if self.tags.contains_key(&tag.id()) {
                return Err(reader.error(format!("duplicate tag {}", tag.id())));
            }
            if let Some(height) = self.tag_heights.lookup(tag.id()) {
                tag.apply_height(height);
            }
            self.tags.insert(tag.id(), tag);
        }

        for _ in 0..arcs_count {
            let arc = Arc::read(&mut reader, self.visit)?;
            let key = arc.key();
            if self.arcs.contains_key(&key) {
                return Err(reader.error(format!("duplicate arc {key}")));
            }
            for id in [key.from(), key.to()] {
                match self.tags.get_mut(&id) {
                    Some(tag) => tag.arc_append(key),
                    None => return Err(reader.error(format!("arc {key} names unknown tag {id}"))),
                }
            }
            self.arcs.insert(key, arc);
        }

        reader.closing_element("Map")?;
        reader.finish()?;

        self.root = match root_id {
            -1 => None,
            id => match u32::try_from(id) {
                Ok(id) if self.tags.contains_key(&id) => Some(id),
                _ => return Err(reader.error(format!("root {id} is not a tag of this map"))),
            },
        };
        self.phase = UpdatePhase::Idle;
        self.is_changed = false;
        Ok(())
    }
}
