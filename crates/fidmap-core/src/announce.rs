//! The detection-pipeline side of the map: what a frame processor reports.
//!
//! A pipeline talks to anything implementing [`Announce`]. [`Map`](crate::Map) folds the
//! reports into its graph; [`AnnouncementLog`] records them so they can be replayed later.

use serde::{Deserialize, Serialize};

use crate::{Result, TagId};

/// One relative measurement between two co-visible tags, in caller orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcObservation {
    pub from_id: TagId,
    pub from_twist: f64,
    pub distance: f64,
    pub to_id: TagId,
    pub to_twist: f64,
    pub goodness: f64,
}

/// A directly observed tag, in camera coordinates, before graph resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TagObservation {
    pub id: TagId,
    pub x: f64,
    pub y: f64,
    pub twist: f64,
    /// Diagonal in camera pixels.
    pub size: f64,
    pub frame: u32,
}

/// Resolved camera pose for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub twist: f64,
    pub frame: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Announcement {
    Arc {
        frame: u32,
        #[serde(flatten)]
        arc: ArcObservation,
    },
    Tag(TagObservation),
    Location(Location),
}

impl Announcement {
    pub fn frame(&self) -> u32 {
        match self {
            Announcement::Arc { frame, .. } => *frame,
            Announcement::Tag(tag) => tag.frame,
            Announcement::Location(location) => location.frame,
        }
    }

    pub fn deliver(&self, target: &mut dyn Announce) -> Result<()> {
        match self {
            Announcement::Arc { arc, .. } => target.on_arc(*arc),
            Announcement::Tag(tag) => {
                target.on_tag(*tag);
                Ok(())
            }
            Announcement::Location(location) => {
                target.on_location(*location);
                Ok(())
            }
        }
    }

    /// Parses newline-delimited JSON, skipping blank lines.
    pub fn parse_json_lines(text: &str) -> std::result::Result<Vec<Self>, serde_json::Error> {
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .map(serde_json::from_str)
            .collect()
    }
}

/// Capability interface handed to the detection pipeline.
///
/// Calls may arrive in any order within a frame.
pub trait Announce {
    fn on_arc(&mut self, arc: ArcObservation) -> Result<()>;
    fn on_tag(&mut self, tag: TagObservation);
    fn on_location(&mut self, location: Location);
}

/// Records announcements. Arcs carry no frame number of their own, so they are stamped with
/// the frame of the most recent tag or location report (or [`begin_frame`](Self::begin_frame)).
#[derive(Debug, Clone, Default)]
pub struct AnnouncementLog {
    frame: u32,
    records: Vec<Announcement>,
}

impl AnnouncementLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_frame(&mut self, frame: u32) {
        self.frame = frame;
    }

    pub fn records(&self) -> &[Announcement] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Announcement> {
        self.records
    }

    pub fn to_json_lines(&self) -> std::result::Result<String, serde_json::Error> {
        let mut out = String::new();
        for record in &self.records {
            out.push_str(&serde_json::to_string(record)?);
            out.push('\n');
        }
        Ok(out)
    }
}

impl Announce for AnnouncementLog {
    fn on_arc(&mut self, arc: ArcObservation) -> Result<()> {
        self.records.push(Announcement::Arc {
            frame: self.frame,
            arc,
        });
        Ok(())
    }

    fn on_tag(&mut self, tag: TagObservation) {
        self.frame = tag.frame;
        self.records.push(Announcement::Tag(tag));
    }

    fn on_location(&mut self, location: Location) {
        self.frame = location.frame;
        self.records.push(Announcement::Location(location));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arc_records_are_flat_json_objects() {
        let line = r#"{"kind":"arc","frame":3,"from_id":4,"from_twist":0.5,"distance":10.0,"to_id":2,"to_twist":-0.5,"goodness":1.5}"#;
        let parsed: Announcement = serde_json::from_str(line).unwrap();
        match parsed {
            Announcement::Arc { frame, arc } => {
                assert_eq!(frame, 3);
                assert_eq!((arc.from_id, arc.to_id), (4, 2));
                assert_eq!(arc.goodness, 1.5);
            }
            other => panic!("unexpected record: {other:?}"),
        }
    }

    #[test]
    fn log_stamps_arcs_with_the_latest_frame() {
        let mut log = AnnouncementLog::new();
        log.on_tag(TagObservation {
            id: 1,
            x: 0.0,
            y: 0.0,
            twist: 0.0,
            size: 20.0,
            frame: 7,
        });
        log.on_arc(ArcObservation {
            from_id: 1,
            from_twist: 0.0,
            distance: 3.0,
            to_id: 2,
            to_twist: 0.0,
            goodness: 1.0,
        })
        .unwrap();
        let frames: Vec<u32> = log.records().iter().map(Announcement::frame).collect();
        assert_eq!(frames, vec![7, 7]);

        let text = log.to_json_lines().unwrap();
        let back = Announcement::parse_json_lines(&text).unwrap();
        assert_eq!(back, log.records());
    }
}
