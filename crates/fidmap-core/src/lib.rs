#![forbid(unsafe_code)]

//! Map engine for ceiling-mounted fiducial tags.
//!
//! A detection pipeline reports tags and pairwise relative measurements ("arcs") through
//! the [`Announce`] interface. The [`Map`] merges repeated measurements, picks a spanning
//! tree of the most trustworthy arcs from a fixed root tag, and composes absolute floor
//! poses along it. Maps persist to a deterministic text format that reloads bit for bit.

pub mod angle;
pub mod announce;
pub mod arc;
mod attr;
pub mod bounding_box;
pub mod config;
pub mod error;
pub mod geom;
pub mod map;
pub mod tag;
pub mod tag_height;

/// Stable tag identifier, as decoded from the fiducial.
pub type TagId = u32;

pub use announce::{
    Announce, Announcement, AnnouncementLog, ArcObservation, Location, TagObservation,
};
pub use arc::{Arc, ArcKey, ArcMeasurement};
pub use bounding_box::BoundingBox;
pub use config::MapConfig;
pub use error::{Error, Result};
pub use geom::{Point, Pose};
pub use map::{Map, UpdatePhase, UpdateSummary};
pub use tag::Tag;
pub use tag_height::{TagHeight, TagHeights};
