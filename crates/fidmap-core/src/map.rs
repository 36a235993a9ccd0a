//! The tag graph and its pose-resolution engine.
//!
//! Each update cycle moves through [`UpdatePhase`]: announcements merge evidence into the
//! graph (`Merging`); [`Map::update`] then selects a spanning tree from the root
//! (`TreeBuilding`), walks it outward to assign absolute poses (`PosePropagation`), and
//! leaves the map `Settled` until the next announcement opens a new batch.

mod persist;
mod tree;

use std::collections::BTreeMap;

use crate::announce::{Announce, Announcement, ArcObservation, Location, TagObservation};
use crate::arc::{Arc, ArcKey};
use crate::attr;
use crate::bounding_box::BoundingBox;
use crate::config::MapConfig;
use crate::tag::Tag;
use crate::tag_height::TagHeights;
use crate::{Error, Result, TagId};

macro_rules! log_update {
    ($map:expr, $($arg:tt)+) => {
        if $map.config.log_updates {
            tracing::info!($($arg)+);
        } else {
            tracing::debug!($($arg)+);
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdatePhase {
    #[default]
    Idle,
    Merging,
    TreeBuilding,
    PosePropagation,
    Settled,
}

/// What one [`Map::update`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Batch number that was closed.
    pub visit: u32,
    pub root: Option<TagId>,
    /// Tags connected to the root, the root included.
    pub reached: usize,
    pub unreachable: usize,
    pub tree_arcs: usize,
    /// Tags whose pose changed.
    pub updated: usize,
}

#[derive(Debug, Clone)]
pub struct Map {
    config: MapConfig,
    tags: BTreeMap<TagId, Tag>,
    arcs: BTreeMap<ArcKey, Arc>,
    root: Option<TagId>,
    visit: u32,
    phase: UpdatePhase,
    tag_heights: TagHeights,
    locations: Vec<Location>,
    is_changed: bool,
}

impl Map {
    /// An empty map. Reads the tag-height table if the config names one.
    pub fn new(config: MapConfig) -> Result<Self> {
        let tag_heights = match &config.tag_heights_file {
            Some(path) => TagHeights::read_file(path)?,
            None => TagHeights::default(),
        };
        Ok(Self::with_tag_heights(config, tag_heights))
    }

    pub fn with_tag_heights(config: MapConfig, tag_heights: TagHeights) -> Self {
        Self {
            config,
            tags: BTreeMap::new(),
            arcs: BTreeMap::new(),
            root: None,
            visit: 0,
            phase: UpdatePhase::Idle,
            tag_heights,
            locations: Vec::new(),
            is_changed: false,
        }
    }

    /// Loads the map file named by `config` if it exists, otherwise starts empty.
    pub fn create(config: MapConfig) -> Result<Self> {
        let path = config.map_path();
        if path.exists() {
            Self::load(config)
        } else {
            tracing::debug!(path = %path.display(), "no map file; starting empty");
            Self::new(config)
        }
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// The current batch number.
    pub fn visit(&self) -> u32 {
        self.visit
    }

    pub fn root(&self) -> Option<TagId> {
        self.root
    }

    pub fn phase(&self) -> UpdatePhase {
        self.phase
    }

    /// True when the graph changed since it was last loaded or saved.
    pub fn is_changed(&self) -> bool {
        self.is_changed
    }

    pub fn tag_heights(&self) -> &TagHeights {
        &self.tag_heights
    }

    pub fn tag(&self, id: TagId) -> Option<&Tag> {
        self.tags.get(&id)
    }

    /// Tags in ascending id order.
    pub fn tags(&self) -> impl Iterator<Item = &Tag> {
        self.tags.values()
    }

    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    /// The canonical arc between `a` and `b`, in either argument order.
    pub fn arc(&self, a: TagId, b: TagId) -> Option<&Arc> {
        ArcKey::new(a, b).and_then(|key| self.arcs.get(&key))
    }

    /// Arcs in ascending `(from, to)` order.
    pub fn arcs(&self) -> impl Iterator<Item = &Arc> {
        self.arcs.values()
    }

    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }

    /// Camera path reported through [`location_announce`](Self::location_announce).
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Returns the tag for `id`, creating an uninitialized placeholder if needed.
    pub fn tag_lookup(&mut self, id: TagId) -> &Tag {
        self.tag_entry(id)
    }

    fn tag_entry(&mut self, id: TagId) -> &mut Tag {
        let visit = self.visit;
        let tag_heights = &self.tag_heights;
        self.tags.entry(id).or_insert_with(|| {
            let mut tag = Tag::new(id, visit);
            if let Some(height) = tag_heights.lookup(id) {
                tag.apply_height(height);
            }
            tag
        })
    }

    /// Assigns a pose directly, e.g. a surveyed reference tag.
    pub fn tag_initialize(
        &mut self,
        id: TagId,
        twist: f64,
        x: f64,
        y: f64,
        diagonal: f64,
    ) -> Result<()> {
        attr::ensure_finite("twist", twist)?;
        attr::ensure_finite("x", x)?;
        attr::ensure_finite("y", y)?;
        attr::ensure_finite("diagonal", diagonal)?;
        let visit = self.visit;
        self.tag_entry(id).initialize(twist, x, y, diagonal, visit);
        self.is_changed = true;
        Ok(())
    }

    /// Opens a new batch on the first announcement after an update.
    fn begin_batch(&mut self) {
        if matches!(self.phase, UpdatePhase::Idle | UpdatePhase::Settled) {
            for tag in self.tags.values_mut() {
                tag.clear_visible();
            }
            self.phase = UpdatePhase::Merging;
        }
    }

    /// Records one relative measurement, merging it into the existing arc for the pair.
    pub fn arc_announce(
        &mut self,
        from_id: TagId,
        from_twist: f64,
        distance: f64,
        to_id: TagId,
        to_twist: f64,
        goodness: f64,
    ) -> Result<ArcKey> {
        let mut arc = Arc::create(from_id, from_twist, distance, to_id, to_twist, goodness)?;
        self.begin_batch();
        let key = arc.key();
        let visit = self.visit;
        log_update!(
            self,
            arc = %key,
            distance,
            goodness,
            visit,
            "arc announced"
        );

        if let Some(existing) = self.arcs.get_mut(&key) {
            existing.merge(arc.measurement(), visit);
        } else {
            arc.stamp(visit);
            self.arcs.insert(key, arc);
            self.tag_entry(key.from()).arc_append(key);
            self.tag_entry(key.to()).arc_append(key);
        }
        self.is_changed = true;
        Ok(key)
    }

    /// Marks a tag as seen in this batch and records its pixel size.
    pub fn tag_announce(&mut self, id: TagId, x: f64, y: f64, twist: f64, size: f64, frame: u32) {
        self.begin_batch();
        let visit = self.visit;
        log_update!(self, tag = id, x, y, twist, size, frame, "tag announced");
        self.tag_entry(id).observe(size, visit);
    }

    pub fn location_announce(&mut self, x: f64, y: f64, twist: f64, frame: u32) {
        self.begin_batch();
        log_update!(self, x, y, twist, frame, "location announced");
        self.locations.push(Location { x, y, twist, frame });
    }

    pub fn apply(&mut self, announcement: &Announcement) -> Result<()> {
        announcement.deliver(self)
    }

    /// Applies recorded announcements, running [`update`](Self::update) at every frame
    /// boundary and once at the end. Returns the number of frames processed.
    pub fn replay(&mut self, announcements: &[Announcement]) -> Result<usize> {
        let mut frames = 0;
        let mut current: Option<u32> = None;
        for announcement in announcements {
            let frame = announcement.frame();
            if current.is_some_and(|c| c != frame) {
                self.update();
                frames += 1;
            }
            current = Some(frame);
            self.apply(announcement)?;
        }
        if current.is_some() {
            self.update();
            frames += 1;
        }
        Ok(frames)
    }

    /// Reassigns the coordinate origin and rebuilds every pose from it.
    pub fn set_root(&mut self, id: TagId) -> Result<UpdateSummary> {
        if !self.tags.contains_key(&id) {
            return Err(Error::UnknownTag { id });
        }
        self.root = Some(id);
        for tag in self.tags.values_mut() {
            tag.invalidate();
        }
        Ok(self.update())
    }

    /// The fixed root, choosing the lowest id on first use.
    fn ensure_root(&mut self) -> Option<TagId> {
        if let Some(root) = self.root.filter(|root| self.tags.contains_key(root)) {
            return Some(root);
        }
        self.root = self.tags.keys().next().copied();
        if let Some(root) = self.root {
            tracing::debug!(root, "root tag chosen");
        }
        self.root
    }

    /// Closes the current batch: rebuilds the spanning tree and propagates poses.
    pub fn update(&mut self) -> UpdateSummary {
        let visit = self.visit;
        self.phase = UpdatePhase::TreeBuilding;
        let root = self.ensure_root();
        let spanning_tree = match root {
            Some(root) => tree::build(&self.tags, &self.arcs, root),
            None => tree::SpanningTree::default(),
        };

        for arc in self.arcs.values_mut() {
            arc.set_in_tree(false);
        }
        for edge in &spanning_tree.edges {
            if let Some(arc) = self.arcs.get_mut(&edge.key) {
                arc.set_in_tree(true);
            }
        }
        for tag in self.tags.values_mut() {
            tag.clear_updated();
            if !spanning_tree.reached.contains(&tag.id()) {
                tag.invalidate();
            }
        }

        self.phase = UpdatePhase::PosePropagation;
        let mut updated = 0;
        if let Some(root) = root {
            let default_diagonal = self.config.default_diagonal;
            if let Some(tag) = self.tags.get_mut(&root) {
                tag.set_hop_count(0);
                if !tag.is_initialized() {
                    let diagonal = if tag.diagonal() > 0.0 {
                        tag.diagonal()
                    } else {
                        default_diagonal
                    };
                    tag.initialize(0.0, 0.0, 0.0, diagonal, visit);
                    updated += 1;
                }
            }
        }
        for edge in &spanning_tree.edges {
            let Some(parent_pose) = self.tags.get(&edge.parent).and_then(Tag::pose) else {
                debug_assert!(false, "tree parent {} is unresolved", edge.parent);
                continue;
            };
            let (Some(arc), Some(child)) =
                (self.arcs.get(&edge.key), self.tags.get_mut(&edge.child))
            else {
                continue;
            };
            if child.update_via_arc(arc, edge.parent, parent_pose, edge.hop_count, visit) {
                updated += 1;
            }
        }
        let tags = &self.tags;
        for arc in self.arcs.values_mut() {
            let from = tags.get(&arc.from_id()).and_then(Tag::pose);
            let to = tags.get(&arc.to_id()).and_then(Tag::pose);
            if let (Some(from), Some(_)) = (from, to) {
                let bearing = arc.bearing_from(from);
                arc.set_angle(bearing);
            }
        }

        self.phase = UpdatePhase::Settled;
        if updated > 0 {
            self.is_changed = true;
        }
        self.visit = self.visit.wrapping_add(1);

        let reached = spanning_tree.reached.len();
        let summary = UpdateSummary {
            visit,
            root,
            reached,
            unreachable: self.tags.len() - reached,
            tree_arcs: spanning_tree.edges.len(),
            updated,
        };
        log_update!(
            self,
            visit,
            reached,
            unreachable = summary.unreachable,
            tree_arcs = summary.tree_arcs,
            updated,
            "map updated"
        );
        summary
    }

    /// Extent of resolved tag footprints and the camera path.
    pub fn bounding_box(&self) -> BoundingBox {
        let mut bounding_box = BoundingBox::new();
        for tag in self.tags.values().filter(|tag| tag.is_initialized()) {
            tag.bounding_box_update(&mut bounding_box);
        }
        for location in &self.locations {
            bounding_box.update(location.x, location.y);
        }
        bounding_box
    }

    /// Same tag ids with identical `(x, y, twist, diagonal)` and the same canonical arcs with
    /// identical `(distance, twists, goodness)`.
    pub fn equals(&self, other: &Map) -> bool {
        self.tags.len() == other.tags.len()
            && self.arcs.len() == other.arcs.len()
            && self
                .tags
                .values()
                .zip(other.tags.values())
                .all(|(a, b)| a.pose_equals(b))
            && self
                .arcs
                .values()
                .zip(other.arcs.values())
                .all(|(a, b)| a.measurement_equals(b))
    }
}

impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Announce for Map {
    fn on_arc(&mut self, arc: ArcObservation) -> Result<()> {
        self.arc_announce(
            arc.from_id,
            arc.from_twist,
            arc.distance,
            arc.to_id,
            arc.to_twist,
            arc.goodness,
        )
        .map(|_| ())
    }

    fn on_tag(&mut self, tag: TagObservation) {
        self.tag_announce(tag.id, tag.x, tag.y, tag.twist, tag.size, tag.frame);
    }

    fn on_location(&mut self, location: Location) {
        self.location_announce(location.x, location.y, location.twist, location.frame);
    }
}
