//! A single ceiling fiducial and its resolved absolute pose.
//!
//! The bottom edge of the fiducial defines the tag's "X axis": the vector from the lower
//! left corner to the lower right corner. `twist` is the angle from the floor X axis to the
//! tag X axis.
//!
//! ```text
//!        UL-------UR
//!        |         |
//!        |    O----+------> "X axis"
//!        |         |
//!        LL-------LR
//! ```

use std::cmp::Ordering;

use crate::angle::{self, PI};
use crate::arc::{Arc, ArcKey};
use crate::attr::{self, AttributeReader};
use crate::bounding_box::BoundingBox;
use crate::geom::{Point, Pose};
use crate::tag_height::TagHeight;
use crate::{Result, TagId};

#[derive(Debug, Clone)]
pub struct Tag {
    id: TagId,
    x: f64,
    y: f64,
    z: f64,
    twist: f64,
    diagonal: f64,
    world_diagonal: f64,
    hop_count: u32,
    visit: u32,
    initialized: bool,
    visible: bool,
    updated: bool,
    arcs: Vec<ArcKey>,
}

impl Tag {
    /// An uninitialized placeholder, as created when an arc references an unseen id.
    pub(crate) fn new(id: TagId, visit: u32) -> Self {
        Self {
            id,
            x: 0.0,
            y: 0.0,
            z: 0.0,
            twist: 0.0,
            diagonal: 0.0,
            world_diagonal: 0.0,
            hop_count: 0,
            visit,
            initialized: false,
            visible: false,
            updated: false,
            arcs: Vec::new(),
        }
    }

    pub fn id(&self) -> TagId {
        self.id
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// Ceiling height, from the tag-height table.
    pub fn z(&self) -> f64 {
        self.z
    }

    pub fn twist(&self) -> f64 {
        self.twist
    }

    /// Diagonal size in camera pixels.
    pub fn diagonal(&self) -> f64 {
        self.diagonal
    }

    /// Diagonal size in world units; zero when no tag-height span covers this id.
    pub fn world_diagonal(&self) -> f64 {
        self.world_diagonal
    }

    pub fn hop_count(&self) -> u32 {
        self.hop_count
    }

    pub fn visit(&self) -> u32 {
        self.visit
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Seen directly in the current batch.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Pose changed during the last update.
    pub fn is_updated(&self) -> bool {
        self.updated
    }

    pub fn arcs(&self) -> &[ArcKey] {
        &self.arcs
    }

    /// The absolute pose, only once the tag has been resolved.
    pub fn pose(&self) -> Option<Pose> {
        self.initialized.then(|| Pose::new(self.x, self.y, self.twist))
    }

    pub(crate) fn initialize(&mut self, twist: f64, x: f64, y: f64, diagonal: f64, visit: u32) {
        self.twist = angle::normalize(twist);
        self.x = x;
        self.y = y;
        self.diagonal = diagonal;
        self.visit = visit;
        self.initialized = true;
        self.updated = true;
    }

    /// Resolves this tag from `neighbor`'s pose across `arc`. Returns true if the pose changed.
    pub(crate) fn update_via_arc(
        &mut self,
        arc: &Arc,
        neighbor: TagId,
        neighbor_pose: Pose,
        hop_count: u32,
        visit: u32,
    ) -> bool {
        debug_assert_eq!(arc.key().other(neighbor), Some(self.id));
        let Some(pose) = arc.propagate(neighbor, neighbor_pose) else {
            return false;
        };
        let changed =
            !self.initialized || pose.x != self.x || pose.y != self.y || pose.twist != self.twist;
        self.x = pose.x;
        self.y = pose.y;
        self.twist = pose.twist;
        self.hop_count = hop_count;
        self.initialized = true;
        if changed {
            self.updated = true;
            self.visit = visit;
        }
        changed
    }

    /// Registers an incident arc. Duplicate filtering is the map's job.
    pub(crate) fn arc_append(&mut self, key: ArcKey) {
        self.arcs.push(key);
    }

    pub(crate) fn observe(&mut self, diagonal: f64, visit: u32) {
        if diagonal > 0.0 {
            self.diagonal = diagonal;
        }
        self.visible = true;
        self.visit = visit;
    }

    pub(crate) fn apply_height(&mut self, height: &TagHeight) {
        self.world_diagonal = height.world_diagonal;
        self.z = height.z;
    }

    pub(crate) fn set_hop_count(&mut self, hop_count: u32) {
        self.hop_count = hop_count;
    }

    pub(crate) fn clear_visible(&mut self) {
        self.visible = false;
    }

    pub(crate) fn clear_updated(&mut self) {
        self.updated = false;
    }

    /// Drops the pose of a tag that is no longer reachable from the root.
    pub(crate) fn invalidate(&mut self) {
        self.initialized = false;
        self.hop_count = 0;
    }

    /// Edge length of the drawn footprint: world size when known, else pixel size.
    fn footprint_diagonal(&self) -> f64 {
        if self.world_diagonal > 0.0 {
            self.world_diagonal
        } else {
            self.diagonal
        }
    }

    /// Corners of the tag square in floor coordinates, counter-clockwise from the lower
    /// right corner.
    pub fn footprint(&self) -> [Point; 4] {
        let pose = Pose::new(self.x, self.y, self.twist);
        let radius = self.footprint_diagonal() / 2.0;
        let corner = |k: f64| pose.project(self.twist - PI / 4.0 + k * PI / 2.0, radius);
        [corner(0.0), corner(1.0), corner(2.0), corner(3.0)]
    }

    /// Folds the tag centre and its footprint corners into `bounding_box`.
    pub fn bounding_box_update(&self, bounding_box: &mut BoundingBox) {
        bounding_box.update(self.x, self.y);
        for corner in self.footprint() {
            bounding_box.update(corner.x, corner.y);
        }
    }

    /// Same id with bit-identical `(x, y, twist, diagonal)`.
    pub fn pose_equals(&self, other: &Self) -> bool {
        self.id == other.id
            && self.x == other.x
            && self.y == other.y
            && self.twist == other.twist
            && self.diagonal == other.diagonal
    }

    pub(crate) fn write(&self, out: &mut String) -> Result<()> {
        out.push_str(" <Tag");
        attr::write_integer(out, "Id", self.id);
        attr::write_number(out, "Twist", self.twist)?;
        attr::write_number(out, "X", self.x)?;
        attr::write_number(out, "Y", self.y)?;
        attr::write_number(out, "Diagonal", self.diagonal)?;
        attr::write_integer(out, "Hop_Count", self.hop_count);
        attr::write_flag(out, "Initialized", self.initialized);
        out.push_str("/>\n");
        Ok(())
    }

    pub(crate) fn read(reader: &mut AttributeReader<'_>, visit: u32) -> Result<Self> {
        reader.element("Tag")?;
        let id = reader.unsigned("Id")?;
        let twist = reader.number("Twist")?;
        let x = reader.number("X")?;
        let y = reader.number("Y")?;
        let diagonal = reader.number("Diagonal")?;
        let hop_count = reader.unsigned("Hop_Count")?;
        let initialized = reader.flag("Initialized")?;
        reader.empty_element_end()?;

        let mut tag = Self::new(id, visit);
        tag.twist = twist;
        tag.x = x;
        tag.y = y;
        tag.diagonal = diagonal;
        tag.hop_count = hop_count;
        tag.initialized = initialized;
        Ok(tag)
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Tag {}

impl PartialOrd for Tag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}
