//! Relative measurements between two co-visible tags.
//!
//! An [`Arc`] stores the 5-tuple `(from_tag, from_twist, distance, to_tag, to_twist)`:
//!
//! ```text
//!      from_tag                             to_tag
//!    +-----------+                       +-----------+
//!    |           |       distance        |           |
//!    |     O----->-----------------------<-----O     |
//!    |           |                       |           |
//!    +-----------+                       +-----------+
//! ```
//!
//! `from_twist` is the twist of `from_tag` relative to the ray towards `to_tag`, and
//! `to_twist` the twist of `to_tag` relative to the opposite ray. The conjugate arc swaps
//! both the endpoints and the twists; only the form with `from_tag < to_tag` is stored.

use std::cmp::Ordering;

use crate::angle::{self, PI};
use crate::attr::{self, AttributeReader};
use crate::geom::Pose;
use crate::{Error, Result, TagId};

/// Unordered tag-id pair, stored as `from < to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArcKey {
    from: TagId,
    to: TagId,
}

impl ArcKey {
    /// Returns `None` for a self-loop.
    pub fn new(a: TagId, b: TagId) -> Option<Self> {
        match a.cmp(&b) {
            Ordering::Less => Some(Self { from: a, to: b }),
            Ordering::Greater => Some(Self { from: b, to: a }),
            Ordering::Equal => None,
        }
    }

    pub fn from(&self) -> TagId {
        self.from
    }

    pub fn to(&self) -> TagId {
        self.to
    }

    /// The endpoint opposite `id`, if `id` is an endpoint.
    pub fn other(&self, id: TagId) -> Option<TagId> {
        if id == self.from {
            Some(self.to)
        } else if id == self.to {
            Some(self.from)
        } else {
            None
        }
    }
}

impl std::fmt::Display for ArcKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

/// The measured part of an arc, expressed in canonical (`from < to`) orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcMeasurement {
    pub from_twist: f64,
    pub distance: f64,
    pub to_twist: f64,
    pub goodness: f64,
}

impl ArcMeasurement {
    pub fn conjugate(self) -> Self {
        Self {
            from_twist: self.to_twist,
            to_twist: self.from_twist,
            ..self
        }
    }
}

#[derive(Debug, Clone)]
pub struct Arc {
    key: ArcKey,
    from_twist: f64,
    distance: f64,
    to_twist: f64,
    goodness: f64,
    angle: f64,
    in_tree: bool,
    visit: u32,
}

impl Arc {
    /// Canonical construction: when `from_id > to_id` the endpoints and their twists swap.
    pub fn create(
        from_id: TagId,
        from_twist: f64,
        distance: f64,
        to_id: TagId,
        to_twist: f64,
        goodness: f64,
    ) -> Result<Self> {
        let key = ArcKey::new(from_id, to_id).ok_or(Error::SelfArc { id: from_id })?;
        attr::ensure_finite("from_twist", from_twist)?;
        attr::ensure_finite("distance", distance)?;
        attr::ensure_finite("to_twist", to_twist)?;
        attr::ensure_finite("goodness", goodness)?;
        let measurement = ArcMeasurement {
            from_twist,
            distance,
            to_twist,
            goodness,
        };
        let measurement = if key.from == from_id {
            measurement
        } else {
            measurement.conjugate()
        };
        Ok(Self::from_measurement(key, measurement))
    }

    pub(crate) fn from_measurement(key: ArcKey, m: ArcMeasurement) -> Self {
        Self {
            key,
            from_twist: angle::normalize(m.from_twist),
            distance: m.distance.abs(),
            to_twist: angle::normalize(m.to_twist),
            goodness: m.goodness.max(0.0),
            angle: 0.0,
            in_tree: false,
            visit: 0,
        }
    }

    pub fn key(&self) -> ArcKey {
        self.key
    }

    pub fn from_id(&self) -> TagId {
        self.key.from
    }

    pub fn to_id(&self) -> TagId {
        self.key.to
    }

    pub fn from_twist(&self) -> f64 {
        self.from_twist
    }

    pub fn to_twist(&self) -> f64 {
        self.to_twist
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn goodness(&self) -> f64 {
        self.goodness
    }

    /// Absolute bearing from `from_tag` to `to_tag`; meaningful once both are resolved.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn in_tree(&self) -> bool {
        self.in_tree
    }

    pub fn visit(&self) -> u32 {
        self.visit
    }

    pub fn measurement(&self) -> ArcMeasurement {
        ArcMeasurement {
            from_twist: self.from_twist,
            distance: self.distance,
            to_twist: self.to_twist,
            goodness: self.goodness,
        }
    }

    /// Secondary order: shorter arcs first, then by key.
    pub fn distance_cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.key.cmp(&other.key))
    }

    /// Same canonical pair with bit-identical measurement fields.
    pub fn measurement_equals(&self, other: &Self) -> bool {
        self.key == other.key && self.measurement() == other.measurement()
    }

    pub(crate) fn stamp(&mut self, visit: u32) {
        self.visit = visit;
    }

    pub(crate) fn set_in_tree(&mut self, in_tree: bool) {
        self.in_tree = in_tree;
    }

    pub(crate) fn set_angle(&mut self, angle: f64) {
        self.angle = angle;
    }

    /// Folds a repeated observation of the same pair into this arc.
    ///
    /// Goodness is treated as a variance: each side is weighted by its inverse, and the
    /// merged goodness is the harmonic combination `1 / (1/g_old + 1/g_new)`. An observation
    /// with zero goodness is exact and wins outright.
    pub(crate) fn merge(&mut self, observation: ArcMeasurement, visit: u32) {
        let new_goodness = observation.goodness.max(0.0);
        let (new_weight, goodness) = match (self.goodness > 0.0, new_goodness > 0.0) {
            (true, true) => {
                let old_inverse = 1.0 / self.goodness;
                let new_inverse = 1.0 / new_goodness;
                let total = old_inverse + new_inverse;
                (new_inverse / total, 1.0 / total)
            }
            (true, false) => (1.0, 0.0),
            (false, true) => (0.0, 0.0),
            (false, false) => (0.5, 0.0),
        };
        let old_weight = 1.0 - new_weight;

        self.distance = old_weight * self.distance + new_weight * observation.distance.abs();
        self.from_twist = angle::normalize(
            self.from_twist + new_weight * angle::between(self.from_twist, observation.from_twist),
        );
        self.to_twist = angle::normalize(
            self.to_twist + new_weight * angle::between(self.to_twist, observation.to_twist),
        );
        self.goodness = goodness;
        self.visit = visit;
    }

    /// Absolute bearing from `from_tag` towards `to_tag`, given `from_tag`'s pose.
    pub fn bearing_from(&self, from_pose: Pose) -> f64 {
        angle::normalize(from_pose.twist - self.from_twist)
    }

    /// Computes the pose of the endpoint opposite `resolved`, whose pose is `pose`.
    ///
    /// Returns `None` if `resolved` is not an endpoint of this arc.
    pub fn propagate(&self, resolved: TagId, pose: Pose) -> Option<Pose> {
        let (self_twist, other_twist) = if resolved == self.key.from {
            (self.from_twist, self.to_twist)
        } else if resolved == self.key.to {
            (self.to_twist, self.from_twist)
        } else {
            return None;
        };
        let bearing = angle::normalize(pose.twist - self_twist);
        let position = pose.project(bearing, self.distance);
        Some(Pose {
            x: position.x,
            y: position.y,
            twist: angle::normalize(bearing + PI + other_twist),
        })
    }

    pub(crate) fn write(&self, out: &mut String) -> Result<()> {
        out.push_str(" <Arc");
        attr::write_integer(out, "From_Tag_Id", self.key.from);
        attr::write_number(out, "From_Twist", self.from_twist)?;
        attr::write_number(out, "Distance", self.distance)?;
        attr::write_integer(out, "To_Tag_Id", self.key.to);
        attr::write_number(out, "To_Twist", self.to_twist)?;
        attr::write_number(out, "Angle", self.angle)?;
        attr::write_number(out, "Goodness", self.goodness)?;
        attr::write_flag(out, "In_Tree", self.in_tree);
        out.push_str("/>\n");
        Ok(())
    }

    /// Reads one record written by [`write`](Self::write). Values are restored verbatim.
    pub(crate) fn read(reader: &mut AttributeReader<'_>, visit: u32) -> Result<Self> {
        reader.element("Arc")?;
        let from_id = reader.unsigned("From_Tag_Id")?;
        let from_twist = reader.number("From_Twist")?;
        let distance = reader.number("Distance")?;
        let to_id = reader.unsigned("To_Tag_Id")?;
        let to_twist = reader.number("To_Twist")?;
        let angle = reader.number("Angle")?;
        let goodness = reader.number("Goodness")?;
        let in_tree = reader.flag("In_Tree")?;
        reader.empty_element_end()?;

        let key = match ArcKey::new(from_id, to_id) {
            Some(key) if key.from == from_id => key,
            _ => {
                return Err(
                    reader.error(format!("arc {from_id}-{to_id} is not in canonical order"))
                );
            }
        };
        Ok(Self {
            key,
            from_twist,
            distance,
            to_twist,
            goodness,
            angle,
            in_tree,
            visit,
        })
    }
}

impl PartialEq for Arc {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Arc {}

impl PartialOrd for Arc {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Arc {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}
