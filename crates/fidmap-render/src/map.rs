//! Top-down drawing of a resolved map and the camera path.

use std::path::Path;

use fidmap_core::{Map, Pose, Tag};

use crate::svg::{Svg, Units};
use crate::Result;

const TREE_ARC_STROKE: &str = "red";
const ARC_STROKE: &str = "green";
const TAG_STROKE: &str = "black";
const TAG_AXIS_STROKE: &str = "purple";
const PATH_STROKE: &str = "blue";

#[derive(Debug, Clone, PartialEq)]
pub struct SvgOptions {
    /// Page width in `units`.
    pub width: f64,
    /// Page height in `units`.
    pub height: f64,
    pub units: Units,
    pub font_family: String,
    pub font_size: u32,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            width: 8.0,
            height: 10.5,
            units: Units::Inches,
            font_family: "ariel".to_string(),
            font_size: 10,
        }
    }
}

pub fn render_map(map: &Map, options: &SvgOptions) -> Result<String> {
    Ok(draw_map(map, options)?.finish())
}

pub fn write_map_svg(map: &Map, path: &Path, options: &SvgOptions) -> Result<()> {
    draw_map(map, options)?.write_file(path)?;
    tracing::info!(path = %path.display(), "map svg written");
    Ok(())
}

fn draw_map(map: &Map, options: &SvgOptions) -> Result<Svg> {
    let bounding_box = map.bounding_box();
    let mut svg = Svg::new(options.width, options.height, options.units);
    let scale = svg.cartesian_scale(&bounding_box)?;

    let mut arcs = 0usize;
    for arc in map.arcs() {
        let from = map.tag(arc.from_id()).and_then(Tag::pose);
        let to = map.tag(arc.to_id()).and_then(Tag::pose);
        let (Some(from), Some(to)) = (from, to) else {
            continue;
        };
        let stroke = if arc.in_tree() {
            TREE_ARC_STROKE
        } else {
            ARC_STROKE
        };
        svg.line(from.x, from.y, to.x, to.y, stroke);
        arcs += 1;
    }

    let mut tags = 0usize;
    for tag in map.tags() {
        let Some(pose) = tag.pose() else {
            continue;
        };
        let corners = tag.footprint();
        for (i, a) in corners.iter().enumerate() {
            let b = corners[(i + 1) % corners.len()];
            svg.line(a.x, a.y, b.x, b.y, TAG_STROKE);
        }
        let radius = (corners[0] - pose.position()).length();
        let tip = pose.project(pose.twist, radius);
        svg.line(pose.x, pose.y, tip.x, tip.y, TAG_AXIS_STROKE);
        svg.text(
            &tag.id().to_string(),
            pose.x,
            pose.y,
            &options.font_family,
            options.font_size,
        );
        tags += 1;
    }

    let locations = map.locations();
    let tick = bounding_box.width().max(bounding_box.height()) / 50.0;
    for pair in locations.windows(2) {
        svg.line(pair[0].x, pair[0].y, pair[1].x, pair[1].y, PATH_STROKE);
    }
    for location in locations {
        let pose = Pose::new(location.x, location.y, location.twist);
        let tip = pose.project(pose.twist, tick);
        svg.line(location.x, location.y, tip.x, tip.y, PATH_STROKE);
    }

    tracing::debug!(
        arcs,
        tags,
        locations = locations.len(),
        scale,
        "map rendered"
    );
    Ok(svg)
}
