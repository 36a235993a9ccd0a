//! Minimal SVG 1.1 writer.
//!
//! Drawing calls take user coordinates; each is mapped to the page as
//! `(value + offset) * scale` and written with the page [`Units`] suffix.

use std::fmt::Write as _;
use std::path::Path;
use std::str::FromStr;

use fidmap_core::BoundingBox;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Units {
    Centimeters,
    Millimeters,
    #[default]
    Inches,
}

impl Units {
    pub fn suffix(self) -> &'static str {
        match self {
            Units::Centimeters => "cm",
            Units::Millimeters => "mm",
            Units::Inches => "in",
        }
    }
}

impl FromStr for Units {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cm" => Ok(Units::Centimeters),
            "mm" => Ok(Units::Millimeters),
            "in" => Ok(Units::Inches),
            other => Err(Error::InvalidUnits {
                units: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.suffix())
    }
}

#[derive(Debug, Clone)]
pub struct Svg {
    body: String,
    units: Units,
    width: f64,
    height: f64,
    x_scale: f64,
    y_scale: f64,
    x_offset: f64,
    y_offset: f64,
}

impl Svg {
    /// A `width` × `height` page with an identity transform.
    pub fn new(width: f64, height: f64, units: Units) -> Self {
        Self {
            body: String::new(),
            units,
            width,
            height,
            x_scale: 1.0,
            y_scale: 1.0,
            x_offset: 0.0,
            y_offset: 0.0,
        }
    }

    pub fn set_offsets(&mut self, x_offset: f64, y_offset: f64) {
        self.x_offset = x_offset;
        self.y_offset = y_offset;
    }

    /// Fits `bounding_box` onto the page with one scale for both axes and Y pointing up.
    ///
    /// The scale is `min(width / W, height / H)`. A zero span on one axis defers to the
    /// other axis; if both spans are zero the scale is 1.
    pub fn cartesian_scale(&mut self, bounding_box: &BoundingBox) -> Result<f64> {
        if bounding_box.is_empty() {
            return Err(Error::EmptyBounds);
        }
        let x_span = bounding_box.width();
        let y_span = bounding_box.height();
        let scale = match (x_span > 0.0, y_span > 0.0) {
            (true, true) => (self.width / x_span).min(self.height / y_span),
            (true, false) => self.width / x_span,
            (false, true) => self.height / y_span,
            (false, false) => 1.0,
        };
        self.x_scale = scale;
        self.y_scale = -scale;
        self.x_offset = -bounding_box.minimum_x;
        self.y_offset = -bounding_box.maximum_y;
        Ok(scale)
    }

    fn page_x(&self, x: f64) -> f64 {
        (x + self.x_offset) * self.x_scale
    }

    fn page_y(&self, y: f64) -> f64 {
        (y + self.y_offset) * self.y_scale
    }

    fn length(&mut self, name: &str, value: f64) {
        let _ = write!(self.body, r#" {name}=""#);
        fmt_into(&mut self.body, value);
        let _ = write!(self.body, r#"{}""#, self.units);
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str) {
        let (px1, py1, px2, py2) = (
            self.page_x(x1),
            self.page_y(y1),
            self.page_x(x2),
            self.page_y(y2),
        );
        self.body.push_str("<line");
        self.length("x1", px1);
        self.length("y1", py1);
        self.length("x2", px2);
        self.length("y2", py2);
        let _ = writeln!(self.body, r#" style="stroke:{}"/>"#, escape_xml(stroke));
    }

    /// `(x, y)` is the corner drawn at the top left of the page.
    pub fn rectangle(&mut self, x: f64, y: f64, width: f64, height: f64, stroke: &str, fill: &str) {
        let (px, py) = (self.page_x(x), self.page_y(y));
        let (pw, ph) = (width * self.x_scale.abs(), height * self.y_scale.abs());
        self.body.push_str("<rect");
        self.length("x", px);
        self.length("y", py);
        self.length("width", pw);
        self.length("height", ph);
        let _ = writeln!(
            self.body,
            r#" style="stroke:{}; fill:{}"/>"#,
            escape_xml(stroke),
            escape_xml(fill)
        );
    }

    pub fn text(&mut self, message: &str, x: f64, y: f64, font_family: &str, font_size: u32) {
        let (px, py) = (self.page_x(x), self.page_y(y));
        self.body.push_str("<text");
        self.length("x", px);
        self.length("y", py);
        let _ = writeln!(
            self.body,
            r#" style="font-family:{}; font-size:{font_size}">{}</text>"#,
            escape_xml(font_family),
            escape_xml(message)
        );
    }

    /// The complete document.
    pub fn finish(&self) -> String {
        let mut out = String::with_capacity(self.body.len() + 256);
        out.push_str("<?xml version=\"1.0\" standalone=\"no\"?>\n\n");
        out.push_str("<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\"\n");
        out.push_str(" \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n\n");
        out.push_str("<svg");
        let units = self.units;
        let _ = write!(out, r#" width=""#);
        fmt_into(&mut out, self.width);
        let _ = write!(out, r#"{units}" height=""#);
        fmt_into(&mut out, self.height);
        let _ = writeln!(out, r#"{units}""#);
        out.push_str(" version=\"1.1\"\n");
        out.push_str(" xmlns=\"http://www.w3.org/2000/svg\">\n\n");
        out.push_str(&self.body);
        out.push_str("</svg>\n");
        out
    }

    pub fn write_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.finish()).map_err(|err| Error::io(path, err))?;
        tracing::debug!(path = %path.display(), "svg written");
        Ok(())
    }
}

/// Shortest decimal form without float noise: near-integers snap, `-0` becomes `0`.
pub(crate) fn fmt_into(out: &mut String, v: f64) {
    if !v.is_finite() {
        out.push('0');
        return;
    }
    let mut v = if v.abs() < 1e-9 { 0.0 } else { v };
    let nearest = v.round();
    if (v - nearest).abs() < 1e-6 {
        v = nearest;
    }
    if v == -0.0 {
        v = 0.0;
    }
    let _ = write!(out, "{v}");
}

pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
