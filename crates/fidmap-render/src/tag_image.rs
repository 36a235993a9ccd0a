//! Printable fiducial tag images.
//!
//! A tag is a 12 × 12 grid of square cells: a white quiet ring, a black bit border, and an
//! 8 × 8 data field carrying the payload one byte per row, least significant bit in the
//! leftmost column.

use std::path::{Path, PathBuf};

use fidmap_core::TagId;

use crate::codec::{ParityEncoder, crc16_ccitt};
use crate::svg::{Svg, Units};
use crate::{Error, Result};

/// Printed edge length used for letter paper.
pub const DEFAULT_TAG_SIZE_MM: f64 = 160.0;

/// Printed edge length scaled up for ledger paper (`-L`).
pub const LARGE_TAG_SIZE_MM: f64 = 160.0 * 11.0 / 8.5;

/// The eight payload bytes: `[id_lo, id_hi, crc_lo, crc_hi, p0, p1, p2, p3]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagPayload {
    bytes: [u8; 8],
}

impl TagPayload {
    pub fn encode(id: TagId, encoder: &impl ParityEncoder) -> Result<Self> {
        let id = u16::try_from(id).map_err(|_| Error::TagIdRange { id })?;
        let [id_lo, id_hi] = id.to_le_bytes();
        let [crc_lo, crc_hi] = crc16_ccitt(&[id_lo, id_hi]).to_le_bytes();
        let message = [id_lo, id_hi, crc_lo, crc_hi];
        let [p0, p1, p2, p3] = encoder.parity(&message);
        Ok(Self {
            bytes: [id_lo, id_hi, crc_lo, crc_hi, p0, p1, p2, p3],
        })
    }

    pub fn bytes(&self) -> &[u8; 8] {
        &self.bytes
    }

    pub fn bit(&self, row: usize, column: usize) -> bool {
        self.bytes[row] & (1 << column) != 0
    }

    pub fn count_ones(&self) -> u32 {
        self.bytes.iter().map(|byte| byte.count_ones()).sum()
    }
}

struct TagCanvas {
    svg: Svg,
    cell_width: f64,
    border: bool,
}

impl TagCanvas {
    /// Fills cells `(first_column, first_row) ..= (last_column, last_row)` black. Rows count
    /// upward from the bottom of the grid.
    fn cells(&mut self, first_column: u32, first_row: u32, last_column: u32, last_row: u32) {
        let delta = if self.border { 0.0 } else { 1.0 };
        let top = 11 - first_row.max(last_row);
        let bottom = 11 - first_row.min(last_row);
        let left = first_column.min(last_column);
        let right = first_column.max(last_column);
        self.svg.rectangle(
            (f64::from(left) - delta) * self.cell_width,
            (f64::from(top) - delta) * self.cell_width,
            f64::from(right - left + 1) * self.cell_width,
            f64::from(bottom - top + 1) * self.cell_width,
            "black",
            "black",
        );
    }

    fn crop_marks(&mut self, length: f64) {
        let cell_width = self.cell_width;
        let x_or_y = length + 2.0 * cell_width;
        let d = 2.0;
        let (x1, x2) = (0.0, x_or_y);
        for (y, vertical) in [
            (-cell_width, 0.0),
            (0.0, d),
            (x_or_y, -d),
            (x_or_y + cell_width, 0.0),
        ] {
            self.svg.line(x1, y, x1 + d, y, "black");
            self.svg.line(x2, y, x2 - d, y, "black");
            if vertical != 0.0 {
                self.svg.line(x1, y, x1, y + vertical, "black");
                self.svg.line(x2, y, x2, y + vertical, "black");
            }
        }
    }
}

/// Draws the tag for `id`, `size_mm` millimetres across the bit border.
///
/// With `border` the image also carries corner crop marks; without it the grid shifts one
/// cell up and left.
pub fn render_tag_svg(
    id: TagId,
    size_mm: f64,
    border: bool,
    encoder: &impl ParityEncoder,
) -> Result<String> {
    Ok(draw_tag(id, size_mm, border, encoder)?.finish())
}

fn draw_tag(id: TagId, size_mm: f64, border: bool, encoder: &impl ParityEncoder) -> Result<Svg> {
    let payload = TagPayload::encode(id, encoder)?;
    let cell_width = size_mm / 10.0;
    let length = 10.0 * cell_width;

    let mut svg = Svg::new(
        length + 3.0 * cell_width,
        length + 5.0 * cell_width,
        Units::Millimeters,
    );
    svg.set_offsets(5.0, 5.0 + cell_width);
    let mut canvas = TagCanvas {
        svg,
        cell_width,
        border,
    };

    if border {
        canvas.crop_marks(length);
    }

    // Bit border: bottom, right, top, left.
    canvas.cells(1, 1, 9, 1);
    canvas.cells(10, 1, 10, 9);
    canvas.cells(2, 10, 10, 10);
    canvas.cells(1, 2, 1, 10);

    for row in 0..8 {
        for column in 0..8 {
            if payload.bit(row, column) {
                let (column, row) = (column as u32 + 2, row as u32 + 2);
                canvas.cells(column, row, column, row);
            }
        }
    }

    let label_x = (if border { 6.0 } else { 5.0 }) * cell_width;
    let font_size = (cell_width as u32) / 2;
    canvas
        .svg
        .text(&id.to_string(), label_x, 12.25 * cell_width, "ariel", font_size);

    Ok(canvas.svg)
}

/// Writes `tag<ID>.svg` into `directory` and returns its path.
pub fn write_tag_svg(
    directory: &Path,
    id: TagId,
    size_mm: f64,
    border: bool,
    encoder: &impl ParityEncoder,
) -> Result<PathBuf> {
    let path = directory.join(format!("tag{id}.svg"));
    draw_tag(id, size_mm, border, encoder)?.write_file(&path)?;
    tracing::info!(tag = id, path = %path.display(), "tag image written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ReedSolomon84;

    #[test]
    fn payload_layout_is_little_endian() {
        let payload = TagPayload::encode(0x1234, &ReedSolomon84::new()).unwrap();
        let bytes = payload.bytes();
        assert_eq!(bytes[0], 0x34);
        assert_eq!(bytes[1], 0x12);
        let crc = crc16_ccitt(&[0x34, 0x12]);
        assert_eq!(u16::from_le_bytes([bytes[2], bytes[3]]), crc);
        let parity = ReedSolomon84::new().parity(&[bytes[0], bytes[1], bytes[2], bytes[3]]);
        assert_eq!(&bytes[4..], &parity[..]);
    }

    #[test]
    fn ids_beyond_sixteen_bits_are_refused() {
        let err = TagPayload::encode(70_000, &ReedSolomon84::new()).unwrap_err();
        assert!(matches!(err, Error::TagIdRange { id: 70_000 }));
    }
}
