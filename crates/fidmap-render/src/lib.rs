#![forbid(unsafe_code)]

//! SVG output for `fidmap` maps, plus the printable tag images the maps are built from.

pub mod codec;
pub mod error;
pub mod map;
pub mod svg;
pub mod tag_image;

pub use codec::{ParityEncoder, ReedSolomon84, crc16_ccitt};
pub use error::{Error, Result};
pub use map::{SvgOptions, render_map, write_map_svg};
pub use svg::{Svg, Units};
pub use tag_image::{
    DEFAULT_TAG_SIZE_MM, LARGE_TAG_SIZE_MM, TagPayload, render_tag_svg, write_tag_svg,
};
