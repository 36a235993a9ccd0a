#![forbid(unsafe_code)]

//! `fidmap` builds floor maps from ceiling-mounted fiducial tags.
//!
//! A detection pipeline reports tags and the relative measurements between co-visible pairs;
//! the [`Map`] keeps the best evidence per pair, resolves every reachable tag to an absolute
//! floor pose, and saves itself to a deterministic text file.
//!
//! # Features
//!
//! - `render`: SVG output of maps and printable tag images (`fidmap::render`)

pub use fidmap_core::*;

#[cfg(feature = "render")]
pub mod render {
    pub use fidmap_render::{
        DEFAULT_TAG_SIZE_MM, LARGE_TAG_SIZE_MM, ParityEncoder, ReedSolomon84, Svg, SvgOptions,
        TagPayload, Units, codec, crc16_ccitt, render_map, render_tag_svg, svg, tag_image,
        write_map_svg, write_tag_svg,
    };

    #[derive(Debug, thiserror::Error)]
    pub enum Error {
        #[error(transparent)]
        Map(#[from] fidmap_core::Error),
        #[error(transparent)]
        Render(#[from] fidmap_render::Error),
    }

    pub type Result<T> = std::result::Result<T, Error>;

    /// Loads the map named by `config` and renders it.
    pub fn render_map_file(config: fidmap_core::MapConfig, options: &SvgOptions) -> Result<String> {
        let map = fidmap_core::Map::load(config)?;
        Ok(render_map(&map, options)?)
    }
}
