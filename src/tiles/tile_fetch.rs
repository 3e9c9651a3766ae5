//! Texture fetch collaborator
//!
//! The engine only asks for base tiles. Medium and Low use the base tile
//! as is; High composes the four child tiles one zoom level down.

use super::tile_data::{TextureTier, TileCoord, TileKey};
use futures::future::{try_join_all, BoxFuture};
use image::{imageops, RgbaImage};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("transport error for tile {coord}: {message}")]
    Transport { coord: TileCoord, message: String },
    #[error("could not decode tile {coord}: {message}")]
    Decode { coord: TileCoord, message: String },
    #[error("tile {0} not found")]
    NotFound(TileCoord),
}

impl FetchError {
    pub fn coord(&self) -> TileCoord {
        match self {
            FetchError::Transport { coord, .. } | FetchError::Decode { coord, .. } => *coord,
            FetchError::NotFound(coord) => *coord,
        }
    }
}

/// Asset collaborator returning decoded base tiles
pub trait TileFetcher: Send + Sync {
    fn fetch_base_tile(&self, coord: TileCoord) -> BoxFuture<'static, Result<RgbaImage, FetchError>>;
}

/// The four tiles covering `coord` at the next zoom level, row-major
pub fn child_tiles(coord: TileCoord) -> [TileCoord; 4] {
    let zoom = coord.zoom.saturating_add(1);
    let (x, y) = (coord.x * 2, coord.y * 2);
    [
        TileCoord { x, y, zoom },
        TileCoord { x: x + 1, y, zoom },
        TileCoord { x, y: y + 1, zoom },
        TileCoord { x: x + 1, y: y + 1, zoom },
    ]
}

/// Stitch four row-major quadrants into one image of twice the edge length
pub fn composite_quad(parts: &[RgbaImage]) -> Option<RgbaImage> {
    let first = parts.first()?;
    let (w, h) = first.dimensions();
    let mut out = RgbaImage::new(w * 2, h * 2);
    for (i, part) in parts.iter().take(4).enumerate() {
        let ox = (i as i64 % 2) * w as i64;
        let oy = (i as i64 / 2) * h as i64;
        imageops::replace(&mut out, part, ox, oy);
    }
    Some(out)
}

/// Image for a tier of a tile
pub async fn fetch_tier_image(
    fetcher: &dyn TileFetcher,
    key: TileKey,
) -> Result<RgbaImage, FetchError> {
    match key.tier {
        TextureTier::Medium | TextureTier::Low => fetcher.fetch_base_tile(key.coord).await,
        TextureTier::High => {
            let parts = try_join_all(child_tiles(key.coord).map(|c| fetcher.fetch_base_tile(c))).await?;
            composite_quad(&parts).ok_or_else(|| FetchError::Decode {
                coord: key.coord,
                message: "no child tiles".to_string(),
            })
        }
    }
}
