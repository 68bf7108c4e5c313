//! Album artwork download and dominant color extraction.
//!
//! The notification embed is tinted with a color sampled from the cover
//! image. The extraction is a simple dominant-bucket heuristic: downsample
//! the image, quantize each channel to 3 bits, count pixels per bucket and
//! average the most populated one. Good enough for a tint, cheap enough to
//! run on every track change.

use std::collections::HashMap;

use reqwest::Client;

use crate::error::ArtworkError;

/// Spotify green, used whenever no color can be extracted.
pub const DEFAULT_EMBED_COLOR: u32 = 0x1DB954;

/// Covers are a few hundred kilobytes; anything beyond this is refused
/// rather than decoded.
pub const MAX_ARTWORK_BYTES: usize = 4 * 1024 * 1024;

/// Edge length the image is downsampled to before counting pixels.
const SAMPLE_EDGE: u32 = 64;

/// Pixels with alpha below this are ignored.
const MIN_ALPHA: u8 = 16;

/// Downloads the cover image and computes its dominant color.
///
/// The download is bounded in both time (the shared client's timeout) and
/// size ([`MAX_ARTWORK_BYTES`]). On any failure the caller substitutes
/// [`DEFAULT_EMBED_COLOR`]; artwork is enrichment, not a required field.
pub async fn dominant_color(client: &Client, image_url: &str) -> Result<u32, ArtworkError> {
    let response = client.get(image_url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ArtworkError::Status { status });
    }

    if let Some(length) = response.content_length() {
        if length as usize > MAX_ARTWORK_BYTES {
            return Err(ArtworkError::TooLarge {
                limit: MAX_ARTWORK_BYTES,
            });
        }
    }

    let bytes = response.bytes().await?;
    if bytes.len() > MAX_ARTWORK_BYTES {
        return Err(ArtworkError::TooLarge {
            limit: MAX_ARTWORK_BYTES,
        });
    }

    dominant_color_from_bytes(&bytes)
}

/// Decodes image bytes and picks the most populated quantized color bucket,
/// averaged back into a 24-bit RGB value.
pub fn dominant_color_from_bytes(bytes: &[u8]) -> Result<u32, ArtworkError> {
    let image = image::load_from_memory(bytes)?;
    let small = image.thumbnail(SAMPLE_EDGE, SAMPLE_EDGE).to_rgba8();

    // bucket -> (count, r sum, g sum, b sum)
    let mut buckets: HashMap<(u8, u8, u8), (u64, u64, u64, u64)> = HashMap::new();
    for pixel in small.pixels() {
        if pixel[3] < MIN_ALPHA {
            continue;
        }
        let bucket = (pixel[0] >> 5, pixel[1] >> 5, pixel[2] >> 5);
        let entry = buckets.entry(bucket).or_insert((0, 0, 0, 0));
        entry.0 += 1;
        entry.1 += pixel[0] as u64;
        entry.2 += pixel[1] as u64;
        entry.3 += pixel[2] as u64;
    }

    let (count, r_sum, g_sum, b_sum) = buckets
        .values()
        .max_by_key(|(count, ..)| *count)
        .copied()
        .ok_or(ArtworkError::Empty)?;

    Ok(embed_color(
        (r_sum / count) as u8,
        (g_sum / count) as u8,
        (b_sum / count) as u8,
    ))
}

/// Packs RGB channels into the integer form Discord embeds expect.
pub fn embed_color(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}
