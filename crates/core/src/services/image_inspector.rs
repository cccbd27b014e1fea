//! Image inspection: detected format, pixel size and animation flag.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use emotes_common::{AppError, EmoteConfig};
use emotes_db::ImageAttributes;
use image::codecs::gif::GifDecoder;
use image::codecs::png::PngDecoder;
use image::codecs::webp::WebPDecoder;
use image::{AnimationDecoder, ImageFormat, ImageReader, ImageResult};
use regex::Regex;
use tracing::debug;

use crate::error::{EmoteError, EmoteResult};

static SVG_ROOT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<svg(?:\s[^>]*)?>").unwrap());

static SVG_WIDTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)(?:^|\s)width\s*=\s*["']([^"']*)["']"#).unwrap());

static SVG_HEIGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)(?:^|\s)height\s*=\s*["']([^"']*)["']"#).unwrap());

static SVG_LENGTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)(?:\.\d+)?\s*(?:px)?\s*$").unwrap());

/// Inspects uploaded images and enforces the extension allow-list.
#[derive(Debug, Clone)]
pub struct ImageInspector {
    allowed_extensions: Arc<[String]>,
}

impl ImageInspector {
    /// Create an inspector accepting the given extensions (case-insensitive).
    #[must_use]
    pub fn new(allowed_extensions: Vec<String>) -> Self {
        Self {
            allowed_extensions: allowed_extensions.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &EmoteConfig) -> Self {
        Self::new(config.allowed_extensions.clone())
    }

    /// Sniff the file at `path`.
    ///
    /// Fails with [`EmoteError::UnsupportedFormat`] for unrecognised content and
    /// for formats outside the allow-list.
    pub async fn inspect(&self, path: &Path) -> EmoteResult<ImageAttributes> {
        let path = path.to_path_buf();
        let allowed = Arc::clone(&self.allowed_extensions);

        tokio::task::spawn_blocking(move || sniff(&path, &allowed))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?
    }
}

fn is_allowed(allowed: &[String], extension: &str) -> bool {
    allowed.iter().any(|a| a.eq_ignore_ascii_case(extension))
}

fn sniff(path: &Path, allowed: &[String]) -> EmoteResult<ImageAttributes> {
    // Content decides the format, never the spooled file's name.
    let reader = ImageReader::new(open_buffered(path).map_err(AppError::from)?)
        .with_guessed_format()
        .map_err(AppError::from)?;

    let Some(format) = reader.format() else {
        return sniff_svg(path, allowed);
    };

    let extension = format
        .extensions_str()
        .first()
        .copied()
        .ok_or_else(|| EmoteError::UnsupportedFormat(format!("{format:?}")))?;

    if !format
        .extensions_str()
        .iter()
        .any(|ext| is_allowed(allowed, ext))
    {
        return Err(EmoteError::UnsupportedFormat(extension.to_string()));
    }

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| EmoteError::UnsupportedFormat(format!("{extension}: {e}")))?;

    let animated = detect_animation(path, format).unwrap_or_else(|e| {
        debug!(error = %e, path = %path.display(), "Animation detection failed");
        false
    });

    Ok(ImageAttributes {
        extension: extension.to_string(),
        width: i32::try_from(width).ok(),
        height: i32::try_from(height).ok(),
        animated,
    })
}

fn open_buffered(path: &Path) -> std::io::Result<BufReader<File>> {
    Ok(BufReader::new(File::open(path)?))
}

fn detect_animation(path: &Path, format: ImageFormat) -> ImageResult<bool> {
    Ok(match format {
        ImageFormat::Gif => {
            GifDecoder::new(open_buffered(path)?)?
                .into_frames()
                .take(2)
                .count()
                > 1
        }
        ImageFormat::Png => PngDecoder::new(open_buffered(path)?)?.is_apng()?,
        ImageFormat::WebP => WebPDecoder::new(open_buffered(path)?)?.has_animation(),
        _ => false,
    })
}

fn sniff_svg(path: &Path, allowed: &[String]) -> EmoteResult<ImageAttributes> {
    let bytes = std::fs::read(path).map_err(AppError::from)?;
    let text = String::from_utf8_lossy(&bytes);

    let root = SVG_ROOT_RE
        .find(&text)
        .ok_or_else(|| EmoteError::UnsupportedFormat("unknown".to_string()))?
        .as_str();

    if !is_allowed(allowed, "svg") {
        return Err(EmoteError::UnsupportedFormat("svg".to_string()));
    }

    Ok(ImageAttributes {
        extension: "svg".to_string(),
        width: svg_length(&SVG_WIDTH_RE, root),
        height: svg_length(&SVG_HEIGHT_RE, root),
        animated: false,
    })
}

/// Whole pixels of a numeric (optionally `px`) attribute; anything else is `None`.
fn svg_length(attribute: &Regex, root: &str) -> Option<i32> {
    let value = attribute.captures(root)?.get(1)?.as_str();
    SVG_LENGTH_RE.captures(value)?.get(1)?.as_str().parse().ok()
}
