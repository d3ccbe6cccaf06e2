//! Image Loader: turns a user-supplied source into a [`Bitmap`].
//!
//! Binary sources are spooled to a transient reference (a named temporary file)
//! and decoded from there. The reference is released by scope on every exit path,
//! and the loader keeps a live count of both references and bitmaps so leaks show up.

use std::{
    io::{Cursor, Write},
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageReader};
use log::debug;
use percent_encoding::percent_decode_str;
use tempfile::NamedTempFile;

use crate::{
    bitmap::{Bitmap, Lease},
    error::CropError,
    load_err,
};

/// Where the image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Raw encoded image data, e.g. an uploaded file.
    Bytes(Vec<u8>),
    /// A `data:` URI, a `file://` URL or a plain filesystem path.
    Url(String),
}

impl From<Vec<u8>> for Source {
    fn from(bytes: Vec<u8>) -> Self {
        Source::Bytes(bytes)
    }
}

impl From<&[u8]> for Source {
    fn from(bytes: &[u8]) -> Self {
        Source::Bytes(bytes.to_vec())
    }
}

impl From<String> for Source {
    fn from(url: String) -> Self {
        Source::Url(url)
    }
}

impl From<&str> for Source {
    fn from(url: &str) -> Self {
        Source::Url(url.to_owned())
    }
}

#[derive(Debug, Default)]
pub struct Loader {
    live_references: Arc<AtomicUsize>,
    live_bitmaps: Arc<AtomicUsize>,
    next_id: u64,
}

impl Loader {
    pub fn new() -> Self {
        crate::init::init();
        Self::default()
    }

    pub fn load(&mut self, source: &Source) -> Result<Bitmap, CropError> {
        let decoded = match source {
            Source::Bytes(bytes) => {
                let reference = TransientRef::acquire(bytes, &self.live_references)?;
                // `reference` is dropped at the end of this arm whether decoding worked or not
                decode_path(reference.path())
            }
            Source::Url(url) => decode_url(url),
        }?;

        let (width, height) = (decoded.width(), decoded.height());
        if width == 0 || height == 0 {
            return Err(load_err!("decoded image has zero size: {width}x{height}"));
        }

        self.next_id += 1;
        debug!("loaded bitmap #{} ({width}x{height})", self.next_id);
        Ok(Bitmap::new(
            self.next_id,
            decoded.into_rgba8(),
            Lease::acquire(&self.live_bitmaps),
        ))
    }

    /// Transient references that have been acquired and not yet released.
    pub fn live_references(&self) -> usize {
        self.live_references.load(Ordering::SeqCst)
    }

    /// Bitmaps produced by this loader that are still alive somewhere.
    pub fn live_bitmaps(&self) -> usize {
        self.live_bitmaps.load(Ordering::SeqCst)
    }
}

/// Temporary, addressable copy of an in-memory image, released on drop.
struct TransientRef {
    file: NamedTempFile,
    _lease: Lease,
}

impl TransientRef {
    fn acquire(bytes: &[u8], gauge: &Arc<AtomicUsize>) -> Result<Self, CropError> {
        let mut file = NamedTempFile::new()
            .map_err(|e| load_err!("unable to allocate a temporary reference: {e}"))?;
        file.write_all(bytes)
            .and_then(|()| file.flush())
            .map_err(|e| load_err!("unable to spool image data: {e}"))?;
        Ok(Self {
            file,
            _lease: Lease::acquire(gauge),
        })
    }

    fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Guesses the format based on file contents, not the extension.
fn decode_path(path: &Path) -> Result<DynamicImage, CropError> {
    let reader = ImageReader::open(path)
        .map_err(|e| load_err!("unable to open image '{}': {e}", path.display()))?;
    let reader = reader
        .with_guessed_format()
        .map_err(|e| load_err!("unable to read image '{}': {e}", path.display()))?;
    reader
        .decode()
        .map_err(|e| load_err!("unable to decode image '{}': {e}", path.display()))
}

fn decode_memory(bytes: &[u8]) -> Result<DynamicImage, CropError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| load_err!("unable to read image data: {e}"))?;
    reader
        .decode()
        .map_err(|e| load_err!("unable to decode image data: {e}"))
}

fn decode_url(url: &str) -> Result<DynamicImage, CropError> {
    match parse_url(url)? {
        UrlTarget::Inline(bytes) => decode_memory(&bytes),
        UrlTarget::Path(path) => decode_path(&path),
    }
}

#[derive(Debug, PartialEq)]
enum UrlTarget {
    Inline(Vec<u8>),
    Path(PathBuf),
}

fn parse_url(url: &str) -> Result<UrlTarget, CropError> {
    if let Some(rest) = strip_prefix_ignore_case(url, "data:") {
        return parse_data_url(rest).map(UrlTarget::Inline);
    }
    if let Some(path) = strip_prefix_ignore_case(url, "file://") {
        let path = percent_decode_str(path)
            .decode_utf8()
            .map_err(|e| load_err!("file URL is not valid UTF-8: {e}"))?
            .into_owned();
        return Ok(UrlTarget::Path(PathBuf::from(path)));
    }
    if let Some((scheme, _)) = url.split_once("://") {
        return Err(load_err!("unsupported URL scheme `{scheme}'"));
    }
    if url.is_empty() {
        return Err(load_err!("empty image URL"));
    }
    Ok(UrlTarget::Path(PathBuf::from(url)))
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

/// Parses the part after `data:`, i.e. `[<mediatype>][;base64],<data>`
fn parse_data_url(rest: &str) -> Result<Vec<u8>, CropError> {
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| load_err!("malformed data URI: missing ','"))?;
    let is_base64 = header
        .rsplit(';')
        .next()
        .is_some_and(|param| param.eq_ignore_ascii_case("base64"));
    if is_base64 {
        // whitespace is tolerated by browsers in base64 payloads
        let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| load_err!("malformed base64 in data URI: {e}"))
    } else {
        Ok(percent_decode_str(payload).collect())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use image::{codecs::png::PngEncoder, ExtendedColorType, ImageEncoder, Rgba, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(img.as_raw(), width, height, ExtendedColorType::Rgba8)
            .unwrap();
        out
    }

    #[test]
    fn test_load_bytes_releases_reference() {
        let mut loader = Loader::new();
        let bitmap = loader.load(&Source::Bytes(png_bytes(7, 3))).unwrap();
        assert_eq!(bitmap.dimensions(), (7, 3));
        assert_eq!(loader.live_references(), 0);
        assert_eq!(loader.live_bitmaps(), 1);
        drop(bitmap);
        assert_eq!(loader.live_bitmaps(), 0);
    }

    #[test]
    fn test_undecodable_bytes_release_reference() {
        let mut loader = Loader::new();
        let err = loader
            .load(&Source::Bytes(b"definitely not an image".to_vec()))
            .unwrap_err();
        assert!(err.kind().is_load());
        assert_eq!(loader.live_references(), 0);
        assert_eq!(loader.live_bitmaps(), 0);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut loader = Loader::new();
        let a = loader.load(&Source::Bytes(png_bytes(2, 2))).unwrap();
        let b = loader.load(&Source::Bytes(png_bytes(2, 2))).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_load_base64_data_url() {
        let url = format!("data:image/png;base64,{}", STANDARD.encode(png_bytes(4, 5)));
        let mut loader = Loader::new();
        let bitmap = loader.load(&Source::Url(url)).unwrap();
        assert_eq!(bitmap.dimensions(), (4, 5));
    }

    #[test]
    fn test_load_plain_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("avatar.png");
        std::fs::write(&path, png_bytes(9, 9)).unwrap();
        let mut loader = Loader::new();
        let bitmap = loader
            .load(&Source::Url(path.to_string_lossy().into_owned()))
            .unwrap();
        assert_eq!(bitmap.dimensions(), (9, 9));
    }

    #[test]
    fn test_remote_urls_are_rejected() {
        let mut loader = Loader::new();
        let err = loader
            .load(&Source::Url("https://example.com/a.png".into()))
            .unwrap_err();
        assert!(err.kind().is_load());
        assert!(err.to_string().contains("`https'"));
    }

    #[test]
    fn test_parse_url_variants() {
        assert_eq!(
            parse_url("file:///tmp/my%20photo.png").unwrap(),
            UrlTarget::Path(PathBuf::from("/tmp/my photo.png"))
        );
        assert_eq!(
            parse_url("DATA:text/plain,hi%21").unwrap(),
            UrlTarget::Inline(b"hi!".to_vec())
        );
        // a stray `%` is kept as is, like browsers do
        assert_eq!(
            parse_url("data:,100%25 or 50%").unwrap(),
            UrlTarget::Inline(b"100% or 50%".to_vec())
        );
        assert!(parse_url("file:///tmp/%FF.png").is_err());
        assert!(parse_url("data:image/png;base64").is_err());
        assert!(parse_url("").is_err());
    }
}
