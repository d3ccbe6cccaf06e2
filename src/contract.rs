use std::str::FromStr;

use crate::{
    crop_err,
    error::{CropError, ErrorKind},
};

/// What the caller wants out of a session. Validated once at the call boundary and
/// read-only afterwards.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OutputContract {
    /// Width of the exported image in pixels.
    pub target_size: u32,
    /// `width / height` of both the crop window and the export.
    pub aspect_ratio: f64,
    /// The crop window never changes shape while a session is open; kept so
    /// callers can state intent.
    pub ratio_locked: bool,
}

impl OutputContract {
    pub fn new(target_size: u32, aspect_ratio: f64, ratio_locked: bool) -> Result<Self, CropError> {
        let contract = Self {
            target_size,
            aspect_ratio,
            ratio_locked,
        };
        contract.validate()?;
        Ok(contract)
    }

    /// Square profile photo, 512×512.
    pub fn avatar() -> Self {
        Self {
            target_size: 512,
            aspect_ratio: 1.0,
            ratio_locked: true,
        }
    }

    /// Wide header image, 1000×320 (500:160).
    pub fn banner() -> Self {
        Self {
            target_size: 1000,
            aspect_ratio: 3.125,
            ratio_locked: true,
        }
    }

    pub fn validate(&self) -> Result<(), CropError> {
        if self.target_size == 0 {
            return Err(crop_err!(
                ErrorKind::InvalidContract,
                "target size must be positive"
            ));
        }
        if !(self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0) {
            return Err(crop_err!(
                ErrorKind::InvalidContract,
                "aspect ratio must be a positive number, got {}",
                self.aspect_ratio
            ));
        }
        Ok(())
    }

    /// Export dimensions: the target width, floored at `min_width`, and the
    /// height that keeps the aspect ratio (at least 1).
    pub fn output_size(&self, min_width: u32) -> (u32, u32) {
        let width = self.target_size.max(min_width);
        let height = (width as f64 / self.aspect_ratio).round().max(1.0) as u32;
        (width, height)
    }
}

/// Parses a literal aspect ratio: `3.125`, `500:160` or `500/160`.
pub fn parse_aspect_ratio(s: &str) -> Result<f64, CropError> {
    let invalid = || {
        crop_err!(
            ErrorKind::InvalidContract,
            "invalid aspect ratio `{s}', expected a number or W:H"
        )
    };
    let s = s.trim();
    let ratio = match s.split_once(|c: char| c == ':' || c == '/') {
        Some((w, h)) => {
            let w = f64::from_str(w.trim()).map_err(|_| invalid())?;
            let h = f64::from_str(h.trim()).map_err(|_| invalid())?;
            w / h
        }
        None => f64::from_str(s).map_err(|_| invalid())?,
    };
    if ratio.is_finite() && ratio > 0.0 {
        Ok(ratio)
    } else {
        Err(invalid())
    }
}
