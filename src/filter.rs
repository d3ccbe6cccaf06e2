use std::fmt::Display;

use pic_scale_safe::ResamplingFunction;

#[derive(
    Copy, Clone, Eq, PartialEq, Debug, strum::EnumString, strum::IntoStaticStr, strum::VariantArray,
)]
#[strum(ascii_case_insensitive)]
/// Resampling filter used when scaling the cropped pixels to the output size
pub enum Filter {
    Bilinear,
    Box,
    Catrom,
    Cubic,
    Gaussian,
    Hann,
    Hermite,
    Lanczos,
    Lanczos2,
    Mitchell,
    Point,
    Robidoux,
    RobidouxSharp,
    Spline,
}

impl Default for Filter {
    /// Comparable to a browser canvas with `imageSmoothingQuality = "high"`
    fn default() -> Self {
        Filter::Lanczos
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stringified: &'static str = self.into();
        f.write_str(stringified)
    }
}

impl Filter {
    pub fn into_resampling(self) -> ResamplingFunction {
        match self {
            Filter::Bilinear => ResamplingFunction::Bilinear,
            Filter::Box => ResamplingFunction::Box,
            Filter::Catrom => ResamplingFunction::CatmullRom,
            Filter::Cubic => ResamplingFunction::Cubic,
            Filter::Gaussian => ResamplingFunction::Gaussian,
            Filter::Hann => ResamplingFunction::Hann,
            Filter::Hermite => ResamplingFunction::Hermite,
            Filter::Lanczos => ResamplingFunction::Lanczos3,
            Filter::Lanczos2 => ResamplingFunction::Lanczos2,
            Filter::Mitchell => ResamplingFunction::MitchellNetravalli,
            Filter::Point => ResamplingFunction::Nearest,
            Filter::Robidoux => ResamplingFunction::Robidoux,
            Filter::RobidouxSharp => ResamplingFunction::RobidouxSharp,
            Filter::Spline => ResamplingFunction::BSpline,
        }
    }
}
