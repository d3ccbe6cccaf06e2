//! Command-line parsing for `cropkit`.
//!
//! Options use a single leading dash (`-ratio 3.125`) in the ImageMagick style,
//! which argument parsing libraries do not support, so they are parsed by hand.

use std::ffi::{OsStr, OsString};
use std::str::FromStr;

use strum::{EnumString, IntoStaticStr, VariantArray};

use crate::{
    compress::Preset,
    contract::{parse_aspect_ratio, OutputContract},
    crop_err,
    error::{CropError, ErrorKind},
    filter::Filter,
    layout::Viewport,
    script::parse_size,
};

#[derive(EnumString, IntoStaticStr, VariantArray, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "snake_case")]
pub enum Arg {
    Preset,
    Ratio,
    Size,
    Viewport,
    Dpr,
    Filter,
    Script,
    Compress,
}

impl Arg {
    pub fn help_text(&self) -> &'static str {
        match self {
            Arg::Preset => "avatar (512x512) or banner (1000x320) output",
            Arg::Ratio => "aspect ratio of the crop, e.g. 1, 3.125 or 500:160",
            Arg::Size => "width of the exported image in pixels",
            Arg::Viewport => "simulated canvas size in CSS pixels, WxH",
            Arg::Dpr => "simulated device pixel ratio",
            Arg::Filter => "resampling filter used for the final resize",
            Arg::Script => "file of interaction events to replay before confirming",
            Arg::Compress => "re-encode the crop for upload as avatar or banner (WebP, JPEG fallback)",
        }
    }
}

/// Everything a `cropkit` run needs, validated.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub input: OsString,
    pub output: OsString,
    pub contract: OutputContract,
    pub viewport: Viewport,
    pub filter: Filter,
    pub script: Option<OsString>,
    pub compress: Option<Preset>,
}

#[derive(Debug)]
struct PlanBuilder {
    input: Option<OsString>,
    target_size: u32,
    aspect_ratio: f64,
    viewport: (f64, f64),
    device_pixel_ratio: f64,
    filter: Filter,
    script: Option<OsString>,
    compress: Option<Preset>,
}

impl Default for PlanBuilder {
    fn default() -> Self {
        let avatar = OutputContract::avatar();
        Self {
            input: None,
            target_size: avatar.target_size,
            aspect_ratio: avatar.aspect_ratio,
            viewport: (800.0, 600.0),
            device_pixel_ratio: 1.0,
            filter: Filter::default(),
            script: None,
            compress: None,
        }
    }
}

impl PlanBuilder {
    fn apply_arg(&mut self, arg: Arg, value: &OsStr) -> Result<(), CropError> {
        let arg_string: &'static str = arg.into();
        let value = value.to_str().ok_or_else(|| {
            crop_err!(
                ErrorKind::Usage,
                "invalid argument for option `-{arg_string}': {}",
                value.to_string_lossy()
            )
        })?;
        let invalid = || {
            crop_err!(
                ErrorKind::Usage,
                "invalid argument for option `-{arg_string}': {value}"
            )
        };

        match arg {
            Arg::Preset => {
                let contract = match Preset::from_str(value).map_err(|_| invalid())? {
                    Preset::Avatar => OutputContract::avatar(),
                    Preset::Banner => OutputContract::banner(),
                };
                self.target_size = contract.target_size;
                self.aspect_ratio = contract.aspect_ratio;
            }
            Arg::Ratio => self.aspect_ratio = parse_aspect_ratio(value)?,
            Arg::Size => self.target_size = u32::from_str(value).map_err(|_| invalid())?,
            Arg::Viewport => self.viewport = parse_size(value)?,
            Arg::Dpr => {
                self.device_pixel_ratio = match f64::from_str(value) {
                    Ok(dpr) if dpr.is_finite() && dpr > 0.0 => dpr,
                    _ => return Err(invalid()),
                }
            }
            Arg::Filter => self.filter = Filter::from_str(value).map_err(|_| invalid())?,
            Arg::Script => self.script = Some(OsString::from(value)),
            Arg::Compress => self.compress = Some(Preset::from_str(value).map_err(|_| invalid())?),
        }
        Ok(())
    }

    fn add_input_file(&mut self, file: OsString) -> Result<(), CropError> {
        if let Some(existing) = &self.input {
            return Err(crop_err!(
                ErrorKind::Usage,
                "only one input image is supported, got `{}' and `{}'",
                existing.to_string_lossy(),
                file.to_string_lossy()
            ));
        }
        self.input = Some(file);
        Ok(())
    }

    fn build(self, output: OsString) -> Result<RunPlan, CropError> {
        let input = self
            .input
            .ok_or_else(|| crop_err!(ErrorKind::Usage, "no input image given"))?;
        let (width, height) = self.viewport;
        Ok(RunPlan {
            input,
            output,
            contract: OutputContract::new(self.target_size, self.aspect_ratio, true)?,
            viewport: Viewport::new(width, height, self.device_pixel_ratio),
            filter: self.filter,
            script: self.script,
            compress: self.compress,
        })
    }
}

/// Parses the full argument list, including `argv[0]`.
pub fn parse_args(mut args: Vec<OsString>) -> Result<RunPlan, CropError> {
    if args.len() <= 1 {
        return Err(crop_err!(ErrorKind::Usage, "no command-line arguments provided"));
    }

    // the output file always comes last
    let output = args
        .pop()
        .ok_or_else(|| crop_err!(ErrorKind::Usage, "missing an output filename"))?;
    if starts_with_dash(&output) {
        return Err(crop_err!(
            ErrorKind::Usage,
            "missing an image filename `{}'",
            output.to_string_lossy()
        ));
    }

    let mut builder = PlanBuilder::default();
    let mut iter = args.into_iter().skip(1); // skip argv[0], path to our binary
    while let Some(raw_arg) = iter.next() {
        if starts_with_dash(&raw_arg) {
            let name = raw_arg.to_string_lossy();
            let name = &name[1..];
            let arg = Arg::try_from(name)
                .map_err(|_| crop_err!(ErrorKind::Usage, "unrecognized option `-{name}'"))?;
            let value = iter.next().ok_or_else(|| {
                crop_err!(ErrorKind::Usage, "option `-{name}' requires a value")
            })?;
            builder.apply_arg(arg, &value)?;
        } else {
            builder.add_input_file(raw_arg)?;
        }
    }
    builder.build(output)
}

/// A lone `-` or anything starting with `--` is a filename.
fn starts_with_dash(arg: &OsStr) -> bool {
    let bytes = arg.as_encoded_bytes();
    bytes.len() > 1 && bytes[0] == b'-' && bytes[1] != b'-'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<OsString> {
        std::iter::once("cropkit")
            .chain(list.iter().copied())
            .map(OsString::from)
            .collect()
    }

    #[test]
    fn test_defaults() {
        let plan = parse_args(args(&["in.png", "out.png"])).unwrap();
        assert_eq!(plan.input, OsString::from("in.png"));
        assert_eq!(plan.output, OsString::from("out.png"));
        assert_eq!(plan.contract, OutputContract::avatar());
        assert_eq!(plan.viewport, Viewport::new(800.0, 600.0, 1.0));
        assert_eq!(plan.filter, Filter::Lanczos);
        assert_eq!(plan.script, None);
        assert_eq!(plan.compress, None);
    }

    #[test]
    fn test_options() {
        let plan = parse_args(args(&[
            "-preset", "banner", "-size", "1500", "-viewport", "1024x768", "-dpr", "2",
            "-filter", "mitchell", "-script", "moves.txt", "in.jpg", "out.png",
        ]))
        .unwrap();
        assert_eq!(plan.contract.target_size, 1500);
        assert_eq!(plan.contract.aspect_ratio, 3.125);
        assert_eq!(plan.viewport, Viewport::new(1024.0, 768.0, 2.0));
        assert_eq!(plan.filter, Filter::Mitchell);
        assert_eq!(plan.script.as_deref(), Some(OsStr::new("moves.txt")));
    }

    #[test]
    fn test_ratio_and_compress() {
        let plan = parse_args(args(&["in.png", "-ratio", "500:160", "-compress", "avatar", "out.webp"]))
            .unwrap();
        assert_eq!(plan.contract.aspect_ratio, 3.125);
        assert_eq!(plan.compress, Some(Preset::Avatar));
    }

    #[test]
    fn test_errors() {
        let usage = |list: &[&str]| parse_args(args(list)).unwrap_err().kind();
        assert_eq!(usage(&[]), ErrorKind::Usage);
        assert_eq!(usage(&["in.png"]), ErrorKind::Usage);
        assert_eq!(usage(&["in.png", "-size"]), ErrorKind::Usage);
        assert_eq!(usage(&["-bogus", "1", "in.png", "out.png"]), ErrorKind::Usage);
        assert_eq!(usage(&["a.png", "b.png", "out.png"]), ErrorKind::Usage);
        assert_eq!(usage(&["-dpr", "0", "in.png", "out.png"]), ErrorKind::Usage);
        assert_eq!(
            usage(&["-size", "0", "in.png", "out.png"]),
            ErrorKind::InvalidContract
        );
        assert_eq!(
            usage(&["-ratio", "1:0", "in.png", "out.png"]),
            ErrorKind::InvalidContract
        );
    }
}
