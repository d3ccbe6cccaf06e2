//! Interaction scripts: a line-based list of input events to replay against an
//! editor session from the command line.
//!
//! ```text
//! # pan right by 40 CSS pixels, then zoom in twice
//! down 100 100
//! move 140 100
//! up
//! wheel -1
//! key +
//! ```

use std::str::FromStr;

use strum::{EnumString, IntoStaticStr, VariantArray};

use crate::{
    crop_err,
    error::{CropError, ErrorKind},
    interaction::{InputEvent, Key},
    layout::Viewport,
};

#[derive(EnumString, IntoStaticStr, VariantArray, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Command {
    Down,
    Move,
    Up,
    Cancel,
    Wheel,
    Slider,
    Key,
    Reset,
    Resize,
}

impl Command {
    /// Number of operands after the command word.
    pub fn arity(&self) -> usize {
        match self {
            Command::Down | Command::Move => 2,
            Command::Up | Command::Cancel | Command::Reset => 0,
            Command::Wheel | Command::Slider | Command::Key | Command::Resize => 1,
        }
    }

    pub fn help_text(&self) -> &'static str {
        match self {
            Command::Down => "X Y    press the pointer at X,Y (CSS pixels)",
            Command::Move => "X Y    move the pointer to X,Y",
            Command::Up => "       release the pointer",
            Command::Cancel => "       lose the pointer capture",
            Command::Wheel => "DY     scroll; negative zooms in",
            Command::Slider => "S      set the zoom slider to S",
            Command::Key => "K      press +, -, escape or enter",
            Command::Reset => "       restore the initial view",
            Command::Resize => "WxH    resize the viewport",
        }
    }
}

/// Parses a whole script. `device_pixel_ratio` is used for `resize` lines.
pub fn parse_script(text: &str, device_pixel_ratio: f64) -> Result<Vec<InputEvent>, CropError> {
    let mut events = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = match line.split_once('#') {
            Some((code, _comment)) => code,
            None => line,
        };
        if line.trim().is_empty() {
            continue;
        }
        let event = parse_line(line, device_pixel_ratio)
            .map_err(|msg| crop_err!(ErrorKind::Usage, "line {}: {msg}", index + 1))?;
        events.push(event);
    }
    Ok(events)
}

/// Errors are plain messages; [`parse_script`] attaches the line number.
fn parse_line(line: &str, device_pixel_ratio: f64) -> Result<InputEvent, String> {
    let mut words = line.split_whitespace();
    let name = words.next().unwrap_or_default();
    let command = Command::from_str(name).map_err(|_| format!("unknown command `{name}'"))?;
    let operands: Vec<&str> = words.collect();
    if operands.len() != command.arity() {
        let name: &'static str = command.into();
        return Err(format!(
            "`{name}' takes {} operand(s), got {}",
            command.arity(),
            operands.len()
        ));
    }

    let event = match command {
        Command::Down => InputEvent::PointerDown {
            x: number(operands[0])?,
            y: number(operands[1])?,
        },
        Command::Move => InputEvent::PointerMove {
            x: number(operands[0])?,
            y: number(operands[1])?,
        },
        Command::Up => InputEvent::PointerUp,
        Command::Cancel => InputEvent::PointerCancel,
        Command::Wheel => InputEvent::Wheel {
            delta_y: number(operands[0])?,
        },
        Command::Slider => InputEvent::Slider(number(operands[0])?),
        Command::Key => InputEvent::Key(
            Key::from_str(operands[0]).map_err(|_| format!("unknown key `{}'", operands[0]))?,
        ),
        Command::Reset => InputEvent::Reset,
        Command::Resize => {
            let (width, height) = size(operands[0])?;
            InputEvent::Resize(Viewport::new(width, height, device_pixel_ratio))
        }
    };
    Ok(event)
}

fn number(s: &str) -> Result<f64, String> {
    match f64::from_str(s) {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(format!("invalid number `{s}'")),
    }
}

/// Parses `WxH` (also `WXH`) into a pair of non-negative sizes.
pub fn parse_size(s: &str) -> Result<(f64, f64), CropError> {
    size(s).map_err(|msg| crop_err!(ErrorKind::Usage, "{msg}"))
}

fn size(s: &str) -> Result<(f64, f64), String> {
    let invalid = || format!("invalid size `{s}', expected WxH");
    let (width, height) = s
        .split_once(|c: char| c == 'x' || c == 'X')
        .ok_or_else(invalid)?;
    let width = f64::from_str(width).map_err(|_| invalid())?;
    let height = f64::from_str(height).map_err(|_| invalid())?;
    if width.is_finite() && height.is_finite() && width >= 0.0 && height >= 0.0 {
        Ok((width, height))
    } else {
        Err(invalid())
    }
}
