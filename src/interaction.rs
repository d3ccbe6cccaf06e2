//! Interaction Controller: pointer, wheel, slider and keyboard input as a small
//! state machine over [`PointerState`].
//!
//! [`step`] is a pure function. It takes the current state and transform plus one
//! event, and returns the next state, the next transform and what the editor has
//! to do about it. Nothing here touches pixels, so synthetic event sequences can be
//! tested without a real pointer device.

use log::{trace, warn};

use crate::{config::ScaleBounds, layout::Viewport, transform::Transform};

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed on the canvas, CSS pixel coordinates.
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp,
    PointerCancel,
    /// Wheel delta as reported by the platform. Only the sign matters.
    Wheel { delta_y: f64 },
    /// External zoom slider moved to this scale.
    Slider(f64),
    Key(Key),
    Reset,
    /// The canvas element was measured at a new size.
    Resize(Viewport),
}

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, strum::EnumString, strum::IntoStaticStr, strum::VariantArray,
)]
#[strum(ascii_case_insensitive)]
pub enum Key {
    #[strum(serialize = "+", serialize = "=", serialize = "plus")]
    ZoomIn,
    #[strum(serialize = "-", serialize = "minus")]
    ZoomOut,
    #[strum(serialize = "escape", serialize = "esc")]
    Escape,
    #[strum(serialize = "enter", serialize = "return")]
    Enter,
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub enum PointerState {
    #[default]
    Idle,
    /// Pointer is captured; the last seen position in CSS pixels.
    Dragging { last_x: f64, last_y: f64 },
}

impl PointerState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, PointerState::Dragging { .. })
    }
}

/// What the editor must do after a transition.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Effect {
    /// Nothing visible changed.
    None,
    /// The transform changed; repaint the preview.
    Repaint,
    /// Reapply the cover initialization, then repaint.
    Reset,
    /// Lay the crop window out again for the new viewport, then repaint.
    Relayout(Viewport),
    /// Resolve the session as cancelled.
    Cancel,
    /// Run the export and resolve the session with it.
    Confirm,
}

/// Inputs to a transition that come from the session rather than from the event.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Controls {
    pub bounds: ScaleBounds,
    pub zoom_step: f64,
    pub device_pixel_ratio: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Step {
    pub state: PointerState,
    pub transform: Transform,
    pub effect: Effect,
}

pub fn step(
    state: PointerState,
    transform: Transform,
    event: &InputEvent,
    controls: &Controls,
) -> Step {
    let mut next = transform;
    let unchanged = |state| Step {
        state,
        transform,
        effect: Effect::None,
    };

    match *event {
        InputEvent::PointerDown { x, y } => {
            if !(x.is_finite() && y.is_finite()) {
                warn!("ignoring pointer-down at non-finite position");
                return unchanged(state);
            }
            unchanged(PointerState::Dragging {
                last_x: x,
                last_y: y,
            })
        }
        InputEvent::PointerMove { x, y } => {
            let PointerState::Dragging { last_x, last_y } = state else {
                return unchanged(state);
            };
            let dpr = controls.device_pixel_ratio;
            if !next.translate_by((x - last_x) * dpr, (y - last_y) * dpr) {
                warn!("ignoring pointer-move to non-finite position");
                return unchanged(state);
            }
            trace!(
                "drag to ({}, {}) in device pixels",
                next.translate_x,
                next.translate_y
            );
            Step {
                state: PointerState::Dragging {
                    last_x: x,
                    last_y: y,
                },
                transform: next,
                effect: Effect::Repaint,
            }
        }
        InputEvent::PointerUp | InputEvent::PointerCancel => unchanged(PointerState::Idle),
        InputEvent::Wheel { delta_y } => {
            if delta_y > 0.0 {
                zoom(state, next, 1.0 / controls.zoom_step, controls)
            } else if delta_y < 0.0 {
                zoom(state, next, controls.zoom_step, controls)
            } else {
                // zero or NaN: no direction
                unchanged(state)
            }
        }
        InputEvent::Slider(value) => {
            if !next.set_scale(value, controls.bounds) {
                warn!("ignoring non-finite slider value");
                return unchanged(state);
            }
            trace!("slider sets scale to {}", next.scale);
            Step {
                state,
                transform: next,
                effect: Effect::Repaint,
            }
        }
        InputEvent::Key(Key::ZoomIn) => zoom(state, next, controls.zoom_step, controls),
        InputEvent::Key(Key::ZoomOut) => zoom(state, next, 1.0 / controls.zoom_step, controls),
        InputEvent::Key(Key::Escape) => Step {
            state: PointerState::Idle,
            transform,
            effect: Effect::Cancel,
        },
        InputEvent::Key(Key::Enter) => Step {
            state,
            transform,
            effect: Effect::Confirm,
        },
        InputEvent::Reset => Step {
            state,
            transform,
            effect: Effect::Reset,
        },
        InputEvent::Resize(viewport) => Step {
            state,
            transform,
            effect: Effect::Relayout(viewport),
        },
    }
}

fn zoom(state: PointerState, mut transform: Transform, factor: f64, controls: &Controls) -> Step {
    transform.zoom_by(factor, controls.bounds);
    trace!("zoom by {factor} to scale {}", transform.scale);
    Step {
        state,
        transform,
        effect: Effect::Repaint,
    }
}
