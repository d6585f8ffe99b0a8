//! One-shot "clear" controller.
//!
//! Each trigger (buffer slider moved, Clear pressed) produces exactly one
//! output: a freshly computed curve or a blank chart. A Clear blanks exactly
//! one output and then re-arms normal display by itself:
//!
//! | state        | trigger              | output | next state   |
//! |--------------|----------------------|--------|--------------|
//! | `Active`     | `SliderChanged(b)`   | curve  | `Active`     |
//! | `Active`     | `ClearPressed`       | (none) | `ArmedBlank` |
//! | `ArmedBlank` | any                  | blank  | `Active`     |
//!
//! A Clear is observed together with its own output, so `ClearPressed` in
//! `Active` is immediately re-delivered and yields the blank.

use tracing::debug;

use crate::curve::predict_curve;
use crate::domain::{CurveFrame, FittedModel, GridSpec};

/// External events driving the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trigger {
    /// The buffer volume control moved to a new value.
    SliderChanged(f64),
    /// The Clear action fired.
    ClearPressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    #[default]
    Active,
    ArmedBlank,
}

impl ControllerState {
    /// Whether the next output will be blank.
    pub fn pending_blank(self) -> bool {
        self == ControllerState::ArmedBlank
    }
}

/// What the chart renderer should show.
#[derive(Debug, Clone, PartialEq)]
pub enum Render {
    Curve(CurveFrame),
    Blank,
}

#[derive(Debug, Clone)]
pub struct ReactiveController {
    model: FittedModel,
    grid: GridSpec,
    state: ControllerState,
}

impl ReactiveController {
    pub fn new(model: FittedModel, grid: GridSpec) -> Self {
        Self {
            model,
            grid,
            state: ControllerState::default(),
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Process one trigger to completion.
    pub fn handle(&mut self, trigger: Trigger) -> Render {
        match self.transition(trigger) {
            Some(render) => render,
            None => self.transition(trigger).unwrap_or(Render::Blank),
        }
    }

    fn transition(&mut self, trigger: Trigger) -> Option<Render> {
        let from = self.state;
        let render = match (self.state, trigger) {
            (ControllerState::ArmedBlank, _) => {
                self.state = ControllerState::Active;
                Some(Render::Blank)
            }
            (ControllerState::Active, Trigger::ClearPressed) => {
                self.state = ControllerState::ArmedBlank;
                None
            }
            (ControllerState::Active, Trigger::SliderChanged(buffer)) => {
                let curve = predict_curve(&self.model, buffer, &self.grid);
                Some(Render::Curve(CurveFrame::new(curve)))
            }
        };
        debug!(?from, to = ?self.state, ?trigger, blank = matches!(render, Some(Render::Blank)), "controller transition");
        render
    }
}
