//! Per-tick camera interpolation toward a planned view
//! The caller owns one `CameraRig` and drives `tick` from its frame loop

use super::view::ViewState;
use crate::model::{Position, Vector};
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CameraState {
    pub position: Position,
    pub target: Position,
    pub up: Vector,
    /// Accumulated free-look rotation (yaw, pitch, roll) in radians
    pub rotation: [f64; 3],
}

impl From<&ViewState> for CameraState {
    fn from(view: &ViewState) -> Self {
        Self {
            position: view.position,
            target: view.target,
            up: view.up,
            rotation: [0.0; 3],
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct InterpolationPlan {
    /// Fraction of the remaining distance covered per tick
    pub blend: f64,
    /// Distance under which the camera snaps to the target
    pub epsilon: f64,
    pub max_steps: usize,
}

impl Default for InterpolationPlan {
    fn default() -> Self {
        Self {
            blend: 0.12,
            epsilon: 0.01,
            max_steps: 240,
        }
    }
}

/// One blend step from `current` toward `target`, unwinding rotation to identity
pub fn step(current: &CameraState, target: &ViewState, plan: &InterpolationPlan) -> CameraState {
    let t = plan.blend.clamp(0.0, 1.0);
    let up = current.up.lerp(target.up, t);
    let length = up.length();
    let up = if length > f64::EPSILON {
        up * (1.0 / length)
    } else {
        target.up
    };

    CameraState {
        position: current.position.lerp(target.position, t),
        target: current.target.lerp(target.target, t),
        up,
        rotation: current.rotation.map(|r| r * (1.0 - t)),
    }
}

/// Largest remaining gap between `current` and `target`
pub fn remaining(current: &CameraState, target: &ViewState) -> f64 {
    let rotation = current.rotation.iter().fold(0.0f64, |acc, r| acc.max(r.abs()));
    current
        .position
        .distance(target.position)
        .max(current.target.distance(target.target))
        .max(current.up.distance(target.up))
        .max(rotation)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    /// No transition in flight
    Idle,
    Moving,
    /// The transition finished on this tick
    Arrived,
}

#[derive(Debug, Clone)]
struct InFlight {
    target: ViewState,
    steps: usize,
}

#[derive(Debug, Clone)]
pub struct CameraRig {
    current: CameraState,
    in_flight: Option<InFlight>,
    plan: InterpolationPlan,
}

impl CameraRig {
    pub fn new(initial: &ViewState, plan: InterpolationPlan) -> Self {
        Self {
            current: CameraState::from(initial),
            in_flight: None,
            plan,
        }
    }

    pub fn current(&self) -> &CameraState {
        &self.current
    }

    pub fn is_moving(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn pending_target(&self) -> Option<&ViewState> {
        self.in_flight.as_ref().map(|f| &f.target)
    }

    /// Start moving toward `target`, dropping any transition already in flight
    pub fn request(&mut self, target: ViewState) {
        if let Some(previous) = &self.in_flight {
            debug!(
                "Abandoning {} transition after {} steps",
                previous.target.mode, previous.steps
            );
        }
        self.in_flight = Some(InFlight { target, steps: 0 });
    }

    /// Apply user free-look rotation on top of the current pose
    pub fn rotate(&mut self, yaw: f64, pitch: f64) {
        self.current.rotation[0] += yaw;
        self.current.rotation[1] += pitch;
    }

    pub fn tick(&mut self) -> TickStatus {
        let Some(flight) = self.in_flight.as_mut() else {
            return TickStatus::Idle;
        };

        let next = step(&self.current, &flight.target, &self.plan);
        flight.steps += 1;

        if remaining(&next, &flight.target) < self.plan.epsilon || flight.steps >= self.plan.max_steps {
            self.current = CameraState::from(&flight.target);
            debug!("Camera arrived at {} view after {} steps", flight.target.mode, flight.steps);
            self.in_flight = None;
            TickStatus::Arrived
        } else {
            self.current = next;
            TickStatus::Moving
        }
    }
}
