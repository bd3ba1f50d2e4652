//
// Copyright 2025-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Damped spring easing for the agent's position
//!
//! Both controllers integrate a unit-mass spring with semi-implicit Euler:
//! `a = -k (x - target) - c v`. The caller is responsible for keeping `dt`
//! small; the context sub-steps host frames for that.

use super::episode::EpisodeToken;
use super::spatial::Bounds;
use crate::config::SpringParams;
use whiskers_common::Vec2;

/// A single spring driven value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringAxis {
    pub value: f64,
    pub velocity: f64,
    pub target: f64,
    pub params: SpringParams,
}

impl SpringAxis {
    pub fn new(value: f64, params: SpringParams) -> Self {
        Self {
            value,
            velocity: 0.0,
            target: value,
            params,
        }
    }

    /// Retarget the spring, keeping the current velocity
    pub fn set_target(&mut self, target: f64, params: SpringParams) {
        if target.is_finite() {
            self.target = target;
        }
        self.params = params;
    }

    /// Advance by `dt` seconds
    pub fn step(&mut self, dt: f64) {
        let accel = -self.params.stiffness * (self.value - self.target) - self.params.damping * self.velocity;
        self.velocity += accel * dt;
        self.value += self.velocity * dt;
    }

    pub fn is_at_rest(&self, rest_delta: f64, rest_speed: f64) -> bool {
        (self.value - self.target).abs() < rest_delta && self.velocity.abs() < rest_speed
    }

    /// Jump to the target and stop
    pub fn settle(&mut self) {
        self.value = self.target;
        self.velocity = 0.0;
    }
}

/// Reported once when an easing reaches its target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrival {
    pub at: Vec2,
    /// Episode that requested the move, if any
    pub owner: Option<EpisodeToken>,
}

/// Eases the agent's base position toward a target
#[derive(Debug, Clone)]
pub struct PositionController {
    x: SpringAxis,
    y: SpringAxis,
    moving: bool,
    owner: Option<EpisodeToken>,
    rest_delta: f64,
    rest_speed: f64,
}

impl PositionController {
    pub fn new(position: Vec2, params: SpringParams, rest_delta: f64, rest_speed: f64) -> Self {
        Self {
            x: SpringAxis::new(position.x, params),
            y: SpringAxis::new(position.y, params),
            moving: false,
            owner: None,
            rest_delta,
            rest_speed,
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x.value, self.y.value)
    }

    pub fn target(&self) -> Vec2 {
        Vec2::new(self.x.target, self.y.target)
    }

    pub fn velocity(&self) -> Vec2 {
        Vec2::new(self.x.velocity, self.y.velocity)
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn owner(&self) -> Option<EpisodeToken> {
        self.owner
    }

    /// Start easing toward `target`, replacing any easing in flight.
    ///
    /// The target is clamped into `bounds` (NaN components fall back to the
    /// current position). Returns the target actually accepted.
    pub fn set_target(
        &mut self,
        target: Vec2,
        bounds: &Bounds,
        params: SpringParams,
        owner: Option<EpisodeToken>,
    ) -> Vec2 {
        let accepted = bounds.clamp(target, self.position());
        self.x.set_target(accepted.x, params);
        self.y.set_target(accepted.y, params);
        self.owner = owner;
        self.moving = true;
        tracing::trace!("Easing toward {} (owner {:?})", accepted, owner);
        accepted
    }

    /// Advance by `dt` seconds. Returns the arrival on the step that lands.
    pub fn tick(&mut self, dt: f64) -> Option<Arrival> {
        if !self.moving {
            return None;
        }

        self.x.step(dt);
        self.y.step(dt);

        if self.x.is_at_rest(self.rest_delta, self.rest_speed)
            && self.y.is_at_rest(self.rest_delta, self.rest_speed)
        {
            self.x.settle();
            self.y.settle();
            self.moving = false;
            return Some(Arrival {
                at: self.position(),
                owner: self.owner.take(),
            });
        }

        None
    }

    /// Teleport vertically, cancelling any vertical easing
    pub fn relocate_y(&mut self, y: f64) {
        self.y.value = y;
        self.y.target = y;
        self.y.velocity = 0.0;
    }
}
