//! Win condition
//!
//! The maze starts locked. The first time the ball touches the goal it
//! unlocks for good: walls lose their static flag and gravity switches on,
//! so the maze falls apart.

use std::fmt;

use log::{info, trace};
use serde::Serialize;

/// Labels the physics world attaches to bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyLabel {
    Ball,
    Goal,
    Wall,
    Boundary,
}

impl BodyLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyLabel::Ball => "ball",
            BodyLabel::Goal => "goal",
            BodyLabel::Wall => "wall",
            BodyLabel::Boundary => "boundary",
        }
    }
}

impl fmt::Display for BodyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Two bodies that started touching, by label
///
/// Bodies the maze knows nothing about may carry any label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionPair<'a> {
    pub label_a: &'a str,
    pub label_b: &'a str,
}

impl<'a> CollisionPair<'a> {
    pub fn new(label_a: &'a str, label_b: &'a str) -> Self {
        Self { label_a, label_b }
    }

    /// Whether the pair is `{first, second}`, in either order
    pub fn is_between(&self, first: BodyLabel, second: BodyLabel) -> bool {
        let (a, b) = (first.as_str(), second.as_str());
        (self.label_a == a && self.label_b == b) || (self.label_a == b && self.label_b == a)
    }
}

/// Instructions the monitor gives to the physics world on unlock
pub trait PhysicsWorld {
    /// Set the vertical gravity component, positive pulls down
    fn set_gravity_y(&mut self, gravity_y: f32);

    /// Clear the static flag of every body labelled `label`
    fn release_static(&mut self, label: BodyLabel);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnlockState {
    #[default]
    Locked,
    Unlocked,
}

/// Locked/unlocked state machine of one maze session
///
/// The world is only borrowed for the duration of a callback.
#[derive(Debug, Clone, PartialEq)]
pub struct WinMonitor {
    state: UnlockState,
    gravity_y: f32,
}

impl Default for WinMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl WinMonitor {
    pub const GRAVITY_Y: f32 = 1.0;

    pub fn new() -> Self {
        Self::with_gravity(Self::GRAVITY_Y)
    }

    /// Monitor that switches gravity to `gravity_y` on unlock
    pub fn with_gravity(gravity_y: f32) -> Self {
        Self {
            state: UnlockState::Locked,
            gravity_y,
        }
    }

    pub fn state(&self) -> UnlockState {
        self.state
    }

    pub fn is_unlocked(&self) -> bool {
        self.state == UnlockState::Unlocked
    }

    /// Handle one collision-start notification
    ///
    /// Returns `true` if this collision unlocked the maze. Only the
    /// ball-goal pair while locked does anything.
    pub fn on_collision<W: PhysicsWorld + ?Sized>(
        &mut self,
        pair: CollisionPair<'_>,
        world: &mut W,
    ) -> bool {
        if self.is_unlocked() || !pair.is_between(BodyLabel::Ball, BodyLabel::Goal) {
            trace!("Ignoring collision {} - {}", pair.label_a, pair.label_b);
            return false;
        }
        self.state = UnlockState::Unlocked;
        info!("Ball reached the goal, releasing walls");
        world.set_gravity_y(self.gravity_y);
        world.release_static(BodyLabel::Wall);
        true
    }

    /// Handle a batch of pairs reported in one simulation step
    ///
    /// Returns `true` if any pair in the batch unlocked the maze.
    pub fn on_collision_start<W: PhysicsWorld + ?Sized>(
        &mut self,
        pairs: &[CollisionPair<'_>],
        world: &mut W,
    ) -> bool {
        let mut unlocked = false;
        for pair in pairs {
            unlocked |= self.on_collision(*pair, world);
        }
        unlocked
    }
}
