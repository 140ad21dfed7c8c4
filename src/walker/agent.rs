//! Walker state: position, movement type, speed and history

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, Point};
use crate::walker::movement::MovementType;

/// Speed state toggled by slow zones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedState {
    #[default]
    Normal,
    Slowed,
}

/// Lifecycle of a walker within one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalkerPhase {
    /// At the origin, waiting for the first step
    #[default]
    Initialized,
    Stepping,
    Done,
}

/// A random-walking agent
#[derive(Debug, Clone)]
pub struct Walker<const D: usize> {
    id: AgentId,
    position: Point<D>,
    movement: MovementType,
    /// Previous positions, oldest first. Never includes `position`.
    history: Vec<Point<D>>,
    speed: SpeedState,
    restart_enabled: bool,
    phase: WalkerPhase,
}

impl<const D: usize> Walker<D> {
    pub fn new(id: AgentId, movement: MovementType, restart_enabled: bool) -> Self {
        Self {
            id,
            position: Point::origin(),
            movement,
            history: Vec::new(),
            speed: SpeedState::Normal,
            restart_enabled,
            phase: WalkerPhase::Initialized,
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn position(&self) -> Point<D> {
        self.position
    }

    pub fn movement(&self) -> MovementType {
        self.movement
    }

    pub fn history(&self) -> &[Point<D>] {
        &self.history
    }

    pub fn speed(&self) -> SpeedState {
        self.speed
    }

    pub fn is_slowed(&self) -> bool {
        self.speed == SpeedState::Slowed
    }

    pub fn restart_enabled(&self) -> bool {
        self.restart_enabled
    }

    pub fn phase(&self) -> WalkerPhase {
        self.phase
    }

    pub fn distance_from_origin(&self) -> f64 {
        self.position.norm()
    }

    pub fn slow_down(&mut self) {
        self.speed = SpeedState::Slowed;
    }

    pub fn regular_speed(&mut self) {
        self.speed = SpeedState::Normal;
    }

    pub(crate) fn set_phase(&mut self, phase: WalkerPhase) {
        self.phase = phase;
    }

    /// Move to `accepted`, then roll the restart check
    ///
    /// The old position goes to history even when `accepted` equals it
    /// (blocked moves still take a tick). Returns the resulting position.
    pub(crate) fn advance<R: Rng + ?Sized>(
        &mut self,
        accepted: Point<D>,
        restart_probability: f64,
        rng: &mut R,
    ) -> Point<D> {
        self.history.push(self.position);
        self.position = accepted;
        if self.restart_enabled && rng.gen_bool(restart_probability) {
            tracing::trace!("Walker {:?} restarted at the origin", self.id);
            self.position = Point::origin();
        }
        self.position
    }

    /// Back to the origin at normal speed; history is kept
    pub fn reset(&mut self) {
        self.position = Point::origin();
        self.speed = SpeedState::Normal;
        self.phase = WalkerPhase::Initialized;
    }
}
