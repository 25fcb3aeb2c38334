//! Perfect maze for a ball-rolling game whose walls drop once it is solved
//!
//! A session carves a random perfect maze, projects it into wall, goal and
//! start geometry for a physics world, and watches collisions until the
//! ball reaches the goal.
//!
//! # Examples
//! ## Play one session
//! ```
//! use maze_drop::{
//!     BodyLabel, CollisionPair, LayoutConfig, MazeSession, PhysicsWorld, SessionConfig,
//! };
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! #[derive(Default)]
//! struct World {
//!     gravity_y: f32,
//!     released: Vec<BodyLabel>,
//! }
//!
//! impl PhysicsWorld for World {
//!     fn set_gravity_y(&mut self, gravity_y: f32) {
//!         self.gravity_y = gravity_y;
//!     }
//!     fn release_static(&mut self, label: BodyLabel) {
//!         self.released.push(label);
//!     }
//! }
//!
//! let layout = LayoutConfig::fit(600.0, 600.0, 15, 15).unwrap();
//! let config = SessionConfig::new(15, 15, layout);
//! let mut session = MazeSession::new(&config, StdRng::seed_from_u64(1)).unwrap();
//! assert_eq!(session.maze().passage_count(), 15 * 15 - 1);
//! assert_eq!(session.layout().start.x, 20.0);
//!
//! let mut world = World::default();
//! session.on_collision_start(&[CollisionPair::new("wall", "ball")], &mut world);
//! assert!(!session.is_unlocked());
//!
//! session.on_collision_start(&[CollisionPair::new("goal", "ball")], &mut world);
//! assert!(session.is_unlocked());
//! assert_eq!(world.gravity_y, 1.0);
//! assert_eq!(world.released, vec![BodyLabel::Wall]);
//! ```
//!
//! ## Draw a maze
//! ```
//! use maze_drop::maze_generator::{generate, RandomSource};
//!
//! struct Zeros;
//! impl RandomSource for Zeros {
//!     fn next_index(&mut self, _n: usize) -> usize {
//!         0
//!     }
//! }
//!
//! let maze = generate(2, 3, &mut Zeros).unwrap();
//! println!("{maze}");
//! ```

pub mod error;
pub mod layout;
pub mod maze_generator;
pub mod win_monitor;

use log::debug;
use rand::rngs::StdRng;

pub use error::{MazeError, Result};
pub use layout::{
    project, BallDescriptor, BodyDescriptor, Handoff, Layout, LayoutConfig, Point, Rect,
};
pub use maze_generator::{Cell, Direction, Maze, MazeGenerator, RandomSource};
pub use win_monitor::{BodyLabel, CollisionPair, PhysicsWorld, UnlockState, WinMonitor};

/// What to build for one session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub rows: usize,
    pub cols: usize,
    pub layout: LayoutConfig,
    /// Start cell of carving, random if `None`
    pub start: Option<Cell>,
}

impl SessionConfig {
    pub fn new(rows: usize, cols: usize, layout: LayoutConfig) -> Self {
        Self {
            rows,
            cols,
            layout,
            start: None,
        }
    }

    pub fn with_start(self, start: Cell) -> Self {
        Self {
            start: Some(start),
            ..self
        }
    }
}

/// One maze, its geometry, its win state and the randomness behind it
///
/// A new maze means a new session; only the random source is carried over,
/// through [MazeSession::next_session].
#[derive(Debug, Clone)]
pub struct MazeSession<R = StdRng> {
    maze: Maze,
    layout: Layout,
    monitor: WinMonitor,
    random: R,
}

impl<R: RandomSource> MazeSession<R> {
    /// Generate and project a maze, keeping `random` for later sessions
    ///
    /// Every dimension is checked before carving starts.
    pub fn new(config: &SessionConfig, mut random: R) -> Result<Self> {
        let generator = MazeGenerator::new(config.rows, config.cols)?;
        config.layout.validate()?;
        let maze = match config.start {
            Some(start) => generator.generate_from(start, &mut random)?,
            None => generator.generate(&mut random),
        };
        let layout = project(&maze, &config.layout)?;
        debug!(
            "New session: {}x{} maze, {} walls",
            maze.rows(),
            maze.cols(),
            layout.walls.len()
        );
        Ok(Self {
            maze,
            layout,
            monitor: WinMonitor::new(),
            random,
        })
    }

    /// End this session and start a fresh, locked one from the same source
    pub fn next_session(self, config: &SessionConfig) -> Result<Self> {
        Self::new(config, self.random)
    }

    /// End this session, giving back its random source
    pub fn into_random(self) -> R {
        self.random
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn monitor(&self) -> &WinMonitor {
        &self.monitor
    }

    pub fn is_unlocked(&self) -> bool {
        self.monitor.is_unlocked()
    }

    /// Forward a batch of collision-start pairs to the win monitor
    pub fn on_collision_start<W: PhysicsWorld + ?Sized>(
        &mut self,
        pairs: &[CollisionPair<'_>],
        world: &mut W,
    ) -> bool {
        self.monitor.on_collision_start(pairs, world)
    }
}
