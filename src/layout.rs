//! Projection of a maze into world geometry
//!
//! Every closed passage becomes a wall rectangle. Together with the outer
//! boundary, the goal and the ball start point, these are the bodies handed
//! to the physics world.

use log::debug;
use serde::Serialize;

use crate::error::{check_count, check_fraction, check_length, Result};
use crate::maze_generator::Maze;
use crate::win_monitor::BodyLabel;

/// Position in world coordinates, y grows downwards
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Axis-aligned rectangle given by its center and size
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rect {
    pub center_x: f32,
    pub center_y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(center_x: f32, center_y: f32, width: f32, height: f32) -> Self {
        Self {
            center_x,
            center_y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.center_x,
            y: self.center_y,
        }
    }
}

/// Static body to create in the physics world
///
/// Serializes as `{centerX, centerY, width, height, label}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BodyDescriptor {
    #[serde(flatten)]
    pub rect: Rect,
    pub label: BodyLabel,
}

/// Sizes used when projecting a maze
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub cell_width: f32,
    pub cell_height: f32,
    /// Thickness of inner walls
    pub wall_thickness: f32,
    /// Thickness of the four world edges
    pub boundary_thickness: f32,
    /// Goal side length relative to the cell size
    pub goal_fraction: f32,
    /// Ball radius relative to the smaller cell side
    pub ball_radius_fraction: f32,
}

impl LayoutConfig {
    pub const WALL_THICKNESS: f32 = 10.0;
    pub const BOUNDARY_THICKNESS: f32 = 2.0;
    pub const GOAL_FRACTION: f32 = 0.7;
    pub const BALL_RADIUS_FRACTION: f32 = 0.25;

    /// Configuration with the default thicknesses and fractions
    ///
    /// Returns error, if a cell side is not a positive number.
    pub fn new(cell_width: f32, cell_height: f32) -> Result<Self> {
        let config = Self {
            cell_width,
            cell_height,
            wall_thickness: Self::WALL_THICKNESS,
            boundary_thickness: Self::BOUNDARY_THICKNESS,
            goal_fraction: Self::GOAL_FRACTION,
            ball_radius_fraction: Self::BALL_RADIUS_FRACTION,
        };
        config.validate()?;
        Ok(config)
    }

    /// Split a `world_width` x `world_height` area into `rows` x `cols` cells
    pub fn fit(world_width: f32, world_height: f32, rows: usize, cols: usize) -> Result<Self> {
        let world_width = check_length("world_width", world_width)?;
        let world_height = check_length("world_height", world_height)?;
        let rows = check_count("rows", rows)?;
        let cols = check_count("cols", cols)?;
        Self::new(world_width / cols as f32, world_height / rows as f32)
    }

    pub fn with_wall_thickness(self, wall_thickness: f32) -> Self {
        Self {
            wall_thickness,
            ..self
        }
    }

    pub fn with_goal_fraction(self, goal_fraction: f32) -> Self {
        Self {
            goal_fraction,
            ..self
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_length("cell_width", self.cell_width)?;
        check_length("cell_height", self.cell_height)?;
        check_length("wall_thickness", self.wall_thickness)?;
        check_length("boundary_thickness", self.boundary_thickness)?;
        check_fraction("goal_fraction", self.goal_fraction)?;
        check_fraction("ball_radius_fraction", self.ball_radius_fraction)?;
        Ok(())
    }
}

/// Ball to create in the physics world
///
/// Serializes as `{x, y, radius, label}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BallDescriptor {
    #[serde(flatten)]
    pub position: Point,
    pub radius: f32,
    pub label: BodyLabel,
}

/// Everything the physics world needs to build one maze
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Handoff {
    pub world_width: f32,
    pub world_height: f32,
    pub bodies: Vec<BodyDescriptor>,
    pub ball: BallDescriptor,
}

/// World geometry of one maze
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub world_width: f32,
    pub world_height: f32,
    /// Inner walls: closed horizontal passages first, then closed vertical ones
    pub walls: Vec<Rect>,
    /// Top, bottom, left and right world edges
    pub boundary: Vec<Rect>,
    pub goal: Rect,
    /// Center of cell (0, 0)
    pub start: Point,
    pub ball_radius: f32,
}

impl Layout {
    /// Every static body, labelled: boundary, walls, then the goal
    pub fn bodies(&self) -> Vec<BodyDescriptor> {
        let labelled = |label: BodyLabel| {
            move |rect: &Rect| BodyDescriptor { rect: *rect, label }
        };
        self.boundary
            .iter()
            .map(labelled(BodyLabel::Boundary))
            .chain(self.walls.iter().map(labelled(BodyLabel::Wall)))
            .chain(std::iter::once(&self.goal).map(labelled(BodyLabel::Goal)))
            .collect()
    }

    /// Static bodies plus the ball, ready to serialize
    pub fn handoff(&self) -> Handoff {
        Handoff {
            world_width: self.world_width,
            world_height: self.world_height,
            bodies: self.bodies(),
            ball: BallDescriptor {
                position: self.start,
                radius: self.ball_radius,
                label: BodyLabel::Ball,
            },
        }
    }
}

/// Project the passages of `maze` into world geometry
///
/// Pure function of the passage grids and `config`; the visited grid and
/// the start cell of carving play no part.
pub fn project(maze: &Maze, config: &LayoutConfig) -> Result<Layout> {
    config.validate()?;
    let (cw, ch) = (config.cell_width, config.cell_height);
    let world_width = maze.cols() as f32 * cw;
    let world_height = maze.rows() as f32 * ch;

    let floors = maze
        .horizontals()
        .iter()
        .filter(|(_, open)| !**open)
        .map(|((row, col), _)| {
            Rect::new(
                col as f32 * cw + cw / 2.0,
                (row + 1) as f32 * ch,
                cw,
                config.wall_thickness,
            )
        });
    let sides = maze
        .verticals()
        .iter()
        .filter(|(_, open)| !**open)
        .map(|((row, col), _)| {
            Rect::new(
                (col + 1) as f32 * cw,
                row as f32 * ch + ch / 2.0,
                config.wall_thickness,
                ch,
            )
        });
    let walls: Vec<Rect> = floors.chain(sides).collect();

    let edge = config.boundary_thickness;
    let boundary = vec![
        Rect::new(world_width / 2.0, 0.0, world_width, edge),
        Rect::new(world_width / 2.0, world_height, world_width, edge),
        Rect::new(0.0, world_height / 2.0, edge, world_height),
        Rect::new(world_width, world_height / 2.0, edge, world_height),
    ];

    let goal = Rect::new(
        world_width - cw / 2.0,
        world_height - ch / 2.0,
        cw * config.goal_fraction,
        ch * config.goal_fraction,
    );

    debug!(
        "Projected {} walls into a {}x{} world",
        walls.len(),
        world_width,
        world_height
    );
    Ok(Layout {
        world_width,
        world_height,
        walls,
        boundary,
        goal,
        start: Point {
            x: cw / 2.0,
            y: ch / 2.0,
        },
        ball_radius: cw.min(ch) * config.ball_radius_fraction,
    })
}
