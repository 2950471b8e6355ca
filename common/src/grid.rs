use serde::{Deserialize, Serialize};

use crate::constants::{CELL_SIZE_PX, DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH, MAX_GRID_SIDE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i16,
    pub y: i16,
}

impl Position {
    pub fn new(x: i16, y: i16) -> Self {
        Position { x, y }
    }

    /// The neighbouring cell one step in `direction`. May lie outside the grid.
    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Position {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Maps a raw unit vector to a direction. Anything that is not exactly one
    /// step along one axis yields `None`.
    pub fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        match (dx, dy) {
            (0, -1) => Some(Direction::Up),
            (0, 1) => Some(Direction::Down),
            (-1, 0) => Some(Direction::Left),
            (1, 0) => Some(Direction::Right),
            _ => None,
        }
    }

    /// Interprets a touch swipe. The dominant axis wins; swipes shorter than
    /// `min_distance` are ignored.
    pub fn from_swipe(dx: f64, dy: f64, min_distance: f64) -> Option<Self> {
        if dx.abs() > dy.abs() {
            if dx > min_distance {
                Some(Direction::Right)
            } else if dx < -min_distance {
                Some(Direction::Left)
            } else {
                None
            }
        } else if dy > min_distance {
            Some(Direction::Down)
        } else if dy < -min_distance {
            Some(Direction::Up)
        } else {
            None
        }
    }

    pub fn delta(&self) -> (i16, i16) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn is_opposite(&self, other: &Direction) -> bool {
        matches!(
            (self, other),
            (Direction::Up, Direction::Down)
                | (Direction::Down, Direction::Up)
                | (Direction::Left, Direction::Right)
                | (Direction::Right, Direction::Left)
        )
    }
}

/// Fixed-size board measured in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub width: u16,
    pub height: u16,
    pub cell_size: u32,
}

impl Default for Grid {
    fn default() -> Self {
        Grid::new(DEFAULT_GRID_WIDTH, DEFAULT_GRID_HEIGHT)
    }
}

impl Grid {
    /// Sides are clamped to what a `Position` can address.
    pub fn new(width: u16, height: u16) -> Self {
        Grid {
            width: width.min(MAX_GRID_SIDE),
            height: height.min(MAX_GRID_SIDE),
            cell_size: CELL_SIZE_PX,
        }
    }

    /// Builds the grid that fits a canvas of the given pixel size.
    pub fn from_canvas(canvas_width: u32, canvas_height: u32) -> Self {
        let cells = |pixels: u32| (pixels / CELL_SIZE_PX).min(MAX_GRID_SIDE as u32) as u16;
        Grid::new(cells(canvas_width), cells(canvas_height))
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && (position.x as i32) < self.width as i32
            && (position.y as i32) < self.height as i32
    }

    pub fn center(&self) -> Position {
        Position {
            x: (self.width / 2) as i16,
            y: (self.height / 2) as i16,
        }
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Top-left pixel corner of a cell.
    pub fn to_pixel(&self, position: Position) -> (f64, f64) {
        (
            position.x as f64 * self.cell_size as f64,
            position.y as f64 * self.cell_size as f64,
        )
    }

    pub fn pixel_width(&self) -> u32 {
        self.width as u32 * self.cell_size
    }

    pub fn pixel_height(&self) -> u32 {
        self.height as u32 * self.cell_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swipe() {
        assert_eq!(Direction::from_swipe(80.0, 10.0, 30.0), Some(Direction::Right));
        assert_eq!(Direction::from_swipe(-5.0, -45.0, 30.0), Some(Direction::Up));
        assert_eq!(Direction::from_swipe(20.0, 4.0, 30.0), None);
    }

    #[test]
    fn test_direction_from_delta() {
        assert_eq!(Direction::from_delta(1, 0), Some(Direction::Right));
        assert_eq!(Direction::from_delta(0, -1), Some(Direction::Up));
        assert_eq!(Direction::from_delta(1, 1), None);
        assert_eq!(Direction::from_delta(0, 0), None);
        assert_eq!(Direction::from_delta(2, 0), None);
    }

    #[test]
    fn test_opposites() {
        assert!(Direction::Left.is_opposite(&Direction::Right));
        assert!(Direction::Up.is_opposite(&Direction::Down));
        assert!(!Direction::Up.is_opposite(&Direction::Left));
        assert!(!Direction::Up.is_opposite(&Direction::Up));
    }

    #[test]
    fn test_huge_canvas_is_clamped() {
        let grid = Grid::from_canvas(u32::MAX, 40_000 * CELL_SIZE_PX);
        assert_eq!(grid.width, MAX_GRID_SIDE);
        assert_eq!(grid.height, MAX_GRID_SIDE);
        assert_eq!(Grid::new(u16::MAX, 10).width, MAX_GRID_SIDE);

        let center = grid.center();
        assert!(grid.contains(center));
        assert!(grid.contains(center.step(Direction::Right)));
        assert!(grid.contains(Position::new(i16::MAX - 1, 0)));
        assert!(!grid.contains(Position::new(i16::MAX, 0)));
    }

    #[test]
    fn test_grid_geometry() {
        let grid = Grid::from_canvas(400, 300);
        assert_eq!(grid.width, 20);
        assert_eq!(grid.height, 15);
        assert_eq!(grid.center(), Position::new(10, 7));
        assert_eq!(grid.to_pixel(Position::new(3, 2)), (60.0, 40.0));

        assert!(grid.contains(Position::new(0, 0)));
        assert!(grid.contains(Position::new(19, 14)));
        assert!(!grid.contains(Position::new(20, 0)));
        assert!(!grid.contains(Position::new(0, -1)));
    }
}
