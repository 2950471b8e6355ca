use common::SimulationSnapshot;

use super::traits::BoardPieceRenderer;
use super::types::{CharGrid, RenderConfig};

pub struct BoardRenderer<R: BoardPieceRenderer> {
    renderer: R,
}

impl<R: BoardPieceRenderer> BoardRenderer<R> {
    pub fn new(renderer: R) -> Self {
        Self { renderer }
    }

    pub fn render(&self, snapshot: &SimulationSnapshot, config: &RenderConfig) -> CharGrid {
        let grid = snapshot.grid;
        let mut chars = CharGrid::new(grid.width as usize, grid.height as usize, config.chars_per_cell);

        let empty = self.renderer.render_empty();
        for y in 0..grid.height as usize {
            for x in 0..grid.width as usize {
                chars.set_logical_point(x, y, &empty);
            }
        }

        if grid.contains(snapshot.food) {
            let pattern = self.renderer.render_egg();
            chars.set_logical_point(snapshot.food.x as usize, snapshot.food.y as usize, &pattern);
        }

        // Tail first so the head always ends up on top
        let length = snapshot.snake.len();
        for (index, segment) in snapshot.snake.iter().enumerate().rev() {
            if grid.contains(*segment) {
                let pattern = self.renderer.render_sausage_segment(index, length);
                chars.set_logical_point(segment.x as usize, segment.y as usize, &pattern);
            }
        }

        chars
    }
}
