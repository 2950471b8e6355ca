use common::{Direction, GamePhase, Grid, Position, SimulationSnapshot};
use terminal::render::{
    board::BoardRenderer,
    standard_renderer::StandardRenderer,
    types::{CharDimensions, RenderConfig},
};

fn snapshot(width: u16, height: u16, snake: Vec<Position>, food: Position) -> SimulationSnapshot {
    SimulationSnapshot {
        grid: Grid::new(width, height),
        phase: GamePhase::Running,
        snake,
        direction: Direction::Right,
        food,
        score: 0,
        high_score: 0,
        level: 1,
        food_eaten: 0,
        foods_to_next_level: 5,
        tick_interval_ms: 100,
        tick: 0,
    }
}

fn render(snapshot: &SimulationSnapshot, char_dims: CharDimensions) -> Vec<Vec<char>> {
    let renderer = BoardRenderer::new(StandardRenderer::new(char_dims));
    let config = RenderConfig { chars_per_cell: char_dims };
    renderer.render(snapshot, &config).into_lines()
}

#[test]
fn test_2x1_rendering() {
    let snapshot = snapshot(
        10,
        10,
        vec![Position::new(5, 5), Position::new(4, 5)],
        Position::new(7, 7),
    );
    let lines = render(&snapshot, CharDimensions::new(2, 1));

    assert_eq!(lines.len(), 10);
    assert_eq!(lines[0].len(), 20);

    // Head at (5,5) -> chars 10,11 on row 5
    assert_eq!(lines[5][10], '█');
    assert_eq!(lines[5][11], '█');

    assert_eq!(lines[5][8], '▓');
    assert_eq!(lines[5][9], '▓');

    // Egg at (7,7) -> chars 14,15 on row 7
    assert_eq!(lines[7][14], '(');
    assert_eq!(lines[7][15], ')');

    assert_eq!(lines[0][0], ' ');
}

#[test]
fn test_1x1_rendering() {
    let snapshot = snapshot(
        5,
        5,
        vec![
            Position::new(4, 2),
            Position::new(3, 2),
            Position::new(2, 2),
            Position::new(1, 2),
            Position::new(0, 2),
        ],
        Position::new(3, 3),
    );
    let lines = render(&snapshot, CharDimensions::new(1, 1));

    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0].len(), 5);

    let row: String = lines[2].iter().collect();
    assert_eq!(row, "▒▒▓▓█");
    assert_eq!(lines[3][3], '●');
}

#[test]
fn test_custom_dimensions() {
    let snapshot = snapshot(3, 3, vec![Position::new(0, 0)], Position::new(1, 1));
    let lines = render(&snapshot, CharDimensions::new(3, 2));

    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0].len(), 9);

    // Egg cell covers columns 3..6 and rows 2..4, yolk in the middle
    assert_eq!(lines[2][3], '○');
    assert_eq!(lines[3][4], '●');
    assert_eq!(lines[3][5], '○');

    assert_eq!(lines[0][0], '█');
    assert_eq!(lines[1][2], '█');
}

#[test]
fn test_head_drawn_over_overlapping_body() {
    // On the tick of a self collision the head shares a cell with the body
    let snapshot = snapshot(
        4,
        4,
        vec![
            Position::new(1, 1),
            Position::new(2, 1),
            Position::new(2, 2),
            Position::new(1, 2),
            Position::new(1, 1),
        ],
        Position::new(3, 3),
    );
    let lines = render(&snapshot, CharDimensions::new(1, 1));
    assert_eq!(lines[1][1], '█');
}

#[test]
fn test_out_of_bounds_segments_are_skipped() {
    let snapshot = snapshot(
        3,
        3,
        vec![Position::new(3, 1), Position::new(2, 1)],
        Position::new(0, 0),
    );
    let lines = render(&snapshot, CharDimensions::new(1, 1));
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1].len(), 3);
    assert_eq!(lines[1][2], '▓');
}
