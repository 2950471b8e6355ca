use common::{Grid, Position, SimulationSnapshot};
use std::f64::consts::PI;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

const BACKGROUND: &str = "#1a1a1a";
const GRID_LINE: &str = "#333";
const EGG_WHITE: &str = "#ffffff";
const EGG_YOLK: &str = "#ffeb99";
const SAUSAGE: &str = "#d4451e";
const SAUSAGE_GLOW: &str = "#ff6b4a";

/// Renders a snapshot to a canvas element.
/// Takes the JSON form of a `SimulationSnapshot`.
#[wasm_bindgen]
pub fn render_snapshot(snapshot_json: &str, canvas: web_sys::HtmlCanvasElement) -> Result<(), JsValue> {
    let snapshot: SimulationSnapshot = serde_json::from_str(snapshot_json)
        .map_err(|e| JsValue::from_str(&format!("Failed to parse snapshot: {}", e)))?;

    let context = canvas
        .get_context("2d")
        .map_err(|_| JsValue::from_str("Failed to get 2d context"))?
        .ok_or_else(|| JsValue::from_str("2d context is null"))?;

    let ctx = context
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| JsValue::from_str("Failed to cast to 2d context"))?;

    draw(&ctx, &snapshot)
}

/// Draws one frame: board, fried egg, then the sausage on top.
pub fn draw(ctx: &CanvasRenderingContext2d, snapshot: &SimulationSnapshot) -> Result<(), JsValue> {
    let grid = snapshot.grid;
    draw_board(ctx, &grid);
    draw_egg(ctx, &grid, snapshot.food)?;
    draw_sausage(ctx, &grid, &snapshot.snake)?;
    Ok(())
}

fn draw_board(ctx: &CanvasRenderingContext2d, grid: &Grid) {
    let width = grid.pixel_width() as f64;
    let height = grid.pixel_height() as f64;
    let cell = grid.cell_size as f64;

    ctx.set_fill_style(&JsValue::from_str(BACKGROUND));
    ctx.fill_rect(0.0, 0.0, width, height);

    ctx.set_stroke_style(&JsValue::from_str(GRID_LINE));
    ctx.set_line_width(0.5);
    for i in 0..=grid.width {
        ctx.begin_path();
        ctx.move_to(i as f64 * cell, 0.0);
        ctx.line_to(i as f64 * cell, height);
        ctx.stroke();
    }
    for i in 0..=grid.height {
        ctx.begin_path();
        ctx.move_to(0.0, i as f64 * cell);
        ctx.line_to(width, i as f64 * cell);
        ctx.stroke();
    }
}

fn draw_egg(ctx: &CanvasRenderingContext2d, grid: &Grid, food: Position) -> Result<(), JsValue> {
    let cell = grid.cell_size as f64;
    let (x, y) = grid.to_pixel(food);
    let center_x = x + cell / 2.0;
    let center_y = y + cell / 2.0;
    let size = cell * 0.4;

    // White
    ctx.set_fill_style(&JsValue::from_str(EGG_WHITE));
    ctx.set_shadow_color(EGG_YOLK);
    ctx.set_shadow_blur(8.0);
    ctx.begin_path();
    ctx.ellipse(center_x, center_y, size, size * 0.8, 0.0, 0.0, 2.0 * PI)?;
    ctx.fill();

    // Yolk
    ctx.set_fill_style(&JsValue::from_str(EGG_YOLK));
    ctx.set_shadow_color("#ffd700");
    ctx.set_shadow_blur(6.0);
    ctx.begin_path();
    ctx.arc(center_x, center_y, size * 0.45, 0.0, 2.0 * PI)?;
    ctx.fill();

    ctx.set_shadow_color("transparent");
    Ok(())
}

fn draw_sausage(ctx: &CanvasRenderingContext2d, grid: &Grid, snake: &[Position]) -> Result<(), JsValue> {
    let cell = grid.cell_size as f64;
    let length = snake.len() as f64;

    for (index, segment) in snake.iter().enumerate() {
        let (x, y) = grid.to_pixel(*segment);

        if index == 0 {
            ctx.set_fill_style(&JsValue::from_str(SAUSAGE));
            ctx.set_shadow_color(SAUSAGE_GLOW);
            ctx.set_shadow_blur(10.0);
            rounded_cell(ctx, x + 1.0, y + 1.0, cell - 2.0, 3.0);
            ctx.fill();

            // Shine
            ctx.set_fill_style(&JsValue::from_str("rgba(255, 200, 100, 0.4)"));
            ctx.begin_path();
            ctx.arc(x + cell * 0.35, y + cell * 0.35, cell * 0.2, 0.0, 2.0 * PI)?;
            ctx.fill();
        } else {
            // Fades towards the tail
            let opacity = 1.0 - (index as f64 / length) * 0.4;
            ctx.set_fill_style(&JsValue::from_str(&format!("rgba(212, 69, 30, {})", opacity)));
            ctx.set_shadow_color(&format!("rgba(255, 107, 74, {})", opacity * 0.7));
            ctx.set_shadow_blur(5.0);
            rounded_cell(ctx, x + 1.0, y + 1.0, cell - 2.0, 3.0);
            ctx.fill();
        }
    }

    ctx.set_shadow_color("transparent");
    Ok(())
}

// Square path with rounded corners, built from curves so it works without
// `roundRect` support.
fn rounded_cell(ctx: &CanvasRenderingContext2d, x: f64, y: f64, size: f64, radius: f64) {
    ctx.begin_path();
    ctx.move_to(x + radius, y);
    ctx.line_to(x + size - radius, y);
    ctx.quadratic_curve_to(x + size, y, x + size, y + radius);
    ctx.line_to(x + size, y + size - radius);
    ctx.quadratic_curve_to(x + size, y + size, x + size - radius, y + size);
    ctx.line_to(x + radius, y + size);
    ctx.quadratic_curve_to(x, y + size, x, y + size - radius);
    ctx.line_to(x, y + radius);
    ctx.quadratic_curve_to(x, y, x + radius, y);
    ctx.close_path();
}
