use wasm_bindgen::JsValue;
use web_sys::Window;

use crate::state::{State, StrokeMode, BACKGROUND_COLOR, STROKE_WIDTH};

/// Sizes the backing store to the viewport minus the toolbar chrome above
/// the canvas, then refills the background. Resizing wipes the raster, so
/// any stroke in progress is dropped with it.
pub fn resize_canvas(window: &Window, state: &mut State) {
    let width = window
        .inner_width()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(0.0);
    let height = window
        .inner_height()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(0.0);
    let chrome = state.canvas.offset_top() as f64;
    let height = (height - chrome).max(0.0);

    state.canvas.set_width(width as u32);
    state.canvas.set_height(height as u32);
    state.board_width = width;
    state.board_height = height;
    state.stroke = StrokeMode::Idle;

    // The 2d context loses its settings when the canvas is resized.
    state.ctx.set_line_cap("round");
    state.ctx.set_line_join("round");
    state.ctx.set_line_width(STROKE_WIDTH);
    fill_background(state);
}

fn fill_background(state: &State) {
    state.ctx.set_fill_style_str(BACKGROUND_COLOR);
    state
        .ctx
        .fill_rect(0.0, 0.0, state.board_width, state.board_height);
}

pub fn begin_stroke(state: &mut State, x: f64, y: f64) {
    state.ctx.set_stroke_style_str(&state.stroke_color);
    state.ctx.set_line_width(STROKE_WIDTH);
    state.ctx.begin_path();
    state.ctx.move_to(x, y);
    state.stroke = StrokeMode::Drawing { last_x: x, last_y: y };
}

/// Draws a segment from the last committed point; no-op unless a stroke is
/// active.
pub fn extend_stroke(state: &mut State, x: f64, y: f64) {
    let StrokeMode::Drawing { last_x, last_y } = state.stroke else {
        return;
    };
    state.ctx.set_stroke_style_str(&state.stroke_color);
    state.ctx.set_line_width(STROKE_WIDTH);
    state.ctx.begin_path();
    state.ctx.move_to(last_x, last_y);
    state.ctx.line_to(x, y);
    state.ctx.stroke();
    state.stroke = StrokeMode::Drawing { last_x: x, last_y: y };
}

pub fn end_stroke(state: &mut State) {
    state.stroke = StrokeMode::Idle;
}

/// Refills the buffer, discarding every drawn stroke.
pub fn clear_canvas(state: &mut State) {
    fill_background(state);
}

/// Read-only snapshot of the buffer for transmission.
pub fn snapshot_data_url(state: &State) -> Result<String, JsValue> {
    state.canvas.to_data_url_with_type("image/png")
}
