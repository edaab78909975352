use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::overlay::{OverlayArena, OverlayId};
use crate::vars::VarStore;

pub const BACKGROUND_COLOR: &str = "rgb(17, 24, 39)";
pub const STROKE_WIDTH: f64 = 3.0;

pub const SWATCHES: [&str; 8] = [
    "#ffffff", "#ee3333", "#e64980", "#be4bdb", "#228be6", "#40c057", "#fab005", "#fd7e14",
];

#[derive(Clone, Copy, PartialEq)]
pub enum StrokeMode {
    Idle,
    Drawing { last_x: f64, last_y: f64 },
}

/// Session controller phase. `Resetting` only lives for the duration of one
/// reset sweep; every transition lands back in `Idle`.
#[derive(Clone, Copy, PartialEq)]
pub enum Phase {
    Idle,
    Submitting,
    Resetting,
}

#[derive(Clone, Copy)]
pub struct DragState {
    pub id: OverlayId,
    pub grab_dx: f64,
    pub grab_dy: f64,
}

pub struct State {
    pub canvas: HtmlCanvasElement,
    pub ctx: CanvasRenderingContext2d,
    pub board_width: f64,
    pub board_height: f64,
    pub palette: Vec<String>,
    pub palette_selected: usize,
    pub stroke_color: String,
    pub stroke: StrokeMode,
    pub phase: Phase,
    pub vars: VarStore,
    pub overlays: OverlayArena,
    pub drag: Option<DragState>,
}

impl State {
    pub fn new(canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d) -> Self {
        let palette: Vec<String> = SWATCHES.iter().map(|value| value.to_string()).collect();
        let stroke_color = palette[0].clone();
        Self {
            canvas,
            ctx,
            board_width: 0.0,
            board_height: 0.0,
            palette,
            palette_selected: 0,
            stroke_color,
            stroke: StrokeMode::Idle,
            phase: Phase::Idle,
            vars: VarStore::new(),
            overlays: OverlayArena::new(),
            drag: None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == Phase::Submitting
    }
}
