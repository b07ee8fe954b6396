//! Windowed front end: watch a trained model, or steer the snake yourself.

use std::time::{Duration, Instant};

use anyhow::Result;
use pixels::{Pixels, SurfaceTexture};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{error, info};
use winit::dpi::LogicalSize;
use winit::event::{Event, VirtualKeyCode};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;
use winit_input_helper::WinitInputHelper;

use crate::config::ViewerConfig;
use crate::draw::{BoardPainter, Canvas};
use crate::features::Features;
use crate::game::{GameSimulator, Manual, MoveSource};
use crate::grid::Direction;
use crate::model::DecisionModel;

const HUD_HEIGHT: u32 = 40;

/// Who steers the snake in the window.
#[derive(Debug, Clone)]
pub enum Pilot {
    Model(DecisionModel),
    Keys(Manual),
}

impl MoveSource for Pilot {
    fn next_direction(&mut self, features: &Features, current: Direction) -> Direction {
        match self {
            Pilot::Model(model) => model.next_direction(features, current),
            Pilot::Keys(manual) => manual.next_direction(features, current),
        }
    }
}

const STEER_KEYS: [(VirtualKeyCode, VirtualKeyCode, Direction); 4] = [
    (VirtualKeyCode::Up, VirtualKeyCode::W, Direction::Up),
    (VirtualKeyCode::Down, VirtualKeyCode::S, Direction::Down),
    (VirtualKeyCode::Left, VirtualKeyCode::A, Direction::Left),
    (VirtualKeyCode::Right, VirtualKeyCode::D, Direction::Right),
];

pub fn run(config: ViewerConfig, pilot: Pilot, seed: Option<u64>) -> Result<()> {
    let board = config.board;
    let width = board.width as u32 * config.cell_size;
    let height = board.height as u32 * config.cell_size + HUD_HEIGHT;
    let tick = Duration::from_millis(config.tick_ms);
    let painter = BoardPainter::new(config.cell_size);

    let event_loop = EventLoop::new();
    let mut input = WinitInputHelper::new();
    let title = match pilot {
        Pilot::Model(_) => "Snake - model",
        Pilot::Keys(_) => "Snake",
    };
    let window = WindowBuilder::new()
        .with_title(title)
        .with_inner_size(LogicalSize::new(width, height))
        .with_resizable(false)
        .build(&event_loop)?;

    let mut pixels = {
        let window_size = window.inner_size();
        let surface_texture = SurfaceTexture::new(window_size.width, window_size.height, &window);
        Pixels::new(width, height, surface_texture)?
    };

    let mut rng = match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };
    let mut game = GameSimulator::new(board, pilot.clone(), &mut rng);
    let mut paused = false;
    let mut last_update = Instant::now();

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        if let Event::RedrawRequested(_) = event {
            let mut canvas = Canvas::new(pixels.frame_mut(), width, height);
            painter.paint(&mut canvas, &game);
            let hud_y = height - HUD_HEIGHT + 8;
            let status = format!("SCORE: {}  LEN: {}", game.score(), game.body().len());
            canvas.text(&status, 8, hud_y, 2, (230, 230, 230, 255));
            if game.is_finished() {
                canvas.text("GAME OVER - R", width.saturating_sub(170), hud_y, 2, (255, 100, 100, 255));
            } else if paused {
                canvas.text("PAUSED", width.saturating_sub(80), hud_y, 2, (255, 255, 100, 255));
            }

            if let Err(err) = pixels.render() {
                error!(%err, "render failed");
                *control_flow = ControlFlow::Exit;
                return;
            }
        }

        if input.update(&event) {
            if input.key_pressed(VirtualKeyCode::Escape) || input.close_requested() || input.destroyed() {
                *control_flow = ControlFlow::Exit;
                return;
            }

            if input.key_pressed(VirtualKeyCode::R) && game.is_finished() {
                game = GameSimulator::new(board, pilot.clone(), &mut rng);
                paused = false;
            }

            if input.key_pressed(VirtualKeyCode::P) {
                paused = !paused;
            }

            if let Pilot::Keys(manual) = game.source_mut() {
                for (arrow, letter, dir) in STEER_KEYS {
                    if input.key_pressed(arrow) || input.key_pressed(letter) {
                        manual.steer(dir);
                    }
                }
            }

            if !paused && !game.is_finished() && last_update.elapsed() >= tick {
                game.advance(&mut rng);
                last_update = Instant::now();
                if game.is_finished() {
                    info!(score = game.score(), length = game.body().len(), steps = game.steps(), "game over");
                }
            }

            window.request_redraw();
        }
    })
}
