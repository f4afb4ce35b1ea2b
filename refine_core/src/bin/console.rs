//! Headless console driver for the refinement core.
//!
//! Reads commands from stdin and prints abstract session state, which is
//! enough to exercise every core operation without a rendering shell:
//!
//! ```text
//! regen <width_px> <height_px>
//! move <up|down|left|right>
//! point <x_px> <y_px>
//! assign <1..5>
//! temper <rel_row> <rel_col> <WO|FC|DR|MA>
//! show
//! quit
//! ```

use std::io::{BufRead, BufReader};
use std::time::Instant;

use tracing::{info, warn};

use refine_core::{
    AssignOutcome, BinId, Direction, GridOrigin, JsonProgressStore, PixelPoint, RefinementSession,
    RelPos, SessionConfig, SessionEvent, SurfaceSize, Temper,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let file_id = std::env::args().nth(1).unwrap_or_else(|| "console".to_string());
    let config = SessionConfig::default();
    let store = Box::new(JsonProgressStore::new("refinement_progress.json"));
    let mut session = RefinementSession::new(&file_id, config, store, Instant::now());

    session.events().subscribe(|event| match event {
        SessionEvent::TransferRejected { bin, reason } => {
            info!(%bin, %reason, "transfer denied");
        }
        SessionEvent::FileComplete => {
            info!("file 100% refined");
        }
        _ => {}
    });

    info!(file_id, "console session ready");

    let stdin = BufReader::new(std::io::stdin());
    for line in stdin.lines() {
        let line = match line {
            Ok(line) => line,
            Err(error) => {
                warn!(%error, "stdin closed");
                break;
            }
        };
        session.advance(Instant::now());

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            [] => {}
            ["quit"] | ["exit"] => break,
            ["regen", width, height] => match (width.parse(), height.parse()) {
                (Ok(w), Ok(h)) => {
                    session.regenerate(SurfaceSize::new(w, h));
                    println!(
                        "visible window {}x{}",
                        session.grid().visible_rows(),
                        session.grid().visible_cols()
                    );
                }
                _ => println!("usage: regen <width_px> <height_px>"),
            },
            ["move", direction] => match parse_direction(direction) {
                Some(direction) => {
                    if session.move_viewport(direction) {
                        let viewport = session.viewport();
                        println!(
                            "viewport at ({}, {})",
                            viewport.start_row, viewport.start_col
                        );
                    } else {
                        println!("move refused: transfer in flight");
                    }
                }
                None => println!("usage: move <up|down|left|right>"),
            },
            ["point", x, y] => match (x.parse(), y.parse()) {
                (Ok(x), Ok(y)) => {
                    let radius = session.config().pointer_influence_radius_px;
                    session.highlight_around(
                        PixelPoint::new(x, y),
                        radius,
                        GridOrigin::default(),
                    );
                    println!(
                        "{} cells highlighted",
                        session.grid().highlighted_sorted().len()
                    );
                }
                _ => println!("usage: point <x_px> <y_px>"),
            },
            ["assign", bin] => match bin.parse::<u8>() {
                Ok(n) if (1..=5).contains(&n) => {
                    match session.assign(BinId(n - 1), Instant::now()) {
                        Ok(AssignOutcome::Committed(receipt)) => {
                            println!("committed {} cells to bin {}", receipt.cells, receipt.bin);
                        }
                        Ok(AssignOutcome::Rejected(reason)) => {
                            println!("rejected: {reason}");
                        }
                        Err(error) => println!("error: {error}"),
                    }
                }
                _ => println!("usage: assign <1..5>"),
            },
            ["temper", row, col, code] => {
                match (row.parse(), col.parse(), Temper::from_code(code)) {
                    (Ok(row), Ok(col), Some(temper)) => {
                        match session.set_temper(RelPos::new(row, col), temper) {
                            Ok(()) => println!("tempered ({row}, {col}) as {temper}"),
                            Err(error) => println!("error: {error}"),
                        }
                    }
                    _ => println!("usage: temper <rel_row> <rel_col> <WO|FC|DR|MA>"),
                }
            }
            ["show"] => print_state(&session),
            _ => println!("unknown command: {line}"),
        }
    }

    session.shutdown();
}

fn parse_direction(text: &str) -> Option<Direction> {
    match text {
        "up" => Some(Direction::Up),
        "down" => Some(Direction::Down),
        "left" => Some(Direction::Left),
        "right" => Some(Direction::Right),
        _ => None,
    }
}

fn print_state(session: &RefinementSession) {
    let grid = session.grid();
    let rows = grid.visible_rows();
    let cols = grid.visible_cols();
    println!(
        "viewport ({}, {})  window {rows}x{cols}  progress {:.1}%",
        session.viewport().start_row,
        session.viewport().start_col,
        session.progress() * 100.0
    );

    for row in 0..rows {
        let mut line = String::new();
        for col in 0..cols {
            match grid.cell_at_relative(RelPos::new(row, col)) {
                Ok(cell) => {
                    let mark = if cell.highlighted {
                        '*'
                    } else if cell.is_tempered() {
                        '~'
                    } else {
                        ' '
                    };
                    line.push((b'0' + cell.digit) as char);
                    line.push(mark);
                }
                Err(_) => line.push_str("? "),
            }
        }
        println!("{line}");
    }

    for bin in session.bins().iter() {
        let m = &bin.metrics;
        println!(
            "bin {}  WO {}  FC {}  DR {}  MA {}",
            bin.label(),
            m.get(Temper::Woe),
            m.get(Temper::Frolic),
            m.get(Temper::Dread),
            m.get(Temper::Malice),
        );
    }
    let metrics = session.metrics();
    println!(
        "events {}  tempered {}  committed {}  rejected {}  refined {}",
        metrics.temper_events,
        metrics.cells_tempered,
        metrics.transfers_committed,
        metrics.transfers_rejected,
        metrics.cells_refined,
    );
}
