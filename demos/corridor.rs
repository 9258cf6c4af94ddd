//! Terminal demo: a token crossing a random wall layout.
//!
//! Run: cargo run --bin corridor [seed]

use std::io::{self, Write};

use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use pathwright_demos::{Demo, Glyph};

fn color(g: Glyph) -> Color {
    match g {
        Glyph::Blank | Glyph::Floor => Color::DarkGrey,
        Glyph::Wall => Color::Grey,
        Glyph::Door => Color::DarkYellow,
        Glyph::Route => Color::Cyan,
        Glyph::Waypoint => Color::Blue,
        Glyph::Origin => Color::Yellow,
        Glyph::Target => Color::Red,
    }
}

fn run(seed: u64) -> io::Result<()> {
    let mut demo = Demo::new(seed);
    let solved = demo.solve().map_err(io::Error::other)?;
    let canvas = demo.render(solved.path.as_ref());

    let mut stdout = io::stdout();
    for row in canvas.rows() {
        for &g in row {
            execute!(stdout, SetForegroundColor(color(g)), Print(g.ch()))?;
        }
        execute!(stdout, ResetColor, Print('\n'))?;
    }

    let stats = demo.pathfinder.stats();
    match &solved.path {
        Some(path) => writeln!(
            stdout,
            "{} -> {}: cost {:.2}, {} waypoints, {} searches, {} nodes warmed",
            demo.from,
            demo.to,
            path.cost(),
            path.waypoints.len(),
            solved.attempts,
            solved.warmed
        )?,
        None => writeln!(
            stdout,
            "{} -> {}: unreachable after {} searches",
            demo.from, demo.to, solved.attempts
        )?,
    }
    writeln!(
        stdout,
        "cache: {} nodes, {} materialized",
        stats.nodes, stats.materialized
    )
}

fn main() {
    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    if let Err(e) = run(seed) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
