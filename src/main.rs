//! Reveal Field entry point
//!
//! The browser build is driven from JavaScript through `reveal_field::web`.
//! Natively this runs a headless pointer sweep over a synthetic About
//! section and prints the final frame as JSON.

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use glam::Vec2;

    use reveal_field::Settings;
    use reveal_field::sim::{Dock, FieldState, FrameLoop, Rect, StaticLayout};

    const CONTAINER: Vec2 = Vec2::new(1200.0, 720.0);
    const FRAME_MS: f64 = 1000.0 / 60.0;

    /// Word keys and widths, one row per line of the headline
    const LINES: &[&[(&str, f32)]] = &[
        &[("etiqueta-filosofia", 160.0)],
        &[
            ("line1-0", 70.0),
            ("line1-1", 150.0),
            ("line1-2", 110.0),
            ("line1-3", 260.0),
        ],
        &[("line2-0", 270.0), ("topologia-digital", 330.0)],
        &[
            ("line3-0", 60.0),
            ("line3-1", 190.0),
            ("line3-2", 200.0),
            ("line3-3", 80.0),
        ],
        &[
            ("line3-4", 150.0),
            ("line3-5", 80.0),
            ("line3-6", 330.0),
        ],
    ];

    /// Lay the headline out left to right, top to bottom
    fn about_layout() -> StaticLayout {
        let mut layout = StaticLayout::new(CONTAINER);
        let mut top = 128.0;
        for (row, words) in LINES.iter().enumerate() {
            let height = if row == 0 { 16.0 } else { 72.0 };
            let mut left = 96.0;
            for &(key, width) in words.iter() {
                layout.set_fragment(key, Rect::new(left, left + width, top, top + height));
                left += width + 18.0;
            }
            top += height + if row == 0 { 32.0 } else { 8.0 };
        }
        layout
    }

    pub fn run() {
        let settings = Settings::load();
        let layout = about_layout();

        let mut state = FieldState::new(settings.clone());
        for words in LINES {
            for &(key, _) in words.iter() {
                state.register_fragment(key);
            }
        }
        log::info!(
            "Field: {} particles, {} fragments, seed {:#x}",
            state.particles().len(),
            state.registry().len(),
            state.seed()
        );

        let mut frames = FrameLoop::new();
        frames.pointer_enter(&mut state);

        // Diagonal sweep across the headline, three seconds
        let sweep = 180;
        let start = Vec2::new(80.0, 120.0);
        let end = Vec2::new(1100.0, 600.0);
        let mut now = 0.0;
        for i in 0..=sweep {
            let t = i as f32 / sweep as f32;
            frames.pointer_move(start.lerp(end, t));
            let report = frames.frame(now, &mut state, &layout);
            for change in &report.changes {
                log::info!(
                    "t={:.2}s {} {}",
                    state.time(),
                    if change.highlighted { "lit" } else { "dimmed" },
                    change.key
                );
            }
            now += FRAME_MS;
        }

        let displaced = state
            .particles()
            .iter()
            .filter(|p| p.offset() != Vec2::ZERO)
            .count();
        log::info!("{} of {} particles displaced", displaced, state.particles().len());

        let snapshot = state.snapshot(state.time());

        let changes = frames.pointer_leave(&mut state);
        log::info!("Pointer left, {} word(s) dimmed", changes.len());

        // Navbar magnification for the same pointer pass
        let mut dock = Dock::new(5, settings.dock_spring);
        let icons: Vec<Option<Rect>> = (0..5)
            .map(|i| {
                let left = 400.0 + i as f32 * 56.0;
                Some(Rect::new(left, left + 40.0, 24.0, 64.0))
            })
            .collect();
        dock.pointer_move(512.0);
        for _ in 0..60 {
            dock.step(&icons, reveal_field::consts::FRAME_DT);
        }
        let sizes: Vec<String> = dock
            .icons()
            .iter()
            .map(|i| format!("{:.1}", i.width()))
            .collect();
        log::info!("Dock icon sizes: [{}]", sizes.join(", "));

        match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => println!("{json}"),
            Err(e) => log::error!("Failed to serialize snapshot: {}", e),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Reveal Field (native) starting...");
    demo::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is reveal_field::web::RevealField, this is just to satisfy the compiler
}
