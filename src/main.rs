use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use node_map::app::App;
use node_map::cli::CliArgs;
use node_map::config::AppConfig;
use node_map::data;
use node_map::map::{MapRenderer, Viewport};
use node_map::scene::Scene;
use node_map::ui;
use ratatui::DefaultTerminal;
use std::fs::File;
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(&args)?;

    let mut config = AppConfig::discover(args.config.as_deref())?;
    args.apply(&mut config);

    // Load everything before touching the terminal; a failed load draws nothing
    let source = config.data_source();
    let (datasets, boundaries) =
        data::load_all(&source, &config.source.resources).context("failed to load map data")?;
    let scene = Scene::build(&datasets, &boundaries, config.scene_options());
    info!("Map loaded successfully");

    let [lat, lon] = config.map.center;
    let home = Viewport::new(lon, lat, config.map.zoom, 0, 0);
    let renderer = MapRenderer::new(scene);

    let mut terminal = ratatui::init();
    terminal.clear()?;
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, home, renderer);

    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// Log to a file at the verbosity picked by `-v`
fn init_logging(args: &CliArgs) -> Result<()> {
    let file = File::create(&args.log_file)
        .with_context(|| format!("failed to create log file {:?}", args.log_file))?;

    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

/// Handle mouse events for panning, zooming and popups
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    // Always track mouse position for cursor marker and hover labels
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        // Horizontal scroll for panning (trackpad two-finger swipe)
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        MouseEventKind::Down(MouseButton::Left) => app.press(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.handle_drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.release(mouse.column, mouse.row),
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, home: Viewport, renderer: MapRenderer) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(size.width as usize, size.height as usize, home, renderer);

    loop {
        terminal.draw(|frame| ui::render(frame, &app))?;

        // ~60fps polling
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') => app.quit(),
                    KeyCode::Esc => app.escape(),

                    // Pan with hjkl or arrow keys
                    KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
                    KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
                    KeyCode::Up | KeyCode::Char('k') => app.pan(0, -6),
                    KeyCode::Down | KeyCode::Char('j') => app.pan(0, 6),

                    KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
                    KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

                    // Layer toggles
                    KeyCode::Char('b') | KeyCode::Char('B') => app.map_renderer.toggle_outlines(),
                    KeyCode::Char('c') | KeyCode::Char('C') => app.map_renderer.toggle_cities(),
                    KeyCode::Char('g') | KeyCode::Char('G') => app.map_renderer.toggle_legends(),

                    KeyCode::Char('r') | KeyCode::Char('0') => app.reset_view(),

                    _ => {}
                },
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
                Event::Resize(width, height) => app.resize(width as usize, height as usize),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
