use std::io;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use indoc::indoc;
use ratatui::Frame;
use ratatui::prelude::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Paragraph;

use dock_wm::constants::DEFAULT_TILE_WIDTH_PERCENT;
use dock_wm::drivers::console::{ConsoleInputDriver, ConsoleOutputDriver};
use dock_wm::drivers::pointer::PointerTranslator;
use dock_wm::drivers::{InputDriver, OutputDriver};
use dock_wm::event_loop::{ControlFlow, EventLoop};
use dock_wm::input::HostEvent;
use dock_wm::layout::Viewport;
use dock_wm::log_buffer::{LogHandle, init_tracing};
use dock_wm::tui::TerminalSurface;
use dock_wm::window::config::{Dimension, ManagerConfig, Position, TransitionConflict, WindowConfig};
use dock_wm::{ConfigError, WindowEvent, WindowId, WindowManager, WmError};

/// Rows above the window area used by the status bar.
const STATUS_ROWS: u16 = 1;

const KEYS: &str = indoc! {"
    Keys:
      n         open a window
      m         minimize the focused window
      r         restore the most recently docked window
      c         close the focused window
      Tab       cycle focus
      q, C-c    quit

    Mouse: drag a title bar to move a window, drag a docked tile to pull it
    out of the dock, double-click a tile to restore it.
"};

#[derive(Parser, Debug)]
#[command(
    name = "dock-wm",
    version = env!("CARGO_PKG_VERSION"),
    about = "Floating windows with a minimize dock, in the terminal",
    after_help = KEYS
)]
struct Cli {
    /// Windows to open at startup.
    #[arg(short = 'n', long = "windows", default_value_t = 3)]
    windows: usize,

    /// Dock tile width as a percentage of the terminal width.
    #[arg(long = "tile-percent", value_name = "PERCENT", default_value_t = DEFAULT_TILE_WIDTH_PERCENT)]
    tile_percent: f64,

    /// Offset added to every window's stacking index.
    #[arg(long = "base-z", default_value_t = 0)]
    base_z: i64,

    /// What a minimize/restore does while another is still animating.
    #[arg(long = "conflict", value_name = "queue|restart", default_value_t = TransitionConflict::Queue)]
    conflict: TransitionConflict,

    /// Most verbose log level shown in the status bar.
    #[arg(long = "log-level", default_value_t = tracing::Level::DEBUG)]
    log_level: tracing::Level,
}

impl Cli {
    fn manager_config(&self) -> Result<ManagerConfig, ConfigError> {
        let config = ManagerConfig {
            tile_width_percent: self.tile_percent,
            base_z: self.base_z,
            conflict: self.conflict,
            ..ManagerConfig::default()
        };
        config.validate()?;
        Ok(config)
    }
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let config = cli.manager_config().map_err(io::Error::other)?;

    let log = LogHandle::default();
    init_tracing(cli.log_level, Some(log.clone()));

    let mut output = ConsoleOutputDriver::new()?;
    let (columns, rows) = output.size()?;
    let area = Rect::new(0, STATUS_ROWS, columns, rows.saturating_sub(STATUS_ROWS));
    let mut demo = Demo::new(config, area).map_err(io::Error::other)?;
    for _ in 0..cli.windows {
        demo.open_window().map_err(io::Error::other)?;
    }

    output.enter()?;
    let mut input = ConsoleInputDriver::new();
    input.set_mouse_capture(true)?;
    let mut event_loop = EventLoop::new(input, Duration::from_millis(16));
    let result = event_loop.run(|_, event| demo.step(&mut output, event, &log));
    output.exit()?;
    result
}

struct Demo {
    wm: WindowManager<TerminalSurface>,
    pointer: PointerTranslator,
    area: Rect,
    opened: usize,
}

impl Demo {
    fn new(config: ManagerConfig, area: Rect) -> Result<Self, ConfigError> {
        let viewport = Viewport::new(f64::from(area.width), f64::from(area.height));
        let wm = WindowManager::with_config(TerminalSurface::default(), viewport, config)?;
        Ok(Self {
            wm,
            pointer: PointerTranslator::new(),
            area,
            opened: 0,
        })
    }

    fn open_window(&mut self) -> Result<WindowId, WmError> {
        self.opened += 1;
        let n = self.opened;
        let step = ((n - 1) % 8) as f64;
        let config = WindowConfig::new(format!("Window {n}"))
            .with_position(Position::Pixels(2.0 + step * 4.0), Position::Pixels(1.0 + step * 2.0))
            .with_size(Dimension::Viewport(0.4), Dimension::Viewport(0.4));
        let id = self.wm.create(config)?;
        if let Some(handle) = self.wm.window(id).map(|w| w.surface()) {
            let surface = self.wm.surface_mut();
            surface.set_body(
                handle,
                vec![
                    format!("window {id}"),
                    "drag the title bar to move".to_string(),
                    "[_] minimize  [x] close".to_string(),
                ],
            );
            surface.set_preview(handle, format!("window {id}"));
        }
        Ok(id)
    }

    fn step(
        &mut self,
        output: &mut ConsoleOutputDriver,
        event: Option<Event>,
        log: &LogHandle,
    ) -> io::Result<ControlFlow> {
        let Some(event) = event else {
            self.wm.tick(Instant::now());
            self.report_events();
            output.draw(|frame| self.draw(frame, log))?;
            return Ok(self
                .wm
                .next_deadline()
                .map_or(ControlFlow::Continue, ControlFlow::WakeAt));
        };
        if let Event::Key(key) = event {
            return Ok(self.on_key(key));
        }

        let area = self.area;
        let now = Instant::now();
        let surface = self.wm.surface();
        let host = self
            .pointer
            .translate(&event, STATUS_ROWS, |column, row| surface.hit_test(area, column, row, now));
        if let Some(host) = host {
            if let HostEvent::Resize { width, height } = host {
                self.area = Rect::new(0, STATUS_ROWS, width as u16, height as u16);
            }
            self.wm.handle_event(&host);
        }
        Ok(ControlFlow::Continue)
    }

    fn on_key(&mut self, key: KeyEvent) -> ControlFlow {
        let focused = self.wm.focused();
        let outcome = match key.code {
            KeyCode::Char('q') => return ControlFlow::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return ControlFlow::Quit;
            }
            KeyCode::Char('n') => self.open_window().map(drop),
            KeyCode::Char('m') => match focused {
                Some(id) => self.wm.minimize(id).map(drop),
                None => Ok(()),
            },
            KeyCode::Char('r') => match self.wm.dock().values().next_back().copied() {
                Some(id) => self.wm.restore(id).map(drop),
                None => Ok(()),
            },
            KeyCode::Char('c') => {
                if let Some(id) = focused {
                    self.wm.close(id);
                }
                Ok(())
            }
            KeyCode::Tab => {
                let bottom = self
                    .wm
                    .stacking_order()
                    .into_iter()
                    .find(|id| self.wm.window(*id).is_some_and(|w| w.state() == dock_wm::WindowState::Normal));
                if let Some(id) = bottom {
                    self.wm.set_focus(id);
                }
                Ok(())
            }
            _ => Ok(()),
        };
        if let Err(error) = outcome {
            tracing::warn!(%error, "key action failed");
        }
        ControlFlow::Continue
    }

    fn report_events(&mut self) {
        for event in self.wm.take_events() {
            match event {
                WindowEvent::Rejected { id, error } => {
                    tracing::warn!(window_id = %id, %error, "queued call rejected");
                }
                other => tracing::debug!(event = ?other, "window event"),
            }
        }
    }

    fn draw(&self, frame: &mut Frame<'_>, log: &LogHandle) {
        let full = frame.area();
        let status = Rect::new(full.x, full.y, full.width, STATUS_ROWS.min(full.height));
        let text = format!(
            " dock-wm  n new  m min  r restore  c close  Tab cycle  q quit | {}",
            log.latest().unwrap_or_default()
        );
        frame.render_widget(
            Paragraph::new(text).style(Style::default().bg(Color::DarkGray).fg(Color::White)),
            status,
        );
        self.wm.surface().render(frame, self.area, Instant::now());
    }
}
