//! App: terminal init, main loop, tick and key handling.

use crate::game::GameState;
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use crate::GameConfig;
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};

/// Event-poll budget per loop iteration (~60 fps render cadence).
const FRAME_BUDGET: Duration = Duration::from_millis(16);

pub struct App {
    config: GameConfig,
    theme: Theme,
    state: GameState,
    /// Wall clock of the previous iteration; feeds the fall timer.
    last_tick: Instant,
    /// Cooperative quit flag, checked once per iteration at the top of the
    /// loop. No mid-tick cancellation.
    should_quit: bool,
}

impl App {
    pub fn new(config: GameConfig, theme: Theme) -> Result<Self> {
        let state = GameState::new(&config);
        Ok(Self {
            config,
            theme,
            state,
            last_tick: Instant::now(),
            should_quit: false,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{
                EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
                size,
            },
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        // Fit the board to the terminal (no squeeze); respect --width/--height
        // when they fit. Dimensions are fixed from here on.
        let (term_cols, term_rows) = size()?;
        let (fit_w, fit_h) = crate::ui::board_size_for_terminal(term_cols, term_rows);
        let width = self.config.width.min(fit_w).max(1);
        let height = self.config.height.min(fit_h).max(1);
        if width != self.config.width || height != self.config.height {
            self.config.width = width;
            self.config.height = height;
            self.state = GameState::new(&self.config);
        }

        let result = self.run_loop(&mut terminal);

        // Restore
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            if self.should_quit {
                return Ok(());
            }
            let frame_start = Instant::now();

            // Drain every pending key event; each discrete press maps to
            // exactly one state operation.
            let timeout = FRAME_BUDGET.saturating_sub(frame_start.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        self.apply_action(key_to_action(key));
                    }
                }
            }

            // Timed fall: hand the elapsed wall-clock time to the state.
            let elapsed = self.last_tick.elapsed();
            self.last_tick = Instant::now();
            self.state.advance(elapsed);

            // Render handoff: state is read-only for the rest of the tick.
            terminal.draw(|f| crate::ui::draw(f, &self.state, &self.theme, f.area()))?;
        }
    }

    fn apply_action(&mut self, action: Action) {
        match action {
            Action::MoveLeft => self.state.move_left(),
            Action::MoveRight => self.state.move_right(),
            Action::Rotate => self.state.rotate(),
            Action::SoftDrop => self.state.soft_drop(),
            Action::Quit => self.should_quit = true,
            Action::None => {}
        }
    }
}
