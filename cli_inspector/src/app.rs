use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use color_eyre::Result;
use core_feed::{resolve_hotkey, FeedReceiver, HotkeyResolution, ViewSelector, ViewWindow};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::*;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use crate::ui::{draw_ui, UiState};

pub struct InspectorApp {
    terminal: Terminal<CrosstermBackend<std::io::Stdout>>,
    ui_state: UiState,
    receiver: FeedReceiver,
    shutdown_sender: UnboundedSender<()>,
    log_receiver: Receiver<String>,
    tick_interval: Duration,
}

impl InspectorApp {
    pub fn new(
        receiver: FeedReceiver,
        shutdown_sender: UnboundedSender<()>,
        log_receiver: Receiver<String>,
        selector: ViewSelector,
        window: ViewWindow,
        tick_interval: Duration,
        max_logs: usize,
    ) -> Result<Self> {
        let stdout = std::io::stdout();
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        crossterm::terminal::enable_raw_mode()?;
        terminal.clear()?;
        terminal.hide_cursor()?;
        Ok(Self {
            terminal,
            ui_state: UiState::new(selector, window, max_logs),
            receiver,
            shutdown_sender,
            log_receiver,
            tick_interval,
        })
    }

    pub fn run(mut self) -> Result<()> {
        let result = self.event_loop();

        self.terminal.clear()?;
        self.terminal.show_cursor()?;
        crossterm::terminal::disable_raw_mode()?;
        let _ = self.shutdown_sender.send(());
        result
    }

    fn event_loop(&mut self) -> Result<()> {
        // First frame goes out immediately so the waiting state is visible.
        self.tick()?;
        let mut last_draw = Instant::now();
        loop {
            if last_draw.elapsed() >= self.tick_interval {
                self.tick()?;
                last_draw = Instant::now();
            }

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                        KeyCode::Char('a') => {
                            let enabled = self.ui_state.toggle_auto_scroll();
                            info!(auto_scroll = enabled, "view.auto_scroll");
                        }
                        KeyCode::Char(key) => self.handle_hotkey(key),
                        _ => {}
                    }
                }
            }
        }
    }

    /// Drain the feed queue, then draw the projection of whatever arrived.
    fn tick(&mut self) -> Result<()> {
        let report = self.ui_state.session.drain(&mut self.receiver);
        if !report.is_idle() {
            debug!(
                applied = report.applied,
                resets = report.resets,
                "render.tick"
            );
        }

        while let Ok(line) = self.log_receiver.try_recv() {
            self.ui_state.push_log(line);
        }

        self.terminal.draw(|frame| draw_ui(frame, &self.ui_state))?;
        Ok(())
    }

    fn handle_hotkey(&mut self, key: char) {
        match resolve_hotkey(key, self.ui_state.session.registry()) {
            HotkeyResolution::Select(selector) => {
                info!(view = %selector, "view.selected");
                self.ui_state.selector = selector;
            }
            HotkeyResolution::Unbound { seat } => {
                self.ui_state.push_log(format!(
                    "No player found for hotkey '{key}' (looking for [S{seat}])"
                ));
            }
            HotkeyResolution::Ignored => {}
        }
    }
}
