//! Terminal canvas for BlockFlow
//!
//! Left: the block palette. Centre: the canvas, blocks drawn at their grid
//! positions. Right: the selected block's panel. Blocks are dragged with
//! the keyboard: `m` picks the selected block up, arrows move it 10px at a
//! time, `Enter` drops it onto the grid.

mod render;

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use blockflow_flow::{DragSession, FlowApp, FlowEvent, Palette};
use blockflow_types::{Address, BlockId, BlockKind};
use crossterm::event::{self, Event as CEvent, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use thiserror::Error;
use tokio::sync::broadcast::error::TryRecvError;

/// Pixels moved per arrow press while dragging
pub const DRAG_STEP: i64 = 10;

const LOG_CAPACITY: usize = 64;

#[derive(Debug, Error)]
pub enum TuiError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl TuiError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "TERMINAL_IO",
        }
    }
}

pub struct TuiRunResult {
    pub blocks: usize,
    pub events_seen: u64,
}

/// Which pane receives keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Palette,
    Canvas,
}

/// Interaction state of the terminal canvas
#[derive(Debug)]
pub struct TuiState {
    pub focus: Focus,
    pub palette_index: usize,
    /// Index into the surface's block list
    pub selected: usize,
    pub drag: DragSession,
    pub status_line: String,
    pub log: VecDeque<String>,
    pub events_seen: u64,
    signer: Address,
}

impl TuiState {
    /// `signer` is the address `c` connects
    pub fn new(signer: Address) -> Self {
        Self {
            focus: Focus::Palette,
            palette_index: 0,
            selected: 0,
            drag: DragSession::new(),
            status_line: "pick a block from the palette".to_string(),
            log: VecDeque::with_capacity(LOG_CAPACITY),
            events_seen: 0,
            signer,
        }
    }

    /// Id of the selected block, if the canvas has any
    pub fn selected_id(&self, app: &FlowApp) -> Option<BlockId> {
        let blocks = app.blocks();
        blocks.get(self.selected.min(blocks.len().saturating_sub(1))).map(|b| b.id)
    }

    /// Fold a flow event into the log and status line
    pub fn record(&mut self, event: &FlowEvent) {
        self.events_seen += 1;
        let summary = event.summary();
        if matches!(event, FlowEvent::Notification { .. }) {
            self.status_line = summary.clone();
        }
        if self.log.len() == LOG_CAPACITY {
            self.log.pop_back();
        }
        self.log.push_front(summary);
    }

    /// Handle one key press. Returns `true` when the user quits.
    pub async fn handle_key(&mut self, app: &Arc<FlowApp>, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') => return true,
            KeyCode::Tab => {
                self.drag.cancel();
                self.focus = match self.focus {
                    Focus::Palette => Focus::Canvas,
                    Focus::Canvas => Focus::Palette,
                };
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                if app.wallet().is_connected() {
                    app.disconnect_wallet();
                } else {
                    app.connect_wallet(self.signer).await;
                }
                self.status_line = app.wallet_banner();
            }
            _ => match self.focus {
                Focus::Palette => self.palette_key(app, code).await,
                Focus::Canvas if self.drag.is_active() => self.drag_key(app, code),
                Focus::Canvas => self.canvas_key(app, code).await,
            },
        }
        false
    }

    async fn palette_key(&mut self, app: &Arc<FlowApp>, code: KeyCode) {
        let entries = Palette::entries().len();
        match code {
            KeyCode::Up => self.palette_index = (self.palette_index + entries - 1) % entries,
            KeyCode::Down => self.palette_index = (self.palette_index + 1) % entries,
            KeyCode::Enter => {
                let entry = Palette::entry_at(self.palette_index);
                app.add_block(entry.id).await;
                self.selected = app.blocks().len().saturating_sub(1);
                self.status_line = format!("added {}", entry.display_name);
            }
            _ => {}
        }
    }

    fn drag_key(&mut self, app: &Arc<FlowApp>, code: KeyCode) {
        let delta = match code {
            KeyCode::Left => Some((-DRAG_STEP, 0)),
            KeyCode::Right => Some((DRAG_STEP, 0)),
            KeyCode::Up => Some((0, -DRAG_STEP)),
            KeyCode::Down => Some((0, DRAG_STEP)),
            _ => None,
        };
        if let Some((dx, dy)) = delta {
            let _ = self.drag.drag_by(dx, dy);
            return;
        }
        match code {
            KeyCode::Enter | KeyCode::Char('m') => {
                if let Ok(event) = self.drag.finish() {
                    let landed = app.drop_block(event);
                    self.status_line = format!("dropped at {}", landed);
                }
            }
            KeyCode::Esc => {
                self.drag.cancel();
                self.status_line = "drag cancelled".to_string();
            }
            _ => {}
        }
    }

    async fn canvas_key(&mut self, app: &Arc<FlowApp>, code: KeyCode) {
        let blocks = app.blocks();
        if blocks.is_empty() {
            return;
        }
        self.selected = self.selected.min(blocks.len() - 1);
        let instance = blocks[self.selected];
        let Some(controller) = app.block(instance.id) else {
            return;
        };

        let result = match code {
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                Ok(())
            }
            KeyCode::Down => {
                self.selected = (self.selected + 1).min(blocks.len() - 1);
                Ok(())
            }
            KeyCode::Char('m') => {
                self.drag.start(instance.id, instance.position);
                self.status_line = "dragging: arrows move, Enter drops, Esc cancels".to_string();
                Ok(())
            }
            KeyCode::Char(ch) if ch.is_ascii_digit() || ch == '.' => {
                let mut amount = controller.amount().await;
                amount.push(ch);
                controller.set_amount(amount).await
            }
            KeyCode::Backspace => {
                let mut amount = controller.amount().await;
                amount.pop();
                controller.set_amount(amount).await
            }
            KeyCode::Char('x') => controller.set_max().await,
            KeyCode::Char('w') if instance.kind == BlockKind::LidoStake => {
                let wrap = controller.view().await.wrap;
                controller.set_wrap(!wrap).await
            }
            KeyCode::Char('d') => {
                app.remove_block(instance.id);
                self.selected = self.selected.saturating_sub(1);
                Ok(())
            }
            KeyCode::Enter => {
                let button = controller.button().await;
                if button.enabled {
                    let controller = controller.clone();
                    tokio::spawn(async move {
                        if let Err(err) = controller.primary_action().await {
                            tracing::debug!(block = %controller.id(), error = %err, "primary action ended");
                        }
                    });
                    self.status_line = format!("{}...", button.label);
                } else {
                    self.status_line = button.label;
                }
                Ok(())
            }
            _ => Ok(()),
        };

        if let Err(err) = result {
            self.status_line = err.to_string();
        }
    }
}

/// Run the canvas until the user quits
pub async fn run_canvas_tui(app: Arc<FlowApp>, signer: Address) -> Result<TuiRunResult, TuiError> {
    let mut events = app.subscribe();
    let mut state = TuiState::new(signer);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = loop {
        loop {
            match events.try_recv() {
                Ok(event) => state.record(&event),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "event log lagged");
                }
                Err(_) => break,
            }
        }

        let blocks = app.blocks();
        let mut views = Vec::with_capacity(blocks.len());
        for block in &blocks {
            if let Some(controller) = app.block(block.id) {
                views.push(controller.view().await);
            }
        }
        let screen = render::Screen {
            banner: app.wallet_banner(),
            network: &app.config().network,
            blocks: &blocks,
            views: &views,
            state: &state,
        };

        if let Err(err) = terminal.draw(|frame| render::draw_ui(frame, &screen)) {
            break Err(err.into());
        }

        if event::poll(Duration::from_millis(150))? {
            if let CEvent::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if state.handle_key(&app, key.code).await {
                    break Ok(TuiRunResult {
                        blocks: app.blocks().len(),
                        events_seen: state.events_seen,
                    });
                }
            }
        }
    };

    app.shutdown();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}
