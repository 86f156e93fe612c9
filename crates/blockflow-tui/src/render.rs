use blockflow_flow::{BlockView, PanelData, Palette};
use blockflow_types::{BlockInstance, Position, TokenAmount, GRID_UNIT};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap};
use ratatui::Frame;

use crate::{Focus, TuiState};

/// Canvas pixels per terminal column
const PX_PER_COL: i64 = GRID_UNIT / 2;
/// Canvas pixels per terminal row
const PX_PER_ROW: i64 = GRID_UNIT;
const CARD_WIDTH: u16 = 24;
const CARD_HEIGHT: u16 = 4;

pub(crate) struct Screen<'a> {
    pub banner: String,
    pub network: &'a str,
    pub blocks: &'a [BlockInstance],
    pub views: &'a [BlockView],
    pub state: &'a TuiState,
}

pub(crate) fn draw_ui(frame: &mut Frame<'_>, screen: &Screen<'_>) {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " BlockFlow ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" network={} | {}", screen.network, screen.banner)),
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, vertical[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(24),
            Constraint::Min(30),
            Constraint::Length(36),
        ])
        .split(vertical[1]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(4)])
        .split(body[0]);

    render_palette(frame, side[0], screen.state);
    render_log(frame, side[1], screen.state);
    render_canvas(frame, body[1], screen);
    render_details(frame, body[2], screen);

    let hotkeys = match screen.state.focus {
        Focus::Palette => "Tab canvas | Up/Down pick | Enter add | C wallet | Q quit",
        Focus::Canvas if screen.state.drag.is_active() => "arrows move | Enter drop | Esc cancel",
        Focus::Canvas => {
            "Tab palette | Up/Down select | 0-9 . amount | X max | W wrap | Enter act | M move | D remove"
        }
    };
    let footer = Paragraph::new(format!("{}   {}", hotkeys, screen.state.status_line))
        .block(Block::default().borders(Borders::ALL).title("Hotkeys"));
    frame.render_widget(footer, vertical[2]);
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn render_palette(frame: &mut Frame<'_>, area: Rect, state: &TuiState) {
    let focused = state.focus == Focus::Palette;
    let items: Vec<ListItem<'_>> = Palette::entries()
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let style = if focused && idx == state.palette_index {
                Style::default().fg(Color::Black).bg(Color::Yellow)
            } else {
                Style::default()
            };
            ListItem::new(entry.display_name).style(style)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focus_style(focused))
            .title("Palette"),
    );
    frame.render_widget(list, area);
}

fn render_log(frame: &mut Frame<'_>, area: Rect, state: &TuiState) {
    let items: Vec<ListItem<'_>> = state
        .log
        .iter()
        .take(area.height.saturating_sub(2) as usize)
        .map(|line| ListItem::new(line.as_str()))
        .collect();
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Events"));
    frame.render_widget(list, area);
}

/// Terminal cell for a canvas position, relative to the canvas' inner area.
/// Negative coordinates pin to the edge.
fn cell_for(position: Position) -> (u16, u16) {
    let col = (position.x / PX_PER_COL).clamp(0, u16::MAX as i64) as u16;
    let row = (position.y / PX_PER_ROW).clamp(0, u16::MAX as i64) as u16;
    (col, row)
}

fn render_canvas(frame: &mut Frame<'_>, area: Rect, screen: &Screen<'_>) {
    let state = screen.state;
    let focused = state.focus == Focus::Canvas;
    let outer = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_style(focused))
        .title(format!("Canvas ({} blocks)", screen.blocks.len()));
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    if screen.blocks.is_empty() {
        let hint = Paragraph::new("Add a block from the palette").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(hint, inner);
        return;
    }

    let selected = state.selected.min(screen.blocks.len() - 1);
    for (idx, block) in screen.blocks.iter().enumerate() {
        let dragged = state.drag.dragging() == Some(block.id);
        let position = if dragged {
            state.drag.preview().unwrap_or(block.position)
        } else {
            block.position
        };
        let (col, row) = cell_for(position);
        if col >= inner.width || row >= inner.height {
            continue;
        }
        let rect = Rect {
            x: inner.x + col,
            y: inner.y + row,
            width: CARD_WIDTH.min(inner.width - col),
            height: CARD_HEIGHT.min(inner.height - row),
        };

        let view = screen.views.iter().find(|v| v.id == block.id);
        let lines = match view {
            Some(view) => vec![
                Line::from(format!("amt: {}", if view.amount.is_empty() { "-" } else { view.amount.as_str() })),
                Line::from(Span::styled(
                    format!("[{}]", view.button.label),
                    if view.button.enabled {
                        Style::default().fg(Color::Green)
                    } else {
                        Style::default().fg(Color::DarkGray)
                    },
                )),
            ],
            None => vec![Line::from("mounting...")],
        };

        let mut border = if focused && idx == selected {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        if dragged {
            border = border.add_modifier(Modifier::DIM);
        }
        let card = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(format!("{} {}", block.id, block.kind.display_name())),
        );
        frame.render_widget(Clear, rect);
        frame.render_widget(card, rect);
    }
}

fn fmt_amount(amount: Option<TokenAmount>) -> String {
    amount.map(|a| a.to_fixed(4)).unwrap_or_else(|| "-".to_string())
}

fn render_details(frame: &mut Frame<'_>, area: Rect, screen: &Screen<'_>) {
    let block = Block::default().borders(Borders::ALL).title("Details");
    let Some(view) = screen
        .blocks
        .get(screen.state.selected.min(screen.blocks.len().saturating_sub(1)))
        .and_then(|b| screen.views.iter().find(|v| v.id == b.id))
    else {
        frame.render_widget(Paragraph::new("No block selected").block(block), area);
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(view.title, Style::default().add_modifier(Modifier::BOLD))),
        Line::from(format!("state: {}", view.workflow)),
        Line::from(format!("amount: {}", view.amount)),
    ];
    match &view.panel {
        PanelData::Supply(panel) => {
            lines.push(Line::from(format!("wstETH balance: {}", fmt_amount(panel.balance))));
            lines.push(Line::from(format!("allowance: {}", fmt_amount(panel.allowance))));
            lines.push(Line::from(format!(
                "supply APY: {}",
                panel.apy.map(|apy| format!("{:.2}%", apy)).unwrap_or_else(|| "-".to_string())
            )));
        }
        PanelData::Stake(panel) => {
            lines.push(Line::from(format!("ETH: {}", fmt_amount(panel.eth_balance))));
            lines.push(Line::from(format!("stETH: {}", fmt_amount(panel.steth_balance))));
            lines.push(Line::from(format!("wstETH: {}", fmt_amount(panel.wsteth_balance))));
            lines.push(Line::from(format!("APR: {:.2}%", panel.apr)));
            lines.push(Line::from(format!("wrap: {}", if view.wrap { "on" } else { "off" })));
            if let Some(estimate) = view.estimated_wsteth {
                lines.push(Line::from(format!("~{} wstETH", estimate.to_fixed(4))));
            }
        }
    }
    for note in &view.notes {
        lines.push(Line::from(Span::styled(*note, Style::default().fg(Color::DarkGray))));
    }
    lines.push(Line::from(format!("refreshes: {}", view.refresh_count)));

    let details = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(details, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_for_scales_and_pins() {
        assert_eq!(cell_for(Position::new(0, 0)), (0, 0));
        assert_eq!(cell_for(Position::new(40, 60)), (4, 3));
        assert_eq!(cell_for(Position::new(-20, -40)), (0, 0));
    }
}
