use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget},
};

use crate::model::row::{Divergence, SnapshotRow};
use crate::ui::ScanSummary;

fn fmt_low(low: Option<f64>) -> String {
    low.map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "-".to_string())
}

pub struct FlowTablePanel<'a> {
    rows: &'a [SnapshotRow],
    selected: usize,
}

impl<'a> FlowTablePanel<'a> {
    pub fn new(rows: &'a [SnapshotRow], selected: usize) -> Self {
        Self { rows, selected }
    }
}

impl Widget for FlowTablePanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let header = Row::new(vec![
            "Symbol", "LTP", "Buy Qty", "Sell Qty", "Net Flow", "Buy Burst", "Sell Burst",
            "Divergence", "Manip", "Today Low", "10D Low",
        ])
        .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD));

        let rows: Vec<Row> = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let flow_color = if row.net_flow > 0.0 {
                    Color::Green
                } else if row.net_flow < 0.0 {
                    Color::Red
                } else {
                    Color::White
                };
                let div_color = match row.divergence {
                    Divergence::None => Color::DarkGray,
                    Divergence::Absorption => Color::Green,
                    Divergence::Distribution => Color::Red,
                };
                let manip = if row.divergence.manipulation_high() {
                    Cell::from("High").style(Style::default().fg(Color::Yellow))
                } else {
                    Cell::from("-").style(Style::default().fg(Color::DarkGray))
                };

                let mut table_row = Row::new(vec![
                    Cell::from(row.symbol.clone()).style(Style::default().fg(Color::Cyan)),
                    Cell::from(format!("{:.2}", row.last_price)),
                    Cell::from(format!("{:.4}", row.total_buy))
                        .style(Style::default().fg(Color::Green)),
                    Cell::from(format!("{:.4}", row.total_sell))
                        .style(Style::default().fg(Color::Red)),
                    Cell::from(format!("{:.4}", row.net_flow))
                        .style(Style::default().fg(flow_color)),
                    Cell::from(row.buy_burst_label()),
                    Cell::from(row.sell_burst_label()),
                    Cell::from(row.divergence.label()).style(Style::default().fg(div_color)),
                    manip,
                    Cell::from(fmt_low(row.today_low)),
                    Cell::from(fmt_low(row.ten_day_low)),
                ]);
                if i == self.selected {
                    table_row = table_row.style(Style::default().add_modifier(Modifier::REVERSED));
                }
                table_row
            })
            .collect();

        let widths = [
            Constraint::Length(9),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(16),
            Constraint::Length(16),
            Constraint::Length(28),
            Constraint::Length(6),
            Constraint::Length(10),
            Constraint::Length(10),
        ];

        let table = Table::new(rows, widths).header(header).block(
            Block::default()
                .title(" Live Flow ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );

        Widget::render(table, area, buf);
    }
}

pub struct ScanPanel<'a> {
    symbol: &'a str,
    summary: &'a ScanSummary,
}

impl<'a> ScanPanel<'a> {
    pub fn new(symbol: &'a str, summary: &'a ScanSummary) -> Self {
        Self { symbol, summary }
    }
}

impl Widget for ScanPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let fmt = |v: Option<f64>| v.map(|x| format!("{:.2}", x)).unwrap_or_else(|| "---".into());
        let bias = self
            .summary
            .bias
            .map(|b| b.label())
            .unwrap_or("---");
        let hvz = self.summary.hvz.map(|h| h.label()).unwrap_or("---");
        let vol = match self.summary.volume_up {
            Some(true) => "up",
            Some(false) => "down",
            None => "---",
        };
        let (conf, conf_color) = match self.summary.confluence {
            Some(true) => ("perfect", Color::Green),
            Some(false) => ("no", Color::DarkGray),
            None => ("---", Color::DarkGray),
        };

        let lines = vec![
            Line::from(vec![
                Span::styled("VWAP: ", Style::default().fg(Color::DarkGray)),
                Span::styled(fmt(self.summary.vwap), Style::default().fg(Color::White)),
                Span::styled("  %Pos: ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    fmt(self.summary.position_pct),
                    Style::default().fg(Color::White),
                ),
                Span::styled("  Setup: ", Style::default().fg(Color::DarkGray)),
                Span::styled(bias, Style::default().fg(Color::Yellow)),
            ]),
            Line::from(vec![
                Span::styled("HVZ: ", Style::default().fg(Color::DarkGray)),
                Span::styled(fmt(self.summary.zone_price), Style::default().fg(Color::White)),
                Span::styled(format!(" ({})", hvz), Style::default().fg(Color::Cyan)),
                Span::styled("  Confluence: ", Style::default().fg(Color::DarkGray)),
                Span::styled(conf, Style::default().fg(conf_color)),
                Span::styled("  Volume: ", Style::default().fg(Color::DarkGray)),
                Span::styled(vol, Style::default().fg(Color::White)),
            ]),
        ];

        let block = Block::default()
            .title(format!(" Scan [{}] ", self.symbol))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

pub struct LogPanel<'a> {
    messages: &'a [String],
}

impl<'a> LogPanel<'a> {
    pub fn new(messages: &'a [String]) -> Self {
        Self { messages }
    }
}

impl Widget for LogPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let visible = area.height.saturating_sub(2) as usize;
        let start = self.messages.len().saturating_sub(visible);
        let lines: Vec<Line> = self.messages[start..]
            .iter()
            .map(|msg| {
                let color = if msg.starts_with("[ERR]") {
                    Color::Red
                } else if msg.starts_with("[WARN]") {
                    Color::Yellow
                } else if msg.starts_with("[ALERT]") {
                    Color::Magenta
                } else {
                    Color::Gray
                };
                Line::from(Span::styled(msg.as_str(), Style::default().fg(color)))
            })
            .collect();

        let block = Block::default()
            .title(" Log ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

pub struct StatusBar {
    pub feed_running: bool,
    pub paused: bool,
    pub tick_count: u64,
    pub notify_count: u64,
    pub next_flush_secs: u64,
}

impl Widget for StatusBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let feed_status = if self.feed_running {
            Span::styled("FEED UP", Style::default().fg(Color::Green))
        } else {
            Span::styled("FEED DOWN", Style::default().fg(Color::Red))
        };

        let pause_status = if self.paused {
            Span::styled(" PAUSED ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        } else {
            Span::styled(" LIVE ", Style::default().fg(Color::Green))
        };

        let flush = format!("next flush in {}s", self.next_flush_secs);

        let line = Line::from(vec![
            Span::styled(
                " tickflow ",
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("| ", Style::default().fg(Color::DarkGray)),
            feed_status,
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            pause_status,
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("ticks: {}", self.tick_count),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("alerts: {}", self.notify_count),
                Style::default().fg(Color::Magenta),
            ),
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            Span::styled(flush, Style::default().fg(Color::DarkGray)),
        ]);

        buf.set_line(area.x, area.y, &line, area.width);
    }
}

pub struct KeybindBar;

impl Widget for KeybindBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line = Line::from(vec![
            Span::styled(" [Q]", Style::default().fg(Color::Yellow)),
            Span::styled("uit  ", Style::default().fg(Color::DarkGray)),
            Span::styled("[P]", Style::default().fg(Color::Yellow)),
            Span::styled("ause  ", Style::default().fg(Color::DarkGray)),
            Span::styled("[R]", Style::default().fg(Color::Yellow)),
            Span::styled("esume  ", Style::default().fg(Color::DarkGray)),
            Span::styled("[J/K]", Style::default().fg(Color::Yellow)),
            Span::styled(" select symbol", Style::default().fg(Color::DarkGray)),
        ]);

        buf.set_line(area.x, area.y, &line, area.width);
    }
}
