use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn key_line(key: &'static str, pad: usize, what: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key, Style::default().fg(Color::Magenta)),
        Span::raw(" ".repeat(pad)),
        Span::raw(what),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("q", Style::default().fg(Color::Magenta)),
            Span::raw(" / "),
            Span::styled("Ctrl-C", Style::default().fg(Color::Magenta)),
            Span::raw("  Quit"),
        ]),
        key_line("n", 11, "New publication"),
        key_line("e", 11, "Edit selected"),
        key_line("d", 11, "Delete selected"),
        key_line("r", 11, "Refresh from store"),
        key_line("/", 11, "Search titles and statuses"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("↑/↓", Style::default().fg(Color::Magenta)),
            Span::raw(" or "),
            Span::styled("j/k", Style::default().fg(Color::Magenta)),
            Span::raw("  Navigate"),
        ]),
        key_line("tab", 9, "Switch tabs"),
        key_line("?", 11, "Show this help"),
        Line::from(""),
        Line::from("Add/Edit form:"),
        key_line("tab", 9, "Switch between title and status"),
        key_line("enter", 7, "New line in title, save from status"),
        key_line("Ctrl-S", 6, "Save"),
        key_line("esc", 9, "Cancel"),
        Line::from(""),
        Line::from("Status badges:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("blinking green", Style::default().fg(Color::Rgb(0x00, 0xff, 0x9d))),
            Span::raw("  near-final stage (EIC decision, almost published, …)"),
        ]),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(p, area);
}
