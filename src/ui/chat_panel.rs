use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::time::Duration;
use tui_input::Input;

use crate::assistant::{ConversationLog, Role};

const SPINNER: [&str; 4] = ["⠋", "⠙", "⠹", "⠸"];

pub struct ChatRenderContext<'a> {
    pub log: &'a ConversationLog,
    pub input: &'a Input,
    pub waiting: Option<Duration>,
    pub context_size: usize,
    pub focused: bool,
}

/// Split `**bold**` runs into styled spans
fn styled_spans(line: &str, base: Style) -> Vec<Span<'static>> {
    line.split("**")
        .enumerate()
        .filter(|(_, part)| !part.is_empty())
        .map(|(i, part)| {
            if i % 2 == 1 {
                Span::styled(part.to_string(), base.add_modifier(Modifier::BOLD))
            } else {
                Span::styled(part.to_string(), base)
            }
        })
        .collect()
}

/// Horizontal scroll and cursor column for an input box `width` cells wide.
/// One cell is kept free so the cursor never lands on the border.
pub fn input_window(input: &Input, width: usize) -> (usize, usize) {
    let scroll = input.visual_scroll(width.saturating_sub(1));
    (scroll, input.visual_cursor().saturating_sub(scroll))
}

/// Greedy word wrap by character count
fn wrap_line(line: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![line.to_string()];
    }
    let mut out = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    for word in line.split(' ') {
        let word_len = word.chars().count();
        if current_len > 0 && current_len + 1 + word_len > width {
            out.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }
    out.push(current);
    out
}

fn transcript_lines(log: &ConversationLog, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for message in log.messages() {
        let (color, base) = match message.role {
            Role::User => (Color::LightCyan, Style::default().fg(Color::White)),
            Role::Assistant => (Color::LightGreen, Style::default()),
        };
        lines.push(Line::from(vec![
            Span::styled(
                message.role.chat_label(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", message.timestamp.format("%H:%M")),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        for raw in message.text.lines() {
            for wrapped in wrap_line(raw, width) {
                lines.push(Line::from(styled_spans(&wrapped, base)));
            }
        }
        lines.push(Line::from(""));
    }
    lines
}

pub fn render_chat(f: &mut Frame, area: Rect, ctx: &ChatRenderContext) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    let border_style = if ctx.focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let history_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(format!("AI Консультант ({} у контексті)", ctx.context_size))
        .title_bottom(Line::from("Ctrl+S зберегти").right_aligned());
    let inner = history_block.inner(chunks[0]);

    let mut lines = transcript_lines(ctx.log, inner.width.saturating_sub(1) as usize);
    if let Some(elapsed) = ctx.waiting {
        let frame = SPINNER[(elapsed.as_millis() / 120) as usize % SPINNER.len()];
        lines.push(Line::from(Span::styled(
            format!("{} Аналізую базу даних...", frame),
            Style::default().fg(Color::Yellow),
        )));
    }

    // Keep the newest messages in view
    let overflow = lines.len().saturating_sub(inner.height as usize);
    let history = Paragraph::new(lines)
        .block(history_block)
        .scroll((overflow.min(u16::MAX as usize) as u16, 0));
    f.render_widget(history, chunks[0]);

    let input_title = if ctx.waiting.is_some() {
        "Зачекайте на відповідь..."
    } else {
        "Напишіть ваше запитання"
    };
    let input_style = if ctx.waiting.is_some() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Yellow)
    };
    let (scroll, cursor) = input_window(ctx.input, chunks[1].width.saturating_sub(2) as usize);
    let input = Paragraph::new(ctx.input.value())
        .style(input_style)
        .scroll((0, scroll.min(u16::MAX as usize) as u16))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(input_title),
        );
    f.render_widget(input, chunks[1]);

    if ctx.focused {
        f.set_cursor_position((
            chunks[1].x + 1 + cursor as u16,
            chunks[1].y + 1,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_markers_become_spans() {
        let spans = styled_spans("Фонд **Карітас** працює", Style::default());
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[1].content, "Карітас");
        assert!(spans[1].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_long_input_keeps_cursor_in_box() {
        let input = Input::new("Де знайти юридичну консультацію в Херсоні?".to_string());
        let (scroll, cursor) = input_window(&input, 20);
        assert!(scroll > 0);
        assert!(cursor < 20);
        assert_eq!(scroll + cursor, input.visual_cursor());

        let short = Input::new("Привіт".to_string());
        assert_eq!(input_window(&short, 20), (0, 6));
    }

    #[test]
    fn test_wrap_line_respects_width() {
        let wrapped = wrap_line("один два три чотири", 9);
        assert_eq!(wrapped, vec!["один два", "три", "чотири"]);
    }
}
