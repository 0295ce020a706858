// Table panel rendering. Depends only on the rows handed in.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::data::OrgStatus;
use crate::views::TableRow;

/// Header plus its bottom margin
pub const HEADER_HEIGHT: u16 = 2;

/// Each row shows the name on the first line and the address on the second
pub const ROW_HEIGHT: u16 = 2;

const SELECTED_BG: Color = Color::Rgb(0, 70, 70);

pub fn status_color(status: OrgStatus) -> Color {
    match status {
        OrgStatus::Active => Color::Green,
        OrgStatus::Inactive => Color::Red,
        OrgStatus::Pending => Color::Yellow,
    }
}

pub fn render_table(
    f: &mut Frame,
    area: Rect,
    rows: &[TableRow],
    state: &mut TableState,
    focused: bool,
    show_status_badges: bool,
) {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    if rows.is_empty() {
        let empty = Paragraph::new("Нічого не знайдено")
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .title("Актори (0)"),
            )
            .style(Style::default().fg(Color::Yellow));
        f.render_widget(empty, area);
        return;
    }

    let header_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let header = Row::new(
        ["Актори", "Категорія", "Послуги", "Телефон", "Пошта"]
            .into_iter()
            .map(|h| Cell::from(h).style(header_style)),
    )
    .height(1)
    .bottom_margin(1);

    let body: Vec<Row> = rows
        .iter()
        .map(|row| {
            let org = row.org;
            let marker = if row.selected { "● " } else { "  " };
            let name = Line::from(vec![
                Span::styled(marker, Style::default().fg(Color::LightCyan)),
                Span::styled(
                    org.name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ]);
            let address = Line::from(Span::styled(
                format!("  {}", org.address),
                Style::default().fg(Color::Gray),
            ));

            let mut category = vec![Line::from(org.category.clone())];
            if show_status_badges {
                category.push(Line::from(Span::styled(
                    org.status.label(),
                    Style::default().fg(status_color(org.status)),
                )));
            }

            let style = if row.selected {
                Style::default().bg(SELECTED_BG)
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from(vec![name, address]),
                Cell::from(category),
                Cell::from(org.services.clone()),
                Cell::from(org.phone.clone()),
                Cell::from(org.email.clone()),
            ])
            .height(ROW_HEIGHT)
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Percentage(28),
        Constraint::Percentage(16),
        Constraint::Percentage(28),
        Constraint::Percentage(13),
        Constraint::Percentage(15),
    ];

    let table = Table::new(body, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(format!("Актори ({})", rows.len())),
        )
        .column_spacing(1)
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    f.render_stateful_widget(table, area, state);
}

/// Filtered row index under a click at screen row `y`, given the table
/// area and the scroll offset after the last render
pub fn row_at(area: Rect, y: u16, offset: usize, row_count: usize) -> Option<usize> {
    let first_row_y = area.y + 1 + HEADER_HEIGHT;
    let last_y = area.y + area.height.saturating_sub(1);
    if y < first_row_y || y >= last_y {
        return None;
    }
    let idx = offset + ((y - first_row_y) / ROW_HEIGHT) as usize;
    (idx < row_count).then_some(idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_at_accounts_for_header_and_offset() {
        let area = Rect::new(0, 5, 80, 20);
        // border at 5, header at 6, margin at 7, first row at 8..10
        assert_eq!(row_at(area, 6, 0, 9), None);
        assert_eq!(row_at(area, 8, 0, 9), Some(0));
        assert_eq!(row_at(area, 9, 0, 9), Some(0));
        assert_eq!(row_at(area, 10, 0, 9), Some(1));
        assert_eq!(row_at(area, 10, 3, 9), Some(4));
        assert_eq!(row_at(area, 22, 8, 9), None);
    }
}
