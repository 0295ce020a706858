use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::data::seed::{DRIVE_URL, REGIONS, SHEET_URL};
use crate::utils::logging::LogEntry;

// Helper function to create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn heading(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ))
}

pub fn render_help(f: &mut Frame) {
    let area = centered_rect(70, 70, f.area());
    f.render_widget(Clear, area);

    let help_text = vec![
        heading("SocialMap Інтегратор"),
        Line::from(""),
        Line::from("Пошук:"),
        Line::from("  друкуйте       - фільтр за назвою, категорією або адресою"),
        Line::from("  ↓ / Enter      - перейти до таблиці"),
        Line::from(""),
        Line::from("Таблиця:"),
        Line::from("  ↑↓ PgUp PgDn   - рух курсора"),
        Line::from("  Enter / клік   - обрати організацію"),
        Line::from("  Del            - зняти вибір"),
        Line::from(""),
        Line::from("Карта:"),
        Line::from("  ← →            - попередній / наступний маркер"),
        Line::from("  клік           - обрати маркер"),
        Line::from(""),
        Line::from("Чат:"),
        Line::from("  Enter          - надіслати запитання"),
        Line::from("  Ctrl+S         - зберегти транскрипт"),
        Line::from(""),
        Line::from("Загальне:"),
        Line::from("  Tab            - наступна панель"),
        Line::from("  F1 довідка   F2 вигляд   F3 інтеграція   F4 чат   F12 журнал"),
        Line::from("  F5             - перечитати конфігурацію"),
        Line::from("  Esc            - закрити / вихід,  Ctrl+C - вихід"),
    ];

    let popup = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::ALL).title("Довідка"))
        .wrap(Wrap { trim: false });
    f.render_widget(popup, area);
}

pub struct SettingsContext<'a> {
    pub data_source: &'a str,
    pub organization_count: usize,
    pub config_path: &'a str,
    pub tile_url: &'a str,
}

pub fn render_settings(f: &mut Frame, ctx: &SettingsContext) {
    let area = centered_rect(80, 60, f.area());
    f.render_widget(Clear, area);

    let label = Style::default().fg(Color::Cyan);
    let lines = vec![
        heading("Налаштування інтеграції"),
        Line::from("Підключені джерела даних для реєстру."),
        Line::from(""),
        Line::from(Span::styled(
            "Google Таблиця (Джерело: Актори, Послуги, Контакти)",
            label,
        )),
        Line::from(SHEET_URL),
        Line::from(""),
        Line::from(Span::styled("Google Drive (Папка документів)", label)),
        Line::from(DRIVE_URL),
        Line::from(""),
        Line::from(format!("• Регіони: {}", REGIONS)),
        Line::from("• Поля: Актори, Послуги, Телефон, Пошта"),
        Line::from("• Синхронізація: вручну (експорт таблиці у CSV/JSON, --data)"),
        Line::from(format!(
            "• Поточне джерело: {} ({} організацій)",
            ctx.data_source, ctx.organization_count
        )),
        Line::from(format!("• Конфігурація: {}", ctx.config_path)),
        Line::from(format!("• Тайли карти: {}", ctx.tile_url)),
    ];

    let popup = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Інтеграція (Esc - закрити)"),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(popup, area);
}

pub fn render_logs(f: &mut Frame, entries: &[LogEntry]) {
    let area = centered_rect(90, 80, f.area());
    f.render_widget(Clear, area);

    let lines: Vec<Line> = entries
        .iter()
        .map(|entry| {
            let color = match entry.level.as_str() {
                "ERROR" => Color::Red,
                "WARN" => Color::Yellow,
                "INFO" => Color::Green,
                _ => Color::Gray,
            };
            Line::from(Span::styled(
                entry.format_for_display(),
                Style::default().fg(color),
            ))
        })
        .collect();

    let overflow = lines.len().saturating_sub(area.height.saturating_sub(2) as usize);
    let popup = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Журнал ({} записів)", entries.len())),
        )
        .scroll((overflow.min(u16::MAX as usize) as u16, 0));
    f.render_widget(popup, area);
}
