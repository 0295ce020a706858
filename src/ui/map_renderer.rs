use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Map, MapResolution},
        Block, Borders, Paragraph, Wrap,
    },
    Frame,
};

use crate::data::seed::REGIONS;
use crate::data::Organization;
use crate::views::{Marker, Viewport};

pub struct MapRenderContext<'a> {
    pub viewport: Viewport,
    pub markers: &'a [Marker],
    pub selected_name: Option<&'a str>,
    pub attribution: &'a str,
    pub use_glyphs: bool,
    pub focused: bool,
    pub animating: bool,
}

/// Area inside the map border, used for hit testing
pub fn inner_area(area: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(area)
}

pub fn render_map(f: &mut Frame, area: Rect, ctx: &MapRenderContext) {
    let ([west, east], [south, north]) = ctx.viewport.bounds();
    let (plain, selected) = if ctx.use_glyphs { ("●", "◉") } else { ("o", "@") };

    let title = format!(
        "Карта: {} (zoom {:.1}{})",
        REGIONS,
        ctx.viewport.camera.zoom,
        if ctx.animating { ", ✈" } else { "" }
    );
    let border_style = if ctx.focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let canvas = Canvas::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(title)
                .title_bottom(Line::from(ctx.attribution).right_aligned()),
        )
        .x_bounds([west, east])
        .y_bounds([south, north])
        .paint(|painter| {
            painter.draw(&Map {
                color: Color::DarkGray,
                resolution: MapResolution::High,
            });
            painter.layer();

            // Selected marker last so it stays on top
            for marker in ctx.markers.iter().filter(|m| !m.selected) {
                painter.print(
                    marker.position.lng,
                    marker.position.lat,
                    Span::styled(plain, Style::default().fg(Color::LightRed)),
                );
            }
            for marker in ctx.markers.iter().filter(|m| m.selected) {
                painter.print(
                    marker.position.lng,
                    marker.position.lat,
                    Span::styled(
                        selected,
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    ),
                );
                if let Some(name) = ctx.selected_name {
                    painter.print(
                        marker.position.lng,
                        marker.position.lat,
                        Span::styled(
                            format!("  {}", name),
                            Style::default().fg(Color::Yellow),
                        ),
                    );
                }
            }
        });

    f.render_widget(canvas, area);
}

/// Popup-style card for the selected organization
pub fn render_details(f: &mut Frame, area: Rect, org: Option<&Organization>, visible: bool) {
    let block = Block::default().borders(Borders::ALL).title("Деталі");

    let Some(org) = org else {
        let hint = Paragraph::new("Оберіть організацію в таблиці або на карті")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(hint, area);
        return;
    };

    let label = Style::default().fg(Color::Cyan);
    let mut lines = vec![
        Line::from(Span::styled(
            org.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![Span::styled("Адреса: ", label), Span::raw(org.address.clone())]),
        Line::from(vec![Span::styled("Послуги: ", label), Span::raw(org.services.clone())]),
        Line::from(vec![Span::styled("Телефон: ", label), Span::raw(org.phone.clone())]),
        Line::from(vec![Span::styled("Пошта: ", label), Span::raw(org.email.clone())]),
        Line::from(vec![
            Span::styled("Документи (Drive): ", label),
            Span::raw(org.drive_folder_url.clone()),
        ]),
        Line::from(vec![Span::styled("Бюджет: ", label), Span::raw(org.budget_display())]),
    ];
    if !org.is_mappable() {
        lines.push(Line::from(Span::styled(
            "Немає координат, на карті не показано",
            Style::default().fg(Color::Yellow),
        )));
    }
    if !visible {
        lines.push(Line::from(Span::styled(
            "Приховано поточним фільтром",
            Style::default().fg(Color::Yellow),
        )));
    }

    let details = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(details, area);
}
