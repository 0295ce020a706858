use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use crossterm::style::Stylize;

use socialmap::data::{OrgStatus, Organization};

fn status_cell(status: OrgStatus) -> Cell {
    let color = match status {
        OrgStatus::Active => Color::Green,
        OrgStatus::Inactive => Color::Red,
        OrgStatus::Pending => Color::Yellow,
    };
    Cell::new(status.label()).fg(color)
}

pub fn display_organizations(organizations: &[&Organization], total: usize) {
    if organizations.is_empty() {
        println!("{}", "Нічого не знайдено.".yellow());
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let headers: Vec<Cell> = ["ID", "Актори", "Категорія", "Послуги", "Телефон", "Пошта", "Статус"]
        .iter()
        .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
        .collect();
    table.set_header(headers);

    for org in organizations {
        table.add_row(vec![
            Cell::new(&org.id),
            Cell::new(format!("{}\n{}", org.name, org.address)),
            Cell::new(&org.category),
            Cell::new(&org.services),
            Cell::new(&org.phone),
            Cell::new(&org.email),
            status_cell(org.status),
        ]);
    }

    println!("{table}");
    println!(
        "\n{}",
        format!("{} з {} організацій", organizations.len(), total).green()
    );
}
