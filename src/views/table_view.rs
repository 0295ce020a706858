use crate::data::Organization;
use crate::selection::{is_selected, Selection};

/// One rendered table row
#[derive(Debug, Clone, Copy)]
pub struct TableRow<'a> {
    pub org: &'a Organization,
    pub selected: bool,
}

/// Table projection of the filtered collection.
///
/// The keyboard cursor is local to the table. It only turns into a
/// selection when a row is activated.
#[derive(Debug, Clone, Default)]
pub struct TableAdapter {
    cursor: usize,
}

impl TableAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// One row per filtered organization, in the given order
    pub fn rows<'a>(organizations: &[&'a Organization], selection: Option<&str>) -> Vec<TableRow<'a>> {
        organizations
            .iter()
            .map(|&org| TableRow {
                org,
                selected: is_selected(&org.id, selection),
            })
            .collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn move_down(&mut self, row_count: usize) {
        if row_count == 0 {
            self.cursor = 0;
        } else {
            self.cursor = (self.cursor + 1).min(row_count - 1);
        }
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn page_down(&mut self, row_count: usize, page: usize) {
        if row_count > 0 {
            self.cursor = (self.cursor + page).min(row_count - 1);
        }
    }

    pub fn page_up(&mut self, page: usize) {
        self.cursor = self.cursor.saturating_sub(page);
    }

    /// Keep the cursor inside the row range after the filter changes
    pub fn clamp(&mut self, row_count: usize) {
        if row_count == 0 {
            self.cursor = 0;
        } else if self.cursor >= row_count {
            self.cursor = row_count - 1;
        }
    }

    /// Move the cursor onto the selected row when it is visible
    pub fn follow_selection(&mut self, organizations: &[&Organization], selection: &Selection) {
        if let Some(id) = selection.selected_id() {
            if let Some(pos) = organizations.iter().position(|org| org.id == id) {
                self.cursor = pos;
            }
        }
    }

    /// Select the organization under the cursor. Returns its id.
    pub fn activate(&self, organizations: &[&Organization], selection: &mut Selection) -> Option<String> {
        self.click(organizations, self.cursor, selection)
    }

    /// Select the organization on row `row`. Returns its id.
    pub fn click(
        &self,
        organizations: &[&Organization],
        row: usize,
        selection: &mut Selection,
    ) -> Option<String> {
        let org = organizations.get(row)?;
        selection.select(&org.id);
        Some(org.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::seed::builtin_organizations;

    #[test]
    fn test_rows_flag_only_selected() {
        let orgs = builtin_organizations();
        let view: Vec<&Organization> = orgs.iter().collect();
        let rows = TableAdapter::rows(&view, Some("3"));
        assert_eq!(rows.len(), 9);
        let flagged: Vec<&str> = rows
            .iter()
            .filter(|r| r.selected)
            .map(|r| r.org.id.as_str())
            .collect();
        assert_eq!(flagged, vec!["3"]);
    }

    #[test]
    fn test_click_selects_row() {
        let orgs = builtin_organizations();
        let view: Vec<&Organization> = orgs.iter().skip(2).collect();
        let table = TableAdapter::new();
        let mut selection = Selection::new();
        assert_eq!(table.click(&view, 1, &mut selection), Some("4".to_string()));
        assert_eq!(selection.selected_id(), Some("4"));
        // same row again keeps it selected
        table.click(&view, 1, &mut selection);
        assert_eq!(selection.selected_id(), Some("4"));
        assert_eq!(table.click(&view, 99, &mut selection), None);
    }

    #[test]
    fn test_cursor_bounds() {
        let mut table = TableAdapter::new();
        table.move_up();
        assert_eq!(table.cursor(), 0);
        for _ in 0..20 {
            table.move_down(3);
        }
        assert_eq!(table.cursor(), 2);
        table.clamp(1);
        assert_eq!(table.cursor(), 0);
    }

    #[test]
    fn test_follow_selection() {
        let orgs = builtin_organizations();
        let view: Vec<&Organization> = orgs.iter().collect();
        let mut table = TableAdapter::new();
        let mut selection = Selection::new();
        selection.select("7");
        table.follow_selection(&view, &selection);
        assert_eq!(table.cursor(), 6);
    }
}
