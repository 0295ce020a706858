use crate::data::Organization;
use tracing::debug;

/// The single organization highlighted across the table and the map.
///
/// This is only a lookup key. It is never cleared when the filter hides the
/// selected record; consumers resolve it against whatever collection they
/// are rendering and handle a miss themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected_id: Option<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `id`, replacing any previous selection. Selecting the current
    /// id again leaves it selected.
    pub fn select(&mut self, id: &str) {
        if self.selected_id.as_deref() != Some(id) {
            debug!(
                target: "selection",
                "Selection {:?} -> {}",
                self.selected_id, id
            );
            self.selected_id = Some(id.to_string());
        }
    }

    pub fn clear(&mut self) {
        if self.selected_id.take().is_some() {
            debug!(target: "selection", "Selection cleared");
        }
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        is_selected(id, self.selected_id())
    }

    /// Find the selected organization in `organizations`, if it is there
    pub fn resolve<'a>(&self, organizations: &[&'a Organization]) -> Option<&'a Organization> {
        let id = self.selected_id.as_deref()?;
        organizations.iter().copied().find(|org| org.id == id)
    }
}

/// Pure row/marker highlight rule
pub fn is_selected(id: &str, selection: Option<&str>) -> bool {
    selection == Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::seed::builtin_organizations;

    #[test]
    fn test_select_replaces_previous() {
        let mut selection = Selection::new();
        assert_eq!(selection.selected_id(), None);
        selection.select("1");
        selection.select("4");
        assert_eq!(selection.selected_id(), Some("4"));
        assert!(selection.is_selected("4"));
        assert!(!selection.is_selected("1"));
    }

    #[test]
    fn test_select_twice_is_idempotent() {
        let mut once = Selection::new();
        once.select("3");
        let mut twice = Selection::new();
        twice.select("3");
        twice.select("3");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_selection_survives_unknown_id() {
        let orgs = builtin_organizations();
        let view: Vec<&Organization> = orgs.iter().collect();
        let mut selection = Selection::new();
        selection.select("missing");
        assert_eq!(selection.selected_id(), Some("missing"));
        assert!(selection.resolve(&view).is_none());
    }

    #[test]
    fn test_clear() {
        let mut selection = Selection::new();
        selection.select("2");
        selection.clear();
        assert_eq!(selection.selected_id(), None);
    }
}
