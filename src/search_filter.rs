use crate::data::Organization;
use crate::debouncer::Debouncer;
use tracing::debug;

/// Handles the free-text filter over the organization list
pub struct SearchFilter;

impl SearchFilter {
    /// Order-preserving subsequence of `organizations` whose name, category
    /// or address contains `query` (case-insensitive). An empty query keeps
    /// every record.
    pub fn filter<'a>(organizations: &'a [Organization], query: &str) -> Vec<&'a Organization> {
        let needle = query.to_lowercase();
        organizations
            .iter()
            .filter(|org| org.matches_lowercase(&needle))
            .collect()
    }

    /// Same as [`SearchFilter::filter`] but returns indices into the source
    pub fn filter_indices(organizations: &[Organization], query: &str) -> Vec<usize> {
        let needle = query.to_lowercase();
        organizations
            .iter()
            .enumerate()
            .filter(|(_, org)| org.matches_lowercase(&needle))
            .map(|(idx, _)| idx)
            .collect()
    }
}

/// The search box contents and the indices they currently select.
///
/// With a zero debounce delay every edit recomputes immediately. A non-zero
/// delay postpones recomputation until typing pauses; the matching rule is
/// the same either way.
#[derive(Debug, Clone)]
pub struct FilterState {
    query: String,
    applied_query: String,
    visible: Vec<usize>,
    debouncer: Option<Debouncer>,
}

impl FilterState {
    pub fn new(organizations: &[Organization], debounce_ms: u64) -> Self {
        Self {
            query: String::new(),
            applied_query: String::new(),
            visible: (0..organizations.len()).collect(),
            debouncer: (debounce_ms > 0).then(|| Debouncer::new(debounce_ms)),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Query the visible set was computed from
    pub fn applied_query(&self) -> &str {
        &self.applied_query
    }

    /// Replace the query text. Returns true when the visible set was
    /// recomputed right away.
    pub fn set_query(&mut self, organizations: &[Organization], query: &str) -> bool {
        self.query = query.to_string();
        match self.debouncer.as_mut() {
            Some(debouncer) => {
                debouncer.trigger();
                false
            }
            None => {
                self.apply(organizations);
                true
            }
        }
    }

    /// Apply a pending debounced query if its delay has elapsed
    pub fn poll(&mut self, organizations: &[Organization]) -> bool {
        let ready = self
            .debouncer
            .as_mut()
            .map(|d| d.should_execute())
            .unwrap_or(false);
        if ready {
            self.apply(organizations);
        }
        ready
    }

    /// Apply the current query immediately, dropping any pending debounce
    pub fn flush(&mut self, organizations: &[Organization]) {
        if let Some(debouncer) = self.debouncer.as_mut() {
            debouncer.reset();
        }
        self.apply(organizations);
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.as_ref().map(|d| d.is_pending()).unwrap_or(false)
    }

    fn apply(&mut self, organizations: &[Organization]) {
        self.visible = SearchFilter::filter_indices(organizations, &self.query);
        self.applied_query = self.query.clone();
        debug!(
            target: "filter",
            "Query '{}' matches {} of {} organizations",
            self.applied_query,
            self.visible.len(),
            organizations.len()
        );
    }

    /// Indices into the store of the currently visible organizations
    pub fn visible_indices(&self) -> &[usize] {
        &self.visible
    }

    /// Resolve the visible indices against the store
    pub fn visible<'a>(&self, organizations: &'a [Organization]) -> Vec<&'a Organization> {
        self.visible
            .iter()
            .filter_map(|&idx| organizations.get(idx))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::seed::builtin_organizations;

    #[test]
    fn test_empty_query_is_identity() {
        let orgs = builtin_organizations();
        let filtered = SearchFilter::filter(&orgs, "");
        let ids: Vec<&str> = filtered.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5", "6", "7", "8", "9"]);
    }

    #[test]
    fn test_filter_preserves_source_order() {
        let orgs = builtin_organizations();
        let filtered = SearchFilter::filter(&orgs, "миколаїв");
        let ids: Vec<&str> = filtered.iter().map(|o| o.id.as_str()).collect();
        // name "Гуманітарний штаб" (2), address (5), name+address (8)
        assert_eq!(ids, vec!["2", "5", "8"]);
    }

    #[test]
    fn test_filter_is_case_insensitive_on_category() {
        let orgs = builtin_organizations();
        let filtered = SearchFilter::filter(&orgs, "БЛАГОДІЙНИЙ ФОНД");
        let ids: Vec<&str> = filtered.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "7", "8", "9"]);
    }

    #[test]
    fn test_services_are_not_searched() {
        let orgs = builtin_organizations();
        assert!(SearchFilter::filter(&orgs, "шелтер").is_empty());
    }

    #[test]
    fn test_filter_state_immediate_without_debounce() {
        let orgs = builtin_organizations();
        let mut state = FilterState::new(&orgs, 0);
        assert_eq!(state.visible_indices().len(), 9);
        assert!(state.set_query(&orgs, "херсон"));
        assert_eq!(state.visible_indices(), &[2, 5, 8]);
        assert_eq!(state.applied_query(), "херсон");
    }

    #[test]
    fn test_filter_state_debounced_until_flush() {
        let orgs = builtin_organizations();
        let mut state = FilterState::new(&orgs, 10_000);
        assert!(!state.set_query(&orgs, "херсон"));
        assert!(state.is_pending());
        assert_eq!(state.visible_indices().len(), 9);
        assert!(!state.poll(&orgs));

        state.flush(&orgs);
        assert!(!state.is_pending());
        assert_eq!(state.visible_indices(), &[2, 5, 8]);
    }
}
