use std::time::{Duration, Instant};
use tracing::debug;

use crate::assistant::ConversationLog;
use crate::config::Config;
use crate::data::{Organization, OrganizationStore};
use crate::search_filter::FilterState;
use crate::selection::Selection;
use crate::views::map_view::{self, Marker, Viewport};
use crate::views::{MapAdapter, MapDefaults, TableAdapter, TableRow};

/// Marker hit radius in cells
const MARKER_HIT_RADIUS: f64 = 2.0;

/// StateCoordinator keeps the filter, the selection and both views in step.
///
/// The table and map never talk to each other; every change goes through
/// here and both are refreshed from the same filtered collection.
pub struct StateCoordinator {
    store: OrganizationStore,
    filter: FilterState,
    selection: Selection,
    table: TableAdapter,
    map: MapAdapter,
    conversation: ConversationLog,
}

impl StateCoordinator {
    pub fn new(store: OrganizationStore, config: &Config) -> Self {
        let filter = FilterState::new(store.all(), config.behavior.filter_debounce_ms);
        let map = MapAdapter::new(
            config.map.defaults(),
            Duration::from_millis(config.map.fly_duration_ms),
        );

        let mut coordinator = Self {
            store,
            filter,
            selection: Selection::new(),
            table: TableAdapter::new(),
            map,
            conversation: ConversationLog::with_welcome(),
        };
        coordinator.sync_views(Instant::now());
        coordinator
    }

    // ========== READ ACCESS ==========

    pub fn store(&self) -> &OrganizationStore {
        &self.store
    }

    /// The filtered collection every view renders from
    pub fn visible(&self) -> Vec<&Organization> {
        self.filter.visible(self.store.all())
    }

    pub fn query(&self) -> &str {
        self.filter.query()
    }

    pub fn is_filter_pending(&self) -> bool {
        self.filter.is_pending()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Selected organization looked up in the whole store, so the details
    /// panel still works when the filter hides it
    pub fn selected_organization(&self) -> Option<&Organization> {
        self.selection.selected_id().and_then(|id| self.store.get(id))
    }

    pub fn table(&self) -> &TableAdapter {
        &self.table
    }

    pub fn table_rows(&self) -> Vec<TableRow<'_>> {
        TableAdapter::rows(&self.visible(), self.selection.selected_id())
    }

    pub fn map(&self) -> &MapAdapter {
        &self.map
    }

    pub fn markers(&self) -> Vec<Marker> {
        map_view::markers(&self.visible(), self.selection.selected_id())
    }

    pub fn conversation(&self) -> &ConversationLog {
        &self.conversation
    }

    pub fn conversation_mut(&mut self) -> &mut ConversationLog {
        &mut self.conversation
    }

    // ========== FILTER ==========

    pub fn set_query(&mut self, query: &str) {
        self.set_query_at(query, Instant::now());
    }

    pub fn set_query_at(&mut self, query: &str, now: Instant) {
        if self.filter.set_query(self.store.all(), query) {
            self.sync_views(now);
        }
    }

    /// Apply the typed query now, even inside the debounce window
    pub fn flush_filter(&mut self) {
        if self.filter.is_pending() {
            self.filter.flush(self.store.all());
            self.sync_views(Instant::now());
        }
    }

    /// Apply a debounced query and advance the map animation
    pub fn tick(&mut self, now: Instant) {
        if self.filter.poll(self.store.all()) {
            self.sync_views(now);
        }
        self.map.tick_at(now);
    }

    // ========== SELECTION ==========

    pub fn select(&mut self, id: &str) {
        self.select_at(id, Instant::now());
    }

    pub fn select_at(&mut self, id: &str, now: Instant) {
        self.selection.select(id);
        self.sync_views(now);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.sync_views(Instant::now());
    }

    // ========== TABLE ==========

    pub fn table_down(&mut self) {
        let len = self.filter.visible_indices().len();
        self.table.move_down(len);
    }

    pub fn table_up(&mut self) {
        self.table.move_up();
    }

    pub fn table_page_down(&mut self, page: usize) {
        let len = self.filter.visible_indices().len();
        self.table.page_down(len, page);
    }

    pub fn table_page_up(&mut self, page: usize) {
        self.table.page_up(page);
    }

    /// Select the row under the cursor
    pub fn activate_table_row(&mut self) -> Option<String> {
        let visible = self.filter.visible(self.store.all());
        let id = self.table.activate(&visible, &mut self.selection)?;
        self.sync_views(Instant::now());
        Some(id)
    }

    /// Select row `row` of the filtered table
    pub fn click_table_row(&mut self, row: usize) -> Option<String> {
        let visible = self.filter.visible(self.store.all());
        let id = self.table.click(&visible, row, &mut self.selection)?;
        self.sync_views(Instant::now());
        Some(id)
    }

    // ========== MAP ==========

    pub fn click_marker(&mut self, id: &str) -> bool {
        let visible = self.filter.visible(self.store.all());
        let clicked = self.map.click_marker(&visible, id, &mut self.selection);
        if clicked {
            self.sync_views(Instant::now());
        }
        clicked
    }

    /// Select the marker nearest to a click at (`column`, `row`) inside a
    /// map panel of the given size. Returns the selected id.
    pub fn click_map_cell(&mut self, column: u16, row: u16, width: u16, height: u16) -> Option<String> {
        let viewport = Viewport::new(self.map.camera(), width, height);
        let markers = self.markers();
        let id = viewport
            .marker_at(&markers, column, row, MARKER_HIT_RADIUS)?
            .id
            .clone();
        self.click_marker(&id).then_some(id)
    }

    /// Select the next (or previous) marker on the map, wrapping around.
    /// Starts from the first marker when nothing visible is selected.
    pub fn cycle_marker(&mut self, forward: bool) -> Option<String> {
        let markers = self.markers();
        if markers.is_empty() {
            return None;
        }
        let len = markers.len();
        let next = match markers.iter().position(|m| m.selected) {
            Some(pos) if forward => (pos + 1) % len,
            Some(pos) => (pos + len - 1) % len,
            None if forward => 0,
            None => len - 1,
        };
        let id = markers[next].id.clone();
        self.click_marker(&id).then_some(id)
    }

    pub fn set_map_defaults(&mut self, defaults: MapDefaults) {
        self.map.set_defaults(defaults);
        self.sync_views(Instant::now());
    }

    /// Refresh both views from the current filtered collection and selection
    fn sync_views(&mut self, now: Instant) {
        let visible = self.filter.visible(self.store.all());
        self.table.clamp(visible.len());
        self.table.follow_selection(&visible, &self.selection);
        if self.map.sync_at(&visible, &self.selection, now) {
            debug!(
                target: "coordinator",
                "Views synced: {} visible, selection {:?}",
                visible.len(),
                self.selection.selected_id()
            );
        }
    }
}
