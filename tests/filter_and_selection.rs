use socialmap::data::{OrgStatus, Organization, OrganizationStore};
use socialmap::search_filter::SearchFilter;
use socialmap::selection::Selection;
use socialmap::views::{MapAdapter, MapDefaults, TableAdapter};
use std::time::Duration;

fn org(id: &str, name: &str, category: &str, address: &str) -> Organization {
    Organization {
        id: id.to_string(),
        name: name.to_string(),
        address: address.to_string(),
        lat: 46.5,
        lng: 30.7,
        category: category.to_string(),
        services: String::new(),
        phone: String::new(),
        email: String::new(),
        status: OrgStatus::Active,
        drive_folder_url: String::new(),
        budget: 0.0,
    }
}

fn ids(orgs: &[&Organization]) -> Vec<String> {
    orgs.iter().map(|o| o.id.clone()).collect()
}

#[test]
fn test_empty_query_returns_whole_collection_in_order() {
    let store = OrganizationStore::builtin();
    let all = SearchFilter::filter(store.all(), "");
    assert_eq!(ids(&all), vec!["1", "2", "3", "4", "5", "6", "7", "8", "9"]);
}

#[test]
fn test_filter_is_a_subsequence_and_idempotent() {
    let store = OrganizationStore::builtin();
    for query in ["фонд", "ОДЕСА", "штаб", "zzz", " "] {
        let once = SearchFilter::filter(store.all(), query);
        let once_owned: Vec<Organization> = once.iter().map(|o| (*o).clone()).collect();
        let twice = SearchFilter::filter(&once_owned, query);
        assert_eq!(ids(&once), ids(&twice), "query {:?}", query);

        let indices = SearchFilter::filter_indices(store.all(), query);
        assert!(indices.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn test_services_are_not_searched() {
    let orgs = vec![Organization {
        services: "шелтер".to_string(),
        ..org("1", "Хаб", "ГО", "Херсон")
    }];
    assert!(SearchFilter::filter(&orgs, "шелтер").is_empty());
    assert_eq!(SearchFilter::filter(&orgs, "хаб").len(), 1);
}

#[test]
fn test_selection_is_shared_by_table_and_map() {
    let orgs = vec![
        org("a", "Перша", "ГО", "Одеса"),
        org("b", "Друга", "ГО", "Одеса"),
    ];
    let view: Vec<&Organization> = orgs.iter().collect();
    let mut selection = Selection::new();
    let mut table = TableAdapter::new();
    let mut map = MapAdapter::new(MapDefaults::default(), Duration::from_millis(0));

    table.click(&view, 1, &mut selection);
    assert_eq!(selection.selected_id(), Some("b"));
    map.sync(&view, &selection);

    let rows = TableAdapter::rows(&view, selection.selected_id());
    let markers = socialmap::views::map_view::markers(&view, selection.selected_id());
    assert_eq!(rows.iter().filter(|r| r.selected).count(), 1);
    assert_eq!(markers.iter().filter(|m| m.selected).count(), 1);
    assert!(rows[1].selected && markers[1].selected);

    // Clicking the marker that is already selected changes nothing
    let issued = map.transitions_issued();
    assert!(map.click_marker(&view, "b", &mut selection));
    map.sync(&view, &selection);
    assert_eq!(map.transitions_issued(), issued);
    assert_eq!(selection.selected_id(), Some("b"));
}

#[test]
fn test_selection_survives_filter_that_hides_it() {
    let store = OrganizationStore::builtin();
    let mut selection = Selection::new();
    selection.select("4");

    let visible = SearchFilter::filter(store.all(), "херсон");
    assert_eq!(selection.selected_id(), Some("4"));
    assert!(selection.resolve(&visible).is_none());

    let rows = TableAdapter::rows(&visible, selection.selected_id());
    assert!(rows.iter().all(|r| !r.selected));

    let all = SearchFilter::filter(store.all(), "");
    assert_eq!(selection.resolve(&all).map(|o| o.id.as_str()), Some("4"));
}
