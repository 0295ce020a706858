use criterion::{black_box, criterion_group, criterion_main, Criterion};
use socialmap::data::{Organization, OrganizationStore};
use socialmap::search_filter::{FilterState, SearchFilter};

/// Built-in records repeated with fresh ids
fn large_registry(copies: usize) -> Vec<Organization> {
    let base = OrganizationStore::builtin();
    (0..copies)
        .flat_map(|n| {
            base.all().iter().map(move |org| Organization {
                id: format!("{}-{}", org.id, n),
                ..org.clone()
            })
        })
        .collect()
}

fn bench_filter(c: &mut Criterion) {
    let orgs = large_registry(1000);

    c.bench_function("filter_empty_query", |b| {
        b.iter(|| SearchFilter::filter(black_box(&orgs), black_box("")))
    });

    c.bench_function("filter_city", |b| {
        b.iter(|| SearchFilter::filter(black_box(&orgs), black_box("миколаїв")))
    });

    c.bench_function("filter_typing_session", |b| {
        b.iter(|| {
            let mut state = FilterState::new(&orgs, 0);
            for query in ["б", "бл", "бла", "благ", "благо", "благод"] {
                state.set_query(&orgs, black_box(query));
            }
            state.visible_indices().len()
        })
    });
}

criterion_group!(benches, bench_filter);
criterion_main!(benches);
