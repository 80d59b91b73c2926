use bookstore_catalog::telemetry;
use bookstore_catalog::utils::devlog;
use bookstore_catalog::report;
use bookstore_catalog::{Book, NamedQuery, Order, Patch, QueryCatalog};

fn catalog() -> QueryCatalog {
    let b = |title: &str, price: f64| Book {
        title: title.into(),
        author: "Anon".into(),
        genre: "Fiction".into(),
        published_year: 2000,
        price,
        in_stock: true,
        pages: 10,
        publisher: "Acme".into(),
    };
    QueryCatalog::with_books("books", vec![b("One", 1.0), b("Two", 2.0)]).unwrap()
}

fn parsed(cap: &devlog::Capture, channel: &str) -> Vec<serde_json::Value> {
    cap.take_channel(channel).iter().map(|s| serde_json::from_str(s).unwrap()).collect()
}

#[test]
fn query_lines_carry_index_usage() {
    let cat = catalog();
    let cap = devlog::capture();
    cat.find_by_field("title", &"One".into()).unwrap();
    cat.create_index(&[("title", Order::Asc)]).unwrap();
    cat.find_by_field("title", &"Two".into()).unwrap();

    let lines = parsed(&cap, "metrics");
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["op"], "find_by_field");
    assert_eq!(lines[0]["returned"], 1);
    assert!(lines[0]["used_index"].is_null());
    assert_eq!(lines[1]["used_index"], "title_1");
    assert_eq!(lines[0]["filter_hash"].as_str().unwrap().len(), 64);
    assert_ne!(lines[0]["filter_hash"], lines[1]["filter_hash"]);
}

#[test]
fn writes_emit_audit_lines() {
    let cat = catalog();
    let before = telemetry::writes_total();
    let cap = devlog::capture();
    cat.update_one("title", &"One".into(), &Patch::set("price", 3.0).unwrap()).unwrap();
    cat.delete_one("title", &"Nope".into()).unwrap();

    let lines = parsed(&cap, "audit");
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["op"], "update");
    assert_eq!(lines[0]["key"], "One");
    assert_eq!(lines[0]["matched"], true);
    assert_eq!(lines[1]["op"], "delete");
    assert_eq!(lines[1]["matched"], false);
    assert!(telemetry::writes_total() >= before + 2);
}

#[test]
fn paging_and_grouping_reports_log_one_line_each() {
    let cat = catalog();
    let cap = devlog::capture();
    report::run(&cat, &NamedQuery::Page { page_size: 1, page_index: 1 }).unwrap();
    report::run(&cat, &NamedQuery::AveragePriceByGenre).unwrap();

    let lines = parsed(&cap, "metrics");
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["op"], "page");
    assert_eq!(lines[0]["returned"], 1);
    assert_eq!(lines[1]["op"], "group");
    assert_eq!(lines[1]["returned"], 1);
}

#[test]
fn slow_threshold_marks_queries() {
    let cat = catalog();
    let cap = devlog::capture();
    // a zero threshold marks every query slow
    telemetry::set_slow_query_ms(0);
    let _ = cat.sorted_by("price", Order::Desc).unwrap();
    telemetry::set_slow_query_ms(u64::MAX);
    let _ = cat.sorted_by("price", Order::Asc).unwrap();
    let lines = parsed(&cap, "metrics");
    assert_eq!(lines[0]["slow"], true);
    assert_eq!(lines[1]["slow"], false);
    telemetry::set_slow_query_ms(500);
}

#[test]
fn metrics_text_lists_counters() {
    let cat = catalog();
    let _ = cat.find_all();
    let _ = cat.group_by("genre", None, bookstore_catalog::GroupOrder::FirstSeen).unwrap();
    assert!(telemetry::queries_total() >= 2);
    let all = telemetry::op_stats("find_all").unwrap();
    assert!(all.calls >= 1);
    assert!(all.returned >= 2);
    let text = telemetry::metrics_text();
    for name in [
        "# TYPE bookstore_queries_total counter",
        "bookstore_queries_slow_total",
        "bookstore_index_hits_total",
        "bookstore_writes_total",
        "bookstore_op_calls_total{op=\"group\"}",
    ] {
        assert!(text.contains(name), "{name}");
    }
    let snap = telemetry::snapshot();
    assert_eq!(snap.queries_total, snap.per_op.iter().map(|(_, s)| s.calls).sum::<u64>());
}

#[test]
fn filter_hash_is_stable() {
    assert_eq!(telemetry::filter_hash("genre $eq Fiction"), telemetry::filter_hash("genre $eq Fiction"));
    assert_ne!(telemetry::filter_hash("a"), telemetry::filter_hash("b"));
}
