use bookstore_catalog::import::{ImportFormat, load_books};
use bookstore_catalog::report::{run, run_all};
use bookstore_catalog::{BUNDLED_BOOKS, NamedQuery, QueryCatalog, ReportOutput};
use bson::Bson;

fn bundled() -> QueryCatalog {
    QueryCatalog::with_books("books", load_books(BUNDLED_BOOKS.as_bytes(), ImportFormat::Json).unwrap()).unwrap()
}

fn titles(out: &ReportOutput) -> Vec<String> {
    match out {
        ReportOutput::Books(b) => b.iter().map(|b| b.title.clone()).collect(),
        other => panic!("expected books, got {other:?}"),
    }
}

#[test]
fn script_has_every_step_in_order() {
    let script = NamedQuery::bookstore_script(5);
    assert_eq!(script.len(), 17);
    assert_eq!(script[0], NamedQuery::ByGenre("Fiction".into()));
    assert_eq!(script[3], NamedQuery::UpdatePriceByTitle { title: "1984".into(), price: 13.99 });
    assert_eq!(script[10], NamedQuery::Page { page_size: 5, page_index: 1 });
    assert_eq!(script[16], NamedQuery::ExplainTitle("The Hobbit".into()));
    assert_eq!(script.iter().filter(|q| q.is_write()).count(), 4);
    assert_eq!(script[9].to_string(), "Page 1 (5 per page)");
}

#[test]
fn full_script_over_bundled_dataset() {
    let cat = bundled();
    let script = NamedQuery::bookstore_script(5);
    let results = run_all(&cat, &script).unwrap();
    assert_eq!(results.len(), script.len());
    let out = |i: usize| &results[i].1;

    assert_eq!(
        titles(out(0)),
        vec!["To Kill a Mockingbird", "The Great Gatsby", "The Catcher in the Rye", "The Alchemist", "The Midnight Library"]
    );
    assert_eq!(out(1).len(), 7);
    assert_eq!(titles(out(2)), vec!["1984", "Animal Farm"]);
    assert_eq!(*out(3), ReportOutput::Updated(true));
    assert_eq!(*out(4), ReportOutput::Deleted(true));
    assert_eq!(titles(out(5)), vec!["The Midnight Library", "Project Hail Mary"]);

    let projected = out(6).to_documents();
    assert_eq!(projected.len(), 14);
    assert_eq!(projected[0].keys().map(String::as_str).collect::<Vec<_>>(), vec!["title", "author", "price"]);
    let p1984 = projected.iter().find(|d| d.get_str("title").ok() == Some("1984")).unwrap();
    assert_eq!(p1984.get_f64("price").unwrap(), 13.99);

    let asc = titles(out(7));
    assert_eq!(asc.first().map(String::as_str), Some("Pride and Prejudice"));
    assert_eq!(asc.last().map(String::as_str), Some("The Lord of the Rings"));
    let mut desc = titles(out(8));
    desc.reverse();
    assert_eq!(desc.first(), asc.first());

    assert_eq!(
        titles(out(9)),
        vec!["To Kill a Mockingbird", "1984", "The Great Gatsby", "Brave New World", "The Hobbit"]
    );
    assert_eq!(titles(out(10))[0], "The Catcher in the Rye");
    assert_eq!(out(10).len(), 5);

    let genres = out(11).to_documents();
    assert_eq!(genres.len(), 7);
    assert_eq!(genres[0].get_str("_id").unwrap(), "Fantasy");
    assert_eq!(genres[0].get_i64("total_books").unwrap(), 2);
    assert!((genres[0].get_f64("average_price").unwrap() - 17.49).abs() < 1e-9);

    let prolific = out(12).to_documents();
    assert_eq!(prolific.len(), 1);
    assert_eq!(prolific[0].get_str("_id").unwrap(), "George Orwell");
    assert_eq!(prolific[0].get_i64("total_books").unwrap(), 2);

    let decades = out(13).to_documents();
    assert_eq!(decades[0].get("_id"), Some(&Bson::Int64(1810)));
    assert_eq!(decades.iter().map(|d| d.get_i64("count").unwrap()).sum::<i64>(), 14);

    match out(14) {
        ReportOutput::Index(h) => assert_eq!(h.name, "title_1"),
        other => panic!("{other:?}"),
    }
    let idx = out(15).to_documents();
    assert_eq!(idx[0].get_str("name").unwrap(), "author_1_published_year_-1");
    assert_eq!(idx[0].get_document("key").unwrap().get_i32("published_year").unwrap(), -1);

    match out(16) {
        ReportOutput::Explain(r) => {
            assert_eq!(r.stage, "IXSCAN");
            assert_eq!(r.index_name.as_deref(), Some("title_1"));
            assert_eq!(r.returned, 1);
        }
        other => panic!("{other:?}"),
    }
}

#[test]
fn writes_report_no_match_on_second_run() {
    let cat = bundled();
    assert_eq!(run(&cat, &NamedQuery::DeleteByTitle("Moby Dick".into())).unwrap(), ReportOutput::Deleted(true));
    let again = run(&cat, &NamedQuery::DeleteByTitle("Moby Dick".into())).unwrap();
    assert_eq!(again, ReportOutput::Deleted(false));
    assert_eq!(again.to_documents()[0].get_i64("deleted").unwrap(), 0);
}

#[test]
fn page_past_end_is_empty() {
    let cat = bundled();
    let out = run(&cat, &NamedQuery::Page { page_size: 5, page_index: 10 }).unwrap();
    assert!(out.is_empty());
    assert!(out.to_documents().is_empty());
}
