use bookstore_catalog::index::IndexHandle;
use bookstore_catalog::{Book, CatalogError, Order, QueryCatalog};
use bson::Bson;

fn book(title: &str, author: &str, year: i64, price: f64) -> Book {
    Book {
        title: title.into(),
        author: author.into(),
        genre: "Fiction".into(),
        published_year: year,
        price,
        in_stock: true,
        pages: 250,
        publisher: "Acme".into(),
    }
}

fn catalog() -> QueryCatalog {
    QueryCatalog::with_books(
        "books",
        vec![
            book("The Hobbit", "J.R.R. Tolkien", 1937, 14.99),
            book("1984", "George Orwell", 1949, 10.99),
            book("Animal Farm", "George Orwell", 1945, 8.5),
            book("The Silmarillion", "J.R.R. Tolkien", 1977, 14.99),
            book("Emma", "Jane Austen", 1815, 7.99),
        ],
    )
    .unwrap()
}

fn titles(books: &[Book]) -> Vec<&str> {
    books.iter().map(|b| b.title.as_str()).collect()
}

#[test]
fn index_names_follow_direction_suffixes() {
    let h = IndexHandle::from_spec(&[("author", Order::Asc), ("published_year", Order::Desc)]).unwrap();
    assert_eq!(h.name, "author_1_published_year_-1");
    assert!(matches!(IndexHandle::from_spec(&[]), Err(CatalogError::Query(_))));
    assert!(matches!(
        IndexHandle::from_spec(&[("title", Order::Asc), ("title", Order::Desc)]),
        Err(CatalogError::Query(_))
    ));
    assert!(matches!(IndexHandle::from_spec(&[("isbn", Order::Asc)]), Err(CatalogError::InvalidField(_))));
}

#[test]
fn explain_switches_from_collscan_to_ixscan() {
    let cat = catalog();
    let before = cat.explain_find("title", &"The Hobbit".into()).unwrap();
    assert_eq!(before.stage, "COLLSCAN");
    assert_eq!(before.docs_examined, 5);
    assert_eq!(before.returned, 1);
    assert_eq!(before.index_name, None);

    let h = cat.create_index(&[("title", Order::Asc)]).unwrap();
    let after = cat.explain_find("title", &"The Hobbit".into()).unwrap();
    assert_eq!(after.stage, "IXSCAN");
    assert_eq!(after.index_name.as_deref(), Some(h.name.as_str()));
    assert_eq!(after.keys_examined, 1);
    assert_eq!(after.docs_examined, 1);
    assert_eq!(after.returned, 1);
}

#[test]
fn indexed_results_match_scan() {
    let cat = catalog();
    let scan = cat.find_by_field("author", &"George Orwell".into()).unwrap();
    cat.create_index(&[("author", Order::Asc), ("published_year", Order::Desc)]).unwrap();
    let indexed = cat.find_by_field("author", &"George Orwell".into()).unwrap();
    assert_eq!(scan, indexed);
    assert_eq!(titles(&indexed), vec!["1984", "Animal Farm"]);

    cat.create_index(&[("price", Order::Asc)]).unwrap();
    let cheap = catalog().find_by_field("price", &Bson::Double(14.99)).unwrap();
    assert_eq!(cat.find_by_field("price", &Bson::Double(14.99)).unwrap(), cheap);
    // integer probe against a decimal field
    assert!(cat.find_by_field("price", &Bson::Int32(15)).unwrap().is_empty());
    assert!(cat.find_by_field("price", &"14.99".into()).unwrap().is_empty());
}

#[test]
fn sort_through_index_matches_stable_sort() {
    let cat = catalog();
    let plain_asc = cat.sorted_by("price", Order::Asc).unwrap();
    let plain_desc = cat.sorted_by("price", Order::Desc).unwrap();
    cat.create_index(&[("price", Order::Desc)]).unwrap();
    assert_eq!(cat.sorted_by("price", Order::Asc).unwrap(), plain_asc);
    assert_eq!(cat.sorted_by("price", Order::Desc).unwrap(), plain_desc);
    assert_eq!(titles(&plain_desc), vec!["The Hobbit", "The Silmarillion", "1984", "Animal Farm", "Emma"]);
}

#[test]
fn indexes_follow_writes() {
    let cat = catalog();
    cat.create_index(&[("title", Order::Asc)]).unwrap();
    cat.insert_book(book("Persuasion", "Jane Austen", 1817, 6.5)).unwrap();
    assert_eq!(cat.find_by_field("title", &"Persuasion".into()).unwrap().len(), 1);

    let patch = bookstore_catalog::Patch::set("title", "Nineteen Eighty-Four").unwrap();
    assert!(cat.update_one("title", &"1984".into(), &patch).unwrap());
    assert!(cat.find_by_field("title", &"1984".into()).unwrap().is_empty());
    assert_eq!(cat.find_by_field("title", &"Nineteen Eighty-Four".into()).unwrap().len(), 1);

    assert!(cat.delete_one("title", &"Emma".into()).unwrap());
    assert!(cat.find_by_field("title", &"Emma".into()).unwrap().is_empty());

    let stats = cat.index_stats("title_1").unwrap();
    assert_eq!(stats.entries, cat.len());
    assert_eq!(stats.keys, cat.len());
}

#[test]
fn create_is_idempotent_and_drop_restores_scan() {
    let cat = catalog();
    let a = cat.create_index(&[("title", Order::Asc)]).unwrap();
    let b = cat.create_index(&[("title", Order::Asc)]).unwrap();
    assert_eq!(a, b);
    assert_eq!(cat.list_indexes().len(), 1);
    assert!(cat.drop_index(&a.name));
    assert!(!cat.drop_index(&a.name));
    assert!(cat.list_indexes().is_empty());
    assert_eq!(cat.explain_find("title", &"Emma".into()).unwrap().stage, "COLLSCAN");
}

#[test]
fn stats_count_hits_and_misses() {
    let cat = catalog();
    cat.create_index(&[("author", Order::Asc)]).unwrap();
    let _ = cat.find_by_field("author", &"Jane Austen".into()).unwrap();
    let _ = cat.find_by_field("author", &"Nobody".into()).unwrap();
    let s = cat.index_stats("author_1").unwrap();
    assert_eq!(s.hits, 1);
    assert_eq!(s.misses, 1);
    assert_eq!(s.keys, 3);
    assert!(cat.index_stats("missing").is_none());
}
