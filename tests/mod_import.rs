use bookstore_catalog::import::{ImportFormat, ImportOptions, load_books, load_books_from_path, load_books_with};
use bookstore_catalog::{BUNDLED_BOOKS, CatalogError, QueryCatalog};
use std::io::Write;
use tempfile::tempdir;

const ROW_1984: &str = r#"{"title":"1984","author":"George Orwell","genre":"Dystopian","published_year":1949,"price":10.99,"in_stock":true,"pages":328,"publisher":"Secker & Warburg"}"#;
const ROW_DUNE: &str = r#"{"title":"Dune","author":"Frank Herbert","genre":"Sci-Fi","published_year":1965,"price":15,"in_stock":false,"pages":412,"publisher":"Chilton"}"#;
const ROW_BAD: &str = r#"{"title":"Broken","author":"Nobody","genre":"Sci-Fi","published_year":"soon","price":1,"in_stock":true,"pages":1,"publisher":"X"}"#;

#[test]
fn json_array_and_ndjson() {
    let arr = format!("[{ROW_1984},{ROW_DUNE}]");
    let books = load_books(arr.as_bytes(), ImportFormat::Json).unwrap();
    assert_eq!(books.len(), 2);
    assert_eq!(books[1].price, 15.0);

    let nd = format!("{ROW_1984}\n\n{ROW_DUNE}\n");
    let books = load_books(nd.as_bytes(), ImportFormat::Ndjson).unwrap();
    assert_eq!(books.iter().map(|b| b.title.as_str()).collect::<Vec<_>>(), vec!["1984", "Dune"]);
}

#[test]
fn auto_detects_from_content() {
    let arr = format!("  [{ROW_DUNE}]");
    assert_eq!(load_books(arr.as_bytes(), ImportFormat::Auto).unwrap().len(), 1);
    let nd = format!("{ROW_DUNE}\n{ROW_1984}\n");
    assert_eq!(load_books(nd.as_bytes(), ImportFormat::Auto).unwrap().len(), 2);
}

#[test]
fn invalid_record_aborts_with_record_number() {
    let nd = format!("{ROW_1984}\n{ROW_BAD}\n");
    match load_books(nd.as_bytes(), ImportFormat::Ndjson) {
        Err(CatalogError::Validation { field, reason }) => {
            assert_eq!(field, "published_year");
            assert!(reason.starts_with("record 2:"), "{reason}");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn skip_errors_counts_skipped() {
    let nd = format!("{ROW_1984}\n{ROW_BAD}\n{ROW_DUNE}\n");
    let opts = ImportOptions { skip_errors: true, ..ImportOptions::default() };
    let (books, report) = load_books_with(nd.as_bytes(), ImportFormat::Ndjson, &opts).unwrap();
    assert_eq!(books.len(), 2);
    assert_eq!(report.loaded, 2);
    assert_eq!(report.skipped, 1);
}

#[test]
fn non_object_rows_are_rejected() {
    assert!(matches!(load_books("[1, 2]".as_bytes(), ImportFormat::Json), Err(CatalogError::Validation { .. })));
    assert!(matches!(load_books("{\"a\": 1}".as_bytes(), ImportFormat::Json), Err(CatalogError::Validation { .. })));
    assert!(matches!(load_books("[{".as_bytes(), ImportFormat::Json), Err(CatalogError::Json(_))));
}

#[test]
fn csv_cells_are_typed_by_column() {
    let csv = "title,author,genre,published_year,price,in_stock,pages,publisher\n\
               Dune,Frank Herbert,Sci-Fi,1965,15.5,yes,412,Chilton\n\
               \"Emma, Vol. 1\",Jane Austen,Romance,1815,7,false,474,John Murray\n";
    let books = load_books(csv.as_bytes(), ImportFormat::Csv).unwrap();
    assert_eq!(books.len(), 2);
    assert!(books[0].in_stock);
    assert_eq!(books[0].published_year, 1965);
    assert_eq!(books[1].title, "Emma, Vol. 1");
    assert_eq!(books[1].price, 7.0);

    let bad = "title,author,genre,published_year,price,in_stock,pages,publisher\nX,Y,Z,abc,1,true,1,P\n";
    assert!(matches!(
        load_books(bad.as_bytes(), ImportFormat::Csv),
        Err(CatalogError::Validation { ref field, .. }) if field == "published_year"
    ));
}

#[test]
fn load_from_path_uses_extension() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("books.ndjson");
    let mut f = std::fs::File::create(&path).unwrap();
    writeln!(f, "{ROW_1984}").unwrap();
    writeln!(f, "{ROW_DUNE}").unwrap();
    drop(f);
    let (books, report) = load_books_from_path(&path, &ImportOptions::default()).unwrap();
    assert_eq!(books.len(), 2);
    assert_eq!(report.loaded, 2);

    let missing = dir.path().join("nope.json");
    assert!(matches!(load_books_from_path(&missing, &ImportOptions::default()), Err(CatalogError::Io(_))));
}

#[test]
fn bundled_dataset_loads_and_feeds_a_catalog() {
    let books = load_books(BUNDLED_BOOKS.as_bytes(), ImportFormat::Json).unwrap();
    let cat = QueryCatalog::with_books("books", books).unwrap();
    assert!(cat.len() >= 12);
    assert_eq!(cat.find_by_field("title", &"The Hobbit".into()).unwrap().len(), 1);
    assert_eq!(cat.find_by_field("title", &"Moby Dick".into()).unwrap().len(), 1);
    assert_eq!(cat.find_by_field("author", &"George Orwell".into()).unwrap().len(), 2);
}
