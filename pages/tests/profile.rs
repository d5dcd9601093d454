mod common;

use catalog::Session;
use common::MemoryCatalog;
use pages::ProfilePage;

#[test]
fn anonymous_sessions_have_no_dashboard() {
    let store = MemoryCatalog::new();
    let session = Session::anonymous();

    assert!(ProfilePage::load(&store, &session).is_err());
}

#[test]
fn missing_profile_is_fatal() {
    let store = MemoryCatalog::new();
    let session = Session::signed_in(999);

    assert!(ProfilePage::load(&store, &session).is_err());
}

#[test]
fn dashboard_counts_and_member_since() {
    let store = MemoryCatalog::new();
    let kevin = store.add_profile("Kevin", "kevin@example.com");
    let ana = store.add_profile("Ana", "ana@example.com");

    let dune = store.seed_book("Dune", "Frank Herbert", "Science Fiction", kevin);
    store.seed_book("Emma", "Jane Austen", "Romance", kevin);
    let foundation = store.seed_book("Foundation", "Isaac Asimov", "Science Fiction", ana);

    store.seed_review(dune, ana, 5);
    store.seed_review(foundation, kevin, 4);

    let session = Session::signed_in(kevin);
    let page = ProfilePage::load(&store, &session).unwrap();

    assert_eq!(page.profile().name, "Kevin");
    assert_eq!(page.books_added(), 2);
    assert_eq!(page.reviews_written(), 1);
    assert_eq!(page.member_since(), 1970);
}

#[test]
fn authored_books_carry_their_aggregates() {
    let store = MemoryCatalog::new();
    let kevin = store.add_profile("Kevin", "kevin@example.com");
    let ana = store.add_profile("Ana", "ana@example.com");
    let bruno = store.add_profile("Bruno", "bruno@example.com");

    let dune = store.seed_book("Dune", "Frank Herbert", "Science Fiction", kevin);
    store.seed_book("Emma", "Jane Austen", "Romance", kevin);

    store.seed_review(dune, ana, 5);
    store.seed_review(dune, bruno, 4);

    let session = Session::signed_in(kevin);
    let page = ProfilePage::load(&store, &session).unwrap();

    // Newest first: Emma was added after Dune
    assert_eq!(page.books()[0].book.title, "Emma");
    assert_eq!(page.books()[0].badge(), None);

    assert_eq!(page.books()[1].book.title, "Dune");
    assert_eq!(page.books()[1].badge().unwrap(), "4.5 (2 reviews)");
}

#[test]
fn authored_reviews_carry_the_parent_book() {
    let store = MemoryCatalog::new();
    let kevin = store.add_profile("Kevin", "kevin@example.com");
    let ana = store.add_profile("Ana", "ana@example.com");

    let dune = store.seed_book("Dune", "Frank Herbert", "Science Fiction", ana);
    let emma = store.seed_book("Emma", "Jane Austen", "Romance", ana);

    store.seed_review(dune, kevin, 5);
    store.seed_review(emma, kevin, 3);

    let session = Session::signed_in(kevin);
    let page = ProfilePage::load(&store, &session).unwrap();

    assert_eq!(page.reviews_written(), 2);

    // Newest first
    assert_eq!(page.reviews()[0].book_title, "Emma");
    assert_eq!(page.reviews()[0].book_author, "Jane Austen");
    assert_eq!(page.reviews()[1].book_title, "Dune");
}
