//! Service-level tests against a throwaway PostgreSQL database.
//!
//! Each test gets a fresh database from `#[sqlx::test]`; they need `DATABASE_URL`
//! to point at a server where the test user may create databases.
//! Run with: cargo test -- --ignored

use library_server::{
    models::{
        book::{Book, BookQueryConditions, NewBook, SortColumn, SortOrder, UpdateBook},
        borrow::{BookReturn, NewBorrow},
        card::{CardType, NewCard},
    },
    repository::Repository,
    services::Services,
    AppError,
};
use sqlx::PgPool;
use tokio_test::{assert_err, assert_ok};

fn services(pool: PgPool) -> Services {
    Services::new(Repository::new(pool))
}

fn book(title: &str, price: f64, stock: i32) -> NewBook {
    NewBook {
        category: "Computer Science".to_string(),
        title: title.to_string(),
        press: "Higher Education Press".to_string(),
        publish_year: 2020,
        author: "Knuth".to_string(),
        price,
        stock,
    }
}

fn card(name: &str, card_type: CardType) -> NewCard {
    NewCard {
        name: name.to_string(),
        department: "Computer Science".to_string(),
        card_type,
    }
}

fn borrow(card_id: i32, book_id: i32, borrow_time: i64) -> NewBorrow {
    NewBorrow {
        card_id,
        book_id,
        borrow_time,
    }
}

fn give_back(card_id: i32, book_id: i32, return_time: i64) -> BookReturn {
    BookReturn {
        card_id,
        book_id,
        return_time,
    }
}

async fn stock_of(services: &Services, book_id: i32) -> i32 {
    services.catalog.get_book(book_id).await.unwrap().stock
}

async fn book_count(services: &Services) -> usize {
    services
        .catalog
        .query_books(&BookQueryConditions::default())
        .await
        .unwrap()
        .count
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_store_then_query_returns_book(pool: PgPool) {
    let services = services(pool);

    let stored = book("TAOCP", 99.5, 3);
    let id = assert_ok!(services.catalog.store_book(stored.clone()).await);

    let results = services
        .catalog
        .query_books(&BookQueryConditions::default())
        .await
        .unwrap();

    assert_eq!(results.count, 1);
    assert_eq!(
        results.results,
        vec![Book {
            book_id: id,
            category: stored.category,
            title: stored.title,
            press: stored.press,
            publish_year: stored.publish_year,
            author: stored.author,
            price: stored.price,
            stock: stored.stock,
        }]
    );
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_overlong_text_is_rejected_before_storage(pool: PgPool) {
    let services = services(pool);

    let err = assert_err!(services.catalog.store_book(book(&"x".repeat(64), 10.0, 1)).await);
    assert!(matches!(err, AppError::Validation(_)), "{:?}", err);
    assert_eq!(book_count(&services).await, 0);

    let id = assert_ok!(services.catalog.store_book(book(&"x".repeat(63), 10.0, 1)).await);
    let update = UpdateBook {
        category: "Computer Science".to_string(),
        title: "x".repeat(63),
        press: "p".repeat(64),
        publish_year: 2020,
        author: "Knuth".to_string(),
        price: 10.0,
    };
    let err = assert_err!(services.catalog.modify_book_info(id, update).await);
    assert!(matches!(err, AppError::Validation(_)), "{:?}", err);

    let err = assert_err!(
        services
            .cards
            .register_card(card(&"n".repeat(64), CardType::Student))
            .await
    );
    assert!(matches!(err, AppError::Validation(_)), "{:?}", err);
    assert_eq!(services.cards.show_cards().await.unwrap().count, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_store_duplicate_book_conflicts(pool: PgPool) {
    let services = services(pool);

    assert_ok!(services.catalog.store_book(book("SICP", 40.0, 1)).await);
    let err = assert_err!(services.catalog.store_book(book("SICP", 55.0, 9)).await);

    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(book_count(&services).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_store_rejects_negative_price_or_stock(pool: PgPool) {
    let services = services(pool);

    let err = assert_err!(services.catalog.store_book(book("Bad price", -1.0, 1)).await);
    assert!(matches!(err, AppError::Validation(_)));

    let err = assert_err!(services.catalog.store_book(book("Bad stock", 1.0, -1)).await);
    assert!(matches!(err, AppError::Validation(_)));

    assert_eq!(book_count(&services).await, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_batch_with_existing_duplicate_stores_nothing(pool: PgPool) {
    let services = services(pool);

    assert_ok!(services.catalog.store_book(book("Existing", 10.0, 1)).await);

    let err = assert_err!(
        services
            .catalog
            .store_books(vec![
                book("Fresh one", 10.0, 1),
                book("Fresh two", 10.0, 1),
                book("Existing", 12.0, 5),
            ])
            .await
    );

    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(book_count(&services).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_batch_with_internal_duplicate_stores_nothing(pool: PgPool) {
    let services = services(pool);

    let err = assert_err!(
        services
            .catalog
            .store_books(vec![book("Twice", 10.0, 1), book("Twice", 10.0, 1)])
            .await
    );

    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(book_count(&services).await, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_batch_returns_ids_in_input_order(pool: PgPool) {
    let services = services(pool);

    let empty = assert_ok!(services.catalog.store_books(Vec::new()).await);
    assert!(empty.is_empty());

    let ids = assert_ok!(
        services
            .catalog
            .store_books(vec![book("First", 1.0, 1), book("Second", 2.0, 2)])
            .await
    );

    assert_eq!(ids.len(), 2);
    assert_eq!(services.catalog.get_book(ids[0]).await.unwrap().title, "First");
    assert_eq!(services.catalog.get_book(ids[1]).await.unwrap().title, "Second");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_stock_never_goes_negative(pool: PgPool) {
    let services = services(pool);
    let id = services.catalog.store_book(book("Stocked", 5.0, 2)).await.unwrap();

    assert_eq!(assert_ok!(services.catalog.inc_book_stock(id, 3).await), 5);
    assert_eq!(assert_ok!(services.catalog.inc_book_stock(id, -5).await), 0);

    let err = assert_err!(services.catalog.inc_book_stock(id, -1).await);
    assert!(matches!(err, AppError::InvalidState(_)));
    assert_eq!(stock_of(&services, id).await, 0);

    let err = assert_err!(services.catalog.inc_book_stock(id + 1000, 1).await);
    assert!(matches!(err, AppError::NotFound(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_single_copy_borrow_scenario(pool: PgPool) {
    let services = services(pool);
    let book_id = services.catalog.store_book(book("Only copy", 20.0, 1)).await.unwrap();
    let first = services.cards.register_card(card("Alice", CardType::Student)).await.unwrap();
    let second = services.cards.register_card(card("Bob", CardType::Teacher)).await.unwrap();

    assert_ok!(services.loans.borrow_book(borrow(first, book_id, 100)).await);
    assert_eq!(stock_of(&services, book_id).await, 0);

    let err = assert_err!(services.loans.borrow_book(borrow(second, book_id, 110)).await);
    assert!(matches!(err, AppError::InvalidState(_)));

    let err = assert_err!(services.loans.borrow_book(borrow(first, book_id, 120)).await);
    assert!(matches!(err, AppError::Conflict(_)));

    let err = assert_err!(services.loans.return_book(give_back(first, book_id, 50)).await);
    assert!(matches!(err, AppError::InvalidState(_)));
    assert_eq!(stock_of(&services, book_id).await, 0);

    assert_ok!(services.loans.return_book(give_back(first, book_id, 200)).await);
    assert_eq!(stock_of(&services, book_id).await, 1);

    assert_ok!(services.loans.borrow_book(borrow(second, book_id, 300)).await);
    assert_eq!(stock_of(&services, book_id).await, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_reborrow_at_same_time_after_return(pool: PgPool) {
    let services = services(pool);
    let book_id = services.catalog.store_book(book("Returned", 20.0, 1)).await.unwrap();
    let card_id = services.cards.register_card(card("Oscar", CardType::Student)).await.unwrap();

    services.loans.borrow_book(borrow(card_id, book_id, 100)).await.unwrap();
    services.loans.return_book(give_back(card_id, book_id, 200)).await.unwrap();

    let err = assert_err!(services.loans.borrow_book(borrow(card_id, book_id, 100)).await);
    match err {
        AppError::Conflict(message) => assert!(!message.contains("not been returned"), "{}", message),
        other => panic!("expected conflict, got {:?}", other),
    }
    assert_eq!(stock_of(&services, book_id).await, 1);

    assert_ok!(services.loans.borrow_book(borrow(card_id, book_id, 300)).await);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_borrow_missing_book_or_card(pool: PgPool) {
    let services = services(pool);
    let book_id = services.catalog.store_book(book("Present", 20.0, 1)).await.unwrap();
    let card_id = services.cards.register_card(card("Carol", CardType::Student)).await.unwrap();

    let err = assert_err!(services.loans.borrow_book(borrow(card_id, book_id + 1000, 100)).await);
    assert!(matches!(err, AppError::NotFound(_)));

    let err = assert_err!(services.loans.borrow_book(borrow(card_id + 1000, book_id, 100)).await);
    assert!(matches!(err, AppError::NotFound(_)));

    assert_eq!(stock_of(&services, book_id).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_return_without_borrow_is_not_found(pool: PgPool) {
    let services = services(pool);
    let book_id = services.catalog.store_book(book("Never lent", 20.0, 1)).await.unwrap();
    let card_id = services.cards.register_card(card("Dave", CardType::Student)).await.unwrap();

    let err = assert_err!(services.loans.return_book(give_back(card_id, book_id, 100)).await);
    assert!(matches!(err, AppError::NotFound(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_concurrent_borrows_of_last_copy(pool: PgPool) {
    let services = services(pool);
    let book_id = services.catalog.store_book(book("Contended", 20.0, 1)).await.unwrap();
    let mut card_ids = Vec::new();
    for name in ["Erin", "Frank", "Grace", "Heidi"] {
        card_ids.push(services.cards.register_card(card(name, CardType::Student)).await.unwrap());
    }

    let handles: Vec<_> = card_ids
        .into_iter()
        .map(|card_id| {
            let services = services.clone();
            tokio::spawn(async move { services.loans.borrow_book(borrow(card_id, book_id, 100)).await })
        })
        .collect();

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => succeeded += 1,
            Err(err) => assert!(matches!(err, AppError::InvalidState(_)), "{:?}", err),
        }
    }

    assert_eq!(succeeded, 1);
    assert_eq!(stock_of(&services, book_id).await, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_remove_book_with_outstanding_borrow(pool: PgPool) {
    let services = services(pool);
    let book_id = services.catalog.store_book(book("Held", 20.0, 2)).await.unwrap();
    let card_id = services.cards.register_card(card("Ivan", CardType::Teacher)).await.unwrap();
    services.loans.borrow_book(borrow(card_id, book_id, 100)).await.unwrap();

    let err = assert_err!(services.catalog.remove_book(book_id).await);
    assert!(matches!(err, AppError::Conflict(_)));

    services.loans.return_book(give_back(card_id, book_id, 200)).await.unwrap();
    assert_ok!(services.catalog.remove_book(book_id).await);

    let err = assert_err!(services.catalog.remove_book(book_id).await);
    assert!(matches!(err, AppError::NotFound(_)));

    // History joins the book table, so a removed book drops out of it
    let history = services.loans.borrow_history(card_id).await.unwrap();
    assert_eq!(history.count, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_modify_book_info(pool: PgPool) {
    let services = services(pool);
    let id = services.catalog.store_book(book("Draft", 20.0, 4)).await.unwrap();
    services.catalog.store_book(book("Taken", 20.0, 1)).await.unwrap();

    let update = |title: &str| UpdateBook {
        category: "Computer Science".to_string(),
        title: title.to_string(),
        press: "Higher Education Press".to_string(),
        publish_year: 2020,
        author: "Knuth".to_string(),
        price: 35.0,
    };

    let updated = assert_ok!(services.catalog.modify_book_info(id, update("Final")).await);
    assert_eq!(updated.title, "Final");
    assert_eq!(updated.price, 35.0);
    assert_eq!(updated.stock, 4);

    // Re-saving its own identity is not a conflict
    assert_ok!(services.catalog.modify_book_info(id, update("Final")).await);

    let err = assert_err!(services.catalog.modify_book_info(id, update("Taken")).await);
    assert!(matches!(err, AppError::Conflict(_)));

    let err = assert_err!(services.catalog.modify_book_info(id + 1000, update("Ghost")).await);
    assert!(matches!(err, AppError::NotFound(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_query_price_range_sorted(pool: PgPool) {
    let services = services(pool);
    for (title, price) in [("Ten", 10.0), ("Thirty", 30.0), ("Twenty", 20.0), ("Fifty", 50.0)] {
        services.catalog.store_book(book(title, price, 1)).await.unwrap();
    }

    let mut conditions = BookQueryConditions {
        min_price: Some(15.0),
        max_price: Some(40.0),
        sort_by: SortColumn::Price,
        sort_order: SortOrder::Asc,
        ..Default::default()
    };

    let ascending = services.catalog.query_books(&conditions).await.unwrap();
    let prices: Vec<f64> = ascending.results.iter().map(|b| b.price).collect();
    assert_eq!(prices, vec![20.0, 30.0]);

    conditions.sort_order = SortOrder::Desc;
    let descending = services.catalog.query_books(&conditions).await.unwrap();
    let prices: Vec<f64> = descending.results.iter().map(|b| b.price).collect();
    assert_eq!(prices, vec![30.0, 20.0]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_query_equal_sort_keys_break_ties_by_id(pool: PgPool) {
    let services = services(pool);
    let ids = services
        .catalog
        .store_books(vec![
            book("Tie later", 25.0, 1),
            book("Cheap", 5.0, 1),
            book("Tie earlier", 25.0, 1),
            book("Dear", 35.0, 1),
        ])
        .await
        .unwrap();
    let (first_tie, second_tie, dear) = (ids[0], ids[2], ids[3]);

    let mut conditions = BookQueryConditions {
        min_price: Some(20.0),
        max_price: Some(40.0),
        sort_by: SortColumn::Price,
        sort_order: SortOrder::Asc,
        ..Default::default()
    };

    let ascending = services.catalog.query_books(&conditions).await.unwrap();
    let order: Vec<i32> = ascending.results.iter().map(|b| b.book_id).collect();
    assert_eq!(order, vec![first_tie, second_tie, dear]);

    // Descending applies to the sort column only; ties stay in ascending id order
    conditions.sort_order = SortOrder::Desc;
    let descending = services.catalog.query_books(&conditions).await.unwrap();
    let order: Vec<i32> = descending.results.iter().map(|b| b.book_id).collect();
    assert_eq!(order, vec![dear, first_tie, second_tie]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_query_matches_substrings_literally(pool: PgPool) {
    let services = services(pool);
    services.catalog.store_book(book("100% Rust", 10.0, 1)).await.unwrap();
    services.catalog.store_book(book("1000 Rust tips", 10.0, 1)).await.unwrap();
    services.catalog.store_book(book("Rust in Action", 10.0, 1)).await.unwrap();

    let percent = services
        .catalog
        .query_books(&BookQueryConditions {
            title: Some("0%".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(percent.count, 1);
    assert_eq!(percent.results[0].title, "100% Rust");

    // Case-sensitive
    let lower = services
        .catalog
        .query_books(&BookQueryConditions {
            title: Some("rust".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(lower.count, 0);

    let combined = services
        .catalog
        .query_books(&BookQueryConditions {
            title: Some("Rust".to_string()),
            category: Some("Computer Science".to_string()),
            min_publish_year: Some(2020),
            max_publish_year: Some(2020),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(combined.count, 3);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_card_lifecycle(pool: PgPool) {
    let services = services(pool);

    let alice = assert_ok!(services.cards.register_card(card("Alice", CardType::Student)).await);
    let err = assert_err!(services.cards.register_card(card("Alice", CardType::Student)).await);
    assert!(matches!(err, AppError::Conflict(_)));

    // Same name with another type is a different card
    let teacher = assert_ok!(services.cards.register_card(card("Alice", CardType::Teacher)).await);

    let err = assert_err!(services.cards.modify_card(teacher, card("Alice", CardType::Student)).await);
    assert!(matches!(err, AppError::Conflict(_)));

    assert_ok!(services.cards.modify_card(teacher, card("Alicia", CardType::Teacher)).await);

    let err = assert_err!(services.cards.modify_card(teacher + 1000, card("Nobody", CardType::Student)).await);
    assert!(matches!(err, AppError::NotFound(_)));

    let cards = services.cards.show_cards().await.unwrap();
    assert_eq!(cards.count, 2);
    assert_eq!(cards.cards[0].card_id, alice);
    assert_eq!(cards.cards[1].name, "Alicia");
    assert_eq!(cards.cards[1].card_type, CardType::Teacher);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_remove_card_with_outstanding_borrow(pool: PgPool) {
    let services = services(pool);
    let book_id = services.catalog.store_book(book("Lent", 20.0, 1)).await.unwrap();
    let card_id = services.cards.register_card(card("Judy", CardType::Student)).await.unwrap();
    services.loans.borrow_book(borrow(card_id, book_id, 100)).await.unwrap();

    let err = assert_err!(services.cards.remove_card(card_id).await);
    assert!(matches!(err, AppError::Conflict(_)));

    services.loans.return_book(give_back(card_id, book_id, 200)).await.unwrap();
    assert_ok!(services.cards.remove_card(card_id).await);

    let err = assert_err!(services.cards.remove_card(card_id).await);
    assert!(matches!(err, AppError::NotFound(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_borrow_history_newest_first(pool: PgPool) {
    let services = services(pool);
    let first = services.catalog.store_book(book("Older", 10.0, 2)).await.unwrap();
    let second = services.catalog.store_book(book("Newer", 10.0, 2)).await.unwrap();
    let card_id = services.cards.register_card(card("Mallory", CardType::Student)).await.unwrap();

    services.loans.borrow_book(borrow(card_id, first, 100)).await.unwrap();
    services.loans.return_book(give_back(card_id, first, 150)).await.unwrap();
    services.loans.borrow_book(borrow(card_id, second, 200)).await.unwrap();

    let history = services.loans.borrow_history(card_id).await.unwrap();
    assert_eq!(history.count, 2);
    assert_eq!(history.items[0].book_id, second);
    assert_eq!(history.items[0].return_time, 0);
    assert_eq!(history.items[1].book_id, first);
    assert_eq!(history.items[1].return_time, 150);
    assert_eq!(history.items[1].title, "Older");

    let unknown = services.loans.borrow_history(card_id + 1000).await.unwrap();
    assert_eq!(unknown.count, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_reset_database_empties_tables(pool: PgPool) {
    let services = services(pool);
    let book_id = services.catalog.store_book(book("Gone soon", 10.0, 1)).await.unwrap();
    let card_id = services.cards.register_card(card("Niaj", CardType::Teacher)).await.unwrap();
    services.loans.borrow_book(borrow(card_id, book_id, 100)).await.unwrap();

    assert_ok!(services.admin.reset_database().await);

    assert_eq!(book_count(&services).await, 0);
    assert_eq!(services.cards.show_cards().await.unwrap().count, 0);
    assert_eq!(services.loans.borrow_history(card_id).await.unwrap().count, 0);

    // Tables are usable again after the reset
    assert_ok!(services.catalog.store_book(book("Fresh start", 10.0, 1)).await);
}
