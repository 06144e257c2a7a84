//! Postgres-backed reservation flow tests
//!
//! These exercise the locking and rollback behavior against a real store and
//! need `DATABASE_URL` pointing at a PostgreSQL instance, so they are ignored
//! by default:
//!
//! ```sh
//! DATABASE_URL=postgres://localhost/mesa_test cargo test -- --ignored
//! ```
//!
//! Each test seeds its own restaurant and slots, so tests can run against a
//! shared database without interfering.

use chrono::{NaiveDate, NaiveTime};
use sqlx::PgPool;

use mesa::booking::{self, BookingRequest};
use mesa::error::ErrorCode;
use mesa::search::{self, SearchFilters};

async fn test_pool() -> PgPool {
    let _ = dotenvy::dotenv();
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for these tests");
    let pool = PgPool::connect(&url).await.expect("connect");
    sqlx::migrate!("./migrations").run(&pool).await.expect("migrate");
    pool
}

fn slot_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 24).unwrap()
}

fn slot_time() -> NaiveTime {
    NaiveTime::from_hms_opt(19, 0, 0).unwrap()
}

/// Unique marker so each test only sees its own rows
fn unique_tag(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{prefix}-{nanos}")
}

async fn seed_restaurant(pool: &PgPool, cuisine: &str) -> i64 {
    let row: (i64,) = sqlx::query_as(
        "INSERT INTO restaurants (name, city, cuisine, price) VALUES ($1, $2, $3, '$$')
         RETURNING restaurant_id",
    )
    .bind(unique_tag("Trattoria"))
    .bind("Madrid")
    .bind(cuisine)
    .fetch_one(pool)
    .await
    .expect("seed restaurant");
    row.0
}

async fn seed_counter_slot(pool: &PgPool, restaurant_id: i64, seats: i32) -> i64 {
    let row: (i64,) = sqlx::query_as(
        "INSERT INTO availability (restaurant_id, date, time, available_seats)
         VALUES ($1, $2, $3, $4) RETURNING availability_id",
    )
    .bind(restaurant_id)
    .bind(slot_date())
    .bind(slot_time())
    .bind(seats)
    .fetch_one(pool)
    .await
    .expect("seed counter slot");
    row.0
}

async fn seed_binary_slot(pool: &PgPool, restaurant_id: i64) -> i64 {
    let row: (i64,) = sqlx::query_as(
        "INSERT INTO availability (restaurant_id, date, time, is_available)
         VALUES ($1, $2, $3, TRUE) RETURNING availability_id",
    )
    .bind(restaurant_id)
    .bind(slot_date())
    .bind(slot_time())
    .fetch_one(pool)
    .await
    .expect("seed binary slot");
    row.0
}

async fn remaining_seats(pool: &PgPool, availability_id: i64) -> i32 {
    let row: (Option<i32>,) =
        sqlx::query_as("SELECT available_seats FROM availability WHERE availability_id = $1")
            .bind(availability_id)
            .fetch_one(pool)
            .await
            .expect("read seats");
    row.0.expect("counter slot")
}

async fn reservation_count(pool: &PgPool, availability_id: i64) -> i64 {
    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM reservations WHERE availability_id = $1")
            .bind(availability_id)
            .fetch_one(pool)
            .await
            .expect("count reservations");
    row.0
}

fn book_request(restaurant_id: i64, availability_id: i64, guest: &str, party: i32) -> BookingRequest {
    BookingRequest {
        restaurant_id,
        availability_id: Some(availability_id),
        date: None,
        time: None,
        guest_name: guest.to_string(),
        party_size: party,
    }
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance at DATABASE_URL"]
async fn test_no_overbooking_under_concurrent_bookings() {
    let pool = test_pool().await;
    let restaurant_id = seed_restaurant(&pool, &unique_tag("cuisine")).await;
    let capacity = 10;
    let party = 3;
    let slot_id = seed_counter_slot(&pool, restaurant_id, capacity).await;

    let attempts = (0..8).map(|i| {
        let pool = pool.clone();
        let guest = format!("guest-{i}");
        tokio::spawn(async move {
            booking::book(&pool, &book_request(restaurant_id, slot_id, &guest, party)).await
        })
    });

    let mut successes = 0;
    for handle in futures::future::join_all(attempts).await {
        match handle.expect("task") {
            Ok(_) => successes += 1,
            Err(e) => assert_eq!(e.code, ErrorCode::InsufficientCapacity),
        }
    }

    assert!(successes * party <= capacity);
    assert_eq!(successes, capacity / party);
    assert_eq!(
        remaining_seats(&pool, slot_id).await,
        capacity - successes * party
    );
    assert_eq!(reservation_count(&pool, slot_id).await, successes as i64);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance at DATABASE_URL"]
async fn test_cancel_restores_exact_capacity() {
    let pool = test_pool().await;
    let restaurant_id = seed_restaurant(&pool, &unique_tag("cuisine")).await;
    let slot_id = seed_counter_slot(&pool, restaurant_id, 6).await;

    let record = booking::book(&pool, &book_request(restaurant_id, slot_id, "Alice", 4))
        .await
        .expect("book");
    assert_eq!(remaining_seats(&pool, slot_id).await, 2);

    booking::cancel(&pool, record.reservation_id)
        .await
        .expect("cancel");
    assert_eq!(remaining_seats(&pool, slot_id).await, 6);
    assert_eq!(reservation_count(&pool, slot_id).await, 0);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance at DATABASE_URL"]
async fn test_double_cancel_fails_without_restoring() {
    let pool = test_pool().await;
    let restaurant_id = seed_restaurant(&pool, &unique_tag("cuisine")).await;
    let slot_id = seed_counter_slot(&pool, restaurant_id, 5).await;

    let record = booking::book(&pool, &book_request(restaurant_id, slot_id, "Alice", 2))
        .await
        .expect("book");

    booking::cancel(&pool, record.reservation_id)
        .await
        .expect("first cancel");
    assert_eq!(remaining_seats(&pool, slot_id).await, 5);

    let err = booking::cancel(&pool, record.reservation_id)
        .await
        .expect_err("second cancel");
    assert_eq!(err.code, ErrorCode::ReservationNotFound);
    assert_eq!(remaining_seats(&pool, slot_id).await, 5);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance at DATABASE_URL"]
async fn test_failed_booking_leaves_no_partial_state() {
    let pool = test_pool().await;
    let restaurant_id = seed_restaurant(&pool, &unique_tag("cuisine")).await;
    let slot_id = seed_counter_slot(&pool, restaurant_id, 1).await;

    let err = booking::book(&pool, &book_request(restaurant_id, slot_id, "Alice", 5))
        .await
        .expect_err("oversized booking");
    assert_eq!(err.code, ErrorCode::InsufficientCapacity);

    assert_eq!(remaining_seats(&pool, slot_id).await, 1);
    assert_eq!(reservation_count(&pool, slot_id).await, 0);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance at DATABASE_URL"]
async fn test_booking_unknown_slot_fails() {
    let pool = test_pool().await;
    let restaurant_id = seed_restaurant(&pool, &unique_tag("cuisine")).await;

    let err = booking::book(
        &pool,
        &book_request(restaurant_id, i64::MAX - 1, "Alice", 2),
    )
    .await
    .expect_err("unknown slot");
    assert_eq!(err.code, ErrorCode::SlotNotFound);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance at DATABASE_URL"]
async fn test_binary_slot_holds_one_reservation() {
    let pool = test_pool().await;
    let restaurant_id = seed_restaurant(&pool, &unique_tag("cuisine")).await;
    let slot_id = seed_binary_slot(&pool, restaurant_id).await;

    let record = booking::book(&pool, &book_request(restaurant_id, slot_id, "Alice", 4))
        .await
        .expect("first booking");

    let err = booking::book(&pool, &book_request(restaurant_id, slot_id, "Bob", 2))
        .await
        .expect_err("slot already taken");
    assert_eq!(err.code, ErrorCode::InsufficientCapacity);

    booking::cancel(&pool, record.reservation_id)
        .await
        .expect("cancel");

    booking::book(&pool, &book_request(restaurant_id, slot_id, "Bob", 2))
        .await
        .expect("rebooking after cancel");
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance at DATABASE_URL"]
async fn test_booking_by_composite_key() {
    let pool = test_pool().await;
    let restaurant_id = seed_restaurant(&pool, &unique_tag("cuisine")).await;
    let slot_id = seed_counter_slot(&pool, restaurant_id, 4).await;

    let request = BookingRequest {
        restaurant_id,
        availability_id: None,
        date: Some(slot_date()),
        time: Some(slot_time()),
        guest_name: "Alice".to_string(),
        party_size: 3,
    };
    let record = booking::book(&pool, &request).await.expect("book by key");
    assert_eq!(record.availability_id, slot_id);
    assert_eq!(remaining_seats(&pool, slot_id).await, 1);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance at DATABASE_URL"]
async fn test_search_filter_pass_through() {
    let pool = test_pool().await;
    let cuisine = unique_tag("Italian");
    let restaurant_id = seed_restaurant(&pool, &cuisine).await;
    let slot_id = seed_counter_slot(&pool, restaurant_id, 4).await;

    // No filters: the seeded slot is among the results
    let all = search::search(&pool, &SearchFilters::default())
        .await
        .expect("unfiltered search");
    assert!(all.iter().any(|v| v.availability_id == slot_id));

    // Case-insensitive exact cuisine match
    let filters = SearchFilters {
        cuisine: Some(cuisine.to_uppercase()),
        ..Default::default()
    };
    let by_cuisine = search::search(&pool, &filters).await.expect("cuisine search");
    assert_eq!(by_cuisine.len(), 1);
    assert_eq!(by_cuisine[0].availability_id, slot_id);

    // Exact date/time match
    let filters = SearchFilters {
        restaurant_id: Some(restaurant_id),
        date: Some(slot_date()),
        time: Some(slot_time()),
        ..Default::default()
    };
    let by_key = search::search(&pool, &filters).await.expect("key search");
    assert_eq!(by_key.len(), 1);

    // Wrong time matches nothing
    let filters = SearchFilters {
        restaurant_id: Some(restaurant_id),
        time: Some(NaiveTime::from_hms_opt(21, 0, 0).unwrap()),
        ..Default::default()
    };
    assert!(search::search(&pool, &filters).await.expect("miss").is_empty());

    // min_party_size beyond remaining seats excludes the slot
    let filters = SearchFilters {
        restaurant_id: Some(restaurant_id),
        min_party_size: Some(5),
        ..Default::default()
    };
    assert!(search::search(&pool, &filters).await.expect("too big").is_empty());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance at DATABASE_URL"]
async fn test_search_takes_no_lock_on_results() {
    let pool = test_pool().await;
    let cuisine = unique_tag("cuisine");
    let restaurant_id = seed_restaurant(&pool, &cuisine).await;
    let slot_id = seed_counter_slot(&pool, restaurant_id, 2).await;

    // Search result is advisory: a booking issued after the search decides
    let filters = SearchFilters {
        cuisine: Some(cuisine),
        ..Default::default()
    };
    let hits = search::search(&pool, &filters).await.expect("search");
    assert_eq!(hits[0].available_seats, Some(2));

    booking::book(&pool, &book_request(restaurant_id, slot_id, "Alice", 2))
        .await
        .expect("book after search");
    assert_eq!(remaining_seats(&pool, slot_id).await, 0);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance at DATABASE_URL"]
async fn test_same_slot_bookings_serialize_at_lock() {
    let pool = test_pool().await;
    let restaurant_id = seed_restaurant(&pool, &unique_tag("cuisine")).await;
    let slot_id = seed_counter_slot(&pool, restaurant_id, 2).await;

    // Hold the slot lock the way an in-flight booking does, draining the
    // last seats before committing.
    let mut tx = pool.begin().await.expect("begin");
    sqlx::query("SELECT available_seats FROM availability WHERE availability_id = $1 FOR UPDATE")
        .bind(slot_id)
        .fetch_one(&mut *tx)
        .await
        .expect("lock");
    sqlx::query("UPDATE availability SET available_seats = 0 WHERE availability_id = $1")
        .bind(slot_id)
        .execute(&mut *tx)
        .await
        .expect("drain");

    let contender = {
        let pool = pool.clone();
        tokio::spawn(async move {
            booking::book(&pool, &book_request(restaurant_id, slot_id, "Bob", 1)).await
        })
    };

    // Bob must block at lock acquisition while the transaction is open
    tokio::time::sleep(std::time::Duration::from_millis(300)).await;
    assert!(!contender.is_finished());

    tx.commit().await.expect("commit");

    // Once unblocked, Bob re-evaluates against the committed state and fails
    let err = contender.await.expect("task").expect_err("no seats left");
    assert_eq!(err.code, ErrorCode::InsufficientCapacity);
    assert_eq!(remaining_seats(&pool, slot_id).await, 0);
}

/// Concrete scenario from the design review: capacity 2, Alice books both
/// seats, Bob's booking of 1 fails until Alice cancels.
#[tokio::test]
#[ignore = "requires a PostgreSQL instance at DATABASE_URL"]
async fn test_alice_and_bob_scenario() {
    let pool = test_pool().await;
    let restaurant_id = seed_restaurant(&pool, &unique_tag("cuisine")).await;
    let slot_id = seed_counter_slot(&pool, restaurant_id, 2).await;

    let alice = booking::book(&pool, &book_request(restaurant_id, slot_id, "Alice", 2))
        .await
        .expect("alice books");
    assert_eq!(remaining_seats(&pool, slot_id).await, 0);

    let err = booking::book(&pool, &book_request(restaurant_id, slot_id, "Bob", 1))
        .await
        .expect_err("bob blocked");
    assert_eq!(err.code, ErrorCode::InsufficientCapacity);

    booking::cancel(&pool, alice.reservation_id)
        .await
        .expect("alice cancels");
    assert_eq!(remaining_seats(&pool, slot_id).await, 2);

    booking::book(&pool, &book_request(restaurant_id, slot_id, "Bob", 1))
        .await
        .expect("bob retries");
    assert_eq!(remaining_seats(&pool, slot_id).await, 1);
}
