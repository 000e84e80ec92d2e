use super::*;
use shared::protocol::ContactPayload;

fn submission(first_name: &str, email: &str, message: &str) -> NewContactSubmission {
    NewContactSubmission::try_from(ContactPayload {
        first_name: Some(first_name.into()),
        email: Some(email.into()),
        message: Some(message.into()),
        ..ContactPayload::default()
    })
    .expect("valid submission")
}

fn memory_store() -> SqliteContactStore {
    SqliteContactStore::new(Some("sqlite::memory:".into()))
}

async fn count_rows(store: &SqliteContactStore) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM contact_submissions")
        .fetch_one(store.pool().expect("connected"))
        .await
        .expect("count")
}

#[tokio::test]
async fn connect_without_url_is_a_configuration_error() {
    let store = SqliteContactStore::new(None);
    let err = store.connect().await.expect_err("should fail");
    assert!(matches!(err, StoreError::Configuration(_)));
    assert!(!store.is_connected());
}

#[tokio::test]
async fn blank_url_counts_as_missing() {
    let store = SqliteContactStore::new(Some("   ".into()));
    let err = store.connect().await.expect_err("should fail");
    assert!(matches!(err, StoreError::Configuration(_)));
}

#[tokio::test]
async fn unopenable_location_is_a_connection_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let db_path = temp.path().join("missing").join("nested").join("contact.db");
    let store = SqliteContactStore::new(Some(format!(
        "sqlite://{}",
        db_path.to_string_lossy().replace('\\', "/")
    )));

    let err = store.connect().await.expect_err("should fail");
    assert!(matches!(err, StoreError::Connection(_)));
    assert!(!store.is_connected());

    let err = store
        .save(&submission("Ann", "ann@x.com", "Hi"))
        .await
        .expect_err("save should fail too");
    assert!(matches!(err, StoreError::Connection(_)));
}

#[tokio::test]
async fn connect_is_idempotent() {
    let store = memory_store();
    store.connect().await.expect("first connect");
    store
        .save(&submission("Ann", "ann@x.com", "Hi"))
        .await
        .expect("save");
    store.connect().await.expect("second connect");

    assert_eq!(count_rows(&store).await, 1);
}

#[tokio::test]
async fn concurrent_connects_share_one_pool() {
    let store = memory_store();
    let (a, b, c) = tokio::join!(store.connect(), store.connect(), store.connect());
    a.expect("a");
    b.expect("b");
    c.expect("c");

    store
        .save(&submission("Ann", "ann@x.com", "Hi"))
        .await
        .expect("save");
    assert_eq!(count_rows(&store).await, 1);
}

#[tokio::test]
async fn save_connects_lazily() {
    let store = memory_store();
    assert!(!store.is_connected());
    store
        .save(&submission("Ann", "ann@x.com", "Hi"))
        .await
        .expect("save");
    assert!(store.is_connected());
}

#[tokio::test]
async fn save_persists_fields_and_assigns_timestamp() {
    let store = memory_store();
    let before = Utc::now();
    let payload = ContactPayload {
        first_name: Some("Ann".into()),
        last_name: Some("Lee".into()),
        email: Some("ann@x.com".into()),
        company: Some("Acme".into()),
        message: Some("Hi".into()),
    };
    let stored = store
        .save(&NewContactSubmission::try_from(payload).expect("valid"))
        .await
        .expect("save");
    assert!(stored.created_at >= before);

    let row = sqlx::query(
        "SELECT first_name, last_name, email, company, message, created_at
         FROM contact_submissions WHERE id = ?",
    )
    .bind(stored.id.0)
    .fetch_one(store.pool().expect("connected"))
    .await
    .expect("row");
    assert_eq!(row.get::<String, _>("first_name"), "Ann");
    assert_eq!(row.get::<Option<String>, _>("last_name").as_deref(), Some("Lee"));
    assert_eq!(row.get::<String, _>("email"), "ann@x.com");
    assert_eq!(row.get::<Option<String>, _>("company").as_deref(), Some("Acme"));
    assert_eq!(row.get::<String, _>("message"), "Hi");
    assert_eq!(
        row.get::<DateTime<Utc>, _>("created_at").timestamp_millis(),
        stored.created_at.timestamp_millis()
    );
}

#[tokio::test]
async fn identical_submissions_become_distinct_records() {
    let store = memory_store();
    let entry = submission("Ann", "ann@x.com", "Hi");
    let first = store.save(&entry).await.expect("first");
    let second = store.save(&entry).await.expect("second");

    assert_ne!(first.id, second.id);
    assert_eq!(count_rows(&store).await, 2);
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let store = memory_store();
    store.health_check().await.expect("health check");
}

#[test]
fn store_errors_map_onto_the_contact_taxonomy() {
    let missing = ContactError::from(StoreError::Configuration("database url is not set".into()));
    assert!(matches!(missing, ContactError::Configuration(_)));
    assert_eq!(missing.status(), 500);

    let refused = ContactError::from(StoreError::Connection(sqlx::Error::PoolClosed));
    assert!(matches!(refused, ContactError::Connection(_)));

    let write = ContactError::from(StoreError::Persistence(sqlx::Error::RowNotFound));
    assert!(matches!(write, ContactError::Persistence(_)));
}
