//! User repository integration tests against an in-memory SQLite store.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use common::{AppError, Context, DatabaseConfig, ErrorKind, Interrupted};
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use domain::{RegisterUser, UpdateUser, ROLE_CUSTOMER};
use tokio_test::assert_ok;
use uuid::Uuid;

use user_service::repository::entities::{role, user};
use user_service::{Database, Registry, RepositoryRegistry, UserRepository, UserServiceConfig};

const ADMIN_ROLE_ID: i32 = 1;
const CUSTOMER_ROLE_ID: i32 = 2;

fn sqlite_config() -> DatabaseConfig {
    DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        ..Default::default()
    }
}

async fn setup() -> (Database, Registry) {
    let db = Database::connect(&sqlite_config())
        .await
        .expect("in-memory database should migrate");
    let registry = Registry::new(db.get_connection());
    (db, registry)
}

fn register_request(username: &str) -> RegisterUser {
    RegisterUser {
        name: "Ann".to_string(),
        username: username.to_string(),
        password: "hashed-x".to_string(),
        phone_number: "08123".to_string(),
        email: format!("{}@x.io", username),
        role_id: CUSTOMER_ROLE_ID,
    }
}

#[tokio::test]
async fn test_register_assigns_identity_and_timestamps() {
    let (_db, registry) = setup().await;
    let users = registry.users();
    let ctx = Context::background();

    let user = assert_ok!(users.register(&ctx, register_request("ann1")).await);

    assert!(user.id > 0);
    assert!(!user.uuid.is_nil());
    assert!(user.created_at.is_some());
    assert!(user.updated_at.is_some());
    assert_eq!(user.role_id, CUSTOMER_ROLE_ID);
    assert_eq!(user.password, "hashed-x");
}

#[tokio::test]
async fn test_register_then_find_by_uuid() {
    let (_db, registry) = setup().await;
    let users = registry.users();
    let ctx = Context::background();
    let request = register_request("ann1");

    let created = users.register(&ctx, request.clone()).await.unwrap();
    let found = users.find_by_uuid(&ctx, created.uuid).await.unwrap();

    assert_eq!(found.id, created.id);
    assert_eq!(found.name, request.name);
    assert_eq!(found.username, request.username);
    assert_eq!(found.phone_number, request.phone_number);
    assert_eq!(found.email, request.email);
    assert_eq!(found.role.map(|r| r.name).as_deref(), Some(ROLE_CUSTOMER));
}

#[tokio::test]
async fn test_find_by_username_and_email() {
    let (_db, registry) = setup().await;
    let users = registry.users();
    let ctx = Context::background();

    let created = users.register(&ctx, register_request("ann1")).await.unwrap();
    users.register(&ctx, register_request("bob2")).await.unwrap();

    let by_username = users.find_by_username(&ctx, "ann1").await.unwrap();
    assert_eq!(by_username.uuid, created.uuid);

    let by_email = users.find_by_email(&ctx, "ann1@x.io").await.unwrap();
    assert_eq!(by_email.uuid, created.uuid);
}

#[tokio::test]
async fn test_lookup_is_exact_match() {
    let (_db, registry) = setup().await;
    let users = registry.users();
    let ctx = Context::background();

    users.register(&ctx, register_request("ann1")).await.unwrap();

    let err = users.find_by_username(&ctx, "ann").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_find_returns_first_match_by_id() {
    let (_db, registry) = setup().await;
    let users = registry.users();
    let ctx = Context::background();

    let first = users.register(&ctx, register_request("dup")).await.unwrap();
    users.register(&ctx, register_request("dup")).await.unwrap();

    let found = users.find_by_username(&ctx, "dup").await.unwrap();
    assert_eq!(found.id, first.id);
}

#[tokio::test]
async fn test_find_missing_keys_are_not_found() {
    let (_db, registry) = setup().await;
    let users = registry.users();
    let ctx = Context::background();

    let by_username = users.find_by_username(&ctx, "ghost").await.unwrap_err();
    let by_email = users.find_by_email(&ctx, "ghost@x.io").await.unwrap_err();
    let by_uuid = users.find_by_uuid(&ctx, Uuid::new_v4()).await.unwrap_err();

    for err in [by_username, by_email, by_uuid] {
        assert!(matches!(err, AppError::NotFound));
    }
}

#[tokio::test]
async fn test_update_replaces_only_supplied_fields() {
    let (_db, registry) = setup().await;
    let users = registry.users();
    let ctx = Context::background();

    let created = users.register(&ctx, register_request("ann1")).await.unwrap();
    let changes = UpdateUser {
        name: Some("Ann K.".to_string()),
        ..Default::default()
    };

    let returned = users.update(&ctx, changes.clone(), created.uuid).await.unwrap();
    assert_eq!(returned, changes);

    let found = users.find_by_uuid(&ctx, created.uuid).await.unwrap();
    assert_eq!(found.name, "Ann K.");
    assert_eq!(found.username, "ann1");
    assert_eq!(found.email, "ann1@x.io");
    assert_eq!(found.password, "hashed-x");
}

#[tokio::test]
async fn test_update_never_changes_identity_or_role() {
    let (_db, registry) = setup().await;
    let users = registry.users();
    let ctx = Context::background();

    let created = users.register(&ctx, register_request("ann1")).await.unwrap();
    let changes = UpdateUser {
        name: Some("Other".to_string()),
        username: Some("other".to_string()),
        password: Some("hashed-y".to_string()),
        phone_number: Some("0800".to_string()),
        email: Some("other@x.io".to_string()),
    };

    users.update(&ctx, changes, created.uuid).await.unwrap();
    let found = users.find_by_username(&ctx, "other").await.unwrap();

    assert_eq!(found.id, created.id);
    assert_eq!(found.uuid, created.uuid);
    assert_eq!(found.role_id, created.role_id);
    assert_eq!(found.password, "hashed-y");
}

#[tokio::test]
async fn test_update_unknown_uuid_is_not_found() {
    let (_db, registry) = setup().await;
    let users = registry.users();
    let ctx = Context::background();

    let changes = UpdateUser {
        name: Some("Nobody".to_string()),
        ..Default::default()
    };
    let err = users.update(&ctx, changes, Uuid::new_v4()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_register_with_unknown_role_fails_without_row() {
    let (_db, registry) = setup().await;
    let users = registry.users();
    let ctx = Context::background();

    let mut request = register_request("ann1");
    request.role_id = 999;

    let err = users.register(&ctx, request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PersistenceFailure);

    let lookup = users.find_by_username(&ctx, "ann1").await.unwrap_err();
    assert_eq!(lookup.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_register_with_admin_role() {
    let (_db, registry) = setup().await;
    let users = registry.users();
    let ctx = Context::background();

    let mut request = register_request("root");
    request.role_id = ADMIN_ROLE_ID;
    let created = users.register(&ctx, request).await.unwrap();

    let found = users.find_by_uuid(&ctx, created.uuid).await.unwrap();
    assert_eq!(found.role.map(|r| r.id), Some(ADMIN_ROLE_ID));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registrations_get_distinct_uuids() {
    let (_db, registry) = setup().await;
    let registry = Arc::new(registry);

    let tasks = (0..50).map(|i| {
        let registry = registry.clone();
        tokio::spawn(async move {
            registry
                .users()
                .register(&Context::background(), register_request(&format!("user{}", i)))
                .await
        })
    });

    let results = futures::future::join_all(tasks).await;
    let uuids: HashSet<Uuid> = results
        .into_iter()
        .map(|joined| joined.expect("task panicked").expect("register failed").uuid)
        .collect();

    assert_eq!(uuids.len(), 50);
}

#[tokio::test]
async fn test_cancelled_context_surfaces_persistence_failure() {
    let (_db, registry) = setup().await;
    let users = registry.users();

    let ctx = Context::background();
    ctx.cancel();

    let err = users.register(&ctx, register_request("ann1")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
    assert_eq!(err.interruption(), Some(Interrupted::Cancelled));

    let lookup = users
        .find_by_username(&Context::background(), "ann1")
        .await
        .unwrap_err();
    assert!(lookup.is_not_found());
}

#[tokio::test]
async fn test_expired_deadline_surfaces_persistence_failure() {
    let (_db, registry) = setup().await;
    let users = registry.users();

    let ctx = Context::background().with_timeout(Duration::ZERO);

    let err = users.find_by_uuid(&ctx, Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.interruption(), Some(Interrupted::DeadlineExceeded));
}

#[tokio::test]
async fn test_database_ping() {
    let (db, _registry) = setup().await;
    assert_ok!(db.ping().await);
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let (db, registry) = setup().await;
    assert_ok!(db.run_migrations().await);

    let ctx = Context::background();
    let created = registry.users().register(&ctx, register_request("ann1")).await.unwrap();
    assert_eq!(created.role_id, CUSTOMER_ROLE_ID);
}

#[tokio::test]
async fn test_bootstrap_builds_working_registry() {
    let config = UserServiceConfig {
        database: sqlite_config(),
        ..Default::default()
    };
    let registry = user_service::bootstrap(&config).await.unwrap();
    let ctx = config.operation_context();

    let created = registry.users().register(&ctx, register_request("ann1")).await.unwrap();
    let found = registry.users().find_by_email(&ctx, "ann1@x.io").await.unwrap();

    assert_eq!(found.uuid, created.uuid);
}

#[tokio::test]
async fn test_bootstrap_failure_is_normalized() {
    let config = UserServiceConfig {
        database: DatabaseConfig {
            url: "sqlite:/nonexistent-user-service-dir/users.db".to_string(),
            max_connections: 1,
            min_connections: 0,
            connect_timeout_secs: 1,
            ..Default::default()
        },
        ..Default::default()
    };

    let err = user_service::bootstrap(&config).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
}

#[tokio::test]
async fn test_empty_update_skips_write() {
    let (_db, registry) = setup().await;
    let users = registry.users();
    let ctx = Context::background();

    let created = users.register(&ctx, register_request("ann1")).await.unwrap();
    let before = users.find_by_uuid(&ctx, created.uuid).await.unwrap();

    let returned = users.update(&ctx, UpdateUser::default(), created.uuid).await.unwrap();
    assert!(returned.is_empty());

    let after = users.find_by_uuid(&ctx, created.uuid).await.unwrap();
    assert_eq!(after, before);

    let err = users.update(&ctx, UpdateUser::default(), Uuid::new_v4()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_role_delete_cascades_to_users() {
    let (db, registry) = setup().await;
    let users = registry.users();
    let ctx = Context::background();

    let customer = users.register(&ctx, register_request("ann1")).await.unwrap();
    let mut request = register_request("root");
    request.role_id = ADMIN_ROLE_ID;
    let admin = users.register(&ctx, request).await.unwrap();

    role::Entity::delete_by_id(CUSTOMER_ROLE_ID)
        .exec(db.connection())
        .await
        .unwrap();

    let err = users.find_by_uuid(&ctx, customer.uuid).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_ok!(users.find_by_uuid(&ctx, admin.uuid).await);
}

#[tokio::test]
async fn test_role_rekey_cascades_to_users() {
    let (db, registry) = setup().await;
    let users = registry.users();
    let ctx = Context::background();

    let created = users.register(&ctx, register_request("ann1")).await.unwrap();

    role::Entity::update_many()
        .col_expr(role::Column::Id, Expr::value(20))
        .filter(role::Column::Id.eq(CUSTOMER_ROLE_ID))
        .exec(db.connection())
        .await
        .unwrap();

    let found = users.find_by_uuid(&ctx, created.uuid).await.unwrap();
    assert_eq!(found.role_id, 20);
    assert_eq!(found.role.map(|r| r.name).as_deref(), Some(ROLE_CUSTOMER));
}

#[tokio::test]
async fn test_duplicate_uuid_is_rejected() {
    let (db, registry) = setup().await;
    let ctx = Context::background();

    let created = registry.users().register(&ctx, register_request("ann1")).await.unwrap();

    let duplicate = user::ActiveModel {
        uuid: Set(created.uuid),
        name: Set("Bob".to_string()),
        username: Set("bob2".to_string()),
        password: Set("hashed-y".to_string()),
        phone_number: Set("0800".to_string()),
        email: Set("bob2@x.io".to_string()),
        role_id: Set(CUSTOMER_ROLE_ID),
        ..Default::default()
    };
    let err = AppError::from(duplicate.insert(db.connection()).await.unwrap_err());
    assert_eq!(err.kind(), ErrorKind::PersistenceFailure);

    let err = registry
        .users()
        .find_by_username(&ctx, "bob2")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}
