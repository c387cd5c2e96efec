use chrono::NaiveDate;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use engine::{
    CategoryCmd, DateRange, Engine, EngineError, TransactionCmd, TransactionKind,
    UpdateCategoryCmd, UpdateTransactionCmd, UpdateUserCmd, User,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .password_cost(4)
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn engine_with_user() -> (Engine, User) {
    let (engine, _db) = engine_with_db().await;
    let user = engine.register_user("alice", "password123").await.unwrap();
    (engine, user)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn category(engine: &Engine, user: &User, name: &str, kind: TransactionKind) -> Uuid {
    engine
        .create_category(CategoryCmd {
            user_id: user.id,
            name: name.to_string(),
            kind,
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn register_and_authenticate() {
    let (engine, user) = engine_with_user().await;

    let authed = engine.authenticate("alice", "password123").await.unwrap();
    assert_eq!(authed, user);

    assert_eq!(
        engine.authenticate("alice", "wrong-password").await.unwrap_err(),
        EngineError::InvalidCredentials
    );
    assert_eq!(
        engine.authenticate("bob", "password123").await.unwrap_err(),
        EngineError::InvalidCredentials
    );
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let (engine, _user) = engine_with_user().await;
    let err = engine
        .register_user("  alice ", "another-password")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("alice".to_string()));
}

#[tokio::test]
async fn update_user_renames_and_rehashes() {
    let (engine, alice) = engine_with_user().await;
    engine.register_user("bob", "password456").await.unwrap();

    let err = engine
        .update_user(UpdateUserCmd {
            user_id: alice.id,
            username: Some(" bob ".to_string()),
            password: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("bob".to_string()));

    let err = engine
        .update_user(UpdateUserCmd {
            user_id: alice.id,
            username: None,
            password: Some("short".to_string()),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidPassword(_)));

    let updated = engine
        .update_user(UpdateUserCmd {
            user_id: alice.id,
            username: Some("alicia".to_string()),
            password: Some("new-password".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(updated.id, alice.id);
    assert_eq!(updated.username, "alicia");
    assert_eq!(updated.created_at, alice.created_at);

    assert_eq!(
        engine.authenticate("alice", "password123").await.unwrap_err(),
        EngineError::InvalidCredentials
    );
    assert_eq!(
        engine.authenticate("alicia", "password123").await.unwrap_err(),
        EngineError::InvalidCredentials
    );
    assert_eq!(
        engine.authenticate("alicia", "new-password").await.unwrap(),
        updated
    );

    // Keeping the current name is not a conflict with itself.
    let same = engine
        .update_user(UpdateUserCmd {
            user_id: alice.id,
            username: Some("alicia".to_string()),
            password: None,
        })
        .await
        .unwrap();
    assert_eq!(same, updated);
}

#[tokio::test]
async fn transaction_kind_follows_category() {
    let (engine, user) = engine_with_user().await;
    let salary = category(&engine, &user, "Salary", TransactionKind::Income).await;
    let food = category(&engine, &user, "Food", TransactionKind::Expense).await;

    let tx = engine
        .create_transaction(
            TransactionCmd::new(user.id, salary, 1000, date(2024, 1, 1)).description("  January "),
        )
        .await
        .unwrap();
    assert_eq!(tx.kind, TransactionKind::Income);
    assert_eq!(tx.description, "January");
    assert_eq!(tx.category.as_ref().map(|c| c.id), Some(salary));

    let updated = engine
        .update_transaction(UpdateTransactionCmd {
            user_id: user.id,
            transaction_id: tx.id,
            amount: 250,
            description: "Groceries".to_string(),
            category_id: food,
            date: date(2024, 1, 3),
        })
        .await
        .unwrap();
    assert_eq!(updated.kind, TransactionKind::Expense);
    assert_eq!(updated.amount, 250);
    assert_eq!(updated.date, date(2024, 1, 3));
    assert_eq!(updated.created_at, tx.created_at);

    let detail = engine.transaction_detail(user.id, tx.id).await.unwrap();
    assert_eq!(detail, updated);
}

#[tokio::test]
async fn unknown_category_is_rejected() {
    let (engine, user) = engine_with_user().await;
    let missing = Uuid::new_v4();

    let err = engine
        .create_transaction(TransactionCmd::new(user.id, missing, 10, date(2024, 1, 1)))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::CategoryNotFound(missing.to_string()));
}

#[tokio::test]
async fn non_positive_amount_is_rejected() {
    let (engine, user) = engine_with_user().await;
    let food = category(&engine, &user, "Food", TransactionKind::Expense).await;

    let err = engine
        .create_transaction(TransactionCmd::new(user.id, food, 0, date(2024, 1, 1)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn category_kind_change_does_not_rewrite_transactions() {
    let (engine, user) = engine_with_user().await;
    let misc = category(&engine, &user, "Misc", TransactionKind::Expense).await;
    let tx = engine
        .create_transaction(TransactionCmd::new(user.id, misc, 70, date(2024, 2, 1)))
        .await
        .unwrap();

    engine
        .update_category(UpdateCategoryCmd {
            user_id: user.id,
            category_id: misc,
            name: None,
            kind: Some(TransactionKind::Income),
        })
        .await
        .unwrap();

    let detail = engine.transaction_detail(user.id, tx.id).await.unwrap();
    assert_eq!(detail.kind, TransactionKind::Expense);
    assert_eq!(
        detail.category.map(|c| c.kind),
        Some(TransactionKind::Income)
    );
}

#[tokio::test]
async fn list_groups_and_totals() {
    let (engine, user) = engine_with_user().await;
    let salary = category(&engine, &user, "Salary", TransactionKind::Income).await;
    let food = category(&engine, &user, "Food", TransactionKind::Expense).await;

    engine
        .create_transaction(TransactionCmd::new(user.id, salary, 100, date(2024, 1, 1)))
        .await
        .unwrap();
    engine
        .create_transaction(TransactionCmd::new(user.id, food, 40, date(2024, 1, 2)))
        .await
        .unwrap();

    let summary = engine
        .list_transactions(user.id, DateRange::All)
        .await
        .unwrap();

    let dates: Vec<NaiveDate> = summary.list_group.iter().map(|g| g.date).collect();
    assert_eq!(dates, vec![date(2024, 1, 2), date(2024, 1, 1)]);
    assert_eq!(summary.total_income, 100);
    assert_eq!(summary.total_expense, 40);
    assert_eq!(summary.remaining_balance, 60);

    let first = &summary.list_group[0].transactions[0];
    assert_eq!(first.category.as_ref().map(|c| c.name.as_str()), Some("Food"));
}

#[tokio::test]
async fn list_orders_same_day_by_creation_time() {
    let (engine, user) = engine_with_user().await;
    let food = category(&engine, &user, "Food", TransactionKind::Expense).await;

    for amount in [1, 2, 3] {
        engine
            .create_transaction(TransactionCmd::new(user.id, food, amount, date(2024, 4, 1)))
            .await
            .unwrap();
    }

    let summary = engine
        .list_transactions(user.id, DateRange::All)
        .await
        .unwrap();
    assert_eq!(summary.list_group.len(), 1);
    let group = &summary.list_group[0].transactions;
    assert_eq!(group.len(), 3);
    assert!(group.windows(2).all(|w| w[0].created_at >= w[1].created_at));
}

#[tokio::test]
async fn list_range_is_inclusive() {
    let (engine, user) = engine_with_user().await;
    let food = category(&engine, &user, "Food", TransactionKind::Expense).await;

    for day in [1, 10, 20, 31] {
        engine
            .create_transaction(TransactionCmd::new(user.id, food, 5, date(2024, 1, day)))
            .await
            .unwrap();
    }

    let range = DateRange::from_query(Some("2024-01-10"), Some("2024-01-20"));
    let summary = engine.list_transactions(user.id, range).await.unwrap();
    let dates: Vec<NaiveDate> = summary.list_group.iter().map(|g| g.date).collect();
    assert_eq!(dates, vec![date(2024, 1, 20), date(2024, 1, 10)]);
    assert_eq!(summary.total_expense, 10);

    let only_start = DateRange::from_query(Some("2024-01-10"), None);
    let summary = engine.list_transactions(user.id, only_start).await.unwrap();
    assert_eq!(summary.list_group.len(), 4);

    let malformed = DateRange::from_query(Some("2024-01-10"), Some("soon"));
    let summary = engine.list_transactions(user.id, malformed).await.unwrap();
    assert!(summary.list_group.is_empty());
    assert_eq!(summary.remaining_balance, 0);
}

#[tokio::test]
async fn list_is_scoped_to_owner() {
    let (engine, alice) = engine_with_user().await;
    let bob = engine.register_user("bob", "password456").await.unwrap();
    let alice_food = category(&engine, &alice, "Food", TransactionKind::Expense).await;
    engine
        .create_transaction(TransactionCmd::new(alice.id, alice_food, 9, date(2024, 1, 1)))
        .await
        .unwrap();

    let summary = engine
        .list_transactions(bob.id, DateRange::All)
        .await
        .unwrap();
    assert!(summary.list_group.is_empty());
    assert_eq!(summary.total_expense, 0);

    // Someone else's category cannot be used either.
    let err = engine
        .create_transaction(TransactionCmd::new(bob.id, alice_food, 9, date(2024, 1, 1)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::CategoryNotFound(_)));
}

#[tokio::test]
async fn delete_is_scoped_to_owner() {
    let (engine, alice) = engine_with_user().await;
    let bob = engine.register_user("bob", "password456").await.unwrap();
    let food = category(&engine, &alice, "Food", TransactionKind::Expense).await;
    let tx = engine
        .create_transaction(TransactionCmd::new(alice.id, food, 9, date(2024, 1, 1)))
        .await
        .unwrap();

    let err = engine.delete_transaction(bob.id, tx.id).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("transaction not exists".to_string())
    );

    let deleted = engine.delete_transaction(alice.id, tx.id).await.unwrap();
    assert_eq!(deleted.id, tx.id);
    assert!(engine.transaction_detail(alice.id, tx.id).await.is_err());
}

#[tokio::test]
async fn category_names_are_unique_per_user() {
    let (engine, alice) = engine_with_user().await;
    let bob = engine.register_user("bob", "password456").await.unwrap();
    category(&engine, &alice, "Café", TransactionKind::Expense).await;

    let err = engine
        .create_category(CategoryCmd {
            user_id: alice.id,
            name: "cafe".to_string(),
            kind: TransactionKind::Expense,
        })
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("Café".to_string()));

    // Another user may reuse the name.
    category(&engine, &bob, "Cafe", TransactionKind::Expense).await;

    let names: Vec<String> = engine
        .list_categories(alice.id)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Café".to_string()]);
}

#[tokio::test]
async fn category_in_use_cannot_be_deleted() {
    let (engine, user) = engine_with_user().await;
    let food = category(&engine, &user, "Food", TransactionKind::Expense).await;
    let tx = engine
        .create_transaction(TransactionCmd::new(user.id, food, 9, date(2024, 1, 1)))
        .await
        .unwrap();

    let err = engine.delete_category(user.id, food).await.unwrap_err();
    assert!(matches!(err, EngineError::InUse(_)));

    engine.delete_transaction(user.id, tx.id).await.unwrap();
    let deleted = engine.delete_category(user.id, food).await.unwrap();
    assert_eq!(deleted.id, food);
    assert!(engine.category(user.id, food).await.is_err());
}

#[tokio::test]
async fn deleting_user_removes_their_data() {
    let (engine, user) = engine_with_user().await;
    let food = category(&engine, &user, "Food", TransactionKind::Expense).await;
    engine
        .create_transaction(TransactionCmd::new(user.id, food, 9, date(2024, 1, 1)))
        .await
        .unwrap();

    engine.delete_user(user.id).await.unwrap();

    assert_eq!(
        engine.authenticate("alice", "password123").await.unwrap_err(),
        EngineError::InvalidCredentials
    );
    assert!(engine.list_categories(user.id).await.unwrap().is_empty());
    let summary = engine
        .list_transactions(user.id, DateRange::All)
        .await
        .unwrap();
    assert!(summary.list_group.is_empty());
}
