//! `PgGameStore` against a live PostgreSQL.
//!
//! Each test connects through `DATABASE_URL` and returns early when it is
//! not set, so the suite stays green on machines without a database.
//! Tenants are random per test, which keeps runs independent.

use scorekeeper_backend::{
    db::{create_pool, GameStore, PgGameStore, StoreError},
    models::{Game, GameUpdate, Player, Round, Score, UserProfile},
};
use uuid::Uuid;

async fn pg_store() -> Option<PgGameStore> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DATABASE_URL not set, skipping PostgreSQL store test");
            return None;
        }
    };

    let pool = create_pool(&url, 2).await.expect("connect to DATABASE_URL");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");
    Some(PgGameStore::new(pool))
}

fn tenant() -> String {
    format!("tenant-{}", Uuid::new_v4())
}

fn score(player_id: &str, score: i64) -> Score {
    Score {
        player_id: player_id.to_string(),
        score,
    }
}

/// Guest plus one registered player (`u9`), owned by `u1`
fn new_game(tenant_id: &str) -> Game {
    Game {
        id: Uuid::new_v4().to_string(),
        name: "Rummy".to_string(),
        date: "2026-10-18T12:00:00.000Z".to_string(),
        players: vec![Player::guest("Alice"), Player::registered("u9", "Bob")],
        rounds: Vec::new(),
        target_score: 100,
        is_complete: false,
        user_id: "u1".to_string(),
        tenant_id: tenant_id.to_string(),
    }
}

#[tokio::test]
async fn create_and_get_game() {
    let Some(store) = pg_store().await else { return };
    let tenant_id = tenant();
    let game = new_game(&tenant_id);

    let created = store.create_game(&game).await.unwrap();
    assert_eq!(created, game);

    let loaded = store.get_game(&tenant_id, &game.id).await.unwrap().unwrap();
    assert_eq!(loaded, game);
    assert_eq!(loaded.players[1].user_id.as_deref(), Some("u9"));

    let shared = store.list_games_for_user(&tenant_id, "u9").await.unwrap();
    assert_eq!(shared.len(), 1);
    assert!(store
        .list_games_for_user(&tenant_id, "stranger")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn rounds_keep_insertion_order() {
    let Some(store) = pg_store().await else { return };
    let tenant_id = tenant();
    let game = new_game(&tenant_id);
    store.create_game(&game).await.unwrap();
    let alice = game.players[0].id.clone();

    let mut ids = Vec::new();
    for points in [30, 10, 20] {
        let round = Round::new(vec![score(&alice, points)]);
        ids.push(store.add_round(&tenant_id, &game.id, &round).await.unwrap().id);
    }

    store
        .update_round(&tenant_id, &game.id, &ids[0], &[score(&alice, 1)])
        .await
        .unwrap();
    store.delete_round(&tenant_id, &game.id, &ids[1]).await.unwrap();

    let loaded = store.get_game(&tenant_id, &game.id).await.unwrap().unwrap();
    let order: Vec<&str> = loaded.rounds.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(order, vec![ids[0].as_str(), ids[2].as_str()]);
    assert_eq!(loaded.rounds[0].scores[0].score, 1);

    assert!(matches!(
        store.delete_round(&tenant_id, &game.id, "missing").await,
        Err(StoreError::NotFound { entity: "round", .. })
    ));
}

#[tokio::test]
async fn other_tenant_cannot_reach_game() {
    let Some(store) = pg_store().await else { return };
    let tenant_id = tenant();
    let other = tenant();
    let game = new_game(&tenant_id);
    store.create_game(&game).await.unwrap();

    assert!(store.get_game(&other, &game.id).await.unwrap().is_none());
    assert!(matches!(
        store
            .add_round(&other, &game.id, &Round::new(vec![score("p", 1)]))
            .await,
        Err(StoreError::NotFound { entity: "game", .. })
    ));
    assert!(store.delete_game(&other, &game.id).await.is_err());

    store.delete_game(&tenant_id, &game.id).await.unwrap();
    assert!(store.get_game(&tenant_id, &game.id).await.unwrap().is_none());
}

#[tokio::test]
async fn complete_game_rejects_round_writes() {
    let Some(store) = pg_store().await else { return };
    let tenant_id = tenant();
    let game = new_game(&tenant_id);
    store.create_game(&game).await.unwrap();
    let alice = game.players[0].id.clone();
    let round = store
        .add_round(&tenant_id, &game.id, &Round::new(vec![score(&alice, 5)]))
        .await
        .unwrap();

    let finish = GameUpdate {
        name: None,
        is_complete: Some(true),
    };
    assert!(store.update_game(&tenant_id, &game.id, &finish).await.unwrap().is_complete);

    assert!(matches!(
        store
            .add_round(&tenant_id, &game.id, &Round::new(vec![score(&alice, 1)]))
            .await,
        Err(StoreError::GameComplete { .. })
    ));
    assert!(matches!(
        store
            .update_round(&tenant_id, &game.id, &round.id, &[score(&alice, 9)])
            .await,
        Err(StoreError::GameComplete { .. })
    ));
    assert!(matches!(
        store.delete_round(&tenant_id, &game.id, &round.id).await,
        Err(StoreError::GameComplete { .. })
    ));

    let loaded = store.get_game(&tenant_id, &game.id).await.unwrap().unwrap();
    assert_eq!(loaded.rounds, vec![round]);
}

#[tokio::test]
async fn users_upsert_per_tenant() {
    let Some(store) = pg_store().await else { return };
    let tenant_id = tenant();

    store
        .upsert_user(&UserProfile::new("u1", &tenant_id, "Zed"))
        .await
        .unwrap();
    let renamed = store
        .upsert_user(&UserProfile::new("u1", &tenant_id, "Zoe"))
        .await
        .unwrap();
    assert_eq!(renamed.display_name, "Zoe");

    let users = store.list_users(&tenant_id).await.unwrap();
    assert_eq!(users.len(), 1);
    assert!(store.get_user(&tenant(), "u1").await.unwrap().is_none());
}
