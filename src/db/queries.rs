use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{types::Json, PgPool, Result};

use super::store::{GameStore, StoreError, StoreResult};
use crate::models::{
    Game, GameRecord, GameUpdate, Round, RoundRecord, Score, UserProfile, UserRecord,
};

// User queries
pub async fn upsert_user(pool: &PgPool, profile: &UserProfile) -> Result<UserRecord> {
    sqlx::query_as::<_, UserRecord>(
        r#"
        INSERT INTO users (user_id, tenant_id, display_name)
        VALUES ($1, $2, $3)
        ON CONFLICT (tenant_id, user_id)
        DO UPDATE SET
            display_name = $3,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(&profile.user_id)
    .bind(&profile.tenant_id)
    .bind(&profile.display_name)
    .fetch_one(pool)
    .await
}

pub async fn get_user(pool: &PgPool, tenant_id: &str, user_id: &str) -> Result<Option<UserRecord>> {
    sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE tenant_id = $1 AND user_id = $2")
        .bind(tenant_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_users(pool: &PgPool, tenant_id: &str) -> Result<Vec<UserRecord>> {
    sqlx::query_as::<_, UserRecord>(
        "SELECT * FROM users WHERE tenant_id = $1 ORDER BY display_name, user_id",
    )
    .bind(tenant_id)
    .fetch_all(pool)
    .await
}

// Game queries

/// Insert a game together with any rounds it already carries
pub async fn create_game(pool: &PgPool, game: &Game) -> Result<GameRecord> {
    let mut tx = pool.begin().await?;

    let record = sqlx::query_as::<_, GameRecord>(
        r#"
        INSERT INTO games (
            id, tenant_id, user_id, name, date,
            players, user_ids, target_score, is_complete
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(&game.id)
    .bind(&game.tenant_id)
    .bind(&game.user_id)
    .bind(&game.name)
    .bind(&game.date)
    .bind(Json(&game.players))
    .bind(game.user_ids())
    .bind(game.target_score)
    .bind(game.is_complete)
    .fetch_one(&mut *tx)
    .await?;

    // seq is assigned in insertion order, which keeps the rounds' order
    for round in &game.rounds {
        sqlx::query("INSERT INTO rounds (id, game_id, scores) VALUES ($1, $2, $3)")
            .bind(&round.id)
            .bind(&game.id)
            .bind(Json(&round.scores))
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(record)
}

pub async fn get_game_record(
    pool: &PgPool,
    tenant_id: &str,
    game_id: &str,
) -> Result<Option<GameRecord>> {
    sqlx::query_as::<_, GameRecord>("SELECT * FROM games WHERE tenant_id = $1 AND id = $2")
        .bind(tenant_id)
        .bind(game_id)
        .fetch_optional(pool)
        .await
}

pub async fn get_rounds(pool: &PgPool, game_id: &str) -> Result<Vec<RoundRecord>> {
    sqlx::query_as::<_, RoundRecord>("SELECT * FROM rounds WHERE game_id = $1 ORDER BY seq")
        .bind(game_id)
        .fetch_all(pool)
        .await
}

pub async fn get_game(pool: &PgPool, tenant_id: &str, game_id: &str) -> Result<Option<Game>> {
    let record = match get_game_record(pool, tenant_id, game_id).await? {
        Some(r) => r,
        None => return Ok(None),
    };

    let rounds = get_rounds(pool, game_id)
        .await?
        .into_iter()
        .map(Round::from)
        .collect();

    Ok(Some(record.into_game(rounds)))
}

/// Games owned by or shared with `user_id`, newest first
pub async fn list_games_for_user(
    pool: &PgPool,
    tenant_id: &str,
    user_id: &str,
) -> Result<Vec<Game>> {
    let records = sqlx::query_as::<_, GameRecord>(
        r#"
        SELECT * FROM games
        WHERE tenant_id = $1 AND (user_id = $2 OR $2 = ANY(user_ids))
        ORDER BY created_at DESC, id
        "#,
    )
    .bind(tenant_id)
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    if records.is_empty() {
        return Ok(Vec::new());
    }

    // Fetch all rounds in one query and group them per game
    let game_ids: Vec<String> = records.iter().map(|r| r.id.clone()).collect();
    let round_records = sqlx::query_as::<_, RoundRecord>(
        "SELECT * FROM rounds WHERE game_id = ANY($1) ORDER BY seq",
    )
    .bind(&game_ids)
    .fetch_all(pool)
    .await?;

    let mut rounds_by_game: HashMap<String, Vec<Round>> = HashMap::new();
    for record in round_records {
        rounds_by_game
            .entry(record.game_id.clone())
            .or_default()
            .push(Round::from(record));
    }

    Ok(records
        .into_iter()
        .map(|record| {
            let rounds = rounds_by_game.remove(&record.id).unwrap_or_default();
            record.into_game(rounds)
        })
        .collect())
}

pub async fn update_game(
    pool: &PgPool,
    tenant_id: &str,
    game_id: &str,
    update: &GameUpdate,
) -> Result<Option<GameRecord>> {
    sqlx::query_as::<_, GameRecord>(
        r#"
        UPDATE games
        SET name = COALESCE($3, name),
            is_complete = COALESCE($4, is_complete),
            updated_at = NOW()
        WHERE tenant_id = $1 AND id = $2
        RETURNING *
        "#,
    )
    .bind(tenant_id)
    .bind(game_id)
    .bind(update.name.as_deref().map(str::trim))
    .bind(update.is_complete)
    .fetch_optional(pool)
    .await
}

/// Returns false when no game matched. Rounds go with it (ON DELETE CASCADE).
pub async fn delete_game(pool: &PgPool, tenant_id: &str, game_id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM games WHERE tenant_id = $1 AND id = $2")
        .bind(tenant_id)
        .bind(game_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// Round queries

async fn touch_game(pool: &PgPool, game_id: &str) -> Result<()> {
    sqlx::query("UPDATE games SET updated_at = NOW() WHERE id = $1")
        .bind(game_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Append a round; `None` when the game doesn't exist in this tenant or is
/// complete. The game row is share-locked so a concurrent completion either
/// waits for the insert or excludes it.
pub async fn add_round(
    pool: &PgPool,
    tenant_id: &str,
    game_id: &str,
    round: &Round,
) -> Result<Option<RoundRecord>> {
    let record = sqlx::query_as::<_, RoundRecord>(
        r#"
        INSERT INTO rounds (id, game_id, scores)
        SELECT $1, g.id, $3
        FROM games g
        WHERE g.tenant_id = $4 AND g.id = $2 AND NOT g.is_complete
        FOR SHARE
        RETURNING *
        "#,
    )
    .bind(&round.id)
    .bind(game_id)
    .bind(Json(&round.scores))
    .bind(tenant_id)
    .fetch_optional(pool)
    .await?;

    if record.is_some() {
        touch_game(pool, game_id).await?;
    }
    Ok(record)
}

pub async fn update_round(
    pool: &PgPool,
    tenant_id: &str,
    game_id: &str,
    round_id: &str,
    scores: &[Score],
) -> Result<Option<RoundRecord>> {
    let record = sqlx::query_as::<_, RoundRecord>(
        r#"
        UPDATE rounds r
        SET scores = $4,
            updated_at = NOW()
        WHERE r.id = $3
          AND r.game_id = (
              SELECT g.id FROM games g
              WHERE g.id = $2 AND g.tenant_id = $1 AND NOT g.is_complete
              FOR SHARE
          )
        RETURNING r.*
        "#,
    )
    .bind(tenant_id)
    .bind(game_id)
    .bind(round_id)
    .bind(Json(scores))
    .fetch_optional(pool)
    .await?;

    if record.is_some() {
        touch_game(pool, game_id).await?;
    }
    Ok(record)
}

pub async fn delete_round(
    pool: &PgPool,
    tenant_id: &str,
    game_id: &str,
    round_id: &str,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM rounds r
        WHERE r.id = $3
          AND r.game_id = (
              SELECT g.id FROM games g
              WHERE g.id = $2 AND g.tenant_id = $1 AND NOT g.is_complete
              FOR SHARE
          )
        "#,
    )
    .bind(tenant_id)
    .bind(game_id)
    .bind(round_id)
    .execute(pool)
    .await?;

    let deleted = result.rows_affected() > 0;
    if deleted {
        touch_game(pool, game_id).await?;
    }
    Ok(deleted)
}

/// `GameStore` backed by PostgreSQL
#[derive(Clone)]
pub struct PgGameStore {
    pool: PgPool,
}

impl PgGameStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Work out why a round write matched no rows
    async fn round_write_miss(
        &self,
        tenant_id: &str,
        game_id: &str,
        round_id: Option<&str>,
    ) -> StoreError {
        match get_game_record(&self.pool, tenant_id, game_id).await {
            Ok(None) => StoreError::game_not_found(game_id),
            Ok(Some(record)) if record.is_complete => StoreError::game_complete(game_id),
            Ok(Some(_)) => match round_id {
                Some(round_id) => StoreError::round_not_found(round_id),
                None => StoreError::game_not_found(game_id),
            },
            Err(e) => StoreError::Database(e),
        }
    }
}

#[async_trait]
impl GameStore for PgGameStore {
    async fn upsert_user(&self, profile: &UserProfile) -> StoreResult<UserProfile> {
        Ok(upsert_user(&self.pool, profile).await?.into())
    }

    async fn get_user(&self, tenant_id: &str, user_id: &str) -> StoreResult<Option<UserProfile>> {
        Ok(get_user(&self.pool, tenant_id, user_id)
            .await?
            .map(UserProfile::from))
    }

    async fn list_users(&self, tenant_id: &str) -> StoreResult<Vec<UserProfile>> {
        Ok(list_users(&self.pool, tenant_id)
            .await?
            .into_iter()
            .map(UserProfile::from)
            .collect())
    }

    async fn create_game(&self, game: &Game) -> StoreResult<Game> {
        let record = create_game(&self.pool, game).await?;
        Ok(record.into_game(game.rounds.clone()))
    }

    async fn get_game(&self, tenant_id: &str, game_id: &str) -> StoreResult<Option<Game>> {
        Ok(get_game(&self.pool, tenant_id, game_id).await?)
    }

    async fn list_games_for_user(
        &self,
        tenant_id: &str,
        user_id: &str,
    ) -> StoreResult<Vec<Game>> {
        Ok(list_games_for_user(&self.pool, tenant_id, user_id).await?)
    }

    async fn update_game(
        &self,
        tenant_id: &str,
        game_id: &str,
        update: &GameUpdate,
    ) -> StoreResult<Game> {
        let record = update_game(&self.pool, tenant_id, game_id, update)
            .await?
            .ok_or_else(|| StoreError::game_not_found(game_id))?;

        let rounds = get_rounds(&self.pool, game_id)
            .await?
            .into_iter()
            .map(Round::from)
            .collect();

        Ok(record.into_game(rounds))
    }

    async fn delete_game(&self, tenant_id: &str, game_id: &str) -> StoreResult<()> {
        if delete_game(&self.pool, tenant_id, game_id).await? {
            Ok(())
        } else {
            Err(StoreError::game_not_found(game_id))
        }
    }

    async fn add_round(&self, tenant_id: &str, game_id: &str, round: &Round) -> StoreResult<Round> {
        match add_round(&self.pool, tenant_id, game_id, round).await? {
            Some(record) => Ok(record.into()),
            None => Err(self.round_write_miss(tenant_id, game_id, None).await),
        }
    }

    async fn update_round(
        &self,
        tenant_id: &str,
        game_id: &str,
        round_id: &str,
        scores: &[Score],
    ) -> StoreResult<Round> {
        match update_round(&self.pool, tenant_id, game_id, round_id, scores).await? {
            Some(record) => Ok(record.into()),
            None => Err(self
                .round_write_miss(tenant_id, game_id, Some(round_id))
                .await),
        }
    }

    async fn delete_round(
        &self,
        tenant_id: &str,
        game_id: &str,
        round_id: &str,
    ) -> StoreResult<()> {
        if delete_round(&self.pool, tenant_id, game_id, round_id).await? {
            Ok(())
        } else {
            Err(self
                .round_write_miss(tenant_id, game_id, Some(round_id))
                .await)
        }
    }
}
