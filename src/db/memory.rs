use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use super::store::{GameStore, StoreError, StoreResult};
use crate::models::{Game, GameUpdate, Round, Score, UserProfile};

/// A stored game plus its creation sequence number (for newest-first listing)
#[derive(Debug, Clone)]
struct StoredGame {
    game: Game,
    seq: u64,
}

/// `GameStore` kept in process memory. Used when no database is configured
/// and by the test suites.
#[derive(Debug, Default)]
pub struct MemoryGameStore {
    /// Users keyed by (tenant_id, user_id)
    users: DashMap<(String, String), UserProfile>,
    /// Games keyed by game id
    games: DashMap<String, StoredGame>,
    next_seq: AtomicU64,
}

impl MemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutate a game in place if it exists in `tenant_id`
    fn with_game_mut<T>(
        &self,
        tenant_id: &str,
        game_id: &str,
        f: impl FnOnce(&mut Game) -> StoreResult<T>,
    ) -> StoreResult<T> {
        match self.games.get_mut(game_id) {
            Some(mut stored) if stored.game.tenant_id == tenant_id => f(&mut stored.game),
            _ => Err(StoreError::game_not_found(game_id)),
        }
    }

    /// Like `with_game_mut`, but refuses complete games while holding the entry lock
    fn with_open_game_mut<T>(
        &self,
        tenant_id: &str,
        game_id: &str,
        f: impl FnOnce(&mut Game) -> StoreResult<T>,
    ) -> StoreResult<T> {
        self.with_game_mut(tenant_id, game_id, |game| {
            if game.is_complete {
                return Err(StoreError::game_complete(game_id));
            }
            f(game)
        })
    }
}

#[async_trait]
impl GameStore for MemoryGameStore {
    async fn upsert_user(&self, profile: &UserProfile) -> StoreResult<UserProfile> {
        self.users.insert(
            (profile.tenant_id.clone(), profile.user_id.clone()),
            profile.clone(),
        );
        Ok(profile.clone())
    }

    async fn get_user(&self, tenant_id: &str, user_id: &str) -> StoreResult<Option<UserProfile>> {
        Ok(self
            .users
            .get(&(tenant_id.to_string(), user_id.to_string()))
            .map(|u| u.value().clone()))
    }

    async fn list_users(&self, tenant_id: &str) -> StoreResult<Vec<UserProfile>> {
        let mut users: Vec<UserProfile> = self
            .users
            .iter()
            .filter(|entry| entry.key().0 == tenant_id)
            .map(|entry| entry.value().clone())
            .collect();
        users.sort_by(|a, b| {
            a.display_name
                .cmp(&b.display_name)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        Ok(users)
    }

    async fn create_game(&self, game: &Game) -> StoreResult<Game> {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        self.games.insert(
            game.id.clone(),
            StoredGame {
                game: game.clone(),
                seq,
            },
        );
        Ok(game.clone())
    }

    async fn get_game(&self, tenant_id: &str, game_id: &str) -> StoreResult<Option<Game>> {
        Ok(self
            .games
            .get(game_id)
            .filter(|stored| stored.game.tenant_id == tenant_id)
            .map(|stored| stored.game.clone()))
    }

    async fn list_games_for_user(
        &self,
        tenant_id: &str,
        user_id: &str,
    ) -> StoreResult<Vec<Game>> {
        let mut stored: Vec<StoredGame> = self
            .games
            .iter()
            .filter(|entry| {
                entry.game.tenant_id == tenant_id && entry.game.is_visible_to(user_id)
            })
            .map(|entry| entry.value().clone())
            .collect();

        stored.sort_by(|a, b| b.seq.cmp(&a.seq));
        Ok(stored.into_iter().map(|s| s.game).collect())
    }

    async fn update_game(
        &self,
        tenant_id: &str,
        game_id: &str,
        update: &GameUpdate,
    ) -> StoreResult<Game> {
        self.with_game_mut(tenant_id, game_id, |game| {
            update.apply(game);
            Ok(game.clone())
        })
    }

    async fn delete_game(&self, tenant_id: &str, game_id: &str) -> StoreResult<()> {
        self.games
            .remove_if(game_id, |_, stored| stored.game.tenant_id == tenant_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::game_not_found(game_id))
    }

    async fn add_round(&self, tenant_id: &str, game_id: &str, round: &Round) -> StoreResult<Round> {
        self.with_open_game_mut(tenant_id, game_id, |game| {
            game.rounds.push(round.clone());
            Ok(round.clone())
        })
    }

    async fn update_round(
        &self,
        tenant_id: &str,
        game_id: &str,
        round_id: &str,
        scores: &[Score],
    ) -> StoreResult<Round> {
        self.with_open_game_mut(tenant_id, game_id, |game| {
            let round = game
                .rounds
                .iter_mut()
                .find(|r| r.id == round_id)
                .ok_or_else(|| StoreError::round_not_found(round_id))?;
            round.scores = scores.to_vec();
            Ok(round.clone())
        })
    }

    async fn delete_round(
        &self,
        tenant_id: &str,
        game_id: &str,
        round_id: &str,
    ) -> StoreResult<()> {
        self.with_open_game_mut(tenant_id, game_id, |game| {
            let index = game
                .rounds
                .iter()
                .position(|r| r.id == round_id)
                .ok_or_else(|| StoreError::round_not_found(round_id))?;
            game.rounds.remove(index);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_game;
    use tokio_test::{assert_err, assert_ok};

    fn round(id: &str, player_id: &str, score: i64) -> Round {
        Round {
            id: id.to_string(),
            scores: vec![Score {
                player_id: player_id.to_string(),
                score,
            }],
        }
    }

    #[tokio::test]
    async fn test_game_is_scoped_to_tenant() {
        let store = MemoryGameStore::new();
        assert_ok!(store.create_game(&sample_game()).await);

        assert!(store.get_game("t1", "g1").await.unwrap().is_some());
        assert!(store.get_game("other", "g1").await.unwrap().is_none());
        assert_err!(store.delete_game("other", "g1").await);
        assert_err!(store.add_round("other", "g1", &round("r9", "p1", 1)).await);
    }

    #[tokio::test]
    async fn test_list_games_newest_first_for_participants() {
        let store = MemoryGameStore::new();
        let first = sample_game();
        let mut second = sample_game();
        second.id = "g2".to_string();
        let mut foreign = sample_game();
        foreign.id = "g3".to_string();
        foreign.user_id = "someone".to_string();
        foreign.players.truncate(1);

        for game in [&first, &second, &foreign] {
            store.create_game(game).await.unwrap();
        }

        let owned: Vec<String> = store
            .list_games_for_user("t1", "u1")
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.id)
            .collect();
        assert_eq!(owned, vec!["g2".to_string(), "g1".to_string()]);

        // u9 is a registered player in g1 and g2 only
        let shared = store.list_games_for_user("t1", "u9").await.unwrap();
        assert_eq!(shared.len(), 2);
        assert!(store.list_games_for_user("t2", "u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rounds_keep_insertion_order() {
        let store = MemoryGameStore::new();
        store.create_game(&sample_game()).await.unwrap();

        store.add_round("t1", "g1", &round("r2", "p1", 4)).await.unwrap();
        store.add_round("t1", "g1", &round("r3", "p2", 6)).await.unwrap();

        let game = store.get_game("t1", "g1").await.unwrap().unwrap();
        let ids: Vec<&str> = game.rounds.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2", "r3"]);
    }

    #[tokio::test]
    async fn test_update_and_delete_round() {
        let store = MemoryGameStore::new();
        store.create_game(&sample_game()).await.unwrap();

        let scores = vec![Score {
            player_id: "p2".to_string(),
            score: 99,
        }];
        let updated = store.update_round("t1", "g1", "r1", &scores).await.unwrap();
        assert_eq!(updated.scores, scores);

        assert!(matches!(
            store.update_round("t1", "g1", "nope", &scores).await,
            Err(StoreError::NotFound { entity: "round", .. })
        ));

        store.delete_round("t1", "g1", "r1").await.unwrap();
        let game = store.get_game("t1", "g1").await.unwrap().unwrap();
        assert!(game.rounds.is_empty());
    }

    #[tokio::test]
    async fn test_update_game_applies_changes() {
        let store = MemoryGameStore::new();
        store.create_game(&sample_game()).await.unwrap();

        let update = GameUpdate {
            name: None,
            is_complete: Some(true),
        };
        let game = store.update_game("t1", "g1", &update).await.unwrap();
        assert!(game.is_complete);
        assert_eq!(game.rounds.len(), 1);
    }

    #[tokio::test]
    async fn test_complete_game_rejects_round_writes() {
        let store = MemoryGameStore::new();
        store.create_game(&sample_game()).await.unwrap();
        let finish = GameUpdate {
            name: None,
            is_complete: Some(true),
        };
        store.update_game("t1", "g1", &finish).await.unwrap();

        let scores = vec![Score {
            player_id: "p1".to_string(),
            score: 1,
        }];
        assert!(matches!(
            store.add_round("t1", "g1", &round("r2", "p1", 1)).await,
            Err(StoreError::GameComplete { .. })
        ));
        assert!(matches!(
            store.update_round("t1", "g1", "r1", &scores).await,
            Err(StoreError::GameComplete { .. })
        ));
        assert!(matches!(
            store.delete_round("t1", "g1", "r1").await,
            Err(StoreError::GameComplete { .. })
        ));

        let game = store.get_game("t1", "g1").await.unwrap().unwrap();
        assert_eq!(game.rounds.len(), 1);
        assert_eq!(game.rounds[0].scores[0].score, 10);
    }

    #[tokio::test]
    async fn test_users_are_per_tenant() {
        let store = MemoryGameStore::new();
        store
            .upsert_user(&UserProfile::new("u1", "t1", "Zed"))
            .await
            .unwrap();
        store
            .upsert_user(&UserProfile::new("u2", "t1", "Amy"))
            .await
            .unwrap();
        store
            .upsert_user(&UserProfile::new("u1", "t2", "Other Zed"))
            .await
            .unwrap();

        let names: Vec<String> = store
            .list_users("t1")
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.display_name)
            .collect();
        assert_eq!(names, vec!["Amy".to_string(), "Zed".to_string()]);

        let other = store.get_user("t2", "u1").await.unwrap().unwrap();
        assert_eq!(other.display_name, "Other Zed");
    }
}
