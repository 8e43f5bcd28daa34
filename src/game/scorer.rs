use crate::models::{Game, StandingEntry, Standings};

/// Running total for a player, before ranking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerTotal {
    pub player_id: String,
    pub total: i64,
    pub rounds_played: usize,
}

pub struct Scorer;

impl Scorer {
    /// Sum every player's scores across all rounds, in player order.
    ///
    /// Rules:
    /// - A round without an entry for a player adds nothing to that player
    /// - Scores naming a player that is not in the game are ignored
    /// - Totals saturate instead of overflowing
    pub fn totals(game: &Game) -> Vec<PlayerTotal> {
        game.players
            .iter()
            .map(|player| {
                let (total, rounds_played) = game
                    .rounds
                    .iter()
                    .flat_map(|round| round.scores.iter())
                    .filter(|score| score.player_id == player.id)
                    .fold((0_i64, 0_usize), |(total, count), score| {
                        (total.saturating_add(score.score), count + 1)
                    });

                PlayerTotal {
                    player_id: player.id.clone(),
                    total,
                    rounds_played,
                }
            })
            .collect()
    }

    /// Highest total first; ties keep player order.
    ///
    /// `target_reached` only reports whether some total has reached the
    /// target. It never marks the game complete.
    pub fn standings(game: &Game) -> Standings {
        let mut entries: Vec<StandingEntry> = Self::totals(game)
            .into_iter()
            .zip(game.players.iter())
            .map(|(total, player)| StandingEntry {
                player_id: total.player_id,
                name: player.name.clone(),
                total: total.total,
                rounds_played: total.rounds_played,
            })
            .collect();

        // stable sort keeps player order for ties
        entries.sort_by(|a, b| b.total.cmp(&a.total));

        let target_reached = entries.iter().any(|e| e.total >= game.target_score);

        Standings {
            game_id: game.id.clone(),
            target_score: game.target_score,
            target_reached,
            entries,
        }
    }

    /// Player with the highest total, `None` before the first round
    pub fn leader(game: &Game) -> Option<String> {
        if game.rounds.is_empty() {
            return None;
        }
        Self::standings(game)
            .entries
            .into_iter()
            .next()
            .map(|entry| entry.player_id)
    }
}
