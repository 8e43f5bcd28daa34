pub mod game;
pub mod requests;
pub mod standings;
pub mod state;
pub mod user;

pub use game::{
    // API models
    format_game_date, Game, Player, Round, Score,
    // Database rows
    GameRecord, RoundRecord,
};
pub use requests::{
    GameCreate, GameUpdate, GamesResponse, PlayerInput, RoundCreate, RoundUpdate,
    DEFAULT_TARGET_SCORE,
};
pub use standings::{StandingEntry, Standings};
pub use state::GameState;
pub use user::{UserProfile, UserRecord};
