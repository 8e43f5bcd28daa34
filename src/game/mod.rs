// Rules layered on top of the data model

pub mod scorer;
pub mod validator;

pub use scorer::{PlayerTotal, Scorer};
pub use validator::{
    validate_game, validate_game_create, validate_game_update, validate_scores, validate_state,
    ValidationError,
};
