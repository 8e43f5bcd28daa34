pub mod games;

pub use games::{GameService, ServiceError, ServiceResult};
