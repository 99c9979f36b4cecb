pub mod saver;
pub mod session;

pub use saver::{EntitySaver, SaveRequest, StoreEntitySaver};
pub use session::GraphSession;
