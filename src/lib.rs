pub mod config;
pub mod dice;
pub mod genome;
pub mod models;
pub mod text;

pub use config::{ConfigFile, Origin, ReadResult, Verbosity};
pub use dice::{AtomicDice, Dice, DiceExt, FastDice};
pub use genome::{Functor, Genome, SchemaBuilder, SchemaError, SelfAware};
pub use models::Bounds;

#[doc(hidden)]
pub mod __private {
    pub use once_cell::sync::OnceCell;
    pub use serde;
    pub use serde_json;
}
