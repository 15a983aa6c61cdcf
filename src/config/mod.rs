mod errors;
mod file;
mod origin;
mod param;
mod read_result;
mod verbosity;

pub use errors::ConfigError;
pub use file::{ConfigFile, EXTENSION, FOLDER, Target};
pub use origin::Origin;
pub use param::{Param, Parameter};
pub use read_result::ReadResult;
pub use verbosity::{Verbosity, verbosity_values};
