mod bounds;
pub mod pretty_enum;
mod summary;
mod weights;

pub use bounds::{Bounded, Bounds, BoundsError, DEFAULT_STDDEV};
pub use pretty_enum::{EnumError, EnumTable, PrettyEnum, humanize};
pub use summary::Summary;
pub use weights::{Weights, WeightsError, uniform_weights, validate_weights};
