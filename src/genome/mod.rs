mod bounds_field;
mod errors;
mod field;
mod functor;
mod schema;
mod self_aware;
mod value;

pub use errors::{ExtractError, GenomeError, SchemaError};
pub use functor::Functor;
pub use schema::{DISTANCE_WEIGHTS, MUTATION_RATES, Schema, SchemaBuilder, build_schema, schema_of};
pub use self_aware::{AUTOLOG_VARIABLE, DUMP_EXTENSION, Genome, SelfAware, autolog, set_autolog};
pub use value::{FieldValue, extract_leaf, extract_nested};
