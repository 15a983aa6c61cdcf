mod indent;
mod pretty;

pub use indent::{INDENT, IndentWriter};
pub use pretty::{PrettyError, PrettyValue, unquote};

pub(crate) use pretty::split_top_level;
