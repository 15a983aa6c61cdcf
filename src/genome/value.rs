use super::{ExtractError, Genome};
use crate::models::Summary;
use serde::{Serialize, de::DeserializeOwned};
use std::{any::type_name, fmt};

/// Values that can be stored in a genome field.
///
/// Besides serde, a field value knows how to print itself, how to follow an
/// extraction path (`[1].floatField`) and how to summarize a population of
/// its own kind. Genomes are field values too, which is what makes them
/// nestable.
pub trait FieldValue: Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static {
    fn print_value(&self, out: &mut dyn fmt::Write) -> fmt::Result;

    /// Follows `path`, the part of `full_path` that is left once this value is
    /// reached, and stringifies what it points to
    fn extract_path(&self, path: &str, full_path: &str) -> Result<String, ExtractError>;

    fn summarize(values: &[&Self], verbosity: usize) -> Summary;

    fn print_to_string(&self) -> String {
        let mut out = String::new();
        let _ = self.print_value(&mut out);
        out
    }
}

/// Stringifies a value that has no inner structure. Any remaining path is an
/// error.
#[doc(hidden)]
pub fn extract_leaf<T: FieldValue>(value: &T, path: &str, full_path: &str) -> Result<String, ExtractError> {
    if !path.is_empty() {
        return Err(ExtractError::invalid_path(type_name::<T>(), path, full_path));
    }
    Ok(value.print_to_string())
}

/// Follows `.field` into a genome
#[doc(hidden)]
pub fn extract_nested<G: Genome>(genome: &G, path: &str, full_path: &str) -> Result<String, ExtractError> {
    if path.is_empty() {
        return Ok(genome.print_to_string());
    }
    match path.strip_prefix('.') {
        Some(rest) => G::schema().extract(genome, rest, full_path),
        None => Err(ExtractError::invalid_path(G::NAME, path, full_path)),
    }
}

/// Follows `[index]` into a sequence
fn extract_indexed<T: FieldValue>(
    items: &[T],
    container: &str,
    path: &str,
    full_path: &str,
) -> Result<String, ExtractError> {
    if path.is_empty() {
        let mut out = String::new();
        let _ = print_sequence(items, &mut out);
        return Ok(out);
    }

    let invalid = || ExtractError::invalid_path(container, path, full_path);
    let (index, rest) = path
        .strip_prefix('[')
        .and_then(|p| p.split_once(']'))
        .ok_or_else(invalid)?;
    let index: usize = index.trim().parse().map_err(|_| invalid())?;

    let item = items.get(index).ok_or_else(|| ExtractError::IndexOutOfBounds {
        type_name: container.to_string(),
        index,
        len: items.len(),
        path: full_path.to_string(),
    })?;
    item.extract_path(rest, full_path)
}

fn print_sequence<T: FieldValue>(items: &[T], out: &mut dyn fmt::Write) -> fmt::Result {
    out.write_char('[')?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.write_str(", ")?;
        }
        item.print_value(out)?;
    }
    out.write_char(']')
}

// ============================================================
// Scalars
// ============================================================

macro_rules! field_value_integer {
    ($($t:ty),* $(,)?) => {
        $(
            impl FieldValue for $t {
                fn print_value(&self, out: &mut dyn fmt::Write) -> fmt::Result {
                    write!(out, "{}", self)
                }

                fn extract_path(&self, path: &str, full_path: &str) -> Result<String, ExtractError> {
                    extract_leaf(self, path, full_path)
                }

                fn summarize(values: &[&Self], verbosity: usize) -> Summary {
                    let mut sorted: Vec<Self> = values.iter().map(|v| **v).collect();
                    sorted.sort_unstable();
                    Summary::samples(&sorted, verbosity)
                }
            }
        )*
    };
}

field_value_integer!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

macro_rules! field_value_float {
    ($($t:ty),* $(,)?) => {
        $(
            impl FieldValue for $t {
                fn print_value(&self, out: &mut dyn fmt::Write) -> fmt::Result {
                    write!(out, "{}", self)
                }

                fn extract_path(&self, path: &str, full_path: &str) -> Result<String, ExtractError> {
                    extract_leaf(self, path, full_path)
                }

                fn summarize(values: &[&Self], verbosity: usize) -> Summary {
                    let mut sorted: Vec<Self> = values.iter().map(|v| **v).collect();
                    sorted.sort_by(|a, b| a.total_cmp(b));
                    Summary::samples(&sorted, verbosity)
                }
            }
        )*
    };
}

field_value_float!(f32, f64);

impl FieldValue for bool {
    fn print_value(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(out, "{}", self)
    }

    fn extract_path(&self, path: &str, full_path: &str) -> Result<String, ExtractError> {
        extract_leaf(self, path, full_path)
    }

    fn summarize(values: &[&Self], _verbosity: usize) -> Summary {
        Summary::distinct(values.iter().map(|v| **v))
    }
}

impl FieldValue for String {
    fn print_value(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        out.write_str(self)
    }

    fn extract_path(&self, path: &str, full_path: &str) -> Result<String, ExtractError> {
        extract_leaf(self, path, full_path)
    }

    fn summarize(values: &[&Self], _verbosity: usize) -> Summary {
        Summary::distinct(values.iter().map(|v| v.as_str()))
    }
}

// ============================================================
// Sequences
// ============================================================

impl<T: FieldValue, const N: usize> FieldValue for [T; N]
where
    [T; N]: Serialize + DeserializeOwned,
{
    fn print_value(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        print_sequence(self, out)
    }

    fn extract_path(&self, path: &str, full_path: &str) -> Result<String, ExtractError> {
        extract_indexed(self, type_name::<Self>(), path, full_path)
    }

    fn summarize(values: &[&Self], verbosity: usize) -> Summary {
        Summary::Indexed(
            (0..N)
                .map(|i| {
                    let column: Vec<&T> = values.iter().map(|v| &v[i]).collect();
                    T::summarize(&column, verbosity)
                })
                .collect(),
        )
    }
}

/// Indices missing from the shorter vectors are left out of their summary
impl<T: FieldValue> FieldValue for Vec<T> {
    fn print_value(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        print_sequence(self, out)
    }

    fn extract_path(&self, path: &str, full_path: &str) -> Result<String, ExtractError> {
        extract_indexed(self, type_name::<Self>(), path, full_path)
    }

    fn summarize(values: &[&Self], verbosity: usize) -> Summary {
        let len = values.iter().map(|v| v.len()).max().unwrap_or(0);
        Summary::Indexed(
            (0..len)
                .map(|i| {
                    let column: Vec<&T> = values.iter().filter_map(|v| v.get(i)).collect();
                    T::summarize(&column, verbosity)
                })
                .collect(),
        )
    }
}
