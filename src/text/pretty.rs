use crate::models::{BoundsError, EnumError};
use std::{collections::BTreeMap, fmt::Write};

#[derive(Debug, thiserror::Error)]
pub enum PrettyError {
    #[error("ParseError: unable to convert '{input}' to '{type_name}'")]
    Parse { input: String, type_name: String },
    #[error("ParseError: {0}")]
    Enum(#[from] EnumError),
    #[error("ParseError: {0}")]
    Bounds(#[from] BoundsError),
}

impl PrettyError {
    pub(crate) fn parse<T: PrettyValue>(input: &str) -> Self {
        Self::Parse {
            input: input.to_string(),
            type_name: T::type_name(),
        }
    }
}

/// Human readable text form of a value, as found in configuration files.
pub trait PrettyValue: Sized {
    /// Name used in configuration files, e.g. in `map(String, f32) {` headers
    fn type_name() -> String;

    fn write_pretty(&self, out: &mut String);

    fn read_pretty(input: &str) -> Result<Self, PrettyError>;

    fn to_pretty(&self) -> String {
        let mut out = String::new();
        self.write_pretty(&mut out);
        out
    }
}

/// Strips one pair of surrounding double quotes, if any.
pub fn unquote(input: &str) -> &str {
    let trimmed = input.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed)
}

/// Splits `input` on characters matching `is_separator`, ignoring those nested
/// in brackets, parentheses or quotes. Pieces are trimmed and empty ones dropped.
pub(crate) fn split_top_level(input: &str, is_separator: impl Fn(char) -> bool) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut quoted = false;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match c {
            '"' => quoted = !quoted,
            '[' | '(' | '{' if !quoted => depth += 1,
            ']' | ')' | '}' if !quoted => depth = depth.saturating_sub(1),
            c if depth == 0 && !quoted && is_separator(c) => {
                pieces.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    pieces.push(&input[start..]);

    pieces
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

macro_rules! pretty_display {
    ($($t:ty),* $(,)?) => {
        $(
            impl PrettyValue for $t {
                fn type_name() -> String {
                    stringify!($t).to_string()
                }

                fn write_pretty(&self, out: &mut String) {
                    let _ = write!(out, "{}", self);
                }

                fn read_pretty(input: &str) -> Result<Self, PrettyError> {
                    input
                        .trim()
                        .parse()
                        .map_err(|_| PrettyError::parse::<Self>(input))
                }
            }
        )*
    };
}

pretty_display!(i8, i16, i32, i64, u8, u16, u32, u64, usize, f32, f64);

impl PrettyValue for bool {
    fn type_name() -> String {
        "bool".to_string()
    }

    fn write_pretty(&self, out: &mut String) {
        out.push_str(if *self { "true" } else { "false" });
    }

    fn read_pretty(input: &str) -> Result<Self, PrettyError> {
        match input.trim() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(PrettyError::parse::<Self>(input)),
        }
    }
}

impl PrettyValue for String {
    fn type_name() -> String {
        "String".to_string()
    }

    fn write_pretty(&self, out: &mut String) {
        let _ = write!(out, "\"{}\"", self);
    }

    fn read_pretty(input: &str) -> Result<Self, PrettyError> {
        Ok(unquote(input).to_string())
    }
}

fn read_sequence<T: PrettyValue>(input: &str, type_name: impl Fn() -> String) -> Result<Vec<T>, PrettyError> {
    let parse_error = || PrettyError::Parse {
        input: input.to_string(),
        type_name: type_name(),
    };

    let inner = input
        .trim()
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(parse_error)?;

    split_top_level(inner, |c| c == ',')
        .into_iter()
        .map(T::read_pretty)
        .collect()
}

fn write_sequence<'a, T: PrettyValue + 'a>(items: impl Iterator<Item = &'a T>, out: &mut String) {
    out.push('[');
    for (i, item) in items.enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        item.write_pretty(out);
    }
    out.push(']');
}

impl<T: PrettyValue, const N: usize> PrettyValue for [T; N] {
    fn type_name() -> String {
        format!("[{}; {}]", T::type_name(), N)
    }

    fn write_pretty(&self, out: &mut String) {
        write_sequence(self.iter(), out);
    }

    fn read_pretty(input: &str) -> Result<Self, PrettyError> {
        let items = read_sequence::<T>(input, Self::type_name)?;
        items
            .try_into()
            .map_err(|_| PrettyError::parse::<Self>(input))
    }
}

impl<T: PrettyValue> PrettyValue for Vec<T> {
    fn type_name() -> String {
        format!("Vec<{}>", T::type_name())
    }

    fn write_pretty(&self, out: &mut String) {
        write_sequence(self.iter(), out);
    }

    fn read_pretty(input: &str) -> Result<Self, PrettyError> {
        read_sequence(input, Self::type_name)
    }
}

/// Maps span several lines:
///
/// ```text
/// map(String, f32) {
///     "a": 1
///   "bbb": 2
/// }
/// ```
impl<K: PrettyValue + Ord, V: PrettyValue> PrettyValue for BTreeMap<K, V> {
    fn type_name() -> String {
        format!("map({}, {})", K::type_name(), V::type_name())
    }

    fn write_pretty(&self, out: &mut String) {
        let keys: Vec<String> = self.keys().map(PrettyValue::to_pretty).collect();
        let width = keys.iter().map(String::len).max().unwrap_or(0);

        let _ = writeln!(out, "{} {{", Self::type_name());
        for (key, value) in keys.iter().zip(self.values()) {
            let _ = write!(out, "    {key:>width$}: ");
            value.write_pretty(out);
            out.push('\n');
        }
        out.push('}');
    }

    fn read_pretty(input: &str) -> Result<Self, PrettyError> {
        let header = format!("{} {{", Self::type_name());
        let mut map = BTreeMap::new();

        for line in input.lines().map(str::trim) {
            if line.is_empty() || line == header || line == "}" {
                continue;
            }
            let (key, value) = line
                .split_once(": ")
                .ok_or_else(|| PrettyError::parse::<Self>(line))?;
            map.insert(K::read_pretty(key)?, V::read_pretty(value)?);
        }

        Ok(map)
    }
}
