use super::{ExtractError, FieldValue, GenomeError, Schema, SchemaBuilder, SchemaError, schema_of};
use crate::config::ConfigFile;
use crate::dice::Dice;
use crate::models::Summary;
use once_cell::sync::Lazy;
use std::{
    fmt, fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};
use tracing::warn;

/// Environment variable enabling the mutation log at start up
pub const AUTOLOG_VARIABLE: &str = "autologMutations";

/// Extension of genome dumps
pub const DUMP_EXTENSION: &str = "edna.json";

static AUTOLOG: Lazy<AtomicBool> = Lazy::new(|| {
    let enabled = std::env::var(AUTOLOG_VARIABLE)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false);
    AtomicBool::new(enabled)
});

/// Whether mutations log the field they changed
pub fn autolog() -> bool {
    AUTOLOG.load(Ordering::Relaxed)
}

pub fn set_autolog(enabled: bool) {
    AUTOLOG.store(enabled, Ordering::Relaxed);
}

/// A type whose fields are described once, in [`describe`](Genome::describe),
/// and then operated on generically through its [`Schema`].
///
/// The `*_extension` hooks cover state that is not declared as a field. They
/// run after the declared fields and do nothing by default.
pub trait Genome: FieldValue + Default {
    /// Name of the type, also used for its configuration file
    const NAME: &'static str;

    fn describe(schema: SchemaBuilder<Self>) -> Result<SchemaBuilder<Self>, SchemaError>;

    fn schema() -> &'static Schema<Self> {
        schema_of::<Self>()
    }

    fn config() -> &'static ConfigFile {
        Self::schema().config()
    }

    fn random_extension(&mut self, _dice: &mut dyn Dice) {}

    fn mutate_extension(&mut self, _dice: &mut dyn Dice) {}

    fn cross_extension(&mut self, _lhs: &Self, _rhs: &Self, _dice: &mut dyn Dice) {}

    fn distance_extension(&self, _other: &Self) -> f64 {
        0.0
    }

    fn check_extension(&mut self) -> bool {
        true
    }

    fn equal_extension(&self, _other: &Self) -> bool {
        true
    }

    fn to_json_extension(
        &self,
        _json: &mut serde_json::Map<String, serde_json::Value>,
    ) -> Result<(), serde_json::Error> {
        Ok(())
    }

    /// Keys consumed here must be removed from `json`, the remaining ones are
    /// matched against the declared fields
    fn from_json_extension(
        &mut self,
        _json: &mut serde_json::Map<String, serde_json::Value>,
    ) -> Result<(), GenomeError> {
        Ok(())
    }

    fn print_extension(&self, _out: &mut dyn fmt::Write) -> fmt::Result {
        Ok(())
    }
}

/// Method-call surface of every [`Genome`]
pub trait SelfAware: Genome {
    fn random(dice: &mut dyn Dice) -> Self {
        Self::schema().random(dice)
    }

    fn mutate(&mut self, dice: &mut dyn Dice) -> Result<(), GenomeError> {
        Self::schema().mutate(self, dice)
    }

    fn cross(lhs: &Self, rhs: &Self, dice: &mut dyn Dice) -> Self {
        Self::schema().cross(lhs, rhs, dice)
    }

    fn distance(&self, other: &Self) -> f64 {
        Self::schema().distance(self, other)
    }

    fn check(&mut self) -> bool {
        Self::schema().check(self)
    }

    fn to_json(&self) -> Result<serde_json::Value, GenomeError> {
        Ok(Self::schema().to_json(self)?)
    }

    fn from_json(json: &serde_json::Value) -> Result<Self, GenomeError> {
        Self::schema().from_json(json)
    }

    /// Stringified value at `path`, e.g. `vectorField[1].floatField`
    fn get_field(&self, path: &str) -> Result<String, ExtractError> {
        Self::schema().extract(self, path, path)
    }

    fn aggregate(population: &[Self], verbosity: usize) -> Result<Summary, GenomeError> {
        let refs: Vec<&Self> = population.iter().collect();
        Self::schema().aggregate(&refs, verbosity)
    }

    /// Pretty printed json
    fn dump(&self) -> Result<String, GenomeError> {
        Ok(serde_json::to_string_pretty(&self.to_json()?)?)
    }

    /// Checks, then writes a json dump. A path without extension is taken as a
    /// folder, in which `<Name>.edna.json` is written.
    fn to_file(&mut self, path: impl AsRef<Path>) -> Result<PathBuf, GenomeError> {
        if !self.check() {
            warn!(type_name = Self::NAME, "Dumping a genome with out-of-range values");
        }

        let path = path.as_ref();
        let path = if path.extension().is_some() {
            path.to_path_buf()
        } else {
            path.join(format!("{}.{DUMP_EXTENSION}", Self::NAME))
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| GenomeError::io(dir, e))?;
        }

        fs::write(&path, self.dump()?).map_err(|e| GenomeError::io(&path, e))?;
        Ok(path)
    }

    fn from_file(path: impl AsRef<Path>) -> Result<Self, GenomeError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| GenomeError::io(path, e))?;
        Self::from_json(&serde_json::from_str(&text)?)
    }
}

impl<G: Genome> SelfAware for G {}

/// Implements `Display`, `PartialEq`, serde and [`FieldValue`] for a
/// [`Genome`], all through its schema.
///
/// ```
/// use edna::genome::{Genome, SchemaBuilder, SchemaError, SelfAware};
/// use edna::models::Bounds;
///
/// #[derive(Debug, Clone, Default)]
/// struct Point {
///     x: i32,
/// }
///
/// impl Genome for Point {
///     const NAME: &'static str = "Point";
///
///     fn describe(schema: SchemaBuilder<Self>) -> Result<SchemaBuilder<Self>, SchemaError> {
///         schema.with_bounds("x", |p| &p.x, |p| &mut p.x, Bounds::new(-5, 0, 0, 5)?)
///     }
/// }
///
/// edna::self_aware!(Point);
///
/// let point = Point { x: 3 };
/// assert_eq!(point.get_field("x").unwrap(), "3");
/// assert_eq!(point.to_string(), "\n  x: 3");
/// ```
#[macro_export]
macro_rules! self_aware {
    ($name:ty) => {
        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                <$name as $crate::genome::Genome>::schema().print(self, f)
            }
        }

        impl ::std::cmp::PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                <$name as $crate::genome::Genome>::schema().equal(self, other)
            }
        }

        impl $crate::__private::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: $crate::__private::serde::Serializer,
            {
                use $crate::__private::serde::{Serialize as _, ser::Error as _};
                <$name as $crate::genome::Genome>::schema()
                    .to_json(self)
                    .map_err(S::Error::custom)?
                    .serialize(serializer)
            }
        }

        impl<'de> $crate::__private::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: $crate::__private::serde::Deserializer<'de>,
            {
                use $crate::__private::serde::de::Error as _;
                let json = <$crate::__private::serde_json::Value as $crate::__private::serde::Deserialize>::deserialize(deserializer)?;
                <$name as $crate::genome::Genome>::schema()
                    .from_json(&json)
                    .map_err(D::Error::custom)
            }
        }

        impl $crate::genome::FieldValue for $name {
            fn print_value(&self, out: &mut dyn ::std::fmt::Write) -> ::std::fmt::Result {
                <$name as $crate::genome::Genome>::schema().print(self, out)
            }

            fn extract_path(
                &self,
                path: &str,
                full_path: &str,
            ) -> Result<String, $crate::genome::ExtractError> {
                $crate::genome::extract_nested(self, path, full_path)
            }

            fn summarize(values: &[&Self], verbosity: usize) -> $crate::models::Summary {
                <$name as $crate::genome::Genome>::schema().summarize(values, verbosity)
            }
        }
    };
}
