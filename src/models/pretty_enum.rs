use crate::dice::{Dice, DiceExt};
use crate::models::{Bounded, Bounds};
use serde::{Deserialize, Deserializer, Serializer};
use std::{collections::HashMap, fmt};

#[derive(Debug, thiserror::Error)]
pub enum EnumError {
    #[error("OutOfRange: '{input}' is not a valid {enum_name}")]
    OutOfRange {
        enum_name: &'static str,
        input: String,
    },
}

impl EnumError {
    pub(crate) fn out_of_range(enum_name: &'static str, input: &str) -> Self {
        Self::OutOfRange {
            enum_name,
            input: input.to_string(),
        }
    }
}

/// `SOME_VALUE` -> `Some value`
pub fn humanize(name: &str) -> String {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };

    first
        .to_uppercase()
        .chain(chars.flat_map(char::to_lowercase))
        .map(|c| if c == '_' { ' ' } else { c })
        .collect()
}

#[derive(Debug)]
struct EnumEntry<E> {
    value: E,
    name: &'static str,
    pretty: String,
}

/// Name/value tables of one enumeration, built once on first use.
#[derive(Debug)]
pub struct EnumTable<E> {
    entries: Vec<EnumEntry<E>>,
    by_underlying: HashMap<i64, usize>,
    by_spelling: HashMap<String, usize>,
}

impl<E: Copy> EnumTable<E> {
    pub fn new(enum_name: &str, values: &[(E, &'static str, i64)]) -> Self {
        let mut entries = Vec::with_capacity(values.len());
        let mut by_underlying = HashMap::new();
        let mut by_spelling = HashMap::new();

        for (index, (value, name, underlying)) in values.iter().enumerate() {
            let pretty = humanize(name);
            by_underlying.insert(*underlying, index);
            for spelling in [
                name.to_string(),
                format!("{enum_name}::{name}"),
                pretty.clone(),
            ] {
                by_spelling.insert(spelling.to_lowercase(), index);
            }
            entries.push(EnumEntry {
                value: *value,
                name,
                pretty,
            });
        }

        Self {
            entries,
            by_underlying,
            by_spelling,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Enumerators in declaration order
    pub fn values(&self) -> impl Iterator<Item = E> + '_ {
        self.entries.iter().map(|e| e.value)
    }

    pub fn name(&self, underlying: i64) -> Option<&str> {
        self.by_underlying
            .get(&underlying)
            .map(|i| self.entries[*i].name)
    }

    pub fn pretty_name(&self, underlying: i64) -> Option<&str> {
        self.by_underlying
            .get(&underlying)
            .map(|i| self.entries[*i].pretty.as_str())
    }

    pub fn from_underlying(&self, underlying: i64) -> Option<E> {
        self.by_underlying
            .get(&underlying)
            .map(|i| self.entries[*i].value)
    }

    /// Case-insensitive lookup accepting the exact, scoped and humanized names
    pub fn find(&self, input: &str) -> Option<E> {
        self.by_spelling
            .get(&input.trim().to_lowercase())
            .map(|i| self.entries[*i].value)
    }
}

/// Enumerations with name metadata. Implemented by [`pretty_enum!`](crate::pretty_enum).
pub trait PrettyEnum: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    const NAME: &'static str;

    fn table() -> &'static EnumTable<Self>;

    fn underlying(self) -> i64;

    fn name(self) -> &'static str {
        Self::table().name(self.underlying()).unwrap_or_default()
    }

    fn pretty_name(self) -> &'static str {
        Self::table()
            .pretty_name(self.underlying())
            .unwrap_or_default()
    }

    fn from_name(input: &str) -> Result<Self, EnumError> {
        Self::table()
            .find(input)
            .ok_or_else(|| EnumError::out_of_range(Self::NAME, input))
    }

    fn from_underlying(value: i64) -> Option<Self> {
        Self::table().from_underlying(value)
    }

    fn is_valid(value: i64) -> bool {
        Self::from_underlying(value).is_some()
    }

    fn values() -> impl Iterator<Item = Self> {
        Self::table().values()
    }

    fn size() -> usize {
        Self::table().len()
    }

    fn random(dice: &mut dyn Dice) -> Self {
        let table = Self::table();
        let index = dice.draw(0, table.len().saturating_sub(1));
        table.entries[index].value
    }
}

#[doc(hidden)]
pub fn serialize_enum<E: PrettyEnum, S: Serializer>(
    value: &E,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value.name())
}

#[doc(hidden)]
pub fn deserialize_enum<'de, E: PrettyEnum, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<E, D::Error> {
    let name = String::deserialize(deserializer)?;
    E::from_name(&name).map_err(serde::de::Error::custom)
}

// ============================================================
// Bounds, through the underlying integers
// ============================================================

fn within<E: PrettyEnum>(lower: E, upper: E) -> impl Iterator<Item = E> {
    let (lower, upper) = (lower.underlying(), upper.underlying());
    E::values().filter(move |v| (lower..=upper).contains(&v.underlying()))
}

#[doc(hidden)]
pub fn enum_rand<E: PrettyEnum + Bounded>(bounds: &Bounds<E>, dice: &mut dyn Dice) -> E {
    let candidates: Vec<E> = within(*bounds.rnd_min(), *bounds.rnd_max()).collect();
    match candidates.len() {
        0 => *bounds.rnd_min(),
        n => candidates[dice.draw(0, n - 1)],
    }
}

/// Steps to the previous or next valid enumerator, moving away from the edges
#[doc(hidden)]
pub fn enum_mutate<E: PrettyEnum + Bounded>(value: &mut E, bounds: &Bounds<E>, dice: &mut dyn Dice) {
    let mut ladder: Vec<E> = within(*bounds.min(), *bounds.max()).collect();
    ladder.sort_by_key(|v| v.underlying());

    let Some(position) = ladder.iter().position(|v| v == value) else {
        return;
    };
    let last = ladder.len().saturating_sub(1);
    let next = match position {
        _ if last == 0 => return,
        0 => 1,
        p if p == last => last - 1,
        p => dice.toss(p - 1, p + 1),
    };
    *value = ladder[next];
}

#[doc(hidden)]
pub fn enum_distance<E: PrettyEnum + Bounded>(lhs: &E, rhs: &E, bounds: &Bounds<E>) -> f64 {
    let span = (bounds.max().underlying() - bounds.min().underlying()) as f64;
    if span == 0.0 {
        return 0.0;
    }
    (lhs.underlying() - rhs.underlying()).abs() as f64 / span
}

#[doc(hidden)]
pub fn enum_check<E: PrettyEnum + Bounded>(value: &mut E, bounds: &Bounds<E>) -> bool {
    if value.underlying() < bounds.min().underlying() {
        *value = *bounds.min();
        false
    } else if bounds.max().underlying() < value.underlying() {
        *value = *bounds.max();
        false
    } else {
        true
    }
}

/// Declares an enumeration along with its name tables, text form, serde
/// representation, bounds and genome field behaviour.
///
/// ```
/// edna::pretty_enum! {
///     pub enum Shape { ROUND, SQUARE_ISH = 4 }
/// }
///
/// use edna::models::PrettyEnum;
/// assert_eq!(Shape::from_name("square ish").unwrap(), Shape::SQUARE_ISH);
/// assert_eq!(Shape::SQUARE_ISH.pretty_name(), "Square ish");
/// ```
#[macro_export]
macro_rules! pretty_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident $(= $value:expr)?),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[allow(non_camel_case_types)]
        $vis enum $name {
            $($(#[$vmeta])* $variant $(= $value)?),+
        }

        impl $crate::models::PrettyEnum for $name {
            const NAME: &'static str = stringify!($name);

            fn table() -> &'static $crate::models::EnumTable<Self> {
                static TABLE: $crate::__private::OnceCell<$crate::models::EnumTable<$name>> =
                    $crate::__private::OnceCell::new();
                TABLE.get_or_init(|| {
                    $crate::models::EnumTable::new(
                        stringify!($name),
                        &[$(($name::$variant, stringify!($variant), $name::$variant as i64)),+],
                    )
                })
            }

            fn underlying(self) -> i64 {
                self as i64
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::models::PrettyEnum::name(*self))
            }
        }

        impl $crate::text::PrettyValue for $name {
            fn type_name() -> String {
                stringify!($name).to_string()
            }

            fn write_pretty(&self, out: &mut String) {
                out.push_str($crate::models::PrettyEnum::name(*self));
            }

            fn read_pretty(input: &str) -> Result<Self, $crate::text::PrettyError> {
                Ok(<Self as $crate::models::PrettyEnum>::from_name(input)?)
            }
        }

        impl $crate::models::Bounded for $name {
            type Stddev = f64;

            fn default_stddev() -> f64 {
                $crate::models::DEFAULT_STDDEV
            }

            fn is_ordered(lower: &Self, upper: &Self) -> bool {
                lower <= upper
            }

            fn rand(
                bounds: &$crate::models::Bounds<Self>,
                dice: &mut dyn $crate::dice::Dice,
            ) -> Self {
                $crate::models::pretty_enum::enum_rand(bounds, dice)
            }

            fn mutate(
                value: &mut Self,
                bounds: &$crate::models::Bounds<Self>,
                dice: &mut dyn $crate::dice::Dice,
            ) {
                $crate::models::pretty_enum::enum_mutate(value, bounds, dice)
            }

            fn distance(lhs: &Self, rhs: &Self, bounds: &$crate::models::Bounds<Self>) -> f64 {
                $crate::models::pretty_enum::enum_distance(lhs, rhs, bounds)
            }

            fn check(value: &mut Self, bounds: &$crate::models::Bounds<Self>) -> bool {
                $crate::models::pretty_enum::enum_check(value, bounds)
            }
        }

        impl $crate::__private::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: $crate::__private::serde::Serializer,
            {
                $crate::models::pretty_enum::serialize_enum(self, serializer)
            }
        }

        impl<'de> $crate::__private::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: $crate::__private::serde::Deserializer<'de>,
            {
                $crate::models::pretty_enum::deserialize_enum(deserializer)
            }
        }

        impl $crate::genome::FieldValue for $name {
            fn print_value(&self, out: &mut dyn ::std::fmt::Write) -> ::std::fmt::Result {
                out.write_str($crate::models::PrettyEnum::name(*self))
            }

            fn extract_path(
                &self,
                path: &str,
                full_path: &str,
            ) -> Result<String, $crate::genome::ExtractError> {
                $crate::genome::extract_leaf(self, path, full_path)
            }

            fn summarize(values: &[&Self], _verbosity: usize) -> $crate::models::Summary {
                let mut sorted: Vec<Self> = values.iter().map(|v| **v).collect();
                sorted.sort();
                sorted.dedup();
                $crate::models::Summary::Distinct(
                    sorted
                        .into_iter()
                        .map(|v| $crate::models::PrettyEnum::name(v).to_string())
                        .collect(),
                )
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::FastDice;
    use crate::text::PrettyValue;

    crate::pretty_enum! {
        enum Color { RED, DARK_GREEN = 5, Blue }
    }

    #[test]
    fn it_humanizes_names() {
        assert_eq!(humanize("DARK_GREEN"), "Dark green");
        assert_eq!(humanize("Blue"), "Blue");
        assert_eq!(humanize(""), "");
    }

    #[test]
    fn it_round_trips_every_name() {
        for color in Color::values() {
            assert_eq!(Color::from_name(color.name()).unwrap(), color);
            assert_eq!(Color::from_name(color.pretty_name()).unwrap(), color);
        }
    }

    #[test]
    fn it_accepts_scoped_and_case_insensitive_names() {
        assert_eq!(Color::from_name("Color::DARK_GREEN").unwrap(), Color::DARK_GREEN);
        assert_eq!(Color::from_name("  dark green").unwrap(), Color::DARK_GREEN);
        assert_eq!(Color::from_name("blue").unwrap(), Color::Blue);
    }

    #[test]
    fn it_rejects_unknown_names() {
        let err = Color::from_name("purple").unwrap_err();
        assert!(matches!(err, EnumError::OutOfRange { enum_name: "Color", .. }));
        assert!(Color::read_pretty("purple").is_err());
    }

    #[test]
    fn it_keeps_declaration_order_and_explicit_values() {
        let values: Vec<Color> = Color::values().collect();
        assert_eq!(values, vec![Color::RED, Color::DARK_GREEN, Color::Blue]);
        assert_eq!(Color::size(), 3);
        assert_eq!(Color::Blue.underlying(), 6);
        assert!(Color::is_valid(5));
        assert!(!Color::is_valid(1));
        assert_eq!(Color::from_underlying(0), Some(Color::RED));
    }

    #[test]
    fn it_samples_valid_enumerators() {
        let mut dice = FastDice::new(42);
        for _ in 0..100 {
            let color = Color::random(&mut dice);
            assert!(Color::is_valid(color.underlying()));
        }
    }

    #[test]
    fn it_serializes_by_name() {
        let json = serde_json::to_string(&Color::DARK_GREEN).unwrap();
        assert_eq!(json, "\"DARK_GREEN\"");
        let back: Color = serde_json::from_str("\"dark green\"").unwrap();
        assert_eq!(back, Color::DARK_GREEN);
        assert!(serde_json::from_str::<Color>("\"purple\"").is_err());
    }

    #[test]
    fn it_steps_between_valid_enumerators() {
        let mut dice = FastDice::new(42);
        let bounds = Bounds::new(Color::RED, Color::RED, Color::Blue, Color::Blue).unwrap();

        let mut color = Color::RED;
        bounds.mutate(&mut color, &mut dice);
        assert_eq!(color, Color::DARK_GREEN);

        let mut color = Color::Blue;
        bounds.mutate(&mut color, &mut dice);
        assert_eq!(color, Color::DARK_GREEN);

        let mut color = Color::DARK_GREEN;
        bounds.mutate(&mut color, &mut dice);
        assert!(color == Color::RED || color == Color::Blue);
    }

    #[test]
    fn it_checks_enum_bounds() {
        let bounds = Bounds::new(Color::DARK_GREEN, Color::DARK_GREEN, Color::Blue, Color::Blue).unwrap();
        let mut color = Color::RED;
        assert!(!bounds.check(&mut color));
        assert_eq!(color, Color::DARK_GREEN);
        assert!(bounds.check(&mut color));
        assert_eq!(bounds.distance(&Color::DARK_GREEN, &Color::Blue), 1.0);
    }
}
