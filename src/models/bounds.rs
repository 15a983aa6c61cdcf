use crate::dice::{Dice, DiceExt};
use crate::text::{PrettyError, PrettyValue, split_top_level};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::DeserializeOwned};
use std::fmt;
use tracing::{instrument, warn};

/// Default mutation scale, as a fraction of the `[min, max]` span
pub const DEFAULT_STDDEV: f64 = 1e-2;

#[derive(Debug, thiserror::Error)]
pub enum BoundsError {
    #[error(
        "InvalidBounds: expected min <= rndMin <= rndMax <= max. min={min}, rndMin={rnd_min}, rndMax={rnd_max}, max={max}"
    )]
    InvalidBounds {
        min: String,
        rnd_min: String,
        rnd_max: String,
        max: String,
    },
}

impl BoundsError {
    pub(crate) fn invalid_bounds<T: fmt::Debug>(min: &T, rnd_min: &T, rnd_max: &T, max: &T) -> Self {
        Self::InvalidBounds {
            min: format!("{min:?}"),
            rnd_min: format!("{rnd_min:?}"),
            rnd_max: format!("{rnd_max:?}"),
            max: format!("{max:?}"),
        }
    }
}

/// Values that can be driven by a [`Bounds`] quadruple.
pub trait Bounded: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Mutation scale. A fraction of the span for scalars, one per index for arrays.
    type Stddev: Clone + PartialEq + fmt::Debug + Send + Sync + 'static;

    fn default_stddev() -> Self::Stddev;

    fn is_ordered(lower: &Self, upper: &Self) -> bool;

    fn rand(bounds: &Bounds<Self>, dice: &mut dyn Dice) -> Self;

    fn mutate(value: &mut Self, bounds: &Bounds<Self>, dice: &mut dyn Dice);

    fn distance(lhs: &Self, rhs: &Self, bounds: &Bounds<Self>) -> f64;

    /// Clamps `value` into `[min, max]`. Returns whether it already was.
    fn check(value: &mut Self, bounds: &Bounds<Self>) -> bool;
}

/// `min <= rnd_min <= rnd_max <= max`, plus the mutation scale.
///
/// Random values are drawn in `[rnd_min, rnd_max]` while mutations and checks
/// use the whole `[min, max]` range.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds<T: Bounded> {
    pub(crate) min: T,
    pub(crate) rnd_min: T,
    pub(crate) rnd_max: T,
    pub(crate) max: T,
    pub(crate) stddev: T::Stddev,
}

impl<T: Bounded> Bounds<T> {
    #[instrument(level = "debug")]
    pub fn new(min: T, rnd_min: T, rnd_max: T, max: T) -> Result<Self, BoundsError> {
        Self::with_stddev(min, rnd_min, rnd_max, max, T::default_stddev())
    }

    /// Random range covering the whole valid range
    pub fn uniform(min: T, max: T) -> Result<Self, BoundsError> {
        Self::new(min.clone(), min, max.clone(), max)
    }

    pub fn with_stddev(
        min: T,
        rnd_min: T,
        rnd_max: T,
        max: T,
        stddev: T::Stddev,
    ) -> Result<Self, BoundsError> {
        if !(T::is_ordered(&min, &rnd_min)
            && T::is_ordered(&rnd_min, &rnd_max)
            && T::is_ordered(&rnd_max, &max))
        {
            return Err(BoundsError::invalid_bounds(&min, &rnd_min, &rnd_max, &max));
        }

        Ok(Self {
            min,
            rnd_min,
            rnd_max,
            max,
            stddev,
        })
    }

    pub fn min(&self) -> &T {
        &self.min
    }

    pub fn rnd_min(&self) -> &T {
        &self.rnd_min
    }

    pub fn rnd_max(&self) -> &T {
        &self.rnd_max
    }

    pub fn max(&self) -> &T {
        &self.max
    }

    pub fn stddev(&self) -> &T::Stddev {
        &self.stddev
    }

    pub fn rand(&self, dice: &mut dyn Dice) -> T {
        T::rand(self, dice)
    }

    pub fn mutate(&self, value: &mut T, dice: &mut dyn Dice) {
        T::mutate(value, self, dice)
    }

    pub fn distance(&self, lhs: &T, rhs: &T) -> f64 {
        T::distance(lhs, rhs, self)
    }

    pub fn check(&self, value: &mut T) -> bool {
        T::check(value, self)
    }
}

impl<T: Bounded, const N: usize> Bounds<[T; N]> {
    /// Bounds of a single index
    pub fn at(&self, index: usize) -> Bounds<T> {
        Bounds {
            min: self.min[index].clone(),
            rnd_min: self.rnd_min[index].clone(),
            rnd_max: self.rnd_max[index].clone(),
            max: self.max[index].clone(),
            stddev: self.stddev[index].clone(),
        }
    }
}

// ============================================================
// Integers
// ============================================================

macro_rules! bounded_integer {
    ($($t:ty),* $(,)?) => {
        $(
            impl Bounded for $t {
                type Stddev = f64;

                fn default_stddev() -> f64 {
                    DEFAULT_STDDEV
                }

                fn is_ordered(lower: &Self, upper: &Self) -> bool {
                    lower <= upper
                }

                fn rand(bounds: &Bounds<Self>, dice: &mut dyn Dice) -> Self {
                    dice.draw(bounds.rnd_min, bounds.rnd_max)
                }

                fn mutate(value: &mut Self, bounds: &Bounds<Self>, dice: &mut dyn Dice) {
                    if bounds.min == bounds.max {
                        *value = bounds.min;
                    } else if *value <= bounds.min {
                        *value = bounds.min + 1;
                    } else if bounds.max <= *value {
                        *value = bounds.max - 1;
                    } else if dice.toss_coin(0.5) {
                        *value += 1;
                    } else {
                        *value -= 1;
                    }
                }

                fn distance(lhs: &Self, rhs: &Self, bounds: &Bounds<Self>) -> f64 {
                    let span = bounds.max as f64 - bounds.min as f64;
                    if span == 0.0 {
                        return 0.0;
                    }
                    (*lhs as f64 - *rhs as f64).abs() / span
                }

                fn check(value: &mut Self, bounds: &Bounds<Self>) -> bool {
                    let clamped = (*value).clamp(bounds.min, bounds.max);
                    let ok = clamped == *value;
                    *value = clamped;
                    ok
                }
            }
        )*
    };
}

bounded_integer!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

// ============================================================
// Floats
// ============================================================

macro_rules! bounded_float {
    ($($t:ty),* $(,)?) => {
        $(
            impl Bounded for $t {
                type Stddev = f64;

                fn default_stddev() -> f64 {
                    DEFAULT_STDDEV
                }

                fn is_ordered(lower: &Self, upper: &Self) -> bool {
                    lower <= upper
                }

                fn rand(bounds: &Bounds<Self>, dice: &mut dyn Dice) -> Self {
                    dice.draw(bounds.rnd_min, bounds.rnd_max)
                }

                fn mutate(value: &mut Self, bounds: &Bounds<Self>, dice: &mut dyn Dice) {
                    let span = (bounds.max - bounds.min) as f64;
                    if span <= 0.0 {
                        *value = bounds.min;
                        return;
                    }

                    let current = *value as f64;
                    let delta = dice.truncated_normal(
                        0.0,
                        span * bounds.stddev,
                        bounds.min as f64 - current,
                        bounds.max as f64 - current,
                        true,
                    );
                    match delta {
                        Some(delta) => {
                            *value = ((current + delta) as $t).clamp(bounds.min, bounds.max)
                        }
                        None => warn!(value = current, "Mutation left value unchanged"),
                    }
                }

                fn distance(lhs: &Self, rhs: &Self, bounds: &Bounds<Self>) -> f64 {
                    let span = (bounds.max - bounds.min) as f64;
                    if span == 0.0 {
                        return 0.0;
                    }
                    (*lhs as f64 - *rhs as f64).abs() / span
                }

                fn check(value: &mut Self, bounds: &Bounds<Self>) -> bool {
                    if value.is_nan() {
                        *value = bounds.min;
                        false
                    } else if *value < bounds.min {
                        *value = bounds.min;
                        false
                    } else if bounds.max < *value {
                        *value = bounds.max;
                        false
                    } else {
                        true
                    }
                }
            }
        )*
    };
}

bounded_float!(f32, f64);

// ============================================================
// Fixed-size arrays
// ============================================================

impl<T: Bounded, const N: usize> Bounded for [T; N] {
    type Stddev = [T::Stddev; N];

    fn default_stddev() -> Self::Stddev {
        std::array::from_fn(|_| T::default_stddev())
    }

    fn is_ordered(lower: &Self, upper: &Self) -> bool {
        lower.iter().zip(upper).all(|(l, u)| T::is_ordered(l, u))
    }

    fn rand(bounds: &Bounds<Self>, dice: &mut dyn Dice) -> Self {
        std::array::from_fn(|i| T::rand(&bounds.at(i), dice))
    }

    /// Mutates a single, random, index
    fn mutate(value: &mut Self, bounds: &Bounds<Self>, dice: &mut dyn Dice) {
        if N == 0 {
            return;
        }
        let i = dice.draw(0, N - 1);
        T::mutate(&mut value[i], &bounds.at(i), dice);
    }

    fn distance(lhs: &Self, rhs: &Self, bounds: &Bounds<Self>) -> f64 {
        (0..N)
            .map(|i| T::distance(&lhs[i], &rhs[i], &bounds.at(i)))
            .sum()
    }

    fn check(value: &mut Self, bounds: &Bounds<Self>) -> bool {
        let mut ok = true;
        for (i, v) in value.iter_mut().enumerate() {
            ok &= T::check(v, &bounds.at(i));
        }
        ok
    }
}

// ============================================================
// Text and JSON forms
// ============================================================

/// `(min rndMin rndMax max stddev)`
impl<T> PrettyValue for Bounds<T>
where
    T: Bounded + PrettyValue,
    T::Stddev: PrettyValue,
{
    fn type_name() -> String {
        format!("Bounds<{}>", T::type_name())
    }

    fn write_pretty(&self, out: &mut String) {
        out.push('(');
        self.min.write_pretty(out);
        out.push(' ');
        self.rnd_min.write_pretty(out);
        out.push(' ');
        self.rnd_max.write_pretty(out);
        out.push(' ');
        self.max.write_pretty(out);
        out.push(' ');
        self.stddev.write_pretty(out);
        out.push(')');
    }

    fn read_pretty(input: &str) -> Result<Self, PrettyError> {
        let inner = input
            .trim()
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .ok_or_else(|| PrettyError::parse::<Self>(input))?;

        let tokens = split_top_level(inner, char::is_whitespace);
        let (values, stddev) = match tokens.as_slice() {
            [min, rnd_min, rnd_max, max] => ([min, rnd_min, rnd_max, max], None),
            [min, rnd_min, rnd_max, max, stddev] => {
                ([min, rnd_min, rnd_max, max], Some(<T::Stddev as PrettyValue>::read_pretty(stddev)?))
            }
            _ => return Err(PrettyError::parse::<Self>(input)),
        };

        let [min, rnd_min, rnd_max, max] = values.map(|v| T::read_pretty(v));
        Ok(Self::with_stddev(
            min?,
            rnd_min?,
            rnd_max?,
            max?,
            stddev.unwrap_or_else(T::default_stddev),
        )?)
    }
}

/// `[min, rndMin, rndMax, max, stddev]`
impl<T> Serialize for Bounds<T>
where
    T: Bounded + Serialize,
    T::Stddev: Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.min, &self.rnd_min, &self.rnd_max, &self.max, &self.stddev).serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Bounds<T>
where
    T: Bounded + DeserializeOwned,
    T::Stddev: DeserializeOwned,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (min, rnd_min, rnd_max, max, stddev) =
            <(T, T, T, T, T::Stddev)>::deserialize(deserializer)?;
        Self::with_stddev(min, rnd_min, rnd_max, max, stddev).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::FastDice;

    #[test]
    fn it_rejects_unordered_bounds() {
        assert!(Bounds::new(1, 2, 3, 4).is_ok());
        assert!(Bounds::new(2, 1, 3, 4).is_err());
        assert!(Bounds::new(1, 3, 2, 4).is_err());
        assert!(Bounds::new(1.0, 2.0, 3.0, 2.5).is_err());
        assert!(Bounds::uniform([-10.0f32, 0.0], [0.0, 10.0]).is_ok());
        assert!(Bounds::uniform([-10.0f32, 0.0], [0.0, -1.0]).is_err());
    }

    #[test]
    fn it_draws_within_random_range() {
        let mut dice = FastDice::new(42);
        let bounds = Bounds::new(1, 2, 3, 4).unwrap();
        for _ in 0..100 {
            let v = bounds.rand(&mut dice);
            assert!((2..=3).contains(&v));
        }

        let bounds = Bounds::new(-4.0f32, -1.0, 1.0, 4.0).unwrap();
        for _ in 0..100 {
            let v = bounds.rand(&mut dice);
            assert!((-1.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn it_draws_every_integer_width() {
        let mut dice = FastDice::new(42);
        assert!((5..=6).contains(&Bounds::new(0u8, 5, 6, 9).unwrap().rand(&mut dice)));
        assert!((-6..=-5).contains(&Bounds::new(-9i16, -6, -5, 0).unwrap().rand(&mut dice)));
        assert!((5..=6).contains(&Bounds::new(0u64, 5, 6, 9).unwrap().rand(&mut dice)));
        assert!((5..=6).contains(&Bounds::new(0usize, 5, 6, 9).unwrap().rand(&mut dice)));
        assert!((-6..=-5).contains(&Bounds::new(-9i64, -6, -5, 0).unwrap().rand(&mut dice)));
    }

    #[test]
    fn it_keeps_valid_values_unchanged_on_check() {
        let bounds = Bounds::new(-4.0f32, 0.0, 0.0, 4.0).unwrap();
        for v in [-4.0f32, -1.5, 0.0, 3.999, 4.0] {
            let mut value = v;
            assert!(bounds.check(&mut value));
            assert_eq!(value, v);
        }
    }

    #[test]
    fn it_clamps_invalid_values_on_check() {
        let bounds = Bounds::new(1, 2, 3, 4).unwrap();
        let mut value = 9;
        assert!(!bounds.check(&mut value));
        assert_eq!(value, 4);

        let mut value = -9;
        assert!(!bounds.check(&mut value));
        assert_eq!(value, 1);

        let bounds = Bounds::new(-4.0f64, 0.0, 0.0, 4.0).unwrap();
        let mut value = f64::NAN;
        assert!(!bounds.check(&mut value));
        assert_eq!(value, -4.0);
    }

    #[test]
    fn it_steps_integers_away_from_the_edges() {
        let mut dice = FastDice::new(42);
        let bounds = Bounds::new(1u32, 2, 3, 4).unwrap();
        for _ in 0..50 {
            let mut value = 1;
            bounds.mutate(&mut value, &mut dice);
            assert_eq!(value, 2);

            let mut value = 4;
            bounds.mutate(&mut value, &mut dice);
            assert_eq!(value, 3);

            let mut value = 2;
            bounds.mutate(&mut value, &mut dice);
            assert!(value == 1 || value == 3);
        }
    }

    #[test]
    fn it_mutates_floats_inside_bounds() {
        let mut dice = FastDice::new(42);
        let bounds = Bounds::with_stddev(-4.0f32, 0.0, 0.0, 4.0, 0.5).unwrap();
        let mut value = 3.9f32;
        for _ in 0..500 {
            let before = value;
            bounds.mutate(&mut value, &mut dice);
            assert!((-4.0..=4.0).contains(&value));
            assert_ne!(before, value);
        }
    }

    #[test]
    fn it_normalizes_distances_by_span() {
        let bounds = Bounds::new(0, 0, 10, 10).unwrap();
        assert_eq!(bounds.distance(&2, &7), 0.5);
        assert_eq!(bounds.distance(&3, &3), 0.0);

        let bounds = Bounds::uniform([-10.0f32, 0.0], [0.0, 10.0]).unwrap();
        assert_eq!(bounds.distance(&[-10.0, 0.0], &[0.0, 5.0]), 1.5);
        assert_eq!(bounds.distance(&[4.0, 2.0], &[4.0, 2.0]), 0.0);
    }

    #[test]
    fn it_mutates_a_single_array_index() {
        let mut dice = FastDice::new(42);
        let bounds = Bounds::new([0, 0, 0], [1, 1, 1], [2, 2, 2], [5, 5, 5]).unwrap();
        for _ in 0..50 {
            let original = [2, 2, 2];
            let mut value = original;
            bounds.mutate(&mut value, &mut dice);
            let changed = value.iter().zip(&original).filter(|(a, b)| a != b).count();
            assert_eq!(changed, 1);
        }
    }

    #[test]
    fn it_checks_arrays_per_index() {
        let bounds = Bounds::uniform([-10.0f32, 0.0], [0.0, 10.0]).unwrap();
        let mut value = [4.0, 2.0];
        assert!(!bounds.check(&mut value));
        assert_eq!(value, [0.0, 2.0]);
    }

    #[test]
    fn it_writes_and_reads_text_form() {
        let bounds = Bounds::new(1, 2, 3, 4).unwrap();
        assert_eq!(bounds.to_pretty(), "(1 2 3 4 0.01)");
        assert_eq!(Bounds::<i32>::read_pretty("(1 2 3 4 0.01)").unwrap(), bounds);
        assert_eq!(Bounds::<i32>::read_pretty(" (1 2 3 4) ").unwrap(), bounds);

        let arrays = Bounds::uniform([-10.0f32, 0.0], [0.0, 10.0]).unwrap();
        assert_eq!(
            arrays.to_pretty(),
            "([-10, 0] [-10, 0] [0, 10] [0, 10] [0.01, 0.01])"
        );
        assert_eq!(
            Bounds::<[f32; 2]>::read_pretty(&arrays.to_pretty()).unwrap(),
            arrays
        );

        assert!(Bounds::<i32>::read_pretty("(4 3 2 1)").is_err());
        assert!(Bounds::<i32>::read_pretty("1 2 3 4").is_err());
    }

    #[test]
    fn it_serializes_as_a_five_element_array() {
        let bounds = Bounds::new(1, 2, 3, 4).unwrap();
        let json = serde_json::to_value(&bounds).unwrap();
        assert_eq!(json, serde_json::json!([1, 2, 3, 4, 0.01]));
        let back: Bounds<i32> = serde_json::from_value(json).unwrap();
        assert_eq!(back, bounds);
        assert!(serde_json::from_value::<Bounds<i32>>(serde_json::json!([4, 3, 2, 1, 0.01])).is_err());
    }
}
