use super::field::FieldStrategy;
use crate::config::{Param, Parameter};
use crate::dice::{Dice, DiceExt};
use crate::models::{Bounded, Bounds};

/// Drives a field through the bounds stored in the genome's configuration.
///
/// The bounds are looked up on every call so values read later from files or
/// the environment apply to the next operation.
pub(crate) struct BoundsStrategy<T: Bounded> {
    bounds: Param<Bounds<T>>,
}

impl<T: Bounded> BoundsStrategy<T> {
    pub(crate) fn new(bounds: Param<Bounds<T>>) -> Self {
        Self { bounds }
    }
}

impl<T> FieldStrategy<T> for BoundsStrategy<T>
where
    T: Bounded,
    Bounds<T>: Parameter,
{
    fn random(&self, dice: &mut dyn Dice) -> T {
        self.bounds.with(|b| b.rand(dice))
    }

    fn mutate(&self, value: &mut T, dice: &mut dyn Dice) {
        self.bounds.with(|b| b.mutate(value, dice))
    }

    fn cross(&self, lhs: &T, rhs: &T, dice: &mut dyn Dice) -> T {
        dice.toss(lhs, rhs).clone()
    }

    fn distance(&self, lhs: &T, rhs: &T) -> f64 {
        self.bounds.with(|b| b.distance(lhs, rhs))
    }

    fn check(&self, value: &mut T) -> bool {
        self.bounds.with(|b| b.check(value))
    }
}
