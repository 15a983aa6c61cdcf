use super::{Genome, SchemaError, field::FieldStrategy};
use crate::config::ConfigFile;
use crate::dice::Dice;
use tracing::warn;

type RandomFn<T> = Box<dyn Fn(&mut dyn Dice) -> T + Send + Sync>;
type MutateFn<T> = Box<dyn Fn(&mut T, &mut dyn Dice) + Send + Sync>;
type CrossFn<T> = Box<dyn Fn(&T, &T, &mut dyn Dice) -> T + Send + Sync>;
type DistanceFn<T> = Box<dyn Fn(&T, &T) -> f64 + Send + Sync>;
type CheckFn<T> = Box<dyn Fn(&mut T) -> bool + Send + Sync>;

/// User supplied genetic operators for a field without bounds semantics.
///
/// All five closures are required; registering a functor with a missing one
/// fails with [`SchemaError::MissingClosure`].
///
/// ```
/// use edna::dice::{Dice, DiceExt};
/// use edna::genome::Functor;
///
/// let functor = Functor::<String>::new()
///     .random(|dice| if dice.toss_coin(0.5) { "A".into() } else { "B".into() })
///     .mutate(|s, _| s.push('A'))
///     .cross(|lhs, rhs, dice| dice.toss(lhs, rhs).clone())
///     .distance(|lhs, rhs| lhs.len().abs_diff(rhs.len()) as f64)
///     .check(|_| true);
/// # let _ = functor;
/// ```
pub struct Functor<T> {
    random: Option<RandomFn<T>>,
    mutate: Option<MutateFn<T>>,
    cross: Option<CrossFn<T>>,
    distance: Option<DistanceFn<T>>,
    check: Option<CheckFn<T>>,
    subconfig: Option<ConfigFile>,
}

impl<T> Default for Functor<T> {
    fn default() -> Self {
        Self {
            random: None,
            mutate: None,
            cross: None,
            distance: None,
            check: None,
            subconfig: None,
        }
    }
}

impl<T> Functor<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn random(mut self, f: impl Fn(&mut dyn Dice) -> T + Send + Sync + 'static) -> Self {
        self.random = Some(Box::new(f));
        self
    }

    pub fn mutate(mut self, f: impl Fn(&mut T, &mut dyn Dice) + Send + Sync + 'static) -> Self {
        self.mutate = Some(Box::new(f));
        self
    }

    pub fn cross(mut self, f: impl Fn(&T, &T, &mut dyn Dice) -> T + Send + Sync + 'static) -> Self {
        self.cross = Some(Box::new(f));
        self
    }

    pub fn distance(mut self, f: impl Fn(&T, &T) -> f64 + Send + Sync + 'static) -> Self {
        self.distance = Some(Box::new(f));
        self
    }

    pub fn check(mut self, f: impl Fn(&mut T) -> bool + Send + Sync + 'static) -> Self {
        self.check = Some(Box::new(f));
        self
    }

    /// Configuration file of the nested genome, if this functor drives one
    pub(crate) fn subconfig(&self) -> Option<&ConfigFile> {
        self.subconfig.as_ref()
    }

    pub(crate) fn validate(
        self,
        type_name: &'static str,
        field: &str,
    ) -> Result<FunctorStrategy<T>, SchemaError> {
        let missing = |closure| SchemaError::MissingClosure {
            type_name,
            field: field.to_string(),
            closure,
        };

        Ok(FunctorStrategy {
            random: self.random.ok_or_else(|| missing("random"))?,
            mutate: self.mutate.ok_or_else(|| missing("mutate"))?,
            cross: self.cross.ok_or_else(|| missing("cross"))?,
            distance: self.distance.ok_or_else(|| missing("distance"))?,
            check: self.check.ok_or_else(|| missing("check"))?,
            subgenome: self.subconfig.is_some(),
        })
    }
}

impl<S: Genome> Functor<S> {
    /// Forwards every operator to the nested genome's own schema
    pub fn subgenome() -> Self {
        Self {
            subconfig: Some(S::schema().config().clone()),
            ..Self::new()
        }
        .random(|dice| S::schema().random(dice))
        .mutate(|genome, dice| {
            if let Err(error) = S::schema().mutate(genome, dice) {
                warn!(subgenome = S::NAME, %error, "Unable to mutate subgenome");
            }
        })
        .cross(|lhs, rhs, dice| S::schema().cross(lhs, rhs, dice))
        .distance(|lhs, rhs| S::schema().distance(lhs, rhs))
        .check(|genome| S::schema().check(genome))
    }
}

pub(crate) struct FunctorStrategy<T> {
    random: RandomFn<T>,
    mutate: MutateFn<T>,
    cross: CrossFn<T>,
    distance: DistanceFn<T>,
    check: CheckFn<T>,
    subgenome: bool,
}

impl<T> FieldStrategy<T> for FunctorStrategy<T> {
    fn random(&self, dice: &mut dyn Dice) -> T {
        (self.random)(dice)
    }

    fn mutate(&self, value: &mut T, dice: &mut dyn Dice) {
        (self.mutate)(value, dice)
    }

    fn cross(&self, lhs: &T, rhs: &T, dice: &mut dyn Dice) -> T {
        (self.cross)(lhs, rhs, dice)
    }

    fn distance(&self, lhs: &T, rhs: &T) -> f64 {
        (self.distance)(lhs, rhs)
    }

    fn check(&self, value: &mut T) -> bool {
        (self.check)(value)
    }

    fn is_subgenome(&self) -> bool {
        self.subgenome
    }
}
