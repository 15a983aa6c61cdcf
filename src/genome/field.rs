use super::{ExtractError, FieldValue};
use crate::dice::Dice;
use crate::models::Summary;
use std::fmt;
use tracing::warn;

/// Type erased behaviour of one field of genome `G`.
pub(crate) trait FieldManager<G>: Send + Sync {
    fn name(&self) -> &str;

    /// Key used in json documents
    fn alias(&self) -> &str;

    fn set_alias(&mut self, alias: String);

    fn is_subgenome(&self) -> bool;

    fn random(&self, genome: &mut G, dice: &mut dyn Dice);

    fn mutate(&self, genome: &mut G, dice: &mut dyn Dice);

    fn cross(&self, child: &mut G, lhs: &G, rhs: &G, dice: &mut dyn Dice);

    fn distance(&self, lhs: &G, rhs: &G) -> f64;

    fn check(&self, genome: &mut G) -> bool;

    fn equal(&self, lhs: &G, rhs: &G) -> bool;

    fn print(&self, genome: &G, out: &mut dyn fmt::Write) -> fmt::Result;

    fn to_json(&self, genome: &G) -> Result<serde_json::Value, serde_json::Error>;

    fn from_json(&self, genome: &mut G, value: serde_json::Value) -> Result<(), serde_json::Error>;

    fn extract(&self, genome: &G, path: &str, full_path: &str) -> Result<String, ExtractError>;

    fn aggregate(&self, population: &[&G], verbosity: usize) -> Summary;
}

/// The five genetic operators of one field value
pub(crate) trait FieldStrategy<T>: Send + Sync {
    fn random(&self, dice: &mut dyn Dice) -> T;

    fn mutate(&self, value: &mut T, dice: &mut dyn Dice);

    fn cross(&self, lhs: &T, rhs: &T, dice: &mut dyn Dice) -> T;

    fn distance(&self, lhs: &T, rhs: &T) -> f64;

    fn check(&self, value: &mut T) -> bool;

    fn is_subgenome(&self) -> bool {
        false
    }
}

/// Binds a strategy to the member of `G` it drives
pub(crate) struct Field<G, T> {
    name: String,
    alias: String,
    get: fn(&G) -> &T,
    get_mut: fn(&mut G) -> &mut T,
    strategy: Box<dyn FieldStrategy<T>>,
}

impl<G, T> Field<G, T> {
    pub(crate) fn new(
        name: &str,
        get: fn(&G) -> &T,
        get_mut: fn(&mut G) -> &mut T,
        strategy: Box<dyn FieldStrategy<T>>,
    ) -> Self {
        Self {
            name: name.to_string(),
            alias: name.to_string(),
            get,
            get_mut,
            strategy,
        }
    }
}

impl<G, T: FieldValue> FieldManager<G> for Field<G, T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn alias(&self) -> &str {
        &self.alias
    }

    fn set_alias(&mut self, alias: String) {
        self.alias = alias;
    }

    fn is_subgenome(&self) -> bool {
        self.strategy.is_subgenome()
    }

    fn random(&self, genome: &mut G, dice: &mut dyn Dice) {
        *(self.get_mut)(genome) = self.strategy.random(dice);
    }

    fn mutate(&self, genome: &mut G, dice: &mut dyn Dice) {
        self.strategy.mutate((self.get_mut)(genome), dice);
    }

    fn cross(&self, child: &mut G, lhs: &G, rhs: &G, dice: &mut dyn Dice) {
        *(self.get_mut)(child) = self.strategy.cross((self.get)(lhs), (self.get)(rhs), dice);
    }

    fn distance(&self, lhs: &G, rhs: &G) -> f64 {
        self.strategy.distance((self.get)(lhs), (self.get)(rhs))
    }

    /// Subgenomes report their own out-of-range fields
    fn check(&self, genome: &mut G) -> bool {
        let value = (self.get_mut)(genome);
        let before = (!self.strategy.is_subgenome()).then(|| value.clone());
        let ok = self.strategy.check(value);

        if let (false, Some(before)) = (ok, before) {
            warn!(
                field = %self.name,
                "Out-of-range value for field {}: {} clipped to {}",
                self.name,
                before.print_to_string(),
                value.print_to_string()
            );
        }
        ok
    }

    fn equal(&self, lhs: &G, rhs: &G) -> bool {
        (self.get)(lhs) == (self.get)(rhs)
    }

    fn print(&self, genome: &G, out: &mut dyn fmt::Write) -> fmt::Result {
        (self.get)(genome).print_value(out)
    }

    fn to_json(&self, genome: &G) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value((self.get)(genome))
    }

    fn from_json(&self, genome: &mut G, value: serde_json::Value) -> Result<(), serde_json::Error> {
        *(self.get_mut)(genome) = serde_json::from_value(value)?;
        Ok(())
    }

    fn extract(&self, genome: &G, path: &str, full_path: &str) -> Result<String, ExtractError> {
        (self.get)(genome).extract_path(path, full_path)
    }

    fn aggregate(&self, population: &[&G], verbosity: usize) -> Summary {
        let values: Vec<&T> = population.iter().map(|g| (self.get)(g)).collect();
        T::summarize(&values, verbosity)
    }
}
