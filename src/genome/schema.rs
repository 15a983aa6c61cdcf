use super::{
    ExtractError, FieldValue, Functor, Genome, GenomeError, SchemaError,
    bounds_field::BoundsStrategy,
    field::{Field, FieldManager},
    self_aware::autolog,
};
use crate::config::{ConfigFile, Param, Parameter};
use crate::dice::{Dice, DiceExt};
use crate::models::{Bounded, Bounds, Summary, Weights, uniform_weights, validate_weights};
use crate::text::IndentWriter;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt::{self, Write},
};
use tracing::{debug, info, instrument, warn};

/// Name of the configuration value holding the per-field mutation rates
pub const MUTATION_RATES: &str = "mutationRates";

/// Name of the configuration value holding the per-field distance weights
pub const DISTANCE_WEIGHTS: &str = "distanceWeights";

/// Ordered table of the fields of genome `G`, with the configuration file
/// that holds their bounds and weights.
///
/// Every generic operation of a genome is a loop over this table.
pub struct Schema<G> {
    name: &'static str,
    config: ConfigFile,
    fields: IndexMap<String, Box<dyn FieldManager<G>>>,
    mutation_rates: Param<Weights>,
    distance_weights: Param<Weights>,
}

impl<G: Genome> Schema<G> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn mutation_rates(&self) -> &Param<Weights> {
        &self.mutation_rates
    }

    pub fn distance_weights(&self) -> &Param<Weights> {
        &self.distance_weights
    }

    fn field(&self, name: &str) -> Result<&dyn FieldManager<G>, GenomeError> {
        self.fields
            .get(name)
            .map(|f| f.as_ref())
            .ok_or_else(|| GenomeError::UnknownField {
                type_name: self.name,
                field: name.to_string(),
            })
    }

    // ============================================================
    // Genetic operators
    // ============================================================

    pub fn random(&self, dice: &mut dyn Dice) -> G {
        let mut genome = G::default();
        for field in self.fields.values() {
            field.random(&mut genome, dice);
        }
        genome.random_extension(dice);
        genome
    }

    /// Mutates a single field, picked according to the mutation rates
    pub fn mutate(&self, genome: &mut G, dice: &mut dyn Dice) -> Result<(), GenomeError> {
        let rates = self.mutation_rates.get();
        let name = dice
            .pick_one(&rates)
            .ok_or(GenomeError::NoMutationRates {
                type_name: self.name,
            })?;
        let field = self.field(name)?;

        let before = (autolog() && !field.is_subgenome()).then(|| print_field(field, &*genome));
        field.mutate(genome, dice);
        if let Some(before) = before {
            info!(
                type_name = self.name,
                field = name.as_str(),
                "{name}: {before} -> {}",
                print_field(field, &*genome)
            );
        }

        genome.mutate_extension(dice);
        Ok(())
    }

    pub fn cross(&self, lhs: &G, rhs: &G, dice: &mut dyn Dice) -> G {
        let mut child = G::default();
        for field in self.fields.values() {
            field.cross(&mut child, lhs, rhs, dice);
        }
        child.cross_extension(lhs, rhs, dice);
        child
    }

    /// Weighted sum of the field distances. Fields without a weight count once.
    pub fn distance(&self, lhs: &G, rhs: &G) -> f64 {
        let weighted: f64 = self.distance_weights.with(|weights| {
            self.fields
                .values()
                .map(|field| {
                    let weight = weights.get(field.name()).copied().unwrap_or(1.0);
                    weight as f64 * field.distance(lhs, rhs)
                })
                .sum()
        });
        weighted + lhs.distance_extension(rhs)
    }

    /// Clamps every field into its bounds. Returns whether all were valid.
    pub fn check(&self, genome: &mut G) -> bool {
        let mut ok = true;
        for field in self.fields.values() {
            ok &= field.check(genome);
        }
        genome.check_extension() && ok
    }

    pub fn equal(&self, lhs: &G, rhs: &G) -> bool {
        self.fields.values().all(|field| field.equal(lhs, rhs)) && lhs.equal_extension(rhs)
    }

    // ============================================================
    // Json
    // ============================================================

    /// One key per field alias, in declaration order
    pub fn to_json(&self, genome: &G) -> Result<serde_json::Value, serde_json::Error> {
        let mut map = serde_json::Map::new();
        for field in self.fields.values() {
            map.insert(field.alias().to_string(), field.to_json(genome)?);
        }
        genome.to_json_extension(&mut map)?;
        Ok(serde_json::Value::Object(map))
    }

    pub fn from_json(&self, json: &serde_json::Value) -> Result<G, GenomeError> {
        let mut genome = G::default();
        self.load_json(&mut genome, json)?;
        Ok(genome)
    }

    /// Loads every field found in `json`, then checks the result. Missing,
    /// unexpected or invalid keys are reported once everything else is loaded.
    #[instrument(level = "debug", skip_all, fields(type_name = self.name))]
    pub fn load_json(&self, genome: &mut G, json: &serde_json::Value) -> Result<(), GenomeError> {
        let mut map = json
            .as_object()
            .cloned()
            .ok_or(GenomeError::NotAnObject {
                type_name: self.name,
            })?;

        genome.from_json_extension(&mut map)?;

        let mut missing = Vec::new();
        let mut invalid = Vec::new();
        for field in self.fields.values() {
            match map.remove(field.alias()) {
                Some(value) => {
                    if let Err(error) = field.from_json(genome, value) {
                        invalid.push(format!("{}: {error}", field.alias()));
                    }
                }
                None => missing.push(field.alias().to_string()),
            }
        }
        let unexpected: Vec<String> = map.keys().cloned().collect();

        if !self.check(genome) {
            warn!(type_name = self.name, "Loaded genome had out-of-range values");
        }

        if missing.is_empty() && unexpected.is_empty() && invalid.is_empty() {
            return Ok(());
        }
        Err(GenomeError::JsonMismatch {
            type_name: self.name,
            missing,
            unexpected,
            invalid,
        })
    }

    // ============================================================
    // Printing, extraction and aggregation
    // ============================================================

    /// `name: value` lines, each preceded by a newline and indented one level
    pub fn print(&self, genome: &G, out: &mut dyn fmt::Write) -> fmt::Result {
        let mut out = IndentWriter::new(out);
        for field in self.fields.values() {
            write!(out, "\n{}: ", field.name())?;
            field.print(genome, &mut out)?;
        }
        genome.print_extension(&mut out)
    }

    /// Stringifies the value at `path`, e.g. `vectorField[1].floatField`
    pub fn extract(&self, genome: &G, path: &str, full_path: &str) -> Result<String, ExtractError> {
        let end = path.find(['.', '[']).unwrap_or(path.len());
        let (name, rest) = path.split_at(end);
        let field = self
            .fields
            .get(name)
            .ok_or_else(|| ExtractError::UnknownField {
                type_name: self.name.to_string(),
                field: name.to_string(),
                path: full_path.to_string(),
            })?;
        field.extract(genome, rest, full_path)
    }

    /// Per field summary of a population, without any size requirement
    pub fn summarize(&self, population: &[&G], verbosity: usize) -> Summary {
        Summary::Fields(
            self.fields
                .iter()
                .map(|(name, field)| (name.clone(), field.aggregate(population, verbosity)))
                .collect(),
        )
    }

    #[instrument(level = "debug", skip_all, fields(type_name = self.name, count = population.len()))]
    pub fn aggregate(&self, population: &[&G], verbosity: usize) -> Result<Summary, GenomeError> {
        if population.len() < 2 {
            return Err(GenomeError::NotEnoughInstances {
                type_name: self.name,
                count: population.len(),
            });
        }
        Ok(self.summarize(population, verbosity))
    }
}

fn print_field<G>(field: &dyn FieldManager<G>, genome: &G) -> String {
    let mut out = String::new();
    let _ = field.print(genome, &mut out);
    out
}

// ============================================================
// Builder
// ============================================================

/// Collects the field declarations of genome `G`.
///
/// Each declaration registers what it needs in the genome's configuration
/// file: `<name>Bounds` for bounded fields, the nested configuration file for
/// subgenomes, and finally the `mutationRates` and `distanceWeights` maps.
pub struct SchemaBuilder<G> {
    name: &'static str,
    config: ConfigFile,
    fields: IndexMap<String, Box<dyn FieldManager<G>>>,
    mutation_rates: Option<Weights>,
    distance_weights: Option<Weights>,
}

impl<G: Genome> SchemaBuilder<G> {
    pub fn new() -> Self {
        Self {
            name: G::NAME,
            config: ConfigFile::new(G::NAME),
            fields: IndexMap::new(),
            mutation_rates: None,
            distance_weights: None,
        }
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    fn insert(mut self, name: &str, field: Box<dyn FieldManager<G>>) -> Result<Self, SchemaError> {
        if self.fields.contains_key(name) || self.fields.values().any(|f| f.alias() == name) {
            return Err(SchemaError::DuplicateField {
                type_name: self.name,
                field: name.to_string(),
            });
        }
        debug!(type_name = self.name, field = name, "Registering field");
        self.fields.insert(name.to_string(), field);
        Ok(self)
    }

    /// Field driven by bounds stored as `<name>Bounds` in the configuration
    pub fn with_bounds<T>(
        self,
        name: &str,
        get: fn(&G) -> &T,
        get_mut: fn(&mut G) -> &mut T,
        bounds: Bounds<T>,
    ) -> Result<Self, SchemaError>
    where
        T: FieldValue + Bounded,
        Bounds<T>: Parameter,
    {
        let bounds = self.config.parameter(&format!("{name}Bounds"), bounds)?;
        let strategy = Box::new(BoundsStrategy::new(bounds));
        self.insert(name, Box::new(Field::new(name, get, get_mut, strategy)))
    }

    /// Field driven by user closures
    pub fn with_functor<T: FieldValue>(
        self,
        name: &str,
        get: fn(&G) -> &T,
        get_mut: fn(&mut G) -> &mut T,
        functor: Functor<T>,
    ) -> Result<Self, SchemaError> {
        if let Some(child) = functor.subconfig() {
            if !self.config.contains(&child.name()) {
                self.config.subconfig(child)?;
            }
        }
        let strategy = Box::new(functor.validate(self.name, name)?);
        self.insert(name, Box::new(Field::new(name, get, get_mut, strategy)))
    }

    /// Field holding a nested genome
    pub fn with_subgenome<S: Genome>(
        self,
        name: &str,
        get: fn(&G) -> &S,
        get_mut: fn(&mut G) -> &mut S,
    ) -> Result<Self, SchemaError> {
        self.with_functor(name, get, get_mut, Functor::subgenome())
    }

    /// Attaches a configuration file that is not tied to any field
    pub fn with_subconfig(self, child: &ConfigFile) -> Result<Self, SchemaError> {
        self.config.subconfig(child)?;
        Ok(self)
    }

    /// Json key of the last declared field
    pub fn alias(mut self, alias: &str) -> Result<Self, SchemaError> {
        let type_name = self.name;
        let taken = self
            .fields
            .iter()
            .any(|(name, f)| name == alias || f.alias() == alias);
        let Some((name, field)) = self.fields.last_mut() else {
            return Err(SchemaError::NoField {
                type_name,
                alias: alias.to_string(),
            });
        };

        if taken && field.alias() != alias {
            return Err(SchemaError::DuplicateAlias {
                type_name,
                field: name.clone(),
                alias: alias.to_string(),
            });
        }
        if name.len() < alias.len() {
            warn!(
                type_name,
                field = name.as_str(),
                alias,
                "Alias is longer than the field name"
            );
        }

        field.set_alias(alias.to_string());
        Ok(self)
    }

    /// Relative chance of each field being picked for mutation. Defaults to
    /// 1 for every field.
    pub fn mutation_rates<'a>(mut self, rates: impl IntoIterator<Item = (&'a str, f32)>) -> Self {
        self.mutation_rates = Some(to_weights(rates));
        self
    }

    /// Weight of each field in the genomic distance. Defaults to 1 for every
    /// field.
    pub fn distance_weights<'a>(mut self, weights: impl IntoIterator<Item = (&'a str, f32)>) -> Self {
        self.distance_weights = Some(to_weights(weights));
        self
    }

    #[instrument(level = "debug", skip_all, fields(type_name = self.name, field_count = self.fields.len()))]
    pub fn build(self) -> Result<Schema<G>, SchemaError> {
        let names: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        let complete = |map: Option<Weights>, label: &str| -> Result<Weights, SchemaError> {
            let weights = map.unwrap_or_else(|| uniform_weights(names.iter().copied(), 1.0));
            validate_weights(self.name, label, names.iter().copied(), &weights)?;
            Ok(weights)
        };
        let rates = complete(self.mutation_rates.clone(), MUTATION_RATES)?;
        let weights = complete(self.distance_weights.clone(), DISTANCE_WEIGHTS)?;

        let mutation_rates = self.config.parameter(MUTATION_RATES, rates)?;
        let distance_weights = self.config.parameter(DISTANCE_WEIGHTS, weights)?;

        Ok(Schema {
            name: self.name,
            config: self.config,
            fields: self.fields,
            mutation_rates,
            distance_weights,
        })
    }
}

impl<G: Genome> Default for SchemaBuilder<G> {
    fn default() -> Self {
        Self::new()
    }
}

fn to_weights<'a>(entries: impl IntoIterator<Item = (&'a str, f32)>) -> Weights {
    entries
        .into_iter()
        .map(|(name, weight)| (name.to_string(), weight))
        .collect()
}

// ============================================================
// Registry
// ============================================================

static SCHEMAS: Lazy<RwLock<HashMap<TypeId, &'static (dyn Any + Send + Sync)>>> =
    Lazy::new(Default::default);

/// Describes `G` into a fresh schema, without registering it
pub fn build_schema<G: Genome>() -> Result<Schema<G>, SchemaError> {
    G::describe(SchemaBuilder::new())?.build()
}

/// Schema of `G`, built on first use and kept for the life of the process.
///
/// Nested genomes are described while their parent is, so the registry lock
/// is never held during a build.
///
/// # Panics
///
/// When `G` describes an invalid schema.
pub fn schema_of<G: Genome>() -> &'static Schema<G> {
    let id = TypeId::of::<G>();
    let registered = SCHEMAS.read().get(&id).copied();

    let entry = match registered {
        Some(entry) => entry,
        None => {
            let schema = build_schema::<G>()
                .unwrap_or_else(|error| panic!("Invalid schema for {}: {error}", G::NAME));
            let leaked: &'static (dyn Any + Send + Sync) = Box::leak(Box::new(schema));
            *SCHEMAS.write().entry(id).or_insert(leaked)
        }
    };

    match entry.downcast_ref::<Schema<G>>() {
        Some(schema) => schema,
        None => unreachable!("schema registered under the TypeId of another type"),
    }
}
