use edna::config::{Verbosity, verbosity_values};
use edna::dice::{DiceExt, FastDice};
use edna::genome::{Functor, Genome, SchemaBuilder, SchemaError, SelfAware};
use edna::models::{Bounds, PrettyEnum};
use tracing_subscriber::EnvFilter;

edna::pretty_enum! {
    pub enum Shape { ROUND, SQUARE, SPIKY_BALL }
}

// ============================================================
// InternalTrivial
// ============================================================
#[derive(Debug, Clone, Default)]
struct InternalTrivial {
    float_field: f32,
}

impl Genome for InternalTrivial {
    const NAME: &'static str = "InternalTrivial";

    fn describe(schema: SchemaBuilder<Self>) -> Result<SchemaBuilder<Self>, SchemaError> {
        schema.with_bounds(
            "floatField",
            |g| &g.float_field,
            |g| &mut g.float_field,
            Bounds::new(-4.0, 0.0, 0.0, 4.0)?,
        )
    }
}

edna::self_aware!(InternalTrivial);

// ============================================================
// InternalComplex
// ============================================================
#[derive(Debug, Clone, Default)]
struct InternalComplex {
    string_field: String,
}

fn lowercase_functor() -> Functor<String> {
    Functor::<String>::new()
        .random(|_| String::new())
        .mutate(|s, dice| s.push(dice.draw(b'a', b'z') as char))
        .cross(|lhs, rhs, dice| {
            let i = dice.draw(0, lhs.chars().count().min(rhs.chars().count()));
            lhs.chars().take(i).chain(rhs.chars().skip(i)).collect()
        })
        .distance(|lhs, rhs| {
            if lhs.len() != rhs.len() {
                return lhs.len().abs_diff(rhs.len()) as f64;
            }
            lhs.bytes()
                .zip(rhs.bytes())
                .map(|(l, r)| l.abs_diff(r) as f64 / (b'z' - b'a') as f64)
                .sum()
        })
        .check(|s| {
            let ok = s.bytes().all(|c| c.is_ascii_lowercase());
            *s = s
                .chars()
                .map(|c| match c {
                    'a'..='z' => c,
                    'A'..='Z' => c.to_ascii_lowercase(),
                    _ => 'a',
                })
                .collect();
            ok
        })
}

impl Genome for InternalComplex {
    const NAME: &'static str = "InternalComplex";

    fn describe(schema: SchemaBuilder<Self>) -> Result<SchemaBuilder<Self>, SchemaError> {
        schema.with_functor(
            "stringField",
            |g| &g.string_field,
            |g| &mut g.string_field,
            lowercase_functor(),
        )
    }
}

edna::self_aware!(InternalComplex);

// ============================================================
// External
// ============================================================
#[derive(Debug, Clone, Default)]
struct External {
    int_field: i32,
    array_field: [f32; 2],
    shape: Shape,
    trivial: InternalTrivial,
    complex: InternalComplex,
}

impl Default for Shape {
    fn default() -> Self {
        Shape::ROUND
    }
}

impl Genome for External {
    const NAME: &'static str = "External";

    fn describe(schema: SchemaBuilder<Self>) -> Result<SchemaBuilder<Self>, SchemaError> {
        Ok(schema
            .with_bounds("intField", |g| &g.int_field, |g| &mut g.int_field, Bounds::new(1, 2, 3, 4)?)?
            .alias("i")?
            .with_bounds(
                "arrayField",
                |g| &g.array_field,
                |g| &mut g.array_field,
                Bounds::uniform([-10.0, 0.0], [0.0, 10.0])?,
            )?
            .with_bounds(
                "shape",
                |g| &g.shape,
                |g| &mut g.shape,
                Bounds::uniform(Shape::ROUND, Shape::SPIKY_BALL)?,
            )?
            .with_subgenome("trivial", |g| &g.trivial, |g| &mut g.trivial)?
            .with_subgenome("complex", |g| &g.complex, |g| &mut g.complex)?
            .mutation_rates([
                ("intField", 2.0),
                ("arrayField", 4.0),
                ("shape", 1.0),
                ("trivial", 1.0),
                ("complex", 1.0),
            ]))
    }
}

edna::self_aware!(External);

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let config = args.next().unwrap_or_default();
    let verbosity = match args.next() {
        Some(name) => Verbosity::from_name(&name)
            .map_err(|e| anyhow::anyhow!("{e}. {}", verbosity_values()))?,
        None => Verbosity::Show,
    };

    External::config().setup(&config, verbosity)?;

    let mut g0 = External::default();
    println!("\nDefault init g0:{g0}");

    g0.int_field = 42;
    g0.array_field = [4.0, 2.0];
    g0.complex.string_field = "tOt!".to_string();
    println!("\nModified g0:{g0}");
    println!("\nis g0 valid? {}", g0.check());
    println!("\nChecked g0:{g0}");

    let mut dice = FastDice::default();
    let mut g1 = External::random(&mut dice);
    println!("\nRandom g1 ({dice}):{g1}");

    for i in 0..5 {
        g1.mutate(&mut dice)?;
        println!("\nAfter mutation {i}:{g1}");
    }

    println!("\nDistance(g0, g1) = {}", g0.distance(&g1));
    println!("\ng0 x g1 = {}", External::cross(&g0, &g1, &mut dice));

    let population: Vec<External> = (0..10).map(|_| External::random(&mut dice)).collect();
    println!("\nPopulation summary:{}", External::aggregate(&population, 1)?);
    println!("\ntrivial.floatField of g1 = {}", g1.get_field("trivial.floatField")?);
    println!("\n{}", g1.dump()?);

    Ok(())
}
