#![allow(dead_code)]

use edna::dice::{Dice, DiceExt};
use edna::genome::{Functor, Genome, SchemaBuilder, SchemaError, SelfAware};
use edna::models::Bounds;

// ============================================================
// Inner
// ============================================================
#[derive(Debug, Clone, Default)]
pub struct Inner {
    pub float_field: f64,
}

impl Genome for Inner {
    const NAME: &'static str = "Inner";

    fn describe(schema: SchemaBuilder<Self>) -> Result<SchemaBuilder<Self>, SchemaError> {
        schema.with_bounds(
            "floatField",
            |g| &g.float_field,
            |g| &mut g.float_field,
            Bounds::new(-10.0, -1.0, 1.0, 10.0)?,
        )
    }
}

edna::self_aware!(Inner);

fn inner_vector_functor() -> Functor<Vec<Inner>> {
    Functor::<Vec<Inner>>::new()
        .random(|dice| (0..2).map(|_| Inner::random(dice)).collect())
        .mutate(|items, dice| {
            if items.is_empty() {
                return;
            }
            let i = dice.draw(0, items.len() - 1);
            let _ = items[i].mutate(dice);
        })
        .cross(|lhs, rhs, dice| {
            lhs.iter()
                .zip(rhs)
                .map(|(l, r)| Inner::cross(l, r, dice))
                .collect()
        })
        .distance(|lhs, rhs| {
            let paired: f64 = lhs.iter().zip(rhs).map(|(l, r)| l.distance(r)).sum();
            paired + lhs.len().abs_diff(rhs.len()) as f64
        })
        .check(|items| items.iter_mut().fold(true, |ok, item| item.check() && ok))
}

// ============================================================
// Outer
// ============================================================
#[derive(Debug, Clone, Default)]
pub struct Outer {
    pub int_field: i32,
    pub float_field: f32,
    pub array_field: [f32; 2],
    pub vector_field: Vec<Inner>,
    pub inner: Inner,
}

impl Genome for Outer {
    const NAME: &'static str = "Outer";

    fn describe(schema: SchemaBuilder<Self>) -> Result<SchemaBuilder<Self>, SchemaError> {
        Ok(schema
            .with_bounds("intField", |g| &g.int_field, |g| &mut g.int_field, Bounds::new(0, 10, 50, 100)?)?
            .with_bounds(
                "floatField",
                |g| &g.float_field,
                |g| &mut g.float_field,
                Bounds::new(-4.0, 0.0, 0.0, 4.0)?,
            )?
            .alias("f")?
            .with_bounds(
                "arrayField",
                |g| &g.array_field,
                |g| &mut g.array_field,
                Bounds::uniform([0.0, 0.0], [10.0, 10.0])?,
            )?
            .with_functor(
                "vectorField",
                |g| &g.vector_field,
                |g| &mut g.vector_field,
                inner_vector_functor(),
            )?
            .with_subgenome("inner", |g| &g.inner, |g| &mut g.inner)?
            .mutation_rates([
                ("intField", 2.0),
                ("floatField", 1.0),
                ("arrayField", 4.0),
                ("vectorField", 1.0),
                ("inner", 1.0),
            ]))
    }
}

edna::self_aware!(Outer);

/// int=42, float=3.14, array=[4, 2] and vectorField[1].floatField=7.5
pub fn sample() -> Outer {
    Outer {
        int_field: 42,
        float_field: 3.14,
        array_field: [4.0, 2.0],
        vector_field: vec![Inner { float_field: -2.0 }, Inner { float_field: 7.5 }],
        inner: Inner { float_field: 0.5 },
    }
}

pub fn population(dice: &mut dyn Dice, count: usize) -> Vec<Outer> {
    (0..count).map(|_| Outer::random(dice)).collect()
}
