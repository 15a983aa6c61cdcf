use crate::text::IndentWriter;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt::{self, Write};

/// Population-level overview of one field, as produced by aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Summary {
    /// Sorted unique values
    Distinct(Vec<String>),
    /// Sorted values picked at regular quantiles
    Samples(Vec<String>),
    /// One summary per index of an array
    Indexed(Vec<Summary>),
    /// One summary per field of a nested genome
    Fields(IndexMap<String, Summary>),
}

/// Number of quantiles reported at a given verbosity. `None` means all values.
fn sample_count(verbosity: usize) -> Option<usize> {
    match verbosity {
        0 => Some(2),
        1 => Some(3),
        2 => Some(5),
        _ => None,
    }
}

impl Summary {
    /// Picks evenly spaced quantiles (min and max included) from already
    /// sorted values
    pub fn samples<T: ToString>(sorted: &[T], verbosity: usize) -> Self {
        let n = sorted.len();
        let indices: Vec<usize> = match sample_count(verbosity) {
            Some(count) if count < n => {
                let mut indices: Vec<usize> = (0..count)
                    .map(|k| ((k * (n - 1)) as f64 / (count - 1) as f64).round() as usize)
                    .collect();
                indices.dedup();
                indices
            }
            _ => (0..n).collect(),
        };

        Self::Samples(indices.into_iter().map(|i| sorted[i].to_string()).collect())
    }

    /// Sorted unique values
    pub fn distinct<T: Ord + ToString>(values: impl IntoIterator<Item = T>) -> Self {
        let mut values: Vec<T> = values.into_iter().collect();
        values.sort();
        values.dedup();
        Self::Distinct(values.iter().map(ToString::to_string).collect())
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Summary::Distinct(values) => write!(f, "{{{}}}", values.join(", ")),
            Summary::Samples(values) => write!(f, "[{}]", values.join(", ")),
            Summary::Indexed(items) => {
                let mut out = IndentWriter::new(f);
                for (i, item) in items.iter().enumerate() {
                    write!(out, "\n[{i}]: {item}")?;
                }
                Ok(())
            }
            Summary::Fields(fields) => {
                let mut out = IndentWriter::new(f);
                for (name, item) in fields {
                    write!(out, "\n{name}: {item}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_reports_min_and_max_when_quiet() {
        let values: Vec<i32> = (1..=9).collect();
        assert_eq!(
            Summary::samples(&values, 0),
            Summary::Samples(vec!["1".into(), "9".into()])
        );
    }

    #[test]
    fn it_reports_quantiles_with_verbosity() {
        let values: Vec<i32> = (1..=9).collect();
        assert_eq!(
            Summary::samples(&values, 1),
            Summary::Samples(vec!["1".into(), "5".into(), "9".into()])
        );
        assert_eq!(
            Summary::samples(&values, 2),
            Summary::Samples(vec!["1".into(), "3".into(), "5".into(), "7".into(), "9".into()])
        );
        match Summary::samples(&values, 3) {
            Summary::Samples(all) => assert_eq!(all.len(), 9),
            other => panic!("unexpected summary {other:?}"),
        }
    }

    #[test]
    fn it_keeps_everything_for_small_populations() {
        assert_eq!(
            Summary::samples(&[1.5, 2.5], 2),
            Summary::Samples(vec!["1.5".into(), "2.5".into()])
        );
    }

    #[test]
    fn it_lists_distinct_values() {
        let summary = Summary::distinct(["b", "a", "b"]);
        assert_eq!(summary, Summary::Distinct(vec!["a".into(), "b".into()]));
        assert_eq!(summary.to_string(), "{a, b}");
    }

    #[test]
    fn it_prints_nested_summaries() {
        let summary = Summary::Fields(IndexMap::from([
            ("x".to_string(), Summary::Samples(vec!["1".into(), "2".into()])),
            (
                "a".to_string(),
                Summary::Indexed(vec![Summary::Distinct(vec!["true".into()])]),
            ),
        ]));
        assert_eq!(summary.to_string(), "\n  x: [1, 2]\n  a: \n    [0]: {true}");
    }
}
