use std::collections::BTreeMap;

/// Field name to relative weight. Used both for picking the field to mutate
/// and for weighting each field's contribution to the genomic distance.
pub type Weights = BTreeMap<String, f32>;

#[derive(Debug, thiserror::Error)]
pub enum WeightsError {
    #[error(
        "IncompleteWeights: {map} of {type_name} does not match its fields. missing={missing:?}, unknown={unknown:?}"
    )]
    Incomplete {
        type_name: String,
        map: String,
        missing: Vec<String>,
        unknown: Vec<String>,
    },
    #[error("NegativeWeight: {map} of {type_name} has {field}={weight}")]
    Negative {
        type_name: String,
        map: String,
        field: String,
        weight: f32,
    },
}

/// Builds a weight map with the same weight for every field
pub fn uniform_weights<'a>(fields: impl IntoIterator<Item = &'a str>, weight: f32) -> Weights {
    fields
        .into_iter()
        .map(|field| (field.to_string(), weight))
        .collect()
}

/// Ensures `weights` holds exactly one non-negative entry per field
pub fn validate_weights<'a>(
    type_name: &str,
    map: &str,
    fields: impl IntoIterator<Item = &'a str>,
    weights: &Weights,
) -> Result<(), WeightsError> {
    let fields: Vec<&str> = fields.into_iter().collect();

    let missing: Vec<String> = fields
        .iter()
        .filter(|field| !weights.contains_key(**field))
        .map(|field| field.to_string())
        .collect();
    let unknown: Vec<String> = weights
        .keys()
        .filter(|key| !fields.contains(&key.as_str()))
        .cloned()
        .collect();

    if !missing.is_empty() || !unknown.is_empty() {
        return Err(WeightsError::Incomplete {
            type_name: type_name.to_string(),
            map: map.to_string(),
            missing,
            unknown,
        });
    }

    if let Some((field, weight)) = weights.iter().find(|(_, w)| **w < 0.0) {
        return Err(WeightsError::Negative {
            type_name: type_name.to_string(),
            map: map.to_string(),
            field: field.clone(),
            weight: *weight,
        });
    }

    Ok(())
}
