mod common;

use common::{Inner, Outer};
use edna::config::{ConfigFile, Origin, ReadResult, Target, Verbosity};
use edna::dice::FastDice;
use edna::genome::{Genome, SchemaBuilder, SchemaError, SelfAware};
use edna::models::{Bounds, Weights};
use std::fs;

#[test]
fn test_genome_config_round_trip() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = Outer::config();

    // Writing places the subconfig next to its parent
    let path = config.write_file(dir.path())?;
    assert_eq!(path, dir.path().join("Outer.config"));
    assert!(dir.path().join("Inner.config").exists());

    let written = fs::read_to_string(&path)?;
    assert!(written.contains("intFieldBounds: (0 10 50 100 0.01)"));
    assert!(written.contains("Inner: Inner.config"));
    assert!(written.contains("mutationRates: map(String, f32) {"));

    // Reading back into a fresh, identically described configuration
    let copy = SchemaBuilder::<Outer>::new();
    let copy = Outer::describe(copy)?.build()?;
    let result = copy.config().read_file(&path)?;
    assert_eq!(result, ReadResult::OK);
    assert_eq!(copy.config().render(Target::File), config.render(Target::File));
    assert_eq!(copy.config().origin_of("intFieldBounds")?, Origin::File);

    Ok(())
}

fn tunable() -> anyhow::Result<(ConfigFile, ConfigFile)> {
    let child = ConfigFile::new("Child");
    child.parameter("ratio", 0.5f64)?;

    let parent = ConfigFile::new("Parent");
    parent.parameter("count", 3u32)?;
    parent.parameter("label", "none".to_string())?;
    parent.parameter(
        "weights",
        Weights::from([("a".to_string(), 1.0), ("b".to_string(), 2.0)]),
    )?;
    parent.subconfig(&child)?;
    parent.parameter("DEBUG_level", 0u8)?;

    Ok((parent, child))
}

#[test]
fn test_read_config_creates_then_updates_files() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nested").join("Parent.config");

    // Missing files are created with the current values
    let (parent, _) = tunable()?;
    assert_eq!(parent.read_config(&path)?, ReadResult::OK);
    assert!(path.exists());
    assert!(dir.path().join("nested").join("Child.config").exists());

    // Edit a value, drop a row and add an unknown one
    let edited = fs::read_to_string(&path)?
        .replace("count: 3", "count: 8")
        .replace("label: \"none\"", "ghost: 1");
    fs::write(&path, edited)?;
    let child_path = dir.path().join("nested").join("Child.config");
    let child_text = fs::read_to_string(&child_path)?.replace("ratio: 0.5", "ratio: 0.25");
    fs::write(&child_path, child_text)?;

    let (parent, child) = tunable()?;
    let result = parent.read_config(&path)?;
    assert!(result.contains(ReadResult::FIELD_MISSING));
    assert!(result.contains(ReadResult::FIELD_UNKNOWN));
    assert!(!result.contains(ReadResult::FIELD_PARSE));
    assert_eq!(parent.value_of("count")?, "8");
    assert_eq!(child.param::<f64>("ratio")?.get(), 0.25);
    assert_eq!(child.path(), Some(child_path));

    // The file was rewritten to match the declared fields
    let (parent, _) = tunable()?;
    assert_eq!(parent.read_config(&path)?, ReadResult::OK);
    assert_eq!(parent.value_of("count")?, "8");
    assert!(!fs::read_to_string(&path)?.contains("ghost"));

    Ok(())
}

#[test]
fn test_broken_subconfig_is_flagged() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (parent, _) = tunable()?;
    let path = parent.write_file(dir.path())?;

    fs::write(
        dir.path().join("Child.config"),
        "=====\n= Child =\n=====\n\nratio: half\n=====\n",
    )?;

    let (parent, child) = tunable()?;
    let result = parent.read_file(&path)?;
    assert_eq!(result, ReadResult::SUBCONFIG_FILE);
    assert_eq!(child.origin_of("ratio")?, Origin::Error);

    Ok(())
}

#[test]
fn test_setup_keeps_builtin_values_without_path() -> anyhow::Result<()> {
    let (parent, _) = tunable()?;
    assert_eq!(parent.setup("", Verbosity::Quiet)?, ReadResult::OK);
    assert_eq!(parent.origin_of("count")?, Origin::Default);
    assert!(parent.path().is_none());
    Ok(())
}

#[test]
fn test_json_snapshot_round_trip() -> anyhow::Result<()> {
    let (parent, _) = tunable()?;
    parent.override_with("count", "11")?;
    parent.override_with("weights", "map(String, f32) {\n \"z\": 3\n}")?;
    let json = parent.to_json()?;
    assert_eq!(json["Child"]["ratio"], 0.5);

    let (restored, child) = tunable()?;
    restored.from_json(&json)?;
    assert_eq!(restored.value_of("count")?, "11");
    assert_eq!(restored.origin_of("count")?, Origin::Load);
    assert_eq!(child.origin_of("ratio")?, Origin::Load);
    assert_eq!(restored.to_json()?, json);

    Ok(())
}

#[test]
fn test_terminal_rendering_appends_subconfigs() -> anyhow::Result<()> {
    let (parent, _) = tunable()?;
    let rendered = parent.to_string();

    let parent_title = rendered.find(" Parent ").expect("parent title");
    let child_title = rendered.find(" Child ").expect("child title");
    assert!(parent_title < child_title);
    // Names are right aligned on DEBUG_level
    assert!(rendered.contains(&format!("[D] {:>11}: Child.config", "Child")));
    assert!(rendered.contains("file: *default*"));

    Ok(())
}

#[derive(Debug, Clone, Default)]
struct EnvTuned {
    tuned: i64,
}

impl Genome for EnvTuned {
    const NAME: &'static str = "EnvTuned";

    fn describe(schema: SchemaBuilder<Self>) -> Result<SchemaBuilder<Self>, SchemaError> {
        schema.with_bounds(
            "envTunedField",
            |g| &g.tuned,
            |g| &mut g.tuned,
            Bounds::new(0, 1, 1, 10)?,
        )
    }
}

edna::self_aware!(EnvTuned);

#[test]
fn test_environment_overrides_bounds() -> anyhow::Result<()> {
    // SAFETY: no other test reads or writes this variable
    unsafe { std::env::set_var("envTunedFieldBounds", "\"(0 7 7 10)\"") };

    let config = EnvTuned::config();
    assert_eq!(config.origin_of("envTunedFieldBounds")?, Origin::Environment);

    let mut dice = FastDice::new(42);
    assert_eq!(EnvTuned::random(&mut dice).tuned, 7);

    // Lower precedence inputs are ignored
    assert!(config.input("envTunedFieldBounds", "(0 2 2 10)", Origin::File)?);
    assert_eq!(EnvTuned::random(&mut dice).tuned, 7);

    Ok(())
}

#[test]
fn test_bounds_follow_configuration_overrides() -> anyhow::Result<()> {
    let schema = SchemaBuilder::<Inner>::new();
    let schema = Inner::describe(schema)?.build()?;
    schema
        .config()
        .param::<Bounds<f64>>("floatFieldBounds")?
        .override_with(Bounds::new(-10.0, 3.0, 3.0, 10.0)?);

    let mut dice = FastDice::new(42);
    assert_eq!(schema.random(&mut dice).float_field, 3.0);

    Ok(())
}

#[test]
fn test_underscored_names_survive_a_file_round_trip() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Ga_Params.config");

    let config = ConfigFile::new("Ga_Params");
    config.parameter("count", 3u32)?;
    assert_eq!(config.read_config(&path)?, ReadResult::OK);
    let written = fs::read_to_string(&path)?;
    fs::write(&path, written.replace("count: 3", "count: 8"))?;

    let fresh = ConfigFile::new("Ga_Params");
    let count = fresh.parameter("count", 3u32)?;
    assert_eq!(fresh.read_config(&path)?, ReadResult::OK);
    assert_eq!(count.get(), 8);
    assert!(fs::read_to_string(&path)?.contains("count: 8"));

    Ok(())
}
