use edna::config::{ConfigFile, Origin, ReadResult, Verbosity};
use std::{fs, path::PathBuf};

fn auto_setup() -> anyhow::Result<ConfigFile> {
    let config = ConfigFile::new("AutoSetup");
    config.parameter("count", 3u32)?;
    Ok(config)
}

// Changes the working directory, so it stays alone in this binary
#[test]
fn test_setup_auto_uses_the_configs_folder() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    std::env::set_current_dir(dir.path())?;
    let path = dir.path().join("configs").join("AutoSetup.config");

    // An empty path keeps the built-in values and touches nothing
    let config = auto_setup()?;
    assert_eq!(config.setup("", Verbosity::Quiet)?, ReadResult::OK);
    assert!(!dir.path().join("configs").exists());

    // First run writes the defaults
    assert_eq!(config.setup("auto", Verbosity::Quiet)?, ReadResult::OK);
    let written = fs::read_to_string(&path)?;
    assert!(written.contains("count: 3"));

    // Later runs read the edited file
    fs::write(&path, written.replace("count: 3", "count: 11"))?;
    let config = auto_setup()?;
    assert_eq!(config.setup("auto", Verbosity::Quiet)?, ReadResult::OK);
    assert_eq!(config.param::<u32>("count")?.get(), 11);
    assert_eq!(config.origin_of("count")?, Origin::File);
    assert_eq!(config.path(), Some(PathBuf::from("configs/AutoSetup.config")));

    Ok(())
}
