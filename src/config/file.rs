use super::{ConfigError, Origin, Param, Parameter, ReadResult, Verbosity, param::ConfigEntry};
use crate::text::unquote;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::Regex;
use std::{
    fmt::{self, Write as _},
    fs,
    io::{self, Write as _},
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{info, instrument, warn};

/// Default folder for configuration files
pub const FOLDER: &str = "configs";

/// Default extension for configuration files
pub const EXTENSION: &str = "config";

/// Rows starting with this prefix are neither required nor reported as unknown
const DEBUG_PREFIX: &str = "DEBUG_";

// Names are whatever `render` writes between the title padding
static NAME_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^=+ (.+?) =+$").expect("title pattern is valid"));
static SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^=+$").expect("separator pattern is valid"));
static DATA_ROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ *([[:alnum:]_]+): ?(.+)$").expect("row pattern is valid"));
static MAP_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^map\([[:alnum:]_:<,> ]+, [[:alnum:]_:<> ]+\) \{$").expect("map pattern is valid")
});

/// Where a configuration is rendered to.
///
/// Files list subconfigs by file name and are written next to their parent;
/// terminals show provenance tags and append every subconfig in full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    File,
    Terminal,
}

#[derive(Debug, Clone)]
enum Entry {
    Value(Arc<dyn ConfigEntry>),
    Subconfig(ConfigFile),
}

impl Entry {
    fn origin(&self) -> Origin {
        match self {
            Entry::Value(value) => value.origin(),
            Entry::Subconfig(child) if child.path().is_some() => Origin::File,
            Entry::Subconfig(_) => Origin::Default,
        }
    }

    fn render(&self) -> String {
        match self {
            Entry::Value(value) => value.render(),
            Entry::Subconfig(child) => child.file_name(),
        }
    }
}

#[derive(Debug)]
struct Inner {
    name: String,
    path: Option<PathBuf>,
    entries: IndexMap<String, Entry>,
}

/// Named, ordered table of configuration values and subconfig files.
///
/// `ConfigFile` is a cheap handle: clones share the same table. Values are
/// declared once through [`parameter`](Self::parameter),
/// [`constant`](Self::constant) and [`subconfig`](Self::subconfig), then
/// updated from files, json snapshots, the environment or code.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    inner: Arc<RwLock<Inner>>,
}

impl ConfigFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                name: name.into(),
                path: None,
                entries: IndexMap::new(),
            })),
        }
    }

    pub fn name(&self) -> String {
        self.inner.read().name.clone()
    }

    /// Path of the file last read from or written to
    pub fn path(&self) -> Option<PathBuf> {
        self.inner.read().path.clone()
    }

    pub fn default_file_name(&self) -> String {
        format!("{}.{}", self.inner.read().name, EXTENSION)
    }

    /// `configs/<Name>.config`
    pub fn default_path(&self) -> PathBuf {
        Path::new(FOLDER).join(self.default_file_name())
    }

    fn file_name(&self) -> String {
        self.path()
            .and_then(|p| p.file_name().map(|f| f.to_string_lossy().into_owned()))
            .unwrap_or_else(|| self.default_file_name())
    }

    pub fn field_names(&self) -> Vec<String> {
        self.inner.read().entries.keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.read().entries.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    fn entry(&self, name: &str) -> Result<Entry, ConfigError> {
        let inner = self.inner.read();
        inner
            .entries
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::unknown_field(&inner.name, name))
    }

    fn entries(&self) -> Vec<(String, Entry)> {
        self.inner
            .read()
            .entries
            .iter()
            .map(|(name, entry)| (name.clone(), entry.clone()))
            .collect()
    }

    fn subconfigs(&self) -> Vec<ConfigFile> {
        self.inner
            .read()
            .entries
            .values()
            .filter_map(|entry| match entry {
                Entry::Subconfig(child) => Some(child.clone()),
                Entry::Value(_) => None,
            })
            .collect()
    }

    fn insert(&self, name: &str, entry: Entry) -> Result<(), ConfigError> {
        let mut inner = self.inner.write();
        if inner.entries.contains_key(name) {
            return Err(ConfigError::DuplicateField {
                config: inner.name.clone(),
                field: name.to_string(),
            });
        }
        inner.entries.insert(name.to_string(), entry);
        Ok(())
    }

    // ============================================================
    // Declaration
    // ============================================================

    /// Declares a value. An identically named environment variable, if any,
    /// is applied right away.
    #[instrument(level = "debug", skip(self, value), fields(config = %self.name()))]
    pub fn parameter<T: Parameter>(&self, name: &str, value: T) -> Result<Param<T>, ConfigError> {
        let param = Param::new(name, value, Origin::Default);
        self.insert(name, Entry::Value(Arc::new(param.clone())))?;

        if let Ok(env) = std::env::var(name) {
            if !param.input(unquote(&env), Origin::Environment) {
                warn!(field = name, value = %env, "Ignoring invalid environment value");
            }
        }

        Ok(param)
    }

    /// Declares a value that no input can change
    pub fn constant<T: Parameter>(&self, name: &str, value: T) -> Result<Param<T>, ConfigError> {
        let param = Param::new(name, value, Origin::Constant);
        self.insert(name, Entry::Value(Arc::new(param.clone())))?;
        Ok(param)
    }

    /// Nests `child` under its own name. An environment variable with that
    /// name is taken as the path to read the child from.
    #[instrument(level = "debug", skip_all, fields(config = %self.name(), child = %child.name()))]
    pub fn subconfig(&self, child: &ConfigFile) -> Result<(), ConfigError> {
        let name = child.name();
        self.insert(&name, Entry::Subconfig(child.clone()))?;

        if let Ok(path) = std::env::var(&name) {
            match child.read_config(unquote(&path)) {
                Ok(result) if result.is_ok() => {}
                Ok(result) => warn!(child = %name, ?result, "Subconfig file had errors"),
                Err(error) => warn!(child = %name, %error, "Unable to read subconfig file"),
            }
        }

        Ok(())
    }

    // ============================================================
    // Access by name
    // ============================================================

    /// Typed handle on a declared value
    pub fn param<T: Parameter>(&self, name: &str) -> Result<Param<T>, ConfigError> {
        let wrong_type = || ConfigError::WrongType {
            config: self.name(),
            field: name.to_string(),
            expected: T::type_name(),
        };

        match self.entry(name)? {
            Entry::Value(value) => value
                .as_any()
                .downcast_ref::<Param<T>>()
                .cloned()
                .ok_or_else(wrong_type),
            Entry::Subconfig(_) => Err(wrong_type()),
        }
    }

    pub fn subconfig_of(&self, name: &str) -> Result<ConfigFile, ConfigError> {
        match self.entry(name)? {
            Entry::Subconfig(child) => Ok(child),
            Entry::Value(_) => Err(ConfigError::WrongType {
                config: self.name(),
                field: name.to_string(),
                expected: "subconfig".to_string(),
            }),
        }
    }

    /// Text form of a value, or the file name of a subconfig
    pub fn value_of(&self, name: &str) -> Result<String, ConfigError> {
        Ok(self.entry(name)?.render())
    }

    pub fn origin_of(&self, name: &str) -> Result<Origin, ConfigError> {
        Ok(self.entry(name)?.origin())
    }

    /// Parses `text` into the named value if `origin` has precedence.
    /// Returns whether the value is valid afterwards.
    pub fn input(&self, name: &str, text: &str, origin: Origin) -> Result<bool, ConfigError> {
        match self.entry(name)? {
            Entry::Value(value) => Ok(value.input(text, origin)),
            Entry::Subconfig(child) => Ok(child.read_config(unquote(text))?.is_ok()),
        }
    }

    pub fn override_with(&self, name: &str, text: &str) -> Result<bool, ConfigError> {
        self.input(name, text, Origin::Override)
    }

    // ============================================================
    // Setup
    // ============================================================

    /// Reads values from `path` (`"auto"` for [`default_path`](Self::default_path),
    /// `""` to keep the built-in values) then shows the result according to
    /// `verbosity`.
    #[instrument(level = "debug", skip(self), fields(config = %self.name()))]
    pub fn setup(&self, path: &str, verbosity: Verbosity) -> Result<ReadResult, ConfigError> {
        let result = match path {
            "" => ReadResult::OK,
            "auto" => self.read_config(self.default_path())?,
            path => self.read_config(path)?,
        };

        if verbosity >= Verbosity::Show {
            print!("{}", self.render(Target::Terminal));
        }

        if verbosity >= Verbosity::Paranoid {
            print!(
                "Please take some time to review the configuration values and press enter when you are certain."
            );
            let mut line = String::new();
            io::stdout()
                .flush()
                .and_then(|_| io::stdin().read_line(&mut line))
                .map_err(|e| ConfigError::io("stdin", e))?;
        }

        Ok(result)
    }

    /// Reads `path`, creating it from the current values if it does not exist
    /// and rewriting it if fields were missing or unknown.
    pub fn read_config(&self, path: impl AsRef<Path>) -> Result<ReadResult, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "Writing default config");
            self.write_exact(path)?;
            return Ok(ReadResult::OK);
        }

        let result = self.read_file(path)?;
        if result.needs_rewrite() {
            info!(path = %path.display(), ?result, "Updating config");
            self.write_exact(path)?;
        }

        Ok(result)
    }

    // ============================================================
    // Text form
    // ============================================================

    /// Reads `path` without creating nor rewriting it
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<ReadResult, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let result = self.read_from(&text, path.parent())?;
        self.inner.write().path = Some(path.to_path_buf());
        Ok(result)
    }

    /// Parses the text form. Subconfig files are looked for in `dir`.
    #[instrument(level = "debug", skip(self, text), fields(config = %self.name()))]
    pub fn read_from(&self, text: &str, dir: Option<&Path>) -> Result<ReadResult, ConfigError> {
        enum State {
            Start,
            Header,
            Body,
            End,
        }

        let name = self.name();
        let mut expected: Vec<String> = self
            .field_names()
            .into_iter()
            .filter(|f| !f.starts_with(DEBUG_PREFIX))
            .collect();
        let mut result = ReadResult::OK;
        let mut state = State::Start;
        let mut lines = text.lines();

        while let Some(line) = lines.next() {
            if matches!(state, State::End) {
                break;
            }
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            match state {
                State::Start => {
                    if let Some(captures) = NAME_LINE.captures(line) {
                        if captures[1] != name {
                            return Err(ConfigError::TypeMismatch {
                                expected: name,
                                found: captures[1].to_string(),
                            });
                        }
                        state = State::Header;
                    }
                }
                State::Header => {
                    if SEPARATOR.is_match(line) {
                        state = State::Body;
                    }
                }
                State::Body => {
                    if SEPARATOR.is_match(line) {
                        state = State::End;
                    } else if let Some(captures) = DATA_ROW.captures(line) {
                        let field = &captures[1];
                        let mut value = captures[2].to_string();

                        if MAP_FIELD.is_match(&value) {
                            value.clear();
                            for row in lines.by_ref() {
                                if row == "}" {
                                    break;
                                }
                                value.push_str(row);
                                value.push('\n');
                            }
                        }

                        expected.retain(|f| f != field);
                        result |= self.apply_row(field, &value, dir);
                    } else {
                        warn!(config = %name, line, "Could not parse line");
                        result |= ReadResult::LINE_INVALID_FORMAT;
                    }
                }
                State::End => {}
            }
        }

        if !expected.is_empty() {
            warn!(config = %name, missing = ?expected, "Could not find a value for some fields");
            result |= ReadResult::FIELD_MISSING;
        }

        Ok(result)
    }

    fn apply_row(&self, field: &str, value: &str, dir: Option<&Path>) -> ReadResult {
        let name = self.name();
        match self.entry(field) {
            Ok(Entry::Value(entry)) => {
                if entry.input(value, Origin::File) {
                    ReadResult::OK
                } else {
                    warn!(config = %name, field, value, "Error parsing field");
                    ReadResult::FIELD_PARSE
                }
            }
            Ok(Entry::Subconfig(child)) => {
                let file = unquote(value);
                let path = dir.map_or_else(|| PathBuf::from(file), |d| d.join(file));
                match child.read_config(&path) {
                    Ok(result) if result.is_ok() => ReadResult::OK,
                    Ok(result) => {
                        warn!(config = %name, field, ?result, "Subconfig file had errors");
                        ReadResult::SUBCONFIG_FILE
                    }
                    Err(error) => {
                        warn!(config = %name, field, %error, "Unable to read subconfig file");
                        ReadResult::SUBCONFIG_FILE
                    }
                }
            }
            Err(_) if field.starts_with(DEBUG_PREFIX) => ReadResult::OK,
            Err(_) => {
                warn!(config = %name, field, "Could not find field");
                ReadResult::FIELD_UNKNOWN
            }
        }
    }

    /// Titled, column aligned block of `name: value` rows
    pub fn render(&self, target: Target) -> String {
        let inner = self.inner.read();
        let mut out = String::new();

        if inner.entries.is_empty() {
            let _ = writeln!(
                out,
                "Empty configuration file: {} (either voluntarily or it is unused by this executable)\n",
                inner.name
            );
            return out;
        }

        let to_file = target == Target::File;
        let prefix_size = if to_file {
            0
        } else {
            Origin::Default.prefix().len()
        };
        let title = format!(" {} ", inner.name);
        let half_title = (title.len() - 1) / 2;
        let mut width = inner.entries.keys().map(String::len).max().unwrap_or(0);
        if prefix_size + width <= half_title {
            width = half_title - prefix_size + 1;
        }
        let title_prefix = "=".repeat(prefix_size + width - half_title);
        let full_header = "=".repeat(2 * title_prefix.len() + title.len());

        let _ = writeln!(out, "{full_header}");
        let _ = writeln!(out, "{title_prefix}{title}{title_prefix}");
        if !to_file {
            let path = inner
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "*default*".to_string());
            let _ = writeln!(out, "{}file: {path}", " ".repeat(width.saturating_sub(4)));
        }
        let _ = writeln!(out, "{full_header}\n");

        for (name, entry) in &inner.entries {
            if !to_file {
                out.push_str(entry.origin().prefix());
            }
            let _ = writeln!(out, "{name:>width$}: {}", entry.render());
        }
        let _ = writeln!(out, "\n{full_header}");

        if !to_file {
            for entry in inner.entries.values() {
                if let Entry::Subconfig(child) = entry {
                    out.push('\n');
                    out.push_str(&child.render(Target::Terminal));
                }
            }
        }

        out
    }

    /// Writes this configuration and, next to it, its subconfigs. A path
    /// without the `.config` extension is taken as a folder; an empty one
    /// means [`default_path`](Self::default_path).
    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<PathBuf, ConfigError> {
        let path = path.as_ref();
        let path = if path.as_os_str().is_empty() {
            self.default_path()
        } else if path.extension().is_some_and(|e| e == EXTENSION) {
            path.to_path_buf()
        } else {
            path.join(self.default_file_name())
        };

        self.write_exact(&path)?;
        Ok(path)
    }

    #[instrument(level = "debug", skip(self), fields(config = %self.name()))]
    fn write_exact(&self, path: &Path) -> Result<(), ConfigError> {
        let dir = path.parent().unwrap_or_else(|| Path::new(""));
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).map_err(|e| ConfigError::io(dir, e))?;
        }

        for child in self.subconfigs() {
            child.write_exact(&dir.join(child.file_name()))?;
        }

        self.inner.write().path = Some(path.to_path_buf());
        fs::write(path, self.render(Target::File)).map_err(|e| ConfigError::io(path, e))?;
        info!(path = %path.display(), "Wrote config");

        Ok(())
    }

    // ============================================================
    // Json snapshots
    // ============================================================

    /// `{"path": ..., <field>: <value>, ...}`, recursively for subconfigs
    pub fn to_json(&self) -> Result<serde_json::Value, ConfigError> {
        let mut map = serde_json::Map::new();
        let path = self
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        map.insert("path".to_string(), serde_json::Value::String(path));

        for (name, entry) in self.entries() {
            let value = match entry {
                Entry::Value(value) => value.to_json()?,
                Entry::Subconfig(child) => child.to_json()?,
            };
            map.insert(name, value);
        }

        Ok(serde_json::Value::Object(map))
    }

    /// Restores values from a snapshot. Missing fields only warn.
    pub fn from_json(&self, json: &serde_json::Value) -> Result<(), ConfigError> {
        let object = json.as_object().ok_or_else(|| ConfigError::NotAnObject {
            config: self.name(),
        })?;

        let path = object
            .get("path")
            .and_then(serde_json::Value::as_str)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        self.inner.write().path = path;

        for (name, entry) in self.entries() {
            let Some(value) = object.get(&name) else {
                warn!(config = %self.name(), field = %name, "Unable to find field in json snapshot");
                continue;
            };
            match entry {
                Entry::Value(entry) => {
                    if !entry.load_json(value) {
                        warn!(config = %self.name(), field = %name, "Unable to load field from json snapshot");
                    }
                }
                Entry::Subconfig(child) => child.from_json(value)?,
            }
        }

        Ok(())
    }
}

impl fmt::Display for ConfigFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(Target::Terminal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Bounds, Weights};
    use std::collections::BTreeMap;

    fn config() -> (ConfigFile, Param<i32>, Param<Bounds<f32>>, Param<Weights>) {
        let config = ConfigFile::new("Sample");
        let count = config.parameter("count", 3).unwrap();
        let bounds = config
            .parameter("floatFieldBounds", Bounds::new(-4.0f32, 0.0, 0.0, 4.0).unwrap())
            .unwrap();
        let rates = config
            .parameter(
                "mutationRates",
                BTreeMap::from([("a".to_string(), 1.0f32), ("bb".to_string(), 2.0)]),
            )
            .unwrap();
        (config, count, bounds, rates)
    }

    #[test]
    fn it_renders_the_file_layout() {
        let (config, ..) = config();
        // " Sample " is 8 wide and the longest name 16, hence 13 leading '='
        let side = "=".repeat(13);
        let full = "=".repeat(34);
        let expected = format!(
            "{full}\n{side} Sample {side}\n{full}\n\n\
             \x20          count: 3\n\
             floatFieldBounds: (-4 0 0 4 0.01)\n\
             \x20  mutationRates: map(String, f32) {{\n\
             \x20    \"a\": 1\n\
             \x20   \"bb\": 2\n\
             }}\n\n{full}\n"
        );
        assert_eq!(config.render(Target::File), expected);
    }

    #[test]
    fn it_renders_provenance_for_terminals() {
        let (config, count, ..) = config();
        count.override_with(5);
        let rendered = config.render(Target::Terminal);
        assert!(rendered.contains("file: *default*"));
        assert!(rendered.contains(&format!("[O] {:>16}: 5", "count")));
        assert!(rendered.contains("[D] floatFieldBounds: (-4 0 0 4 0.01)"));
    }

    #[test]
    fn it_pads_short_names_to_the_title() {
        let config = ConfigFile::new("AVeryLongConfigurationName");
        config.parameter("x", 1).unwrap();
        let rendered = config.render(Target::File);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0].len(), lines[1].len());
        assert_eq!(lines[1], "= AVeryLongConfigurationName =");
        assert_eq!(lines[4], format!("{:>14}: 1", "x"));
    }

    #[test]
    fn it_reads_rendered_files_back() {
        let (config, ..) = config();
        let text = config.render(Target::File);

        let (other, count, bounds, rates) = self::config();
        count.override_with(0);
        bounds.override_with(Bounds::uniform(-1.0, 1.0).unwrap());
        let result = other.read_from(&text, None).unwrap();

        assert_eq!(result, ReadResult::OK);
        assert_eq!(count.get(), 0);
        assert_eq!(count.origin(), Origin::Override);
        assert_eq!(bounds.get(), Bounds::uniform(-1.0, 1.0).unwrap());
        assert_eq!(rates.origin(), Origin::File);
        assert_eq!(rates.get().get("bb"), Some(&2.0));
    }

    #[test]
    fn it_tolerates_comments_and_flags_problems() {
        let (config, count, ..) = config();
        let text = "\
# A comment before the header
========
== Sample ==
========

count: twelve
  unknownField: 3
DEBUG_trace: 1
this is not a row
   mutationRates: map(String, f32) {
    \"z\": 4
}
========
";
        let result = config.read_from(text, None).unwrap();
        assert!(result.contains(ReadResult::FIELD_PARSE));
        assert!(result.contains(ReadResult::FIELD_UNKNOWN));
        assert!(result.contains(ReadResult::LINE_INVALID_FORMAT));
        assert!(result.contains(ReadResult::FIELD_MISSING));
        assert!(!result.contains(ReadResult::SUBCONFIG_FILE));
        assert!(result.needs_rewrite());
        assert_eq!(count.origin(), Origin::Error);

        let rates: Param<Weights> = config.param("mutationRates").unwrap();
        assert_eq!(rates.get(), BTreeMap::from([("z".to_string(), 4.0)]));
    }

    #[test]
    fn it_reads_back_names_with_underscores() {
        let config = ConfigFile::new("Ga_Params");
        let count = config.parameter("count", 3).unwrap();
        let text = config.render(Target::File).replace("count: 3", "count: 8");

        let result = config.read_from(&text, None).unwrap();
        assert_eq!(result, ReadResult::OK);
        assert_eq!(count.get(), 8);
        assert_eq!(count.origin(), Origin::File);

        let other = "=======\n== Ga_Other ==\n=======\n\ncount: 1\n=======\n";
        assert!(matches!(
            config.read_from(other, None),
            Err(ConfigError::TypeMismatch { found, .. }) if found == "Ga_Other"
        ));
    }

    #[test]
    fn it_fails_on_wrong_config_type() {
        let (config, ..) = config();
        let text = "=====\n== Other ==\n=====\n\ncount: 1\n=====\n";
        assert!(matches!(
            config.read_from(text, None),
            Err(ConfigError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn it_rejects_duplicate_fields() {
        let (config, ..) = config();
        assert!(matches!(
            config.parameter("count", 1),
            Err(ConfigError::DuplicateField { .. })
        ));
    }

    #[test]
    fn it_keeps_constants() {
        let config = ConfigFile::new("Constants");
        let c = config.constant("answer", 42u8).unwrap();
        assert!(config.input("answer", "7", Origin::Override).unwrap());
        assert_eq!(c.get(), 42);
        assert_eq!(config.origin_of("answer").unwrap(), Origin::Constant);
    }

    #[test]
    fn it_accesses_values_by_name() {
        let (config, ..) = config();
        assert_eq!(config.value_of("count").unwrap(), "3");
        assert!(config.override_with("count", "8").unwrap());
        assert_eq!(config.param::<i32>("count").unwrap().get(), 8);
        assert!(matches!(
            config.param::<f32>("count"),
            Err(ConfigError::WrongType { .. })
        ));
        assert!(matches!(
            config.value_of("nothing"),
            Err(ConfigError::UnknownField { .. })
        ));
    }

    #[test]
    fn it_reads_values_from_the_environment() {
        // SAFETY: the variable name is unique to this test
        unsafe { std::env::set_var("envCheckedCount", "\"17\"") };
        let config = ConfigFile::new("Environment");
        let count = config.parameter("envCheckedCount", 1).unwrap();
        assert_eq!(count.get(), 17);
        assert_eq!(count.origin(), Origin::Environment);
        assert!(count.input("3", Origin::File));
        assert_eq!(count.get(), 17);
    }

    #[test]
    fn it_snapshots_to_json() {
        let (config, count, ..) = config();
        let json = config.to_json().unwrap();
        assert_eq!(json["path"], "");
        assert_eq!(json["count"], 3);
        assert_eq!(
            json["floatFieldBounds"],
            serde_json::json!([-4.0, 0.0, 0.0, 4.0, 0.01])
        );

        let (other, other_count, ..) = self::config();
        other
            .from_json(&serde_json::json!({"path": "", "count": 11}))
            .unwrap();
        assert_eq!(other_count.get(), 11);
        assert_eq!(other_count.origin(), Origin::Load);
        assert_eq!(count.get(), 3);

        assert!(other.from_json(&serde_json::json!([1, 2])).is_err());
    }

    #[test]
    fn it_renders_empty_configs() {
        let config = ConfigFile::new("Nothing");
        assert!(
            config
                .render(Target::File)
                .starts_with("Empty configuration file: Nothing")
        );
    }
}
