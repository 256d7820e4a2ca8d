use std::path::Path;

use estree::{EcmaVersion, SourceType};
use templates::SessionOptions;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG: &str = "jstv.toml";

/// Command-line overrides, applied on top of the config file.
#[derive(Debug, Default, Clone, Copy)]
pub struct Overrides {
    pub module: bool,
    pub ecma_version: Option<u16>,
}

/// Load session options from `path`, or from `jstv.toml` if present.
///
/// ```toml
/// [parser]
/// ecmaVersion = 2018
/// sourceType = "module"
/// ```
pub fn load(path: Option<&Path>, overrides: Overrides) -> Result<SessionOptions, String> {
    let mut options = match path {
        Some(path) => read(path)?,
        None if Path::new(DEFAULT_CONFIG).is_file() => read(Path::new(DEFAULT_CONFIG))?,
        None => SessionOptions::default(),
    };
    apply(&mut options, overrides)?;
    Ok(options)
}

pub fn apply(options: &mut SessionOptions, overrides: Overrides) -> Result<(), String> {
    if overrides.module {
        options.parser.source_type = SourceType::Module;
    }
    if let Some(version) = overrides.ecma_version {
        options.parser.ecma_version = EcmaVersion::try_from(version)?;
    }
    Ok(())
}

fn read(path: &Path) -> Result<SessionOptions, String> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
    toml::from_str(&text).map_err(|e| format!("invalid config '{}': {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_parser_section() {
        let mut file = tempfile::NamedTempFile::new().expect("failed to create temp file");
        write!(file, "[parser]\necmaVersion = 2017\nsourceType = \"module\"\n").expect("write failed");
        let options = load(Some(file.path()), Overrides::default()).expect("load failed");
        assert_eq!(options.parser.ecma_version, EcmaVersion::Es2017);
        assert_eq!(options.parser.source_type, SourceType::Module);
    }

    #[test]
    fn missing_keys_use_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("failed to create temp file");
        write!(file, "[parser]\n").expect("write failed");
        let options = load(Some(file.path()), Overrides::default()).expect("load failed");
        assert_eq!(options, SessionOptions::default());
    }

    #[test]
    fn flags_override_the_file() {
        let mut file = tempfile::NamedTempFile::new().expect("failed to create temp file");
        write!(file, "[parser]\necmaVersion = 2017\n").expect("write failed");
        let overrides = Overrides {
            module: true,
            ecma_version: Some(2019),
        };
        let options = load(Some(file.path()), overrides).expect("load failed");
        assert_eq!(options.parser.ecma_version, EcmaVersion::Es2019);
        assert_eq!(options.parser.source_type, SourceType::Module);
    }

    #[test]
    fn unknown_versions_are_rejected() {
        let mut options = SessionOptions::default();
        let overrides = Overrides {
            module: false,
            ecma_version: Some(1999),
        };
        assert!(apply(&mut options, overrides).is_err());
    }
}
