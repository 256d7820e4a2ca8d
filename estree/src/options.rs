use std::fmt;

use serde::Deserialize;

/// ECMAScript edition the parser accepts.
///
/// Deserializes from the edition year (`2018`) or the legacy edition number
/// (`9`), the same way parser options are usually written in lint configs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize)]
#[serde(try_from = "u16")]
pub enum EcmaVersion {
    Es5,
    Es2015,
    Es2016,
    Es2017,
    #[default]
    Es2018,
    Es2019,
    Es2020,
}

impl EcmaVersion {
    pub fn year(self) -> u16 {
        match self {
            EcmaVersion::Es5 => 2009,
            EcmaVersion::Es2015 => 2015,
            EcmaVersion::Es2016 => 2016,
            EcmaVersion::Es2017 => 2017,
            EcmaVersion::Es2018 => 2018,
            EcmaVersion::Es2019 => 2019,
            EcmaVersion::Es2020 => 2020,
        }
    }
}

impl TryFrom<u16> for EcmaVersion {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            5 => Ok(EcmaVersion::Es5),
            6 | 2015 => Ok(EcmaVersion::Es2015),
            7 | 2016 => Ok(EcmaVersion::Es2016),
            8 | 2017 => Ok(EcmaVersion::Es2017),
            9 | 2018 => Ok(EcmaVersion::Es2018),
            10 | 2019 => Ok(EcmaVersion::Es2019),
            11 | 2020 => Ok(EcmaVersion::Es2020),
            other => Err(format!("unsupported ecmaVersion: {}", other)),
        }
    }
}

impl fmt::Display for EcmaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcmaVersion::Es5 => write!(f, "ES5"),
            other => write!(f, "ES{}", other.year()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    #[default]
    Script,
    Module,
}

impl SourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceType::Script => "script",
            SourceType::Module => "module",
        }
    }
}

/// Options forwarded to every parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParserOptions {
    pub ecma_version: EcmaVersion,
    pub source_type: SourceType,
}

impl ParserOptions {
    pub fn module() -> Self {
        ParserOptions {
            source_type: SourceType::Module,
            ..ParserOptions::default()
        }
    }

    pub fn with_ecma_version(mut self, version: EcmaVersion) -> Self {
        self.ecma_version = version;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_es2018_script() {
        let options = ParserOptions::default();
        assert_eq!(options.ecma_version, EcmaVersion::Es2018);
        assert_eq!(options.source_type, SourceType::Script);
    }

    #[test]
    fn edition_numbers_and_years_agree() {
        assert_eq!(EcmaVersion::try_from(9), EcmaVersion::try_from(2018));
        assert!(EcmaVersion::try_from(2030).is_err());
        assert!(EcmaVersion::Es2015 < EcmaVersion::Es2018);
    }
}
