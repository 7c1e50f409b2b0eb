use crate::parser::ParserSpec;
use serde::Deserialize;

/// Configuration of the body parsing stage.
///
/// `parsers` takes either a single parser name or a list of names:
///
/// ```
/// # use micro_body_parser::BodyParserConfig;
/// let one: BodyParserConfig = serde_json::from_str(r#"{"parsers": "json"}"#).unwrap();
/// let many: BodyParserConfig = serde_json::from_str(r#"{"parsers": ["json", "form"]}"#).unwrap();
///
/// assert_eq!(one.parser_names(), ["json"]);
/// assert_eq!(many.parser_names(), ["json", "form"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BodyParserConfig {
    #[serde(default)]
    parsers: ParserNames,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum ParserNames {
    One(String),
    Many(Vec<String>),
}

impl Default for ParserNames {
    fn default() -> Self {
        ParserNames::Many(vec![])
    }
}

impl BodyParserConfig {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { parsers: ParserNames::Many(names.into_iter().map(Into::into).collect()) }
    }

    pub fn parser_names(&self) -> &[String] {
        match &self.parsers {
            ParserNames::One(name) => std::slice::from_ref(name),
            ParserNames::Many(names) => names,
        }
    }

    /// The configured parsers, in configuration order
    pub fn parsers(&self) -> impl Iterator<Item = ParserSpec> + '_ {
        self.parser_names().iter().map(|name| ParserSpec::from(name.as_str()))
    }
}
