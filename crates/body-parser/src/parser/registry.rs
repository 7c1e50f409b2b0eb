use crate::error::BuildError;
use crate::parser::{Parser, ParserCatalog, ParserSpec};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// An immutable mapping from lowercase mime type to the parser handling it.
///
/// Built once when the middleware is created, then only read.
#[derive(Clone, Default)]
pub struct ParserRegistry {
    parsers: HashMap<String, Arc<dyn Parser>>,
}

impl ParserRegistry {
    /// Resolves each spec and registers the parser under every mime type it declares.
    ///
    /// When two parsers declare the same mime type, the one appearing later in `specs` wins.
    pub fn build<I>(catalog: &ParserCatalog, specs: I) -> Result<Self, BuildError>
    where
        I: IntoIterator,
        I::Item: Into<ParserSpec>,
    {
        let mut parsers = HashMap::new();

        for spec in specs {
            let parser = spec.into().resolve(catalog)?;

            for mime_type in parser.mime_types() {
                let key = mime_type.trim().to_ascii_lowercase();
                debug!(mime_type = %key, parser = parser.name(), "register body parser");

                if let Some(replaced) = parsers.insert(key, Arc::clone(&parser)) {
                    debug!(mime_type = %mime_type, replaced = replaced.name(), "body parser replaced");
                }
            }
        }

        Ok(Self { parsers })
    }

    /// Looks up the parser for a lowercase media type such as `application/json`
    #[inline]
    pub fn get(&self, media_type: &str) -> Option<&Arc<dyn Parser>> {
        self.parsers.get(media_type)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    /// The registered mime types, sorted
    pub fn mime_types(&self) -> Vec<&str> {
        let mut mime_types = self.parsers.keys().map(String::as_str).collect::<Vec<_>>();
        mime_types.sort_unstable();
        mime_types
    }
}

impl fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries = self.parsers.iter().map(|(mime, parser)| (mime.as_str(), parser.name())).collect::<Vec<_>>();
        entries.sort_unstable();
        f.debug_map().entries(entries).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::JsonParser;
    use crate::parser::tests::EchoParser;

    fn catalog() -> ParserCatalog {
        ParserCatalog::default()
            .register("upper", || Arc::new(EchoParser::new("upper", &["Text/Plain", "APPLICATION/X-Custom"])))
            .register("plain", || Arc::new(EchoParser::new("plain", &["text/plain"])))
    }

    #[test]
    fn test_empty() {
        let registry = ParserRegistry::build(&catalog(), Vec::<ParserSpec>::new()).unwrap();

        assert!(registry.is_empty());
        assert!(registry.get("application/json").is_none());
    }

    #[test]
    fn test_union_of_mime_types() {
        let registry = ParserRegistry::build(&catalog(), ["json", "form"]).unwrap();

        assert_eq!(
            registry.mime_types(),
            vec!["application/json", "application/vnd.api+json", "application/x-www-form-urlencoded"]
        );
        assert_eq!(registry.get("application/json").unwrap().name(), "json");
        assert_eq!(registry.get("application/vnd.api+json").unwrap().name(), "json");
        assert_eq!(registry.get("application/x-www-form-urlencoded").unwrap().name(), "form");
    }

    #[test]
    fn test_keys_are_lowercase() {
        let registry = ParserRegistry::build(&catalog(), ["upper"]).unwrap();

        assert_eq!(registry.mime_types(), vec!["application/x-custom", "text/plain"]);
        assert!(registry.get("Text/Plain").is_none());
    }

    #[test]
    fn test_later_spec_wins() {
        let registry = ParserRegistry::build(&catalog(), ["upper", "plain"]).unwrap();
        assert_eq!(registry.get("text/plain").unwrap().name(), "plain");
        assert_eq!(registry.get("application/x-custom").unwrap().name(), "upper");

        let registry = ParserRegistry::build(&catalog(), ["plain", "upper"]).unwrap();
        assert_eq!(registry.get("text/plain").unwrap().name(), "upper");
    }

    #[test]
    fn test_mixed_specs() {
        let specs = vec![
            ParserSpec::from("plain"),
            ParserSpec::of::<JsonParser>(),
            ParserSpec::instance(EchoParser::new("csv", &["text/csv"])),
        ];
        let registry = ParserRegistry::build(&catalog(), specs).unwrap();

        assert_eq!(registry.len(), 4);
        assert_eq!(registry.get("text/csv").unwrap().name(), "csv");
        assert_eq!(registry.get("application/json").unwrap().name(), "json");
    }

    #[test]
    fn test_shared_instance() {
        let registry = ParserRegistry::build(&catalog(), ["json"]).unwrap();

        let json = registry.get("application/json").unwrap();
        let json_api = registry.get("application/vnd.api+json").unwrap();
        assert!(Arc::ptr_eq(json, json_api));
    }

    #[test]
    fn test_build_errors() {
        let err = ParserRegistry::build(&catalog(), ["json", "yaml"]).unwrap_err();
        assert!(matches!(err, BuildError::UnknownParser { name } if name == "yaml"));

        let specs = vec![ParserSpec::from("json"), ParserSpec::instance(EchoParser::new("mute", &[]))];
        let err = ParserRegistry::build(&catalog(), specs).unwrap_err();
        assert!(matches!(err, BuildError::InvalidParser { parser, .. } if parser == "mute"));
    }
}
