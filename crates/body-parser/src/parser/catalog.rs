use crate::error::BuildError;
use crate::parser::{FormParser, JsonParser, Parser};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

const PARSER_SUFFIX: &str = "_parser";

type CatalogFactory = Arc<dyn Fn() -> Arc<dyn Parser> + Send + Sync>;

static BUILTIN: Lazy<ParserCatalog> = Lazy::new(ParserCatalog::new);

/// The table used to resolve parser names into parser instances.
///
/// The catalog starts with the built-in parsers, `json` and `form`. A name may also be given with the conventional
/// `_parser` suffix, so `json_parser` resolves to the same entry as `json`.
#[derive(Clone)]
pub struct ParserCatalog {
    factories: HashMap<String, CatalogFactory>,
}

impl ParserCatalog {
    fn new() -> Self {
        let catalog = Self { factories: HashMap::new() };
        catalog.register("json", || Arc::new(JsonParser)).register("form", || Arc::new(FormParser))
    }

    /// The shared catalog holding only the built-in parsers
    pub fn builtin() -> &'static ParserCatalog {
        &BUILTIN
    }

    /// Registers a parser under `name`, replacing any previous entry of the same name
    pub fn register<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Arc<dyn Parser> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Creates the parser registered under `name`.
    pub fn create(&self, name: &str) -> Result<Arc<dyn Parser>, BuildError> {
        self.lookup(name).map(|factory| factory()).ok_or_else(|| BuildError::unknown_parser(name))
    }

    fn lookup(&self, name: &str) -> Option<&CatalogFactory> {
        self.factories
            .get(name)
            .or_else(|| name.strip_suffix(PARSER_SUFFIX).and_then(|stripped| self.factories.get(stripped)))
    }
}

impl Default for ParserCatalog {
    fn default() -> Self {
        Self::builtin().clone()
    }
}

impl fmt::Debug for ParserCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = self.factories.keys().collect::<Vec<_>>();
        names.sort();
        f.debug_struct("ParserCatalog").field("names", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tests::EchoParser;

    #[test]
    fn test_builtin() {
        let catalog = ParserCatalog::builtin();

        assert!(catalog.contains("json"));
        assert!(catalog.contains("form"));
        assert!(catalog.contains("json_parser"));
        assert!(!catalog.contains("xml"));
        assert!(!catalog.contains("_parser"));
    }

    #[test]
    fn test_unknown() {
        let err = ParserCatalog::default().create("xml").unwrap_err();
        assert!(matches!(err, BuildError::UnknownParser { name } if name == "xml"));
    }

    #[test]
    fn test_register() {
        let catalog = ParserCatalog::default().register("text", || Arc::new(EchoParser::new("text", &["text/plain"])));

        let parser = catalog.create("text_parser").unwrap();
        assert_eq!(parser.name(), "text");
        assert_eq!(parser.mime_types(), &["text/plain"]);

        // the shared built-in catalog is left untouched
        assert!(!ParserCatalog::builtin().contains("text"));
    }

    #[test]
    fn test_register_overrides() {
        let catalog = ParserCatalog::default().register("json", || Arc::new(EchoParser::new("lenient", &["application/json"])));

        assert_eq!(catalog.create("json").unwrap().name(), "lenient");
    }
}
