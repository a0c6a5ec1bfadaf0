//! Generation request file read by the `plancc` binary
//!
//! A request bundles the class model of the target program, split by loader
//! layer, with the candidate plan sets to compile:
//!
//! ```json
//! {
//!   "classes": { "instrumented": [ { "name": "demo.Point", "constructors": [ { "params": ["int", "int"] } ] } ] },
//!   "candidates": [ { "method": { ... }, "parameters": { "instance": { ... } } } ]
//! }
//! ```

use crate::config::HelperLibrary;
use crate::generator::Candidate;
use plancc_runtime::{
    java_lang_classes, ClassDef, ClassKind, InMemoryClassSource, LayeredClassLoader,
};
use serde::{Deserialize, Serialize};

const JAVA_OBJECT: &str = "java.lang.Object";

/// Class definitions per loader layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassLayers {
    /// Target classes
    pub instrumented: Vec<ClassDef>,
    /// Runtime support classes
    pub runtime: Vec<ClassDef>,
    /// Host classes, on top of the built-in `java.lang` baseline
    pub host: Vec<ClassDef>,
}

/// Contents of a request file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Class model
    #[serde(default)]
    pub classes: ClassLayers,
    /// Candidates in the order they are tried
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

fn source(base: Vec<ClassDef>, defs: &[ClassDef]) -> InMemoryClassSource {
    base.into_iter()
        .chain(defs.iter().cloned().map(with_object_root))
        .collect()
}

/// Classes declared without a superclass extend `java.lang.Object`
fn with_object_root(mut def: ClassDef) -> ClassDef {
    if def.superclass.is_none() && def.kind != ClassKind::Interface && def.name != JAVA_OBJECT {
        def.superclass = Some(JAVA_OBJECT.to_string());
    }
    def
}

impl GenerationRequest {
    /// Parse a request
    ///
    /// # Errors
    /// Returns the `serde_json` error for malformed input.
    pub fn from_json_str(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }

    /// Loader over the request's classes
    ///
    /// The runtime layer always holds the helper class described by
    /// `helpers` and the host layer the `java.lang` baseline; request
    /// definitions of the same name replace them.
    #[must_use]
    pub fn loader(&self, helpers: &HelperLibrary) -> LayeredClassLoader {
        LayeredClassLoader::builder()
            .instrumented(source(Vec::new(), &self.classes.instrumented))
            .runtime(source(vec![helpers.class_def()], &self.classes.runtime))
            .host(source(java_lang_classes(), &self.classes.host))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plancc_runtime::{ClassLoader, ClassOrigin};

    const REQUEST: &str = r#"{
        "classes": {
            "instrumented": [
                { "name": "demo.Point", "constructors": [ { "params": ["int", "int"] } ] }
            ]
        },
        "candidates": [
            {
                "method": { "owner": "demo/Point", "name": "<init>", "params": [], "returns": { "kind": "void" } }
            }
        ]
    }"#;

    #[test]
    fn request_parses_and_builds_a_loader() {
        let request = GenerationRequest::from_json_str(REQUEST).unwrap();
        assert_eq!(request.candidates.len(), 1);
        assert!(request.candidates[0].parameters.is_none());

        let helpers = HelperLibrary::default().in_package("demo");
        let loader = request.loader(&helpers);
        let point = loader.load_class("demo.Point").unwrap();
        assert_eq!(point.superclass(), Some(JAVA_OBJECT));
        assert_eq!(
            loader.load_class("demo.ReflectionUtils").unwrap().origin(),
            ClassOrigin::Runtime
        );
        assert_eq!(
            loader.load_class("java.lang.Class").unwrap().origin(),
            ClassOrigin::Host
        );
    }
}
