//! Compiler configuration
//!
//! [`CompilerConfig`] carries the reflection helper library layout, the
//! optional nesting limit and logging settings. It is plain serde data and
//! loads from TOML, JSON or YAML.
//!
//! A helper family maps a primitive type name (`"int"`) to the specialised
//! routine for that type and falls back to its generic routine for every
//! other type.

use plancc_runtime::{ClassDef, Primitive};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Configuration loading and validation failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Unreadable file
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed TOML
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed JSON
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed YAML
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// File extension does not name a known format
    #[error("unsupported config format `{0}`")]
    UnknownFormat(String),

    /// Empty routine or class name
    #[error("empty name in `{0}`")]
    EmptyName(&'static str),

    /// Specialisation keyed by something other than a primitive type name
    #[error("`{family}` specialises `{helper}` for non-primitive type `{type_name}`")]
    NotPrimitive {
        /// Family
        family: &'static str,
        /// Routine
        helper: String,
        /// Offending type name
        type_name: String,
    },

    /// Two routines of one family claim the same type
    #[error("`{family}` has both `{first}` and `{second}` for `{type_name}`")]
    AmbiguousSpecialization {
        /// Family
        family: &'static str,
        /// Type name
        type_name: String,
        /// First routine
        first: String,
        /// Second routine
        second: String,
    },

    /// Helper package is not a dotted Java package name
    #[error("invalid helper package `{0}`")]
    InvalidPackage(String),

    /// Zero nesting limit
    #[error("max_depth must be at least 1")]
    ZeroDepth,
}

/// One family of helper routines: a generic routine plus per-primitive ones
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelperFamily {
    /// Routine used when no specialisation matches
    pub generic: String,
    /// Routine name -> primitive type name it handles
    #[serde(default)]
    pub specialized: BTreeMap<String, String>,
}

impl HelperFamily {
    /// Family whose specialisations are named `{prefix}{Type}{suffix}`
    #[must_use]
    pub fn per_primitive(generic: &str, prefix: &str, suffix: &str) -> Self {
        let specialized = Primitive::ALL
            .iter()
            .map(|p| {
                let name = p.type_name();
                let mut capitalized = name[..1].to_uppercase();
                capitalized.push_str(&name[1..]);
                (format!("{prefix}{capitalized}{suffix}"), name.to_string())
            })
            .collect();
        Self {
            generic: generic.to_string(),
            specialized,
        }
    }

    /// Specialised routine for `type_name`
    #[must_use]
    pub fn specialized_for(&self, type_name: &str) -> Option<&str> {
        self.specialized
            .iter()
            .find(|(_, ty)| ty.as_str() == type_name)
            .map(|(helper, _)| helper.as_str())
    }

    /// Specialised routine for `type_name`, or the generic one
    #[must_use]
    pub fn select(&self, type_name: &str) -> &str {
        self.specialized_for(type_name).unwrap_or(&self.generic)
    }

    fn validate(&self, family: &'static str) -> Result<(), ConfigError> {
        if self.generic.is_empty() {
            return Err(ConfigError::EmptyName(family));
        }
        let mut claimed: BTreeMap<&str, &str> = BTreeMap::new();
        for (helper, type_name) in &self.specialized {
            if helper.is_empty() {
                return Err(ConfigError::EmptyName(family));
            }
            if Primitive::from_type_name(type_name).is_none() {
                return Err(ConfigError::NotPrimitive {
                    family,
                    helper: helper.clone(),
                    type_name: type_name.clone(),
                });
            }
            if let Some(first) = claimed.insert(type_name, helper) {
                return Err(ConfigError::AmbiguousSpecialization {
                    family,
                    type_name: type_name.clone(),
                    first: first.to_string(),
                    second: helper.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Layout of the reflection helper library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelperLibrary {
    /// Package the helper class is generated into, empty for the default package
    pub package: String,
    /// Simple name of the helper class
    pub class_name: String,
    /// Instantiate by class name without running a constructor
    pub new_instance: String,
    /// Array allocation
    pub new_array: HelperFamily,
    /// Field reads
    pub get_field: HelperFamily,
    /// Field writes
    pub set_field: HelperFamily,
    /// Array element reads
    pub get_element: HelperFamily,
    /// Array element writes
    pub set_element: HelperFamily,
}

impl Default for HelperLibrary {
    fn default() -> Self {
        Self {
            package: String::new(),
            class_name: "ReflectionUtils".into(),
            new_instance: "newInstance".into(),
            new_array: HelperFamily::per_primitive("newArray", "new", "Array"),
            get_field: HelperFamily::per_primitive("getField", "get", "Field"),
            set_field: HelperFamily::per_primitive("setField", "set", "Field"),
            get_element: HelperFamily::per_primitive("getElement", "get", "Element"),
            set_element: HelperFamily::per_primitive("setElement", "set", "Element"),
        }
    }
}

impl HelperLibrary {
    /// Library generated into `package`
    #[must_use]
    pub fn in_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    /// Binary name of the helper class
    #[must_use]
    pub fn binary_name(&self) -> String {
        if self.package.is_empty() {
            self.class_name.clone()
        } else {
            format!("{}.{}", self.package, self.class_name)
        }
    }

    /// Reject empty names and overlapping specialisations
    ///
    /// # Errors
    /// Returns [`ConfigError`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.class_name.is_empty() {
            return Err(ConfigError::EmptyName("class_name"));
        }
        if self.new_instance.is_empty() {
            return Err(ConfigError::EmptyName("new_instance"));
        }
        if !self.package.is_empty()
            && !self.package.split('.').all(|segment| {
                !segment.is_empty()
                    && segment
                        .chars()
                        .all(|c| c.is_alphanumeric() || c == '_' || c == '$')
            })
        {
            return Err(ConfigError::InvalidPackage(self.package.clone()));
        }
        self.new_array.validate("new_array")?;
        self.get_field.validate("get_field")?;
        self.set_field.validate("set_field")?;
        self.get_element.validate("get_element")?;
        self.set_element.validate("set_element")
    }

    /// Class definition of the helper library, for the runtime layer
    #[must_use]
    pub fn class_def(&self) -> ClassDef {
        const OBJECT: &str = "java.lang.Object";
        const CLASS: &str = "java.lang.Class";
        const STRING: &str = "java.lang.String";

        let mut def = ClassDef::new(self.binary_name()).static_method(
            &self.new_instance,
            &[STRING],
            OBJECT,
        );

        def = def.static_method(&self.new_array.generic, &[STRING, "int"], OBJECT);
        for (helper, ty) in &self.new_array.specialized {
            def = def.static_method(helper, &["int"], &format!("{ty}[]"));
        }

        def = def.static_method(&self.get_field.generic, &[OBJECT, CLASS, STRING], OBJECT);
        for (helper, ty) in &self.get_field.specialized {
            def = def.static_method(helper, &[OBJECT, CLASS, STRING], ty);
        }

        def = def.static_method(
            &self.set_field.generic,
            &[OBJECT, CLASS, STRING, OBJECT],
            "void",
        );
        for (helper, ty) in &self.set_field.specialized {
            def = def.static_method(helper, &[OBJECT, CLASS, STRING, ty.as_str()], "void");
        }

        def = def.static_method(&self.get_element.generic, &[OBJECT, "int"], OBJECT);
        for (helper, ty) in &self.get_element.specialized {
            def = def.static_method(helper, &[OBJECT, "int"], ty);
        }

        def = def.static_method(&self.set_element.generic, &[OBJECT, "int", OBJECT], "void");
        for (helper, ty) in &self.set_element.specialized {
            def = def.static_method(helper, &[OBJECT, "int", ty.as_str()], "void");
        }
        def
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".into(),
            json: false,
        }
    }
}

/// Compiler configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Reflection helper library
    pub helpers: HelperLibrary,
    /// Maximum plan nesting depth, unlimited when absent
    pub max_depth: Option<usize>,
    /// Validate plan names with a [`plancc_ir::PlanGraph`] before compiling
    pub validate_plans: bool,
    /// Logging
    pub logging: LogConfig,
}

impl CompilerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With nesting limit
    #[inline]
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// With plan graph validation
    #[inline]
    #[must_use]
    pub fn with_plan_validation(mut self, enabled: bool) -> Self {
        self.validate_plans = enabled;
        self
    }

    /// With helper library
    #[inline]
    #[must_use]
    pub fn with_helpers(mut self, helpers: HelperLibrary) -> Self {
        self.helpers = helpers;
        self
    }

    /// Move the helper class into `package`, then re-validate
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidPackage`] if `package` is malformed.
    pub fn override_helper_package(
        &mut self,
        package: impl Into<String>,
    ) -> Result<(), ConfigError> {
        self.helpers.package = package.into();
        self.validate()
    }

    /// Check the configuration for contradictions
    ///
    /// # Errors
    /// Returns [`ConfigError`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == Some(0) {
            return Err(ConfigError::ZeroDepth);
        }
        self.helpers.validate()
    }

    /// Parse and validate TOML
    ///
    /// # Errors
    /// Returns [`ConfigError`] on malformed or invalid input.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate JSON
    ///
    /// # Errors
    /// Returns [`ConfigError`] on malformed or invalid input.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate YAML
    ///
    /// # Errors
    /// Returns [`ConfigError`] on malformed or invalid input.
    pub fn from_yaml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, choosing the format by extension
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the file is unreadable, has an unknown
    /// extension, or does not hold a valid configuration.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let input = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&input),
            Some("json") => Self::from_json_str(&input),
            Some("yaml" | "yml") => Self::from_yaml_str(&input),
            other => Err(ConfigError::UnknownFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }
}
