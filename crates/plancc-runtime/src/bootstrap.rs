//! Minimal host class baseline
//!
//! The compiler itself needs a handful of `java.lang` classes regardless of
//! the target program: `Object` for null bindings and `getClass()`, `Class`
//! for class literals, `String` for names passed to reflection helpers, and
//! `java.lang.reflect.Array` for array class literals.

use crate::class::ClassDef;
use crate::loader::InMemoryClassSource;

/// Definitions of the `java.lang` classes the compiler depends on
#[must_use]
pub fn java_lang_classes() -> Vec<ClassDef> {
    let mut classes = vec![
        ClassDef::new("java.lang.Object")
            .extends(None)
            .constructor(&[])
            .method("getClass", &[], "java.lang.Class")
            .method("hashCode", &[], "int")
            .method("equals", &["java.lang.Object"], "boolean")
            .method("toString", &[], "java.lang.String"),
        ClassDef::new("java.lang.Class")
            .method("getName", &[], "java.lang.String")
            .static_method("forName", &["java.lang.String"], "java.lang.Class"),
        ClassDef::new("java.lang.String")
            .constructor(&[])
            .method("length", &[], "int"),
        ClassDef::new("java.lang.Enum")
            .method("name", &[], "java.lang.String")
            .method("ordinal", &[], "int"),
        ClassDef::new("java.lang.reflect.Array")
            .static_method("newInstance", &["java.lang.Class", "int"], "java.lang.Object")
            .static_method("getLength", &["java.lang.Object"], "int"),
    ];

    let boxes = [
        ("java.lang.Boolean", "boolean"),
        ("java.lang.Byte", "byte"),
        ("java.lang.Character", "char"),
        ("java.lang.Short", "short"),
        ("java.lang.Integer", "int"),
        ("java.lang.Long", "long"),
        ("java.lang.Float", "float"),
        ("java.lang.Double", "double"),
    ];
    for (name, primitive) in boxes {
        classes.push(
            ClassDef::new(name)
                .constructor(&[primitive])
                .static_method("valueOf", &[primitive], name)
                .static_field("TYPE", "java.lang.Class"),
        );
    }
    classes
}

/// [`java_lang_classes`] as a class source, for the host layer
#[must_use]
pub fn java_lang_source() -> InMemoryClassSource {
    java_lang_classes().into_iter().collect()
}
