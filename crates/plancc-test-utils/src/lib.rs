//! Testing utilities for plancc workspace
//!
//! A small demo class model, loaders over it, and shorthand plan builders.

#![allow(missing_docs)]

use plancc_ir::{
    Action, ClassRef, FieldRef, MethodRef, Plan, PlanKind, PlanRef, PlanType, PrimitiveType,
    PrimitiveValue, ReflectionAction,
};
use plancc_runtime::{java_lang_source, ClassDef, InMemoryClassSource, LayeredClassLoader};
use plancc_testcase::{Statement, StatementKind, TestCase};

pub const POINT: &str = "demo/Point";
pub const COLOR: &str = "demo/Color";
pub const BOX: &str = "demo/Box";
pub const CONFIG: &str = "demo/Config";

/// `demo.Point`, `demo.Color`, `demo.Box` and `demo.Config`
pub fn demo_classes() -> Vec<ClassDef> {
    vec![
        ClassDef::new("demo.Point")
            .constructor(&[])
            .constructor(&["int", "int"])
            .field("x", "int")
            .field("y", "int")
            .static_field("ORIGIN", "demo.Point")
            .method("setX", &["int"], "void")
            .method("getX", &[], "int")
            .method("translate", &["int", "int"], "demo.Point")
            .method("distance", &["demo.Point"], "double")
            .static_method("of", &["int", "int"], "demo.Point")
            .static_method("sum", &["int[]"], "int"),
        ClassDef::enumeration("demo.Color", &["RED", "GREEN", "BLUE"]),
        ClassDef::new("demo.Box")
            .constructor(&["java.lang.Object"])
            .field("value", "java.lang.Object")
            .field("secret", "int")
            .method("get", &[], "java.lang.Object"),
        ClassDef::new("demo.Config")
            .static_field("level", "int")
            .static_field("name", "java.lang.String")
            .static_method("reset", &[], "void"),
    ]
}

/// Demo classes in the instrumented layer, `java.lang` in the host layer
pub fn demo_loader() -> LayeredClassLoader {
    loader_with(Vec::new())
}

/// Like [`demo_loader`], with `runtime` as the runtime layer
pub fn loader_with(runtime: impl IntoIterator<Item = ClassDef>) -> LayeredClassLoader {
    LayeredClassLoader::builder()
        .instrumented(demo_classes().into_iter().collect::<InMemoryClassSource>())
        .runtime(runtime.into_iter().collect::<InMemoryClassSource>())
        .host(java_lang_source())
        .build()
}

pub fn int_type() -> PlanType {
    PlanType::Primitive(PrimitiveType::Int)
}

pub fn point_type() -> PlanType {
    PlanType::class(POINT)
}

pub fn object_type() -> PlanType {
    PlanType::class("java/lang/Object")
}

// Leaves

pub fn int(name: &str, value: i32) -> PlanRef {
    Plan::new(name, PlanKind::Primitive(PrimitiveValue::Int(value)))
}

pub fn long(name: &str, value: i64) -> PlanRef {
    Plan::new(name, PlanKind::Primitive(PrimitiveValue::Long(value)))
}

pub fn null(name: &str) -> PlanRef {
    Plan::new(name, PlanKind::Primitive(PrimitiveValue::Null))
}

pub fn string(name: &str, value: &str) -> PlanRef {
    Plan::new(name, PlanKind::String(value.to_string()))
}

pub fn mock(name: &str, ty: PlanType) -> PlanRef {
    Plan::new(name, PlanKind::Mock { ty })
}

pub fn unknown(name: &str, ty: PlanType) -> PlanRef {
    Plan::new(name, PlanKind::Unknown { ty })
}

pub fn actions(name: &str, actions: Vec<Action>) -> PlanRef {
    Plan::new(name, PlanKind::Actions(actions))
}

pub fn reflection(name: &str, actions: Vec<ReflectionAction>) -> PlanRef {
    Plan::new(name, PlanKind::Reflection(actions))
}

// Members

pub fn point_ctor() -> MethodRef {
    MethodRef::constructor(ClassRef::new(POINT), vec![int_type(), int_type()])
}

pub fn point_of() -> MethodRef {
    MethodRef::of_static(
        ClassRef::new(POINT),
        "of",
        vec![int_type(), int_type()],
        point_type(),
    )
}

pub fn point_set_x() -> MethodRef {
    MethodRef::instance(ClassRef::new(POINT), "setX", vec![int_type()], PlanType::Void)
}

pub fn point_translate() -> MethodRef {
    MethodRef::instance(
        ClassRef::new(POINT),
        "translate",
        vec![int_type(), int_type()],
        point_type(),
    )
}

pub fn point_distance() -> MethodRef {
    MethodRef::instance(
        ClassRef::new(POINT),
        "distance",
        vec![point_type()],
        PlanType::Primitive(PrimitiveType::Double),
    )
}

pub fn point_sum() -> MethodRef {
    MethodRef::of_static(
        ClassRef::new(POINT),
        "sum",
        vec![PlanType::array_of(int_type())],
        int_type(),
    )
}

pub fn config_reset() -> MethodRef {
    MethodRef::of_static(ClassRef::new(CONFIG), "reset", Vec::new(), PlanType::Void)
}

pub fn point_x() -> FieldRef {
    FieldRef::instance(ClassRef::new(POINT), "x", int_type())
}

pub fn point_origin() -> FieldRef {
    FieldRef::of_static(ClassRef::new(POINT), "ORIGIN", point_type())
}

pub fn box_value() -> FieldRef {
    FieldRef::instance(ClassRef::new(BOX), "value", object_type())
}

pub fn box_secret() -> FieldRef {
    FieldRef::instance(ClassRef::new(BOX), "secret", int_type())
}

pub fn config_level() -> FieldRef {
    FieldRef::of_static(ClassRef::new(CONFIG), "level", int_type())
}

// Composite plans

/// `new Point(x, y)` with inline leaves named `{name}.x` and `{name}.y`
pub fn point(name: &str, x: i32, y: i32) -> PlanRef {
    actions(
        name,
        vec![Action::ConstructorCall {
            constructor: point_ctor(),
            args: vec![int(&format!("{name}.x"), x), int(&format!("{name}.y"), y)],
        }],
    )
}

/// `new Point(x, y)` over the given operand plans
pub fn point_from(name: &str, x: PlanRef, y: PlanRef) -> PlanRef {
    actions(
        name,
        vec![Action::ConstructorCall {
            constructor: point_ctor(),
            args: vec![x, y],
        }],
    )
}

/// `new int[] { values.. }`
pub fn int_array(name: &str, values: &[i32]) -> PlanRef {
    let elements = values
        .iter()
        .enumerate()
        .map(|(i, v)| int(&format!("{name}[{i}]"), *v))
        .collect();
    actions(
        name,
        vec![Action::NewArrayWithInitializer {
            ty: PlanType::array_of(int_type()),
            elements,
        }],
    )
}

// Assertions

/// Kinds of all statements, in order
pub fn kinds(test_case: &TestCase) -> Vec<StatementKind> {
    test_case.statements().iter().map(Statement::kind).collect()
}

/// Routine names of all reflection statements, in order
pub fn helper_names(test_case: &TestCase) -> Vec<&str> {
    test_case
        .statements()
        .iter()
        .filter_map(|s| match s {
            Statement::Reflection { helper, .. } => Some(helper.name.as_str()),
            _ => None,
        })
        .collect()
}
