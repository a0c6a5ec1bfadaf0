use plancc_compiler::prelude::*;
use plancc_compiler::MemberKind;
use plancc_ir::{
    ClassRef, FieldRef, Plan, PlanKind, PlanRef, PlanType, PrimitiveValue, ReflectionAction,
};
use plancc_runtime::{ClassDef, ClassLoader, LayeredClassLoader, RuntimeType};
use plancc_test_utils::*;
use plancc_testcase::{Constant, Operand, Statement, StatementKind};
use pretty_assertions::assert_eq;

fn helper_loader(config: &CompilerConfig) -> LayeredClassLoader {
    loader_with([config.helpers.class_def()])
}

fn compile_all(config: &CompilerConfig, plans: &[PlanRef]) -> Result<CompiledTest> {
    let loader = helper_loader(config);
    let mut compiler = PlanCompiler::new(&loader, config);
    for plan in plans {
        compiler.compile(plan)?;
    }
    Ok(compiler.finish())
}

fn boxed(name: &str, extra: Vec<ReflectionAction>) -> PlanRef {
    let mut actions = vec![ReflectionAction::NewInstance {
        ty: PlanType::class(BOX),
    }];
    actions.extend(extra);
    reflection(name, actions)
}

fn reflection_args(statement: Option<&Statement>) -> &[Operand] {
    match statement {
        Some(Statement::Reflection { args, .. }) => args,
        other => panic!("expected helper call, got {other:?}"),
    }
}

#[test]
fn new_instance_passes_the_class_name() {
    let config = CompilerConfig::default();
    let test = compile_all(&config, &[boxed("b", Vec::new())]).unwrap();

    let b = test.binding("b").unwrap();
    assert_eq!(helper_names(&test.test_case), vec!["newInstance"]);
    assert_eq!(
        reflection_args(test.test_case.statement(0)),
        &[Operand::Constant(Constant::String("demo.Box".into()))]
    );
    assert_eq!(
        test.test_case.var_type(b).map(RuntimeType::type_name),
        Some("demo.Box".to_string())
    );
    assert!(test.test_case.statement(0).unwrap().is_reflection());
}

#[test]
fn private_field_is_set_through_the_specialised_routine() {
    let config = CompilerConfig::default();
    let plan = boxed(
        "b",
        vec![ReflectionAction::SetField {
            field: box_secret(),
            value: int("secret", 42),
        }],
    );

    let loader = helper_loader(&config);
    let mut compiler = PlanCompiler::new(&loader, &config);
    compiler.compile(&plan).unwrap();
    let test = compiler.finish();

    let b = test.binding("b").unwrap();
    let class = loader.load_class("demo.Box").unwrap();
    assert_eq!(helper_names(&test.test_case), vec!["newInstance", "setIntField"]);
    assert_eq!(
        reflection_args(test.test_case.statement(1)),
        &[
            Operand::Var(b),
            Operand::Constant(Constant::Class(class.as_type())),
            Operand::Constant(Constant::String("secret".into())),
            Operand::Constant(Constant::Int(42)),
        ]
    );
}

#[test]
fn reference_values_use_the_generic_routine() {
    let config = CompilerConfig::default();
    let plan = boxed(
        "b",
        vec![ReflectionAction::SetField {
            field: box_value(),
            value: string("s", "hello"),
        }],
    );

    let test = compile_all(&config, &[plan]).unwrap();
    assert_eq!(helper_names(&test.test_case), vec!["newInstance", "setField"]);
}

#[test]
fn static_fields_pass_a_fresh_null_owner() {
    let config = CompilerConfig::default();
    let set = reflection(
        "set",
        vec![ReflectionAction::SetStaticField {
            field: config_level(),
            value: int("level", 3),
        }],
    );
    let get = reflection(
        "get",
        vec![ReflectionAction::GetStaticField {
            field: config_level(),
        }],
    );

    let test = compile_all(&config, &[set, get]).unwrap();
    assert_eq!(
        kinds(&test.test_case),
        vec![
            StatementKind::Null,
            StatementKind::Reflection,
            StatementKind::Null,
            StatementKind::Reflection,
        ]
    );
    assert_eq!(helper_names(&test.test_case), vec!["setIntField", "getIntField"]);

    // Each static access gets its own null; neither is bound to a plan.
    let first_null = test.test_case.statement(0).unwrap().defines();
    let second_null = test.test_case.statement(2).unwrap().defines();
    assert_ne!(first_null, second_null);
    assert_eq!(
        reflection_args(test.test_case.statement(1)).first(),
        first_null.map(Operand::Var).as_ref()
    );
    assert_eq!(test.bindings.len(), 1);
    assert!(test.binding("get").is_some());
}

#[test]
fn failed_static_access_leaves_no_null_behind() {
    let config = CompilerConfig::default();
    let loader = helper_loader(&config);

    let set = reflection(
        "set",
        vec![ReflectionAction::SetStaticField {
            field: config_level(),
            value: mock("m", int_type()),
        }],
    );
    let mut compiler = PlanCompiler::new(&loader, &config);
    let err = compiler.compile(&set).unwrap_err();
    assert!(err.is_unsupported());
    assert!(compiler.test_case().is_empty());

    let missing = FieldRef::of_static(ClassRef::new("demo/Missing"), "level", int_type());
    let get = reflection("get", vec![ReflectionAction::GetStaticField { field: missing }]);
    let mut compiler = PlanCompiler::new(&loader, &config);
    let err = compiler.compile(&get).unwrap_err();
    assert!(matches!(err, CompileError::ClassNotFound(_)));
    assert!(compiler.test_case().is_empty());
}

#[test]
fn second_static_read_into_one_plan_appends_nothing() {
    let config = CompilerConfig::default();
    let read = || ReflectionAction::GetStaticField {
        field: config_level(),
    };
    let plan = reflection("level", vec![read(), read()]);

    let loader = helper_loader(&config);
    let mut compiler = PlanCompiler::new(&loader, &config);
    let err = compiler.compile(&plan).unwrap_err();
    assert!(matches!(err, CompileError::DuplicateBinding(_)));
    assert_eq!(
        kinds(compiler.test_case()),
        vec![StatementKind::Null, StatementKind::Reflection]
    );
}

#[test]
fn field_reads_select_by_declared_type() {
    let config = CompilerConfig::default();
    let b = boxed("b", Vec::new());
    let secret = reflection(
        "secret",
        vec![ReflectionAction::GetField {
            instance: b.clone(),
            field: box_secret(),
        }],
    );
    let value = reflection(
        "value",
        vec![ReflectionAction::GetField {
            instance: b,
            field: box_value(),
        }],
    );

    let test = compile_all(&config, &[secret, value]).unwrap();
    assert_eq!(
        helper_names(&test.test_case),
        vec!["newInstance", "getIntField", "getField"]
    );
    let value = test.binding("value").unwrap();
    assert_eq!(
        test.test_case.var_type(value).map(RuntimeType::type_name),
        Some("java.lang.Object".to_string())
    );
}

#[test]
fn arrays_of_primitives_use_specialised_routines() {
    let config = CompilerConfig::default();
    let array = reflection(
        "arr",
        vec![
            ReflectionAction::NewArray {
                ty: PlanType::array_of(int_type()),
                length: int("len", 4),
            },
            ReflectionAction::ArrayWrite {
                index: int("i", 0),
                value: int("v", 7),
            },
        ],
    );
    let element = reflection(
        "elem",
        vec![ReflectionAction::ArrayRead {
            array,
            index: int("j", 0),
            element_type: int_type(),
        }],
    );

    let test = compile_all(&config, &[element]).unwrap();
    let arr = test.binding("arr").unwrap();
    assert_eq!(
        helper_names(&test.test_case),
        vec!["newIntArray", "setIntElement", "getIntElement"]
    );
    assert_eq!(
        reflection_args(test.test_case.statement(0)),
        &[Operand::Constant(Constant::Int(4))]
    );
    assert_eq!(
        reflection_args(test.test_case.statement(1)),
        &[
            Operand::Var(arr),
            Operand::Constant(Constant::Int(0)),
            Operand::Constant(Constant::Int(7)),
        ]
    );
}

#[test]
fn arrays_of_objects_pass_the_element_type_name() {
    let config = CompilerConfig::default();
    let array = reflection(
        "points",
        vec![ReflectionAction::NewArray {
            ty: PlanType::array_of(point_type()),
            length: int("len", 2),
        }],
    );

    let test = compile_all(&config, &[array]).unwrap();
    assert_eq!(helper_names(&test.test_case), vec!["newArray"]);
    assert_eq!(
        reflection_args(test.test_case.statement(0)),
        &[
            Operand::Constant(Constant::String("demo.Point".into())),
            Operand::Constant(Constant::Int(2)),
        ]
    );
}

#[test]
fn reflective_new_array_requires_an_array_type() {
    let config = CompilerConfig::default();
    let plan = reflection(
        "p",
        vec![ReflectionAction::NewArray {
            ty: point_type(),
            length: int("len", 2),
        }],
    );

    let err = compile_all(&config, &[plan]).unwrap_err();
    assert!(matches!(err, CompileError::NotAnArrayType { .. }));
}

#[test]
fn reflective_plans_lower_only_to_helper_calls() {
    let config = CompilerConfig::default();
    let plan = boxed(
        "b",
        vec![
            ReflectionAction::SetField {
                field: box_secret(),
                value: int("secret", 1),
            },
            ReflectionAction::SetField {
                field: box_value(),
                value: null("nothing"),
            },
        ],
    );

    let test = compile_all(&config, &[plan]).unwrap();
    assert!(test
        .test_case
        .statements()
        .iter()
        .all(|s| s.is_reflection() || s.kind() == StatementKind::Null));
    assert_eq!(
        helper_names(&test.test_case),
        vec!["newInstance", "setIntField", "setField"]
    );
}

#[test]
fn every_primitive_value_selects_its_specialised_setter() {
    let config = CompilerConfig::default();
    let values = [
        PrimitiveValue::Boolean(true),
        PrimitiveValue::Byte(1),
        PrimitiveValue::Char(u16::from(b'c')),
        PrimitiveValue::Short(2),
        PrimitiveValue::Int(3),
        PrimitiveValue::Long(4),
        PrimitiveValue::Float(0.5),
        PrimitiveValue::Double(1.5),
    ];

    for value in values {
        let keyword = value.primitive_type().unwrap().keyword();
        let plan = boxed(
            "b",
            vec![ReflectionAction::SetField {
                field: box_secret(),
                value: Plan::new("v", PlanKind::Primitive(value)),
            }],
        );

        let test = compile_all(&config, &[plan]).unwrap();
        let mut chars = keyword.chars();
        let capitalised: String = chars
            .next()
            .map(|c| c.to_ascii_uppercase())
            .into_iter()
            .chain(chars)
            .collect();
        assert_eq!(
            helper_names(&test.test_case),
            vec!["newInstance".to_string(), format!("set{capitalised}Field")],
            "setter for {keyword}"
        );
        assert!(test.test_case.statements().iter().all(Statement::is_reflection));
    }
    assert_eq!(PrimitiveValue::Null.primitive_type(), None);
}

#[test]
fn helper_class_is_resolved_through_the_target_loader() {
    let config = CompilerConfig::default();
    let loader = demo_loader();
    let mut compiler = PlanCompiler::new(&loader, &config);
    let err = compiler.compile(&boxed("b", Vec::new())).unwrap_err();
    assert!(matches!(err, CompileError::ClassNotFound(_)));
    assert!(compiler.test_case().is_empty());
}

#[test]
fn missing_helper_routine_is_reported() {
    let config = CompilerConfig::default();
    let loader = loader_with([ClassDef::new(config.helpers.binary_name())]);
    let mut compiler = PlanCompiler::new(&loader, &config);
    let err = compiler.compile(&boxed("b", Vec::new())).unwrap_err();
    assert!(matches!(
        err,
        CompileError::MemberNotFound {
            kind: MemberKind::Helper,
            ..
        }
    ));
}

#[test]
fn helper_package_is_configurable() {
    let helpers = HelperLibrary::default().in_package("org.example.support");
    let config = CompilerConfig::default().with_helpers(helpers);
    let test = compile_all(&config, &[boxed("b", Vec::new())]).unwrap();

    match test.test_case.statement(0) {
        Some(Statement::Reflection { helper, .. }) => {
            assert_eq!(helper.class.name(), "org.example.support.ReflectionUtils");
        }
        other => panic!("expected helper call, got {other:?}"),
    }
}
