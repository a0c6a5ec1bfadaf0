use plancc_compiler::prelude::*;
use plancc_ir::{Action, Parameters, PlanKind, PlanRef};
use plancc_test_utils::*;
use plancc_testcase::{AssignTarget, Constant, Operand, Statement};
use proptest::prelude::*;
use proptest::sample::Index;
use std::collections::HashSet;

fn translated(name: &str, base: PlanRef, dx: i32, dy: i32) -> PlanRef {
    actions(
        name,
        vec![Action::ExternalMethodCall {
            method: point_translate(),
            instance: Some(base),
            args: vec![int(&format!("{name}.dx"), dx), int(&format!("{name}.dy"), dy)],
        }],
    )
}

/// Points built either from scratch or by translating an earlier point
fn point_dag() -> impl Strategy<Value = Vec<PlanRef>> {
    proptest::collection::vec(
        (any::<i32>(), any::<i32>(), proptest::option::of(any::<Index>())),
        1..16,
    )
    .prop_map(|specs| {
        let mut plans: Vec<PlanRef> = Vec::with_capacity(specs.len());
        for (i, (x, y, base)) in specs.into_iter().enumerate() {
            let name = format!("p{i}");
            let plan = match base {
                Some(index) if !plans.is_empty() => {
                    let base = plans[index.index(plans.len())].clone();
                    translated(&name, base, x, y)
                }
                _ => point(&name, x, y),
            };
            plans.push(plan);
        }
        plans
    })
}

fn roots(plans: &[PlanRef], picks: &[Index]) -> Parameters {
    Parameters {
        arguments: picks
            .iter()
            .map(|pick| plans[pick.index(plans.len())].clone())
            .collect(),
        ..Parameters::default()
    }
}

/// Names of action plans reachable from `params`
fn reachable(params: &Parameters) -> HashSet<String> {
    let mut seen = HashSet::new();
    let mut stack: Vec<&PlanRef> = params.roots().collect();
    while let Some(plan) = stack.pop() {
        if matches!(plan.kind, PlanKind::Actions(_)) && seen.insert(plan.name.to_string()) {
            stack.extend(plan.operands());
        }
    }
    seen
}

proptest! {
    #[test]
    fn prop_every_plan_is_lowered_once(
        plans in point_dag(),
        picks in proptest::collection::vec(any::<Index>(), 1..8)
    ) {
        let loader = demo_loader();
        let config = CompilerConfig::default();
        let params = roots(&plans, &picks);

        let mut compiler = PlanCompiler::new(&loader, &config);
        compiler.compile_parameters(&params).unwrap();
        let expected = reachable(&params);
        prop_assert_eq!(compiler.test_case().len(), expected.len());
        prop_assert_eq!(compiler.bindings().len(), expected.len());

        // Compiling the same roots again appends nothing.
        let before = compiler.test_case().clone();
        compiler.compile_parameters(&params).unwrap();
        prop_assert_eq!(compiler.test_case(), &before);
    }

    #[test]
    fn prop_operands_precede_their_uses(
        plans in point_dag(),
        picks in proptest::collection::vec(any::<Index>(), 1..8)
    ) {
        let loader = demo_loader();
        let config = CompilerConfig::default();
        let mut params = roots(&plans, &picks);
        params.instance = params.arguments.pop();
        params.arguments.truncate(1);
        if params.arguments.is_empty() {
            params.arguments.push(point("fallback", 0, 0));
        }

        let test = PlanCompiler::new(&loader, &config)
            .compile_test(&point_distance(), &params)
            .unwrap();
        prop_assert_eq!(test.test_case.first_forward_reference(), None);
        for (plan, var) in test.bindings.iter() {
            let defined = test.test_case.variable(var).and_then(|v| v.defined_at());
            prop_assert!(defined.is_some(), "{} is bound but never defined", plan);
        }
    }

    #[test]
    fn prop_array_literal_round_trips(values in proptest::collection::vec(any::<i32>(), 0..12)) {
        let loader = demo_loader();
        let config = CompilerConfig::default();
        let mut compiler = PlanCompiler::new(&loader, &config);
        compiler.compile(&int_array("arr", &values)).unwrap();
        let test = compiler.finish();
        let arr = test.binding("arr").unwrap();

        prop_assert_eq!(
            test.test_case.statement(0),
            Some(&Statement::NewArray { length: values.len(), ret: arr })
        );
        let written: Vec<(usize, i32)> = test.test_case.statements()[1..]
            .iter()
            .map(|s| match s {
                Statement::Assignment {
                    target: AssignTarget::ArrayIndex { array, index },
                    value: Operand::Constant(Constant::Int(v)),
                } if *array == arr => (*index, *v),
                other => panic!("unexpected statement {other:?}"),
            })
            .collect();
        let expected: Vec<(usize, i32)> = values.iter().copied().enumerate().collect();
        prop_assert_eq!(written, expected);
    }
}
