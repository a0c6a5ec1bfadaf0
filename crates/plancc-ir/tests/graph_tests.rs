use plancc_ir::{
    Action, ClassRef, MethodRef, Plan, PlanGraph, PlanKind, PlanName, PlanRef, PlanType,
    PrimitiveType, PrimitiveValue,
};
use proptest::prelude::*;
use proptest::sample::Index;
use std::collections::HashMap;

fn factory() -> MethodRef {
    MethodRef::of_static(
        ClassRef::new("demo/Node"),
        "join",
        vec![PlanType::class("demo/Node"), PlanType::class("demo/Node")],
        PlanType::class("demo/Node"),
    )
}

/// Random DAG: every node joins up to two earlier nodes
fn plan_dag() -> impl Strategy<Value = Vec<PlanRef>> {
    proptest::collection::vec(proptest::collection::vec(any::<Index>(), 0..3), 1..20).prop_map(
        |specs| {
            let mut plans: Vec<PlanRef> = Vec::with_capacity(specs.len());
            for (i, picks) in specs.into_iter().enumerate() {
                let args = if plans.is_empty() {
                    vec![Plan::new(
                        format!("leaf{i}"),
                        PlanKind::Primitive(PrimitiveValue::Int(i32::try_from(i).unwrap_or(0))),
                    )]
                } else {
                    picks
                        .iter()
                        .map(|pick| plans[pick.index(plans.len())].clone())
                        .collect()
                };
                plans.push(Plan::new(
                    format!("n{i}"),
                    PlanKind::Actions(vec![Action::StaticMethodCall {
                        method: factory(),
                        args,
                    }]),
                ));
            }
            plans
        },
    )
}

fn descriptor_type() -> impl Strategy<Value = PlanType> {
    let leaf = prop_oneof![
        proptest::sample::select(PrimitiveType::ALL.to_vec()).prop_map(PlanType::Primitive),
        "[a-z]{1,6}(/[A-Z][a-z]{0,6}){1,2}".prop_map(PlanType::Class),
    ];
    leaf.prop_recursive(3, 8, 1, |inner| inner.prop_map(PlanType::array_of))
}

proptest! {
    #[test]
    fn prop_compilation_order_puts_operands_first(plans in plan_dag()) {
        let graph = PlanGraph::from_roots(&plans).unwrap();
        prop_assert!(graph.validate().is_ok());

        let order = graph.compilation_order().unwrap();
        prop_assert_eq!(order.len(), graph.len());
        let position: HashMap<&PlanName, usize> =
            order.iter().enumerate().map(|(i, name)| (*name, i)).collect();
        for name in &order {
            for dep in graph.dependencies(name) {
                prop_assert!(position[dep] < position[name]);
            }
        }
    }

    #[test]
    fn prop_descriptors_parse_back(ty in descriptor_type()) {
        prop_assert_eq!(PlanType::from_descriptor(&ty.to_descriptor()), Ok(ty));
    }
}

#[test]
fn graph_indexes_each_name_once() {
    let shared = Plan::new("shared", PlanKind::String("s".into()));
    let a = Plan::new(
        "a",
        PlanKind::Actions(vec![Action::StaticMethodCall {
            method: factory(),
            args: vec![shared.clone(), shared.clone()],
        }]),
    );
    let b = Plan::new(
        "b",
        PlanKind::Actions(vec![Action::StaticMethodCall {
            method: factory(),
            args: vec![shared, a.clone()],
        }]),
    );

    let graph = PlanGraph::from_roots([&a, &b]).unwrap();
    assert_eq!(graph.len(), 3);
    let mut deps: Vec<&str> = graph
        .dependencies(&PlanName::new("b"))
        .into_iter()
        .map(PlanName::as_str)
        .collect();
    deps.sort_unstable();
    assert_eq!(deps, vec!["a", "shared"]);
}
