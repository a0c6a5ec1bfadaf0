use plancc_compiler::prelude::*;
use plancc_compiler::report::{RunReport, TestReport};
use plancc_compiler::{Attempt, ClassLayers, ConfigError, GenerationRequest, GenerationStats};
use plancc_ir::{Action, Parameters, PlanRef};
use plancc_test_utils::*;
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

fn translated(name: &str, base: PlanRef) -> PlanRef {
    actions(
        name,
        vec![Action::ExternalMethodCall {
            method: point_translate(),
            instance: Some(base),
            args: vec![int(&format!("{name}.dx"), 1), int(&format!("{name}.dy"), 1)],
        }],
    )
}

fn request() -> GenerationRequest {
    GenerationRequest {
        classes: ClassLayers {
            instrumented: demo_classes(),
            ..ClassLayers::default()
        },
        candidates: vec![
            Candidate::infeasible(point_distance()),
            Candidate::new(
                point_distance(),
                Parameters {
                    instance: Some(point("a", 1, 2)),
                    arguments: vec![mock("m", point_type())],
                    ..Parameters::default()
                },
            ),
            Candidate::new(
                point_distance(),
                Parameters {
                    instance: Some(translated("moved", point("a", 1, 2))),
                    arguments: vec![point("b", 3, 4)],
                    ..Parameters::default()
                },
            ),
        ],
    }
}

fn config_file(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn request_survives_json_and_drives_the_generator() {
    let json = serde_json::to_string(&request()).unwrap();
    let request = GenerationRequest::from_json_str(&json).unwrap();
    assert_eq!(request, self::request());

    let config = CompilerConfig::default();
    let loader = request.loader(&config.helpers);
    let mut generator = TestGenerator::new(&loader, &config);
    let (candidate, test) = generator.generate(request.candidates, || false).unwrap();

    assert_eq!(candidate.method, point_distance());
    assert_eq!(test.test_case.len(), 4);
    assert_eq!(
        generator.stats(),
        GenerationStats {
            attempted: 3,
            skipped: 1,
            failed: 1,
            succeeded: 1,
        }
    );
}

#[test]
fn each_candidate_starts_from_an_empty_test() {
    let request = request();
    let config = CompilerConfig::default();
    let loader = request.loader(&config.helpers);
    let mut generator = TestGenerator::new(&loader, &config);

    let outcomes: Vec<Attempt> = request
        .candidates
        .iter()
        .map(|candidate| generator.attempt(candidate))
        .collect();
    assert!(matches!(outcomes[0], Attempt::Skipped));
    assert!(matches!(outcomes[1], Attempt::Failed(ref e) if e.is_unsupported()));
    match &outcomes[2] {
        // Plan `a` was lowered by the failed candidate too; it is lowered again here.
        Attempt::Compiled(test) => {
            assert!(test.binding("a").is_some());
            assert_eq!(test.test_case.first_forward_reference(), None);
        }
        other => panic!("expected a compiled test, got {other:?}"),
    }
}

#[test]
fn report_lists_every_statement() {
    let request = request();
    let config = CompilerConfig::default();
    let loader = request.loader(&config.helpers);
    let mut generator = TestGenerator::new(&loader, &config);
    let (candidate, test) = generator.generate(request.candidates, || false).unwrap();

    let report = TestReport::new(&candidate.method, &test);
    assert_eq!(report.statements.len(), 4);
    assert_eq!(report.bindings.len(), 3);
    assert!(report.statements.iter().all(|s| !s.reflection));
    assert_eq!(report.statements[3].defines, None);
    assert!(report.statements[3]
        .invokes
        .as_deref()
        .is_some_and(|callable| callable.starts_with("demo.Point.distance")));

    let run = RunReport {
        stats: generator.stats(),
        tests: vec![report],
        failures: Vec::new(),
    };
    let rendered = run.render();
    assert!(rendered.contains("3 attempted, 1 compiled, 1 failed, 1 skipped"));
    let json = serde_json::to_value(&run).unwrap();
    assert_eq!(json["tests"][0]["statements"][0]["kind"], "constructor");
}

#[test]
fn toml_config_file_limits_nesting() {
    let file = config_file(".toml", "max_depth = 1\n\n[helpers]\npackage = \"org.example\"\n");
    let config = CompilerConfig::from_path(file.path()).unwrap();
    assert_eq!(config.max_depth, Some(1));
    assert_eq!(config.helpers.binary_name(), "org.example.ReflectionUtils");

    let request = request();
    let loader = request.loader(&config.helpers);
    let mut generator = TestGenerator::new(&loader, &config);
    match generator.attempt(&request.candidates[2]) {
        Attempt::Failed(CompileError::DepthExceeded(1)) => {}
        other => panic!("expected depth failure, got {other:?}"),
    }
}

#[test]
fn yaml_and_json_config_files_load() {
    let yaml = config_file(".yaml", "validate_plans: true\nlogging:\n  filter: debug\n");
    let config = CompilerConfig::from_path(yaml.path()).unwrap();
    assert!(config.validate_plans);
    assert_eq!(config.logging.filter, "debug");

    let json = config_file(".json", r#"{"helpers": {"class_name": "Reflect"}}"#);
    let config = CompilerConfig::from_path(json.path()).unwrap();
    assert_eq!(config.helpers.binary_name(), "Reflect");
}

#[test]
fn bad_config_files_are_rejected() {
    let ini = config_file(".ini", "max_depth = 1\n");
    assert!(matches!(
        CompilerConfig::from_path(ini.path()),
        Err(ConfigError::UnknownFormat(ref ext)) if ext == "ini"
    ));

    let zero = config_file(".toml", "max_depth = 0\n");
    assert!(matches!(
        CompilerConfig::from_path(zero.path()),
        Err(ConfigError::ZeroDepth)
    ));

    let broken = config_file(".toml", "max_depth = [\n");
    assert!(matches!(
        CompilerConfig::from_path(broken.path()),
        Err(ConfigError::Toml(_))
    ));
}
