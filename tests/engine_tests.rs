mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use common::{init_tracing, parse_cleanly, validate_with};
use graphql_validator::validation::rules::{UniqueVariableNames, codes};
use graphql_validator::validation::{Phase, RuleRegistrar};
use graphql_validator::{
    Node, NodeKind, Rule, RuleDefect, RuleSet, TypeInfo, ValidationConfig, ValidationContext,
    ValidationError, Validator, core_rules,
};
use smol_str::SmolStr;

type Log = Arc<Mutex<Vec<String>>>;

/// Logs every enter and leave with the path seen at that moment.
struct Tracer {
    log: Log,
}

impl Rule for Tracer {
    fn name(&self) -> &'static str {
        "Tracer"
    }

    fn validate(&mut self, _ctx: &ValidationContext<'_>, registrar: &mut RuleRegistrar<'_>) {
        for kind in NodeKind::ALL {
            registrar.on(kind, Phase::Enter).on(kind, Phase::Leave);
        }
    }

    fn enter(&mut self, ctx: &mut ValidationContext<'_>, node: &Node) -> Result<(), RuleDefect> {
        self.record("enter", ctx, node);
        Ok(())
    }

    fn leave(&mut self, ctx: &mut ValidationContext<'_>, node: &Node) -> Result<(), RuleDefect> {
        self.record("leave", ctx, node);
        Ok(())
    }
}

impl Tracer {
    fn record(&self, phase: &str, ctx: &ValidationContext<'_>, node: &Node) {
        let entry = format!("{phase} {} {} @{}", node.kind(), node.id(), ctx.path());
        self.log.lock().expect("log lock").push(entry);
    }
}

fn tracer(log: &Log) -> RuleSet {
    let log = Arc::clone(log);
    RuleSet::new().with(move || Box::new(Tracer { log: Arc::clone(&log) }))
}

fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

#[test]
fn enter_and_leave_nest_strictly() {
    init_tracing();
    let log = new_log();
    let source = r#"
        query Q($v: [Int!] = [1, 2]) @live {
          a: hero(id: 1, filter: {tags: ["x", "y"], nested: {deep: true}}) {
            name
            ... on Droid { primaryFunction }
            ...Frag
          }
        }
        fragment Frag on Character { id }
    "#;
    validate_with(source, tracer(&log));

    let entries = log.lock().expect("log lock").clone();
    let document = parse_cleanly(source);
    assert_eq!(entries.len(), document.node_count() * 2);

    let mut stack: Vec<String> = Vec::new();
    for entry in &entries {
        let mut parts = entry.splitn(2, ' ');
        let phase = parts.next().expect("phase");
        let subject = parts.next().expect("subject").to_string();
        match phase {
            "enter" => stack.push(subject),
            "leave" => assert_eq!(stack.pop().as_deref(), Some(subject.as_str())),
            other => panic!("unexpected phase {other}"),
        }
    }
    assert!(stack.is_empty());
}

#[test]
fn nodes_are_entered_in_document_order() {
    let log = new_log();
    validate_with(
        "query { a { b c } d } fragment F on T { e }",
        tracer(&log),
    );

    let entered: Vec<String> = log
        .lock()
        .expect("log lock")
        .iter()
        .filter(|entry| entry.starts_with("enter Field"))
        .map(|entry| entry.rsplit('@').next().unwrap_or_default().to_string())
        .collect();
    assert_eq!(entered, vec!["a", "a.b", "a.c", "d", "e"]);
}

#[test]
fn paths_follow_response_keys_and_list_indices() {
    let log = new_log();
    validate_with(
        "{ hero { buddy: friends(ids: [1, 2], where: {names: [\"a\"]}) { name } } }",
        tracer(&log),
    );
    let entries = log.lock().expect("log lock").clone();

    let path_of = |prefix: &str| -> Vec<String> {
        entries
            .iter()
            .filter(|entry| entry.starts_with(prefix))
            .map(|entry| entry.rsplit('@').next().unwrap_or_default().to_string())
            .collect()
    };

    assert_eq!(path_of("enter IntValue"), vec!["hero.buddy[0]", "hero.buddy[1]"]);
    assert_eq!(path_of("enter StringValue"), vec!["hero.buddy.names[0]"]);
    assert_eq!(path_of("enter Field"), vec!["hero", "hero.buddy", "hero.buddy.name"]);
    assert_eq!(path_of("leave Document"), vec![""]);
}

/// Reports one error on every node of `kind`.
struct Flag {
    name: &'static str,
    kind: NodeKind,
}

impl Rule for Flag {
    fn name(&self) -> &'static str {
        self.name
    }

    fn validate(&mut self, _ctx: &ValidationContext<'_>, registrar: &mut RuleRegistrar<'_>) {
        registrar.enter(self.kind);
    }

    fn enter(&mut self, ctx: &mut ValidationContext<'_>, node: &Node) -> Result<(), RuleDefect> {
        ctx.report(ValidationError::new("X", self.name).with_node(node));
        Ok(())
    }
}

fn flag(name: &'static str, kind: NodeKind) -> impl Fn() -> Box<dyn Rule> + Send + Sync + 'static {
    move || -> Box<dyn Rule> { Box::new(Flag { name, kind }) }
}

#[test]
fn callbacks_on_one_node_run_in_registration_order() {
    let rules = RuleSet::new()
        .with(flag("second", NodeKind::Field))
        .with(flag("first", NodeKind::Field))
        .with(flag("args", NodeKind::Argument));

    let errors = validate_with("{ a(x: 1) b }", rules);
    let order: Vec<(&str, &'static str)> = errors
        .iter()
        .map(|error| (error.message.as_str(), error.rule))
        .collect();
    assert_eq!(
        order,
        vec![
            ("second", "second"),
            ("first", "first"),
            ("args", "args"),
            ("second", "second"),
            ("first", "first"),
        ]
    );
    assert_eq!(errors[2].path.to_string(), "a");
}

#[test]
fn repeated_passes_are_deterministic() {
    let document = parse_cleanly(
        "query($a: Int, $a: Int) { f(x: 1, x: 2) { g(o: {k: 1, k: 2}) } } query Q { h } { i }",
    );
    let validator = Validator::new();

    let first = validator.validate(&document).expect("no defect");
    for _ in 0..5 {
        assert_eq!(validator.validate(&document).expect("no defect"), first);
    }
    assert_eq!(first.len(), 5);
}

/// Fails when it meets a field called `boom`.
struct Fragile;

impl Rule for Fragile {
    fn name(&self) -> &'static str {
        "Fragile"
    }

    fn validate(&mut self, _ctx: &ValidationContext<'_>, registrar: &mut RuleRegistrar<'_>) {
        registrar.enter(NodeKind::Field);
    }

    fn enter(&mut self, _ctx: &mut ValidationContext<'_>, node: &Node) -> Result<(), RuleDefect> {
        if node.name() == Some("boom") {
            return Err(RuleDefect::internal(self.name(), "cannot handle boom"));
        }
        Ok(())
    }
}

#[test]
fn rule_defect_aborts_the_pass() {
    init_tracing();
    let document = parse_cleanly("query($a: Int, $a: Int) { ok boom later }");
    let validator = Validator::new().with_rules(core_rules().with(|| Box::new(Fragile)));

    let defect = validator.validate(&document).expect_err("defect");
    assert_eq!(defect.rule(), "Fragile");
    assert_eq!(defect.to_string(), "Fragile: cannot handle boom");

    let err: graphql_validator::Error = defect.into();
    assert!(matches!(err, graphql_validator::Error::Rule(_)));
}

#[test]
fn rules_get_fresh_state_every_pass() {
    let created = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&created);
    let rules = RuleSet::new().with(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Box::new(UniqueVariableNames::default())
    });

    let document = parse_cleanly("query($a: Int) { f }");
    let validator = Validator::new().with_rules(rules);
    for _ in 0..3 {
        assert!(validator.validate(&document).expect("no defect").is_empty());
    }
    assert_eq!(created.load(Ordering::SeqCst), 3);
}

#[test]
fn concurrent_passes_share_one_validator() {
    init_tracing();
    let documents: Vec<_> = (0..8)
        .map(|i| {
            let duplicates = (0..=i).map(|_| "$v: Int").collect::<Vec<_>>().join(", ");
            parse_cleanly(&format!("query Op{i}({duplicates}) {{ f }}"))
        })
        .collect();
    let validator = Validator::new();

    let counts: Vec<usize> = std::thread::scope(|scope| {
        let handles: Vec<_> = documents
            .iter()
            .map(|document| {
                let validator = &validator;
                scope.spawn(move || validator.validate(document).expect("no defect").len())
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("thread panicked"))
            .collect()
    });

    assert_eq!(counts, (0..8).collect::<Vec<_>>());
}

#[test]
fn disabled_rules_do_not_run() {
    let document = parse_cleanly("query($a: Int, $a: Int) { f(x: 1, x: 1) }");

    let all = Validator::new().validate(&document).expect("no defect");
    assert_eq!(all.len(), 2);

    let config = ValidationConfig::from_json(r#"{"disabled_rules": ["UniqueArgumentNames"]}"#)
        .expect("valid config");
    let errors = Validator::with_config(config)
        .validate(&document)
        .expect("no defect");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, codes::UNIQUE_VARIABLE_NAMES);

    let errors = Validator::new()
        .disable_rule("UniqueVariableNames")
        .validate(&document)
        .expect("no defect");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, codes::UNIQUE_ARGUMENT_NAMES);
}

#[test]
fn invalid_config_is_a_config_error() {
    let err = ValidationConfig::from_json("{\"track_types\": \"yes\"}").expect_err("bad config");
    assert!(matches!(err, graphql_validator::Error::Config(_)));
}

/// Resolves `Query` at operations and the field name, capitalized, below.
struct FieldTypes;

impl TypeInfo for FieldTypes {
    fn enter(&self, parent_type: Option<&str>, node: &Node) -> Option<SmolStr> {
        match node.kind() {
            NodeKind::OperationDefinition => Some("Query".into()),
            NodeKind::Field => node.name().map(|name| {
                let mut chars = name.chars();
                chars
                    .next()
                    .map(|first| first.to_uppercase().chain(chars).collect::<String>())
                    .unwrap_or_default()
                    .into()
            }),
            _ => parent_type.map(SmolStr::from),
        }
    }
}

/// Reports `parent > current` for every field.
struct TypeEcho;

impl Rule for TypeEcho {
    fn name(&self) -> &'static str {
        "TypeEcho"
    }

    fn validate(&mut self, _ctx: &ValidationContext<'_>, registrar: &mut RuleRegistrar<'_>) {
        registrar.enter(NodeKind::Field);
    }

    fn enter(&mut self, ctx: &mut ValidationContext<'_>, node: &Node) -> Result<(), RuleDefect> {
        let message = format!(
            "{} > {}",
            ctx.parent_type().unwrap_or("?"),
            ctx.current_type().unwrap_or("?")
        );
        ctx.report(ValidationError::new("T", message).with_node(node));
        Ok(())
    }
}

#[test]
fn type_info_tracks_parent_and_current_types() {
    let document = parse_cleanly("{ hero { friends } }");
    let types = FieldTypes;
    let rules = RuleSet::new().with(|| Box::new(TypeEcho));

    let messages: Vec<String> = Validator::new()
        .with_rules(rules.clone())
        .with_type_info(&types)
        .validate(&document)
        .expect("no defect")
        .into_iter()
        .map(|error| error.message)
        .collect();
    // Fields sit below a selection set, which inherits its parent's type.
    assert_eq!(messages, vec!["Query > Hero", "Hero > Friends"]);

    let config = ValidationConfig {
        track_types: false,
        ..ValidationConfig::default()
    };
    let untyped = Validator::with_config(config)
        .with_rules(rules)
        .with_type_info(&types)
        .validate(&document)
        .expect("no defect");
    assert!(untyped.iter().all(|error| error.message == "? > ?"));
}
