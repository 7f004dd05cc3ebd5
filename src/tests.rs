use crate::{
    define_module, Arg, Args, Class, Definition, Delegate, Function,
    InjectError, InjectResult, Injector, Module, Parameter, Parameters, Svc,
    Value,
};
use std::sync::atomic::{AtomicUsize, Ordering};

struct Config {
    pub url: String,
}

struct Repository {
    pub config: Svc<Config>,
}

struct Accounts {
    pub repository: Svc<Repository>,
}

fn define_classes(injector: &Injector) {
    injector
        .define_class(
            Class::named::<Config>("app::Config")
                .instantiate_with(|| Config { url: "memory://".into() }),
        )
        .define_class(
            Class::named::<Repository>("app::Repository")
                .implements("app::Storage")
                .constructor(
                    [Parameter::new("config").typed("::app::Config")],
                    |_, args| Ok(Repository { config: args.object("config")? }),
                ),
        )
        .define_class(Class::named::<Accounts>("app::Accounts").constructor(
            [Parameter::new("repository").typed("app::Repository")],
            |_, args| Ok(Accounts { repository: args.object("repository")? }),
        ));
}

fn counting_factory(calls: &Svc<AtomicUsize>) -> Definition {
    let calls = calls.clone();
    Definition::from_fn(move |_| {
        let call = calls.fetch_add(1, Ordering::SeqCst);
        Ok(Value::from(call as i64))
    })
}

#[test]
fn can_set_and_get() {
    let injector = Injector::new();
    injector.set("name", Value::from("demo")).unwrap();

    assert!(injector.has("name"));
    assert_eq!(Value::from("demo"), injector.get("name").unwrap());
}

#[test]
fn cant_get_missing_definition() {
    let injector = Injector::new();
    assert!(!injector.has("missing"));
    match injector.get("missing") {
        Err(InjectError::NotFound { id }) if id == "missing" => {}
        Err(error) => Err(error).unwrap(),
        Ok(_) => unreachable!("nothing is defined under this id"),
    }
}

#[test]
fn cant_set_twice() {
    let injector = Injector::new();
    injector.set("name", Value::from("first")).unwrap();

    match injector.set("name", Value::from("second")) {
        Err(InjectError::DuplicateDefinition { id }) if id == "name" => {}
        Err(error) => Err(error).unwrap(),
        Ok(_) => unreachable!("ids can only be set once"),
    }
    assert_eq!(Value::from("first"), injector.get("name").unwrap());
}

#[test]
fn singleton() {
    let calls = Svc::new(AtomicUsize::new(0));
    let injector = Injector::new();
    injector.set("counter", counting_factory(&calls)).unwrap();

    assert_eq!(Value::from(0i64), injector.get("counter").unwrap());
    assert_eq!(Value::from(0i64), injector.get("counter").unwrap());
    assert_eq!(1, calls.load(Ordering::SeqCst));
}

#[test]
fn singleton_objects_are_shared() {
    let injector = Injector::new();
    define_classes(&injector);
    injector
        .set("config", Value::object(Config { url: "memory://".into() }))
        .unwrap()
        .set("repository", Definition::class("app::Repository", Args::new()))
        .unwrap();

    let first: Svc<Repository> =
        injector.get("repository").unwrap().downcast().unwrap();
    let second: Svc<Repository> =
        injector.get("repository").unwrap().downcast().unwrap();
    assert!(Svc::ptr_eq(&first, &second));
}

#[test]
fn transient() {
    let calls = Svc::new(AtomicUsize::new(0));
    let injector = Injector::new();
    injector
        .set("counter", counting_factory(&calls).transient())
        .unwrap();

    assert_eq!(Value::from(0i64), injector.get("counter").unwrap());
    assert_eq!(Value::from(1i64), injector.get("counter").unwrap());
    assert_eq!(2, calls.load(Ordering::SeqCst));
}

#[test]
fn find_by_prefix() {
    let injector = Injector::new();
    injector
        .set("Foo.A", Value::from("a"))
        .unwrap()
        .set("Foo.B", Value::from("b"))
        .unwrap()
        .set("Bar.A", Value::from("c"))
        .unwrap();

    let found = injector.find("Foo.").unwrap();
    assert_eq!(2, found.len());
    assert_eq!(Some(&Value::from("a")), found.get("Foo.A"));
    assert_eq!(Some(&Value::from("b")), found.get("Foo.B"));
    assert!(injector.find("Baz.").unwrap().is_empty());
}

#[test]
fn find_constructs_matches() {
    let calls = Svc::new(AtomicUsize::new(0));
    let injector = Injector::new();
    injector.set("lazy.counter", counting_factory(&calls)).unwrap();
    assert_eq!(0, calls.load(Ordering::SeqCst));

    injector.find("lazy.").unwrap();
    assert_eq!(1, calls.load(Ordering::SeqCst));
}

struct Fixed(&'static str);

impl Delegate for Fixed {
    fn has(&self, _id: &str) -> bool {
        true
    }

    fn get(&self, _id: &str) -> InjectResult<Value> {
        Ok(Value::from(self.0))
    }
}

#[test]
fn delegates_take_precedence() {
    let injector = Injector::new();
    injector.set("remote.name", Value::from("local")).unwrap();
    injector.delegate("remote.", Fixed("remote"));

    assert_eq!(Value::from("remote"), injector.get("remote.name").unwrap());
    assert_eq!(Value::from("remote"), injector.get("remote.other").unwrap());
}

#[test]
fn first_matching_delegate_wins() {
    let injector = Injector::new();
    injector
        .delegate("a.", Fixed("first"))
        .delegate("a.b.", Fixed("second"))
        .delegate("a.", Fixed("replaced"));

    // Replacing a delegate keeps its position.
    assert_eq!(Value::from("replaced"), injector.get("a.b.c").unwrap());
}

#[test]
fn injectors_delegate_to_injectors() {
    let remote = Injector::new();
    remote.set("db.url", Value::from("postgres://")).unwrap();

    let injector = Injector::new();
    injector.set("db.local", Value::from("sqlite://")).unwrap();
    injector.delegate("db.", remote);

    assert!(injector.has("db.url"));
    assert_eq!(Value::from("postgres://"), injector.get("db.url").unwrap());

    // The delegate alone answers for its prefix.
    assert!(!injector.has("db.local"));
    assert!(matches!(
        injector.get("db.local"),
        Err(InjectError::NotFound { .. })
    ));
}

#[test]
fn ambiguous_types_cant_be_resolved() {
    let injector = Injector::new();
    injector
        .set("a", Definition::value("first").with_type("app::Name"))
        .unwrap()
        .set("b", Definition::value("second").with_type("app::Name"))
        .unwrap();

    match injector.resolve_type("app::Name") {
        Err(InjectError::DependencyResolution { type_name })
            if type_name == "app::Name" => {}
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn declared_types_are_indexed() {
    let calls = Svc::new(AtomicUsize::new(0));
    let injector = Injector::new();
    injector
        .set("counter", counting_factory(&calls).with_type("app::Counter"))
        .unwrap();

    assert_eq!(Value::from(0i64), injector.resolve_type("::app::Counter").unwrap());
    assert_eq!(Value::from(0i64), injector.resolve_type("\\app::Counter").unwrap());
}

#[test]
fn objects_are_indexed_by_interface() {
    let injector = Injector::new();
    define_classes(&injector);
    let config = Svc::new(Config { url: "memory://".into() });
    let repository = Value::object(Repository { config });
    injector.set("repository", repository.clone()).unwrap();

    assert_eq!(repository, injector.resolve_type("app::Storage").unwrap());
    assert_eq!(
        repository,
        injector
            .resolve_type(std::any::type_name::<Repository>())
            .unwrap()
    );
}

#[test]
fn deep_resolution_disabled() {
    let injector = Injector::new();
    define_classes(&injector);

    match injector.resolve_type("app::Accounts") {
        Err(InjectError::DependencyResolution { type_name })
            if type_name == "app::Accounts" => {}
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn deep_resolution_enabled() {
    let injector = Injector::builder().deep_resolution(true).build();
    define_classes(&injector);

    let accounts: Svc<Accounts> = injector
        .resolve_type("::app::Accounts")
        .unwrap()
        .downcast()
        .unwrap();
    assert_eq!("memory://", accounts.repository.config.url);
}

#[test]
fn deep_resolution_names_the_nested_type() {
    let injector = Injector::new();
    injector.set_deep_resolution(true);
    injector.define_class(Class::named::<Accounts>("app::Accounts").constructor(
        [Parameter::new("repository").typed("app::Repository")],
        |_, args| Ok(Accounts { repository: args.object("repository")? }),
    ));

    match injector.resolve_type("app::Accounts") {
        Err(InjectError::DependencyResolution { type_name })
            if type_name == "app::Repository" => {}
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn unknown_service_placeholder_is_literal() {
    let injector = Injector::new();
    let echo = Function::new(|_, args| Ok(args.get_or_null("value")))
        .with_parameters([Parameter::new("value")]);

    let args = Args::new().with("value", Arg::parse("%svc"));
    assert_eq!(
        Value::from("%svc"),
        injector.inject_function(echo, &args).unwrap()
    );
}

fn define_di_test(injector: &Injector) {
    #[derive(Default)]
    struct DiTestA;

    injector.define_class(
        Class::named::<DiTestA>("DiTest_A").default_constructor().static_method(
            "foo",
            [
                Parameter::new("di").of::<Injector>(),
                Parameter::new("foo"),
                Parameter::new("bar"),
            ],
            |injector, args| {
                let di: Svc<Injector> = args.object("di")?;
                assert!(di.ptr_eq(injector));

                let foo = args.get("foo").cloned().unwrap_or_else(|| "foo".into());
                let bar = args.get("bar").cloned().unwrap_or_else(|| "bar".into());
                Ok(Value::from(vec![foo, bar]))
            },
        ),
    );
}

#[test]
fn static_method_defaults() {
    let injector = Injector::new();
    define_di_test(&injector);

    let result = injector
        .inject_static_method("DiTest_A", "foo", &Args::new())
        .unwrap();
    assert_eq!(Value::from(vec![Value::from("foo"), Value::from("bar")]), result);

    let args = Args::new().with("bar", "baz");
    let result = injector
        .inject_static_method("::DiTest_A", "foo", &args)
        .unwrap();
    assert_eq!(Value::from(vec![Value::from("foo"), Value::from("baz")]), result);
}

#[test]
fn constructor_receives_the_injector() {
    struct Holder {
        injector: Svc<Injector>,
    }

    let injector = Injector::new();
    injector.define_class(Class::named::<Holder>("app::Holder").constructor(
        [Parameter::new("di")],
        |_, args| Ok(Holder { injector: args.object("di")? }),
    ));

    let args = Args::new().with("di", Arg::parse("%DI"));
    let holder: Svc<Holder> = injector
        .inject_constructor("app::Holder", &args)
        .unwrap()
        .downcast()
        .unwrap();
    assert!(holder.injector.ptr_eq(&injector));
}

#[test]
fn method_injection() {
    struct Greeter {
        greeting: String,
    }

    let injector = Injector::builder()
        .parameters(Parameters::new().with("name", "world"))
        .build();
    injector.define_class(Class::named::<Greeter>("app::Greeter").method(
        "greet",
        [Parameter::new("name")],
        |greeter, _, args| {
            let name = args.get("name").and_then(Value::as_str).unwrap_or("nobody");
            Ok(Value::from(format!("{}, {}!", greeter.greeting, name)))
        },
    ));

    let greeter = Value::object(Greeter { greeting: "hello".into() });
    let args = Args::new().with("name", Arg::parse(":name"));
    assert_eq!(
        Value::from("hello, world!"),
        injector.inject_method(&greeter, "greet", &args).unwrap()
    );
    assert_eq!(
        Value::from("hello, nobody!"),
        injector.inject_method(&greeter, "greet", &Args::new()).unwrap()
    );
}

#[test]
fn method_injection_needs_an_object() {
    let injector = Injector::new();
    match injector.inject_method(&Value::from(42), "greet", &Args::new()) {
        Err(InjectError::InvalidArgument(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn function_injection() {
    let injector = Injector::new();
    injector.set("suffix", Value::from("!")).unwrap();
    injector
        .define_function(
            Function::new(|_, args| {
                let text = args.get_or_null("text");
                let suffix = args.get_or_null("suffix");
                Ok(Value::from(format!(
                    "{}{}",
                    text.as_str().unwrap_or_default(),
                    suffix.as_str().unwrap_or_default()
                )))
            })
            .named("shout")
            .with_parameters([Parameter::new("text"), Parameter::new("suffix")]),
        )
        .unwrap();

    let args = Args::new()
        .with("text", "hey")
        .with("suffix", Arg::service("suffix"));
    assert_eq!(
        Value::from("hey!"),
        injector.inject_function("shout", &args).unwrap()
    );

    let closure = Function::new(|injector, _| injector.get("suffix"));
    assert_eq!(
        Value::from("!"),
        injector.inject_function(closure, &Args::new()).unwrap()
    );

    assert!(matches!(
        injector.inject_function(Value::from(true), &Args::new()),
        Err(InjectError::InvalidArgument(_))
    ));
}

#[test]
fn class_definitions_use_stored_arguments() {
    let injector = Injector::builder()
        .parameters(Parameters::new().with("url", "postgres://"))
        .build();
    injector.define_class(Class::named::<Config>("app::Config").constructor(
        [Parameter::new("url")],
        |_, args| {
            let url = args.get("url").and_then(Value::as_str).unwrap_or_default();
            Ok(Config { url: url.to_owned() })
        },
    ));
    injector
        .set(
            "config",
            Definition::class(
                "::app::Config",
                Args::new().with("url", Arg::parse(":url")),
            )
            .with_type("app::Config"),
        )
        .unwrap();

    let config: Svc<Config> = injector
        .resolve_type("app::Config")
        .unwrap()
        .downcast()
        .unwrap();
    assert_eq!("postgres://", config.url);
}

#[test]
fn bundles_register_definitions() {
    let injector = Injector::new();
    let mut module = Module::default();
    module.set("app.name", Value::from("demo"));
    module.parameter("env", "test");

    injector.register(&module).unwrap();
    assert_eq!(Value::from("demo"), injector.get("app.name").unwrap());
    assert_eq!(Some(Value::from("test")), injector.get_parameter("env"));
}

#[test]
fn bundle_errors_propagate() {
    let injector = Injector::new();
    let module = define_module! {
        definitions = {
            "DI" => Value::from("not the injector"),
        },
    };

    match injector.register(&module) {
        Err(InjectError::DuplicateDefinition { id }) if id == "DI" => {}
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }

    let rejecting = |_: &Injector| -> InjectResult<()> {
        Err(InjectError::InvalidArgument("unsupported container".into()))
    };
    assert!(matches!(
        injector.register(&rejecting),
        Err(InjectError::InvalidArgument(_))
    ));
}

#[test]
fn failed_module_registration_changes_nothing() {
    let injector = Injector::new();
    injector.set("b", Value::from("existing")).unwrap();

    let module = define_module! {
        definitions = {
            "a" => Value::from("new"),
            "b" => Value::from("replacement"),
        },
        parameters = {
            "env" => "test",
        },
        delegates = {
            "remote." => Fixed("remote"),
        },
    };

    match injector.register(&module) {
        Err(InjectError::DuplicateDefinition { id }) if id == "b" => {}
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }
    assert!(!injector.has("a"));
    assert!(!injector.has("remote.name"));
    assert_eq!(Value::from("existing"), injector.get("b").unwrap());

    // The parameter store is still free.
    assert_eq!(None, injector.get_parameter("env"));
    injector.set_parameters([("env", "prod")]);
    assert_eq!(Some(Value::from("prod")), injector.get_parameter("env"));
}

#[test]
fn modules_reject_repeated_ids() {
    let injector = Injector::new();
    let mut module = Module::default();
    module.set("twice", Value::from(1));
    module.set("twice", Value::from(2));

    assert!(matches!(
        injector.register(&module),
        Err(InjectError::DuplicateDefinition { .. })
    ));
    assert!(!injector.has("twice"));
}
