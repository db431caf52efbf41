use jsk_flags::{FlagError, FlagRegistry, FlagSource, FlagView, MapEnv, flag_set};
use std::sync::atomic::{AtomicUsize, Ordering};

static HANDLER_CALLS: AtomicUsize = AtomicUsize::new(0);

/// Flags for a demo service.
#[flag_set(prefix = "DEMO_")]
pub struct DemoFlags {
    verbose: bool,
    #[flag(default = 8)]
    workers: i64,
    #[flag(default = 1.5)]
    backoff: f64,
    #[flag(name = "LABEL", default = "demo")]
    service_label: String,
    #[flag(computed = render_banner, handler = count_handler)]
    banner: String,
}

fn render_banner(flags: &FlagView<'_>) -> jsk_flags::Result<String> {
    let label = flags.get_as::<String>(DemoFlags::SERVICE_LABEL)?;
    let workers = flags.get_as::<i64>(DemoFlags::WORKERS)?;
    Ok(format!("{label}x{workers}"))
}

fn count_handler(_: &FlagView<'_>) {
    HANDLER_CALLS.fetch_add(1, Ordering::SeqCst);
}

fn demo(env: &MapEnv) -> DemoFlags {
    DemoFlags::from_registry(DemoFlags::builder().environment(env.clone()).build().unwrap())
}

#[test]
fn generated_accessors_resolve_defaults() {
    let env = MapEnv::new();
    let flags = demo(&env);

    assert!(!flags.verbose().unwrap());
    assert_eq!(flags.workers().unwrap(), 8);
    assert!((flags.backoff().unwrap() - 1.5).abs() < f64::EPSILON);
    assert_eq!(flags.service_label().unwrap(), "demo");
    assert_eq!(flags.banner().unwrap(), "demox8");
}

#[test]
fn renamed_flags_use_their_explicit_name() {
    let env = MapEnv::new();
    let flags = demo(&env);

    assert_eq!(DemoFlags::SERVICE_LABEL, "LABEL");
    env.set("DEMO_LABEL", "edge");
    assert_eq!(flags.service_label().unwrap(), "edge");
    assert_eq!(flags.banner().unwrap(), "edgex8");
}

#[test]
fn prefix_argument_namespaces_environment() {
    let env = MapEnv::from_iter([("DEMO_WORKERS", "2"), ("JISHAKU_WORKERS", "9")]);
    let flags = demo(&env);

    assert_eq!(flags.registry().prefix(), "DEMO_");
    assert_eq!(flags.workers().unwrap(), 2);
    assert_eq!(
        flags.registry().resolve(DemoFlags::WORKERS).unwrap().source,
        FlagSource::Environment
    );
}

#[test]
fn setters_store_overrides() {
    let env = MapEnv::from_iter([("DEMO_VERBOSE", "no")]);
    let flags = demo(&env);

    flags.set_verbose(true).unwrap();
    flags.set_workers(3).unwrap();
    flags.set_service_label("core").unwrap();

    assert!(flags.verbose().unwrap());
    assert_eq!(flags.banner().unwrap(), "corex3");
}

#[test]
fn specs_and_registry_agree() {
    let specs = DemoFlags::specs();
    let names: Vec<_> = specs.iter().map(|s| s.name().to_owned()).collect();
    assert_eq!(names, ["VERBOSE", "WORKERS", "BACKOFF", "LABEL", "BANNER"]);

    let registry: FlagRegistry = DemoFlags::builder().environment(MapEnv::new()).build().unwrap();
    assert!(registry.definition("BANNER").unwrap().handler().is_some());
    assert!(matches!(registry.get("SERVICE_LABEL"), Err(FlagError::UnknownFlag { .. })));
}

#[test]
fn handlers_are_left_to_the_host() {
    let env = MapEnv::new();
    let flags = demo(&env);
    let _ = flags.banner().unwrap();
    assert_eq!(HANDLER_CALLS.load(Ordering::SeqCst), 0);
}
