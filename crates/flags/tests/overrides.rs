use jsk_flags::{FlagError, FlagRegistry, FlagSource, FlagSpec, FlagType, FlagValue, MapEnv};
use std::sync::Arc;
use std::thread;

fn registry(env: &MapEnv) -> FlagRegistry {
    FlagRegistry::builder()
        .environment(env.clone())
        .flag(FlagSpec::of::<bool>("HIDE"))
        .flag(FlagSpec::of::<i64>("MAX_LINES").default_value(40))
        .flag(FlagSpec::of::<String>("SCOPE_PREFIX").default_value("_"))
        .build()
        .expect("schema should be valid")
}

#[test]
fn override_wins_over_environment() {
    let env = MapEnv::new();
    let flags = registry(&env);

    assert!(!flags.get_as::<bool>("HIDE").unwrap());

    flags.set("HIDE", true).unwrap();
    assert!(flags.get_as::<bool>("HIDE").unwrap());

    env.set("JISHAKU_HIDE", "0");
    assert!(flags.get_as::<bool>("HIDE").unwrap());
    assert_eq!(flags.resolve("HIDE").unwrap().source, FlagSource::Override);
}

#[test]
fn override_wins_even_over_unparsable_environment() {
    let env = MapEnv::new();
    let flags = registry(&env);

    env.set("JISHAKU_MAX_LINES", "not a number");
    assert!(flags.get("MAX_LINES").is_err());

    flags.set("MAX_LINES", 7_i64).unwrap();
    assert_eq!(flags.get_as::<i64>("MAX_LINES").unwrap(), 7);
}

#[test]
fn wrong_type_is_rejected_without_touching_the_override() {
    let env = MapEnv::new();
    let flags = registry(&env);
    flags.set("SCOPE_PREFIX", "jsk.").unwrap();

    let err = flags.set("SCOPE_PREFIX", true).expect_err("bool is not a string");
    match &err {
        FlagError::TypeMismatch { name, expected, actual, .. } => {
            assert_eq!(name, "SCOPE_PREFIX");
            assert_eq!(*expected, FlagType::Str);
            assert_eq!(*actual, FlagType::Bool);
        },
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        err.to_string(),
        "Attempted to set flag SCOPE_PREFIX to type bool (should be str)"
    );
    assert_eq!(flags.get_as::<String>("SCOPE_PREFIX").unwrap(), "jsk.");

    assert!(flags.set("HIDE", 1_i64).is_err());
    assert!(!flags.is_overridden("HIDE").unwrap());
    assert!(!flags.get_as::<bool>("HIDE").unwrap());
}

#[test]
fn overrides_can_be_reassigned_but_not_cleared() {
    let env = MapEnv::new();
    let flags = registry(&env);

    flags.set("MAX_LINES", 10_i64).unwrap();
    flags.set("MAX_LINES", 20_i64).unwrap();
    assert_eq!(flags.get("MAX_LINES").unwrap(), FlagValue::Int(20));

    flags.set("MAX_LINES", 40_i64).unwrap();
    assert_eq!(flags.resolve("MAX_LINES").unwrap().source, FlagSource::Override);
    assert!(flags.is_overridden("MAX_LINES").unwrap());
}

#[test]
fn reads_do_not_create_overrides() {
    let env = MapEnv::from_iter([("JISHAKU_HIDE", "yes")]);
    let flags = registry(&env);

    for _ in 0..3 {
        assert!(flags.get_as::<bool>("HIDE").unwrap());
    }
    assert!(!flags.is_overridden("HIDE").unwrap());
}

#[test]
fn set_parsed_uses_the_declared_type() {
    let env = MapEnv::new();
    let flags = registry(&env);

    flags.set_parsed("HIDE", "On").unwrap();
    flags.set_parsed("MAX_LINES", " 99 ").unwrap();
    flags.set_parsed("SCOPE_PREFIX", "jsk_").unwrap();

    assert!(flags.get_as::<bool>("HIDE").unwrap());
    assert_eq!(flags.get_as::<i64>("MAX_LINES").unwrap(), 99);
    assert_eq!(flags.get_as::<String>("SCOPE_PREFIX").unwrap(), "jsk_");

    assert!(matches!(flags.set_parsed("HIDE", "banana"), Err(FlagError::Conversion { .. })));
    assert!(matches!(flags.set_parsed("NOPE", "1"), Err(FlagError::UnknownFlag { .. })));
    assert!(flags.get_as::<bool>("HIDE").unwrap());
}

#[test]
fn clones_share_override_slots() {
    let env = MapEnv::new();
    let flags = registry(&env);
    let handle = flags.clone();

    handle.set("HIDE", true).unwrap();
    assert!(flags.get_as::<bool>("HIDE").unwrap());
}

#[test]
fn concurrent_readers_observe_a_written_value() {
    let env = MapEnv::new();
    let flags = Arc::new(registry(&env));

    let writer = {
        let flags = Arc::clone(&flags);
        thread::spawn(move || {
            for i in 0..100_i64 {
                flags.set("MAX_LINES", i).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let flags = Arc::clone(&flags);
            thread::spawn(move || {
                for _ in 0..100 {
                    let value = flags.get_as::<i64>("MAX_LINES").unwrap();
                    assert!((0..100).contains(&value) || value == 40);
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(flags.get_as::<i64>("MAX_LINES").unwrap(), 99);
}
