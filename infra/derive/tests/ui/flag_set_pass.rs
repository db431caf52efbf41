use jsk_flags::{FlagView, MapEnv, flag_set};

#[flag_set(prefix = "UI_")]
pub struct UiFlags {
    hide: bool,
    #[flag(name = "PAGE_SIZE", default = 20)]
    lines: i64,
    #[flag(computed = pick_theme)]
    theme: String,
}

fn pick_theme(flags: &FlagView<'_>) -> jsk_flags::Result<String> {
    Ok(if flags.get_as::<bool>(UiFlags::HIDE)? { "dim".into() } else { "bright".into() })
}

fn main() -> jsk_flags::Result<()> {
    let env = MapEnv::new();
    let flags = UiFlags::from_registry(UiFlags::builder().environment(env.clone()).build()?);

    assert_eq!(UiFlags::LINES, "PAGE_SIZE");
    assert_eq!(flags.lines()?, 20);
    assert_eq!(flags.theme()?, "bright");
    env.set("UI_HIDE", "on");
    assert_eq!(flags.theme()?, "dim");
    flags.set_hide(false)?;
    assert_eq!(flags.theme()?, "bright");
    Ok(())
}
