#[jsk_flags::flag_set]
pub struct DuplicateFlags {
    hide: bool,
    #[flag(name = "HIDE")]
    also_hide: bool,
}

fn main() {}
