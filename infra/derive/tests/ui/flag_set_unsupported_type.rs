#[jsk_flags::flag_set]
pub struct RatioFlags {
    ratio: f32,
}

fn main() {}
