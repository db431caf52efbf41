#[jsk_derive::jsk_error]
pub enum LoadError {
    #[error("IO error: {source}")]
    Io { source: std::io::Error },
}

fn main() {}
