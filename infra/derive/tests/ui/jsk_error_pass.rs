use jsk_derive::jsk_error;
use std::borrow::Cow;

#[jsk_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Parse error{}: {message}", format_context(.context))]
    Parse { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> Result<String> {
    let err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    Err::<String, _>(err).context("reading flags")
}

fn main() {
    let err = read().unwrap_err();
    assert_eq!(err.to_string(), "IO error (reading flags): missing");

    let converted: DemoError = std::io::Error::other("boom").into();
    assert!(matches!(converted, DemoError::Io { context: None, .. }));
}
