#[test]
fn jsk_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/jsk_error_pass.rs");
    t.compile_fail("tests/ui/jsk_error_no_context.rs");
}

#[test]
fn flag_set_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/flag_set_pass.rs");
    t.compile_fail("tests/ui/flag_set_duplicate_name.rs");
    t.compile_fail("tests/ui/flag_set_unsupported_type.rs");
}
