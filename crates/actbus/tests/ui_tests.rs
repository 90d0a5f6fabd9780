#[test]
fn ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/surface_pass.rs");
    t.compile_fail("tests/ui/assign_surface_field.rs");
    t.compile_fail("tests/ui/reserved_action_name.rs");
    t.compile_fail("tests/ui/stream_name_collision.rs");
    t.compile_fail("tests/ui/unsupported_derive.rs");
}
