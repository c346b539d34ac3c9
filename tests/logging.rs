use oppsql::logging;

#[test]
fn initialisation_is_idempotent() {
    let first = logging::init(None);
    let second = logging::init(Some("debug"));
    assert_eq!(first, second);
}
