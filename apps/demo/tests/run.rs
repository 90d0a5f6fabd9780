use actbus::{BusConfig, RetiredDispatch};
use actbus_demo::app::{View, run};

#[tokio::test]
async fn scripted_session_renders_after_each_command() {
    let input: &[u8] = b"search abc\ncount 4\ncount not-a-number\nbogus\nshow\nquit\nsearch ignored\n";
    let mut output = Vec::new();

    let view = run(BusConfig::default(), input, &mut output).await.unwrap();

    let rendered = String::from_utf8(output).unwrap();
    assert!(rendered.starts_with("Search: \nCount: 4\n"));
    assert!(rendered.contains("Search: abc\nCount: 4\n"));
    assert!(rendered.contains("Search: abc\nCount: 0\n"));
    assert!(rendered.contains("commands: search <text>"));
    assert_eq!(rendered.matches("Count: ").count(), 5, "initial frame plus one per accepted command");
    assert_eq!(view, View { search: "abc".to_owned(), count: 0 });
}

#[tokio::test]
async fn empty_input_keeps_initial_values() {
    let config = BusConfig::default().with_retired_dispatch(RetiredDispatch::Reject);
    let mut output = Vec::new();

    let view = run(config, &b""[..], &mut output).await.unwrap();
    assert_eq!(view, View { search: String::new(), count: 4 });
    assert_eq!(output, b"Search: \nCount: 4\n");
}
