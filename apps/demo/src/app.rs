use crate::coerce::{RawInput, coerce_number, coerce_string};
use actbus::{ActionBus, BusConfig, BusError, Subscription, TransformTable};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

#[actbus::actions]
pub struct UiActions {
    /// Text typed into the search box.
    #[action(input = RawInput)]
    search: String,
    /// Value of the numeric input.
    #[action(input = RawInput)]
    count: i64,
}

pub fn transforms() -> TransformTable {
    TransformTable::new().map("search", coerce_string).map("count", coerce_number)
}

/// What the page currently shows, kept current by stream subscribers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct View {
    pub search: String,
    pub count: i64,
}

impl View {
    pub fn render(&self) -> String {
        format!("Search: {}\nCount: {}\n", self.search, self.count)
    }
}

/// One parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Search(RawInput),
    Count(RawInput),
    Show,
    Quit,
}

impl Command {
    /// Parses `search <text>`, `count <text>`, `show` or `quit`.
    ///
    /// Text is wrapped as an input event, the way a widget would report it.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
        match verb {
            "search" => Some(Self::Search(RawInput::event(rest))),
            "count" => Some(Self::Count(RawInput::event(rest))),
            "show" => Some(Self::Show),
            "quit" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Binds the view to the action streams.
///
/// # Errors
/// Fails only if the streams are bound to other value types on this bus.
pub fn bind_view(actions: &UiActions, view: &Arc<Mutex<View>>) -> Result<Vec<Subscription>, BusError> {
    let search = view.clone();
    let count = view.clone();
    Ok(vec![
        actions.search_stream()?.subscribe(move |text: &String| search.lock().search.clone_from(text)),
        actions.count_stream()?.subscribe(move |n: &i64| count.lock().count = *n),
    ])
}

/// Runs the demo over `input` until it ends or a `quit` line arrives.
///
/// The bus lives for exactly this call: it is torn down on return, which ends
/// the background count logger.
///
/// # Errors
/// Returns I/O errors from `input`/`output` and bus errors from dispatching.
pub async fn run<R, W>(config: BusConfig, input: R, mut output: W) -> anyhow::Result<View>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let bus = ActionBus::with_config(config);
    let guard = bus.teardown_guard();
    let actions = UiActions::create(&bus, &transforms())?;

    let view = Arc::new(Mutex::new(View::default()));
    let _bindings = bind_view(&actions, &view)?;

    let mut counts = actions.count_stream()?.listen();
    let count_log = tokio::spawn(async move {
        let mut changes = 0_usize;
        while let Some(count) = counts.recv().await {
            changes += 1;
            info!(count, "Count changed");
        }
        changes
    });

    actions.search(RawInput::Text(String::new()))?;
    actions.count(RawInput::Text("4".to_owned()))?;
    let rendered = view.lock().render();
    output.write_all(rendered.as_bytes()).await?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Some(Command::Search(raw)) => actions.search(raw)?,
            Some(Command::Count(raw)) => actions.count(raw)?,
            Some(Command::Show) => {},
            Some(Command::Quit) => break,
            None => {
                warn!(line = %line, "Unknown command");
                output.write_all(b"commands: search <text> | count <number> | show | quit\n").await?;
                continue;
            },
        }
        let rendered = view.lock().render();
        output.write_all(rendered.as_bytes()).await?;
    }
    output.flush().await?;

    drop(guard);
    let changes = count_log.await?;
    debug!(changes, "Count logger finished");

    let last = view.lock().clone();
    Ok(last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_recognizes_commands() {
        assert_eq!(Command::parse("search abc def"), Some(Command::Search(RawInput::event("abc def"))));
        assert_eq!(Command::parse("count 4\r\n"), Some(Command::Count(RawInput::event("4"))));
        assert_eq!(Command::parse("search"), Some(Command::Search(RawInput::event(""))));
        assert_eq!(Command::parse("show"), Some(Command::Show));
        assert_eq!(Command::parse("exit"), Some(Command::Quit));
        assert_eq!(Command::parse("reset"), None);
    }

    #[test]
    fn view_follows_dispatches() {
        let bus = ActionBus::new();
        let actions = UiActions::create(&bus, &transforms()).unwrap();
        let view = Arc::new(Mutex::new(View::default()));
        let _bindings = bind_view(&actions, &view).unwrap();

        actions.search(RawInput::event("abc")).unwrap();
        actions.count(RawInput::event("not-a-number")).unwrap();
        assert_eq!(view.lock().render(), "Search: abc\nCount: 0\n");
    }
}
