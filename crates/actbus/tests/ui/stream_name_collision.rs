#[actbus::actions]
pub struct FeedActions {
    refresh: (),
    refresh_stream: u32,
}

fn main() {}
