#[actbus::actions]
pub struct AdminActions {
    bus: String,
}

fn main() {}
