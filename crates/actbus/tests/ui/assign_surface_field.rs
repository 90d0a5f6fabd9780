mod surface {
    #[actbus::actions]
    pub struct UiActions {
        search: String,
    }
}

fn main() {
    let bus = actbus::ActionBus::new();
    let transforms = actbus::TransformTable::new();
    let mut actions = surface::UiActions::create(&bus, &transforms).unwrap();
    let replacement = bus.dispatcher::<String, String>("search", &transforms).unwrap();

    // Actions are emitted by calling them, never by assignment.
    actions.search = replacement;
}
