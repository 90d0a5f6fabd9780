#[actbus::actions]
#[derive(Clone, Default)]
pub struct FormActions {
    submit: (),
}

fn main() {}
