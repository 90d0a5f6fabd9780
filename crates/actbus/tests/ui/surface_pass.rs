#[actbus::actions]
#[derive(Clone)]
pub struct FormActions {
    /// Free-text query.
    query: String,
    #[action(input = (u8, u8))]
    resize: u16,
    submit: (),
}

fn main() -> Result<(), actbus::BusError> {
    let bus = actbus::ActionBus::new();
    let transforms =
        actbus::TransformTable::new().map("resize", |(w, h): (u8, u8)| u16::from(w) * u16::from(h));
    let actions = FormActions::create(&bus, &transforms)?;

    let _sub = actions.resize_stream()?.subscribe(|area: &u16| assert_eq!(*area, 12));
    actions.query("abc".to_owned())?;
    actions.resize((3, 4))?;
    actions.submit(())?;

    assert_eq!(FormActions::ACTIONS, &["query", "resize", "submit"]);
    assert!(actions.bus().same_bus(&bus));
    let _ = format!("{actions:?}");
    actions.clone().teardown();
    Ok(())
}
