mod fixtures;

use actbus_core::*;
use fixtures::{Recorder, parse_count};
use proptest::prelude::*;

proptest! {
    #[test]
    fn subscribers_see_suffix_from_their_registration(
        values in proptest::collection::vec(any::<i32>(), 1..64),
        join_at in 0usize..64,
    ) {
        let join_at = join_at % values.len();
        let bus = ActionBus::new();
        let early = Recorder::<i32>::default();
        let late = Recorder::<i32>::default();

        let _early = bus.observe::<i32>("n").unwrap().subscribe(early.sink());
        let mut _late = None;
        for (i, value) in values.iter().enumerate() {
            if i == join_at {
                _late = Some(bus.observe::<i32>("n").unwrap().subscribe(late.sink()));
            }
            bus.dispatch("n", *value).unwrap();
        }

        prop_assert_eq!(early.values(), values.clone());
        prop_assert_eq!(late.values(), values[join_at..].to_vec());
    }

    #[test]
    fn count_transform_never_fails(raw in ".*") {
        let surface = create_bus(TransformTable::new().map("count", parse_count));
        let seen = Recorder::<i64>::default();
        let _sub = surface.stream::<i64>("count").unwrap().subscribe(seen.sink());

        surface.dispatch::<String, i64>("count", raw.clone()).unwrap();
        prop_assert_eq!(seen.values(), vec![raw.trim().parse::<i64>().unwrap_or(0)]);
    }

    #[test]
    fn teardown_closes_every_touched_channel(names in proptest::collection::btree_set("[a-z]{1,8}", 0..16)) {
        let bus = ActionBus::new();
        for name in &names {
            bus.observe::<u8>(name.clone()).unwrap();
        }

        prop_assert_eq!(bus.teardown(), names.len());
        prop_assert_eq!(bus.teardown(), 0);
        for name in names {
            prop_assert!(bus.observe::<u8>(name).unwrap().is_closed());
        }
    }
}
