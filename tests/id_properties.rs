//! Property tests for ID parsing, status vocabularies and attrs encoding

use proptest::prelude::*;

use shotline::domain::{Attrs, TaskId, VersionId};
use shotline::{
    Category, GroupId, ShowStatus, TaskStatus, UnitId, UnitStatus, VersionStatus,
};

fn category() -> impl Strategy<Value = Category> {
    prop_oneof![Just(Category::Shot), Just(Category::Asset)]
}

fn unit_name(category: Category) -> BoxedStrategy<String> {
    match category {
        Category::Shot => "[0-9]{1,6}".boxed(),
        Category::Asset => "[A-Za-z]{1,8}(_[A-Za-z0-9]{1,4})?".boxed(),
    }
}

fn unit_id() -> impl Strategy<Value = UnitId> {
    (
        "[A-Za-z0-9]{1,10}",
        "[A-Za-z][A-Za-z0-9_]{0,8}",
        category(),
    )
        .prop_flat_map(|(show, group, category)| {
            unit_name(category).prop_map(move |unit| {
                UnitId::new(show.clone(), category, group.clone(), unit).unwrap()
            })
        })
}

proptest! {
    #[test]
    fn group_id_round_trips(show in "[A-Za-z0-9]{1,10}", group in "[A-Za-z][A-Za-z0-9_]{0,8}") {
        let id = GroupId::new(show, group).unwrap();
        let parsed: GroupId = id.to_string().parse().unwrap();
        prop_assert_eq!(parsed, id);
    }

    #[test]
    fn unit_id_round_trips(id in unit_id()) {
        let parsed: UnitId = id.to_string().parse().unwrap();
        prop_assert_eq!(parsed, id);
    }

    #[test]
    fn version_id_round_trips(
        unit in unit_id(),
        task in "[a-z][a-z0-9_]{0,7}",
        version in "v[0-9]{3}",
    ) {
        let id = unit.task(task).unwrap().version(version).unwrap();
        let parsed: VersionId = id.to_string().parse().unwrap();
        prop_assert_eq!(&parsed, &id);

        let task: TaskId = id.task_id().to_string().parse().unwrap();
        prop_assert_eq!(task.unit_id(), unit);
    }

    #[test]
    fn spaced_components_are_rejected(id in unit_id(), pos in 0usize..4) {
        let mut parts: Vec<String> = id.to_string().split('/').map(String::from).collect();
        parts[pos].push_str(" x");
        let err = parts.join("/").parse::<UnitId>().unwrap_err();
        prop_assert!(err.is_bad_request());
    }

    #[test]
    fn wrong_arity_is_rejected(id in unit_id()) {
        let err = format!("{}/extra/more", id).parse::<UnitId>().unwrap_err();
        prop_assert!(err.is_bad_request());
        let err = id.group_id().to_string().parse::<UnitId>().unwrap_err();
        prop_assert!(err.is_bad_request());
    }

    #[test]
    fn only_listed_statuses_are_valid(s in "[a-z-]{1,12}") {
        prop_assert_eq!(ShowStatus::is_valid(&s), ShowStatus::all_strs().contains(&s.as_str()));
        prop_assert_eq!(UnitStatus::is_valid(&s), UnitStatus::all_strs().contains(&s.as_str()));
        prop_assert_eq!(TaskStatus::is_valid(&s), TaskStatus::all_strs().contains(&s.as_str()));
        prop_assert_eq!(VersionStatus::is_valid(&s), VersionStatus::all_strs().contains(&s.as_str()));
    }

    #[test]
    fn attrs_survive_encoding(
        pairs in proptest::collection::vec(("[a-z][a-z _]{0,8}", "[ -~]{0,16}"), 0..8)
    ) {
        let attrs: Attrs = pairs.into_iter().collect();
        prop_assert_eq!(Attrs::decode(&attrs.encode()), attrs);
    }
}

#[test]
fn every_listed_status_is_valid() {
    for s in ShowStatus::ALL {
        assert!(ShowStatus::is_valid(s.as_str()));
    }
    for s in UnitStatus::ALL {
        assert!(UnitStatus::is_valid(s.as_str()));
    }
    for s in TaskStatus::ALL {
        assert!(TaskStatus::is_valid(s.as_str()));
    }
    for s in VersionStatus::ALL {
        assert!(VersionStatus::is_valid(s.as_str()));
    }
}
