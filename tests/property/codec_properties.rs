//! Property-based tests for the shared data model.
//!
//! Uses proptest to verify:
//! 1. Any identity survives the session snapshot codec.
//! 2. Arbitrary text never panics `decode_identity` (returns `Err` gracefully).
//! 3. Any task survives a JSON round-trip with the camelCase field names.
//! 4. A task is overdue exactly when incomplete and due before `now`.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use proptest::prelude::*;
use taskflow_proto::codec::{decode_identity, encode_identity};
use taskflow_proto::identity::{Identity, Role, UserId};
use taskflow_proto::task::{Task, TaskId, TaskPriority, TaskStatus};

// --- Strategies ---

fn arb_role() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::Admin), Just(Role::Manager), Just(Role::RegularUser)]
}

fn arb_status() -> impl Strategy<Value = TaskStatus> {
    prop_oneof![
        Just(TaskStatus::ToDo),
        Just(TaskStatus::InProgress),
        Just(TaskStatus::Complete),
    ]
}

fn arb_priority() -> impl Strategy<Value = TaskPriority> {
    prop_oneof![
        Just(TaskPriority::Low),
        Just(TaskPriority::Medium),
        Just(TaskPriority::High),
        Just(TaskPriority::Critical),
    ]
}

fn arb_identity() -> impl Strategy<Value = Identity> {
    (
        "[0-9]{1,4}",
        "[a-z]{1,12}@[a-z]{1,8}\\.com",
        ".{0,40}",
        arb_role(),
        proptest::option::of("https://[a-z]{1,10}\\.com/[a-z0-9]{0,16}"),
    )
        .prop_map(|(id, email, name, role, avatar)| Identity {
            id: UserId::new(id),
            email,
            name,
            role,
            avatar,
        })
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0i64..3650).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default() + Duration::days(offset)
    })
}

fn arb_instant() -> impl Strategy<Value = DateTime<Utc>> {
    (1_577_836_800_000i64..1_893_456_000_000).prop_map(|ms| {
        DateTime::from_timestamp_millis(ms).unwrap_or_default()
    })
}

fn arb_task() -> impl Strategy<Value = Task> {
    (
        ("[0-9a-f-]{1,36}", ".{1,60}", ".{0,120}"),
        ("[0-9]{1,3}", "[0-9]{1,3}", arb_priority(), arb_status()),
        (arb_date(), proptest::collection::vec("[a-z]{1,8}", 0..5), arb_instant()),
    )
        .prop_map(
            |((id, title, description), (assignee, creator, priority, status), (due, tags, at))| {
                Task {
                    id: TaskId::new(id),
                    title,
                    description,
                    assigned_to: UserId::new(assignee),
                    assigned_to_name: "Assignee".to_string(),
                    created_by: UserId::new(creator),
                    created_by_name: "Creator".to_string(),
                    priority,
                    status,
                    due_date: due,
                    tags,
                    created_at: at,
                    updated_at: at,
                }
            },
        )
}

// --- Property tests ---

proptest! {
    /// Any identity survives the snapshot codec.
    #[test]
    fn identity_snapshot_round_trip(identity in arb_identity()) {
        let raw = encode_identity(&identity).expect("encode should succeed");
        let decoded = decode_identity(&raw).expect("decode should succeed");
        prop_assert_eq!(identity, decoded);
    }

    /// Random text never causes a panic when decoded as an identity.
    #[test]
    fn random_text_decode_no_panic(raw in ".{0,256}") {
        let _ = decode_identity(&raw);
    }

    /// Any task survives a JSON round-trip and uses camelCase keys.
    #[test]
    fn task_json_round_trip(task in arb_task()) {
        let json = serde_json::to_string(&task).expect("serialize should succeed");
        prop_assert!(json.contains("\"assignedTo\""));
        prop_assert!(json.contains("\"dueDate\""));
        let decoded: Task = serde_json::from_str(&json).expect("deserialize should succeed");
        prop_assert_eq!(task, decoded);
    }

    /// Overdue means incomplete and due strictly before now.
    #[test]
    fn overdue_definition(task in arb_task(), now in arb_instant()) {
        let expected = task.status != TaskStatus::Complete && task.due_instant() < now;
        prop_assert_eq!(task.is_overdue(now), expected);
    }

    /// Status and priority labels parse back to themselves.
    #[test]
    fn labels_parse_back(status in arb_status(), priority in arb_priority()) {
        prop_assert_eq!(status.label().parse::<TaskStatus>().expect("status label"), status);
        prop_assert_eq!(priority.label().parse::<TaskPriority>().expect("priority label"), priority);
    }
}
