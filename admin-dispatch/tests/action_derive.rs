//! Tests for #[derive(Action)] and category inference

use admin_dispatch::{Action, ActionCategory};

#[derive(admin_dispatch::Action, Clone, Debug, PartialEq)]
#[action(infer_categories)]
enum TestAction {
    UsersFetch(u32),
    UsersAdminFetch(u32),
    RolesFetch,
    UserFetch(String),
    UserCreate { login: String },
    UserDelete(String),
    UserManagementReset,
    DidStart(u64),
    DidFail(u64, String),
    #[action(category = "users")]
    Reload,
    #[action(skip_category)]
    UserUpdate(String),
    Tick,
}

#[test]
fn test_action_name() {
    assert_eq!(TestAction::UsersFetch(0).name(), "UsersFetch");
    assert_eq!(TestAction::RolesFetch.name(), "RolesFetch");
    assert_eq!(
        TestAction::UserCreate {
            login: "alice".into()
        }
        .name(),
        "UserCreate"
    );
    assert_eq!(TestAction::DidFail(1, "boom".into()).name(), "DidFail");
}

#[test]
fn test_inferred_categories() {
    assert_eq!(TestAction::UsersFetch(0).category(), Some("users"));
    assert_eq!(TestAction::UsersAdminFetch(0).category(), Some("users_admin"));
    assert_eq!(TestAction::RolesFetch.category(), Some("roles"));
    assert_eq!(TestAction::UserFetch("a".into()).category(), Some("user"));
    assert_eq!(TestAction::UserDelete("a".into()).category(), Some("user"));
    assert_eq!(
        TestAction::UserManagementReset.category(),
        Some("user_management")
    );
    assert_eq!(TestAction::DidStart(1).category(), Some("async_result"));
    assert_eq!(TestAction::Tick.category(), None);
}

#[test]
fn test_category_overrides() {
    assert_eq!(TestAction::Reload.category(), Some("users"));
    assert_eq!(TestAction::UserUpdate("a".into()).category(), None);
    assert_eq!(
        TestAction::UserUpdate("a".into()).category_enum(),
        TestActionCategory::Uncategorized
    );
}

#[test]
fn test_category_enum_and_predicates() {
    assert_eq!(
        TestAction::UsersAdminFetch(1).category_enum(),
        TestActionCategory::UsersAdmin
    );
    assert_eq!(TestActionCategory::UsersAdmin.name(), "users_admin");
    assert!(TestActionCategory::all().contains(&TestActionCategory::AsyncResult));

    assert!(TestAction::UsersFetch(0).is_users());
    assert!(TestAction::Reload.is_users());
    assert!(!TestAction::RolesFetch.is_users());
    assert!(TestAction::DidFail(1, String::new()).is_async_result());
}

#[test]
fn test_action_category_trait() {
    fn category_of<A: ActionCategory>(action: &A) -> Option<&'static str> {
        ActionCategory::category(action)
    }

    assert_eq!(category_of(&TestAction::RolesFetch), Some("roles"));
    assert_eq!(category_of(&TestAction::Tick), None);
}
