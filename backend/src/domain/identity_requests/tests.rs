//! Identity request validation and handler behaviour.

use std::collections::BTreeSet;

use mockall::predicate::eq;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::MockIdentityStore;
use crate::domain::validation::validate_with;
use crate::domain::{
    CurrentUser, Dispatcher, ErrorCode, MockUserContext, Principal, UserContextError, UserId,
};

#[fixture]
fn member() -> IdentityUser {
    IdentityUser {
        id: UserId::random(),
        email: "cook@restaurants.test".to_owned(),
        birth_date: None,
        nationality: None,
        roles: BTreeSet::new(),
    }
}

fn anonymous_context() -> MockUserContext {
    let mut context = MockUserContext::new();
    context
        .expect_current()
        .returning(|| Ok(Principal::Anonymous));
    context
}

fn caller_context(id: UserId) -> MockUserContext {
    let mut context = MockUserContext::new();
    context.expect_current().returning(move || {
        Ok(Principal::Authenticated(CurrentUser::new(
            id,
            "cook@restaurants.test",
            Vec::<RoleName>::new(),
        )))
    });
    context
}

fn dispatcher(store: MockIdentityStore, context: MockUserContext) -> Dispatcher {
    IdentityHandlers::new(Arc::new(store), Arc::new(context))
        .register(Dispatcher::builder())
        .build()
        .expect("identity wiring")
}

fn assign(email: &str, role: &str) -> AssignRole {
    AssignRole {
        user_email: email.to_owned(),
        role_name: role.to_owned(),
    }
}

#[rstest]
#[case("", "Admin", &["userEmail"])]
#[case("not-an-email", "", &["userEmail", "roleName"])]
#[case("cook@restaurants.test", "Owner", &[])]
fn role_requests_validate_target(
    #[case] email: &str,
    #[case] role: &str,
    #[case] expected: &[&str],
) {
    let errors = validate_with(&AssignRoleValidator, &assign(email, role));
    let fields: Vec<_> = errors.iter().map(|error| error.field.as_str()).collect();
    assert_eq!(fields, expected);
}

#[rstest]
#[case(None, true)]
#[case(Some("P"), false)]
#[case(Some("PL"), true)]
fn nationality_bounds(#[case] nationality: Option<&str>, #[case] ok: bool) {
    let request = UpdateCurrentUserDetails {
        birth_date: None,
        nationality: nationality.map(str::to_owned),
    };
    assert_eq!(
        validate_with(&UpdateCurrentUserDetailsValidator, &request).is_empty(),
        ok
    );
}

#[rstest]
#[tokio::test]
async fn assign_role_resolves_user_by_email(member: IdentityUser) {
    let user_id = member.id;
    let mut store = MockIdentityStore::new();
    store
        .expect_find_by_email()
        .withf(|email| email == "cook@restaurants.test")
        .times(1)
        .returning(move |_| Ok(Some(member.clone())));
    store
        .expect_add_to_role()
        .with(eq(user_id), eq(RoleName::new("Owner")))
        .times(1)
        .returning(|_, _| Ok(()));

    dispatcher(store, MockUserContext::new())
        .send(assign("cook@restaurants.test", "Owner"), &RequestContext::new())
        .await
        .expect("role assigned");
}

#[rstest]
#[tokio::test]
async fn unknown_user_is_not_found() {
    let mut store = MockIdentityStore::new();
    store.expect_find_by_email().returning(|_| Ok(None));
    store.expect_remove_from_role().never();

    let err = dispatcher(store, MockUserContext::new())
        .send(
            UnassignRole {
                user_email: "ghost@restaurants.test".to_owned(),
                role_name: "Owner".to_owned(),
            },
            &RequestContext::new(),
        )
        .await
        .expect_err("missing user");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[case(IdentityStoreError::role_not_found("Chef"))]
#[case(IdentityStoreError::already_in_role("Owner"))]
#[tokio::test]
async fn role_failures_are_invalid_requests(
    member: IdentityUser,
    #[case] failure: IdentityStoreError,
) {
    let mut store = MockIdentityStore::new();
    store
        .expect_find_by_email()
        .returning(move |_| Ok(Some(member.clone())));
    store
        .expect_add_to_role()
        .returning(move |_, _| Err(failure.clone()));

    let err = dispatcher(store, MockUserContext::new())
        .send(assign("cook@restaurants.test", "Owner"), &RequestContext::new())
        .await
        .expect_err("role failure");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn anonymous_caller_cannot_update_details() {
    let mut store = MockIdentityStore::new();
    store.expect_update_details().never();

    let err = dispatcher(store, anonymous_context())
        .send(UpdateCurrentUserDetails::default(), &RequestContext::new())
        .await
        .expect_err("login required");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn missing_request_scope_is_internal() {
    let mut context = MockUserContext::new();
    context
        .expect_current()
        .returning(|| Err(UserContextError::NoRequestScope));

    let err = dispatcher(MockIdentityStore::new(), context)
        .send(UpdateCurrentUserDetails::default(), &RequestContext::new())
        .await
        .expect_err("wiring bug");
    assert_eq!(err.code(), ErrorCode::InternalError);
}

#[rstest]
#[tokio::test]
async fn details_are_written_for_the_caller() {
    let caller = UserId::random();
    let mut store = MockIdentityStore::new();
    store
        .expect_update_details()
        .withf(move |id, update| *id == caller && update.nationality.as_deref() == Some("PL"))
        .times(1)
        .returning(|_, _| Ok(UpdateOutcome::Updated));

    dispatcher(store, caller_context(caller))
        .send(
            UpdateCurrentUserDetails {
                birth_date: None,
                nationality: Some("PL".to_owned()),
            },
            &RequestContext::new(),
        )
        .await
        .expect("details updated");
}

#[rstest]
#[tokio::test]
async fn caller_missing_from_store_is_not_found() {
    let mut store = MockIdentityStore::new();
    store
        .expect_update_details()
        .returning(|_, _| Ok(UpdateOutcome::NotFound));

    let err = dispatcher(store, caller_context(UserId::random()))
        .send(UpdateCurrentUserDetails::default(), &RequestContext::new())
        .await
        .expect_err("stale session");
    assert_eq!(err.code(), ErrorCode::NotFound);
}
