//! Dispatcher registration and send-path behaviour.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ErrorCode;
use crate::domain::validation::rules;

struct Greet {
    name: String,
}

impl Request for Greet {
    type Response = String;
    const NAME: &'static str = "Greet";
}

struct Stall;

impl Request for Stall {
    type Response = ();
    const NAME: &'static str = "Stall";
}

#[derive(Clone, Default)]
struct GreetHandler {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl RequestHandler<Greet> for GreetHandler {
    async fn handle(&self, request: Greet, _ctx: &RequestContext) -> Result<String, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("hello {}", request.name))
    }
}

struct StallHandler;

#[async_trait]
impl RequestHandler<Stall> for StallHandler {
    async fn handle(&self, _request: Stall, _ctx: &RequestContext) -> Result<(), Error> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

struct Watch;

impl Request for Watch {
    type Response = ();
    const NAME: &'static str = "Watch";
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

struct WatchHandler {
    dropped: Arc<AtomicBool>,
}

#[async_trait]
impl RequestHandler<Watch> for WatchHandler {
    async fn handle(&self, _request: Watch, _ctx: &RequestContext) -> Result<(), Error> {
        let _flag = DropFlag(Arc::clone(&self.dropped));
        std::future::pending::<()>().await;
        Ok(())
    }
}

struct NameRules;

impl Validator<Greet> for NameRules {
    fn validate(&self, request: &Greet, errors: &mut ValidationErrors) {
        rules::check(errors, "name", [rules::length(&request.name, 3, 10)]);
    }
}

struct NoDigits;

impl Validator<Greet> for NoDigits {
    fn validate(&self, request: &Greet, errors: &mut ValidationErrors) {
        if request.name.chars().any(|c| c.is_ascii_digit()) {
            errors.push("name", "must not contain digits");
        }
    }
}

#[fixture]
fn handler() -> GreetHandler {
    GreetHandler::default()
}

fn greet(name: &str) -> Greet {
    Greet {
        name: name.to_owned(),
    }
}

#[rstest]
#[tokio::test]
async fn routes_to_the_registered_handler(handler: GreetHandler) {
    let dispatcher = Dispatcher::builder()
        .handler::<Greet, _>(handler)
        .build()
        .expect("valid registration");

    let reply = dispatcher
        .send(greet("Ada"), &RequestContext::new())
        .await
        .expect("handler succeeds");
    assert_eq!(reply, "hello Ada");
}

#[rstest]
fn duplicate_handlers_are_rejected(handler: GreetHandler) {
    let result = Dispatcher::builder()
        .handler::<Greet, _>(handler.clone())
        .handler::<Greet, _>(handler)
        .build();
    assert!(matches!(
        result,
        Err(DispatcherConfigError::DuplicateHandler { request: "Greet" })
    ));
}

#[rstest]
fn expected_request_without_handler_is_rejected(handler: GreetHandler) {
    let result = Dispatcher::builder()
        .handler::<Greet, _>(handler)
        .expect::<Greet>()
        .expect::<Stall>()
        .build();
    assert!(matches!(
        result,
        Err(DispatcherConfigError::MissingHandler { request: "Stall" })
    ));
}

#[rstest]
fn validator_without_handler_is_rejected() {
    let result = Dispatcher::builder().validator::<Greet, _>(NameRules).build();
    assert!(matches!(
        result,
        Err(DispatcherConfigError::ValidatorWithoutHandler { request: "Greet" })
    ));
}

#[rstest]
#[tokio::test]
async fn validation_failure_never_reaches_the_handler(handler: GreetHandler) {
    let calls = Arc::clone(&handler.calls);
    let dispatcher = Dispatcher::builder()
        .handler::<Greet, _>(handler)
        .validator::<Greet, _>(NameRules)
        .build()
        .expect("valid registration");

    let error = dispatcher
        .send(greet("Al"), &RequestContext::new())
        .await
        .expect_err("name too short");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[rstest]
#[tokio::test]
async fn findings_from_every_validator_are_merged(handler: GreetHandler) {
    let dispatcher = Dispatcher::builder()
        .validator::<Greet, _>(NameRules)
        .validator::<Greet, _>(NoDigits)
        .handler::<Greet, _>(handler)
        .build()
        .expect("valid registration");

    let error = dispatcher
        .send(greet("A1"), &RequestContext::new())
        .await
        .expect_err("two violations");

    let errors = error
        .details()
        .and_then(|details| details.get("errors"))
        .and_then(serde_json::Value::as_array)
        .expect("errors listed");
    assert_eq!(errors.len(), 2);
}

#[rstest]
#[tokio::test]
async fn unregistered_request_is_an_internal_error(handler: GreetHandler) {
    let dispatcher = Dispatcher::builder()
        .handler::<Greet, _>(handler)
        .build()
        .expect("valid registration");

    assert!(!dispatcher.handles::<Stall>());
    let error = dispatcher
        .send(Stall, &RequestContext::new())
        .await
        .expect_err("no route");
    assert_eq!(error.code(), ErrorCode::InternalError);
}

#[tokio::test]
async fn cancellation_abandons_the_handler() {
    let dispatcher = Dispatcher::builder()
        .handler::<Stall, _>(StallHandler)
        .build()
        .expect("valid registration");
    let token = CancellationToken::new();
    let ctx = RequestContext::with_cancellation(token.clone());

    let canceller = async {
        tokio::task::yield_now().await;
        token.cancel();
    };
    let (result, ()) = tokio::join!(dispatcher.send(Stall, &ctx), canceller);

    let error = result.expect_err("cancelled");
    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    assert!(ctx.is_cancelled());
}

#[tokio::test]
async fn already_cancelled_context_short_circuits() {
    let handler = GreetHandler::default();
    let calls = Arc::clone(&handler.calls);
    let dispatcher = Dispatcher::builder()
        .handler::<Greet, _>(handler)
        .build()
        .expect("valid registration");
    let token = CancellationToken::new();
    token.cancel();

    let error = dispatcher
        .send(greet("Ada"), &RequestContext::with_cancellation(token))
        .await
        .expect_err("cancelled before dispatch");
    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn dropping_the_send_future_drops_the_handler() {
    let dropped = Arc::new(AtomicBool::new(false));
    let dispatcher = Dispatcher::builder()
        .handler::<Watch, _>(WatchHandler {
            dropped: Arc::clone(&dropped),
        })
        .build()
        .expect("watch wiring");

    let outcome = tokio::time::timeout(
        Duration::from_millis(20),
        dispatcher.send(Watch, &RequestContext::new()),
    )
    .await;
    assert!(outcome.is_err(), "handler never completes");
    assert!(dropped.load(Ordering::SeqCst));
}
