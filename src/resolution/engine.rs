//! Request resolution engine.
//!
//! # Responsibilities
//! - Drive a synthetic request through match → select → bind, in order
//! - Convert selection and binding faults into typed outcomes
//! - Refuse non-action descriptors with a fatal error
//! - Present a blocking API over asynchronous pipeline stages
//!
//! # Design Decisions
//! - One pass per call: no retries, no re-entry into earlier stages
//! - No state survives a call; the adapter is borrowed, never stored
//! - A panicking selection or binding stage is reported as a fault

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use futures_util::FutureExt;
use serde_json::Value;
use tokio::runtime::Runtime;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::RuntimeConfig;
use crate::http::SyntheticRequest;
use crate::observability::metrics;
use crate::pipeline::{
    ActionDescriptor, BindingContext, BoundArguments, HandlerDescriptor, PipelineAdapter,
    PipelineFault, RouteLookup, ValidationState,
};
use crate::resolution::error::{ResolveError, ResolveResult};
use crate::resolution::outcome::{ResolvedOutcome, ResolvedRoute, UnresolvedReason};

/// Resolution state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStage {
    Start,
    RouteMatched,
    HandlerSelected,
    ArgumentsBound,
    Resolved,
    NoMatch,
    SelectionFaulted,
    BindingFaulted,
    NotApplicable,
}

impl ResolutionStage {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ResolutionStage::Resolved
                | ResolutionStage::NoMatch
                | ResolutionStage::SelectionFaulted
                | ResolutionStage::BindingFaulted
                | ResolutionStage::NotApplicable
        )
    }

    /// Whether `next` is a legal successor of this stage.
    pub fn can_advance_to(self, next: ResolutionStage) -> bool {
        use ResolutionStage::*;
        matches!(
            (self, next),
            (Start, RouteMatched | NoMatch)
                | (RouteMatched, HandlerSelected | NoMatch | SelectionFaulted)
                | (HandlerSelected, ArgumentsBound | NotApplicable | BindingFaulted)
                | (ArgumentsBound, Resolved)
        )
    }
}

fn transition(stage: &mut ResolutionStage, next: ResolutionStage) {
    debug_assert!(
        stage.can_advance_to(next),
        "illegal resolution transition {:?} -> {:?}",
        stage,
        next
    );
    tracing::debug!(from = ?*stage, to = ?next, "Resolution stage transition");
    *stage = next;
}

/// Blocking front end over [`resolve_async`].
///
/// Owns the runtime used to drive pipeline stages. Build one per test
/// fixture; calls share nothing else.
pub struct RouteResolver {
    runtime: Runtime,
}

impl RouteResolver {
    /// Resolver backed by a current-thread runtime.
    pub fn new() -> ResolveResult<Self> {
        Self::with_config(&RuntimeConfig::default())
    }

    pub fn with_config(config: &RuntimeConfig) -> ResolveResult<Self> {
        Ok(Self {
            runtime: config.build_runtime()?,
        })
    }

    /// Resolve a request, blocking until every stage has completed.
    ///
    /// Must not be called from within an async context; use
    /// [`resolve_async`] there instead.
    pub fn resolve<P>(
        &self,
        adapter: &P,
        request: &SyntheticRequest,
    ) -> ResolveResult<ResolvedOutcome>
    where
        P: PipelineAdapter + ?Sized,
    {
        self.runtime.block_on(resolve_async(adapter, request))
    }
}

/// Resolve a request against a pipeline adapter.
///
/// Returns an outcome for every data-driven result, including faults raised
/// by selection or binding. Only a non-action descriptor is returned as an
/// error.
pub async fn resolve_async<P>(
    adapter: &P,
    request: &SyntheticRequest,
) -> ResolveResult<ResolvedOutcome>
where
    P: PipelineAdapter + ?Sized,
{
    let resolution_id = Uuid::new_v4();
    let span = tracing::debug_span!(
        "resolve_route",
        %resolution_id,
        method = %request.method(),
        path = %request.path()
    );

    let started = Instant::now();
    let result = run_stages(adapter, request).instrument(span).await;

    let kind = match &result {
        Ok(outcome) => outcome.kind(),
        Err(ResolveError::NotApplicable { .. }) => UnresolvedReason::NotAHandlerAction.kind(),
        Err(ResolveError::Runtime(_)) => "error",
    };
    metrics::record_resolution(kind, started.elapsed());
    result
}

async fn run_stages<P>(adapter: &P, request: &SyntheticRequest) -> ResolveResult<ResolvedOutcome>
where
    P: PipelineAdapter + ?Sized,
{
    let mut stage = ResolutionStage::Start;

    let route = match adapter.match_route(request).await {
        RouteLookup::Matched(route) => route,
        RouteLookup::NoMatch => {
            transition(&mut stage, ResolutionStage::NoMatch);
            return Ok(ResolvedOutcome::Unresolved(UnresolvedReason::NoRouteMatch));
        }
    };
    transition(&mut stage, ResolutionStage::RouteMatched);

    let selected = AssertUnwindSafe(async { adapter.select_handler(request, &route).await })
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(panic_fault(payload)));
    let descriptor = match selected {
        Ok(Some(descriptor)) => descriptor,
        Ok(None) => {
            transition(&mut stage, ResolutionStage::NoMatch);
            return Ok(ResolvedOutcome::Unresolved(UnresolvedReason::NoRouteMatch));
        }
        Err(fault) => {
            transition(&mut stage, ResolutionStage::SelectionFaulted);
            tracing::debug!(fault = %fault, "Handler selection failed");
            return Ok(ResolvedOutcome::Unresolved(UnresolvedReason::SelectionFault(
                fault.into_message(),
            )));
        }
    };
    transition(&mut stage, ResolutionStage::HandlerSelected);

    let action = match descriptor {
        HandlerDescriptor::Action(action) => action,
        other => {
            transition(&mut stage, ResolutionStage::NotApplicable);
            tracing::error!(descriptor = %other, "Selected handler is not an application action");
            return Err(ResolveError::NotApplicable { descriptor: other });
        }
    };

    let mut validation = ValidationState::new();
    let ctx = BindingContext {
        request,
        route: &route,
        action: &action,
    };
    let bound = AssertUnwindSafe(async { adapter.bind_arguments(ctx, &mut validation).await })
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(panic_fault(payload)));
    let arguments = match bound {
        Ok(arguments) => normalize_arguments(&action, arguments),
        Err(fault) => {
            transition(&mut stage, ResolutionStage::BindingFaulted);
            tracing::debug!(fault = %fault, "Argument binding failed");
            return Ok(ResolvedOutcome::Unresolved(UnresolvedReason::BindingFault(
                fault.into_message(),
            )));
        }
    };
    transition(&mut stage, ResolutionStage::ArgumentsBound);

    tracing::debug!(
        group = %action.group_name,
        handler = %action.handler_name,
        arguments = arguments.len(),
        invalid_fields = validation.len(),
        "Request resolved"
    );
    transition(&mut stage, ResolutionStage::Resolved);

    Ok(ResolvedOutcome::Resolved(ResolvedRoute {
        handler_type: action.handler_type,
        handler_group_name: action.group_name,
        handler_name: action.handler_name,
        bound_arguments: arguments,
        route_values: route.values,
        validation_state: validation,
    }))
}

/// Key the bound arguments by exactly the declared parameter names.
///
/// Declared parameters the binder left out are bound as null; keys the
/// handler does not declare are dropped.
fn normalize_arguments(action: &ActionDescriptor, mut bound: BoundArguments) -> BoundArguments {
    let mut arguments = BoundArguments::new();
    for name in action.parameter_names() {
        let value = bound.remove(name).unwrap_or(Value::Null);
        arguments.insert(name.to_string(), value);
    }
    for extra in bound.keys() {
        tracing::warn!(
            parameter = %extra,
            handler = %action.handler_name,
            "Dropping bound argument the handler does not declare"
        );
    }
    arguments
}

fn panic_fault(payload: Box<dyn Any + Send>) -> PipelineFault {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "pipeline stage panicked".to_string()
    };
    PipelineFault::new(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{
        ArgumentBinder, BindingSource, HandlerSelector, ParameterDescriptor, ParameterKind,
        RouteData, RouteMatcher,
    };
    use futures_util::future::{self, BoxFuture};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted adapter: each stage returns a canned result.
    struct Scripted {
        lookup: RouteLookup,
        selection: Result<Option<HandlerDescriptor>, PipelineFault>,
        binding: Result<BoundArguments, PipelineFault>,
        validation_errors: Vec<(&'static str, &'static str)>,
        bind_calls: AtomicUsize,
    }

    impl Scripted {
        fn resolving(action: ActionDescriptor, args: BoundArguments) -> Self {
            Self {
                lookup: RouteLookup::Matched(RouteData::new(
                    [("id".to_string(), "42".to_string())].into_iter().collect(),
                )),
                selection: Ok(Some(HandlerDescriptor::Action(action))),
                binding: Ok(args),
                validation_errors: Vec::new(),
                bind_calls: AtomicUsize::new(0),
            }
        }
    }

    impl RouteMatcher for Scripted {
        fn match_route<'a>(&'a self, _: &'a SyntheticRequest) -> BoxFuture<'a, RouteLookup> {
            Box::pin(future::ready(self.lookup.clone()))
        }
    }

    impl HandlerSelector for Scripted {
        fn select_handler<'a>(
            &'a self,
            _: &'a SyntheticRequest,
            _: &'a RouteData,
        ) -> BoxFuture<'a, Result<Option<HandlerDescriptor>, PipelineFault>> {
            Box::pin(future::ready(self.selection.clone()))
        }
    }

    impl ArgumentBinder for Scripted {
        fn bind_arguments<'a>(
            &'a self,
            _: BindingContext<'a>,
            validation: &'a mut ValidationState,
        ) -> BoxFuture<'a, Result<BoundArguments, PipelineFault>> {
            self.bind_calls.fetch_add(1, Ordering::SeqCst);
            for (field, message) in &self.validation_errors {
                validation.add_error(*field, *message);
            }
            Box::pin(future::ready(self.binding.clone()))
        }
    }

    fn get_by_id() -> ActionDescriptor {
        ActionDescriptor::new("app::ItemsHandler", "Items", "GetById").with_parameter(
            ParameterDescriptor::new("id", BindingSource::Route, ParameterKind::Int).required(),
        )
    }

    fn request() -> SyntheticRequest {
        SyntheticRequest::get("/items/42").unwrap()
    }

    #[test]
    fn test_stage_transitions() {
        use ResolutionStage::*;
        assert!(Start.can_advance_to(RouteMatched));
        assert!(RouteMatched.can_advance_to(NoMatch));
        assert!(HandlerSelected.can_advance_to(NotApplicable));
        assert!(!RouteMatched.can_advance_to(Start));
        assert!(!Start.can_advance_to(Resolved));
        assert!(!Resolved.can_advance_to(RouteMatched));
        assert!(BindingFaulted.is_terminal());
        assert!(!ArgumentsBound.is_terminal());
    }

    #[tokio::test]
    async fn test_resolves_and_keeps_route_values() {
        let adapter = Scripted::resolving(
            get_by_id(),
            [("id".to_string(), json!(42))].into_iter().collect(),
        );
        let outcome = resolve_async(&adapter, &request()).await.unwrap();
        let route = outcome.resolved().unwrap();

        assert_eq!(route.handler_name, "GetById");
        assert_eq!(route.handler_group_name, "Items");
        assert_eq!(route.argument("id"), Some(&json!(42)));
        assert_eq!(route.route_value("id"), Some("42"));
        assert!(route.validation_state.is_valid());
    }

    #[tokio::test]
    async fn test_no_match_from_router() {
        let mut adapter = Scripted::resolving(get_by_id(), BoundArguments::new());
        adapter.lookup = RouteLookup::NoMatch;

        let outcome = resolve_async(&adapter, &request()).await.unwrap();
        assert_eq!(outcome, ResolvedOutcome::Unresolved(UnresolvedReason::NoRouteMatch));
        assert_eq!(adapter.bind_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_handler_is_no_match() {
        let mut adapter = Scripted::resolving(get_by_id(), BoundArguments::new());
        adapter.selection = Ok(None);

        let outcome = resolve_async(&adapter, &request()).await.unwrap();
        assert_eq!(outcome, ResolvedOutcome::Unresolved(UnresolvedReason::NoRouteMatch));
    }

    #[tokio::test]
    async fn test_selection_fault_skips_binding() {
        let mut adapter = Scripted::resolving(get_by_id(), BoundArguments::new());
        adapter.selection = Err(PipelineFault::new("ambiguous match"));

        let outcome = resolve_async(&adapter, &request()).await.unwrap();
        assert_eq!(
            outcome,
            ResolvedOutcome::Unresolved(UnresolvedReason::SelectionFault("ambiguous match".into()))
        );
        assert_eq!(adapter.bind_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_binding_fault() {
        let mut adapter = Scripted::resolving(get_by_id(), BoundArguments::new());
        adapter.binding = Err(PipelineFault::new("malformed body"));

        let outcome = resolve_async(&adapter, &request()).await.unwrap();
        assert_eq!(
            outcome,
            ResolvedOutcome::Unresolved(UnresolvedReason::BindingFault("malformed body".into()))
        );
        assert_eq!(adapter.bind_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_non_action_is_fatal() {
        let mut adapter = Scripted::resolving(get_by_id(), BoundArguments::new());
        adapter.selection = Ok(Some(HandlerDescriptor::Redirect {
            location: "/login".into(),
        }));

        let err = resolve_async(&adapter, &request()).await.unwrap_err();
        assert!(matches!(
            err,
            ResolveError::NotApplicable {
                descriptor: HandlerDescriptor::Redirect { .. }
            }
        ));
        assert_eq!(adapter.bind_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_arguments_keyed_by_declared_parameters() {
        let action = get_by_id().with_parameter(ParameterDescriptor::new(
            "verbose",
            BindingSource::Query,
            ParameterKind::Bool,
        ));
        let bound = [
            ("id".to_string(), json!(42)),
            ("undeclared".to_string(), json!("x")),
        ]
        .into_iter()
        .collect();
        let adapter = Scripted::resolving(action, bound);

        let outcome = resolve_async(&adapter, &request()).await.unwrap();
        let route = outcome.resolved().unwrap();
        assert_eq!(
            route.bound_arguments.keys().collect::<Vec<_>>(),
            ["id", "verbose"]
        );
        assert_eq!(route.argument("verbose"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn test_validation_side_channel_is_read_back() {
        let mut adapter = Scripted::resolving(get_by_id(), BoundArguments::new());
        adapter.validation_errors = vec![("id", "required")];

        let outcome = resolve_async(&adapter, &request()).await.unwrap();
        let route = outcome.resolved().unwrap();
        assert_eq!(route.validation_state.errors_for("id"), ["required"]);
    }

    #[test]
    fn test_blocking_resolve_is_repeatable() {
        let resolver = RouteResolver::new().unwrap();
        let adapter = Scripted::resolving(
            get_by_id(),
            [("id".to_string(), json!(42))].into_iter().collect(),
        );

        let first = resolver.resolve(&adapter, &request()).unwrap();
        let second = resolver.resolve(&adapter, &request()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_resolve_through_trait_object() {
        let resolver = RouteResolver::new().unwrap();
        let adapter = Scripted::resolving(get_by_id(), BoundArguments::new());
        let dynamic: &dyn PipelineAdapter = &adapter;

        let outcome = resolver.resolve(dynamic, &request()).unwrap();
        assert!(outcome.is_resolved());
    }

    struct PanickingBinder;

    impl RouteMatcher for PanickingBinder {
        fn match_route<'a>(&'a self, _: &'a SyntheticRequest) -> BoxFuture<'a, RouteLookup> {
            Box::pin(future::ready(RouteLookup::Matched(RouteData::default())))
        }
    }

    impl HandlerSelector for PanickingBinder {
        fn select_handler<'a>(
            &'a self,
            _: &'a SyntheticRequest,
            _: &'a RouteData,
        ) -> BoxFuture<'a, Result<Option<HandlerDescriptor>, PipelineFault>> {
            Box::pin(future::ready(Ok(Some(HandlerDescriptor::Action(get_by_id())))))
        }
    }

    impl ArgumentBinder for PanickingBinder {
        fn bind_arguments<'a>(
            &'a self,
            _: BindingContext<'a>,
            _: &'a mut ValidationState,
        ) -> BoxFuture<'a, Result<BoundArguments, PipelineFault>> {
            panic!("binder exploded")
        }
    }

    #[tokio::test]
    async fn test_panicking_stage_becomes_fault() {
        let outcome = resolve_async(&PanickingBinder, &request()).await.unwrap();
        assert_eq!(
            outcome,
            ResolvedOutcome::Unresolved(UnresolvedReason::BindingFault("binder exploded".into()))
        );
    }

    #[derive(Default)]
    struct PanickingSelector {
        bind_calls: AtomicUsize,
    }

    impl RouteMatcher for PanickingSelector {
        fn match_route<'a>(&'a self, _: &'a SyntheticRequest) -> BoxFuture<'a, RouteLookup> {
            Box::pin(future::ready(RouteLookup::Matched(RouteData::default())))
        }
    }

    impl HandlerSelector for PanickingSelector {
        fn select_handler<'a>(
            &'a self,
            _: &'a SyntheticRequest,
            route: &'a RouteData,
        ) -> BoxFuture<'a, Result<Option<HandlerDescriptor>, PipelineFault>> {
            Box::pin(async move {
                match route.route_name.as_deref() {
                    Some(name) => Ok::<_, PipelineFault>(Some(HandlerDescriptor::System {
                        name: name.to_string(),
                    })),
                    None => panic!("no handler table for unnamed route"),
                }
            })
        }
    }

    impl ArgumentBinder for PanickingSelector {
        fn bind_arguments<'a>(
            &'a self,
            _: BindingContext<'a>,
            _: &'a mut ValidationState,
        ) -> BoxFuture<'a, Result<BoundArguments, PipelineFault>> {
            self.bind_calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(future::ready(Ok(BoundArguments::new())))
        }
    }

    #[tokio::test]
    async fn test_panicking_selector_becomes_selection_fault() {
        let adapter = PanickingSelector::default();
        let outcome = resolve_async(&adapter, &request()).await.unwrap();
        assert_eq!(
            outcome,
            ResolvedOutcome::Unresolved(UnresolvedReason::SelectionFault(
                "no handler table for unnamed route".into()
            ))
        );
        assert_eq!(adapter.bind_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unusable_runtime_config_is_an_error() {
        let config = RuntimeConfig {
            flavor: crate::config::RuntimeFlavor::MultiThread,
            worker_threads: 0,
            ..RuntimeConfig::default()
        };
        let err = RouteResolver::with_config(&config).err().unwrap();
        assert!(matches!(err, ResolveError::Runtime(_)));
        assert_eq!(err.reason(), None);
    }
}
