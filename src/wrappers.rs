//! Wrappers that change how missing, `null` or recursive values are handled.

use crate::issue::{IssueKind, Message};
use crate::schema::{Node, Schema};
use crate::validate::{Context, Outcome};
use crate::Value;
use std::any::TypeId;
use std::borrow::Cow;
use std::collections::HashMap;
use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};
use tracing::trace;

#[inline]
pub(crate) fn optional(inner: &Schema, input: Option<&Value>, ctx: &mut Context<'_>) -> Outcome {
    match input {
        None => Outcome::Valid,
        Some(_) => inner.run(input, ctx),
    }
}

#[inline]
pub(crate) fn nullable(inner: &Schema, input: Option<&Value>, ctx: &mut Context<'_>) -> Outcome {
    match input {
        Some(Value::Null) => Outcome::Valid,
        _ => inner.run(input, ctx),
    }
}

#[inline]
pub(crate) fn nullish(inner: &Schema, input: Option<&Value>, ctx: &mut Context<'_>) -> Outcome {
    match input {
        None | Some(Value::Null) => Outcome::Valid,
        _ => inner.run(input, ctx),
    }
}

/// A missing input is replaced by the fallback, which still goes through
/// `inner` so a default can be coerced or rejected like any other value.
pub(crate) fn default(
    inner: &Schema,
    fallback: &Value,
    input: Option<&Value>,
    ctx: &mut Context<'_>,
) -> Outcome {
    match input {
        None => match inner.run(Some(fallback), ctx) {
            Outcome::Valid => Outcome::Coerced(fallback.clone()),
            other => other,
        },
        Some(_) => inner.run(input, ctx),
    }
}

/// Nested `lazy` frames allowed on one value before the chain counts as a loop.
const MAX_LAZY_FRAMES_PER_VALUE: usize = 64;

/// Resolutions of resolvers that capture nothing, keyed by resolver type.
static SHARED: OnceLock<Mutex<HashMap<TypeId, Schema>>> = OnceLock::new();

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A resolver without captures always builds the same schema, so every
/// `lazy(tree)` node in a graph can point at one resolution instead of each
/// building another level.
fn shared_resolution(id: TypeId, resolver: &(dyn Fn() -> Schema + Send + Sync)) -> Schema {
    let shared = SHARED.get_or_init(Mutex::default);
    let cached = lock(shared).get(&id).cloned();
    if let Some(schema) = cached {
        return schema;
    }
    trace!("resolving shared lazy schema");
    let schema = resolver();
    lock(shared).entry(id).or_insert(schema).clone()
}

#[derive(Clone)]
enum Target {
    Deferred {
        resolver: Arc<dyn Fn() -> Schema + Send + Sync>,
        shared: Option<TypeId>,
        resolved: OnceLock<Schema>,
    },
    /// The outer handle of a `recursive` schema; keeps the body alive.
    Root(Schema),
    /// The self-reference handed to a `recursive` builder.
    Knot(Arc<OnceLock<Weak<Node>>>),
}

/// A schema reached through one level of indirection.
///
/// The node's own address identifies it in the recursion guard.
#[derive(Clone)]
pub(crate) struct LazyShape {
    target: Target,
}

impl LazyShape {
    pub(crate) fn new<F>(resolver: F) -> Self
    where
        F: Fn() -> Schema + Send + Sync + 'static,
    {
        let shared = (mem::size_of::<F>() == 0).then(TypeId::of::<F>);
        LazyShape {
            target: Target::Deferred {
                resolver: Arc::new(resolver),
                shared,
                resolved: OnceLock::new(),
            },
        }
    }

    pub(crate) fn root(body: Schema) -> Self {
        LazyShape {
            target: Target::Root(body),
        }
    }

    pub(crate) fn knot(cell: Arc<OnceLock<Weak<Node>>>) -> Self {
        LazyShape {
            target: Target::Knot(cell),
        }
    }

    /// `None` for a self-reference whose schema is still being built or
    /// has been dropped.
    pub(crate) fn resolve(&self) -> Option<Cow<'_, Schema>> {
        match &self.target {
            Target::Deferred {
                resolver,
                shared,
                resolved,
            } => Some(Cow::Borrowed(resolved.get_or_init(|| match shared {
                Some(id) => shared_resolution(*id, resolver.as_ref()),
                None => {
                    trace!("resolving lazy schema");
                    (resolver.as_ref())()
                }
            }))),
            Target::Root(body) => Some(Cow::Borrowed(body)),
            Target::Knot(cell) => cell.get().and_then(Schema::upgrade).map(Cow::Owned),
        }
    }

    fn id(&self) -> usize {
        self as *const LazyShape as usize
    }

    pub(crate) fn validate(
        &self,
        message: Option<&Message>,
        input: Option<&Value>,
        ctx: &mut Context<'_>,
    ) -> Outcome {
        let Some(target) = self.resolve() else {
            return Outcome::invalid(ctx.issue(
                IssueKind::Schema,
                "lazy",
                input,
                Some("defined schema".to_string()),
                message,
            ));
        };
        if !ctx.enter_lazy(input, self.id(), MAX_LAZY_FRAMES_PER_VALUE) {
            return Outcome::invalid(ctx.issue(
                IssueKind::Schema,
                "lazy",
                input,
                Some("finite recursion".to_string()),
                message,
            ));
        }
        let outcome = target.run(input, ctx);
        ctx.exit_lazy();
        outcome
    }
}
