//! Adapter for engines that report through a completion callback.

use std::sync::Arc;

use futures::channel::oneshot;
use futures::future::BoxFuture;

use super::{Descriptor, EngineError, Model, RuleError, ValidateOptions, ValidationEngine};

/// Completion callback handed to a callback-style engine.
///
/// `None` or an empty list means the model passed.
pub type Completion = Box<dyn FnOnce(Option<Vec<RuleError>>) + Send>;

type CallbackFn = dyn Fn(Descriptor, Model, ValidateOptions, Completion) + Send + Sync;

/// Wraps a callback-style engine so it settles through a future.
///
/// The completion is `FnOnce`, so it can only settle once. If the engine drops
/// it without calling it, the future resolves to [`EngineError::Abandoned`].
///
/// # Example
///
/// ```
/// use formx::engine::{CallbackEngine, RuleError};
///
/// let engine = CallbackEngine::new(|_descriptor, model, _options, done| {
///     if model.values().any(|v| v.as_str() == Some("")) {
///         done(Some(vec![RuleError::new("name", "empty")]));
///     } else {
///         done(None);
///     }
/// });
/// # let _ = engine;
/// ```
#[derive(Clone)]
pub struct CallbackEngine {
    run: Arc<CallbackFn>,
}

impl CallbackEngine {
    pub fn new<F>(run: F) -> Self
    where
        F: Fn(Descriptor, Model, ValidateOptions, Completion) + Send + Sync + 'static,
    {
        Self { run: Arc::new(run) }
    }
}

impl ValidationEngine for CallbackEngine {
    fn validate(
        &self,
        descriptor: Descriptor,
        model: Model,
        options: ValidateOptions,
    ) -> BoxFuture<'static, Result<(), EngineError>> {
        let (tx, rx) = oneshot::channel::<Option<Vec<RuleError>>>();
        let done: Completion = Box::new(move |errors| {
            // The receiver is gone only if the caller stopped waiting.
            let _ = tx.send(errors);
        });

        (self.run)(descriptor, model, options, done);

        Box::pin(async move {
            match rx.await {
                Ok(None) => Ok(()),
                Ok(Some(errors)) if errors.is_empty() => Ok(()),
                Ok(Some(errors)) => Err(EngineError::Rejected(errors)),
                Err(oneshot::Canceled) => Err(EngineError::Abandoned),
            }
        })
    }
}
