//! One-field validation on top of a [`ValidationEngine`].

use futures::FutureExt;
use futures::future::{self, BoxFuture};
use serde_json::Value;

use super::{Descriptor, EngineError, Model, ValidateOptions, ValidationEngine};
use crate::error::{ConfigurationError, ValidationError};
use crate::rule::Rule;

/// Validate one field's value against its (already filtered) rules.
///
/// - A nameless field resolves at once with an empty model.
/// - An empty rule list resolves at once with `{name: value}`; the engine is
///   not called.
/// - Otherwise the engine runs with first-error-wins and a rejection carries
///   the first error's message.
///
/// The engine is invoked before this returns, so the returned future owns
/// everything it needs.
pub fn validate_field(
    engine: &dyn ValidationEngine,
    name: Option<&str>,
    value: Value,
    rules: Vec<Rule>,
) -> BoxFuture<'static, Result<Model, ValidationError>> {
    let Some(name) = name else {
        return future::ready(Ok(Model::new())).boxed();
    };

    let mut model = Model::new();
    model.insert(name.to_string(), value);

    if rules.is_empty() {
        return future::ready(Ok(model)).boxed();
    }

    let mut descriptor = Descriptor::new();
    descriptor.insert(name.to_string(), rules);

    let pending = engine.validate(descriptor, model.clone(), ValidateOptions { first: true });
    let field = name.to_string();

    async move {
        match pending.await {
            Ok(()) => Ok(model),
            Err(EngineError::Rejected(errors)) => Err(ValidationError::rejected(field, errors)),
            Err(EngineError::Malformed(reason)) => Err(ValidationError::Configuration {
                field,
                source: ConfigurationError::MalformedRule(reason),
            }),
            Err(EngineError::Abandoned) => Err(ValidationError::Abandoned { field }),
        }
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;
    use crate::engine::{CallbackEngine, RuleError};

    fn counting_engine(calls: Arc<AtomicUsize>, fail: bool) -> CallbackEngine {
        CallbackEngine::new(move |descriptor, model, options, done| {
            calls.fetch_add(1, Ordering::SeqCst);
            assert!(options.first);
            assert_eq!(descriptor.len(), 1);
            assert_eq!(model.len(), 1);
            if fail {
                done(Some(vec![
                    RuleError::new("age", "too small"),
                    RuleError::new("age", "not even"),
                ]));
            } else {
                done(None);
            }
        })
    }

    #[tokio::test]
    async fn test_nameless_field_resolves_empty() {
        let calls = Arc::new(AtomicUsize::new(0));
        let engine = counting_engine(calls.clone(), true);
        let model = validate_field(&engine, None, json!(1), vec![Rule::new().required()])
            .await
            .unwrap();
        assert!(model.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_rules_skips_engine() {
        let calls = Arc::new(AtomicUsize::new(0));
        let engine = counting_engine(calls.clone(), true);
        let model = validate_field(&engine, Some("age"), json!(1), Vec::new())
            .await
            .unwrap();
        assert_eq!(model.get("age"), Some(&json!(1)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_success_returns_model() {
        let calls = Arc::new(AtomicUsize::new(0));
        let engine = counting_engine(calls.clone(), false);
        let model = validate_field(&engine, Some("age"), json!(4), vec![Rule::new().min(1.0)])
            .await
            .unwrap();
        assert_eq!(model.get("age"), Some(&json!(4)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rejection_uses_first_message() {
        let calls = Arc::new(AtomicUsize::new(0));
        let engine = counting_engine(calls, true);
        let err = validate_field(&engine, Some("age"), json!(0), vec![Rule::new().min(1.0)])
            .await
            .unwrap_err();
        assert!(err.is_rejection());
        assert_eq!(err.field(), "age");
        assert_eq!(err.message(), "too small");
    }

    #[tokio::test]
    async fn test_dropped_completion_maps_to_abandoned() {
        let engine = CallbackEngine::new(|_, _, _, _done| {});
        let err = validate_field(&engine, Some("age"), json!(0), vec![Rule::new()])
            .await
            .unwrap_err();
        assert!(matches!(err, ValidationError::Abandoned { .. }));
    }

    struct MalformedEngine;

    impl ValidationEngine for MalformedEngine {
        fn validate(
            &self,
            _descriptor: Descriptor,
            _model: Model,
            _options: ValidateOptions,
        ) -> BoxFuture<'static, Result<(), EngineError>> {
            future::ready(Err(EngineError::Malformed("len on a boolean".into()))).boxed()
        }
    }

    #[tokio::test]
    async fn test_malformed_maps_to_configuration() {
        let err = validate_field(&MalformedEngine, Some("flag"), json!(true), vec![Rule::new()])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::Configuration {
                source: ConfigurationError::MalformedRule(_),
                ..
            }
        ));
    }
}
