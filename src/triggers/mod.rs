//! Trigger system for event-driven card effects.
//!
//! The turn controller announces what happened by firing a trigger type with
//! an event context. Cards that registered for that trigger type react.
//!
//! ## Key Components
//!
//! - [`TriggerType`]: the closed vocabulary of trigger tags
//! - [`TriggerEvent`] / [`EventContext`]: what happened, and to whom
//! - [`ListenerCondition`]: custom eligibility predicate of a listener
//! - [`TriggerDispatcher`]: listener registry, `fire` and `manual_trigger`
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//!
//! use holo_ccg::catalog::EffectCatalog;
//! use holo_ccg::core::{EngineConfig, GameState, PlayerId};
//! use holo_ccg::effects::{AutoChoice, EffectManager};
//! use holo_ccg::triggers::{EventContext, TriggerDispatcher, TriggerType};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let config = EngineConfig::default();
//! let manager = EffectManager::new(Arc::new(EffectCatalog::new()), Arc::new(AutoChoice), &config);
//! let mut state = GameState::new(&config);
//! let dispatcher = TriggerDispatcher::new();
//!
//! // Nobody listens: an empty result list, not an error
//! let results = dispatcher
//!     .fire(TriggerType::OnCollab, EventContext::new(PlayerId::new(0)), &manager, &mut state)
//!     .await
//!     .unwrap();
//! assert!(results.is_empty());
//! # });
//! ```

mod condition;
mod dispatcher;
mod event;
mod kind;

pub use condition::{ConditionContext, ConditionEvaluator, ListenerCondition, Predicate};
pub use dispatcher::{Listener, ListenerConfig, ListenerId, TriggerDispatcher};
pub use event::{EventContext, TriggerEvent};
pub use kind::{TriggerType, UnknownTrigger};
