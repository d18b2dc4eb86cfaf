//! Alert and notification system
//!
//! Threshold evaluation, per-metric alert state and trap fan-out.

mod composer;
mod dispatcher;
mod evaluator;
mod tracker;
mod types;

pub use composer::NotificationComposer;
pub use dispatcher::{
    DeliverySnapshot, DeliveryStats, DispatchReport, MultiTargetDispatcher, TargetOutcome,
};
pub use evaluator::ThresholdEvaluator;
pub use tracker::AlertTracker;
pub use types::{AlertPolicy, AlertState, Notification, NotificationKind, Transition};
