//! Alerting for the fintech monitoring pipeline.
//!
//! This crate provides:
//! - [`AlertConditionEvaluator`] with price, sentiment and signal scans
//! - [`NotificationDispatcher`] for the summary email and capped SMS
//! - Email and SMS channels (SendGrid, Twilio, log-only)
//! - [`AlertService`], which runs one full cycle

pub mod channels;
pub mod dispatcher;
pub mod evaluator;
pub mod service;

pub use channels::{
    DeliveryError, LogEmailChannel, SendGridEmailChannel, ShortMessageChannel, SummaryChannel,
    TwilioSmsChannel,
};
pub use dispatcher::{
    email_subject, format_email_body, sms_text, DispatchReport, NotificationDispatcher,
};
pub use evaluator::{
    price_alerts, sentiment_alerts, signal_alerts, AlertConditionEvaluator, EvaluationReport,
    ScanFailure, ScanKind, ScanOutcome,
};
pub use service::{AlertCycleReport, AlertService};
