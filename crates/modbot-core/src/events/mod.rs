//! Outbound notifications produced by moderation and session activity

mod notification;

pub use notification::{Notification, Severity};
