// Service module exports

pub mod api;
pub mod calendar;
pub mod merge;
pub mod mover;
pub mod notification;
pub mod recurrence;
pub mod reminder;
