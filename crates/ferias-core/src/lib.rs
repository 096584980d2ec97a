//! Core types and absence accounting for the ferias scheduler.
//!
//! Identifies absences, counts business days and partial-day hours, and
//! reconciles absence forms into records for the backend. This crate has no
//! HTTP dependencies; the backend and the holiday provider are reached
//! through the [`store::Backend`] and [`holiday::HolidaySource`] traits.

pub mod absence;
pub mod business_days;
pub mod calendar;
pub mod duration;
pub mod error;
pub mod holiday;
pub mod id;
pub mod memory;
pub mod mode;
pub mod reconcile;
pub mod store;
pub mod worker;

pub use error::{Error, Result};

#[cfg(test)]
mod tests;
