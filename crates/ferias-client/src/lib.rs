//! HTTP clients for the ferias scheduler.
//!
//! [`ApiClient`] implements [`ferias_core::store::Backend`] against the
//! scheduling backend; [`OpenHolidaysClient`] implements
//! [`ferias_core::holiday::HolidaySource`] against the OpenHolidays API.

pub mod client;
pub mod error;
pub mod holidays;

pub use client::{ApiClient, ApiConfig};
pub use error::{Error, Result};
pub use holidays::{HolidayConfig, OpenHolidaysClient};

#[cfg(test)]
mod tests;
