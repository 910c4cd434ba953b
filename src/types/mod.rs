//! Type definitions for the validation API.
//!
//! Typed request builders for account, entity, and payroll validations,
//! the wire-format building blocks they share, and the response type
//! returned by every validation call.

pub mod account;
pub mod common;
pub mod entity;
pub mod payroll;
pub mod response;
