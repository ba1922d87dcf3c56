//! Skyledger parameter validation.
//!
//! Every resource declares a [`ParameterSchema`](skyledger_core::ParameterSchema).
//! Before any vendor request is made, the caller's raw arguments are checked
//! against it, defaulted, and coerced into a [`ParameterSet`].

pub mod coerce;
pub mod error;
pub mod set;
pub mod validator;

pub use error::{ParamError, ParamErrorKind};
pub use set::ParameterSet;
pub use validator::{ParamValidator, validate};
