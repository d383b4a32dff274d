//! Error types for `roster-core`.

use rust_decimal::Decimal;
use thiserror::Error;

/// Input rejected before it reaches a store.
#[derive(Debug, Error)]
pub enum Error {
  #[error("{0} must not be empty")]
  EmptyField(&'static str),

  #[error("invalid salary {input:?}: {source}")]
  InvalidSalary {
    input:  String,
    #[source]
    source: rust_decimal::Error,
  },

  #[error("salary must not be negative, got {0}")]
  NegativeSalary(Decimal),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
