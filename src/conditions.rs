//! Exceptional situations and conditions.

use std::fmt;

use crate::symbols::Symbol;

/// A signal of some sort of erroneous condition.
///
/// Every failure in this crate is synchronous and propagates immediately to
/// the caller as one of these; nothing is retried or recovered internally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Condition {
    #[error("Expected {expected} arguments, provided {provided}")]
    WrongNumOfArgs { expected: usize, provided: usize },
    #[error("Expected at least {expected} arguments, provided {provided}")]
    WrongNumOfVarArgs { expected: usize, provided: usize },
    #[error("Invalid index of {index} into record of size {len}")]
    InvalidIndex { index: usize, len: usize },
    #[error("Record has no field named `{0}`")]
    UnknownField(Symbol),
    #[error("Record has no method named `{0}`")]
    UnknownMethod(Symbol),
    #[error("Duplicate field `{0}`")]
    DuplicateField(Symbol),
    #[error("`{0}` bound multiple times")]
    NameBoundMultipleTimes(Symbol),
    #[error("Expected value of type {expected}, provided {provided}")]
    TypeError {
        expected: &'static str,
        provided: &'static str,
    },
    #[error("{0}")]
    Message(String),
}

impl Condition {
    pub fn error(message: impl fmt::Display) -> Self {
        Self::Message(message.to_string())
    }

    pub fn wrong_num_of_args(expected: usize, provided: usize) -> Self {
        Self::WrongNumOfArgs { expected, provided }
    }

    pub fn wrong_num_of_var_args(expected: usize, provided: usize) -> Self {
        Self::WrongNumOfVarArgs { expected, provided }
    }

    pub fn invalid_index(index: usize, len: usize) -> Self {
        Self::InvalidIndex { index, len }
    }

    pub fn type_error(expected: &'static str, provided: &'static str) -> Self {
        Self::TypeError { expected, provided }
    }
}
