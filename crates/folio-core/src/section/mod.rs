//! Section Registry, validators and the type-erased adapter wrapper.

pub mod box_adapter;
pub mod registry;
pub mod validator;
