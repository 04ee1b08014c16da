//! Validator resolution.
//!
//! A validator can be described four ways: a compiled pattern, the name of a
//! registered validator, a plain function, or a configuration object whose
//! `type` names a registered validator. [`ValidatorRegistry::resolve`] turns
//! every one of them into the same [`ValidatorFn`] shape.

mod builtin;
mod error;
mod registry;
mod spec;

pub use error::{ErrorDescriptor, RegistryError};
pub use registry::{ValidatorFactory, ValidatorRegistry, freeze, global, register, resolve};
pub use spec::{ValidatorConfig, ValidatorFn, ValidatorSpec};
