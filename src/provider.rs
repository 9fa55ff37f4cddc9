//! Provider-facing descriptors (data), strategies (behavior), and the registry that holds them.
//!
//! `descriptor` exposes validated metadata (`ProviderDescriptor`) covering HTTPS-only
//! endpoints, requested scopes, client authentication preferences, and provider quirks.
//! `strategy` defines [`Strategy`], the contract the dispatcher drives; `oauth` implements it
//! for authorization-code providers; `builtin` lists the providers configurable from the
//! environment; `registry` maps strategy types to strategies in mount order.

pub mod builtin;
pub mod descriptor;
pub mod oauth;
pub mod registry;
pub mod strategy;

pub use builtin::*;
pub use descriptor::*;
pub use oauth::*;
pub use registry::*;
pub use strategy::*;
