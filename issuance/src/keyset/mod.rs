//! Keysets of pluggable primitives.
//!
//! A [Handle] owns a [proto::Keyset]: serialized keys tagged with a type URL, a status, and an id,
//! exactly one of which is primary. A [Registry] resolves type URLs to [KeyManager]s, which turn
//! serialized keys into live [Primitive]s. [Handle::primitives] assembles those into a
//! [PrimitiveSet] that callers dispatch through. Use a [Manager] to add keys and rotate the primary.

mod handle;
mod manager;
mod primitive_set;
pub mod proto;
mod registry;
mod validation;

pub use handle::Handle;
pub use manager::Manager;
pub use primitive_set::{Entry, PrimitiveSet};
pub use registry::{KeyManager, Primitive, Registry};
pub use validation::{validate_key_version, validate_keyset};

#[cfg(test)]
pub(crate) use registry::mocks;
