//! Password hashing.
//!
//! Passwords are stored in PHC form. `PWD_SCHEME_VERSION` tags the hasher
//! configuration so stale hashes can be detected and redone at login.

use lazy_static::lazy_static;
use libreauth::pass::{Algorithm, HashBuilder, Hasher};

pub(crate) const PWD_ALGORITHM: Algorithm = Algorithm::Argon2;
pub(crate) const PWD_SCHEME_VERSION: usize = 1;

// bump PWD_SCHEME_VERSION whenever the hasher configuration changes
lazy_static! {
    pub(crate) static ref HASHER: Hasher = HashBuilder::new()
        .algorithm(PWD_ALGORITHM)
        .version(PWD_SCHEME_VERSION)
        .finalize()
        .unwrap();
}
