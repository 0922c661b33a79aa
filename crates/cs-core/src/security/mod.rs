//! Security domain models.
//!
//! Pure models only: key material newtypes, the ciphertext envelope, and the
//! password rules. Crypto algorithms live behind the ports in `cs-infra`.

pub mod model;
pub mod password;
