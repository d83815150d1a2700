mod fingerprint;
mod jwt;
mod password;

pub use fingerprint::VoterFingerprinter;
pub use jwt::TokenService;
pub use password::{hash_password, verify_password};
