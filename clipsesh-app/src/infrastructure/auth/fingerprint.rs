use clipsesh_errors::AppError;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Turns a voter's network address into a stable, non-reversible lookup key.
///
/// The key is an HMAC under a server secret, so the same address always maps
/// to the same fingerprint and the ledger can be queried by equality.
#[derive(Clone)]
pub struct VoterFingerprinter {
    secret: Vec<u8>,
}

impl VoterFingerprinter {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
        }
    }

    pub fn fingerprint(&self, voter: &str) -> Result<String, AppError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret).map_err(AppError::internal)?;
        mac.update(voter.trim().as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_per_secret() {
        let a = VoterFingerprinter::new("secret-a");
        let b = VoterFingerprinter::new("secret-b");

        let key = a.fingerprint("1.2.3.4").unwrap();
        assert_eq!(key, a.fingerprint("1.2.3.4").unwrap());
        assert_ne!(key, a.fingerprint("1.2.3.5").unwrap());
        assert_ne!(key, b.fingerprint("1.2.3.4").unwrap());
        assert!(!key.contains("1.2.3.4"));
        assert_eq!(key.len(), 64);
    }
}
