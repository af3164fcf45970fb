use hmac::{Hmac, Mac};

use sha2::Sha256;

use secrecy::Secret;

use super::token::{TokenError, TokenResult, BASE64_ENGINE};

/// HMAC-SHA256 key used for access tokens and workflow callback signatures
#[derive(Clone)]
pub struct SigningKey(Hmac<Sha256>);

impl SigningKey {
    pub fn new(key: &Secret<String>) -> anyhow::Result<Self> {
        use secrecy::ExposeSecret;

        let hmac = Hmac::new_from_slice(key.expose_secret().as_bytes())?;

        Ok(Self(hmac))
    }

    /// Sign an arbitrary payload, returning the base64 (url-safe) signature
    pub fn sign(&self, payload: &[u8]) -> String {
        use base64::Engine;

        let sig = self.0.clone().chain_update(payload).finalize().into_bytes();
        BASE64_ENGINE.encode(sig)
    }

    /// Verify a base64 signature produced by [`SigningKey::sign`]
    pub fn verify(&self, payload: &[u8], signature: &str) -> TokenResult<()> {
        use base64::Engine;

        let signature = BASE64_ENGINE.decode(signature.trim())?;
        self.0
            .clone()
            .chain_update(payload)
            .verify_slice(&signature)
            .map_err(|_| TokenError::SignatureMismatch)
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKey([REDACTED])")
    }
}

impl AsRef<Hmac<Sha256>> for SigningKey {
    fn as_ref(&self) -> &Hmac<Sha256> {
        &self.0
    }
}
