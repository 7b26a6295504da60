use anyhow::{anyhow, Result};
use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;
use rand::Rng;

const PASSWORD_DIGITS: usize = 10;

pub struct Credential {
    pub password: String,
    /// PHC-formatted argon2 hash, or the plaintext when hashing is off.
    pub password_hash: String,
}

pub struct CredentialIssuer {
    hash: bool,
    argon: Argon2<'static>,
}

impl CredentialIssuer {
    pub fn new(hash: bool) -> Self {
        Self { hash, argon: Argon2::default() }
    }

    pub fn issue(&self) -> Result<Credential> {
        let mut rng = OsRng;
        let password: String =
            (0..PASSWORD_DIGITS).map(|_| char::from(b'0' + rng.gen_range(0..10u8))).collect();
        let password_hash = if self.hash {
            let salt = SaltString::generate(&mut rng);
            self.argon
                .hash_password(password.as_bytes(), &salt)
                .map_err(|e| anyhow!("hashing password: {e}"))?
                .to_string()
        } else {
            password.clone()
        };
        Ok(Credential { password, password_hash })
    }
}
