//! # Account Repository
//!
//! Email/password accounts. Each account is written under two keys, one
//! per lookup path (email for login, id for token holders).
//!
//! Passwords are stored as Argon2id PHC strings, never in clear.

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use vending_core::{generar_id, Fecha};

use super::{read_json, write_json};
use crate::error::{StoreError, StoreResult};
use crate::keys::Keys;
use crate::kv::KvStore;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usuario {
    pub id: String,
    /// Always lowercase.
    pub email: String,
    pub nombre: String,
    pub password_hash: String,
    pub fecha_creacion: Fecha,
}

impl Usuario {
    /// Checks a clear-text password against the stored hash.
    pub fn verify_password(&self, password: &str) -> bool {
        let parsed_hash = match PasswordHash::new(&self.password_hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

/// Hash a password for storage.
pub fn hash_password(password: &str) -> StoreResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| StoreError::PasswordHash(e.to_string()))?;

    Ok(hash.to_string())
}

#[derive(Clone)]
pub struct UsuarioRepository {
    kv: Arc<dyn KvStore>,
    keys: Keys,
}

impl UsuarioRepository {
    pub fn new(kv: Arc<dyn KvStore>, keys: Keys) -> Self {
        UsuarioRepository { kv, keys }
    }

    /// Registers a new account.
    ///
    /// The email key is claimed with `set_if_absent`, so two simultaneous
    /// sign-ups with the same email cannot both succeed.
    ///
    /// ## Errors
    /// `StoreError::Duplicate` if the email is already registered.
    pub async fn create(&self, email: &str, nombre: &str, password: &str) -> StoreResult<Usuario> {
        let email = email.trim().to_lowercase();
        let usuario = Usuario {
            id: generar_id("user"),
            email: email.clone(),
            nombre: nombre.to_string(),
            password_hash: hash_password(password)?,
            fecha_creacion: Fecha::now(),
        };

        let json = serde_json::to_string(&usuario)?;
        if !self
            .kv
            .set_if_absent(&self.keys.usuario_por_email(&email), json)
            .await?
        {
            return Err(StoreError::duplicate("email", email));
        }
        write_json(self.kv.as_ref(), &self.keys.usuario_por_id(&usuario.id), &usuario).await?;

        info!(user_id = %usuario.id, "Account created");
        Ok(usuario)
    }

    pub async fn find_by_email(&self, email: &str) -> StoreResult<Option<Usuario>> {
        read_json(self.kv.as_ref(), &self.keys.usuario_por_email(email)).await
    }

    pub async fn find_by_id(&self, user_id: &str) -> StoreResult<Option<Usuario>> {
        read_json(self.kv.as_ref(), &self.keys.usuario_por_id(user_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;

    fn repo() -> UsuarioRepository {
        UsuarioRepository::new(Arc::new(MemoryStore::new()), Keys::default())
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = repo();
        let created = repo.create("Ana@Example.com", "Ana", "secreto").await.unwrap();
        assert_eq!(created.email, "ana@example.com");
        assert!(created.id.starts_with("user-"));
        assert_ne!(created.password_hash, "secreto");

        let by_email = repo.find_by_email("ANA@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);

        let by_id = repo.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "ana@example.com");
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let repo = repo();
        repo.create("ana@example.com", "Ana", "secreto").await.unwrap();

        let err = repo.create("ANA@example.com", "Otra", "otraclave").await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn test_verify_password() {
        let repo = repo();
        let usuario = repo.create("ana@example.com", "Ana", "secreto").await.unwrap();

        assert!(usuario.verify_password("secreto"));
        assert!(!usuario.verify_password("Secreto"));
    }

    #[test]
    fn test_garbage_hash_never_verifies() {
        let usuario = Usuario {
            id: "user-1".to_string(),
            email: "a@b.c".to_string(),
            nombre: "A".to_string(),
            password_hash: "not-a-phc-string".to_string(),
            fecha_creacion: Fecha::now(),
        };
        assert!(!usuario.verify_password("anything"));
    }
}
