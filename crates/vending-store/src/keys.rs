//! # Key Layout
//!
//! Every key is namespaced by an application prefix and partitioned by user.
//!
//! ```text
//! {prefix}:maquinas:{userId}           JSON array of Maquina
//! {prefix}:maquina:{userId}:{id}       one Maquina
//! {prefix}:lugares:{userId}            JSON array of Lugar
//! {prefix}:lugar:{userId}:{id}         one Lugar
//! {prefix}:recolecciones:{userId}      JSON array of Recoleccion
//! {prefix}:costos:{userId}             JSON array of CostoInsumo
//! {prefix}:usuario:{email}             Usuario (email lowercased)
//! {prefix}:usuario:id:{userId}         Usuario
//! ```

/// Default key prefix.
pub const DEFAULT_PREFIX: &str = "vending";

/// Builds store keys under a fixed prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keys {
    prefix: String,
}

impl Keys {
    pub fn new(prefix: impl Into<String>) -> Self {
        Keys {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn maquinas(&self, user_id: &str) -> String {
        format!("{}:maquinas:{user_id}", self.prefix)
    }

    pub fn maquina(&self, user_id: &str, id: &str) -> String {
        format!("{}:maquina:{user_id}:{id}", self.prefix)
    }

    pub fn lugares(&self, user_id: &str) -> String {
        format!("{}:lugares:{user_id}", self.prefix)
    }

    pub fn lugar(&self, user_id: &str, id: &str) -> String {
        format!("{}:lugar:{user_id}:{id}", self.prefix)
    }

    pub fn recolecciones(&self, user_id: &str) -> String {
        format!("{}:recolecciones:{user_id}", self.prefix)
    }

    pub fn costos(&self, user_id: &str) -> String {
        format!("{}:costos:{user_id}", self.prefix)
    }

    /// Account lookup by email. Emails are case-insensitive.
    pub fn usuario_por_email(&self, email: &str) -> String {
        format!("{}:usuario:{}", self.prefix, email.trim().to_lowercase())
    }

    pub fn usuario_por_id(&self, user_id: &str) -> String {
        format!("{}:usuario:id:{user_id}", self.prefix)
    }
}

impl Default for Keys {
    fn default() -> Self {
        Keys::new(DEFAULT_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let keys = Keys::default();
        assert_eq!(keys.maquinas("u1"), "vending:maquinas:u1");
        assert_eq!(keys.maquina("u1", "m1"), "vending:maquina:u1:m1");
        assert_eq!(keys.lugar("u1", "l1"), "vending:lugar:u1:l1");
        assert_eq!(keys.recolecciones("u1"), "vending:recolecciones:u1");
        assert_eq!(keys.costos("u1"), "vending:costos:u1");
        assert_eq!(keys.usuario_por_id("u1"), "vending:usuario:id:u1");
    }

    #[test]
    fn test_email_key_is_case_insensitive() {
        let keys = Keys::new("app");
        assert_eq!(
            keys.usuario_por_email(" Ana@Example.COM "),
            "app:usuario:ana@example.com"
        );
    }
}
