use thiserror::Error;

/// Seule erreur du moteur : un historique vide ou une diversité non atteinte
/// ne sont pas des erreurs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Configuration invalide : {reason}")]
    InvalidConfiguration { reason: String },
}

impl EngineError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        EngineError::InvalidConfiguration { reason: reason.into() }
    }
}
