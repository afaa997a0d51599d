use crate::error::StoreError;

/// Lookup used by the codename generator to avoid names already in use.
pub trait CodenameRegistry {
    /// Whether an agent's codename equals `candidate`, ignoring case.
    fn codename_taken(&self, candidate: &str) -> Result<bool, StoreError>;
}

impl<T: CodenameRegistry + ?Sized> CodenameRegistry for &T {
    fn codename_taken(&self, candidate: &str) -> Result<bool, StoreError> {
        (**self).codename_taken(candidate)
    }
}

impl<T: CodenameRegistry + ?Sized> CodenameRegistry for std::sync::Arc<T> {
    fn codename_taken(&self, candidate: &str) -> Result<bool, StoreError> {
        (**self).codename_taken(candidate)
    }
}
