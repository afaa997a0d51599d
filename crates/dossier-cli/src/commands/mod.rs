pub mod add;
pub mod codename;
pub mod config;
pub mod edit;
pub mod ls;
pub mod nuke;
pub mod rm;
pub mod serve;
pub mod show;

/// In-memory store for command tests.
#[cfg(test)]
pub(crate) fn test_store() -> dossier_core::AgentStore {
    dossier_core::AgentStore::in_memory().unwrap()
}
