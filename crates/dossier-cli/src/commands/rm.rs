use dossier_core::AgentStore;

pub fn run(store: &AgentStore, id: i64) -> Result<(), Box<dyn std::error::Error>> {
    store.delete(id)?;
    tracing::debug!(id, "agent removed");
    println!("Deleted agent {}", id);

    Ok(())
}
