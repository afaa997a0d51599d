use dossier_core::AgentStore;

pub fn run(store: &AgentStore) -> Result<(), Box<dyn std::error::Error>> {
    let deleted = store.delete_all()?;
    tracing::info!(deleted, "registry wiped");
    println!("Deleted {} agent(s)", deleted);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_core::{AccessLevel, AgentFields, AgentFilter};

    #[test]
    fn test_nuke_empties_store() {
        let store = crate::commands::test_store();
        for (codename, email) in [("Ghost Raven", "r@x.com"), ("Dark Widow", "w@x.com")] {
            store
                .create(AgentFields::new(codename, "555-0100", email, AccessLevel::Secret))
                .unwrap();
        }

        run(&store).unwrap();
        assert!(store.list(&AgentFilter::default()).unwrap().is_empty());

        // Nothing left is not an error.
        run(&store).unwrap();
    }
}
