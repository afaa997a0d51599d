use dossier_core::{Agent, AgentForm, AgentStore};

use super::show;

/// Replacement values; `None` keeps the current one.
#[derive(Debug, Default)]
pub struct Changes {
    pub codename: Option<String>,
    pub contact_number: Option<String>,
    pub email: Option<String>,
    pub access_level: Option<String>,
}

pub fn run(store: &AgentStore, id: i64, changes: Changes) -> Result<(), Box<dyn std::error::Error>> {
    let current = store.get(id)?;
    let form = apply(&current, changes);
    let agent = store.update(id, form.to_fields()?)?;

    println!("Updated agent {}", agent.id);
    print!("{}", show::render(&agent));

    Ok(())
}

/// The full replacement form: current values overlaid with the changes.
fn apply(current: &Agent, changes: Changes) -> AgentForm {
    let mut form = AgentForm::from_agent(current);
    if let Some(codename) = changes.codename {
        form.codename = codename;
    }
    if let Some(contact_number) = changes.contact_number {
        form.contact_number = contact_number;
    }
    if let Some(email) = changes.email {
        form.email = email;
    }
    if changes.access_level.is_some() {
        form.access_level = changes.access_level;
    }
    form
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_core::{AccessLevel, AgentFields};

    fn seeded() -> (AgentStore, Agent) {
        let store = crate::commands::test_store();
        let agent = store
            .create(AgentFields::new("Cold Viper", "555-0100", "v@x.com", AccessLevel::Secret))
            .unwrap();
        (store, agent)
    }

    #[test]
    fn test_apply_keeps_unspecified_fields() {
        let (_store, agent) = seeded();
        let form = apply(
            &agent,
            Changes {
                email: Some("viper@x.com".to_string()),
                ..Changes::default()
            },
        );
        assert_eq!(form.codename, "Cold Viper");
        assert_eq!(form.contact_number, "555-0100");
        assert_eq!(form.email, "viper@x.com");
        assert_eq!(form.access_level.as_deref(), Some("Secret"));
    }

    #[test]
    fn test_edit_level() {
        let (store, agent) = seeded();
        run(
            &store,
            agent.id,
            Changes {
                access_level: Some("most_secret".to_string()),
                ..Changes::default()
            },
        )
        .unwrap();
        let updated = store.get(agent.id).unwrap();
        assert_eq!(updated.access_level, AccessLevel::MostSecret);
        assert_eq!(updated.codename, "Cold Viper");
    }

    #[test]
    fn test_edit_missing_agent() {
        let (store, _agent) = seeded();
        assert!(run(&store, 99, Changes::default()).is_err());
    }
}
