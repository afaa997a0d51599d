use dossier_core::{Agent, AgentStore};

pub fn run(store: &AgentStore, id: i64) -> Result<(), Box<dyn std::error::Error>> {
    let agent = store.get(id)?;
    print!("{}", render(&agent));

    Ok(())
}

pub(crate) fn render(agent: &Agent) -> String {
    format!(
        "Id:           {}\nCodename:     {}\nContact:      {}\nEmail:        {}\nAccess level: {} ({})\n",
        agent.id,
        agent.codename,
        agent.contact_number,
        agent.email,
        agent.access_level,
        agent.access_level.localized_label(),
    )
}
