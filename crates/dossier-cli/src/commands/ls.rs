use dossier_core::{AccessLevel, Agent, AgentFilter, AgentStore};

pub fn run(
    store: &AgentStore,
    query: Option<String>,
    level: Option<String>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter = build_filter(query, level)?;
    let agents = store.list(&filter)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&agents)?);
        return Ok(());
    }

    if agents.is_empty() {
        println!("(no agents)");
        return Ok(());
    }

    for agent in &agents {
        println!("{}", format_row(agent));
    }

    Ok(())
}

fn build_filter(
    query: Option<String>,
    level: Option<String>,
) -> Result<AgentFilter, Box<dyn std::error::Error>> {
    let mut filter = AgentFilter::default();
    if let Some(query) = query {
        filter = filter.codename(query);
    }
    match level.as_deref().map(str::trim) {
        None | Some("") => {}
        Some(raw) => filter = filter.access_level(raw.parse::<AccessLevel>()?),
    }
    Ok(filter)
}

fn format_row(agent: &Agent) -> String {
    format!(
        "{:>4}  {:<24} {:<12} {:<28} {}",
        agent.id, agent.codename, agent.contact_number, agent.email, agent.access_level
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_core::AgentFields;

    #[test]
    fn test_build_filter() {
        let filter = build_filter(Some("fox".to_string()), Some("top_secret".to_string())).unwrap();
        assert_eq!(filter.codename.as_deref(), Some("fox"));
        assert_eq!(filter.access_level, Some(AccessLevel::TopSecret));

        let filter = build_filter(None, Some("  ".to_string())).unwrap();
        assert_eq!(filter.access_level, None);

        assert!(build_filter(None, Some("Cosmic".to_string())).is_err());
    }

    #[test]
    fn test_format_row() {
        let store = crate::commands::test_store();
        let agent = store
            .create(AgentFields::new("Iron Wolf", "555-0101", "w@x.com", AccessLevel::MostSecret))
            .unwrap();
        let row = format_row(&agent);
        assert!(row.trim_start().starts_with("1  Iron Wolf"));
        assert!(row.ends_with("Most Secret"));
    }
}
