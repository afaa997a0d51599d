use dossier_core::{AgentStore, CodenameGenerator};

pub fn run(store: &AgentStore, generator: CodenameGenerator) -> Result<(), Box<dyn std::error::Error>> {
    let codename = generator.generate_unique(store)?;
    println!("{}", codename);

    Ok(())
}
