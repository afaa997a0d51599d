use dossier_config::DossierConfig;

pub fn run(config: &DossierConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Print as YAML for readability; the API key is redacted.
    let yaml = config.to_yaml()?;
    println!("{}", yaml);

    Ok(())
}
