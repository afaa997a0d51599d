use dossier_core::{AgentForm, AgentStore, CodenameGenerator};

use super::show;

pub fn run(
    store: &AgentStore,
    generator: CodenameGenerator,
    values: Vec<String>,
    generate: bool,
    level: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let codename = if generate {
        Some(generator.generate_unique(store)?)
    } else {
        None
    };
    let form = build_form(values, codename, level)?;
    let agent = store.create(form.to_fields()?)?;

    println!("Created agent {}", agent.id);
    print!("{}", show::render(&agent));

    Ok(())
}

/// Lay out positional values as a form. A generated codename takes the
/// place of the first positional.
fn build_form(
    values: Vec<String>,
    generated: Option<String>,
    level: Option<String>,
) -> Result<AgentForm, Box<dyn std::error::Error>> {
    let mut values = values.into_iter();
    let (codename, contact_number, email) = match (generated, values.len()) {
        (Some(codename), 2) => (codename, next(&mut values)?, next(&mut values)?),
        (None, 3) => (next(&mut values)?, next(&mut values)?, next(&mut values)?),
        (Some(_), _) => return Err("With --generate, give only CONTACT and EMAIL".into()),
        (None, _) => return Err("Expected CODENAME CONTACT EMAIL (or --generate)".into()),
    };

    Ok(AgentForm {
        codename,
        contact_number,
        email,
        access_level: level,
    })
}

fn next(values: &mut impl Iterator<Item = String>) -> Result<String, Box<dyn std::error::Error>> {
    values.next().ok_or_else(|| "Missing argument".into())
}
