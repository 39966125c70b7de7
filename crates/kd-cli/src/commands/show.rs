use kd_core::{CharacterStore, standard_catalog};

use super::{Context, table};

/// Show a card's attributes, or only the named ones.
pub fn run(ctx: &Context, name: Option<&str>, only: &[String]) -> Result<(), String> {
    let card = name.unwrap_or(&ctx.card);
    let store = ctx.cards()?;
    let attributes = store.attributes(card);

    if attributes.is_empty() {
        println!("  No attributes on card '{card}'.");
        return Ok(());
    }

    let mut table = table(vec!["Attribute", "Value"]);
    let mut shown = 0;
    let mut missing = Vec::new();
    if only.is_empty() {
        for (attribute, value) in &attributes {
            table.add_row(vec![attribute.clone(), value.to_string()]);
        }
        shown = attributes.len();
    } else {
        let catalog = standard_catalog();
        for requested in only {
            let attribute = catalog.canonical(requested);
            match attributes.get(attribute.as_ref()) {
                Some(value) => {
                    table.add_row(vec![attribute.into_owned(), value.to_string()]);
                    shown += 1;
                }
                None => missing.push(attribute.into_owned()),
            }
        }
    }

    if shown == 0 {
        println!("  None of {} is set on card '{card}'.", missing.join(", "));
        return Ok(());
    }

    println!("{card}");
    println!("{table}");
    println!();
    println!("  {shown} attributes");
    if !missing.is_empty() {
        println!("  Not set: {}", missing.join(", "));
    }

    Ok(())
}
