use super::{Context, table};

pub fn create(ctx: &Context, name: &str) -> Result<(), String> {
    let mut store = ctx.cards()?;
    if !store.create_card(name) {
        return Err(format!("card '{name}' already exists"));
    }
    ctx.save_cards(&store)?;
    println!("Created card '{name}'.");
    Ok(())
}

pub fn delete(ctx: &Context, name: &str) -> Result<(), String> {
    let mut store = ctx.cards()?;
    if !store.delete_card(name) {
        return Err(format!("no card named '{name}'"));
    }
    ctx.save_cards(&store)?;
    println!("Deleted card '{name}'.");
    Ok(())
}

pub fn list(ctx: &Context) -> Result<(), String> {
    let store = ctx.cards()?;
    let names: Vec<&str> = store.card_names().collect();

    if names.is_empty() {
        println!("  No cards.");
        return Ok(());
    }

    let mut table = table(vec!["Card", "Attributes"]);
    for name in &names {
        let count = store.card(name).map_or(0, |c| c.attributes.len());
        table.add_row(vec![name.to_string(), count.to_string()]);
    }
    println!("{table}");
    Ok(())
}
