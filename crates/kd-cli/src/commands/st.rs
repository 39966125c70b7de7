use kd_core::standard_catalog;
use kd_mechanics::{apply_directive, parse_directive};

use super::Context;

pub fn run(ctx: &mut Context, text: &[String]) -> Result<(), String> {
    let directive = parse_directive(&text.join(" "), standard_catalog());
    if directive.operations.is_empty() {
        return Err("no attributes recognized".into());
    }

    let mut store = ctx.cards()?;
    let applied = apply_directive(
        &directive,
        &ctx.card,
        &mut store,
        &mut ctx.dice,
        ctx.config.max_attributes_per_card,
    )
    .map_err(|e| e.to_string())?;
    ctx.save_cards(&store)?;

    println!("{}:", applied.card);
    for change in &applied.changes {
        if change.stored {
            println!("  {change}");
        } else {
            println!(
                "  {change} (not stored: card already has {} attributes)",
                ctx.config.max_attributes_per_card
            );
        }
    }

    Ok(())
}
