use kd_core::{CharacterStore, standard_catalog};
use kd_mechanics::resolve_pool;

use super::Context;

/// Roll a pool. Only the success count is printed unless `detail` is set.
pub fn run(ctx: &mut Context, expr: &[String], detail: bool) -> Result<(), String> {
    let store = ctx.cards()?;
    let attributes = store.attributes(&ctx.card);
    let outcome = resolve_pool(&expr.concat(), &attributes, standard_catalog(), &mut ctx.dice)
        .map_err(|e| e.to_string())?;

    if !detail {
        println!("{}", outcome.summary());
        return Ok(());
    }

    println!("{outcome}");
    println!(
        "  {} dice rolled, {} from explosions",
        outcome.draws.len(),
        outcome.extra_dice()
    );
    Ok(())
}
