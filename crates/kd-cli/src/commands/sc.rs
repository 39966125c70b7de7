use kd_mechanics::{SanityCheck, run_check};

use super::Context;

pub fn run(ctx: &mut Context, losses: &str, value: Option<i64>) -> Result<(), String> {
    let check = SanityCheck::parse(losses).map_err(|e| e.to_string())?;
    let mut store = ctx.cards()?;
    let outcome = run_check(
        &check,
        &ctx.card,
        value,
        &mut store,
        &mut ctx.dice,
        ctx.config.max_attributes_per_card,
    )
    .map_err(|e| e.to_string())?;

    if outcome.committed {
        ctx.save_cards(&store)?;
    }
    println!("{}: {outcome}", ctx.card);
    Ok(())
}
