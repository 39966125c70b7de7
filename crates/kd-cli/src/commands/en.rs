use kd_core::standard_catalog;
use kd_mechanics::{GrowthCheck, GrowthFormula, run_check};

use super::Context;

pub fn run(ctx: &mut Context, skill: &str, args: &[String]) -> Result<(), String> {
    let mut check = GrowthCheck::new(skill, standard_catalog());
    let mut value = None;
    for arg in args {
        if GrowthFormula::looks_like(arg) {
            let formula = GrowthFormula::parse(arg).map_err(|e| e.to_string())?;
            check = check.with_formula(formula);
        } else {
            let parsed = arg
                .parse::<i64>()
                .map_err(|_| format!("expected a skill value or +XdY/XdY formula, got '{arg}'"))?;
            value = Some(parsed);
        }
    }

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
