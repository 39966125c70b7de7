use kd_mechanics::{Edition, generate_many};

use super::Context;

/// `[6|7] [count]`: a lone `6` or `7` picks the edition, any other lone
/// number is a count.
fn parse_args(args: &[String]) -> Result<(Edition, usize), String> {
    let count = |arg: &str| {
        arg.parse::<usize>()
            .map_err(|_| format!("expected an investigator count, got '{arg}'"))
    };
    match args {
        [] => Ok((Edition::default(), 1)),
        [only] => match only.parse::<Edition>() {
            Ok(edition) => Ok((edition, 1)),
            Err(_) => Ok((Edition::default(), count(only)?)),
        },
        [edition, n, ..] => {
            let edition = edition.parse::<Edition>().map_err(|e| e.to_string())?;
            Ok((edition, count(n)?))
        }
    }
}

pub fn run(ctx: &mut Context, args: &[String]) -> Result<(), String> {
    let (edition, count) = parse_args(args)?;
    let investigators = generate_many(edition, count, &mut ctx.dice).map_err(|e| e.to_string())?;

    println!("{}'s CoC{edition} investigators:", ctx.card);
    for investigator in &investigators {
        println!("{investigator}");
        println!("  total: {}", investigator.total());
    }
    Ok(())
}
