use kd_initiative::{AddOutcome, InitiativeRoll, InitiativeState};

use super::{Context, table};

fn print_list(state: &InitiativeState) {
    if state.is_empty() {
        println!("  No initiative list.");
        return;
    }

    let mut table = table(vec!["#", "Name", "Initiative", ""]);
    for turn in state.list() {
        table.add_row(vec![
            turn.position.to_string(),
            turn.entry.name.clone(),
            turn.entry.value.to_string(),
            if turn.is_current { "<-" } else { "" }.to_string(),
        ]);
    }
    println!("Round {}", state.round());
    println!("{table}");
}

pub fn list(ctx: &Context, channel: &str) -> Result<(), String> {
    let state = ctx.board().load(channel).map_err(|e| e.to_string())?;
    print_list(&state);
    Ok(())
}

pub fn roll(ctx: &mut Context, channel: &str, args: &[String]) -> Result<(), String> {
    let roll = InitiativeRoll::parse(args, &ctx.card);
    let (rolled, state) = ctx
        .board()
        .roll(channel, &roll, &mut ctx.dice)
        .map_err(|e| e.to_string())?;
    println!("{} initiative: {}", rolled.name, rolled.roll);
    print_list(&state);
    Ok(())
}

pub fn add(ctx: &Context, channel: &str, name: &str, value: i64) -> Result<(), String> {
    let (outcome, state) = ctx
        .board()
        .add(channel, name, value)
        .map_err(|e| e.to_string())?;
    match outcome {
        AddOutcome::Inserted => println!("Added {name} ({value})."),
        AddOutcome::Updated { previous } => println!("Updated {name}: {previous} -> {value}."),
    }
    print_list(&state);
    Ok(())
}

pub fn remove(ctx: &Context, channel: &str, name: &str) -> Result<(), String> {
    let state = ctx
        .board()
        .remove(channel, name)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("'{name}' is not in the initiative list"))?;
    println!("Removed {name}.");
    print_list(&state);
    Ok(())
}

pub fn next(ctx: &Context, channel: &str) -> Result<(), String> {
    let (change, state) = ctx.board().advance(channel).map_err(|e| e.to_string())?;
    println!("Round {}: {}'s turn.", change.round, change.entry.name);
    print_list(&state);
    Ok(())
}

pub fn clear(ctx: &Context, channel: &str) -> Result<(), String> {
    if ctx.board().clear(channel).map_err(|e| e.to_string())? {
        println!("Initiative list cleared.");
    } else {
        println!("  No initiative list to clear.");
    }
    Ok(())
}
