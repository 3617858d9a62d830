//! Scripted demo round: votes trickle in, quorum is reached, the night
//! gets skipped. Useful as a smoke test of the whole wiring.

use crate::repl::ReplContext;
use skipvote_domain::Voter;
use skipvote_presentation::StatusFormatter;
use std::time::Duration;
use tokio::time::sleep;

pub async fn run(ctx: &ReplContext, skip_delay: Duration) {
    println!();
    println!("Demo round in '{}'", ctx.world);
    println!();

    let required = ctx.coordinator.required_votes(&ctx.world);
    let players = ctx.host.participants(&ctx.world);
    println!(
        "{} players present, {} votes required",
        players.len(),
        required
    );
    println!();

    for participant in players.iter().take(required as usize) {
        let voter = Voter::new(participant.as_str(), participant.as_str());
        if let Err(err) = ctx.coordinator.cast_vote(&ctx.world, &voter) {
            println!("{participant}: {err}");
        }
        sleep(Duration::from_millis(250)).await;
    }

    // Let the countdown elapse and the skip side effects land.
    sleep(skip_delay + Duration::from_millis(500)).await;

    println!();
    print!(
        "{}",
        StatusFormatter::format(&ctx.coordinator.status(&ctx.world))
    );
    if let Some(time) = ctx.host.time(&ctx.world) {
        println!("World clock: {time}");
    }
}
