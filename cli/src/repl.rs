//! Interactive console against the simulated host.
//!
//! A thin command layer: every line maps onto one coordinator entry point
//! or one host mutation, mirroring what a game server's command handler
//! would call.

use colored::Colorize;
use reedline::{DefaultPrompt, DefaultPromptSegment, Reedline, Signal};
use skipvote_application::VoteCoordinator;
use skipvote_domain::{ParticipantId, VoteError, Voter, WorldId};
use skipvote_infrastructure::{RegionScheduler, SimulatedHost};
use skipvote_presentation::StatusFormatter;
use std::sync::Arc;

/// Everything a console command can reach.
pub struct ReplContext {
    pub coordinator: Arc<VoteCoordinator>,
    pub host: Arc<SimulatedHost>,
    pub regions: Option<Arc<RegionScheduler>>,
    pub world: WorldId,
}

impl ReplContext {
    fn player(&self, name: &str) -> ParticipantId {
        ParticipantId::new(name)
    }

    fn require_present(&self, name: &str) -> Option<ParticipantId> {
        let participant = self.player(name);
        if self.host.world_of(&participant).as_ref() == Some(&self.world) {
            Some(participant)
        } else {
            println!(
                "{}",
                format!("{name} is not in {} (use: join {name})", self.world).red()
            );
            None
        }
    }
}

/// Run the console until quit/EOF.
pub fn run(ctx: &ReplContext) {
    print_welcome(ctx);

    let mut line_editor = Reedline::create();
    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic("skipvote".to_string()),
        DefaultPromptSegment::Empty,
    );

    loop {
        match line_editor.read_line(&prompt) {
            Ok(Signal::Success(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if handle_line(ctx, line) {
                    break;
                }
            }
            Ok(Signal::CtrlC) => {
                println!("^C");
            }
            Ok(Signal::CtrlD) => {
                println!("Bye!");
                break;
            }
            Err(err) => {
                eprintln!("Error: {err:?}");
                break;
            }
        }
    }
}

fn print_welcome(ctx: &ReplContext) {
    println!();
    println!("Skipvote console - world '{}'", ctx.world);
    println!(
        "Players: {}",
        ctx.host
            .participants(&ctx.world)
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("Type 'help' for commands.");
    println!();
}

/// Returns true when the console should exit.
fn handle_line(ctx: &ReplContext, line: &str) -> bool {
    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    match (command, args.as_slice()) {
        ("vote", [name]) => {
            if let Some(participant) = ctx.require_present(name) {
                report(ctx.coordinator.cast_vote(
                    &ctx.world,
                    &Voter::new(participant.as_str(), *name),
                ));
            }
        }
        ("unvote", [name]) => {
            report(ctx.coordinator.withdraw_vote(&ctx.world, &ctx.player(name)));
        }
        ("force", [name]) => {
            match ctx
                .coordinator
                .force_skip(&ctx.world, &Voter::new(*name, *name))
            {
                Ok(()) => {}
                Err(err) => println!("{}", err.to_string().red()),
            }
        }
        ("cancel", []) => {
            ctx.coordinator.clear_votes(&ctx.world);
        }
        ("status", []) => {
            print!("{}", StatusFormatter::format(&ctx.coordinator.status(&ctx.world)));
        }
        ("status", ["json"]) => {
            println!(
                "{}",
                StatusFormatter::format_json(&ctx.coordinator.status(&ctx.world))
            );
        }
        ("join", [name]) => {
            let participant = ctx.player(name);
            ctx.host.join(&ctx.world, &participant);
            if let Some(regions) = &ctx.regions {
                regions.register_participant(&participant);
            }
            println!("{name} joined {}", ctx.world);
        }
        ("leave", [name]) => {
            let participant = ctx.player(name);
            ctx.host.leave(&ctx.world, &participant);
            ctx.coordinator.participant_left(&ctx.world, &participant);
            if let Some(regions) = &ctx.regions {
                regions.retire_participant(&participant);
            }
            println!("{name} left {}", ctx.world);
        }
        ("exempt", [name]) => {
            ctx.host.set_exempt(&ctx.player(name), true);
            println!("{name} is now exempt from voting");
        }
        ("unexempt", [name]) => {
            ctx.host.set_exempt(&ctx.player(name), false);
            println!("{name} counts toward quorum again");
        }
        ("time", [value]) => {
            let ticks = match *value {
                "night" => Some(13_000),
                "day" => Some(6_000),
                other => other.parse::<u64>().ok(),
            };
            match ticks {
                Some(ticks) => {
                    ctx.host.set_time(&ctx.world, ticks);
                    ctx.coordinator.condition_cleared(&ctx.world);
                    println!("time set to {ticks}");
                }
                None => println!("{}", "usage: time <ticks|night|day>".red()),
            }
        }
        ("storm", [state @ ("on" | "off")]) => {
            ctx.host.set_storm(&ctx.world, *state == "on");
            ctx.coordinator.condition_cleared(&ctx.world);
            println!("storm {state}");
        }
        ("players", []) => {
            for participant in ctx.host.participants(&ctx.world) {
                let voted = ctx.coordinator.has_voted(&ctx.world, &participant);
                println!(
                    "  {participant}{}",
                    if voted { " [voted]".green() } else { "".normal() }
                );
            }
        }
        ("enable", []) => {
            ctx.coordinator.enable_world(&ctx.world);
            println!("voting enabled in {}", ctx.world);
        }
        ("disable", []) => {
            ctx.coordinator.disable_world(&ctx.world);
            println!("voting disabled in {}", ctx.world);
        }
        ("help", _) => print_help(),
        ("quit" | "exit", _) => {
            println!("Bye!");
            return true;
        }
        _ => {
            println!("{}", format!("unknown command: {line} (try 'help')").red());
        }
    }
    false
}

fn report<T>(result: Result<T, VoteError>) {
    if let Err(err) = result {
        println!("{}", err.to_string().red());
    }
}

fn print_help() {
    println!("Commands:");
    println!("  vote <name>       cast a skip vote");
    println!("  unvote <name>     withdraw a vote");
    println!("  force <name>      skip immediately, bypassing quorum");
    println!("  cancel            clear all votes in the world");
    println!("  status [json]     show vote progress");
    println!("  join/leave <name> player session management");
    println!("  exempt/unexempt <name>  toggle quorum exemption");
    println!("  time <ticks|night|day>  move the world clock");
    println!("  storm <on|off>    toggle the storm");
    println!("  players           list players and who voted");
    println!("  enable/disable    toggle voting in this world");
    println!("  quit              leave the console");
}
