//! Console adapter for the presentation port.
//!
//! Prints vote progress and skip feedback to stdout. Everything here is
//! plain formatting; the heavy lifting already happened by the time the
//! coordinator calls in, and none of these calls block.

use crate::output::formatter::StatusFormatter;
use colored::Colorize;
use skipvote_application::PresentationPort;
use skipvote_domain::{SkipKind, VoteRecord, WorldId};

/// Console implementation of the presentation port.
pub struct ConsolePresenter;

impl ConsolePresenter {
    pub fn new() -> Self {
        Self
    }

    fn condition_label(kind: SkipKind) -> &'static str {
        match kind {
            SkipKind::Night => "night",
            SkipKind::Storm => "storm",
            SkipKind::Forced => "world state",
        }
    }
}

impl Default for ConsolePresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl PresentationPort for ConsolePresenter {
    fn on_vote_count_changed(&self, world: &WorldId, current: u32, required: u32) {
        println!(
            "  {} {} {}",
            format!("[{world}]").dimmed(),
            StatusFormatter::progress_bar(current, required, 10),
            format!("{current}/{required}").bold()
        );
    }

    fn on_vote_cast(&self, world: &WorldId, record: &VoteRecord, current: u32, required: u32) {
        let remaining = required.saturating_sub(current);
        println!(
            "{} {} voted to skip in {} ({} more needed)",
            "*".cyan(),
            record.display_name().bold(),
            world,
            remaining
        );
    }

    fn on_skip_scheduled(&self, world: &WorldId, delay_secs: u64, kind: SkipKind) {
        println!(
            "{}",
            format!(
                "Quorum reached in {world} - skipping the {} in {delay_secs}s",
                Self::condition_label(kind)
            )
            .yellow()
        );
    }

    fn on_skip_executing(&self, _world: &WorldId, _votes: &[VoteRecord], _kind: SkipKind) {}

    fn on_skip_completed(&self, world: &WorldId, votes: &[VoteRecord], kind: SkipKind) {
        println!(
            "{}",
            format!(
                "The {} was skipped in {world} ({} votes)",
                Self::condition_label(kind),
                votes.len()
            )
            .green()
            .bold()
        );
    }

    fn on_vote_timeout(&self, world: &WorldId) {
        println!(
            "{}",
            format!("Skip vote in {world} timed out").yellow()
        );
    }

    fn on_cleared(&self, world: &WorldId) {
        println!("{}", format!("  [{world}] votes cleared").dimmed());
    }
}
