//! Status and progress text rendering.

use skipvote_application::VoteStatus;

/// Renders vote status for the console.
pub struct StatusFormatter;

impl StatusFormatter {
    /// A fixed-width progress bar like `[██████░░░░]`.
    pub fn progress_bar(current: u32, required: u32, width: usize) -> String {
        let fraction = if required == 0 {
            0.0
        } else {
            (f64::from(current) / f64::from(required)).min(1.0)
        };
        let filled = (fraction * width as f64).round() as usize;

        let mut bar = String::with_capacity(width + 2);
        bar.push('[');
        for i in 0..width {
            bar.push(if i < filled { '█' } else { '░' });
        }
        bar.push(']');
        bar
    }

    /// Multi-line human-readable status block.
    pub fn format(status: &VoteStatus) -> String {
        let mut out = String::new();
        out.push_str(&format!("World: {}\n", status.world));
        out.push_str(&format!(
            "Voting: {}\n",
            if status.enabled { "enabled" } else { "disabled" }
        ));
        out.push_str(&format!(
            "Condition: {}\n",
            status
                .condition
                .map_or_else(|| "none".to_string(), |kind| kind.to_string())
        ));
        out.push_str(&format!(
            "Votes: {}/{} {} {}%\n",
            status.current,
            status.required,
            Self::progress_bar(status.current, status.required, 10),
            status.progress_percent()
        ));
        if status.countdown_active {
            out.push_str("Skip countdown is running\n");
        }
        if status.executing {
            out.push_str("Skip is executing\n");
        }
        out
    }

    /// JSON rendering of the same snapshot.
    pub fn format_json(status: &VoteStatus) -> String {
        serde_json::to_string_pretty(status).unwrap_or_else(|_| "{}".to_string())
    }
}
