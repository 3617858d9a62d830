//! End-to-end rounds against real timers: coordinator wired to the
//! single-loop scheduler and the simulated host.

use skipvote_application::{CoordinatorConfig, PresentationPort, VoteCoordinator};
use skipvote_domain::{SkipKind, VoteRecord, Voter, WorldId};
use skipvote_infrastructure::{SimulatedHost, SingleLoopScheduler};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// Forwards the interesting transitions into a channel the test awaits.
struct ChannelPresenter {
    tx: mpsc::UnboundedSender<String>,
}

impl PresentationPort for ChannelPresenter {
    fn on_vote_count_changed(&self, _world: &WorldId, _current: u32, _required: u32) {}

    fn on_skip_executing(&self, _world: &WorldId, _votes: &[VoteRecord], _kind: SkipKind) {}

    fn on_skip_completed(&self, _world: &WorldId, votes: &[VoteRecord], kind: SkipKind) {
        let _ = self.tx.send(format!("completed:{kind}:{}", votes.len()));
    }

    fn on_vote_timeout(&self, _world: &WorldId) {
        let _ = self.tx.send("timeout".to_string());
    }

    fn on_cleared(&self, _world: &WorldId) {
        let _ = self.tx.send("cleared".to_string());
    }
}

struct Round {
    coordinator: Arc<VoteCoordinator>,
    host: Arc<SimulatedHost>,
    world: WorldId,
    rx: mpsc::UnboundedReceiver<String>,
}

fn round(players: u32, customize: impl FnOnce(&mut CoordinatorConfig)) -> Round {
    let scheduler = Arc::new(SingleLoopScheduler::new());
    let host = Arc::new(SimulatedHost::new());
    let world = WorldId::new("overworld");
    host.add_world(&world);
    host.set_time(&world, 13_000);
    for i in 1..=players {
        host.join(&world, &skipvote_domain::ParticipantId::new(format!("p{i}")));
    }

    let mut config = CoordinatorConfig {
        skip_delay: Duration::from_millis(100),
        vote_timeout: Duration::from_millis(400),
        natural_end_interval: Duration::from_millis(50),
        ..CoordinatorConfig::default()
    };
    config.enable_world(&world);
    customize(&mut config);

    let (tx, rx) = mpsc::unbounded_channel();
    let coordinator = VoteCoordinator::builder(scheduler, host.clone(), host.clone())
        .config(config)
        .presentation(Arc::new(ChannelPresenter { tx }))
        .build();

    Round {
        coordinator,
        host,
        world,
        rx,
    }
}

async fn expect_event(rx: &mut mpsc::UnboundedReceiver<String>, wanted: &str) {
    loop {
        let event = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for presentation event")
            .expect("presenter channel closed");
        if event == wanted {
            return;
        }
    }
}

#[tokio::test]
async fn test_quorum_round_skips_the_night() {
    let mut round = round(4, |_| {});

    // 4 players at 50% => 2 votes required.
    round
        .coordinator
        .cast_vote(&round.world, &Voter::from("p1"))
        .unwrap();
    let receipt = round
        .coordinator
        .cast_vote(&round.world, &Voter::from("p2"))
        .unwrap();
    assert!(receipt.quorum_met);

    expect_event(&mut round.rx, "completed:night:2").await;
    expect_event(&mut round.rx, "cleared").await;

    // Give the queued world mutation a moment to land.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(round.host.time(&round.world), Some(1_000));
    assert_eq!(round.coordinator.current_votes(&round.world), 0);
}

#[tokio::test]
async fn test_below_quorum_round_times_out() {
    let mut round = round(4, |_| {});

    round
        .coordinator
        .cast_vote(&round.world, &Voter::from("p1"))
        .unwrap();

    expect_event(&mut round.rx, "timeout").await;
    assert_eq!(round.coordinator.current_votes(&round.world), 0);
    // No skip happened; the world is still mid-night.
    assert_eq!(round.host.time(&round.world), Some(13_000));
}

#[tokio::test]
async fn test_natural_dawn_clears_votes_without_skip() {
    let mut round = round(4, |config| {
        // Keep the timeout far away so only the watch can clear.
        config.vote_timeout = Duration::from_secs(60);
    });

    round
        .coordinator
        .cast_vote(&round.world, &Voter::from("p1"))
        .unwrap();

    // Dawn arrives on its own.
    round.host.set_time(&round.world, 2_000);

    expect_event(&mut round.rx, "cleared").await;
    assert_eq!(round.coordinator.current_votes(&round.world), 0);
    // Still no skip: the clock is where the host put it.
    assert_eq!(round.host.time(&round.world), Some(2_000));
}

#[tokio::test]
async fn test_storm_round_clears_weather() {
    let mut round = round(2, |_| {});
    round.host.set_time(&round.world, 6_000);
    round.host.set_storm(&round.world, true);

    round
        .coordinator
        .cast_vote(&round.world, &Voter::from("p1"))
        .unwrap();

    expect_event(&mut round.rx, "completed:storm:1").await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(round.host.is_storm(&round.world), Some(false));
    // Storm skips do not touch the clock.
    assert_eq!(round.host.time(&round.world), Some(6_000));
}
