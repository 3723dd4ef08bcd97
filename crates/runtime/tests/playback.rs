//! Paced hit playback and event bridging through the combat handle.
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::Instant;

use combat_core::{
    CombatConfig, EffectDuration, EntityId, HitEvent, PeakHit, PhaseEvent, Roster,
    StatusEffectKind, StatusEvent, TurnPhase, VitalsEvent,
};
use combat_runtime::{CombatHandle, Event, RuntimeConfig, RuntimeError, Topic};

const INTERVAL: Duration = Duration::from_millis(100);

fn handle() -> (CombatHandle, EntityId) {
    let config = RuntimeConfig {
        combat: CombatConfig::new().with_hit_interval(INTERVAL),
        ..RuntimeConfig::default()
    };
    let handle = CombatHandle::new(config, Roster::default());
    let enemy = handle.spawn(100);
    handle.with_battle_mut(|battle| {
        *battle.resolver_mut() = Roster::default().with_enemy(enemy);
    });
    (handle, enemy)
}

fn volley(target: EntityId, damage: &[f64]) -> Vec<PeakHit> {
    damage
        .iter()
        .enumerate()
        .map(|(order, &amount)| PeakHit::new(target, amount, order as i32))
        .collect()
}

fn health(handle: &CombatHandle, id: EntityId) -> u32 {
    handle.with_battle(|battle| battle.registry().vitals(id).unwrap().health())
}

fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[test]
fn resolve_hits_publishes_hit_and_vitals_events() {
    let (handle, enemy) = handle();
    let mut hits_rx = handle.subscribe(Topic::Hits);
    let mut vitals_rx = handle.subscribe(Topic::Vitals);

    let summary = handle.resolve_hits(&volley(enemy, &[30.0, 30.0])).unwrap();

    assert_eq!(summary.hits, 2);
    assert_eq!(health(&handle, enemy), 40);

    let hits = drain(&mut hits_rx);
    assert!(matches!(hits.first(), Some(Event::Hit(HitEvent::SequenceStarted { .. }))));
    assert_eq!(
        hits.iter()
            .filter(|event| matches!(event, Event::Hit(HitEvent::HitResolved { .. })))
            .count(),
        2
    );
    assert!(matches!(
        hits.last(),
        Some(Event::Hit(HitEvent::SequenceCompleted { summary })) if !summary.cancelled
    ));

    let vitals = drain(&mut vitals_rx);
    assert!(vitals.iter().all(|event| event.entity() == Some(enemy)));
    assert!(vitals.contains(&Event::Vitals(VitalsEvent::HealthChanged {
        entity: enemy,
        health: 40,
        max: 100,
    })));
}

#[tokio::test(start_paused = true)]
async fn paced_playback_waits_between_settled_hits() {
    let (handle, enemy) = handle();
    let start = Instant::now();

    let summary = handle.play_hits(&volley(enemy, &[10.0, 10.0, 10.0])).await.unwrap();

    let elapsed = start.elapsed();
    assert_eq!(summary.hits, 3);
    assert!(elapsed >= INTERVAL * 2, "elapsed {elapsed:?}");
    assert!(elapsed < INTERVAL * 3, "elapsed {elapsed:?}");
    assert_eq!(health(&handle, enemy), 70);
}

#[tokio::test(start_paused = true)]
async fn skipped_hits_do_not_wait() {
    let (handle, enemy) = handle();
    let start = Instant::now();

    let summary = handle.play_hits(&volley(enemy, &[999.0, 10.0, 10.0])).await.unwrap();

    let elapsed = start.elapsed();
    assert_eq!(summary.hits, 1);
    assert_eq!(summary.deaths, 1);
    assert_eq!(summary.skipped, 2);
    assert!(elapsed >= INTERVAL && elapsed < INTERVAL * 2, "elapsed {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn zero_interval_playback_does_not_sleep() {
    let config = RuntimeConfig {
        combat: CombatConfig::new().with_hit_interval(Duration::ZERO),
        ..RuntimeConfig::default()
    };
    let handle = CombatHandle::new(config, Roster::default());
    let enemy = handle.spawn(50);
    let start = Instant::now();

    let summary = handle.play_hits(&volley(enemy, &[5.0, 5.0])).await.unwrap();

    assert_eq!(summary.hits, 2);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn overlapping_sequences_are_rejected() {
    let (handle, enemy) = handle();
    let player = handle.clone();
    let hits = volley(enemy, &[30.0, 30.0, 30.0]);
    let task = tokio::spawn(async move { player.play_hits(&hits).await });

    tokio::time::sleep(INTERVAL / 2).await;

    assert!(handle.is_playing());
    assert_eq!(health(&handle, enemy), 70);
    assert!(matches!(
        handle.resolve_hits(&volley(enemy, &[1.0])),
        Err(RuntimeError::PlaybackInFlight)
    ));
    assert!(matches!(
        handle.play_hits(&volley(enemy, &[1.0])).await,
        Err(RuntimeError::PlaybackInFlight)
    ));

    let summary = task.await.unwrap().unwrap();
    assert_eq!(summary.hits, 3);
    assert!(!handle.is_playing());
    assert_eq!(health(&handle, enemy), 10);
}

#[tokio::test(start_paused = true)]
async fn dropping_playback_cancels_remaining_hits() {
    let (handle, enemy) = handle();
    let mut hits_rx = handle.subscribe(Topic::Hits);
    let player = handle.clone();
    let hits = volley(enemy, &[20.0, 20.0, 20.0, 20.0]);
    let task = tokio::spawn(async move { player.play_hits(&hits).await });

    tokio::time::sleep(INTERVAL + INTERVAL / 2).await;
    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());

    assert!(!handle.is_playing());
    assert!(!handle.with_battle(|battle| battle.pipeline().is_processing()));
    assert_eq!(health(&handle, enemy), 60);

    let events = drain(&mut hits_rx);
    assert!(matches!(
        events.last(),
        Some(Event::Hit(HitEvent::SequenceCompleted { summary }))
            if summary.cancelled && summary.hits == 2
    ));

    // The claim is released, so the next sequence plays normally.
    let summary = handle.resolve_hits(&volley(enemy, &[10.0])).unwrap();
    assert_eq!(summary.hits, 1);
}

#[test]
fn phase_changes_reach_the_phase_topic() {
    let (handle, _) = handle();
    let mut phases_rx = handle.subscribe(Topic::Phase);

    handle.start().unwrap();
    handle.end_turn().unwrap();

    let phases: Vec<(TurnPhase, u32)> = drain(&mut phases_rx)
        .into_iter()
        .filter_map(|event| match event {
            Event::Phase(PhaseEvent { phase, turn }) => Some((phase, turn)),
            _ => None,
        })
        .collect();
    assert_eq!(
        phases,
        vec![
            (TurnPhase::GameStart, 0),
            (TurnPhase::TurnStart, 1),
            (TurnPhase::TurnPlaying, 1),
            (TurnPhase::TurnEnd, 1),
            (TurnPhase::TurnStart, 2),
            (TurnPhase::TurnPlaying, 2),
        ]
    );
}

#[test]
fn illegal_phase_call_surfaces_phase_error() {
    let (handle, _) = handle();

    assert!(matches!(handle.end_turn(), Err(RuntimeError::Phase(_))));
}

#[test]
fn status_changes_reach_the_status_topic() {
    let (handle, enemy) = handle();
    let mut status_rx = handle.subscribe(Topic::Status);

    handle.with_battle_mut(|battle| {
        battle.registry_mut().modifiers_mut(enemy).unwrap().add_effect(
            "sunder",
            StatusEffectKind::DamageTakenIncrease,
            1.5,
            EffectDuration::Turns(2),
        );
    });

    let events = drain(&mut status_rx);
    assert_eq!(events.len(), 2);
    assert!(matches!(
        &events[0],
        Event::Status(StatusEvent::Added { entity, effect })
            if *entity == enemy && effect.name == "sunder"
    ));
    assert!(matches!(
        &events[1],
        Event::Status(StatusEvent::Updated { effects, .. }) if effects.len() == 1
    ));
}

#[test]
fn events_serialize_as_tagged_json() {
    let event = Event::Vitals(VitalsEvent::Died { entity: EntityId(2) });

    let json = serde_json::to_value(&event).unwrap();

    assert_eq!(json, serde_json::json!({ "Vitals": { "Died": { "entity": 2 } } }));
}
