mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use game_core::{CombatType, HookOutcome, Species, SpeakKind, Tick, WorldEvent};
use runtime::{Event, FnHook, HookRegistry, RuntimeError, Topic};

use common::ground;

#[tokio::test]
async fn monsters_chase_visible_players() {
    let runtime = common::runtime(HookRegistry::new()).await;
    let handle = runtime.handle();

    let alice = handle
        .spawn_player("Alice", 1, ground(13, 10), 150)
        .await
        .unwrap();
    let orc = handle.spawn_monster("orc", ground(10, 10)).await.unwrap();

    let tick = handle.step(4).await.unwrap();
    assert_eq!(tick, Tick(4000));

    let snapshot = handle.snapshot().await.unwrap();
    let view = snapshot.creature(orc).unwrap();
    assert_eq!(view.follow, Some(alice));
    assert!(view.targets.contains(&alice));
    assert!(view.position.chebyshev(ground(13, 10)) < 3);
    assert!(snapshot.active_monsters.contains(&orc));

    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn world_events_are_published_with_their_tick() {
    let runtime = common::runtime(HookRegistry::new()).await;
    let handle = runtime.handle();
    let mut world = handle.subscribe(Topic::World);
    let mut clock = handle.subscribe(Topic::Clock);

    let orc = handle.spawn_monster("orc", ground(5, 5)).await.unwrap();
    match world.recv().await.unwrap() {
        Event::World(record) => {
            assert_eq!(record.tick, Tick::ZERO);
            assert!(matches!(
                record.event,
                WorldEvent::CreatureAppeared { creature, .. } if creature == orc
            ));
        }
        other => panic!("unexpected event {other:?}"),
    }

    handle.step(1).await.unwrap();
    match clock.recv().await.unwrap() {
        Event::TickCompleted(done) => assert_eq!(done.tick, Tick(1000)),
        other => panic!("unexpected event {other:?}"),
    }

    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn unknown_species_is_reported_to_the_caller() {
    let runtime = common::runtime(HookRegistry::new()).await;
    let handle = runtime.handle();

    let error = handle
        .spawn_monster("dragon lord", ground(5, 5))
        .await
        .unwrap_err();
    assert!(matches!(error, RuntimeError::Engine(_)));

    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn lethal_damage_leaves_a_corpse_owned_by_the_killer() {
    let runtime = common::runtime(HookRegistry::new()).await;
    let handle = runtime.handle();
    let mut world = handle.subscribe(Topic::World);

    let alice = handle
        .spawn_player("Alice", 1, ground(11, 10), 150)
        .await
        .unwrap();
    let orc = handle.spawn_monster("orc", ground(10, 10)).await.unwrap();

    handle
        .change_health(orc, Some(alice), CombatType::Physical, -1000)
        .await
        .unwrap();

    let mut corpse = None;
    while let Ok(Event::World(record)) = world.try_recv() {
        if let WorldEvent::CorpseCreated {
            creature, owner, ..
        } = record.event
        {
            corpse = Some((creature, owner));
        }
    }
    assert_eq!(corpse, Some((orc, Some(alice))));

    let snapshot = handle.snapshot().await.unwrap();
    assert!(snapshot.creature(orc).is_none());

    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn think_hook_can_veto_target_selection() {
    let thinks = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&thinks);
    let hooks = HookRegistry::new().with_hook(
        "frozen",
        Arc::new(FnHook::new(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(HookOutcome::Stop)
        })),
    );

    let mut statue_species = Species::new("statue");
    statue_species.scripts.think = Some("frozen".to_owned());
    let oracles = runtime::OracleManager::new(
        Arc::new(runtime::GridMap::open(32, 32)),
        Arc::new(runtime::SpeciesCatalog::new([statue_species])),
        Arc::new(hooks),
        Arc::new(game_core::GameConfig::default()),
    );
    let runtime = runtime::Runtime::builder()
        .config(common::stepped_config())
        .oracles(oracles)
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();

    handle
        .spawn_player("Alice", 1, ground(12, 10), 150)
        .await
        .unwrap();
    let statue = handle.spawn_monster("statue", ground(10, 10)).await.unwrap();
    handle.step(3).await.unwrap();

    assert_eq!(thinks.load(Ordering::SeqCst), 3);
    let snapshot = handle.snapshot().await.unwrap();
    let view = snapshot.creature(statue).unwrap();
    assert_eq!(view.follow, None);
    assert_eq!(view.attacked, None);

    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn players_can_speak_and_move() {
    let runtime = common::runtime(HookRegistry::new()).await;
    let handle = runtime.handle();
    let mut world = handle.subscribe(Topic::World);

    let alice = handle
        .spawn_player("Alice", 1, ground(3, 3), 150)
        .await
        .unwrap();
    handle.move_player(alice, ground(4, 3)).await.unwrap();
    handle.move_player(alice, ground(20, 20)).await.unwrap();
    handle.say(alice, SpeakKind::Say, "hello").await.unwrap();

    let mut kinds = Vec::new();
    while let Ok(Event::World(record)) = world.try_recv() {
        kinds.push(match record.event {
            WorldEvent::CreatureAppeared { .. } => "appeared",
            WorldEvent::CreatureMoved { .. } => "moved",
            WorldEvent::CreatureTeleported { .. } => "teleported",
            WorldEvent::CreatureSay { .. } => "say",
            _ => "other",
        });
    }
    assert_eq!(kinds, vec!["appeared", "moved", "teleported", "say"]);

    let orc = handle.spawn_monster("orc", ground(10, 10)).await.unwrap();
    let error = handle.move_player(orc, ground(11, 10)).await.unwrap_err();
    assert!(matches!(error, RuntimeError::Engine(_)));

    drop(handle);
    runtime.shutdown().await.unwrap();
}
