//! End-to-end action scenarios through the public service API.

mod common;

use common::{create_started_game, edit_player, player_state};
use terraform_core::{
    Behavior, Card, CardId, CardKind, CardPayment, ConditionKind, GameConfig, HexCoordinate,
    PlayerId, ResourceEffect, ResourceKind, ResourceSet, StandardProject, Tag, TileKind, Trigger,
    TriggerCondition, TriggerKind,
};
use terraform_runtime::{
    ActionError, CardActionRequest, CardOracleImpl, DomainEvent, PlayCardRequest, ProjectRequest,
    events::GameStateChanged,
};

fn create_test_catalog() -> CardOracleImpl {
    CardOracleImpl::new()
        .with_card(
            Card::new("tharsis", "Tharsis Republic", CardKind::Corporation, 0)
                .with_starting_resources(ResourceSet::credits(40))
                .with_behavior(
                    Behavior::new(Trigger::of(TriggerKind::AutoCorporationFirstAction))
                        .with_output(ResourceEffect::new(ResourceKind::CityPlacement, 1)),
                ),
        )
        .with_card(
            Card::new("ecoline", "Ecoline", CardKind::Corporation, 0)
                .with_starting_resources(ResourceSet::credits(36)),
        )
        .with_card(
            Card::new("foundry", "Foundry", CardKind::Automated, 6)
                .with_tags([Tag::Building])
                .with_behavior(
                    Behavior::new(Trigger::auto())
                        .with_output(ResourceEffect::new(ResourceKind::SteelProduction, 1)),
                ),
        )
        .with_card(
            Card::new("settlement", "Settlement", CardKind::Automated, 10).with_behavior(
                Behavior::new(Trigger::auto())
                    .with_output(ResourceEffect::new(ResourceKind::CityPlacement, 1))
                    .with_output(ResourceEffect::new(ResourceKind::GreeneryPlacement, 1)),
            ),
        )
        .with_card(
            Card::new("lichen", "Lichen Bloom", CardKind::Event, 4).with_behavior(
                Behavior::new(Trigger::auto())
                    .with_output(ResourceEffect::new(ResourceKind::Oxygen, 5)),
            ),
        )
        .with_card(
            Card::new("smelter", "Smelter", CardKind::Active, 0).with_behavior(
                Behavior::new(Trigger::manual())
                    .with_input(ResourceEffect::new(ResourceKind::Credits, 5))
                    .with_input(ResourceEffect::new(ResourceKind::Energy, 3))
                    .with_output(ResourceEffect::new(ResourceKind::Titanium, 2)),
            ),
        )
        .with_card(create_test_greenhouse())
}

fn create_test_greenhouse() -> Card {
    Card::new("greenhouse", "Greenhouse", CardKind::Active, 0).with_behavior(
        Behavior::new(Trigger::on(TriggerCondition::new(
            ConditionKind::TemperatureRaise,
        )))
        .with_output(ResourceEffect::new(ResourceKind::Credits, 2)),
    )
}

/// Scenario: a corporation with a forced first city.
/// 1. Every other action is refused while the city is queued.
/// 2. Placing it clears the forced action and spends one action.
/// 3. Listeners are told the player's state changed.
#[tokio::test]
async fn forced_first_action_must_be_resolved_first() {
    let (service, game) = create_started_game(create_test_catalog(), ["tharsis", "ecoline"]).await;
    let p1: PlayerId = "p1".into();

    let state = player_state(&service, &game, "p1");
    let forced = state
        .forced_first_action
        .as_ref()
        .expect("forced action should be set");
    assert_eq!(forced.action_type, TileKind::City);
    assert_eq!(state.tile_queue.len(), 1);
    assert_eq!(state.resources.credits, 40);

    let err = service
        .play_standard_project(&game, &p1, ProjectRequest::new(StandardProject::PowerPlant))
        .await
        .expect_err("actions should wait for the forced tile");
    assert!(matches!(err, ActionError::TilePlacementPending { remaining: 1, .. }));

    let mut tap = service.bus().tap();
    service
        .select_tile(&game, &p1, HexCoordinate::new(0, 0))
        .await
        .expect("city should be placed");

    let state = player_state(&service, &game, "p1");
    assert!(state.forced_first_action.is_none());
    assert!(state.tile_queue.is_empty());
    assert_eq!(state.available_actions, 1);
    let changed = std::iter::from_fn(|| tap.try_recv().ok())
        .any(|event| GameStateChanged::from_event(&event).is_some());
    assert!(changed, "state change should be published");

    let game_state = service.games().get(&game).expect("game should exist");
    assert_eq!(game_state.current_turn, Some(p1));
}

/// Scenario: steel covers part of a building card's cost.
#[tokio::test]
async fn steel_pays_for_building_cards() {
    let (service, game) = create_started_game(create_test_catalog(), ["ecoline", "ecoline"]).await;
    edit_player(&service, &game, "p1", |player| {
        player.hand.push("foundry".into());
        player.resources.steel = 3;
    });

    service
        .play_card(
            &game,
            &"p1".into(),
            PlayCardRequest::new("foundry", CardPayment::default().with_steel(3)),
        )
        .await
        .expect("steel should cover the cost");

    let state = player_state(&service, &game, "p1");
    assert_eq!(state.resources.steel, 0);
    assert_eq!(state.resources.credits, 36);
    assert_eq!(state.production.steel, 1);
    assert_eq!(state.played_cards, vec![CardId::from("foundry")]);
}

/// Scenario: both players own a temperature trigger, only the raiser earns.
#[tokio::test]
async fn temperature_trigger_rewards_only_the_raiser() {
    let (service, game) = create_started_game(create_test_catalog(), ["ecoline", "ecoline"]).await;
    let greenhouse = create_test_greenhouse();
    for player in ["p1", "p2"] {
        service
            .subscriber()
            .subscribe_card_effects(&game, &player.into(), &greenhouse)
            .expect("trigger should register");
    }
    let mut state = service.games().get(&game).expect("game should exist");
    state.global_parameters.temperature = 4;
    service.games().save(&state).expect("game should be stored");
    edit_player(&service, &game, "p1", |player| {
        player.resources.heat = GameConfig::HEAT_PER_TEMPERATURE;
    });

    service
        .convert_heat_to_temperature(&game, &"p1".into())
        .await
        .expect("heat conversion should succeed");

    let state = service.games().get(&game).expect("game should exist");
    assert_eq!(state.global_parameters.temperature, 6);
    let p1 = player_state(&service, &game, "p1");
    let p2 = player_state(&service, &game, "p2");
    assert_eq!(p1.resources.heat, 0);
    assert_eq!(p1.resources.credits, 36 + 2);
    assert_eq!(p1.terraform_rating, 21);
    assert_eq!(p2.resources.credits, 36);
}

/// Scenario: one card queues a city and a greenery.
/// 1. The tiles are placed in the order the card listed them.
/// 2. The turn stays with the player until both are down.
#[tokio::test]
async fn queued_tiles_are_placed_in_card_order() {
    let (service, game) = create_started_game(create_test_catalog(), ["ecoline", "ecoline"]).await;
    let p1: PlayerId = "p1".into();
    edit_player(&service, &game, "p1", |player| {
        player.hand.push("settlement".into());
        player.available_actions = 1;
    });

    service
        .play_card(&game, &p1, PlayCardRequest::new("settlement", CardPayment::credits(10)))
        .await
        .expect("card should be played");
    let queued: Vec<_> = player_state(&service, &game, "p1")
        .tile_queue
        .iter()
        .map(|tile| tile.kind)
        .collect();
    assert_eq!(queued, vec![TileKind::City, TileKind::Greenery]);

    let first = service
        .select_tile(&game, &p1, HexCoordinate::new(0, 0))
        .await
        .expect("city should be placed");
    assert_eq!(first.kind, TileKind::City);
    assert_eq!(
        service.games().get(&game).expect("game").current_turn,
        Some(p1.clone())
    );

    let second = service
        .select_tile(&game, &p1, HexCoordinate::new(1, -1))
        .await
        .expect("greenery should be placed");
    assert_eq!(second.kind, TileKind::Greenery);

    let state = service.games().get(&game).expect("game should exist");
    assert_eq!(state.global_parameters.oxygen, 1);
    assert_eq!(state.current_turn, Some(PlayerId::from("p2")));
}

/// Scenario: an oxygen output larger than the remaining room is clamped and
/// rated by the steps actually taken.
#[tokio::test]
async fn oxygen_output_is_clamped_at_the_maximum() {
    let (service, game) = create_started_game(create_test_catalog(), ["ecoline", "ecoline"]).await;
    let mut state = service.games().get(&game).expect("game should exist");
    state.global_parameters.oxygen = 12;
    service.games().save(&state).expect("game should be stored");
    edit_player(&service, &game, "p1", |player| player.hand.push("lichen".into()));

    service
        .play_card(&game, &"p1".into(), PlayCardRequest::new("lichen", CardPayment::credits(4)))
        .await
        .expect("card should be played");

    let state = service.games().get(&game).expect("game should exist");
    assert_eq!(state.global_parameters.oxygen, GameConfig::MAX_OXYGEN);
    assert_eq!(player_state(&service, &game, "p1").terraform_rating, 22);
}

/// Scenario: a card action whose second input is short takes nothing.
#[tokio::test]
async fn card_action_inputs_are_all_or_nothing() {
    let (service, game) = create_started_game(create_test_catalog(), ["ecoline", "ecoline"]).await;
    let p1: PlayerId = "p1".into();
    edit_player(&service, &game, "p1", |player| {
        player.hand.push("smelter".into());
        player.resources.energy = 2;
    });
    service
        .play_card(&game, &p1, PlayCardRequest::new("smelter", CardPayment::default()))
        .await
        .expect("card should be played");

    let err = service
        .play_card_action(&game, &p1, CardActionRequest::new("smelter", 0))
        .await
        .expect_err("energy is short");

    assert!(matches!(err, ActionError::Effect(_)));
    let state = player_state(&service, &game, "p1");
    assert_eq!(state.resources.credits, 36);
    assert_eq!(state.resources.energy, 2);
    assert_eq!(state.resources.titanium, 0);
    assert_eq!(state.available_actions, 1);
    assert_eq!(
        state
            .action(&"smelter".into(), 0)
            .expect("action should be registered")
            .play_count,
        0
    );
}
