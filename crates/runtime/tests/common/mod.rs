use std::sync::Arc;

use terraform_core::{Board, CardId, GameId, PlayerId, PlayerState};
use terraform_runtime::{CardOracleImpl, GameService, NoopBroadcaster, RuntimeConfig};

/// Plays the starting selection for two players, giving each the named
/// corporation and no project cards. The game is in its first action phase
/// afterwards, `p1` to act.
pub async fn create_started_game(
    oracle: CardOracleImpl,
    corporations: [&str; 2],
) -> (GameService, GameId) {
    let service = GameService::in_memory(
        RuntimeConfig::default().with_shuffle_seed(11),
        oracle,
        Arc::new(NoopBroadcaster),
    );
    let game = GameId::from("game-1");
    service
        .create_game(game.clone(), Board::default())
        .await
        .expect("game should be created");
    for (id, name) in [("p1", "Ada"), ("p2", "Grace")] {
        service
            .add_player(&game, id, name)
            .await
            .expect("player should join");
    }
    service.start_game(&game).await.expect("game should start");

    for (id, corporation) in ["p1", "p2"].into_iter().zip(corporations) {
        let player = PlayerId::from(id);
        let corporation = CardId::from(corporation);
        let mut state = player_state(&service, &game, id);
        if let Some(selection) = state.pending_card_selection.as_mut() {
            selection.corporations = vec![corporation.clone()];
        }
        service
            .players()
            .save(&game, &state)
            .expect("offer should be stored");
        service
            .select_starting_cards(&game, &player, &corporation, &[])
            .await
            .expect("starting selection should succeed");
    }

    (service, game)
}

pub fn player_state(service: &GameService, game: &GameId, player: &str) -> PlayerState {
    service
        .players()
        .get(game, &PlayerId::from(player))
        .expect("player should exist")
}

/// Applies `change` to a stored player.
pub fn edit_player(
    service: &GameService,
    game: &GameId,
    player: &str,
    change: impl FnOnce(&mut PlayerState),
) {
    let mut state = player_state(service, game, player);
    change(&mut state);
    service
        .players()
        .save(game, &state)
        .expect("player should be stored");
}
