//! Outbound state notifications.
//!
//! The service tells a [`Broadcaster`] that a game changed after every
//! successful operation. Delivering the new state to clients is the
//! transport's concern; failures are logged by the caller and never undo
//! the operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use terraform_core::{GameId, PlayerId};
use thiserror::Error;
use tokio::sync::broadcast;

#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("no subscriber is listening for game {0}")]
    NoReceivers(GameId),

    #[error("broadcast transport failed: {0}")]
    Transport(String),
}

/// Notice that a game's state changed, optionally caused by one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateUpdate {
    pub game_id: GameId,
    pub player_id: Option<PlayerId>,
    pub timestamp: DateTime<Utc>,
}

pub trait Broadcaster: Send + Sync {
    fn broadcast_game_state(
        &self,
        game: &GameId,
        player: Option<&PlayerId>,
    ) -> Result<(), BroadcastError>;
}

/// Fans state updates out over a tokio broadcast channel.
pub struct ChannelBroadcaster {
    sender: broadcast::Sender<StateUpdate>,
}

impl ChannelBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateUpdate> {
        self.sender.subscribe()
    }
}

impl Broadcaster for ChannelBroadcaster {
    fn broadcast_game_state(
        &self,
        game: &GameId,
        player: Option<&PlayerId>,
    ) -> Result<(), BroadcastError> {
        let update = StateUpdate {
            game_id: game.clone(),
            player_id: player.cloned(),
            timestamp: Utc::now(),
        };
        self.sender
            .send(update)
            .map(|_| ())
            .map_err(|_| BroadcastError::NoReceivers(game.clone()))
    }
}

/// Discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopBroadcaster;

impl Broadcaster for NoopBroadcaster {
    fn broadcast_game_state(
        &self,
        _game: &GameId,
        _player: Option<&PlayerId>,
    ) -> Result<(), BroadcastError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn channel_delivers_updates_to_receivers() {
        let broadcaster = ChannelBroadcaster::new(8);
        let mut receiver = broadcaster.subscribe();

        broadcaster
            .broadcast_game_state(&"g1".into(), Some(&"p1".into()))
            .unwrap();

        let update = receiver.recv().await.unwrap();
        assert_eq!(update.game_id, GameId::from("g1"));
        assert_eq!(update.player_id, Some(PlayerId::from("p1")));
    }

    #[test]
    fn channel_without_receivers_reports_an_error() {
        let broadcaster = ChannelBroadcaster::new(8);
        let result = broadcaster.broadcast_game_state(&"g1".into(), None);
        assert!(matches!(result, Err(BroadcastError::NoReceivers(_))));
    }
}
