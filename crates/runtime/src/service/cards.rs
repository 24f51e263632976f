use chrono::Utc;
use terraform_core::{
    Card, CardId, CardPayment, GameId, PlayerId, ResourceEffect, Tag, card_discount,
    effective_cost, validate_requirements,
};
use tracing::{info, warn};

use super::GameService;
use crate::effects::EffectContext;
use crate::error::{ActionError, Result};
use crate::events::CardPlayed;

/// A project card to play from the hand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayCardRequest {
    pub card: CardId,
    pub payment: CardPayment,
    /// Option picked for behaviors that offer choices.
    pub choice: Option<usize>,
    /// Card receiving `any-card` storage outputs.
    pub storage_target: Option<CardId>,
    /// Player hit by `any-player` and `steal-any-player` outputs.
    pub target_player: Option<PlayerId>,
}

impl PlayCardRequest {
    pub fn new(card: impl Into<CardId>, payment: CardPayment) -> Self {
        Self {
            card: card.into(),
            payment,
            choice: None,
            storage_target: None,
            target_player: None,
        }
    }

    #[must_use]
    pub fn with_choice(mut self, choice: usize) -> Self {
        self.choice = Some(choice);
        self
    }

    #[must_use]
    pub fn with_storage_target(mut self, card: impl Into<CardId>) -> Self {
        self.storage_target = Some(card.into());
        self
    }

    #[must_use]
    pub fn with_target_player(mut self, player: impl Into<PlayerId>) -> Self {
        self.target_player = Some(player.into());
        self
    }
}

/// A manual action printed on a played card or corporation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardActionRequest {
    pub card: CardId,
    pub behavior_index: usize,
    pub choice: Option<usize>,
    pub target_card: Option<CardId>,
    pub target_player: Option<PlayerId>,
}

impl CardActionRequest {
    pub fn new(card: impl Into<CardId>, behavior_index: usize) -> Self {
        Self {
            card: card.into(),
            behavior_index,
            choice: None,
            target_card: None,
            target_player: None,
        }
    }

    #[must_use]
    pub fn with_choice(mut self, choice: usize) -> Self {
        self.choice = Some(choice);
        self
    }

    #[must_use]
    pub fn with_target_card(mut self, card: impl Into<CardId>) -> Self {
        self.target_card = Some(card.into());
        self
    }

    #[must_use]
    pub fn with_target_player(mut self, player: impl Into<PlayerId>) -> Self {
        self.target_player = Some(player.into());
        self
    }
}

/// Card play and card actions.
impl GameService {
    /// Plays a card from the hand.
    ///
    /// Everything is validated up front: turn and actions, requirements, the
    /// discounted cost against the payment, and the behavior inputs against
    /// what the player holds after paying. Then the payment is deducted, the
    /// card moves to the tableau with its starting storage, its immediate
    /// behaviors resolve, its lasting effects are registered, `CardPlayed` is
    /// published and one action is consumed.
    pub async fn play_card(
        &self,
        game: &GameId,
        player: &PlayerId,
        request: PlayCardRequest,
    ) -> Result<()> {
        let _guard = self.lock_game(game).await;
        let session = self.action_session(game, player)?;
        let state = session.player(player)?;

        if !state.has_in_hand(&request.card) {
            return Err(ActionError::CardNotInHand {
                player: player.clone(),
                card: request.card,
            });
        }
        let card = self.card(&request.card)?;
        let (inputs, outputs) = immediate_effects(&card, request.choice)?;

        for requirement in card.requirements.iter().filter(|r| !r.is_evaluable()) {
            warn!(
                target: "runtime::service",
                card = %card.id,
                kind = %requirement.kind,
                "requirement cannot be evaluated, skipped"
            );
        }
        let failures = validate_requirements(
            &card,
            &session.game,
            state,
            &self.applier.tag_counts(state),
        );
        if !failures.is_empty() {
            return Err(ActionError::Requirements(failures));
        }

        let cost = effective_cost(card.cost, card_discount(&state.effects, &card));
        request.payment.covers_cost(
            cost,
            card.has_tag(Tag::Building),
            card.has_tag(Tag::Space),
            &state.payment_substitutes,
        )?;
        request.payment.can_afford(&state.resources)?;

        let ctx = EffectContext::for_player(game, player, card.name.clone())
            .with_source_card(card.id.clone())
            .with_target_card(request.storage_target.clone())
            .with_target_player(request.target_player.clone());
        let mut after_payment = state.clone();
        after_payment
            .resources
            .add_all(&request.payment.as_resource_set().negated());
        if let Some(storage) = &card.resource_storage {
            after_payment.card_storage.insert(card.id.clone(), storage.starting);
        }
        self.applier.check_inputs(&ctx, &after_payment, &inputs)?;

        let spent = request.payment.as_resource_set();
        if !spent.is_empty() {
            self.applier
                .adjust_resources(game, player, &spent.negated())?;
        }
        self.players.move_to_played(game, player, &card.id)?;
        if let Some(storage) = &card.resource_storage {
            self.players
                .update_card_storage(game, player, &card.id, storage.starting)?;
        }

        self.applier.apply_inputs(&ctx, &inputs)?;
        self.applier.apply_outputs(&ctx, &outputs)?;
        self.subscriber.subscribe_card_effects(game, player, &card)?;
        self.publish(CardPlayed {
            game_id: game.clone(),
            player_id: player.clone(),
            card_id: card.id.clone(),
            card_name: card.name.clone(),
            card_kind: card.kind,
            tags: card.tags.clone(),
            cost: card.cost,
            timestamp: Utc::now(),
        });

        let outcome = self.consume_action(game, player)?;
        info!(
            target: "runtime::service",
            game = %game,
            player = %player,
            card = %card.id,
            cost,
            remaining = outcome.remaining,
            "card played"
        );
        self.broadcast(game, Some(player));
        Ok(())
    }

    /// Runs a manual action once per generation.
    pub async fn play_card_action(
        &self,
        game: &GameId,
        player: &PlayerId,
        request: CardActionRequest,
    ) -> Result<()> {
        let _guard = self.lock_game(game).await;
        let session = self.action_session(game, player)?;
        let state = session.player(player)?;

        let action = state
            .action(&request.card, request.behavior_index)
            .ok_or_else(|| ActionError::ActionNotFound {
                card: request.card.clone(),
                behavior_index: request.behavior_index,
            })?;
        if action.play_count > 0 {
            return Err(ActionError::ActionAlreadyPlayed {
                card: request.card,
                behavior_index: request.behavior_index,
            });
        }
        let (inputs, outputs) = action.behavior.extract_inputs_outputs(request.choice)?;
        let card_name = action.card_name.clone();

        let ctx = EffectContext::for_player(game, player, card_name)
            .with_source_card(request.card.clone())
            .with_target_card(request.target_card.clone())
            .with_target_player(request.target_player.clone());
        self.applier.apply_inputs(&ctx, &inputs)?;
        self.applier.apply_outputs(&ctx, &outputs)?;

        let mut actions = self.players.get(game, player)?.actions;
        if let Some(action) = actions
            .iter_mut()
            .find(|a| a.card_id == request.card && a.behavior_index == request.behavior_index)
        {
            action.play_count += 1;
        }
        self.players.update_actions(game, player, actions)?;

        let outcome = self.consume_action(game, player)?;
        info!(
            target: "runtime::service",
            game = %game,
            player = %player,
            card = %request.card,
            behavior = request.behavior_index,
            remaining = outcome.remaining,
            "card action played"
        );
        self.broadcast(game, Some(player));
        Ok(())
    }
}

/// Inputs and outputs that resolve the moment `card` is played: those of
/// behaviors with an unconditioned `auto` trigger.
fn immediate_effects(
    card: &Card,
    choice: Option<usize>,
) -> Result<(Vec<ResourceEffect>, Vec<ResourceEffect>)> {
    let mut inputs = Vec::new();
    let mut outputs = Vec::new();
    for behavior in card.behaviors.iter().filter(|b| b.is_static_passive()) {
        let (behavior_inputs, behavior_outputs) = behavior.extract_inputs_outputs(choice)?;
        inputs.extend(behavior_inputs);
        outputs.extend(behavior_outputs);
    }
    Ok((inputs, outputs))
}
