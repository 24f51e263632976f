//! Resolution of "per N of X" multipliers.

use terraform_core::{
    GameState, Per, PlayerState, ResourceEffect, TagCounts, Target, count_per,
};

use super::{EffectApplier, EffectContext, EffectError};

impl EffectApplier {
    /// Amount of `output` after its `per` multiplier.
    ///
    /// Without player and game context the declared amount is used as is.
    pub(super) fn resolve_amount(
        &self,
        ctx: &EffectContext,
        output: &ResourceEffect,
    ) -> Result<i32, EffectError> {
        let Some(per) = &output.per else {
            return Ok(output.amount);
        };
        let (Some(game), Some(player)) = (&ctx.game_id, &ctx.player_id) else {
            return Ok(output.amount);
        };

        let game = self.games.get(game)?;
        let player = self.players.get(&game.id, player)?;
        let count = self.count_per(ctx, &game, &player, per)?;
        let amount = output.scaled_amount(count);

        tracing::debug!(
            target: "runtime::effects",
            kind = %output.kind,
            per = %per.kind,
            count,
            amount,
            "scaled output"
        );
        Ok(amount)
    }

    fn count_per(
        &self,
        ctx: &EffectContext,
        game: &GameState,
        player: &PlayerState,
        per: &Per,
    ) -> Result<i32, EffectError> {
        if let Some(tag) = per.tag
            && per.target == Some(Target::AnyPlayer)
        {
            let total = self
                .players
                .list(&game.id)?
                .iter()
                .map(|other| self.tag_counts(other).exact(tag))
                .sum();
            return Ok(total);
        }

        let tags = if per.tag.is_some() {
            self.tag_counts(player)
        } else {
            TagCounts::new()
        };
        let count = count_per(per, game, player, &tags, ctx.source_card.as_ref());
        Ok(count.unwrap_or_else(|| {
            tracing::warn!(
                target: "runtime::effects",
                per = %per.kind,
                "unsupported per kind counts as zero"
            );
            0
        }))
    }
}
