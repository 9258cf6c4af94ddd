//! Whether a ruler drag should route around walls at all.

/// Caller-side state consulted by [`is_pathfinding_enabled`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathfindingContext {
    /// The ruler belongs to the current user.
    pub is_owner: bool,
    /// The current user is a game master.
    pub is_gm: bool,
    /// Non-GM users may use pathfinding.
    pub allow_player_pathfinding: bool,
    /// Tokens are being moved without animation.
    pub moving_without_animation: bool,
    /// Pathfinding is on by default.
    pub auto_pathfinding: bool,
    /// The transient pathfinding toggle key is held.
    pub toggle_held: bool,
}

/// Decide whether pathfinding applies to the current measurement.
///
/// Holding the toggle inverts the default.
pub fn is_pathfinding_enabled(ctx: &PathfindingContext) -> bool {
    if !ctx.is_owner {
        return false;
    }
    if !ctx.is_gm && !ctx.allow_player_pathfinding {
        return false;
    }
    if ctx.moving_without_animation {
        return false;
    }
    ctx.auto_pathfinding != ctx.toggle_held
}
