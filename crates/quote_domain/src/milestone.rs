pub const MILESTONE_TITLE: &str = "🎊 Milestone Achieved!";

/// Favorites counts that earn a celebratory alert, with the message shown for each.
pub const MILESTONES: [(usize, &str); 8] = [
    (5, "🏆 Milestone! You've reached 5 saved quotes! Amazing start!"),
    (10, "🎉 Milestone! 10 quotes saved! Your collection is growing!"),
    (15, "⭐ Milestone! 15 quotes saved! You're a wisdom seeker!"),
    (20, "👑 Milestone! 20 quotes saved! Keep inspiring yourself!"),
    (25, "💎 Milestone! 25 quotes saved! You're unstoppable!"),
    (30, "🔥 Milestone! 30 quotes saved! Incredible dedication!"),
    (50, "🌟 Milestone! 50 quotes saved! You're a quote master!"),
    (100, "👏 LEGENDARY! 100 quotes saved! You're absolutely amazing!"),
];

/// Message for an exact milestone count. Counts between thresholds never match.
pub fn milestone_message(count: usize) -> Option<&'static str> {
    MILESTONES
        .iter()
        .find(|(threshold, _)| *threshold == count)
        .map(|(_, message)| *message)
}
