//! Plain-text rendering of tracker results.

use crate::calculate::Side;
use crate::models::{CompositionBucket, RankRecord, RosterEntry};
use crate::tracker::{
    Comparison, CompositionReport, History, Leaderboard, LeaderboardRow, PlayerStats,
    LEADERBOARD_SIZE,
};

fn rank_line(rank: &RankRecord) -> String {
    format!("{} - {} LP", rank.label(), rank.league_points)
}

fn record_line(rank: &RankRecord) -> String {
    format!(
        "{}W / {}L ({:.1}% winrate)",
        rank.wins,
        rank.losses,
        rank.win_rate()
    )
}

pub fn roster(players: &[RosterEntry]) -> String {
    if players.is_empty() {
        return "No players tracked.".to_string();
    }

    let mut lines = vec![format!("Tracked players ({}):", players.len())];
    lines.extend(players.iter().map(|p| format!("  - {}", p.display_name)));
    lines.join("\n")
}

pub fn leaderboard(board: &Leaderboard) -> String {
    if board.ranked.is_empty() && board.unranked.is_empty() {
        return "No players tracked.".to_string();
    }

    let mut lines = vec!["Leaderboard".to_string()];
    for (i, row) in board.ranked.iter().take(LEADERBOARD_SIZE).enumerate() {
        lines.push(format!(
            "{:>2}. {:<20} {}",
            i + 1,
            row.display_name,
            rank_line(&row.rank)
        ));
    }

    if !board.unranked.is_empty() {
        lines.push(String::new());
        lines.push(format!("Unranked: {}", board.unranked.join(", ")));
    }

    lines.push(String::new());
    lines.push(format!(
        "Region: {} | {} ranked",
        board.region.to_uppercase(),
        board.ranked.len()
    ));
    lines.join("\n")
}

pub fn player_stats(stats: &PlayerStats) -> String {
    match &stats.rank {
        Some(rank) => [
            format!("{} ({})", stats.display_name, stats.region.to_uppercase()),
            format!("  Rank:   {}", rank_line(rank)),
            format!("  Record: {}", record_line(rank)),
        ]
        .join("\n"),
        None => format!("{} is unranked.", stats.display_name),
    }
}

fn comparison_row(row: &LeaderboardRow) -> String {
    format!(
        "  {:<20} {} | {}",
        row.display_name,
        rank_line(&row.rank),
        record_line(&row.rank)
    )
}

pub fn comparison(cmp: &Comparison) -> String {
    let (leader, trailer) = match cmp.leader {
        Side::First => (&cmp.first, &cmp.second),
        Side::Second => (&cmp.second, &cmp.first),
    };

    [
        format!("{} vs {}", cmp.first.display_name, cmp.second.display_name),
        comparison_row(&cmp.first),
        comparison_row(&cmp.second),
        format!(
            "{} leads by {} points",
            leader.display_name,
            leader.score - trailer.score
        ),
    ]
    .join("\n")
}

pub fn history(history: &History) -> String {
    if history.matches.is_empty() {
        return format!("No recent matches for {}.", history.display_name);
    }

    let mut lines = vec![format!(
        "Last {} matches for {}:",
        history.matches.len(),
        history.display_name
    )];
    lines.extend(history.matches.iter().map(|m| {
        format!(
            "  #{} | {} | {} min",
            m.placement,
            m.game_mode_tag,
            m.eliminated_at_minutes()
        )
    }));
    lines.join("\n")
}

fn bucket_summary(label: &str, bucket: Option<&CompositionBucket>) -> String {
    match bucket {
        Some(b) => format!(
            "  {:<12} {} ({} games, {:.1}% winrate, avg {:.2})",
            label,
            b.signature,
            b.games,
            b.win_rate(),
            b.average_placement()
        ),
        None => format!("  {:<12} -", label),
    }
}

pub fn compositions(report: &CompositionReport) -> String {
    let snapshot = &report.snapshot;
    if snapshot.is_empty() {
        return format!("No ranked compositions recorded for {}.", report.display_name);
    }

    let source = if report.from_cache { "cached" } else { "fresh" };
    let mut lines = vec![format!(
        "Compositions for {} ({} games, {})",
        report.display_name,
        snapshot.total_games(),
        source
    )];

    lines.push(bucket_summary("Most played:", report.most_played()));
    lines.push(bucket_summary("Best:", report.best()));
    lines.push(bucket_summary("Worst:", report.worst()));
    lines.push(String::new());

    lines.push(format!(
        "  {:<24} {:>5} {:>5} {:>8} {:>6}",
        "Composition", "Games", "Wins", "Winrate", "Avg"
    ));
    for b in &snapshot.buckets {
        lines.push(format!(
            "  {:<24} {:>5} {:>5} {:>7.1}% {:>6.2}",
            b.signature,
            b.games,
            b.wins,
            b.win_rate(),
            b.average_placement()
        ));
    }

    if let Some(agg) = &report.aggregation {
        if agg.skipped() > 0 {
            lines.push(String::new());
            lines.push(format!(
                "  {} of {} matches skipped",
                agg.skipped(),
                agg.requested
            ));
        }
    }

    lines.join("\n")
}
