// Regular-season standings.
//
// Teams are ordered by win percentage. Teams level on win percentage are
// separated by their head-to-head record against the other teams in that
// group, then by run differential, then by name. Only teams that all three
// tiebreakers fail to separate share a rank.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::model::{ratio, TeamSeasonAggregate};

/// Head-to-head percentage for a team with no games against its group.
const NO_HEAD_TO_HEAD_PCT: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandingEntry {
    pub team: String,
    pub rank: u32,
    pub tied: bool,
    /// "3", or "T-3" when tied.
    pub display: String,
    pub wins: u32,
    pub losses: u32,
    pub win_pct: f64,
    pub head_to_head_pct: f64,
    pub run_differential: i64,
}

struct Keyed<'a> {
    team: &'a TeamSeasonAggregate,
    win_pct: f64,
    head_to_head_pct: f64,
    run_differential: i64,
}

impl Keyed<'_> {
    fn same_position(&self, other: &Keyed<'_>) -> bool {
        self.win_pct == other.win_pct
            && self.head_to_head_pct == other.head_to_head_pct
            && self.run_differential == other.run_differential
    }

    fn order(&self, other: &Keyed<'_>) -> Ordering {
        other
            .win_pct
            .total_cmp(&self.win_pct)
            .then_with(|| other.head_to_head_pct.total_cmp(&self.head_to_head_pct))
            .then_with(|| other.run_differential.cmp(&self.run_differential))
            .then_with(|| self.team.name.cmp(&other.team.name))
    }
}

/// Win percentage of `team` against the other members of `group`.
fn group_head_to_head(team: &TeamSeasonAggregate, group: &[&TeamSeasonAggregate]) -> f64 {
    let (wins, losses) = group
        .iter()
        .filter(|opp| opp.name != team.name)
        .filter_map(|opp| team.head_to_head.get(&opp.name))
        .fold((0u32, 0u32), |(w, l), rec| (w + rec.wins, l + rec.losses));
    if wins + losses == 0 {
        return NO_HEAD_TO_HEAD_PCT;
    }
    ratio(wins as f64, (wins + losses) as f64)
}

pub fn compute_standings(teams: &[TeamSeasonAggregate]) -> Vec<StandingEntry> {
    let mut by_pct: Vec<&TeamSeasonAggregate> = teams.iter().collect();
    by_pct.sort_by(|a, b| b.win_pct().total_cmp(&a.win_pct()));

    let mut keyed: Vec<Keyed<'_>> = Vec::with_capacity(by_pct.len());
    let mut start = 0;
    while start < by_pct.len() {
        let pct = by_pct[start].win_pct();
        let len = by_pct[start..]
            .iter()
            .take_while(|t| t.win_pct() == pct)
            .count();
        let group = &by_pct[start..start + len];
        for &team in group {
            keyed.push(Keyed {
                team,
                win_pct: pct,
                head_to_head_pct: group_head_to_head(team, group),
                run_differential: team.run_differential(),
            });
        }
        start += len;
    }
    keyed.sort_by(|a, b| a.order(b));

    let mut entries: Vec<StandingEntry> = Vec::with_capacity(keyed.len());
    for (i, k) in keyed.iter().enumerate() {
        let position = i as u32 + 1;
        let tied_with_previous = i > 0 && k.same_position(&keyed[i - 1]);
        let mut rank = position;
        if tied_with_previous {
            if let Some(prev) = entries.last_mut() {
                rank = prev.rank;
                prev.tied = true;
                prev.display = format!("T-{rank}");
            }
        }
        entries.push(StandingEntry {
            team: k.team.name.clone(),
            rank,
            tied: tied_with_previous,
            display: if tied_with_previous {
                format!("T-{rank}")
            } else {
                rank.to_string()
            },
            wins: k.team.wins,
            losses: k.team.losses,
            win_pct: k.win_pct,
            head_to_head_pct: k.head_to_head_pct,
            run_differential: k.run_differential,
        });
    }
    entries
}

/// Team name to rank.
pub fn rank_map(entries: &[StandingEntry]) -> HashMap<String, u32> {
    entries.iter().map(|e| (e.team.clone(), e.rank)).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HeadToHead;

    fn make_team(name: &str, wins: u32, losses: u32, scored: u32, allowed: u32) -> TeamSeasonAggregate {
        TeamSeasonAggregate {
            name: name.into(),
            games_played: wins + losses,
            wins,
            losses,
            runs_scored: scored,
            runs_allowed: allowed,
            head_to_head: HashMap::new(),
        }
    }

    fn record(team: &mut TeamSeasonAggregate, opponent: &str, wins: u32, losses: u32) {
        team.head_to_head
            .insert(opponent.to_string(), HeadToHead { wins, losses });
    }

    fn entry<'a>(entries: &'a [StandingEntry], team: &str) -> &'a StandingEntry {
        entries.iter().find(|e| e.team == team).unwrap()
    }

    #[test]
    fn orders_by_win_pct() {
        let teams = vec![
            make_team("Wario Muscles", 3, 7, 40, 60),
            make_team("Mario Fireballs", 8, 2, 70, 30),
            make_team("Yoshi Eggs", 5, 5, 50, 50),
        ];
        let s = compute_standings(&teams);
        let names: Vec<&str> = s.iter().map(|e| e.team.as_str()).collect();
        assert_eq!(names, vec!["Mario Fireballs", "Yoshi Eggs", "Wario Muscles"]);
        assert_eq!(s[0].rank, 1);
        assert_eq!(s[2].rank, 3);
        assert!(s.iter().all(|e| !e.tied));
        assert_eq!(s[1].display, "2");
    }

    #[test]
    fn head_to_head_breaks_win_pct_tie() {
        let mut peach = make_team("Peach Monarchs", 6, 4, 40, 45);
        let mut daisy = make_team("Daisy Flowers", 6, 4, 60, 30);
        // Peach won the season series despite the worse run differential.
        record(&mut peach, "Daisy Flowers", 2, 1);
        record(&mut daisy, "Peach Monarchs", 1, 2);
        let s = compute_standings(&[daisy, peach]);
        assert_eq!(s[0].team, "Peach Monarchs");
        assert_eq!(s[1].team, "Daisy Flowers");
        assert_eq!(s[1].rank, 2);
        assert!(!s[0].tied && !s[1].tied);
    }

    #[test]
    fn head_to_head_only_counts_tied_group() {
        let mut peach = make_team("Peach Monarchs", 6, 4, 40, 40);
        let daisy = make_team("Daisy Flowers", 6, 4, 50, 40);
        let bowser = make_team("Bowser Monsters", 2, 8, 20, 60);
        // Beating a team outside the group does not count.
        record(&mut peach, "Bowser Monsters", 3, 0);
        let s = compute_standings(&[peach, daisy, bowser]);
        let p = entry(&s, "Peach Monarchs");
        assert_eq!(p.head_to_head_pct, 0.5);
        // Falls through to run differential: Daisy +10, Peach 0
        assert_eq!(s[0].team, "Daisy Flowers");
    }

    #[test]
    fn run_differential_breaks_remaining_tie() {
        let teams = vec![
            make_team("Luigi Knights", 5, 5, 40, 45),
            make_team("Toad Rangers", 5, 5, 55, 45),
        ];
        let s = compute_standings(&teams);
        assert_eq!(s[0].team, "Toad Rangers");
        assert_eq!(s[0].run_differential, 10);
    }

    #[test]
    fn inseparable_teams_share_rank() {
        let teams = vec![
            make_team("Mario Fireballs", 9, 1, 80, 20),
            make_team("Luigi Knights", 5, 5, 50, 50),
            make_team("Toad Rangers", 5, 5, 50, 50),
            make_team("Wario Muscles", 1, 9, 20, 80),
        ];
        let s = compute_standings(&teams);
        let luigi = entry(&s, "Luigi Knights");
        let toad = entry(&s, "Toad Rangers");
        assert_eq!(luigi.rank, 2);
        assert_eq!(toad.rank, 2);
        assert!(luigi.tied && toad.tied);
        assert_eq!(luigi.display, "T-2");
        assert_eq!(toad.display, "T-2");
        // Names order the display within the tie.
        assert_eq!(s[1].team, "Luigi Knights");
        // The next team keeps its position.
        assert_eq!(entry(&s, "Wario Muscles").rank, 4);
        assert_eq!(entry(&s, "Wario Muscles").display, "4");
    }

    #[test]
    fn three_way_tie_shares_first_rank() {
        let teams = vec![
            make_team("A", 4, 4, 30, 30),
            make_team("B", 4, 4, 30, 30),
            make_team("C", 4, 4, 30, 30),
        ];
        let s = compute_standings(&teams);
        assert!(s.iter().all(|e| e.rank == 1 && e.display == "T-1"));
    }

    #[test]
    fn rank_map_and_empty_input() {
        assert!(compute_standings(&[]).is_empty());
        let teams = vec![make_team("A", 2, 0, 10, 2), make_team("B", 0, 2, 2, 10)];
        let map = rank_map(&compute_standings(&teams));
        assert_eq!(map.get("A"), Some(&1));
        assert_eq!(map.get("B"), Some(&2));
    }
}
