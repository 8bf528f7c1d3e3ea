//! Pareto ranking over the four normalized objectives.
//!
//! Everything in here is a pure function of the objective vectors: the caller
//! gets back a parallel array of `(rank, crowding distance)` and decides where
//! to store it.

use log::debug;
use std::cmp::Ordering;

/// Number of objectives every individual is scored on.
pub const NUM_OBJECTIVES: usize = 4;

/// Objective vector, already converted to "lower is better".
pub type Objectives = [f64; NUM_OBJECTIVES];

/// Ranking metadata for one population slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankInfo {
    /// Index of the front the slot belongs to, 0 being the non-dominated front
    pub rank: usize,
    /// Sum of the normalized neighbour gaps over every objective within the front
    pub crowding_distance: f64,
}

/// Result of a full ranking pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    /// Slot indices grouped by front, in dominance order
    pub fronts: Vec<Vec<usize>>,
    /// Per-slot metadata, parallel to the input slice
    pub info: Vec<RankInfo>,
}

/// Returns true when `a` is no worse than `b` everywhere and strictly better somewhere.
pub fn dominates(a: &Objectives, b: &Objectives) -> bool {
    let mut strictly_better = false;
    for (av, bv) in a.iter().zip(b.iter()) {
        if av > bv {
            return false;
        }
        if av < bv {
            strictly_better = true;
        }
    }
    strictly_better
}

/// Fast non-dominated sort.
///
/// Every ordered pair is tested once, each slot records who it dominates and
/// how many dominate it, then fronts are peeled off in order by decrementing
/// those counts. The returned fronts partition `0..objectives.len()`.
pub fn non_dominated_sort(objectives: &[Objectives]) -> Vec<Vec<usize>> {
    let n = objectives.len();
    let mut dominated_by_count = vec![0usize; n];
    let mut dominates_list: Vec<Vec<usize>> = vec![Vec::new(); n];

    for p in 0..n {
        for q in 0..n {
            if p == q {
                continue;
            }
            if dominates(&objectives[p], &objectives[q]) {
                dominates_list[p].push(q);
            } else if dominates(&objectives[q], &objectives[p]) {
                dominated_by_count[p] += 1;
            }
        }
    }

    let mut fronts: Vec<Vec<usize>> = Vec::new();
    let first: Vec<usize> = (0..n).filter(|&i| dominated_by_count[i] == 0).collect();
    if !first.is_empty() {
        fronts.push(first);
    }

    let mut current = 0;
    while current < fronts.len() {
        let mut next = Vec::new();
        for &p in &fronts[current] {
            for &q in &dominates_list[p] {
                dominated_by_count[q] -= 1;
                if dominated_by_count[q] == 0 {
                    next.push(q);
                }
            }
        }
        if !next.is_empty() {
            fronts.push(next);
        }
        current += 1;
    }

    fronts
}

/// Crowding distance of each member of `front`, returned in the same order as `front`.
///
/// Boundary members of every objective are pinned to infinity. An objective
/// whose range collapses within the front contributes nothing.
pub fn crowding_distances(objectives: &[Objectives], front: &[usize]) -> Vec<f64> {
    let size = front.len();
    let mut distances = vec![0.0; size];
    if size == 0 {
        return distances;
    }

    // positions into `front`, re-sorted per objective
    let mut order: Vec<usize> = (0..size).collect();
    for m in 0..NUM_OBJECTIVES {
        order.sort_by(|&a, &b| {
            objectives[front[a]][m]
                .partial_cmp(&objectives[front[b]][m])
                .unwrap_or(Ordering::Equal)
        });

        let first = order[0];
        let last = order[size - 1];
        distances[first] = f64::INFINITY;
        distances[last] = f64::INFINITY;

        let min_value = objectives[front[first]][m];
        let max_value = objectives[front[last]][m];
        let range = max_value - min_value;
        if range == 0.0 {
            debug!("Objective {} is flat across a front of {}, skipping", m, size);
            continue;
        }

        for i in 1..size.saturating_sub(1) {
            let previous = objectives[front[order[i - 1]]][m];
            let next = objectives[front[order[i + 1]]][m];
            distances[order[i]] += (next - previous) / range;
        }
    }

    distances
}

/// Ranks a whole population: fronts first, then crowding within each front.
pub fn rank(objectives: &[Objectives]) -> Ranking {
    let fronts = non_dominated_sort(objectives);
    let mut info = vec![
        RankInfo {
            rank: 0,
            crowding_distance: 0.0,
        };
        objectives.len()
    ];

    for (rank, front) in fronts.iter().enumerate() {
        let distances = crowding_distances(objectives, front);
        for (&slot, crowding_distance) in front.iter().zip(distances) {
            info[slot] = RankInfo {
                rank,
                crowding_distance,
            };
        }
    }

    Ranking { fronts, info }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_objectives(rng: &mut StdRng, n: usize) -> Vec<Objectives> {
        (0..n)
            .map(|_| {
                [
                    rng.random_range(0.0..10.0f64),
                    rng.random_range(0.0..10.0f64),
                    -rng.random_range(0.0..10.0f64),
                    -rng.random_range(0.0..10.0f64),
                ]
            })
            .collect()
    }

    fn scenario() -> Vec<Objectives> {
        vec![
            [0.0, 0.0, 0.0, 0.0], // A
            [1.0, 1.0, 1.0, 1.0], // B
            [0.0, 1.0, 0.0, 1.0], // C
            [1.0, 0.0, 1.0, 0.0], // D
        ]
    }

    #[test]
    fn test_dominates_basic() {
        let a = [0.0, 0.0, 0.0, 0.0];
        let b = [1.0, 1.0, 1.0, 1.0];
        assert!(dominates(&a, &b));
        assert!(!dominates(&b, &a));
    }

    #[test]
    fn test_dominates_needs_strict_improvement() {
        let a = [1.0, 2.0, -3.0, -4.0];
        assert!(!dominates(&a, &a), "An individual never dominates itself");

        let b = [1.0, 2.0, -3.0, -3.5];
        assert!(dominates(&a, &b), "Equal everywhere but one strictly better");
    }

    #[test]
    fn test_dominates_trade_off() {
        let a = [0.0, 1.0, 0.0, 1.0];
        let b = [1.0, 0.0, 1.0, 0.0];
        assert!(!dominates(&a, &b));
        assert!(!dominates(&b, &a));
    }

    #[test]
    fn test_dominance_asymmetry_random() {
        let mut rng = StdRng::seed_from_u64(11);
        let population = random_objectives(&mut rng, 60);
        for a in &population {
            for b in &population {
                assert!(
                    !(dominates(a, b) && dominates(b, a)),
                    "Dominance must be asymmetric: {:?} vs {:?}",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn test_scenario_ranks() {
        let objectives = scenario();
        let ranking = rank(&objectives);
        assert_eq!(ranking.info[0].rank, 0);
        assert_eq!(ranking.info[2].rank, 1);
        assert_eq!(ranking.info[3].rank, 1);
        // C and D trade off against each other but both dominate B
        assert!(dominates(&objectives[2], &objectives[1]));
        assert!(dominates(&objectives[3], &objectives[1]));
        assert_eq!(ranking.info[1].rank, 2);
        assert_eq!(ranking.fronts, vec![vec![0], vec![2, 3], vec![1]]);
    }

    #[test]
    fn test_chain_produces_one_front_per_level() {
        let objectives: Vec<Objectives> = (0..5)
            .rev()
            .map(|i| [i as f64, i as f64, -(4 - i) as f64, 0.0])
            .collect();
        let fronts = non_dominated_sort(&objectives);
        assert_eq!(fronts, vec![vec![4], vec![3], vec![2], vec![1], vec![0]]);
    }

    #[test]
    fn test_identical_vectors_share_front() {
        let objectives = vec![[1.0, 2.0, -3.0, -4.0]; 5];
        let fronts = non_dominated_sort(&objectives);
        assert_eq!(fronts, vec![vec![0, 1, 2, 3, 4]]);
        let ranking = rank(&objectives);
        assert!(ranking.info.iter().all(|info| info.rank == 0));
        // every objective is flat, only the boundary roles assign a value
        assert!(ranking.info[0].crowding_distance.is_infinite());
        assert!(ranking.info[4].crowding_distance.is_infinite());
        assert_eq!(ranking.info[2].crowding_distance, 0.0);
    }

    #[test]
    fn test_partition_completeness_random() {
        let mut rng = StdRng::seed_from_u64(42);
        let objectives = random_objectives(&mut rng, 40);
        let ranking = rank(&objectives);

        let mut seen = vec![false; objectives.len()];
        for (r, front) in ranking.fronts.iter().enumerate() {
            for &slot in front {
                assert!(!seen[slot], "Slot {} assigned twice", slot);
                seen[slot] = true;
                assert_eq!(ranking.info[slot].rank, r);
            }
        }
        assert!(seen.iter().all(|&s| s), "Every slot must receive a rank");

        for &p in &ranking.fronts[0] {
            for &q in &ranking.fronts[0] {
                assert!(!dominates(&objectives[p], &objectives[q]));
            }
        }

        for slot in 0..objectives.len() {
            let r = ranking.info[slot].rank;
            if r == 0 {
                continue;
            }
            let dominated_by_better = (0..objectives.len()).any(|other| {
                ranking.info[other].rank < r && dominates(&objectives[other], &objectives[slot])
            });
            assert!(
                dominated_by_better,
                "Slot {} at rank {} is not dominated by a better rank",
                slot, r
            );
        }
    }

    #[test]
    fn test_empty_population() {
        let ranking = rank(&[]);
        assert!(ranking.fronts.is_empty());
        assert!(ranking.info.is_empty());
    }

    #[test]
    fn test_two_member_front_is_infinite() {
        let objectives = vec![[0.0, 5.0, -1.0, -9.0], [3.0, 1.0, -2.0, -0.5]];
        let distances = crowding_distances(&objectives, &[0, 1]);
        assert!(distances.iter().all(|d| d.is_infinite()));
    }

    #[test]
    fn test_single_member_front_is_infinite() {
        let objectives = vec![[0.3, 0.2, -0.1, -0.4]];
        let distances = crowding_distances(&objectives, &[0]);
        assert_eq!(distances.len(), 1);
        assert!(distances[0].is_infinite());
    }

    #[test]
    fn test_interior_distance_values() {
        // objectives 2 and 3 are flat, so only 0 and 1 contribute
        let objectives = vec![
            [0.0, 4.0, -1.0, -1.0],
            [1.0, 3.0, -1.0, -1.0],
            [3.0, 1.0, -1.0, -1.0],
            [4.0, 0.0, -1.0, -1.0],
        ];
        let distances = crowding_distances(&objectives, &[0, 1, 2, 3]);
        assert!(distances[0].is_infinite());
        assert!(distances[3].is_infinite());
        // slot 1: (3 - 0) / 4 on objective 0, (4 - 1) / 4 on objective 1
        assert!((distances[1] - 1.5).abs() < 1e-12);
        assert!((distances[2] - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_crowding_respects_front_subset() {
        // slot 4 sits far away but is not part of the front passed in
        let objectives = vec![
            [0.0, 2.0, 0.0, 0.0],
            [1.0, 1.0, 0.0, 0.0],
            [2.0, 0.0, 0.0, 0.0],
            [9.0, 9.0, 0.0, 0.0],
            [100.0, -100.0, 0.0, 0.0],
        ];
        let distances = crowding_distances(&objectives, &[0, 1, 2]);
        assert!((distances[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_boundary_property_random() {
        let mut rng = StdRng::seed_from_u64(7);
        let objectives = random_objectives(&mut rng, 50);
        let ranking = rank(&objectives);

        for front in ranking.fronts.iter().filter(|f| f.len() >= 3) {
            for m in 0..NUM_OBJECTIVES {
                let min_slot = front
                    .iter()
                    .copied()
                    .min_by(|&a, &b| objectives[a][m].partial_cmp(&objectives[b][m]).unwrap())
                    .unwrap();
                let max_slot = front
                    .iter()
                    .copied()
                    .max_by(|&a, &b| objectives[a][m].partial_cmp(&objectives[b][m]).unwrap())
                    .unwrap();
                assert!(ranking.info[min_slot].crowding_distance.is_infinite());
                assert!(ranking.info[max_slot].crowding_distance.is_infinite());
            }
        }
    }

    #[test]
    fn test_crowding_is_non_negative() {
        let mut rng = StdRng::seed_from_u64(3);
        let objectives = random_objectives(&mut rng, 30);
        let ranking = rank(&objectives);
        assert!(ranking.info.iter().all(|i| i.crowding_distance >= 0.0));
    }
}
