//! A* pathfinding over the hex board
//!
//! Every step costs one move point. Blocking is decided per call by the
//! caller-supplied predicate; this layer only knows about bounds.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::map::hex::OffsetCoord;

/// Open-set entry: (f, h, insertion sequence, coord), popped smallest first.
///
/// The sequence number makes expansion order stable for equal-cost paths.
type OpenEntry = Reverse<(u32, u32, u64, OffsetCoord)>;

fn in_bounds(coord: OffsetCoord, width: u32, height: u32) -> bool {
    coord.row >= 0 && coord.col >= 0 && coord.row < height as i32 && coord.col < width as i32
}

/// Find a path using A*
///
/// Returns the tiles from `from` to `to` inclusive, or `None` if the target is
/// off the board, blocked, or further than `move_points` steps away. The
/// predicate is never consulted for `from`.
pub fn find_path<F>(
    from: OffsetCoord,
    to: OffsetCoord,
    move_points: u32,
    width: u32,
    height: u32,
    is_blocked: F,
) -> Option<Vec<OffsetCoord>>
where
    F: Fn(OffsetCoord) -> bool,
{
    if !in_bounds(from, width, height) || !in_bounds(to, width, height) {
        return None;
    }
    if from == to {
        return Some(vec![from]);
    }
    if is_blocked(to) || from.distance(&to) > move_points {
        return None;
    }

    let mut open_set: BinaryHeap<OpenEntry> = BinaryHeap::new();
    let mut came_from: HashMap<OffsetCoord, OffsetCoord> = HashMap::new();
    let mut g_scores: HashMap<OffsetCoord, u32> = HashMap::new();
    let mut closed: HashSet<OffsetCoord> = HashSet::new();
    let mut sequence: u64 = 0;

    let h0 = from.distance(&to);
    g_scores.insert(from, 0);
    open_set.push(Reverse((h0, h0, sequence, from)));

    while let Some(Reverse((_, _, _, current))) = open_set.pop() {
        if current == to {
            return Some(reconstruct_path(&came_from, current));
        }
        if !closed.insert(current) {
            continue; // Stale entry
        }

        let current_g = g_scores.get(&current).copied().unwrap_or(u32::MAX);
        if current_g >= move_points {
            continue;
        }

        for neighbor in current.neighbors() {
            if !in_bounds(neighbor, width, height)
                || closed.contains(&neighbor)
                || is_blocked(neighbor)
            {
                continue;
            }

            let tentative_g = current_g + 1;
            let neighbor_g = g_scores.get(&neighbor).copied().unwrap_or(u32::MAX);
            if tentative_g < neighbor_g {
                came_from.insert(neighbor, current);
                g_scores.insert(neighbor, tentative_g);

                let h = neighbor.distance(&to);
                if tentative_g + h > move_points {
                    continue; // Cannot finish within budget from here
                }
                sequence += 1;
                open_set.push(Reverse((tentative_g + h, h, sequence, neighbor)));
            }
        }
    }

    None
}

/// Reconstruct path from came_from map
fn reconstruct_path(
    came_from: &HashMap<OffsetCoord, OffsetCoord>,
    mut current: OffsetCoord,
) -> Vec<OffsetCoord> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// Move points spent walking a path
pub fn path_cost(path: &[OffsetCoord]) -> u32 {
    path.len().saturating_sub(1) as u32
}
