//=========================================================================
// Pathfinder
//=========================================================================
//
// Breadth-first search over the 4-neighbourhood of an obstacle grid.
//
// The route runs from start to goal inclusive. Every waypoint carries the
// direction taken to enter it; the leading start waypoint carries the
// direction of the first step. Without a route the result is `[start]`,
// so callers always get something to walk.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::VecDeque;

use log::debug;

//=== Internal Dependencies ===============================================

use super::grid::{Direction, GridPos, ObstacleGrid};

//=== Waypoint ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Waypoint {
    pub pos: GridPos,
    pub direction: Direction,
}

//=== find_path ===========================================================

/// Shortest 4-directional route from `start` to `goal` avoiding blocked
/// cells. The start cell itself is never checked.
pub fn find_path(start: GridPos, goal: GridPos, obstacles: &ObstacleGrid) -> Vec<Waypoint> {
    let stay = vec![Waypoint { pos: start, direction: Direction::Down }];

    if start == goal || !obstacles.contains(start) || obstacles.is_blocked(goal) {
        return stay;
    }

    // came_from[cell] = (previous cell, direction taken into cell)
    let mut came_from: Vec<Option<(GridPos, Direction)>> = vec![None; obstacles.cell_count()];
    let mut frontier = VecDeque::from([start]);
    let start_index = obstacles.index(start);

    while let Some(current) = frontier.pop_front() {
        if current == goal {
            break;
        }

        for direction in Direction::ALL {
            let Some(next) = current.step(direction) else {
                continue;
            };
            if obstacles.is_blocked(next) {
                continue;
            }

            let index = obstacles.index(next);
            if index == start_index || came_from[index].is_some() {
                continue;
            }

            came_from[index] = Some((current, direction));
            frontier.push_back(next);
        }
    }

    let Some(mut link) = came_from[obstacles.index(goal)] else {
        debug!("No route from {} to {}", start, goal);
        return stay;
    };

    let mut route = vec![Waypoint { pos: goal, direction: link.1 }];
    while link.0 != start {
        let pos = link.0;
        link = match came_from[obstacles.index(pos)] {
            Some(previous) => previous,
            None => return stay,
        };
        route.push(Waypoint { pos, direction: link.1 });
    }
    route.push(Waypoint { pos: start, direction: link.1 });
    route.reverse();

    route
}

//=========================================================================
// Unit Tests
//=========================================================================
