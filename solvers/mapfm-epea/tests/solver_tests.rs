//! End-to-end solver tests: corridors, swaps, matching freedom, merges,
//! cost bounds and determinism.

use mapfm_core::{Agent, Coordinate, Direction, Goal, Grid, Problem};
use mapfm_epea::{MatchingSolver, SearchProblem, Solution, State, Strategy};
use pretty_assertions::assert_eq;

fn coord(x: u32, y: u32) -> Coordinate {
    Coordinate::new(x, y)
}

fn problem(grid: Grid, starts: &[(u32, u32, u32)], goals: &[(u32, u32, u32)]) -> Problem {
    Problem::new(
        grid,
        starts.iter().map(|&(x, y, c)| (coord(x, y), c)).collect(),
        goals
            .iter()
            .map(|&(x, y, c)| Goal::new(coord(x, y), c))
            .collect(),
    )
    .expect("valid problem")
}

/// Check everything a solution promises: one path per agent in id order,
/// starting at the agent's start, ending on a matching-color goal, moving
/// only through traversable cells by unit steps, pairwise conflict-free,
/// with the cost equal to the sum of arrival times.
fn verify(instance: &Problem, solution: &Solution) {
    assert_eq!(solution.paths.len(), instance.starts().len());
    let mut arrival_sum = 0;
    for (id, path) in solution.paths.iter().enumerate() {
        assert_eq!(path.agent, id as u32);
        let (start, color) = instance.starts()[id];
        assert_eq!(path.steps[0], start, "agent {id} start");
        let last = *path.steps.last().unwrap();
        assert!(
            instance
                .goals()
                .iter()
                .any(|goal| goal.coord == last && goal.color == color),
            "agent {id} ends on a matching goal"
        );
        for window in path.steps.windows(2) {
            let dx = window[0].x.abs_diff(window[1].x);
            let dy = window[0].y.abs_diff(window[1].y);
            assert!(dx + dy <= 1, "agent {id} moves by unit steps");
            assert!(
                instance.grid().is_traversable(window[1].x, window[1].y),
                "agent {id} stays on traversable cells"
            );
        }
        arrival_sum += path.cost();
    }
    for i in 0..solution.paths.len() {
        for j in (i + 1)..solution.paths.len() {
            assert!(
                !solution.paths[i].conflicts(&solution.paths[j]),
                "paths {i} and {j} conflict"
            );
        }
    }
    assert_eq!(arrival_sum, solution.cost, "cost equals summed arrival times");
}

fn solve(instance: &Problem, strategy: Strategy, bound: Option<u32>) -> Option<Solution> {
    MatchingSolver::new(instance, strategy).solve(bound)
}

// ─────────────────────────────────────────────────────────────────────────────
// Straight corridors and matching freedom
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn single_agent_straight_corridor() {
    let instance = problem(Grid::open(5, 1), &[(0, 0, 0)], &[(4, 0, 0)]);
    let solution = solve(&instance, Strategy::IndependenceDetection, None).unwrap();
    assert_eq!(solution.cost, 4);
    assert_eq!(
        solution.paths[0].steps,
        vec![coord(0, 0), coord(1, 0), coord(2, 0), coord(3, 0), coord(4, 0)]
    );
    verify(&instance, &solution);
}

#[test]
fn agents_starting_on_matching_goals_cost_nothing() {
    let instance = problem(
        Grid::open(3, 3),
        &[(0, 0, 0), (2, 2, 0)],
        &[(0, 0, 0), (2, 2, 0)],
    );
    let solution = solve(&instance, Strategy::IndependenceDetection, None).unwrap();
    assert_eq!(solution.cost, 0);
    assert_eq!(solution.paths[0].steps, vec![coord(0, 0)]);
    assert_eq!(solution.paths[1].steps, vec![coord(2, 2)]);
    verify(&instance, &solution);
}

#[test]
fn matching_is_free_between_same_color_goals() {
    // Each start sits on a goal of the shared color, so the identity
    // matching solves the instance outright.
    let instance = problem(
        Grid::open(5, 1),
        &[(0, 0, 0), (4, 0, 0)],
        &[(4, 0, 0), (0, 0, 0)],
    );
    let solution = solve(&instance, Strategy::IndependenceDetection, None).unwrap();
    assert_eq!(solution.cost, 0);
}

#[test]
fn matching_picks_the_nearer_goal() {
    let instance = problem(
        Grid::open(5, 1),
        &[(0, 0, 0), (4, 0, 0)],
        &[(1, 0, 0), (3, 0, 0)],
    );
    let solution = solve(&instance, Strategy::IndependenceDetection, None).unwrap();
    assert_eq!(solution.cost, 2);
    verify(&instance, &solution);
}

// ─────────────────────────────────────────────────────────────────────────────
// Swaps
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn swap_in_bare_corridor_is_infeasible() {
    // Distinct colors pin each agent to the opposite end; with no passing
    // lane the swap cannot happen under any finite bound.
    let instance = problem(
        Grid::open(5, 1),
        &[(0, 0, 0), (4, 0, 1)],
        &[(4, 0, 0), (0, 0, 1)],
    );
    assert_eq!(solve(&instance, Strategy::IndependenceDetection, Some(30)), None);
    assert_eq!(solve(&instance, Strategy::Epea, Some(30)), None);
}

#[test]
fn swap_with_passing_lane_costs_ten() {
    let instance = problem(
        Grid::open(5, 2),
        &[(0, 0, 0), (4, 0, 1)],
        &[(4, 0, 0), (0, 0, 1)],
    );
    let solution = solve(&instance, Strategy::IndependenceDetection, None).unwrap();
    assert_eq!(solution.cost, 10);
    verify(&instance, &solution);
}

#[test]
fn joint_strategy_agrees_on_the_swap() {
    let instance = problem(
        Grid::open(5, 2),
        &[(0, 0, 0), (4, 0, 1)],
        &[(4, 0, 0), (0, 0, 1)],
    );
    let solution = solve(&instance, Strategy::Epea, None).unwrap();
    assert_eq!(solution.cost, 10);
    verify(&instance, &solution);
}

// ─────────────────────────────────────────────────────────────────────────────
// Independence detection
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn conflicting_groups_merge_and_stay_optimal() {
    // The two row-1 agents must swap ends and merge; the third crosses
    // between them independently.
    let instance = problem(
        Grid::open(5, 3),
        &[(0, 1, 0), (4, 1, 1), (2, 0, 2)],
        &[(4, 1, 0), (0, 1, 1), (2, 2, 2)],
    );
    let mut solver = MatchingSolver::new(&instance, Strategy::IndependenceDetection);
    let solution = solver.solve(None).unwrap();
    assert_eq!(solution.cost, 12);
    assert!(solver.stats().merges >= 1);
    assert!(solver.stats().searches >= 4);
    assert!(solver.stats().nodes_popped > 0);
    verify(&instance, &solution);
}

#[test]
fn solver_is_deterministic() {
    let instance = problem(
        Grid::open(5, 3),
        &[(0, 1, 0), (4, 1, 1), (2, 0, 2)],
        &[(4, 1, 0), (0, 1, 1), (2, 2, 2)],
    );
    let first = solve(&instance, Strategy::IndependenceDetection, None).unwrap();
    let second = solve(&instance, Strategy::IndependenceDetection, None).unwrap();
    assert_eq!(first, second);
}

// ─────────────────────────────────────────────────────────────────────────────
// Cost bounds
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn bound_below_optimum_is_infeasible() {
    let corridor = problem(Grid::open(5, 1), &[(0, 0, 0)], &[(4, 0, 0)]);
    assert_eq!(solve(&corridor, Strategy::IndependenceDetection, Some(3)), None);

    let swap = problem(
        Grid::open(5, 2),
        &[(0, 0, 0), (4, 0, 1)],
        &[(4, 0, 0), (0, 0, 1)],
    );
    assert_eq!(solve(&swap, Strategy::IndependenceDetection, Some(9)), None);
    assert_eq!(solve(&swap, Strategy::Epea, Some(9)), None);
}

#[test]
fn bound_at_optimum_returns_the_optimum() {
    let corridor = problem(Grid::open(5, 1), &[(0, 0, 0)], &[(4, 0, 0)]);
    assert_eq!(
        solve(&corridor, Strategy::IndependenceDetection, Some(4)).unwrap().cost,
        4
    );

    let swap = problem(
        Grid::open(5, 2),
        &[(0, 0, 0), (4, 0, 1)],
        &[(4, 0, 0), (0, 0, 1)],
    );
    assert_eq!(solve(&swap, Strategy::Epea, Some(10)).unwrap().cost, 10);
    // Any wider bound returns the same cost.
    assert_eq!(
        solve(&swap, Strategy::IndependenceDetection, Some(25)).unwrap().cost,
        10
    );
}

#[test]
fn unreachable_goal_is_infeasible_without_a_bound() {
    // The matching goal sits behind a wall; the infinite start heuristic is
    // detected before any search runs.
    let grid = Grid::from_bytes(3, 1, &[1, 0, 1]).unwrap();
    let instance = problem(grid, &[(0, 0, 0)], &[(2, 0, 0)]);
    assert_eq!(solve(&instance, Strategy::IndependenceDetection, None), None);
    assert_eq!(solve(&instance, Strategy::Epea, None), None);
}

// ─────────────────────────────────────────────────────────────────────────────
// Waiting-at-goal accounting
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn waits_on_goal_bank_instead_of_charging() {
    let instance = problem(Grid::open(5, 1), &[(0, 0, 0)], &[(2, 0, 0)]);
    let search = SearchProblem::new(&instance);

    let on_goal = State::new(vec![Agent {
        coord: coord(2, 0),
        color: 0,
        id: 0,
        waiting_cost: 2,
    }]);

    // Waiting on the goal banks another unit and leaves g alone.
    let (waited, g) = search.make_child(&on_goal, 5, &[Direction::Wait]);
    assert_eq!(g, 5);
    assert_eq!(waited.agents()[0].waiting_cost, 3);

    // Leaving reconstitutes the banked waits plus the move.
    let (left, g) = search.make_child(&on_goal, 5, &[Direction::East]);
    assert_eq!(g, 8);
    assert_eq!(left.agents()[0].coord, coord(3, 0));
    assert_eq!(left.agents()[0].waiting_cost, 0);

    // Off-goal agents pay one per step, wait or move.
    let off_goal = State::new(vec![Agent::new(coord(0, 0), 0, 0)]);
    let (_, g) = search.make_child(&off_goal, 0, &[Direction::Wait]);
    assert_eq!(g, 1);
    let (_, g) = search.make_child(&off_goal, 0, &[Direction::East]);
    assert_eq!(g, 1);
}

#[test]
fn settled_agent_vacates_and_returns() {
    // Row 0 is a corridor; the only side room is under the settled agent.
    // The crossing agent forces it to dip out and back, which costs the
    // round trip but none of the banked waiting.
    //
    //   . . A . B-goal     A = (2,0), starts on its own goal
    //   # # . # #          side room at (2,1)
    let grid = Grid::from_bytes(5, 2, &[1, 1, 1, 1, 1, 0, 0, 1, 0, 0]).unwrap();
    let instance = problem(grid, &[(2, 0, 0), (0, 0, 1)], &[(2, 0, 0), (4, 0, 1)]);
    let solution = solve(&instance, Strategy::IndependenceDetection, None).unwrap();
    // Crossing agent walks 4; the settled agent's dip costs arrival time 3.
    assert_eq!(solution.cost, 7);
    verify(&instance, &solution);
}
