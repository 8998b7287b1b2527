use crate::engine::clock::Unbounded;
use crate::engine::config::{EngineConfig, SearchMethod};
use crate::engine::search::{AlphaBetaEngine, Timeout};
use crate::engine::{Game, SearchLimit, Searcher};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

// Explicit game tree. Every node carries a static value so that internal nodes
// can be scored when the depth runs out.
struct Tree {
    children: Vec<Vec<usize>>,
    values: Vec<f64>,
}

#[derive(Clone)]
struct TreeGame {
    tree: Rc<Tree>,
    node: usize,
    ply: usize,
}

impl TreeGame {
    fn root(tree: Tree) -> Self {
        Self {
            tree: Rc::new(tree),
            node: 0,
            ply: 0,
        }
    }
}

impl Game for TreeGame {
    type Action = usize;
    type Player = usize;

    fn active_player(&self) -> usize {
        self.ply % 2
    }

    fn legal_actions(&self) -> Vec<usize> {
        self.tree.children[self.node].clone()
    }

    fn forecast(&self, action: usize) -> Self {
        Self {
            tree: Rc::clone(&self.tree),
            node: action,
            ply: self.ply + 1,
        }
    }

    fn plies_played(&self) -> usize {
        self.ply
    }
}

fn tree_eval(game: &TreeGame, perspective: usize) -> f64 {
    let value = game.tree.values[game.node];
    if perspective == 0 {
        value
    } else {
        -value
    }
}

fn grow(tree: &mut Tree, node: usize, height: u32, rng: &mut StdRng) {
    if height == 0 {
        return;
    }
    let branching = if node == 0 { rng.gen_range(1..=4) } else { rng.gen_range(0..=4) };
    for _ in 0..branching {
        let id = tree.values.len();
        // Small value range so that ties are common
        tree.values.push(f64::from(rng.gen_range(-3_i32..=3)));
        tree.children.push(Vec::new());
        tree.children[node].push(id);
        grow(tree, id, height - 1, rng);
    }
}

fn random_tree(seed: u64, height: u32) -> Tree {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut tree = Tree {
        children: vec![Vec::new()],
        values: vec![0.0],
    };
    grow(&mut tree, 0, height, &mut rng);
    tree
}

// Unbounded game with three moves everywhere and pseudo-random leaf scores.
#[derive(Clone)]
struct EndlessGame {
    path: u64,
    ply: usize,
}

impl Game for EndlessGame {
    type Action = u64;
    type Player = usize;

    fn active_player(&self) -> usize {
        self.ply % 2
    }

    fn legal_actions(&self) -> Vec<u64> {
        vec![0, 1, 2]
    }

    fn forecast(&self, action: u64) -> Self {
        Self {
            path: self.path.wrapping_mul(3).wrapping_add(action + 1),
            ply: self.ply + 1,
        }
    }

    fn plies_played(&self) -> usize {
        self.ply + 10
    }
}

#[allow(clippy::cast_precision_loss)]
fn endless_eval(game: &EndlessGame, perspective: usize) -> f64 {
    let value = (game.path.wrapping_mul(0x9E37_79B9_7F4A_7C15) >> 59) as f64;
    if perspective == game.ply % 2 {
        value
    } else {
        -value
    }
}

fn test_config() -> Arc<EngineConfig> {
    Arc::new(EngineConfig {
        random_opening_plies: 0,
        ..EngineConfig::default()
    })
}

#[test]
fn test_alpha_beta_matches_minimax_on_random_trees() {
    let mut engine = AlphaBetaEngine::new(test_config(), tree_eval);
    for seed in 0..200 {
        let game = TreeGame::root(random_tree(seed, 5));
        for depth in 1..=5 {
            let expected = engine.minimax(&game, depth, 0, &Unbounded).unwrap();
            let actual = engine
                .alpha_beta(&game, depth, f64::NEG_INFINITY, f64::INFINITY, 0, &Unbounded)
                .unwrap();
            assert_eq!(expected.1, actual.1, "seed {seed} depth {depth}");
            assert!(
                (expected.0 - actual.0).abs() < f64::EPSILON,
                "seed {seed} depth {depth}: {} vs {}",
                expected.0,
                actual.0
            );
        }
    }
}

#[test]
fn test_alpha_beta_prunes() {
    let game = EndlessGame { path: 0, ply: 0 };
    let mut engine = AlphaBetaEngine::new(test_config(), endless_eval);

    engine.minimax(&game, 4, 0, &Unbounded).unwrap();
    let full = engine.nodes_searched();
    let before = engine.nodes_searched();
    engine
        .alpha_beta(&game, 4, f64::NEG_INFINITY, f64::INFINITY, 0, &Unbounded)
        .unwrap();
    let pruned = engine.nodes_searched() - before;

    assert_eq!(full, 1 + 3 + 9 + 27 + 81);
    assert!(pruned < full, "alpha-beta visited {pruned} of {full}");
}

#[test]
fn test_minimax_ties_keep_first_action() {
    let tree = Tree {
        children: vec![vec![1, 2, 3], vec![], vec![], vec![]],
        values: vec![0.0, 2.0, 5.0, 5.0],
    };
    let game = TreeGame::root(tree);
    let mut engine = AlphaBetaEngine::new(test_config(), tree_eval);
    assert_eq!(engine.minimax(&game, 1, 0, &Unbounded).unwrap(), (5.0, Some(2)));
    let pruned = engine
        .alpha_beta(&game, 1, f64::NEG_INFINITY, f64::INFINITY, 0, &Unbounded)
        .unwrap();
    assert_eq!(pruned, (5.0, Some(2)));
}

#[test]
fn test_depth_zero_returns_static_value() {
    let game = TreeGame::root(random_tree(7, 3));
    let mut engine = AlphaBetaEngine::new(test_config(), tree_eval);

    let result = engine.minimax(&game, 0, 0, &Unbounded).unwrap();
    assert_eq!(result, (tree_eval(&game, 0), None));
    assert_eq!(engine.nodes_searched(), 1);

    let result = engine
        .alpha_beta(&game, 0, f64::NEG_INFINITY, f64::INFINITY, 0, &Unbounded)
        .unwrap();
    assert_eq!(result, (tree_eval(&game, 0), None));
    assert_eq!(engine.nodes_searched(), 2);
}

#[test]
fn test_expired_clock_times_out() {
    let game = EndlessGame { path: 0, ply: 0 };
    let mut engine = AlphaBetaEngine::new(test_config(), endless_eval);
    let expired = || 0.0;
    assert_eq!(engine.minimax(&game, 3, 0, &expired), Err(Timeout));
    assert_eq!(
        engine.alpha_beta(&game, 3, f64::NEG_INFINITY, f64::INFINITY, 0, &expired),
        Err(Timeout)
    );
}

#[test]
fn test_no_legal_actions_gives_no_move() {
    let tree = Tree {
        children: vec![Vec::new()],
        values: vec![1.0],
    };
    let game = TreeGame::root(tree);
    let mut engine = AlphaBetaEngine::new(test_config(), tree_eval);
    assert!(engine
        .search(&game, SearchLimit::Iterative(None), &Unbounded)
        .is_none());
    assert!(engine.search(&game, SearchLimit::Depth(3), &Unbounded).is_none());
}

#[test]
fn test_timeout_falls_back_to_last_completed_depth() {
    let game = EndlessGame { path: 0, ply: 0 };

    for budget in [10_u32, 50, 200, 1_000, 5_000] {
        let calls = Cell::new(0_u32);
        let clock = || {
            calls.set(calls.get() + 1);
            if calls.get() > budget {
                0.0
            } else {
                1.0e9
            }
        };

        let mut engine = AlphaBetaEngine::new(test_config(), endless_eval);
        let (action, stats) = engine
            .search(&game, SearchLimit::Iterative(None), &clock)
            .unwrap();
        assert!(stats.depth >= 1);

        // The answer must be exactly what a full search at that depth gives
        let mut reference = AlphaBetaEngine::new(test_config(), endless_eval);
        let (expected, expected_stats) = reference
            .search(&game, SearchLimit::Depth(stats.depth), &Unbounded)
            .unwrap();
        assert_eq!(action, expected, "budget {budget}");
        assert!((stats.score - expected_stats.score).abs() < f64::EPSILON);
    }
}

#[test]
fn test_timeout_before_first_depth_gives_no_move() {
    let game = EndlessGame { path: 0, ply: 0 };
    let calls = Cell::new(0_u32);
    // Depth 1 needs four clock checks; the third one fails
    let clock = || {
        calls.set(calls.get() + 1);
        if calls.get() > 2 {
            0.0
        } else {
            1.0e9
        }
    };
    let mut engine = AlphaBetaEngine::new(test_config(), endless_eval);
    assert!(engine
        .search(&game, SearchLimit::Iterative(None), &clock)
        .is_none());
}

#[test]
fn test_iterative_deepening_never_regresses() {
    let game = EndlessGame { path: 0, ply: 0 };
    let mut previous = 0;
    for cap in 1..=6 {
        let mut engine = AlphaBetaEngine::new(test_config(), endless_eval);
        let (action, stats) = engine
            .search(&game, SearchLimit::Iterative(Some(cap)), &Unbounded)
            .unwrap();
        assert_eq!(stats.depth, cap);
        assert!(stats.depth > previous);
        previous = stats.depth;

        let mut fixed = AlphaBetaEngine::new(test_config(), endless_eval);
        let (fixed_action, _) = fixed
            .search(&game, SearchLimit::Depth(cap), &Unbounded)
            .unwrap();
        assert_eq!(action, fixed_action);
    }
}

#[test]
fn test_iterative_deepening_stops_on_solved_tree() {
    // Height-two tree: deepening past depth 2 adds nothing
    let tree = Tree {
        children: vec![vec![1, 2], vec![3], vec![4], vec![], vec![]],
        values: vec![0.0, 0.0, 0.0, 1.0, 2.0],
    };
    let game = TreeGame::root(tree);
    let mut engine = AlphaBetaEngine::new(test_config(), tree_eval);
    let (action, stats) = engine
        .search(&game, SearchLimit::Iterative(None), &Unbounded)
        .unwrap();
    assert_eq!(action, 2);
    assert_eq!(stats.depth, 2);
    assert!((stats.score - 2.0).abs() < f64::EPSILON);
}

#[test]
fn test_minimax_method_through_searcher() {
    let config = Arc::new(EngineConfig {
        method: SearchMethod::Minimax,
        random_opening_plies: 0,
        ..EngineConfig::default()
    });
    let game = EndlessGame { path: 0, ply: 0 };
    let mut minimax = AlphaBetaEngine::new(config, endless_eval);
    let mut alpha_beta = AlphaBetaEngine::new(test_config(), endless_eval);

    let (a, a_stats) = minimax.search(&game, SearchLimit::Depth(4), &Unbounded).unwrap();
    let (b, b_stats) = alpha_beta
        .search(&game, SearchLimit::Depth(4), &Unbounded)
        .unwrap();
    assert_eq!(a, b);
    assert!((a_stats.score - b_stats.score).abs() < f64::EPSILON);
    assert!(b_stats.nodes < a_stats.nodes);
}

#[test]
fn test_opening_bypass_picks_a_legal_move() {
    let tree = Tree {
        children: vec![vec![1, 2, 3], vec![], vec![], vec![]],
        values: vec![0.0, 1.0, 2.0, 3.0],
    };
    let game = TreeGame::root(tree);
    let mut engine = AlphaBetaEngine::new(Arc::new(EngineConfig::default()), tree_eval);
    let (action, stats) = engine
        .search(&game, SearchLimit::Depth(3), &Unbounded)
        .unwrap();
    assert!([1, 2, 3].contains(&action));
    assert_eq!(stats.depth, 0);
    assert_eq!(stats.nodes, 0);
}
