/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use anyhow::{bail, Result};
use arrayvec::ArrayVec;
use uci_parser::{UciInfo, UciResponse, UciSearchOptions};

use crate::{tune, Board, Color, Evaluator, Move, MoveCategory, Score};

/// Maximum depth that can be searched
pub const MAX_DEPTH: u8 = u8::MAX;

/// The kind of limit placed on a search, derived from the options of the UCI `go` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Search until told to stop.
    #[default]
    Infinite,

    /// Search to a fixed depth.
    Depth(u8),

    /// Search for exactly this long.
    MoveTime(Duration),

    /// Budget the search from the time remaining on the clock.
    GameTime {
        time: Duration,
        inc: Duration,
        moves_to_go: Option<u32>,
    },

    /// Count leaf nodes instead of searching.
    Perft(usize),
}

impl SearchMode {
    /// Determines the mode of a search from the options given to `go`, for `side_to_move`.
    ///
    /// `perft` takes priority, followed by `infinite`, `movetime`, the clock, and finally `depth`.
    pub fn new(options: &UciSearchOptions, side_to_move: Color) -> Self {
        let (time, inc) = match side_to_move {
            Color::White => (options.wtime, options.winc),
            Color::Black => (options.btime, options.binc),
        };

        if let Some(depth) = options.perft {
            Self::Perft(depth as usize)
        } else if options.infinite {
            Self::Infinite
        } else if let Some(movetime) = options.movetime {
            Self::MoveTime(movetime)
        } else if let Some(time) = time {
            Self::GameTime {
                time,
                inc: inc.unwrap_or(Duration::ZERO),
                moves_to_go: options.movestogo.map(|m| m as u32),
            }
        } else if let Some(depth) = options.depth {
            Self::Depth(u8::try_from(depth).unwrap_or(MAX_DEPTH))
        } else {
            Self::Infinite
        }
    }
}

/// Represents the best sequence of moves found during a search.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrincipalVariation(ArrayVec<Move, { MAX_DEPTH as usize }>);

impl PrincipalVariation {
    /// An empty PV.
    const EMPTY: Self = Self(ArrayVec::new_const());

    /// The first move of the variation, if there is one.
    #[inline(always)]
    pub fn first(&self) -> Option<Move> {
        self.0.first().copied()
    }

    /// Iterates over the moves of the variation, in order.
    #[inline(always)]
    pub fn iter(&self) -> impl Iterator<Item = &Move> {
        self.0.iter()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline(always)]
    fn clear(&mut self) {
        self.0.clear();
    }

    /// Replace the contents of `self` with `mv` followed by the contents of `other`.
    #[inline(always)]
    fn extend(&mut self, mv: Move, other: &Self) {
        self.clear();
        self.0.push(mv);
        self.0
            .try_extend_from_slice(&other.0)
            .unwrap_or_else(|err| {
                panic!(
                    "{err}: Attempted to exceed PV capacity of {MAX_DEPTH} pushing {mv:?} and {:?}",
                    &other.0
                );
            });
    }
}

impl Default for PrincipalVariation {
    #[inline(always)]
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Display for PrincipalVariation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let moves = self.0.iter().map(|mv| mv.to_string()).collect::<Vec<_>>();
        write!(f, "{}", moves.join(" "))
    }
}

/// The result of a search, containing the best move found, score, and total nodes searched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchResult {
    /// Number of nodes searched.
    pub nodes: u64,

    /// Best move found during the search.
    ///
    /// `None` only if the side to move has no legal moves.
    pub bestmove: Option<Move>,

    /// Evaluation of the position, from the side-to-move's perspective.
    pub score: Score,

    /// The depth of the last fully-completed iteration.
    ///
    /// Zero if no iteration completed.
    pub depth: u8,

    /// Principal variation of the last fully-completed iteration.
    pub pv: PrincipalVariation,
}

impl Default for SearchResult {
    /// A default search result should initialize to a *very bad* value,
    /// since there isn't a move to play.
    #[inline(always)]
    fn default() -> Self {
        Self {
            nodes: 0,
            bestmove: None,
            score: -Score::INF,
            depth: 0,
            pv: PrincipalVariation::EMPTY,
        }
    }
}

/// Configuration variables for executing a [`Search`].
#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    /// Maximum depth to execute the search.
    pub max_depth: u8,

    /// Node allowance.
    ///
    /// If the search exceeds this many nodes, it will exit as quickly as possible.
    pub max_nodes: u64,

    /// Start time of the search.
    pub starttime: Instant,

    /// Soft limit on search time.
    ///
    /// Checked between iterations of iterative deepening: once exceeded, no deeper iteration is started.
    pub soft_timeout: Duration,

    /// Hard limit on search time.
    ///
    /// During *any* point in the search, if this limit is exceeded, the search will cancel.
    pub hard_timeout: Duration,
}

impl SearchConfig {
    /// Constructs a new [`SearchConfig`] from the provided UCI options.
    ///
    /// Neither timeout may exceed the clock time minus `overhead`,
    /// which accounts for communication delays with the GUI.
    pub fn new(options: UciSearchOptions, side_to_move: Color, overhead: Duration) -> Self {
        let mut config = Self::default();

        // Depth and node limits apply in every mode
        if let Some(depth) = options.depth {
            config.max_depth = u8::try_from(depth).unwrap_or(MAX_DEPTH).max(1);
        }

        if let Some(nodes) = options.nodes {
            config.max_nodes = nodes as u64;
        }

        match SearchMode::new(&options, side_to_move) {
            SearchMode::MoveTime(movetime) => {
                config.soft_timeout = movetime;
                config.hard_timeout = movetime;
            }

            SearchMode::GameTime {
                time,
                inc,
                moves_to_go,
            } => {
                let moves_to_go = moves_to_go
                    .filter(|&m| m > 0)
                    .unwrap_or(tune::soft_timeout_divisor!());
                let inc = inc / tune::time_inc_divisor!();
                let limit = time.saturating_sub(overhead);

                config.soft_timeout = (time / moves_to_go + inc).min(limit);
                config.hard_timeout = (time / tune::hard_timeout_divisor!() + inc).min(limit);
            }

            SearchMode::Depth(_) | SearchMode::Infinite | SearchMode::Perft(_) => {}
        }

        config
    }
}

impl Default for SearchConfig {
    /// A default [`SearchConfig`] will permit an "infinite" search.
    ///
    /// The word "infinite" is quoted here because the actual defaults are the `::MAX` values for each field.
    #[inline(always)]
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            max_nodes: u64::MAX,
            starttime: Instant::now(),
            soft_timeout: Duration::MAX,
            hard_timeout: Duration::MAX,
        }
    }
}

/// Executes a search on a position.
///
/// The search owns its [`Board`] and mutates it with make/undo;
/// the board is back in its starting state whenever a search iteration ends, completed or not.
pub struct Search {
    /// The position being searched.
    board: Board,

    /// Number of nodes searched.
    nodes: u64,

    /// An atomic flag to determine if the search should be cancelled at any time.
    ///
    /// If this is ever `false`, the search will exit as soon as possible.
    is_searching: Arc<AtomicBool>,

    /// Configuration variables for this instance of the search.
    config: SearchConfig,

    /// Whether limits are polled during search.
    ///
    /// Off for the first iteration, so every search produces a move from a completed depth.
    can_cancel: bool,
}

impl Search {
    /// Construct a new [`Search`] instance to execute on the provided [`Board`].
    #[inline(always)]
    pub fn new(board: Board, is_searching: Arc<AtomicBool>, config: SearchConfig) -> Self {
        Self {
            board,
            nodes: 0,
            is_searching,
            config,
            can_cancel: false,
        }
    }

    /// Start the search, returning its results.
    ///
    /// This is the entrypoint of the search, and prints UCI info during iterative deepening,
    /// concluding by sending the `bestmove` message and exiting.
    pub fn start(mut self) -> SearchResult {
        tracing::debug!(
            fen = %self.board.to_fen(),
            max_depth = self.config.max_depth,
            max_nodes = self.config.max_nodes,
            soft_timeout_ms = self.config.soft_timeout.as_millis() as u64,
            hard_timeout_ms = self.config.hard_timeout.as_millis() as u64,
            "starting search"
        );

        let res = self.iterative_deepening();

        // Search has ended; send bestmove
        self.send_response(UciResponse::BestMove {
            bestmove: res.bestmove.map(|mv| mv.to_string()),
            ponder: None,
        });

        // Search has concluded, alert other threads that we are no longer searching
        self.is_searching.store(false, Ordering::Relaxed);

        res
    }

    /// Sends a [`UciResponse`] to `stdout`.
    #[inline(always)]
    fn send_response<T: fmt::Display>(&self, response: UciResponse<T>) {
        println!("{response}");
    }

    /// Sends a [`UciInfo`] to `stdout`.
    #[inline(always)]
    fn send_info(&self, info: UciInfo) {
        let resp = UciResponse::info(info);
        self.send_response(resp);
    }

    /// Sends UCI info about a completed iteration.
    fn send_iteration_info(&self, result: &SearchResult) {
        let elapsed = self.config.starttime.elapsed();

        self.send_info(
            UciInfo::new()
                .depth(result.depth)
                .score(result.score)
                .nodes(self.nodes)
                .nps((self.nodes as f32 / elapsed.as_secs_f32()).trunc())
                .time(elapsed.as_millis())
                .pv(result.pv.iter().map(|mv| mv.to_string())),
        );
    }

    /// Performs [iterative deepening](https://www.chessprogramming.org/Iterative_Deepening) (ID) on the Search's position.
    ///
    /// Searches at depth 1, 2, 3, ... keeping the result of each completed depth.
    /// A depth that is cancelled partway through is thrown away in favor of the previous one.
    /// After each iteration, we check if we've exceeded our `soft_timeout` and, if we haven't, we run a search at a greater depth.
    fn iterative_deepening(&mut self) -> SearchResult {
        let mut result = SearchResult::default();

        for depth in 1..=self.config.max_depth {
            let mut pv = PrincipalVariation::default();

            let score = match self.negamax(depth, 0, -Score::INF, Score::INF, &mut pv) {
                Ok(score) => score,
                Err(err) => {
                    tracing::info!(
                        depth,
                        fallback_depth = result.depth,
                        bestmove = ?result.bestmove,
                        "search cancelled: {err}"
                    );
                    break;
                }
            };

            result.depth = depth;
            result.score = score;
            result.bestmove = pv.first();
            result.pv = pv;

            tracing::debug!(depth, score = %score, nodes = self.nodes, pv = %result.pv, "completed depth");
            self.send_iteration_info(&result);

            // Every later iteration may be cancelled, since there is a result to fall back on
            self.can_cancel = true;

            // No legal moves at the root: checkmate or stalemate, deeper searches can't change that
            if result.bestmove.is_none() {
                break;
            }

            // A forced mate has been found
            if score.is_mate() {
                break;
            }

            if self.config.starttime.elapsed() >= self.config.soft_timeout
                || !self.is_searching.load(Ordering::Relaxed)
            {
                break;
            }
        }

        result.nodes = self.nodes;

        // ID loop has concluded (either by finishing or timing out),
        //  so we return the result from the last successfully-completed search.
        result
    }

    /// Returns an error if the search must stop: the hard timeout, the stop flag, or the node allowance.
    fn check_limits(&self) -> Result<()> {
        if self.config.starttime.elapsed() >= self.config.hard_timeout {
            let ms = self.config.hard_timeout.as_millis();
            bail!("exceeded hard timeout of {ms}ms");
        }

        if !self.is_searching.load(Ordering::Relaxed) {
            bail!("cancelled by external command");
        }

        if self.nodes >= self.config.max_nodes {
            let nodes = self.config.max_nodes;
            bail!("exceeded node allowance of {nodes} nodes");
        }

        Ok(())
    }

    /// Primary location of search logic.
    ///
    /// Uses the [negamax](https://www.chessprogramming.org/Negamax) algorithm with
    /// [alpha-beta pruning](https://www.chessprogramming.org/Alpha-Beta) in a fail-soft framework.
    ///
    /// If the search is cancelled, the board is restored on the way out and an error is returned.
    pub(crate) fn negamax(
        &mut self,
        depth: u8,
        ply: i32,
        mut alpha: Score,
        beta: Score,
        pv: &mut PrincipalVariation,
    ) -> Result<Score> {
        self.nodes += 1;
        pv.clear();

        if self.can_cancel && self.nodes % tune::poll_interval!() == 0 {
            self.check_limits()?;
        }

        // Draws are only scored below the root, so there is always a move to play
        if ply > 0 && self.board.is_draw() {
            return Ok(Score::DRAW);
        }

        // If we've reached a terminal node, evaluate the position
        if depth == 0 {
            return Ok(Evaluator::new(&self.board).eval());
        }

        let color = self.board.side_to_move();
        let mut local_pv = PrincipalVariation::default();
        let mut best = -Score::INF;
        let mut legal_moves = 0;

        for mv in self.board.get_pseudo_legal_moves(MoveCategory::All) {
            self.board.make(mv);
            if self.board.is_in_check(color) {
                self.board.undo();
                continue;
            }
            legal_moves += 1;

            let score = match self.negamax(depth - 1, ply + 1, -beta, -alpha, &mut local_pv) {
                Ok(score) => -score,
                Err(err) => {
                    self.board.undo();
                    return Err(err);
                }
            };
            self.board.undo();

            if score > best {
                best = score;

                if score > alpha {
                    alpha = score;
                    pv.extend(mv, &local_pv);
                }

                if score >= beta {
                    break;
                }
            }
        }

        // If there are no legal moves, it's either mate or a draw.
        if legal_moves == 0 {
            let score = if self.board.is_in_check(color) {
                // Prefer earlier mates
                Score::mated_in(ply)
            } else {
                Score::DRAW
            };

            return Ok(score);
        }

        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use uci_parser::UciCommand;

    use super::*;

    fn search(fen: &str, config: SearchConfig) -> SearchResult {
        let is_searching = Arc::new(AtomicBool::new(true));
        let board = Board::from_fen(fen).unwrap();

        Search::new(board, is_searching, config).start()
    }

    fn ensure_is_mate_in(fen: &str, config: SearchConfig, moves: i32) {
        let res = search(fen, config);
        assert!(
            res.score.is_mate(),
            "Search on {fen:?} with config {config:#?} produced result that is not mate.\nResult: {res:#?}"
        );
        assert_eq!(
            res.score.moves_to_mate(),
            moves,
            "Search on {fen:?} with config {config:#?} produced result not mate in {moves}.\nResult: {res:#?}"
        );
    }

    #[test]
    fn test_white_mate_in_1() {
        let fen = "k7/8/KQ6/8/8/8/8/8 w - - 0 1";
        let config = SearchConfig {
            max_depth: 2,
            ..Default::default()
        };

        ensure_is_mate_in(fen, config, 1);
    }

    #[test]
    fn test_black_mated_in_1() {
        let fen = "1k6/8/KQ6/2Q5/8/8/8/8 b - - 0 1";
        let config = SearchConfig {
            max_depth: 3,
            ..Default::default()
        };

        ensure_is_mate_in(fen, config, -1);
    }

    #[test]
    fn test_mate_in_1_finds_the_mating_move() {
        // Back-rank mate
        let res = search("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1", SearchConfig::default());
        assert_eq!(res.bestmove.map(|mv| mv.to_string()), Some("a1a8".to_string()));
        assert_eq!(res.score, Score::MATE - 1);

        // Mate is only seen once the reply is searched, and deepening stops right after
        assert_eq!(res.depth, 2);
    }

    #[test]
    fn test_stalemate() {
        let fen = "k7/8/KQ6/8/8/8/8/8 b - - 0 1";
        let res = search(fen, SearchConfig::default());

        assert!(res.bestmove.is_none());
        assert_eq!(res.score, Score::DRAW);
        assert_eq!(res.depth, 1);
    }

    #[test]
    fn test_checkmated_at_root() {
        let fen = "R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1";
        let res = search(fen, SearchConfig::default());

        assert!(res.bestmove.is_none());
        assert_eq!(res.score, Score::mated_in(0));
    }

    #[test]
    fn test_pre_cleared_stop_flag_completes_one_depth() {
        let is_searching = Arc::new(AtomicBool::new(false));
        let res = Search::new(Board::new(), is_searching, SearchConfig::default()).start();

        assert_eq!(res.depth, 1);
        assert!(res.bestmove.is_some());
        assert_eq!(res.nodes, 21);
    }

    #[test]
    fn test_node_limit_cancels_deeper_iterations() {
        let config = SearchConfig {
            max_nodes: 5_000,
            ..Default::default()
        };
        let res = search(crate::FEN_KIWIPETE, config);

        assert!(res.depth >= 1);
        assert!(res.depth < MAX_DEPTH);
        assert!(res.bestmove.is_some());
    }

    #[test]
    fn test_search_leaves_board_untouched() {
        let board = Board::from_fen(crate::FEN_KIWIPETE).unwrap();
        let mut search = Search::new(
            board.clone(),
            Arc::new(AtomicBool::new(true)),
            SearchConfig::default(),
        );

        let mut pv = PrincipalVariation::default();
        search
            .negamax(3, 0, -Score::INF, Score::INF, &mut pv)
            .unwrap();
        assert_eq!(search.board, board);
        assert_eq!(pv.len(), 3);
    }

    #[test]
    fn test_iterative_deepening_matches_fixed_depth() {
        let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";

        for depth in 1..=3 {
            let config = SearchConfig {
                max_depth: depth,
                ..Default::default()
            };
            let res = search(fen, config);

            let mut fixed = Search::new(
                Board::from_fen(fen).unwrap(),
                Arc::new(AtomicBool::new(true)),
                SearchConfig::default(),
            );
            let mut pv = PrincipalVariation::default();
            let score = fixed
                .negamax(depth, 0, -Score::INF, Score::INF, &mut pv)
                .unwrap();

            assert_eq!(res.depth, depth);
            assert_eq!(res.score, score, "depth {depth}");
            assert_eq!(res.bestmove, pv.first(), "depth {depth}");
        }
    }

    fn go(cmd: &str) -> UciSearchOptions {
        match UciCommand::new(cmd).unwrap() {
            UciCommand::Go(options) => options,
            other => panic!("{cmd:?} parsed as {other:?}"),
        }
    }

    #[test]
    fn test_search_mode_priority() {
        let options = go("go depth 4 wtime 60000");
        assert!(matches!(
            SearchMode::new(&options, Color::White),
            SearchMode::GameTime { .. }
        ));
        assert_eq!(SearchMode::new(&options, Color::Black), SearchMode::Depth(4));

        let options = go("go movetime 300 infinite");
        assert_eq!(SearchMode::new(&options, Color::White), SearchMode::Infinite);
        assert_eq!(SearchMode::new(&go("go"), Color::White), SearchMode::Infinite);
        assert_eq!(SearchMode::new(&go("go perft 3"), Color::White), SearchMode::Perft(3));
    }

    #[test]
    fn test_movetime_sets_both_timeouts() {
        let options = go("go movetime 300");
        let config = SearchConfig::new(options, Color::White, Duration::from_millis(50));

        assert_eq!(config.soft_timeout, Duration::from_millis(300));
        assert_eq!(config.hard_timeout, Duration::from_millis(300));
    }

    #[test]
    fn test_game_time_budget() {
        let options = go("go wtime 1 btime 10000 winc 0 binc 1000");
        let config = SearchConfig::new(options, Color::Black, Duration::from_millis(50));

        // 10000 / 20 + 1000 / 2
        assert_eq!(config.soft_timeout, Duration::from_millis(1_000));
        // 10000 / 5 + 1000 / 2
        assert_eq!(config.hard_timeout, Duration::from_millis(2_500));
        assert_eq!(config.max_depth, MAX_DEPTH);
    }

    #[test]
    fn test_game_time_respects_overhead() {
        let options = go("go wtime 100 btime 100 winc 2000 binc 2000 movestogo 1");
        let config = SearchConfig::new(options, Color::White, Duration::from_millis(50));

        assert_eq!(config.soft_timeout, Duration::from_millis(50));
        assert_eq!(config.hard_timeout, Duration::from_millis(50));

        let options = go("go wtime 10 btime 10");
        let config = SearchConfig::new(options, Color::White, Duration::from_millis(50));
        assert_eq!(config.hard_timeout, Duration::ZERO);
    }
}
