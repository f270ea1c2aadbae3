/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    io::{self, Write},
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{channel, Receiver, Sender},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use uci_parser::{UciCommand, UciOption, UciParseError, UciResponse};

use crate::{
    divide, perft, tune, Board, EngineCommand, Evaluator, Search, SearchConfig, SearchResult,
    BENCHMARK_FENS,
};

/// Default depth at which to run the benchmark searches.
const BENCH_DEPTH: u8 = 4;

/// The newt chess engine.
#[derive(Debug)]
pub struct Engine {
    /// The current state of the chess board, as known to the engine.
    ///
    /// This is modified whenever moves are played or new positions are given,
    /// and is reset whenever the engine is told to start a new game.
    board: Board,

    /// One half of a channel, responsible for sending commands to the engine to execute.
    sender: Sender<EngineCommand>,

    /// One half of a channel, responsible for receiving commands for the engine to execute.
    receiver: Receiver<EngineCommand>,

    /// Atomic flag to determine whether a search is currently running
    is_searching: Arc<AtomicBool>,

    /// Handle to the currently-running search thread, if one exists.
    search_thread: Option<JoinHandle<SearchResult>>,

    /// Time reserved for communicating with the GUI, subtracted from the clock when budgeting a search.
    move_overhead: Duration,

    /// Whether to display extra information during execution.
    debug: bool,
}

impl Engine {
    /// Constructs a new [`Engine`] instance to be executed with [`Engine::run`].
    pub fn new() -> Self {
        let (sender, receiver) = channel();

        Self {
            board: Board::default(),
            sender,
            receiver,
            is_searching: Arc::default(),
            search_thread: None,
            move_overhead: Duration::from_millis(tune::move_overhead!()),
            debug: false,
        }
    }

    /// Returns a string of the engine's name and current version.
    pub fn name(&self) -> String {
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }

    /// Returns a string of all authors of this engine.
    pub fn authors(&self) -> String {
        // Split multiple authors by comma-space
        env!("CARGO_PKG_AUTHORS").replace(':', ", ").to_string()
    }

    /// The position the engine will search next.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Sends an [`EngineCommand`] to the engine to be executed.
    pub fn send_command(&self, command: EngineCommand) {
        // `send` can only fail if the receiver is gone, and the receiver lives as long as the engine does.
        self.sender
            .send(command)
            .expect("Failed to send a command to the engine via channels.");
    }

    /// Execute the main event loop for the engine.
    ///
    /// This function spawns a thread to handle input from `stdin` and executes received commands in order.
    /// It returns once the engine is told to exit, or `stdin` is closed.
    pub fn run(&mut self) {
        // Spawn a separate thread for handling user input
        let sender = self.sender.clone();
        thread::spawn(|| {
            if let Err(err) = input_handler(sender) {
                tracing::debug!("Input handler thread stopping: {err:#}");
            }
        });

        // Loop on user input
        while let Ok(cmd) = self.receiver.recv() {
            tracing::trace!(?cmd, "received command");

            match cmd {
                EngineCommand::Bench { depth, pretty } => {
                    if let Err(e) = self.bench(depth, pretty) {
                        tracing::warn!("bench failed: {e:#}");
                    }
                }

                EngineCommand::Display => println!("{}", self.board),

                EngineCommand::Eval { pretty } => self.eval(pretty),

                EngineCommand::Exit { cleanup } => {
                    // If requested, await the completion of any ongoing search threads
                    if cleanup {
                        self.stop_search();
                    }

                    // Exit the loop so the engine can quit
                    break;
                }

                EngineCommand::Fen => println!("{}", self.board.to_fen()),

                EngineCommand::Moves { sort } => self.moves(sort),

                EngineCommand::Option { name } => {
                    let name = name.join(" ");
                    if let Some(value) = self.get_option(&name) {
                        println!("Option {name:?} := {value}");
                    } else {
                        println!("{} has no option {name:?}", self.name());
                    }
                }

                EngineCommand::Perft { depth } => println!("{}", perft(&mut self.board, depth)),

                EngineCommand::Divide { depth } => self.divide(depth),

                EngineCommand::Uci { cmd } => {
                    // Keep running after a failed command, as UCI requires
                    if let Err(e) = self.handle_uci_command(cmd) {
                        tracing::warn!("{e:#}");
                    }
                }
            };
        }
    }

    /// Handle the execution of a single [`UciCommand`].
    fn handle_uci_command(&mut self, uci: UciCommand) -> Result<()> {
        use UciCommand::*;
        match uci {
            Uci => self.uci(),

            Debug(status) => self.debug = status,

            IsReady => println!("{}", UciResponse::<&str>::ReadyOk),

            SetOption { name, value } => self.set_option(&name, value)?,

            UciNewGame => self.new_game(),

            Position { fen, moves } => self.position(fen, moves)?,

            Go(options) => {
                if let Some(depth) = options.perft {
                    self.divide(depth as usize);
                    return Ok(());
                }

                let config =
                    SearchConfig::new(options, self.board.side_to_move(), self.move_overhead);
                if let Some(handle) = self.start_search(config) {
                    self.search_thread = Some(handle);
                }
            }

            Stop => self.set_is_searching(false),

            Quit => self.send_command(EngineCommand::Exit { cleanup: false }),

            _ => bail!("{} does not support UCI command {uci:?}", self.name()),
        }

        Ok(())
    }

    /// Execute the `bench` command, running a fixed-depth search on a series of positions and displaying the results.
    fn bench(&mut self, depth: Option<u8>, pretty: bool) -> Result<()> {
        // Set up the benchmarking config
        let config = SearchConfig {
            max_depth: depth.unwrap_or(BENCH_DEPTH).max(1),
            ..Default::default()
        };

        let benches = BENCHMARK_FENS;
        let mut nodes = 0;

        // Padding for printing FENs
        let width = benches.iter().map(|fen| fen.len()).max().unwrap_or_default();

        println!(
            "Running fixed-depth search (d={}) on {} positions",
            config.max_depth,
            benches.len()
        );

        // Run a fixed search on each position
        for (i, fen) in benches.into_iter().enumerate() {
            print!("{:>2}/{:>2}: {fen:<width$} := ", i + 1, benches.len());
            // flush stdout so the node count will appear on the same line after search concludes
            io::stdout().lock().flush()?;

            self.board = Board::from_fen(fen).with_context(|| format!("Invalid bench FEN {fen:?}"))?;
            self.search_thread = self.start_search(config);

            // Await the search, appending the node count once concluded.
            let Some(res) = self.stop_search() else {
                bail!("Search thread failed while running benchmarks on fen {fen}");
            };
            nodes += res.nodes;
            println!("{}", res.nodes);
        }

        // Compute results
        let elapsed = config.starttime.elapsed();
        let nps = (nodes as f32 / elapsed.as_secs_f32()) as u64;
        let m_nps = nodes as f32 / elapsed.as_secs_f32() / 1_000_000.0;
        let ms = elapsed.as_millis();

        if pretty {
            // Display the results in a nice table
            println!();
            println!("+-- Benchmark Complete --+");
            println!("| time (ms)  {ms:<12}|");
            println!("|     nodes  {nodes:<12}|");
            println!("|       nps  {nps:<12}|");
            println!("|      Mnps  {m_nps:<12.2}|");
            println!("+------------------------+");
        } else {
            println!("{nodes} nodes / {elapsed:?} := {nps} nps");
        }

        // Re-set the internal board state.
        self.new_game();

        Ok(())
    }

    /// Executes the `eval` command, printing an evaluation of the current position.
    fn eval(&self, pretty: bool) {
        let evaluator = Evaluator::new(&self.board);
        if pretty {
            println!("{evaluator}");
        } else {
            println!("{}", evaluator.eval());
        }
    }

    /// Executes the `moves` command, printing all legal moves in the current position.
    fn moves(&mut self, sort: bool) {
        let mut moves = self
            .board
            .get_legal_moves()
            .into_iter()
            .map(|mv| mv.to_string())
            .collect::<Vec<_>>();

        if sort {
            moves.sort();
        }

        // If there are none, print "(none)"
        if moves.is_empty() {
            println!("(none)");
        } else {
            println!("{}", moves.join(", "));
        }
    }

    /// Executes the `divide` command, printing the perft count after every legal move and then the total.
    fn divide(&mut self, depth: usize) {
        let split = divide(&mut self.board, depth);
        let total = split.iter().map(|&(_, nodes)| nodes).sum::<u64>();

        for (mv, nodes) in split {
            println!("{mv}: {nodes}");
        }
        println!("\n{total}");
    }

    /// Set the position to the supplied FEN string (defaults to the standard startpos if not supplied),
    /// and then apply `moves` one-by-one to the position.
    ///
    /// If a move cannot be applied, the engine keeps the position reached before it and an error is returned.
    /// If the FEN is invalid, the current position is left untouched.
    fn position<T: AsRef<str>>(
        &mut self,
        fen: Option<T>,
        moves: impl IntoIterator<Item = T>,
    ) -> Result<()> {
        // Set the new position
        let mut board = if let Some(fen) = fen {
            let fen = fen.as_ref();
            Board::from_fen(fen).with_context(|| format!("Failed to set position {fen:?}"))?
        } else {
            Board::default()
        };

        // Apply the provided moves
        let mut applied = Ok(());
        for mv in moves {
            let mv = mv.as_ref();
            if let Err(e) = board.make_uci(mv) {
                applied = Err(e).with_context(|| format!("Failed to apply move {mv:?}"));
                break;
            }
        }

        self.board = board;
        applied
    }

    /// Resets the engine's internal board state.
    ///
    /// It also cancels any ongoing searches, ignoring their results.
    fn new_game(&mut self) {
        self.set_is_searching(false);
        self.board = Board::default();
    }

    /// Sets the search flag to signal that the engine is starting/stopping a search.
    fn set_is_searching(&mut self, status: bool) {
        self.is_searching.store(status, Ordering::Relaxed);
    }

    /// Returns `true` if the engine is currently executing a searching.
    fn is_searching(&self) -> bool {
        self.is_searching.load(Ordering::Relaxed)
    }

    /// Starts a search on the current position, given the parameters in `config`.
    fn start_search(&mut self, config: SearchConfig) -> Option<JoinHandle<SearchResult>> {
        // Cannot start a search if one is already running
        if self.is_searching() {
            Self::send_string("A search is already running");
            return None;
        }
        self.set_is_searching(true);

        // The search thread gets its own copy of the board
        let board = self.board.clone();
        let is_searching = Arc::clone(&self.is_searching);

        // Spawn a thread to conduct the search
        let handle = thread::spawn(move || Search::new(board, is_searching, config).start());

        Some(handle)
    }

    /// Awaits the current search thread, blocking until it finishes and returning its result.
    fn stop_search(&mut self) -> Option<SearchResult> {
        // Can't stop a search if there aren't any threads searching!
        let handle = self.search_thread.take()?;

        // Attempt to join the thread handle to retrieve the result
        let id = handle.thread().id();
        let Ok(res) = handle.join() else {
            Self::send_string(format!("Failed to join on thread {id:?}"));
            return None;
        };

        // Flip the search flag so that any active threads will (hopefully) begin to clean themselves up.
        self.set_is_searching(false);

        Some(res)
    }

    /// Called when the engine receives the `uci` command.
    ///
    /// Prints engine's ID, version, and authors, and lists all UCI options.
    fn uci(&self) {
        println!("id name {}\nid author {}\n", self.name(), self.authors());

        // Print all UCI options
        for opt in self.options() {
            println!("{}", UciResponse::Option(opt));
        }

        // We're ready to go!
        println!("{}", UciResponse::<&str>::UciOk)
    }

    /// Convenience function to return an iterator over all UCI options this engine supports.
    fn options(&self) -> impl Iterator<Item = UciOption> {
        [
            UciOption::spin("Threads", 1, 1, 1),
            UciOption::spin(
                "Move Overhead",
                tune::move_overhead!(),
                0,
                tune::max_move_overhead!(),
            ),
        ]
        .into_iter()
    }

    /// Handles the `setoption` command, setting option `name` to `value`.
    ///
    /// Will return an error if `name` isn't a valid option or `value` is not a valid value for that option.
    fn set_option(&mut self, name: &str, value: Option<String>) -> Result<()> {
        let Some(value) = value.as_ref() else {
            bail!("usage: setoption name {name} value <value>");
        };

        match name {
            "Threads" => {
                if value.trim() != "1" {
                    bail!("{} currently supports only 1 thread", self.name());
                }
            }

            "Move Overhead" => {
                let Ok(ms) = value.trim().parse::<u64>() else {
                    bail!("expected integer. got {value:?}");
                };

                if ms > tune::max_move_overhead!() {
                    bail!("Maximum value for {name} is {}ms", tune::max_move_overhead!());
                }

                self.move_overhead = Duration::from_millis(ms);
            }

            _ => bail!("Unrecognized option {name:?} with value {value:?}"),
        }

        if self.debug {
            Self::send_string(format!("Option {name} set to {value}"));
        }

        Ok(())
    }

    /// Returns the current value of the option `name`, if it exists on this engine.
    fn get_option(&self, name: &str) -> Option<String> {
        let value = match name {
            "Threads" => String::from("1"),
            "Move Overhead" => self.move_overhead.as_millis().to_string(),
            _ => return None,
        };

        Some(value)
    }

    /// Helper to send a [`UciResponse`] containing only a `string` message to `stdout`.
    fn send_string<T: fmt::Display>(info: T) {
        println!("{}", UciResponse::info_string(info));
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Loops endlessly to await input via `stdin`, sending all successfully-parsed commands through the supplied `sender`.
fn input_handler(sender: Sender<EngineCommand>) -> Result<()> {
    let mut buffer = String::with_capacity(2048);

    loop {
        // Clear the buffer, read input, and trim the trailing newline
        buffer.clear();
        let bytes = io::stdin()
            .read_line(&mut buffer)
            .context("Failed to read line when parsing UCI commands")?;

        // For ctrl + d
        if 0 == bytes {
            // Send the Quit command and exit this function
            sender
                .send(EngineCommand::Exit { cleanup: false })
                .context("Failed to send 'quit' command after receiving empty input")?;

            bail!("Engine received input of 0 bytes and is quitting");
        }

        // Trim any leading/trailing whitespace
        let buf = buffer.trim();

        // Ignore empty lines
        if buf.is_empty() {
            continue;
        }

        // Attempt to parse the input as a UCI command first, since that's the primary use case of the engine
        match UciCommand::new(buf) {
            Ok(cmd) => sender
                .send(EngineCommand::Uci { cmd })
                .context("Failed to send UCI command to engine")?,

            // If it's not a UCI command, check if it's an engine-specific command
            Err(UciParseError::UnrecognizedCommand { cmd: _ }) => match buf.parse() {
                Ok(cmd) => sender
                    .send(cmd)
                    .context("Failed to send command to engine")?,

                // If it wasn't a custom command, either, print an error.
                Err(err) => eprintln!("{err}"),
            },

            // If it was a UCI command, print a usage message.
            Err(uci_err) => eprintln!("{uci_err:#}"),
        }
    }
}
