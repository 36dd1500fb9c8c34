use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Duration;

use seabattle::{
    init_logging, print_board, render_empty_board, AliasRegistry, BoardServer, BoardView,
    FileStore, Fleet, GameState, HttpBoardClient, PeerAddress, Position, Ship, ShotOutcome,
    DEFAULT_ALIAS_FILE, DEFAULT_BIND, DEFAULT_FETCH_TIMEOUT, SHIPS,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// File the alias registry is saved to and loaded from.
    #[arg(long, global = true, default_value = DEFAULT_ALIAS_FILE)]
    alias_file: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a board locally.
    Board {
        #[arg(long, help = "JSON fleet file; a fixed layout is used when omitted")]
        fleet: Option<PathBuf>,
        /// Shot to fire before rendering (e.g. --shot D4). Repeatable.
        #[arg(long = "shot")]
        shots: Vec<Position>,
        /// Hide afloat ships, as an opponent would see the board.
        #[arg(long)]
        enemy: bool,
        /// Print the blank grid and exit.
        #[arg(long, conflicts_with_all = ["fleet", "shots", "enemy"])]
        empty: bool,
    },
    /// Serve this board to peers and take incoming shots from stdin.
    Serve {
        #[arg(long, default_value = DEFAULT_BIND)]
        bind: String,
        #[arg(long)]
        fleet: Option<PathBuf>,
    },
    /// Show a peer's board, by alias or host:port.
    Fetch {
        target: String,
        #[arg(long, help = "Request timeout in milliseconds")]
        timeout_ms: Option<u64>,
    },
    /// Manage peer aliases.
    Alias {
        #[command(subcommand)]
        action: AliasCommand,
    },
}

#[derive(Subcommand)]
enum AliasCommand {
    /// List every alias.
    List,
    /// Show the address bound to one alias.
    Show { alias: String },
    /// Bind an alias to host:port, replacing any previous binding.
    Add { alias: String, address: String },
    /// Remove an alias.
    Remove { alias: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let store = FileStore::new(cli.alias_file);

    match cli.command {
        Commands::Board {
            fleet,
            shots,
            enemy,
            empty,
        } => {
            if empty {
                println!("\n{}", render_empty_board());
                return Ok(());
            }
            let mut game = GameState::new(load_fleet(fleet)?);
            for pos in shots {
                let outcome = game.fire(pos);
                log::debug!("{} -> {:?}", pos, outcome);
            }
            let view = if enemy { BoardView::Enemy } else { BoardView::Own };
            print_board(game.fleet(), game.shots(), view);
        }
        Commands::Serve { bind, fleet } => {
            let game = GameState::new(load_fleet(fleet)?).into_shared();
            let server = BoardServer::bind(&bind, game.clone()).await?;
            println!("Serving board on {}", server.local_addr()?);
            let server = tokio::spawn(server.run());

            println!("Enter incoming shots (e.g. D4), `board` to show your board, `quit` to stop.");
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                let line = line.trim();
                match line {
                    "" => continue,
                    "quit" | "exit" => break,
                    "board" => {
                        let game = game
                            .lock()
                            .map_err(|_| anyhow::anyhow!("game state lock poisoned"))?;
                        print_board(game.fleet(), game.shots(), BoardView::Own);
                        continue;
                    }
                    _ => {}
                }
                let pos: Position = match line.parse() {
                    Ok(pos) => pos,
                    Err(e) => {
                        println!("{}", e);
                        continue;
                    }
                };
                let mut game = game
                    .lock()
                    .map_err(|_| anyhow::anyhow!("game state lock poisoned"))?;
                match game.fire(pos) {
                    ShotOutcome::Miss => println!("{}: miss", pos),
                    ShotOutcome::Hit => println!("{}: hit", pos),
                    ShotOutcome::Destroyed(name) => println!("{}: {} destroyed", pos, name),
                }
                if game.is_over() {
                    println!("All ships destroyed.");
                }
            }
            server.abort();
        }
        Commands::Fetch { target, timeout_ms } => {
            let registry = AliasRegistry::load(&store);
            let peer = match registry.lookup(&target) {
                Some(peer) => peer.clone(),
                None => {
                    let (host, port) = seabattle::split_host_port(&target)?;
                    PeerAddress {
                        alias: target.clone(),
                        host,
                        port,
                    }
                }
            };
            let timeout = timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_FETCH_TIMEOUT);
            let client = HttpBoardClient::with_timeout(timeout);
            seabattle::show_remote_board(&client, &peer).await;
        }
        Commands::Alias { action } => {
            // Commands that save must not overwrite a file they could not read.
            let mut registry = match action {
                AliasCommand::Add { .. } | AliasCommand::Remove { .. } => {
                    AliasRegistry::try_load(&store)?
                }
                _ => AliasRegistry::load(&store),
            };
            match action {
                AliasCommand::List => {
                    if registry.is_empty() {
                        println!("No aliases.");
                    } else {
                        print!("{}", registry.listing());
                    }
                }
                AliasCommand::Show { alias } => match registry.listing_for(&alias) {
                    Some(line) => println!("{}", line),
                    None => println!("Unknown alias {}.", alias),
                },
                AliasCommand::Add { alias, address } => {
                    let peer = registry.add(&alias, &address)?.clone();
                    registry.save(&store)?;
                    println!("{} added.", peer);
                }
                AliasCommand::Remove { alias } => {
                    if registry.remove(&alias).is_some() {
                        registry.save(&store)?;
                        println!("{} has been deleted.", alias);
                    } else {
                        println!("Unknown alias {}.", alias);
                    }
                }
            }
        }
    }
    Ok(())
}

/// Fleet from `path`, or the fixed layout: ship `i` lies horizontally on
/// row `2i + 1` starting at column `i + 1`.
fn load_fleet(path: Option<PathBuf>) -> anyhow::Result<Fleet> {
    if let Some(path) = path {
        return Fleet::from_json_file(path);
    }
    let mut ships = Vec::with_capacity(SHIPS.len());
    for (i, def) in SHIPS.iter().enumerate() {
        let row = 2 * i as u8 + 1;
        let start = i as u8 + 1;
        let positions = (0..def.length() as u8)
            .map(|offset| Position::new(start + offset, row))
            .collect::<Result<Vec<_>, _>>()?;
        ships.push(Ship::new(def.name(), positions));
    }
    Ok(Fleet::new(ships)?)
}
