pub mod alias;
mod board;
mod common;
mod config;
pub mod fetch;
mod game;
mod logging;
mod position;
pub mod server;
mod ship;

pub use alias::{split_host_port, AliasRegistry, AliasStore, FileStore, MemoryStore, PeerAddress};
pub use board::*;
pub use common::*;
pub use config::*;
pub use fetch::{show_remote_board, write_remote_board, BoardClient, HttpBoardClient, FETCH_FAILED};
pub use game::*;
pub use logging::init_logging;
pub use position::Position;
pub use server::BoardServer;
pub use ship::*;
