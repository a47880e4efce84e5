//! 핸들러 모듈

pub mod broadcast;
pub mod connection;
pub mod dispatch;
pub mod game;
pub mod guard;

pub use dispatch::*;
pub use game::GameEngine;
