//! Infrastructure 層
//!
//! ドメイン層の trait（Repository / Resolver / Pusher）の具体的な実装と、
//! プロセス内共有状態（コネクション表・タイピング状態）、ワイヤ DTO を
//! 提供します。

pub mod auth;
pub mod broadcast;
pub mod connection;
pub mod dto;
pub mod message_pusher;
pub mod presence;
pub mod repository;
