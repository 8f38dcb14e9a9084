//! UseCase 層
//!
//! リアルタイムコアの操作を 1 ユースケース 1 ファイルで定義します。
//! 各ユースケースは Repository / Resolver の trait と、注入された
//! ConnectionManager / BroadcastRouter / TypingTracker に依存します。

mod connect_session;
mod delete_message;
mod disconnect_session;
mod edit_message;
pub mod error;
mod join_room;
mod leave_room;
mod send_message;
mod typing_signal;

pub use connect_session::ConnectSessionUseCase;
pub use delete_message::DeleteMessageUseCase;
pub use disconnect_session::DisconnectSessionUseCase;
pub use edit_message::EditMessageUseCase;
pub use error::{
    ConnectError, DeleteMessageError, EditMessageError, JoinRoomError, SendMessageError,
    TypingError,
};
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use send_message::SendMessageUseCase;
pub use typing_signal::TypingSignalUseCase;
