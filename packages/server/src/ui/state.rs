//! Server state shared across handlers.

use std::sync::Arc;

use crate::infrastructure::connection::ConnectionManager;
use crate::usecase::{
    ConnectSessionUseCase, DeleteMessageUseCase, DisconnectSessionUseCase, EditMessageUseCase,
    JoinRoomUseCase, LeaveRoomUseCase, SendMessageUseCase, TypingSignalUseCase,
};

/// Shared application state
pub struct AppState {
    /// ConnectSessionUseCase（セッション接続のユースケース）
    pub connect_session_usecase: Arc<ConnectSessionUseCase>,
    /// DisconnectSessionUseCase（セッション切断のユースケース）
    pub disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
    /// JoinRoomUseCase（ルーム join のユースケース）
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    /// LeaveRoomUseCase（ルーム leave のユースケース）
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// EditMessageUseCase（メッセージ編集のユースケース）
    pub edit_message_usecase: Arc<EditMessageUseCase>,
    /// DeleteMessageUseCase（メッセージ削除のユースケース）
    pub delete_message_usecase: Arc<DeleteMessageUseCase>,
    /// TypingSignalUseCase（タイピングシグナルのユースケース）
    pub typing_signal_usecase: Arc<TypingSignalUseCase>,
    /// ライブコネクション表（last_activity 更新用）
    pub connections: Arc<ConnectionManager>,
}
