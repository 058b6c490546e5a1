//! Shared application state.

use std::sync::Arc;

use kyodo_shared::time::Clock;

use crate::{
    config::ConnectionConfig,
    domain::{ChatLogRepository, IdentityVerifier},
    infrastructure::hub::HubRegistry,
    usecase::{
        AdmitParticipantUseCase, CloseRoomUseCase, GetChatLogUseCase, ListRoomsUseCase,
        RelayMessageUseCase,
    },
};

pub struct AppState {
    /// Verifier（認証ミドルウェアが使う）
    pub verifier: Arc<dyn IdentityVerifier>,
    /// AdmitParticipantUseCase（接続受け入れのユースケース）
    pub admit_participant_usecase: Arc<AdmitParticipantUseCase>,
    /// RelayMessageUseCase（メッセージ中継のユースケース）
    pub relay_message_usecase: Arc<RelayMessageUseCase>,
    /// CloseRoomUseCase（Room クローズ通知のユースケース）
    pub close_room_usecase: Arc<CloseRoomUseCase>,
    /// ListRoomsUseCase（Room 一覧取得のユースケース）
    pub list_rooms_usecase: Arc<ListRoomsUseCase>,
    /// GetChatLogUseCase（チャット履歴取得のユースケース）
    pub get_chat_log_usecase: Arc<GetChatLogUseCase>,
    pub connection_config: ConnectionConfig,
}

impl AppState {
    /// Wire every use case onto one hub registry and one chat log.
    pub fn new(
        registry: Arc<HubRegistry>,
        verifier: Arc<dyn IdentityVerifier>,
        chat_log: Arc<dyn ChatLogRepository>,
        clock: Arc<dyn Clock>,
        connection_config: ConnectionConfig,
    ) -> Self {
        Self {
            admit_participant_usecase: Arc::new(AdmitParticipantUseCase::new(
                verifier.clone(),
                registry.clone(),
                clock.clone(),
                connection_config.queue_capacity,
            )),
            relay_message_usecase: Arc::new(RelayMessageUseCase::new(
                chat_log.clone(),
                clock.clone(),
            )),
            close_room_usecase: Arc::new(CloseRoomUseCase::new(registry.clone(), clock)),
            list_rooms_usecase: Arc::new(ListRoomsUseCase::new(registry)),
            get_chat_log_usecase: Arc::new(GetChatLogUseCase::new(chat_log)),
            verifier,
            connection_config,
        }
    }
}
