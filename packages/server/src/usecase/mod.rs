//! UseCase layer: admission, relay and room lifecycle operations built on the
//! hub engine.

mod admit_participant;
mod close_room;
mod error;
mod get_chat_log;
mod list_rooms;
mod relay_message;

pub use admit_participant::{AdmitParticipantUseCase, Participant};
pub use close_room::CloseRoomUseCase;
pub use error::{AdmissionError, CloseRoomError, RelayError};
pub use get_chat_log::GetChatLogUseCase;
pub use list_rooms::{ListRoomsUseCase, RoomSnapshot};
pub use relay_message::RelayMessageUseCase;
