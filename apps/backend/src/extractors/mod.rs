pub mod identity;
pub mod room_id;
pub mod validated_json;

pub use identity::{Caller, HeaderIdentityResolver, IdentityResolver};
pub use room_id::RoomPath;
pub use validated_json::ValidatedJson;
