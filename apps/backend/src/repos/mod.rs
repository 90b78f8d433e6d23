pub mod rooms;

pub use rooms::RoomRepo;
