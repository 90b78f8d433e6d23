pub mod rooms_memory;
pub mod rooms_sea;

pub use rooms_memory::MemoryRoomRepo;
pub use rooms_sea::SeaRoomRepo;
