pub mod atomic;
pub mod config_io;
pub mod id_counter;
pub mod lock;
pub mod note_io;
