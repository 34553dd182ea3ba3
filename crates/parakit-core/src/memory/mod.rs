mod bytes;
pub mod layout;
mod process;
mod reader;

// Mock memory reader for testing (always available for unit and integration tests)
#[doc(hidden)]
pub mod mock;

pub use bytes::{decode_shift_jis, decode_shift_jis_to_string};
pub use process::*;
pub use reader::{MemoryReader, ReadMemory};

#[doc(hidden)]
pub use mock::{MockMemoryBuilder, MockMemoryReader, MockProcess, ProcessEvent};
