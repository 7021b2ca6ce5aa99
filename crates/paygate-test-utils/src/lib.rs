pub mod clock;
pub mod helpers;
pub mod mock_gateway;
pub mod mock_terminal;

pub use clock::ManualClock;
pub use helpers::*;
pub use mock_gateway::{MockGateway, RecordedCall};
pub use mock_terminal::{MockTerminal, TerminalCall};
