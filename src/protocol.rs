use alloc::string::String;

use crate::common::ShotResult;

/// Version exchanged in the connection handshake.
pub const PROTOCOL_VERSION: u32 = 1;

/// Messages exchanged between two peers.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Message {
    /// Connection handshake; carries the sender's protocol version.
    Hello { version: u32 },
    /// Sender has finished placement.
    Ready,
    /// Sender targets the receiver's board.
    Fire { row: u8, col: u8 },
    /// Outcome of a previous `Fire`, as resolved on the receiver's board.
    Result {
        row: u8,
        col: u8,
        result: ShotResult,
        sunk_name: Option<String>,
    },
    /// Sender requests a rematch on the same connection.
    Restart,
}
