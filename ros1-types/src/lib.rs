//! ROS1 message runtime
//!
//! This crate is the contract between generated message code and the
//! outside world: the little-endian wire codec, the `time`/`duration`
//! builtins and the traits every generated type implements.
//!
//! # Traits
//!
//! - `RosMessage`: metadata constants plus encode/decode/length
//! - `RosService`: request/response pairing for services
//! - `MessageEq` / `HashCode`: structural equality and 32-bit hash codes
//! - `TryClone`: fallible deep copy through the wire format
//!
//! # Example
//!
//! ```
//! use ros1_types::{WireReader, WireWriter};
//!
//! let mut writer = WireWriter::new();
//! writer.write_u16(3);
//! writer.write_string("hi")?;
//! let bytes = writer.into_bytes();
//! assert_eq!(bytes.len(), 2 + 4 + 2);
//!
//! let mut reader = WireReader::new(&bytes);
//! assert_eq!(reader.read_u16()?, 3);
//! assert_eq!(reader.read_string()?, "hi");
//! # Ok::<(), ros1_types::Error>(())
//! ```

mod error;
pub mod structural;
mod time;
mod traits;
pub mod wire;

pub use error::{Error, Result};
pub use structural::{HASH_PRIME, HASH_SEED, HashCode, MessageEq, combine_hash};
pub use time::{Duration, Time};
pub use traits::{RosMessage, RosService, TryClone, clone_via_wire};
pub use wire::{LENGTH_PREFIX_SIZE, WireReader, WireWriter};
