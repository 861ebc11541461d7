//! Core traits for ROS1 message types
//!
//! Generated message structs implement [`RosMessage`]; generated service
//! markers implement [`RosService`].

use crate::Result;
use crate::wire::{WireReader, WireWriter};

/// Trait for message types with a ROS1 wire encoding.
///
/// The metadata constants identify the type at runtime: two endpoints
/// should refuse to interoperate when their [`MD5SUM`](Self::MD5SUM)s differ.
pub trait RosMessage: Sized + 'static + Send + Sync {
    /// Type name in `package/Name` form
    const DATA_TYPE: &'static str;

    /// Lowercase hex MD5 fingerprint of the flattened definition
    const MD5SUM: &'static str;

    /// Full definition text, dependencies appended
    const DEFINITION: &'static str;

    /// Qualified name in `namespace.package.Name` form
    const QUALIFIED_NAME: &'static str;

    /// Exact number of bytes [`serialize`](Self::serialize) will write for
    /// the current field values
    fn serialization_length(&self) -> usize;

    /// Append the encoded message to `writer`
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthOverflow`](crate::Error::LengthOverflow) if a
    /// string or sequence is longer than a 4-byte prefix can express.
    fn serialize(&self, writer: &mut WireWriter) -> Result<()>;

    /// Decode a message from `reader`
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is truncated or a string is not UTF-8.
    fn deserialize(reader: &mut WireReader<'_>) -> Result<Self>;

    /// Encode into a freshly allocated buffer
    ///
    /// # Errors
    ///
    /// See [`serialize`](Self::serialize).
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = WireWriter::with_capacity(self.serialization_length());
        self.serialize(&mut writer)?;
        Ok(writer.into_bytes())
    }

    /// Decode a message that must span all of `bytes`
    ///
    /// # Errors
    ///
    /// See [`deserialize`](Self::deserialize); also fails with
    /// [`Error::TrailingBytes`](crate::Error::TrailingBytes) if input remains.
    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = WireReader::new(bytes);
        let message = Self::deserialize(&mut reader)?;
        reader.finish()?;
        Ok(message)
    }
}

/// Trait for ROS1 service types (request/response pairs)
pub trait RosService: 'static + Send + Sync {
    /// The request message type
    type Request: RosMessage;

    /// The response message type
    type Response: RosMessage;

    /// Type name in `package/Name` form
    const DATA_TYPE: &'static str;

    /// MD5 over the request and response definitions
    const MD5SUM: &'static str;
}

/// Trait for types whose copy can fail
pub trait TryClone: Sized {
    /// Returns `Some(copy)` if cloning succeeds, else `None`
    fn try_clone(&self) -> Option<Self>;
}

impl<M: RosMessage> TryClone for M {
    fn try_clone(&self) -> Option<Self> {
        self.to_bytes().and_then(|bytes| M::from_bytes(&bytes)).ok()
    }
}

/// Deep copy through the wire format: encode, then decode a new instance.
///
/// # Panics
///
/// Panics if the message cannot be encoded, which only happens when a
/// string or sequence exceeds `u32::MAX` elements.
#[must_use]
pub fn clone_via_wire<M: RosMessage>(message: &M) -> M {
    match message.try_clone() {
        Some(copy) => copy,
        None => panic!(
            "{} could not be cloned through its wire encoding",
            M::DATA_TYPE
        ),
    }
}
