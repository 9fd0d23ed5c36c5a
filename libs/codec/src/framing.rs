//! Length-delimited framing for streams of messages
//!
//! ```text
//! ┌──────────────┬─────────────────────┐┌──────────────┬────────
//! │ varint len N │ N bytes of message  ││ varint len M │ ...
//! └──────────────┴─────────────────────┘└──────────────┴────────
//! ```
//!
//! Decoding lives on [`Decoder`](crate::Decoder) so frame sizes respect the
//! configured limits.

use bytes::BufMut;
use types::Message;

use crate::encoder::{encode, encoded_len};
use crate::wire::{encode_varint, encoded_len_varint};

pub fn encode_length_delimited(message: &Message, buf: &mut impl BufMut) {
    encode_varint(encoded_len(message) as u64, buf);
    encode(message, buf);
}

pub fn encode_length_delimited_to_vec(message: &Message) -> Vec<u8> {
    let mut buf = Vec::with_capacity(length_delimited_len(message));
    encode_length_delimited(message, &mut buf);
    buf
}

/// Frame size including the length prefix
pub fn length_delimited_len(message: &Message) -> usize {
    let len = encoded_len(message);
    encoded_len_varint(len as u64) + len
}
