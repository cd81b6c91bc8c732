//! Text and binary wire forms of messages
//!
//! The text form is whitespace-separated tokens in declared field order, with
//! every sequence preceded by its length. The binary form is `bincode` over the
//! same field order. Both reject truncated or trailing input instead of
//! returning a partially filled value.

use core::str::{FromStr, SplitWhitespace};

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::MessageHeader;
use crate::error::{CoreError, Result};
use crate::Uid;

/// Encode a message (or header) into its binary wire form
pub fn to_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    bincode::serialize(value).map_err(|e| CoreError::deserialization(format!("encode failed: {}", e)))
}

/// Decode a message (or header) from its binary wire form
pub fn from_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut cursor = bytes;
    let value = bincode::deserialize_from(&mut cursor)
        .map_err(|e| CoreError::deserialization(format!("decode failed: {}", e)))?;
    if !cursor.is_empty() {
        return Err(CoreError::deserialization(format!(
            "{} trailing bytes after message",
            cursor.len()
        )));
    }
    Ok(value)
}

/// Cursor over the tokens of a text-form message
pub(crate) struct TokenReader<'a> {
    tokens: SplitWhitespace<'a>,
}

impl<'a> TokenReader<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self {
            tokens: input.split_whitespace(),
        }
    }

    fn next(&mut self, what: &str) -> Result<&'a str> {
        self.tokens
            .next()
            .ok_or_else(|| CoreError::deserialization(format!("missing {}", what)))
    }

    pub(crate) fn parse<T: FromStr>(&mut self, what: &str) -> Result<T> {
        let token = self.next(what)?;
        token
            .parse()
            .map_err(|_| CoreError::deserialization(format!("bad {} '{}'", what, token)))
    }

    pub(crate) fn count(&mut self, what: &str) -> Result<usize> {
        self.parse(what)
    }

    pub(crate) fn uid(&mut self) -> Result<Uid> {
        self.next("uid")?.parse()
    }

    pub(crate) fn header(&mut self) -> Result<MessageHeader> {
        let sender_uid = self.uid()?;
        let send_time = self.parse("send time")?;
        Ok(MessageHeader::new(sender_uid, send_time))
    }

    pub(crate) fn finish(mut self) -> Result<()> {
        match self.tokens.next() {
            None => Ok(()),
            Some(token) => Err(CoreError::deserialization(format!("unexpected token '{}'", token))),
        }
    }
}
