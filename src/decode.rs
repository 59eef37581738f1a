// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Get the whole source buffer from anything implementing `Read`,
//! insisting on valid UTF-8.

use crate::pos::Pos;
use std::io::{self, Read};
use thiserror::Error;
use utf8::{BufReadDecoder, BufReadDecoderError};

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("{0}")]
    IO(io::Error),
    #[error("invalid UTF-8 byte sequence {bytes:x?} {pos}")]
    InvalidUtf8 { bytes: Vec<u8>, pos: Pos, offset: usize },
}

pub fn decode_all<R>(fh: R) -> Result<String, DecodeError>
    where R: Read
{
    let mut inp = BufReadDecoder::new(io::BufReader::new(fh));
    let mut out = String::new();
    while let Some(r) = inp.next_strict() {
        match r {
            Ok(s) => out.push_str(s),
            Err(BufReadDecoderError::InvalidByteSequence(bytes)) => {
                return Err(DecodeError::InvalidUtf8 {
                    bytes: bytes.to_vec(),
                    pos: Pos::of_offset(&out, out.len()),
                    offset: out.len(),
                })
            }
            Err(BufReadDecoderError::Io(e)) => return Err(DecodeError::IO(e)),
        }
    }
    Ok(out)
}
