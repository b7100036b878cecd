use std::io::{self, Read};

use tracing::{debug, trace};

use super::{TokenStream, READER_CHUNK_SIZE};

const REPLACEMENT: char = '\u{FFFD}';

fn fill_from<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(buf) {
            Ok(count) => {
                trace!(target: "sinew::stream", count, "read from reader");
                return Ok(count);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                debug!(target: "sinew::stream", kind = ?e.kind(), "reader failed: {}", e);
                return Err(e);
            }
        }
    }
}

/// Streams the bytes of a reader.
#[derive(Debug)]
pub struct ByteReaderStream<R> {
    reader: R,
    scratch: Vec<u8>,
}

impl<R: Read> ByteReaderStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            scratch: Vec::new(),
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> TokenStream<u8> for ByteReaderStream<R> {
    fn read(&mut self, out: &mut Vec<u8>, max: usize) -> io::Result<usize> {
        self.scratch.resize(max, 0);
        let count = fill_from(&mut self.reader, &mut self.scratch)?;
        out.extend_from_slice(&self.scratch[..count]);
        Ok(count)
    }

    fn chunk_size_hint(&self) -> usize {
        READER_CHUNK_SIZE
    }
}

/// Streams the `char`s of a UTF-8 reader.
///
/// Malformed bytes decode to U+FFFD, one replacement per byte that cannot
/// start or continue a valid sequence.
#[derive(Debug)]
pub struct CharReaderStream<R> {
    reader: R,
    pending: Vec<u8>,
    start: usize,
    eof: bool,
}

impl<R: Read> CharReaderStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: Vec::new(),
            start: 0,
            eof: false,
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    fn fill(&mut self) -> io::Result<()> {
        self.pending.drain(..self.start);
        self.start = 0;
        let mut chunk = [0u8; READER_CHUNK_SIZE];
        let count = fill_from(&mut self.reader, &mut chunk)?;
        if count == 0 {
            self.eof = true;
        } else {
            self.pending.extend_from_slice(&chunk[..count]);
        }
        Ok(())
    }

    fn decode_one(&mut self) -> io::Result<Option<char>> {
        loop {
            let available = &self.pending[self.start..];
            if let Some(&lead) = available.first() {
                let width = sequence_width(lead);
                if width == 0 {
                    self.start += 1;
                    return Ok(Some(REPLACEMENT));
                }
                if available.len() >= width {
                    return match std::str::from_utf8(&available[..width]) {
                        Ok(text) => {
                            self.start += width;
                            Ok(text.chars().next())
                        }
                        Err(_) => {
                            self.start += 1;
                            Ok(Some(REPLACEMENT))
                        }
                    };
                }
                if self.eof {
                    // truncated sequence at end of input
                    self.start = self.pending.len();
                    return Ok(Some(REPLACEMENT));
                }
            } else if self.eof {
                return Ok(None);
            }
            self.fill()?;
        }
    }
}

fn sequence_width(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 0,
    }
}

impl<R: Read> TokenStream<char> for CharReaderStream<R> {
    fn read(&mut self, out: &mut Vec<char>, max: usize) -> io::Result<usize> {
        let mut count = 0;
        while count < max {
            match self.decode_one()? {
                Some(c) => {
                    out.push(c);
                    count += 1;
                }
                None => break,
            }
        }
        Ok(count)
    }

    fn chunk_size_hint(&self) -> usize {
        READER_CHUNK_SIZE
    }
}
