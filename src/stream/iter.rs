use std::io;

use super::{TokenStream, ITERATOR_CHUNK_SIZE};

/// Streams the items of an iterator.
///
/// Returned tokens are dropped; wrap the stream in a
/// [`ResumableStream`](super::ResumableStream) to keep them.
#[derive(Debug, Clone)]
pub struct IterStream<It> {
    iter: It,
}

impl<It> IterStream<It> {
    pub fn new<T>(iter: T) -> Self
    where
        T: IntoIterator<IntoIter = It>,
    {
        Self {
            iter: iter.into_iter(),
        }
    }

    pub fn into_inner(self) -> It {
        self.iter
    }
}

impl<I, It: Iterator<Item = I>> TokenStream<I> for IterStream<It> {
    fn read(&mut self, out: &mut Vec<I>, max: usize) -> io::Result<usize> {
        let before = out.len();
        out.extend(self.iter.by_ref().take(max));
        Ok(out.len() - before)
    }

    fn chunk_size_hint(&self) -> usize {
        ITERATOR_CHUNK_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iter_stream() {
        let mut stream = IterStream::new((0..5).map(|x| x * 10));
        let mut out = Vec::new();
        assert_eq!(stream.read(&mut out, 3).unwrap(), 3);
        assert_eq!(stream.read(&mut out, 3).unwrap(), 2);
        assert_eq!(stream.read(&mut out, 3).unwrap(), 0);
        assert_eq!(out, vec![0, 10, 20, 30, 40]);
        assert_eq!(stream.chunk_size_hint(), ITERATOR_CHUNK_SIZE);
    }

    #[test]
    fn test_iter_stream_drops_returned_tokens() {
        let mut stream = IterStream::new(vec!['a', 'b', 'c']);
        let mut out = Vec::new();
        stream.read(&mut out, 2).unwrap();
        stream.return_tokens(&out[1..]);
        out.clear();
        stream.read(&mut out, 8).unwrap();
        assert_eq!(out, vec!['c']);
    }
}
