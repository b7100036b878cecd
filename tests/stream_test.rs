mod common;

use std::error::Error as _;
use std::io::{self, Cursor, Read, Write};
use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use sinew::parser::prelude::*;
use sinew::parser::prelude::any;
use sinew::stream::{ByteReaderStream, CharReaderStream, IterStream, ResumableStream};
use sinew::{Error, ParseConfig};

/// Words and parenthesised groups of words, with plenty of backtracking.
fn grammar() -> impl Parser<char, Vec<String>> + Clone {
    let word = attempt(string("abba"))
        .or(attempt(string("ab")))
        .or(string("a"))
        .or(string("b"));
    let group = word
        .clone()
        .many()
        .map(|words: Vec<String>| words.concat())
        .between(equal('('), equal(')'));
    attempt(group).or(word).separated(equal(','))
}

proptest! {
    #[test]
    fn prop_chunk_size_does_not_change_results(input in "[ab(),]{0,40}") {
        let parser = grammar();
        let whole = parser.parse_prefix(input.as_str());
        let tiny = parser.parse_with(input.as_str(), &ParseConfig::default().with_chunk_size(1));
        let three = parser.parse_stream_with(
            IterStream::new(input.chars()),
            &ParseConfig::default().with_chunk_size(3),
        );
        prop_assert_eq!(whole.clone().map(|(value, _)| value), tiny);
        prop_assert_eq!(whole.map(|(value, _)| value), three);
    }

    #[test]
    fn prop_parsing_is_deterministic(input in "[ab(),]{0,40}") {
        let parser = grammar();
        prop_assert_eq!(parser.parse(input.as_str()), parser.parse(input.as_str()));
    }
}

#[test]
fn it_resumes_where_the_previous_parse_stopped() {
    let mut stream = ResumableStream::new(IterStream::new("12 34 56".chars()));
    let number = dec_num().before(skip_whitespaces());

    assert_eq!(number.parse_stream(&mut stream), Ok(12));
    assert_eq!(number.parse_stream(&mut stream), Ok(34));
    assert_eq!(number.parse_stream(&mut stream), Ok(56));
    assert_eq!(end().parse_stream(&mut stream), Ok(()));
}

#[test]
fn it_reads_utf8_from_a_reader() {
    let reader = Cursor::new("héllo wörld".as_bytes().to_vec());
    let words = letter()
        .many_string()
        .before(whitespace())
        .and(letter().many_string());
    assert_eq!(
        words.parse_stream(CharReaderStream::new(reader)),
        Ok(("héllo".to_string(), "wörld".to_string()))
    );
}

#[test]
fn it_parses_bytes() {
    let reader = Cursor::new(b"GET /index".to_vec());
    let request = satisfy(|b: &u8| b.is_ascii_uppercase())
        .at_least_once()
        .before(literal(b" /".to_vec()))
        .and(any().many());
    assert_eq!(
        request.parse_stream(ByteReaderStream::new(reader)),
        Ok((b"GET".to_vec(), b"index".to_vec()))
    );
}

/// Yields its data once, then fails every read.
struct Flaky {
    data: Option<Vec<u8>>,
}

impl Read for Flaky {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.data.take() {
            Some(data) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                Ok(n)
            }
            None => Err(io::Error::new(io::ErrorKind::ConnectionReset, "peer went away")),
        }
    }
}

#[test]
fn it_surfaces_reader_failures() {
    let reader = Flaky {
        data: Some(b"abc".to_vec()),
    };
    let error = letter()
        .many_string()
        .parse_stream(CharReaderStream::new(reader))
        .unwrap_err();
    assert_eq!(
        error.io_error().map(|e| e.kind()),
        Some(io::ErrorKind::ConnectionReset)
    );
    assert!(error.source().is_some());
    assert!(matches!(Error::from(error), Error::Io(_)));
}

#[test]
fn it_reports_the_same_position_for_any_chunk_size() {
    let input = "ab,\n\t(ab\n,b";
    let parser = grammar().before(end());
    let expected = parser.parse(input).unwrap_err();
    for chunk_size in [1, 2, 5, 64] {
        let error = parser
            .parse_with(input, &ParseConfig::default().with_chunk_size(chunk_size))
            .unwrap_err();
        assert_eq!(error, expected, "chunk size {}", chunk_size);
    }
    assert_eq!(expected.location(), 3);
    assert_eq!(expected.unexpected(), Some(&'\n'));
}

/// Collects formatted log lines for inspection.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn it_logs_stream_events() {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let mut stream = ResumableStream::new(IterStream::new("ab".chars()));
        assert_eq!(letter().parse_stream(&mut stream), Ok('a'));

        let reader = Flaky {
            data: Some(b"x".to_vec()),
        };
        assert!(letter().many_string().parse_stream(CharReaderStream::new(reader)).is_err());
    });

    let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
    assert!(logs.contains("sinew::stream"), "{}", logs);
    assert!(logs.contains("holding returned tokens"), "{}", logs);
    assert!(logs.contains("reader failed"), "{}", logs);
}
