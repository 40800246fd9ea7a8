//! Turning a streaming response body into SSE messages.

use bytes::Bytes;
use futures_util::stream::{self, Stream};
use futures_util::StreamExt;

use crate::sse::events::SseMessage;
use crate::sse::parser::SseParser;
use crate::traits::HttpError;

/// Split a byte stream into lines and feed them through an [`SseParser`].
///
/// Lines end in `\n`, `\r\n` or `\r`. Bytes are buffered until a full line is
/// available, so multi-byte characters split across chunks decode correctly.
/// A transport error is yielded once and ends the stream.
pub fn sse_messages<S>(bytes_stream: S) -> impl Stream<Item = Result<SseMessage, HttpError>> + Send
where
    S: Stream<Item = Result<Bytes, HttpError>> + Send + Unpin + 'static,
{
    stream::unfold(
        Some((bytes_stream, SseParser::new(), Vec::<u8>::new())),
        |state| async move {
            let (mut bytes_stream, mut parser, mut buffer) = state?;
            loop {
                // First, drain any complete lines already buffered
                while let Some(line) = take_line(&mut buffer) {
                    if let Some(message) = parser.feed_line(&line) {
                        return Some((Ok(message), Some((bytes_stream, parser, buffer))));
                    }
                }

                match bytes_stream.next().await {
                    Some(Ok(chunk)) => buffer.extend_from_slice(&chunk),
                    Some(Err(e)) => return Some((Err(e), None)),
                    None => {
                        // A lone '\r' at EOF still terminates its line
                        if buffer.last() == Some(&b'\r') {
                            buffer.push(b'\n');
                            while let Some(line) = take_line(&mut buffer) {
                                if let Some(message) = parser.feed_line(&line) {
                                    return Some((Ok(message), None));
                                }
                            }
                        }
                        // An unterminated frame is discarded
                        return None;
                    }
                }
            }
        },
    )
}

/// Remove and return the first complete line in `buffer`.
fn take_line(buffer: &mut Vec<u8>) -> Option<String> {
    let end = buffer.iter().position(|&b| b == b'\n' || b == b'\r')?;
    // A trailing '\r' may be the first half of "\r\n"; wait for more bytes
    if buffer[end] == b'\r' && end + 1 == buffer.len() {
        return None;
    }
    let terminator = if buffer[end] == b'\r' && buffer.get(end + 1) == Some(&b'\n') {
        2
    } else {
        1
    };
    let line = String::from_utf8_lossy(&buffer[..end]).into_owned();
    buffer.drain(..end + terminator);
    Some(line)
}
