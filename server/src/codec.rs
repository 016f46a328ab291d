//! Newline-delimited text framing for session sockets.

use crate::error::SessionError;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

#[derive(Debug)]
pub struct LineReader<R> {
    inner: BufReader<R>,
    max_line_len: usize,
    buf: String,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_max_line_len(inner, shared::MAX_LINE_LEN)
    }

    pub fn with_max_line_len(inner: R, max_line_len: usize) -> Self {
        Self {
            inner: BufReader::new(inner),
            max_line_len: max_line_len.max(1),
            buf: String::new(),
        }
    }

    /// Reads one line, stripping the trailing `\n` and an optional `\r`.
    ///
    /// Returns `Ok(None)` on a clean EOF. A final unterminated line is still
    /// returned. Over-long lines and invalid UTF-8 are errors.
    pub async fn read_line(&mut self) -> Result<Option<String>, SessionError> {
        self.buf.clear();
        let limit = self.max_line_len as u64 + 1;
        let n = (&mut self.inner).take(limit).read_line(&mut self.buf).await?;
        if n == 0 {
            return Ok(None);
        }
        if n > self.max_line_len {
            return Err(SessionError::LineTooLong(self.max_line_len));
        }

        let line = self.buf.trim_end_matches('\n').trim_end_matches('\r');
        Ok(Some(line.to_string()))
    }
}

/// Writes one message followed by a newline and flushes.
pub async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, message: &str) -> std::io::Result<()> {
    let mut frame = String::with_capacity(message.len() + 1);
    frame.push_str(message);
    frame.push('\n');
    writer.write_all(frame.as_bytes()).await?;
    writer.flush().await
}
