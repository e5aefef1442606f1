use anyhow::Result;
use std::io::{BufRead, Write};

/// Pull-based line source that doubles as a pass-through.
///
/// Every byte consumed from the input, newline terminators included, is
/// forwarded verbatim to the echo sink, so the stream downstream of the
/// filter sees exactly what came in. The slice handed back to the caller has
/// the trailing `\n` stripped (a `\r` before it stays, and feeds the
/// checksum) and is capped at `limit` bytes; the overflow of an oversized
/// line is drained straight to the echo without growing the owned buffer.
pub struct LineReader<R, W> {
    input: R,
    echo: W,
    line: Vec<u8>,
    limit: usize,
}

impl<R: BufRead, W: Write> LineReader<R, W> {
    pub fn new(input: R, echo: W, limit: usize) -> Self {
        Self {
            input,
            echo,
            line: Vec::with_capacity(limit),
            limit,
        }
    }

    /// Fetch the next line, or `None` at end of input.
    ///
    /// A final line without a terminator still counts; an empty line yields
    /// an empty slice, distinct from `None`.
    pub fn next_line(&mut self) -> Result<Option<&[u8]>> {
        self.line.clear();
        let mut saw_any = false;

        loop {
            let (consumed, terminated) = {
                let chunk = self.input.fill_buf()?;
                if chunk.is_empty() {
                    break;
                }
                saw_any = true;

                let room = self.limit.saturating_sub(self.line.len());
                match chunk.iter().position(|&b| b == b'\n') {
                    Some(pos) => {
                        self.echo.write_all(&chunk[..pos + 1])?;
                        self.line.extend_from_slice(&chunk[..pos.min(room)]);
                        (pos + 1, true)
                    }
                    None => {
                        self.echo.write_all(chunk)?;
                        self.line.extend_from_slice(&chunk[..chunk.len().min(room)]);
                        (chunk.len(), false)
                    }
                }
            };

            self.input.consume(consumed);
            if terminated {
                return Ok(Some(&self.line));
            }
        }

        if saw_any {
            Ok(Some(&self.line))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    fn drain(reader: &mut LineReader<impl BufRead, impl Write>) -> Vec<Vec<u8>> {
        let mut lines = Vec::new();
        while let Some(line) = reader.next_line().unwrap() {
            lines.push(line.to_vec());
        }
        lines
    }

    #[test]
    fn test_lines_are_split_and_echoed_verbatim() {
        let input = b"alpha\nbeta\n";
        let mut echo = Vec::new();
        let mut reader = LineReader::new(&input[..], &mut echo, 512);

        assert_eq!(drain(&mut reader), vec![b"alpha".to_vec(), b"beta".to_vec()]);
        assert_eq!(echo, input);
    }

    #[test]
    fn test_empty_line_is_not_end_of_input() {
        let input = b"\nrest\n";
        let mut echo = Vec::new();
        let mut reader = LineReader::new(&input[..], &mut echo, 512);

        assert_eq!(reader.next_line().unwrap(), Some(&b""[..]));
        assert_eq!(reader.next_line().unwrap(), Some(&b"rest"[..]));
        assert_eq!(reader.next_line().unwrap(), None);
    }

    #[test]
    fn test_final_unterminated_line_is_yielded() {
        let input = b"first\nlast";
        let mut echo = Vec::new();
        let mut reader = LineReader::new(&input[..], &mut echo, 512);

        assert_eq!(drain(&mut reader), vec![b"first".to_vec(), b"last".to_vec()]);
        assert_eq!(echo, input);
    }

    #[test]
    fn test_oversized_line_is_capped_but_echo_is_not() {
        let input = b"abcdefgh\nok\n";
        let mut echo = Vec::new();
        let mut reader = LineReader::new(&input[..], &mut echo, 4);

        assert_eq!(reader.next_line().unwrap(), Some(&b"abcd"[..]));
        assert_eq!(reader.next_line().unwrap(), Some(&b"ok"[..]));
        assert_eq!(reader.next_line().unwrap(), None);
        assert_eq!(echo, input);
    }

    #[test]
    fn test_line_reassembled_across_small_buffers() {
        let input = b"one line that spans several fills\n";
        let mut echo = Vec::new();
        let mut reader = LineReader::new(BufReader::with_capacity(3, &input[..]), &mut echo, 512);

        assert_eq!(
            reader.next_line().unwrap(),
            Some(&b"one line that spans several fills"[..])
        );
        assert_eq!(reader.next_line().unwrap(), None);
        assert_eq!(echo, input);
    }

    #[test]
    fn test_carriage_return_stays_in_line() {
        let input = b"ab\r\n";
        let mut echo = Vec::new();
        let mut reader = LineReader::new(&input[..], &mut echo, 512);

        assert_eq!(reader.next_line().unwrap(), Some(&b"ab\r"[..]));
        assert_eq!(echo, input);
    }
}
