use groupstream::{CsvConfig, CsvError, CsvParser, GroupByError, GroupByResult, RecordSink};

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Read};

    /// Sink copying every field out of the parser's buffer, the way any
    /// real consumer has to.
    #[derive(Default)]
    struct CollectSink {
        rows: Vec<Vec<String>>,
        current: Vec<String>,
    }

    impl RecordSink for CollectSink {
        fn field(&mut self, value: &[u8]) -> GroupByResult<()> {
            self.current
                .push(String::from_utf8_lossy(value).into_owned());
            Ok(())
        }

        fn end_of_record(&mut self) -> GroupByResult<()> {
            self.rows.push(std::mem::take(&mut self.current));
            Ok(())
        }
    }

    fn parse_reader<R: Read>(reader: R, config: &CsvConfig) -> Result<Vec<Vec<String>>, GroupByError> {
        let mut parser = CsvParser::new(reader, config)?;
        let mut sink = CollectSink::default();
        parser.parse(&mut sink)?;
        Ok(sink.rows)
    }

    fn parse(input: &str) -> Result<Vec<Vec<String>>, GroupByError> {
        parse_reader(input.as_bytes(), &CsvConfig::default())
    }

    fn rows(input: &str) -> Vec<Vec<String>> {
        parse(input).expect("input should parse")
    }

    fn row(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn test_simple_records_split_on_delimiter_and_newline() {
        assert_eq!(
            rows("a,b,c\nd,e\n"),
            vec![row(&["a", "b", "c"]), row(&["d", "e"])]
        );
    }

    #[test]
    fn test_empty_input_yields_no_records() {
        assert_eq!(rows(""), Vec::<Vec<String>>::new());
    }

    #[test]
    fn test_empty_fields_are_preserved() {
        assert_eq!(rows("a,,c\n,\n"), vec![row(&["a", "", "c"]), row(&["", ""])]);
    }

    #[test]
    fn test_empty_line_is_one_empty_field() {
        assert_eq!(rows("\n"), vec![row(&[""])]);
    }

    #[test]
    fn test_quoted_field_keeps_embedded_delimiter() {
        assert_eq!(
            rows("x,\"hello, world\",5\n"),
            vec![row(&["x", "hello, world", "5"])]
        );
    }

    #[test]
    fn test_quoted_field_keeps_embedded_newline() {
        assert_eq!(rows("\"two\nlines\",1\n"), vec![row(&["two\nlines", "1"])]);
    }

    #[test]
    fn test_doubled_quotes_are_scanned_past_but_not_collapsed() {
        assert_eq!(rows("\"say \"\"hi\"\"\",1\n"), vec![row(&["say \"\"hi\"\"", "1"])]);
    }

    #[test]
    fn test_quoted_empty_field() {
        assert_eq!(rows("\"\",x\n"), vec![row(&["", "x"])]);
    }

    #[test]
    fn test_quote_not_followed_by_delimiter_is_malformed() {
        let result = parse("\"abc\"x,1\n");
        assert_eq!(
            result,
            Err(GroupByError::ParseError(CsvError::MalformedQuote { line: 1 }))
        );
    }

    #[test]
    fn test_missing_terminating_quote_is_fatal() {
        let result = parse("ok\n\"never closed\n");
        assert_eq!(
            result,
            Err(GroupByError::ParseError(CsvError::NoTerminatingQuote {
                line: 2
            }))
        );
    }

    #[test]
    fn test_missing_trailing_newline_is_fatal() {
        let result = parse("a,b\nc,d");
        assert_eq!(
            result,
            Err(GroupByError::ParseError(CsvError::UnexpectedEof { line: 2 }))
        );
    }

    #[test]
    fn test_record_longer_than_the_window_is_fatal() {
        let config = CsvConfig {
            delimiter: b',',
            max_record_size: 8,
        };
        let input = "0123456789abcdef012345\n";
        let result = parse_reader(input.as_bytes(), &config);
        assert_eq!(
            result,
            Err(GroupByError::ParseError(CsvError::RecordTooLong { line: 1 }))
        );
    }

    #[test]
    fn test_small_window_streams_many_records() {
        let config = CsvConfig {
            delimiter: b',',
            max_record_size: 8,
        };
        let input: String = (0..100).map(|i| format!("k,{}\n", i % 10)).collect();
        let parsed = parse_reader(input.as_bytes(), &config).expect("should parse");
        assert_eq!(parsed.len(), 100);
        assert_eq!(parsed[99], row(&["k", "9"]));
    }

    /// Byte source that hands out a few bytes per call, forcing many
    /// refills.
    struct DripReader<'a> {
        data: &'a [u8],
        pos: usize,
        chunk: usize,
    }

    impl Read for DripReader<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.chunk.min(self.data.len() - self.pos).min(buf.len());
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn test_chunked_reads_see_the_same_records() {
        let input = "a,b,c\nd,\"e,f\"\ng\n";
        let expected = rows(input);
        for chunk in [1, 2, 3, 7] {
            let reader = DripReader {
                data: input.as_bytes(),
                pos: 0,
                chunk,
            };
            let parsed =
                parse_reader(reader, &CsvConfig::default()).expect("chunked input should parse");
            assert_eq!(parsed, expected, "chunk size {}", chunk);
        }
    }

    /// Byte source that gets interrupted before every productive read.
    struct FlakyReader<'a> {
        data: &'a [u8],
        pos: usize,
        interrupt_next: bool,
    }

    impl Read for FlakyReader<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.interrupt_next {
                self.interrupt_next = false;
                return Err(io::Error::new(io::ErrorKind::Interrupted, "signal"));
            }
            self.interrupt_next = true;
            let n = 4.min(self.data.len() - self.pos).min(buf.len());
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn test_interrupted_reads_are_retried() {
        let reader = FlakyReader {
            data: b"a,1\nb,2\n",
            pos: 0,
            interrupt_next: true,
        };
        let parsed = parse_reader(reader, &CsvConfig::default()).expect("should parse");
        assert_eq!(parsed, vec![row(&["a", "1"]), row(&["b", "2"])]);
    }

    /// Byte source that fails for real.
    struct BrokenReader;

    impl Read for BrokenReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "gone"))
        }
    }

    #[test]
    fn test_read_failures_are_fatal() {
        let result = parse_reader(BrokenReader, &CsvConfig::default());
        assert!(
            matches!(result, Err(GroupByError::ParseError(CsvError::Io { .. }))),
            "got {:?}",
            result
        );
    }

    #[test]
    fn test_alternate_delimiter() {
        let config = CsvConfig::with_delimiter(b'\t');
        let parsed = parse_reader("a\tb\nc\td\n".as_bytes(), &config).expect("should parse");
        assert_eq!(parsed, vec![row(&["a", "b"]), row(&["c", "d"])]);
    }

    #[test]
    fn test_splitting_matches_naive_split_for_quote_free_input() {
        let input = "one,two,three\nfour,five\nsix\n";
        let expected: Vec<Vec<String>> = input
            .lines()
            .map(|line| line.split(',').map(str::to_string).collect())
            .collect();
        assert_eq!(rows(input), expected);
    }
}
