//! Statement splitting for SQL dump files.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read};

pub const READER_BUFFER_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementType {
    Unknown,
    CreateTable,
    AlterTable,
    CreateIndex,
}

static CREATE_INDEX_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^CREATE\s+(?:UNIQUE\s+)?(?:CLUSTERED\s+|NONCLUSTERED\s+)?INDEX\b").unwrap()
});

static CREATE_TABLE_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^CREATE\s+(?:(?:GLOBAL\s+|LOCAL\s+)?(?:TEMPORARY|TEMP)\s+|UNLOGGED\s+)?TABLE\b")
        .unwrap()
});

static ALTER_TABLE_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^ALTER\s+TABLE\b").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Code,
    SingleQuote,
    DoubleQuote,
    Backtick,
    BlockComment,
}

/// Splits a SQL stream into `;`-terminated statements.
///
/// Semicolons inside quoted strings or identifiers do not end a statement.
/// `--` line comments and `/* */` block comments are removed.
pub struct StatementReader<R: Read> {
    reader: BufReader<R>,
    line: Vec<u8>,
    stmt_buffer: Vec<u8>,
    ready: VecDeque<Vec<u8>>,
    state: ScanState,
}

impl<R: Read> StatementReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_capacity(reader, READER_BUFFER_SIZE)
    }

    pub fn with_capacity(reader: R, buffer_size: usize) -> Self {
        Self {
            reader: BufReader::with_capacity(buffer_size, reader),
            line: Vec::with_capacity(1024),
            stmt_buffer: Vec::with_capacity(32 * 1024),
            ready: VecDeque::new(),
            state: ScanState::Code,
        }
    }

    /// Next statement including its terminating `;` (the last one may lack it)
    pub fn read_statement(&mut self) -> std::io::Result<Option<String>> {
        loop {
            if let Some(stmt) = self.ready.pop_front() {
                return Ok(Some(String::from_utf8_lossy(&stmt).into_owned()));
            }

            self.line.clear();
            let n = self.reader.read_until(b'\n', &mut self.line)?;
            if n == 0 {
                let rest = std::mem::take(&mut self.stmt_buffer);
                if rest.iter().all(u8::is_ascii_whitespace) {
                    return Ok(None);
                }
                return Ok(Some(String::from_utf8_lossy(&rest).into_owned()));
            }

            self.scan_line();
        }
    }

    fn scan_line(&mut self) {
        let line = std::mem::take(&mut self.line);
        let mut i = 0;

        while i < line.len() {
            let b = line[i];
            let next = line.get(i + 1).copied();

            match self.state {
                ScanState::Code => match b {
                    b'-' if next == Some(b'-') => {
                        self.stmt_buffer.push(b'\n');
                        break;
                    }
                    b'/' if next == Some(b'*') => {
                        self.state = ScanState::BlockComment;
                        i += 2;
                        continue;
                    }
                    b'\'' => {
                        self.state = ScanState::SingleQuote;
                        self.stmt_buffer.push(b);
                    }
                    b'"' => {
                        self.state = ScanState::DoubleQuote;
                        self.stmt_buffer.push(b);
                    }
                    b'`' => {
                        self.state = ScanState::Backtick;
                        self.stmt_buffer.push(b);
                    }
                    b';' => {
                        self.stmt_buffer.push(b);
                        self.finish_statement();
                    }
                    _ => self.stmt_buffer.push(b),
                },
                ScanState::SingleQuote => {
                    self.stmt_buffer.push(b);
                    if b == b'\\' {
                        if let Some(escaped) = next {
                            self.stmt_buffer.push(escaped);
                            i += 1;
                        }
                    } else if b == b'\'' {
                        self.state = ScanState::Code;
                    }
                }
                ScanState::DoubleQuote => {
                    self.stmt_buffer.push(b);
                    if b == b'"' {
                        self.state = ScanState::Code;
                    }
                }
                ScanState::Backtick => {
                    self.stmt_buffer.push(b);
                    if b == b'`' {
                        self.state = ScanState::Code;
                    }
                }
                ScanState::BlockComment => {
                    if b == b'*' && next == Some(b'/') {
                        self.state = ScanState::Code;
                        i += 2;
                        continue;
                    }
                }
            }

            i += 1;
        }

        self.line = line;
    }

    fn finish_statement(&mut self) {
        let stmt = std::mem::take(&mut self.stmt_buffer);
        // Bare `;` left behind by removed comments
        let is_empty = stmt
            .iter()
            .all(|b| b.is_ascii_whitespace() || *b == b';');
        if !is_empty {
            self.ready.push_back(stmt);
        }
    }
}

/// Classify a statement by its leading keywords
pub fn statement_type(stmt: &str) -> StatementType {
    let stmt = stmt.trim_start();

    if CREATE_TABLE_PREFIX_RE.is_match(stmt) {
        StatementType::CreateTable
    } else if ALTER_TABLE_PREFIX_RE.is_match(stmt) {
        StatementType::AlterTable
    } else if CREATE_INDEX_PREFIX_RE.is_match(stmt) {
        StatementType::CreateIndex
    } else {
        StatementType::Unknown
    }
}
