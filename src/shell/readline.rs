use std::io::{self, Read, Write};
use std::os::fd::AsFd;

use log::{debug, warn};
use nix::sys::termios::{self, LocalFlags, SetArg, SpecialCharacterIndices, Termios};

use crate::shell::parser::ast::COMPLETION_MARKER;

/// Fixed line buffer capacity, in bytes. A line stops one byte short of it.
pub const LINE_CAPACITY: usize = 4096;

const TAB: u8 = 9;
const BACKSPACE: u8 = 127;
const CTRL_H: u8 = 8;
const CTRL_D: u8 = 4;
const ESC: u8 = 27;

#[derive(Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    /// Ctrl-D or end of input: the shell should exit.
    Terminated,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum KeyState {
    Normal,
    Escape,
    Sequence,
}

/// Puts the terminal into non-canonical, non-echo mode and restores the saved
/// attributes when dropped.
pub struct RawMode {
    saved: Termios,
}

impl RawMode {
    pub fn enable() -> nix::Result<Self> {
        let stdin = io::stdin();
        let saved = termios::tcgetattr(stdin.as_fd())?;
        let mut raw = saved.clone();
        raw.local_flags.remove(LocalFlags::ICANON | LocalFlags::ECHO);
        raw.control_chars[SpecialCharacterIndices::VMIN as usize] = 1;
        raw.control_chars[SpecialCharacterIndices::VTIME as usize] = 0;
        termios::tcsetattr(stdin.as_fd(), SetArg::TCSANOW, &raw)?;
        Ok(Self { saved })
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = termios::tcsetattr(io::stdin().as_fd(), SetArg::TCSANOW, &self.saved) {
            warn!("failed to restore terminal attributes: {}", e);
        }
    }
}

/// Character-at-a-time line editor with backspace, one-line recall on the up
/// arrow and a Tab completion trigger.
pub struct LineEditor {
    previous: Option<String>,
    capacity: usize,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::with_capacity(LINE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            previous: None,
            capacity: capacity.max(2),
        }
    }

    /// Reads one line from the terminal. Raw mode is held only for the
    /// duration of the read.
    pub fn read_from_terminal(&mut self) -> io::Result<ReadOutcome> {
        let _raw = match RawMode::enable() {
            Ok(raw) => Some(raw),
            Err(e) => {
                debug!("stdin is not a terminal, reading without raw mode: {}", e);
                None
            }
        };
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.read_line(&mut stdin.lock(), &mut stdout.lock())
    }

    pub fn read_line<R: Read, W: Write>(
        &mut self,
        input: &mut R,
        output: &mut W,
    ) -> io::Result<ReadOutcome> {
        let mut buf: Vec<u8> = Vec::new();
        let mut state = KeyState::Normal;

        loop {
            let Some(c) = read_byte(input)? else {
                if buf.is_empty() {
                    return Ok(ReadOutcome::Terminated);
                }
                break;
            };

            match state {
                KeyState::Escape => {
                    state = if c == b'[' || c == b'O' {
                        KeyState::Sequence
                    } else {
                        KeyState::Normal
                    };
                    continue;
                }
                KeyState::Sequence => {
                    // parameter bytes keep the sequence open
                    if (0x40..=0x7e).contains(&c) {
                        state = KeyState::Normal;
                        if c == b'A' {
                            self.recall(&mut buf, output)?;
                            if self.is_full(&buf) {
                                break;
                            }
                        }
                    }
                    continue;
                }
                KeyState::Normal => {}
            }

            match c {
                TAB => {
                    buf.push(COMPLETION_MARKER as u8);
                    output.write_all(b"\n")?;
                    break;
                }
                BACKSPACE | CTRL_H => {
                    if !buf.is_empty() {
                        pop_char(&mut buf);
                        erase(output, 1)?;
                    }
                }
                ESC => state = KeyState::Escape,
                CTRL_D => return Ok(ReadOutcome::Terminated),
                b'\r' | b'\n' => {
                    output.write_all(b"\n")?;
                    buf.push(b'\n');
                    break;
                }
                _ => {
                    output.write_all(&[c])?;
                    buf.push(c);
                    if self.is_full(&buf) {
                        break;
                    }
                }
            }
            output.flush()?;
        }
        output.flush()?;

        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        let line = String::from_utf8_lossy(&buf).into_owned();
        self.previous = Some(line.clone());
        Ok(ReadOutcome::Line(line))
    }

    /// A full buffer ends the line; Tab can then never push it past the limit.
    fn is_full(&self, buf: &[u8]) -> bool {
        buf.len() >= self.capacity - 1
    }

    /// Swaps the current buffer with the remembered line and redraws it.
    fn recall<W: Write>(&mut self, buf: &mut Vec<u8>, output: &mut W) -> io::Result<()> {
        erase(output, char_count(buf))?;
        let mut recalled = self.previous.take().unwrap_or_default().into_bytes();
        while recalled.len() > self.capacity - 1 {
            pop_char(&mut recalled);
        }
        let current = std::mem::replace(buf, recalled);
        self.previous = Some(String::from_utf8_lossy(&current).into_owned());
        output.write_all(buf)?;
        output.flush()
    }
}

impl Default for LineEditor {
    fn default() -> Self {
        Self::new()
    }
}

fn read_byte<R: Read>(input: &mut R) -> io::Result<Option<u8>> {
    let mut byte = [0u8; 1];
    loop {
        match input.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

fn is_continuation(byte: u8) -> bool {
    byte & 0b1100_0000 == 0b1000_0000
}

/// Drops the last UTF-8 character from the buffer.
fn pop_char(buf: &mut Vec<u8>) {
    while let Some(byte) = buf.pop() {
        if !is_continuation(byte) {
            break;
        }
    }
}

fn char_count(buf: &[u8]) -> usize {
    buf.iter().filter(|&&b| !is_continuation(b)).count()
}

fn erase<W: Write>(output: &mut W, columns: usize) -> io::Result<()> {
    for _ in 0..columns {
        output.write_all(b"\x08 \x08")?;
    }
    Ok(())
}
