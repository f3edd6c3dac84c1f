use std::io::{self, BufRead, Seek, SeekFrom, Write};

pub const USAGE: &str = "Usage: hdiff [-a | -b] file1 file2";

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DiffMode {
    Text,
    Binary,
}

impl DiffMode {
    pub fn from_flag(flag: &str) -> Option<Self> {
        match flag {
            "-a" => Some(DiffMode::Text),
            "-b" => Some(DiffMode::Binary),
            _ => None,
        }
    }
}

/// Compares two texts line by line and returns the number of differing
/// lines. A line present in only one input counts as a difference.
///
/// Lines are compared as raw bytes, so input need not be valid UTF-8.
pub fn compare_text<A, B, W>(
    (name1, file1): (&str, A),
    (name2, file2): (&str, B),
    out: &mut W,
) -> io::Result<usize>
where
    A: BufRead,
    B: BufRead,
    W: Write,
{
    let mut lines1 = file1.split(b'\n');
    let mut lines2 = file2.split(b'\n');
    let mut diff_count = 0;
    let mut line_num = 1;

    loop {
        let line1 = lines1.next().transpose()?;
        let line2 = lines2.next().transpose()?;
        if line1.is_none() && line2.is_none() {
            break;
        }
        if line1 != line2 {
            if let Some(line) = &line1 {
                writeln!(out, "{}:Line {}: {}", name1, line_num, String::from_utf8_lossy(line))?;
            }
            if let Some(line) = &line2 {
                writeln!(out, "{}:Line {}: {}", name2, line_num, String::from_utf8_lossy(line))?;
            }
            diff_count += 1;
        }
        line_num += 1;
    }

    if diff_count > 0 {
        writeln!(out, "{} different lines found", diff_count)?;
    } else {
        writeln!(out, "The two text files are identical")?;
    }
    Ok(diff_count)
}

/// Compares the sizes of two inputs and returns the absolute difference in bytes.
pub fn compare_binary<A, B, W>(mut file1: A, mut file2: B, out: &mut W) -> io::Result<u64>
where
    A: Seek,
    B: Seek,
    W: Write,
{
    let size1 = file1.seek(SeekFrom::End(0))?;
    let size2 = file2.seek(SeekFrom::End(0))?;
    let delta = size1.abs_diff(size2);

    if delta > 0 {
        writeln!(out, "The two files are different in {} bytes", delta)?;
    } else {
        writeln!(out, "The two files are identical")?;
    }
    Ok(delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[allow(clippy::unwrap_used)]
    fn text_diff(a: &str, b: &str) -> (usize, String) {
        let mut out = Vec::new();
        let count = compare_text(
            ("left.txt", Cursor::new(a)),
            ("right.txt", Cursor::new(b)),
            &mut out,
        )
        .unwrap();
        (count, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_flags() {
        assert_eq!(DiffMode::from_flag("-a"), Some(DiffMode::Text));
        assert_eq!(DiffMode::from_flag("-b"), Some(DiffMode::Binary));
        assert_eq!(DiffMode::from_flag("-x"), None);
    }

    #[test]
    fn test_identical_text() {
        let (count, report) = text_diff("a\nb\n", "a\nb\n");
        assert_eq!(count, 0);
        assert_eq!(report, "The two text files are identical\n");
    }

    #[test]
    fn test_changed_line() {
        let (count, report) = text_diff("a\nb\nc\n", "a\nB\nc\n");
        assert_eq!(count, 1);
        assert_eq!(
            report,
            "left.txt:Line 2: b\nright.txt:Line 2: B\n1 different lines found\n"
        );
    }

    #[test]
    fn test_extra_lines_count() {
        let (count, report) = text_diff("a\n", "a\nb\nc\n");
        assert_eq!(count, 2);
        assert!(report.contains("right.txt:Line 3: c\n"));
        assert!(!report.contains("left.txt:Line 2"));
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_text_that_is_not_utf8() {
        let mut out = Vec::new();
        let count = compare_text(
            ("latin1.txt", Cursor::new(b"caf\xe9\nsame\n".to_vec())),
            ("other.txt", Cursor::new(b"caf\xe8\nsame\n".to_vec())),
            &mut out,
        )
        .unwrap();
        assert_eq!(count, 1);
        let report = String::from_utf8(out).unwrap();
        assert!(report.starts_with("latin1.txt:Line 1: caf\u{fffd}\n"));
        assert!(report.ends_with("1 different lines found\n"));

        let mut out = Vec::new();
        let count = compare_text(
            ("a", Cursor::new(vec![0xff, b'\n'])),
            ("b", Cursor::new(vec![0xff, b'\n'])),
            &mut out,
        )
        .unwrap();
        assert_eq!(count, 0);
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_binary_sizes() {
        let mut out = Vec::new();
        let delta = compare_binary(
            Cursor::new(vec![0u8; 10]),
            Cursor::new(vec![1u8; 4]),
            &mut out,
        )
        .unwrap();
        assert_eq!(delta, 6);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "The two files are different in 6 bytes\n"
        );

        let mut out = Vec::new();
        let delta =
            compare_binary(Cursor::new(vec![0u8; 3]), Cursor::new(vec![9u8; 3]), &mut out)
                .unwrap();
        assert_eq!(delta, 0);
        assert_eq!(String::from_utf8(out).unwrap(), "The two files are identical\n");
    }
}
