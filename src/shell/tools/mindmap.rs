use std::fs;
use std::io::{self, Write};
use std::path::Path;

pub const USAGE: &str = "Usage: mindmap [directory]";

/// Renders `root` depth-first, one entry per line, directories marked and
/// expanded beneath their parent. Symlinks are listed but never followed.
pub fn render<W: Write>(root: &Path, out: &mut W) -> io::Result<()> {
    writeln!(out, "Creating mind map for directory: {}", root.display())?;
    explore(root, 0, out)
}

fn explore<W: Write>(path: &Path, level: usize, out: &mut W) -> io::Result<()> {
    let mut entries = fs::read_dir(path)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let name = entry.file_name();
        let file_type = entry.file_type()?;
        write!(out, "{}", "|   ".repeat(level))?;
        if file_type.is_dir() {
            writeln!(out, "|-- {} (Directory)", name.to_string_lossy())?;
            explore(&entry.path(), level + 1, out)?;
        } else {
            writeln!(out, "|-- {}", name.to_string_lossy())?;
        }
    }
    Ok(())
}
