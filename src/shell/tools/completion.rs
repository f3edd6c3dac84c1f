use std::collections::BTreeSet;

use crate::utils::path;

/// Commands offered even when they are not on `PATH`.
const COMMON_COMMANDS: [&str; 9] = [
    "ls", "pwd", "echo", "mkdir", "touch", "cat", "cp", "mv", "rm",
];

#[derive(Debug, PartialEq, Eq)]
pub enum Completion {
    None,
    Unique(String),
    Ambiguous(Vec<String>),
}

/// Completes a partial command name against built-ins, a few common
/// commands and, optionally, the executables on `PATH`.
pub struct Completer {
    commands: BTreeSet<String>,
    search_path: bool,
}

impl Completer {
    pub fn new(builtins: &[&str]) -> Self {
        Self {
            search_path: true,
            ..Self::with_commands(COMMON_COMMANDS.iter().chain(builtins).copied())
        }
    }

    pub fn with_commands<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            commands: commands.into_iter().map(Into::into).collect(),
            search_path: false,
        }
    }

    pub fn candidates(&self, partial: &str) -> Vec<String> {
        let mut matches: BTreeSet<String> = self
            .commands
            .iter()
            .filter(|name| name.starts_with(partial))
            .cloned()
            .collect();
        if self.search_path {
            matches.extend(path::executables_with_prefix(partial));
        }
        matches.into_iter().collect()
    }

    pub fn complete(&self, partial: &str) -> Completion {
        let mut candidates = self.candidates(partial);
        match candidates.len() {
            0 => Completion::None,
            1 => Completion::Unique(candidates.remove(0)),
            _ => Completion::Ambiguous(candidates),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completer() -> Completer {
        Completer::with_commands(["mindmap", "mkdir", "mv", "ls", "cd"])
    }

    #[test]
    fn test_unique() {
        assert_eq!(
            completer().complete("mkd"),
            Completion::Unique("mkdir".to_string())
        );
    }

    #[test]
    fn test_exact_name_is_its_own_candidate() {
        assert_eq!(completer().complete("ls"), Completion::Unique("ls".to_string()));
    }

    #[test]
    fn test_ambiguous_is_sorted() {
        assert_eq!(
            completer().complete("m"),
            Completion::Ambiguous(vec![
                "mindmap".to_string(),
                "mkdir".to_string(),
                "mv".to_string()
            ])
        );
    }

    #[test]
    fn test_no_match() {
        assert_eq!(completer().complete("zz"), Completion::None);
    }

    #[test]
    fn test_builtins_are_included() {
        let completer = Completer::new(&["hdiff"]);
        assert!(completer.candidates("hdi").contains(&"hdiff".to_string()));
        assert!(completer.candidates("mkdi").contains(&"mkdir".to_string()));
    }
}
