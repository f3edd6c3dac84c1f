/// Marker appended to a line when completion is requested.
pub const COMPLETION_MARKER: char = '?';

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RedirectOp {
    Input,  // <
    Output, // >
    Append, // >>
}

impl RedirectOp {
    pub fn index(self) -> usize {
        match self {
            RedirectOp::Input => 0,
            RedirectOp::Output => 1,
            RedirectOp::Append => 2,
        }
    }
}

/// One stage of a pipeline.
///
/// `arguments` is framed the way `execvp` expects: slot 0 repeats `name`,
/// the last slot is `None`, and `arg_count == arguments.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandNode {
    pub name: String,
    pub background: bool,
    pub auto_complete: bool,
    pub arguments: Vec<Option<String>>,
    pub arg_count: usize,
    pub redirections: [Option<String>; 3],
}

impl Default for CommandNode {
    fn default() -> Self {
        Self {
            name: String::new(),
            background: false,
            auto_complete: false,
            arguments: vec![Some(String::new()), None],
            arg_count: 2,
            redirections: [None, None, None],
        }
    }
}

impl CommandNode {
    /// Builds the framed argument vector around the collected operands.
    pub(crate) fn frame_arguments(&mut self, operands: Vec<String>) {
        let mut arguments = Vec::with_capacity(operands.len() + 2);
        arguments.push(Some(self.name.clone()));
        arguments.extend(operands.into_iter().map(Some));
        arguments.push(None);
        self.arg_count = arguments.len();
        self.arguments = arguments;
    }

    /// The real arguments, without the leading name and the trailing sentinel.
    pub fn operands(&self) -> impl Iterator<Item = &str> {
        let end = self.arguments.len().saturating_sub(1);
        self.arguments
            .get(1..end)
            .unwrap_or_default()
            .iter()
            .flatten()
            .map(String::as_str)
    }

    pub fn operand(&self, index: usize) -> Option<&str> {
        self.operands().nth(index)
    }

    pub fn operand_count(&self) -> usize {
        self.arg_count.saturating_sub(2)
    }

    pub fn redirection(&self, op: RedirectOp) -> Option<&str> {
        self.redirections[op.index()].as_deref()
    }

    pub fn rename(&mut self, name: String) {
        if let Some(first) = self.arguments.first_mut() {
            *first = Some(name.clone());
        }
        self.name = name;
    }

    /// Strips the completion marker from the last real token.
    ///
    /// Returns true when the marker sat on the command name, i.e. the name
    /// itself is the partial token to complete.
    pub fn take_completion_marker(&mut self) -> bool {
        let last_operand = self.arg_count.checked_sub(2).filter(|&i| i > 0);
        match last_operand {
            Some(index) => {
                if let Some(Some(arg)) = self.arguments.get_mut(index) {
                    if arg.ends_with(COMPLETION_MARKER) {
                        arg.pop();
                    }
                }
                false
            }
            None => match self.name.strip_suffix(COMPLETION_MARKER) {
                Some(partial) => {
                    let partial = partial.to_string();
                    self.rename(partial);
                    true
                }
                None => false,
            },
        }
    }
}

/// The stages of one input line, in left-to-right order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline {
    pub line: String,
    pub stages: Vec<CommandNode>,
}

impl Pipeline {
    pub fn head(&self) -> Option<&CommandNode> {
        self.stages.first()
    }

    pub fn is_background(&self) -> bool {
        self.stages.iter().any(|stage| stage.background)
    }

    pub fn is_empty(&self) -> bool {
        self.stages.iter().all(|stage| stage.name.is_empty())
    }
}
