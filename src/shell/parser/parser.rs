use log::debug;

use super::ast::{CommandNode, Pipeline, RedirectOp, COMPLETION_MARKER};
use super::lexer::{trim_blanks, Lexer, Token};

pub struct Parser<'a> {
    input: &'a str,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Parser { input }
    }

    /// Parses the whole line into its pipeline stages. Malformed input never
    /// fails: it degrades to empty names or literal arguments.
    pub fn parse(&self) -> Pipeline {
        let mut stages = Vec::new();
        let mut rest = Some(self.input);

        while let Some(segment) = rest {
            let (stage, remainder) = parse_stage(segment);
            stages.push(stage);
            rest = remainder;
        }

        let pipeline = Pipeline {
            line: trim_blanks(self.input).to_string(),
            stages,
        };
        debug!("parsed pipeline: {:?}", pipeline);
        pipeline
    }
}

/// Parses one stage from the front of `buf`. When a pipe follows, the text
/// after it is returned for the next stage.
fn parse_stage(buf: &str) -> (CommandNode, Option<&str>) {
    let trimmed = trim_blanks(buf);
    let mut command = CommandNode {
        auto_complete: trimmed.ends_with(COMPLETION_MARKER),
        background: trimmed.ends_with('&'),
        ..Default::default()
    };

    let mut lexer = Lexer::new(trimmed);
    let mut remainder = None;
    let mut operands = Vec::new();
    let mut pending: Option<RedirectOp> = None;

    match lexer.next_token() {
        Token::Word(word) => command.name = word,
        Token::Pipe => remainder = Some(lexer.remainder()),
        Token::EOF => {}
    }

    if remainder.is_none() {
        loop {
            let word = match lexer.next_token() {
                Token::EOF => break,
                Token::Pipe => {
                    remainder = Some(lexer.remainder());
                    break;
                }
                Token::Word(word) => word,
            };
            let arg = trim_blanks(&word);
            if arg.is_empty() {
                continue;
            }

            // a detached operator takes the following word as its target
            if let Some(op) = pending.take() {
                command.redirections[op.index()] = Some(arg.to_string());
                continue;
            }

            if arg == "&" {
                continue;
            }

            if let Some((op, target)) = split_redirection(arg) {
                if target.is_empty() {
                    pending = Some(op);
                } else {
                    command.redirections[op.index()] = Some(target.to_string());
                }
                continue;
            }

            operands.push(strip_quotes(arg).to_string());
        }
    }

    command.frame_arguments(operands);
    (command, remainder)
}

fn split_redirection(arg: &str) -> Option<(RedirectOp, &str)> {
    if let Some(target) = arg.strip_prefix(">>") {
        Some((RedirectOp::Append, target))
    } else if let Some(target) = arg.strip_prefix('>') {
        Some((RedirectOp::Output, target))
    } else {
        arg.strip_prefix('<').map(|target| (RedirectOp::Input, target))
    }
}

/// Removes one matching pair of wrapping quotes. Tokens of two characters or
/// fewer are left alone, so `""` stays a literal two-quote argument.
fn strip_quotes(arg: &str) -> &str {
    let bytes = arg.as_bytes();
    let len = bytes.len();
    if len > 2 && (bytes[0] == b'"' || bytes[0] == b'\'') && bytes[0] == bytes[len - 1] {
        &arg[1..len - 1]
    } else {
        arg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Pipeline {
        Parser::new(line).parse()
    }

    fn operands(node: &CommandNode) -> Vec<&str> {
        node.operands().collect()
    }

    #[test]
    fn test_simple_command() {
        let pipeline = parse("ls -la");
        assert_eq!(pipeline.stages.len(), 1);
        let cmd = &pipeline.stages[0];
        assert_eq!(cmd.name, "ls");
        assert_eq!(
            cmd.arguments,
            vec![Some("ls".to_string()), Some("-la".to_string()), None]
        );
        assert_eq!(cmd.arg_count, 3);
        assert!(!cmd.background);
        assert!(!cmd.auto_complete);
    }

    #[test]
    fn test_pipeline() {
        let pipeline = parse("cat a.txt | grep foo");
        assert_eq!(pipeline.stages.len(), 2);
        assert_eq!(pipeline.stages[0].name, "cat");
        assert_eq!(operands(&pipeline.stages[0]), vec!["a.txt"]);
        assert_eq!(pipeline.stages[1].name, "grep");
        assert_eq!(operands(&pipeline.stages[1]), vec!["foo"]);
    }

    #[test]
    fn test_pipe_count() {
        for (line, stages) in [
            ("a", 1),
            ("a | b", 2),
            ("a|b|c", 3),
            ("a -x | b -y | c | d", 4),
        ] {
            let pipeline = parse(line);
            assert_eq!(pipeline.stages.len(), stages, "line: {}", line);
        }
        let names: Vec<_> = parse("a|b|c")
            .stages
            .iter()
            .map(|s| s.name.clone())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_redirection() {
        let pipeline = parse("echo hi > out.txt");
        let cmd = &pipeline.stages[0];
        assert_eq!(cmd.name, "echo");
        assert_eq!(operands(cmd), vec!["hi"]);
        assert_eq!(cmd.redirection(RedirectOp::Output), Some("out.txt"));
        assert_eq!(cmd.redirection(RedirectOp::Input), None);
        assert_eq!(cmd.redirection(RedirectOp::Append), None);
    }

    #[test]
    fn test_attached_redirections() {
        let pipeline = parse("sort <in.txt >>log.txt -r");
        let cmd = &pipeline.stages[0];
        assert_eq!(cmd.redirection(RedirectOp::Input), Some("in.txt"));
        assert_eq!(cmd.redirection(RedirectOp::Append), Some("log.txt"));
        assert_eq!(cmd.redirection(RedirectOp::Output), None);
        assert_eq!(operands(cmd), vec!["-r"]);
    }

    #[test]
    fn test_dangling_redirection_is_unset() {
        let pipeline = parse("echo hi >");
        let cmd = &pipeline.stages[0];
        assert_eq!(cmd.redirection(RedirectOp::Output), None);
        assert_eq!(operands(cmd), vec!["hi"]);
    }

    #[test]
    fn test_background() {
        let pipeline = parse("sleep 10 &");
        let cmd = &pipeline.stages[0];
        assert_eq!(cmd.name, "sleep");
        assert_eq!(operands(cmd), vec!["10"]);
        assert!(cmd.background);
        assert!(pipeline.is_background());
    }

    #[test]
    fn test_auto_complete_keeps_marker() {
        let pipeline = parse("mkd?");
        let cmd = &pipeline.stages[0];
        assert!(cmd.auto_complete);
        assert_eq!(cmd.name, "mkd?");
    }

    #[test]
    fn test_empty_line() {
        for line in ["", "   ", "\t \t"] {
            let pipeline = parse(line);
            assert_eq!(pipeline.stages.len(), 1);
            let cmd = &pipeline.stages[0];
            assert_eq!(cmd.name, "");
            assert_eq!(cmd.arg_count, 2);
            assert_eq!(cmd.arguments, vec![Some(String::new()), None]);
            assert!(pipeline.is_empty());
        }
    }

    #[test]
    fn test_lone_pipe() {
        let pipeline = parse("|");
        assert_eq!(pipeline.stages.len(), 2);
        assert!(pipeline.stages.iter().all(|s| s.name.is_empty()));
    }

    #[test]
    fn test_quote_stripping() {
        let pipeline = parse(r#"echo "hello" 'x' "" "unterminated"#);
        assert_eq!(
            operands(&pipeline.stages[0]),
            vec!["hello", "x", "\"\"", "\"unterminated"]
        );
    }

    #[test]
    fn test_two_quote_token_is_not_stripped() {
        let pipeline = parse("printf ''");
        assert_eq!(operands(&pipeline.stages[0]), vec!["''"]);
    }

    #[test]
    fn test_argument_framing_invariant() {
        for line in ["ls", "ls -a -l /tmp", "a | b c | d e f", "x > y z"] {
            for node in parse(line).stages {
                assert_eq!(node.arguments.first(), Some(&Some(node.name.clone())));
                assert_eq!(node.arguments.last(), Some(&None));
                assert_eq!(node.arg_count, node.arguments.len());
                assert_eq!(node.arg_count, node.operand_count() + 2);
            }
        }
    }

    #[test]
    fn test_plain_tokens_round_trip() {
        let line = "  grep  -n\tpattern   file.txt ";
        let pipeline = parse(line);
        let cmd = &pipeline.stages[0];
        let expected: Vec<&str> = line.split_whitespace().skip(1).collect();
        assert_eq!(operands(cmd), expected);
        assert_eq!(pipeline.line, "grep  -n\tpattern   file.txt");
    }

    #[test]
    fn test_parse_is_deterministic() {
        let line = "ls -l /usr";
        assert_eq!(parse(line), parse(line));
    }
}
