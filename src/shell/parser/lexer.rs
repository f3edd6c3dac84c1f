#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    Word(String),
    Pipe,
    EOF,
}

pub fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

pub fn trim_blanks(input: &str) -> &str {
    input.trim_matches(is_blank)
}

/// Splits a line on spaces and tabs, emitting `Pipe` for every `|` that is
/// not inside a quote. Quote state carries across words, so a quoted
/// `"a | b"` never splits the pipeline; the quote characters themselves stay
/// in the words.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    quote: Option<char>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            quote: None,
        }
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        match self.peek_char() {
            None => Token::EOF,
            Some('|') if self.quote.is_none() => {
                self.read_char();
                Token::Pipe
            }
            Some(_) => self.read_word(),
        }
    }

    /// The input not yet consumed, with leading blanks skipped.
    pub fn remainder(&self) -> &'a str {
        self.input[self.pos..].trim_start_matches(is_blank)
    }

    fn read_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if !is_blank(c) {
                break;
            }
            self.read_char();
        }
    }

    fn read_word(&mut self) -> Token {
        let start = self.pos;

        while let Some(c) = self.peek_char() {
            if is_blank(c) || (c == '|' && self.quote.is_none()) {
                break;
            }
            match (self.quote, c) {
                (None, '"' | '\'') => self.quote = Some(c),
                (Some(q), c) if c == q => self.quote = None,
                _ => {}
            }
            self.read_char();
        }

        Token::Word(self.input[start..self.pos].to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(s: &str) -> Token {
        Token::Word(s.to_string())
    }

    #[test]
    fn test_simple_command() {
        let mut lexer = Lexer::new("ls -l");
        assert_eq!(lexer.next_token(), word("ls"));
        assert_eq!(lexer.next_token(), word("-l"));
        assert_eq!(lexer.next_token(), Token::EOF);
    }

    #[test]
    fn test_pipe() {
        let mut lexer = Lexer::new("ls | grep foo");
        assert_eq!(lexer.next_token(), word("ls"));
        assert_eq!(lexer.next_token(), Token::Pipe);
        assert_eq!(lexer.remainder(), "grep foo");
        assert_eq!(lexer.next_token(), word("grep"));
        assert_eq!(lexer.next_token(), word("foo"));
        assert_eq!(lexer.next_token(), Token::EOF);
    }

    #[test]
    fn test_pipe_without_spaces() {
        let mut lexer = Lexer::new("ls|wc\t-l");
        assert_eq!(lexer.next_token(), word("ls"));
        assert_eq!(lexer.next_token(), Token::Pipe);
        assert_eq!(lexer.next_token(), word("wc"));
        assert_eq!(lexer.next_token(), word("-l"));
        assert_eq!(lexer.next_token(), Token::EOF);
    }

    #[test]
    fn test_redirections_stay_in_words() {
        let mut lexer = Lexer::new("echo hello >out.txt >> log");
        assert_eq!(lexer.next_token(), word("echo"));
        assert_eq!(lexer.next_token(), word("hello"));
        assert_eq!(lexer.next_token(), word(">out.txt"));
        assert_eq!(lexer.next_token(), word(">>"));
        assert_eq!(lexer.next_token(), word("log"));
        assert_eq!(lexer.next_token(), Token::EOF);
    }

    #[test]
    fn test_quoted_pipe_is_literal() {
        let mut lexer = Lexer::new(r#"echo "a | b" | wc"#);
        assert_eq!(lexer.next_token(), word("echo"));
        assert_eq!(lexer.next_token(), word("\"a"));
        assert_eq!(lexer.next_token(), word("|"));
        assert_eq!(lexer.next_token(), word("b\""));
        assert_eq!(lexer.next_token(), Token::Pipe);
        assert_eq!(lexer.next_token(), word("wc"));
    }

    #[test]
    fn test_trim_blanks() {
        assert_eq!(trim_blanks(" \t ls -l\t "), "ls -l");
        assert_eq!(trim_blanks("   "), "");
    }
}
