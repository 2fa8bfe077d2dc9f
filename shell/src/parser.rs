/// A command line split into arguments.
///
/// `argv` is never empty: blank lines are reported as `None` by [`parse_line`]
/// and never reach dispatch. Tokens carry no whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// The command name followed by its arguments.
    pub argv: Vec<String>,
    /// Whether the line ended with a standalone `&`.
    pub background: bool,
}

impl ParsedCommand {
    /// The command name (`argv[0]`).
    pub fn name(&self) -> &str {
        &self.argv[0]
    }

    /// Everything after the command name.
    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }
}

/// Walks a delimiter-terminated buffer and yields one token per delimiter.
///
/// Text after the last delimiter is never yielded, so the buffer handed to
/// [`LineScanner::new`] must end with whitespace.
struct LineScanner<'a> {
    rest: &'a str,
}

impl<'a> LineScanner<'a> {
    fn new(buf: &'a str) -> Self {
        Self {
            rest: buf.trim_start(),
        }
    }
}

impl<'a> Iterator for LineScanner<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let delim = self.rest.find(char::is_whitespace)?;
        let token = &self.rest[..delim];
        self.rest = self.rest[delim..].trim_start();
        Some(token)
    }
}

/// Returns the line without its trailing `\n` or `\r\n`.
pub fn strip_terminator(raw: &str) -> &str {
    match raw.strip_suffix('\n') {
        Some(line) => line.strip_suffix('\r').unwrap_or(line),
        None => raw,
    }
}

/// Copies the line into a scan buffer whose terminator is replaced by a space.
///
/// A line without a terminator still gets the trailing space, so its last
/// token survives the scan.
fn scan_buffer(raw: &str) -> String {
    let line = strip_terminator(raw);
    let mut buf = String::with_capacity(line.len() + 1);
    buf.push_str(line);
    buf.push(' ');
    buf
}

/// Parses one raw input line.
///
/// Returns `None` for a blank line: empty, whitespace only, or a lone `&`.
pub fn parse_line(raw: &str) -> Option<ParsedCommand> {
    let buf = scan_buffer(raw);
    let mut argv: Vec<String> = LineScanner::new(&buf).map(str::to_owned).collect();

    let background = argv.last().is_some_and(|last| last == "&");
    if background {
        argv.pop();
    }

    if argv.is_empty() {
        return None;
    }
    Some(ParsedCommand { argv, background })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn argv(line: &str) -> Vec<String> {
        parse_line(line).expect("expected a command").argv
    }

    #[test]
    fn test_simple_command_with_newline() {
        let cmd = parse_line("ls -l /tmp\n").unwrap();
        assert_eq!(cmd.argv, vec!["ls", "-l", "/tmp"]);
        assert_eq!(cmd.name(), "ls");
        assert_eq!(cmd.args(), &["-l".to_string(), "/tmp".to_string()]);
        assert!(!cmd.background);
    }

    #[test]
    fn test_last_token_kept_without_terminator() {
        assert_eq!(argv("echo hello"), vec!["echo", "hello"]);
        assert_eq!(argv("pwd"), vec!["pwd"]);
    }

    #[test]
    fn test_crlf_terminator() {
        assert_eq!(argv("cd /tmp\r\n"), vec!["cd", "/tmp"]);
    }

    #[test]
    fn test_whitespace_collapses() {
        assert_eq!(argv("   a  \t b\t\tc   \n"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_blank_lines() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("\n"), None);
        assert_eq!(parse_line("   \t  \n"), None);
    }

    #[test]
    fn test_lone_ampersand_is_blank() {
        assert_eq!(parse_line("&\n"), None);
        assert_eq!(parse_line("   &   \n"), None);
    }

    #[test]
    fn test_trailing_ampersand_sets_background() {
        let cmd = parse_line("sleep 5 &\n").unwrap();
        assert_eq!(cmd.argv, vec!["sleep", "5"]);
        assert!(cmd.background);

        let cmd = parse_line("sleep 5    &   ").unwrap();
        assert_eq!(cmd.argv, vec!["sleep", "5"]);
        assert!(cmd.background);
    }

    #[test]
    fn test_ampersand_must_stand_alone() {
        let cmd = parse_line("sleep 5&\n").unwrap();
        assert_eq!(cmd.argv, vec!["sleep", "5&"]);
        assert!(!cmd.background);

        let cmd = parse_line("run && \n").unwrap();
        assert_eq!(cmd.argv, vec!["run", "&&"]);
        assert!(!cmd.background);
    }

    #[test]
    fn test_only_last_ampersand_is_special() {
        let cmd = parse_line("a & b\n").unwrap();
        assert_eq!(cmd.argv, vec!["a", "&", "b"]);
        assert!(!cmd.background);
    }

    #[test]
    fn test_strip_terminator() {
        assert_eq!(strip_terminator("sleep 1 &\n"), "sleep 1 &");
        assert_eq!(strip_terminator("x\r\n"), "x");
        assert_eq!(strip_terminator("x"), "x");
    }

    proptest! {
        #[test]
        fn rejoined_tokens_reparse_identically(line in "[a-z0-9&/. \t]{0,40}") {
            if let Some(cmd) = parse_line(&line) {
                let mut rejoined = cmd.argv.join(" ");
                if cmd.background {
                    rejoined.push_str(" &");
                }
                prop_assert_eq!(parse_line(&rejoined), Some(cmd));
            }
        }

        #[test]
        fn tokens_never_contain_whitespace(line in "[a-z& \t\r]{0,40}\n?") {
            if let Some(cmd) = parse_line(&line) {
                prop_assert!(!cmd.argv.is_empty());
                for token in &cmd.argv {
                    prop_assert!(!token.is_empty());
                    prop_assert!(!token.chars().any(char::is_whitespace));
                }
            }
        }
    }
}
