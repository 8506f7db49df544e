//! Input line classification.
//!
//! A line is matched against an ordered table of classifiers; the first one
//! that recognises it wins. Lines nobody claims become an argument vector for
//! the filesystem builtins or external execution.

/// Quit the shell.
pub const QUIT_TOKEN: &str = "\\q";
/// `\l <device>`: inspect a boot sector.
pub const DISK_PREFIX: &str = "\\l ";
/// `debug '<text>'`: print text verbatim.
pub const DEBUG_PREFIX: &str = "debug '";
/// `\e $NAME`: list an environment variable.
pub const ENV_PREFIX: &str = "\\e $";
pub const ECHO_PREFIX: &str = "echo ";
pub const HISTORY: &str = "history";

/// What an input line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    Empty,
    History,
    Quit,
    /// Raw text after `\l `; may be blank.
    Disk(&'a str),
    /// Text between the quotes.
    Debug(&'a str),
    /// Variable name.
    EnvList(&'a str),
    /// Text to print, one wrapping pair of quotes removed.
    Echo(&'a str),
    /// Whitespace-split words; empty for blank-but-nonempty lines.
    Argv(Vec<&'a str>),
}

type Classifier = for<'a> fn(&'a str) -> Option<Line<'a>>;

/// Evaluated in order, first match wins.
const CLASSIFIERS: &[Classifier] = &[empty, history, quit, disk, debug, env_list, echo];

/// Classify one input line (without its trailing newline).
pub fn classify(line: &str) -> Line<'_> {
    CLASSIFIERS
        .iter()
        .find_map(|classifier| classifier(line))
        .unwrap_or_else(|| Line::Argv(line.split_whitespace().collect()))
}

fn empty(line: &str) -> Option<Line<'_>> {
    line.is_empty().then_some(Line::Empty)
}

fn history(line: &str) -> Option<Line<'_>> {
    (line == HISTORY).then_some(Line::History)
}

fn quit(line: &str) -> Option<Line<'_>> {
    (line == QUIT_TOKEN).then_some(Line::Quit)
}

fn disk(line: &str) -> Option<Line<'_>> {
    line.strip_prefix(DISK_PREFIX).map(Line::Disk)
}

fn debug(line: &str) -> Option<Line<'_>> {
    line.strip_prefix(DEBUG_PREFIX)?
        .strip_suffix('\'')
        .map(Line::Debug)
}

fn env_list(line: &str) -> Option<Line<'_>> {
    line.strip_prefix(ENV_PREFIX)
        .map(|name| Line::EnvList(name.trim()))
}

fn echo(line: &str) -> Option<Line<'_>> {
    line.strip_prefix(ECHO_PREFIX)
        .map(|text| Line::Echo(strip_wrapping_quotes(text)))
}

/// Remove one pair of matching `"` or `'` around `text`.
pub fn strip_wrapping_quotes(text: &str) -> &str {
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return &text[1..text.len() - 1];
        }
    }
    text
}
