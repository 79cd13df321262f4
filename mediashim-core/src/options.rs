//! Declarative option tables and the generic parser that consumes them.
//!
//! Each tool describes its options as a `&'static [OptionSpec]`, which is
//! turned into a `clap::Command` at parse time. Options come first; the
//! first non-option token (or `--`) ends option parsing and everything after
//! it is positional. `-h`/`--help` is recognized for every table and wins
//! over any error in the option section, so it is scanned for before clap
//! sees the arguments.

use std::collections::{HashMap, HashSet};
use std::fmt::{self, Write as _};
use std::str::FromStr;

use clap::error::{ContextKind, ContextValue, ErrorKind as ClapErrorKind};
use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::error::{CoreError, CoreResult};

/// clap id of the trailing positional list. Not a valid long option name.
const POSITIONALS: &str = "<positionals>";

/// Whether an option is a bare switch or expects a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Flag,
    Value,
}

/// One row of a tool's option table.
#[derive(Debug, Clone, Copy)]
pub struct OptionSpec {
    /// Long name without dashes. Also the key used to read the parsed value.
    pub long: &'static str,
    pub short: Option<char>,
    pub arity: Arity,
    /// Placeholder shown in help output for value options.
    pub value_name: &'static str,
    pub help: &'static str,
}

impl OptionSpec {
    pub const fn flag(long: &'static str, short: Option<char>, help: &'static str) -> Self {
        Self {
            long,
            short,
            arity: Arity::Flag,
            value_name: "",
            help,
        }
    }

    pub const fn value(
        long: &'static str,
        short: Option<char>,
        value_name: &'static str,
        help: &'static str,
    ) -> Self {
        Self {
            long,
            short,
            arity: Arity::Value,
            value_name,
            help,
        }
    }

    fn takes_value(&self) -> bool {
        self.arity == Arity::Value
    }
}

/// The quiet switch every tool accepts.
pub const QUIET: OptionSpec =
    OptionSpec::flag("quiet", Some('q'), "suppress progress and status output");

/// Result of parsing an argument vector against a table.
#[derive(Debug)]
pub enum ParseOutcome {
    Help,
    Parsed(ParsedArgs),
}

/// Flags, option values and positionals from one argument vector.
#[derive(Debug, Default, Clone)]
pub struct ParsedArgs {
    flags: HashSet<&'static str>,
    values: HashMap<&'static str, String>,
    positionals: Vec<String>,
}

impl ParsedArgs {
    pub fn flag(&self, long: &str) -> bool {
        self.flags.contains(long)
    }

    pub fn value(&self, long: &str) -> Option<&str> {
        self.values.get(long).map(String::as_str)
    }

    /// Parses an option value with `FromStr`, naming the option on failure.
    pub fn parse_value<T>(&self, long: &str) -> CoreResult<Option<T>>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        match self.value(long) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<T>()
                .map(Some)
                .map_err(|e| CoreError::invalid_value(format!("--{long}"), raw, e.to_string())),
        }
    }

    pub fn positionals(&self) -> &[String] {
        &self.positionals
    }

    pub fn positional(&self, index: usize) -> Option<&str> {
        self.positionals.get(index).map(String::as_str)
    }

    /// Returns the positional at `index` or a "`what` must be provided" error.
    pub fn required_positional(&self, index: usize, what: &'static str) -> CoreResult<&str> {
        self.positional(index)
            .ok_or(CoreError::MissingArgument(what))
    }

    /// Rejects positionals beyond the first `max`.
    pub fn expect_at_most(&self, max: usize) -> CoreResult<()> {
        match self.positionals.get(max) {
            Some(extra) => Err(CoreError::UnexpectedArgument(extra.clone())),
            None => Ok(()),
        }
    }
}

fn find_long<'t>(table: &'t [OptionSpec], name: &str) -> Option<&'t OptionSpec> {
    table.iter().find(|spec| spec.long == name)
}

fn find_short(table: &[OptionSpec], c: char) -> Option<&OptionSpec> {
    table.iter().find(|spec| spec.short == Some(c))
}

fn is_option_token(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-')
}

/// Scans the option section for `-h`/`--help` without failing on anything
/// else. Values of known options are skipped so `--output -h` is not help.
fn help_requested<S: AsRef<str>>(table: &[OptionSpec], args: &[S]) -> bool {
    let mut iter = args.iter().map(AsRef::as_ref);
    while let Some(token) = iter.next() {
        if token == "--" || !is_option_token(token) {
            return false;
        }
        if let Some(body) = token.strip_prefix("--") {
            if body == "help" {
                return true;
            }
            if !body.contains('=') && find_long(table, body).is_some_and(OptionSpec::takes_value) {
                iter.next();
            }
            continue;
        }
        let bundle: Vec<char> = token[1..].chars().collect();
        for (pos, c) in bundle.iter().enumerate() {
            if *c == 'h' {
                return true;
            }
            if find_short(table, *c).is_some_and(OptionSpec::takes_value) {
                if pos + 1 == bundle.len() {
                    iter.next();
                }
                break;
            }
        }
    }
    false
}

/// Builds the clap command for one option table.
fn command(table: &[OptionSpec]) -> Command {
    let mut cmd = Command::new("tool")
        .no_binary_name(true)
        .disable_help_flag(true)
        .disable_version_flag(true)
        .args_override_self(true);
    for spec in table {
        let mut arg = Arg::new(spec.long).long(spec.long);
        if let Some(c) = spec.short {
            arg = arg.short(c);
        }
        arg = match spec.arity {
            Arity::Flag => arg.action(ArgAction::SetTrue),
            // `--output -h` names a file called -h
            Arity::Value => arg
                .action(ArgAction::Set)
                .value_name(spec.value_name)
                .allow_hyphen_values(true),
        };
        cmd = cmd.arg(arg);
    }
    cmd.arg(
        Arg::new(POSITIONALS)
            .action(ArgAction::Append)
            .num_args(0..)
            .trailing_var_arg(true),
    )
}

/// The option clap rejected, e.g. `--rate` from `--rate <BITRATE>`.
fn rejected_option(err: &clap::Error) -> Option<String> {
    match err.get(ContextKind::InvalidArg) {
        Some(ContextValue::String(arg)) => arg.split_whitespace().next().map(str::to_string),
        _ => None,
    }
}

/// How the user spelled a value option that was left without its value.
/// Only the final token can be missing its value.
fn spelled(spec: &OptionSpec, args: &[&str]) -> String {
    match (args.last(), spec.short) {
        (Some(last), Some(c)) if !last.starts_with("--") => format!("-{c}"),
        _ => format!("--{}", spec.long),
    }
}

fn usage_error(table: &[OptionSpec], args: &[&str], err: &clap::Error) -> CoreError {
    let option = rejected_option(err)
        .unwrap_or_else(|| err.kind().as_str().unwrap_or("invalid option").to_string());
    if err.kind() == ClapErrorKind::UnknownArgument {
        return CoreError::UnknownOption(option);
    }

    let name = option.trim_start_matches('-');
    let mut chars = name.chars();
    let short = match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    };
    let spec = table
        .iter()
        .find(|spec| spec.long == name || (short.is_some() && spec.short == short));
    match spec {
        Some(spec) if spec.arity == Arity::Flag => {
            CoreError::UnexpectedValue(format!("--{}", spec.long))
        }
        Some(spec) => CoreError::MissingValue(spelled(spec, args)),
        None => CoreError::UnknownOption(option),
    }
}

fn collect(table: &[OptionSpec], matches: &ArgMatches) -> ParsedArgs {
    let mut parsed = ParsedArgs::default();
    for spec in table {
        match spec.arity {
            Arity::Flag => {
                if matches.get_flag(spec.long) {
                    parsed.flags.insert(spec.long);
                }
            }
            Arity::Value => {
                if let Some(value) = matches.get_one::<String>(spec.long) {
                    parsed.values.insert(spec.long, value.clone());
                }
            }
        }
    }
    parsed.positionals = matches
        .get_many::<String>(POSITIONALS)
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    parsed
}

/// Parses `args` (program name already removed) against `table`.
pub fn parse_args<S: AsRef<str>>(table: &[OptionSpec], args: &[S]) -> CoreResult<ParseOutcome> {
    if help_requested(table, args) {
        return Ok(ParseOutcome::Help);
    }

    let argv: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
    let matches = command(table)
        .try_get_matches_from(argv.iter().copied())
        .map_err(|e| {
            log::debug!("Option parsing failed: {:?}", e.kind());
            usage_error(table, &argv, &e)
        })?;
    Ok(ParseOutcome::Parsed(collect(table, &matches)))
}

/// Renders the help page for a tool from its option table.
pub fn render_help(program: &str, usage: &str, description: &str, table: &[OptionSpec]) -> String {
    let mut rows: Vec<(String, &str)> = vec![("-h, --help".to_string(), "print this help and exit")];
    for spec in table {
        let short = spec.short.map(|c| format!("-{c}, ")).unwrap_or_else(|| "    ".to_string());
        let left = if spec.takes_value() {
            format!("{short}--{}=<{}>", spec.long, spec.value_name)
        } else {
            format!("{short}--{}", spec.long)
        };
        rows.push((left, spec.help));
    }
    let width = rows.iter().map(|(left, _)| left.len()).max().unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(out, "Usage: {program} {usage}");
    let _ = writeln!(out);
    let _ = writeln!(out, "{description}");
    let _ = writeln!(out);
    let _ = writeln!(out, "Options:");
    for (left, help) in rows {
        let _ = writeln!(out, "  {left:<width$}  {help}");
    }
    out
}

/// Short usage line printed after usage errors.
pub fn render_usage(program: &str, usage: &str) -> String {
    format!("Usage: {program} {usage}\nTry '{program} --help' for more information.")
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &[OptionSpec] = &[
        QUIET,
        OptionSpec::value("rate", Some('r'), "BITRATE", "video bitrate"),
        OptionSpec::value("time", Some('t'), "SECS", "fade duration"),
        OptionSpec::flag("verbose", Some('v'), "more output"),
    ];

    fn parsed(args: &[&str]) -> ParsedArgs {
        match parse_args(TABLE, args).unwrap() {
            ParseOutcome::Parsed(p) => p,
            ParseOutcome::Help => panic!("unexpected help for {args:?}"),
        }
    }

    fn is_help(args: &[&str]) -> bool {
        matches!(parse_args(TABLE, args), Ok(ParseOutcome::Help))
    }

    #[test]
    fn long_and_short_forms_agree() {
        let forms: &[&[&str]] = &[
            &["--rate=2M", "x"],
            &["--rate", "2M", "x"],
            &["-r", "2M", "x"],
            &["-r2M", "x"],
        ];
        for args in forms {
            let p = parsed(args);
            assert_eq!(p.value("rate"), Some("2M"), "{args:?}");
            assert_eq!(p.positionals(), ["x".to_string()], "{args:?}");
        }
        assert!(parsed(&["-q"]).flag("quiet"));
        assert!(parsed(&["--quiet"]).flag("quiet"));
    }

    #[test]
    fn bundled_flags_and_trailing_value() {
        let p = parsed(&["-qvt", "3", "clip.mp4"]);
        assert!(p.flag("quiet"));
        assert!(p.flag("verbose"));
        assert_eq!(p.value("time"), Some("3"));
        assert_eq!(p.positional(0), Some("clip.mp4"));
    }

    #[test]
    fn unknown_options_are_named() {
        let err = parse_args(TABLE, &["--bogus", "x"]).unwrap_err();
        assert_eq!(err.to_string(), "unknown option: --bogus");
        let err = parse_args(TABLE, &["-qx"]).unwrap_err();
        assert_eq!(err.to_string(), "unknown option: -x");
    }

    #[test]
    fn missing_values_are_named() {
        let err = parse_args(TABLE, &["--rate"]).unwrap_err();
        assert_eq!(err.to_string(), "argument required for option: --rate");
        let err = parse_args(TABLE, &["-t"]).unwrap_err();
        assert_eq!(err.to_string(), "argument required for option: -t");
    }

    #[test]
    fn flag_with_inline_value_is_rejected() {
        let err = parse_args(TABLE, &["--quiet=yes"]).unwrap_err();
        assert!(matches!(err, CoreError::UnexpectedValue(ref o) if o == "--quiet"));
    }

    #[test]
    fn help_wins_anywhere_in_option_section() {
        assert!(is_help(&["-h"]));
        assert!(is_help(&["--help"]));
        assert!(is_help(&["--bogus", "--help", "file"]));
        assert!(is_help(&["-qh"]));
        assert!(is_help(&["-x", "-h"]));
    }

    #[test]
    fn help_after_first_positional_is_positional() {
        let p = parsed(&["clip.mp4", "--help"]);
        assert_eq!(p.positionals(), ["clip.mp4".to_string(), "--help".to_string()]);
    }

    #[test]
    fn help_as_option_value_is_not_help() {
        let p = parsed(&["--rate", "-h", "clip"]);
        assert_eq!(p.value("rate"), Some("-h"));
        let p = parsed(&["-r", "-h", "clip"]);
        assert_eq!(p.value("rate"), Some("-h"));
    }

    #[test]
    fn options_after_the_first_positional_are_positional() {
        let p = parsed(&["-q", "clip.mp4", "-t", "2", "--bogus"]);
        assert!(p.flag("quiet"));
        assert_eq!(p.value("time"), None);
        assert_eq!(p.positionals(), ["clip.mp4", "-t", "2", "--bogus"].map(String::from));
    }

    #[test]
    fn double_dash_ends_options() {
        let p = parsed(&["-q", "--", "-weird-name.mp4"]);
        assert!(p.flag("quiet"));
        assert_eq!(p.positional(0), Some("-weird-name.mp4"));
    }

    #[test]
    fn lone_dash_is_positional() {
        let p = parsed(&["-"]);
        assert_eq!(p.positional(0), Some("-"));
    }

    #[test]
    fn last_value_wins() {
        let p = parsed(&["--rate=1M", "-r", "3M"]);
        assert_eq!(p.value("rate"), Some("3M"));
    }

    #[test]
    fn typed_values_report_the_option() {
        let p = parsed(&["--time=abc"]);
        let err = p.parse_value::<f64>("time").unwrap_err();
        assert!(err.to_string().starts_with("invalid value 'abc' for --time"));
        let p = parsed(&["--time=2.5"]);
        assert_eq!(p.parse_value::<f64>("time").unwrap(), Some(2.5));
        assert_eq!(p.parse_value::<f64>("rate").unwrap(), None);
    }

    #[test]
    fn positional_helpers() {
        let p = parsed(&["a", "b"]);
        assert_eq!(p.required_positional(1, "start time").unwrap(), "b");
        assert_eq!(
            p.required_positional(2, "end time").unwrap_err().to_string(),
            "end time must be provided"
        );
        assert!(p.expect_at_most(2).is_ok());
        assert!(matches!(p.expect_at_most(1), Err(CoreError::UnexpectedArgument(ref a)) if a == "b"));
    }

    #[test]
    fn help_page_lists_every_option() {
        let page = render_help("mediashim fade", "[OPTIONS] <FILE>", "Fade in and out.", TABLE);
        assert!(page.starts_with("Usage: mediashim fade [OPTIONS] <FILE>\n"));
        assert!(page.contains("-h, --help"));
        assert!(page.contains("-q, --quiet"));
        assert!(page.contains("-r, --rate=<BITRATE>"));
        assert!(page.contains("fade duration"));
    }
}
