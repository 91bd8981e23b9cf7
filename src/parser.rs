//! Line dispatch.
//!
//! A section of the export is parsed by matching each line against an
//! ordered table of rules. The first rule that matches wins. A rule
//! either has an action, after which the next line is read, or it has
//! none, which ends the section. Actions may parse a nested section by
//! calling [`dispatch`] again with another table.
use std::fmt;
use std::str::FromStr;

use regex::{Captures, Regex};

use crate::error::{scope_where, Error, Result};
use crate::reader::LineSource;

/// What a rule does with a matching line.
pub type Action<S> = fn(&mut dyn LineSource, &mut S, &Args<'_>) -> Result<()>;

enum Matcher {
    Exact(&'static str),
    Pattern(Regex),
}

pub struct Rule<S> {
    matcher: Matcher,
    action: Option<Action<S>>,
}

impl<S> Rule<S> {
    /// Matches a line that is exactly `text`.
    pub fn exact(text: &'static str, action: Action<S>) -> Rule<S> {
        Rule {
            matcher: Matcher::Exact(text),
            action: Some(action),
        }
    }

    /// Matches a line that matches regexp `re`. Named groups are
    /// available to the action.
    pub fn pattern(re: &str, action: Action<S>) -> Rule<S> {
        Rule {
            matcher: Matcher::Pattern(compile(re)),
            action: Some(action),
        }
    }

    /// A line that is recognized but has no effect.
    pub fn ignore(text: &'static str) -> Rule<S> {
        Rule::exact(text, |_, _, _| Ok(()))
    }

    /// Like `ignore`, for a regexp.
    pub fn ignore_pattern(re: &str) -> Rule<S> {
        Rule::pattern(re, |_, _, _| Ok(()))
    }

    /// Matches the line that closes the section.
    pub fn exit(text: &'static str) -> Rule<S> {
        Rule {
            matcher: Matcher::Exact(text),
            action: None,
        }
    }

    fn matches<'t>(&self, line: &'t str, number: u32) -> Option<Args<'t>> {
        match self.matcher {
            Matcher::Exact(text) if text == line => Some(Args {
                caps: None,
                line: number,
            }),
            Matcher::Exact(_) => None,
            Matcher::Pattern(ref re) => re.captures(line).map(|caps| Args {
                caps: Some(caps),
                line: number,
            }),
        }
    }
}

impl<S> fmt::Debug for Rule<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.action.is_some() { "rule" } else { "exit" };
        match self.matcher {
            Matcher::Exact(text) => write!(f, "{} {:?}", kind, text),
            Matcher::Pattern(ref re) => write!(f, "{} /{}/", kind, re.as_str()),
        }
    }
}

fn compile(re: &str) -> Regex {
    match Regex::new(re) {
        Ok(re) => re,
        Err(e) => panic!("could not compile rule regexp {:?}: {}", re, e),
    }
}

/// The matched line as seen by an action.
#[derive(Debug)]
pub struct Args<'t> {
    caps: Option<Captures<'t>>,
    line: u32,
}

impl<'t> Args<'t> {
    /// Line number of the matched line.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Text of a named group, or the empty string if it did not take part
    /// in the match.
    pub fn get(&self, name: &str) -> &'t str {
        self.caps
            .as_ref()
            .and_then(|c| c.name(name))
            .map(|m| m.as_str())
            .unwrap_or("")
    }

    /// Parse a named group into a value.
    pub fn parse<T: FromStr>(&self, name: &str) -> Result<T> {
        let value = self.get(name);
        value
            .parse()
            .map_err(|_| Error::token(format!("invalid {} value: {}", name, value), self.line))
    }

    /// Parse a comma separated list of numbers.
    pub fn parse_list<T: FromStr>(&self, name: &str) -> Result<Vec<T>> {
        self.get(name)
            .split(',')
            .map(|v| {
                v.parse()
                    .map_err(|_| Error::token(format!("invalid {} value: {}", name, v), self.line))
            })
            .collect()
    }
}

/// Parse lines using `rules` until a rule without an action matches or
/// the input ends.
///
/// `scope` names the section in error messages, the empty string being
/// the top-level. Blank lines and comments are skipped. A line that no
/// rule matches is an error. Errors from actions are annotated with the
/// scope and the number of the line that triggered the action.
pub fn dispatch<S>(
    lines: &mut dyn LineSource,
    state: &mut S,
    scope: &str,
    rules: &[Rule<S>],
) -> Result<()> {
    debug!("enter {}", scope_where(scope));
    while let Some(line) = lines.next_line(true)? {
        let found = rules
            .iter()
            .find_map(|rule| rule.matches(&line.text, line.number).map(|args| (rule, args)));
        let (rule, args) = match found {
            Some(found) => found,
            None => {
                return Err(Error::scope(
                    format!("Unexpected input {}: {}", scope_where(scope), line.text),
                    line.number,
                ));
            }
        };
        trace!("line {}: {:?}", line.number, rule);
        match rule.action {
            Some(action) => action(lines, state, &args).map_err(|e| e.within(scope, line.number))?,
            None => {
                debug!("leave {}", scope_where(scope));
                return Ok(());
            }
        }
    }
    if !scope.is_empty() {
        warn!("end of input {}", scope_where(scope));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::reader::LineReader;

    #[derive(Default, Debug)]
    struct Counter {
        hits: Vec<&'static str>,
        total: u32,
    }

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn nested_rules() -> Vec<Rule<Counter>> {
        type R = Rule<Counter>;
        vec![
            R::exit("exit"),
            R::pattern(r"^add (?P<n>[0-9]+)$", |_, c, args| {
                c.total += args.parse::<u32>("n")?;
                Ok(())
            }),
            R::exact("fail", |_, _, args| Err(Error::semantic("failed", args.line()))),
        ]
    }

    fn rules() -> Vec<Rule<Counter>> {
        type R = Rule<Counter>;
        vec![
            R::exact("one", |_, c, _| {
                c.hits.push("exact");
                Ok(())
            }),
            R::pattern(r"^o", |_, c, _| {
                c.hits.push("pattern");
                Ok(())
            }),
            R::ignore("noop"),
            R::exact("nested", |lines, c, _| dispatch(lines, c, "nested", &nested_rules())),
        ]
    }

    fn run(text: &'static str) -> (Counter, Result<()>) {
        init();
        let mut lines = LineReader::new(text.as_bytes());
        let mut c = Counter::default();
        let r = dispatch(&mut lines, &mut c, "", &rules());
        (c, r)
    }

    #[test]
    fn first_match_wins() {
        let (c, r) = run("one\nonce\n\n! comment\nnoop\n");
        r.unwrap();
        assert_eq!(c.hits, vec!["exact", "pattern"]);
    }

    #[test]
    fn nested_scope() {
        let (c, r) = run("nested\nadd 2\n  add 3\nexit\none\n");
        r.unwrap();
        assert_eq!(c.total, 5);
        assert_eq!(c.hits, vec!["exact"]);
    }

    #[test]
    fn unexpected_input() {
        let (_, r) = run("one\ntwo\n");
        let e = r.unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Scope);
        assert_eq!(e.line, 2);
        assert_eq!(e.msg, "Unexpected input at top-level: two");
        assert!(e.context.is_empty());
    }

    #[test]
    fn error_chain() {
        let (_, r) = run("noop\nnested\nadd 1\nfail\n");
        let e = r.unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Semantic);
        assert_eq!(e.line, 4);
        let ctx: Vec<_> = e.context.iter().map(|c| (c.scope.as_str(), c.line)).collect();
        assert_eq!(ctx, vec![("nested", 4), ("", 2)]);
    }

    #[test]
    fn unexpected_input_in_nested_scope() {
        let (_, r) = run("nested\nadd x\n");
        let e = r.unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Scope);
        assert_eq!(e.msg, "Unexpected input in 'nested' section: add x");
        assert_eq!(e.context.len(), 1);
        assert_eq!(e.context[0].line, 1);
    }

    #[test]
    fn end_of_input_closes_scope() {
        let (c, r) = run("nested\nadd 7\n");
        r.unwrap();
        assert_eq!(c.total, 7);
    }

    #[test]
    fn args() {
        let rule: Rule<Counter> =
            Rule::pattern(r"^vlan (?P<ids>[0-9,]+)( (?P<opt>x))?$", |_, _, _| Ok(()));
        let args = rule.matches("vlan 1,20,300", 9).unwrap();
        assert_eq!(args.line(), 9);
        assert_eq!(args.parse_list::<u16>("ids").unwrap(), vec![1, 20, 300]);
        assert_eq!(args.get("opt"), "");
        let e = args.parse::<u8>("ids").unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Token);
    }
}
