// File: tzbot-core/src/services/command_parser.rs
//! Splits `!name arg "quoted arg"` style messages into a command name and
//! arguments, and decides whether the name is a command the bot knows.

use std::collections::BTreeSet;

use tracing::trace;
use tzbot_common::models::CommandInvocation;

/// Walks an argument string one token at a time. Quoting follows POSIX
/// shell rules: `'...'` is literal, `"..."` honours `\"` and `\\`, and a
/// backslash outside quotes escapes the next character.
pub struct ArgScanner<'a> {
    input: &'a str,
    pos: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnterminatedQuote;

impl<'a> ArgScanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Text not consumed yet, leading whitespace trimmed.
    pub fn rest(&self) -> &'a str {
        let input = self.input;
        input[self.pos..].trim_start()
    }

    pub fn next_token(&mut self) -> Result<Option<String>, UnterminatedQuote> {
        let input = self.input;
        let start = self.pos;
        let mut chars = input[start..].char_indices().peekable();
        let mut token = String::new();
        let mut in_token = false;
        let mut quote: Option<char> = None;
        let mut end = input.len();

        while let Some((offset, c)) = chars.next() {
            match quote {
                Some(q) if c == q => quote = None,
                Some('"') if c == '\\' => match chars.peek() {
                    Some(&(_, next)) if next == '"' || next == '\\' => {
                        token.push(next);
                        chars.next();
                    }
                    _ => token.push(c),
                },
                Some(_) => token.push(c),
                None if c.is_whitespace() => {
                    if in_token {
                        end = start + offset;
                        break;
                    }
                }
                None if c == '"' || c == '\'' => {
                    quote = Some(c);
                    in_token = true;
                }
                None if c == '\\' => {
                    in_token = true;
                    match chars.next() {
                        Some((_, next)) => token.push(next),
                        None => token.push(c),
                    }
                }
                None => {
                    token.push(c);
                    in_token = true;
                }
            }
        }

        if quote.is_some() {
            return Err(UnterminatedQuote);
        }
        self.pos = end;
        Ok(in_token.then_some(token))
    }
}

/// Splits `input` into arguments. If the quoting is broken the whole string
/// falls back to plain whitespace splitting.
pub fn split_arguments(input: &str) -> Vec<String> {
    let mut scanner = ArgScanner::new(input);
    let mut tokens = Vec::new();
    loop {
        match scanner.next_token() {
            Ok(Some(t)) => tokens.push(t),
            Ok(None) => return tokens,
            Err(UnterminatedQuote) => {
                trace!("unterminated quote; splitting on whitespace");
                return input.split_whitespace().map(str::to_string).collect();
            }
        }
    }
}

/// Takes the first argument off `input` and returns it with the remainder,
/// trimmed at both ends but otherwise untouched, e.g. for
/// `add_command <trigger> <free text>`.
pub fn split_first_argument(input: &str) -> Option<(String, &str)> {
    let mut scanner = ArgScanner::new(input);
    match scanner.next_token() {
        Ok(Some(first)) => Some((first, scanner.rest().trim())),
        Ok(None) => None,
        Err(UnterminatedQuote) => {
            let trimmed = input.trim_start();
            let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
            Some((trimmed[..end].to_string(), trimmed[end..].trim()))
        }
    }
}

/// Recognizes `<prefix><name> ...` messages whose name is registered.
#[derive(Debug, Clone)]
pub struct CommandRouter {
    prefix: String,
    known: BTreeSet<String>,
}

impl CommandRouter {
    pub fn new<I, S>(prefix: &str, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefix: prefix.to_string(),
            known: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.known.contains(name)
    }

    /// Syntax only: `(name, raw_args)` if `text` starts with the prefix
    /// directly followed by a name. Says nothing about the name being known.
    pub fn parse<'t>(&self, text: &'t str) -> Option<(&'t str, &'t str)> {
        let body = text.strip_prefix(self.prefix.as_str())?;
        let end = body.find(char::is_whitespace).unwrap_or(body.len());
        let name = &body[..end];
        if name.is_empty() {
            return None;
        }
        Some((name, body[end..].trim_start()))
    }

    pub fn route(&self, text: &str) -> Option<CommandInvocation> {
        let (name, raw_args) = self.parse(text)?;
        if !self.is_known(name) {
            return None;
        }
        Some(CommandInvocation {
            name: name.to_string(),
            args: split_arguments(raw_args),
            raw_args: raw_args.to_string(),
        })
    }
}
