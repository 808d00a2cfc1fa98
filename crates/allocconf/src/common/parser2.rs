use anyhow::anyhow;
use chumsky::Parser;
use chumsky::error::Simple;
use chumsky::primitive::{end, filter, just};
use colored::Color;

pub type ParseError = Simple<char>;

// Parsing infrastructure
pub trait CharParser<T>: Parser<char, T, Error = ParseError> + Sized {
    fn parse_text(&self, input: &str) -> anyhow::Result<T> {
        self.parse(input)
            .map_err(|errors| anyhow!("{}", format_errors_cli(input, errors)))
    }
}
impl<T, P> CharParser<T> for P where P: Parser<char, T, Error = ParseError> {}

#[cfg(not(test))]
fn color_string<S: AsRef<str>>(string: S, color: Color) -> colored::ColoredString {
    use colored::Colorize;
    string.as_ref().color(color)
}

#[cfg(test)]
fn color_string<S: AsRef<str>>(string: S, _color: Color) -> String {
    string.as_ref().to_string()
}

/// Formats `chumsky` error into a user-visible (optionally colored) string.
/// Currently it handles just the first error.
pub fn format_errors_cli(input: &str, mut errors: Vec<ParseError>) -> String {
    use chumsky::Span;
    use std::fmt::Write;

    const ERROR_COLOR: Color = Color::Red;

    assert!(!errors.is_empty());

    errors.truncate(1);
    let error = errors.pop().unwrap();

    let mut output = String::new();

    let span = error.span();
    let expected = if error.expected().len() == 0 {
        "something else".to_string()
    } else {
        let mut expected = error
            .expected()
            .map(|expected| match expected {
                Some(expected) => expected.to_string(),
                None => "<end of input>".to_string(),
            })
            .collect::<Vec<_>>();
        expected.sort_unstable();
        expected
            .into_iter()
            .map(|expected| color_string(expected, Color::Blue).to_string())
            .collect::<Vec<_>>()
            .join(" or ")
    };

    let message = format!(
        "{} found{}, expected {}:",
        if error.found().is_some() {
            "Unexpected token"
        } else {
            "Unexpected end of input"
        },
        if let Some(label) = error.label() {
            format!(" while attempting to parse {}", color_string(label, Color::Yellow))
        } else {
            String::new()
        },
        expected,
    );

    output.push_str(&message);
    output.push('\n');

    if input.is_empty() {
        output.push_str("(the input was empty)");
    } else {
        writeln!(
            output,
            "  {}{}{}",
            input.chars().take(span.start()).collect::<String>(),
            color_string(
                input
                    .chars()
                    .skip(span.start())
                    .take(span.end() - span.start())
                    .collect::<String>(),
                ERROR_COLOR
            ),
            input.chars().skip(span.end()).collect::<String>()
        )
        .unwrap();

        let spaces = " ".repeat(2 + span.start());
        writeln!(output, "{spaces}{}", color_string("|", ERROR_COLOR)).unwrap();

        let note = match error.reason() {
            chumsky::error::SimpleReason::Custom(msg) => msg.clone(),
            _ => format!(
                "Unexpected {}",
                error
                    .found()
                    .map(|c| format!("token `{}`", c))
                    .unwrap_or_else(|| "end of input".to_string())
            ),
        };
        writeln!(
            output,
            "{spaces}{}{}",
            color_string("--- ", ERROR_COLOR),
            color_string(note, ERROR_COLOR)
        )
        .unwrap();
    }

    output
}

// Common parsers
fn parse_integer_string() -> impl CharParser<String> {
    filter(|c: &char| c.is_ascii_digit())
        .repeated()
        .at_least(1)
        .collect::<String>()
        .labelled("number")
}

/// Parse 8-byte integer.
pub fn parse_u64() -> impl CharParser<u64> {
    parse_integer_string().try_map(|p, span| {
        p.parse::<u64>()
            .map_err(|_| ParseError::custom(span, "Cannot parse as 8-byte unsigned integer"))
    })
}

/// Non-negative decimal number as written in configuration text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decimal {
    /// Integer part with the fraction dropped, `None` when it does not fit into `u64`.
    pub integer: Option<u64>,
    /// Full value including the fraction.
    pub value: f64,
}

/// Parses a non-negative decimal number like `12`, `12.` or `12.25`.
pub fn parse_decimal() -> impl CharParser<Decimal> {
    let fraction = just('.').ignore_then(
        filter(|c: &char| c.is_ascii_digit())
            .repeated()
            .collect::<String>(),
    );

    parse_integer_string()
        .then(fraction.or_not())
        .try_map(|(integer, fraction), span| {
            let units = integer.parse::<u64>().ok();
            let text = match fraction {
                Some(fraction) if !fraction.is_empty() => format!("{integer}.{fraction}"),
                _ => integer,
            };
            let value = text
                .parse::<f64>()
                .map_err(|_| ParseError::custom(span, "Cannot parse as a decimal number"))?;
            Ok(Decimal {
                integer: units,
                value,
            })
        })
}

pub fn is_valid_starting_identifier_char(c: char) -> bool {
    c.is_ascii_alphabetic()
}

pub fn is_valid_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/')
}

/// Parses a unit or resource name such as `mb`, `vcores` or `yarn.io/gpu`.
pub fn parse_identifier() -> impl CharParser<String> {
    filter(|&c: &char| is_valid_starting_identifier_char(c))
        .map(Some)
        .chain::<char, Vec<char>, _>(filter(|&c: &char| is_valid_identifier_char(c)).repeated())
        .collect::<String>()
        .labelled("unit")
}

/// Parses a (possibly empty) unit symbol consisting only of letters, e.g. `Mi` or `k`.
pub fn parse_unit_symbol() -> impl CharParser<String> {
    filter(|c: &char| c.is_ascii_alphabetic())
        .repeated()
        .collect::<String>()
}

/// Return a parser that will fail if there is any input following the text parsed by the
/// provided parser.
pub fn all_consuming<T>(parser: impl CharParser<T>) -> impl CharParser<T> {
    parser.then_ignore(end())
}
