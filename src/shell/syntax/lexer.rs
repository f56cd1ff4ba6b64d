use nom::branch::alt;
use nom::bytes::complete::{tag, take_till, take_while1};
use nom::character::complete::{char, digit1, multispace0};
use nom::combinator::{map, recognize};
use nom::multi::many0;
use nom::sequence::{delimited, pair, preceded, terminated};
use nom::IResult;

use super::tokens::Token;

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '|' | '&' | '<' | '>' | '"')
}

fn bare_word(input: &str) -> IResult<&str, String> {
    map(take_while1(is_word_char), |s: &str| s.to_string())(input)
}

fn quoted_word(input: &str) -> IResult<&str, String> {
    map(
        delimited(char('"'), take_till(|c| c == '"'), char('"')),
        |s: &str| s.to_string(),
    )(input)
}

fn word(input: &str) -> IResult<&str, String> {
    alt((quoted_word, bare_word))(input)
}

// A redirect target is either a plain word or an `&N` descriptor alias.
fn redirect_target(input: &str) -> IResult<&str, String> {
    alt((
        map(recognize(preceded(char('&'), digit1)), |s: &str| {
            s.to_string()
        }),
        word,
    ))(input)
}

fn lex_one(input: &str) -> IResult<&str, Token> {
    alt((
        map(
            preceded(pair(tag("2>"), multispace0), redirect_target),
            Token::RedirectErr,
        ),
        map(
            preceded(pair(char('>'), multispace0), redirect_target),
            Token::RedirectOut,
        ),
        map(
            preceded(pair(char('<'), multispace0), word),
            Token::RedirectIn,
        ),
        map(char('|'), |_| Token::Pipe),
        map(char('&'), |_| Token::Background),
        map(word, Token::Word),
    ))(input)
}

/// Lexes one input line. The caller must treat leftover input as a
/// syntax error.
pub fn lex(input: &str) -> IResult<&str, Vec<Token>> {
    terminated(many0(preceded(multispace0, lex_one)), multispace0)(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_full(input: &str) -> Vec<Token> {
        let (rest, tokens) = lex(input).expect("lex failed");
        assert_eq!(rest, "", "unconsumed input");
        tokens
    }

    #[test]
    fn words_and_pipe() {
        assert_eq!(
            lex_full("echo hi | wc -c"),
            vec![
                Token::Word("echo".into()),
                Token::Word("hi".into()),
                Token::Pipe,
                Token::Word("wc".into()),
                Token::Word("-c".into()),
            ]
        );
    }

    #[test]
    fn redirects_spaced_and_attached() {
        assert_eq!(
            lex_full("sort < in >out 2> err"),
            vec![
                Token::Word("sort".into()),
                Token::RedirectIn("in".into()),
                Token::RedirectOut("out".into()),
                Token::RedirectErr("err".into()),
            ]
        );
    }

    #[test]
    fn stderr_alias_target() {
        assert_eq!(
            lex_full("cmd > out 2>&1"),
            vec![
                Token::Word("cmd".into()),
                Token::RedirectOut("out".into()),
                Token::RedirectErr("&1".into()),
            ]
        );
    }

    #[test]
    fn trailing_ampersand_is_background() {
        assert_eq!(
            lex_full("sleep 1 &"),
            vec![
                Token::Word("sleep".into()),
                Token::Word("1".into()),
                Token::Background,
            ]
        );
    }

    #[test]
    fn quoted_words_keep_operators() {
        assert_eq!(
            lex_full("sh -c \"echo oops >&2\""),
            vec![
                Token::Word("sh".into()),
                Token::Word("-c".into()),
                Token::Word("echo oops >&2".into()),
            ]
        );
    }

    #[test]
    fn unterminated_quote_leaves_input() {
        let (rest, _) = lex("echo \"oops").expect("lex failed");
        assert!(!rest.is_empty());
    }
}
