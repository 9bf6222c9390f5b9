//! Phase one of parsing: a single left-to-right walk recording token
//! positions and separator structure. No numeric conversion happens here;
//! only illegal character classes are rejected early.

use crate::error::{AddressStringError, StringErrorKind};

use super::options::ParseOptions;

/// One candidate segment: the raw text and its byte offset.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Group<'a> {
    pub text: &'a str,
    pub start: usize,
    /// Whether a `.` (rather than `:`) preceded this group.
    pub after_dot: bool,
}

/// The recorded token structure of one input string.
#[derive(Clone, Debug)]
pub(crate) struct Tokenized<'a> {
    pub input: &'a str,
    pub groups: Vec<Group<'a>>,
    pub has_colon: bool,
    pub has_dot: bool,
    /// Group index at which `::` occurred.
    pub double_colon: Option<usize>,
    /// Byte offset and text of the zone following `%`.
    pub zone: Option<(usize, &'a str)>,
    /// Byte offset and text of the suffix following `/`.
    pub suffix: Option<(usize, &'a str)>,
}

impl<'a> Tokenized<'a> {
    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }
}

fn is_group_byte(b: u8, base85: bool) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(b, b'*' | b'_' | b'%' | b'-')
        || (base85
            && matches!(
                b,
                b'!' | b'#'
                    | b'$'
                    | b'&'
                    | b'('
                    | b')'
                    | b'+'
                    | b';'
                    | b'<'
                    | b'='
                    | b'>'
                    | b'?'
                    | b'@'
                    | b'^'
                    | b'`'
                    | b'{'
                    | b'|'
                    | b'}'
                    | b'~'
            ))
}

/// Walk `input` once, recording groups, separators, the `::` position, and
/// the zone and suffix spans.
pub(crate) fn tokenize<'a>(
    input: &'a str,
    options: &ParseOptions,
) -> Result<Tokenized<'a>, AddressStringError> {
    let bytes = input.as_bytes();
    let base85 = options.allow_ipv6 && options.ipv6.allow_base_85;
    let mut tok = Tokenized {
        input,
        groups: Vec::new(),
        has_colon: false,
        has_dot: false,
        double_colon: None,
        zone: None,
        suffix: None,
    };
    if input.is_empty() {
        return Ok(tok);
    }
    let mut group_start = 0usize;
    let mut after_dot = false;
    let mut i = 0usize;
    let push_group = |tok: &mut Tokenized<'a>, start: usize, end: usize, after_dot: bool| {
        tok.groups.push(Group {
            text: &input[start..end],
            start,
            after_dot,
        });
    };
    // the current group ends at `i`; an empty group is kept (for the
    // resolver to reject) except directly after a `::`
    let close_group = |tok: &mut Tokenized<'a>, start: usize, i: usize, after_dot: bool| {
        let after_double = i == start
            && tok.double_colon == Some(tok.groups.len())
            && i >= 2
            && &bytes[i - 2..i] == b"::";
        if !after_double {
            push_group(tok, start, i, after_dot);
        }
    };
    while i < bytes.len() {
        match bytes[i] {
            b'.' => {
                push_group(&mut tok, group_start, i, after_dot);
                tok.has_dot = true;
                after_dot = true;
                i += 1;
                group_start = i;
            }
            b':' => {
                tok.has_colon = true;
                if bytes.get(i + 1) == Some(&b':') {
                    if tok.double_colon.is_some() {
                        return Err(AddressStringError::new(StringErrorKind::TooManySegments, i));
                    }
                    if i > group_start {
                        push_group(&mut tok, group_start, i, after_dot);
                    }
                    tok.double_colon = Some(tok.groups.len());
                    i += 2;
                } else {
                    // a third ':' directly after '::'
                    if i == group_start
                        && tok.double_colon == Some(tok.groups.len())
                        && i >= 2
                        && &bytes[i - 2..i] == b"::"
                    {
                        return Err(AddressStringError::new(
                            StringErrorKind::InvalidCharacter,
                            i,
                        ));
                    }
                    close_group(&mut tok, group_start, i, after_dot);
                    i += 1;
                }
                after_dot = false;
                group_start = i;
            }
            b'/' => {
                close_group(&mut tok, group_start, i, after_dot);
                tok.suffix = Some((i, &input[i + 1..]));
                return Ok(tok);
            }
            b'%' if tok.has_colon => {
                close_group(&mut tok, group_start, i, after_dot);
                let rest = &input[i + 1..];
                match rest.find('/') {
                    Some(slash) => {
                        tok.zone = Some((i + 1, &rest[..slash]));
                        tok.suffix = Some((i + 1 + slash, &rest[slash + 1..]));
                    }
                    None => tok.zone = Some((i + 1, rest)),
                }
                return Ok(tok);
            }
            b if is_group_byte(b, base85) => i += 1,
            _ => {
                return Err(AddressStringError::new(
                    StringErrorKind::InvalidCharacter,
                    i,
                ))
            }
        }
    }
    close_group(&mut tok, group_start, i, after_dot);
    Ok(tok)
}
