//! Bare-token scanner for bracketed parameter values
//!
//! Clients send arrays like `[Delhi,Mumbai]` that only become valid JSON once
//! every bare token is quoted. A bare token:
//! - starts at an ASCII word character (`[A-Za-z0-9_]`) outside a quoted string
//! - runs over any non-comma characters
//! - ends at the last word character before the next comma (or end of input)
//!
//! So `[New Delhi, 77.5]` yields `New Delhi` and `77.5`, while
//! `["already quoted"]` yields nothing. The scanner is linear in the input
//! length for every input.

use std::borrow::Cow;
use std::ops::Range;

const fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Byte ranges of every bare token in `input`, in order.
#[must_use]
pub fn bare_token_spans(input: &str) -> Vec<Range<usize>> {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut spans = Vec::new();
    let mut in_string = false;
    let mut i = 0;

    while i < len {
        let b = bytes[i];
        if in_string {
            match b {
                b'\\' => i += 2,
                b'"' => {
                    in_string = false;
                    i += 1;
                }
                _ => i += 1,
            }
            continue;
        }
        if b == b'"' {
            in_string = true;
            i += 1;
            continue;
        }
        if !is_word(b) {
            i += 1;
            continue;
        }

        let extent_end = bytes[i..]
            .iter()
            .position(|&c| c == b',')
            .map_or(len, |offset| i + offset);
        // bytes[i] is a word byte, so the search always succeeds
        let last = (i..extent_end)
            .rev()
            .find(|&j| is_word(bytes[j]))
            .unwrap_or(i);
        spans.push(i..last + 1);
        i = last + 1;
    }
    spans
}

/// Every bare token in `input`, in order.
#[must_use]
pub fn bare_tokens(input: &str) -> Vec<&str> {
    bare_token_spans(input)
        .into_iter()
        .map(|span| &input[span])
        .collect()
}

/// Wrap every bare token in double quotes.
///
/// Returns the input unchanged (borrowed) when it holds no bare tokens.
#[must_use]
pub fn quote_bare_tokens(input: &str) -> Cow<'_, str> {
    let spans = bare_token_spans(input);
    if spans.is_empty() {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len() + spans.len() * 2);
    let mut cursor = 0;
    for span in spans {
        out.push_str(&input[cursor..span.start]);
        out.push('"');
        out.push_str(&input[span.clone()]);
        out.push('"');
        cursor = span.end;
    }
    out.push_str(&input[cursor..]);
    Cow::Owned(out)
}
