//! `$`-placeholder substitution for the cloud-init template.
//!
//! Recognised forms: `$name`, `${name}` and `$$` for a literal dollar sign.
//! Names are ASCII identifiers (`[_A-Za-z][_A-Za-z0-9]*`). Every placeholder
//! must be present in the variable map.

use std::collections::BTreeMap;

use crate::error::InitError;

/// Variable map passed to [`render_template`].
pub type Variables<'a> = BTreeMap<&'a str, &'a str>;

fn is_ident_start(c: u8) -> bool {
    c == b'_' || c.is_ascii_alphabetic()
}

fn is_ident_continue(c: u8) -> bool {
    c == b'_' || c.is_ascii_alphanumeric()
}

/// Length of the identifier starting at `bytes[0]`, or 0 if there is none.
fn ident_len(bytes: &[u8]) -> usize {
    match bytes.first() {
        Some(&c) if is_ident_start(c) => {
            1 + bytes[1..].iter().take_while(|&&c| is_ident_continue(c)).count()
        }
        _ => 0,
    }
}

fn invalid_placeholder(text: &str, offset: usize) -> InitError {
    let before = &text[..offset];
    let line = before.matches('\n').count() + 1;
    let col = offset - before.rfind('\n').map_or(0, |i| i + 1) + 1;
    InitError::Template {
        message: format!("invalid placeholder at line {line}, col {col}"),
    }
}

/// Substitute every placeholder in `text` with its value from `vars`.
pub fn render_template(text: &str, vars: &Variables<'_>) -> Result<String, InitError> {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut i = 0;

    while let Some(pos) = text[i..].find('$') {
        let start = i + pos;
        out.push_str(&text[copied..start]);
        let rest = &bytes[start + 1..];

        let (name, end) = if rest.first() == Some(&b'$') {
            out.push('$');
            i = start + 2;
            copied = i;
            continue;
        } else if rest.first() == Some(&b'{') {
            let len = ident_len(&rest[1..]);
            if len == 0 || rest.get(1 + len) != Some(&b'}') {
                return Err(invalid_placeholder(text, start));
            }
            (&text[start + 2..start + 2 + len], start + 3 + len)
        } else {
            let len = ident_len(rest);
            if len == 0 {
                return Err(invalid_placeholder(text, start));
            }
            (&text[start + 1..start + 1 + len], start + 1 + len)
        };

        let value = vars.get(name).ok_or_else(|| InitError::MissingPlaceholder {
            name: name.to_string(),
        })?;
        out.push_str(value);
        i = end;
        copied = end;
    }

    out.push_str(&text[copied..]);
    Ok(out)
}
