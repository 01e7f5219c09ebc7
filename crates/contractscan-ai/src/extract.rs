//! Pull a JSON object out of raw model output.
//!
//! Models wrap JSON in markdown fences, prepend prose ("Here is the
//! analysis:") or leave trailing commas. These helpers recover the object
//! text without interpreting it.

/// Strip one surrounding markdown code fence, with or without a language tag.
pub fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // drop the info string ("json", "markdown", ...)
    let body = match rest.find('\n') {
        Some(nl) => &rest[nl + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Return the first balanced `{...}` in `raw`.
///
/// Braces inside string literals are ignored and backslash escapes are
/// honoured. Returns `None` when no opening brace has a matching close.
pub fn json_object(raw: &str) -> Option<&str> {
    json_objects(raw).next()
}

/// Every top-level balanced `{...}` in `raw`, in order.
///
/// Scanning resumes after each candidate, so objects nested inside an
/// earlier candidate are not yielded on their own.
pub fn json_objects<'a>(raw: &'a str) -> impl Iterator<Item = &'a str> {
    let text = strip_fences(raw);
    let mut from = 0;
    std::iter::from_fn(move || {
        while let Some(offset) = text[from..].find('{') {
            let start = from + offset;
            match balanced_end(text.as_bytes(), start) {
                Some(end) => {
                    from = end + 1;
                    return Some(&text[start..=end]);
                }
                None => from = start + 1,
            }
        }
        None
    })
}

fn balanced_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Remove commas that directly precede `}` or `]` (ignoring whitespace),
/// outside string literals.
pub fn strip_trailing_commas(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escaped = false;
    let chars: Vec<char> = json.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            out.push(c);
            continue;
        }
        if c == '"' {
            in_string = true;
        } else if c == ',' {
            let next = chars[i + 1..].iter().find(|n| !n.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                continue;
            }
        }
        out.push(c);
    }
    out
}
