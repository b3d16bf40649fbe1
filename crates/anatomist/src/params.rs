//! Depth-aware parameter-list tokenizing.
//!
//! Commas only separate parameters at parenthesis depth zero, so a
//! function-pointer parameter like `void (*f)(int, int)` stays one token.

/// Splits a parameter list into trimmed top-level tokens.
///
/// Empty text and the literal `void` both mean "no parameters".
///
/// # Examples
/// ```
/// # use anatomist::params::split_params;
/// assert_eq!(split_params("void (*f)(int, int), int x"), vec!["void (*f)(int, int)", "int x"]);
/// assert!(split_params(" void ").is_empty());
/// ```
pub fn split_params(param_list: &str) -> Vec<String> {
    let text = param_list.trim();
    if text.is_empty() || text == "void" {
        return Vec::new();
    }

    let mut params = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    for c in text.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 => {
                params.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        params.push(current.trim().to_string());
    }
    params
}

/// Counts top-level parameters; `void` and empty lists count zero.
pub fn count_params(param_list: &str) -> usize {
    split_params(param_list).len()
}

/// Finds the `)` that closes the `(` at byte offset `open`.
///
/// Returns `None` if `open` is not a `(` or the parenthesis is never closed
/// on this line.
pub fn find_closing_paren(text: &str, open: usize) -> Option<usize> {
    if text.as_bytes().get(open) != Some(&b'(') {
        return None;
    }
    let mut depth = 0usize;
    for (i, b) in text.bytes().enumerate().skip(open) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
