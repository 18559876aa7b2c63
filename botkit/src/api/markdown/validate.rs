/// Checks a MarkdownV2 template.
///
/// Used by `markdown_string!` and `markdown_format!` in a `const` item, so an invalid
/// literal template fails compilation instead of being rejected by Telegram at runtime.
///
/// Rules enforced:
/// - reserved characters `.`, `!`, `-`, `+`, `=`, `#`, `>` must be escaped with `\`
/// - `*`, `_`, `__`, `~`, `||` and `` ` `` markers must be balanced
/// - braces may only appear as `{}` placeholders
///
/// Square brackets and parentheses are not checked because inline links use them.
pub const fn validate_markdownv2_format(template: &str) {
    let bytes = template.as_bytes();
    let len = bytes.len();
    let mut i = 0;
    let mut bold = false;
    let mut italic = false;
    let mut underline = false;
    let mut strike = false;
    let mut spoiler = false;
    let mut code = false;

    while i < len {
        let b = bytes[i];
        if b == b'\\' {
            if i + 1 >= len {
                panic!("MarkdownV2 template ends with a dangling backslash");
            }
            i += 2;
            continue;
        }
        if code {
            if b == b'`' {
                code = false;
            }
            i += 1;
            continue;
        }
        match b {
            b'`' => code = true,
            b'*' => bold = !bold,
            b'_' => {
                if i + 1 < len && bytes[i + 1] == b'_' {
                    underline = !underline;
                    i += 1;
                } else {
                    italic = !italic;
                }
            }
            b'~' => strike = !strike,
            b'|' => {
                if i + 1 < len && bytes[i + 1] == b'|' {
                    spoiler = !spoiler;
                    i += 1;
                } else {
                    panic!("MarkdownV2 template contains an unescaped '|'");
                }
            }
            b'{' => {
                if i + 1 < len && bytes[i + 1] == b'}' {
                    i += 1;
                } else {
                    panic!("MarkdownV2 template contains an opening brace that is not a placeholder");
                }
            }
            b'}' => panic!("MarkdownV2 template contains an unmatched closing brace"),
            b'.' | b'!' | b'-' | b'+' | b'=' | b'#' | b'>' => {
                panic!("MarkdownV2 template contains an unescaped reserved character")
            }
            _ => {}
        }
        i += 1;
    }

    if bold || italic || underline || strike || spoiler || code {
        panic!("MarkdownV2 template contains an unbalanced formatting marker");
    }
}
