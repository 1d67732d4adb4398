use crate::error::WarnCode;

fn sanitize_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_sep = false;
    for ch in value.chars() {
        if ch.is_ascii_whitespace() {
            if !out.is_empty() && !prev_sep {
                out.push('_');
                prev_sep = true;
            }
        } else if ch.is_ascii_graphic() {
            out.push(ch);
            prev_sep = false;
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "na".to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn format_line(code: WarnCode, stage: &str, provider: &str, reason: &str, err: &str) -> String {
    format!(
        "UPCYCLE_WARN code={} stage={} provider={} reason={} err={}",
        code.as_str(),
        sanitize_value(stage),
        sanitize_value(provider),
        sanitize_value(reason),
        sanitize_value(err),
    )
}

/// One line on stderr; stdout stays reserved for command output.
pub fn emit(code: WarnCode, stage: &str, provider: &str, reason: &str, err: &str) {
    eprintln!("{}", format_line(code, stage, provider, reason, err));
}

#[cfg(test)]
mod tests {
    use super::{format_line, sanitize_value};
    use crate::error::WarnCode;

    #[test]
    fn sanitize_value_rewrites_whitespace() {
        assert_eq!(sanitize_value("a b\tc"), "a_b_c");
    }

    #[test]
    fn sanitize_value_falls_back_for_empty() {
        assert_eq!(sanitize_value("   "), "na");
    }

    #[test]
    fn line_carries_code_and_fields() {
        let line = format_line(
            WarnCode::U002ProviderTimeout,
            "requesting",
            "gemini",
            "fallback",
            "timed out after 45s",
        );
        assert!(line.starts_with("UPCYCLE_WARN code=U002_PROVIDER_TIMEOUT "));
        assert!(line.contains("provider=gemini"));
        assert!(line.ends_with("err=timed_out_after_45s"));
    }
}
