//! Response template rendering.

/// Values substituted into a response.
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    pub sender: &'a str,
    pub room: &'a str,
}

/// Expand a stored template.
///
/// Literal `\n` pairs become line breaks first, then `{sender}` and `{room}`
/// are substituted. Substituted values are not scanned again and unknown
/// `{...}` placeholders are left as typed.
pub fn render(template: &str, context: &RenderContext<'_>) -> String {
    let expanded = template.replace("\\n", "\n");

    let mut out = String::with_capacity(expanded.len());
    let mut rest = expanded.as_str();

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let candidate = &rest[open..];

        if let Some(after) = candidate.strip_prefix("{sender}") {
            out.push_str(context.sender);
            rest = after;
        } else if let Some(after) = candidate.strip_prefix("{room}") {
            out.push_str(context.room);
            rest = after;
        } else {
            out.push('{');
            rest = &candidate[1..];
        }
    }
    out.push_str(rest);

    out
}
