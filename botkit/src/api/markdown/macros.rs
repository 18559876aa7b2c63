/// Creates a MarkdownString from a literal with compile-time validation of the template.
#[macro_export]
macro_rules! markdown_string {
    ($template:literal) => {{
        const _: () = $crate::markdown::validate_markdownv2_format($template);
        $crate::markdown::MarkdownString::from_validated_string($template)
    }};
}

/// Formats a MarkdownString, substituting each `{}` placeholder with an argument.
///
/// A literal template is validated at compile time; any other expression is converted
/// with `Into<MarkdownString>` (so plain strings used as templates get escaped).
/// Arguments are converted with `Into<MarkdownString>`: plain values are escaped,
/// `MarkdownString` values are inserted as they are.
#[macro_export]
macro_rules! markdown_format {
    ($template:literal $(, $arg:expr)* $(,)?) => {{
        const _: () = $crate::markdown::validate_markdownv2_format($template);
        let template = $crate::markdown::MarkdownString::from_validated_string($template);
        let args: Vec<$crate::markdown::MarkdownString> = vec![$(($arg).into()),*];
        $crate::markdown::MarkdownString::substitute(&template, args)
    }};
    ($template:expr $(, $arg:expr)* $(,)?) => {{
        let template: $crate::markdown::MarkdownString = ($template).into();
        let args: Vec<$crate::markdown::MarkdownString> = vec![$(($arg).into()),*];
        $crate::markdown::MarkdownString::substitute(&template, args)
    }};
}
