//! Escaping for the two textual formats this library splices values into.
//!
//! SOQL queries and async-API job documents are both assembled as strings,
//! so every caller-provided value crossing into them goes through `soql` or
//! `xml` here first. Interpolating raw input into a query is an injection
//! hole:
//!
//! ```rust
//! use forcepull_client::security::soql;
//!
//! let name = soql::escape_string("O'Brien");
//! let query = format!("SELECT Id FROM Account WHERE Name = '{name}'");
//!
//! // Never format user input in unescaped:
//! // format!("SELECT Id FROM Account WHERE Name = '{user_input}'")
//! ```

/// SOQL escaping utilities for injection prevention.
pub mod soql {
    /// Escape a value for a single-quoted SOQL string literal.
    ///
    /// Backslash-escapes the quote and backslash characters plus the
    /// whitespace escapes SOQL recognizes (`\n`, `\r`, `\t`), so the value
    /// cannot terminate the literal it is spliced into. Filter-list keys in
    /// `forcepull-soql` go through this before they are rendered into an
    /// `IN (...)` clause.
    ///
    /// # Example
    ///
    /// ```rust
    /// use forcepull_client::security::soql;
    ///
    /// let name = soql::escape_string("O'Brien & Co.");
    /// let query = format!("SELECT Id FROM Account WHERE Name = '{name}'");
    /// assert!(query.contains(r"'O\'Brien & Co.'"));
    /// ```
    #[must_use]
    pub fn escape_string(value: &str) -> String {
        let mut escaped = String::with_capacity(value.len() + 16);
        for ch in value.chars() {
            match ch {
                '\'' => escaped.push_str("\\'"),
                '\\' => escaped.push_str("\\\\"),
                '\n' => escaped.push_str("\\n"),
                '\r' => escaped.push_str("\\r"),
                '\t' => escaped.push_str("\\t"),
                _ => escaped.push(ch),
            }
        }
        escaped
    }
}

/// XML escaping utilities for the async bulk API's job documents.
pub mod xml {
    /// Escape a string for safe inclusion in XML content.
    ///
    /// This escapes the five predefined XML entities.
    ///
    /// # Example
    ///
    /// ```rust
    /// use forcepull_client::security::xml;
    ///
    /// let safe = xml::escape("Hello <World> & 'Friends'");
    /// assert_eq!(safe, "Hello &lt;World&gt; &amp; &apos;Friends&apos;");
    /// ```
    #[must_use]
    pub fn escape(value: &str) -> String {
        let mut escaped = String::with_capacity(value.len() + 16);
        for ch in value.chars() {
            match ch {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '"' => escaped.push_str("&quot;"),
                '\'' => escaped.push_str("&apos;"),
                _ => escaped.push(ch),
            }
        }
        escaped
    }

    /// Reverse `escape`: resolve the five predefined XML entities in
    /// element text extracted from a response document.
    ///
    /// Unknown entities are passed through unchanged.
    #[must_use]
    pub fn unescape(value: &str) -> String {
        let mut out = String::with_capacity(value.len());
        let mut rest = value;
        while let Some(pos) = rest.find('&') {
            out.push_str(&rest[..pos]);
            rest = &rest[pos..];
            if let Some(stripped) = rest.strip_prefix("&amp;") {
                out.push('&');
                rest = stripped;
            } else if let Some(stripped) = rest.strip_prefix("&lt;") {
                out.push('<');
                rest = stripped;
            } else if let Some(stripped) = rest.strip_prefix("&gt;") {
                out.push('>');
                rest = stripped;
            } else if let Some(stripped) = rest.strip_prefix("&quot;") {
                out.push('"');
                rest = stripped;
            } else if let Some(stripped) = rest.strip_prefix("&apos;") {
                out.push('\'');
                rest = stripped;
            } else {
                out.push('&');
                rest = &rest[1..];
            }
        }
        out.push_str(rest);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod soql_tests {
        use super::soql::*;

        #[test]
        fn test_escape_string() {
            let cases = [
                ("hello", "hello"),
                ("O'Brien", r"O\'Brien"),
                (r"test\path", r"test\\path"),
                ("line1\nline2", r"line1\nline2"),
                ("col1\tcol2", r"col1\tcol2"),
                ("text\r\n", r"text\r\n"),
            ];
            for (raw, expected) in cases {
                assert_eq!(escape_string(raw), expected, "input {raw:?}");
            }
        }

        #[test]
        fn test_escaped_key_cannot_close_the_literal() {
            // A classic breakout attempt stays inside the quoted literal.
            let key = escape_string("' OR Name != '");
            assert_eq!(key, r"\' OR Name != \'");
            assert!(!key.contains("''"));
        }
    }

    mod xml_tests {
        use super::xml::*;

        #[test]
        fn test_escape() {
            assert_eq!(escape("hello"), "hello");
            assert_eq!(escape("<tag>"), "&lt;tag&gt;");
            assert_eq!(escape("&amp;"), "&amp;amp;");
            assert_eq!(escape("\"quoted\""), "&quot;quoted&quot;");
            assert_eq!(escape("it's"), "it&apos;s");
        }

        #[test]
        fn test_unescape() {
            assert_eq!(unescape("hello"), "hello");
            assert_eq!(unescape("&lt;tag&gt;"), "<tag>");
            assert_eq!(unescape("&amp;amp;"), "&amp;");
            assert_eq!(unescape("it&apos;s &quot;fine&quot;"), "it's \"fine\"");
            // Unknown entity passes through
            assert_eq!(unescape("&nbsp; &"), "&nbsp; &");
        }

        #[test]
        fn test_escape_unescape_round_trip() {
            let original = "state <Failed> & message: 'quota \"exceeded\"'";
            assert_eq!(unescape(&escape(original)), original);
        }
    }
}
