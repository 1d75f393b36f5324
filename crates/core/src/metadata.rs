//! Parser for declarative YAML metadata embedded in script comments.
//!
//! Scripts may carry a front-matter block in leading `#` comments:
//!
//! ```text
//! # ---
//! # name: hello-world
//! # description: A simple hello world script
//! # inputs:
//! #   message: The message to display
//! # ---
//! ```
//!
//! The block is extracted, comment prefixes are stripped, and the remainder
//! is parsed as YAML. Malformed or absent metadata yields `None`; it never
//! blocks script registration.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

/// Matches a `# ---` ... `# ---` front-matter block of comment lines.
fn front_matter_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^#\s*---\n((?:#.*\n)*?)#\s*---").expect("valid regex"))
}

/// Parse YAML metadata from script content.
///
/// Returns `None` if there is no front-matter block or its contents are not
/// valid YAML.
pub fn parse_script_metadata(content: &str) -> Option<Value> {
    let captures = front_matter_re().captures(content)?;
    let block = captures.get(1)?.as_str();

    // Strip the leading `#` (and one following space, preserving deeper
    // indentation) from each comment line.
    let mut yaml_lines = Vec::new();
    for line in block.split('\n') {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix('#') {
            yaml_lines.push(rest.strip_prefix(' ').unwrap_or(rest).to_string());
        } else if trimmed.is_empty() {
            yaml_lines.push(String::new());
        }
    }
    let yaml_text = yaml_lines.join("\n");

    match serde_yaml::from_str::<Value>(&yaml_text) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "# ---\n\
# name: hello-world\n\
# description: A simple hello world script\n\
# inputs:\n\
#   message: The message to display\n\
# ---\n\
\n\
#!/bin/bash\n\
echo \"Hello, ${message:-World}!\"\n";

    #[test]
    fn parses_front_matter_block() {
        let metadata = parse_script_metadata(SAMPLE).expect("metadata");
        assert_eq!(metadata["name"], "hello-world");
        assert_eq!(metadata["description"], "A simple hello world script");
        assert_eq!(metadata["inputs"]["message"], "The message to display");
    }

    #[test]
    fn no_front_matter_returns_none() {
        let content = "#!/bin/bash\necho hi\n";
        assert!(parse_script_metadata(content).is_none());
    }

    #[test]
    fn unterminated_block_returns_none() {
        let content = "# ---\n# name: dangling\n\necho hi\n";
        assert!(parse_script_metadata(content).is_none());
    }

    #[test]
    fn invalid_yaml_returns_none() {
        let content = "# ---\n# name: [unclosed\n# ---\necho hi\n";
        assert!(parse_script_metadata(content).is_none());
    }

    #[test]
    fn empty_block_returns_none() {
        let content = "# ---\n# ---\necho hi\n";
        assert!(parse_script_metadata(content).is_none());
    }

    #[test]
    fn nested_indentation_is_preserved() {
        let content = "# ---\n\
# inputs:\n\
#   region: Deployment region\n\
#   target: Deploy target\n\
# ---\n";
        let metadata = parse_script_metadata(content).expect("metadata");
        assert_eq!(metadata["inputs"]["region"], "Deployment region");
        assert_eq!(metadata["inputs"]["target"], "Deploy target");
    }
}
